//! Integration tests driving the wheel-rail binary against temporary git repos

mod helpers;
mod test_init;
mod test_plan;
mod test_release;
mod test_steps;
