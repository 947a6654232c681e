//! Terminal output helpers

pub mod progress;

/// Print a visually distinct step header for a pipeline phase
pub fn step(title: &str) {
  let rule = "─".repeat(60);
  println!("\n{}\n{}\n{}", rule, title, rule);
}
