//! Combat systems (per-tick rules)

pub mod dispatch;
pub mod fighter;
pub mod projectile;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod fighter_tests;
#[cfg(test)]
mod test_support;

pub use dispatch::*;
pub use fighter::*;
pub use projectile::*;
