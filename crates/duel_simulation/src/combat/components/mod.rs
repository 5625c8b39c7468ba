//! Combat components

pub mod attack;
pub mod combo;
pub mod guard;

// Re-export all components
pub use attack::*;
pub use combo::*;
pub use guard::*;
