//! Utility module - terminal styling and progress indicators

mod progress;
mod styling;

pub use progress::*;
pub use styling::*;
