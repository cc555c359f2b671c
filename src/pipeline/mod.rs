//! Pipeline module - loading, cleaning and writing the study tables

pub mod dedupe;
pub mod disciplines;
pub mod error;
pub mod frame;
pub mod loader;
pub mod metrics;
pub mod prepare;
pub mod stats;
pub mod writer;

pub use dedupe::*;
pub use disciplines::*;
pub use error::PrepareError;
pub use loader::*;
pub use metrics::*;
pub use prepare::*;
pub use stats::*;
pub use writer::*;
