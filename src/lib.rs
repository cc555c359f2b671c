//! Engagement prep: data preparation library
//!
//! Loads article metadata, Facebook engagement exports and a discipline
//! classification table, removes articles the social graph misattributed,
//! cleans the engagement counts and attaches discipline labels.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
