//! Shared types and utilities for Plan Advisor
//!
//! Holds the plan catalog data model, the recommendation model and the single
//! speed parser used by both the query service and the recommendation engine.

pub mod speed;
pub mod types;

pub use speed::extract_speed_in_mbps;
pub use types::*;
