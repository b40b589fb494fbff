//! Shared type definitions for Plan Advisor
//!
//! `plan` covers the catalog itself (records, search filters, pages,
//! statistics); `recommendation` covers user preferences, usage profiles,
//! score weights and scored results.

pub mod plan;
pub mod recommendation;

pub use plan::{PaginatedPlans, Plan, PlanId, PlanSearchFilters, PlanStatistics};
pub use recommendation::{
    ParseUsageProfileError, PlanRecommendation, ProfileInfo, RecommendationMetadata,
    RecommendationResponse, ScoreRating, ScoreWeights, UsageProfile, UserPreferences,
};
