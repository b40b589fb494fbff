//! Business services built on top of the catalog store

pub mod plans;
pub mod recommendation;

pub use plans::PlanService;
pub use recommendation::RecommendationService;
