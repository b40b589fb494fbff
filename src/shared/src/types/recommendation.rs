//! Recommendation types
//!
//! User preferences, the five usage profiles, score weights and the scored
//! output returned by the recommendation engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::plan::Plan;

// ============================================================================
// USAGE PROFILES
// ============================================================================

/// Customer archetype with minimum speed and data requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageProfile {
    Basic,
    Medium,
    Heavy,
    Family,
    Gaming,
}

/// Static description of a usage profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInfo {
    pub id: UsageProfile,
    pub name: &'static str,
    pub description: &'static str,
    /// Minimum speed in Mbps
    pub min_speed: u32,
    /// Minimum data allowance in GB
    pub min_data: u32,
}

impl UsageProfile {
    pub const ALL: [UsageProfile; 5] = [
        UsageProfile::Basic,
        UsageProfile::Medium,
        UsageProfile::Heavy,
        UsageProfile::Family,
        UsageProfile::Gaming,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            UsageProfile::Basic => "basic",
            UsageProfile::Medium => "medium",
            UsageProfile::Heavy => "heavy",
            UsageProfile::Family => "family",
            UsageProfile::Gaming => "gaming",
        }
    }

    pub fn info(&self) -> ProfileInfo {
        let (name, description, min_speed, min_data) = match self {
            UsageProfile::Basic => ("Basic Use", "Email, social media, light browsing", 50, 100),
            UsageProfile::Medium => (
                "Medium Use",
                "HD streaming, home office, moderate downloads",
                100,
                200,
            ),
            UsageProfile::Heavy => (
                "Heavy Use",
                "4K streaming, large downloads, many devices",
                300,
                500,
            ),
            UsageProfile::Family => (
                "Family",
                "Several users on many devices at once",
                200,
                500,
            ),
            UsageProfile::Gaming => (
                "Gaming",
                "Online games, low latency, frequent updates",
                300,
                300,
            ),
        };

        ProfileInfo {
            id: *self,
            name,
            description,
            min_speed,
            min_data,
        }
    }
}

impl fmt::Display for UsageProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid usage profile: {0} (expected basic, medium, heavy, family or gaming)")]
pub struct ParseUsageProfileError(pub String);

impl FromStr for UsageProfile {
    type Err = ParseUsageProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(UsageProfile::Basic),
            "medium" => Ok(UsageProfile::Medium),
            "heavy" => Ok(UsageProfile::Heavy),
            "family" => Ok(UsageProfile::Family),
            "gaming" => Ok(UsageProfile::Gaming),
            _ => Err(ParseUsageProfileError(s.to_string())),
        }
    }
}

// ============================================================================
// SCORING
// ============================================================================

/// Points awarded per satisfied criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub city_match: u32,
    pub budget_match: u32,
    pub speed_profile_match: u32,
    pub data_profile_match: u32,
    pub operator_preference: u32,
}

impl ScoreWeights {
    /// Highest score a plan can reach
    pub const MAX_SCORE: u32 = 100;

    pub const DEFAULT: ScoreWeights = ScoreWeights {
        city_match: 30,
        budget_match: 25,
        speed_profile_match: 20,
        data_profile_match: 15,
        operator_preference: 10,
    };

    /// Sum of all weights, saturating at `u32::MAX`
    pub fn total(&self) -> u32 {
        [
            self.budget_match,
            self.speed_profile_match,
            self.data_profile_match,
            self.operator_preference,
        ]
        .into_iter()
        .fold(self.city_match, u32::saturating_add)
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Coarse label for a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreRating {
    pub const EXCELLENT_THRESHOLD: u32 = 80;
    pub const GOOD_THRESHOLD: u32 = 60;
    pub const FAIR_THRESHOLD: u32 = 40;

    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= Self::EXCELLENT_THRESHOLD => ScoreRating::Excellent,
            s if s >= Self::GOOD_THRESHOLD => ScoreRating::Good,
            s if s >= Self::FAIR_THRESHOLD => ScoreRating::Fair,
            _ => ScoreRating::Poor,
        }
    }
}

// ============================================================================
// REQUEST / RESPONSE
// ============================================================================

/// What the user is looking for
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    /// Required; matched case-insensitively
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_profile: Option<UsageProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_operators: Option<Vec<String>>,
}

/// A plan scored against a set of preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecommendation {
    pub plan: Plan,
    pub score: u32,
    pub rating: ScoreRating,
    pub reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub top_recommendation: PlanRecommendation,
    pub all_recommendations: Vec<PlanRecommendation>,
    pub total_results: usize,
    pub preferences_used: UserPreferences,
}

/// Values a client needs to build a preferences form
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationMetadata {
    pub available_cities: Vec<String>,
    pub available_operators: Vec<String>,
    pub total_plans: usize,
    pub profiles: Vec<ProfileInfo>,
}
