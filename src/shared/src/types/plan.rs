//! Plan catalog types

use serde::{Deserialize, Serialize};

/// Catalog identifier of a plan. Always positive.
pub type PlanId = u32;

/// A single internet service offering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    pub operator: String,
    pub city: String,
    /// Free-text speed such as "100Mbps" or "1 Gbps"
    pub speed: String,
    pub price: f64,
    /// Monthly data allowance in GB
    pub data_cap: u32,
}

/// Search filters for the catalog.
///
/// Numeric bounds are inclusive. Text filters are case-insensitive substring
/// matches; blank strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSearchFilters {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_data_cap: Option<u32>,
    pub max_data_cap: Option<u32>,
    pub operator: Option<String>,
    pub city: Option<String>,
    pub name: Option<String>,
}

impl PlanSearchFilters {
    /// True when every provided filter accepts `plan`
    pub fn matches(&self, plan: &Plan) -> bool {
        if self.min_price.is_some_and(|min| plan.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| plan.price > max) {
            return false;
        }
        if self.min_data_cap.is_some_and(|min| plan.data_cap < min) {
            return false;
        }
        if self.max_data_cap.is_some_and(|max| plan.data_cap > max) {
            return false;
        }

        contains_ignore_case(&plan.operator, self.operator.as_deref())
            && contains_ignore_case(&plan.city, self.city.as_deref())
            && contains_ignore_case(&plan.name, self.name.as_deref())
    }

    /// True when no filter constrains the search
    pub fn is_empty(&self) -> bool {
        self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_data_cap.is_none()
            && self.max_data_cap.is_none()
            && is_blank(self.operator.as_deref())
            && is_blank(self.city.as_deref())
            && is_blank(self.name.as_deref())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn contains_ignore_case(field: &str, needle: Option<&str>) -> bool {
    match needle.map(str::trim) {
        Some(needle) if !needle.is_empty() => field
            .to_lowercase()
            .contains(needle.to_lowercase().as_str()),
        _ => true,
    }
}

/// One page of a catalog search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedPlans {
    pub plans: Vec<Plan>,
    /// Matches before slicing
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

/// Aggregates over a set of plans
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStatistics {
    pub count: usize,
    pub average_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub operators: Vec<String>,
    pub cities: Vec<String>,
}
