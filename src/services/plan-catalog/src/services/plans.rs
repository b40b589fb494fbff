//! Plan Query Service
//!
//! Validates caller input, then delegates to the catalog store. Also hosts the
//! derived computations (speed/price thresholding, pagination, statistics).

use crate::repository::PlanRepository;
use crate::{PlanError, Result};
use plan_advisor_shared::{
    extract_speed_in_mbps, PaginatedPlans, Plan, PlanId, PlanSearchFilters, PlanStatistics,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

pub struct PlanService {
    repository: Arc<dyn PlanRepository>,
}

impl PlanService {
    pub fn new(repository: Arc<dyn PlanRepository>) -> Self {
        Self { repository }
    }

    pub fn get_all(&self) -> Vec<Plan> {
        self.repository.find_all()
    }

    /// Look up a plan. Non-positive ids are rejected; ids beyond the id space
    /// simply do not exist.
    pub fn get_by_id(&self, id: i64) -> Result<Option<Plan>> {
        if id <= 0 {
            return Err(PlanError::invalid_argument("invalid plan id"));
        }
        Ok(PlanId::try_from(id)
            .ok()
            .and_then(|id| self.repository.find_by_id(id)))
    }

    pub fn exists(&self, id: PlanId) -> bool {
        self.repository.exists(id)
    }

    pub fn count(&self) -> usize {
        self.repository.count()
    }

    pub fn search(&self, filters: &PlanSearchFilters) -> Vec<Plan> {
        self.repository.search(filters)
    }

    /// Keep plans at least `min_speed_mbps` fast and at most `max_price`
    /// expensive. Unset thresholds impose nothing.
    pub fn filter_by_speed_and_price(
        &self,
        plans: &[Plan],
        min_speed_mbps: Option<f64>,
        max_price: Option<f64>,
    ) -> Vec<Plan> {
        plans
            .iter()
            .filter(|plan| {
                let meets_speed =
                    min_speed_mbps.map_or(true, |min| extract_speed_in_mbps(&plan.speed) >= min);
                let meets_price = max_price.map_or(true, |max| plan.price <= max);
                meets_speed && meets_price
            })
            .cloned()
            .collect()
    }

    pub fn search_with_pagination(
        &self,
        filters: &PlanSearchFilters,
        page: usize,
        page_size: usize,
    ) -> Result<PaginatedPlans> {
        if page < 1 {
            return Err(PlanError::invalid_argument("page must be greater than 0"));
        }
        if page_size < 1 {
            return Err(PlanError::invalid_argument(
                "page size must be greater than 0",
            ));
        }

        let matches = self.repository.search(filters);
        let paginated = paginate(matches, page, page_size);
        debug!(
            total = paginated.total,
            page, page_size, "Paginated plan search"
        );
        Ok(paginated)
    }

    pub fn find_by_operator(&self, operator: &str) -> Result<Vec<Plan>> {
        let operator = operator.trim();
        if operator.is_empty() {
            return Err(PlanError::invalid_argument("operator not provided"));
        }
        Ok(self.repository.find_by_operator(operator))
    }

    pub fn find_by_city(&self, city: &str) -> Result<Vec<Plan>> {
        let city = city.trim();
        if city.is_empty() {
            return Err(PlanError::invalid_argument("city not provided"));
        }
        Ok(self.repository.find_by_city(city))
    }

    pub fn find_by_price_range(&self, min_price: f64, max_price: f64) -> Result<Vec<Plan>> {
        if min_price < 0.0 || max_price < 0.0 {
            return Err(PlanError::invalid_argument("prices cannot be negative"));
        }
        if min_price > max_price {
            return Err(PlanError::invalid_argument(
                "minimum price cannot exceed maximum price",
            ));
        }
        Ok(self.repository.find_by_price_range(min_price, max_price))
    }

    pub fn extract_speed_in_mbps(&self, speed: &str) -> f64 {
        extract_speed_in_mbps(speed)
    }

    pub fn get_plans_statistics(&self, plans: &[Plan]) -> PlanStatistics {
        plan_statistics(plans)
    }
}

fn paginate(items: Vec<Plan>, page: usize, page_size: usize) -> PaginatedPlans {
    let total = items.len();
    let total_pages = total.div_ceil(page_size);
    let start = (page - 1).saturating_mul(page_size);

    let plans = items.into_iter().skip(start).take(page_size).collect();

    PaginatedPlans {
        plans,
        total,
        page,
        page_size,
        total_pages,
    }
}

fn plan_statistics(plans: &[Plan]) -> PlanStatistics {
    if plans.is_empty() {
        return PlanStatistics::default();
    }

    let sum: f64 = plans.iter().map(|p| p.price).sum();
    let min_price = plans.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
    let max_price = plans
        .iter()
        .map(|p| p.price)
        .fold(f64::NEG_INFINITY, f64::max);

    let operators: BTreeSet<&str> = plans.iter().map(|p| p.operator.as_str()).collect();
    let cities: BTreeSet<&str> = plans.iter().map(|p| p.city.as_str()).collect();

    PlanStatistics {
        count: plans.len(),
        average_price: round_to_cents(sum / plans.len() as f64),
        min_price,
        max_price,
        operators: operators.into_iter().map(String::from).collect(),
        cities: cities.into_iter().map(String::from).collect(),
    }
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
