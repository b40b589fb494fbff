//! Catalog Store Module
//!
//! Read-only access to the plan catalog. The store never fails on lookups;
//! argument validation belongs to the services in front of it.

use crate::{PlanError, Result};
use plan_advisor_shared::{Plan, PlanId, PlanSearchFilters};
use std::collections::HashSet;

/// Catalog store trait for dependency injection
#[cfg_attr(test, mockall::automock)]
pub trait PlanRepository: Send + Sync {
    /// Snapshot of every plan in catalog order
    fn find_all(&self) -> Vec<Plan>;

    fn find_by_id(&self, id: PlanId) -> Option<Plan>;

    /// Plans matching all filters, sorted by price then id
    fn search(&self, filters: &PlanSearchFilters) -> Vec<Plan>;

    /// Case-insensitive exact operator match
    fn find_by_operator(&self, operator: &str) -> Vec<Plan>;

    /// Case-insensitive exact city match, catalog order
    fn find_by_city(&self, city: &str) -> Vec<Plan>;

    /// Inclusive price range, no ordering guarantee
    fn find_by_price_range(&self, min: f64, max: f64) -> Vec<Plan>;

    fn exists(&self, id: PlanId) -> bool;

    fn count(&self) -> usize;
}

/// In-memory catalog seeded once at startup
#[derive(Debug, Clone)]
pub struct MemoryPlanRepository {
    plans: Vec<Plan>,
}

impl MemoryPlanRepository {
    /// Build a store from seed data.
    ///
    /// Rejects ids of zero, duplicate ids, and negative or non-finite prices.
    pub fn new(plans: Vec<Plan>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(plans.len());

        for plan in &plans {
            if plan.id == 0 {
                return Err(PlanError::invalid_argument(format!(
                    "plan '{}' has id 0; ids must be positive",
                    plan.name
                )));
            }
            if !seen.insert(plan.id) {
                return Err(PlanError::invalid_argument(format!(
                    "duplicate plan id {}",
                    plan.id
                )));
            }
            if !plan.price.is_finite() || plan.price < 0.0 {
                return Err(PlanError::invalid_argument(format!(
                    "plan {} has invalid price {}",
                    plan.id, plan.price
                )));
            }
        }

        Ok(Self { plans })
    }

    fn filter_by(&self, predicate: impl Fn(&Plan) -> bool) -> Vec<Plan> {
        self.plans.iter().filter(|p| predicate(p)).cloned().collect()
    }
}

impl PlanRepository for MemoryPlanRepository {
    fn find_all(&self) -> Vec<Plan> {
        self.plans.clone()
    }

    fn find_by_id(&self, id: PlanId) -> Option<Plan> {
        self.plans.iter().find(|p| p.id == id).cloned()
    }

    fn search(&self, filters: &PlanSearchFilters) -> Vec<Plan> {
        let mut matches = if filters.is_empty() {
            self.plans.clone()
        } else {
            self.filter_by(|plan| filters.matches(plan))
        };
        matches.sort_by(|a, b| a.price.total_cmp(&b.price).then(a.id.cmp(&b.id)));
        matches
    }

    fn find_by_operator(&self, operator: &str) -> Vec<Plan> {
        let operator = operator.to_lowercase();
        self.filter_by(|plan| plan.operator.to_lowercase() == operator)
    }

    fn find_by_city(&self, city: &str) -> Vec<Plan> {
        let city = city.to_lowercase();
        self.filter_by(|plan| plan.city.to_lowercase() == city)
    }

    fn find_by_price_range(&self, min: f64, max: f64) -> Vec<Plan> {
        self.filter_by(|plan| plan.price >= min && plan.price <= max)
    }

    fn exists(&self, id: PlanId) -> bool {
        self.plans.iter().any(|p| p.id == id)
    }

    fn count(&self) -> usize {
        self.plans.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plan(id: PlanId, operator: &str, city: &str, price: f64, data_cap: u32) -> Plan {
        Plan {
            id,
            name: format!("Plan {}", id),
            operator: operator.to_string(),
            city: city.to_string(),
            speed: "100Mbps".to_string(),
            price,
            data_cap,
        }
    }

    fn repository() -> MemoryPlanRepository {
        MemoryPlanRepository::new(vec![
            plan(4, "Claro", "Rio de Janeiro", 129.9, 300),
            plan(1, "Vivo", "São Paulo", 99.9, 200),
            plan(3, "Vivo", "São Paulo", 199.9, 500),
            plan(2, "TIM", "Curitiba", 99.9, 150),
        ])
        .unwrap()
    }

    fn ids(plans: &[Plan]) -> Vec<PlanId> {
        plans.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_rejects_invalid_seed() {
        let duplicate = MemoryPlanRepository::new(vec![
            plan(1, "Vivo", "São Paulo", 10.0, 1),
            plan(1, "Oi", "Recife", 10.0, 1),
        ]);
        assert!(matches!(duplicate, Err(PlanError::InvalidArgument(_))));

        let zero_id = MemoryPlanRepository::new(vec![plan(0, "Vivo", "São Paulo", 10.0, 1)]);
        assert!(zero_id.is_err());

        let negative = MemoryPlanRepository::new(vec![plan(1, "Vivo", "São Paulo", -1.0, 1)]);
        assert!(negative.is_err());
    }

    #[test]
    fn test_find_all_is_a_snapshot() {
        let repo = repository();
        let mut snapshot = repo.find_all();
        snapshot[0].price = 0.0;
        snapshot.clear();

        assert_eq!(repo.count(), 4);
        assert_eq!(repo.find_by_id(4).unwrap().price, 129.9);
    }

    #[test]
    fn test_search_without_filters_sorts_by_price_then_id() {
        let repo = repository();
        let result = repo.search(&PlanSearchFilters::default());
        assert_eq!(ids(&result), vec![1, 2, 4, 3]);
    }

    #[test]
    fn test_search_with_blank_text_filters_returns_everything() {
        let repo = repository();
        let filters = PlanSearchFilters {
            city: Some("   ".to_string()),
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(filters.is_empty());
        assert_eq!(ids(&repo.search(&filters)), vec![1, 2, 4, 3]);
    }

    #[test]
    fn test_search_ands_filters() {
        let repo = repository();
        let filters = PlanSearchFilters {
            operator: Some("vivo".to_string()),
            min_data_cap: Some(300),
            ..Default::default()
        };
        assert_eq!(ids(&repo.search(&filters)), vec![3]);

        let filters = PlanSearchFilters {
            city: Some("paulo".to_string()),
            max_price: Some(100.0),
            ..Default::default()
        };
        assert_eq!(ids(&repo.search(&filters)), vec![1]);
    }

    #[test]
    fn test_exact_match_lookups_ignore_case() {
        let repo = repository();
        assert_eq!(ids(&repo.find_by_operator("VIVO")), vec![1, 3]);
        assert_eq!(ids(&repo.find_by_city("são paulo")), vec![1, 3]);
        assert!(repo.find_by_city("São").is_empty());
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let repo = repository();
        let mut found = ids(&repo.find_by_price_range(99.9, 129.9));
        found.sort();
        assert_eq!(found, vec![1, 2, 4]);
    }

    #[test]
    fn test_exists_and_lookup() {
        let repo = repository();
        assert!(repo.exists(3));
        assert!(!repo.exists(42));
        assert_eq!(repo.find_by_id(2).map(|p| p.operator), Some("TIM".to_string()));
        assert_eq!(repo.find_by_id(42), None);
    }
}
