//! Recommendation Engine
//!
//! Scores every plan in the requested city against the user's preferences.
//! Each satisfied criterion adds its weight and a reason; each failed
//! applicable criterion adds a warning instead. Operator preference is the
//! exception and fails silently.

use crate::repository::PlanRepository;
use crate::{PlanError, Result};
use plan_advisor_shared::{
    extract_speed_in_mbps, Plan, PlanRecommendation, ScoreRating, ScoreWeights, UserPreferences,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

pub struct RecommendationService {
    repository: Arc<dyn PlanRepository>,
    weights: ScoreWeights,
}

impl RecommendationService {
    pub fn new(repository: Arc<dyn PlanRepository>, weights: ScoreWeights) -> Self {
        Self {
            repository,
            weights,
        }
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    /// Rank the plans available in `preferences.city`, best first.
    ///
    /// Equal scores keep catalog order.
    pub fn recommend(&self, preferences: &UserPreferences) -> Result<Vec<PlanRecommendation>> {
        let city = preferences.city.trim();
        if city.is_empty() {
            return Err(PlanError::validation("city required"));
        }

        let city_plans = self.repository.find_by_city(city);
        if city_plans.is_empty() {
            return Err(PlanError::not_found(format!("no plans for city: {}", city)));
        }

        let mut recommendations: Vec<PlanRecommendation> = city_plans
            .into_iter()
            .map(|plan| self.score_plan(plan, preferences))
            .collect();

        // sort_by is stable
        recommendations.sort_by(|a, b| b.score.cmp(&a.score));

        debug!(
            city,
            results = recommendations.len(),
            top_score = recommendations[0].score,
            "Computed plan recommendations"
        );

        Ok(recommendations)
    }

    fn score_plan(&self, plan: Plan, preferences: &UserPreferences) -> PlanRecommendation {
        let mut card = ScoreCard::default();

        card.award(
            self.weights.city_match,
            format!("available in {}", plan.city),
        );

        if let Some(budget) = preferences.max_budget {
            if plan.price <= budget {
                card.award(
                    self.weights.budget_match,
                    format!("within budget (R$ {:.2})", plan.price),
                );
            } else {
                card.warn(format!(
                    "above budget (R$ {:.2} > R$ {:.2})",
                    plan.price, budget
                ));
            }
        }

        if let Some(profile) = preferences.usage_profile {
            let requirements = profile.info();
            let speed_mbps = extract_speed_in_mbps(&plan.speed);

            if speed_mbps >= f64::from(requirements.min_speed) {
                card.award(
                    self.weights.speed_profile_match,
                    format!("speed {} suits {}", plan.speed, requirements.name),
                );
            } else {
                card.warn(format!(
                    "speed {} below the recommended minimum for {} ({}Mbps)",
                    plan.speed, requirements.name, requirements.min_speed
                ));
            }

            if plan.data_cap >= requirements.min_data {
                card.award(
                    self.weights.data_profile_match,
                    format!("{}GB data cap suits {}", plan.data_cap, requirements.name),
                );
            } else {
                card.warn(format!(
                    "{}GB data cap below the recommended minimum for {} ({}GB)",
                    plan.data_cap, requirements.name, requirements.min_data
                ));
            }
        }

        if let Some(operators) = preferences
            .preferred_operators
            .as_deref()
            .filter(|ops| !ops.is_empty())
        {
            let preferred = operators
                .iter()
                .any(|op| op.trim().to_lowercase() == plan.operator.to_lowercase());
            if preferred {
                card.award(
                    self.weights.operator_preference,
                    format!("operator {} is one of your preferred", plan.operator),
                );
            }
        }

        card.finish(plan)
    }

    /// Distinct cities in the catalog, ascending
    pub fn get_available_cities(&self) -> Vec<String> {
        self.distinct(|plan| &plan.city)
    }

    /// Distinct operators in the catalog, ascending
    pub fn get_available_operators(&self) -> Vec<String> {
        self.distinct(|plan| &plan.operator)
    }

    fn distinct(&self, field: impl Fn(&Plan) -> &String) -> Vec<String> {
        let plans = self.repository.find_all();
        let values: BTreeSet<&String> = plans.iter().map(field).collect();
        values.into_iter().cloned().collect()
    }
}

#[derive(Default)]
struct ScoreCard {
    score: u32,
    reasons: Vec<String>,
    warnings: Vec<String>,
}

impl ScoreCard {
    fn award(&mut self, points: u32, reason: String) {
        self.score = self.score.saturating_add(points);
        self.reasons.push(reason);
    }

    fn warn(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    fn finish(self, plan: Plan) -> PlanRecommendation {
        let score = self.score.min(ScoreWeights::MAX_SCORE);
        PlanRecommendation {
            plan,
            score,
            rating: ScoreRating::from_score(score),
            reasons: self.reasons,
            warnings: (!self.warnings.is_empty()).then_some(self.warnings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryPlanRepository;
    use plan_advisor_shared::{PlanId, UsageProfile};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn plan(id: PlanId, operator: &str, city: &str, speed: &str, price: f64, data_cap: u32) -> Plan {
        Plan {
            id,
            name: format!("Plan {}", id),
            operator: operator.to_string(),
            city: city.to_string(),
            speed: speed.to_string(),
            price,
            data_cap,
        }
    }

    fn catalog() -> Vec<Plan> {
        vec![
            plan(1, "Vivo", "São Paulo", "100Mbps", 99.9, 200),
            plan(2, "Claro", "Rio de Janeiro", "200Mbps", 129.9, 300),
            plan(3, "Vivo", "São Paulo", "1 Gbps", 199.9, 500),
            plan(4, "TIM", "São Paulo", "50Mbps", 59.9, 100),
            plan(5, "Claro", "São Paulo", "300 Mbps", 149.9, 500),
        ]
    }

    fn engine() -> RecommendationService {
        engine_with(ScoreWeights::DEFAULT)
    }

    fn engine_with(weights: ScoreWeights) -> RecommendationService {
        let repository = MemoryPlanRepository::new(catalog()).unwrap();
        RecommendationService::new(Arc::new(repository), weights)
    }

    fn prefs(city: &str) -> UserPreferences {
        UserPreferences {
            city: city.to_string(),
            ..Default::default()
        }
    }

    fn find(recs: &[PlanRecommendation], id: PlanId) -> &PlanRecommendation {
        recs.iter().find(|r| r.plan.id == id).unwrap()
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn test_city_is_required(#[case] city: &str) {
        assert_eq!(
            engine().recommend(&prefs(city)),
            Err(PlanError::validation("city required"))
        );
    }

    #[test]
    fn test_unknown_city_is_not_found() {
        assert_eq!(
            engine().recommend(&prefs("Manaus")),
            Err(PlanError::not_found("no plans for city: Manaus"))
        );
    }

    #[test]
    fn test_city_only_scores_thirty() {
        let recs = engine().recommend(&prefs("são paulo")).unwrap();

        assert_eq!(recs.len(), 4);
        for rec in &recs {
            assert_eq!(rec.score, 30);
            assert_eq!(rec.reasons, vec!["available in São Paulo".to_string()]);
            assert_eq!(rec.warnings, None);
            assert_eq!(rec.rating, ScoreRating::Poor);
        }
        // ties keep catalog order
        let ids: Vec<PlanId> = recs.iter().map(|r| r.plan.id).collect();
        assert_eq!(ids, vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_budget_reason_or_warning_never_both() {
        let preferences = UserPreferences {
            max_budget: Some(120.0),
            ..prefs("São Paulo")
        };
        let recs = engine().recommend(&preferences).unwrap();

        for rec in &recs {
            let within = rec.reasons.iter().any(|r| r.contains("within budget"));
            let above = rec
                .warnings
                .iter()
                .flatten()
                .any(|w| w.contains("above budget"));
            assert_ne!(within, above);
            assert_eq!(within, rec.plan.price <= 120.0);
        }

        let cheap = find(&recs, 1);
        assert_eq!(cheap.score, 55);
        assert!(cheap.reasons.contains(&"within budget (R$ 99.90)".to_string()));

        let pricey = find(&recs, 3);
        assert_eq!(pricey.score, 30);
        assert_eq!(
            pricey.warnings,
            Some(vec!["above budget (R$ 199.90 > R$ 120.00)".to_string()])
        );
    }

    #[test]
    fn test_zero_budget_is_a_real_budget() {
        let preferences = UserPreferences {
            max_budget: Some(0.0),
            ..prefs("São Paulo")
        };
        let recs = engine().recommend(&preferences).unwrap();
        assert!(recs.iter().all(|r| r.warnings.is_some()));
    }

    #[test]
    fn test_profile_checks_run_independently() {
        let preferences = UserPreferences {
            usage_profile: Some(UsageProfile::Heavy),
            ..prefs("São Paulo")
        };
        let recs = engine().recommend(&preferences).unwrap();

        // 1 Gbps, 500GB: both pass
        let gigabit = find(&recs, 3);
        assert_eq!(gigabit.score, 65);
        assert_eq!(gigabit.warnings, None);

        // 100Mbps, 200GB: both fail
        let slow = find(&recs, 1);
        assert_eq!(slow.score, 30);
        assert_eq!(slow.warnings.as_ref().map(Vec::len), Some(2));

        // 300 Mbps, 500GB: both pass at the boundary
        assert_eq!(find(&recs, 5).score, 65);
    }

    #[test]
    fn test_speed_fails_but_data_passes() {
        let preferences = UserPreferences {
            usage_profile: Some(UsageProfile::Basic),
            ..prefs("São Paulo")
        };
        let recs = engine().recommend(&preferences).unwrap();

        // 50Mbps meets basic; 100GB meets basic
        assert_eq!(find(&recs, 4).score, 65);

        let preferences = UserPreferences {
            usage_profile: Some(UsageProfile::Family),
            ..prefs("São Paulo")
        };
        let recs = engine().recommend(&preferences).unwrap();
        let slow_big = find(&recs, 1);
        assert_eq!(slow_big.score, 30);
        let warnings = slow_big.warnings.clone().unwrap();
        assert!(warnings[0].starts_with("speed 100Mbps below"));
        assert!(warnings[0].contains("(200Mbps)"));
        assert!(warnings[1].contains("(500GB)"));
    }

    #[test]
    fn test_operator_preference_is_silent_when_unmatched() {
        let preferences = UserPreferences {
            preferred_operators: Some(vec!["vivo".to_string(), " claro ".to_string()]),
            ..prefs("São Paulo")
        };
        let recs = engine().recommend(&preferences).unwrap();

        assert_eq!(find(&recs, 1).score, 40);
        assert_eq!(find(&recs, 5).score, 40);

        let tim = find(&recs, 4);
        assert_eq!(tim.score, 30);
        assert_eq!(tim.warnings, None);
    }

    #[test]
    fn test_empty_operator_list_is_ignored() {
        let preferences = UserPreferences {
            preferred_operators: Some(Vec::new()),
            ..prefs("São Paulo")
        };
        let recs = engine().recommend(&preferences).unwrap();
        assert!(recs.iter().all(|r| r.score == 30));
    }

    #[test]
    fn test_perfect_match_scores_one_hundred() {
        let preferences = UserPreferences {
            city: "São Paulo".to_string(),
            max_budget: Some(250.0),
            usage_profile: Some(UsageProfile::Gaming),
            preferred_operators: Some(vec!["Vivo".to_string()]),
        };
        let recs = engine().recommend(&preferences).unwrap();

        let top = &recs[0];
        assert_eq!(top.plan.id, 3);
        assert_eq!(top.score, 100);
        assert_eq!(top.rating, ScoreRating::Excellent);
        assert_eq!(top.reasons.len(), 5);
        assert!(recs.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_reconfigured_weights_are_clamped() {
        let weights = ScoreWeights {
            city_match: 90,
            budget_match: 90,
            ..ScoreWeights::DEFAULT
        };
        let preferences = UserPreferences {
            max_budget: Some(1000.0),
            ..prefs("Rio de Janeiro")
        };
        let recs = engine_with(weights).recommend(&preferences).unwrap();
        assert_eq!(recs[0].score, 100);
    }

    #[test]
    fn test_available_cities_and_operators() {
        let engine = engine();
        assert_eq!(
            engine.get_available_cities(),
            vec!["Rio de Janeiro".to_string(), "São Paulo".to_string()]
        );
        assert_eq!(
            engine.get_available_operators(),
            vec!["Claro".to_string(), "TIM".to_string(), "Vivo".to_string()]
        );
    }
}
