//! API Handlers Module
//!
//! HTTP handlers for the plan catalog REST API. Handlers only translate
//! between HTTP and the services; every rule lives in `services`.

use crate::config::{CorsConfig, PlanCatalogConfig};
use crate::error::{ApiError, Result};
use crate::repository::PlanRepository;
use crate::services::{PlanService, RecommendationService};
use crate::PlanError;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderValue, Method},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use plan_advisor_shared::{
    PaginatedPlans, Plan, PlanSearchFilters, PlanStatistics, RecommendationMetadata,
    RecommendationResponse, UsageProfile, UserPreferences,
};
use serde::{de, Deserialize, Deserializer};
use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowOrigin, Any as AnyOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{debug, warn};
use validator::Validate;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PlanCatalogConfig>,
    pub plans: Arc<PlanService>,
    pub recommendations: Arc<RecommendationService>,
}

impl AppState {
    /// Wire the services around one shared catalog store
    pub fn new(config: Arc<PlanCatalogConfig>, repository: Arc<dyn PlanRepository>) -> Self {
        let plans = Arc::new(PlanService::new(Arc::clone(&repository)));
        let recommendations = Arc::new(RecommendationService::new(
            repository,
            config.scoring.weights,
        ));

        Self {
            config,
            plans,
            recommendations,
        }
    }
}

/// Create the main router with all API routes
pub fn create_router(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(cors_layer(&state.config.cors))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(state.config.server.request_timeout()))
        .into_inner();

    Router::new()
        // UI and system routes
        .route("/", get(index))
        .route("/health", get(health_check))
        // Catalog routes
        .route("/plans", get(list_plans))
        .route("/plans/filtered", get(filtered_plans))
        .route("/plans/search", get(search_plans))
        .route("/plans/statistics", get(plan_statistics))
        .route("/plans/:id", get(get_plan))
        // Recommendation routes
        .route(
            "/plans/recommendations",
            get(recommend_from_query).post(recommend_from_body),
        )
        .route(
            "/plans/recommendations/metadata",
            get(recommendation_metadata),
        )
        .layer(middleware)
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if config.allowed_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(AnyOrigin);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

fn handle_panic(_payload: Box<dyn Any + Send + 'static>) -> Response {
    ApiError::internal("request handler panicked").into_response()
}

// ============================================================================
// QUERY AND BODY TYPES
// ============================================================================

/// Treat `?key=` the same as an absent key
fn empty_string_as_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}

/// Like `empty_string_as_none`, but rejects NaN and infinities
fn finite_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match empty_string_as_none::<D, f64>(deserializer)? {
        Some(value) if !value.is_finite() => Err(de::Error::custom(format!(
            "expected a finite number, got {}",
            value
        ))),
        value => Ok(value),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredPlansParams {
    #[serde(default, deserialize_with = "finite_number")]
    pub min_speed: Option<f64>,
    #[serde(default, deserialize_with = "finite_number")]
    pub max_price: Option<f64>,
}

/// Catalog search parameters; `/plans/statistics` ignores the paging fields
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default, deserialize_with = "finite_number")]
    pub min_price: Option<f64>,
    #[serde(default, deserialize_with = "finite_number")]
    pub max_price: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub min_data_cap: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub max_data_cap: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub operator: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page_size: Option<i64>,
}

impl SearchParams {
    fn filters(&self) -> PlanSearchFilters {
        PlanSearchFilters {
            min_price: self.min_price,
            max_price: self.max_price,
            min_data_cap: self.min_data_cap,
            max_data_cap: self.max_data_cap,
            operator: self.operator.clone(),
            city: self.city.clone(),
            name: self.name.clone(),
        }
    }
}

/// Recommendation preferences from a query string
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "finite_number")]
    #[validate(range(min = 0.0))]
    pub max_budget: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub usage_profile: Option<UsageProfile>,
    /// Comma-separated
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub preferred_operators: Option<String>,
}

impl RecommendationQuery {
    fn into_preferences(self) -> UserPreferences {
        build_preferences(
            self.city,
            self.max_budget,
            self.usage_profile,
            self.preferred_operators.into_iter().collect(),
        )
    }
}

/// Operators as a JSON array or a comma-separated string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OperatorList {
    Many(Vec<String>),
    Csv(String),
}

impl OperatorList {
    fn into_vec(self) -> Vec<String> {
        match self {
            OperatorList::Many(operators) => operators,
            OperatorList::Csv(operators) => vec![operators],
        }
    }
}

/// Recommendation preferences from a JSON body
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationBody {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub max_budget: Option<f64>,
    #[serde(default)]
    pub usage_profile: Option<String>,
    #[serde(default)]
    pub preferred_operators: Option<OperatorList>,
}

impl RecommendationBody {
    fn into_preferences(self) -> Result<UserPreferences> {
        let usage_profile = match self.usage_profile.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(profile) => Some(
                profile
                    .parse::<UsageProfile>()
                    .map_err(|e| ApiError::bad_request(e.to_string()))?,
            ),
        };

        Ok(build_preferences(
            self.city,
            self.max_budget,
            usage_profile,
            self.preferred_operators
                .map(OperatorList::into_vec)
                .unwrap_or_default(),
        ))
    }
}

/// Split comma-separated entries, drop blanks, and leave the field unset
/// when nothing remains
fn build_preferences(
    city: Option<String>,
    max_budget: Option<f64>,
    usage_profile: Option<UsageProfile>,
    operators: Vec<String>,
) -> UserPreferences {
    let preferred_operators: Vec<String> = operators
        .iter()
        .flat_map(|entry| entry.split(','))
        .map(str::trim)
        .filter(|op| !op.is_empty())
        .map(String::from)
        .collect();

    UserPreferences {
        city: city.unwrap_or_default(),
        max_budget,
        usage_profile,
        preferred_operators: (!preferred_operators.is_empty()).then_some(preferred_operators),
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Companion web UI
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "totalPlans": state.plans.count(),
        "timestamp": chrono::Utc::now(),
    }))
}

/// List every plan; names are uppercased for display
pub async fn list_plans(State(state): State<AppState>) -> Json<Vec<Plan>> {
    debug!("Listing all plans");

    let plans = state
        .plans
        .get_all()
        .into_iter()
        .map(|plan| Plan {
            name: plan.name.to_uppercase(),
            ..plan
        })
        .collect();

    Json(plans)
}

/// Filter all plans by minimum speed and maximum price
pub async fn filtered_plans(
    State(state): State<AppState>,
    params: std::result::Result<Query<FilteredPlansParams>, QueryRejection>,
) -> Result<Json<Vec<Plan>>> {
    let Query(params) = params?;
    debug!(min_speed = ?params.min_speed, max_price = ?params.max_price, "Filtering plans");

    let all = state.plans.get_all();
    Ok(Json(state.plans.filter_by_speed_and_price(
        &all,
        params.min_speed,
        params.max_price,
    )))
}

/// Paginated catalog search
pub async fn search_plans(
    State(state): State<AppState>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<PaginatedPlans>> {
    let Query(params) = params?;
    let catalog = &state.config.catalog;

    // negative values become 0 and are rejected by the service
    let page = params.page.map_or(1, |p| usize::try_from(p).unwrap_or(0));
    let page_size = params
        .page_size
        .map_or(catalog.default_page_size, |s| usize::try_from(s).unwrap_or(0))
        .min(catalog.max_page_size);

    debug!(page, page_size, "Searching plans");

    let result = state
        .plans
        .search_with_pagination(&params.filters(), page, page_size)?;
    Ok(Json(result))
}

/// Price statistics over the plans matching the search filters
pub async fn plan_statistics(
    State(state): State<AppState>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<PlanStatistics>> {
    let Query(params) = params?;

    let matches = state.plans.search(&params.filters());
    Ok(Json(state.plans.get_plans_statistics(&matches)))
}

/// Get a plan by id
pub async fn get_plan(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<Plan>> {
    let Path(id) = id?;
    debug!(id, "Getting plan");

    state
        .plans
        .get_by_id(id)?
        .map(Json)
        .ok_or_else(|| PlanError::not_found(format!("plan {} not found", id)).into())
}

/// Recommendations from query-string preferences
pub async fn recommend_from_query(
    State(state): State<AppState>,
    query: std::result::Result<Query<RecommendationQuery>, QueryRejection>,
) -> Result<Json<RecommendationResponse>> {
    let Query(query) = query?;
    query.validate()?;

    recommendations_response(&state, query.into_preferences())
}

/// Recommendations from a JSON body
pub async fn recommend_from_body(
    State(state): State<AppState>,
    body: std::result::Result<Json<RecommendationBody>, JsonRejection>,
) -> Result<Json<RecommendationResponse>> {
    let Json(body) = body?;
    body.validate()?;

    recommendations_response(&state, body.into_preferences()?)
}

fn recommendations_response(
    state: &AppState,
    preferences: UserPreferences,
) -> Result<Json<RecommendationResponse>> {
    debug!(city = %preferences.city, "Generating recommendations");

    let recommendations = state
        .recommendations
        .recommend(&preferences)
        .map_err(|e| {
            ApiError::from(e).with_available_cities(state.recommendations.get_available_cities())
        })?;

    let top_recommendation = recommendations
        .first()
        .cloned()
        .ok_or_else(|| ApiError::from(PlanError::not_found("no recommendations found")))?;

    Ok(Json(RecommendationResponse {
        top_recommendation,
        total_results: recommendations.len(),
        all_recommendations: recommendations,
        preferences_used: preferences,
    }))
}

/// Cities, operators and profiles for building a preferences form
pub async fn recommendation_metadata(State(state): State<AppState>) -> Json<RecommendationMetadata> {
    Json(RecommendationMetadata {
        available_cities: state.recommendations.get_available_cities(),
        available_operators: state.recommendations.get_available_operators(),
        total_plans: state.plans.count(),
        profiles: UsageProfile::ALL.iter().map(UsageProfile::info).collect(),
    })
}
