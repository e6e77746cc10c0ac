use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::brackets::resolve_bracket_reduction;
use super::domain::{ActivityCategory, EligibilityOutcome, FactId, PeriodType, RequestContext};
use super::service::{AidEstimationService, AidServiceError, CatalogSource};
use super::summary::summarize_with_floor;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RequiredFactsRequest {
    #[serde(default)]
    pub(crate) activity_categories: BTreeSet<ActivityCategory>,
    pub(crate) period_type: PeriodType,
    pub(crate) child_age: i32,
    #[serde(default)]
    pub(crate) territory_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RequiredFactsResponse {
    pub(crate) required_facts: BTreeSet<FactId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BracketRequest {
    #[serde(default)]
    pub(crate) income_proxy: Option<f64>,
    pub(crate) period_type: PeriodType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SummaryRequest {
    pub(crate) price_initial: f64,
    #[serde(default)]
    pub(crate) outcomes: Vec<EligibilityOutcome>,
}

/// Router builder exposing the estimation endpoints.
pub fn aid_router<C>(service: Arc<AidEstimationService<C>>) -> Router
where
    C: CatalogSource + 'static,
{
    Router::new()
        .route("/api/v1/aids/estimate", post(estimate_handler::<C>))
        .route(
            "/api/v1/aids/required-facts",
            post(required_facts_handler::<C>),
        )
        .route("/api/v1/aids/brackets", post(bracket_handler))
        .route("/api/v1/aids/summary", post(summary_handler::<C>))
        .route("/api/v1/territories/:code", get(territory_handler::<C>))
        .with_state(service)
}

pub(crate) async fn estimate_handler<C>(
    State(service): State<Arc<AidEstimationService<C>>>,
    Json(context): Json<RequestContext>,
) -> Response
where
    C: CatalogSource + 'static,
{
    match service.estimate(&context) {
        Ok(estimate) => (StatusCode::OK, Json(estimate)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn required_facts_handler<C>(
    State(service): State<Arc<AidEstimationService<C>>>,
    Json(request): Json<RequiredFactsRequest>,
) -> Response
where
    C: CatalogSource + 'static,
{
    let required_facts = service.required_facts(
        &request.activity_categories,
        request.period_type,
        request.child_age,
        &request.territory_code,
    );
    (StatusCode::OK, Json(RequiredFactsResponse { required_facts })).into_response()
}

pub(crate) async fn bracket_handler(Json(request): Json<BracketRequest>) -> Response {
    let reduction = resolve_bracket_reduction(request.income_proxy, request.period_type);
    (StatusCode::OK, Json(reduction)).into_response()
}

pub(crate) async fn summary_handler<C>(
    State(service): State<Arc<AidEstimationService<C>>>,
    Json(request): Json<SummaryRequest>,
) -> Response
where
    C: CatalogSource + 'static,
{
    let summary = summarize_with_floor(
        request.price_initial,
        &request.outcomes,
        service.config().residual_floor,
    );
    (StatusCode::OK, Json(summary)).into_response()
}

pub(crate) async fn territory_handler<C>(
    State(service): State<Arc<AidEstimationService<C>>>,
    Path(code): Path<String>,
) -> Response
where
    C: CatalogSource + 'static,
{
    match service.territory_chain(&code) {
        Ok(chain) => {
            let payload = json!({
                "code": code,
                "covered": super::territory::is_covered(&chain),
                "chain": chain,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

fn service_error_response(error: AidServiceError) -> Response {
    let status = match error {
        AidServiceError::Catalog(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}
