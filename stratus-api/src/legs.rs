use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use stratus_core::viability::{MultiStopPlan, RerouteViability, StopOrdering};
use stratus_shared::{FlightRequest, LegMatch};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MultiStopRequest {
    pub requests: Vec<FlightRequest>,
    #[serde(default)]
    pub ordering: StopOrdering,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/empty-legs/match", post(match_legs))
        .route("/v1/empty-legs/{id}/reroute-viability", post(reroute_viability))
        .route("/v1/empty-legs/{id}/multi-stop", post(multi_stop))
}

/// POST /v1/empty-legs/match
/// Rank available empty legs against a trip request
pub async fn match_legs(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<FlightRequest>, AppError>,
) -> Result<Json<Vec<LegMatch>>, AppError> {
    tracing::debug!(
        origin = req.origin.label(),
        destination = req.destination.label(),
        date = %req.date,
        passengers = req.passengers,
        "Matching empty legs"
    );
    let matches = state.search.find_matches(&req).await?;
    Ok(Json(matches))
}

/// POST /v1/empty-legs/{id}/reroute-viability
pub async fn reroute_viability(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<FlightRequest>, AppError>,
) -> Result<Json<RerouteViability>, AppError> {
    let viability = state.search.reroute_viability(id, &req).await?;
    Ok(Json(viability))
}

/// POST /v1/empty-legs/{id}/multi-stop
pub async fn multi_stop(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<MultiStopRequest>, AppError>,
) -> Result<Json<MultiStopPlan>, AppError> {
    let plan = state.search.multi_stop(id, &req.requests, req.ordering).await?;
    Ok(Json(plan))
}
