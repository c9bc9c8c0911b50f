//! Bars served from the in-memory store, each with its hours evaluated
//! against the server clock.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use barhop_core::{format_distance, Bar, Coordinate, OpenStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    map_store_error, optional_origin, radius_km, required_origin, ApiError, ApiResponse, AppState,
};

#[derive(Debug, Deserialize)]
pub(super) struct LocationQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListBarsQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Case-insensitive match on name, type, address or features.
    pub q: Option<String>,
}

/// A stored bar plus fields derived at request time.
#[derive(Debug, Serialize)]
pub(super) struct BarView {
    #[serde(flatten)]
    pub bar: Bar,
    pub open_status: OpenStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
}

impl BarView {
    pub(super) fn new(bar: Bar, now: &NaiveDateTime, distance_miles: Option<f64>) -> Self {
        Self {
            open_status: OpenStatus::evaluate(bar.hours.as_ref(), now),
            distance: distance_miles.map(format_distance),
            distance_miles,
            bar,
        }
    }

    fn from_origin(bar: Bar, now: &NaiveDateTime, origin: Option<&Coordinate>) -> Self {
        let miles = origin.map(|o| o.distance_miles(&bar.coordinate()));
        Self::new(bar, now, miles)
    }
}

/// All stored bars in id order, or the matches for `q` (nearest first when
/// an origin is given).
pub(super) async fn list_bars(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListBarsQuery>,
) -> Result<Json<ApiResponse<Vec<BarView>>>, ApiError> {
    let origin = optional_origin(&req_id.0, query.lat, query.lng)?;
    let now = state.clock.now();

    let data = match query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => barhop_store::search_bars(&state.store, q, origin.as_ref())
            .await
            .into_iter()
            .map(|hit| BarView::new(hit.bar, &now, hit.distance_miles))
            .collect(),
        None => barhop_store::list_bars(&state.store)
            .await
            .into_iter()
            .map(|bar| BarView::from_origin(bar, &now, origin.as_ref()))
            .collect(),
    };

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn list_sponsored_bars(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<ApiResponse<Vec<BarView>>>, ApiError> {
    let origin = optional_origin(&req_id.0, query.lat, query.lng)?;
    let now = state.clock.now();

    let data = barhop_store::sponsored_bars(&state.store)
        .await
        .into_iter()
        .map(|bar| BarView::from_origin(bar, &now, origin.as_ref()))
        .collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

/// Stored bars within `radius` km of `lat`/`lng`, nearest first.
pub(super) async fn list_local_nearby_bars(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<ApiResponse<Vec<BarView>>>, ApiError> {
    let origin = required_origin(&req_id.0, query.lat, query.lng)?;
    let radius = radius_km(&req_id.0, query.radius, state.config.default_radius_km)?;
    let now = state.clock.now();

    let ranked = barhop_store::nearby_bars(&state.store, &origin, radius)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    let data = ranked
        .into_iter()
        .map(|r| BarView::new(r.bar, &now, Some(r.distance_miles)))
        .collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn get_bar(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<BarView>>, ApiError> {
    let bar = barhop_store::get_bar(&state.store, id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    let now = state.clock.now();
    Ok(Json(ApiResponse::new(BarView::new(bar, &now, None), req_id.0)))
}
