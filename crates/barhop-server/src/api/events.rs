use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use barhop_core::{format_distance, Coordinate, Event};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_store_error, optional_origin, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct EventsQuery {
    #[serde(default)]
    pub featured: bool,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(super) struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub is_full: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
}

impl EventView {
    fn new(event: Event, origin: Option<&Coordinate>) -> Self {
        let distance = origin.map(|o| format_distance(o.distance_miles(&event.venue.coordinate())));
        Self {
            is_full: event.is_full(),
            distance,
            event,
        }
    }
}

pub(super) async fn list_events(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<ApiResponse<Vec<EventView>>>, ApiError> {
    let origin = optional_origin(&req_id.0, query.lat, query.lng)?;

    let data = barhop_store::list_events(&state.store, query.featured)
        .await
        .into_iter()
        .map(|event| EventView::new(event, origin.as_ref()))
        .collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn get_event(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<EventView>>, ApiError> {
    let event = barhop_store::get_event(&state.store, id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse::new(EventView::new(event, None), req_id.0)))
}
