//! Bars discovered through Google Places.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use barhop_core::{format_distance, Coordinate};
use barhop_places::{details_to_new_bar, radius_meters, NearbyPlace};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::bars::{BarView, LocationQuery};
use super::{map_store_error, radius_km, required_origin, ApiError, ApiResponse, AppState};

const MAX_PLACE_RESULTS: usize = 20;

#[derive(Debug, Deserialize)]
pub(super) struct SearchRequest {
    pub latitude: f64,
    pub longitude: f64,
    /// Kilometres.
    pub radius: Option<f64>,
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct PlaceView {
    #[serde(flatten)]
    pub place: NearbyPlace,
    pub distance: String,
    pub distance_miles: f64,
}

impl PlaceView {
    fn new(place: NearbyPlace, origin: &Coordinate) -> Self {
        let miles = origin.distance_miles(&Coordinate {
            latitude: place.latitude,
            longitude: place.longitude,
        });
        Self {
            place,
            distance: format_distance(miles),
            distance_miles: miles,
        }
    }
}

async fn search_around(
    state: &AppState,
    origin: &Coordinate,
    radius: f64,
) -> Vec<PlaceView> {
    let Some(client) = state.places.as_deref() else {
        tracing::warn!("places search requested but no Google API key is configured");
        return Vec::new();
    };

    client
        .nearby_search(origin, radius_meters(radius), MAX_PLACE_RESULTS)
        .await
        .into_iter()
        .map(|place| PlaceView::new(place, origin))
        .collect()
}

/// Places near `lat`/`lng`. Upstream trouble yields an empty list so the
/// client can still render the map.
pub(super) async fn list_nearby_places(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<ApiResponse<Vec<PlaceView>>>, ApiError> {
    let origin = required_origin(&req_id.0, query.lat, query.lng)?;
    let radius = radius_km(&req_id.0, query.radius, state.config.default_radius_km)?;

    let data = search_around(&state, &origin, radius).await;
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

/// Places near the given point, optionally narrowed by a case-insensitive
/// match on name, description or address.
pub(super) async fn search_places(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<ApiResponse<Vec<PlaceView>>>, ApiError> {
    let origin = required_origin(&req_id.0, Some(body.latitude), Some(body.longitude))?;
    let radius = radius_km(&req_id.0, body.radius, state.config.default_radius_km)?;

    let mut data = search_around(&state, &origin, radius).await;

    if let Some(needle) = body
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase)
    {
        data.retain(|v| {
            v.place.name.to_lowercase().contains(&needle)
                || v.place.description.to_lowercase().contains(&needle)
                || v.place.address.to_lowercase().contains(&needle)
        });
    }

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

/// Full details for a place, merged into the store so later reads see them.
pub(super) async fn get_place_details(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(place_id): Path<String>,
) -> Result<Json<ApiResponse<BarView>>, ApiError> {
    let Some(client) = state.places.as_deref() else {
        return Err(ApiError::new(
            req_id.0,
            "service_unavailable",
            "Google API key not configured",
        ));
    };

    let details = client.place_details(&place_id).await.map_err(|e| {
        tracing::error!(error = %e, place_id = %place_id, "place details request failed");
        ApiError::new(req_id.0.clone(), "upstream_error", "failed to fetch place details")
    })?;

    let Some(details) = details else {
        return Err(ApiError::new(req_id.0, "not_found", "place details not found"));
    };

    let new_bar = details_to_new_bar(&details, &place_id, |reference, width| {
        client.photo_url(reference, width)
    });
    let bar = barhop_store::upsert_bar_by_place_id(&state.store, new_bar)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    let now = state.clock.now();
    Ok(Json(ApiResponse::new(BarView::new(bar, &now, None), req_id.0)))
}
