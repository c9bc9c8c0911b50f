mod bars;
mod events;
mod places;
mod users;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use barhop_core::{AppConfig, Coordinate};
use barhop_places::PlacesClient;
use barhop_store::{MemStore, StoreError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::clock::Clock;
use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub store: MemStore,
    /// `None` when no Google API key is configured.
    pub places: Option<Arc<PlacesClient>>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<AppConfig>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    places: &'static str,
    bars: usize,
    users: usize,
    events: usize,
}

#[derive(Debug, Serialize)]
struct ClientConfig {
    google_api_key: Option<String>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_store_error(request_id: String, error: &StoreError) -> ApiError {
    match error {
        StoreError::NotFound => ApiError::new(request_id, "not_found", "record not found"),
        StoreError::Conflict(message) => ApiError::new(request_id, "conflict", message.clone()),
        StoreError::Invalid(e) => ApiError::new(request_id, "validation_error", e.to_string()),
    }
}

/// Optional `lat`/`lng` pair: both or neither.
pub(super) fn optional_origin(
    req_id: &str,
    lat: Option<f64>,
    lng: Option<f64>,
) -> Result<Option<Coordinate>, ApiError> {
    match (lat, lng) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => Coordinate::new(lat, lng)
            .map(Some)
            .map_err(|e| ApiError::new(req_id, "validation_error", e.to_string())),
        _ => Err(ApiError::new(
            req_id,
            "validation_error",
            "lat and lng must be provided together",
        )),
    }
}

pub(super) fn required_origin(
    req_id: &str,
    lat: Option<f64>,
    lng: Option<f64>,
) -> Result<Coordinate, ApiError> {
    optional_origin(req_id, lat, lng)?
        .ok_or_else(|| ApiError::new(req_id, "validation_error", "lat and lng are required"))
}

/// Search radius in km, falling back to the configured default.
pub(super) fn radius_km(
    req_id: &str,
    radius: Option<f64>,
    default_km: f64,
) -> Result<f64, ApiError> {
    match radius {
        None => Ok(default_km),
        Some(r) if r.is_finite() && r > 0.0 => Ok(r),
        Some(r) => Err(ApiError::new(
            req_id,
            "validation_error",
            format!("radius must be a positive number of km, got {r}"),
        )),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

fn limited_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/config", get(client_config))
        .route("/api/v1/bars", get(bars::list_bars))
        .route("/api/v1/bars/sponsored", get(bars::list_sponsored_bars))
        .route("/api/v1/bars/local/nearby", get(bars::list_local_nearby_bars))
        .route("/api/v1/bars/nearby", get(places::list_nearby_places))
        .route("/api/v1/bars/search", post(places::search_places))
        .route("/api/v1/bars/{id}", get(bars::get_bar))
        .route("/api/v1/places/{place_id}", get(places::get_place_details))
        .route("/api/v1/users", post(users::create_user))
        .route("/api/v1/users/{id}", get(users::get_user))
        .route(
            "/api/v1/users/{user_id}/favorites/{bar_id}",
            get(users::get_favorite).post(users::toggle_favorite),
        )
        .route("/api/v1/events", get(events::list_events))
        .route("/api/v1/events/{id}", get(events::get_event))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(limited_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let counts = state.store.counts().await;
    Json(ApiResponse::new(
        HealthData {
            status: "ok",
            places: if state.places.is_some() {
                "configured"
            } else {
                "disabled"
            },
            bars: counts.bars,
            users: counts.users,
            events: counts.events,
        },
        req_id.0,
    ))
}

/// Settings the browser client needs, including the Maps key.
async fn client_config(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<ClientConfig>> {
    Json(ApiResponse::new(
        ClientConfig {
            google_api_key: state.config.google_api_key.clone(),
        },
        req_id.0,
    ))
}

#[cfg(test)]
mod tests;
