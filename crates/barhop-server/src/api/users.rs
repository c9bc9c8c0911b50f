use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use barhop_core::{NewUser, User};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct FavoriteStatus {
    pub user_id: i64,
    pub bar_id: i64,
    pub is_favorited: bool,
}

pub(super) async fn create_user(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<NewUser>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let user = barhop_store::create_user(&state.store, body)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    tracing::info!(user_id = user.id, "user created");
    Ok((StatusCode::CREATED, Json(ApiResponse::new(user, req_id.0))))
}

pub(super) async fn get_user(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = barhop_store::get_user(&state.store, id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse::new(user, req_id.0)))
}

pub(super) async fn get_favorite(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((user_id, bar_id)): Path<(i64, i64)>,
) -> Json<ApiResponse<FavoriteStatus>> {
    let is_favorited = barhop_store::is_bar_favorited(&state.store, user_id, bar_id).await;
    Json(ApiResponse::new(
        FavoriteStatus {
            user_id,
            bar_id,
            is_favorited,
        },
        req_id.0,
    ))
}

pub(super) async fn toggle_favorite(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((user_id, bar_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<FavoriteStatus>>, ApiError> {
    let is_favorited = barhop_store::toggle_favorite(&state.store, user_id, bar_id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        FavoriteStatus {
            user_id,
            bar_id,
            is_favorited,
        },
        req_id.0,
    )))
}
