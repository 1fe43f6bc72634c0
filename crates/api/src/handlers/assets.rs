//! Handlers for the `/assets` resource.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use qm_core::error::CoreError;
use qm_core::types::DbId;
use qm_db::models::asset::{AssetSearchParams, UpdateAsset};
use qm_db::repositories::{AssetHistoryRepo, AssetRepo};

use crate::error::{validation_error, AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for a partial asset edit.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAssetRequest {
    #[validate(length(min = 1, max = 255))]
    pub changed_by: String,
    #[serde(flatten)]
    pub fields: UpdateAsset,
}

/// Request body for retiring an asset.
#[derive(Debug, Deserialize, Validate)]
pub struct RetireRequest {
    #[validate(length(min = 1, max = 255))]
    pub changed_by: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/assets?search=&status=&department=&sort_by=&sort_dir=&page=&per_page=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<AssetSearchParams>,
) -> AppResult<impl IntoResponse> {
    let page = AssetRepo::search(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/assets/stats
///
/// Aggregate catalog counts for the dashboard.
pub async fn stats(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let stats = AssetRepo::stats(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/assets/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let asset = AssetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Asset", id }))?;
    Ok(Json(DataResponse { data: asset }))
}

/// PATCH /api/v1/assets/{id}
///
/// Partial edit; writes one `update`-kind history entry per changed
/// monitored field.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAssetRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate().map_err(|e| validation_error(&e))?;

    let asset = AssetRepo::update_with_history(&state.pool, id, &input.fields, &input.changed_by)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Asset", id }))?;
    Ok(Json(DataResponse { data: asset }))
}

/// DELETE /api/v1/assets/{id}
///
/// Retire the asset; nothing is ever hard-deleted through the API.
pub async fn retire(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RetireRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate().map_err(|e| validation_error(&e))?;

    let asset = AssetRepo::retire(&state.pool, id, &input.changed_by)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Asset", id }))?;
    Ok(Json(DataResponse { data: asset }))
}

/// GET /api/v1/assets/{id}/history
///
/// Audit trail for one asset, newest first.
pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    AssetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Asset", id }))?;

    let entries = AssetHistoryRepo::list_by_asset(&state.pool, id).await?;
    Ok(Json(DataResponse { data: entries }))
}
