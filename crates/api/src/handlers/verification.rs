//! Handlers for physical verification campaigns.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use qm_core::error::CoreError;
use qm_core::status::VerificationStatus;
use qm_core::types::DbId;
use qm_db::models::verification::{
    CreateCampaign, VerificationCampaign, VerificationRecord, VerifyAsset,
};
use qm_db::repositories::VerificationRepo;

use crate::error::{validation_error, AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for opening a campaign.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCampaignRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub department: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub created_by: String,
    pub due_date: Option<NaiveDate>,
}

/// Request body for verifying one asset.
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyRequest {
    pub asset_id: DbId,
    #[validate(length(min = 1, max = 255))]
    pub verified_by: String,
    pub verified_status: Option<String>,
    pub notes: Option<String>,
}

/// Campaign detail with its verification records.
#[derive(Debug, Serialize)]
pub struct CampaignDetail {
    #[serde(flatten)]
    pub campaign: VerificationCampaign,
    pub records: Vec<VerificationRecord>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/verification/campaigns
pub async fn create_campaign(
    State(state): State<AppState>,
    Json(input): Json<CreateCampaignRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate().map_err(|e| validation_error(&e))?;

    let campaign = VerificationRepo::create_campaign(
        &state.pool,
        &CreateCampaign {
            name: input.name,
            department: input.department,
            created_by: input.created_by,
            due_date: input.due_date,
        },
    )
    .await?;

    tracing::info!(
        campaign_id = campaign.id,
        total = campaign.total_count,
        "Verification campaign opened"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: campaign })))
}

/// GET /api/v1/verification/campaigns
pub async fn list_campaigns(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let campaigns = VerificationRepo::list_campaigns(&state.pool).await?;
    Ok(Json(DataResponse { data: campaigns }))
}

/// GET /api/v1/verification/campaigns/{id}
pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let campaign = VerificationRepo::find_campaign(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "VerificationCampaign",
            id,
        }))?;
    let records = VerificationRepo::list_records(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: CampaignDetail { campaign, records },
    }))
}

/// POST /api/v1/verification/campaigns/{id}/verify
pub async fn verify(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<VerifyRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate().map_err(|e| validation_error(&e))?;

    if let Some(status) = input.verified_status.as_deref() {
        if VerificationStatus::from_str(status).is_none() {
            return Err(AppError::BadRequest(format!(
                "unknown verification status: {status}"
            )));
        }
    }

    VerificationRepo::find_campaign(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "VerificationCampaign",
            id,
        }))?;

    let record = VerificationRepo::verify_asset(
        &state.pool,
        id,
        &VerifyAsset {
            asset_id: input.asset_id,
            verified_by: input.verified_by,
            verified_status: input.verified_status,
            notes: input.notes,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Asset",
        id: input.asset_id,
    }))?;

    Ok(Json(DataResponse { data: record }))
}
