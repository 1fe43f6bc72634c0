//! Handlers for the `/imports` resource: spreadsheet upload, preview,
//! commit, rollback, and the import ledger.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use qm_core::delta::{detect_deltas, DeltaReport};
use qm_core::error::CoreError;
use qm_core::mapping::{suggest_mapping, AmbiguousHeader, ColumnMapping};
use qm_core::record::{AssetRecord, RawRow};
use qm_core::transform::transform_rows;
use qm_core::types::DbId;
use qm_core::validate::{validate_batch, ValidationReport};
use qm_db::repositories::{AssetRepo, ImportRecordRepo, ImportRepo};

use crate::error::{validation_error, AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::upload;

/// How many transformed rows a preview returns.
const PREVIEW_ROWS: usize = 50;

/// How many raw rows an upload response samples.
const SAMPLE_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// Request / response shapes
// ---------------------------------------------------------------------------

/// Response body for a fresh upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Server-side filename; hand this back to preview/commit.
    pub stored_name: String,
    pub original_name: String,
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub sample_rows: Vec<RawRow>,
    pub row_count: usize,
    pub suggested_mapping: ColumnMapping,
    pub ambiguous_headers: Vec<AmbiguousHeader>,
}

/// Request body for a dry-run preview.
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub stored_name: String,
    pub mapping: ColumnMapping,
    pub sheet: Option<String>,
}

/// Response body for a dry-run preview. Advisory only; nothing is written.
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub rows: Vec<AssetRecord>,
    pub total_rows: usize,
    pub validation: ValidationReport,
    pub deltas: DeltaReport,
}

/// Request body for committing an upload.
#[derive(Debug, Deserialize, Validate)]
pub struct CommitRequest {
    pub stored_name: String,
    pub mapping: ColumnMapping,
    #[validate(length(min = 1, max = 255))]
    pub uploaded_by: String,
    pub sheet: Option<String>,
}

/// Request body for rolling back an import.
#[derive(Debug, Deserialize, Validate)]
pub struct RollbackRequest {
    #[validate(length(min = 1, max = 255))]
    pub requested_by: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/imports/upload
///
/// Accept a spreadsheet (multipart `file` part), store it under the upload
/// directory, and return its columns with a suggested mapping.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut original_name: Option<String> = None;
    let mut data: Option<axum::body::Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            original_name = field.file_name().map(str::to_string);
            data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("could not read upload: {e}")))?,
            );
        }
    }

    let original_name =
        original_name.ok_or_else(|| AppError::BadRequest("missing `file` part".to_string()))?;
    let data = data.ok_or_else(|| AppError::BadRequest("missing `file` part".to_string()))?;

    if !upload::has_allowed_extension(&original_name) {
        return Err(AppError::BadRequest(
            "only .xlsx and .xls files are accepted".to_string(),
        ));
    }
    if data.len() > state.config.max_upload_bytes {
        return Err(AppError::BadRequest(format!(
            "file exceeds the {} byte limit",
            state.config.max_upload_bytes
        )));
    }

    tokio::fs::create_dir_all(&state.config.upload_dir)
        .await
        .map_err(|e| AppError::InternalError(format!("could not create upload dir: {e}")))?;

    let stored_name = upload::stored_name(&original_name, Utc::now().timestamp_millis());
    let path = state.config.upload_dir.join(&stored_name);
    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| AppError::InternalError(format!("could not store upload: {e}")))?;

    // Workbook parsing is CPU-bound; keep it off the async workers.
    let parse_path = path.clone();
    let table = tokio::task::spawn_blocking(move || qm_sheet::read_sheet(&parse_path, None))
        .await
        .map_err(|e| AppError::InternalError(format!("Sheet parse task failed: {e}")))??;
    let suggestion = suggest_mapping(&table.headers);

    tracing::info!(
        stored_name = %stored_name,
        original_name = %original_name,
        rows = table.row_count(),
        mapped = suggestion.mapping.mapped_count(),
        "Spreadsheet uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UploadResponse {
                stored_name,
                original_name,
                sheet_name: table.sheet_name.clone(),
                columns: table.headers.clone(),
                sample_rows: table.sample(SAMPLE_ROWS).to_vec(),
                row_count: table.row_count(),
                suggested_mapping: suggestion.mapping,
                ambiguous_headers: suggestion.ambiguous_headers,
            },
        }),
    ))
}

/// POST /api/v1/imports/preview
///
/// Transform the stored sheet with the given mapping and report validation
/// findings and deltas against the current catalog. Writes nothing.
pub async fn preview(
    State(state): State<AppState>,
    Json(input): Json<PreviewRequest>,
) -> AppResult<impl IntoResponse> {
    let records =
        load_transformed(&state, &input.stored_name, input.sheet.as_deref(), &input.mapping).await?;

    let existing_tags = AssetRepo::list_tags(&state.pool).await?.into_iter().collect();
    let validation = validate_batch(&records, &existing_tags);

    let existing = AssetRepo::list_all(&state.pool)
        .await?
        .into_iter()
        .map(|a| (a.asset_tag.clone(), a.to_record()))
        .collect();
    let deltas = detect_deltas(&records, &existing);

    let total_rows = records.len();
    let rows = records.into_iter().take(PREVIEW_ROWS).collect();

    Ok(Json(DataResponse {
        data: PreviewResponse {
            rows,
            total_rows,
            validation,
            deltas,
        },
    }))
}

/// POST /api/v1/imports/commit
///
/// Apply the stored sheet to the catalog under one transaction and return
/// the finalized import record.
pub async fn commit(
    State(state): State<AppState>,
    Json(input): Json<CommitRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate().map_err(|e| validation_error(&e))?;

    let records =
        load_transformed(&state, &input.stored_name, input.sheet.as_deref(), &input.mapping).await?;

    let record = ImportRepo::commit_batch(
        &state.pool,
        &input.stored_name,
        &input.mapping,
        &records,
        &input.uploaded_by,
    )
    .await?;

    tracing::info!(
        import_id = record.id,
        created = record.records_created,
        updated = record.records_updated,
        failed = record.records_failed,
        "Import committed"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// POST /api/v1/imports/{id}/rollback
///
/// Undo a committed import. 404 when unknown or already rolled back.
pub async fn rollback(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RollbackRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate().map_err(|e| validation_error(&e))?;

    let outcome = ImportRepo::rollback(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ImportRecord",
            id,
        }))?;

    tracing::info!(
        import_id = id,
        requested_by = %input.requested_by,
        assets_deleted = outcome.assets_deleted,
        updates_not_reverted = outcome.updates_not_reverted,
        "Import rolled back"
    );

    Ok(Json(DataResponse { data: outcome }))
}

/// GET /api/v1/imports
///
/// Recent import records, newest first.
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let records = ImportRecordRepo::list_recent(&state.pool).await?;
    Ok(Json(DataResponse { data: records }))
}

/// GET /api/v1/imports/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = ImportRecordRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ImportRecord",
            id,
        }))?;
    Ok(Json(DataResponse { data: record }))
}

/// Read a stored sheet back and run it through the transformer.
///
/// Parsing and transforming are CPU-bound, so both run on the blocking pool.
async fn load_transformed(
    state: &AppState,
    stored_name: &str,
    sheet: Option<&str>,
    mapping: &ColumnMapping,
) -> AppResult<Vec<AssetRecord>> {
    let path = upload::resolve_stored(&state.config.upload_dir, stored_name)?;
    let sheet = sheet.map(str::to_string);
    let mapping = mapping.clone();
    tokio::task::spawn_blocking(move || -> AppResult<Vec<AssetRecord>> {
        let table = qm_sheet::read_sheet(&path, sheet.as_deref())?;
        Ok(transform_rows(&table.rows, &mapping))
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Sheet parse task failed: {e}")))?
}
