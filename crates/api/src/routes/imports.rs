//! Route definitions for the import pipeline.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::imports;
use crate::state::AppState;

/// Routes mounted at `/imports`.
///
/// ```text
/// POST   /upload          -> upload
/// POST   /preview         -> preview
/// POST   /commit          -> commit
/// GET    /                -> list
/// GET    /{id}            -> get_by_id
/// POST   /{id}/rollback   -> rollback
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(imports::upload))
        .route("/preview", post(imports::preview))
        .route("/commit", post(imports::commit))
        .route("/", get(imports::list))
        .route("/{id}", get(imports::get_by_id))
        .route("/{id}/rollback", post(imports::rollback))
}
