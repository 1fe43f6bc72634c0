pub mod assets;
pub mod health;
pub mod imports;
pub mod verification;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /imports/upload                       upload a spreadsheet (POST)
/// /imports/preview                      dry-run transform + deltas (POST)
/// /imports/commit                       transactional commit (POST)
/// /imports                              recent imports (GET)
/// /imports/{id}                         one import (GET)
/// /imports/{id}/rollback                undo a commit (POST)
///
/// /assets                               search / list (GET)
/// /assets/{id}                          get, patch, retire
/// /assets/{id}/history                  audit trail (GET)
///
/// /verification/campaigns               list, create
/// /verification/campaigns/{id}          campaign with records (GET)
/// /verification/campaigns/{id}/verify   record a sighting (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/imports", imports::router())
        .nest("/assets", assets::router())
        .nest("/verification", verification::router())
}
