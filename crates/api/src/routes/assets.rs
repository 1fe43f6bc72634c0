//! Route definitions for the asset catalog.

use axum::routing::get;
use axum::Router;

use crate::handlers::assets;
use crate::state::AppState;

/// Routes mounted at `/assets`.
///
/// ```text
/// GET    /                -> list (search / filter / paginate)
/// GET    /stats           -> stats (aggregate counts)
/// GET    /{id}            -> get_by_id
/// PATCH  /{id}            -> update
/// DELETE /{id}            -> retire
/// GET    /{id}/history    -> history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assets::list))
        .route("/stats", get(assets::stats))
        .route(
            "/{id}",
            get(assets::get_by_id)
                .patch(assets::update)
                .delete(assets::retire),
        )
        .route("/{id}/history", get(assets::history))
}
