//! Route definitions for verification campaigns.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::verification;
use crate::state::AppState;

/// Routes mounted at `/verification`.
///
/// ```text
/// GET    /campaigns               -> list_campaigns
/// POST   /campaigns               -> create_campaign
/// GET    /campaigns/{id}          -> get_campaign
/// POST   /campaigns/{id}/verify   -> verify
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/campaigns",
            get(verification::list_campaigns).post(verification::create_campaign),
        )
        .route("/campaigns/{id}", get(verification::get_campaign))
        .route("/campaigns/{id}/verify", post(verification::verify))
}
