use axum::{extract::State, Json};

use crate::profile::Profile;
use crate::state::AppState;

/// GET /api/v1/profile
///
/// `null` until a profile has been loaded.
pub async fn handle_get_profile(State(state): State<AppState>) -> Json<Option<Profile>> {
    Json(state.context.profile())
}
