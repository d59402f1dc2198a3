pub mod addresses;
pub mod authorize;
pub mod bookings;
pub mod dashboard;
pub mod draft;
pub mod events;
pub mod health;
pub mod reviews;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

use crate::db::queries;
use crate::models::User;
use crate::state::AppState;

/// Resolves the bearer token to a user. The auth collaborator proper is
/// external; this is just the token lookup at the HTTP edge.
pub fn authenticate(headers: &HeaderMap, state: &Arc<AppState>) -> Result<User, Response> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let token = auth.strip_prefix("Bearer ").unwrap_or("");

    let user = {
        let db = state.db.lock().unwrap();
        queries::get_user_by_token(&db, token).ok().flatten()
    };

    user.ok_or_else(|| {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "unauthorized"})),
        )
            .into_response()
    })
}

/// Same as `authenticate` but tolerates anonymous callers.
pub fn maybe_authenticate(headers: &HeaderMap, state: &Arc<AppState>) -> Option<User> {
    authenticate(headers, state).ok()
}
