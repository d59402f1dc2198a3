use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::handlers::maybe_authenticate;
use crate::services::gate::{self, AuthSnapshot, GateDecision};
use crate::state::AppState;

// GET /api/authorize?path=/worker/dashboard
#[derive(Deserialize)]
pub struct AuthorizeQuery {
    pub path: String,
}

/// Navigation decision for the client shell. Access denials come back as
/// redirect targets, never as error statuses.
pub async fn authorize(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AuthorizeQuery>,
) -> Json<serde_json::Value> {
    let auth = match maybe_authenticate(&headers, &state) {
        Some(user) => AuthSnapshot::signed_in(user),
        None => AuthSnapshot::anonymous(),
    };

    let body = match gate::authorize(&auth, &query.path) {
        GateDecision::Pending => serde_json::json!({"decision": "pending"}),
        GateDecision::Allow => serde_json::json!({"decision": "allow"}),
        GateDecision::Redirect(target) => {
            serde_json::json!({"decision": "redirect", "target": target})
        }
        GateDecision::Verification(screen) => serde_json::json!({
            "decision": "verification",
            "kycStatus": screen.kyc_status.as_str(),
            "ctaPath": screen.cta_path,
        }),
    };
    Json(body)
}
