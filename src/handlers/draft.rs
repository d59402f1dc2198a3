use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::authenticate;
use crate::models::{Booking, BookingDraft, DraftUpdate, Role};
use crate::state::AppState;

// POST /api/draft/start
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartDraftRequest {
    pub worker_id: Option<String>,
    #[serde(default)]
    pub worker_name: String,
    pub service_id: String,
    #[serde(default)]
    pub service_name: String,
    pub price: i64,
}

pub async fn start(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<StartDraftRequest>,
) -> Result<Json<BookingDraft>, Response> {
    let user = authenticate(&headers, &state)?;
    if user.role != Role::Customer {
        return Err(AppError::Unauthorized.into_response());
    }

    let draft = state
        .drafts
        .start(
            &user.id,
            body.worker_id.as_deref(),
            &body.worker_name,
            &body.service_id,
            &body.service_name,
            body.price,
        )
        .map_err(|e| AppError::from(e).into_response())?;
    Ok(Json(draft))
}

// GET /api/draft — resume point for any wizard screen
pub async fn current(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Option<BookingDraft>>, Response> {
    let user = authenticate(&headers, &state)?;
    let draft = state
        .drafts
        .current(&user.id)
        .map_err(|e| AppError::from(e).into_response())?;
    Ok(Json(draft))
}

// PATCH /api/draft — one wizard step's fields
pub async fn update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(partial): Json<DraftUpdate>,
) -> Result<Json<BookingDraft>, Response> {
    let user = authenticate(&headers, &state)?;
    let draft = state
        .drafts
        .update(&user.id, partial)
        .map_err(|e| AppError::from(e).into_response())?;
    Ok(Json(draft))
}

// POST /api/draft/finalize — the wizard's single createBooking call
pub async fn finalize(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Booking>, Response> {
    let user = authenticate(&headers, &state)?;

    let draft = state
        .drafts
        .current(&user.id)
        .map_err(|e| AppError::from(e).into_response())?
        .ok_or_else(|| AppError::DraftNotStarted.into_response())?;

    // Snapshot the address text now; later edits must not rewrite history.
    let address = match draft.address_id.as_deref() {
        Some(address_id) => {
            let db = state.db.lock().unwrap();
            queries::get_address_line(&db, address_id, &user.id)
                .map_err(|e| AppError::Internal(e).into_response())?
                .ok_or_else(|| AppError::NotFound(address_id.to_string()).into_response())?
        }
        None => String::new(),
    };

    let request = state
        .drafts
        .finalize(&user.id, &address)
        .map_err(|e| AppError::from(e).into_response())?;

    let booking = state
        .bookings
        .create(&request, &user, Utc::now().naive_utc())
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    // The draft is consumed only once the booking actually exists; a failed
    // create leaves the wizard resumable.
    state
        .drafts
        .complete(&user.id)
        .map_err(|e| AppError::from(e).into_response())?;
    Ok(Json(booking))
}

// POST /api/draft/abandon
pub async fn abandon(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, Response> {
    let user = authenticate(&headers, &state)?;
    state
        .drafts
        .abandon(&user.id)
        .map_err(|e| AppError::from(e).into_response())?;
    Ok(Json(serde_json::json!({"ok": true})))
}
