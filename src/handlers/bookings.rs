use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::errors::AppError;
use crate::handlers::authenticate;
use crate::models::{Booking, CreateBookingRequest, Role, User};
use crate::services::lifecycle::{Actor, BookingAction};
use crate::services::query::{self, BookingQuery, DateRange, SortBy, StatusFilter};
use crate::state::AppState;

fn actor(user: &User) -> Actor {
    Actor::new(user.id.clone(), user.role)
}

/// The slice of the collection a role is allowed to see.
fn visible_to(user: &User, bookings: Vec<Booking>) -> Vec<Booking> {
    match user.role {
        Role::Customer => bookings
            .into_iter()
            .filter(|b| b.customer_id == user.id)
            .collect(),
        Role::Worker => bookings
            .into_iter()
            .filter(|b| b.worker_id.as_deref() == Some(user.id.as_str()))
            .collect(),
        Role::Admin => bookings,
    }
}

// GET /api/bookings
#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub date_range: Option<String>,
    pub sort: Option<String>,
    pub search: Option<String>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, Response> {
    let user = authenticate(&headers, &state)?;

    let bookings = state
        .bookings
        .refresh()
        .await
        .map_err(|e| AppError::from(e).into_response())?;
    let mine = visible_to(&user, bookings);

    let booking_query = BookingQuery {
        status: params
            .status
            .as_deref()
            .map(StatusFilter::parse)
            .unwrap_or_default(),
        date_range: params
            .date_range
            .as_deref()
            .map(DateRange::parse)
            .unwrap_or_default(),
        sort: params.sort.as_deref().map(SortBy::parse).unwrap_or_default(),
        search: params.search,
    };

    let result = query::run_query(&mine, &booking_query, Utc::now().naive_utc());
    Ok(Json(serde_json::json!({
        "rows": result.rows,
        "stats": result.stats,
    })))
}

// POST /api/bookings — direct create, bypassing the wizard
pub async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<Booking>, Response> {
    let user = authenticate(&headers, &state)?;
    let booking = state
        .bookings
        .create(&request, &user, Utc::now().naive_utc())
        .await
        .map_err(|e| AppError::from(e).into_response())?;
    Ok(Json(booking))
}

// GET /api/bookings/:id
pub async fn get(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, Response> {
    let user = authenticate(&headers, &state)?;
    let booking = state
        .bookings
        .get(&id)
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    let allowed = match user.role {
        Role::Customer => booking.customer_id == user.id,
        Role::Worker => {
            booking.worker_id.as_deref() == Some(user.id.as_str()) || booking.worker_id.is_none()
        }
        Role::Admin => true,
    };
    if !allowed {
        return Err(AppError::Unauthorized.into_response());
    }
    Ok(Json(booking))
}

// GET /api/worker/requests — PENDING requests offered to this worker
pub async fn worker_requests(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Booking>>, Response> {
    let user = authenticate(&headers, &state)?;
    if !user.is_verified_worker() {
        return Err(AppError::Unauthorized.into_response());
    }

    state
        .bookings
        .refresh()
        .await
        .map_err(|e| AppError::from(e).into_response())?;
    let requests = state
        .bookings
        .requests_for_worker(&user.id)
        .await
        .map_err(|e| AppError::from(e).into_response())?;
    Ok(Json(requests))
}

// POST /api/worker/requests/:id/dismiss
pub async fn dismiss_request(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, Response> {
    let user = authenticate(&headers, &state)?;
    if !user.is_verified_worker() {
        return Err(AppError::Unauthorized.into_response());
    }

    state
        .bookings
        .dismiss_request(&user.id, &id)
        .await
        .map_err(|e| AppError::from(e).into_response())?;
    Ok(Json(serde_json::json!({"ok": true})))
}

async fn run_action(
    state: &Arc<AppState>,
    headers: &HeaderMap,
    id: &str,
    action: BookingAction,
) -> Result<Json<Booking>, Response> {
    let user = authenticate(headers, state)?;

    // Earning-side actions are gated on verification, mirroring the route
    // gate: an unverified worker cannot take jobs.
    if user.role == Role::Worker
        && matches!(
            action,
            BookingAction::Accept | BookingAction::Start | BookingAction::Complete
        )
        && !user.is_verified_worker()
    {
        return Err(AppError::Unauthorized.into_response());
    }

    state
        .bookings
        .refresh()
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    let booking = state
        .bookings
        .apply_action(id, action, &actor(&user), Utc::now().naive_utc())
        .await
        .map_err(|e| AppError::from(e).into_response())?;
    Ok(Json(booking))
}

// POST /api/bookings/:id/accept
pub async fn accept(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, Response> {
    run_action(&state, &headers, &id, BookingAction::Accept).await
}

// POST /api/bookings/:id/start
pub async fn start(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, Response> {
    run_action(&state, &headers, &id, BookingAction::Start).await
}

// POST /api/bookings/:id/complete
pub async fn complete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, Response> {
    run_action(&state, &headers, &id, BookingAction::Complete).await
}

// POST /api/bookings/:id/cancel
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, Response> {
    run_action(&state, &headers, &id, BookingAction::Cancel).await
}

// POST /api/admin/bookings/:id/refund
pub async fn refund(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, Response> {
    run_action(&state, &headers, &id, BookingAction::AdminRefund).await
}
