use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::authenticate;
use crate::models::{BookingStatus, Complaint, ComplaintStatus, Review, Role};
use crate::state::AppState;

// POST /api/bookings/:id/review
#[derive(Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i64,
    pub comment: Option<String>,
}

pub async fn create_review(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<CreateReviewRequest>,
) -> Result<Json<Review>, Response> {
    let user = authenticate(&headers, &state)?;
    if user.role != Role::Customer {
        return Err(AppError::Unauthorized.into_response());
    }
    if !(1..=5).contains(&body.rating) {
        return Err(
            AppError::Validation("rating must be between 1 and 5".to_string()).into_response(),
        );
    }

    let booking = state
        .bookings
        .get(&id)
        .await
        .map_err(|e| AppError::from(e).into_response())?;
    if booking.customer_id != user.id {
        return Err(AppError::Unauthorized.into_response());
    }
    // Only finished work can be rated.
    if booking.status != BookingStatus::Completed {
        return Err(AppError::InvalidTransition.into_response());
    }
    let worker_id = booking
        .worker_id
        .clone()
        .ok_or_else(|| AppError::InvalidTransition.into_response())?;

    let review = Review {
        id: Uuid::new_v4().to_string(),
        booking_id: booking.id,
        worker_id,
        rating: body.rating,
        comment: body.comment,
        created_at: Utc::now().naive_utc(),
    };
    {
        let db = state.db.lock().unwrap();
        queries::create_review(&db, &review).map_err(|e| AppError::Internal(e).into_response())?;
    }
    Ok(Json(review))
}

// POST /api/complaints
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComplaintRequest {
    pub booking_id: String,
    pub subject: String,
}

pub async fn create_complaint(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateComplaintRequest>,
) -> Result<Json<Complaint>, Response> {
    let user = authenticate(&headers, &state)?;
    if user.role != Role::Customer {
        return Err(AppError::Unauthorized.into_response());
    }
    if body.subject.trim().is_empty() {
        return Err(AppError::Validation("subject must not be empty".to_string()).into_response());
    }

    let booking = state
        .bookings
        .get(&body.booking_id)
        .await
        .map_err(|e| AppError::from(e).into_response())?;
    if booking.customer_id != user.id {
        return Err(AppError::Unauthorized.into_response());
    }

    let complaint = Complaint {
        id: Uuid::new_v4().to_string(),
        booking_id: booking.id,
        customer_id: user.id,
        subject: body.subject.trim().to_string(),
        status: ComplaintStatus::Open,
        created_at: Utc::now().naive_utc(),
    };
    {
        let db = state.db.lock().unwrap();
        queries::create_complaint(&db, &complaint)
            .map_err(|e| AppError::Internal(e).into_response())?;
    }
    Ok(Json(complaint))
}

// POST /api/admin/complaints/:id/resolve
pub async fn resolve_complaint(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, Response> {
    let user = authenticate(&headers, &state)?;
    if user.role != Role::Admin {
        return Err(AppError::Unauthorized.into_response());
    }

    let resolved = {
        let db = state.db.lock().unwrap();
        queries::resolve_complaint(&db, &id).map_err(|e| AppError::Internal(e).into_response())?
    };
    if !resolved {
        return Err(AppError::NotFound(id).into_response());
    }
    Ok(Json(serde_json::json!({"ok": true})))
}
