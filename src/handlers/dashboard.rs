use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::authenticate;
use crate::models::{Booking, Role};
use crate::services::dashboard::{self, DashboardStats};
use crate::state::AppState;

// GET /api/dashboard — landing numbers for whichever role is asking
pub async fn get(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<DashboardStats>, Response> {
    let user = authenticate(&headers, &state)?;

    let bookings = state
        .bookings
        .refresh()
        .await
        .map_err(|e| AppError::from(e).into_response())?;

    let stats = match user.role {
        Role::Customer => {
            let mine: Vec<Booking> = bookings
                .into_iter()
                .filter(|b| b.customer_id == user.id)
                .collect();
            dashboard::aggregate(Role::Customer, &mine, &[], None, 0, 0)
        }
        Role::Worker => {
            let mine: Vec<Booking> = bookings
                .into_iter()
                .filter(|b| b.worker_id.as_deref() == Some(user.id.as_str()))
                .collect();
            let reviews = {
                let db = state.db.lock().unwrap();
                queries::reviews_for_worker(&db, &user.id)
                    .map_err(|e| AppError::Internal(e).into_response())?
            };
            dashboard::aggregate(
                Role::Worker,
                &mine,
                &reviews,
                user.worker_profile.as_ref(),
                0,
                0,
            )
        }
        Role::Admin => {
            let (total_users, open_complaints) = {
                let db = state.db.lock().unwrap();
                (
                    queries::count_users(&db)
                        .map_err(|e| AppError::Internal(e).into_response())?,
                    queries::count_open_complaints(&db)
                        .map_err(|e| AppError::Internal(e).into_response())?,
                )
            };
            dashboard::aggregate(
                Role::Admin,
                &bookings,
                &[],
                None,
                total_users,
                open_complaints,
            )
        }
    };

    Ok(Json(stats))
}
