use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::authenticate;
use crate::models::{Address, Role};
use crate::state::AppState;

// POST /api/addresses
#[derive(Deserialize)]
pub struct CreateAddressRequest {
    #[serde(default)]
    pub label: String,
    pub line: String,
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateAddressRequest>,
) -> Result<Json<Address>, Response> {
    let user = authenticate(&headers, &state)?;
    if user.role != Role::Customer {
        return Err(AppError::Unauthorized.into_response());
    }
    if body.line.trim().is_empty() {
        return Err(AppError::Validation("address line must not be empty".to_string())
            .into_response());
    }

    let address = Address {
        id: Uuid::new_v4().to_string(),
        customer_id: user.id,
        label: body.label.trim().to_string(),
        line: body.line.trim().to_string(),
    };
    {
        let db = state.db.lock().unwrap();
        queries::save_address(&db, &address.id, &address.customer_id, &address.label, &address.line)
            .map_err(|e| AppError::Internal(e).into_response())?;
    }
    Ok(Json(address))
}

// GET /api/addresses
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Address>>, Response> {
    let user = authenticate(&headers, &state)?;
    if user.role != Role::Customer {
        return Err(AppError::Unauthorized.into_response());
    }

    let addresses = {
        let db = state.db.lock().unwrap();
        queries::list_addresses(&db, &user.id).map_err(|e| AppError::Internal(e).into_response())?
    };
    Ok(Json(addresses))
}
