use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use roost_booking::lifecycle::{ApplyRequest, BookingView};
use roost_catalog::{MattressType, RoomConstraints};
use serde::Deserialize;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ApplyPayload {
    has_ac: bool,
    has_wifi: bool,
    mattress_type: MattressType,
    special_requests: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/apply", post(apply))
        .route("/booking", get(my_booking))
}

async fn apply(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ApplyPayload>,
) -> Result<Json<BookingView>, AppError> {
    if let Some(notes) = &payload.special_requests {
        if notes.len() > 500 {
            return Err(AppError::Validation(
                "special requests must be at most 500 characters".to_string(),
            ));
        }
    }

    let request = ApplyRequest {
        constraints: RoomConstraints {
            has_ac: payload.has_ac,
            has_wifi: payload.has_wifi,
            mattress_type: payload.mattress_type,
        },
        special_requests: payload.special_requests,
    };

    let view = state.lifecycle.apply(user.id, request).await?;
    Ok(Json(view))
}

async fn my_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<BookingView>, AppError> {
    let view = state.lifecycle.get_latest(user.id).await?;
    Ok(Json(view))
}
