use axum::{extract::State, routing::get, Extension, Json, Router};
use roost_core::{CoreError, Gender};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct ProfileResponse {
    id: Uuid,
    full_name: String,
    email: String,
    phone: Option<String>,
    gender: Gender,
}

#[derive(Debug, Deserialize)]
struct UpdateProfileRequest {
    full_name: String,
    phone: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>, AppError> {
    let student = state
        .students
        .find(user.id)
        .await?
        .ok_or(CoreError::NotFound("student"))?;

    Ok(Json(ProfileResponse {
        id: student.id,
        full_name: student.full_name,
        email: student.email,
        phone: student.phone,
        gender: student.gender,
    }))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    if req.full_name.trim().is_empty() {
        return Err(AppError::Validation("full name is required".to_string()));
    }

    let mut student = state
        .students
        .find(user.id)
        .await?
        .ok_or(CoreError::NotFound("student"))?;
    student.full_name = req.full_name.trim().to_string();
    student.phone = req.phone;

    let saved = state.students.update(student).await?;
    Ok(Json(ProfileResponse {
        id: saved.id,
        full_name: saved.full_name,
        email: saved.email,
        phone: saved.phone,
        gender: saved.gender,
    }))
}
