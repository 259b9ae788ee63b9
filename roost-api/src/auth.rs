use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use roost_core::{Gender, Role, Student};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    full_name: String,
    email: String,
    phone: Option<String>,
    gender: Gender,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    role: Role,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if req.full_name.trim().is_empty() {
        return Err(AppError::Validation("full name is required".to_string()));
    }
    let email = req.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::Validation("email is required".to_string()));
    }

    if state.students.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("email already registered".to_string()));
    }

    let password_hash = hash_password(&req.password)?;
    let student = Student::new(
        req.full_name.trim().to_string(),
        email,
        req.phone,
        req.gender,
        password_hash,
    );
    let saved = state.students.insert(student).await?;

    let token = issue_token(&state, saved.id, &saved.email, saved.role)?;
    Ok(Json(AuthResponse {
        token,
        role: saved.role,
    }))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = req.email.trim().to_lowercase();

    // One message for both failure modes, so login probes cannot tell a
    // missing account from a wrong password.
    let invalid = || AppError::Authentication("invalid email or password".to_string());

    let student = state
        .students
        .find_by_email(&email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &student.password_hash) {
        return Err(invalid());
    }

    let token = issue_token(&state, student.id, &student.email, student.role)?;
    Ok(Json(AuthResponse {
        token,
        role: student.role,
    }))
}

pub fn issue_token(
    state: &AppState,
    student_id: Uuid,
    email: &str,
    role: Role,
) -> Result<String, AppError> {
    let role = match role {
        Role::Student => "STUDENT",
        Role::Admin => "ADMIN",
    };
    let claims = Claims {
        sub: student_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration_seconds as i64)).timestamp()
            as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token encoding failed: {e}")))
}

fn hash_password(password: &str) -> Result<String, AppError> {
    if password.len() < 4 {
        return Err(AppError::Validation("password is too short".to_string()));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
