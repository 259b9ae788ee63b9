use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Student id as a UUID string.
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: usize,
}

/// The verified caller, injected into request extensions by the auth
/// middleware below.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

fn verify(secret: &str, req: &Request) -> Result<Claims, StatusCode> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;

    Ok(token_data.claims)
}

fn auth_user(claims: Claims) -> Result<AuthUser, StatusCode> {
    let id = Uuid::parse_str(&claims.sub).map_err(|_| StatusCode::UNAUTHORIZED)?;
    Ok(AuthUser {
        id,
        email: claims.email,
        role: claims.role,
    })
}

pub async fn student_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims = verify(&state.auth.secret, &req)?;
    if claims.role != "STUDENT" {
        return Err(StatusCode::FORBIDDEN);
    }
    req.extensions_mut().insert(auth_user(claims)?);
    Ok(next.run(req).await)
}

pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims = verify(&state.auth.secret, &req)?;
    if claims.role != "ADMIN" {
        return Err(StatusCode::FORBIDDEN);
    }
    req.extensions_mut().insert(auth_user(claims)?);
    Ok(next.run(req).await)
}
