use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use roost_booking::lifecycle::AdminBookingView;
use roost_booking::BookingStatus;
use roost_catalog::{Hostel, Room, UpsertHostel, UpsertRoom};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_bookings))
        .route("/bookings/{id}/status", axum::routing::patch(update_booking_status))
        .route("/hostels", get(list_hostels).post(create_hostel))
        .route("/hostels/{id}", axum::routing::put(update_hostel).delete(deactivate_hostel))
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/{id}", axum::routing::put(update_room).delete(delete_room))
}

#[derive(Debug, Deserialize)]
struct BookingListQuery {
    status: Option<BookingStatus>,
}

async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Vec<AdminBookingView>>, AppError> {
    let views = state.lifecycle.list(query.status).await?;
    Ok(Json(views))
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    status: BookingStatus,
}

async fn update_booking_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<AdminBookingView>, AppError> {
    state.lifecycle.update_status(id, req.status).await?;
    let view = state.lifecycle.admin_view_of(id).await?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
struct HostelListQuery {
    active: Option<bool>,
}

async fn list_hostels(
    State(state): State<AppState>,
    Query(query): Query<HostelListQuery>,
) -> Result<Json<Vec<Hostel>>, AppError> {
    let hostels = state.catalog.list_hostels(query.active).await?;
    Ok(Json(hostels))
}

async fn create_hostel(
    State(state): State<AppState>,
    Json(req): Json<UpsertHostel>,
) -> Result<Json<Hostel>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("hostel name is required".to_string()));
    }
    let hostel = state.catalog.create_hostel(req).await?;
    Ok(Json(hostel))
}

async fn update_hostel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpsertHostel>,
) -> Result<Json<Hostel>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("hostel name is required".to_string()));
    }
    let hostel = state.catalog.update_hostel(id, req).await?;
    Ok(Json(hostel))
}

async fn deactivate_hostel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.catalog.deactivate_hostel(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct RoomListQuery {
    hostel_id: Option<Uuid>,
}

async fn list_rooms(
    State(state): State<AppState>,
    Query(query): Query<RoomListQuery>,
) -> Result<Json<Vec<Room>>, AppError> {
    let rooms = state.catalog.list_rooms(query.hostel_id).await?;
    Ok(Json(rooms))
}

async fn create_room(
    State(state): State<AppState>,
    Json(req): Json<UpsertRoom>,
) -> Result<Json<Room>, AppError> {
    if req.capacity == 0 {
        return Err(AppError::Validation(
            "room capacity must be at least 1".to_string(),
        ));
    }
    let room = state.catalog.create_room(req).await?;
    Ok(Json(room))
}

async fn update_room(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpsertRoom>,
) -> Result<Json<Room>, AppError> {
    if req.capacity == 0 {
        return Err(AppError::Validation(
            "room capacity must be at least 1".to_string(),
        ));
    }
    let room = state.catalog.update_room(id, req).await?;
    Ok(Json(room))
}

async fn delete_room(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.catalog.delete_room(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
