use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roost_core::CoreResult;
use uuid::Uuid;

use crate::models::{Booking, BookingStatus, PaymentHold};

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, booking: Booking) -> CoreResult<Booking>;

    async fn find(&self, id: Uuid) -> CoreResult<Option<Booking>>;

    async fn update(&self, booking: Booking) -> CoreResult<Booking>;

    /// Most recently created booking for the student, in any status.
    async fn latest_for_student(&self, student_id: Uuid) -> CoreResult<Option<Booking>>;

    /// Any booking in an active status (PENDING_PAYMENT or APPROVED).
    async fn active_for_student(&self, student_id: Uuid) -> CoreResult<Option<Booking>>;

    /// PENDING_PAYMENT bookings created strictly before the cutoff, the
    /// expiration sweep's work list.
    async fn pending_created_before(&self, cutoff: DateTime<Utc>) -> CoreResult<Vec<Booking>>;

    async fn list(&self, status: Option<BookingStatus>) -> CoreResult<Vec<Booking>>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn insert(&self, hold: PaymentHold) -> CoreResult<PaymentHold>;

    async fn find_by_booking(&self, booking_id: Uuid) -> CoreResult<Option<PaymentHold>>;

    async fn update(&self, hold: PaymentHold) -> CoreResult<PaymentHold>;
}
