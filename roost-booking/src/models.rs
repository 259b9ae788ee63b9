use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking status in the lifecycle.
///
/// PENDING_PAYMENT and APPROVED are the two "active" states; a student may
/// hold at most one active booking at a time. REJECTED, EXPIRED and
/// CANCELLED are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    PendingPayment,
    Approved,
    Rejected,
    Expired,
    Cancelled,
}

impl BookingStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::PendingPayment | Self::Approved)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Expired | Self::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Cancelled,
    /// Settlement is performed by an external payment system; this core
    /// only ever records the due amount and due time.
    Settled,
}

/// A booking record. `room_id` is `None` only for the REJECTED case where
/// no room could be allocated. `created_at` is immutable and drives the
/// expiration cutoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub student_id: Uuid,
    pub room_id: Option<Uuid>,
    pub status: BookingStatus,
    pub special_requests: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        student_id: Uuid,
        room_id: Option<Uuid>,
        status: BookingStatus,
        special_requests: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            student_id,
            room_id,
            status,
            special_requests,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update_status(&mut self, new_status: BookingStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }
}

/// Payment hold attached 1:1 to a PENDING_PAYMENT booking. The amount is
/// copied from the room price at allocation time (zero for unpriced rooms).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentHold {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub student_id: Uuid,
    pub amount_minor: i64,
    pub status: PaymentStatus,
    pub due_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentHold {
    pub fn new(booking_id: Uuid, student_id: Uuid, amount_minor: i64, due_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            booking_id,
            student_id,
            amount_minor,
            status: PaymentStatus::Pending,
            due_at,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn cancel(&mut self) {
        self.status = PaymentStatus::Cancelled;
        self.updated_at = Utc::now();
    }
}
