use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use roost_core::{Clock, CoreError, CoreResult, StudentRepository};
use roost_catalog::{HostelRepository, Room, RoomAllocator, RoomConstraints, RoomRepository};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Booking, BookingStatus, PaymentHold, PaymentStatus};
use crate::occupancy::{OccupancyDelta, OccupancyGuard};
use crate::repository::{BookingRepository, PaymentRepository};

#[derive(Debug, Clone, Deserialize)]
pub struct ApplyRequest {
    pub constraints: RoomConstraints,
    pub special_requests: Option<String>,
}

/// What the student-facing surface sees of a booking.
#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    pub id: Uuid,
    pub status: BookingStatus,
    pub hostel_name: Option<String>,
    pub room_number: Option<String>,
    pub payment_due_at: Option<DateTime<Utc>>,
}

/// The admin listing joins booking, student, room, hostel and payment.
#[derive(Debug, Clone, Serialize)]
pub struct AdminBookingView {
    pub id: Uuid,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub special_requests: Option<String>,
    pub student_id: Uuid,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
    pub hostel_name: Option<String>,
    pub room_number: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_amount_minor: Option<i64>,
    pub payment_due_at: Option<DateTime<Utc>>,
}

/// Owns the booking state machine and its transactional invariants.
///
/// Allocation failures never escape `apply`: they become a durable
/// REJECTED booking, so the student always gets a queryable result.
pub struct BookingLifecycle {
    students: Arc<dyn StudentRepository>,
    hostels: Arc<dyn HostelRepository>,
    rooms: Arc<dyn RoomRepository>,
    bookings: Arc<dyn BookingRepository>,
    payments: Arc<dyn PaymentRepository>,
    allocator: RoomAllocator,
    guard: OccupancyGuard,
    clock: Arc<dyn Clock>,
    hold_duration: Duration,
    allocation_retries: u32,
}

impl BookingLifecycle {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        students: Arc<dyn StudentRepository>,
        hostels: Arc<dyn HostelRepository>,
        rooms: Arc<dyn RoomRepository>,
        bookings: Arc<dyn BookingRepository>,
        payments: Arc<dyn PaymentRepository>,
        clock: Arc<dyn Clock>,
        hold_duration: Duration,
        allocation_retries: u32,
    ) -> Self {
        let allocator = RoomAllocator::new(hostels.clone(), rooms.clone());
        let guard = OccupancyGuard::new(rooms.clone());
        Self {
            students,
            hostels,
            rooms,
            bookings,
            payments,
            allocator,
            guard,
            clock,
            hold_duration,
            allocation_retries: allocation_retries.max(1),
        }
    }

    /// Apply for a room.
    ///
    /// The "no active booking" check and the booking insert are a read
    /// followed by a write with no covering lock, so two simultaneous
    /// applies from one student can both pass the check. The room-level
    /// CAS still prevents any double allocation of capacity.
    pub async fn apply(&self, student_id: Uuid, request: ApplyRequest) -> CoreResult<BookingView> {
        let student = self
            .students
            .find(student_id)
            .await?
            .ok_or(CoreError::NotFound("student"))?;

        if self.bookings.active_for_student(student_id).await?.is_some() {
            return Err(CoreError::conflict("student already has an active booking"));
        }

        let claimed = self.claim_room(&student.gender, &request.constraints).await?;

        let Some(room) = claimed else {
            let rejected = Booking::new(
                student_id,
                None,
                BookingStatus::Rejected,
                request.special_requests,
            );
            let saved = self.bookings.insert(rejected).await?;
            tracing::info!(student_id = %student_id, booking_id = %saved.id, "no room available, booking rejected");
            return Ok(BookingView {
                id: saved.id,
                status: saved.status,
                hostel_name: None,
                room_number: None,
                payment_due_at: None,
            });
        };

        let booking = Booking::new(
            student_id,
            Some(room.id),
            BookingStatus::PendingPayment,
            request.special_requests,
        );
        let saved = self.bookings.insert(booking).await?;

        let due_at = self.clock.now() + self.hold_duration;
        let hold = PaymentHold::new(saved.id, student_id, room.price_minor, due_at);
        self.payments.insert(hold).await?;

        let hostel_name = self
            .hostels
            .find(room.hostel_id)
            .await?
            .map(|h| h.name);

        tracing::info!(
            student_id = %student_id,
            booking_id = %saved.id,
            room = %room.room_number,
            due_at = %due_at,
            "room reserved pending payment"
        );

        Ok(BookingView {
            id: saved.id,
            status: saved.status,
            hostel_name,
            room_number: Some(room.room_number),
            payment_due_at: Some(due_at),
        })
    }

    /// Select-and-claim loop: each version conflict or capacity miss
    /// re-runs selection, since the previously chosen room may have filled.
    /// The attempt count is bounded; exhaustion means "no room".
    async fn claim_room(
        &self,
        gender: &roost_core::Gender,
        constraints: &RoomConstraints,
    ) -> CoreResult<Option<Room>> {
        for attempt in 0..self.allocation_retries {
            let Some(candidate) = self.allocator.select(*gender, constraints).await? else {
                return Ok(None);
            };

            match self
                .guard
                .apply_delta(candidate.id, OccupancyDelta::Claim)
                .await
            {
                Ok(room) => return Ok(Some(room)),
                Err(CoreError::VersionConflict) | Err(CoreError::Capacity(_)) => {
                    tracing::debug!(room_id = %candidate.id, attempt, "claim contended, re-selecting");
                }
                Err(other) => return Err(other),
            }
        }
        Ok(None)
    }

    /// Admin transition: only APPROVED and CANCELLED may be requested, and
    /// only on a non-terminal booking. Cancelling a pending booking frees
    /// the held room and cancels its payment hold; approval changes no
    /// occupancy (the bed was claimed at apply time).
    pub async fn update_status(
        &self,
        booking_id: Uuid,
        new_status: BookingStatus,
    ) -> CoreResult<BookingView> {
        let mut booking = self
            .bookings
            .find(booking_id)
            .await?
            .ok_or(CoreError::NotFound("booking"))?;

        let current = booking.status;
        if current.is_terminal() {
            return Err(CoreError::conflict("booking is not updatable"));
        }
        if !matches!(new_status, BookingStatus::Approved | BookingStatus::Cancelled) {
            return Err(CoreError::conflict("invalid status transition"));
        }

        if new_status == BookingStatus::Cancelled && current == BookingStatus::PendingPayment {
            if let Some(room_id) = booking.room_id {
                self.release_room(room_id).await?;
            }
            self.cancel_hold(booking.id).await?;
        }

        booking.update_status(new_status);
        let saved = self.bookings.update(booking).await?;
        tracing::info!(booking_id = %saved.id, status = ?saved.status, "booking status updated");
        self.view(saved).await
    }

    /// Most recently created booking for the student, in any status.
    pub async fn get_latest(&self, student_id: Uuid) -> CoreResult<BookingView> {
        let booking = self
            .bookings
            .latest_for_student(student_id)
            .await?
            .ok_or(CoreError::NotFound("booking"))?;
        self.view(booking).await
    }

    /// Reclaim PENDING_PAYMENT bookings created before the cutoff.
    ///
    /// Each booking's status is re-read before acting: a cancellation or
    /// approval that landed between the scan and this iteration makes the
    /// booking a no-op, which is what keeps repeated sweeps idempotent.
    /// A failure on one booking is logged and skipped; the next tick will
    /// see it again.
    pub async fn expire_pending(&self, cutoff: DateTime<Utc>) -> CoreResult<usize> {
        let stale = self.bookings.pending_created_before(cutoff).await?;

        let mut expired = 0;
        for booking in stale {
            let Some(current) = self.bookings.find(booking.id).await? else {
                continue;
            };
            if current.status != BookingStatus::PendingPayment {
                continue;
            }

            match self.expire_one(current).await {
                Ok(()) => expired += 1,
                Err(err) => {
                    tracing::warn!(booking_id = %booking.id, error = %err, "failed to expire booking, leaving for next sweep");
                }
            }
        }

        Ok(expired)
    }

    async fn expire_one(&self, mut booking: Booking) -> CoreResult<()> {
        if let Some(room_id) = booking.room_id {
            self.release_room(room_id).await?;
        }

        booking.update_status(BookingStatus::Expired);
        let saved = self.bookings.update(booking).await?;
        self.cancel_hold(saved.id).await?;

        tracing::info!(booking_id = %saved.id, "pending booking expired, room released");
        Ok(())
    }

    /// Releases are retried on version conflicts with the same bound as
    /// claims; a release can race an apply targeting the same room.
    async fn release_room(&self, room_id: Uuid) -> CoreResult<Room> {
        let mut attempt = 0;
        loop {
            match self.guard.apply_delta(room_id, OccupancyDelta::Release).await {
                Err(CoreError::VersionConflict) if attempt + 1 < self.allocation_retries => {
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn cancel_hold(&self, booking_id: Uuid) -> CoreResult<()> {
        if let Some(mut hold) = self.payments.find_by_booking(booking_id).await? {
            hold.cancel();
            self.payments.update(hold).await?;
        }
        Ok(())
    }

    /// Admin listing with student, room, hostel and payment detail.
    pub async fn list(&self, status: Option<BookingStatus>) -> CoreResult<Vec<AdminBookingView>> {
        let bookings = self.bookings.list(status).await?;

        let mut views = Vec::with_capacity(bookings.len());
        for booking in bookings {
            views.push(self.admin_view(booking).await?);
        }
        Ok(views)
    }

    pub async fn admin_view_of(&self, booking_id: Uuid) -> CoreResult<AdminBookingView> {
        let booking = self
            .bookings
            .find(booking_id)
            .await?
            .ok_or(CoreError::NotFound("booking"))?;
        self.admin_view(booking).await
    }

    async fn view(&self, booking: Booking) -> CoreResult<BookingView> {
        let (hostel_name, room_number) = self.room_detail(booking.room_id).await?;
        let payment_due_at = self
            .payments
            .find_by_booking(booking.id)
            .await?
            .map(|p| p.due_at);

        Ok(BookingView {
            id: booking.id,
            status: booking.status,
            hostel_name,
            room_number,
            payment_due_at,
        })
    }

    async fn admin_view(&self, booking: Booking) -> CoreResult<AdminBookingView> {
        let (hostel_name, room_number) = self.room_detail(booking.room_id).await?;
        let student = self.students.find(booking.student_id).await?;
        let payment = self.payments.find_by_booking(booking.id).await?;

        Ok(AdminBookingView {
            id: booking.id,
            status: booking.status,
            created_at: booking.created_at,
            special_requests: booking.special_requests,
            student_id: booking.student_id,
            student_name: student.as_ref().map(|s| s.full_name.clone()),
            student_email: student.map(|s| s.email),
            hostel_name,
            room_number,
            payment_status: payment.as_ref().map(|p| p.status),
            payment_amount_minor: payment.as_ref().map(|p| p.amount_minor),
            payment_due_at: payment.map(|p| p.due_at),
        })
    }

    async fn room_detail(
        &self,
        room_id: Option<Uuid>,
    ) -> CoreResult<(Option<String>, Option<String>)> {
        let Some(room_id) = room_id else {
            return Ok((None, None));
        };
        let Some(room) = self.rooms.find(room_id).await? else {
            return Ok((None, None));
        };
        let hostel_name = self.hostels.find(room.hostel_id).await?.map(|h| h.name);
        Ok((hostel_name, Some(room.room_number)))
    }
}
