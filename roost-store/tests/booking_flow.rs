use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use roost_booking::{
    BookingLifecycle, BookingRepository, BookingStatus, ExpirationSweeper, PaymentRepository,
    PaymentStatus,
};
use roost_booking::lifecycle::ApplyRequest;
use roost_catalog::{
    Hostel, HostelRepository, MattressType, Room, RoomConstraints, RoomRepository, RoomStatus,
};
use roost_core::{Clock, CoreError, Gender, Student, StudentRepository};
use roost_store::MemoryStore;
use uuid::Uuid;

const HOLD_MINUTES: i64 = 30;

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

struct Fixture {
    store: Arc<MemoryStore>,
    students: Arc<dyn StudentRepository>,
    hostels: Arc<dyn HostelRepository>,
    rooms: Arc<dyn RoomRepository>,
    bookings: Arc<dyn BookingRepository>,
    payments: Arc<dyn PaymentRepository>,
    now: DateTime<Utc>,
}

impl Fixture {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            students: store.clone(),
            hostels: store.clone(),
            rooms: store.clone(),
            bookings: store.clone(),
            payments: store.clone(),
            now: Utc::now(),
            store,
        }
    }

    fn lifecycle(&self) -> Arc<BookingLifecycle> {
        Arc::new(BookingLifecycle::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            Arc::new(FixedClock(self.now)),
            Duration::minutes(HOLD_MINUTES),
            3,
        ))
    }

    async fn student(&self, gender: Gender) -> Student {
        let student = Student::new(
            "Asha Rao".to_string(),
            format!("{}@example.com", Uuid::new_v4()),
            None,
            gender,
            "hash".to_string(),
        );
        self.students.insert(student).await.unwrap()
    }

    async fn hostel(&self, active: bool) -> Hostel {
        let hostel = Hostel::new("North Wing".to_string(), None, active);
        self.hostels.insert(hostel).await.unwrap()
    }

    async fn room(&self, hostel_id: Uuid, capacity: u32, occupancy: u32) -> Room {
        let mut room = Room::new(
            hostel_id,
            format!("R-{}", &Uuid::new_v4().simple().to_string()[..8]),
            capacity,
            Gender::Female,
            MattressType::Normal,
            false,
            true,
            150_00,
            1,
        );
        room.occupancy = occupancy;
        room.recalculate_status();
        self.rooms.insert(room).await.unwrap()
    }
}

fn request() -> ApplyRequest {
    ApplyRequest {
        constraints: RoomConstraints {
            has_ac: false,
            has_wifi: true,
            mattress_type: MattressType::Normal,
        },
        special_requests: None,
    }
}

#[tokio::test]
async fn apply_fails_for_unknown_student() {
    let fx = Fixture::new();
    let lifecycle = fx.lifecycle();

    let err = lifecycle.apply(Uuid::new_v4(), request()).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound("student")));
}

#[tokio::test]
async fn apply_rejects_when_no_hostel_is_active() {
    let fx = Fixture::new();
    let hostel = fx.hostel(false).await;
    fx.room(hostel.id, 2, 0).await;
    let student = fx.student(Gender::Female).await;
    let lifecycle = fx.lifecycle();

    let view = lifecycle.apply(student.id, request()).await.unwrap();

    assert_eq!(view.status, BookingStatus::Rejected);
    assert!(view.room_number.is_none());
    assert!(view.payment_due_at.is_none());
    // Rejection is durable and carries no payment hold.
    let booking = fx.bookings.find(view.id).await.unwrap().unwrap();
    assert!(booking.room_id.is_none());
    assert!(fx.payments.find_by_booking(view.id).await.unwrap().is_none());
}

#[tokio::test]
async fn apply_reserves_least_filled_matching_room() {
    let fx = Fixture::new();
    let hostel = fx.hostel(true).await;
    let room = fx.room(hostel.id, 2, 1).await;
    let student = fx.student(Gender::Female).await;
    let lifecycle = fx.lifecycle();

    let view = lifecycle.apply(student.id, request()).await.unwrap();

    assert_eq!(view.status, BookingStatus::PendingPayment);
    assert_eq!(view.hostel_name.as_deref(), Some("North Wing"));
    assert_eq!(view.room_number.as_deref(), Some(room.room_number.as_str()));
    assert_eq!(view.payment_due_at, Some(fx.now + Duration::minutes(HOLD_MINUTES)));

    let stored = fx.rooms.find(room.id).await.unwrap().unwrap();
    assert_eq!(stored.occupancy, 2);
    assert_eq!(stored.status, RoomStatus::Full);
    assert_eq!(stored.version, room.version + 1);

    let hold = fx.payments.find_by_booking(view.id).await.unwrap().unwrap();
    assert_eq!(hold.status, PaymentStatus::Pending);
    assert_eq!(hold.amount_minor, 150_00);
    assert_eq!(hold.due_at, fx.now + Duration::minutes(HOLD_MINUTES));
}

#[tokio::test]
async fn gender_and_amenities_must_match_exactly() {
    let fx = Fixture::new();
    let hostel = fx.hostel(true).await;
    // Female room with WiFi and no AC; the male student below must not get it,
    // and neither must a female student asking for AC.
    fx.room(hostel.id, 2, 0).await;
    let male = fx.student(Gender::Male).await;
    let female = fx.student(Gender::Female).await;
    let lifecycle = fx.lifecycle();

    let view = lifecycle.apply(male.id, request()).await.unwrap();
    assert_eq!(view.status, BookingStatus::Rejected);

    let mut with_ac = request();
    with_ac.constraints.has_ac = true;
    let view = lifecycle.apply(female.id, with_ac).await.unwrap();
    assert_eq!(view.status, BookingStatus::Rejected);
}

#[tokio::test]
async fn allocation_prefers_lowest_fill_ratio() {
    let fx = Fixture::new();
    let hostel = fx.hostel(true).await;
    fx.room(hostel.id, 4, 3).await; // 0.75
    let least = fx.room(hostel.id, 4, 1).await; // 0.25
    fx.room(hostel.id, 2, 1).await; // 0.50
    let student = fx.student(Gender::Female).await;
    let lifecycle = fx.lifecycle();

    let view = lifecycle.apply(student.id, request()).await.unwrap();

    assert_eq!(view.room_number.as_deref(), Some(least.room_number.as_str()));
}

#[tokio::test]
async fn second_apply_conflicts_while_booking_is_active() {
    let fx = Fixture::new();
    let hostel = fx.hostel(true).await;
    fx.room(hostel.id, 2, 0).await;
    let student = fx.student(Gender::Female).await;
    let lifecycle = fx.lifecycle();

    lifecycle.apply(student.id, request()).await.unwrap();
    let err = lifecycle.apply(student.id, request()).await.unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
}

#[tokio::test]
async fn cancelling_a_pending_booking_restores_occupancy() {
    let fx = Fixture::new();
    let hostel = fx.hostel(true).await;
    let room = fx.room(hostel.id, 2, 1).await;
    let student = fx.student(Gender::Female).await;
    let lifecycle = fx.lifecycle();

    let view = lifecycle.apply(student.id, request()).await.unwrap();
    let cancelled = lifecycle
        .update_status(view.id, BookingStatus::Cancelled)
        .await
        .unwrap();

    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    let stored = fx.rooms.find(room.id).await.unwrap().unwrap();
    assert_eq!(stored.occupancy, room.occupancy);
    assert_eq!(stored.status, RoomStatus::Available);
    let hold = fx.payments.find_by_booking(view.id).await.unwrap().unwrap();
    assert_eq!(hold.status, PaymentStatus::Cancelled);
}

#[tokio::test]
async fn approval_keeps_the_room_claimed() {
    let fx = Fixture::new();
    let hostel = fx.hostel(true).await;
    let room = fx.room(hostel.id, 2, 0).await;
    let student = fx.student(Gender::Female).await;
    let lifecycle = fx.lifecycle();

    let view = lifecycle.apply(student.id, request()).await.unwrap();
    let approved = lifecycle
        .update_status(view.id, BookingStatus::Approved)
        .await
        .unwrap();

    assert_eq!(approved.status, BookingStatus::Approved);
    let stored = fx.rooms.find(room.id).await.unwrap().unwrap();
    assert_eq!(stored.occupancy, 1);

    // Cancelling an approved booking does not release occupancy; the room
    // release is tied to the PENDING_PAYMENT hold only.
    lifecycle
        .update_status(view.id, BookingStatus::Cancelled)
        .await
        .unwrap();
    let stored = fx.rooms.find(room.id).await.unwrap().unwrap();
    assert_eq!(stored.occupancy, 1);
}

#[tokio::test]
async fn terminal_bookings_are_not_updatable() {
    let fx = Fixture::new();
    let hostel = fx.hostel(true).await;
    fx.room(hostel.id, 2, 0).await;
    let student = fx.student(Gender::Female).await;
    let lifecycle = fx.lifecycle();

    let view = lifecycle.apply(student.id, request()).await.unwrap();
    lifecycle
        .update_status(view.id, BookingStatus::Cancelled)
        .await
        .unwrap();

    let err = lifecycle
        .update_status(view.id, BookingStatus::Approved)
        .await
        .unwrap_err();
    match err {
        CoreError::Conflict(msg) => assert!(msg.contains("not updatable")),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn only_approved_and_cancelled_may_be_requested() {
    let fx = Fixture::new();
    let hostel = fx.hostel(true).await;
    fx.room(hostel.id, 2, 0).await;
    let student = fx.student(Gender::Female).await;
    let lifecycle = fx.lifecycle();

    let view = lifecycle.apply(student.id, request()).await.unwrap();

    for invalid in [
        BookingStatus::PendingPayment,
        BookingStatus::Rejected,
        BookingStatus::Expired,
    ] {
        let err = lifecycle.update_status(view.id, invalid).await.unwrap_err();
        match err {
            CoreError::Conflict(msg) => assert!(msg.contains("invalid status transition")),
            other => panic!("expected conflict, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn concurrent_applies_for_the_last_bed_serialize() {
    let fx = Fixture::new();
    let hostel = fx.hostel(true).await;
    let room = fx.room(hostel.id, 1, 0).await;
    let a = fx.student(Gender::Female).await;
    let b = fx.student(Gender::Female).await;
    let lifecycle = fx.lifecycle();

    let (first, second) = tokio::join!(
        {
            let lc = lifecycle.clone();
            let id = a.id;
            tokio::spawn(async move { lc.apply(id, request()).await })
        },
        {
            let lc = lifecycle.clone();
            let id = b.id;
            tokio::spawn(async move { lc.apply(id, request()).await })
        },
    );
    // Exactly one apply wins the bed; the loser re-selects, finds the
    // room full, and lands on a durable REJECTED booking.
    let first = first.unwrap().unwrap();
    let second = second.unwrap().unwrap();
    let mut statuses = [first.status, second.status];
    statuses.sort_by_key(|s| *s == BookingStatus::Rejected);
    assert_eq!(
        statuses,
        [BookingStatus::PendingPayment, BookingStatus::Rejected]
    );

    let stored = fx.rooms.find(room.id).await.unwrap().unwrap();
    assert_eq!(stored.occupancy, 1);
    assert_eq!(stored.status, RoomStatus::Full);
}

#[tokio::test]
async fn expire_pending_reclaims_stale_bookings_once() {
    let fx = Fixture::new();
    let hostel = fx.hostel(true).await;
    let room = fx.room(hostel.id, 2, 0).await;
    let student = fx.student(Gender::Female).await;
    let lifecycle = fx.lifecycle();

    let view = lifecycle.apply(student.id, request()).await.unwrap();

    // Age the booking past the hold window.
    let mut booking = fx.bookings.find(view.id).await.unwrap().unwrap();
    booking.created_at = fx.now - Duration::minutes(HOLD_MINUTES + 1);
    fx.bookings.update(booking).await.unwrap();

    let cutoff = fx.now - Duration::minutes(HOLD_MINUTES);
    let expired = lifecycle.expire_pending(cutoff).await.unwrap();
    assert_eq!(expired, 1);

    let booking = fx.bookings.find(view.id).await.unwrap().unwrap();
    assert_eq!(booking.status, BookingStatus::Expired);
    let stored = fx.rooms.find(room.id).await.unwrap().unwrap();
    assert_eq!(stored.occupancy, 0);
    let hold = fx.payments.find_by_booking(view.id).await.unwrap().unwrap();
    assert_eq!(hold.status, PaymentStatus::Cancelled);

    // Second sweep with the same cutoff is a no-op.
    let expired = lifecycle.expire_pending(cutoff).await.unwrap();
    assert_eq!(expired, 0);
    let stored = fx.rooms.find(room.id).await.unwrap().unwrap();
    assert_eq!(stored.occupancy, 0);
}

#[tokio::test]
async fn fresh_pending_bookings_survive_the_sweep() {
    let fx = Fixture::new();
    let hostel = fx.hostel(true).await;
    fx.room(hostel.id, 2, 0).await;
    let student = fx.student(Gender::Female).await;
    let lifecycle = fx.lifecycle();

    let view = lifecycle.apply(student.id, request()).await.unwrap();

    let cutoff = fx.now - Duration::minutes(HOLD_MINUTES);
    let expired = lifecycle.expire_pending(cutoff).await.unwrap();
    assert_eq!(expired, 0);

    let booking = fx.bookings.find(view.id).await.unwrap().unwrap();
    assert_eq!(booking.status, BookingStatus::PendingPayment);
}

#[tokio::test]
async fn get_latest_returns_terminal_bookings_too() {
    let fx = Fixture::new();
    let hostel = fx.hostel(true).await;
    fx.room(hostel.id, 2, 0).await;
    let student = fx.student(Gender::Female).await;
    let lifecycle = fx.lifecycle();

    let err = lifecycle.get_latest(student.id).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound("booking")));

    let view = lifecycle.apply(student.id, request()).await.unwrap();
    lifecycle
        .update_status(view.id, BookingStatus::Cancelled)
        .await
        .unwrap();

    let latest = lifecycle.get_latest(student.id).await.unwrap();
    assert_eq!(latest.id, view.id);
    assert_eq!(latest.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn sweeper_tick_reclaims_and_counts() {
    let fx = Fixture::new();
    let hostel = fx.hostel(true).await;
    fx.room(hostel.id, 2, 0).await;
    let student = fx.student(Gender::Female).await;
    let lifecycle = fx.lifecycle();

    let view = lifecycle.apply(student.id, request()).await.unwrap();
    let mut booking = fx.bookings.find(view.id).await.unwrap().unwrap();
    booking.created_at = fx.now - Duration::minutes(HOLD_MINUTES + 5);
    fx.bookings.update(booking).await.unwrap();

    let sweeper = ExpirationSweeper::new(
        lifecycle.clone(),
        Arc::new(FixedClock(fx.now)),
        Duration::minutes(HOLD_MINUTES),
        std::time::Duration::from_millis(50),
    );

    assert_eq!(sweeper.sweep_once().await, Some(1));
    // The same tick repeated finds nothing left to reclaim.
    assert_eq!(sweeper.sweep_once().await, Some(0));
}

#[tokio::test]
async fn admin_list_joins_student_room_and_payment() {
    let fx = Fixture::new();
    let hostel = fx.hostel(true).await;
    fx.room(hostel.id, 2, 0).await;
    let student = fx.student(Gender::Female).await;
    let lifecycle = fx.lifecycle();

    let view = lifecycle.apply(student.id, request()).await.unwrap();

    let all = lifecycle.list(None).await.unwrap();
    assert_eq!(all.len(), 1);
    let row = &all[0];
    assert_eq!(row.id, view.id);
    assert_eq!(row.student_email.as_deref(), Some(student.email.as_str()));
    assert_eq!(row.hostel_name.as_deref(), Some("North Wing"));
    assert_eq!(row.payment_status, Some(PaymentStatus::Pending));

    let none = lifecycle.list(Some(BookingStatus::Expired)).await.unwrap();
    assert!(none.is_empty());
}
