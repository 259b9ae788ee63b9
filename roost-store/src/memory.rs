use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roost_booking::{Booking, BookingRepository, BookingStatus, PaymentHold, PaymentRepository};
use roost_catalog::{Hostel, HostelRepository, Room, RoomConstraints, RoomRepository, RoomStatus};
use roost_core::{CoreError, CoreResult, Gender, Student, StudentRepository};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory store backing every repository trait.
///
/// The room table is the only one needing coordinated mutation: occupancy
/// commits go through `update_versioned`, which holds the write lock for
/// the compare-and-swap so exactly one writer wins a given version.
/// Listing order is by creation time, which stands in for catalog
/// iteration order and keeps allocation tie-breaks deterministic.
#[derive(Default)]
pub struct MemoryStore {
    students: RwLock<HashMap<Uuid, Student>>,
    hostels: RwLock<HashMap<Uuid, Hostel>>,
    rooms: RwLock<HashMap<Uuid, Room>>,
    bookings: RwLock<HashMap<Uuid, Booking>>,
    payments: RwLock<HashMap<Uuid, PaymentHold>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn by_created<T>(items: &mut [T], created_at: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by_key(created_at);
}

#[async_trait]
impl StudentRepository for MemoryStore {
    async fn insert(&self, student: Student) -> CoreResult<Student> {
        let mut students = self.students.write().await;
        students.insert(student.id, student.clone());
        Ok(student)
    }

    async fn find(&self, id: Uuid) -> CoreResult<Option<Student>> {
        Ok(self.students.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<Student>> {
        Ok(self
            .students
            .read()
            .await
            .values()
            .find(|s| s.email == email)
            .cloned())
    }

    async fn update(&self, mut student: Student) -> CoreResult<Student> {
        let mut students = self.students.write().await;
        if !students.contains_key(&student.id) {
            return Err(CoreError::NotFound("student"));
        }
        student.updated_at = Utc::now();
        students.insert(student.id, student.clone());
        Ok(student)
    }
}

#[async_trait]
impl HostelRepository for MemoryStore {
    async fn insert(&self, hostel: Hostel) -> CoreResult<Hostel> {
        let mut hostels = self.hostels.write().await;
        hostels.insert(hostel.id, hostel.clone());
        Ok(hostel)
    }

    async fn find(&self, id: Uuid) -> CoreResult<Option<Hostel>> {
        Ok(self.hostels.read().await.get(&id).cloned())
    }

    async fn list(&self, active: Option<bool>) -> CoreResult<Vec<Hostel>> {
        let hostels = self.hostels.read().await;
        let mut out: Vec<Hostel> = hostels
            .values()
            .filter(|h| active.is_none_or(|a| h.active == a))
            .cloned()
            .collect();
        by_created(&mut out, |h| h.created_at);
        Ok(out)
    }

    async fn update(&self, mut hostel: Hostel) -> CoreResult<Hostel> {
        let mut hostels = self.hostels.write().await;
        if !hostels.contains_key(&hostel.id) {
            return Err(CoreError::NotFound("hostel"));
        }
        hostel.updated_at = Utc::now();
        hostels.insert(hostel.id, hostel.clone());
        Ok(hostel)
    }

    async fn any_active(&self) -> CoreResult<bool> {
        Ok(self.hostels.read().await.values().any(|h| h.active))
    }
}

#[async_trait]
impl RoomRepository for MemoryStore {
    async fn insert(&self, room: Room) -> CoreResult<Room> {
        let mut rooms = self.rooms.write().await;
        rooms.insert(room.id, room.clone());
        Ok(room)
    }

    async fn find(&self, id: Uuid) -> CoreResult<Option<Room>> {
        Ok(self.rooms.read().await.get(&id).cloned())
    }

    async fn list(&self, hostel_id: Option<Uuid>) -> CoreResult<Vec<Room>> {
        let rooms = self.rooms.read().await;
        let mut out: Vec<Room> = rooms
            .values()
            .filter(|r| hostel_id.is_none_or(|h| r.hostel_id == h))
            .cloned()
            .collect();
        by_created(&mut out, |r| r.created_at);
        Ok(out)
    }

    async fn update(&self, mut room: Room) -> CoreResult<Room> {
        let mut rooms = self.rooms.write().await;
        if !rooms.contains_key(&room.id) {
            return Err(CoreError::NotFound("room"));
        }
        room.updated_at = Utc::now();
        rooms.insert(room.id, room.clone());
        Ok(room)
    }

    async fn delete(&self, id: Uuid) -> CoreResult<()> {
        let mut rooms = self.rooms.write().await;
        rooms
            .remove(&id)
            .map(|_| ())
            .ok_or(CoreError::NotFound("room"))
    }

    async fn find_matching(
        &self,
        gender: Gender,
        constraints: &RoomConstraints,
    ) -> CoreResult<Vec<Room>> {
        let rooms = self.rooms.read().await;
        let mut out: Vec<Room> = rooms
            .values()
            .filter(|r| r.status == RoomStatus::Available && r.matches(gender, constraints))
            .cloned()
            .collect();
        by_created(&mut out, |r| r.created_at);
        Ok(out)
    }

    async fn update_versioned(
        &self,
        room: Room,
        expected_version: u64,
    ) -> CoreResult<Option<Room>> {
        let mut rooms = self.rooms.write().await;
        let stored = rooms.get_mut(&room.id).ok_or(CoreError::NotFound("room"))?;
        if stored.version != expected_version {
            return Ok(None);
        }
        let mut committed = room;
        committed.version = expected_version + 1;
        committed.updated_at = Utc::now();
        *stored = committed.clone();
        Ok(Some(committed))
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn insert(&self, booking: Booking) -> CoreResult<Booking> {
        let mut bookings = self.bookings.write().await;
        bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn find(&self, id: Uuid) -> CoreResult<Option<Booking>> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn update(&self, mut booking: Booking) -> CoreResult<Booking> {
        let mut bookings = self.bookings.write().await;
        if !bookings.contains_key(&booking.id) {
            return Err(CoreError::NotFound("booking"));
        }
        booking.updated_at = Utc::now();
        bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn latest_for_student(&self, student_id: Uuid) -> CoreResult<Option<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .values()
            .filter(|b| b.student_id == student_id)
            .max_by_key(|b| (b.created_at, b.id))
            .cloned())
    }

    async fn active_for_student(&self, student_id: Uuid) -> CoreResult<Option<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .values()
            .find(|b| b.student_id == student_id && b.status.is_active())
            .cloned())
    }

    async fn pending_created_before(&self, cutoff: DateTime<Utc>) -> CoreResult<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        let mut out: Vec<Booking> = bookings
            .values()
            .filter(|b| b.status == BookingStatus::PendingPayment && b.created_at < cutoff)
            .cloned()
            .collect();
        by_created(&mut out, |b| b.created_at);
        Ok(out)
    }

    async fn list(&self, status: Option<BookingStatus>) -> CoreResult<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        let mut out: Vec<Booking> = bookings
            .values()
            .filter(|b| status.is_none_or(|s| b.status == s))
            .cloned()
            .collect();
        by_created(&mut out, |b| b.created_at);
        Ok(out)
    }
}

#[async_trait]
impl PaymentRepository for MemoryStore {
    async fn insert(&self, hold: PaymentHold) -> CoreResult<PaymentHold> {
        let mut payments = self.payments.write().await;
        payments.insert(hold.id, hold.clone());
        Ok(hold)
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> CoreResult<Option<PaymentHold>> {
        Ok(self
            .payments
            .read()
            .await
            .values()
            .find(|p| p.booking_id == booking_id)
            .cloned())
    }

    async fn update(&self, mut hold: PaymentHold) -> CoreResult<PaymentHold> {
        let mut payments = self.payments.write().await;
        if !payments.contains_key(&hold.id) {
            return Err(CoreError::NotFound("payment"));
        }
        hold.updated_at = Utc::now();
        payments.insert(hold.id, hold.clone());
        Ok(hold)
    }
}
