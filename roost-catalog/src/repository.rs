use async_trait::async_trait;
use roost_core::{CoreResult, Gender};
use uuid::Uuid;

use crate::hostel::Hostel;
use crate::room::{Room, RoomConstraints};

#[async_trait]
pub trait HostelRepository: Send + Sync {
    async fn insert(&self, hostel: Hostel) -> CoreResult<Hostel>;

    async fn find(&self, id: Uuid) -> CoreResult<Option<Hostel>>;

    async fn list(&self, active: Option<bool>) -> CoreResult<Vec<Hostel>>;

    async fn update(&self, hostel: Hostel) -> CoreResult<Hostel>;

    /// True if at least one hostel is accepting bookings. Allocation
    /// short-circuits to "no room" when this is false.
    async fn any_active(&self) -> CoreResult<bool>;
}

#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn insert(&self, room: Room) -> CoreResult<Room>;

    async fn find(&self, id: Uuid) -> CoreResult<Option<Room>>;

    async fn list(&self, hostel_id: Option<Uuid>) -> CoreResult<Vec<Room>>;

    /// Unconditional write, used by catalog administration only. Booking
    /// paths must go through `update_versioned`.
    async fn update(&self, room: Room) -> CoreResult<Room>;

    async fn delete(&self, id: Uuid) -> CoreResult<()>;

    /// AVAILABLE rooms whose gender and amenity attributes exactly match,
    /// in stable catalog iteration order.
    async fn find_matching(
        &self,
        gender: Gender,
        constraints: &RoomConstraints,
    ) -> CoreResult<Vec<Room>>;

    /// Compare-and-swap commit: writes the room back with `version + 1`
    /// only if the stored version still equals `expected_version`.
    /// Returns the committed record, or `None` when another writer got
    /// there first.
    async fn update_versioned(
        &self,
        room: Room,
        expected_version: u64,
    ) -> CoreResult<Option<Room>>;
}
