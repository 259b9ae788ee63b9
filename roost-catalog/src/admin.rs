use std::sync::Arc;

use roost_core::{CoreError, CoreResult, Gender};
use serde::Deserialize;
use uuid::Uuid;

use crate::hostel::Hostel;
use crate::repository::{HostelRepository, RoomRepository};
use crate::room::{MattressType, Room};

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertHostel {
    pub name: String,
    pub location: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertRoom {
    pub hostel_id: Uuid,
    pub room_number: String,
    pub capacity: u32,
    pub gender: Gender,
    pub mattress_type: MattressType,
    pub has_ac: bool,
    pub has_wifi: bool,
    pub price_minor: i64,
    pub floor_number: i32,
}

/// Catalog administration: hostel and room lifecycle, including the
/// denormalized per-hostel room count. Occupancy is never touched here;
/// that belongs to the booking core.
pub struct CatalogService {
    hostels: Arc<dyn HostelRepository>,
    rooms: Arc<dyn RoomRepository>,
}

impl CatalogService {
    pub fn new(hostels: Arc<dyn HostelRepository>, rooms: Arc<dyn RoomRepository>) -> Self {
        Self { hostels, rooms }
    }

    pub async fn list_hostels(&self, active: Option<bool>) -> CoreResult<Vec<Hostel>> {
        self.hostels.list(active).await
    }

    pub async fn create_hostel(&self, request: UpsertHostel) -> CoreResult<Hostel> {
        let hostel = Hostel::new(request.name, request.location, request.active);
        self.hostels.insert(hostel).await
    }

    pub async fn update_hostel(&self, id: Uuid, request: UpsertHostel) -> CoreResult<Hostel> {
        let mut hostel = self
            .hostels
            .find(id)
            .await?
            .ok_or(CoreError::NotFound("hostel"))?;
        hostel.name = request.name;
        hostel.location = request.location;
        hostel.active = request.active;
        self.hostels.update(hostel).await
    }

    pub async fn deactivate_hostel(&self, id: Uuid) -> CoreResult<()> {
        let mut hostel = self
            .hostels
            .find(id)
            .await?
            .ok_or(CoreError::NotFound("hostel"))?;
        hostel.active = false;
        self.hostels.update(hostel).await?;
        Ok(())
    }

    pub async fn list_rooms(&self, hostel_id: Option<Uuid>) -> CoreResult<Vec<Room>> {
        self.rooms.list(hostel_id).await
    }

    pub async fn create_room(&self, request: UpsertRoom) -> CoreResult<Room> {
        let mut hostel = self
            .hostels
            .find(request.hostel_id)
            .await?
            .ok_or(CoreError::NotFound("hostel"))?;

        let room = Room::new(
            hostel.id,
            request.room_number,
            request.capacity,
            request.gender,
            request.mattress_type,
            request.has_ac,
            request.has_wifi,
            request.price_minor,
            request.floor_number,
        );
        let saved = self.rooms.insert(room).await?;

        hostel.total_rooms += 1;
        self.hostels.update(hostel).await?;

        Ok(saved)
    }

    pub async fn update_room(&self, id: Uuid, request: UpsertRoom) -> CoreResult<Room> {
        let mut room = self
            .rooms
            .find(id)
            .await?
            .ok_or(CoreError::NotFound("room"))?;

        if request.capacity < room.occupancy {
            return Err(CoreError::capacity(
                "capacity cannot be less than current occupancy",
            ));
        }

        if room.hostel_id != request.hostel_id {
            let mut new_hostel = self
                .hostels
                .find(request.hostel_id)
                .await?
                .ok_or(CoreError::NotFound("hostel"))?;

            if let Some(mut old_hostel) = self.hostels.find(room.hostel_id).await? {
                old_hostel.total_rooms = old_hostel.total_rooms.saturating_sub(1);
                self.hostels.update(old_hostel).await?;
            }

            new_hostel.total_rooms += 1;
            room.hostel_id = new_hostel.id;
            self.hostels.update(new_hostel).await?;
        }

        room.room_number = request.room_number;
        room.capacity = request.capacity.max(1);
        room.gender = request.gender;
        room.mattress_type = request.mattress_type;
        room.has_ac = request.has_ac;
        room.has_wifi = request.has_wifi;
        room.price_minor = request.price_minor;
        room.floor_number = request.floor_number;
        room.recalculate_status();

        self.rooms.update(room).await
    }

    pub async fn delete_room(&self, id: Uuid) -> CoreResult<()> {
        let room = self
            .rooms
            .find(id)
            .await?
            .ok_or(CoreError::NotFound("room"))?;

        if room.occupancy > 0 {
            return Err(CoreError::conflict("cannot delete a room with occupants"));
        }

        self.rooms.delete(room.id).await?;

        if let Some(mut hostel) = self.hostels.find(room.hostel_id).await? {
            hostel.total_rooms = hostel.total_rooms.saturating_sub(1);
            self.hostels.update(hostel).await?;
        }

        Ok(())
    }
}
