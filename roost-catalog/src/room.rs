use chrono::{DateTime, Utc};
use roost_core::{CoreError, CoreResult, Gender};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Derived from occupancy vs capacity, never set independently.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Available,
    Full,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MattressType {
    Normal,
    Orthopedic,
}

/// Amenity constraints a student applies with. Matching is exact: a room
/// with AC does not satisfy a request without it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomConstraints {
    pub has_ac: bool,
    pub has_wifi: bool,
    pub mattress_type: MattressType,
}

/// A bookable room. `occupancy` and `version` are the only fields the
/// booking core mutates, and only through the versioned store write:
/// `version` backs the optimistic compare-and-swap, and `status` is
/// recomputed on every occupancy change.
///
/// Invariant: `0 <= occupancy <= capacity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub hostel_id: Uuid,
    pub room_number: String,
    pub capacity: u32,
    pub occupancy: u32,
    pub gender: Gender,
    pub mattress_type: MattressType,
    pub has_ac: bool,
    pub has_wifi: bool,
    pub status: RoomStatus,
    pub price_minor: i64,
    pub floor_number: i32,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        hostel_id: Uuid,
        room_number: String,
        capacity: u32,
        gender: Gender,
        mattress_type: MattressType,
        has_ac: bool,
        has_wifi: bool,
        price_minor: i64,
        floor_number: i32,
    ) -> Self {
        let now = Utc::now();
        let mut room = Self {
            id: Uuid::new_v4(),
            hostel_id,
            room_number,
            capacity: capacity.max(1),
            occupancy: 0,
            gender,
            mattress_type,
            has_ac,
            has_wifi,
            status: RoomStatus::Available,
            price_minor,
            floor_number,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        room.recalculate_status();
        room
    }

    /// Status is a pure function of occupancy and capacity. Call after
    /// every occupancy or capacity change.
    pub fn recalculate_status(&mut self) {
        self.status = if self.occupancy >= self.capacity {
            RoomStatus::Full
        } else {
            RoomStatus::Available
        };
    }

    pub fn try_increment_occupancy(&mut self) -> CoreResult<()> {
        if self.occupancy >= self.capacity {
            return Err(CoreError::capacity(format!(
                "room {} is full",
                self.room_number
            )));
        }
        self.occupancy += 1;
        self.recalculate_status();
        Ok(())
    }

    pub fn try_decrement_occupancy(&mut self) -> CoreResult<()> {
        if self.occupancy == 0 {
            return Err(CoreError::capacity(format!(
                "room {} occupancy is already zero",
                self.room_number
            )));
        }
        self.occupancy -= 1;
        self.recalculate_status();
        Ok(())
    }

    /// Fraction of the room already occupied; allocation favours the
    /// lowest ratio to spread load across rooms.
    pub fn fill_ratio(&self) -> f64 {
        self.occupancy as f64 / self.capacity.max(1) as f64
    }

    pub fn matches(&self, gender: Gender, constraints: &RoomConstraints) -> bool {
        self.gender == gender
            && self.has_ac == constraints.has_ac
            && self.has_wifi == constraints.has_wifi
            && self.mattress_type == constraints.mattress_type
    }
}
