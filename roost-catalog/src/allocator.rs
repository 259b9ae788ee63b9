use std::sync::Arc;

use roost_core::{CoreResult, Gender};

use crate::repository::{HostelRepository, RoomRepository};
use crate::room::{Room, RoomConstraints};

/// Selects a candidate room for a booking request.
///
/// Among exact matches, the room with the lowest fill ratio wins, spreading
/// load across rooms instead of packing one full. Ties go to the first
/// candidate in catalog iteration order: deterministic but arbitrary, not a
/// random choice.
pub struct RoomAllocator {
    hostels: Arc<dyn HostelRepository>,
    rooms: Arc<dyn RoomRepository>,
}

impl RoomAllocator {
    pub fn new(hostels: Arc<dyn HostelRepository>, rooms: Arc<dyn RoomRepository>) -> Self {
        Self { hostels, rooms }
    }

    pub async fn select(
        &self,
        gender: Gender,
        constraints: &RoomConstraints,
    ) -> CoreResult<Option<Room>> {
        if !self.hostels.any_active().await? {
            return Ok(None);
        }

        let candidates = self.rooms.find_matching(gender, constraints).await?;
        Ok(pick_least_filled(candidates))
    }
}

/// Strictly-less comparison keeps the first candidate on ties.
fn pick_least_filled(candidates: Vec<Room>) -> Option<Room> {
    let mut best: Option<Room> = None;
    let mut best_score = f64::MAX;
    for room in candidates {
        let score = room.fill_ratio();
        if score < best_score {
            best_score = score;
            best = Some(room);
        }
    }
    best
}
