use std::sync::Arc;

use roost_core::{CoreError, CoreResult};
use roost_catalog::{Room, RoomRepository, RoomStatus};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupancyDelta {
    /// +1: a booking takes a bed.
    Claim,
    /// -1: a cancellation or expiry releases one.
    Release,
}

/// The single primitive every occupancy mutation funnels through.
///
/// Read the room with its version, validate the delta, write back
/// occupancy + recomputed status + version+1 conditioned on the version
/// still matching. A lost race surfaces as `CoreError::VersionConflict`;
/// the guard performs zero retries of its own, so it stays a pure,
/// composable primitive. Retry budgets belong to callers.
pub struct OccupancyGuard {
    rooms: Arc<dyn RoomRepository>,
}

impl OccupancyGuard {
    pub fn new(rooms: Arc<dyn RoomRepository>) -> Self {
        Self { rooms }
    }

    pub async fn apply_delta(&self, room_id: Uuid, delta: OccupancyDelta) -> CoreResult<Room> {
        let room = self
            .rooms
            .find(room_id)
            .await?
            .ok_or(CoreError::NotFound("room"))?;
        let observed_version = room.version;

        let mut updated = room;
        match delta {
            OccupancyDelta::Claim => {
                // Re-validate: the room may have filled since it was selected.
                if updated.status != RoomStatus::Available {
                    return Err(CoreError::capacity(format!(
                        "room {} is no longer available",
                        updated.room_number
                    )));
                }
                updated.try_increment_occupancy()?;
            }
            OccupancyDelta::Release => {
                updated.try_decrement_occupancy()?;
            }
        }

        match self.rooms.update_versioned(updated, observed_version).await? {
            Some(committed) => Ok(committed),
            None => {
                tracing::debug!(room_id = %room_id, version = observed_version, "occupancy CAS lost the race");
                Err(CoreError::VersionConflict)
            }
        }
    }
}
