use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A hostel building. `total_rooms` is denormalized and maintained by the
/// catalog administration paths; the booking core only ever reads `active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hostel {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub total_rooms: u32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Hostel {
    pub fn new(name: String, location: Option<String>, active: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            location,
            total_rooms: 0,
            active,
            created_at: now,
            updated_at: now,
        }
    }
}
