pub mod admin;
pub mod allocator;
pub mod hostel;
pub mod repository;
pub mod room;

pub use admin::{CatalogService, UpsertHostel, UpsertRoom};
pub use allocator::RoomAllocator;
pub use hostel::Hostel;
pub use repository::{HostelRepository, RoomRepository};
pub use room::{MattressType, Room, RoomConstraints, RoomStatus};
