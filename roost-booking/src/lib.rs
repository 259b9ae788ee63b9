pub mod lifecycle;
pub mod models;
pub mod occupancy;
pub mod repository;
pub mod sweeper;

pub use lifecycle::{AdminBookingView, ApplyRequest, BookingLifecycle, BookingView};
pub use models::{Booking, BookingStatus, PaymentHold, PaymentStatus};
pub use occupancy::{OccupancyDelta, OccupancyGuard};
pub use repository::{BookingRepository, PaymentRepository};
pub use sweeper::ExpirationSweeper;
