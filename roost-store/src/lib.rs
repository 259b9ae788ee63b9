pub mod app_config;
pub mod memory;

pub use app_config::{AuthConfig, BookingRules, Config, ServerConfig};
pub use memory::MemoryStore;
