use std::sync::Arc;

use chrono::Duration;
use roost_booking::{BookingLifecycle, ExpirationSweeper};
use roost_catalog::CatalogService;
use roost_core::{StudentRepository, SystemClock};
use roost_store::{BookingRules, MemoryStore};

#[derive(Clone)]
pub struct AuthSettings {
    pub secret: String,
    pub expiration_seconds: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub students: Arc<dyn StudentRepository>,
    pub lifecycle: Arc<BookingLifecycle>,
    pub catalog: Arc<CatalogService>,
    pub auth: AuthSettings,
}

impl AppState {
    /// Wires the lifecycle and catalog services over a shared store.
    pub fn new(store: Arc<MemoryStore>, auth: AuthSettings, rules: &BookingRules) -> Self {
        let lifecycle = Arc::new(BookingLifecycle::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(SystemClock),
            Duration::minutes(rules.payment_hold_minutes),
            rules.allocation_retries,
        ));
        let catalog = Arc::new(CatalogService::new(store.clone(), store.clone()));

        Self {
            students: store,
            lifecycle,
            catalog,
            auth,
        }
    }

    pub fn sweeper(&self, rules: &BookingRules) -> Arc<ExpirationSweeper> {
        Arc::new(ExpirationSweeper::new(
            self.lifecycle.clone(),
            Arc::new(SystemClock),
            Duration::minutes(rules.payment_hold_minutes),
            std::time::Duration::from_millis(rules.sweep_interval_ms),
        ))
    }
}
