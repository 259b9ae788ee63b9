use roost_store::BookingRules;
use tokio::task::JoinHandle;

use crate::state::AppState;

/// Spawns the expiration sweeper as a background task. There is exactly
/// one sweeper per process; overlap within it is prevented by the
/// sweeper's own single-flight guard.
pub fn spawn_expiration_sweeper(state: &AppState, rules: &BookingRules) -> JoinHandle<()> {
    let sweeper = state.sweeper(rules);
    tokio::spawn(sweeper.run())
}
