//! Application state shared across handlers.

use card_store::Database;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}
