pub mod auth;
pub mod entries;
pub mod error;
pub mod extract;
pub mod validation;

use std::sync::Arc;

use beacon_db::Database;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
}
