pub mod app;
pub mod config;
pub mod day_key;
pub mod display;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod storage;
pub mod store;
pub mod trend;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{EntryStore, LoadOutcome, RecoveryPolicy};
