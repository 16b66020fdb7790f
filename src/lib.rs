pub mod app;
pub mod config;
pub mod date_filter;
pub mod errors;
pub mod filter;
pub mod handlers;
pub mod indexer;
pub mod layers;
pub mod locator;
pub mod models;
pub mod scene;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use date_filter::DateFilter;
pub use state::AppState;
pub use storage::{load_activities, load_config, resolve_config_path, resolve_data_path};
