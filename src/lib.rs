pub mod api;
pub mod config;
pub mod error;
pub mod logger;
pub mod storage;
pub mod validate;

pub use api::{create_router, AppState};
