pub mod config;
pub mod controllers;
pub mod dto;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod render;
pub mod server;

pub use config::{ServiceConfig, StorageBackend};
pub use error::AppError;
pub use server::{app_config, run, AppState};
