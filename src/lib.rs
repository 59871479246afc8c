pub mod calendar;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod services;
pub mod stats;
pub mod workflow;

pub use config::Config;
pub use error::AppError;
