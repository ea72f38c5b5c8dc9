//! Client for the Smart Scheduler service: session handling, the course
//! catalog, schedule request building and timetable rendering.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod schedule;
pub mod services;
pub mod session;

pub use api::{HttpApiClient, SchedulerApi};
pub use config::ClientConfig;
pub use error::AppError;
