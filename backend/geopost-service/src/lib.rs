/// Geopost Service Library
///
/// Location-tagged posts with threaded comments. Posts carry an uploaded
/// image and WGS84 coordinates; comments form reply trees under a post.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Entities and response shapes
/// - `services`: Authorization, mutation and comment tree assembly
/// - `db`: Entity store trait and its PostgreSQL implementation
/// - `storage`: Image upload to S3
/// - `middleware`: Bearer token authentication and ownership checks
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::{AppError, Result};
