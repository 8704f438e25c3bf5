/// Basic application code
pub mod app;
/// Requesting user identification
pub mod auth;
/// Controllers for REST endpoints
pub mod controller;
/// Domain objects
pub mod domain;
/// Error enums
pub mod error;
/// Stored records
pub mod model;
/// Dashboard owner resolution
pub mod ownership;
/// Repositories
pub mod repo;
/// Application settings
pub mod settings;
/// Application telemetry for tracing and logging
pub mod telemetry;
