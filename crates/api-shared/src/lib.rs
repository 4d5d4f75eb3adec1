//! # API Shared
//!
//! Shared request/response types for the Pulse APIs.
//!
//! Contains:
//! - REST DTOs with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`
//!
//! The DTOs are plain serialisable structs; conversion from core types happens in `api-rest`.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
