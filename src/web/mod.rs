//! HTTP API for region editing and object extraction
//!
//! # Endpoints
//!
//! | Method | Path             | Body             | Response            |
//! |--------|------------------|------------------|---------------------|
//! | GET    | `/health`        |                  | liveness            |
//! | POST   | `/crop`          | `ProcessRequest` | `ProcessResponse`   |
//! | POST   | `/blackout`      | `ProcessRequest` | `ProcessResponse`   |
//! | POST   | `/blur`          | `ProcessRequest` | `ProcessResponse`   |
//! | POST   | `/select_object` | `ProcessRequest` | `ProcessResponse`   |
//! | POST   | `/select`        | `SelectRequest`  | `SelectionsResponse`|
//! | POST   | `/deselect`      | `PointRequest`   | `SelectionsResponse`|
//!
//! Images travel as base64 in the `image_base64` field and come back as PNG.
//!
//! # Usage
//!
//! ```bash
//! investigator serve --port 8000
//! ```

mod routes;
mod server;
mod shutdown;

pub use routes::{
    api_routes, AppError, AppState, HealthResponse, PointRequest, ProcessRequest,
    ProcessResponse, SelectRequest, SelectionsResponse,
};
pub use server::{ServerConfig, WebServer};
pub use shutdown::wait_for_shutdown_signal;

pub use crate::config::{DEFAULT_BIND, DEFAULT_PORT};

/// Default upload limit in bytes (50 MB)
pub const DEFAULT_UPLOAD_LIMIT: usize = crate::config::DEFAULT_UPLOAD_LIMIT_MB * 1024 * 1024;
