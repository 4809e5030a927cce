//! HTTP API handlers for triage-api

pub mod auth;
pub mod health;
pub mod middleware;
pub mod root;
pub mod token;
pub mod triage;

pub use auth::auth_routes;
pub use health::health_routes;
pub use middleware::request_logging;
pub use root::root;
pub use triage::triage_routes;
