//! API layer - HTTP endpoint handlers for the dispatcher and the provider simulator.

mod health;
mod metrics;
mod notify;
mod requests;
mod routes;

pub use health::{health, provider_stats, stats, HealthResponse, StatsResponse};
pub use metrics::{prometheus_metrics, provider_metrics};
pub use notify::notify;
pub use requests::{
    create_request, get_request, process_request, CreateNotificationRequest, CreatedResponse,
    ProcessResponse, StatusResponse,
};
pub use routes::{api_routes, provider_routes};
