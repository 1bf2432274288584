// Shared infrastructure
pub mod config;
pub mod error;
pub mod metrics;
pub mod shutdown;
pub mod telemetry;

// Domain layer
pub mod notification;
pub mod provider;
pub mod ratelimit;

// Application layer
pub mod api;
pub mod server;
