mod app;
mod state;

pub use app::{create_app, create_provider_app};
pub use state::{AppState, ProviderState};
