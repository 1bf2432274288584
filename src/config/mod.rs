mod settings;

pub use settings::{
    DispatchConfig, EventLogConfig, OtelConfig, ProviderConfig, ProviderMode, ServerConfig,
    Settings, SimulatorConfig,
};
