use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub event_log: EventLogConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted request body in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

/// How the dispatcher reaches the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    /// POST to the provider server over HTTP
    Http,
    /// Run the simulator in-process
    Local,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_mode")]
    pub mode: ProviderMode,
    #[serde(default = "default_provider_url")]
    pub base_url: String,
    /// Credential sent in the X-API-Key header
    #[serde(default = "default_api_key")]
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Upper bound for a single provider call, in milliseconds
    #[serde(default = "default_dispatch_timeout")]
    pub timeout_ms: u64,
}

/// Tunables of the provider simulator
#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_simulator_port")]
    pub port: u16,
    /// Shared secret expected in X-API-Key
    #[serde(default = "default_api_key")]
    pub api_key: String,
    /// Admission gate capacity (concurrent in-flight requests)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Admitted requests allowed within one window
    #[serde(default = "default_rate_limit_threshold")]
    pub rate_limit_threshold: usize,
    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u64,
    #[serde(default = "default_latency_min")]
    pub latency_min_ms: u64,
    #[serde(default = "default_latency_max")]
    pub latency_max_ms: u64,
    /// Probability in [0, 1] of an injected remote failure
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventLogConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_event_log_path")]
    pub path: String,
    /// Events buffered before new ones are dropped
    #[serde(default = "default_event_log_capacity")]
    pub capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_body_limit() -> usize {
    64 * 1024
}

fn default_provider_mode() -> ProviderMode {
    ProviderMode::Http
}

fn default_provider_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_api_key() -> String {
    "test-dev-2026".to_string()
}

fn default_dispatch_timeout() -> u64 {
    5000 // 5 seconds
}

fn default_simulator_port() -> u16 {
    3001
}

fn default_max_concurrent() -> usize {
    50
}

fn default_rate_limit_threshold() -> usize {
    50
}

fn default_rate_limit_window() -> u64 {
    10
}

fn default_latency_min() -> u64 {
    100
}

fn default_latency_max() -> u64 {
    500
}

fn default_failure_rate() -> f64 {
    0.1
}

fn default_event_log_path() -> String {
    "storage/events.jsonl".to_string()
}

fn default_event_log_capacity() -> usize {
    1024
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "ara-dispatch-service".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let settings: Settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // ARA_SERVER__PORT, ARA_SIMULATOR__FAILURE_RATE, ...
            .add_source(
                Environment::with_prefix("ARA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject tunables the dispatcher or simulator cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulator;
        if sim.max_concurrent == 0 {
            return Err(invalid("simulator.max_concurrent must be greater than 0"));
        }
        if sim.rate_limit_threshold == 0 || sim.rate_limit_window_secs == 0 {
            return Err(invalid("simulator rate limit threshold and window must be greater than 0"));
        }
        if sim.latency_min_ms > sim.latency_max_ms {
            return Err(invalid("simulator.latency_min_ms must not exceed latency_max_ms"));
        }
        if !(0.0..=1.0).contains(&sim.failure_rate) {
            return Err(invalid("simulator.failure_rate must be within [0, 1]"));
        }
        if self.dispatch.timeout_ms == 0 {
            return Err(invalid("dispatch.timeout_ms must be greater than 0"));
        }
        if self.event_log.enabled && self.event_log.capacity == 0 {
            return Err(invalid("event_log.capacity must be greater than 0"));
        }
        Ok(())
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn simulator_addr(&self) -> String {
        format!("{}:{}", self.simulator.host, self.simulator.port)
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Message(message.to_string())
}

impl DispatchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl SimulatorConfig {
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            mode: default_provider_mode(),
            base_url: default_provider_url(),
            api_key: default_api_key(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_dispatch_timeout(),
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_simulator_port(),
            api_key: default_api_key(),
            max_concurrent: default_max_concurrent(),
            rate_limit_threshold: default_rate_limit_threshold(),
            rate_limit_window_secs: default_rate_limit_window(),
            latency_min_ms: default_latency_min(),
            latency_max_ms: default_latency_max(),
            failure_rate: default_failure_rate(),
        }
    }
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_event_log_path(),
            capacity: default_event_log_capacity(),
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.provider.mode, ProviderMode::Http);
        assert_eq!(settings.simulator.port, 3001);
        assert_eq!(settings.simulator.max_concurrent, 50);
        assert_eq!(settings.simulator.rate_limit_threshold, 50);
        assert_eq!(settings.simulator.rate_limit_window(), Duration::from_secs(10));
        assert_eq!(settings.dispatch.timeout(), Duration::from_secs(5));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_latency() {
        let mut settings = Settings::default();
        settings.simulator.latency_min_ms = 600;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_failure_rate_out_of_range() {
        let mut settings = Settings::default();
        settings.simulator.failure_rate = 1.5;
        assert!(settings.validate().is_err());

        settings.simulator.failure_rate = 1.0;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut settings = Settings::default();
        settings.simulator.max_concurrent = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_provider_mode_deserialize() {
        let mode: ProviderMode = serde_json::from_str("\"local\"").unwrap();
        assert_eq!(mode, ProviderMode::Local);
    }

    #[test]
    fn test_addresses() {
        let settings = Settings::default();
        assert_eq!(settings.server_addr(), "0.0.0.0:8000");
        assert_eq!(settings.simulator_addr(), "0.0.0.0:3001");
    }
}
