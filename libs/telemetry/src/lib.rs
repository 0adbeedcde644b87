//! Logging and metrics setup shared by the fortune bot binaries.
//!
//! Output format and verbosity come from the environment (`LOG_FORMAT`,
//! `RUST_LOG`); see [`TelemetryConfig::from_env`]. Counters recorded through
//! the `metrics` facade are collected once [`install_metrics`] has run.

use anyhow::Result;

mod config;
mod prometheus;
mod tracing_init;

pub use config::TelemetryConfig;
pub use prometheus::install_metrics;
pub use metrics_exporter_prometheus::PrometheusHandle;
pub use tracing_init::init_telemetry;

/// Installs the global subscriber configured from the environment.
pub fn install(service_name: &str) -> Result<()> {
    init_telemetry(TelemetryConfig::from_env(service_name))
}
