use std::sync::Mutex;

use anyhow::{Result, anyhow};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

/// Installs the process-wide Prometheus recorder behind the `metrics` facade
/// and returns a handle that renders the text exposition format.
///
/// Only one recorder can exist per process; later calls hand back the first.
pub fn install_metrics() -> Result<PrometheusHandle> {
    let mut guard = HANDLE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(handle) = guard.as_ref() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|err| anyhow!("failed to install prometheus recorder: {err}"))?;
    tracing::info!("prometheus metrics recorder installed");
    *guard = Some(handle.clone());
    Ok(handle)
}
