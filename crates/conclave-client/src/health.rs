//! Backend health probe — plain HTTP, independent of the duplex channel

use conclave_core::{Error, Result};
use std::time::Duration;
use tracing::{debug, info};

/// One readiness probe against `GET {base}/health`.
pub async fn check_health(base: &str) -> Result<serde_json::Value> {
    let url = format!("{}/health", base.trim_end_matches('/'));
    let resp = reqwest::get(&url)
        .await
        .map_err(|e| Error::BackendUnavailable(e.to_string()))?;
    if !resp.status().is_success() {
        return Err(Error::BackendUnavailable(format!(
            "{} returned {}",
            url,
            resp.status()
        )));
    }
    resp.json()
        .await
        .map_err(|e| Error::BackendUnavailable(e.to_string()))
}

/// Poll the health endpoint until the backend answers, up to `attempts`
/// probes spaced by `delay`. Gates the first WebSocket connect.
pub async fn wait_for_backend(base: &str, attempts: u32, delay: Duration) -> Result<()> {
    for attempt in 1..=attempts {
        match check_health(base).await {
            Ok(body) => {
                info!("Backend ready: {}", body);
                return Ok(());
            }
            Err(e) => {
                debug!("Health probe {}/{} failed: {}", attempt, attempts, e);
                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
    Err(Error::BackendUnavailable(format!(
        "no healthy response from {} after {} probes",
        base, attempts
    )))
}
