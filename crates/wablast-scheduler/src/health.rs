//! Startup gate: the scheduler refuses to arm timers until the messaging
//! service answers its health endpoint.

use std::time::Duration;

use tracing::{info, warn};

use crate::error::{Result, SchedulerError};

/// Poll `GET {base_url}/health` until it returns a success status.
/// Non-success responses and transport failures both consume an attempt.
/// After `max_attempts` failures the caller is expected to abort startup.
pub async fn wait_until_healthy(
    client: &reqwest::Client,
    base_url: &str,
    max_attempts: u32,
    retry_interval: Duration,
) -> Result<()> {
    let url = format!("{base_url}/health");
    for attempt in 1..=max_attempts {
        match client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!(attempt, "messaging service is healthy");
                return Ok(());
            }
            Ok(resp) => {
                warn!(attempt, max_attempts, status = %resp.status(), "health check returned non-success");
            }
            Err(e) => {
                warn!(attempt, max_attempts, error = %e, "health check failed");
            }
        }
        if attempt < max_attempts {
            tokio::time::sleep(retry_interval).await;
        }
    }
    Err(SchedulerError::Unhealthy {
        attempts: max_attempts,
    })
}
