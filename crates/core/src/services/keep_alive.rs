use reqwest::Client;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::errors::CoreError;

/// Issue one GET to `url` and return the response status.
pub async fn ping_once(client: &Client, url: &str) -> Result<reqwest::StatusCode, CoreError> {
    let response = client.get(url).send().await?;
    Ok(response.status())
}

/// Ping `url` every `interval` so the hosting platform does not idle the
/// service. The first ping goes out one interval after start.
///
/// Returns `None` without spawning anything when no URL is configured.
/// Failures are logged and the loop carries on.
pub fn spawn_keep_alive(
    client: Client,
    url: Option<String>,
    interval: Duration,
    label: impl Into<String>,
) -> Option<JoinHandle<()>> {
    let label = label.into();
    let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
        info!(service = %label, "no keep-alive URL configured; skipping");
        return None;
    };

    info!(service = %label, url = %url, "keep-alive enabled");
    Some(tokio::spawn(async move {
        let start = tokio::time::Instant::now() + interval;
        let mut ticker = tokio::time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match ping_once(&client, &url).await {
                Ok(status) => info!(service = %label, %status, "keep-alive ping ok"),
                Err(e) => warn!(service = %label, error = %e, "keep-alive ping failed"),
            }
        }
    }))
}
