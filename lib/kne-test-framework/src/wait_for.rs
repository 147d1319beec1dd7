//! The generic poll-until-condition primitive.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use super::Result;

/// Default poll interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);
/// Default deadline for quick conditions, such as a topology disappearing
/// after deletion.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Deadline for cluster resources to converge after a deployment.
pub const RESOURCE_TIMEOUT: Duration = Duration::from_secs(300);

/// Keep evaluating `check` every `interval` until it returns true or
/// `timeout` elapses. `condition` names what is being awaited; it shows up
/// in the logs and in the timeout error.
pub async fn wait_for<F, Fut>(
    condition: &str,
    interval: Duration,
    timeout: Duration,
    mut check: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    info!(condition, "waiting");
    let deadline = Instant::now() + timeout;
    loop {
        if check().await? {
            info!(condition, "done waiting");
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(format!("timed out waiting for {condition}").into());
        }
        debug!(condition, "condition not met yet");
        sleep(interval).await;
    }
}
