//! Deployment timing probes.

use std::time::Duration;

use tokio::time::Instant;

use super::Result;
use crate::kubectl::Kubectl;
use crate::{pod, wait_for};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Time until the namespace holds exactly `expected` Running pods.
pub async fn until_pods_ready(
    kubectl: &Kubectl,
    namespace: &str,
    expected: usize,
) -> Result<Duration> {
    let start = Instant::now();
    wait_for::wait_for(
        &format!("{expected} pods to be Running in {namespace}"),
        POLL_INTERVAL,
        wait_for::RESOURCE_TIMEOUT,
        || async move { Ok(pod::running_count(kubectl, namespace).await? == expected) },
    )
    .await?;
    Ok(start.elapsed())
}

/// Time until the namespace is down to exactly `expected` pods.
pub async fn until_pods_terminated(
    kubectl: &Kubectl,
    namespace: &str,
    expected: usize,
) -> Result<Duration> {
    let start = Instant::now();
    wait_for::wait_for(
        &format!("pod count to drop to {expected} in {namespace}"),
        POLL_INTERVAL,
        wait_for::RESOURCE_TIMEOUT,
        || async move { Ok(pod::count(kubectl, namespace).await? == expected) },
    )
    .await?;
    Ok(start.elapsed())
}

/// Whether a measured duration stays within `tolerance_pct` percent above
/// the expected budget.
pub fn within_tolerance(taken: Duration, expected: Duration, tolerance_pct: u32) -> bool {
    let budget = expected + expected.mul_f64(f64::from(tolerance_pct) / 100.0);
    taken <= budget
}
