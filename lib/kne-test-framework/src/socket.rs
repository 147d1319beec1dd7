//! TCP liveness probes against deployed services.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tracing::debug;

use super::Result;

const ATTEMPTS: usize = 5;
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Whether a TCP connection to `host:port` can be established within a
/// bounded number of attempts.
pub async fn check_connection(host: &str, port: u16) -> bool {
    for attempt in 1..=ATTEMPTS {
        debug!(host, port, attempt, "connecting");
        if let Ok(Ok(_stream)) = timeout(ATTEMPT_TIMEOUT, TcpStream::connect((host, port))).await {
            return true;
        }
        sleep(RETRY_DELAY).await;
    }
    false
}

/// Verify every expected service port accepts connections on its ingress
/// address.
pub async fn alive(
    expected: &BTreeMap<&str, Vec<u16>>,
    ingress: &HashMap<String, String>,
) -> Result<()> {
    for (service, ports) in expected {
        let host = ingress
            .get(*service)
            .ok_or_else(|| format!("no ingress address for service {service}"))?;
        for port in ports {
            if !check_connection(host, *port).await {
                return Err(format!("socket is dead for service {service} on port {port}").into());
            }
        }
    }
    Ok(())
}
