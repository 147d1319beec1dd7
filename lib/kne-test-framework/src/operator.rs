//! Operator pod health.

use super::Result;
use crate::kubectl::Kubectl;

/// Namespace the ixiatg operator is deployed into.
pub const OPERATOR_NAMESPACE: &str = "ixiatg-op-system";

/// Parse the restart count out of the jsonpath query output.
pub fn parse_restart_count(output: &str) -> Result<u32> {
    output
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .parse()
        .map_err(|_| format!("operator pod not found: {output:?}").into())
}

/// Restart count of the operator's `manager` container.
pub async fn restart_count(kubectl: &Kubectl) -> Result<u32> {
    let output = kubectl
        .jsonpath(
            OPERATOR_NAMESPACE,
            "pods",
            r#"{.items[0].status.containerStatuses[?(@.name=="manager")].restartCount}"#,
        )
        .await?;
    parse_restart_count(&output)
}

/// Verify the operator did not restart since `previous` was sampled and
/// return the fresh count for the next checkpoint.
pub async fn assert_stable(kubectl: &Kubectl, previous: u32) -> Result<u32> {
    let current = restart_count(kubectl).await?;
    let restarts = current.saturating_sub(previous);
    if restarts != 0 {
        return Err(format!("operator restarted {restarts} times during the scenario").into());
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_jsonpath_output() {
        assert_eq!(parse_restart_count("0\n").unwrap(), 0);
        assert_eq!(parse_restart_count("3").unwrap(), 3);
        assert!(parse_restart_count("").is_err());
    }
}
