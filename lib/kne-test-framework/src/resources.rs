//! Snapshots of the custom resources the operator reconciles.
//!
//! The meshnet `Topology` and the `IxiaTG` resources are fetched in YAML
//! form and reduced to the shape the test expectations are written in:
//! metadata name/namespace plus `spec` (plus `status` for ixiatgs).

use serde_json::{json, Value};

use super::Result;
use crate::kubectl::Kubectl;

fn shape_items(document: &str, with_status: bool) -> Result<Vec<Value>> {
    let document: Value = serde_yaml::from_str(document)?;
    let items = document["items"]
        .as_array()
        .ok_or("resource list without items")?;
    items
        .iter()
        .map(|item| {
            let mut shaped = json!({
                "metadata": {
                    "name": item["metadata"]["name"],
                    "namespace": item["metadata"]["namespace"],
                },
                "spec": item["spec"],
            });
            if with_status {
                shaped["status"] = item["status"].clone();
            }
            Ok(shaped)
        })
        .collect()
}

/// All meshnet topologies in the namespace, in expectation shape.
pub async fn topologies(kubectl: &Kubectl, namespace: &str) -> Result<Vec<Value>> {
    let output = kubectl
        .output(["get", "topologies", "-n", namespace, "-o", "yaml"])
        .await?;
    shape_items(&output, false)
}

/// All ixiatgs in the namespace, in expectation shape.
pub async fn ixiatgs(kubectl: &Kubectl, namespace: &str) -> Result<Vec<Value>> {
    let output = kubectl
        .output(["get", "ixiatgs", "-n", namespace, "-o", "yaml"])
        .await?;
    shape_items(&output, true)
}

/// Whether the namespace holds no topology anymore. `kubectl` reports the
/// empty case through stderr.
pub async fn topology_deleted(kubectl: &Kubectl, namespace: &str) -> Result<bool> {
    let output = kubectl.capture(["get", "topology", "-n", namespace]).await?;
    Ok(output
        .stderr
        .lines()
        .next()
        .unwrap_or_default()
        .contains("No resources found"))
}
