//! Service observations.

use std::collections::HashMap;

use serde_json::Value;

use super::Result;
use crate::kubectl::Kubectl;

/// Total number of services in the namespace.
pub async fn count(kubectl: &Kubectl, namespace: &str) -> Result<usize> {
    let output = kubectl
        .capture(["get", "svc", "-n", namespace, "--no-headers"])
        .await?;
    Ok(output
        .stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count())
}

/// Whether the named service exists.
pub async fn exists(kubectl: &Kubectl, namespace: &str, service: &str) -> Result<bool> {
    let resource = format!("svc/{service}");
    let output = kubectl
        .capture(["describe", resource.as_str(), "-n", namespace])
        .await?;
    Ok(output.success)
}

/// Extract the first ingress IP from a `status.loadBalancer` document.
pub fn ingress_ip_from_status(status: &str) -> Result<String> {
    let value: Value = serde_json::from_str(status)?;
    value["ingress"][0]["ip"]
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| format!("no ingress ip in load balancer status: {status}").into())
}

/// The ingress IP assigned to a service by the load balancer.
pub async fn ingress_ip(kubectl: &Kubectl, namespace: &str, service: &str) -> Result<String> {
    let resource = format!("svc/{service}");
    let status = kubectl
        .jsonpath(namespace, &resource, "{.status.loadBalancer}")
        .await?;
    ingress_ip_from_status(&status)
}

/// Resolve the ingress IP for each of the given services.
pub async fn ingress_map(
    kubectl: &Kubectl,
    namespace: &str,
    services: &[&str],
) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for service in services {
        let ip = ingress_ip(kubectl, namespace, service).await?;
        map.insert((*service).to_owned(), ip);
    }
    Ok(map)
}

/// The node port backing the named port of a service.
pub async fn node_port(
    kubectl: &Kubectl,
    namespace: &str,
    service: &str,
    port_name: &str,
) -> Result<u16> {
    let resource = format!("services/{service}");
    let path = format!(r#"{{.spec.ports[?(@.name=="{port_name}")].nodePort}}"#);
    let output = kubectl.jsonpath(namespace, &resource, &path).await?;
    let port = output
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .parse::<u16>()
        .map_err(|_| format!("no {port_name} node port on service {service}: {output:?}"))?;
    Ok(port)
}
