//! Pod observations and assertions.

use k8s_openapi::api::core::v1::{Container, Pod, Probe};

use super::Result;
use crate::kubectl::Kubectl;

/// Which of the composite pod checks to run.
#[derive(Debug, Clone, Copy)]
pub struct Checks {
    /// Poll until the total pod count matches the expectation.
    pub count: bool,
    /// Poll until every expected pod reports `Running`.
    pub health: bool,
    /// Assert each expected pod exists by name.
    pub individual: bool,
}

impl Default for Checks {
    fn default() -> Self {
        Self {
            count: true,
            health: true,
            individual: true,
        }
    }
}

/// One row of `kubectl get pods` tabular output.
#[derive(Debug, PartialEq, Eq)]
pub struct Row {
    pub name: String,
    pub ready: String,
    pub status: String,
}

/// Parse headerless `kubectl get pods` output into rows.
pub fn parse_rows(stdout: &str) -> Vec<Row> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            Some(Row {
                name: columns.next()?.to_owned(),
                ready: columns.next()?.to_owned(),
                status: columns.next()?.to_owned(),
            })
        })
        .collect()
}

async fn rows(kubectl: &Kubectl, namespace: &str) -> Result<Vec<Row>> {
    let output = kubectl
        .capture(["get", "pods", "-n", namespace, "--no-headers"])
        .await?;
    Ok(parse_rows(&output.stdout))
}

/// Total number of pods in the namespace.
pub async fn count(kubectl: &Kubectl, namespace: &str) -> Result<usize> {
    Ok(rows(kubectl, namespace).await?.len())
}

/// Number of pods in the namespace reporting `Running`.
pub async fn running_count(kubectl: &Kubectl, namespace: &str) -> Result<usize> {
    Ok(rows(kubectl, namespace)
        .await?
        .iter()
        .filter(|row| row.status == "Running")
        .count())
}

/// Whether the named pod currently reports the given status.
pub async fn status_matches(
    kubectl: &Kubectl,
    namespace: &str,
    pod: &str,
    status: &str,
) -> Result<bool> {
    let resource = format!("pod/{pod}");
    let output = kubectl
        .capture(["get", resource.as_str(), "-n", namespace, "--no-headers"])
        .await?;
    Ok(parse_rows(&output.stdout)
        .iter()
        .any(|row| row.status == status))
}

/// Whether the named pod is `Running` with all of its containers ready.
pub async fn containers_ready(
    kubectl: &Kubectl,
    namespace: &str,
    pod: &str,
    containers: usize,
) -> Result<bool> {
    let resource = format!("pod/{pod}");
    let output = kubectl
        .capture(["get", resource.as_str(), "-n", namespace, "--no-headers"])
        .await?;
    let expected_ready = format!("{containers}/{containers}");
    Ok(parse_rows(&output.stdout)
        .iter()
        .any(|row| row.status == "Running" && row.ready == expected_ready))
}

/// Whether the named pod exists at all.
pub async fn exists(kubectl: &Kubectl, namespace: &str, pod: &str) -> Result<bool> {
    let resource = format!("pods/{pod}");
    let output = kubectl.capture(["describe", resource.as_str(), "-n", namespace]).await?;
    Ok(output.success)
}

/// Fetch one pod in its typed form.
pub async fn get(kubectl: &Kubectl, namespace: &str, pod: &str) -> Result<Pod> {
    let resource = format!("pod/{pod}");
    let output = kubectl
        .output(["get", resource.as_str(), "-n", namespace, "-o", "json"])
        .await?;
    Ok(serde_json::from_str(&output)?)
}

fn container<'a>(pod: &'a Pod, name: &str) -> Result<&'a Container> {
    pod.spec
        .as_ref()
        .map(|spec| spec.containers.as_slice())
        .unwrap_or_default()
        .iter()
        .find(|container| container.name == name)
        .ok_or_else(|| format!("container {name} not found in pod").into())
}

/// Which probe of a container to inspect.
#[derive(Debug, Clone, Copy)]
pub enum ProbeKind {
    Liveness,
    Startup,
}

/// Expected probe configuration for one container. `None` fields are not
/// checked.
#[derive(Debug, Default)]
pub struct ProbeExpectation {
    pub enabled: bool,
    pub initial_delay: Option<i32>,
    pub period: Option<i32>,
    pub failure_threshold: Option<i32>,
}

/// Check a container's probe configuration against an expectation.
pub fn check_probe(
    pod: &Pod,
    container_name: &str,
    kind: ProbeKind,
    expectation: &ProbeExpectation,
) -> Result<()> {
    let container = container(pod, container_name)?;
    let probe: Option<&Probe> = match kind {
        ProbeKind::Liveness => container.liveness_probe.as_ref(),
        ProbeKind::Startup => container.startup_probe.as_ref(),
    };

    let Some(probe) = probe else {
        if expectation.enabled {
            return Err(format!("expected a probe on container {container_name}, found none").into());
        }
        return Ok(());
    };
    if !expectation.enabled {
        return Err(format!("expected no probe on container {container_name}").into());
    }

    let fields = [
        ("initialDelaySeconds", expectation.initial_delay, probe.initial_delay_seconds),
        ("periodSeconds", expectation.period, probe.period_seconds),
        ("failureThreshold", expectation.failure_threshold, probe.failure_threshold),
    ];
    for (field, expected, actual) in fields {
        if let Some(expected) = expected {
            if actual != Some(expected) {
                return Err(format!(
                    "{field} mismatch on container {container_name}: expected {expected}, found {actual:?}"
                )
                .into());
            }
        }
    }
    Ok(())
}

/// Check that a container carries the given environment variable value.
pub fn check_env(pod: &Pod, container_name: &str, name: &str, value: &str) -> Result<()> {
    let container = container(pod, container_name)?;
    let env = container.env.as_deref().unwrap_or_default();
    match env.iter().find(|var| var.name == name) {
        Some(var) if var.value.as_deref() == Some(value) => Ok(()),
        Some(var) => Err(format!(
            "env var {name} mismatch on container {container_name}: expected {value}, found {:?}",
            var.value
        )
        .into()),
        None => Err(format!("env var {name} not found on container {container_name}").into()),
    }
}

/// Check a container's minimum resource requests. Empty expectations are not
/// checked.
pub fn check_requests(
    pod: &Pod,
    container_name: &str,
    memory: Option<&str>,
    cpu: Option<&str>,
) -> Result<()> {
    let container = container(pod, container_name)?;
    let requests = container
        .resources
        .as_ref()
        .and_then(|resources| resources.requests.as_ref())
        .ok_or_else(|| format!("no resource requests on container {container_name}"))?;
    for (resource, expected) in [("memory", memory), ("cpu", cpu)] {
        if let Some(expected) = expected {
            match requests.get(resource) {
                Some(quantity) if quantity.0 == expected => {}
                other => {
                    return Err(format!(
                        "{resource} request mismatch on container {container_name}: expected {expected}, found {other:?}"
                    )
                    .into())
                }
            }
        }
    }
    Ok(())
}

/// Check a container's args override.
pub fn check_args(pod: &Pod, container_name: &str, args: &[&str]) -> Result<()> {
    let container = container(pod, container_name)?;
    let actual = container.args.as_deref().unwrap_or_default();
    if actual != args {
        return Err(format!(
            "args mismatch on container {container_name}: expected {args:?}, found {actual:?}"
        )
        .into());
    }
    Ok(())
}

/// Check a container's command override.
pub fn check_command(pod: &Pod, container_name: &str, command: &[&str]) -> Result<()> {
    let container = container(pod, container_name)?;
    let actual = container.command.as_deref().unwrap_or_default();
    if actual != command {
        return Err(format!(
            "command mismatch on container {container_name}: expected {command:?}, found {actual:?}"
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TABLE: &str = "\
otg-controller    3/3   Running            0     2m
otg-port-eth1     2/2   Running            0     2m
otg-port-eth2     1/2   ImagePullBackOff   0     2m
";

    #[test]
    fn parses_tabular_output() {
        let rows = parse_rows(TABLE);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name, "otg-controller");
        assert_eq!(rows[2].status, "ImagePullBackOff");
        assert!(parse_rows("").is_empty());
    }

    fn fixture() -> Pod {
        serde_json::from_value(json!({
            "metadata": { "name": "otg-controller", "namespace": "ixia-c" },
            "spec": {
                "containers": [
                    {
                        "name": "ixia-c",
                        "args": ["--accept-eula"],
                        "command": ["controller"],
                        "env": [{ "name": "LICENSE_SERVERS", "value": "localhost" }],
                        "livenessProbe": {
                            "initialDelaySeconds": 1,
                            "periodSeconds": 10,
                            "failureThreshold": 3
                        },
                        "resources": {
                            "requests": { "memory": "25Mi", "cpu": "10m" }
                        }
                    },
                    { "name": "gnmi" }
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn checks_probe_parameters() {
        let pod = fixture();
        check_probe(
            &pod,
            "ixia-c",
            ProbeKind::Liveness,
            &ProbeExpectation {
                enabled: true,
                initial_delay: Some(1),
                period: Some(10),
                failure_threshold: Some(3),
            },
        )
        .unwrap();

        let mismatch = check_probe(
            &pod,
            "ixia-c",
            ProbeKind::Liveness,
            &ProbeExpectation {
                enabled: true,
                period: Some(5),
                ..Default::default()
            },
        );
        assert!(mismatch.is_err());

        // No startup probe is configured, so a disabled expectation holds.
        check_probe(
            &pod,
            "gnmi",
            ProbeKind::Liveness,
            &ProbeExpectation::default(),
        )
        .unwrap();
        assert!(check_probe(
            &pod,
            "ixia-c",
            ProbeKind::Liveness,
            &ProbeExpectation::default()
        )
        .is_err());
    }

    #[test]
    fn checks_env_args_command_and_requests() {
        let pod = fixture();
        check_env(&pod, "ixia-c", "LICENSE_SERVERS", "localhost").unwrap();
        assert!(check_env(&pod, "ixia-c", "LICENSE_SERVERS", "elsewhere").is_err());
        assert!(check_env(&pod, "gnmi", "LICENSE_SERVERS", "localhost").is_err());

        check_args(&pod, "ixia-c", &["--accept-eula"]).unwrap();
        assert!(check_args(&pod, "ixia-c", &["--dummy-arg"]).is_err());
        check_command(&pod, "ixia-c", &["controller"]).unwrap();

        check_requests(&pod, "ixia-c", Some("25Mi"), Some("10m")).unwrap();
        assert!(check_requests(&pod, "ixia-c", Some("350Mi"), None).is_err());
        assert!(check_requests(&pod, "gnmi", Some("15Mi"), None).is_err());
    }

    #[test]
    fn missing_container_is_an_error() {
        let pod = fixture();
        assert!(check_args(&pod, "nope", &[]).is_err());
    }
}
