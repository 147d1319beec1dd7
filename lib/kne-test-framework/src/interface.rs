//! An interface to the system environment the suite runs in.

use std::env;

/// The external commands and testbed files the framework relies on.
///
/// Everything can be overridden through the environment so the suite runs
/// both on developer machines and inside CI containers.
#[derive(Debug)]
pub struct Interface {
    /// The `kne` CLI used to create and delete topologies.
    pub kne_command: String,
    /// The `kubectl` used for all resource inspection.
    pub kubectl_command: String,
    /// The ssh client used to probe device pods.
    pub ssh_command: String,
    /// Path to the pristine versions ConfigMap the operator was deployed
    /// with.
    pub versions_config: String,
    /// Path to the traffic-client options template.
    pub opts_template: String,
}

impl Interface {
    /// Obtain the interface from the environment, falling back to the
    /// commands available on `PATH` and the testbed's default file layout.
    pub fn from_env() -> Self {
        Self {
            kne_command: env_or("KNE_COMMAND", "kne"),
            kubectl_command: env_or("KUBECTL_COMMAND", "kubectl"),
            ssh_command: env_or("SSH_COMMAND", "ssh"),
            versions_config: env_or("IXIA_C_CONFIG_MAP", "deployments/ixia-c-config.yaml"),
            opts_template: env_or("OPTS_TEMPLATE", "template-opts.json"),
        }
    }
}

fn env_or(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_owned())
}
