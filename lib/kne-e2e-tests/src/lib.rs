//! Helpers shared by the operator e2e scenarios.

use std::collections::BTreeMap;

use once_cell::sync::OnceCell;
use serde_json::{json, Value};
use tracing::warn;

pub use kne_test_framework::{lock, Framework, Interface};

/// One-time tracing initialization for a test binary.
pub fn init() {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_init(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    });
}

/// Create a [`Framework`] from the environment.
pub fn make_framework() -> Framework {
    Framework::new(Interface::from_env())
}

/// The ixia-c release the operator resolves component versions against.
pub fn ixia_c_release() -> String {
    std::env::var("IXIA_C_RELEASE").unwrap_or_else(|_| "local-latest".to_owned())
}

/// Re-applies the pristine versions ConfigMap when dropped, so scenarios
/// that rewrite it cannot leave a mutated map behind on a failure path.
#[derive(Debug)]
pub struct ResetConfigOnDrop {
    kubectl_command: String,
    versions_config: String,
}

impl ResetConfigOnDrop {
    pub fn new() -> Self {
        let interface = Interface::from_env();
        Self {
            kubectl_command: interface.kubectl_command,
            versions_config: interface.versions_config,
        }
    }
}

impl Default for ResetConfigOnDrop {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ResetConfigOnDrop {
    fn drop(&mut self) {
        let status = std::process::Command::new(&self.kubectl_command)
            .args(["apply", "-f", &self.versions_config])
            .status();
        match status {
            Ok(status) if status.success() => {}
            outcome => warn!(?outcome, "failed to reset the versions config map"),
        }
    }
}

/// Pods of the back-to-back topology.
pub const B2B_PODS: [&str; 3] = ["otg-controller", "otg-port-eth1", "otg-port-eth2"];

/// Service-to-ingress-port expectations of the back-to-back topology.
pub fn b2b_services() -> BTreeMap<&'static str, Vec<u16>> {
    BTreeMap::from([
        ("service-https-otg-controller", vec![443]),
        ("service-gnmi-otg-controller", vec![50051]),
        ("service-grpc-otg-controller", vec![40051]),
        ("service-otg-port-eth1", vec![5555, 50071]),
        ("service-otg-port-eth2", vec![5555, 50071]),
    ])
}

/// The back-to-back KNE topology: one traffic generator with two ports
/// wired to each other.
pub fn b2b_config(namespace: &str) -> String {
    format!(
        r#"name: "{namespace}"
nodes: {{
    name: "otg"
    vendor: KEYSIGHT
    version: "local-latest"
    services: {{
        key: 443
        value: {{
            name: "https"
            inside: 443
        }}
    }}
    services: {{
        key: 50051
        value: {{
            name: "gnmi"
            inside: 50051
        }}
    }}
    services: {{
        key: 40051
        value: {{
            name: "grpc"
            inside: 40051
        }}
    }}
}}
links: {{
    a_node: "otg"
    a_int: "eth1"
    z_node: "otg"
    z_int: "eth2"
}}
"#
    )
}

/// Meshnet topology shape the operator must produce for the b2b config.
pub fn b2b_expected_topologies(namespace: &str) -> Value {
    json!([
        {
            "metadata": { "name": "otg-port-eth1", "namespace": namespace },
            "spec": {
                "links": [{
                    "local_intf": "eth1",
                    "local_ip": "",
                    "peer_intf": "eth2",
                    "peer_ip": "",
                    "peer_pod": "otg-port-eth2",
                    "uid": 0
                }]
            }
        },
        {
            "metadata": { "name": "otg-port-eth2", "namespace": namespace },
            "spec": {
                "links": [{
                    "local_intf": "eth2",
                    "local_ip": "",
                    "peer_intf": "eth1",
                    "peer_ip": "",
                    "peer_pod": "otg-port-eth1",
                    "uid": 0
                }]
            }
        }
    ])
}

/// IxiaTG shape the operator must produce for the b2b config.
pub fn b2b_expected_ixiatgs(namespace: &str, release: &str) -> Value {
    json!([{
        "metadata": { "name": "otg", "namespace": namespace },
        "spec": {
            "api_endpoint_map": {
                "gnmi": { "in": 50051 },
                "grpc": { "in": 40051 },
                "https": { "in": 443 }
            },
            "desired_state": "DEPLOYED",
            "interfaces": [
                { "name": "eth1" },
                { "name": "eth2" }
            ],
            "release": release
        },
        "status": {
            "api_endpoint": {
                "pod_name": "otg-controller",
                "service_names": [
                    "service-gnmi-otg-controller",
                    "service-grpc-otg-controller",
                    "service-https-otg-controller"
                ]
            },
            "interfaces": [
                { "interface": "eth1", "name": "eth1", "pod_name": "otg-port-eth1" },
                { "interface": "eth2", "name": "eth2", "pod_name": "otg-port-eth2" }
            ],
            "state": "DEPLOYED"
        }
    }])
}

/// The port-DUT KNE topology: one traffic-generator port against an Arista
/// device.
pub fn pd_config(namespace: &str) -> String {
    format!(
        r#"name: "{namespace}"
nodes: {{
    name: "otg"
    vendor: KEYSIGHT
    version: "local-latest"
    services: {{
        key: 50051
        value: {{
            name: "gnmi"
            inside: 50051
        }}
    }}
    services: {{
        key: 40051
        value: {{
            name: "grpc"
            inside: 40051
        }}
    }}
}}
nodes: {{
    name: "arista1"
    vendor: ARISTA
    model: "ceos"
    os: "eos"
}}
links: {{
    a_node: "otg"
    a_int: "eth1"
    z_node: "arista1"
    z_int: "eth1"
}}
"#
    )
}

/// Pods of the port-DUT topology.
pub const PD_PODS: [&str; 3] = ["otg-controller", "otg-port-eth1", "arista1"];
