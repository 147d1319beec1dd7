//! Negative scenarios: deployments the operator or the KNE CLI must
//! reject without destabilizing anything.
//!
//! These tests need a live cluster with KNE, meshnet and the ixiatg
//! operator deployed. Run them with:
//!
//! ```text
//! cargo test -p kne-e2e-tests --test negative -- --ignored
//! ```

use kne_e2e_tests::*;
use kne_test_framework::pod;

/// With an unpullable controller image tag in the versions ConfigMap, the
/// pods are created but never reach Running, and the operator survives.
#[tokio::test]
#[ignore = "requires a live cluster with the ixiatg operator deployed"]
async fn version_mismatch() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = lock();
    init();

    let namespace = "ixia-c";
    let framework = make_framework();
    let _reset = ResetConfigOnDrop::new();

    let mut restarts = framework.operator_restart_count().await?;

    framework.load_bad_config("controller", false).await?;

    let mut topology = framework.topology(namespace, &b2b_config(namespace)).await?;
    framework
        .pods_ok(
            namespace,
            &B2B_PODS,
            pod::Checks {
                health: false,
                ..Default::default()
            },
        )
        .await?;
    framework
        .pod_status_matches(namespace, "otg-controller", "ImagePullBackOff")
        .await?;
    restarts = framework.operator_stable(restarts).await?;

    framework.teardown(&mut topology, namespace).await?;
    framework.pods_ok(namespace, &[], pod::Checks::default()).await?;
    framework.services_ok(namespace, &[]).await?;
    framework.operator_stable(restarts).await?;
    framework.reset_config().await?;

    Ok(())
}

/// Once the operator has resolved component versions for a release, it
/// must not reload them over REST: after a successful deployment, breaking
/// the protocol-engine image under the same pinned release leaves only the
/// controller able to come up on the next deployment.
#[tokio::test]
#[ignore = "requires a live cluster with the ixiatg operator deployed"]
async fn rest_no_reload_single_namespace() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = lock();
    init();

    let namespace = "ixia-c";
    let framework = make_framework();
    let _reset = ResetConfigOnDrop::new();
    let expected_services = [
        "service-gnmi-otg-controller",
        "service-grpc-otg-controller",
        "service-otg-port-eth1",
        "service-otg-port-eth2",
    ];

    let mut restarts = framework.operator_restart_count().await?;

    let mut topology = framework.topology(namespace, &b2b_config(namespace)).await?;
    framework
        .pods_ok(namespace, &B2B_PODS, pod::Checks::default())
        .await?;
    framework.services_ok(namespace, &expected_services).await?;
    restarts = framework.operator_stable(restarts).await?;

    framework.teardown(&mut topology, namespace).await?;
    framework.pods_ok(namespace, &[], pod::Checks::default()).await?;
    framework.services_ok(namespace, &[]).await?;
    restarts = framework.operator_stable(restarts).await?;

    framework.load_bad_config("protocol-engine", true).await?;

    let mut topology = framework.topology(namespace, &b2b_config(namespace)).await?;
    framework
        .pods_ok(
            namespace,
            &["otg-controller"],
            pod::Checks {
                count: false,
                ..Default::default()
            },
        )
        .await?;
    framework.services_ok(namespace, &expected_services).await?;
    restarts = framework.operator_stable(restarts).await?;

    framework.teardown(&mut topology, namespace).await?;
    framework.pods_ok(namespace, &[], pod::Checks::default()).await?;
    framework.services_ok(namespace, &[]).await?;
    framework.operator_stable(restarts).await?;
    framework.reset_config().await?;

    Ok(())
}

/// Two LAG groups claiming the same generator interface must be rejected by
/// the KNE CLI before anything lands on the cluster.
#[tokio::test]
#[ignore = "requires a live cluster with the ixiatg operator deployed"]
async fn two_lag_same_interface() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = lock();
    init();

    let namespace = "ixia-c";
    let framework = make_framework();
    let config = format!(
        r#"name: "{namespace}"
nodes: {{
    name: "otg"
    vendor: KEYSIGHT
    version: "local-latest"
}}
links: {{
    a_node: "otg"
    a_int: "eth1"
    group: "lag1"
    z_node: "otg"
    z_int: "eth2"
}}
links: {{
    a_node: "otg"
    a_int: "eth1"
    group: "lag2"
    z_node: "otg"
    z_int: "eth3"
}}
"#
    );

    let mut restarts = framework.operator_restart_count().await?;

    let (mut topology, output) = framework.topology_captured(namespace, &config).await?;
    assert!(!output.success, "conflicting lag config was accepted");
    let last_line = output
        .stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or_default();
    assert!(
        last_line.contains("could not find peer for node otg pod otg-port-eth1 link UID 0"),
        "unexpected rejection: {last_line}"
    );

    framework.pods_ok(namespace, &[], pod::Checks::default()).await?;
    framework.services_ok(namespace, &[]).await?;
    restarts = framework.operator_stable(restarts).await?;

    framework.teardown(&mut topology, namespace).await?;
    framework.pods_ok(namespace, &[], pod::Checks::default()).await?;
    framework.services_ok(namespace, &[]).await?;
    framework.operator_stable(restarts).await?;
    framework.delete_namespace(namespace).await?;

    Ok(())
}
