//! Minimum resource request scenarios.
//!
//! These tests need a live cluster with KNE, meshnet and the ixiatg
//! operator deployed. Run them with:
//!
//! ```text
//! cargo test -p kne-e2e-tests --test resources -- --ignored
//! ```

use kne_e2e_tests::*;
use kne_test_framework::config_map::ImageOverride;
use kne_test_framework::pod;
use serde_json::json;

/// Default deployments carry the stock minimum resource requests.
#[tokio::test]
#[ignore = "requires a live cluster with the ixiatg operator deployed"]
async fn min_resource_default_config() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = lock();
    init();

    let namespace = "ixia-c";
    let framework = make_framework();

    let mut restarts = framework.operator_restart_count().await?;

    let mut topology = framework.topology(namespace, &b2b_config(namespace)).await?;
    framework
        .pods_ok(namespace, &B2B_PODS, pod::Checks::default())
        .await?;

    let controller = framework.pod(namespace, "otg-controller").await?;
    pod::check_requests(&controller, "ixia-c", Some("25Mi"), Some("10m"))?;
    pod::check_requests(&controller, "gnmi", Some("15Mi"), Some("10m"))?;

    for port_pod in ["otg-port-eth1", "otg-port-eth2"] {
        let port = framework.pod(namespace, port_pod).await?;
        pod::check_requests(
            &port,
            &format!("{port_pod}-protocol-engine"),
            Some("350Mi"),
            Some("200m"),
        )?;
        pod::check_requests(
            &port,
            &format!("{port_pod}-traffic-engine"),
            Some("60Mi"),
            Some("200m"),
        )?;
    }
    restarts = framework.operator_stable(restarts).await?;

    framework.teardown(&mut topology, namespace).await?;
    framework.pods_ok(namespace, &[], pod::Checks::default()).await?;
    framework.operator_stable(restarts).await?;

    Ok(())
}

/// Resource requests overridden through the versions ConfigMap show up on
/// the deployed containers.
#[tokio::test]
#[ignore = "requires a live cluster with the ixiatg operator deployed"]
async fn min_resource_custom_config() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = lock();
    init();

    let namespace = "ixia-c";
    let framework = make_framework();
    let _reset = ResetConfigOnDrop::new();

    let mut restarts = framework.operator_restart_count().await?;

    framework
        .load_image_overrides(&[
            ImageOverride {
                component: "controller",
                keys: vec![("min-resource", json!({ "cpu": "50m", "memory": "190Mi" }))],
            },
            ImageOverride {
                component: "protocol-engine",
                keys: vec![("min-resource", json!({ "cpu": "300m", "memory": "50Mi" }))],
            },
            ImageOverride {
                component: "traffic-engine",
                keys: vec![("min-resource", json!({ "cpu": "50m", "memory": "170Mi" }))],
            },
        ])
        .await?;

    let mut topology = framework.topology(namespace, &pd_config(namespace)).await?;
    framework
        .pods_ok(namespace, &PD_PODS, pod::Checks::default())
        .await?;

    let controller = framework.pod(namespace, "otg-controller").await?;
    pod::check_requests(&controller, "ixia-c", Some("190Mi"), Some("50m"))?;

    let port = framework.pod(namespace, "otg-port-eth1").await?;
    pod::check_requests(
        &port,
        "otg-port-eth1-protocol-engine",
        Some("50Mi"),
        Some("300m"),
    )?;
    pod::check_requests(
        &port,
        "otg-port-eth1-traffic-engine",
        Some("170Mi"),
        Some("50m"),
    )?;
    restarts = framework.operator_stable(restarts).await?;

    framework.teardown(&mut topology, namespace).await?;
    framework.pods_ok(namespace, &[], pod::Checks::default()).await?;
    framework.operator_stable(restarts).await?;
    framework.reset_config().await?;

    Ok(())
}
