//! Deployment performance scenarios.
//!
//! These tests need a live cluster with KNE, meshnet and the ixiatg
//! operator deployed. Run them with:
//!
//! ```text
//! cargo test -p kne-e2e-tests --test performance -- --ignored
//! ```

use std::time::Duration;

use kne_e2e_tests::*;
use kne_test_framework::{pod, timing};
use tracing::info;

const EXPECTED_CREATION: Duration = Duration::from_secs(25);
const EXPECTED_TERMINATION: Duration = Duration::from_secs(50);
const TOLERANCE_PCT: u32 = 5;

/// The b2b topology must come up and tear down within its time budgets.
#[tokio::test]
#[ignore = "requires a live cluster with the ixiatg operator deployed"]
async fn create_delete_performance() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = lock();
    init();

    let namespace = "ixia-c";
    let framework = make_framework();
    let expected_services = b2b_services();
    let service_names: Vec<&str> = expected_services.keys().copied().collect();

    let mut restarts = framework.operator_restart_count().await?;

    let mut topology = framework.topology(namespace, &b2b_config(namespace)).await?;
    let creation = framework
        .time_until_pods_ready(namespace, B2B_PODS.len())
        .await?;
    info!(?creation, "pods are running");
    assert!(
        timing::within_tolerance(creation, EXPECTED_CREATION, TOLERANCE_PCT),
        "pods took {creation:?} to be running, expected {EXPECTED_CREATION:?}"
    );

    framework
        .pods_ok(namespace, &B2B_PODS, pod::Checks::default())
        .await?;
    framework.services_ok(namespace, &service_names).await?;
    restarts = framework.operator_stable(restarts).await?;

    framework.teardown(&mut topology, namespace).await?;
    let termination = framework.time_until_pods_terminated(namespace, 0).await?;
    info!(?termination, "pods are terminated");
    assert!(
        timing::within_tolerance(termination, EXPECTED_TERMINATION, TOLERANCE_PCT),
        "pods took {termination:?} to terminate, expected {EXPECTED_TERMINATION:?}"
    );

    framework.pods_ok(namespace, &[], pod::Checks::default()).await?;
    framework.services_ok(namespace, &[]).await?;
    framework.operator_stable(restarts).await?;

    Ok(())
}
