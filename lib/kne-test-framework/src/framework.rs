//! The test framework main entry point.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde_json::Value;
use tracing::info;

use super::{Interface, Result};
use crate::kubectl::Kubectl;
use crate::resource_file::ResourceFile;
use crate::util::CommandOutput;
use crate::{
    client, config_map, operator, pod, resources, service, socket, template, timing, topology,
    up_down, wait_for,
};

/// How long a previous run's topology gets to finish deleting before a new
/// deployment starts.
const CREATE_BARRIER_TIMEOUT: Duration = Duration::from_secs(120);

/// Framework wraps the interface to the system with an easy-to-use rust API
/// optimized for implementing test cases.
#[derive(Debug)]
pub struct Framework {
    interface: Interface,
    kubectl: Kubectl,
}

impl Framework {
    /// Create a new [`Framework`] powered by the passed interface.
    pub fn new(interface: Interface) -> Self {
        let kubectl = Kubectl::new(interface.kubectl_command.clone());
        Self { interface, kubectl }
    }

    /// Deploy a topology configuration into a namespace, after making sure
    /// no topology from a past run is still lingering there.
    pub async fn topology(
        &self,
        namespace: &str,
        config: &str,
    ) -> Result<up_down::Manager<topology::CommandBuilder>> {
        self.ensure_topology_absent(namespace).await?;
        info!(namespace, "deploying KNE topology");
        let mut manager = topology::manager(&self.interface.kne_command, config)?;
        manager.up().await?;
        Ok(manager)
    }

    /// Attempt to deploy a topology configuration that is expected to be
    /// rejected, returning the CLI output for inspection. Turndown is still
    /// armed on the returned manager.
    pub async fn topology_captured(
        &self,
        namespace: &str,
        config: &str,
    ) -> Result<(up_down::Manager<topology::CommandBuilder>, CommandOutput)> {
        self.ensure_topology_absent(namespace).await?;
        info!(namespace, "deploying KNE topology");
        let mut manager = topology::manager(&self.interface.kne_command, config)?;
        let output = manager.up_captured().await?;
        Ok((manager, output))
    }

    /// Tear a topology down and wait until the cluster confirms it is gone.
    /// `kne delete` exiting non-zero is tolerated; the poll below is the
    /// actual teardown barrier.
    pub async fn teardown(
        &self,
        manager: &mut up_down::Manager<topology::CommandBuilder>,
        namespace: &str,
    ) -> Result<()> {
        info!(namespace, "deleting KNE topology");
        manager.down_captured().await?;
        self.wait_until_topology_deleted(namespace, wait_for::DEFAULT_TIMEOUT)
            .await
    }

    /// Wait for the namespace to hold no topology.
    pub async fn wait_until_topology_deleted(
        &self,
        namespace: &str,
        timeout: Duration,
    ) -> Result<()> {
        let kubectl = &self.kubectl;
        wait_for::wait_for(
            &format!("topology deleted in {namespace}"),
            wait_for::DEFAULT_INTERVAL,
            timeout,
            || async move { resources::topology_deleted(kubectl, namespace).await },
        )
        .await
    }

    async fn ensure_topology_absent(&self, namespace: &str) -> Result<()> {
        self.wait_until_topology_deleted(namespace, CREATE_BARRIER_TIMEOUT)
            .await
    }

    /// Verify the pods in a namespace against an expected set: total count,
    /// Running count, and per-name existence, as selected by `checks`.
    pub async fn pods_ok(
        &self,
        namespace: &str,
        expected: &[&str],
        checks: pod::Checks,
    ) -> Result<()> {
        let kubectl = &self.kubectl;
        let expected_count = expected.len();

        if checks.count {
            info!(namespace, "verifying pods count in KNE topology");
            wait_for::wait_for(
                &format!("pod count in {namespace} to reach {expected_count}"),
                wait_for::DEFAULT_INTERVAL,
                wait_for::RESOURCE_TIMEOUT,
                || async move { Ok(pod::count(kubectl, namespace).await? == expected_count) },
            )
            .await?;
        }

        if checks.health {
            info!(namespace, "verifying pods status in KNE topology");
            wait_for::wait_for(
                &format!("{expected_count} Running pods in {namespace}"),
                wait_for::DEFAULT_INTERVAL,
                wait_for::RESOURCE_TIMEOUT,
                || async move {
                    Ok(pod::running_count(kubectl, namespace).await? == expected_count)
                },
            )
            .await?;
        }

        if checks.individual {
            info!(namespace, "verifying individual pods in KNE topology");
            for name in expected {
                if !pod::exists(kubectl, namespace, name).await? {
                    return Err(format!("pod {name} not found in {namespace}").into());
                }
            }
        }
        Ok(())
    }

    /// Verify the services in a namespace: total count, then per-name
    /// existence.
    pub async fn services_ok(&self, namespace: &str, expected: &[&str]) -> Result<()> {
        let kubectl = &self.kubectl;
        let expected_count = expected.len();

        info!(namespace, "verifying services count in KNE topology");
        wait_for::wait_for(
            &format!("service count in {namespace} to reach {expected_count}"),
            wait_for::DEFAULT_INTERVAL,
            wait_for::RESOURCE_TIMEOUT,
            || async move { Ok(service::count(kubectl, namespace).await? == expected_count) },
        )
        .await?;

        info!(namespace, "verifying individual services in KNE topology");
        for name in expected {
            if !service::exists(kubectl, namespace, name).await? {
                return Err(format!("service {name} not found in {namespace}").into());
            }
        }
        Ok(())
    }

    /// Wait for one pod to report the given status.
    pub async fn pod_status_matches(&self, namespace: &str, name: &str, status: &str) -> Result<()> {
        let kubectl = &self.kubectl;
        wait_for::wait_for(
            &format!("pod {name} in {namespace} to report {status}"),
            wait_for::DEFAULT_INTERVAL,
            wait_for::RESOURCE_TIMEOUT,
            || async move { pod::status_matches(kubectl, namespace, name, status).await },
        )
        .await
    }

    /// Wait for one pod to be Running with all of its containers ready.
    pub async fn containers_ready(
        &self,
        namespace: &str,
        name: &str,
        containers: usize,
    ) -> Result<()> {
        let kubectl = &self.kubectl;
        wait_for::wait_for(
            &format!("{containers} ready containers in pod {name}"),
            wait_for::DEFAULT_INTERVAL,
            wait_for::RESOURCE_TIMEOUT,
            || async move { pod::containers_ready(kubectl, namespace, name, containers).await },
        )
        .await
    }

    /// Fetch one pod in its typed form for container-level checks.
    pub async fn pod(&self, namespace: &str, name: &str) -> Result<k8s_openapi::api::core::v1::Pod> {
        pod::get(&self.kubectl, namespace, name).await
    }

    /// All meshnet topologies in the namespace, in expectation shape.
    pub async fn topologies(&self, namespace: &str) -> Result<Vec<Value>> {
        resources::topologies(&self.kubectl, namespace).await
    }

    /// All ixiatgs in the namespace, in expectation shape.
    pub async fn ixiatgs(&self, namespace: &str) -> Result<Vec<Value>> {
        resources::ixiatgs(&self.kubectl, namespace).await
    }

    /// Verify every expected service port accepts connections on its
    /// ingress address.
    pub async fn sockets_alive(
        &self,
        namespace: &str,
        expected: &BTreeMap<&str, Vec<u16>>,
    ) -> Result<()> {
        let services: Vec<&str> = expected.keys().copied().collect();
        let ingress = self.ingress_map(namespace, &services).await?;
        socket::alive(expected, &ingress).await
    }

    /// Resolve the ingress IP for each of the given services.
    pub async fn ingress_map(
        &self,
        namespace: &str,
        services: &[&str],
    ) -> Result<HashMap<String, String>> {
        service::ingress_map(&self.kubectl, namespace, services).await
    }

    /// Restart count of the operator's manager container.
    pub async fn operator_restart_count(&self) -> Result<u32> {
        operator::restart_count(&self.kubectl).await
    }

    /// Verify the operator did not restart since the previous checkpoint
    /// and return the fresh count.
    pub async fn operator_stable(&self, previous: u32) -> Result<u32> {
        info!("verifying operator pod status");
        operator::assert_stable(&self.kubectl, previous).await
    }

    /// Whether a device pod accepts ssh logins through its service's node
    /// port.
    pub async fn device_ssh_reachable(&self, namespace: &str, name: &str) -> Result<bool> {
        let service_name = format!("service-{name}");
        let port = service::node_port(&self.kubectl, namespace, &service_name, "ssh").await?;
        let mut command = tokio::process::Command::new(&self.interface.ssh_command);
        command
            .arg("-p")
            .arg(port.to_string())
            .arg("-o")
            .arg("StrictHostKeyChecking=no")
            .arg("-o")
            .arg("UserKnownHostsFile /dev/null")
            .arg("admin@localhost")
            .arg("echo")
            .arg("ok");
        let output = crate::util::run_command_capture(command).await?;
        Ok(output.success)
    }

    /// Wait until every listed device pod is ssh reachable.
    pub async fn devices_ssh_reachable(&self, namespace: &str, names: &[&str]) -> Result<()> {
        for &name in names {
            info!(namespace, name, "verifying device pod is sshable");
            wait_for::wait_for(
                &format!("device pod {name} to accept ssh"),
                wait_for::DEFAULT_INTERVAL,
                wait_for::RESOURCE_TIMEOUT,
                || async move { self.device_ssh_reachable(namespace, name).await },
            )
            .await?;
        }
        Ok(())
    }

    /// Run the in-cluster traffic-client suite against a deployed topology
    /// and gate on its pass rate.
    pub async fn client_suite_ok(
        &self,
        namespace: &str,
        testcase: Option<&str>,
        tags: &str,
        expected_pass_rate: f64,
    ) -> Result<()> {
        info!(namespace, "rendering client options");
        let opts_template = std::fs::read_to_string(&self.interface.opts_template)?;
        let opts = ResourceFile::new(&template::render_namespace(&opts_template, namespace))?;
        client::copy_opts(&self.kubectl, opts.path()).await?;

        info!(namespace, "running client suite");
        let report = client::run_suite(&self.kubectl, testcase, tags).await?;
        client::check_report(&report, expected_pass_rate)
    }

    /// Time until the namespace holds exactly `expected` Running pods.
    pub async fn time_until_pods_ready(&self, namespace: &str, expected: usize) -> Result<Duration> {
        timing::until_pods_ready(&self.kubectl, namespace, expected).await
    }

    /// Time until the namespace is down to exactly `expected` pods.
    pub async fn time_until_pods_terminated(
        &self,
        namespace: &str,
        expected: usize,
    ) -> Result<Duration> {
        timing::until_pods_terminated(&self.kubectl, namespace, expected).await
    }

    /// Rewrite the versions ConfigMap so one component's image cannot be
    /// pulled.
    pub async fn load_bad_config(&self, component: &str, update_release: bool) -> Result<()> {
        let document = self.pristine_config()?;
        let mutated = config_map::with_bad_component(&document, component, update_release)?;
        self.apply_versions_config(&mutated).await
    }

    /// Rewrite the versions ConfigMap to add the init-wait container.
    pub async fn load_init_config(&self) -> Result<()> {
        let document = self.pristine_config()?;
        let mutated = config_map::with_init_container(&document)?;
        self.apply_versions_config(&mutated).await
    }

    /// Rewrite the versions ConfigMap with per-component image overrides.
    pub async fn load_image_overrides(
        &self,
        overrides: &[config_map::ImageOverride<'_>],
    ) -> Result<()> {
        let document = self.pristine_config()?;
        let mutated = config_map::with_image_overrides(&document, overrides)?;
        self.apply_versions_config(&mutated).await
    }

    /// Rewrite the versions ConfigMap to point at a license server.
    pub async fn load_license_config(
        &self,
        address: Option<&str>,
        image: Option<(&str, &str)>,
    ) -> Result<()> {
        let document = self.pristine_config()?;
        let mutated = config_map::with_license_server(&document, address, image)?;
        self.apply_versions_config(&mutated).await
    }

    /// Re-apply the pristine versions ConfigMap.
    pub async fn reset_config(&self) -> Result<()> {
        info!("resetting versions config map");
        self.kubectl
            .apply_file(std::path::Path::new(&self.interface.versions_config))
            .await
    }

    /// Create the license-server secret in the operator namespace.
    pub async fn create_license_secret(&self, key: &str, value: &str) -> Result<()> {
        self.kubectl
            .create_secret(
                operator::OPERATOR_NAMESPACE,
                "license-server",
                &[(key, value)],
            )
            .await
    }

    /// Remove the license-server secret, tolerating it not being there.
    pub async fn remove_license_secret(&self) -> Result<()> {
        self.kubectl
            .delete_secret(operator::OPERATOR_NAMESPACE, "license-server")
            .await
    }

    /// Delete a namespace and everything in it.
    pub async fn delete_namespace(&self, namespace: &str) -> Result<()> {
        self.kubectl.delete_namespace(namespace).await
    }

    fn pristine_config(&self) -> Result<String> {
        Ok(std::fs::read_to_string(&self.interface.versions_config)?)
    }

    async fn apply_versions_config(&self, document: &str) -> Result<()> {
        let file = ResourceFile::new(document)?;
        self.kubectl.apply_file(file.path()).await
    }
}
