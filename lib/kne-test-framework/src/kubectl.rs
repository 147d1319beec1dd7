//! `kubectl` invocation layer shared by the resource query modules.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use super::Result;
use crate::util::{run_command, run_command_capture, run_command_output, CommandOutput};

/// Builds and runs `kubectl` invocations against the cluster under test.
#[derive(Debug, Clone)]
pub struct Kubectl {
    command: String,
}

impl Kubectl {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// A `kubectl` command with the given arguments, stdin detached.
    pub fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.command);
        command.stdin(Stdio::null());
        command.args(args);
        command
    }

    /// Run and return stdout, failing on a non-zero exit.
    pub async fn output<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        run_command_output(self.command(args)).await
    }

    /// Run and capture everything, leaving exit status interpretation to the
    /// caller.
    pub async fn capture<I, S>(&self, args: I) -> Result<CommandOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        run_command_capture(self.command(args)).await
    }

    /// Run to completion with inherited stdio, failing on a non-zero exit.
    pub async fn run<I, S>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        run_command(self.command(args)).await
    }

    /// Evaluate a jsonpath expression against a namespaced resource.
    pub async fn jsonpath(&self, namespace: &str, resource: &str, path: &str) -> Result<String> {
        let output = format!("jsonpath={path}");
        self.output(["get", resource, "-n", namespace, "-o", output.as_str()])
            .await
    }

    /// `kubectl apply -f` for a rendered configuration on disk.
    pub async fn apply_file(&self, path: &Path) -> Result<()> {
        let mut command = self.command(["apply", "-f"]);
        command.arg(path);
        run_command(command).await
    }

    /// Copy a local file into a pod.
    pub async fn copy_to_pod(&self, local: &Path, pod: &str, remote: &str) -> Result<()> {
        let mut command = self.command(["cp"]);
        command.arg(local).arg(format!("{pod}:{remote}"));
        run_command(command).await
    }

    /// Run a shell command inside a pod, capturing its output.
    pub async fn exec_captured(&self, pod: &str, script: &str) -> Result<CommandOutput> {
        self.capture(["exec", "-t", pod, "--", "bash", "-c", script])
            .await
    }

    /// Create a generic secret from literal values.
    pub async fn create_secret(
        &self,
        namespace: &str,
        name: &str,
        literals: &[(&str, &str)],
    ) -> Result<()> {
        let mut args = vec![
            "create".to_owned(),
            "secret".to_owned(),
            "generic".to_owned(),
            name.to_owned(),
            "-n".to_owned(),
            namespace.to_owned(),
        ];
        for (key, value) in literals {
            args.push(format!("--from-literal={key}={value}"));
        }
        self.run(args).await
    }

    /// Delete a secret, tolerating it not being there.
    pub async fn delete_secret(&self, namespace: &str, name: &str) -> Result<()> {
        self.capture(["delete", "secret", name, "-n", namespace])
            .await?;
        Ok(())
    }

    /// Delete a namespace and everything in it.
    pub async fn delete_namespace(&self, namespace: &str) -> Result<()> {
        self.run(["delete", "namespace", namespace]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_namespaced_commands() {
        let kubectl = Kubectl::new("kubectl");
        let command = kubectl.command(["get", "pods", "-n", "ixia-c"]);
        let args: Vec<_> = command
            .as_std()
            .get_args()
            .map(|arg| arg.to_str().unwrap().to_owned())
            .collect();
        assert_eq!(args, ["get", "pods", "-n", "ixia-c"]);
    }
}
