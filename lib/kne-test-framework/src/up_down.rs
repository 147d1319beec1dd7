//! Bring resources up on the cluster and guarantee they come back down.

use std::process::Command;

use tracing::warn;

use super::Result;
use crate::util::{run_command, run_command_blocking, run_command_capture, CommandOutput};

/// Which of the two lifecycle commands to build.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CommandToBuild {
    Up,
    Down,
}

/// Builds the concrete CLI invocations for one kind of managed resource.
pub trait CommandBuilder {
    fn build(&self, command_to_build: CommandToBuild) -> Command;
}

/// Manages commands for bringing up and shutting down resources on the
/// cluster.
///
/// Once `up` has run, the managed resource is torn down when the manager is
/// dropped, so a failed test never leaks cluster state.
#[derive(Debug)]
pub struct Manager<B>
where
    B: CommandBuilder,
{
    command_builder: B,
    needs_drop: bool,
}

impl<B> Manager<B>
where
    B: CommandBuilder,
{
    /// Create a new [`Manager`].
    pub fn new(command_builder: B) -> Self {
        Self {
            command_builder,
            needs_drop: false,
        }
    }

    /// Bring up the resource, failing on a non-zero exit.
    pub async fn up(&mut self) -> Result<()> {
        self.needs_drop = true;
        run_command(self.build_async(CommandToBuild::Up)).await
    }

    /// Bring up the resource, capturing the CLI output instead of failing on
    /// a non-zero exit. Used by scenarios that expect the deployment itself
    /// to be rejected.
    pub async fn up_captured(&mut self) -> Result<CommandOutput> {
        self.needs_drop = true;
        run_command_capture(self.build_async(CommandToBuild::Up)).await
    }

    /// Shut down the resource.
    pub async fn down(&mut self) -> Result<()> {
        self.needs_drop = false;
        run_command(self.build_async(CommandToBuild::Down)).await
    }

    /// Shut down the resource, tolerating a non-zero exit. Deleting a
    /// resource that is already gone is not an error worth surfacing.
    pub async fn down_captured(&mut self) -> Result<CommandOutput> {
        self.needs_drop = false;
        run_command_capture(self.build_async(CommandToBuild::Down)).await
    }

    /// Shut down the resource, blocking execution.
    pub fn down_blocking(&mut self) -> Result<()> {
        self.needs_drop = false;
        run_command_blocking(self.build(CommandToBuild::Down))
    }

    fn build(&self, command_to_build: CommandToBuild) -> Command {
        self.command_builder.build(command_to_build)
    }

    fn build_async(&self, command_to_build: CommandToBuild) -> tokio::process::Command {
        tokio::process::Command::from(self.build(command_to_build))
    }
}

impl<B> Drop for Manager<B>
where
    B: CommandBuilder,
{
    fn drop(&mut self) {
        if self.needs_drop {
            // A turndown failure must not mask the test failure that
            // brought us here.
            if let Err(error) = self.down_blocking() {
                warn!(%error, "turndown failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoBuilder;

    impl CommandBuilder for EchoBuilder {
        fn build(&self, command_to_build: CommandToBuild) -> Command {
            let mut command = Command::new("echo");
            command.arg(match command_to_build {
                CommandToBuild::Up => "up",
                CommandToBuild::Down => "down",
            });
            command
        }
    }

    struct FailingBuilder;

    impl CommandBuilder for FailingBuilder {
        fn build(&self, _command_to_build: CommandToBuild) -> Command {
            Command::new("false")
        }
    }

    #[tokio::test]
    async fn up_then_down_runs_both_commands() {
        let mut manager = Manager::new(EchoBuilder);
        manager.up().await.unwrap();
        manager.down().await.unwrap();
    }

    #[tokio::test]
    async fn up_captured_reports_the_failure_instead_of_erroring() {
        let mut manager = Manager::new(FailingBuilder);
        let output = manager.up_captured().await.unwrap();
        assert!(!output.success);
        // Turndown on drop is attempted and its failure only logged.
        drop(manager);
    }
}
