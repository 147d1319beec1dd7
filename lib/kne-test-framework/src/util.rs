//! Process execution helpers.

use crate::Result;

/// Outcome of a command we ran without treating a non-zero exit as an
/// error. `kubectl` reports conditions like "No resources found" through
/// stderr with varying exit codes, so callers get to look at everything.
#[derive(Debug)]
pub struct CommandOutput {
    /// Whether the command exited successfully.
    pub success: bool,
    /// Captured stdout, lossily decoded.
    pub stdout: String,
    /// Captured stderr, lossily decoded.
    pub stderr: String,
}

pub async fn run_command(mut command: tokio::process::Command) -> Result<()> {
    let exit_status = command.spawn()?.wait().await?;
    if !exit_status.success() {
        return Err(format!("exec failed: {command:?}").into());
    }
    Ok(())
}

pub fn run_command_blocking(mut command: std::process::Command) -> Result<()> {
    let exit_status = command.spawn()?.wait()?;
    if !exit_status.success() {
        return Err(format!("exec failed: {command:?}").into());
    }
    Ok(())
}

/// Run a command and return its stdout, failing on a non-zero exit.
pub async fn run_command_output(mut command: tokio::process::Command) -> Result<String> {
    let output = command.output().await?;
    if !output.status.success() {
        return Err(format!(
            "exec failed: {command:?}: {}",
            String::from_utf8_lossy(&output.stderr)
        )
        .into());
    }
    Ok(String::from_utf8(output.stdout)?)
}

/// Run a command and capture everything it produced, leaving the exit
/// status interpretation to the caller.
pub async fn run_command_capture(mut command: tokio::process::Command) -> Result<CommandOutput> {
    let output = command.output().await?;
    Ok(CommandOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
