use std::process::Command;

use anyhow::Result;

/// A `sh -c` command for the compound deploy-script invocations.
pub fn shell(script: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(script);
    command
}

/// Capture stdout regardless of the exit status; a failing test run still
/// produces the report we scrape.
pub fn capture_output(command: &mut Command) -> Result<String> {
    Ok(String::from_utf8(command.output()?.stdout)?)
}
