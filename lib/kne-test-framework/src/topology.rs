//! Manage KNE topologies.

use std::process::{Command, Stdio};

use crate::{resource_file::ResourceFile, up_down, Result};

/// Parameters required to build the `kne` commands that manage one topology
/// configuration on the cluster.
#[derive(Debug)]
pub struct CommandBuilder {
    kne_command: String,
    config_file: ResourceFile,
}

impl up_down::CommandBuilder for CommandBuilder {
    fn build(&self, command_to_build: up_down::CommandToBuild) -> Command {
        let mut command = Command::new(&self.kne_command);
        command
            .arg(match command_to_build {
                up_down::CommandToBuild::Up => "create",
                up_down::CommandToBuild::Down => "delete",
            })
            .arg(self.config_file.path())
            .stdin(Stdio::null());
        command
    }
}

/// Takes care of deploying a topology configuration into the cluster.
///
/// The configuration is rendered to a temp file that lives as long as the
/// manager, so `kne delete` can still consume it during turndown.
pub fn manager(kne_command: &str, config: &str) -> Result<up_down::Manager<CommandBuilder>> {
    let config_file = ResourceFile::new(config)?;
    Ok(up_down::Manager::new(CommandBuilder {
        kne_command: kne_command.to_owned(),
        config_file,
    }))
}
