//! Clear generated artifacts out of the testbed directory.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use tracing::info;

/// Extensions of files a regression run leaves behind.
const GENERATED_EXTENSIONS: &[&str] = &["log", "csv", "html", "tar", "yaml"];

/// Prefixes of directories a regression run leaves behind.
const GENERATED_DIR_PREFIXES: &[&str] = &["logs", "kne", "parsed"];

#[derive(Args, Debug)]
#[command(about = "Remove generated artifacts from the testbed directory")]
pub struct Cli {
    /// Directory to clean.
    #[arg(long, default_value = ".")]
    testbed: PathBuf,
}

impl Cli {
    pub fn exec(self) -> Result<()> {
        for entry in std::fs::read_dir(&self.testbed)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                if starts_with_any(&path, GENERATED_DIR_PREFIXES) {
                    info!(path = %path.display(), "removing directory");
                    std::fs::remove_dir_all(&path)?;
                }
            } else if is_generated_file(&path) {
                info!(path = %path.display(), "removing file");
                std::fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

fn starts_with_any(path: &Path, prefixes: &[&str]) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| prefixes.iter().any(|prefix| name.starts_with(prefix)))
        .unwrap_or(false)
}

fn is_generated_file(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| GENERATED_EXTENSIONS.contains(&extension))
        .unwrap_or(false)
        || path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.ends_with(".tar.gz"))
            .unwrap_or(false)
}
