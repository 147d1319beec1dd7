//! A temporary file holding a rendered resource configuration.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use super::Result;

/// Keeps a rendered configuration on disk for the lifetime of the value and
/// hands out the path to pass to external CLIs.
#[derive(Debug)]
pub struct ResourceFile {
    file: NamedTempFile,
}

impl ResourceFile {
    pub fn new(data: &str) -> Result<Self> {
        let mut file = NamedTempFile::new()?;
        file.write_all(data.as_bytes())?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_the_rendered_content_on_disk() {
        let file = ResourceFile::new("name: \"ixia-c\"\n").unwrap();
        let read_back = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(read_back, "name: \"ixia-c\"\n");
    }
}
