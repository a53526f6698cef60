use std::{fs, path::PathBuf};
use tracing::{debug, warn};

use crate::error::Result;

/// Debug copies of raw payloads. Each write replaces the previous file of the same name.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Writes `<dir>/<name>.json`. Failures are logged and otherwise ignored.
    pub fn write(&self, name: &str, raw_json: &str) {
        match self.try_write(name, raw_json) {
            Ok(path) => debug!("Wrote snapshot to {:?}", path),
            Err(e) => warn!(error = %e, name, "Failed to write payload snapshot"),
        }
    }

    fn try_write(&self, name: &str, raw_json: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let value: serde_json::Value = serde_json::from_str(raw_json)?;
        let path = self.dir.join(format!("{}.json", name));
        fs::write(&path, serde_json::to_string_pretty(&value)?)?;
        Ok(path)
    }
}
