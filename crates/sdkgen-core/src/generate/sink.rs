use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SinkError;

use super::artifact::Artifact;

/// Persists a finished artifact set.
pub trait ArtifactSink {
    fn persist(&mut self, artifacts: &[Artifact]) -> Result<(), SinkError>;
}

/// Writes artifacts under a root directory, one file per artifact at
/// `<root>/<directory>/<name>`.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactSink for DirectorySink {
    fn persist(&mut self, artifacts: &[Artifact]) -> Result<(), SinkError> {
        for artifact in artifacts {
            let dir = if artifact.directory.is_empty() {
                self.root.clone()
            } else {
                self.root.join(&artifact.directory)
            };
            fs::create_dir_all(&dir).map_err(|source| SinkError::CreateDir {
                path: dir.display().to_string(),
                source,
            })?;
            let path = dir.join(&artifact.name);
            fs::write(&path, &artifact.body).map_err(|source| SinkError::Write {
                path: path.display().to_string(),
                source,
            })?;
            log::info!("wrote {}", path.display());
        }
        Ok(())
    }
}
