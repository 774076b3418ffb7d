use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

use serde::Serialize;

use crate::error::ArtifactError;

/// Output category. Each generation job owns exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Client,
    Models,
    Enums,
    Requests,
    Responses,
    Validation,
    /// Literal files shipped by the emitter (indexes, lookup tables).
    Static,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Client => "client",
            ArtifactKind::Models => "models",
            ArtifactKind::Enums => "enums",
            ArtifactKind::Requests => "requests",
            ArtifactKind::Responses => "responses",
            ArtifactKind::Validation => "validation",
            ArtifactKind::Static => "static",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated file: body plus the sub-directory it belongs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    /// Relative sub-directory; empty for the output root.
    pub directory: String,
    /// File name including extension.
    pub name: String,
    pub body: String,
}

impl Artifact {
    pub fn new(
        kind: ArtifactKind,
        directory: impl Into<String>,
        name: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            directory: directory.into(),
            name: name.into(),
            body: body.into(),
        }
    }

    /// `<directory>/<name>`, or just the name at the root.
    pub fn path(&self) -> String {
        if self.directory.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.directory, self.name)
        }
    }
}

/// Write-once artifact store shared by the generation workers.
#[derive(Debug, Default)]
pub struct ArtifactMap {
    entries: Mutex<BTreeMap<String, Artifact>>,
}

impl ArtifactMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `artifact` under its path. A second insert under the same path
    /// is rejected and leaves the first entry in place.
    pub fn insert_once(&self, artifact: Artifact) -> Result<(), ArtifactError> {
        let path = artifact.path();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.contains_key(&path) {
            return Err(ArtifactError::Duplicate(path));
        }
        entries.insert(path, artifact);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All artifacts, ordered by path.
    pub fn snapshot(&self) -> Vec<Artifact> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect()
    }

    pub fn into_sorted(self) -> Vec<Artifact> {
        self.entries
            .into_inner()
            .unwrap_or_else(|e| e.into_inner())
            .into_values()
            .collect()
    }
}
