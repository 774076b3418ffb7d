use indexmap::IndexMap;
use serde::Serialize;

use super::definition::Definition;
use super::path::Path;

/// The normalized, read-only schema built once per run.
///
/// Map iteration order carries no meaning; consumers go through
/// [`Document::sorted_definitions`] and friends when order matters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    pub meta: DocumentMeta,
    pub host: String,
    pub base_path: String,
    pub definitions: IndexMap<String, Definition>,
    pub responses: IndexMap<String, Definition>,
    pub paths: IndexMap<String, Path>,
}

/// API metadata from `info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentMeta {
    pub title: String,
    pub version: String,
}

impl Document {
    pub fn sorted_definitions(&self) -> Vec<&Definition> {
        sorted_values(&self.definitions)
    }

    pub fn sorted_responses(&self) -> Vec<&Definition> {
        sorted_values(&self.responses)
    }

    pub fn sorted_paths(&self) -> Vec<&Path> {
        sorted_values(&self.paths)
    }
}

fn sorted_values<V>(map: &IndexMap<String, V>) -> Vec<&V> {
    let mut entries: Vec<(&String, &V)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries.into_iter().map(|(_, v)| v).collect()
}
