use std::collections::HashSet;

use indexmap::IndexMap;
use serde_yaml_ng::{Sequence, Value};

use crate::model::{Definition, DefinitionKind, Property, TypeRef};

use super::name_normalizer::pascal_key;

/// An inline enumeration promoted to a top-level definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoistedEnum {
    pub key: String,
    pub entries: Vec<String>,
}

impl HoistedEnum {
    fn into_definition(self) -> Definition {
        let mut def = Definition::new(self.key, DefinitionKind::Enum);
        def.enum_entries = self.entries;
        def
    }
}

/// Detects inline `enum` lists on properties and promotes them.
pub struct EnumHoister<'t> {
    exclusions: HashSet<&'t str>,
}

impl<'t> EnumHoister<'t> {
    pub fn new(exclusions: &'t [String]) -> Self {
        Self {
            exclusions: exclusions.iter().map(String::as_str).collect(),
        }
    }

    /// Hoist the property's inline enum, rewiring the property to reference
    /// the hoisted key. Excluded keys leave the property untouched.
    pub fn hoist(&self, property: &mut Property, raw_entries: &Sequence) -> Option<HoistedEnum> {
        let key = pascal_key(&property.key);
        if self.exclusions.contains(key.as_str()) {
            log::debug!("enum on '{}' excluded from hoisting", property.key);
            return None;
        }
        property.ty = TypeRef::Named(key.clone());
        Some(HoistedEnum {
            key,
            entries: enum_entries(raw_entries),
        })
    }
}

/// Normalize raw enum entries to strings. Numbers and booleans are
/// stringified; nested values are skipped.
pub fn enum_entries(raw: &Sequence) -> Vec<String> {
    raw.iter()
        .filter_map(|entry| match entry {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect()
}

/// Insert hoisted enums that are not already defined. The first enum hoisted
/// under a key wins; existing definitions are never overwritten.
///
/// Returns the number of definitions added.
pub fn merge_hoisted(
    definitions: &mut IndexMap<String, Definition>,
    hoisted: impl IntoIterator<Item = HoistedEnum>,
) -> usize {
    let mut added = 0;
    for candidate in hoisted {
        if definitions.contains_key(&candidate.key) {
            log::debug!("reusing existing definition '{}'", candidate.key);
            continue;
        }
        definitions.insert(candidate.key.clone(), candidate.into_definition());
        added += 1;
    }
    added
}
