//! Typed access over the generic YAML tree.
//!
//! Every lookup distinguishes a missing key from a value of the wrong shape.
//! Malformed values decay to "absent" for the caller, and are recorded in
//! [`Diagnostics`] only when reporting was requested.

use serde::Serialize;
use serde_yaml_ng::{Mapping, Sequence, Value};

/// Outcome of reading one optional field.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Absent,
    Malformed { found: &'static str },
    Present(T),
}

impl<T> Field<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Field::Absent => Field::Absent,
            Field::Malformed { found } => Field::Malformed { found },
            Field::Present(v) => Field::Present(f(v)),
        }
    }
}

/// A soft structural mismatch in the input document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Dotted location of the enclosing node, e.g. `definitions.Member.properties.age`.
    pub location: String,
    pub field: String,
    pub expected: &'static str,
    pub found: &'static str,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.location.is_empty() {
            write!(f, "{}.", self.location)?;
        }
        write!(
            f,
            "{}: expected {}, found {}",
            self.field, self.expected, self.found
        )
    }
}

/// Collects soft mismatches when enabled; otherwise swallows them.
#[derive(Debug, Default)]
pub struct Diagnostics {
    enabled: bool,
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: Vec::new(),
        }
    }

    pub(super) fn record(&mut self, location: &str, field: &str, expected: &'static str, found: &'static str) {
        if !self.enabled {
            return;
        }
        let diagnostic = Diagnostic {
            location: location.to_string(),
            field: field.to_string(),
            expected,
            found,
        };
        log::warn!("soft mismatch at {diagnostic}");
        self.entries.push(diagnostic);
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}

/// A mapping node together with its location in the document.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    map: &'a Mapping,
    location: &'a str,
}

impl<'a> Node<'a> {
    pub fn new(map: &'a Mapping, location: &'a str) -> Self {
        Self { map, location }
    }

    pub fn location(&self) -> &'a str {
        self.location
    }

    pub fn mapping(&self) -> &'a Mapping {
        self.map
    }

    fn raw(&self, key: &str) -> Option<&'a Value> {
        match self.map.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    pub fn str_field(&self, key: &str) -> Field<&'a str> {
        match self.raw(key) {
            None => Field::Absent,
            Some(Value::String(s)) => Field::Present(s.as_str()),
            Some(other) => Field::Malformed {
                found: kind_of(other),
            },
        }
    }

    pub fn bool_field(&self, key: &str) -> Field<bool> {
        match self.raw(key) {
            None => Field::Absent,
            Some(Value::Bool(b)) => Field::Present(*b),
            Some(other) => Field::Malformed {
                found: kind_of(other),
            },
        }
    }

    pub fn u64_field(&self, key: &str) -> Field<u64> {
        match self.raw(key) {
            None => Field::Absent,
            Some(Value::Number(n)) => match n.as_u64() {
                Some(v) => Field::Present(v),
                None => Field::Malformed { found: "number" },
            },
            Some(other) => Field::Malformed {
                found: kind_of(other),
            },
        }
    }

    pub fn f64_field(&self, key: &str) -> Field<f64> {
        match self.raw(key) {
            None => Field::Absent,
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) => Field::Present(v),
                None => Field::Malformed { found: "number" },
            },
            Some(other) => Field::Malformed {
                found: kind_of(other),
            },
        }
    }

    pub fn map_field(&self, key: &str) -> Field<&'a Mapping> {
        match self.raw(key) {
            None => Field::Absent,
            Some(Value::Mapping(m)) => Field::Present(m),
            Some(other) => Field::Malformed {
                found: kind_of(other),
            },
        }
    }

    pub fn seq_field(&self, key: &str) -> Field<&'a Sequence> {
        match self.raw(key) {
            None => Field::Absent,
            Some(Value::Sequence(s)) => Field::Present(s),
            Some(other) => Field::Malformed {
                found: kind_of(other),
            },
        }
    }

    /// Either a list of names or a single scalar name.
    pub fn names_field(&self, key: &str) -> Field<Vec<&'a str>> {
        match self.raw(key) {
            None => Field::Absent,
            Some(Value::String(s)) => Field::Present(vec![s.as_str()]),
            Some(Value::Sequence(items)) => {
                Field::Present(items.iter().filter_map(Value::as_str).collect())
            }
            Some(other) => Field::Malformed {
                found: kind_of(other),
            },
        }
    }

    /// Resolve a field to an `Option`, reporting malformed shapes.
    pub fn take<T>(
        &self,
        field: Field<T>,
        key: &str,
        expected: &'static str,
        diagnostics: &mut Diagnostics,
    ) -> Option<T> {
        match field {
            Field::Absent => None,
            Field::Malformed { found } => {
                diagnostics.record(self.location, key, expected, found);
                None
            }
            Field::Present(v) => Some(v),
        }
    }

    pub fn string(&self, key: &str, diagnostics: &mut Diagnostics) -> Option<String> {
        let field = self.str_field(key);
        self.take(field, key, "string", diagnostics)
            .map(str::to_string)
    }

    pub fn bool(&self, key: &str, diagnostics: &mut Diagnostics) -> Option<bool> {
        let field = self.bool_field(key);
        self.take(field, key, "boolean", diagnostics)
    }

    pub fn u64(&self, key: &str, diagnostics: &mut Diagnostics) -> Option<u64> {
        let field = self.u64_field(key);
        self.take(field, key, "non-negative integer", diagnostics)
    }

    pub fn f64(&self, key: &str, diagnostics: &mut Diagnostics) -> Option<f64> {
        let field = self.f64_field(key);
        self.take(field, key, "number", diagnostics)
    }

    pub fn mapping_of(&self, key: &str, diagnostics: &mut Diagnostics) -> Option<&'a Mapping> {
        let field = self.map_field(key);
        self.take(field, key, "mapping", diagnostics)
    }

    pub fn sequence(&self, key: &str, diagnostics: &mut Diagnostics) -> Option<&'a Sequence> {
        let field = self.seq_field(key);
        self.take(field, key, "sequence", diagnostics)
    }
}

/// Iterate the string-keyed mapping entries of `map`, skipping (and
/// reporting) entries whose value is not itself a mapping.
pub fn mapping_entries<'a>(
    map: &'a Mapping,
    location: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<(&'a str, Option<&'a Mapping>)> {
    let mut entries = Vec::with_capacity(map.len());
    for (key, value) in map {
        let Some(key) = key.as_str() else {
            diagnostics.record(location, "<key>", "string", kind_of(key));
            continue;
        };
        match value {
            Value::Mapping(m) => entries.push((key, Some(m))),
            Value::Null => entries.push((key, None)),
            other => {
                diagnostics.record(location, key, "mapping", kind_of(other));
                entries.push((key, None));
            }
        }
    }
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
