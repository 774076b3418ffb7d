//! Infers the entity a response wraps from its key.
//!
//! Keys follow `<Entity><Operation>[<Suffix>]Response`. Matching is done by
//! hand over ASCII so the result depends on nothing but the key and the
//! override tables.

use crate::config::ResponseTables;
use crate::model::Returns;

use super::name_normalizer::strip_plural;

const RESPONSE: &str = "Response";
const OPERATIONS: [Operation; 4] = [
    Operation::Create,
    Operation::Get,
    Operation::List,
    Operation::Update,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Create,
    Get,
    List,
    Update,
}

impl Operation {
    fn word(self) -> &'static str {
        match self {
            Operation::Create => "Create",
            Operation::Get => "Get",
            Operation::List => "List",
            Operation::Update => "Update",
        }
    }
}

/// The pieces of a response key that matched the naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KeyParts<'a> {
    entity: &'a str,
    operation: Operation,
    suffix: &'a str,
}

/// Split `key` into entity, operation and suffix.
///
/// The entity is the longest alphabetic run ending in a lowercase letter
/// right before an operation word; the suffix, if any, is alphabetic and
/// runs up to the final `Response`.
fn split_key(key: &str) -> Option<KeyParts<'_>> {
    let stem = &key[..key.rfind(RESPONSE)?];
    let bytes = stem.as_bytes();

    // The entity is greedy, so the latest operation word wins.
    let mut best: Option<(usize, KeyParts<'_>)> = None;
    for operation in OPERATIONS {
        let word = operation.word();
        for (at, _) in stem.match_indices(word) {
            if at < 2 || !bytes[at - 1].is_ascii_lowercase() {
                continue;
            }
            if best.is_some_and(|(prev, _)| prev > at) {
                continue;
            }
            let suffix = &stem[at + word.len()..];
            if !suffix.bytes().all(|b| b.is_ascii_alphabetic()) {
                continue;
            }
            let head = &stem[..at];
            let start = head
                .bytes()
                .rposition(|b| !b.is_ascii_alphabetic())
                .map_or(0, |i| i + 1);
            let entity = &head[start..];
            if entity.len() < 2 {
                continue;
            }
            best = Some((
                at,
                KeyParts {
                    entity,
                    operation,
                    suffix,
                },
            ));
        }
    }
    best.map(|(_, parts)| parts)
}

/// Infer the payload type wrapped by the response `key`.
///
/// `returns_overrides` wins for any key. Otherwise `Create` returns the
/// entity unless it is an irregular collection name, `Get` returns entity
/// plus suffix, `List` returns the singular entity as a collection, and
/// `Update` returns only for suffixes listed in `update_returns`.
pub fn infer_returns(key: &str, tables: &ResponseTables) -> Option<Returns> {
    if let Some(raw) = tables.returns_overrides.get(key) {
        return Some(Returns::parse(raw));
    }
    let parts = split_key(key)?;
    match parts.operation {
        Operation::Create => {
            if tables.create_exclusions.iter().any(|e| e == parts.entity) {
                None
            } else {
                Some(Returns::single(parts.entity))
            }
        }
        Operation::Get => Some(Returns::single(format!("{}{}", parts.entity, parts.suffix))),
        Operation::List => Some(Returns::collection(strip_plural(parts.entity))),
        Operation::Update => tables
            .update_returns
            .get(parts.suffix)
            .map(|raw| Returns::parse(raw)),
    }
}

/// Whether `key` names a paginated response wrapper.
pub fn is_paginated(key: &str, tables: &ResponseTables) -> bool {
    tables
        .paginated
        .iter()
        .any(|p| p.eq_ignore_ascii_case(key))
}
