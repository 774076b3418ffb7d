use indexmap::IndexMap;
use serde_yaml_ng::Mapping;

use crate::config::Tables;
use crate::model::{Definition, DefinitionKind, Property, TypeRef};
use crate::transform::name_normalizer::pascal_key;
use crate::transform::response_shape::{infer_returns, is_paginated};

use super::raw::{mapping_entries, Node};
use super::text::{first_sentence, to_ref};
use super::Context;

/// Decode the raw `responses` section into response wrapper definitions.
pub(super) fn decode_responses(
    raw: &Mapping,
    tables: &Tables,
    cx: &mut Context<'_>,
) -> IndexMap<String, Definition> {
    let mut responses = IndexMap::new();
    for (raw_key, body) in mapping_entries(raw, "responses", &mut cx.diagnostics) {
        if tables.skipped_responses.iter().any(|s| s == raw_key) {
            log::debug!("skipping response {raw_key}");
            continue;
        }
        let key = pascal_key(raw_key);
        log::debug!("saw response {key}");

        let mut def = Definition::new(key.as_str(), DefinitionKind::Object);
        def.returns = infer_returns(&key, &tables.responses);
        def.paginated = is_paginated(&key, &tables.responses);
        if let Some(body) = body {
            let location = format!("responses.{raw_key}");
            decode_response(&mut def, Node::new(body, &location), cx);
        }
        if responses.contains_key(&key) {
            log::warn!("response {raw_key} collides with {key}, keeping first");
            continue;
        }
        responses.insert(key, def);
    }
    responses
}

fn decode_response(def: &mut Definition, node: Node<'_>, cx: &mut Context<'_>) {
    let d = &mut cx.diagnostics;
    if let Some(text) = node.string("description", d) {
        def.description = first_sentence(&text);
    }

    let schema_location = format!("{}.schema", node.location());
    def.extends = node
        .mapping_of("schema", d)
        .and_then(|m| Node::new(m, &schema_location).string("$ref", d))
        .map(|r| to_ref(&r));

    let Some(headers) = node.mapping_of("headers", d) else {
        return;
    };
    let location = format!("{}.headers", node.location());
    for (key, header) in mapping_entries(headers, &location, d) {
        let mut property = Property::new(key, TypeRef::Unknown);
        if let Some(header) = header {
            let header_location = format!("{location}.{key}");
            let header = Node::new(header, &header_location);
            if let Some(ty) = header.string("type", d) {
                property.ty = TypeRef::Primitive(ty);
            }
            if let Some(text) = header.string("description", d) {
                property.description = first_sentence(&text);
            }
        }
        def.properties.push(property);
    }
}
