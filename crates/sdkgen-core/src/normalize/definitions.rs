use std::collections::HashSet;

use indexmap::IndexMap;
use serde_yaml_ng::Mapping;

use crate::model::{Definition, DefinitionKind, DynamicQuery, Property, TypeRef};

use super::properties::decode_schema;
use super::raw::{mapping_entries, Node};
use super::Context;

/// Decode the raw `definitions` section into object definitions.
///
/// Hoisted enums are collected on `cx` and merged by the caller once every
/// raw definition has been read.
pub(super) fn decode_definitions(raw: &Mapping, cx: &mut Context<'_>) -> IndexMap<String, Definition> {
    let mut definitions = IndexMap::new();
    for (key, body) in mapping_entries(raw, "definitions", &mut cx.diagnostics) {
        log::debug!("saw definition {key}");
        let mut def = Definition::new(key, DefinitionKind::Object);
        if let Some(body) = body {
            let location = format!("definitions.{key}");
            decode_definition(&mut def, Node::new(body, &location), cx);
        }
        definitions.insert(key.to_string(), def);
    }
    definitions
}

/// Mark the listed request bodies as dynamic queries. Each referenced
/// definition becomes one characteristic of the query; keys that name no
/// definition are ignored.
pub(super) fn mark_dynamic_queries(definitions: &mut IndexMap<String, Definition>, keys: &[String]) {
    for key in keys {
        let Some(def) = definitions.get_mut(key) else {
            log::debug!("dynamic query {key} is not defined");
            continue;
        };
        let mut characteristics: Vec<String> = Vec::new();
        for reference in def.properties.iter().filter_map(Property::reference) {
            if !characteristics.iter().any(|c| c == reference) {
                characteristics.push(reference.to_string());
            }
        }
        log::debug!("dynamic query {key} over {}", characteristics.join(", "));
        def.dynamic_query = Some(DynamicQuery { characteristics });
    }
}

fn decode_definition(def: &mut Definition, node: Node<'_>, cx: &mut Context<'_>) {
    if let Some(title) = node.string("title", &mut cx.diagnostics) {
        def.description = title;
    }

    let required_field = node.names_field("required");
    let required: HashSet<&str> = node
        .take(required_field, "required", "name or list of names", &mut cx.diagnostics)
        .unwrap_or_default()
        .into_iter()
        .collect();

    let Some(properties) = node.mapping_of("properties", &mut cx.diagnostics) else {
        return;
    };
    let location = format!("{}.properties", node.location());
    for (key, body) in mapping_entries(properties, &location, &mut cx.diagnostics) {
        let mut property = Property::new(key, TypeRef::Unknown);
        property.required = required.contains(key);
        if let Some(body) = body {
            let property_location = format!("{location}.{key}");
            decode_schema(&mut property, Node::new(body, &property_location), cx);
        }
        def.properties.push(property);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tables;

    fn decode(yaml: &str) -> IndexMap<String, Definition> {
        let tables = Tables::default();
        let mut cx = Context::new(&tables, false);
        let raw: Mapping = serde_yaml_ng::from_str(yaml).unwrap();
        decode_definitions(&raw, &mut cx)
    }

    #[test]
    fn test_required_accepts_list() {
        let defs = decode(
            r#"
Member:
  title: A member of a group
  required: [id, name]
  properties:
    id: {type: string}
    name: {type: string}
    bio: {type: string}
"#,
        );
        let member = &defs["Member"];
        assert_eq!(member.description, "A member of a group");
        let required: Vec<(&str, bool)> = member
            .properties
            .iter()
            .map(|p| (p.key.as_str(), p.required))
            .collect();
        assert_eq!(required, vec![("bio", false), ("id", true), ("name", true)]);
    }

    #[test]
    fn test_required_accepts_scalar() {
        let defs = decode(
            r#"
Group:
  required: id
  properties:
    id: {type: string}
    name: {type: string}
"#,
        );
        let group = &defs["Group"];
        assert!(group.properties.iter().any(|p| p.key == "id" && p.required));
        assert!(group.properties.iter().any(|p| p.key == "name" && !p.required));
    }

    #[test]
    fn test_malformed_definition_body_is_empty_object() {
        let defs = decode("Broken: 3\nEmpty:\n");
        assert_eq!(defs.len(), 2);
        assert!(defs["Broken"].properties.is_empty());
        assert_eq!(defs["Empty"].kind, DefinitionKind::Object);
    }

    #[test]
    fn test_mark_dynamic_queries() {
        let mut defs = decode(
            r#"
ListMembersRequestBody:
  properties:
    filters: {$ref: '#/definitions/ListMembersDynamicQueryFilters'}
    sort: {$ref: '#/definitions/ListMembersDynamicQuerySort'}
    also_filters: {$ref: '#/definitions/ListMembersDynamicQueryFilters'}
    limit: {type: integer}
CreateMemberRequestBody:
  properties:
    name: {type: string}
"#,
        );
        let keys = vec!["ListMembersRequestBody".to_string(), "Missing".to_string()];
        mark_dynamic_queries(&mut defs, &keys);

        let query = defs["ListMembersRequestBody"].dynamic_query.as_ref().unwrap();
        assert_eq!(
            query.characteristics,
            vec!["ListMembersDynamicQueryFilters", "ListMembersDynamicQuerySort"]
        );
        assert!(defs["CreateMemberRequestBody"].dynamic_query.is_none());
    }
}
