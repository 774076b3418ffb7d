use indexmap::IndexMap;
use serde_yaml_ng::{Mapping, Value};

use crate::model::{HttpVerb, ParamLocation, Path, Property, TypeRef};
use crate::transform::name_normalizer::route_to_operation;

use super::properties::decode_schema;
use super::raw::{kind_of, mapping_entries, Node};
use super::text::first_sentence;
use super::Context;

/// Decode the raw `paths` section.
///
/// A route with a single verb is keyed by the route itself; a route with
/// several verbs yields one path per verb, keyed `<route>#<verb>`.
pub(super) fn decode_paths(raw: &Mapping, cx: &mut Context<'_>) -> IndexMap<String, Path> {
    let mut paths = IndexMap::new();
    for (route, body) in mapping_entries(raw, "paths", &mut cx.diagnostics) {
        let Some(body) = body else { continue };
        let route_location = format!("paths.{route}");
        let mut operations: Vec<(HttpVerb, Option<&Mapping>)> = Vec::new();
        for (verb, op) in body {
            // Route-level keys such as `parameters` are not operations.
            let Some(verb) = verb.as_str().and_then(HttpVerb::parse) else {
                continue;
            };
            match op {
                Value::Mapping(m) => operations.push((verb, Some(m))),
                Value::Null => operations.push((verb, None)),
                other => {
                    cx.diagnostics
                        .record(&route_location, verb.as_str(), "mapping", kind_of(other));
                    operations.push((verb, None));
                }
            }
        }
        operations.sort_by_key(|(verb, _)| verb.as_str());

        let split = operations.len() > 1;
        for (verb, op) in operations {
            let key = if split {
                format!("{route}#{}", verb.as_str())
            } else {
                route.to_string()
            };
            log::debug!("saw path {key}");
            let mut path = Path {
                key: route.to_string(),
                verb,
                operation: String::new(),
                description: String::new(),
                parameters: Vec::new(),
            };
            if let Some(op) = op {
                let location = format!("{route_location}.{}", verb.as_str());
                decode_operation(&mut path, Node::new(op, &location), cx);
            }
            if path.operation.is_empty() {
                path.operation = route_to_operation(verb.as_str(), route);
            }
            paths.insert(key, path);
        }
    }
    paths
}

fn decode_operation(path: &mut Path, node: Node<'_>, cx: &mut Context<'_>) {
    if let Some(id) = node.string("operationId", &mut cx.diagnostics) {
        path.operation = id;
    }
    if let Some(summary) = node.string("summary", &mut cx.diagnostics) {
        path.description = first_sentence(&summary);
    }
    let Some(parameters) = node.sequence("parameters", &mut cx.diagnostics) else {
        return;
    };
    for (index, raw) in parameters.iter().enumerate() {
        let location = format!("{}.parameters[{index}]", node.location());
        let Value::Mapping(map) = raw else {
            cx.diagnostics
                .record(node.location(), "parameters", "mapping", kind_of(raw));
            continue;
        };
        path.parameters
            .push(decode_parameter(Node::new(map, &location), cx));
    }
}

fn decode_parameter(node: Node<'_>, cx: &mut Context<'_>) -> Property {
    let d = &mut cx.diagnostics;
    let key = node.string("name", d).unwrap_or_default();
    let mut param = Property::new(key, TypeRef::Unknown);
    param.required = node.bool("required", d).unwrap_or(false);
    param.location = node.string("in", d).as_deref().and_then(ParamLocation::parse);
    decode_schema(&mut param, node, cx);
    param
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tables;

    fn decode(yaml: &str) -> IndexMap<String, Path> {
        let tables = Tables::default();
        let mut cx = Context::new(&tables, false);
        let raw: Mapping = serde_yaml_ng::from_str(yaml).unwrap();
        decode_paths(&raw, &mut cx)
    }

    #[test]
    fn test_single_verb_keyed_by_route() {
        let paths = decode(
            r#"
/members.create:
  post:
    operationId: createMember
    summary: Create a member. Requires admin.
    parameters:
      - name: body
        in: body
        required: true
        schema:
          $ref: '#/definitions/CreateMemberRequest'
"#,
        );
        let path = &paths["/members.create"];
        assert_eq!(path.verb, HttpVerb::Post);
        assert_eq!(path.operation, "createMember");
        assert_eq!(path.description, "Create a member.");
        assert_eq!(path.parameters.len(), 1);
        let body = &path.parameters[0];
        assert!(body.is_body());
        assert!(body.required);
        assert_eq!(body.ty, TypeRef::Named("CreateMemberRequest".into()));
    }

    #[test]
    fn test_multiple_verbs_split_and_derive_operation() {
        let paths = decode(
            r#"
/members/{member_id}:
  parameters: []
  get:
    parameters:
      - {name: member_id, in: path, required: true, type: string}
  delete: {}
"#,
        );
        let keys: Vec<&str> = paths.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["/members/{member_id}#delete", "/members/{member_id}#get"]
        );
        assert_eq!(paths["/members/{member_id}#get"].operation, "getMember");
        assert_eq!(paths["/members/{member_id}#delete"].operation, "deleteMember");
        let param = &paths["/members/{member_id}#get"].parameters[0];
        assert_eq!(param.location, Some(ParamLocation::Path));
        assert_eq!(param.key, "member_id");
    }

    #[test]
    fn test_non_mapping_parameter_is_skipped() {
        let paths = decode("/ping:\n  get:\n    operationId: ping\n    parameters: [3]\n");
        assert!(paths["/ping"].parameters.is_empty());
    }
}
