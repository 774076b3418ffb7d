use std::collections::HashSet;

use minijinja::{Environment, context};
use sdkgen_core::model::{Definition, Path};

use super::models::field_ctx;
use super::{HEADER, Imports, has_request, request_name};
use crate::error::EmitError;

/// Emit `definitions/requests.ts`: the request body definitions, then one
/// payload interface per operation that takes a payload.
pub fn emit_requests(
    env: &Environment<'_>,
    paths: &[&Path],
    bodies: &[&Definition],
) -> Result<String, EmitError> {
    let tmpl = env.get_template("requests.ts.j2")?;

    let mut names: HashSet<String> = bodies.iter().map(|d| d.key.clone()).collect();
    let mut imports = Imports::default();
    let bodies: Vec<minijinja::Value> = bodies
        .iter()
        .map(|def| {
            for prop in &def.properties {
                imports.add_property(prop);
            }
            context! {
                name => def.key.clone(),
                description => body_description(def),
                fields => def.properties.iter().map(field_ctx).collect::<Vec<_>>(),
            }
        })
        .collect();

    let mut requests = Vec::new();
    for path in paths.iter().filter(|p| has_request(p)) {
        let name = request_name(&path.operation);
        if !names.insert(name.clone()) {
            log::warn!("duplicate request {name} for {}, keeping first", path.key);
            continue;
        }
        for param in &path.parameters {
            imports.add_property(param);
        }
        requests.push(context! {
            name => name,
            operation => path.operation.clone(),
            description => path.description.clone(),
            fields => path.parameters.iter().map(field_ctx).collect::<Vec<_>>(),
        });
    }
    log::debug!("generated {} request interfaces", requests.len());

    let local: HashSet<&str> = names.iter().map(String::as_str).collect();
    Ok(tmpl.render(context! {
        header => HEADER,
        imports => imports.definition_lines(&local),
        bodies => bodies,
        requests => requests,
    })?)
}

/// The body's own description, followed by the characteristics it selects
/// when it drives a dynamic query.
fn body_description(def: &Definition) -> String {
    let mut description = def.description.clone();
    if let Some(query) = &def.dynamic_query
        && !query.characteristics.is_empty()
    {
        if !description.is_empty() {
            description.push(' ');
        }
        description.push_str("Dynamic query over ");
        description.push_str(&query.characteristics.join(", "));
        description.push('.');
    }
    description
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitters::environment;
    use sdkgen_core::model::{DefinitionKind, DynamicQuery, HttpVerb, ParamLocation, Property, TypeRef};

    fn path(operation: &str, params: Vec<Property>) -> Path {
        Path {
            key: format!("/{operation}"),
            verb: HttpVerb::Post,
            operation: operation.into(),
            description: "Create a member.".into(),
            parameters: params,
        }
    }

    fn body(key: &str, ty: TypeRef, required: bool) -> Property {
        let mut p = Property::new(key, ty);
        p.location = Some(ParamLocation::Body);
        p.required = required;
        p
    }

    #[test]
    fn test_render() {
        let env = environment().unwrap();
        let create = path(
            "createMember",
            vec![
                body("name", TypeRef::Primitive("string".into()), true),
                body("role", TypeRef::Named("MemberRole".into()), false),
            ],
        );
        let ping = path("ping", vec![]);
        let out = emit_requests(&env, &[&create, &ping], &[]).unwrap();
        insta::assert_snapshot!(out, @r"
        // Code generated by sdkgen. DO NOT EDIT.
        import { MemberRole } from '.';

        /** CreateMemberRequest represents the createMember request: Create a member. */
        export interface CreateMemberRequest {
          name: string;
          role?: MemberRole;
        }
        ");
    }

    #[test]
    fn test_duplicate_operation_keeps_first() {
        let env = environment().unwrap();
        let a = path("createMember", vec![body("a", TypeRef::Primitive("string".into()), false)]);
        let b = path("createMember", vec![body("b", TypeRef::Primitive("string".into()), false)]);
        let out = emit_requests(&env, &[&a, &b], &[]).unwrap();
        assert_eq!(out.matches("export interface CreateMemberRequest").count(), 1);
        assert!(out.contains("  a?: string;"));
        assert!(!out.contains("  b?: string;"));
    }

    #[test]
    fn test_request_bodies_render_first() {
        let env = environment().unwrap();
        let mut query = Definition::new("ListMembersRequestBody", DefinitionKind::Object);
        query.dynamic_query = Some(DynamicQuery {
            characteristics: vec![
                "ListMembersDynamicQueryFilters".into(),
                "ListMembersDynamicQuerySort".into(),
            ],
        });
        query.properties = vec![
            Property::new("filters", TypeRef::Named("ListMembersDynamicQueryFilters".into())),
            Property::new("sort", TypeRef::Named("ListMembersDynamicQuerySort".into())),
        ];
        let mut list = path(
            "listMembers",
            vec![body("payload", TypeRef::Named("ListMembersRequestBody".into()), true)],
        );
        list.description = String::new();

        let out = emit_requests(&env, &[&list], &[&query]).unwrap();
        insta::assert_snapshot!(out, @r"
        // Code generated by sdkgen. DO NOT EDIT.
        import { ListMembersDynamicQueryFilters, ListMembersDynamicQuerySort } from '.';

        /** Dynamic query over ListMembersDynamicQueryFilters, ListMembersDynamicQuerySort. */
        export interface ListMembersRequestBody {
          filters?: ListMembersDynamicQueryFilters;
          sort?: ListMembersDynamicQuerySort;
        }

        /** ListMembersRequest represents the listMembers request */
        export interface ListMembersRequest {
          payload: ListMembersRequestBody;
        }
        ");
    }
}
