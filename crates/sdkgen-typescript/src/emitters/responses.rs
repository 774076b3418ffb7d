use std::collections::HashSet;

use minijinja::{Environment, context};
use sdkgen_core::generate::job::is_response_body;
use sdkgen_core::model::{Definition, Property, Returns, TypeRef};

use super::models::field_ctx;
use super::{HEADER, Imports};
use crate::error::EmitError;

const GENERIC_RESPONSE: &str = "GenericResponse";
const SUCCESS_RESPONSE: &str = "SuccessResponse";
const PAGINATED_RESPONSE: &str = "PaginatedResponse";

/// Properties declared by the base response classes.
const BASE_FIELDS: [&str; 2] = ["ok", "data"];

/// Declared by `PaginatedResponse` on top of the base fields.
const PAGINATION_FIELD: &str = "pagination";

/// Emit `definitions/responses.ts`: response classes plus the wrapper bodies
/// they extend.
pub fn emit_responses(
    env: &Environment<'_>,
    definitions: &[&Definition],
) -> Result<String, EmitError> {
    let tmpl = env.get_template("responses.ts.j2")?;

    let local: HashSet<&str> = definitions.iter().map(|d| d.key.as_str()).collect();
    let mut imports = Imports::default();
    let mut responses = Vec::new();
    // Wrapper bodies first: a class must be declared before it is extended.
    let (wrappers, plain): (Vec<&Definition>, Vec<&Definition>) =
        definitions.iter().copied().partition(|d| is_response_body(d));
    for def in wrappers.into_iter().chain(plain) {
        let shape = if is_response_body(def) {
            wrapper_shape(def)
        } else {
            response_shape(def)
        };
        imports.add(&shape.base);
        for name in &shape.type_args {
            imports.add(name);
        }
        if let Some(returns) = &def.returns {
            imports.add(&returns.entity);
        }
        let fields: Vec<&Property> = def
            .properties
            .iter()
            .filter(|p| !BASE_FIELDS.contains(&p.key.as_str()))
            .filter(|p| !(shape.base == PAGINATED_RESPONSE && p.key == PAGINATION_FIELD))
            .collect();
        for field in &fields {
            imports.add_property(field);
        }
        log::debug!("saw response {} extends {}", def.key, shape.extends);
        responses.push(context! {
            name => def.key.clone(),
            description => def.description.clone(),
            params => shape.params,
            extends => shape.extends,
            super_args => shape.super_args,
            fields => fields.into_iter().map(field_ctx).collect::<Vec<_>>(),
        });
    }

    Ok(tmpl.render(context! {
        header => HEADER,
        imports => imports.definition_lines(&local),
        responses => responses,
    })?)
}

struct Shape {
    /// Generic parameter list of the class, possibly empty.
    params: &'static str,
    /// Parent class name without type arguments.
    base: String,
    /// Parent class as written in the `extends` clause.
    extends: String,
    /// Named types used only in the `extends` clause.
    type_args: Vec<String>,
    super_args: String,
}

/// Whether a wrapper body carries a typed `data` payload.
pub fn is_generic_wrapper(definition: &Definition) -> bool {
    definition.properties.len() >= 2 && !definition.key.to_lowercase().contains("error")
}

fn wrapper_shape(def: &Definition) -> Shape {
    if !is_generic_wrapper(def) {
        return Shape {
            params: "",
            base: GENERIC_RESPONSE.to_string(),
            extends: GENERIC_RESPONSE.to_string(),
            type_args: Vec::new(),
            super_args: "data".to_string(),
        };
    }
    if !def.paginated {
        return Shape {
            params: "<T = unknown>",
            base: SUCCESS_RESPONSE.to_string(),
            extends: format!("{SUCCESS_RESPONSE}<T>"),
            type_args: Vec::new(),
            super_args: "data".to_string(),
        };
    }
    let pagination = def
        .properties
        .iter()
        .find(|p| p.key == PAGINATION_FIELD)
        .and_then(|p| match &p.ty {
            TypeRef::Named(name) => Some(name.clone()),
            _ => None,
        });
    let extends = match &pagination {
        Some(name) => format!("{PAGINATED_RESPONSE}<T, {name}>"),
        None => format!("{PAGINATED_RESPONSE}<T>"),
    };
    Shape {
        params: "<T = unknown>",
        base: PAGINATED_RESPONSE.to_string(),
        extends,
        type_args: pagination.into_iter().collect(),
        super_args: "data".to_string(),
    }
}

fn response_shape(def: &Definition) -> Shape {
    let base = def.extends.clone().unwrap_or_else(|| {
        if def.returns.is_some() {
            SUCCESS_RESPONSE.to_string()
        } else {
            GENERIC_RESPONSE.to_string()
        }
    });
    match &def.returns {
        Some(returns) => Shape {
            params: "",
            extends: format!("{base}<{returns}>"),
            base,
            type_args: Vec::new(),
            super_args: payload_args(returns),
        },
        None => Shape {
            params: "",
            extends: base.clone(),
            base,
            type_args: Vec::new(),
            super_args: "data".to_string(),
        },
    }
}

/// Super call arguments that construct the payload entity.
fn payload_args(returns: &Returns) -> String {
    let entity = &returns.entity;
    if returns.collection {
        format!("{{ ...data, data: (data.data ?? []).map((e: any) => new {entity}(e)) }}")
    } else {
        format!("{{ ...data, data: new {entity}(data.data) }}")
    }
}
