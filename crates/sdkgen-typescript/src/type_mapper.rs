use sdkgen_core::model::{Construction, Property, TypeRef};

use crate::emitters::ts_string;

/// Map a schema primitive type name to TypeScript.
pub fn primitive_to_ts(name: &str) -> &'static str {
    match name {
        "string" => "string",
        "integer" | "number" => "number",
        "boolean" => "boolean",
        "object" => "Record<string, unknown>",
        "file" => "Blob",
        _ => "unknown",
    }
}

/// Map a property type to its TypeScript spelling.
pub fn type_ref_to_ts(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Unknown => "unknown".to_string(),
        TypeRef::Primitive(name) => primitive_to_ts(name).to_string(),
        TypeRef::Named(name) => name.clone(),
        TypeRef::Array(Some(element)) => format!("{}[]", element_to_ts(element)),
        TypeRef::Array(None) => "unknown[]".to_string(),
    }
}

fn element_to_ts(element: &str) -> String {
    if sdkgen_core::model::is_primitive(element) {
        primitive_to_ts(element).to_string()
    } else {
        element.to_string()
    }
}

/// Whether `key` can be used as a bare TypeScript identifier.
pub fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Property name as written in a declaration: bare or single-quoted.
pub fn declared_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        ts_string(key)
    }
}

/// Member access suffix for `key`: `.key` or `['key']`.
pub fn accessor(key: &str) -> String {
    if is_identifier(key) {
        format!(".{key}")
    } else {
        format!("[{}]", declared_key(key))
    }
}

/// Expression that builds the property's value from the raw `data` object.
pub fn init_expr(property: &Property) -> String {
    let raw = format!("data{}", accessor(&property.key));
    match &property.construction {
        Construction::Plain => raw,
        Construction::Construct(name) => format!("new {name}({raw})"),
        Construction::ConstructEach(name) => {
            format!("({raw} ?? []).map((e: any) => new {name}(e))")
        }
        Construction::Cast(_) => format!("{raw} as {}", type_ref_to_ts(&property.ty)),
    }
}
