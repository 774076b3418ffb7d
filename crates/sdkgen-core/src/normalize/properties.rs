use crate::model::{Property, TypeRef};

use super::raw::Node;
use super::text::{first_sentence, to_ref};
use super::Context;

/// Fill `property` from a property or parameter schema node.
///
/// Type resolution: a `$ref` (own or under `schema`) wins; `array` takes its
/// element from `items.$ref`, then `items.type`; otherwise the primitive
/// `type`, with `schema.type` taking precedence. An inline `enum` is then
/// handed to the hoister, which may rewire the type to the hoisted key.
pub(super) fn decode_schema(property: &mut Property, node: Node<'_>, cx: &mut Context<'_>) {
    let d = &mut cx.diagnostics;

    if let Some(text) = node.string("description", d) {
        property.description = first_sentence(&text);
    }
    property.format = node.string("format", d);

    let schema_location = format!("{}.schema", node.location());
    let schema = node
        .mapping_of("schema", d)
        .map(|m| Node::new(m, &schema_location));

    let reference = node
        .string("$ref", d)
        .or_else(|| schema.and_then(|s| s.string("$ref", d)))
        .map(|r| to_ref(&r));
    let primitive = schema
        .and_then(|s| s.string("type", d))
        .or_else(|| node.string("type", d));

    let items_location = format!("{}.items", node.location());
    let items = node
        .mapping_of("items", d)
        .or_else(|| schema.and_then(|s| s.mapping_of("items", d)))
        .map(|m| Node::new(m, &items_location));
    let element = items.and_then(|i| {
        i.string("$ref", d)
            .map(|r| to_ref(&r))
            .or_else(|| i.string("type", d))
    });

    property.ty = match (reference, primitive) {
        (Some(name), _) => TypeRef::Named(name),
        (None, Some(p)) if p == "array" => TypeRef::Array(element),
        (None, Some(p)) => TypeRef::Primitive(p),
        (None, None) => TypeRef::Unknown,
    };

    if let Some(entries) = node.sequence("enum", d)
        && let Some(hoisted) = cx.hoister.hoist(property, entries)
    {
        cx.hoisted.push(hoisted);
    }

    let d = &mut cx.diagnostics;
    let v = &mut property.validation;
    v.pattern = node.string("pattern", d);
    v.min_length = node.u64("minLength", d);
    v.max_length = node.u64("maxLength", d);
    v.min_items = node.u64("minItems", d);
    v.max_items = node.u64("maxItems", d);
    v.minimum = node.f64("minimum", d);
    v.maximum = node.f64("maximum", d);
}
