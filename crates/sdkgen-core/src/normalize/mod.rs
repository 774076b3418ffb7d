//! Schema normalization: generic YAML tree in, typed [`Document`] out.

mod definitions;
mod paths;
mod properties;
pub mod raw;
mod responses;
pub mod text;

use serde_yaml_ng::Value;

use crate::config::Tables;
use crate::error::ParseError;
use crate::model::{Document, DocumentMeta};
use crate::transform::enum_hoister::merge_hoisted;
use crate::transform::response_shape::is_paginated;
use crate::transform::{EnumHoister, HoistedEnum, PropertyPolicy};

pub use raw::{Diagnostic, Diagnostics};

/// A normalized document plus any soft mismatches seen on the way.
#[derive(Debug)]
pub struct Normalized {
    pub document: Document,
    /// Empty unless diagnostics were requested.
    pub diagnostics: Vec<Diagnostic>,
}

/// State shared by the section decoders during one run.
pub(crate) struct Context<'t> {
    pub(crate) hoister: EnumHoister<'t>,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) hoisted: Vec<HoistedEnum>,
}

impl<'t> Context<'t> {
    pub(crate) fn new(tables: &'t Tables, diagnostics: bool) -> Self {
        Self {
            hoister: EnumHoister::new(&tables.hoist_exclusions),
            diagnostics: Diagnostics::new(diagnostics),
            hoisted: Vec::new(),
        }
    }
}

/// Parse and normalize a YAML document.
pub fn normalize(input: &str, tables: &Tables, diagnostics: bool) -> Result<Normalized, ParseError> {
    let root: Value = serde_yaml_ng::from_str(input)?;
    normalize_value(&root, tables, diagnostics)
}

/// Normalize an already decoded document tree.
///
/// Only a non-mapping root is fatal; every other shape mismatch leaves the
/// affected field at its zero value.
pub fn normalize_value(
    root: &Value,
    tables: &Tables,
    diagnostics: bool,
) -> Result<Normalized, ParseError> {
    let Value::Mapping(root) = root else {
        return Err(ParseError::NotAMapping(raw::kind_of(root)));
    };
    let mut cx = Context::new(tables, diagnostics);
    let node = raw::Node::new(root, "");

    let mut document = Document::default();
    if let Some(info) = node.mapping_of("info", &mut cx.diagnostics) {
        let info = raw::Node::new(info, "info");
        document.meta = DocumentMeta {
            title: info.string("title", &mut cx.diagnostics).unwrap_or_default(),
            version: info.string("version", &mut cx.diagnostics).unwrap_or_default(),
        };
    }
    document.host = node.string("host", &mut cx.diagnostics).unwrap_or_default();
    document.base_path = node
        .string("basePath", &mut cx.diagnostics)
        .unwrap_or_default();

    if let Some(raw) = node.mapping_of("definitions", &mut cx.diagnostics) {
        document.definitions = definitions::decode_definitions(raw, &mut cx);
        for def in document.definitions.values_mut() {
            def.paginated = is_paginated(&def.key, &tables.responses);
        }
    }
    if let Some(raw) = node.mapping_of("responses", &mut cx.diagnostics) {
        document.responses = responses::decode_responses(raw, tables, &mut cx);
    }
    if let Some(raw) = node.mapping_of("paths", &mut cx.diagnostics) {
        document.paths = paths::decode_paths(raw, &mut cx);
    }

    let hoisted = std::mem::take(&mut cx.hoisted);
    let added = merge_hoisted(&mut document.definitions, hoisted);

    PropertyPolicy::new(&tables.policy).apply(&mut document);
    definitions::mark_dynamic_queries(&mut document.definitions, &tables.dynamic_queries);

    log::info!(
        "normalized {} definitions ({added} hoisted enums), {} responses, {} paths",
        document.definitions.len(),
        document.responses.len(),
        document.paths.len()
    );

    Ok(Normalized {
        document,
        diagnostics: cx.diagnostics.into_entries(),
    })
}
