use std::collections::HashSet;

use heck::ToShoutySnakeCase;
use minijinja::{Environment, context};
use sdkgen_core::model::Definition;

use super::{HEADER, ts_string};
use crate::error::EmitError;

/// Emit `definitions/enums.ts`.
pub fn emit_enums(env: &Environment<'_>, definitions: &[&Definition]) -> Result<String, EmitError> {
    let tmpl = env.get_template("enums.ts.j2")?;

    let enums: Vec<minijinja::Value> = definitions
        .iter()
        .map(|def| {
            log::debug!("saw enum {} ({} entries)", def.key, def.enum_entries.len());
            context! {
                name => def.key.clone(),
                description => def.description.clone(),
                entries => entries(def),
            }
        })
        .collect();

    Ok(tmpl.render(context! {
        header => HEADER,
        enums => enums,
    })?)
}

fn entries(definition: &Definition) -> Vec<minijinja::Value> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for entry in &definition.enum_entries {
        let (name, value) = member(entry);
        if !seen.insert(name.clone()) {
            log::warn!("enum {}: entry '{entry}' collides with {name}, skipping", definition.key);
            continue;
        }
        out.push(context! { name => name, value => value });
    }
    out
}

/// Member name and initializer for one entry: `'active'` → `ACTIVE = 'active'`,
/// `2` → `VALUE_2 = 2`.
pub fn member(entry: &str) -> (String, String) {
    let numeric = entry.starts_with(|c: char| c.is_ascii_digit() || c == '-');
    if numeric && entry.parse::<f64>().is_ok() {
        let name = format!("VALUE_{}", entry.replace(['.', '-'], "_"));
        return (name, entry.to_string());
    }
    let mut name = entry.to_shouty_snake_case();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name = format!("VALUE_{name}");
    }
    (name, ts_string(entry))
}
