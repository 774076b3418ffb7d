use std::collections::{BTreeSet, HashSet};

use heck::{ToLowerCamelCase, ToUpperCamelCase};
use minijinja::{Environment, context};
use sdkgen_core::model::{DocumentMeta, Path};

use super::{DEFINITIONS_DIR, HEADER, Imports, has_request, request_name, response_name, ts_string};
use crate::error::EmitError;

/// Emit `api-client.ts`: the REST transport plus one method per operation.
pub fn emit_client(
    env: &Environment<'_>,
    meta: &DocumentMeta,
    host: &str,
    base_path: &str,
    paths: &[&Path],
) -> Result<String, EmitError> {
    let tmpl = env.get_template("client.ts.j2")?;

    let mut seen = HashSet::new();
    let mut verbs = BTreeSet::new();
    let mut imports = Imports::default();
    let mut methods = Vec::new();
    for path in paths {
        let name = path.operation.to_lower_camel_case();
        if !seen.insert(name.clone()) {
            log::warn!("duplicate client method {name} for {}, keeping first", path.key);
            continue;
        }
        verbs.insert(path.verb);

        let response = response_name(&path.operation);
        imports.add(&response);

        let mut args: Vec<String> = path
            .route_params()
            .into_iter()
            .map(|p| format!("{}: string", p.to_lower_camel_case()))
            .collect();
        let mut call_args = "path".to_string();
        let request = if has_request(path) {
            let request = request_name(&path.operation);
            imports.add(&request);
            args.push(format!("payload: {request}"));
            call_args.push_str(", payload");
            request
        } else {
            "undefined".to_string()
        };

        methods.push(context! {
            name => name,
            description => path.description.clone(),
            args => args.join(", "),
            path => path_expr(path),
            verb => path.verb.as_str(),
            request => request,
            response => response,
            call_args => call_args,
        });
    }
    log::debug!("generated {} client methods", methods.len());

    let verbs: Vec<&str> = verbs.into_iter().map(|v| v.as_str()).collect();
    Ok(tmpl.render(context! {
        header => HEADER,
        imports => imports.module_lines(&format!("./{DEFINITIONS_DIR}")),
        title => if meta.title.is_empty() { "API" } else { meta.title.as_str() },
        host => host,
        base_path => base_path,
        verbs => verbs,
        methods => methods,
        instance => instance_name(&meta.title),
    })?)
}

/// Route expression with each `{param}` bound to its camel-cased argument.
pub fn path_expr(path: &Path) -> String {
    if path.route_params().is_empty() {
        return ts_string(&path.key);
    }
    let mut out = String::from("`");
    let mut rest = path.key.as_str();
    while let Some(start) = rest.find('{')
        && let Some(len) = rest[start..].find('}')
    {
        out.push_str(&rest[..start]);
        let param = &rest[start + 1..start + len];
        out.push_str(&format!("${{{}}}", param.to_lower_camel_case()));
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out.push('`');
    out
}

/// `Members API` → `MembersApi`; an untitled document gets `Api`.
fn instance_name(title: &str) -> String {
    let name = title.to_upper_camel_case();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("Api{name}")
    } else {
        name
    }
}
