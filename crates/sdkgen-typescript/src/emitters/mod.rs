pub mod client;
pub mod enums;
pub mod models;
pub mod requests;
pub mod responses;
pub mod statics;
pub mod validation;

use std::collections::{BTreeSet, HashSet};

use heck::ToUpperCamelCase;
use minijinja::Environment;
use sdkgen_core::model::{Path, Property, TypeRef, is_primitive};

use crate::error::EmitError;

/// Sub-directory holding every definition file.
pub const DEFINITIONS_DIR: &str = "definitions";

/// First line of every generated file.
pub const HEADER: &str = "// Code generated by sdkgen. DO NOT EDIT.";

/// Types shipped in `definitions/base.ts`.
const BASE_TYPES: [&str; 5] = [
    "DynamicQueryFilter",
    "ExtendedDate",
    "GenericResponse",
    "PaginatedResponse",
    "SuccessResponse",
];

/// Type shipped in `definitions/countries.ts`.
const COUNTRY_TYPE: &str = "Country";

/// Escape `*/` sequences that would prematurely close JSDoc comment blocks.
fn escape_jsdoc(value: String) -> String {
    value.replace("*/", "*\\/")
}

/// Build the shared template environment with every category template loaded.
pub fn environment() -> Result<Environment<'static>, EmitError> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.add_filter("escape_jsdoc", escape_jsdoc);
    env.add_template("client.ts.j2", include_str!("../../templates/client.ts.j2"))?;
    env.add_template("models.ts.j2", include_str!("../../templates/models.ts.j2"))?;
    env.add_template("enums.ts.j2", include_str!("../../templates/enums.ts.j2"))?;
    env.add_template("requests.ts.j2", include_str!("../../templates/requests.ts.j2"))?;
    env.add_template(
        "responses.ts.j2",
        include_str!("../../templates/responses.ts.j2"),
    )?;
    env.add_template(
        "validation.ts.j2",
        include_str!("../../templates/validation.ts.j2"),
    )?;
    Ok(env)
}

/// Quote `value` as a single-quoted TypeScript string literal.
pub fn ts_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// `createMember` → `CreateMember`.
pub fn type_prefix(operation: &str) -> String {
    operation.to_upper_camel_case()
}

pub fn request_name(operation: &str) -> String {
    format!("{}Request", type_prefix(operation))
}

pub fn response_name(operation: &str) -> String {
    format!("{}Response", type_prefix(operation))
}

/// Whether an operation gets a request interface and a payload argument.
///
/// An operation with no parameters, or whose only parameter is bound to the
/// route, is called without a payload.
pub fn has_request(path: &Path) -> bool {
    match path.parameters.as_slice() {
        [] => false,
        [only] => only.location != Some(sdkgen_core::model::ParamLocation::Path),
        _ => true,
    }
}

/// Type names a generated file refers to, grouped by the module they come from.
#[derive(Debug, Default)]
pub struct Imports {
    names: BTreeSet<String>,
}

impl Imports {
    pub fn add(&mut self, name: &str) {
        if !name.is_empty() && !is_primitive(name) {
            self.names.insert(name.to_string());
        }
    }

    pub fn add_property(&mut self, property: &Property) {
        match &property.ty {
            TypeRef::Named(name) => self.add(name),
            TypeRef::Array(Some(element)) => self.add(element),
            _ => {}
        }
    }

    /// Import lines for a file inside the definitions directory. Names in
    /// `local` are declared by the file itself and skipped.
    pub fn definition_lines(&self, local: &HashSet<&str>) -> Vec<String> {
        let mut base = Vec::new();
        let mut country = Vec::new();
        let mut siblings = Vec::new();
        for name in self.names.iter().filter(|n| !local.contains(n.as_str())) {
            if BASE_TYPES.contains(&name.as_str()) {
                base.push(name.as_str());
            } else if name == COUNTRY_TYPE {
                country.push(name.as_str());
            } else {
                siblings.push(name.as_str());
            }
        }
        [(base, "./base"), (country, "./countries"), (siblings, ".")]
            .into_iter()
            .filter(|(names, _)| !names.is_empty())
            .map(|(names, module)| import_line(&names, module))
            .collect()
    }

    /// A single import line pulling every name from `module`.
    pub fn module_lines(&self, module: &str) -> Vec<String> {
        if self.names.is_empty() {
            return Vec::new();
        }
        let names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        vec![import_line(&names, module)]
    }
}

fn import_line(names: &[&str], module: &str) -> String {
    format!("import {{ {} }} from '{module}';", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkgen_core::model::{HttpVerb, ParamLocation};

    fn param(key: &str, location: ParamLocation) -> Property {
        let mut p = Property::new(key, TypeRef::Primitive("string".into()));
        p.location = Some(location);
        p
    }

    #[test]
    fn test_import_grouping() {
        let mut imports = Imports::default();
        for name in ["Member", "ExtendedDate", "Country", "string", "Group"] {
            imports.add(name);
        }
        let local: HashSet<&str> = ["Group"].into_iter().collect();
        assert_eq!(
            imports.definition_lines(&local),
            vec![
                "import { ExtendedDate } from './base';",
                "import { Country } from './countries';",
                "import { Member } from '.';",
            ]
        );
        assert_eq!(
            imports.module_lines("./definitions"),
            vec!["import { Country, ExtendedDate, Group, Member } from './definitions';"]
        );
    }

    #[test]
    fn test_has_request() {
        let mut path = Path {
            key: "/members/{member_id}".into(),
            verb: HttpVerb::Get,
            operation: "getMember".into(),
            description: String::new(),
            parameters: vec![],
        };
        assert!(!has_request(&path));
        path.parameters.push(param("member_id", ParamLocation::Path));
        assert!(!has_request(&path));
        path.parameters.push(param("expand", ParamLocation::Query));
        assert!(has_request(&path));
        path.parameters.remove(0);
        assert!(has_request(&path));
    }

    #[test]
    fn test_names() {
        assert_eq!(request_name("createMember"), "CreateMemberRequest");
        assert_eq!(response_name("member_get"), "MemberGetResponse");
        assert_eq!(ts_string("it's"), "'it\\'s'");
    }

    #[test]
    fn test_environment_loads() {
        let env = environment().unwrap();
        assert!(env.get_template("models.ts.j2").is_ok());
        assert_eq!(escape_jsdoc("a */ b".into()), "a *\\/ b");
    }
}
