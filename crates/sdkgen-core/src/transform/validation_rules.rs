//! Compiles body parameters into ordered validation rules.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::config::ValidationTables;
use crate::model::{Document, Path, Property};

use super::property_policy::PropertyPolicy;

pub const MESSAGE_REQUIRED: &str = "This field is required.";
pub const MESSAGE_STRING: &str = "This field must be a string.";
pub const MESSAGE_NUMBER: &str = "This field must be a number.";
pub const MESSAGE_ARRAY: &str = "This field must be a list.";
pub const MESSAGE_PATTERN_FALLBACK: &str = "This field has an invalid format.";
pub const MESSAGE_EMAIL: &str = "This field must be a valid email address.";
pub const MESSAGE_URL: &str = "This field must be a valid URL.";

/// One constraint check in a field's validation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    String,
    Number,
    Array,
    Matches,
    MaxLength,
    MinLength,
    Max,
    Min,
    MaxItems,
    MinItems,
    Required,
    Email,
    Url,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationRule {
    pub kind: RuleKind,
    /// Bound or pattern the rule checks against, already formatted.
    pub argument: Option<String>,
    pub message: String,
}

impl ValidationRule {
    fn plain(kind: RuleKind, message: &str) -> Self {
        Self {
            kind,
            argument: None,
            message: message.to_string(),
        }
    }

    fn bounded(kind: RuleKind, argument: String, message: String) -> Self {
        Self {
            kind,
            argument: Some(argument),
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedField {
    pub key: String,
    pub rules: Vec<ValidationRule>,
}

/// Validation rules for one operation's request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationObject {
    pub operation: String,
    pub fields: Vec<ValidatedField>,
}

pub struct ValidationCompiler<'t> {
    tables: &'t ValidationTables,
    policy: &'t PropertyPolicy<'t>,
    emails: HashSet<&'t str>,
    urls: HashSet<&'t str>,
}

impl<'t> ValidationCompiler<'t> {
    pub fn new(tables: &'t ValidationTables, policy: &'t PropertyPolicy<'t>) -> Self {
        Self {
            tables,
            policy,
            emails: tables.email_properties.iter().map(String::as_str).collect(),
            urls: tables.url_properties.iter().map(String::as_str).collect(),
        }
    }

    /// Compile every path that has eligible parameters, keyed by operation.
    pub fn compile(&self, document: &Document) -> BTreeMap<String, ValidationObject> {
        let mut objects = BTreeMap::new();
        for path in document.sorted_paths() {
            if let Some(object) = self.compile_path(path) {
                if objects.contains_key(&object.operation) {
                    log::warn!("duplicate operation '{}', keeping first", object.operation);
                    continue;
                }
                objects.insert(object.operation.clone(), object);
            }
        }
        objects
    }

    pub fn compile_path(&self, path: &Path) -> Option<ValidationObject> {
        let mut params: Vec<&Property> = path.parameters.iter().collect();
        params.sort_by(|a, b| self.policy.compare(a, b));

        let fields: Vec<ValidatedField> = params
            .into_iter()
            .filter_map(|p| self.compile_parameter(p))
            .collect();
        if fields.is_empty() {
            return None;
        }
        Some(ValidationObject {
            operation: path.operation.clone(),
            fields,
        })
    }

    /// Rules for a single parameter, or `None` if it is not body-bound or not
    /// of a validator-eligible type.
    pub fn compile_parameter(&self, param: &Property) -> Option<ValidatedField> {
        if !param.is_body() {
            return None;
        }
        let rules = match param.primitive()? {
            "string" => self.string_rules(param),
            "integer" => self.integer_rules(param),
            "array" => self.array_rules(param),
            _ => return None,
        };
        Some(ValidatedField {
            key: param.key.clone(),
            rules,
        })
    }

    fn string_rules(&self, param: &Property) -> Vec<ValidationRule> {
        let v = &param.validation;
        let mut rules = vec![ValidationRule::plain(RuleKind::String, MESSAGE_STRING)];
        if let Some(pattern) = &v.pattern {
            let message = self
                .tables
                .pattern_messages
                .get(pattern)
                .map_or(MESSAGE_PATTERN_FALLBACK, String::as_str);
            rules.push(ValidationRule::bounded(
                RuleKind::Matches,
                pattern.clone(),
                message.to_string(),
            ));
        }
        if let Some(n) = v.max_length {
            rules.push(ValidationRule::bounded(
                RuleKind::MaxLength,
                n.to_string(),
                format!("This field allows a maximum of {n} characters."),
            ));
        }
        if let Some(n) = v.min_length {
            rules.push(ValidationRule::bounded(
                RuleKind::MinLength,
                n.to_string(),
                format!("This field requires a minimum of {n} characters."),
            ));
        }
        if param.required {
            rules.push(ValidationRule::plain(RuleKind::Required, MESSAGE_REQUIRED));
        }
        let format = param.format.as_deref();
        if format == Some("email") || self.emails.contains(param.key.as_str()) {
            rules.push(ValidationRule::plain(RuleKind::Email, MESSAGE_EMAIL));
        }
        if matches!(format, Some("uri" | "url")) || self.urls.contains(param.key.as_str()) {
            rules.push(ValidationRule::plain(RuleKind::Url, MESSAGE_URL));
        }
        rules
    }

    fn integer_rules(&self, param: &Property) -> Vec<ValidationRule> {
        let v = &param.validation;
        let mut rules = vec![ValidationRule::plain(RuleKind::Number, MESSAGE_NUMBER)];
        if let Some(max) = v.maximum {
            let n = format_number(max);
            rules.push(ValidationRule::bounded(
                RuleKind::Max,
                n.clone(),
                format!("This field allows a maximum of {n}."),
            ));
        }
        if let Some(min) = v.minimum {
            let n = format_number(min);
            rules.push(ValidationRule::bounded(
                RuleKind::Min,
                n.clone(),
                format!("This field requires a minimum of {n}."),
            ));
        }
        if param.required {
            rules.push(ValidationRule::plain(RuleKind::Required, MESSAGE_REQUIRED));
        }
        rules
    }

    fn array_rules(&self, param: &Property) -> Vec<ValidationRule> {
        let v = &param.validation;
        let mut rules = vec![ValidationRule::plain(RuleKind::Array, MESSAGE_ARRAY)];
        if let Some(n) = v.max_items {
            rules.push(ValidationRule::bounded(
                RuleKind::MaxItems,
                n.to_string(),
                format!("This field allows a maximum of {n} item(s)."),
            ));
        }
        if let Some(n) = v.min_items {
            rules.push(ValidationRule::bounded(
                RuleKind::MinItems,
                n.to_string(),
                format!("This field requires a minimum of {n} item(s)."),
            ));
        }
        if param.required {
            rules.push(ValidationRule::plain(RuleKind::Required, MESSAGE_REQUIRED));
        }
        rules
    }
}

/// Integral bounds print without a fractional part.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyTables;
    use crate::model::{HttpVerb, ParamLocation, TypeRef};

    fn body(key: &str, ty: &str) -> Property {
        let mut p = Property::new(key, TypeRef::Primitive(ty.into()));
        p.location = Some(ParamLocation::Body);
        p
    }

    fn kinds(field: &ValidatedField) -> Vec<RuleKind> {
        field.rules.iter().map(|r| r.kind).collect()
    }

    fn with_compiler(f: impl FnOnce(&ValidationCompiler<'_>)) {
        let policy_tables = PolicyTables::default();
        let policy = PropertyPolicy::new(&policy_tables);
        let tables = ValidationTables::default();
        let compiler = ValidationCompiler::new(&tables, &policy);
        f(&compiler);
    }

    #[test]
    fn test_required_string_with_max_length() {
        with_compiler(|c| {
            let mut name = body("name", "string");
            name.required = true;
            name.validation.max_length = Some(50);

            let field = c.compile_parameter(&name).unwrap();
            assert_eq!(
                kinds(&field),
                vec![RuleKind::String, RuleKind::MaxLength, RuleKind::Required]
            );
            assert_eq!(field.rules[1].argument.as_deref(), Some("50"));
            assert_eq!(
                field.rules[1].message,
                "This field allows a maximum of 50 characters."
            );
            assert_eq!(field.rules[2].message, "This field is required.");
        });
    }

    #[test]
    fn test_full_string_chain_order() {
        with_compiler(|c| {
            let mut email = body("email", "string");
            email.required = true;
            email.format = Some("uri".into());
            email.validation.pattern = Some("^.+@.+$".into());
            email.validation.min_length = Some(3);
            email.validation.max_length = Some(120);

            let field = c.compile_parameter(&email).unwrap();
            assert_eq!(
                kinds(&field),
                vec![
                    RuleKind::String,
                    RuleKind::Matches,
                    RuleKind::MaxLength,
                    RuleKind::MinLength,
                    RuleKind::Required,
                    RuleKind::Email,
                    RuleKind::Url,
                ]
            );
            assert_eq!(field.rules[1].message, MESSAGE_PATTERN_FALLBACK);
        });
    }

    #[test]
    fn test_known_pattern_message() {
        with_compiler(|c| {
            let mut phone = body("phone", "string");
            phone.validation.pattern = Some(r"^\+?\d+$".into());
            let field = c.compile_parameter(&phone).unwrap();
            assert_eq!(
                field.rules[1].message,
                "This field must be a valid phone number under the form +1234567890."
            );
        });
    }

    #[test]
    fn test_url_by_property_name() {
        with_compiler(|c| {
            let field = c.compile_parameter(&body("avatar_url", "string")).unwrap();
            assert_eq!(kinds(&field), vec![RuleKind::String, RuleKind::Url]);
        });
    }

    #[test]
    fn test_integer_bounds() {
        with_compiler(|c| {
            let mut age = body("age", "integer");
            age.validation.minimum = Some(18.0);
            age.validation.maximum = Some(120.0);
            let field = c.compile_parameter(&age).unwrap();
            assert_eq!(
                kinds(&field),
                vec![RuleKind::Number, RuleKind::Max, RuleKind::Min]
            );
            assert_eq!(field.rules[1].message, "This field allows a maximum of 120.");
            assert_eq!(field.rules[2].message, "This field requires a minimum of 18.");
        });
    }

    #[test]
    fn test_array_items() {
        with_compiler(|c| {
            let mut tags = Property::new("tags", TypeRef::Array(Some("string".into())));
            tags.location = Some(ParamLocation::Body);
            tags.validation.max_items = Some(5);
            tags.validation.min_items = Some(1);
            tags.required = true;
            let field = c.compile_parameter(&tags).unwrap();
            assert_eq!(
                kinds(&field),
                vec![
                    RuleKind::Array,
                    RuleKind::MaxItems,
                    RuleKind::MinItems,
                    RuleKind::Required
                ]
            );
            assert_eq!(
                field.rules[1].message,
                "This field allows a maximum of 5 item(s)."
            );
        });
    }

    #[test]
    fn test_ineligible_parameters() {
        with_compiler(|c| {
            let mut query = body("name", "string");
            query.location = Some(ParamLocation::Query);
            assert!(c.compile_parameter(&query).is_none());

            assert!(c.compile_parameter(&body("active", "boolean")).is_none());

            let mut nested = Property::new("address", TypeRef::Named("Address".into()));
            nested.location = Some(ParamLocation::Body);
            assert!(c.compile_parameter(&nested).is_none());
        });
    }

    #[test]
    fn test_path_without_eligible_parameters() {
        with_compiler(|c| {
            let mut id = Property::new("member_id", TypeRef::Primitive("string".into()));
            id.location = Some(ParamLocation::Path);
            let path = Path {
                key: "/members/{member_id}".into(),
                verb: HttpVerb::Get,
                operation: "getMember".into(),
                description: String::new(),
                parameters: vec![id],
            };
            assert!(c.compile_path(&path).is_none());
        });
    }

    #[test]
    fn test_fields_follow_policy_order() {
        with_compiler(|c| {
            let path = Path {
                key: "/members".into(),
                verb: HttpVerb::Post,
                operation: "createMember".into(),
                description: String::new(),
                parameters: vec![
                    body("started_at", "string"),
                    body("name", "string"),
                    body("id", "string"),
                    body("age", "integer"),
                ],
            };
            let object = c.compile_path(&path).unwrap();
            let keys: Vec<&str> = object.fields.iter().map(|f| f.key.as_str()).collect();
            assert_eq!(keys, vec!["id", "age", "name", "started_at"]);
        });
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(50.0), "50");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(0.5), "0.5");
    }
}
