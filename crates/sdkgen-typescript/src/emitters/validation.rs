use std::collections::BTreeSet;

use minijinja::{Environment, context};
use sdkgen_core::transform::{RuleKind, ValidatedField, ValidationObject, ValidationRule};

use super::{HEADER, ts_string, type_prefix};
use crate::error::EmitError;
use crate::type_mapper::declared_key;

/// Emit `definitions/validation.ts`: one yup object schema per operation.
pub fn emit_validation(
    env: &Environment<'_>,
    objects: &[ValidationObject],
) -> Result<String, EmitError> {
    let tmpl = env.get_template("validation.ts.j2")?;

    let mut yup = BTreeSet::new();
    let mut rendered = Vec::new();
    for object in objects {
        yup.insert("object");
        let fields: Vec<minijinja::Value> = object
            .fields
            .iter()
            .map(|field| {
                if let Some(base) = field.rules.first().and_then(|r| base_schema(r.kind)) {
                    yup.insert(base);
                }
                context! {
                    key => declared_key(&field.key),
                    chain => chain(field),
                }
            })
            .collect();
        rendered.push(context! {
            name => format!("{}RequestValidation", type_prefix(&object.operation)),
            operation => object.operation.clone(),
            fields => fields,
        });
    }
    let yup_imports: Vec<String> = yup
        .into_iter()
        .map(|name| format!("{name} as {}", alias(name)))
        .collect();

    Ok(tmpl.render(context! {
        header => HEADER,
        yup_imports => yup_imports,
        objects => rendered,
    })?)
}

/// yup factory for a base type rule.
fn base_schema(kind: RuleKind) -> Option<&'static str> {
    match kind {
        RuleKind::String => Some("string"),
        RuleKind::Number => Some("number"),
        RuleKind::Array => Some("array"),
        _ => None,
    }
}

/// `string` → `yupString`.
fn alias(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("yup{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => "yup".to_string(),
    }
}

/// The full method chain for one field, e.g.
/// `yupString().typeError('...').max(50, '...').required('...')`.
pub fn chain(field: &ValidatedField) -> String {
    field.rules.iter().map(call).collect()
}

fn call(rule: &ValidationRule) -> String {
    let message = ts_string(&rule.message);
    let argument = rule.argument.as_deref().unwrap_or_default();
    match rule.kind {
        RuleKind::String | RuleKind::Number | RuleKind::Array => {
            let base = base_schema(rule.kind).unwrap_or_default();
            format!("{}().typeError({message})", alias(base))
        }
        RuleKind::Matches => format!(".matches({}, {message})", regex_literal(argument)),
        RuleKind::MaxLength | RuleKind::Max | RuleKind::MaxItems => {
            format!(".max({argument}, {message})")
        }
        RuleKind::MinLength | RuleKind::Min | RuleKind::MinItems => {
            format!(".min({argument}, {message})")
        }
        RuleKind::Required => format!(".required({message})"),
        RuleKind::Email => format!(".email({message})"),
        RuleKind::Url => format!(".url({message})"),
    }
}

/// A JavaScript regex literal for `pattern`.
fn regex_literal(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 2);
    out.push('/');
    let mut escaped = false;
    for ch in pattern.chars() {
        if ch == '/' && !escaped {
            out.push('\\');
        }
        escaped = ch == '\\' && !escaped;
        out.push(ch);
    }
    out.push('/');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitters::environment;

    fn rule(kind: RuleKind, argument: Option<&str>, message: &str) -> ValidationRule {
        ValidationRule {
            kind,
            argument: argument.map(String::from),
            message: message.into(),
        }
    }

    #[test]
    fn test_regex_literal() {
        assert_eq!(regex_literal("^[a-z]+$"), "/^[a-z]+$/");
        assert_eq!(regex_literal("^a/b$"), "/^a\\/b$/");
        assert_eq!(regex_literal("^a\\/b$"), "/^a\\/b$/");
    }

    #[test]
    fn test_render() {
        let env = environment().unwrap();
        let object = ValidationObject {
            operation: "createMember".into(),
            fields: vec![
                ValidatedField {
                    key: "age".into(),
                    rules: vec![
                        rule(RuleKind::Number, None, "This field must be a number."),
                        rule(RuleKind::Min, Some("18"), "This field requires a minimum of 18."),
                    ],
                },
                ValidatedField {
                    key: "name".into(),
                    rules: vec![
                        rule(RuleKind::String, None, "This field must be a string."),
                        rule(RuleKind::Matches, Some("^[A-Za-z ]+$"), "Letters only."),
                        rule(RuleKind::Required, None, "This field is required."),
                    ],
                },
            ],
        };
        let out = emit_validation(&env, &[object]).unwrap();
        insta::assert_snapshot!(out, @r"
        // Code generated by sdkgen. DO NOT EDIT.
        import { number as yupNumber, object as yupObject, string as yupString } from 'yup';

        /** CreateMemberRequestValidation validates the createMember request body. */
        export const CreateMemberRequestValidation = yupObject({
          age: yupNumber().typeError('This field must be a number.').min(18, 'This field requires a minimum of 18.'),
          name: yupString().typeError('This field must be a string.').matches(/^[A-Za-z ]+$/, 'Letters only.').required('This field is required.'),
        });
        ");
    }

    #[test]
    fn test_empty_has_no_imports() {
        let env = environment().unwrap();
        let out = emit_validation(&env, &[]).unwrap();
        assert_eq!(out.trim_end(), "// Code generated by sdkgen. DO NOT EDIT.");
    }
}
