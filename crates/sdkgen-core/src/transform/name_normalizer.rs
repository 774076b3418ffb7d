use heck::{ToLowerCamelCase, ToPascalCase};

/// Canonical definition key for a property or response name: separators are
/// removed and each word starts upper case (`colour_idx` → `ColourIdx`).
///
/// Existing capitals are kept, so acronyms survive (`colourID` → `ColourID`).
/// A letter following a digit starts a new word.
pub fn pascal_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    let mut word_start = true;
    for c in name.chars() {
        if !c.is_ascii_alphanumeric() {
            word_start = true;
            continue;
        }
        if word_start {
            key.push(c.to_ascii_uppercase());
        } else {
            key.push(c);
        }
        word_start = c.is_ascii_digit();
    }
    key
}

/// Strip a trailing plural `s` (`Members` → `Member`); other words are kept.
pub fn strip_plural(word: &str) -> &str {
    word.strip_suffix('s').unwrap_or(word)
}

/// Derive a camelCase operation identifier from HTTP verb + route, for
/// operations that declare no `operationId`.
///
/// Examples:
/// - `GET /members` → `listMembers`
/// - `POST /members` → `createMembers`
/// - `GET /members/{member_id}` → `getMember`
/// - `DELETE /members/{member_id}` → `deleteMember`
/// - `GET /groups/{group_id}/members` → `listGroupsMembers`
pub fn route_to_operation(verb: &str, route: &str) -> String {
    let mut resource_parts: Vec<&str> = Vec::new();
    let mut ends_with_param = false;

    for seg in route.split('/').filter(|s| !s.is_empty()) {
        if seg.starts_with('{') && seg.ends_with('}') {
            ends_with_param = true;
        } else {
            resource_parts.push(seg);
            ends_with_param = false;
        }
    }

    let prefix = match verb.to_ascii_lowercase().as_str() {
        "get" if ends_with_param => "get".to_string(),
        "get" => "list".to_string(),
        "post" => "create".to_string(),
        "put" => "update".to_string(),
        other => other.to_string(),
    };

    let last = resource_parts.len().saturating_sub(1);
    let mut name = prefix;
    for (i, part) in resource_parts.iter().enumerate() {
        let word = if i == last && ends_with_param {
            strip_plural(part)
        } else {
            part
        };
        name.push_str(&word.to_pascal_case());
    }
    name.to_lower_camel_case()
}
