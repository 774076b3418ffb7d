const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Strip the internal definitions prefix from a `$ref`, leaving a bare name.
pub fn to_ref(raw: &str) -> String {
    raw.replacen(DEFINITIONS_PREFIX, "", 1)
}

/// Keep a description up to and including its first `.`.
///
/// Descriptions without a full stop are kept whole.
pub fn first_sentence(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.find('.') {
        Some(end) => trimmed[..=end].to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_ref() {
        assert_eq!(to_ref("#/definitions/Member"), "Member");
        assert_eq!(to_ref("Member"), "Member");
    }

    #[test]
    fn test_first_sentence() {
        assert_eq!(
            first_sentence("The member's name. Must be unique. Max 50 characters."),
            "The member's name."
        );
        assert_eq!(first_sentence("  No full stop here \n"), "No full stop here");
        assert_eq!(first_sentence(""), "");
    }
}
