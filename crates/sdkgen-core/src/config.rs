use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ConfigError;

/// Top-level project configuration loaded from `.sdkgen.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SdkgenConfig {
    pub input: String,
    pub output: String,
    /// Target file extension, e.g. `ts`. The CLI flag takes precedence.
    pub extension: Option<String>,
    pub workers: usize,
    pub queue_capacity: usize,
    /// Report soft structural mismatches instead of skipping them silently.
    pub diagnostics: bool,
    pub tables: Tables,
}

impl Default for SdkgenConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: "generated".to_string(),
            extension: None,
            workers: 3,
            queue_capacity: 8,
            diagnostics: false,
            tables: Tables::default(),
        }
    }
}

/// Override and exception tables. These encode one API's naming
/// conventions and are data, not rules to generalize.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Tables {
    /// Property-derived enum keys that must not be hoisted.
    pub hoist_exclusions: Vec<String>,
    /// Raw response keys dropped during normalization.
    pub skipped_responses: Vec<String>,
    /// Request bodies treated as dynamic queries.
    pub dynamic_queries: Vec<String>,
    pub responses: ResponseTables,
    pub policy: PolicyTables,
    pub validation: ValidationTables,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            hoist_exclusions: strings(&["ImageFallbackColourIdx"]),
            skipped_responses: strings(&["memberListGroupsResponse"]),
            dynamic_queries: strings(&["ListMembersRequestBody"]),
            responses: ResponseTables::default(),
            policy: PolicyTables::default(),
            validation: ValidationTables::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResponseTables {
    /// Irregular plural collection entities that `Create` never returns.
    pub create_exclusions: Vec<String>,
    /// Response key to returned type (`Entity` or `Entity[]`), checked first.
    pub returns_overrides: IndexMap<String, String>,
    /// `Update` suffix to returned type; other suffixes return nothing.
    pub update_returns: IndexMap<String, String>,
    /// Response wrappers carrying pagination metadata.
    pub paginated: Vec<String>,
}

impl Default for ResponseTables {
    fn default() -> Self {
        Self {
            create_exclusions: strings(&["GroupMembers", "AccommodationResidents"]),
            returns_overrides: pairs(&[
                ("RegisterOrganisationResponse", "RegisterOrganisationData"),
                ("MemberListSnapshotsResponse", "MemberSnapshot[]"),
            ]),
            update_returns: pairs(&[("Whereabouts", "MemberWhereabouts")]),
            paginated: strings(&["listMembersResponseBody"]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolicyTables {
    /// Definition renames; references to the old key follow.
    pub renames: IndexMap<String, String>,
    /// Reference-only aliases.
    pub ref_aliases: IndexMap<String, String>,
    pub definition_descriptions: IndexMap<String, String>,
    pub property_refs: Vec<PropertyRef>,
    pub contextual_descriptions: Vec<ContextualDescription>,
    /// Descriptions for properties that lose theirs when referenced.
    pub description_backfill: IndexMap<String, String>,
    pub timestamp_suffixes: Vec<String>,
    /// Definition key substrings where timestamps stay plain.
    pub timestamp_exclusions: Vec<String>,
    pub timestamp_type: String,
    pub country: CountryRule,
    pub non_constructible: Vec<String>,
}

impl Default for PolicyTables {
    fn default() -> Self {
        Self {
            renames: pairs(&[("Role", "MemberRole"), ("EntityType", "ViewEntityType")]),
            ref_aliases: pairs(&[("ImageFallback", "Colour")]),
            definition_descriptions: pairs(&[
                ("MemberRole", "MemberRole represents a member role."),
                ("ViewEntityType", "ViewEntityType represents a view entity type."),
                ("ErrorCode", "ErrorCode represents an error code."),
                ("ErrorType", "ErrorType represents an error type."),
                (
                    "RelationshipWithMember",
                    "RelationshipWithMember represents a host-member relationship.",
                ),
                ("Colour", "Colour represents a recognised colour."),
            ]),
            property_refs: vec![PropertyRef {
                definition: "ListMembersFilterRole".to_string(),
                property: "value".to_string(),
                target: "MemberRole".to_string(),
            }],
            contextual_descriptions: vec![
                ContextualDescription::new(
                    "changed_by_self",
                    None,
                    "Whether the whereabouts were updated by the current user.",
                ),
                ContextualDescription::new(
                    "address",
                    Some("Accommodation"),
                    "The accommodation's address.",
                ),
                ContextualDescription::new(
                    "address",
                    Some("Organisation"),
                    "The organisation's address.",
                ),
                ContextualDescription::new("address", Some("Household"), "The household's address."),
            ],
            description_backfill: pairs(&[
                ("whereabouts", "The member's last signed-in location."),
                ("data", "The response data."),
                ("ok", "Whether the request was successful."),
                ("pagination", "The pagination properties."),
                ("address", "The entity's address."),
                ("changed_by_self", "Whether the whereabouts were updated by the member."),
                ("image_fallback", "The image's fallback."),
                ("colour", "The view's display colour."),
            ]),
            timestamp_suffixes: strings(&["_at"]),
            timestamp_exclusions: strings(&["ListMembers"]),
            timestamp_type: "ExtendedDate".to_string(),
            country: CountryRule::default(),
            non_constructible: strings(&[
                "APIError",
                "Colour",
                "EntityType",
                "ViewEntityType",
                "ErrorCode",
                "ErrorType",
                "RelationshipWithMember",
                "MemberRole",
            ]),
        }
    }
}

/// Pins one property of one definition to a reference target.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyRef {
    pub definition: String,
    pub property: String,
    pub target: String,
}

/// Description for a property, optionally scoped to definitions whose key
/// contains a substring.
#[derive(Debug, Clone, Deserialize)]
pub struct ContextualDescription {
    pub property: String,
    #[serde(default)]
    pub definition_contains: Option<String>,
    pub description: String,
}

impl ContextualDescription {
    fn new(property: &str, definition_contains: Option<&str>, description: &str) -> Self {
        Self {
            property: property.to_string(),
            definition_contains: definition_contains.map(str::to_string),
            description: description.to_string(),
        }
    }
}

/// Composes a country-code property into a country lookup property.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CountryRule {
    pub source: String,
    pub target: String,
    pub type_name: String,
    pub description: String,
}

impl Default for CountryRule {
    fn default() -> Self {
        Self {
            source: "country_code".to_string(),
            target: "country".to_string(),
            type_name: "Country".to_string(),
            description: "The entity's country information.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidationTables {
    /// Regex pattern (verbatim from the schema) to message.
    pub pattern_messages: IndexMap<String, String>,
    /// Property names validated as email addresses.
    pub email_properties: Vec<String>,
    /// Property names validated as URLs.
    pub url_properties: Vec<String>,
}

impl Default for ValidationTables {
    fn default() -> Self {
        Self {
            pattern_messages: pairs(&[
                (
                    r"^[aA-zZ]+[aA-zZ\\s]+$",
                    "This field must not contain any numbers or special characters.",
                ),
                (
                    r"^\+?\d+$",
                    "This field must be a valid phone number under the form +1234567890.",
                ),
            ]),
            email_properties: strings(&["email"]),
            url_properties: strings(&["avatar_url", "cover_image_url"]),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn pairs(values: &[(&str, &str)]) -> IndexMap<String, String> {
    values
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".sdkgen.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<SdkgenConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config: SdkgenConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# sdkgen configuration
input: openapi.yaml
output: generated
extension: ts          # target language selector

workers: 3             # generation worker threads
queue_capacity: 8      # bounded job queue size
diagnostics: false     # report malformed optional fields

tables:
  hoist_exclusions: [ImageFallbackColourIdx]
  skipped_responses: [memberListGroupsResponse]
  dynamic_queries: [ListMembersRequestBody]
  responses:
    create_exclusions: [GroupMembers, AccommodationResidents]
    update_returns:
      Whereabouts: MemberWhereabouts
    # returns_overrides:
    #   MemberListSnapshotsResponse: MemberSnapshot[]
  # policy:
  #   renames:
  #     Role: MemberRole
  #   timestamp_suffixes: [_at]
"#
}
