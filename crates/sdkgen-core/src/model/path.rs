use serde::Serialize;

use super::definition::Property;

/// HTTP verb of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpVerb {
    Get,
    Put,
    Post,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpVerb {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "get" => Some(Self::Get),
            "put" => Some(Self::Put),
            "post" => Some(Self::Post),
            "delete" => Some(Self::Delete),
            "patch" => Some(Self::Patch),
            "head" => Some(Self::Head),
            "options" => Some(Self::Options),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "get",
            HttpVerb::Put => "put",
            HttpVerb::Post => "post",
            HttpVerb::Delete => "delete",
            HttpVerb::Patch => "patch",
            HttpVerb::Head => "head",
            HttpVerb::Options => "options",
        }
    }
}

/// A single API operation bound to a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    /// Route, possibly with `{param}` placeholders.
    pub key: String,
    pub verb: HttpVerb,
    /// Operation identifier; generated names derive from it.
    pub operation: String,
    pub description: String,
    pub parameters: Vec<Property>,
}

impl Path {
    /// Names of the `{param}` placeholders in the route, in order.
    pub fn route_params(&self) -> Vec<&str> {
        let mut params = Vec::new();
        let mut rest = self.key.as_str();
        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            params.push(&rest[start + 1..start + len]);
            rest = &rest[start + len + 1..];
        }
        params
    }
}
