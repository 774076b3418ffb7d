use std::fmt;

use serde::Serialize;

/// A named type in the normalized schema: an object or a string enum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Definition {
    pub key: String,
    pub kind: DefinitionKind,
    pub description: String,
    /// Object kind only.
    pub properties: Vec<Property>,
    /// Enum kind only.
    pub enum_entries: Vec<String>,
    /// Inferred payload type, response definitions only.
    pub returns: Option<Returns>,
    /// Supertype this definition extends.
    pub extends: Option<String>,
    /// Whether the wrapper carries pagination metadata.
    pub paginated: bool,
    /// Set on request bodies that drive a dynamic query.
    pub dynamic_query: Option<DynamicQuery>,
}

impl Definition {
    pub fn new(key: impl Into<String>, kind: DefinitionKind) -> Self {
        Self {
            key: key.into(),
            kind,
            description: String::new(),
            properties: Vec::new(),
            enum_entries: Vec::new(),
            returns: None,
            extends: None,
            paginated: false,
            dynamic_query: None,
        }
    }

    pub fn is_enum(&self) -> bool {
        self.kind == DefinitionKind::Enum
    }
}

/// A request body whose properties each select one characteristic of the
/// query, such as its filters or its sort order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DynamicQuery {
    /// Definition keys referenced by the body, in property order.
    pub characteristics: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    Object,
    Enum,
}

/// A field of an object definition or a parameter of a path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub key: String,
    pub ty: TypeRef,
    pub description: String,
    pub required: bool,
    pub format: Option<String>,
    /// Only set for path parameters.
    pub location: Option<ParamLocation>,
    pub validation: ValidationConstraint,
    pub construction: Construction,
}

impl Property {
    pub fn new(key: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            key: key.into(),
            ty,
            description: String::new(),
            required: false,
            format: None,
            location: None,
            validation: ValidationConstraint::default(),
            construction: Construction::Plain,
        }
    }

    /// The primitive type name, if the property is not a reference.
    pub fn primitive(&self) -> Option<&str> {
        match &self.ty {
            TypeRef::Primitive(name) => Some(name),
            TypeRef::Array(_) => Some("array"),
            _ => None,
        }
    }

    /// The referenced definition, including the element of an array.
    pub fn reference(&self) -> Option<&str> {
        match &self.ty {
            TypeRef::Named(name) => Some(name),
            TypeRef::Array(Some(element)) if !is_primitive(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_body(&self) -> bool {
        self.location == Some(ParamLocation::Body)
    }
}

/// The type of a property.
///
/// A `$ref` and a primitive `type` never coexist, except for arrays where the
/// container marker and the element reference are both recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum TypeRef {
    /// Neither `type` nor `$ref` was present.
    #[default]
    Unknown,
    /// `string`, `integer`, `number`, `boolean`, `object`, ...
    Primitive(String),
    /// A reference to a definition by name, resolved lazily.
    Named(String),
    /// An array whose element is a named definition or a primitive type name.
    Array(Option<String>),
}

/// Schema primitive type names.
pub const PRIMITIVES: [&str; 6] = ["string", "integer", "number", "boolean", "object", "file"];

pub fn is_primitive(name: &str) -> bool {
    PRIMITIVES.contains(&name)
}

/// Where a path parameter is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Body,
    Path,
    Query,
    Header,
    FormData,
}

impl ParamLocation {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "body" => Some(Self::Body),
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "formData" => Some(Self::FormData),
            _ => None,
        }
    }
}

/// Validation keywords copied verbatim from the schema. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationConstraint {
    pub pattern: Option<String>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
}

impl ValidationConstraint {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// How generated code turns the raw payload value into the property's type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "type", rename_all = "snake_case")]
pub enum Construction {
    /// Assign as-is.
    #[default]
    Plain,
    /// Wrap in a constructor call of the named type.
    Construct(String),
    /// Map each array element through the named type's constructor.
    ConstructEach(String),
    /// Enum or otherwise non-constructible type: cast only.
    Cast(String),
}

/// The entity type a response wraps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Returns {
    pub entity: String,
    pub collection: bool,
}

impl Returns {
    pub fn single(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            collection: false,
        }
    }

    pub fn collection(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            collection: true,
        }
    }

    /// Parse the `Entity` / `Entity[]` notation used in override tables.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_suffix("[]") {
            Some(entity) => Self::collection(entity),
            None => Self::single(raw),
        }
    }
}

impl fmt::Display for Returns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.collection {
            write!(f, "{}[]", self.entity)
        } else {
            write!(f, "{}", self.entity)
        }
    }
}
