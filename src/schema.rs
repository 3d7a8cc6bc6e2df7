//! OpenAPI 2.0 Schema Object model.
//!
//! Plain values, built bottom-up by the composers in [`crate::declare`] and
//! serialized field-for-field. Absent fields are omitted from the JSON.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Prefix of every local reference.
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    File,
}

/// A pointer into the definitions registry, or an anonymous inline schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawReferenced", into = "RawReferenced")]
pub enum Referenced {
    Ref(String),
    Inline(Box<Schema>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Items {
    /// Tuple form: one schema per position.
    Array(Vec<Referenced>),
    /// List form: every element shares one schema.
    Object(Box<Referenced>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<Referenced>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Xml {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapped: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalDocs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Referenced>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Referenced>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml: Option<Xml>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    // numbers keep their exact JSON form so i64/u64 limits survive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,
}

/// A schema plus the name it is registered under, if any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub schema: Schema,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Schema {
    pub fn of(schema_type: SchemaType) -> Self {
        Self { schema_type: Some(schema_type), ..Self::default() }
    }

    pub fn string() -> Self { Self::of(SchemaType::String) }
    pub fn integer() -> Self { Self::of(SchemaType::Integer) }
    pub fn number() -> Self { Self::of(SchemaType::Number) }
    pub fn boolean() -> Self { Self::of(SchemaType::Boolean) }

    /// An empty object; properties are filled in by the product composer.
    pub fn object() -> Self { Self::of(SchemaType::Object) }

    /// Homogeneous list of `items`.
    pub fn array(items: Referenced) -> Self {
        Self {
            items: Some(Items::Object(Box::new(items))),
            ..Self::of(SchemaType::Array)
        }
    }

    /// Fixed-length heterogeneous array.
    pub fn tuple(elems: Vec<Referenced>) -> Self {
        let len = elems.len() as u64;
        Self {
            items: Some(Items::Array(elems)),
            min_items: Some(len),
            max_items: Some(len),
            ..Self::of(SchemaType::Array)
        }
    }

    /// String-keyed map whose values follow `values`.
    pub fn map(values: Referenced) -> Self {
        Self {
            additional_properties: Some(AdditionalProperties::Schema(Box::new(values))),
            ..Self::of(SchemaType::Object)
        }
    }

    /// Marker for values without payload; they encode as `[]`.
    pub fn nullary() -> Self {
        Self {
            items: Some(Items::Array(Vec::new())),
            ..Self::of(SchemaType::Array)
        }
    }

    pub fn string_enum<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enum_: Some(tags.into_iter().map(|tag| Value::String(tag.into())).collect()),
            ..Self::string()
        }
    }

    pub fn all_of(parts: Vec<Referenced>) -> Self {
        Self { all_of: parts, ..Self::default() }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_bounds(mut self, minimum: impl Into<Number>, maximum: impl Into<Number>) -> Self {
        self.minimum = Some(minimum.into());
        self.maximum = Some(maximum.into());
        self
    }

    pub fn is_nullary(&self) -> bool {
        self.schema_type == Some(SchemaType::Array)
            && matches!(&self.items, Some(Items::Array(elems)) if elems.is_empty())
    }

    /// Names of every definition this schema points at, inline children
    /// included, in first-seen order.
    pub fn references(&self) -> IndexSet<&str> {
        let mut out = IndexSet::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut IndexSet<&'a str>) {
        for child in self.children() {
            match child {
                Referenced::Ref(name) => {
                    out.insert(name.as_str());
                }
                Referenced::Inline(schema) => schema.collect_references(out),
            }
        }
    }

    fn children(&self) -> impl Iterator<Item = &Referenced> {
        let items: &[Referenced] = match &self.items {
            Some(Items::Object(item)) => std::slice::from_ref(item.as_ref()),
            Some(Items::Array(elems)) => elems.as_slice(),
            None => &[],
        };
        let additional = match &self.additional_properties {
            Some(AdditionalProperties::Schema(values)) => Some(values.as_ref()),
            _ => None,
        };
        items
            .iter()
            .chain(self.all_of.iter())
            .chain(self.properties.values())
            .chain(additional)
    }

    /// Rebuild the schema with every `Ref(name)` replaced by `f(name)`.
    pub fn map_references(mut self, f: &mut dyn FnMut(String) -> Referenced) -> Self {
        self.items = match self.items.take() {
            Some(Items::Object(item)) => Some(Items::Object(Box::new(item.map_references(f)))),
            Some(Items::Array(elems)) => {
                let mut mapped = Vec::with_capacity(elems.len());
                for elem in elems {
                    mapped.push(elem.map_references(f));
                }
                Some(Items::Array(mapped))
            }
            None => None,
        };
        let all_of = std::mem::take(&mut self.all_of);
        for part in all_of {
            self.all_of.push(part.map_references(f));
        }
        let properties = std::mem::take(&mut self.properties);
        for (key, value) in properties {
            self.properties.insert(key, value.map_references(f));
        }
        self.additional_properties = match self.additional_properties.take() {
            Some(AdditionalProperties::Schema(values)) => {
                Some(AdditionalProperties::Schema(Box::new(values.map_references(f))))
            }
            other => other,
        };
        self
    }
}

impl Referenced {
    pub fn inline(schema: Schema) -> Self {
        Self::Inline(Box::new(schema))
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::Ref(name.into())
    }

    pub fn as_ref_name(&self) -> Option<&str> {
        match self {
            Self::Ref(name) => Some(name),
            Self::Inline(_) => None,
        }
    }

    pub fn as_inline(&self) -> Option<&Schema> {
        match self {
            Self::Ref(_) => None,
            Self::Inline(schema) => Some(schema),
        }
    }

    pub fn map_references(self, f: &mut dyn FnMut(String) -> Referenced) -> Self {
        match self {
            Self::Ref(name) => f(name),
            Self::Inline(schema) => Self::Inline(Box::new(schema.map_references(f))),
        }
    }
}

impl NamedSchema {
    pub fn named(name: impl Into<String>, schema: Schema) -> Self {
        Self { name: Some(name.into()), schema }
    }

    pub fn unnamed(schema: Schema) -> Self {
        Self { name: None, schema }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// WIRE FORM
// ————————————————————————————————————————————————————————————————————————————

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawReferenced {
    Ref {
        #[serde(rename = "$ref")]
        path: String,
    },
    Inline(Box<Schema>),
}

impl From<Referenced> for RawReferenced {
    fn from(value: Referenced) -> Self {
        match value {
            Referenced::Ref(name) => Self::Ref { path: format!("{DEFINITIONS_PREFIX}{name}") },
            Referenced::Inline(schema) => Self::Inline(schema),
        }
    }
}

impl TryFrom<RawReferenced> for Referenced {
    type Error = String;

    fn try_from(value: RawReferenced) -> Result<Self, Self::Error> {
        match value {
            RawReferenced::Ref { path } => match path.strip_prefix(DEFINITIONS_PREFIX) {
                Some(name) => Ok(Self::Ref(name.to_owned())),
                None => Err(format!("only `{DEFINITIONS_PREFIX}` references are supported, got `{path}`")),
            },
            RawReferenced::Inline(schema) => Ok(Self::Inline(schema)),
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
