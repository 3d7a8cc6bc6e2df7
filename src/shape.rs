//! Shape descriptors: the static structure of a type, independent of how it
//! was obtained (a `Describe` impl, a catalog file, or hand registration).

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::describe::Describe;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeShape {
    Primitive(Primitive),
    /// Same schema as the inner type; only affects `required`.
    Optional(Box<TypeShape>),
    List(Box<TypeShape>),
    Set(Box<TypeShape>),
    /// String-keyed map.
    Map(Box<TypeShape>),
    Tuple(Vec<TypeShape>),
    Record(Record),
    Sum(Sum),
    /// Late-bound reference to a shape held by a [`ShapeSource`].
    Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    Bool,
    Char,
    String,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    /// Arbitrary precision integer.
    Integer,
    F32,
    F64,
    Uuid,
    Bytes,
    Binary,
    Uri,
    Date,
    Time,
    DateTime,
    DateTimeUtc,
    DateTimeZoned,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// `None` for positional (tuple-style) fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Explicit required-ness; when absent a field is required unless its
    /// type is `Optional`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(rename = "type")]
    pub shape: TypeShape,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sum {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub tag: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Lookup of shapes behind [`TypeShape::Named`] keys.
pub trait ShapeSource {
    fn shape(&self, key: &str) -> Option<&TypeShape>;
}

/// Insertion-ordered registry of named shapes.
#[derive(Debug, Clone, Default)]
pub struct ShapeCatalog {
    shapes: IndexMap<String, TypeShape>,
    building: HashSet<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TypeShape {
    pub fn named(key: impl Into<String>) -> Self { Self::Named(key.into()) }
    pub fn optional(inner: TypeShape) -> Self { Self::Optional(Box::new(inner)) }
    pub fn list(inner: TypeShape) -> Self { Self::List(Box::new(inner)) }
    pub fn set(inner: TypeShape) -> Self { Self::Set(Box::new(inner)) }
    pub fn map(inner: TypeShape) -> Self { Self::Map(Box::new(inner)) }

    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }
}

impl From<Primitive> for TypeShape {
    fn from(primitive: Primitive) -> Self { Self::Primitive(primitive) }
}

impl From<Record> for TypeShape {
    fn from(record: Record) -> Self { Self::Record(record) }
}

impl From<Sum> for TypeShape {
    fn from(sum: Sum) -> Self { Self::Sum(sum) }
}

impl Primitive {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::String => "string",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Integer => "integer",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Uuid => "uuid",
            Self::Bytes => "bytes",
            Self::Binary => "binary",
            Self::Uri => "uri",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "date_time",
            Self::DateTimeUtc => "date_time_utc",
            Self::DateTimeZoned => "date_time_zoned",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Record {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), fields: Vec::new() }
    }

    pub fn anonymous() -> Self { Self::default() }

    pub fn field(mut self, name: impl Into<String>, shape: impl Into<TypeShape>) -> Self {
        self.fields.push(Field::named(name, shape));
        self
    }

    pub fn positional(mut self, shape: impl Into<TypeShape>) -> Self {
        self.fields.push(Field::positional(shape));
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }
}

impl Field {
    pub fn named(name: impl Into<String>, shape: impl Into<TypeShape>) -> Self {
        Self { name: Some(name.into()), required: None, shape: shape.into() }
    }

    pub fn positional(shape: impl Into<TypeShape>) -> Self {
        Self { name: None, required: None, shape: shape.into() }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(!self.shape.is_optional())
    }

    pub fn is_positional(&self) -> bool {
        self.name.is_none()
    }
}

impl Sum {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), variants: Vec::new() }
    }

    pub fn anonymous() -> Self { Self::default() }

    pub fn nullary(mut self, tag: impl Into<String>) -> Self {
        self.variants.push(Variant::nullary(tag));
        self
    }

    pub fn variant(mut self, tag: impl Into<String>, fields: Vec<Field>) -> Self {
        self.variants.push(Variant::new(tag, fields));
        self
    }
}

impl Variant {
    pub fn new(tag: impl Into<String>, fields: Vec<Field>) -> Self {
        Self { tag: tag.into(), fields }
    }

    pub fn nullary(tag: impl Into<String>) -> Self {
        Self::new(tag, Vec::new())
    }

    pub fn is_nullary(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: ShapeSource + ?Sized> ShapeSource for &S {
    fn shape(&self, key: &str) -> Option<&TypeShape> {
        (**self).shape(key)
    }
}

impl ShapeSource for IndexMap<String, TypeShape> {
    fn shape(&self, key: &str) -> Option<&TypeShape> {
        self.get(key)
    }
}

impl ShapeCatalog {
    pub fn new() -> Self { Self::default() }

    /// Register `shape` under `key`, returning the shape it replaced.
    pub fn insert(&mut self, key: impl Into<String>, shape: impl Into<TypeShape>) -> Option<TypeShape> {
        self.shapes.insert(key.into(), shape.into())
    }

    pub fn get(&self, key: &str) -> Option<&TypeShape> { self.shapes.get(key) }
    pub fn contains(&self, key: &str) -> bool { self.shapes.contains_key(key) }
    pub fn len(&self) -> usize { self.shapes.len() }
    pub fn is_empty(&self) -> bool { self.shapes.is_empty() }
    pub fn keys(&self) -> impl Iterator<Item = &str> { self.shapes.keys().map(String::as_str) }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeShape)> {
        self.shapes.iter().map(|(key, shape)| (key.as_str(), shape))
    }

    /// Shape of `T`, registering `T` and everything it mentions.
    pub fn describe<T: Describe + ?Sized>(&mut self) -> TypeShape {
        T::describe(self)
    }

    /// Register the shape of `T` under its type name and return a
    /// [`TypeShape::Named`] pointing at it.
    ///
    /// The key is reserved before `build` runs, so a `Describe` impl that
    /// mentions its own type (directly or through other types) gets the
    /// `Named` handle back instead of recursing forever.
    pub fn define<T: ?Sized + 'static>(&mut self, build: impl FnOnce(&mut Self) -> TypeShape) -> TypeShape {
        self.define_as(std::any::type_name::<T>(), build)
    }

    /// [`define`](Self::define) with an explicit key.
    pub fn define_as(&mut self, key: &str, build: impl FnOnce(&mut Self) -> TypeShape) -> TypeShape {
        if !self.shapes.contains_key(key) && self.building.insert(key.to_owned()) {
            let shape = build(self);
            self.building.remove(key);
            self.shapes.insert(key.to_owned(), shape);
        }
        TypeShape::Named(key.to_owned())
    }
}

impl ShapeSource for ShapeCatalog {
    fn shape(&self, key: &str) -> Option<&TypeShape> {
        self.shapes.get(key)
    }
}

impl FromIterator<(String, TypeShape)> for ShapeCatalog {
    fn from_iter<I: IntoIterator<Item = (String, TypeShape)>>(iter: I) -> Self {
        Self { shapes: iter.into_iter().collect(), building: HashSet::new() }
    }
}

// ------------------------------- Tests ------------------------------------ //
