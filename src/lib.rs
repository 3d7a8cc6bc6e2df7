//! Derive OpenAPI 2.0 (Swagger) Schema Objects from static type shapes.
//!
//! A type is described as a [`TypeShape`] (by a [`Describe`] impl, by hand,
//! or from a JSON [`Catalog`]). A [`Generator`] turns shapes into schemas
//! and collects every named type into a shared [`Definitions`] registry,
//! referencing it with `{"$ref": "#/definitions/<name>"}` everywhere else.
//! Recursive types terminate: a name is registered before the types it
//! mentions are expanded.

pub mod catalog;
pub mod declare;
pub mod definitions;
pub mod describe;
pub mod error;
pub mod leaf;
pub mod options;
pub mod path_de;
pub mod schema;
pub mod shape;

pub use catalog::{Catalog, CatalogFile};
pub use declare::Generator;
pub use definitions::Definitions;
pub use describe::Describe;
pub use error::{Error, Result};
pub use leaf::{LeafSchema, LeafTable};
pub use options::{RenameRule, SchemaOptions};
pub use schema::{NamedSchema, Referenced, Schema, SchemaType};
pub use shape::{Field, Primitive, Record, ShapeCatalog, ShapeSource, Sum, TypeShape, Variant};
