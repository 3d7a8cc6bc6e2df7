//! Catalog files: shapes, leaf overrides and options declared as JSON.
//!
//! ```json
//! {
//!   "options": { "field_label": "camelCase" },
//!   "leaves":  { "uuid": { "name": "Id", "schema": { "type": "string" } } },
//!   "types":   { "Point": { "record": { "fields": [ { "name": "x", "type": { "primitive": "f64" } } ] } } },
//!   "roots":   ["Point"]
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::declare::Generator;
use crate::error::{Error, Result};
use crate::leaf::LeafTable;
use crate::options::SchemaOptions;
use crate::path_de::from_str_with_path;
use crate::schema::NamedSchema;
use crate::shape::{Primitive, ShapeCatalog, TypeShape};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// One catalog document, as written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<SchemaOptions>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub leaves: IndexMap<Primitive, NamedSchema>,
    pub types: IndexMap<String, TypeShape>,
    /// Keys to derive. Every key in `types` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roots: Option<Vec<String>>,
}

/// Any number of catalog files merged together.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub options: SchemaOptions,
    pub leaves: LeafTable,
    pub shapes: ShapeCatalog,
    pub roots: Vec<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CatalogFile {
    pub fn from_json(src: &str) -> Result<Self> {
        from_str_with_path(src)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            options: SchemaOptions::default(),
            leaves: LeafTable::builtin(),
            shapes: ShapeCatalog::new(),
            roots: Vec::new(),
        }
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(src: &str) -> Result<Self> {
        let mut catalog = Self::new();
        catalog.merge(CatalogFile::from_json(src)?)?;
        Ok(catalog)
    }

    /// Add a file's contents. A key already present is an error and leaves
    /// the catalog unchanged; options and leaf overrides from later files win.
    pub fn merge(&mut self, file: CatalogFile) -> Result<()> {
        if let Some(key) = file.types.keys().find(|key| self.shapes.contains(key)) {
            return Err(Error::DuplicateShape(key.clone()));
        }
        let roots = match file.roots {
            Some(roots) => roots,
            None => file.types.keys().cloned().collect(),
        };
        for (key, shape) in file.types {
            self.shapes.insert(key, shape);
        }
        if let Some(options) = file.options {
            self.options = options;
        }
        self.leaves.extend(file.leaves);
        for root in roots {
            if !self.roots.contains(&root) {
                self.roots.push(root);
            }
        }
        Ok(())
    }

    /// A generator over this catalog. Fails on misconfigured options or
    /// leaf overrides.
    pub fn generator(&self) -> Result<Generator<'_>> {
        self.generator_with(self.options.clone())
    }

    pub fn generator_with(&self, options: SchemaOptions) -> Result<Generator<'_>> {
        Generator::new(&self.shapes, &self.leaves, options)
    }
}

// ------------------------------- Tests ------------------------------------ //
