//! Registry of named schema definitions.
//!
//! Every named type met while deriving a schema gets exactly one entry here;
//! every other mention of it is a `$ref`. The registry remembers which type
//! claimed each name so that two different types cannot silently share one.

use indexmap::{IndexMap, IndexSet};
use serde::ser::{Serialize, Serializer};

use crate::error::{Error, Result};
use crate::schema::{Referenced, Schema};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Insertion-ordered name → schema map. Equality ignores order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definitions {
    entries: IndexMap<String, Entry>,
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    owner: String,
    schema: Schema,
}

/// Position in the registry to roll back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Checkpoint(usize);

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.entries.get(name).map(|entry| &entry.schema)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Identity of the type that registered `name`.
    pub fn owner(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|entry| entry.owner.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), &entry.schema))
    }

    pub fn into_map(self) -> IndexMap<String, Schema> {
        self.entries.into_iter().map(|(name, entry)| (name, entry.schema)).collect()
    }

    /// Fails if `name` is held by a different type.
    pub(crate) fn check_owner(&self, name: &str, owner: &str) -> Result<()> {
        match self.entries.get(name) {
            Some(entry) if entry.owner != owner => Err(Error::NameCollision {
                name: name.to_owned(),
                first: entry.owner.clone(),
                second: owner.to_owned(),
            }),
            _ => Ok(()),
        }
    }

    /// Insert a definition. A name is written at most once; registering it
    /// again for the same owner keeps the first schema.
    pub(crate) fn register(&mut self, name: &str, owner: &str, schema: Schema) -> Result<()> {
        self.check_owner(name, owner)?;
        if !self.entries.contains_key(name) {
            let entry = Entry { owner: owner.to_owned(), schema };
            self.entries.insert(name.to_owned(), entry);
        }
        Ok(())
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.entries.len())
    }

    /// Drop every entry added since `checkpoint`; returns how many went.
    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) -> usize {
        let removed = self.entries.len().saturating_sub(checkpoint.0);
        self.entries.truncate(checkpoint.0);
        removed
    }

    /// References that no entry satisfies, across every definition.
    pub fn dangling(&self) -> IndexSet<&str> {
        self.entries
            .values()
            .flat_map(|entry| entry.schema.references())
            .filter(|name| !self.entries.contains_key(*name))
            .collect()
    }

    /// Names whose definition can reach itself through references.
    pub fn recursive(&self) -> IndexSet<&str> {
        self.entries
            .keys()
            .map(String::as_str)
            .filter(|name| self.reaches(name, name))
            .collect()
    }

    fn reaches(&self, from: &str, target: &str) -> bool {
        let mut seen: IndexSet<&str> = IndexSet::new();
        let mut pending: Vec<&str> = vec![from];
        while let Some(name) = pending.pop() {
            let Some(schema) = self.get(name) else { continue };
            for next in schema.references() {
                if next == target {
                    return true;
                }
                if seen.insert(next) {
                    pending.push(next);
                }
            }
        }
        false
    }

    /// Replace `$ref`s with the referenced body wherever `accept` agrees.
    ///
    /// A name is never expanded inside its own expansion, so this terminates
    /// even when `accept` admits recursive definitions; those keep a `$ref`
    /// at the point where they would recurse. Unknown names stay references.
    pub fn inline(&self, schema: Schema, accept: &dyn Fn(&str) -> bool) -> Schema {
        let mut stack = Vec::new();
        self.inline_with(schema, accept, &mut stack)
    }

    /// Inline everything that cannot reach itself.
    pub fn inline_non_recursive(&self, schema: Schema) -> Schema {
        let recursive = self.recursive();
        self.inline(schema, &|name| !recursive.contains(name))
    }

    pub fn inline_all(&self, schema: Schema) -> Schema {
        self.inline(schema, &|_| true)
    }

    fn inline_with(&self, schema: Schema, accept: &dyn Fn(&str) -> bool, stack: &mut Vec<String>) -> Schema {
        schema.map_references(&mut |name| self.inline_reference(name, accept, stack))
    }

    fn inline_reference(&self, name: String, accept: &dyn Fn(&str) -> bool, stack: &mut Vec<String>) -> Referenced {
        if stack.contains(&name) || !accept(&name) {
            return Referenced::Ref(name);
        }
        let Some(body) = self.get(&name) else {
            return Referenced::Ref(name);
        };
        let body = body.clone();
        stack.push(name);
        let inlined = self.inline_with(body, accept, stack);
        stack.pop();
        Referenced::inline(inlined)
    }
}

impl Serialize for Definitions {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

// ------------------------------- Tests ------------------------------------ //
