//! Schema derivation: turns a [`TypeShape`] into a [`Referenced`] schema while
//! filling a [`Definitions`] registry.
//!
//! Named types are emitted once, as definitions, and referenced everywhere
//! else. The body of a record or sum only ever *references* the named types
//! it mentions; those are queued and expanded after the enclosing name is
//! registered. Because a name is registered before anything it mentions is
//! expanded, recursive and mutually recursive types terminate.

mod product;
mod sum;

use std::borrow::Cow;
use std::collections::VecDeque;

use tracing::{debug, trace, warn};

use crate::definitions::Definitions;
use crate::error::{Error, Result};
use crate::leaf::{self, LeafSchema};
use crate::options::{SchemaOptions, check_name};
use crate::schema::{NamedSchema, Referenced, Schema};
use crate::shape::{Record, ShapeSource, Sum, TypeShape};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Derivation entry point: a shape source, a leaf table and options.
pub struct Generator<'a> {
    shapes: &'a dyn ShapeSource,
    leaves: &'a dyn LeafSchema,
    options: SchemaOptions,
}

/// State of one derivation against one registry.
pub(crate) struct Run<'s, 'd> {
    generator: &'s Generator<'s>,
    definitions: &'d mut Definitions,
    /// Identities whose body is being computed right now.
    expanding: Vec<Cow<'s, str>>,
    /// Named types referenced but not yet registered.
    queue: VecDeque<&'s TypeShape>,
}

/// A shape with `Optional` and `Named` wrappers peeled off.
struct Head<'s> {
    concrete: Concrete<'s>,
    /// Definition name, when the type has one.
    name: Option<String>,
    /// What the type *is*: catalog key, declared name or named primitive.
    identity: Option<Cow<'s, str>>,
}

enum Concrete<'s> {
    Leaf(Schema),
    List(&'s TypeShape),
    Set(&'s TypeShape),
    Map(&'s TypeShape),
    Tuple(&'s [TypeShape]),
    Record(&'s Record),
    Sum(&'s Sum),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl<'a> Generator<'a> {
    /// Fails on misconfigured options or leaf overrides, before any shape is
    /// looked at.
    pub fn new(shapes: &'a dyn ShapeSource, leaves: &'a dyn LeafSchema, options: SchemaOptions) -> Result<Self> {
        options.validate()?;
        leaves.validate()?;
        Ok(Self { shapes, leaves, options })
    }

    /// Built-in leaves and default options.
    pub fn with_defaults(shapes: &'a dyn ShapeSource) -> Self {
        Self { shapes, leaves: leaf::builtin(), options: SchemaOptions::default() }
    }

    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// Definition name `shape` would be registered under.
    pub fn schema_name(&self, shape: &TypeShape) -> Result<Option<String>> {
        Ok(head(self, shape)?.name)
    }

    /// Reference to `shape`: a `$ref` for named types (registering them and
    /// everything they mention), the inline schema otherwise.
    pub fn declare_schema_ref(&self, shape: &TypeShape, definitions: &mut Definitions) -> Result<Referenced> {
        self.transaction(definitions, |run| run.schema_ref(shape))
    }

    /// [`declare_schema_ref`](Self::declare_schema_ref) for a catalog key.
    pub fn declare_key(&self, key: &str, definitions: &mut Definitions) -> Result<Referenced> {
        let shape = TypeShape::named(key);
        self.declare_schema_ref(&shape, definitions)
    }

    /// Top-level schema of `shape` with its name. The root itself is not
    /// registered unless something it mentions refers back to it, but a
    /// different type claiming the same name is still a collision.
    pub fn declare_named_schema(&self, shape: &TypeShape, definitions: &mut Definitions) -> Result<NamedSchema> {
        self.transaction(definitions, |run| run.named_schema(shape))
    }

    pub fn declare_schema(&self, shape: &TypeShape, definitions: &mut Definitions) -> Result<Schema> {
        Ok(self.declare_named_schema(shape, definitions)?.schema)
    }

    pub fn to_schema(&self, shape: &TypeShape) -> Result<(Definitions, Schema)> {
        let mut definitions = Definitions::new();
        let schema = self.declare_schema(shape, &mut definitions)?;
        Ok((definitions, schema))
    }

    pub fn to_schema_ref(&self, shape: &TypeShape) -> Result<(Definitions, Referenced)> {
        let mut definitions = Definitions::new();
        let reference = self.declare_schema_ref(shape, &mut definitions)?;
        Ok((definitions, reference))
    }

    pub fn to_named_schema(&self, shape: &TypeShape) -> Result<(Definitions, NamedSchema)> {
        let mut definitions = Definitions::new();
        let named = self.declare_named_schema(shape, &mut definitions)?;
        Ok((definitions, named))
    }

    /// Self-contained schema: every non-recursive reference is replaced by
    /// its definition.
    pub fn to_inlined_schema(&self, shape: &TypeShape) -> Result<Schema> {
        let (definitions, schema) = self.to_schema(shape)?;
        Ok(definitions.inline_non_recursive(schema))
    }

    /// Run `step` and drain the reference queue. On failure the registry is
    /// restored to what it held before.
    fn transaction<'s, T>(
        &'s self,
        definitions: &mut Definitions,
        step: impl FnOnce(&mut Run<'s, '_>) -> Result<T>,
    ) -> Result<T> {
        let checkpoint = definitions.checkpoint();
        let mut run = Run::new(self, &mut *definitions);
        let out = step(&mut run).and_then(|value| {
            run.drain()?;
            Ok(value)
        });
        if let Err(err) = &out {
            let removed = definitions.rollback(checkpoint);
            warn!(%err, removed, "derivation failed, registry rolled back");
        }
        out
    }
}

impl<'s, 'd> Run<'s, 'd> {
    fn new(generator: &'s Generator<'s>, definitions: &'d mut Definitions) -> Self {
        Self { generator, definitions, expanding: Vec::new(), queue: VecDeque::new() }
    }

    pub(crate) fn options(&self) -> &'s SchemaOptions {
        &self.generator.options
    }

    fn schema_ref(&mut self, shape: &'s TypeShape) -> Result<Referenced> {
        let head = head(self.generator, shape)?;
        let Some(name) = head.name.clone() else {
            return Ok(Referenced::inline(self.expand(&head)?));
        };
        let identity = head.identity.as_deref().unwrap_or(&name).to_owned();
        if self.definitions.contains(&name) {
            self.definitions.check_owner(&name, &identity)?;
            trace!(%name, "already defined");
            return Ok(Referenced::Ref(name));
        }
        let body = self.expand(&head)?;
        self.definitions.register(&name, &identity, body)?;
        debug!(%name, owner = %identity, "registered definition");
        Ok(Referenced::Ref(name))
    }

    fn named_schema(&mut self, shape: &'s TypeShape) -> Result<NamedSchema> {
        let head = head(self.generator, shape)?;
        let schema = self.expand(&head)?;
        if let Some(name) = &head.name {
            // an unregistered root still owns its name
            self.drain()?;
            let identity = head.identity.as_deref().unwrap_or(name);
            self.definitions.check_owner(name, identity)?;
        }
        Ok(NamedSchema { name: head.name, schema })
    }

    /// Reference to a type mentioned inside a body. Named types are queued,
    /// not expanded.
    pub(crate) fn reference(&mut self, shape: &'s TypeShape) -> Result<Referenced> {
        let head = head(self.generator, shape)?;
        let Some(name) = head.name.clone() else {
            return Ok(Referenced::inline(self.expand(&head)?));
        };
        if self.definitions.contains(&name) {
            let identity = head.identity.as_deref().unwrap_or(&name);
            self.definitions.check_owner(&name, identity)?;
        } else {
            self.queue.push_back(shape);
        }
        Ok(Referenced::Ref(name))
    }

    /// The schema of `shape` itself rather than a reference to it; for a
    /// named type that is its body. Re-entering a body that is already being
    /// expanded means a chain of one-field wrappers closed on itself.
    pub(crate) fn own_schema(&mut self, shape: &'s TypeShape) -> Result<Schema> {
        let head = head(self.generator, shape)?;
        if let Some(identity) = &head.identity
            && self.expanding.contains(identity)
        {
            return Err(match &head.name {
                Some(name) => Error::WrapperCycle(name.clone()),
                None => Error::AnonymousCycle(identity.to_string()),
            });
        }
        self.expand(&head)
    }

    fn drain(&mut self) -> Result<()> {
        while let Some(shape) = self.queue.pop_front() {
            self.schema_ref(shape)?;
        }
        Ok(())
    }

    fn expand(&mut self, head: &Head<'s>) -> Result<Schema> {
        let Some(identity) = head.identity.clone() else {
            return self.body(head);
        };
        if head.name.is_none() && self.expanding.contains(&identity) {
            return Err(Error::AnonymousCycle(identity.into_owned()));
        }
        self.expanding.push(identity);
        let out = self.body(head);
        self.expanding.pop();
        out
    }

    fn body(&mut self, head: &Head<'s>) -> Result<Schema> {
        let owner = head.name.as_deref().or(head.identity.as_deref()).unwrap_or("<anonymous>");
        match head.concrete {
            Concrete::Leaf(ref schema) => Ok(schema.clone()),
            Concrete::List(inner) => Ok(Schema::array(self.reference(inner)?)),
            Concrete::Set(inner) => Ok(Schema {
                unique_items: Some(true),
                ..Schema::array(self.reference(inner)?)
            }),
            Concrete::Map(inner) => Ok(Schema::map(self.reference(inner)?)),
            Concrete::Tuple([]) => Ok(Schema::nullary()),
            Concrete::Tuple(elems) => {
                let mut refs = Vec::with_capacity(elems.len());
                for elem in elems {
                    refs.push(self.reference(elem)?);
                }
                Ok(Schema::tuple(refs))
            }
            Concrete::Record(record) => product::compose(self, owner, &record.fields),
            Concrete::Sum(sum) => sum::compose(self, owner, &sum.variants),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Follow `Optional` and `Named` down to a concrete shape and work out its
/// name and identity.
fn head<'s>(generator: &'s Generator<'s>, mut shape: &'s TypeShape) -> Result<Head<'s>> {
    let shapes = generator.shapes;
    let options = &generator.options;
    let mut key: Option<&'s str> = None;
    let mut followed: Vec<&'s str> = Vec::new();
    let keyed = |concrete, key: Option<&'s str>| Head { concrete, name: None, identity: key.map(Cow::Borrowed) };
    loop {
        let head = match shape {
            TypeShape::Optional(inner) => {
                shape = inner.as_ref();
                continue;
            }
            TypeShape::Named(next) => {
                if followed.contains(&next.as_str()) {
                    return Err(Error::AliasCycle(next.clone()));
                }
                followed.push(next);
                shape = shapes.shape(next).ok_or_else(|| Error::UnknownType(next.clone()))?;
                key = Some(next);
                continue;
            }
            TypeShape::Primitive(primitive) => {
                let leaf = generator
                    .leaves
                    .leaf(*primitive)
                    .ok_or(Error::UnsupportedPrimitive(*primitive))?;
                let identity = match &leaf.name {
                    Some(_) => Some(Cow::Owned(format!("primitive:{primitive}"))),
                    None => key.map(Cow::Borrowed),
                };
                Head { concrete: Concrete::Leaf(leaf.schema), name: leaf.name, identity }
            }
            TypeShape::List(inner) => keyed(Concrete::List(inner), key),
            TypeShape::Set(inner) => keyed(Concrete::Set(inner), key),
            TypeShape::Map(inner) => keyed(Concrete::Map(inner), key),
            TypeShape::Tuple(elems) => keyed(Concrete::Tuple(elems), key),
            TypeShape::Record(record) => {
                let (name, identity) = datatype(options, record.name.as_deref(), key)?;
                Head { concrete: Concrete::Record(record), name, identity }
            }
            TypeShape::Sum(sum) => {
                let (name, identity) = datatype(options, sum.name.as_deref(), key)?;
                Head { concrete: Concrete::Sum(sum), name, identity }
            }
        };
        return Ok(head);
    }
}

/// Records and sums are named after their declared name, or after the key
/// they were reached through.
fn datatype<'s>(
    options: &SchemaOptions,
    declared: Option<&'s str>,
    key: Option<&'s str>,
) -> Result<(Option<String>, Option<Cow<'s, str>>)> {
    let Some(raw) = declared.or(key) else {
        return Ok((None, None));
    };
    let name = options.datatype_name(raw);
    check_name(&name)?;
    Ok((Some(name), Some(Cow::Borrowed(key.unwrap_or(raw)))))
}

// ------------------------------- Tests ------------------------------------ //
