use thiserror::Error;

use crate::shape::Primitive;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can stop a derivation run. All of these are static: they
/// depend on the shape graph or the configuration, never on data.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no shape is registered under `{0}`")]
    UnknownType(String),

    #[error("shape aliases form a cycle through `{0}`")]
    AliasCycle(String),

    #[error("no leaf schema for primitive `{0}`")]
    UnsupportedPrimitive(Primitive),

    #[error("`{0}` refers to itself but has no schema name to refer through")]
    AnonymousCycle(String),

    #[error("`{0}` only wraps itself through one-field records and has no finite value")]
    WrapperCycle(String),

    #[error("record `{0}` mixes named and positional fields")]
    MixedFields(String),

    #[error("sum `{0}` has no variants")]
    EmptySum(String),

    #[error("`{owner}` declares field `{label}` more than once")]
    DuplicateField { owner: String, label: String },

    #[error("`{owner}` declares tag `{tag}` more than once")]
    DuplicateTag { owner: String, tag: String },

    #[error("`{0}` cannot be used as a schema name")]
    InvalidName(String),

    #[error("schema name `{name}` is claimed by both `{first}` and `{second}`")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("shape `{0}` is registered more than once")]
    DuplicateShape(String),

    #[error("misconfiguration: {0}")]
    Misconfigured(String),

    #[error("invalid catalog at `{path}`: {source}")]
    Catalog {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
