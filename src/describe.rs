//! [`Describe`]: static shape of a Rust type.
//!
//! Standard and chrono types are covered here. User types implement it by
//! hand, going through [`ShapeCatalog::define`] so recursive types register
//! themselves before describing their fields:
//!
//! ```
//! use swagger_osi::{Describe, Record, ShapeCatalog, TypeShape};
//!
//! #[allow(dead_code)]
//! struct Node {
//!     label: String,
//!     children: Vec<Node>,
//! }
//!
//! impl Describe for Node {
//!     fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
//!         catalog.define::<Self>(|catalog| {
//!             Record::named("Node")
//!                 .field("label", String::describe(catalog))
//!                 .field("children", Vec::<Node>::describe(catalog))
//!                 .into()
//!         })
//!     }
//! }
//!
//! let mut catalog = ShapeCatalog::new();
//! let root = catalog.describe::<Node>();
//! assert!(matches!(root, TypeShape::Named(_)));
//! assert_eq!(catalog.len(), 1);
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use indexmap::{IndexMap, IndexSet};

use crate::shape::{Primitive, ShapeCatalog, TypeShape};

pub trait Describe {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape;
}

macro_rules! describe_primitive {
    ($($ty:ty => $primitive:ident),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe(_: &mut ShapeCatalog) -> TypeShape {
                    TypeShape::Primitive(Primitive::$primitive)
                }
            }
        )*
    };
}

describe_primitive! {
    bool => Bool,
    char => Char,
    str => String,
    String => String,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => U64,
    i128 => Integer,
    u128 => Integer,
    f32 => F32,
    f64 => F64,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    DateTime<Utc> => DateTimeUtc,
    DateTime<FixedOffset> => DateTimeZoned,
}

// pointers

macro_rules! describe_transparent {
    ($($ptr:ident),*) => {
        $(
            impl<T: Describe + ?Sized> Describe for $ptr<T> {
                fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
                    T::describe(catalog)
                }
            }
        )*
    };
}

describe_transparent!(Box, Rc, Arc);

impl<T: Describe + ?Sized> Describe for &T {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        T::describe(catalog)
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        TypeShape::optional(T::describe(catalog))
    }
}

// sequences

impl<T: Describe> Describe for Vec<T> {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        TypeShape::list(T::describe(catalog))
    }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        TypeShape::list(T::describe(catalog))
    }
}

impl<T: Describe> Describe for [T] {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        TypeShape::list(T::describe(catalog))
    }
}

// fixed length: one tuple slot per element
impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        TypeShape::Tuple(vec![T::describe(catalog); N])
    }
}

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        TypeShape::set(T::describe(catalog))
    }
}

impl<T: Describe> Describe for BTreeSet<T> {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        TypeShape::set(T::describe(catalog))
    }
}

impl<T: Describe, S> Describe for IndexSet<T, S> {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        TypeShape::set(T::describe(catalog))
    }
}

// maps: only string keys have a JSON object form

impl<V: Describe, S> Describe for HashMap<String, V, S> {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        TypeShape::map(V::describe(catalog))
    }
}

impl<V: Describe> Describe for BTreeMap<String, V> {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        TypeShape::map(V::describe(catalog))
    }
}

impl<V: Describe, S> Describe for IndexMap<String, V, S> {
    fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
        TypeShape::map(V::describe(catalog))
    }
}

// tuples

impl Describe for () {
    fn describe(_: &mut ShapeCatalog) -> TypeShape {
        TypeShape::Tuple(Vec::new())
    }
}

macro_rules! describe_tuple {
    ($($name:ident),+) => {
        impl<$($name: Describe),+> Describe for ($($name,)+) {
            fn describe(catalog: &mut ShapeCatalog) -> TypeShape {
                TypeShape::Tuple(vec![$($name::describe(catalog)),+])
            }
        }
    };
}

describe_tuple!(A);
describe_tuple!(A, B);
describe_tuple!(A, B, C);
describe_tuple!(A, B, C, D);
describe_tuple!(A, B, C, D, E);
describe_tuple!(A, B, C, D, E, F);

// ------------------------------- Tests ------------------------------------ //
