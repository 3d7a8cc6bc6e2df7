//! Schemas for primitive leaves.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::options::check_name;
use crate::schema::{NamedSchema, Schema};
use crate::shape::Primitive;

/// Maps a primitive to its schema and optional conventional name.
pub trait LeafSchema {
    fn leaf(&self, primitive: Primitive) -> Option<NamedSchema>;

    /// Checked once before any derivation starts.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Overridable primitive → schema table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeafTable {
    entries: IndexMap<Primitive, NamedSchema>,
}

static BUILTIN: Lazy<LeafTable> = Lazy::new(LeafTable::build_builtin);

/// The shared built-in table.
pub fn builtin() -> &'static LeafTable {
    &BUILTIN
}

impl LeafTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Replace the schema for `primitive`, returning the previous entry.
    pub fn set(&mut self, primitive: Primitive, leaf: NamedSchema) -> Option<NamedSchema> {
        self.entries.insert(primitive, leaf)
    }

    pub fn remove(&mut self, primitive: Primitive) -> Option<NamedSchema> {
        self.entries.shift_remove(&primitive)
    }

    pub fn get(&self, primitive: Primitive) -> Option<&NamedSchema> {
        self.entries.get(&primitive)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Primitive, &NamedSchema)> {
        self.entries.iter().map(|(primitive, leaf)| (*primitive, leaf))
    }

    pub fn extend(&mut self, overrides: impl IntoIterator<Item = (Primitive, NamedSchema)>) {
        self.entries.extend(overrides);
    }

    fn build_builtin() -> Self {
        let mut table = Self::empty();
        let mut put = |primitive, leaf| {
            table.set(primitive, leaf);
        };

        put(Primitive::Bool, unnamed(Schema::boolean()));
        put(
            Primitive::Char,
            unnamed(Schema { min_length: Some(1), max_length: Some(1), ..Schema::string() }),
        );
        put(Primitive::String, unnamed(Schema::string()));

        put(Primitive::I8, unnamed(int32().with_bounds(i8::MIN, i8::MAX)));
        put(Primitive::I16, unnamed(int32().with_bounds(i16::MIN, i16::MAX)));
        put(Primitive::I32, unnamed(int32().with_bounds(i32::MIN, i32::MAX)));
        put(Primitive::I64, unnamed(int64().with_bounds(i64::MIN, i64::MAX)));
        put(Primitive::U8, unnamed(int32().with_bounds(u8::MIN, u8::MAX)));
        put(Primitive::U16, unnamed(int32().with_bounds(u16::MIN, u16::MAX)));
        put(Primitive::U32, unnamed(int64().with_bounds(u32::MIN, u32::MAX)));
        put(Primitive::U64, unnamed(int64().with_bounds(u64::MIN, u64::MAX)));
        put(Primitive::Integer, unnamed(Schema::integer()));

        put(Primitive::F32, unnamed(Schema::number().with_format("float")));
        put(Primitive::F64, unnamed(Schema::number().with_format("double")));

        put(
            Primitive::Uuid,
            NamedSchema::named(
                "UUID",
                Schema {
                    example: Some(Value::String("3fa85f64-5717-4562-b3fc-2c963f66afa6".into())),
                    ..Schema::string().with_format("uuid")
                },
            ),
        );
        put(Primitive::Bytes, unnamed(Schema::string().with_format("byte")));
        put(Primitive::Binary, unnamed(Schema::string().with_format("binary")));
        put(Primitive::Uri, unnamed(Schema::string().with_format("uri")));

        let sample = sample_moment();
        let render = |fmt: &str| sample.map(|moment| moment.format(fmt).to_string());
        let zoned = sample.and_then(|moment| {
            let offset = FixedOffset::east_opt(3 * 3600)?;
            let local = offset.from_local_datetime(&moment).single()?;
            Some(local.format("%Y-%m-%dT%H:%M:%S%z").to_string())
        });

        put(Primitive::Date, timestamp("Date", "yyyy-mm-dd", render("%Y-%m-%d")));
        put(Primitive::Time, timestamp("Time", "hh:MM:ss", render("%H:%M:%S")));
        put(
            Primitive::DateTime,
            timestamp("LocalTime", "yyyy-mm-ddThh:MM:ss", render("%Y-%m-%dT%H:%M:%S")),
        );
        put(
            Primitive::DateTimeUtc,
            timestamp("UTCTime", "yyyy-mm-ddThh:MM:ssZ", render("%Y-%m-%dT%H:%M:%SZ")),
        );
        put(Primitive::DateTimeZoned, timestamp("ZonedTime", "yyyy-mm-ddThh:MM:ss+hhMM", zoned));

        table
    }
}

impl LeafSchema for LeafTable {
    fn leaf(&self, primitive: Primitive) -> Option<NamedSchema> {
        self.entries.get(&primitive).cloned()
    }

    fn validate(&self) -> Result<()> {
        for (primitive, leaf) in &self.entries {
            if let Some(name) = &leaf.name {
                check_name(name)?;
            }
            if let Some(pattern) = &leaf.schema.pattern {
                Regex::new(pattern).map_err(|err| {
                    Error::Misconfigured(format!("leaf `{primitive}` has an invalid pattern: {err}"))
                })?;
            }
        }
        Ok(())
    }
}

impl<L: LeafSchema + ?Sized> LeafSchema for &L {
    fn leaf(&self, primitive: Primitive) -> Option<NamedSchema> {
        (**self).leaf(primitive)
    }

    fn validate(&self) -> Result<()> {
        (**self).validate()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn unnamed(schema: Schema) -> NamedSchema {
    NamedSchema::unnamed(schema)
}

fn int32() -> Schema {
    Schema::integer().with_format("int32")
}

fn int64() -> Schema {
    Schema::integer().with_format("int64")
}

/// 2016-07-22 07:40:00, used for every date/time example.
fn sample_moment() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2016, 7, 22)?.and_hms_opt(7, 40, 0)
}

fn timestamp(name: &str, pattern: &str, example: Option<String>) -> NamedSchema {
    let schema = Schema {
        format: Some(pattern.to_owned()),
        min_length: Some(pattern.len() as u64),
        example: example.map(Value::String),
        ..Schema::string()
    };
    NamedSchema::named(name, schema)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(Primitive::Bool, json!({ "type": "boolean" }))]
    #[case(Primitive::Char, json!({ "type": "string", "maxLength": 1, "minLength": 1 }))]
    #[case(Primitive::I8, json!({ "type": "integer", "format": "int32", "maximum": 127, "minimum": -128 }))]
    #[case(Primitive::U32, json!({ "type": "integer", "format": "int64", "maximum": 4294967295u64, "minimum": 0 }))]
    #[case(Primitive::I64, json!({
        "type": "integer", "format": "int64",
        "maximum": i64::MAX, "minimum": i64::MIN
    }))]
    #[case(Primitive::Integer, json!({ "type": "integer" }))]
    #[case(Primitive::F32, json!({ "type": "number", "format": "float" }))]
    #[case(Primitive::Bytes, json!({ "type": "string", "format": "byte" }))]
    fn test_unnamed_leaves(#[case] primitive: Primitive, #[case] expected: serde_json::Value) {
        let leaf = builtin().leaf(primitive).unwrap();
        assert_eq!(leaf.name, None);
        assert_eq!(serde_json::to_value(&leaf.schema).unwrap(), expected);
    }

    #[rstest]
    #[case(Primitive::Date, "Date", "yyyy-mm-dd", "2016-07-22")]
    #[case(Primitive::Time, "Time", "hh:MM:ss", "07:40:00")]
    #[case(Primitive::DateTime, "LocalTime", "yyyy-mm-ddThh:MM:ss", "2016-07-22T07:40:00")]
    #[case(Primitive::DateTimeUtc, "UTCTime", "yyyy-mm-ddThh:MM:ssZ", "2016-07-22T07:40:00Z")]
    #[case(Primitive::DateTimeZoned, "ZonedTime", "yyyy-mm-ddThh:MM:ss+hhMM", "2016-07-22T07:40:00+0300")]
    fn test_time_leaves(
        #[case] primitive: Primitive,
        #[case] name: &str,
        #[case] pattern: &str,
        #[case] example: &str,
    ) {
        let leaf = builtin().leaf(primitive).unwrap();
        assert_eq!(leaf.name.as_deref(), Some(name));
        assert_eq!(leaf.schema.format.as_deref(), Some(pattern));
        assert_eq!(leaf.schema.min_length, Some(pattern.len() as u64));
        assert_eq!(leaf.schema.example, Some(json!(example)));
    }

    #[test]
    fn builtin_covers_every_primitive_and_validates() {
        let table = LeafTable::builtin();
        assert_eq!(table.iter().count(), 23);
        table.validate().unwrap();
    }

    #[test]
    fn overrides_are_validated() {
        let mut table = LeafTable::builtin();
        table.set(Primitive::String, NamedSchema::named("bad name", Schema::string()));
        assert!(matches!(table.validate(), Err(Error::InvalidName(_))));

        let mut table = LeafTable::builtin();
        table.set(
            Primitive::String,
            NamedSchema::unnamed(Schema { pattern: Some("([a-z]".into()), ..Schema::string() }),
        );
        assert!(matches!(table.validate(), Err(Error::Misconfigured(_))));
    }
}
