//! Sum variants → string enum, or an object holding exactly one tagged payload.

use indexmap::IndexSet;

use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::shape::Variant;

use super::{Run, product};

pub(super) fn compose<'s>(run: &mut Run<'s, '_>, owner: &str, variants: &'s [Variant]) -> Result<Schema> {
    if variants.is_empty() {
        return Err(Error::EmptySum(owner.to_owned()));
    }
    let options = run.options();

    let mut tags = IndexSet::with_capacity(variants.len());
    let mut all_nullary = true;
    let mut schema = Schema {
        max_properties: Some(1),
        min_properties: Some(1),
        ..Schema::object()
    };
    for variant in variants {
        let tag = options.constructor_tag(&variant.tag);
        if !tags.insert(tag.clone()) {
            return Err(Error::DuplicateTag { owner: owner.to_owned(), tag });
        }
        all_nullary &= variant.is_nullary();
        let payload = product::payload(run, &format!("{owner}.{}", variant.tag), &variant.fields)?;
        schema.properties.insert(tag, payload);
    }

    if all_nullary && options.all_nullary_to_string_tag {
        return Ok(Schema::string_enum(tags));
    }
    Ok(schema)
}

// ------------------------------- Tests ------------------------------------ //
