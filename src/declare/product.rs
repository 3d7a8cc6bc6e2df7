//! Record fields → object schema, or array schema for positional fields.

use crate::error::{Error, Result};
use crate::schema::{Referenced, Schema};
use crate::shape::Field;

use super::Run;

pub(super) fn compose<'s>(run: &mut Run<'s, '_>, owner: &str, fields: &'s [Field]) -> Result<Schema> {
    let positional = fields.iter().filter(|field| field.is_positional()).count();
    if positional != 0 && positional != fields.len() {
        return Err(Error::MixedFields(owner.to_owned()));
    }

    match fields {
        [] => Ok(Schema::nullary()),
        // a one-field wrapper has the schema of what it wraps
        [only] if only.is_positional() || run.options().unwrap_unary_records => run.own_schema(&only.shape),
        _ if positional > 0 => {
            let mut items = Vec::with_capacity(fields.len());
            for field in fields {
                items.push(run.reference(&field.shape)?);
            }
            Ok(Schema::tuple(items))
        }
        _ => object(run, owner, fields),
    }
}

/// A field list seen from outside, as a sum variant payload: a one-field
/// wrapper refers to what it wraps instead of copying its body.
pub(super) fn payload<'s>(run: &mut Run<'s, '_>, owner: &str, fields: &'s [Field]) -> Result<Referenced> {
    match fields {
        [only] if only.is_positional() || run.options().unwrap_unary_records => run.reference(&only.shape),
        _ => Ok(Referenced::inline(compose(run, owner, fields)?)),
    }
}

fn object<'s>(run: &mut Run<'s, '_>, owner: &str, fields: &'s [Field]) -> Result<Schema> {
    let options = run.options();
    let mut schema = Schema::object();
    for field in fields {
        let Some(raw) = field.name.as_deref() else { continue };
        let label = options.field_label(raw);
        if schema.properties.contains_key(&label) {
            return Err(Error::DuplicateField { owner: owner.to_owned(), label });
        }
        let value = run.reference(&field.shape)?;
        if field.is_required() {
            schema.required.push(label.clone());
        }
        schema.properties.insert(label, value);
    }
    Ok(schema)
}

// ------------------------------- Tests ------------------------------------ //
