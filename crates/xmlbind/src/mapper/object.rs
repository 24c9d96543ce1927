//! Records.

use std::io::BufRead;

use tracing::{debug, warn};

use super::{Mapper, ObjectMapper};
use crate::bind::Value;
use crate::error::{ParseError, Result};
use crate::schema::{FieldSchema, TypeSchema};
use crate::xml::utils::{is_namespace_declaration, is_whitespace};
use crate::xml::{Attribute, Cursor, EventKind};

/// Per-element bookkeeping while a record is filled.
struct Fill {
    record: Value,
    /// Fields that received an element run, for merging later runs
    runs: Vec<bool>,
    assigned: bool,
}

pub(crate) fn read_record<R: BufRead>(
    mapper: &ObjectMapper,
    cursor: &mut Cursor<R>,
    name: Option<&str>,
    depth: Option<usize>,
) -> Result<Option<Value>> {
    let schema = mapper.schema()?;
    cursor.require(EventKind::StartTag, depth, name)?;
    let level = cursor.depth();
    let tag = cursor.name().to_string();

    let mut fill = Fill {
        record: schema.construct(),
        runs: vec![false; schema.fields().len()],
        assigned: false,
    };

    let attributes = cursor.attributes().to_vec();
    for attribute in &attributes {
        read_attribute(&schema, cursor, &tag, attribute, &mut fill)?;
    }
    cursor.advance()?;

    // Whitespace is only the own value of an element without children
    let mut own_text = None;
    let mut blank = None;
    let mut children = false;
    loop {
        if schema.own_value().is_some() && cursor.peek(EventKind::Text, Some(level))? {
            let text = cursor.text().to_string();
            cursor.advance()?;
            if is_whitespace(&text) {
                blank = Some(text);
                continue;
            }
            own_text = Some(text);
            break;
        }
        if cursor.peek(EventKind::EndTag, Some(level))? {
            if !children {
                own_text = blank.take();
            }
            break;
        }
        match cursor.kind() {
            EventKind::StartTag => {
                children = true;
                read_child(&schema, cursor, level, &tag, &mut fill)?
            }
            EventKind::Text => {
                debug!(element = %tag, "skipping text content");
                cursor.skip()?;
            }
            _ => cursor.require(EventKind::EndTag, Some(level), Some(&tag))?,
        }
    }

    if let Some(field) = schema.own_value() {
        let position = cursor.position();
        let value = field
            .mapper()
            .convert_text(own_text.as_deref())
            .map_err(|source| ParseError::Conversion {
                field: tag.clone(),
                source,
                position,
            })?;
        if let Some(value) = value {
            field.access.assign_item(fill.record.as_mut(), value)?;
            fill.assigned = true;
        }
    }
    cursor.consume(EventKind::EndTag, Some(level), Some(&tag))?;

    if !fill.assigned && !schema.fields().is_empty() {
        warn!(element = %tag, record = schema.type_name(), "no fields set");
    }
    Ok(Some(fill.record))
}

/// Attributes are converted with the field's member mapper and always
/// replace the previous value.
fn read_attribute<R: BufRead>(
    schema: &TypeSchema,
    cursor: &Cursor<R>,
    tag: &str,
    attribute: &Attribute,
    fill: &mut Fill,
) -> Result<()> {
    if is_namespace_declaration(&attribute.name) {
        return Ok(());
    }
    let Some(index) = schema.lookup(&attribute.name) else {
        if cursor.deny_unknown() {
            return Err(ParseError::UnknownAttribute {
                name: attribute.name.clone(),
                parent: tag.to_string(),
                position: cursor.position(),
            }
            .into());
        }
        debug!(attribute = %attribute.name, element = tag, "skipping unknown attribute");
        return Ok(());
    };

    let field = schema.field(index);
    let mapper = field.mapper().item();
    if !mapper.reads_text() {
        debug!(attribute = %attribute.name, element = tag, "attribute names a record field, skipped");
        return Ok(());
    }
    let value = mapper
        .convert_text(Some(&attribute.value))
        .map_err(|source| ParseError::Conversion {
            field: attribute.name.clone(),
            source,
            position: cursor.position(),
        })?;
    if let Some(value) = value {
        field.access.assign_item(fill.record.as_mut(), value)?;
        fill.assigned = true;
    }
    Ok(())
}

fn read_child<R: BufRead>(
    schema: &TypeSchema,
    cursor: &mut Cursor<R>,
    level: usize,
    tag: &str,
    fill: &mut Fill,
) -> Result<()> {
    let child = cursor.name().to_string();
    if let Some(index) = schema.lookup(&child) {
        return read_field(schema.field(index), index, cursor, level + 1, fill);
    }
    if let Some(wrapper) = schema.wrapper_of(&child) {
        return Err(ParseError::MissingWrapper {
            element: child,
            wrapper: wrapper.to_string(),
            position: cursor.position(),
        }
        .into());
    }
    if cursor.deny_unknown() {
        return Err(ParseError::UnknownElement {
            name: child,
            parent: tag.to_string(),
            position: cursor.position(),
        }
        .into());
    }
    debug!(element = %child, parent = tag, "skipping unknown element");
    cursor.skip()?;
    Ok(())
}

/// Reads one occurrence of a field at `depth`, the depth of the child tag.
fn read_field<R: BufRead>(
    field: &FieldSchema,
    index: usize,
    cursor: &mut Cursor<R>,
    depth: usize,
    fill: &mut Fill,
) -> Result<()> {
    if let Mapper::Array(array) = field.mapper() {
        let run = array.parse_run(cursor, Some(depth))?;
        // Wrapped collections are contiguous and replace the field.
        let merge = array.wrapper().is_none() && fill.runs[index];
        field.access.assign_run(fill.record.as_mut(), run, merge)?;
        fill.runs[index] = true;
        fill.assigned = true;
        return Ok(());
    }

    let value = match field.wrapper() {
        Some(wrapper) => {
            cursor.consume(EventKind::StartTag, Some(depth), Some(wrapper))?;
            let value = if cursor.peek(EventKind::EndTag, Some(depth))? {
                None
            } else {
                field
                    .mapper()
                    .parse(cursor, Some(field.name()), Some(depth + 1))?
            };
            cursor.consume(EventKind::EndTag, Some(depth), Some(wrapper))?;
            value
        }
        None => field.mapper().parse(cursor, Some(field.name()), Some(depth))?,
    };
    if let Some(value) = value {
        field.access.assign_item(fill.record.as_mut(), value)?;
        fill.assigned = true;
    }
    Ok(())
}
