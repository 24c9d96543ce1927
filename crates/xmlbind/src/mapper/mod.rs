//! Value mappers.
//!
//! A [`Mapper`] reads one element (or one run of repeated elements) from the
//! [`Cursor`] and produces a type-erased [`Value`]. The variants carry only
//! the data their kind needs and are dispatched by pattern matching.
//!
//! Depth arguments are the depth of the element's start tag; `None` skips the
//! depth check (used for the document root).

pub mod array;
pub mod object;

use std::fmt;
use std::io::BufRead;
use std::sync::{Arc, Weak};

use tracing::debug;

use crate::bind::{Converter, Value, XmlEnum};
use crate::error::{ConvertError, ParseError, Result, SchemaError};
use crate::scalar::Scalar;
use crate::schema::{SchemaSlot, TypeSchema};
use crate::xml::{Cursor, EventKind};

pub use array::ArrayMapper;

type TextFn = dyn Fn(Option<&str>) -> std::result::Result<Option<Value>, ConvertError> + Send + Sync;

/// Kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Scalar,
    Custom,
    Enum,
    Collection,
    Object,
}

/// A recursive-descent reader for one kind of value.
#[derive(Clone)]
pub enum Mapper {
    /// Built-in text conversion.
    Scalar(ScalarMapper),
    /// User-supplied [`Converter`].
    Custom(CustomMapper),
    /// Member name lookup.
    Enum(EnumMapper),
    /// Run of repeated elements, optionally enclosed in a wrapper tag.
    Array(ArrayMapper),
    /// Nested record.
    Object(ObjectMapper),
}

#[derive(Clone)]
pub struct ScalarMapper {
    type_name: &'static str,
    convert: fn(Option<&str>) -> std::result::Result<Option<Value>, ConvertError>,
}

#[derive(Clone)]
pub struct CustomMapper {
    converter: &'static str,
    convert: Arc<TextFn>,
}

#[derive(Clone)]
pub struct EnumMapper {
    type_name: &'static str,
    lookup: fn(&str) -> Option<Value>,
}

/// Reads a record through its cached schema.
///
/// The schema is held weakly: a record that contains itself points back at
/// its own cache slot without keeping it alive.
#[derive(Clone)]
pub struct ObjectMapper {
    type_name: &'static str,
    schema: Weak<SchemaSlot>,
}

impl ObjectMapper {
    pub(crate) fn new(type_name: &'static str, schema: Weak<SchemaSlot>) -> Self {
        Self { type_name, schema }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The record schema; fails if the registry was dropped or the schema
    /// never finished building.
    pub fn schema(&self) -> std::result::Result<Arc<TypeSchema>, SchemaError> {
        match self.schema.upgrade() {
            Some(slot) => slot.get(),
            None => Err(SchemaError::Incomplete {
                type_name: self.type_name,
            }),
        }
    }
}

fn convert_scalar<S: Scalar>(text: Option<&str>) -> std::result::Result<Option<Value>, ConvertError> {
    Ok(S::from_text(text)?.map(|value| Box::new(value) as Value))
}

fn lookup_member<E: XmlEnum>(name: &str) -> Option<Value> {
    E::from_name(name).map(|value| Box::new(value) as Value)
}

fn text_fn<F>(f: F) -> F
where
    F: Fn(Option<&str>) -> std::result::Result<Option<Value>, ConvertError> + Send + Sync,
{
    f
}

impl Mapper {
    /// Mapper for a built-in [`Scalar`].
    pub fn scalar<S: Scalar>() -> Self {
        Mapper::Scalar(ScalarMapper {
            type_name: std::any::type_name::<S>(),
            convert: convert_scalar::<S>,
        })
    }

    /// Mapper matching member names of an [`XmlEnum`].
    pub fn enumeration<E: XmlEnum>() -> Self {
        Mapper::Enum(EnumMapper {
            type_name: std::any::type_name::<E>(),
            lookup: lookup_member::<E>,
        })
    }

    /// Mapper delegating to a converter instance.
    pub fn custom<C: Converter>(converter: C) -> Self {
        let convert = text_fn(move |text| {
            Ok(converter
                .convert(text)?
                .map(|value| Box::new(value) as Value))
        });
        Mapper::Custom(CustomMapper {
            converter: std::any::type_name::<C>(),
            convert: Arc::new(convert),
        })
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Mapper::Scalar(_) => ValueKind::Scalar,
            Mapper::Custom(_) => ValueKind::Custom,
            Mapper::Enum(_) => ValueKind::Enum,
            Mapper::Array(_) => ValueKind::Collection,
            Mapper::Object(_) => ValueKind::Object,
        }
    }

    /// Whether the value is read from text (element content or attribute).
    pub fn reads_text(&self) -> bool {
        matches!(self, Mapper::Scalar(_) | Mapper::Custom(_) | Mapper::Enum(_))
    }

    /// The mapper for a single member: the element mapper of an array,
    /// `self` otherwise.
    pub fn item(&self) -> &Mapper {
        match self {
            Mapper::Array(array) => array.element(),
            other => other,
        }
    }

    /// Converts text with a text mapper. Records and arrays yield no value.
    pub fn convert_text(
        &self,
        text: Option<&str>,
    ) -> std::result::Result<Option<Value>, ConvertError> {
        match self {
            Mapper::Scalar(scalar) => (scalar.convert)(text),
            Mapper::Custom(custom) => (custom.convert)(text),
            Mapper::Enum(enumeration) => Ok(text.and_then(|name| {
                let value = (enumeration.lookup)(name);
                if value.is_none() {
                    debug!(enumeration = enumeration.type_name, name, "no matching member");
                }
                value
            })),
            Mapper::Array(_) | Mapper::Object(_) => Ok(None),
        }
    }

    /// Reads one value starting at the current start tag.
    ///
    /// `name` is the expected tag name (`None` accepts any). Arrays produce
    /// their run as a `Vec<Value>`.
    pub fn parse<R: BufRead>(
        &self,
        cursor: &mut Cursor<R>,
        name: Option<&str>,
        depth: Option<usize>,
    ) -> Result<Option<Value>> {
        match self {
            Mapper::Object(object) => object::read_record(object, cursor, name, depth),
            Mapper::Array(array) => {
                let run = array.parse_run(cursor, depth)?;
                Ok(Some(Box::new(run) as Value))
            }
            _ => self.parse_text(cursor, name, depth),
        }
    }

    /// `<tag>text</tag>` or `<tag/>`; a nested element is a mismatch.
    fn parse_text<R: BufRead>(
        &self,
        cursor: &mut Cursor<R>,
        name: Option<&str>,
        depth: Option<usize>,
    ) -> Result<Option<Value>> {
        cursor.require(EventKind::StartTag, depth, name)?;
        let level = cursor.depth();
        let tag = cursor.name().to_string();
        let position = cursor.position();
        cursor.advance()?;

        let text = if cursor.peek(EventKind::Text, Some(level))? {
            let text = cursor.text().to_string();
            cursor.advance()?;
            Some(text)
        } else {
            None
        };
        cursor.consume(EventKind::EndTag, Some(level), Some(&tag))?;

        self.convert_text(text.as_deref()).map_err(|source| {
            ParseError::Conversion {
                field: tag,
                source,
                position,
            }
            .into()
        })
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mapper::Scalar(scalar) => f.debug_tuple("Scalar").field(&scalar.type_name).finish(),
            Mapper::Custom(custom) => f.debug_tuple("Custom").field(&custom.converter).finish(),
            Mapper::Enum(enumeration) => {
                f.debug_tuple("Enum").field(&enumeration.type_name).finish()
            }
            Mapper::Array(array) => f
                .debug_struct("Array")
                .field("item", &array.item_name())
                .field("wrapper", &array.wrapper())
                .field("element", array.element())
                .finish(),
            Mapper::Object(object) => f.debug_tuple("Object").field(&object.type_name).finish(),
        }
    }
}
