//! Document entry points.

use std::any::type_name;
use std::io::{BufRead, BufReader, Read};
use std::sync::Arc;

use tracing::debug;

use crate::bind::{Value, XmlBind};
use crate::config::BindConfig;
use crate::error::{ParseError, Result};
use crate::mapper::{ArrayMapper, Mapper};
use crate::schema::SchemaRegistry;
use crate::xml::{Cursor, EventKind};

/// Reads documents into values, using one registry and one configuration.
///
/// ```
/// use helios_xmlbind::{BindConfig, XmlBinder};
///
/// let binder = XmlBinder::with_config(BindConfig {
///     trim_text: false,
///     ..Default::default()
/// });
/// let text: String = binder.from_str("<t> padded </t>")?;
/// assert_eq!(text, " padded ");
/// # Ok::<(), helios_xmlbind::BindError>(())
/// ```
#[derive(Debug, Clone)]
pub struct XmlBinder {
    registry: Arc<SchemaRegistry>,
    config: BindConfig,
}

impl Default for XmlBinder {
    fn default() -> Self {
        Self::with_config(BindConfig::default())
    }
}

impl XmlBinder {
    pub fn new(registry: Arc<SchemaRegistry>, config: BindConfig) -> Self {
        Self { registry, config }
    }

    /// A binder on the global registry.
    pub fn with_config(config: BindConfig) -> Self {
        Self::new(SchemaRegistry::global(), config)
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    pub fn from_str<T: XmlBind>(&self, xml: &str) -> Result<T> {
        self.read_value(xml.as_bytes())
    }

    pub fn from_slice<T: XmlBind>(&self, bytes: &[u8]) -> Result<T> {
        let xml = std::str::from_utf8(bytes).map_err(ParseError::from)?;
        self.from_str(xml)
    }

    pub fn from_reader<T: XmlBind, R: Read>(&self, reader: R) -> Result<T> {
        self.read_value(BufReader::new(reader))
    }

    /// Reads a whole document into `T`.
    ///
    /// The root element is matched against `T` whatever its name. When `T`
    /// is a collection, the root's children are its members, named after the
    /// first child.
    pub fn read_value<T: XmlBind, R: BufRead>(&self, source: R) -> Result<T> {
        let mut cursor = Cursor::new(source, &self.config);
        cursor.consume(EventKind::StartDocument, Some(0), None)?;
        cursor.require(EventKind::StartTag, Some(1), None)?;
        let root = cursor.name().to_string();
        let position = cursor.position();

        let value = match T::collection() {
            Some(_) => {
                let element = self.registry.element_mapper::<T>()?;
                let run = read_root_collection(&mut cursor, element, T::element_type().1)?;
                T::from_run(run)?
            }
            None => {
                let mapper = self.registry.mapper::<T>()?;
                match mapper.parse(&mut cursor, None, Some(1))? {
                    Some(value) => T::from_item(value)?,
                    None => {
                        return Err(ParseError::InvalidElement {
                            name: root,
                            type_name: type_name::<T>(),
                            position,
                        }
                        .into());
                    }
                }
            }
        };

        if !cursor.peek(EventKind::EndDocument, None)? {
            return Err(ParseError::TrailingContent {
                position: cursor.position(),
            }
            .into());
        }
        Ok(value)
    }
}

/// The root element holds the members directly. Runs interrupted by other
/// elements are appended in document order.
fn read_root_collection<R: BufRead>(
    cursor: &mut Cursor<R>,
    element: Mapper,
    element_type: &'static str,
) -> Result<Vec<Value>> {
    let root = cursor.name().to_string();
    cursor.advance()?;

    let mut items = Vec::new();
    let mut array: Option<ArrayMapper> = None;
    loop {
        if cursor.peek(EventKind::EndTag, Some(1))? {
            break;
        }
        match cursor.kind() {
            EventKind::StartTag => {
                let array = array.get_or_insert_with(|| {
                    ArrayMapper::new(element.clone(), cursor.name(), None, element_type)
                });
                if cursor.name() == array.item_name() {
                    items.extend(array.parse_run(cursor, Some(2))?);
                } else if cursor.deny_unknown() {
                    return Err(ParseError::UnknownElement {
                        name: cursor.name().to_string(),
                        parent: root,
                        position: cursor.position(),
                    }
                    .into());
                } else {
                    debug!(element = cursor.name(), parent = %root, "skipping unknown element");
                    cursor.skip()?;
                }
            }
            EventKind::Text => cursor.skip()?,
            _ => cursor.require(EventKind::EndTag, Some(1), Some(&root))?,
        }
    }
    cursor.consume(EventKind::EndTag, Some(1), Some(&root))?;
    Ok(items)
}
