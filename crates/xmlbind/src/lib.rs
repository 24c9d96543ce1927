//! # Helios XML Binding
//!
//! Declarative mapping of XML documents onto strongly typed Rust records.
//!
//! A record declares its fields once, on a [`RecordSchema`] builder; the
//! schema is resolved on first use, cached for the life of the
//! [`SchemaRegistry`], and drives a recursive-descent reader over a streaming
//! quick-xml tokenizer.
//!
//! ## Features
//!
//! - **Elements and attributes**: a field is bound to a name that matches
//!   either a child tag or an attribute of the record's element.
//! - **Own value**: one field may hold the text content of the element
//!   itself (`<price currency="EUR">12.50</price>`).
//! - **Collections**: `Vec<T>`, `Box<[T]>` and `Option<Vec<T>>` fields
//!   collect repeated elements, optionally enclosed in a wrapper tag.
//!   Unwrapped runs interrupted by other elements are merged in document
//!   order.
//! - **Conversions**: built-in scalars (numbers, `bool`, `char`, `String`,
//!   `Decimal`, chrono dates), enumerations matched by member name
//!   ([`xml_enum!`]) and user converters ([`Converter`]).
//! - **Recursive types**: a record may contain itself.
//!
//! ## Mapping
//!
//! | Declaration | XML |
//! |-------------|-----|
//! | `.field("id", ..)` on `i32` | `<id>7</id>` or `id="7"` |
//! | `.field(Field::own_value(), ..)` | text of the record's element |
//! | `.field("v", ..)` on `Vec<i32>` | `<v>1</v><v>2</v>` |
//! | `.field(Field::named("v").wrapper("values"), ..)` | `<values><v>1</v><v>2</v></values>` |
//! | `.extends(..)` | fields of an embedded base record |
//!
//! Unknown elements and attributes are skipped unless
//! [`BindConfig::deny_unknown`] is set.
//!
//! ## Example
//!
//! ```
//! use helios_xmlbind::{Field, RecordSchema, XmlBind, from_xml_str};
//!
//! #[derive(Debug, Default)]
//! struct Tree {
//!     name: String,
//!     children: Vec<Tree>,
//!     tags: Vec<String>,
//! }
//!
//! impl XmlBind for Tree {
//!     fn describe(schema: &mut RecordSchema<'_, Self>) {
//!         schema
//!             .construct_default()
//!             .field("name", |t: &mut Tree| &mut t.name)
//!             .field("tree", |t: &mut Tree| &mut t.children)
//!             .field(Field::named("tag").wrapper("tags"), |t: &mut Tree| &mut t.tags);
//!     }
//! }
//!
//! let xml = r#"
//!     <tree name="root">
//!         <tree name="a"/>
//!         <tags><tag>x</tag><tag>y</tag></tags>
//!         <tree name="b"/>
//!     </tree>"#;
//!
//! let tree: Tree = from_xml_str(xml)?;
//! assert_eq!(tree.children.len(), 2);
//! assert_eq!(tree.children[1].name, "b");
//! assert_eq!(tree.tags, ["x", "y"]);
//! # Ok::<(), helios_xmlbind::BindError>(())
//! ```

mod macros;

pub mod bind;
pub mod binder;
pub mod config;
pub mod error;
pub mod mapper;
pub mod scalar;
pub mod schema;
pub mod xml;

use std::io::Read;

pub use bind::{CollectionShape, Converter, Value, XmlBind, XmlEnum};
pub use binder::XmlBinder;
pub use config::BindConfig;
pub use error::{BindError, ConvertError, ParseError, Result, SchemaError};
pub use mapper::{Mapper, ValueKind};
pub use scalar::Scalar;
pub use schema::{Field, FieldSchema, RecordSchema, Resolver, SchemaRegistry, TypeSchema};

/// Reads `T` from a string with the global registry and default settings.
pub fn from_xml_str<T: XmlBind>(xml: &str) -> Result<T> {
    XmlBinder::default().from_str(xml)
}

/// Reads `T` from UTF-8 bytes.
pub fn from_xml_slice<T: XmlBind>(bytes: &[u8]) -> Result<T> {
    XmlBinder::default().from_slice(bytes)
}

/// Reads `T` from any reader; the input is buffered internally.
pub fn from_xml_reader<T: XmlBind, R: Read>(reader: R) -> Result<T> {
    XmlBinder::default().from_reader(reader)
}
