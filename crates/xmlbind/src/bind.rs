//! Bindable types.
//!
//! Every type that can appear in a document implements [`XmlBind`]:
//!
//! - records implement [`XmlBind::describe`] and declare their fields on the
//!   [`RecordSchema`] builder;
//! - built-in scalars (see [`crate::scalar`]) and enumerations (see
//!   [`xml_enum!`](crate::xml_enum)) override [`XmlBind::mapper`];
//! - `Option<T>`, `Vec<T>` and `Box<[T]>` wrap another bindable type and
//!   describe how parsed elements are stored in a field.
//!
//! ```
//! use helios_xmlbind::{Field, RecordSchema, XmlBind, from_xml_str};
//!
//! #[derive(Debug, Default)]
//! struct Address {
//!     kind: Option<String>,
//!     street: Option<String>,
//! }
//!
//! impl XmlBind for Address {
//!     fn describe(schema: &mut RecordSchema<'_, Self>) {
//!         schema
//!             .construct_default()
//!             .field("type", |a: &mut Address| &mut a.kind)
//!             .field("street", |a: &mut Address| &mut a.street);
//!     }
//! }
//!
//! #[derive(Debug, Default)]
//! struct Person {
//!     id: i32,
//!     addresses: Vec<Address>,
//! }
//!
//! impl XmlBind for Person {
//!     fn describe(schema: &mut RecordSchema<'_, Self>) {
//!         schema
//!             .construct_default()
//!             .field("id", |p: &mut Person| &mut p.id)
//!             .field(Field::named("address"), |p: &mut Person| &mut p.addresses);
//!     }
//! }
//!
//! let xml = r#"<person><id>7</id><address type="home"><street>Main</street></address></person>"#;
//! let person: Person = from_xml_str(xml)?;
//! assert_eq!(person.id, 7);
//! assert_eq!(person.addresses[0].kind.as_deref(), Some("home"));
//! # Ok::<(), helios_xmlbind::BindError>(())
//! ```

use std::any::{Any, TypeId, type_name};

use crate::error::{ConvertError, SchemaError};
use crate::mapper::Mapper;
use crate::schema::{RecordSchema, Resolver};

/// A parsed value on its way into a field.
pub type Value = Box<dyn Any + Send>;

/// How a collection field stores its elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionShape {
    /// `Vec<T>`: extended in place when a later run is merged.
    Growable,
    /// `Box<[T]>`: rebuilt with room for the old and new elements.
    Fixed,
}

/// A type that can be read from XML.
///
/// Only [`describe`](XmlBind::describe) (records) or
/// [`mapper`](XmlBind::mapper) (leaf types) are meant to be implemented by
/// hand; the remaining methods describe field shapes and are provided for
/// `Option`, `Vec` and `Box<[T]>`.
pub trait XmlBind: Sized + Send + 'static {
    /// Declares the fields of a record.
    ///
    /// The default declares nothing, not even a constructor, so a type that
    /// relies on it fails with [`SchemaError::MissingConstructor`].
    fn describe(_schema: &mut RecordSchema<'_, Self>) {}

    /// Mapper reading one element of this type. Records resolve their schema.
    fn mapper(resolver: &mut Resolver<'_>) -> Result<Mapper, SchemaError> {
        resolver.record::<Self>()
    }

    /// Mapper for one element of a field of this type.
    #[doc(hidden)]
    fn element_mapper(resolver: &mut Resolver<'_>) -> Result<Mapper, SchemaError> {
        Self::mapper(resolver)
    }

    /// `Some` if a field of this type collects repeated elements.
    #[doc(hidden)]
    fn collection() -> Option<CollectionShape> {
        None
    }

    /// Type produced by [`element_mapper`](XmlBind::element_mapper).
    #[doc(hidden)]
    fn element_type() -> (TypeId, &'static str) {
        (TypeId::of::<Self>(), type_name::<Self>())
    }

    #[doc(hidden)]
    fn from_item(item: Value) -> Result<Self, SchemaError> {
        downcast(item)
    }

    #[doc(hidden)]
    fn from_run(_run: Vec<Value>) -> Result<Self, SchemaError> {
        Err(SchemaError::TypeMismatch {
            expected: type_name::<Self>(),
        })
    }

    /// Stores a single element, replacing the previous content.
    #[doc(hidden)]
    fn assign_item(&mut self, item: Value) -> Result<(), SchemaError> {
        *self = Self::from_item(item)?;
        Ok(())
    }

    /// Stores a run of repeated elements; `merge` appends after the
    /// previous content instead of replacing it.
    #[doc(hidden)]
    fn assign_run(&mut self, run: Vec<Value>, _merge: bool) -> Result<(), SchemaError> {
        *self = Self::from_run(run)?;
        Ok(())
    }
}

pub(crate) fn downcast<T: 'static>(value: Value) -> Result<T, SchemaError> {
    value
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| SchemaError::TypeMismatch {
            expected: type_name::<T>(),
        })
}

impl<E: XmlBind> XmlBind for Option<E> {
    fn mapper(resolver: &mut Resolver<'_>) -> Result<Mapper, SchemaError> {
        E::mapper(resolver)
    }

    fn element_mapper(resolver: &mut Resolver<'_>) -> Result<Mapper, SchemaError> {
        E::element_mapper(resolver)
    }

    fn collection() -> Option<CollectionShape> {
        E::collection()
    }

    fn element_type() -> (TypeId, &'static str) {
        E::element_type()
    }

    fn from_item(item: Value) -> Result<Self, SchemaError> {
        E::from_item(item).map(Some)
    }

    fn from_run(run: Vec<Value>) -> Result<Self, SchemaError> {
        E::from_run(run).map(Some)
    }

    fn assign_run(&mut self, run: Vec<Value>, merge: bool) -> Result<(), SchemaError> {
        match self {
            Some(inner) => inner.assign_run(run, merge),
            None => {
                *self = Some(E::from_run(run)?);
                Ok(())
            }
        }
    }
}

impl<E: XmlBind> XmlBind for Vec<E> {
    fn mapper(_resolver: &mut Resolver<'_>) -> Result<Mapper, SchemaError> {
        Err(SchemaError::NestedCollection {
            type_name: type_name::<Self>(),
        })
    }

    fn element_mapper(resolver: &mut Resolver<'_>) -> Result<Mapper, SchemaError> {
        E::mapper(resolver)
    }

    fn collection() -> Option<CollectionShape> {
        Some(CollectionShape::Growable)
    }

    fn element_type() -> (TypeId, &'static str) {
        E::element_type()
    }

    fn from_item(item: Value) -> Result<Self, SchemaError> {
        Ok(vec![E::from_item(item)?])
    }

    fn from_run(run: Vec<Value>) -> Result<Self, SchemaError> {
        run.into_iter().map(E::from_item).collect()
    }

    fn assign_run(&mut self, run: Vec<Value>, merge: bool) -> Result<(), SchemaError> {
        let parsed = Self::from_run(run)?;
        if merge {
            self.extend(parsed);
        } else {
            *self = parsed;
        }
        Ok(())
    }
}

impl<E: XmlBind> XmlBind for Box<[E]> {
    fn mapper(_resolver: &mut Resolver<'_>) -> Result<Mapper, SchemaError> {
        Err(SchemaError::NestedCollection {
            type_name: type_name::<Self>(),
        })
    }

    fn element_mapper(resolver: &mut Resolver<'_>) -> Result<Mapper, SchemaError> {
        E::mapper(resolver)
    }

    fn collection() -> Option<CollectionShape> {
        Some(CollectionShape::Fixed)
    }

    fn element_type() -> (TypeId, &'static str) {
        E::element_type()
    }

    fn from_item(item: Value) -> Result<Self, SchemaError> {
        Ok(vec![E::from_item(item)?].into_boxed_slice())
    }

    fn from_run(run: Vec<Value>) -> Result<Self, SchemaError> {
        Vec::<E>::from_run(run).map(Vec::into_boxed_slice)
    }

    fn assign_run(&mut self, run: Vec<Value>, merge: bool) -> Result<(), SchemaError> {
        let parsed = Vec::<E>::from_run(run)?;
        if !merge {
            *self = parsed.into_boxed_slice();
            return Ok(());
        }
        // Read the previous array once, clear the field, then store a new
        // array sized old + new.
        let previous = std::mem::take(self);
        let mut items = Vec::with_capacity(previous.len() + parsed.len());
        items.extend(previous.into_vec());
        items.extend(parsed);
        *self = items.into_boxed_slice();
        Ok(())
    }
}

/// A user-supplied text transform for a field.
///
/// Attached with [`Field::mapper`](crate::Field::mapper); instantiated through
/// `Default` when the schema is built.
///
/// ```
/// use helios_xmlbind::{ConvertError, Converter};
///
/// #[derive(Default)]
/// struct Upper;
///
/// impl Converter for Upper {
///     type Output = String;
///
///     fn convert(&self, text: Option<&str>) -> Result<Option<String>, ConvertError> {
///         Ok(text.map(str::to_uppercase))
///     }
/// }
/// ```
pub trait Converter: Send + Sync + 'static {
    type Output: Send + 'static;

    /// Converts element or attribute text. `None` means the element had no
    /// text (`<tag/>`); returning `Ok(None)` leaves the field untouched.
    fn convert(&self, text: Option<&str>) -> Result<Option<Self::Output>, ConvertError>;
}

/// An enumeration matched by member name.
///
/// Usually implemented through [`xml_enum!`](crate::xml_enum).
pub trait XmlEnum: Clone + Send + Sync + 'static {
    /// Member names with their values, matched case-sensitively.
    const MEMBERS: &'static [(&'static str, Self)];

    fn from_name(name: &str) -> Option<Self> {
        Self::MEMBERS
            .iter()
            .find(|(member, _)| *member == name)
            .map(|(_, value)| value.clone())
    }

    fn name(&self) -> &'static str
    where
        Self: PartialEq,
    {
        Self::MEMBERS
            .iter()
            .find(|(_, value)| value == self)
            .map(|(member, _)| *member)
            .unwrap_or_default()
    }
}
