//! Resolved record schemas.
//!
//! A [`TypeSchema`] is built once per record type from its
//! [`XmlBind::describe`](crate::XmlBind::describe) declaration, cached by the
//! [`SchemaRegistry`], and never changes afterwards.

mod builder;
mod registry;

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::bind::{Value, XmlBind};
use crate::error::SchemaError;
use crate::mapper::{Mapper, ValueKind};

pub use builder::{Field, RecordSchema};
pub use registry::{Resolver, SchemaRegistry, SchemaSlot};

pub(crate) type Constructor = Arc<dyn Fn() -> Value + Send + Sync>;

type Projector = Arc<dyn for<'r> Fn(&'r mut dyn Any) -> Option<&'r mut dyn Any> + Send + Sync>;

/// Pins the higher-ranked signature of a projection closure.
pub(crate) fn projector<P>(project: P) -> P
where
    P: for<'r> Fn(&'r mut dyn Any) -> Option<&'r mut dyn Any> + Send + Sync,
{
    project
}

/// Type-erased access to one field of a record.
#[derive(Clone)]
pub(crate) struct FieldAccess {
    project: Projector,
    assign_item: fn(&mut dyn Any, Value) -> Result<(), SchemaError>,
    assign_run: fn(&mut dyn Any, Vec<Value>, bool) -> Result<(), SchemaError>,
    field_type: &'static str,
}

fn assign_item_to<F: XmlBind>(slot: &mut dyn Any, item: Value) -> Result<(), SchemaError> {
    downcast_field::<F>(slot)?.assign_item(item)
}

fn assign_run_to<F: XmlBind>(
    slot: &mut dyn Any,
    run: Vec<Value>,
    merge: bool,
) -> Result<(), SchemaError> {
    downcast_field::<F>(slot)?.assign_run(run, merge)
}

fn downcast_field<F: XmlBind>(slot: &mut dyn Any) -> Result<&mut F, SchemaError> {
    slot.downcast_mut::<F>().ok_or(SchemaError::TypeMismatch {
        expected: type_name::<F>(),
    })
}

impl FieldAccess {
    pub(crate) fn new<F: XmlBind>(project: Projector) -> Self {
        Self {
            project,
            assign_item: assign_item_to::<F>,
            assign_run: assign_run_to::<F>,
            field_type: type_name::<F>(),
        }
    }

    /// Same field, reached through an enclosing record first.
    pub(crate) fn nested(&self, outer: Projector) -> Self {
        let inner = self.project.clone();
        let project = projector(move |record: &mut dyn Any| {
            let base = outer(record)?;
            inner(base)
        });
        Self {
            project: Arc::new(project),
            ..self.clone()
        }
    }

    fn slot<'r>(&self, record: &'r mut dyn Any) -> Result<&'r mut dyn Any, SchemaError> {
        (self.project)(record).ok_or(SchemaError::TypeMismatch {
            expected: self.field_type,
        })
    }

    pub(crate) fn assign_item(&self, record: &mut dyn Any, item: Value) -> Result<(), SchemaError> {
        (self.assign_item)(self.slot(record)?, item)
    }

    pub(crate) fn assign_run(
        &self,
        record: &mut dyn Any,
        run: Vec<Value>,
        merge: bool,
    ) -> Result<(), SchemaError> {
        (self.assign_run)(self.slot(record)?, run, merge)
    }
}

/// One bound field of a record.
#[derive(Clone)]
pub struct FieldSchema {
    name: String,
    wrapper: Option<String>,
    kind: ValueKind,
    mapper: Mapper,
    pub(crate) access: FieldAccess,
}

impl FieldSchema {
    /// Tag or attribute name; empty for the own-value field.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wrapper(&self) -> Option<&str> {
        self.wrapper.as_deref()
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Whether the field binds the text of its enclosing element.
    pub fn is_own_value(&self) -> bool {
        self.name.is_empty()
    }

    /// Key under which the field is found among tags and attributes.
    pub fn key(&self) -> &str {
        self.wrapper.as_deref().unwrap_or(&self.name)
    }
}

impl fmt::Debug for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSchema")
            .field("name", &self.name)
            .field("wrapper", &self.wrapper)
            .field("kind", &self.kind)
            .field("mapper", &self.mapper)
            .finish()
    }
}

/// The resolved schema of a record type.
pub struct TypeSchema {
    type_name: &'static str,
    construct: Constructor,
    fields: Vec<FieldSchema>,
    keys: HashMap<String, usize>,
    /// Member name of each wrapped field, mapped to its wrapper
    members: HashMap<String, String>,
    own_value: Option<usize>,
}

impl TypeSchema {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Fields in declaration order, own fields before inherited ones.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> &FieldSchema {
        &self.fields[index]
    }

    /// Index of the field bound to a tag or attribute name.
    pub fn lookup(&self, key: &str) -> Option<usize> {
        self.keys.get(key).copied()
    }

    /// Wrapper expected around `name`, if `name` is the member of a wrapped
    /// field.
    pub fn wrapper_of(&self, name: &str) -> Option<&str> {
        self.members.get(name).map(String::as_str)
    }

    pub fn own_value(&self) -> Option<&FieldSchema> {
        self.own_value.map(|index| &self.fields[index])
    }

    /// A new, empty instance of the record.
    pub fn construct(&self) -> Value {
        (self.construct)()
    }
}

impl fmt::Debug for TypeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSchema")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .finish()
    }
}
