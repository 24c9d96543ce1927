//! Schema cache.

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::debug;

use super::{RecordSchema, TypeSchema};
use crate::bind::XmlBind;
use crate::error::SchemaError;
use crate::mapper::{Mapper, ObjectMapper};

/// Cache entry of one record type.
///
/// The slot is inserted before the record's fields are resolved and filled
/// once the build finishes, successfully or not.
#[derive(Debug)]
pub struct SchemaSlot {
    type_name: &'static str,
    state: OnceLock<Result<Arc<TypeSchema>, SchemaError>>,
}

impl SchemaSlot {
    fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            state: OnceLock::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The finished schema, its cached failure, or `Incomplete` while the
    /// build is still running.
    pub fn get(&self) -> Result<Arc<TypeSchema>, SchemaError> {
        match self.state.get() {
            Some(result) => result.clone(),
            None => Err(SchemaError::Incomplete {
                type_name: self.type_name,
            }),
        }
    }
}

type Entries = HashMap<TypeId, Arc<SchemaSlot>>;

/// Memoized, thread-safe mapping from record types to their schemas.
///
/// Lookups and builds run under one lock; nested record types are resolved
/// through a [`Resolver`] borrowing the already locked table.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    entries: Mutex<Entries>,
}

static GLOBAL: OnceLock<Arc<SchemaRegistry>> = OnceLock::new();

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by [`from_xml_str`](crate::from_xml_str)
    /// and friends.
    pub fn global() -> Arc<SchemaRegistry> {
        GLOBAL.get_or_init(|| Arc::new(SchemaRegistry::new())).clone()
    }

    /// Resolves the schema of the record type `T`.
    pub fn resolve<T: XmlBind>(&self) -> Result<Arc<TypeSchema>, SchemaError> {
        let mut entries = self.entries.lock();
        Resolver::new(&mut entries).schema::<T>()
    }

    /// Mapper reading one element of type `T`.
    pub fn mapper<T: XmlBind>(&self) -> Result<Mapper, SchemaError> {
        let mut entries = self.entries.lock();
        T::mapper(&mut Resolver::new(&mut entries))
    }

    /// Mapper reading one member of the collection type `T`.
    pub fn element_mapper<T: XmlBind>(&self) -> Result<Mapper, SchemaError> {
        let mut entries = self.entries.lock();
        T::element_mapper(&mut Resolver::new(&mut entries))
    }

    /// Number of cached record types, failed builds included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Access to the locked schema table while schemas are being built.
pub struct Resolver<'a> {
    entries: &'a mut Entries,
}

impl<'a> Resolver<'a> {
    fn new(entries: &'a mut Entries) -> Self {
        Self { entries }
    }

    pub(crate) fn reborrow(&mut self) -> Resolver<'_> {
        Resolver {
            entries: &mut *self.entries,
        }
    }

    /// Object mapper for the record type `T`, building its schema on first
    /// use. A record still being built (a recursive reference) is returned as
    /// is; a cached failure is raised again.
    pub fn record<T: XmlBind>(&mut self) -> Result<Mapper, SchemaError> {
        let slot = self.slot::<T>();
        if let Some(Err(err)) = slot.state.get() {
            return Err(err.clone());
        }
        Ok(Mapper::Object(ObjectMapper::new(
            slot.type_name,
            Arc::downgrade(&slot),
        )))
    }

    pub(crate) fn schema<T: XmlBind>(&mut self) -> Result<Arc<TypeSchema>, SchemaError> {
        self.slot::<T>().get()
    }

    fn slot<T: XmlBind>(&mut self) -> Arc<SchemaSlot> {
        let id = TypeId::of::<T>();
        if let Some(slot) = self.entries.get(&id) {
            return slot.clone();
        }

        let slot = Arc::new(SchemaSlot::new(type_name::<T>()));
        self.entries.insert(id, slot.clone());

        let mut builder = RecordSchema::<T>::new(self.reborrow());
        T::describe(&mut builder);
        let result = builder.finish().map(Arc::new);
        match &result {
            Ok(schema) => debug!(
                record = slot.type_name,
                fields = schema.fields().len(),
                "built schema"
            ),
            Err(err) => debug!(record = slot.type_name, error = %err, "schema build failed"),
        }
        // Only this call fills the slot, and the table is locked throughout.
        let _ = slot.state.set(result);
        slot
    }
}
