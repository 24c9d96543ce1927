//! Declaring record schemas.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{Constructor, FieldAccess, FieldSchema, Projector, Resolver, TypeSchema, projector};
use crate::bind::{Converter, Value, XmlBind};
use crate::error::SchemaError;
use crate::mapper::{ArrayMapper, Mapper, ValueKind};

#[derive(Debug, Clone, Copy)]
struct MapperFactory {
    converter: &'static str,
    output: TypeId,
    output_name: &'static str,
    build: fn() -> Mapper,
}

fn build_custom<C: Converter + Default>() -> Mapper {
    Mapper::custom(C::default())
}

/// Per-field binding options.
///
/// A plain `&str` converts into a `Field` with just a name.
///
/// ```
/// use helios_xmlbind::Field;
///
/// let tags = Field::named("tag").wrapper("tags");
/// let text = Field::own_value();
/// # let _ = (tags, text);
/// ```
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    wrapper: Option<String>,
    mapper: Option<MapperFactory>,
}

impl Field {
    /// Binds the field to the tag or attribute `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wrapper: None,
            mapper: None,
        }
    }

    /// Binds the field to the text content of the record's own element.
    pub fn own_value() -> Self {
        Self::named("")
    }

    /// Encloses the field's elements in a `<wrapper>` tag. An empty name
    /// means no wrapper.
    pub fn wrapper(mut self, wrapper: impl Into<String>) -> Self {
        let wrapper = wrapper.into();
        self.wrapper = (!wrapper.is_empty()).then_some(wrapper);
        self
    }

    /// Converts the field's text with `C` instead of the built-in mapper.
    /// `C::Output` must be the field's element type.
    pub fn mapper<C: Converter + Default>(mut self) -> Self {
        self.mapper = Some(MapperFactory {
            converter: type_name::<C>(),
            output: TypeId::of::<C::Output>(),
            output_name: type_name::<C::Output>(),
            build: build_custom::<C>,
        });
        self
    }
}

impl From<&str> for Field {
    fn from(name: &str) -> Self {
        Field::named(name)
    }
}

impl From<String> for Field {
    fn from(name: String) -> Self {
        Field::named(name)
    }
}

/// Builder handed to [`XmlBind::describe`].
///
/// Errors are collected and reported when the schema is finished, so calls
/// can be chained without checking each one.
pub struct RecordSchema<'a, T> {
    resolver: Resolver<'a>,
    construct: Option<Constructor>,
    fields: Vec<FieldSchema>,
    inherited: Vec<FieldSchema>,
    error: Option<SchemaError>,
    _record: PhantomData<fn() -> T>,
}

impl<'a, T: XmlBind> RecordSchema<'a, T> {
    pub(crate) fn new(resolver: Resolver<'a>) -> Self {
        Self {
            resolver,
            construct: None,
            fields: Vec::new(),
            inherited: Vec::new(),
            error: None,
            _record: PhantomData,
        }
    }

    /// Sets the recipe for an empty instance.
    pub fn construct_with<F>(&mut self, construct: F) -> &mut Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let construct: Constructor = Arc::new(move || Box::new(construct()) as Value);
        self.construct = Some(construct);
        self
    }

    pub fn construct_default(&mut self) -> &mut Self
    where
        T: Default,
    {
        self.construct_with(T::default)
    }

    /// Declares a field reached through `accessor`.
    pub fn field<F, A>(&mut self, options: impl Into<Field>, accessor: A) -> &mut Self
    where
        F: XmlBind,
        A: Fn(&mut T) -> &mut F + Send + Sync + 'static,
    {
        if self.error.is_none() {
            match self.build_field::<F, A>(options.into(), accessor) {
                Ok(field) => self.fields.push(field),
                Err(err) => self.error = Some(err),
            }
        }
        self
    }

    /// Adds every field of the record `B` embedded in this one. Inherited
    /// fields come after the record's own fields.
    pub fn extends<B, A>(&mut self, accessor: A) -> &mut Self
    where
        B: XmlBind,
        A: Fn(&mut T) -> &mut B + Send + Sync + 'static,
    {
        if self.error.is_some() {
            return self;
        }
        match self.resolver.schema::<B>() {
            Ok(base) => {
                let outer = project_into::<T, B, _>(accessor);
                self.inherited.extend(base.fields().iter().map(|field| FieldSchema {
                    access: field.access.nested(outer.clone()),
                    ..field.clone()
                }));
            }
            Err(err) => self.error = Some(err),
        }
        self
    }

    fn build_field<F, A>(&mut self, options: Field, accessor: A) -> Result<FieldSchema, SchemaError>
    where
        F: XmlBind,
        A: Fn(&mut T) -> &mut F + Send + Sync + 'static,
    {
        let (element_id, element_name) = F::element_type();
        let element = match options.mapper {
            Some(factory) if factory.output != element_id => {
                return Err(SchemaError::MapperMismatch {
                    type_name: type_name::<T>(),
                    field: options.name,
                    converter: factory.converter,
                    produces: factory.output_name,
                    expected: element_name,
                });
            }
            Some(factory) => (factory.build)(),
            None => F::element_mapper(&mut self.resolver)?,
        };

        let (kind, mapper) = match F::collection() {
            Some(_) => {
                let array = ArrayMapper::new(
                    element,
                    options.name.clone(),
                    options.wrapper.clone(),
                    element_name,
                );
                (ValueKind::Collection, Mapper::Array(array))
            }
            None => (element.kind(), element),
        };

        Ok(FieldSchema {
            name: options.name,
            wrapper: options.wrapper,
            kind,
            mapper,
            access: FieldAccess::new::<F>(project_into::<T, F, _>(accessor)),
        })
    }

    pub(crate) fn finish(self) -> Result<TypeSchema, SchemaError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let type_name = type_name::<T>();
        let construct = self
            .construct
            .ok_or(SchemaError::MissingConstructor { type_name })?;

        let mut fields = self.fields;
        fields.extend(self.inherited);

        let mut keys = HashMap::new();
        let mut members = HashMap::new();
        let mut own_value = None;
        for (index, field) in fields.iter().enumerate() {
            if field.is_own_value() {
                let reason = if own_value.replace(index).is_some() {
                    Some("more than one own-value field")
                } else if field.wrapper.is_some() {
                    Some("an own-value field cannot have a wrapper")
                } else if !field.mapper.reads_text() {
                    Some("an own-value field must hold a single text value")
                } else {
                    None
                };
                if let Some(reason) = reason {
                    return Err(SchemaError::InvalidOwnValue { type_name, reason });
                }
                continue;
            }

            let key = field.key().to_string();
            if keys.insert(key.clone(), index).is_some() {
                return Err(SchemaError::DuplicateKey { type_name, key });
            }
            if let Some(wrapper) = &field.wrapper {
                members.insert(field.name.clone(), wrapper.clone());
            }
        }

        Ok(TypeSchema {
            type_name,
            construct,
            fields,
            keys,
            members,
            own_value,
        })
    }
}

fn project_into<T, F, A>(accessor: A) -> Projector
where
    T: 'static,
    F: 'static,
    A: Fn(&mut T) -> &mut F + Send + Sync + 'static,
{
    Arc::new(projector(move |record: &mut dyn Any| {
        record
            .downcast_mut::<T>()
            .map(|record| accessor(record) as &mut dyn Any)
    }))
}
