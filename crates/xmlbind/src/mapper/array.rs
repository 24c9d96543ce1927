//! Repeated elements.

use std::io::BufRead;

use tracing::debug;

use super::Mapper;
use crate::bind::Value;
use crate::error::{ParseError, Result};
use crate::xml::{Cursor, EventKind};

/// Reads consecutive `<item>` siblings, or the members of a `<wrapper>`.
#[derive(Clone)]
pub struct ArrayMapper {
    element: Box<Mapper>,
    item_name: String,
    wrapper: Option<String>,
    element_type: &'static str,
}

impl ArrayMapper {
    pub fn new(
        element: Mapper,
        item_name: impl Into<String>,
        wrapper: Option<String>,
        element_type: &'static str,
    ) -> Self {
        Self {
            element: Box::new(element),
            item_name: item_name.into(),
            wrapper,
            element_type,
        }
    }

    pub fn element(&self) -> &Mapper {
        &self.element
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    pub fn wrapper(&self) -> Option<&str> {
        self.wrapper.as_deref()
    }

    /// Parses one run of items. `depth` is the depth of the first item, or
    /// of the wrapper tag when there is one.
    ///
    /// An unwrapped run stops at the first sibling with another name; it may
    /// be resumed later by the owning record. A wrapped run ends with the
    /// wrapper.
    pub fn parse_run<R: BufRead>(
        &self,
        cursor: &mut Cursor<R>,
        depth: Option<usize>,
    ) -> Result<Vec<Value>> {
        let mut run = Vec::new();
        let Some(wrapper) = &self.wrapper else {
            while cursor.peek(EventKind::StartTag, depth)? && cursor.name() == self.item_name {
                run.push(self.parse_item(cursor, depth)?);
            }
            return Ok(run);
        };

        cursor.require(EventKind::StartTag, depth, Some(wrapper))?;
        let level = cursor.depth();
        cursor.advance()?;
        loop {
            if cursor.peek(EventKind::EndTag, Some(level))? {
                break;
            }
            match cursor.kind() {
                EventKind::StartTag if cursor.name() == self.item_name => {
                    run.push(self.parse_item(cursor, Some(level + 1))?);
                }
                EventKind::StartTag if cursor.deny_unknown() => {
                    return Err(ParseError::UnknownElement {
                        name: cursor.name().to_string(),
                        parent: wrapper.clone(),
                        position: cursor.position(),
                    }
                    .into());
                }
                EventKind::StartTag => {
                    debug!(element = cursor.name(), wrapper = %wrapper, "skipping unknown element");
                    cursor.skip()?;
                }
                EventKind::Text => cursor.skip()?,
                _ => cursor.require(EventKind::EndTag, Some(level), Some(wrapper))?,
            }
        }
        cursor.consume(EventKind::EndTag, Some(level), Some(wrapper))?;
        Ok(run)
    }

    fn parse_item<R: BufRead>(&self, cursor: &mut Cursor<R>, depth: Option<usize>) -> Result<Value> {
        let position = cursor.position();
        match self.element.parse(cursor, Some(&self.item_name), depth)? {
            Some(value) => Ok(value),
            None => Err(ParseError::InvalidElement {
                name: self.item_name.clone(),
                type_name: self.element_type,
                position,
            }
            .into()),
        }
    }
}
