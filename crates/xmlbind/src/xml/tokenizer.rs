//! Structural event stream over quick-xml.
//!
//! quick-xml reports fine-grained events (text split around entity
//! references, comments, declarations, empty elements). The [`Tokenizer`]
//! folds them into the five structural events the mappers work with and
//! keeps track of nesting depth, the open element path and the byte offset.

use std::fmt;
use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::utils::{abbreviate, is_whitespace, resolve_reference, unescape};
use crate::config::BindConfig;
use crate::error::ParseError;

/// Kind of a structural event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    StartDocument,
    StartTag,
    Text,
    EndTag,
    EndDocument,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventKind::StartDocument => "start of document",
            EventKind::StartTag => "start tag",
            EventKind::Text => "text",
            EventKind::EndTag => "end tag",
            EventKind::EndDocument => "end of document",
        };
        f.write_str(label)
    }
}

/// An attribute of the current start tag, with its value unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Human readable location of the current event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Byte offset of the event in the input
    pub offset: u64,
    /// Open element path, e.g. `/person/address`
    pub path: String,
    /// Description of the event, e.g. `start tag <street>`
    pub event: String,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "byte {} in {} ({})", self.offset, self.path, self.event)
    }
}

/// Pull tokenizer producing structural events.
pub struct Tokenizer<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    /// Event read ahead while collecting text, with its offset
    pending: Option<(u64, Event<'static>)>,
    trim_text: bool,
    max_depth: Option<usize>,
    kind: EventKind,
    depth: usize,
    name: String,
    text: String,
    attributes: Vec<Attribute>,
    path: Vec<String>,
    offset: u64,
}

impl<R: BufRead> Tokenizer<R> {
    /// Creates a tokenizer positioned on the start of the document.
    pub fn new(source: R, config: &BindConfig) -> Self {
        let mut reader = Reader::from_reader(source);
        let settings = reader.config_mut();
        // Trimming happens after adjacent text pieces are merged, otherwise
        // the spaces around entity references would be lost.
        settings.trim_text(false);
        settings.expand_empty_elements = true;

        Self {
            reader,
            buf: Vec::new(),
            pending: None,
            trim_text: config.trim_text,
            max_depth: config.max_depth,
            kind: EventKind::StartDocument,
            depth: 0,
            name: String::new(),
            text: String::new(),
            attributes: Vec::new(),
            path: Vec::new(),
            offset: 0,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Nesting depth of the current event (root element = 1).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Tag name of the current start or end tag; empty otherwise.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Content of the current text event; empty otherwise.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Attributes of the current start tag; empty otherwise.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn position(&self) -> Position {
        let path = if self.path.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", self.path.join("/"))
        };
        Position {
            offset: self.offset,
            path,
            event: self.describe(),
        }
    }

    /// Describes the current event for diagnostics.
    pub fn describe(&self) -> String {
        match self.kind {
            EventKind::StartTag => format!("start tag <{}>", self.name),
            EventKind::EndTag => format!("end tag </{}>", self.name),
            EventKind::Text => format!("text \"{}\"", abbreviate(&self.text)),
            other => other.to_string(),
        }
    }

    /// Moves to the next structural event.
    pub fn advance(&mut self) -> Result<EventKind, ParseError> {
        match self.kind {
            EventKind::EndDocument => return Ok(EventKind::EndDocument),
            EventKind::EndTag => {
                self.depth = self.depth.saturating_sub(1);
                self.path.pop();
            }
            _ => {}
        }
        self.name.clear();
        self.text.clear();
        self.attributes.clear();

        loop {
            let (offset, event) = self.read_raw()?;
            self.offset = offset;
            match event {
                Event::Start(start) => {
                    self.open(&start)?;
                    return Ok(self.kind);
                }
                Event::End(end) => {
                    self.name = utf8(end.name().as_ref())?.to_string();
                    self.kind = EventKind::EndTag;
                    return Ok(self.kind);
                }
                event @ (Event::Text(_) | Event::CData(_) | Event::GeneralRef(_)) => {
                    self.collect_text(event)?;
                    if self.trim_text {
                        let trimmed = self.text.trim();
                        if trimmed.len() != self.text.len() {
                            self.text = trimmed.to_string();
                        }
                    }
                    if self.text.is_empty() {
                        continue;
                    }
                    self.kind = EventKind::Text;
                    return Ok(self.kind);
                }
                Event::Eof => {
                    self.kind = EventKind::EndDocument;
                    return Ok(self.kind);
                }
                // comments, processing instructions, declarations, doctype
                _ => continue,
            }
        }
    }

    fn read_raw(&mut self) -> Result<(u64, Event<'static>), ParseError> {
        if let Some(pending) = self.pending.take() {
            return Ok(pending);
        }

        self.buf.clear();
        let offset = self.reader.buffer_position() as u64;
        match self.reader.read_event_into(&mut self.buf) {
            Ok(event) => Ok((offset, event.into_owned())),
            Err(source) => Err(ParseError::Xml { offset, source }),
        }
    }

    fn open(&mut self, start: &BytesStart<'_>) -> Result<(), ParseError> {
        self.name = utf8(start.name().as_ref())?.to_string();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ParseError::Attribute {
                message: e.to_string(),
                position: self.position(),
            })?;
            let name = utf8(attr.key.as_ref())?.to_string();
            let raw = utf8(&attr.value)?;
            let value = match unescape(raw) {
                Ok(value) => value.into_owned(),
                Err(entity) => {
                    return Err(ParseError::UnknownEntity {
                        name: entity,
                        position: self.position(),
                    });
                }
            };
            self.attributes.push(Attribute { name, value });
        }

        self.kind = EventKind::StartTag;
        self.depth += 1;
        self.path.push(self.name.clone());

        if let Some(limit) = self.max_depth {
            if self.depth > limit {
                return Err(ParseError::TooDeep {
                    limit,
                    position: self.position(),
                });
            }
        }
        Ok(())
    }

    /// Merges a run of text, CDATA and references into `self.text`.
    fn collect_text(&mut self, first: Event<'static>) -> Result<(), ParseError> {
        let mut event = first;
        let mut offset = self.offset;
        loop {
            match event {
                Event::Text(text) => {
                    let raw = utf8(&text)?;
                    match unescape(raw) {
                        Ok(value) => self.text.push_str(&value),
                        Err(entity) => return Err(self.unknown_entity(entity)),
                    }
                }
                Event::CData(data) => self.text.push_str(utf8(&data)?),
                Event::GeneralRef(reference) => {
                    let name = utf8(&reference)?;
                    match resolve_reference(name) {
                        Some(c) => self.text.push(c),
                        None => return Err(self.unknown_entity(name.to_string())),
                    }
                }
                Event::Comment(_) | Event::PI(_) => {}
                other => {
                    self.pending = Some((offset, other));
                    return Ok(());
                }
            }
            (offset, event) = self.read_raw()?;
        }
    }

    fn unknown_entity(&self, name: String) -> ParseError {
        ParseError::UnknownEntity {
            name,
            position: self.position(),
        }
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, ParseError> {
    Ok(std::str::from_utf8(bytes)?)
}

/// Returns true if the text event carries only whitespace.
pub(crate) fn is_blank(kind: EventKind, text: &str) -> bool {
    kind == EventKind::Text && is_whitespace(text)
}
