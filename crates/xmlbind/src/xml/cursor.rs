//! Assertion/advance primitives over the [`Tokenizer`].
//!
//! The cursor never recovers from a mismatch: skipping unknown subtrees is
//! done by the mappers through [`Cursor::skip`].

use std::io::BufRead;

use tracing::trace;

use super::tokenizer::{Attribute, EventKind, Position, Tokenizer, is_blank};
use crate::config::BindConfig;
use crate::error::ParseError;

/// Stateful reading position in one document.
///
/// A cursor belongs to exactly one parse; it is not meant to be shared.
pub struct Cursor<R> {
    tokens: Tokenizer<R>,
    deny_unknown: bool,
}

impl<R: BufRead> Cursor<R> {
    pub fn new(source: R, config: &BindConfig) -> Self {
        Self {
            tokens: Tokenizer::new(source, config),
            deny_unknown: config.deny_unknown,
        }
    }

    /// Checks the current event without consuming it.
    ///
    /// When a non-text kind is expected, whitespace-only text is skipped
    /// first. `None` depth means "don't check".
    pub fn peek(&mut self, kind: EventKind, depth: Option<usize>) -> Result<bool, ParseError> {
        if kind != EventKind::Text {
            self.skip_blank()?;
        }
        Ok(self.tokens.kind() == kind && depth.is_none_or(|d| d == self.tokens.depth()))
    }

    /// Asserts that the current event matches; fails with a position otherwise.
    pub fn require(
        &mut self,
        kind: EventKind,
        depth: Option<usize>,
        name: Option<&str>,
    ) -> Result<(), ParseError> {
        let matches = self.peek(kind, depth)? && name.is_none_or(|n| n == self.tokens.name());
        if matches {
            return Ok(());
        }

        let mut expected = kind.to_string();
        if let Some(name) = name {
            match kind {
                EventKind::EndTag => expected.push_str(&format!(" </{}>", name)),
                _ => expected.push_str(&format!(" <{}>", name)),
            }
        }
        if let Some(depth) = depth {
            expected.push_str(&format!(" at depth {}", depth));
        }
        Err(self.mismatch(expected))
    }

    fn mismatch(&self, expected: String) -> ParseError {
        ParseError::Mismatch {
            expected,
            found: format!("{} at depth {}", self.tokens.describe(), self.tokens.depth()),
            position: self.tokens.position(),
        }
    }

    /// Asserts the current event, then advances past it.
    pub fn consume(
        &mut self,
        kind: EventKind,
        depth: Option<usize>,
        name: Option<&str>,
    ) -> Result<(), ParseError> {
        self.require(kind, depth, name)?;
        self.advance()?;
        Ok(())
    }

    /// Moves forward by exactly one structural event.
    pub fn advance(&mut self) -> Result<EventKind, ParseError> {
        let kind = self.tokens.advance()?;
        trace!(event = %self.tokens.describe(), depth = self.tokens.depth(), "cursor advanced");
        Ok(kind)
    }

    /// Consumes and discards one text node or one well-formed subtree.
    pub fn skip(&mut self) -> Result<(), ParseError> {
        match self.tokens.kind() {
            EventKind::Text => {
                self.advance()?;
                Ok(())
            }
            EventKind::StartTag => {
                let depth = self.tokens.depth();
                let name = self.tokens.name().to_string();
                loop {
                    match self.advance()? {
                        EventKind::EndTag if self.tokens.depth() == depth => break,
                        EventKind::EndDocument => {
                            return self.require(EventKind::EndTag, Some(depth), Some(&name));
                        }
                        _ => {}
                    }
                }
                self.advance()?;
                Ok(())
            }
            _ => Err(self.mismatch("start tag or text".to_string())),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.tokens.kind()
    }

    pub fn depth(&self) -> usize {
        self.tokens.depth()
    }

    pub fn name(&self) -> &str {
        self.tokens.name()
    }

    pub fn text(&self) -> &str {
        self.tokens.text()
    }

    pub fn attributes(&self) -> &[Attribute] {
        self.tokens.attributes()
    }

    pub fn position(&self) -> Position {
        self.tokens.position()
    }

    /// Whether unknown elements and attributes are errors for this parse.
    pub fn deny_unknown(&self) -> bool {
        self.deny_unknown
    }

    fn skip_blank(&mut self) -> Result<(), ParseError> {
        while is_blank(self.tokens.kind(), self.tokens.text()) {
            self.advance()?;
        }
        Ok(())
    }
}
