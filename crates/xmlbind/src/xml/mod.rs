//! Streaming XML input for the binding engine.
//!
//! ## Architecture
//!
//! - [`Tokenizer`]: folds quick-xml events into five structural events
//!   (start of document, start tag, text, end tag, end of document) and keeps
//!   the nesting depth, the open element path and the byte offset.
//! - [`Cursor`]: the three primitives the mappers rely on, `peek`, `require`
//!   and `consume`, plus subtree skipping.
//!
//! ## Event Model
//!
//! ```xml
//! <person id="7">          <!-- start tag, depth 1, attributes [id] -->
//!   <name>Joe</name>       <!-- start tag depth 2, text depth 2, end tag depth 2 -->
//!   <nick/>                <!-- start tag depth 2, end tag depth 2 -->
//! </person>                <!-- end tag, depth 1 -->
//! ```
//!
//! Comments, processing instructions, the XML declaration and DOCTYPE are
//! dropped. Text split by entity references, CDATA sections or comments is
//! delivered as one text event.
//!
//! ## Namespace Handling
//!
//! Namespace processing is disabled. Prefixed names (`xsi:type`) are matched
//! literally and `xmlns` declarations are ignored by the record mapper.

pub mod cursor;
pub mod tokenizer;
pub(crate) mod utils;

pub use cursor::Cursor;
pub use tokenizer::{Attribute, EventKind, Position, Tokenizer};
