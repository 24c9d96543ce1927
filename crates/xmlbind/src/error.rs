//! Error types for XML binding.
//!
//! Two families of failures exist:
//! - [`ParseError`]: the incoming token stream does not match what the schema
//!   requires at some checkpoint, or a text value cannot be converted.
//! - [`SchemaError`]: a target type cannot be bound at all (no constructor,
//!   conflicting keys, mismatched converter). These are detected when the
//!   schema is built, cached, and re-raised on every later use of the type.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::xml::Position;

/// The error returned by every public binding operation.
#[derive(Error, Debug)]
pub enum BindError {
    /// Structural or conversion failure while reading the document
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The target type could not be turned into a schema
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl BindError {
    /// Returns true if this is a structural or conversion error.
    pub fn is_parse(&self) -> bool {
        matches!(self, BindError::Parse(_))
    }

    /// Returns true if this is a schema error.
    pub fn is_schema(&self) -> bool {
        matches!(self, BindError::Schema(_))
    }
}

/// Errors raised while consuming the token stream.
#[derive(Error, Debug)]
pub enum ParseError {
    /// A required event, depth, or name did not match.
    #[error("expected {expected} but found {found} at {position}")]
    Mismatch {
        expected: String,
        found: String,
        position: Position,
    },

    /// An element of a collection produced no value.
    #[error("invalid element <{name}> in collection of {type_name} at {position}")]
    InvalidElement {
        name: String,
        type_name: &'static str,
        position: Position,
    },

    /// Text could not be converted to the field's type.
    #[error("cannot convert value of `{field}`: {source} (at {position})")]
    Conversion {
        field: String,
        #[source]
        source: ConvertError,
        position: Position,
    },

    /// A member of a wrapped collection appeared directly under its owner.
    #[error("element <{element}> must be enclosed in <{wrapper}> at {position}")]
    MissingWrapper {
        element: String,
        wrapper: String,
        position: Position,
    },

    #[error("unknown element <{name}> in <{parent}> at {position}")]
    UnknownElement {
        name: String,
        parent: String,
        position: Position,
    },

    #[error("unknown attribute `{name}` on <{parent}> at {position}")]
    UnknownAttribute {
        name: String,
        parent: String,
        position: Position,
    },

    #[error("element nesting exceeds the limit of {limit} at {position}")]
    TooDeep { limit: usize, position: Position },

    #[error("failed to parse attribute: {message} at {position}")]
    Attribute { message: String, position: Position },

    #[error("unresolved entity reference `&{name};` at {position}")]
    UnknownEntity { name: String, position: Position },

    #[error("content after the root element at {position}")]
    TrailingContent { position: Position },

    #[error("invalid UTF-8 input: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Malformed XML reported by the tokenizer.
    #[error("malformed XML at byte {offset}: {source}")]
    Xml {
        offset: u64,
        #[source]
        source: quick_xml::Error,
    },
}

/// Errors detected while building the schema of a type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The record never declared how to construct an empty instance.
    #[error("type {type_name} has no default constructor")]
    MissingConstructor { type_name: &'static str },

    /// Two fields resolve to the same tag/attribute key.
    #[error("type {type_name} binds `{key}` more than once")]
    DuplicateKey { type_name: &'static str, key: String },

    /// A custom converter produces a different type than the field holds.
    #[error(
        "converter {converter} on `{field}` of {type_name} produces {produces}, field holds {expected}"
    )]
    MapperMismatch {
        type_name: &'static str,
        field: String,
        converter: &'static str,
        produces: &'static str,
        expected: &'static str,
    },

    #[error("collections of collections are not supported ({type_name})")]
    NestedCollection { type_name: &'static str },

    /// Own-value fields must be unique, unwrapped and single valued.
    #[error("invalid own-value field in {type_name}: {reason}")]
    InvalidOwnValue {
        type_name: &'static str,
        reason: &'static str,
    },

    /// A schema was used before its construction finished.
    #[error("schema of {type_name} is incomplete")]
    Incomplete { type_name: &'static str },

    /// A parsed value did not have the type its field expects.
    #[error("value type mismatch, expected {expected}")]
    TypeMismatch { expected: &'static str },
}

/// Failure converting text into a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("invalid {kind} `{text}`")]
    Invalid { kind: &'static str, text: String },

    /// Message produced by a user-supplied converter.
    #[error("{0}")]
    Custom(String),
}

impl ConvertError {
    pub(crate) fn invalid(kind: &'static str, text: &str) -> Self {
        ConvertError::Invalid {
            kind,
            text: text.to_string(),
        }
    }
}

impl From<String> for ConvertError {
    fn from(msg: String) -> Self {
        ConvertError::Custom(msg)
    }
}

impl From<&str> for ConvertError {
    fn from(msg: &str) -> Self {
        ConvertError::Custom(msg.to_string())
    }
}

/// Result type alias for binding operations
pub type Result<T> = std::result::Result<T, BindError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_converts_into_bind_error() {
        let err: BindError = SchemaError::MissingConstructor { type_name: "Person" }.into();
        assert!(err.is_schema());
        assert!(!err.is_parse());
        assert_eq!(err.to_string(), "type Person has no default constructor");
    }

    #[test]
    fn test_convert_error_messages() {
        assert_eq!(
            ConvertError::invalid("i32", "abc").to_string(),
            "invalid i32 `abc`"
        );
        assert_eq!(ConvertError::from("bad date").to_string(), "bad date");
    }
}
