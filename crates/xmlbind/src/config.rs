//! Reader configuration.

use serde::{Deserialize, Serialize};

/// Default nesting limit for documents.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options controlling how a document is read.
///
/// ```
/// use helios_xmlbind::BindConfig;
///
/// let config = BindConfig {
///     deny_unknown: true,
///     ..Default::default()
/// };
/// assert!(config.trim_text);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindConfig {
    /// Trim leading and trailing whitespace of text content.
    pub trim_text: bool,

    /// Fail on elements and attributes that match no field instead of
    /// skipping them.
    pub deny_unknown: bool,

    /// Maximum element nesting; `None` disables the check.
    pub max_depth: Option<usize>,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            trim_text: true,
            deny_unknown: false,
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}
