//! Utility functions for reading XML text and attribute values.
//!
//! Entity handling is limited to what a non-validating reader needs: the five
//! predefined entities and numeric character references.

use std::borrow::Cow;

/// Checks if an attribute name is a namespace declaration.
///
/// Namespace processing is disabled, so `xmlns` and `xmlns:*` attributes are
/// never offered to a record schema.
pub fn is_namespace_declaration(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:")
}

/// Checks if a text node carries no data.
pub fn is_whitespace(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// Resolves the name of an entity or character reference (without `&` and `;`).
pub fn resolve_reference(name: &str) -> Option<char> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    }
}

/// Replaces entity and character references in raw attribute or text content.
///
/// On failure returns the name of the first reference that could not be
/// resolved.
pub fn unescape(raw: &str) -> Result<Cow<'_, str>, String> {
    if !raw.contains('&') {
        return Ok(Cow::Borrowed(raw));
    }

    let mut result = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        result.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find(';') else {
            return Err(after.to_string());
        };
        let name = &after[..end];
        match resolve_reference(name) {
            Some(c) => result.push(c),
            None => return Err(name.to_string()),
        }
        rest = &after[end + 1..];
    }
    result.push_str(rest);
    Ok(Cow::Owned(result))
}

/// Shortens text for use in error messages and logs.
pub fn abbreviate(text: &str) -> String {
    const LIMIT: usize = 24;
    let escaped = text.replace('\n', "\\n");
    if escaped.chars().count() <= LIMIT {
        escaped
    } else {
        let head: String = escaped.chars().take(LIMIT).collect();
        format!("{}...", head)
    }
}
