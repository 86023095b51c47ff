//! Record identifiers.
//!
//! Every stored record is keyed by a UUIDv7, which embeds a millisecond
//! timestamp so ids sort in creation order. Ids arriving from clients are
//! plain strings and must pass [`parse_id`] before they reach storage.

use uuid::Uuid;

use crate::error::{Error, Result};

/// Generate a new UUIDv7 identifier.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Parse a client-supplied id.
///
/// `label` names the id in the error message, e.g. `"original word"` yields
/// `Invalid original word id provided`.
///
/// # Example
///
/// ```
/// use nkowa_core::ids::parse_id;
///
/// assert!(parse_id("ok123", "word suggestion").is_err());
/// assert!(parse_id("0190b2a4-5e3c-7d1e-8f00-000000000000", "word suggestion").is_ok());
/// ```
pub fn parse_id(raw: &str, label: &str) -> Result<Uuid> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("Missing {} id", label)));
    }
    Uuid::parse_str(trimmed)
        .map_err(|_| Error::InvalidInput(format!("Invalid {} id provided", label)))
}

/// Parse an optional client-supplied id, treating `None` and blank strings as absent.
pub fn parse_optional_id(raw: Option<&str>, label: &str) -> Result<Option<Uuid>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_id(value, label).map(Some),
    }
}

/// Parse a list of client-supplied ids, failing on the first invalid entry.
pub fn parse_ids<S: AsRef<str>>(raws: &[S], label: &str) -> Result<Vec<Uuid>> {
    raws.iter().map(|raw| parse_id(raw.as_ref(), label)).collect()
}
