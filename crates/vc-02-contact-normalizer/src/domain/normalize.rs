//! Phone number normalization
//!
//! Keeps ASCII digits and a single leading `+`. A `+` is only leading if no
//! digit precedes it, so `"(+44) 20"` keeps it and `"20+44"` does not.

use shared_types::Contact;

use super::entities::RawContact;

/// Normalize a raw phone number.
///
/// Returns `None` when nothing but an optional `+` would remain.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let mut normalized = String::with_capacity(raw.len());
    let mut has_digit = false;

    for c in raw.chars() {
        if c.is_ascii_digit() {
            normalized.push(c);
            has_digit = true;
        } else if c == '+' && normalized.is_empty() {
            normalized.push(c);
        }
    }

    has_digit.then_some(normalized)
}

/// Why a raw record produced no contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingName,
    MissingPhone,
    EmptyPhone,
}

/// Sanitize one raw record.
pub fn sanitize(raw: &RawContact) -> Result<Contact, Rejection> {
    let name = raw
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(Rejection::MissingName)?;
    let phone = raw.phone.as_deref().ok_or(Rejection::MissingPhone)?;
    let normalized = normalize_phone(phone).ok_or(Rejection::EmptyPhone)?;

    Contact::new(name, normalized).ok_or(Rejection::EmptyPhone)
}
