//! Field-name and credential-format validation.

/// Reserved prefix for internal fields (credentials and similar metadata).
///
/// Internal fields are invisible to callers outside the storage layer and
/// are stripped from all wire output.
pub const INTERNAL_PREFIX: &str = "__";

/// The reserved identity field, readable but never writable.
pub const ID_FIELD: &str = "_id";

/// Returns true if `name` is a valid user-facing field name.
///
/// Field names are case-sensitive and restricted to ASCII alphanumerics.
#[must_use]
pub fn is_valid_field_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Returns true if `name` begins with the internal-field prefix.
#[must_use]
pub fn is_internal_field(name: &str) -> bool {
    name.starts_with(INTERNAL_PREFIX)
}

/// Minimal structural check for an email address.
///
/// Full RFC validation is an external concern; this only rejects values
/// that cannot possibly be addresses.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.contains(char::is_whitespace)
}
