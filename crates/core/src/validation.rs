//! Request field validation shared by every endpoint.
//!
//! Clients send camelCase JSON bodies where any field may be absent. Handlers
//! deserialize into `Option<String>` fields and call [`require_fields`] so a
//! missing field yields a 400 naming every absent field at once, instead of
//! the extractor's generic rejection.

/// Maximum length of any caller-supplied identifier (room, player, user, party ids).
pub const MAX_ID_LEN: usize = 128;

/// Check that every `(name, value)` pair carries a non-blank value.
///
/// Returns an error message listing all missing field names in the order
/// given, e.g. `"Missing required fields: roomId, playerId"`.
pub fn require_fields(fields: &[(&str, Option<&str>)]) -> Result<(), String> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("Missing required fields: {}", missing.join(", ")))
    }
}

/// Validate an opaque identifier: non-blank, bounded length, no control characters.
pub fn validate_identifier(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if value.len() > MAX_ID_LEN {
        return Err(format!(
            "{field} must be at most {MAX_ID_LEN} characters, got {}",
            value.len()
        ));
    }
    if value.chars().any(char::is_control) {
        return Err(format!("{field} must not contain control characters"));
    }
    Ok(())
}

/// Validate a human-readable display name (player or user name).
pub fn validate_display_name(field: &str, value: &str, max_len: usize) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    let len = trimmed.chars().count();
    if len > max_len {
        return Err(format!(
            "{field} must be at most {max_len} characters, got {len}"
        ));
    }
    Ok(())
}
