//! Field validators for tier list and section input.

use crate::error::CoreError;

/// Maximum length of a tier list name (characters).
pub const MAX_TIER_LIST_NAME_LEN: usize = 150;

/// Maximum length of a tier list description (characters).
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Maximum length of a section name (characters).
pub const MAX_SECTION_NAME_LEN: usize = 100;

/// Maximum length of a section color, e.g. `#FF5733`.
pub const MAX_COLOR_LEN: usize = 7;

fn validate_name(field: &str, name: &str, max: usize) -> Result<(), CoreError> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if len > max {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max} characters, got {len}"
        )));
    }
    Ok(())
}

/// Validate a tier list name: 1..=150 characters after trimming.
pub fn validate_tier_list_name(name: &str) -> Result<(), CoreError> {
    validate_name("Tier list name", name, MAX_TIER_LIST_NAME_LEN)
}

/// Validate an optional tier list description: at most 1000 characters.
pub fn validate_description(description: Option<&str>) -> Result<(), CoreError> {
    match description {
        Some(d) if d.chars().count() > MAX_DESCRIPTION_LEN => Err(CoreError::Validation(
            format!("Description must be at most {MAX_DESCRIPTION_LEN} characters"),
        )),
        _ => Ok(()),
    }
}

/// Validate a section name: 1..=100 characters after trimming.
pub fn validate_section_name(name: &str) -> Result<(), CoreError> {
    validate_name("Section name", name, MAX_SECTION_NAME_LEN)
}

/// Validate an optional section color: `#` followed by 1..=6 hex digits.
pub fn validate_section_color(color: Option<&str>) -> Result<(), CoreError> {
    let Some(color) = color else {
        return Ok(());
    };
    let valid = color.len() <= MAX_COLOR_LEN
        && color
            .strip_prefix('#')
            .is_some_and(|hex| !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if valid {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Section color '{color}' must be a hex color such as #FF5733"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_list_name_bounds() {
        assert!(validate_tier_list_name("Fighting games").is_ok());
        assert!(validate_tier_list_name("").is_err());
        assert!(validate_tier_list_name("   ").is_err());
        assert!(validate_tier_list_name(&"x".repeat(150)).is_ok());
        assert!(validate_tier_list_name(&"x".repeat(151)).is_err());
    }

    #[test]
    fn description_bounds() {
        assert!(validate_description(None).is_ok());
        assert!(validate_description(Some("")).is_ok());
        assert!(validate_description(Some(&"d".repeat(1000))).is_ok());
        assert!(validate_description(Some(&"d".repeat(1001))).is_err());
    }

    #[test]
    fn section_name_bounds() {
        assert!(validate_section_name("S").is_ok());
        assert!(validate_section_name("").is_err());
        assert!(validate_section_name(&"n".repeat(101)).is_err());
    }

    #[test]
    fn section_colors() {
        assert!(validate_section_color(None).is_ok());
        assert!(validate_section_color(Some("#FF5733")).is_ok());
        assert!(validate_section_color(Some("#abc")).is_ok());
        assert!(validate_section_color(Some("FF5733")).is_err());
        assert!(validate_section_color(Some("#")).is_err());
        assert!(validate_section_color(Some("#GG0000")).is_err());
        assert!(validate_section_color(Some("#FF57330")).is_err());
    }

    #[test]
    fn error_message_names_the_field() {
        let msg = validate_section_name("").unwrap_err().to_string();
        assert!(msg.contains("Section name"));
    }
}
