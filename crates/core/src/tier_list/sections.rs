//! Section manager: add, rename and remove the buckets of a tier list.

use crate::error::CoreError;
use crate::types::DbId;

use super::ordering::reindex;
use super::validation::{validate_section_color, validate_section_name};
use super::{Section, TierList, USER_SECTION_START_ORDER};

/// Maximum number of user-defined sections (unclassified excluded).
pub const MAX_USER_SECTIONS: usize = 8;

/// Minimum number of user-defined sections (unclassified excluded).
pub const MIN_USER_SECTIONS: usize = 1;

/// Append a new, empty user section after the last one.
///
/// Existing sections keep their orders.
pub fn add_section(
    tier_list: &mut TierList,
    name: &str,
    color: Option<String>,
) -> Result<(), CoreError> {
    validate_section_name(name)?;
    validate_section_color(color.as_deref())?;

    if tier_list.user_section_count() >= MAX_USER_SECTIONS {
        return Err(CoreError::InvalidOperation(format!(
            "A tier list can have at most {MAX_USER_SECTIONS} sections"
        )));
    }

    let next_order = tier_list
        .sections
        .iter()
        .filter(|s| !s.is_unclassified)
        .map(|s| s.order)
        .max()
        .unwrap_or(USER_SECTION_START_ORDER - 1)
        + 1;

    tier_list
        .sections
        .push(Section::new(name.trim(), color, next_order));
    Ok(())
}

/// Change a section's name and, when given, its color. Orders are untouched.
pub fn rename_section(
    tier_list: &mut TierList,
    section_id: DbId,
    name: &str,
    color: Option<String>,
) -> Result<(), CoreError> {
    validate_section_name(name)?;
    validate_section_color(color.as_deref())?;

    let idx = tier_list.section_index(section_id)?;
    let section = &mut tier_list.sections[idx];
    section.name = name.trim().to_string();
    if color.is_some() {
        section.color = color;
    }
    Ok(())
}

/// Remove a user section, relocating its items to the end of unclassified.
///
/// Relocated items keep their relative order and land as one contiguous
/// block after the items already in unclassified. Remaining user sections are
/// renumbered from 1. Returns the detached (now empty) section.
pub fn remove_section(tier_list: &mut TierList, section_id: DbId) -> Result<Section, CoreError> {
    let idx = tier_list.section_index(section_id)?;

    if tier_list.sections[idx].is_unclassified {
        return Err(CoreError::InvalidOperation(
            "The unclassified section cannot be removed".to_string(),
        ));
    }
    if tier_list.user_section_count() <= MIN_USER_SECTIONS {
        return Err(CoreError::InvalidOperation(format!(
            "A tier list must keep at least {MIN_USER_SECTIONS} section"
        )));
    }
    tier_list.unclassified_index()?;

    let mut removed = tier_list.sections.remove(idx);
    let relocated = std::mem::take(&mut removed.items);

    let unclassified_idx = tier_list.unclassified_index()?;
    let unclassified = &mut tier_list.sections[unclassified_idx];
    unclassified.items.extend(relocated);
    reindex(&mut unclassified.items);

    renumber_sections(tier_list);
    Ok(removed)
}

/// Put unclassified first and renumber all sections densely from 0.
///
/// User sections keep their relative order, so they end up at 1..=N.
pub fn renumber_sections(tier_list: &mut TierList) {
    tier_list
        .sections
        .sort_by_key(|s| (!s.is_unclassified, s.order));
    reindex(&mut tier_list.sections);
}
