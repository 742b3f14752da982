//! Creating tier lists and editing their root metadata.

use crate::error::CoreError;
use crate::types::DbId;

use super::validation::{validate_description, validate_tier_list_name};
use super::{Section, SourceCollection, TierList, TierListKind, UNCLASSIFIED_SECTION_ORDER};

/// Display name of the unclassified section.
pub const UNCLASSIFIED_SECTION_NAME: &str = "Unclassified";

/// User sections every new tier list starts with, top tier first.
pub const DEFAULT_SECTION_NAMES: [&str; 5] = ["S", "A", "B", "C", "D"];

/// The initial section layout: unclassified at 0, then `S`..`D` at 1..=5.
pub fn default_sections() -> Vec<Section> {
    let mut sections = vec![Section::unclassified(UNCLASSIFIED_SECTION_NAME)];
    sections.extend(
        DEFAULT_SECTION_NAMES
            .iter()
            .zip(UNCLASSIFIED_SECTION_ORDER + 1..)
            .map(|(name, order)| Section::new(*name, None, order)),
    );
    sections
}

/// A tier list that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTierList {
    pub owner_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub kind: TierListKind,
    pub sections: Vec<Section>,
}

impl NewTierList {
    /// An owner-curated tier list with the default sections.
    pub fn profile(
        owner_id: DbId,
        name: &str,
        description: Option<String>,
        is_public: bool,
    ) -> Result<Self, CoreError> {
        validate_tier_list_name(name)?;
        validate_description(description.as_deref())?;

        Ok(Self {
            owner_id,
            name: name.trim().to_string(),
            description,
            is_public,
            kind: TierListKind::ProfileGlobal,
            sections: default_sections(),
        })
    }

    /// The tier list mirroring `source`, owned by the game list's owner.
    ///
    /// It inherits the game list's name and visibility. Items are not placed
    /// here; the caller runs a sync right after the tier list is stored.
    pub fn for_collection(source: &SourceCollection) -> Self {
        Self {
            owner_id: source.owner_id,
            name: source.name.clone(),
            description: Some(format!("Tier list for game list: {}", source.name)),
            is_public: source.is_public,
            kind: TierListKind::FromCollection {
                source_list_id: source.id,
            },
            sections: default_sections(),
        }
    }
}

/// A game list can be mirrored by its owner, or by anyone when it is public.
pub fn ensure_collection_readable(
    source: &SourceCollection,
    caller_id: DbId,
) -> Result<(), CoreError> {
    if source.is_public || source.owner_id == caller_id {
        Ok(())
    } else {
        Err(CoreError::Unauthorized(format!(
            "Game list {} is private",
            source.public_id
        )))
    }
}

/// Partial update of the root fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierListMetadataUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

/// Validate and apply a metadata update. Nothing is applied if any field fails.
pub fn apply_metadata_update(
    tier_list: &mut TierList,
    update: &TierListMetadataUpdate,
) -> Result<(), CoreError> {
    if let Some(name) = &update.name {
        validate_tier_list_name(name)?;
    }
    validate_description(update.description.as_deref())?;

    if let Some(name) = &update.name {
        tier_list.name = name.trim().to_string();
    }
    if let Some(description) = &update.description {
        tier_list.description = Some(description.clone());
    }
    if let Some(is_public) = update.is_public {
        tier_list.is_public = is_public;
    }
    Ok(())
}
