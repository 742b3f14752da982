//! Tier list aggregate and the engine that mutates it.
//!
//! A [`TierList`] owns its [`Section`]s by value and each section owns its
//! [`Item`]s by value. The whole tree is loaded, mutated in memory by the
//! functions in the submodules, and saved back as one unit.
//!
//! - [`ordering`] -- dense zero-based renumbering.
//! - [`sections`] -- add / rename / remove sections.
//! - [`placement`] -- add / move / remove items.
//! - [`sync`] -- one-way mirror of a source game list.
//! - [`lifecycle`] -- new tier list builders, metadata updates, access rules.
//! - [`validation`] -- field-level input validators.

pub mod lifecycle;
pub mod ordering;
pub mod placement;
pub mod sections;
pub mod sync;
pub mod validation;

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Stored value of the `kind` column for owner-curated tier lists.
pub const KIND_PROFILE_GLOBAL: &str = "PROFILE_GLOBAL";

/// Stored value of the `kind` column for tier lists mirrored from a game list.
pub const KIND_FROM_COLLECTION: &str = "FROM_COLLECTION";

/// Order value reserved for the unclassified section.
pub const UNCLASSIFIED_SECTION_ORDER: i32 = 0;

/// Order value of the first user-defined section.
pub const USER_SECTION_START_ORDER: i32 = 1;

// ---------------------------------------------------------------------------
// Kind
// ---------------------------------------------------------------------------

/// What a tier list is, and therefore who controls its membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierListKind {
    /// Structure and membership are both curated by the owner.
    ProfileGlobal,
    /// Structure is curated by the owner; membership mirrors a game list.
    FromCollection { source_list_id: DbId },
}

impl TierListKind {
    /// The stored `kind` column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            TierListKind::ProfileGlobal => KIND_PROFILE_GLOBAL,
            TierListKind::FromCollection { .. } => KIND_FROM_COLLECTION,
        }
    }

    /// The referenced source game list, if any.
    pub fn source_list_id(&self) -> Option<DbId> {
        match self {
            TierListKind::ProfileGlobal => None,
            TierListKind::FromCollection { source_list_id } => Some(*source_list_id),
        }
    }

    /// Rebuild a kind from its stored `(kind, source_game_list_id)` columns.
    ///
    /// The source reference must be present exactly when the kind is
    /// `FROM_COLLECTION`; anything else is corrupt data.
    pub fn from_columns(kind: &str, source_list_id: Option<DbId>) -> Result<Self, CoreError> {
        match (kind, source_list_id) {
            (KIND_PROFILE_GLOBAL, None) => Ok(TierListKind::ProfileGlobal),
            (KIND_FROM_COLLECTION, Some(source_list_id)) => {
                Ok(TierListKind::FromCollection { source_list_id })
            }
            (other, source) => Err(CoreError::IllegalState(format!(
                "Tier list kind '{other}' is inconsistent with source game list {source:?}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// One library entry occupying one slot of a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// `None` until the item has been saved.
    pub id: Option<DbId>,
    pub library_entry_id: DbId,
    pub order: i32,
}

impl Item {
    /// A fresh, unsaved placement. Its order is assigned by the next reindex.
    pub fn new(library_entry_id: DbId) -> Self {
        Self {
            id: None,
            library_entry_id,
            order: 0,
        }
    }
}

/// A named bucket inside a tier list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// `None` until the section has been saved.
    pub id: Option<DbId>,
    pub name: String,
    pub color: Option<String>,
    pub order: i32,
    pub is_unclassified: bool,
    pub items: Vec<Item>,
}

impl Section {
    /// A fresh, empty user-defined section.
    pub fn new(name: impl Into<String>, color: Option<String>, order: i32) -> Self {
        Self {
            id: None,
            name: name.into(),
            color,
            order,
            is_unclassified: false,
            items: Vec::new(),
        }
    }

    /// A fresh, empty unclassified section.
    pub fn unclassified(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            color: None,
            order: UNCLASSIFIED_SECTION_ORDER,
            is_unclassified: true,
            items: Vec::new(),
        }
    }
}

/// The full tier list aggregate: root columns plus every section and item.
///
/// `kind` is fixed at creation. No engine operation writes it and
/// persistence never updates the stored column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierList {
    pub id: DbId,
    pub public_id: Uuid,
    pub owner_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub kind: TierListKind,
    /// Optimistic concurrency token; bumped by every successful save.
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Unclassified first, then user sections in display order.
    pub sections: Vec<Section>,
}

impl TierList {
    // -- Lookups ------------------------------------------------------------

    /// Index of the unclassified section.
    pub fn unclassified_index(&self) -> Result<usize, CoreError> {
        self.sections
            .iter()
            .position(|s| s.is_unclassified)
            .ok_or_else(|| {
                CoreError::IllegalState(format!(
                    "Tier list {} has no unclassified section",
                    self.public_id
                ))
            })
    }

    /// The unclassified section.
    pub fn unclassified(&self) -> Result<&Section, CoreError> {
        let idx = self.unclassified_index()?;
        Ok(&self.sections[idx])
    }

    /// Index of the section with the given id.
    pub fn section_index(&self, section_id: DbId) -> Result<usize, CoreError> {
        self.sections
            .iter()
            .position(|s| s.id == Some(section_id))
            .ok_or_else(|| CoreError::not_found("TierSection", section_id))
    }

    /// `(section index, item index)` of the item with the given id.
    pub fn locate_item(&self, item_id: DbId) -> Result<(usize, usize), CoreError> {
        self.find_position(|item| item.id == Some(item_id))
            .ok_or_else(|| CoreError::not_found("TierListItem", item_id))
    }

    /// `(section index, item index)` of the placement holding a library entry.
    pub fn locate_entry(&self, library_entry_id: DbId) -> Option<(usize, usize)> {
        self.find_position(|item| item.library_entry_id == library_entry_id)
    }

    fn find_position(&self, pred: impl Fn(&Item) -> bool) -> Option<(usize, usize)> {
        self.sections.iter().enumerate().find_map(|(s_idx, section)| {
            section
                .items
                .iter()
                .position(&pred)
                .map(|i_idx| (s_idx, i_idx))
        })
    }

    /// Number of user-defined sections (unclassified excluded).
    pub fn user_section_count(&self) -> usize {
        self.sections.iter().filter(|s| !s.is_unclassified).count()
    }

    /// Every library entry currently placed anywhere in the tier list.
    pub fn placed_entries(&self) -> HashSet<DbId> {
        self.sections
            .iter()
            .flat_map(|s| s.items.iter().map(|i| i.library_entry_id))
            .collect()
    }

    /// Total number of placements across all sections.
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    // -- Access rules -------------------------------------------------------

    /// Reject callers other than the owner.
    pub fn ensure_owner(&self, caller_id: DbId) -> Result<(), CoreError> {
        if self.owner_id == caller_id {
            Ok(())
        } else {
            Err(CoreError::Unauthorized(format!(
                "Tier list {} does not belong to the caller",
                self.public_id
            )))
        }
    }

    /// Public tier lists are visible to everyone; private ones only to the owner.
    pub fn is_visible_to(&self, caller_id: Option<DbId>) -> bool {
        self.is_public || caller_id == Some(self.owner_id)
    }

    /// The single checkpoint guarding direct membership changes.
    ///
    /// Mirrored tier lists get their items from the synchronizer only.
    pub fn ensure_membership_editable(&self) -> Result<(), CoreError> {
        match self.kind {
            TierListKind::ProfileGlobal => Ok(()),
            TierListKind::FromCollection { source_list_id } => {
                Err(CoreError::InvalidOperation(format!(
                    "Games in tier list {} are mirrored from game list {source_list_id}; \
                     change the game list instead",
                    self.public_id
                )))
            }
        }
    }

    // -- Invariants ---------------------------------------------------------

    /// Verify every structural invariant of the aggregate.
    ///
    /// Checked before each save so a corrupted tree never reaches storage.
    pub fn check_invariants(&self) -> Result<(), CoreError> {
        let illegal = |msg: String| Err(CoreError::IllegalState(msg));

        let unclassified = self.sections.iter().filter(|s| s.is_unclassified).count();
        if unclassified != 1 {
            return illegal(format!(
                "Tier list {} has {unclassified} unclassified sections",
                self.public_id
            ));
        }

        let users = self.user_section_count();
        if !(sections::MIN_USER_SECTIONS..=sections::MAX_USER_SECTIONS).contains(&users) {
            return illegal(format!(
                "Tier list {} has {users} user sections",
                self.public_id
            ));
        }

        if self.unclassified()?.order != UNCLASSIFIED_SECTION_ORDER {
            return illegal("Unclassified section is not at order 0".to_string());
        }

        let mut user_orders: Vec<i32> = self
            .sections
            .iter()
            .filter(|s| !s.is_unclassified)
            .map(|s| s.order)
            .collect();
        user_orders.sort_unstable();
        let expected = USER_SECTION_START_ORDER..USER_SECTION_START_ORDER + users as i32;
        if !user_orders.iter().copied().eq(expected) {
            return illegal(format!("User section orders are not contiguous: {user_orders:?}"));
        }

        for section in &self.sections {
            if !ordering::is_dense(&section.items) {
                return illegal(format!(
                    "Items of section '{}' are not densely ordered",
                    section.name
                ));
            }
        }

        if self.placed_entries().len() != self.item_count() {
            return illegal(format!(
                "Tier list {} places a library entry more than once",
                self.public_id
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Collaborator views
// ---------------------------------------------------------------------------

/// The slice of a library entry the engine needs for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryEntryRef {
    pub id: DbId,
    pub owner_id: DbId,
}

/// A source game list as seen by the synchronizer and lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCollection {
    pub id: DbId,
    pub public_id: Uuid,
    pub owner_id: DbId,
    pub name: String,
    pub is_public: bool,
    /// Library entry ids, in the game list's own iteration order.
    pub member_ids: Vec<DbId>,
}


#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::test_support::*;
    use super::*;

    #[test]
    fn kind_roundtrips_through_columns() {
        let k = TierListKind::FromCollection { source_list_id: 7 };
        assert_eq!(
            TierListKind::from_columns(k.as_str(), k.source_list_id()).unwrap(),
            k
        );
        assert_eq!(
            TierListKind::from_columns(KIND_PROFILE_GLOBAL, None).unwrap(),
            TierListKind::ProfileGlobal
        );
    }

    #[test]
    fn inconsistent_kind_columns_are_illegal_state() {
        assert_matches!(
            TierListKind::from_columns(KIND_FROM_COLLECTION, None),
            Err(CoreError::IllegalState(_))
        );
        assert_matches!(
            TierListKind::from_columns(KIND_PROFILE_GLOBAL, Some(3)),
            Err(CoreError::IllegalState(_))
        );
        assert_matches!(
            TierListKind::from_columns("RANDOM", None),
            Err(CoreError::IllegalState(_))
        );
    }

    #[test]
    fn membership_checkpoint_follows_kind() {
        let profile = saved_tier_list(TierListKind::ProfileGlobal);
        assert!(profile.ensure_membership_editable().is_ok());

        let mirrored = saved_tier_list(TierListKind::FromCollection { source_list_id: 3 });
        assert_matches!(
            mirrored.ensure_membership_editable(),
            Err(CoreError::InvalidOperation(_))
        );
    }

    #[test]
    fn visibility_and_ownership() {
        let mut tl = saved_tier_list(TierListKind::ProfileGlobal);
        assert!(tl.is_visible_to(Some(OWNER)));
        assert!(!tl.is_visible_to(Some(OTHER_USER)));
        assert!(!tl.is_visible_to(None));

        tl.is_public = true;
        assert!(tl.is_visible_to(None));

        assert!(tl.ensure_owner(OWNER).is_ok());
        assert_matches!(tl.ensure_owner(OTHER_USER), Err(CoreError::Unauthorized(_)));
    }

    #[test]
    fn missing_unclassified_is_illegal_state() {
        let mut tl = saved_tier_list(TierListKind::ProfileGlobal);
        tl.sections.remove(0);
        assert_matches!(tl.unclassified_index(), Err(CoreError::IllegalState(_)));
        assert_matches!(tl.check_invariants(), Err(CoreError::IllegalState(_)));
    }

    #[test]
    fn invariants_detect_gaps_and_duplicates() {
        let mut tl = saved_tier_list(TierListKind::ProfileGlobal);
        assert!(tl.check_invariants().is_ok());

        tl.sections[3].order = 9;
        assert_matches!(tl.check_invariants(), Err(CoreError::IllegalState(_)));

        let mut tl = saved_tier_list(TierListKind::ProfileGlobal);
        tl.sections[1].items.push(Item::new(5));
        tl.sections[2].items.push(Item::new(5));
        assert_matches!(tl.check_invariants(), Err(CoreError::IllegalState(_)));

        let mut tl = saved_tier_list(TierListKind::ProfileGlobal);
        let mut item = Item::new(5);
        item.order = 3;
        tl.sections[1].items.push(item);
        assert_matches!(tl.check_invariants(), Err(CoreError::IllegalState(_)));
    }

    #[test]
    fn lookups_report_not_found() {
        let tl = saved_tier_list(TierListKind::ProfileGlobal);
        assert_eq!(tl.section_index(12).unwrap(), 2);
        assert_matches!(
            tl.section_index(999),
            Err(CoreError::NotFound { entity: "TierSection", .. })
        );
        assert_matches!(
            tl.locate_item(999),
            Err(CoreError::NotFound { entity: "TierListItem", .. })
        );
        assert!(tl.locate_entry(1).is_none());
    }
}
