//! One-way mirror from a source game list into a `FROM_COLLECTION` tier list.
//!
//! The game list owns membership: entries it gains are appended to the
//! unclassified section, entries it loses are deleted from wherever the owner
//! ranked them. Entries present on both sides are never touched, so the
//! owner's ranking survives every sync.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::types::DbId;

use super::ordering::reindex;
use super::{Item, SourceCollection, TierList, TierListKind};

/// What a synchronization changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Library entries newly placed in unclassified, in placement order.
    pub added: Vec<DbId>,
    /// Library entries whose items were deleted.
    pub removed: Vec<DbId>,
}

impl SyncOutcome {
    /// `true` when nothing changed and nothing needs to be written.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Reconcile the tier list's placements with the source's current members.
///
/// Fails with `InvalidOperation` unless the tier list mirrors exactly this
/// source. The aggregate is untouched when the outcome is a no-op.
pub fn synchronize(
    tier_list: &mut TierList,
    source: &SourceCollection,
) -> Result<SyncOutcome, CoreError> {
    ensure_mirrors(tier_list, source)?;
    let unclassified_idx = tier_list.unclassified_index()?;

    let members: HashSet<DbId> = source.member_ids.iter().copied().collect();
    let mut outcome = SyncOutcome::default();

    for section in &mut tier_list.sections {
        let before = section.items.len();
        section.items.retain(|item| {
            let keep = members.contains(&item.library_entry_id);
            if !keep {
                outcome.removed.push(item.library_entry_id);
            }
            keep
        });
        if section.items.len() != before {
            reindex(&mut section.items);
        }
    }

    let mut placed = tier_list.placed_entries();
    let unclassified = &mut tier_list.sections[unclassified_idx];
    for &entry_id in &source.member_ids {
        if placed.insert(entry_id) {
            unclassified.items.push(Item::new(entry_id));
            outcome.added.push(entry_id);
        }
    }
    if !outcome.added.is_empty() {
        reindex(&mut unclassified.items);
    }

    Ok(outcome)
}

/// Reject a move of an item whose entry has left the source game list.
///
/// A mirrored tier list can lag behind its source until the next sync; moving
/// such a stale item would rank a game that is no longer in the list.
pub fn ensure_still_mirrored(
    tier_list: &TierList,
    item_id: DbId,
    source: &SourceCollection,
) -> Result<(), CoreError> {
    ensure_mirrors(tier_list, source)?;
    let (section_idx, item_idx) = tier_list.locate_item(item_id)?;
    let entry_id = tier_list.sections[section_idx].items[item_idx].library_entry_id;

    if source.member_ids.contains(&entry_id) {
        Ok(())
    } else {
        Err(CoreError::InvalidOperation(format!(
            "Library entry {entry_id} is no longer part of game list {}",
            source.public_id
        )))
    }
}

fn ensure_mirrors(tier_list: &TierList, source: &SourceCollection) -> Result<(), CoreError> {
    match tier_list.kind {
        TierListKind::FromCollection { source_list_id } if source_list_id == source.id => Ok(()),
        TierListKind::FromCollection { source_list_id } => {
            Err(CoreError::InvalidOperation(format!(
                "Tier list {} mirrors game list {source_list_id}, not {}",
                tier_list.public_id, source.id
            )))
        }
        TierListKind::ProfileGlobal => Err(CoreError::InvalidOperation(format!(
            "Tier list {} is not linked to a game list",
            tier_list.public_id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use uuid::Uuid;

    use super::*;
    use crate::tier_list::placement::move_item;
    use crate::tier_list::test_support::*;

    const SOURCE_ID: DbId = 3;

    fn mirrored() -> TierList {
        saved_tier_list(TierListKind::FromCollection {
            source_list_id: SOURCE_ID,
        })
    }

    fn source(members: &[DbId]) -> SourceCollection {
        SourceCollection {
            id: SOURCE_ID,
            public_id: Uuid::new_v4(),
            owner_id: OWNER,
            name: "Backlog".to_string(),
            is_public: false,
            member_ids: members.to_vec(),
        }
    }

    #[test]
    fn first_sync_places_everything_in_source_order() {
        let mut tl = mirrored();
        let outcome = synchronize(&mut tl, &source(&[5, 3, 9])).unwrap();

        assert_eq!(outcome.added, [5, 3, 9]);
        assert!(outcome.removed.is_empty());
        assert_eq!(entries(&tl, 0), [5, 3, 9]);
        assert!(tl.check_invariants().is_ok());
    }

    #[test]
    fn scenario_e_adds_new_removes_gone_keeps_common() {
        let mut tl = mirrored();
        synchronize(&mut tl, &source(&[1, 2])).unwrap();
        assign_item_ids(&mut tl);
        let (s, i) = tl.locate_entry(1).unwrap();
        let e1_item = tl.sections[s].items[i].id.unwrap();
        move_item(&mut tl, e1_item, 11, 0).unwrap();

        let outcome = synchronize(&mut tl, &source(&[1, 3])).unwrap();

        assert_eq!(outcome.added, [3]);
        assert_eq!(outcome.removed, [2]);
        assert_eq!(entries(&tl, 0), [3]);
        assert_eq!(entries(&tl, 1), [1]);
        assert_eq!(tl.sections[1].items[0].id, Some(e1_item));
        assert!(tl.locate_entry(2).is_none());
        assert!(tl.check_invariants().is_ok());
    }

    #[test]
    fn second_sync_without_changes_is_a_noop() {
        let mut tl = mirrored();
        let src = source(&[1, 2, 3]);
        synchronize(&mut tl, &src).unwrap();
        assign_item_ids(&mut tl);
        let snapshot = tl.clone();

        let outcome = synchronize(&mut tl, &src).unwrap();

        assert!(outcome.is_noop());
        assert_eq!(tl, snapshot);
    }

    #[test]
    fn removal_reindexes_every_touched_section() {
        let mut tl = mirrored();
        synchronize(&mut tl, &source(&[1, 2, 3, 4])).unwrap();
        assign_item_ids(&mut tl);
        for entry_id in [1, 2, 3] {
            let (s, i) = tl.locate_entry(entry_id).unwrap();
            let id = tl.sections[s].items[i].id.unwrap();
            move_item(&mut tl, id, 11, 10).unwrap();
        }

        let outcome = synchronize(&mut tl, &source(&[3, 4])).unwrap();

        assert_eq!(outcome.removed, [1, 2]);
        assert_eq!(entries(&tl, 1), [3]);
        assert_eq!(tl.sections[1].items[0].order, 0);
        assert!(tl.check_invariants().is_ok());
    }

    #[test]
    fn duplicate_members_are_placed_once() {
        let mut tl = mirrored();
        let outcome = synchronize(&mut tl, &source(&[4, 4, 5])).unwrap();
        assert_eq!(outcome.added, [4, 5]);
        assert_eq!(tl.item_count(), 2);
    }

    #[test]
    fn empty_source_clears_the_list() {
        let mut tl = mirrored();
        synchronize(&mut tl, &source(&[1, 2])).unwrap();
        let outcome = synchronize(&mut tl, &source(&[])).unwrap();
        assert_eq!(outcome.removed, [1, 2]);
        assert_eq!(tl.item_count(), 0);
    }

    #[test]
    fn profile_lists_and_foreign_sources_are_rejected() {
        let mut profile = saved_tier_list(TierListKind::ProfileGlobal);
        assert_matches!(
            synchronize(&mut profile, &source(&[1])),
            Err(CoreError::InvalidOperation(_))
        );

        let mut tl = mirrored();
        let mut other = source(&[1]);
        other.id = 99;
        assert_matches!(
            synchronize(&mut tl, &other),
            Err(CoreError::InvalidOperation(_))
        );
        assert_eq!(tl.item_count(), 0);
    }

    #[test]
    fn stale_items_cannot_be_moved() {
        let mut tl = mirrored();
        synchronize(&mut tl, &source(&[1, 2])).unwrap();
        assign_item_ids(&mut tl);
        let (s, i) = tl.locate_entry(2).unwrap();
        let stale = tl.sections[s].items[i].id.unwrap();

        let shrunk = source(&[1]);
        assert_matches!(
            ensure_still_mirrored(&tl, stale, &shrunk),
            Err(CoreError::InvalidOperation(_))
        );
        let (s, i) = tl.locate_entry(1).unwrap();
        let fresh = tl.sections[s].items[i].id.unwrap();
        assert!(ensure_still_mirrored(&tl, fresh, &shrunk).is_ok());
    }
}
