//! Item placement engine: put a library entry into a section, move it, or
//! take it out.
//!
//! A library entry occupies at most one item per tier list. Placing an entry
//! that is already placed relocates the existing item (keeping its id) rather
//! than creating a duplicate.

use crate::error::CoreError;
use crate::types::DbId;

use super::ordering::{insertion_index, reindex};
use super::{Item, LibraryEntryRef, TierList};

/// How a placement request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// A new item was created.
    Added,
    /// An existing item for the same entry was moved into place.
    Relocated,
}

impl Placement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Placement::Added => "added",
            Placement::Relocated => "relocated",
        }
    }
}

/// Place a library entry into a user-defined section.
///
/// The unclassified section has its own entry point,
/// [`add_item_to_unclassified`].
pub fn add_item_to_section(
    tier_list: &mut TierList,
    section_id: DbId,
    entry: &LibraryEntryRef,
    requested_order: Option<i32>,
) -> Result<Placement, CoreError> {
    tier_list.ensure_membership_editable()?;

    let target = tier_list.section_index(section_id)?;
    if tier_list.sections[target].is_unclassified {
        return Err(CoreError::InvalidOperation(
            "Use the unclassified endpoint to add games to the unclassified section".to_string(),
        ));
    }

    place_entry(tier_list, target, entry, requested_order)
}

/// Place a library entry into the unclassified section.
pub fn add_item_to_unclassified(
    tier_list: &mut TierList,
    entry: &LibraryEntryRef,
    requested_order: Option<i32>,
) -> Result<Placement, CoreError> {
    tier_list.ensure_membership_editable()?;

    let target = tier_list.unclassified_index()?;
    place_entry(tier_list, target, entry, requested_order)
}

fn place_entry(
    tier_list: &mut TierList,
    target: usize,
    entry: &LibraryEntryRef,
    requested_order: Option<i32>,
) -> Result<Placement, CoreError> {
    if entry.owner_id != tier_list.owner_id {
        return Err(CoreError::Unauthorized(format!(
            "Library entry {} does not belong to the owner of the tier list",
            entry.id
        )));
    }

    let (item, placement) = match tier_list.locate_entry(entry.id) {
        Some((section_idx, item_idx)) => {
            let item = tier_list.sections[section_idx].items.remove(item_idx);
            if section_idx != target {
                reindex(&mut tier_list.sections[section_idx].items);
            }
            (item, Placement::Relocated)
        }
        None => (Item::new(entry.id), Placement::Added),
    };

    let items = &mut tier_list.sections[target].items;
    let at = insertion_index(requested_order, items.len());
    items.insert(at, item);
    reindex(items);

    Ok(placement)
}

/// Move an item to `new_order` within `target_section_id`.
///
/// The target may be the item's current section (pure reorder). Allowed for
/// every tier list kind since it does not change membership.
pub fn move_item(
    tier_list: &mut TierList,
    item_id: DbId,
    target_section_id: DbId,
    new_order: i32,
) -> Result<(), CoreError> {
    let (source, item_idx) = tier_list.locate_item(item_id)?;
    let target = tier_list.section_index(target_section_id)?;

    let item = tier_list.sections[source].items.remove(item_idx);
    if source != target {
        reindex(&mut tier_list.sections[source].items);
    }

    let items = &mut tier_list.sections[target].items;
    let at = insertion_index(Some(new_order), items.len());
    items.insert(at, item);
    reindex(items);

    Ok(())
}

/// Delete an item from whichever section holds it.
pub fn remove_item(tier_list: &mut TierList, item_id: DbId) -> Result<Item, CoreError> {
    tier_list.ensure_membership_editable()?;

    let (section_idx, item_idx) = tier_list.locate_item(item_id)?;
    let items = &mut tier_list.sections[section_idx].items;
    let removed = items.remove(item_idx);
    reindex(items);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::tier_list::sections::remove_section;
    use crate::tier_list::test_support::*;
    use crate::tier_list::TierListKind;

    const SECTION_S: DbId = 11;
    const SECTION_A: DbId = 12;

    fn profile() -> TierList {
        saved_tier_list(TierListKind::ProfileGlobal)
    }

    fn mirrored() -> TierList {
        saved_tier_list(TierListKind::FromCollection { source_list_id: 3 })
    }

    fn item_id_of(tl: &TierList, entry_id: DbId) -> DbId {
        let (s, i) = tl.locate_entry(entry_id).unwrap();
        tl.sections[s].items[i].id.unwrap()
    }

    #[test]
    fn scenario_b_unclassified_appends_in_call_order() {
        let mut tl = profile();
        assert_eq!(
            add_item_to_unclassified(&mut tl, &entry(1), None).unwrap(),
            Placement::Added
        );
        assert_eq!(tl.sections[0].items[0].order, 0);

        add_item_to_unclassified(&mut tl, &entry(2), None).unwrap();
        assert_eq!(entries(&tl, 0), [1, 2]);
        assert_eq!(tl.sections[0].items[1].order, 1);
    }

    #[test]
    fn scenario_c_move_into_empty_section() {
        let mut tl = profile();
        add_item_to_unclassified(&mut tl, &entry(1), None).unwrap();
        add_item_to_unclassified(&mut tl, &entry(2), None).unwrap();
        assign_item_ids(&mut tl);

        let item_id = item_id_of(&tl, 1);
        move_item(&mut tl, item_id, SECTION_S, 0).unwrap();

        assert_eq!(entries(&tl, 1), [1]);
        assert_eq!(entries(&tl, 0), [2]);
        assert_eq!(tl.sections[0].items[0].order, 0);
        assert!(tl.check_invariants().is_ok());
    }

    #[test]
    fn scenario_d_remove_section_returns_items_to_unclassified() {
        let mut tl = profile();
        add_item_to_unclassified(&mut tl, &entry(1), None).unwrap();
        add_item_to_unclassified(&mut tl, &entry(2), None).unwrap();
        assign_item_ids(&mut tl);
        let item_id = item_id_of(&tl, 1);
        move_item(&mut tl, item_id, SECTION_S, 0).unwrap();

        remove_section(&mut tl, SECTION_S).unwrap();

        assert_eq!(entries(&tl, 0), [2, 1]);
        let orders: Vec<_> = tl.sections.iter().map(|s| s.order).collect();
        assert_eq!(orders, [0, 1, 2, 3, 4]);
        assert!(tl.check_invariants().is_ok());
    }

    #[test]
    fn add_to_section_honours_requested_order() {
        let mut tl = profile();
        for e in [1, 2, 3] {
            add_item_to_section(&mut tl, SECTION_S, &entry(e), None).unwrap();
        }
        add_item_to_section(&mut tl, SECTION_S, &entry(4), Some(1)).unwrap();
        assert_eq!(entries(&tl, 1), [1, 4, 2, 3]);

        add_item_to_section(&mut tl, SECTION_S, &entry(5), Some(-3)).unwrap();
        add_item_to_section(&mut tl, SECTION_S, &entry(6), Some(99)).unwrap();
        assert_eq!(entries(&tl, 1), [1, 4, 2, 3, 5, 6]);
        assert!(tl.check_invariants().is_ok());
    }

    #[test]
    fn placing_a_placed_entry_relocates_it() {
        let mut tl = profile();
        add_item_to_unclassified(&mut tl, &entry(1), None).unwrap();
        add_item_to_unclassified(&mut tl, &entry(2), None).unwrap();
        assign_item_ids(&mut tl);
        let original_id = item_id_of(&tl, 1);

        let placement = add_item_to_section(&mut tl, SECTION_A, &entry(1), None).unwrap();

        assert_eq!(placement, Placement::Relocated);
        assert_eq!(tl.item_count(), 2);
        assert_eq!(entries(&tl, 0), [2]);
        assert_eq!(entries(&tl, 2), [1]);
        assert_eq!(item_id_of(&tl, 1), original_id);
        assert!(tl.check_invariants().is_ok());
    }

    #[test]
    fn re_adding_within_same_section_reorders() {
        let mut tl = profile();
        for e in [1, 2, 3] {
            add_item_to_section(&mut tl, SECTION_S, &entry(e), None).unwrap();
        }
        add_item_to_section(&mut tl, SECTION_S, &entry(3), Some(0)).unwrap();
        assert_eq!(entries(&tl, 1), [3, 1, 2]);
        assert_eq!(tl.item_count(), 3);
    }

    #[test]
    fn add_to_section_rejects_unclassified_target() {
        let mut tl = profile();
        assert_matches!(
            add_item_to_section(&mut tl, 10, &entry(1), None),
            Err(CoreError::InvalidOperation(_))
        );
    }

    #[test]
    fn foreign_library_entry_is_unauthorized() {
        let mut tl = profile();
        let foreign = LibraryEntryRef {
            id: 1,
            owner_id: OTHER_USER,
        };
        assert_matches!(
            add_item_to_unclassified(&mut tl, &foreign, None),
            Err(CoreError::Unauthorized(_))
        );
        assert_matches!(
            add_item_to_section(&mut tl, SECTION_S, &foreign, None),
            Err(CoreError::Unauthorized(_))
        );
        assert_eq!(tl.item_count(), 0);
    }

    #[test]
    fn mirrored_lists_reject_membership_changes() {
        let mut tl = mirrored();
        assert_matches!(
            add_item_to_unclassified(&mut tl, &entry(1), None),
            Err(CoreError::InvalidOperation(_))
        );
        assert_matches!(
            add_item_to_section(&mut tl, SECTION_S, &entry(1), None),
            Err(CoreError::InvalidOperation(_))
        );

        tl.sections[0].items.push(Item::new(1));
        assign_item_ids(&mut tl);
        let item_id = item_id_of(&tl, 1);
        assert_matches!(
            remove_item(&mut tl, item_id),
            Err(CoreError::InvalidOperation(_))
        );
    }

    #[test]
    fn mirrored_lists_allow_moves() {
        let mut tl = mirrored();
        tl.sections[0].items.push(Item::new(1));
        assign_item_ids(&mut tl);

        let item_id = item_id_of(&tl, 1);
        move_item(&mut tl, item_id, SECTION_A, 0).unwrap();
        assert_eq!(entries(&tl, 2), [1]);
    }

    #[test]
    fn move_within_section_and_clamping() {
        let mut tl = profile();
        for e in [1, 2, 3, 4] {
            add_item_to_section(&mut tl, SECTION_S, &entry(e), None).unwrap();
        }
        assign_item_ids(&mut tl);

        let item_id = item_id_of(&tl, 1);
        move_item(&mut tl, item_id, SECTION_S, 2).unwrap();
        assert_eq!(entries(&tl, 1), [2, 3, 1, 4]);

        let item_id = item_id_of(&tl, 2);
        move_item(&mut tl, item_id, SECTION_S, -1).unwrap();
        assert_eq!(entries(&tl, 1), [3, 1, 4, 2]);

        let item_id = item_id_of(&tl, 4);
        move_item(&mut tl, item_id, SECTION_S, 50).unwrap();
        assert_eq!(entries(&tl, 1), [3, 1, 2, 4]);
        assert!(tl.check_invariants().is_ok());
    }

    #[test]
    fn move_with_unknown_target_leaves_item_in_place() {
        let mut tl = profile();
        add_item_to_unclassified(&mut tl, &entry(1), None).unwrap();
        assign_item_ids(&mut tl);

        let item_id = item_id_of(&tl, 1);
        assert_matches!(
            move_item(&mut tl, item_id, 404, 0),
            Err(CoreError::NotFound { entity: "TierSection", .. })
        );
        assert_eq!(entries(&tl, 0), [1]);

        assert_matches!(
            move_item(&mut tl, 404, SECTION_S, 0),
            Err(CoreError::NotFound { entity: "TierListItem", .. })
        );
    }

    #[test]
    fn remove_item_reindexes_section() {
        let mut tl = profile();
        for e in [1, 2, 3] {
            add_item_to_section(&mut tl, SECTION_S, &entry(e), None).unwrap();
        }
        assign_item_ids(&mut tl);

        let item_id = item_id_of(&tl, 2);
        let removed = remove_item(&mut tl, item_id).unwrap();
        assert_eq!(removed.library_entry_id, 2);
        assert_eq!(entries(&tl, 1), [1, 3]);
        assert!(tl.check_invariants().is_ok());

        assert_matches!(remove_item(&mut tl, 404), Err(CoreError::NotFound { .. }));
    }

    /// Drive a long deterministic sequence of mixed operations and check that
    /// ordering and uniqueness hold after every step.
    #[test]
    fn invariants_hold_across_mixed_operations() {
        let mut tl = profile();
        let sections = [11, 12, 13, 14, 15];
        let mut seed: u64 = 0x9E37_79B9;
        let mut next = || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };

        for _ in 0..400 {
            let roll = next();
            let entry_id = (next() % 12) as DbId + 1;
            let order = (next() % 8) as i32 - 2;
            let section = sections[(next() % sections.len() as u64) as usize];

            let _ = match roll % 4 {
                0 => add_item_to_unclassified(&mut tl, &entry(entry_id), Some(order)).map(|_| ()),
                1 => add_item_to_section(&mut tl, section, &entry(entry_id), Some(order))
                    .map(|_| ()),
                2 => match tl.locate_entry(entry_id) {
                    Some(_) => {
                        assign_item_ids(&mut tl);
                        let item_id = item_id_of(&tl, entry_id);
                        move_item(&mut tl, item_id, section, order)
                    }
                    None => Ok(()),
                },
                _ => match tl.locate_entry(entry_id) {
                    Some(_) => {
                        assign_item_ids(&mut tl);
                        let item_id = item_id_of(&tl, entry_id);
                        remove_item(&mut tl, item_id).map(|_| ())
                    }
                    None => Ok(()),
                },
            };

            tl.check_invariants().unwrap();
        }
    }
}
