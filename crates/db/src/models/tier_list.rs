//! Tier list aggregate rows and their assembly into the core aggregate.

use std::collections::HashMap;

use gamerank_core::error::CoreError;
use gamerank_core::tier_list::{Item, Section, TierList, TierListKind};
use gamerank_core::types::{DbId, Timestamp};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from `tier_lists`, joined with the owner's username and the source
/// game list's public id.
#[derive(Debug, Clone, FromRow)]
pub struct TierListRow {
    pub id: DbId,
    pub public_id: Uuid,
    pub owner_id: DbId,
    pub owner_username: String,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub kind: String,
    pub source_game_list_id: Option<DbId>,
    pub source_game_list_public_id: Option<Uuid>,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from `tier_sections`.
#[derive(Debug, Clone, FromRow)]
pub struct TierSectionRow {
    pub id: DbId,
    pub tier_list_id: DbId,
    pub name: String,
    pub color: Option<String>,
    pub sort_order: i32,
    pub is_unclassified: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from `tier_list_items`.
#[derive(Debug, Clone, FromRow)]
pub struct TierListItemRow {
    pub id: DbId,
    pub tier_list_id: DbId,
    pub section_id: DbId,
    pub library_entry_id: DbId,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A fully loaded aggregate plus display fields from collaborator tables.
#[derive(Debug, Clone)]
pub struct StoredTierList {
    pub tier_list: TierList,
    pub owner_username: String,
    pub source_game_list_public_id: Option<Uuid>,
}

impl StoredTierList {
    /// Build the aggregate from one root row and all of its child rows.
    ///
    /// Sections must arrive unclassified first, then by `sort_order`; items by
    /// `sort_order`. Stored orders are kept as-is so that corrupt data is
    /// caught by the invariant check before the next save.
    pub fn assemble(
        row: TierListRow,
        sections: Vec<TierSectionRow>,
        items: Vec<TierListItemRow>,
    ) -> Result<Self, CoreError> {
        let kind = TierListKind::from_columns(&row.kind, row.source_game_list_id)?;

        let mut index_by_id: HashMap<DbId, usize> = HashMap::with_capacity(sections.len());
        let mut built: Vec<Section> = Vec::with_capacity(sections.len());
        for (idx, s) in sections.into_iter().enumerate() {
            index_by_id.insert(s.id, idx);
            built.push(Section {
                id: Some(s.id),
                name: s.name,
                color: s.color,
                order: s.sort_order,
                is_unclassified: s.is_unclassified,
                items: Vec::new(),
            });
        }

        for item in items {
            let idx = index_by_id.get(&item.section_id).copied().ok_or_else(|| {
                CoreError::IllegalState(format!(
                    "Item {} references section {} outside tier list {}",
                    item.id, item.section_id, row.public_id
                ))
            })?;
            built[idx].items.push(Item {
                id: Some(item.id),
                library_entry_id: item.library_entry_id,
                order: item.sort_order,
            });
        }

        Ok(Self {
            tier_list: TierList {
                id: row.id,
                public_id: row.public_id,
                owner_id: row.owner_id,
                name: row.name,
                description: row.description,
                is_public: row.is_public,
                kind,
                version: row.version,
                created_at: row.created_at,
                updated_at: row.updated_at,
                sections: built,
            },
            owner_username: row.owner_username,
            source_game_list_public_id: row.source_game_list_public_id,
        })
    }
}
