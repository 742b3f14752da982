//! Response shapes for tier lists.
//!
//! Every mutation answers with the full tier list: user sections in display
//! order, the unclassified section on its own, and each item enriched with
//! the game it stands for.

use std::collections::HashMap;

use gamerank_core::error::CoreError;
use gamerank_core::tier_list::{Item, Section};
use gamerank_core::types::{DbId, Timestamp};
use gamerank_db::models::library_entry::LibraryEntryGame;
use gamerank_db::models::tier_list::StoredTierList;
use gamerank_db::repositories::LibraryEntryRepo;
use gamerank_db::DbPool;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;

#[derive(Debug, Serialize)]
pub struct TierListResponse {
    pub public_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub kind: &'static str,
    pub source_game_list_public_id: Option<Uuid>,
    pub owner_username: String,
    pub is_public: bool,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub sections: Vec<SectionResponse>,
    pub unclassified_section: SectionResponse,
}

#[derive(Debug, Serialize)]
pub struct SectionResponse {
    pub id: DbId,
    pub name: String,
    pub color: Option<String>,
    pub order: i32,
    pub is_unclassified: bool,
    pub items: Vec<ItemResponse>,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: DbId,
    pub library_entry_id: DbId,
    pub game_id: Option<DbId>,
    pub game_name: Option<String>,
    pub game_cover_url: Option<String>,
    pub order: i32,
}

/// Render one stored tier list, fetching game data for its items.
pub async fn render(pool: &DbPool, stored: StoredTierList) -> AppResult<TierListResponse> {
    let mut rendered = render_many(pool, vec![stored]).await?;
    rendered
        .pop()
        .ok_or_else(|| CoreError::IllegalState("Rendered no tier list".into()).into())
}

/// Render several tier lists with a single game-data lookup.
pub async fn render_many(
    pool: &DbPool,
    stored: Vec<StoredTierList>,
) -> AppResult<Vec<TierListResponse>> {
    let entry_ids: Vec<DbId> = stored
        .iter()
        .flat_map(|s| s.tier_list.sections.iter())
        .flat_map(|s| s.items.iter().map(|i| i.library_entry_id))
        .collect();
    let games: HashMap<DbId, LibraryEntryGame> = LibraryEntryRepo::list_games(pool, &entry_ids)
        .await?
        .into_iter()
        .map(|g| (g.library_entry_id, g))
        .collect();

    let rendered = stored
        .into_iter()
        .map(|s| build(s, &games))
        .collect::<Result<Vec<_>, CoreError>>()?;
    Ok(rendered)
}

/// Shape a loaded aggregate into its response. Every section and item must
/// already be saved.
pub fn build(
    stored: StoredTierList,
    games: &HashMap<DbId, LibraryEntryGame>,
) -> Result<TierListResponse, CoreError> {
    let StoredTierList {
        tier_list,
        owner_username,
        source_game_list_public_id,
    } = stored;

    let unclassified_idx = tier_list.unclassified_index()?;
    let kind = tier_list.kind.as_str();

    let mut unclassified = None;
    let mut sections = Vec::with_capacity(tier_list.sections.len().saturating_sub(1));
    for (idx, section) in tier_list.sections.into_iter().enumerate() {
        let view = section_view(section, games)?;
        if idx == unclassified_idx {
            unclassified = Some(view);
        } else {
            sections.push(view);
        }
    }
    sections.sort_by_key(|s| s.order);
    let unclassified_section = unclassified.ok_or_else(|| {
        CoreError::IllegalState(format!(
            "Tier list {} has no unclassified section",
            tier_list.public_id
        ))
    })?;

    Ok(TierListResponse {
        public_id: tier_list.public_id,
        name: tier_list.name,
        description: tier_list.description,
        kind,
        source_game_list_public_id,
        owner_username,
        is_public: tier_list.is_public,
        version: tier_list.version,
        created_at: tier_list.created_at,
        updated_at: tier_list.updated_at,
        sections,
        unclassified_section,
    })
}

fn section_view(
    section: Section,
    games: &HashMap<DbId, LibraryEntryGame>,
) -> Result<SectionResponse, CoreError> {
    let id = saved_id(section.id, "TierSection")?;
    let items = section
        .items
        .into_iter()
        .map(|item| item_view(item, games))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SectionResponse {
        id,
        name: section.name,
        color: section.color,
        order: section.order,
        is_unclassified: section.is_unclassified,
        items,
    })
}

fn item_view(
    item: Item,
    games: &HashMap<DbId, LibraryEntryGame>,
) -> Result<ItemResponse, CoreError> {
    let game = games.get(&item.library_entry_id);
    Ok(ItemResponse {
        id: saved_id(item.id, "TierListItem")?,
        library_entry_id: item.library_entry_id,
        game_id: game.map(|g| g.game_id),
        game_name: game.map(|g| g.game_name.clone()),
        game_cover_url: game.and_then(|g| g.game_cover_url.clone()),
        order: item.order,
    })
}

fn saved_id(id: Option<DbId>, entity: &str) -> Result<DbId, CoreError> {
    id.ok_or_else(|| CoreError::IllegalState(format!("{entity} rendered before it was saved")))
}
