//! Repository for the tier list aggregate (`tier_lists`, `tier_sections`,
//! `tier_list_items`).
//!
//! The aggregate is the unit of persistence: it is loaded with all of its
//! sections and items, and saved back in a single transaction. Sections and
//! items are never written on their own.

use std::collections::HashMap;

use gamerank_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use gamerank_core::tier_list::lifecycle::NewTierList;
use gamerank_core::tier_list::{Item, Section, TierList, KIND_PROFILE_GLOBAL};
use gamerank_core::types::DbId;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::tier_list::{StoredTierList, TierListItemRow, TierListRow, TierSectionRow};

/// Root columns, joined with the owner and the source game list.
const COLUMNS: &str = "tl.id, tl.public_id, tl.owner_id, u.username AS owner_username, \
    tl.name, tl.description, tl.is_public, tl.kind, tl.source_game_list_id, \
    gl.public_id AS source_game_list_public_id, tl.version, tl.created_at, tl.updated_at";

const FROM: &str = "tier_lists tl \
    JOIN users u ON u.id = tl.owner_id \
    LEFT JOIN game_lists gl ON gl.id = tl.source_game_list_id";

const SECTION_COLUMNS: &str =
    "id, tier_list_id, name, color, sort_order, is_unclassified, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "id, tier_list_id, section_id, library_entry_id, sort_order, created_at, updated_at";

/// Loads and saves whole tier list aggregates.
pub struct TierListRepo;

impl TierListRepo {
    /// Insert a new tier list with its sections (and any items), returning the
    /// stored aggregate.
    pub async fn create(pool: &PgPool, input: &NewTierList) -> Result<StoredTierList, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id: DbId = sqlx::query_scalar(
            "INSERT INTO tier_lists \
                (public_id, owner_id, name, description, is_public, kind, source_game_list_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(input.owner_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.is_public)
        .bind(input.kind.as_str())
        .bind(input.kind.source_list_id())
        .fetch_one(&mut *tx)
        .await?;

        for section in &input.sections {
            let section_id = insert_section(&mut tx, id, section).await?;
            for item in &section.items {
                insert_item(&mut tx, id, section_id, item).await?;
            }
        }

        tx.commit().await?;
        tracing::debug!(tier_list_id = id, kind = input.kind.as_str(), "Tier list inserted");

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Load a tier list by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<StoredTierList>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE tl.id = $1");
        let row = sqlx::query_as::<_, TierListRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Self::load_one(pool, row).await
    }

    /// Load a tier list by its public UUID.
    pub async fn find_by_public_id(
        pool: &PgPool,
        public_id: Uuid,
    ) -> Result<Option<StoredTierList>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE tl.public_id = $1");
        let row = sqlx::query_as::<_, TierListRow>(&query)
            .bind(public_id)
            .fetch_optional(pool)
            .await?;
        Self::load_one(pool, row).await
    }

    /// Load the tier list mirroring the given game list, if one exists.
    pub async fn find_by_source_game_list(
        pool: &PgPool,
        game_list_id: DbId,
    ) -> Result<Option<StoredTierList>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE tl.source_game_list_id = $1");
        let row = sqlx::query_as::<_, TierListRow>(&query)
            .bind(game_list_id)
            .fetch_optional(pool)
            .await?;
        Self::load_one(pool, row).await
    }

    /// An owner's `PROFILE_GLOBAL` tier lists, newest first.
    pub async fn list_profile_by_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<StoredTierList>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {FROM} \
             WHERE tl.owner_id = $1 AND tl.kind = $2 \
             ORDER BY tl.created_at DESC, tl.id DESC"
        );
        let rows = sqlx::query_as::<_, TierListRow>(&query)
            .bind(owner_id)
            .bind(KIND_PROFILE_GLOBAL)
            .fetch_all(pool)
            .await?;
        Self::load_all(pool, rows).await
    }

    /// Public tier lists of any kind, newest first.
    ///
    /// `limit` defaults to 50 and is clamped to `1..=100`; `offset` to `>= 0`.
    pub async fn list_public(
        pool: &PgPool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<StoredTierList>, sqlx::Error> {
        let limit = clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset = clamp_offset(offset);
        let query = format!(
            "SELECT {COLUMNS} FROM {FROM} \
             WHERE tl.is_public = true \
             ORDER BY tl.created_at DESC, tl.id DESC \
             LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, TierListRow>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
        Self::load_all(pool, rows).await
    }

    /// Persist the whole aggregate in one transaction.
    ///
    /// The root row is only written if its stored version still equals
    /// `tier_list.version`; the version is bumped by one. Returns `false` (and
    /// writes nothing) when another save got there first. The `kind` and
    /// source columns are never written.
    pub async fn save(pool: &PgPool, tier_list: &TierList) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let bumped = sqlx::query(
            "UPDATE tier_lists SET \
                name = $2, \
                description = $3, \
                is_public = $4, \
                version = version + 1, \
                updated_at = NOW() \
             WHERE id = $1 AND version = $5",
        )
        .bind(tier_list.id)
        .bind(&tier_list.name)
        .bind(&tier_list.description)
        .bind(tier_list.is_public)
        .bind(tier_list.version)
        .execute(&mut *tx)
        .await?;

        if bumped.rows_affected() == 0 {
            tracing::debug!(
                tier_list_id = tier_list.id,
                version = tier_list.version,
                "Stale tier list save rejected"
            );
            return Ok(false);
        }

        let kept_items: Vec<DbId> = tier_list
            .sections
            .iter()
            .flat_map(|s| s.items.iter().filter_map(|i| i.id))
            .collect();
        sqlx::query("DELETE FROM tier_list_items WHERE tier_list_id = $1 AND id <> ALL($2)")
            .bind(tier_list.id)
            .bind(&kept_items)
            .execute(&mut *tx)
            .await?;

        let mut kept_sections = Vec::with_capacity(tier_list.sections.len());
        for section in &tier_list.sections {
            let section_id = match section.id {
                Some(id) => {
                    update_section(&mut tx, tier_list.id, id, section).await?;
                    id
                }
                None => insert_section(&mut tx, tier_list.id, section).await?,
            };
            kept_sections.push(section_id);

            for item in &section.items {
                match item.id {
                    Some(id) => update_item(&mut tx, tier_list.id, id, section_id, item).await?,
                    None => {
                        insert_item(&mut tx, tier_list.id, section_id, item).await?;
                    }
                }
            }
        }

        sqlx::query("DELETE FROM tier_sections WHERE tier_list_id = $1 AND id <> ALL($2)")
            .bind(tier_list.id)
            .bind(&kept_sections)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Delete a tier list; sections and items cascade. Returns `true` if a row
    /// was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tier_lists WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn load_one(
        pool: &PgPool,
        row: Option<TierListRow>,
    ) -> Result<Option<StoredTierList>, sqlx::Error> {
        match row {
            Some(row) => Ok(Self::load_all(pool, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Fetch the children of every root row with one query per table and
    /// assemble the aggregates, preserving the order of `rows`.
    async fn load_all(
        pool: &PgPool,
        rows: Vec<TierListRow>,
    ) -> Result<Vec<StoredTierList>, sqlx::Error> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();

        let query = format!(
            "SELECT {SECTION_COLUMNS} FROM tier_sections \
             WHERE tier_list_id = ANY($1) \
             ORDER BY tier_list_id, is_unclassified DESC, sort_order, id"
        );
        let sections = sqlx::query_as::<_, TierSectionRow>(&query)
            .bind(&ids)
            .fetch_all(pool)
            .await?;

        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM tier_list_items \
             WHERE tier_list_id = ANY($1) \
             ORDER BY section_id, sort_order, id"
        );
        let items = sqlx::query_as::<_, TierListItemRow>(&query)
            .bind(&ids)
            .fetch_all(pool)
            .await?;

        let mut sections_by_list: HashMap<DbId, Vec<TierSectionRow>> = HashMap::new();
        for section in sections {
            sections_by_list
                .entry(section.tier_list_id)
                .or_default()
                .push(section);
        }
        let mut items_by_list: HashMap<DbId, Vec<TierListItemRow>> = HashMap::new();
        for item in items {
            items_by_list.entry(item.tier_list_id).or_default().push(item);
        }

        rows.into_iter()
            .map(|row| {
                let id = row.id;
                StoredTierList::assemble(
                    row,
                    sections_by_list.remove(&id).unwrap_or_default(),
                    items_by_list.remove(&id).unwrap_or_default(),
                )
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))
            })
            .collect()
    }
}

async fn insert_section(
    conn: &mut PgConnection,
    tier_list_id: DbId,
    section: &Section,
) -> Result<DbId, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO tier_sections (tier_list_id, name, color, sort_order, is_unclassified) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id",
    )
    .bind(tier_list_id)
    .bind(&section.name)
    .bind(&section.color)
    .bind(section.order)
    .bind(section.is_unclassified)
    .fetch_one(&mut *conn)
    .await
}

/// Rewrite a section's fields, touching `updated_at` only when something changed.
async fn update_section(
    conn: &mut PgConnection,
    tier_list_id: DbId,
    id: DbId,
    section: &Section,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE tier_sections SET \
            name = $3, color = $4, sort_order = $5, updated_at = NOW() \
         WHERE id = $1 AND tier_list_id = $2 \
           AND (name, color, sort_order) IS DISTINCT FROM ($3, $4, $5)",
    )
    .bind(id)
    .bind(tier_list_id)
    .bind(&section.name)
    .bind(&section.color)
    .bind(section.order)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_item(
    conn: &mut PgConnection,
    tier_list_id: DbId,
    section_id: DbId,
    item: &Item,
) -> Result<DbId, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO tier_list_items (tier_list_id, section_id, library_entry_id, sort_order) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(tier_list_id)
    .bind(section_id)
    .bind(item.library_entry_id)
    .bind(item.order)
    .fetch_one(&mut *conn)
    .await
}

/// Move an item to its current section and position if either changed.
async fn update_item(
    conn: &mut PgConnection,
    tier_list_id: DbId,
    id: DbId,
    section_id: DbId,
    item: &Item,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE tier_list_items SET \
            section_id = $3, sort_order = $4, updated_at = NOW() \
         WHERE id = $1 AND tier_list_id = $2 \
           AND (section_id <> $3 OR sort_order <> $4)",
    )
    .bind(id)
    .bind(tier_list_id)
    .bind(section_id)
    .bind(item.order)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
