//! Read-only repository for `game_lists` and `game_list_entries`.

use gamerank_core::tier_list::SourceCollection;
use gamerank_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::game_list::GameList;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, public_id, owner_id, name, is_public, created_at, updated_at";

/// Source collections consumed by mirrored tier lists.
pub struct GameListRepo;

impl GameListRepo {
    /// Find a game list by its public UUID.
    pub async fn find_by_public_id(
        pool: &PgPool,
        public_id: Uuid,
    ) -> Result<Option<GameList>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM game_lists WHERE public_id = $1");
        sqlx::query_as::<_, GameList>(&query)
            .bind(public_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a game list by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<GameList>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM game_lists WHERE id = $1");
        sqlx::query_as::<_, GameList>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Member library entry ids of a game list, in list order.
    pub async fn list_member_ids(pool: &PgPool, game_list_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT library_entry_id FROM game_list_entries \
             WHERE game_list_id = $1 \
             ORDER BY position, id",
        )
        .bind(game_list_id)
        .fetch_all(pool)
        .await
    }

    /// Load a game list together with its current membership.
    pub async fn find_source_by_public_id(
        pool: &PgPool,
        public_id: Uuid,
    ) -> Result<Option<SourceCollection>, sqlx::Error> {
        match Self::find_by_public_id(pool, public_id).await? {
            Some(list) => {
                let members = Self::list_member_ids(pool, list.id).await?;
                Ok(Some(list.into_source(members)))
            }
            None => Ok(None),
        }
    }

    /// Load a game list by internal ID together with its current membership.
    pub async fn find_source_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<SourceCollection>, sqlx::Error> {
        match Self::find_by_id(pool, id).await? {
            Some(list) => {
                let members = Self::list_member_ids(pool, list.id).await?;
                Ok(Some(list.into_source(members)))
            }
            None => Ok(None),
        }
    }
}
