//! Read-only repository for `library_entries`.

use gamerank_core::tier_list::LibraryEntryRef;
use gamerank_core::types::DbId;
use sqlx::PgPool;

use crate::models::library_entry::{LibraryEntryGame, LibraryEntryOwner};

/// Lookups the tier list engine needs from the user's library.
pub struct LibraryEntryRepo;

impl LibraryEntryRepo {
    /// Resolve a library entry to its owner, or `None` if it does not exist.
    pub async fn find_ref(pool: &PgPool, id: DbId) -> Result<Option<LibraryEntryRef>, sqlx::Error> {
        let row = sqlx::query_as::<_, LibraryEntryOwner>(
            "SELECT id, user_id FROM library_entries WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(LibraryEntryRef::from))
    }

    /// Game display data for a batch of library entries. Unknown ids are skipped.
    pub async fn list_games(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<LibraryEntryGame>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, LibraryEntryGame>(
            "SELECT le.id AS library_entry_id, g.id AS game_id, \
                    g.name AS game_name, g.cover_url AS game_cover_url \
             FROM library_entries le \
             JOIN games g ON g.id = le.game_id \
             WHERE le.id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }
}
