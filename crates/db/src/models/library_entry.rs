//! Read views over `library_entries`.

use gamerank_core::tier_list::LibraryEntryRef;
use gamerank_core::types::DbId;
use sqlx::FromRow;

/// Ownership slice of a library entry.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct LibraryEntryOwner {
    pub id: DbId,
    pub user_id: DbId,
}

impl From<LibraryEntryOwner> for LibraryEntryRef {
    fn from(row: LibraryEntryOwner) -> Self {
        LibraryEntryRef {
            id: row.id,
            owner_id: row.user_id,
        }
    }
}

/// Game display data for a library entry.
#[derive(Debug, Clone, FromRow)]
pub struct LibraryEntryGame {
    pub library_entry_id: DbId,
    pub game_id: DbId,
    pub game_name: String,
    pub game_cover_url: Option<String>,
}
