//! Read views over `game_lists` and their memberships.

use gamerank_core::tier_list::SourceCollection;
use gamerank_core::types::{DbId, Timestamp};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `game_lists` table.
#[derive(Debug, Clone, FromRow)]
pub struct GameList {
    pub id: DbId,
    pub public_id: Uuid,
    pub owner_id: DbId,
    pub name: String,
    pub is_public: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl GameList {
    /// Combine the row with its member library entry ids, in list order.
    pub fn into_source(self, member_ids: Vec<DbId>) -> SourceCollection {
        SourceCollection {
            id: self.id,
            public_id: self.public_id,
            owner_id: self.owner_id,
            name: self.name,
            is_public: self.is_public,
            member_ids,
        }
    }
}
