//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument.

pub mod game_list_repo;
pub mod library_entry_repo;
pub mod tier_list_repo;

pub use game_list_repo::GameListRepo;
pub use library_entry_repo::LibraryEntryRepo;
pub use tier_list_repo::TierListRepo;
