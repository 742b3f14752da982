//! Row models and read views.
//!
//! Each submodule contains `FromRow` structs matching database rows. Writes
//! go through the core aggregate rather than per-table DTOs.

pub mod game_list;
pub mod library_entry;
pub mod tier_list;
