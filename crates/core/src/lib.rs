//! Domain core for game tier lists.
//!
//! Everything in this crate is pure, in-memory logic with no I/O. The `db`
//! crate loads and saves aggregates; the `api` crate wires both to HTTP.

pub mod error;
pub mod pagination;
pub mod tier_list;
pub mod types;
