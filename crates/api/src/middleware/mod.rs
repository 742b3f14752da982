//! Request extractors.
//!
//! - [`auth::AuthUser`] -- Requires a valid JWT Bearer token.
//! - [`auth::MaybeAuthUser`] -- Accepts anonymous callers, rejects bad tokens.

pub mod auth;
