//! Caller identity primitives.
//!
//! - [`jwt`] -- HS256 access-token validation (and issuing, for collaborators and tests).

pub mod jwt;
