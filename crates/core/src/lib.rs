//! Domain core for the playlist/track catalogue.
//!
//! Pure logic only: shared id types, the error taxonomy, input validation
//! and the membership reconciler. Nothing in this crate performs I/O.

pub mod error;
pub mod membership;
pub mod types;
pub mod validation;
