//! Reusable, stateless filters and handlers.
//!
//! Everything here is a plain generic function returning a fresh closure;
//! there is no shared mutable state.

pub mod filters;
pub mod handlers;
