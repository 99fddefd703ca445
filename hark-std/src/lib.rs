//! # hark-std
//!
//! Standard implementations for the Hark listener composition engine.
//!
//! This crate provides:
//! - **Reference host**: [`EventBus`], an in-memory bus implementing the
//!   host contract from `hark-core`, with priority-ordered [`Table`]s
//! - **Defaults**: stateless [`defaults::filters`] and [`defaults::handlers`]
//! - **Testing**: counters, recorders and a broken resolver

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use hark_core;

// Modules
pub mod bus;
pub mod defaults;
pub mod testing;

pub use bus::{DispatchReport, EventBus, EventBusBuilder, Table};
