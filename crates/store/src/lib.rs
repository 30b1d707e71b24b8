//! runmeta-store: store client abstraction and in-memory backend
//!
//! Defines the [`StoreClient`] trait the service layer depends on, an
//! in-memory implementation for tests and embedded use, and the
//! connection configuration a remote client is built from. There is no
//! process-wide client handle; callers construct a client and pass it to
//! each service at construction time.

pub mod client;
pub mod config;
pub mod memory;

pub use client::{Item, ItemCursor, StoreClient};
pub use config::StoreConfig;
pub use memory::MemoryStore;
