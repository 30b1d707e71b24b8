//! runmeta-service: run, artifact and log operations
//!
//! The layer between the HTTP-facing handlers and the store client. Each
//! service owns nothing but an `Arc<dyn StoreClient>` handed to it at
//! construction; every request is a self-contained sequence of blocking
//! store calls with no shared mutable state, no retries and no
//! compare-and-swap (concurrent writers to one path are last-writer-wins).

pub mod artifacts;
pub mod listing;
pub mod logs;
pub mod query;
pub mod runs;

pub use artifacts::ArtifactService;
pub use logs::LogService;
pub use query::{parse_limit, ArtifactQuery, RunQuery, DEFAULT_LIST_LIMIT};
pub use runs::RunService;
