//! Data transfer objects (DTOs) shared by the browsing service and the API.
//!
//! - `tree`: TreeEntry, EntryType, RepositoryInfo, CommitInfo
//! - `registry`: RepositoryRecord, the on-disk record for a registered repository

pub mod registry;
pub mod tree;

pub use registry::*;
pub use tree::*;
