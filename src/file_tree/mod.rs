//! Lazy file tree model.
//!
//! - `node`: FileTreeNode and its tagged `Children` materialization state
//! - `snapshot`: TreeSnapshot, index-path walks and the flattened view
//! - `model`: FileTreeModel, the owner of the snapshot and its generation

pub mod model;
pub mod node;
pub mod snapshot;

pub use model::{FileTreeModel, TreeView};
pub use node::{Children, FileTreeNode, NodeState};
pub use snapshot::{TreeSnapshot, VisibleRow};
