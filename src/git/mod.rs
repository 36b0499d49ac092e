pub mod repository;
pub mod tree;

pub use repository::GitRepository;
