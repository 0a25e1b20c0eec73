#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{ScoreRepository, Storage, StorageError, UserRepository};
