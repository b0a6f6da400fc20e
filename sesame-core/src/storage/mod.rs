//! Storage backends that ship with the core crate.
//!
//! Persistent backends live in their own crates (`sesame-storage-sqlite`).
pub mod memory;

pub use memory::{
    MemoryCredentialRepository, MemorySessionRepository, MemoryStorage, MemoryUserRepository,
};
