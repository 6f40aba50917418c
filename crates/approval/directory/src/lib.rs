//! User directory seam for the approval workflow.
//!
//! Identity is owned by an external collaborator; the engine and dispatcher
//! only ever read it. This crate defines the read contract and ships a
//! deterministic in-memory adapter for tests and single-node deployments.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod error;
mod memory;
mod traits;

pub use error::{DirectoryError, DirectoryResult};
pub use memory::InMemoryDirectory;
pub use traits::UserDirectory;
