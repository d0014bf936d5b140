//! Store implementations.
//!
//! The in-memory stores are always available and serve both as test fakes
//! and as a development backend; real backends plug in through the traits
//! in [`crate::traits::store`].

pub mod memory;

pub use memory::{MemoryRawStore, MemoryVectorStore};
