//! Capability trait abstractions.
//!
//! Every external collaborator is an injected trait: the document parser,
//! OCR, the embedding and chat models, and both stores. No component
//! reaches for an ambient singleton, so each can be tested against
//! in-memory fakes.

pub mod ai;
pub mod parser;
pub mod store;
