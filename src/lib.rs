//! Ayurvedic retrieval-augmented chat assistant.
//!
//! `ingest` seeds the vector store from a directory of JSON documents;
//! `pipeline` answers one user turn at a time against it. The server and
//! the CLI binaries are thin adapters over those two.

pub mod core;
pub mod embedding;
pub mod history;
pub mod ingest;
pub mod llm;
pub mod pipeline;
pub mod rag;
pub mod server;
pub mod state;

#[cfg(test)]
mod test_support;
