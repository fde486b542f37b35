//! Document and blob storage for Recipe Book.
//!
//! The access layer talks to two remote collaborators: a schemaless document
//! database addressed by collection name and document id, and an object
//! store that returns a durable URL per upload. This crate defines both
//! boundaries as traits and ships backends for them.
//!
//! # Storage Backends
//!
//! - [`InMemoryDocumentStore`] -- `BTreeMap`-based document store for tests,
//!   local serving and seeding
//! - [`InMemoryBlobStore`] -- `HashMap`-based blob store
//! - [`FsBlobStore`] -- blobs written under a local directory
//!
//! # Design Rules
//!
//! 1. Store-assigned document ids are never reused or reassigned.
//! 2. `update_merge` only touches the supplied top-level fields and fails on
//!    a missing document.
//! 3. All backend errors are propagated, never silently ignored.
//! 4. The store never interprets document contents beyond equality filters.

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsBlobStore;
pub use memory::{InMemoryBlobStore, InMemoryDocumentStore};
pub use traits::{validate_blob_path, BlobStore, Document, DocumentStore};
