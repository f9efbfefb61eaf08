//! In-memory search backend.
//!
//! Holds collections and items in a process-local index guarded by a
//! read-write lock. Every clause of the compiled query is evaluated directly
//! against the item JSON, with the same loose string/number coercion an
//! Elasticsearch keyword field would apply. Geometry intersection is
//! approximated by comparing bounding envelopes.
//!
//! The backend can be populated programmatically or loaded from a directory:
//!
//! ```text
//! catalog/
//! ├── collections/*.json    one collection document per file
//! └── items/*.json          an Item or a FeatureCollection per file
//! ```

mod backend;
mod eval;
mod loader;

pub use backend::MemoryBackend;
