//! Result ingestion: pulling finished and in-flight autopkgtest results into
//! the [`migpol_store::ResultStore`] and [`migpol_store::PendingStore`],
//! from either a single JSON drop or a Swift-style object store over HTTP.
//!
//! All I/O here is synchronous and blocking, matching the engine's
//! single-threaded execution model — there is no async runtime anywhere in
//! this crate.

mod error;
mod file_backend;
mod object_store_backend;

pub use error::IngestError;
pub use file_backend::FileBackend;
pub use object_store_backend::ObjectStoreBackend;
