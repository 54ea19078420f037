//! Durable state for the autopkgtest migration policy engine: the result
//! cache (`ResultStore`) and the outstanding-request set (`PendingStore`),
//! both persisted as JSON via write-temp-then-rename so a crash mid-write
//! never corrupts either file.

mod atomic;
mod pending_store;
mod result_store;

pub use atomic::write_atomic;
pub use pending_store::PendingStore;
pub use result_store::{ResultStore, UpdateOutcome};
