//! Shared in-memory test doubles for the collaborator traits in
//! `migpol-universe`. Every crate that needs a `SuiteView`, `PackageUniverse`,
//! `ExcuseHandle`, or `HintProvider` for its own tests can reuse these instead
//! of hand-rolling a local fake.

mod excuse;
mod hints;
mod suite;
mod universe;

pub use excuse::FakeExcuse;
pub use hints::FakeHints;
pub use suite::InMemorySuite;
pub use universe::InMemoryUniverse;
