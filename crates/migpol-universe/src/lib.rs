//! External collaborator boundaries: the suite model, package universe,
//! excuse object, and hint system the policy engine reads from and writes
//! to, but never owns. Everything here is a trait plus the plain data it
//! exchanges — concrete suite loading, dependency resolution, excuse
//! rendering, and hint parsing are the migration driver's job.

mod binary;
mod excuse;
mod hints;
mod package_universe;
mod suite;

pub use binary::{BinaryInfo, BinaryPackageId};
pub use excuse::ExcuseHandle;
pub use hints::{force_badtest_matches, Hint, HintPackageItem, HintProvider};
pub use package_universe::{DependencyGroup, PackageUniverse};
pub use suite::{SourceInfo, SuiteView};
