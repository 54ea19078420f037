//! Trigger Resolver: for a migration candidate, decides which sources need
//! autopkgtest runs on a given architecture and which `source/version`
//! triggers those runs should carry.

mod inverted_triggers;
mod tests_selection;
mod triggers_list;

pub use inverted_triggers::build as build_inverted_triggers;

use migpol_universe::{BinaryPackageId, ExcuseHandle, PackageUniverse, SuiteView};
use std::collections::HashMap;

/// Result of resolving one `(src, ver)` candidate on one architecture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Sorted-by-source `(testsrc, testver)` pairs to request tests for.
    pub tests: Vec<(String, String)>,
    /// The outbound trigger list, primary trigger at index 0.
    pub triggers_list: Vec<String>,
}

impl Resolution {
    pub fn is_huge(&self, huge_cutoff: Option<u32>) -> bool {
        huge_cutoff
            .map(|cutoff| self.tests.len() > cutoff as usize)
            .unwrap_or(false)
    }
}

/// Resolve tests and the trigger list for candidate `(src, ver)` on `arch`.
#[allow(clippy::too_many_arguments)]
pub fn resolve(
    src: &str,
    ver: &str,
    arch: &str,
    candidate_binaries: &[BinaryPackageId],
    candidate_suite: &dyn SuiteView,
    target_suite: &dyn SuiteView,
    universe: &dyn PackageUniverse,
    excuse: &dyn ExcuseHandle,
    inverted_triggers: &HashMap<String, Vec<String>>,
) -> Resolution {
    let (tests, seeds) = tests_selection::select(
        src,
        ver,
        arch,
        candidate_binaries,
        candidate_suite,
        target_suite,
        universe,
        excuse,
        inverted_triggers,
    );

    if tests.is_empty() && seeds.is_empty() {
        return Resolution::default();
    }

    let triggers_list = triggers_list::build(
        src,
        ver,
        arch,
        &seeds,
        candidate_suite,
        target_suite,
        universe,
        excuse,
        inverted_triggers,
    );

    Resolution {
        tests,
        triggers_list,
    }
}
