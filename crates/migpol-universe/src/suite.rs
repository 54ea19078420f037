use crate::binary::{BinaryInfo, BinaryPackageId};
use std::collections::HashMap;

/// A source package as it exists in one suite: its version, the binaries it
/// built, and its test-suite declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub version: String,
    pub binaries: Vec<BinaryPackageId>,
    /// Raw `Testsuite` field entries (e.g. `"autopkgtest"`,
    /// `"autopkgtest-pkg-perl"`).
    pub testsuite: Vec<String>,
    /// Raw `Testsuite-Triggers` field entries: binary package names whose
    /// changes should also re-trigger this source's tests.
    pub testsuite_triggers: Vec<String>,
}

impl SourceInfo {
    /// `"autopkgtest"` present directly, or any autodep8-convention entry
    /// (`"autopkgtest-pkg*"`).
    pub fn has_autopkgtest(&self) -> bool {
        self.testsuite
            .iter()
            .any(|t| t == "autopkgtest" || t.starts_with("autopkgtest-pkg"))
    }
}

/// Read-only view of one suite (e.g. the source suite or the target suite):
/// its sources and, per architecture, its binaries.
///
/// This is an external collaborator boundary — the policy engine never
/// mutates a suite, only queries it.
pub trait SuiteView {
    fn name(&self) -> &str;
    fn sources(&self) -> &HashMap<String, SourceInfo>;
    fn source(&self, name: &str) -> Option<&SourceInfo> {
        self.sources().get(name)
    }
    /// Binaries on one architecture, keyed by package name.
    fn binaries(&self, arch: &str) -> &HashMap<String, BinaryInfo>;

    /// Subset of `ids` that exist (by name) somewhere in this suite.
    fn which_of_these_are_in_the_suite<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a BinaryPackageId>,
    ) -> Vec<&'a BinaryPackageId> {
        ids.into_iter()
            .filter(|id| self.binaries(&id.architecture).contains_key(&id.package_name))
            .collect()
    }

    /// `true` if any of `ids` is already installable (by name) in this suite.
    fn any_of_these_are_in_the_suite<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a BinaryPackageId>,
    ) -> bool {
        ids.into_iter()
            .any(|id| self.binaries(&id.architecture).contains_key(&id.package_name))
    }
}
