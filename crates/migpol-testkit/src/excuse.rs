use migpol_model::Verdict;
use migpol_universe::{BinaryPackageId, ExcuseHandle};
use std::collections::{HashMap, HashSet};

/// Records every call an [`ExcuseHandle`] consumer makes, so a test can
/// assert on the annotations, bounty/penalty, and self-test summary a
/// policy decision produced.
#[derive(Default)]
pub struct FakeExcuse {
    pub verdict_infos: Vec<(Verdict, String)>,
    pub infos: Vec<String>,
    pub reasons: Vec<String>,
    pub bounties: Vec<(String, i64)>,
    pub penalties: Vec<(String, i64)>,
    pub autopkgtest_results: HashSet<String>,
    pub missing_builds: HashSet<String>,
    pub unsatisfiable_on_archs: HashSet<String>,
    pub skip_dep_check_archs: HashSet<String>,
    pub built: HashMap<String, usize>,
    pub depends: Vec<BinaryPackageId>,
}

impl FakeExcuse {
    pub fn new() -> Self {
        FakeExcuse::default()
    }

    pub fn with_built(mut self, arch: impl Into<String>, count: usize) -> Self {
        self.built.insert(arch.into(), count);
        self
    }

    pub fn with_missing_build(mut self, arch: impl Into<String>) -> Self {
        self.missing_builds.insert(arch.into());
        self
    }
}

impl ExcuseHandle for FakeExcuse {
    fn missing_builds(&self) -> &HashSet<String> {
        &self.missing_builds
    }

    fn unsatisfiable_on_archs(&self) -> &HashSet<String> {
        &self.unsatisfiable_on_archs
    }

    fn skip_dep_check_archs(&self) -> &HashSet<String> {
        &self.skip_dep_check_archs
    }

    fn built_binary_count(&self, arch: &str) -> usize {
        *self.built.get(arch).unwrap_or(&0)
    }

    fn depends_packages_flattened(&self) -> &[BinaryPackageId] {
        &self.depends
    }

    fn add_verdict_info(&mut self, verdict: Verdict, message: &str) {
        self.verdict_infos.push((verdict, message.to_string()));
    }

    fn addinfo(&mut self, message: &str) {
        self.infos.push(message.to_string());
    }

    fn addreason(&mut self, reason: &str) {
        self.reasons.push(reason.to_string());
    }

    fn add_bounty(&mut self, name: &str, amount: i64) {
        self.bounties.push((name.to_string(), amount));
    }

    fn add_penalty(&mut self, name: &str, amount: i64) {
        self.penalties.push((name.to_string(), amount));
    }

    fn set_autopkgtest_results(&mut self, labels: HashSet<String>) {
        self.autopkgtest_results = labels;
    }
}
