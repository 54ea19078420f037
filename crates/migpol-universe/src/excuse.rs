use crate::binary::BinaryPackageId;
use migpol_model::Verdict;
use std::collections::HashSet;

/// The subset of a candidate's excuse object the policy engine is allowed to
/// read and write. Excuse rendering, hint parsing, and the rest of the
/// migration driver's bookkeeping live outside this crate; this trait is the
/// narrow read/write seam spec.md §3 describes.
pub trait ExcuseHandle {
    /// Architectures on which the candidate is missing a build. May contain
    /// the literal `"all"` for "arch:all wasn't built yet".
    fn missing_builds(&self) -> &HashSet<String>;

    /// Architectures on which the candidate is currently uninstallable.
    fn unsatisfiable_on_archs(&self) -> &HashSet<String>;

    /// Architectures exempted from the uninstallability check by the
    /// depends sub-policy's `skip_dep_check`.
    fn skip_dep_check_archs(&self) -> &HashSet<String>;

    /// Number of binaries the candidate built on `arch` (used to gate the
    /// self-test seed: a source with no built binaries on an arch can't have
    /// its own autopkgtest run there).
    fn built_binary_count(&self, arch: &str) -> usize;

    /// Binaries the implicit-dependency sub-policy decided must co-migrate.
    fn depends_packages_flattened(&self) -> &[BinaryPackageId];

    fn add_verdict_info(&mut self, verdict: Verdict, message: &str);
    fn addinfo(&mut self, message: &str);
    fn addreason(&mut self, reason: &str);
    fn add_bounty(&mut self, name: &str, amount: i64);
    fn add_penalty(&mut self, name: &str, amount: i64);

    /// Records the set of status labels observed for the candidate's own
    /// tests (used by the excuses page to render a compact self-test badge).
    fn set_autopkgtest_results(&mut self, labels: HashSet<String>);
}
