/// One `force-badtest`/`force-skiptest` hint's package-item: the architecture
/// it targets (`"source"` for a source-wide hint, or a concrete arch name)
/// and the version ceiling (`"all"` for unconditional).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintPackageItem {
    pub architecture: String,
    pub version: String,
}

/// An operator-authored hint, as returned by the external hint system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub user: String,
    pub packages: Vec<HintPackageItem>,
}

/// Read-only query surface over operator hints. Hint *parsing* (reading
/// `hints/*` files, syntax validation) lives entirely outside this crate;
/// this trait only exposes the two hint types the verdict engine consumes.
pub trait HintProvider {
    /// `force-skiptest` hints matching exactly `(source, version)`. The
    /// original only ever consults the first match, so callers should treat
    /// this as "the hint to apply, if any" by taking the first element.
    fn search_force_skiptest(&self, source: &str, version: &str) -> Vec<Hint>;

    /// `force-badtest` hints for `source`, unfiltered by version — the
    /// per-package-item architecture/version check happens at the call site
    /// (see `migpol-verdict`), matching the original's two-stage lookup.
    fn search_force_badtest(&self, source: &str) -> Vec<Hint>;
}

/// `true` if any package-item in `hint` targets architecture `"source"` or
/// `arch`, with a version ceiling of `"all"` or `>= tested_version`.
pub fn force_badtest_matches(
    hints: &[Hint],
    arch: &str,
    tested_version: &str,
    version_le: impl Fn(&str, &str) -> bool,
) -> bool {
    hints.iter().any(|hint| {
        hint.packages.iter().any(|item| {
            (item.architecture == "source" || item.architecture == arch)
                && (item.version == "all" || version_le(tested_version, &item.version))
        })
    })
}
