//! Baseline Oracle: for each `(source, arch)` pair, the result a candidate's
//! test outcome is compared against to decide pass/regression/always-fail.
//!
//! Memoized for the lifetime of the process, matching every other
//! per-(source, arch) lookup in this engine.

use migpol_model::TestResult;
use migpol_store::ResultStore;
use std::collections::HashMap;

/// `true` selects the `adt_baseline == "reference"` mode; `false` selects
/// the default historical-scan mode.
pub struct BaselineOracle {
    is_reference: bool,
    memo: HashMap<(String, String), TestResult>,
}

impl BaselineOracle {
    pub fn new(is_reference: bool) -> Self {
        BaselineOracle {
            is_reference,
            memo: HashMap::new(),
        }
    }

    /// Baseline result for `(src, arch)`. Always a fresh clone — callers may
    /// mutate their copy freely without disturbing the cache.
    pub fn baseline_for(&mut self, store: &ResultStore, src: &str, arch: &str) -> TestResult {
        let key = (src.to_string(), arch.to_string());
        if let Some(cached) = self.memo.get(&key) {
            return cached.clone();
        }
        let computed = if self.is_reference {
            reference_baseline(store, src, arch)
        } else {
            historical_baseline(store, src, arch)
        };
        self.memo.insert(key, computed.clone());
        computed
    }
}

fn reference_baseline(store: &ResultStore, src: &str, arch: &str) -> TestResult {
    store
        .get(migpol_model::trigger::REFERENCE_TRIGGER, src, arch)
        .cloned()
        .unwrap_or_else(TestResult::none)
}

/// Scan every trigger's result for `(src, arch)`; return the most recent
/// non-FAIL result, short-circuiting as soon as a PASS is found. If no
/// trigger has a usable result, default to a FAIL with no version/run data.
fn historical_baseline(store: &ResultStore, src: &str, arch: &str) -> TestResult {
    let mut best: Option<TestResult> = None;
    for (_, leaf_src, leaf_arch, result) in store.iter_leaves() {
        if leaf_src != src || leaf_arch != arch {
            continue;
        }
        if result.status.is_fail() {
            continue;
        }
        if result.status == migpol_model::TestStatus::Pass {
            return result.clone();
        }
        let is_more_recent = best
            .as_ref()
            .map(|b| result.timestamp > b.timestamp)
            .unwrap_or(true);
        if is_more_recent {
            best = Some(result.clone());
        }
    }
    best.unwrap_or_else(TestResult::initial)
}
