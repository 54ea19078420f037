use crate::TestStatus;
use serde::{Deserialize, Serialize};

/// A single stored test outcome: `(status, version, run_id, timestamp)`.
///
/// `version` is the version of the tested source at the time the test ran;
/// it is absent until the first result for a (trigger, source, arch) key is
/// recorded. `run_id` is an opaque, lexicographically comparable identifier
/// (e.g. the object-store backend's `YYYYMMDD_HHMMSS@` run directory name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub status: TestStatus,
    pub version: Option<String>,
    pub run_id: String,
    pub timestamp: i64,
}

impl TestResult {
    /// The default record assumed for a (trigger, source, arch) key that has
    /// never been updated.
    pub fn initial() -> Self {
        TestResult {
            status: TestStatus::Fail,
            version: None,
            run_id: String::new(),
            timestamp: 0,
        }
    }

    /// The value `BaselineOracle` returns when there is no applicable result
    /// at all (distinct from `initial`, which is a stand-in for "never
    /// updated" inside the store's monotonic merge).
    pub fn none() -> Self {
        TestResult {
            status: TestStatus::None,
            version: None,
            run_id: String::new(),
            timestamp: 0,
        }
    }
}
