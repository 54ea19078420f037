use serde::{Deserialize, Serialize};

/// Outcome of a single autopkgtest run, as stored in the result store.
///
/// Ordering follows the policy's "best result wins" merge rule: a lower
/// rank is a better result. Use [`TestStatus::rank`] rather than deriving
/// `Ord` from the enum's declaration order so the relationship to the
/// merge rule in `ResultStore::update` stays explicit at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestStatus {
    Pass,
    Neutral,
    Fail,
    OldPass,
    OldNeutral,
    OldFail,
    None,
}

impl TestStatus {
    /// Lower is better. Mirrors the `Result(Enum)` ordering in the original
    /// policy (`PASS < NEUTRAL < FAIL < OLD_PASS < OLD_NEUTRAL < OLD_FAIL < NONE`).
    pub fn rank(self) -> u8 {
        match self {
            TestStatus::Pass => 0,
            TestStatus::Neutral => 1,
            TestStatus::Fail => 2,
            TestStatus::OldPass => 3,
            TestStatus::OldNeutral => 4,
            TestStatus::OldFail => 5,
            TestStatus::None => 6,
        }
    }

    /// `true` for PASS/NEUTRAL/OLD_PASS/OLD_NEUTRAL — any non-FAIL, non-NONE result.
    pub fn is_non_failing(self) -> bool {
        matches!(
            self,
            TestStatus::Pass | TestStatus::Neutral | TestStatus::OldPass | TestStatus::OldNeutral
        )
    }

    pub fn is_fail(self) -> bool {
        matches!(self, TestStatus::Fail | TestStatus::OldFail)
    }

    /// Maps a current status to its aged (`OLD_*`) counterpart. PASS/NEUTRAL/FAIL
    /// become OLD_PASS/OLD_NEUTRAL/OLD_FAIL; anything already old, or NONE, is
    /// left alone.
    pub fn age(self) -> TestStatus {
        match self {
            TestStatus::Pass => TestStatus::OldPass,
            TestStatus::Neutral => TestStatus::OldNeutral,
            TestStatus::Fail => TestStatus::OldFail,
            other => other,
        }
    }

    /// Canonical symbolic name, as written to the on-disk cache.
    pub fn name(self) -> &'static str {
        match self {
            TestStatus::Pass => "PASS",
            TestStatus::Neutral => "NEUTRAL",
            TestStatus::Fail => "FAIL",
            TestStatus::OldPass => "OLD_PASS",
            TestStatus::OldNeutral => "OLD_NEUTRAL",
            TestStatus::OldFail => "OLD_FAIL",
            TestStatus::None => "NONE",
        }
    }

    pub fn parse(name: &str) -> Option<TestStatus> {
        match name {
            "PASS" => Some(TestStatus::Pass),
            "NEUTRAL" => Some(TestStatus::Neutral),
            "FAIL" => Some(TestStatus::Fail),
            "OLD_PASS" => Some(TestStatus::OldPass),
            "OLD_NEUTRAL" => Some(TestStatus::OldNeutral),
            "OLD_FAIL" => Some(TestStatus::OldFail),
            "NONE" => Some(TestStatus::None),
            _ => None,
        }
    }

    /// Map an autopkgtest exit code to a status, per the object-store backend's
    /// ingest rule: `{0, 2}` pass (2 is "some tests skipped"), `8` is neutral
    /// ("no tests run"), anything else is a failure.
    pub fn from_exit_code(code: i64) -> TestStatus {
        match code {
            0 | 2 => TestStatus::Pass,
            8 => TestStatus::Neutral,
            _ => TestStatus::Fail,
        }
    }
}

impl PartialOrd for TestStatus {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TestStatus {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_matches_policy_rule() {
        assert!(TestStatus::Pass < TestStatus::Neutral);
        assert!(TestStatus::Neutral < TestStatus::Fail);
        assert!(TestStatus::Fail < TestStatus::OldPass);
        assert!(TestStatus::OldPass < TestStatus::OldNeutral);
        assert!(TestStatus::OldNeutral < TestStatus::OldFail);
        assert!(TestStatus::OldFail < TestStatus::None);
    }

    #[test]
    fn age_maps_current_to_old() {
        assert_eq!(TestStatus::Pass.age(), TestStatus::OldPass);
        assert_eq!(TestStatus::Neutral.age(), TestStatus::OldNeutral);
        assert_eq!(TestStatus::Fail.age(), TestStatus::OldFail);
    }

    #[test]
    fn age_leaves_old_and_none_alone() {
        assert_eq!(TestStatus::OldPass.age(), TestStatus::OldPass);
        assert_eq!(TestStatus::None.age(), TestStatus::None);
    }

    #[test]
    fn exit_code_mapping() {
        assert_eq!(TestStatus::from_exit_code(0), TestStatus::Pass);
        assert_eq!(TestStatus::from_exit_code(2), TestStatus::Pass);
        assert_eq!(TestStatus::from_exit_code(8), TestStatus::Neutral);
        assert_eq!(TestStatus::from_exit_code(1), TestStatus::Fail);
        assert_eq!(TestStatus::from_exit_code(-1), TestStatus::Fail);
    }

    #[test]
    fn name_round_trip() {
        for s in [
            TestStatus::Pass,
            TestStatus::Neutral,
            TestStatus::Fail,
            TestStatus::OldPass,
            TestStatus::OldNeutral,
            TestStatus::OldFail,
            TestStatus::None,
        ] {
            assert_eq!(TestStatus::parse(s.name()), Some(s));
        }
    }
}
