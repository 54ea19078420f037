use migpol_model::{TestResult, TestStatus};

/// One arch's status label for one `(testsrc, testver)`, per spec's §4.8
/// mapping table. The non-FAIL statuses pass their name straight through;
/// everything else is a derived label reflecting baseline comparison,
/// pending state, and configuration/hint modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusLabel {
    Named(TestStatus),
    AlwaysFail,
    Regression,
    RunningReference,
    Running,
    RunningAlwaysFail,
    IgnoreFail,
}

impl StatusLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusLabel::Named(status) => status.name(),
            StatusLabel::AlwaysFail => "ALWAYSFAIL",
            StatusLabel::Regression => "REGRESSION",
            StatusLabel::RunningReference => "RUNNING-REFERENCE",
            StatusLabel::Running => "RUNNING",
            StatusLabel::RunningAlwaysFail => "RUNNING-ALWAYSFAIL",
            StatusLabel::IgnoreFail => "IGNORE-FAIL",
        }
    }

    /// Labels that block a PASS verdict outright.
    pub fn is_regression(self) -> bool {
        matches!(self, StatusLabel::Regression)
    }

    /// Labels that hold a candidate back temporarily, waiting on a result.
    /// `RUNNING-ALWAYSFAIL` is deliberately excluded: its eventual FAIL is
    /// already accounted for as an always-fail, not a pending blocker.
    pub fn is_pending_block(self) -> bool {
        matches!(self, StatusLabel::Running | StatusLabel::RunningReference)
    }
}

/// Everything [`label_for`] needs for one `(testsrc, arch)` leaf.
pub struct LabelInput<'a> {
    pub stored: Option<&'a TestResult>,
    /// Baseline result, already forced to FAIL by the caller for the
    /// linux/linux-meta special rule if it applies.
    pub baseline: &'a TestResult,
    pub pending: bool,
    pub test_in_target: bool,
    pub ignore_failure_for_new_tests: bool,
    pub force_badtest: bool,
}

/// No stored result and not in Pending Store — spec.md §7 calls this a
/// fatal assertion; the Trigger Resolver/Test Requester are supposed to
/// guarantee one or the other before a leaf reaches the Verdict Engine.
pub struct NoResult;

/// Map one leaf's stored/baseline/pending state to a label, per §4.8.
///
/// Returns `(label, enqueue_reference)`; `enqueue_reference` is set only for
/// `RUNNING-REFERENCE`, signaling the caller to request a reference-trigger
/// run in addition to labeling this leaf.
pub fn label_for(input: &LabelInput) -> Result<(StatusLabel, bool), NoResult> {
    let effective = input.stored.filter(|r| r.status != TestStatus::None);

    match effective {
        Some(result) if result.status.is_non_failing() => {
            Ok((StatusLabel::Named(result.status), false))
        }
        Some(result) => {
            debug_assert!(result.status.is_fail());
            if input.force_badtest {
                return Ok((StatusLabel::IgnoreFail, false));
            }
            if input.baseline.status.is_fail() {
                return Ok((StatusLabel::AlwaysFail, false));
            }
            if input.ignore_failure_for_new_tests && !input.test_in_target {
                return Ok((StatusLabel::AlwaysFail, false));
            }
            if input.baseline.status == TestStatus::None && input.test_in_target {
                return Ok((StatusLabel::RunningReference, true));
            }
            Ok((StatusLabel::Regression, false))
        }
        None if input.pending => {
            if !input.test_in_target && input.ignore_failure_for_new_tests {
                Ok((StatusLabel::RunningAlwaysFail, false))
            } else if input.baseline.status.is_fail() {
                Ok((StatusLabel::RunningAlwaysFail, false))
            } else {
                Ok((StatusLabel::Running, false))
            }
        }
        None => Err(NoResult),
    }
}
