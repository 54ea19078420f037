//! Verdict Engine (spec.md §4.7–§4.8): folds one candidate's per-arch,
//! per-testsrc test results into a single migration [`Verdict`], writing
//! the supporting annotations, bounty/penalty, and self-test summary back
//! onto the candidate's excuse.

mod error;
mod label;

pub use error::VerdictError;
pub use label::{label_for, LabelInput, NoResult, StatusLabel};

use migpol_model::{TestResult, TestStatus, Verdict};
use migpol_universe::{force_badtest_matches, ExcuseHandle, Hint, HintProvider};
use std::collections::{HashMap, HashSet};

/// One arch's gathered state for a `(testsrc, testver)` pair, assembled by
/// the caller from the Result Store, Pending Store, and Baseline Oracle
/// before the Verdict Engine ever sees it.
pub struct ArchEvaluation {
    pub arch: String,
    pub stored: Option<TestResult>,
    pub baseline: TestResult,
    pub pending: bool,
    pub test_in_target: bool,
}

/// All arches evaluated for one `(testsrc, testver)` selected by the
/// Trigger Resolver.
pub struct TestEvaluation {
    pub testsrc: String,
    pub testver: String,
    pub per_arch: Vec<ArchEvaluation>,
}

/// Everything [`apply`] needs about the migrating candidate itself and its
/// selected tests.
pub struct VerdictInput {
    pub source: String,
    pub version: String,
    pub no_built_binaries_anywhere: bool,
    pub missing_builds: HashSet<String>,
    pub unsatisfiable_on_archs: HashSet<String>,
    pub skip_dep_check_archs: HashSet<String>,
    pub configured_arches: Vec<String>,
    pub tests: Vec<TestEvaluation>,
    pub is_reference_baseline: bool,
    pub ignore_failure_for_new_tests: bool,
    pub success_bounty: Option<i64>,
    pub regression_penalty: Option<i64>,
}

/// Sources whose own test results should never be trusted as a baseline for
/// one another: kernel flavors aren't interchangeable, so force FAIL rather
/// than let one flavor's pass excuse another's regression.
fn forces_baseline_fail(source: &str) -> bool {
    source == "linux" || source.starts_with("linux-meta")
}

fn version_le(a: &str, b: &str) -> bool {
    !migpol_model::version::lt(b, a)
}

fn escalate(current: Verdict, candidate: Verdict) -> Verdict {
    use Verdict::*;
    match (current, candidate) {
        (RejectedPermanently, _) | (_, RejectedPermanently) => RejectedPermanently,
        (RejectedTemporarily, _) | (_, RejectedTemporarily) => RejectedTemporarily,
        (PassHinted, _) | (_, PassHinted) => PassHinted,
        (Pass, Pass) => Pass,
    }
}

/// [`apply`]'s result: the migration verdict plus any reference runs that
/// still need to be requested. A `RUNNING-REFERENCE` label means the engine
/// has no baseline yet for a failing test that's new to the target suite;
/// the caller (the Test Requester, via the Policy Facade) still has to
/// actually queue that `migration-reference/0` run — `apply` only labels.
pub struct VerdictOutcome {
    pub verdict: Verdict,
    pub reference_enqueues: Vec<(String, String)>,
}

/// Apply the Verdict Engine to one candidate, writing annotations and the
/// bounty/penalty back onto `excuse` as it goes.
pub fn apply(
    input: &VerdictInput,
    excuse: &mut dyn ExcuseHandle,
    hints: &dyn HintProvider,
) -> Result<VerdictOutcome, VerdictError> {
    if input.no_built_binaries_anywhere || input.missing_builds.contains("all") {
        excuse.add_verdict_info(
            Verdict::RejectedTemporarily,
            "nothing built yet, autopkgtest delayed",
        );
        return Ok(VerdictOutcome {
            verdict: Verdict::RejectedTemporarily,
            reference_enqueues: Vec::new(),
        });
    }

    let mut verdict = Verdict::Pass;

    for arch in &input.configured_arches {
        if input.missing_builds.contains(arch) {
            verdict = escalate(verdict, Verdict::RejectedTemporarily);
            excuse.add_verdict_info(verdict, &format!("{arch}: no build yet, autopkgtest delayed"));
        } else if input.unsatisfiable_on_archs.contains(arch)
            && !input.skip_dep_check_archs.contains(arch)
        {
            excuse.addinfo(&format!("{arch}: uninstallable, not running"));
        }
    }

    let force_baseline_fail = !input.is_reference_baseline && forces_baseline_fail(&input.source);

    let mut self_test_seen = false;
    let mut self_test_all_pass = true;
    let mut self_test_labels: HashSet<String> = HashSet::new();
    let mut badtest_hints_cache: HashMap<&str, Vec<Hint>> = HashMap::new();
    let mut reference_enqueues: Vec<(String, String)> = Vec::new();

    for test in &input.tests {
        let badtest_hints = badtest_hints_cache
            .entry(test.testsrc.as_str())
            .or_insert_with(|| hints.search_force_badtest(&test.testsrc));

        let mut labels: HashSet<StatusLabel> = HashSet::new();
        let mut per_arch_msgs: Vec<String> = Vec::new();

        for arch_eval in &test.per_arch {
            let force_badtest =
                force_badtest_matches(badtest_hints, &arch_eval.arch, &test.testver, version_le);

            let baseline = if force_baseline_fail {
                TestResult {
                    status: TestStatus::Fail,
                    ..arch_eval.baseline.clone()
                }
            } else {
                arch_eval.baseline.clone()
            };

            let label_input = LabelInput {
                stored: arch_eval.stored.as_ref(),
                baseline: &baseline,
                pending: arch_eval.pending,
                test_in_target: arch_eval.test_in_target,
                ignore_failure_for_new_tests: input.ignore_failure_for_new_tests,
                force_badtest,
            };

            let (label, enqueue_reference) =
                label::label_for(&label_input).map_err(|_| VerdictError::ResultNeitherKnownNorPending {
                    testsrc: test.testsrc.clone(),
                    arch: arch_eval.arch.clone(),
                })?;

            if enqueue_reference {
                excuse.addinfo(&format!(
                    "{}/{} on {}: enqueuing reference run",
                    test.testsrc, test.testver, arch_eval.arch
                ));
                reference_enqueues.push((test.testsrc.clone(), arch_eval.arch.clone()));
            }

            per_arch_msgs.push(format!("{}: {}", arch_eval.arch, label.as_str()));
            labels.insert(label);
        }

        if test.testsrc == input.source {
            self_test_seen = true;
            let is_clean_pass = labels.len() == 1 && labels.contains(&StatusLabel::Named(TestStatus::Pass));
            self_test_all_pass = self_test_all_pass && is_clean_pass;
            for label in &labels {
                self_test_labels.insert(label.as_str().to_string());
            }
        }

        if labels.iter().any(|l| l.is_regression()) {
            verdict = Verdict::RejectedPermanently;
        } else if verdict == Verdict::Pass && labels.iter().any(|l| l.is_pending_block()) {
            verdict = Verdict::RejectedTemporarily;
        }

        let line = format!(
            "autopkgtest for {}/{}: {}",
            test.testsrc,
            test.testver,
            per_arch_msgs.join(", ")
        );
        if verdict.is_rejected() {
            excuse.add_verdict_info(verdict, &line);
        } else {
            excuse.addinfo(&line);
        }
    }

    excuse.set_autopkgtest_results(self_test_labels);

    if verdict != Verdict::Pass {
        if let Some(hint) = hints.search_force_skiptest(&input.source, &input.version).into_iter().next() {
            verdict = Verdict::PassHinted;
            excuse.addreason("skiptest");
            excuse.addinfo(&format!("skiptest forced by {}", hint.user));
        }
    }

    if let Some(bounty) = input.success_bounty {
        if verdict == Verdict::Pass && self_test_seen && self_test_all_pass {
            excuse.add_bounty("autopkgtest", bounty);
        }
    }

    if let Some(penalty) = input.regression_penalty {
        if verdict.is_rejected() {
            excuse.add_penalty("autopkgtest", penalty);
            verdict = Verdict::Pass;
        }
    }

    tracing::debug!(source = %input.source, version = %input.version, ?verdict, "autopkgtest verdict");
    Ok(VerdictOutcome {
        verdict,
        reference_enqueues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use migpol_universe::{BinaryPackageId, HintPackageItem};

    struct FakeExcuse {
        verdict_infos: Vec<String>,
        infos: Vec<String>,
        reasons: Vec<String>,
        bounties: Vec<(String, i64)>,
        penalties: Vec<(String, i64)>,
        autopkgtest_results: HashSet<String>,
        missing_builds: HashSet<String>,
        unsatisfiable_on_archs: HashSet<String>,
        skip_dep_check_archs: HashSet<String>,
        built: HashMap<String, usize>,
        depends: Vec<BinaryPackageId>,
    }

    impl FakeExcuse {
        fn new() -> Self {
            FakeExcuse {
                verdict_infos: Vec::new(),
                infos: Vec::new(),
                reasons: Vec::new(),
                bounties: Vec::new(),
                penalties: Vec::new(),
                autopkgtest_results: HashSet::new(),
                missing_builds: HashSet::new(),
                unsatisfiable_on_archs: HashSet::new(),
                skip_dep_check_archs: HashSet::new(),
                built: HashMap::new(),
                depends: Vec::new(),
            }
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
            self.verdict_infos.push(format!("{verdict:?}: {message}"));
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

    struct FakeHints {
        skiptest: Vec<Hint>,
        badtest: Vec<Hint>,
    }

    impl HintProvider for FakeHints {
        fn search_force_skiptest(&self, _source: &str, _version: &str) -> Vec<Hint> {
            self.skiptest.clone()
        }
        fn search_force_badtest(&self, _source: &str) -> Vec<Hint> {
            self.badtest.clone()
        }
    }

    fn result(status: TestStatus, version: &str, run_id: &str, ts: i64) -> TestResult {
        TestResult {
            status,
            version: Some(version.to_string()),
            run_id: run_id.to_string(),
            timestamp: ts,
        }
    }

    fn no_hints() -> FakeHints {
        FakeHints {
            skiptest: vec![],
            badtest: vec![],
        }
    }

    fn base_input() -> VerdictInput {
        VerdictInput {
            source: "foo".into(),
            version: "2.0".into(),
            no_built_binaries_anywhere: false,
            missing_builds: HashSet::new(),
            unsatisfiable_on_archs: HashSet::new(),
            skip_dep_check_archs: HashSet::new(),
            configured_arches: vec!["amd64".into()],
            tests: vec![],
            is_reference_baseline: false,
            ignore_failure_for_new_tests: false,
            success_bounty: None,
            regression_penalty: None,
        }
    }

    #[test]
    fn unbuilt_candidate_is_rejected_temporarily() {
        let mut input = base_input();
        input.no_built_binaries_anywhere = true;
        let mut excuse = FakeExcuse::new();
        let hints = no_hints();
        let verdict = apply(&input, &mut excuse, &hints).unwrap().verdict;
        assert_eq!(verdict, Verdict::RejectedTemporarily);
        assert!(excuse.verdict_infos.iter().any(|m| m.contains("nothing built yet")));
    }

    #[test]
    fn clean_pass_yields_pass() {
        let mut input = base_input();
        input.tests.push(TestEvaluation {
            testsrc: "foo".into(),
            testver: "2.0".into(),
            per_arch: vec![ArchEvaluation {
                arch: "amd64".into(),
                stored: Some(result(TestStatus::Pass, "2.0", "R1", 100)),
                baseline: TestResult::none(),
                pending: false,
                test_in_target: true,
            }],
        });
        let mut excuse = FakeExcuse::new();
        let hints = no_hints();
        let verdict = apply(&input, &mut excuse, &hints).unwrap().verdict;
        assert_eq!(verdict, Verdict::Pass);
        assert_eq!(excuse.autopkgtest_results, HashSet::from(["PASS".to_string()]));
    }

    #[test]
    fn regression_yields_rejected_permanently() {
        let mut input = base_input();
        input.tests.push(TestEvaluation {
            testsrc: "foo".into(),
            testver: "2.0".into(),
            per_arch: vec![ArchEvaluation {
                arch: "amd64".into(),
                stored: Some(result(TestStatus::Fail, "2.0", "R1", 100)),
                baseline: result(TestStatus::Pass, "1.9", "R0", 50),
                pending: false,
                test_in_target: true,
            }],
        });
        let mut excuse = FakeExcuse::new();
        let hints = no_hints();
        let verdict = apply(&input, &mut excuse, &hints).unwrap().verdict;
        assert_eq!(verdict, Verdict::RejectedPermanently);
    }

    #[test]
    fn always_fail_yields_pass() {
        let mut input = base_input();
        input.tests.push(TestEvaluation {
            testsrc: "foo".into(),
            testver: "2.0".into(),
            per_arch: vec![ArchEvaluation {
                arch: "amd64".into(),
                stored: Some(result(TestStatus::Fail, "2.0", "R1", 100)),
                baseline: result(TestStatus::OldFail, "1.9", "R0", 50),
                pending: false,
                test_in_target: true,
            }],
        });
        let mut excuse = FakeExcuse::new();
        let hints = no_hints();
        let verdict = apply(&input, &mut excuse, &hints).unwrap().verdict;
        assert_eq!(verdict, Verdict::Pass);
    }

    #[test]
    fn pending_with_no_baseline_yields_rejected_temporarily() {
        let mut input = base_input();
        input.tests.push(TestEvaluation {
            testsrc: "bar".into(),
            testver: "1.0".into(),
            per_arch: vec![ArchEvaluation {
                arch: "amd64".into(),
                stored: None,
                baseline: TestResult::none(),
                pending: true,
                test_in_target: true,
            }],
        });
        let mut excuse = FakeExcuse::new();
        let hints = no_hints();
        let verdict = apply(&input, &mut excuse, &hints).unwrap().verdict;
        assert_eq!(verdict, Verdict::RejectedTemporarily);
    }

    #[test]
    fn running_reference_label_reports_itself_for_enqueue() {
        let mut input = base_input();
        input.tests.push(TestEvaluation {
            testsrc: "bar".into(),
            testver: "1.0".into(),
            per_arch: vec![ArchEvaluation {
                arch: "amd64".into(),
                stored: Some(result(TestStatus::Fail, "1.0", "R1", 100)),
                baseline: TestResult::none(),
                pending: false,
                test_in_target: true,
            }],
        });
        let mut excuse = FakeExcuse::new();
        let hints = no_hints();
        let outcome = apply(&input, &mut excuse, &hints).unwrap();
        assert_eq!(outcome.verdict, Verdict::RejectedTemporarily);
        assert_eq!(
            outcome.reference_enqueues,
            vec![("bar".to_string(), "amd64".to_string())]
        );
        assert!(excuse.infos.iter().any(|i| i.contains("enqueuing reference run")));
    }

    #[test]
    fn force_skiptest_hint_downgrades_to_pass_hinted() {
        let mut input = base_input();
        input.tests.push(TestEvaluation {
            testsrc: "foo".into(),
            testver: "2.0".into(),
            per_arch: vec![ArchEvaluation {
                arch: "amd64".into(),
                stored: Some(result(TestStatus::Fail, "2.0", "R1", 100)),
                baseline: result(TestStatus::Pass, "1.9", "R0", 50),
                pending: false,
                test_in_target: true,
            }],
        });
        let mut excuse = FakeExcuse::new();
        let hints = FakeHints {
            skiptest: vec![Hint {
                user: "alice".into(),
                packages: vec![HintPackageItem {
                    architecture: "source".into(),
                    version: "all".into(),
                }],
            }],
            badtest: vec![],
        };
        let verdict = apply(&input, &mut excuse, &hints).unwrap().verdict;
        assert_eq!(verdict, Verdict::PassHinted);
        assert!(excuse.reasons.iter().any(|r| r.contains("skiptest")));
        assert!(excuse.infos.iter().any(|i| i.contains("forced by alice")));
    }

    #[test]
    fn regression_penalty_forces_pass() {
        let mut input = base_input();
        input.regression_penalty = Some(5);
        input.tests.push(TestEvaluation {
            testsrc: "foo".into(),
            testver: "2.0".into(),
            per_arch: vec![ArchEvaluation {
                arch: "amd64".into(),
                stored: Some(result(TestStatus::Fail, "2.0", "R1", 100)),
                baseline: result(TestStatus::Pass, "1.9", "R0", 50),
                pending: false,
                test_in_target: true,
            }],
        });
        let mut excuse = FakeExcuse::new();
        let hints = no_hints();
        let verdict = apply(&input, &mut excuse, &hints).unwrap().verdict;
        assert_eq!(verdict, Verdict::Pass);
        assert_eq!(excuse.penalties, vec![("autopkgtest".to_string(), 5)]);
    }

    #[test]
    fn success_bounty_applies_only_when_self_tests_all_pass() {
        let mut input = base_input();
        input.success_bounty = Some(3);
        input.tests.push(TestEvaluation {
            testsrc: "foo".into(),
            testver: "2.0".into(),
            per_arch: vec![ArchEvaluation {
                arch: "amd64".into(),
                stored: Some(result(TestStatus::Pass, "2.0", "R1", 100)),
                baseline: TestResult::none(),
                pending: false,
                test_in_target: true,
            }],
        });
        let mut excuse = FakeExcuse::new();
        let hints = no_hints();
        let verdict = apply(&input, &mut excuse, &hints).unwrap().verdict;
        assert_eq!(verdict, Verdict::Pass);
        assert_eq!(excuse.bounties, vec![("autopkgtest".to_string(), 3)]);
    }

    #[test]
    fn no_result_not_pending_is_fatal() {
        let mut input = base_input();
        input.tests.push(TestEvaluation {
            testsrc: "bar".into(),
            testver: "1.0".into(),
            per_arch: vec![ArchEvaluation {
                arch: "amd64".into(),
                stored: None,
                baseline: TestResult::none(),
                pending: false,
                test_in_target: true,
            }],
        });
        let mut excuse = FakeExcuse::new();
        let hints = no_hints();
        assert!(apply(&input, &mut excuse, &hints).is_err());
    }

    #[test]
    fn linux_meta_forces_baseline_fail_in_historical_mode() {
        let mut input = base_input();
        input.source = "linux".into();
        input.tests.push(TestEvaluation {
            testsrc: "linux".into(),
            testver: "2.0".into(),
            per_arch: vec![ArchEvaluation {
                arch: "amd64".into(),
                stored: Some(result(TestStatus::Fail, "2.0", "R1", 100)),
                // A clean baseline would normally yield REGRESSION; the
                // linux-kernel rule forces FAIL instead, yielding ALWAYSFAIL.
                baseline: result(TestStatus::Pass, "1.9", "R0", 50),
                pending: false,
                test_in_target: true,
            }],
        });
        let mut excuse = FakeExcuse::new();
        let hints = no_hints();
        let verdict = apply(&input, &mut excuse, &hints).unwrap().verdict;
        assert_eq!(verdict, Verdict::Pass);
    }
}
