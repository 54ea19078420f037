//! Policy Facade: wires the Result Store, Pending Store, Trigger Resolver,
//! Test Requester, Baseline Oracle, and Verdict Engine into the single
//! entry point the migration driver calls once per candidate.

mod error;

pub use error::PolicyError;

use migpol_broker::{BrokerSink, RequestContext};
use migpol_config::EngineConfig;
use migpol_ingest::{FileBackend, ObjectStoreBackend};
use migpol_model::Verdict;
use migpol_store::{PendingStore, ResultStore};
use migpol_universe::{BinaryPackageId, ExcuseHandle, HintProvider, PackageUniverse, SuiteView};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Everything one candidate evaluation needs from the outside world.
pub struct CandidateEvaluation<'a> {
    pub source: &'a str,
    pub version: &'a str,
    pub binaries: &'a [BinaryPackageId],
    pub candidate_suite: &'a dyn SuiteView,
    pub target_suite: &'a dyn SuiteView,
    pub universe: &'a dyn PackageUniverse,
}

/// `true` if `src` at exactly `version` appears in any of `suites` — used to
/// age out results for versions no longer present anywhere.
fn version_present_anywhere(suites: &[&dyn SuiteView], src: &str, version: &str) -> bool {
    suites
        .iter()
        .any(|s| s.source(src).map(|info| info.version == version).unwrap_or(false))
}

/// Owns the process-lifetime state: loaded stores, the baseline memo, the
/// broker sink, and the inverted test-suite-triggers index. One instance
/// per migration run.
pub struct PolicyEngine {
    config: EngineConfig,
    store: ResultStore,
    pending: PendingStore,
    pending_path: PathBuf,
    baseline: migpol_baseline::BaselineOracle,
    sink: Box<dyn BrokerSink>,
    object_store: Option<ObjectStoreBackend>,
    inverted_triggers: std::collections::HashMap<String, Vec<String>>,
}

impl PolicyEngine {
    /// Load persisted state, run the file backend's eager startup ingest (if
    /// configured), and build the inverted test-suite-triggers index from
    /// every known suite.
    pub fn init(
        config: EngineConfig,
        state_dir: &Path,
        suites: &[&dyn SuiteView],
    ) -> Result<Self, PolicyError> {
        let now = chrono::Utc::now().timestamp();

        let results_path = ResultStore::cache_path(state_dir, config.adt_shared_results_cache.as_deref());
        let mut store = ResultStore::load(&results_path, now)?;
        if config.adt_shared_results_cache.is_some() {
            store.set_read_only(true);
        }
        store.age_out(now, config.reference_max_age_seconds(), |src, version| {
            version_present_anywhere(suites, src, version)
        });

        let pending_path = state_dir.join("autopkgtest-pending.json");
        let mut pending = PendingStore::load(&pending_path)?;

        let object_store = if config.uses_object_store() {
            Some(ObjectStoreBackend::new(
                &config.adt_swift_url,
                &config.series,
                &config.adt_ppas,
                config.is_reference_baseline(),
            )?)
        } else {
            let mut file_backend =
                FileBackend::new(&config.adt_swift_url, &config.series, config.is_reference_baseline());
            file_backend.ingest_at_startup(&mut store, &mut pending)?;
            None
        };

        let sink: Box<dyn BrokerSink> = match &config.adt_amqp {
            Some(url) => migpol_broker::sink_for_url(url)?,
            None => Box::new(migpol_broker::FileSink::new(state_dir.join("autopkgtest-requests.txt"))),
        };

        let inverted_triggers = migpol_resolver::build_inverted_triggers(suites);

        Ok(PolicyEngine {
            baseline: migpol_baseline::BaselineOracle::new(config.is_reference_baseline()),
            config,
            store,
            pending,
            pending_path,
            sink,
            object_store,
            inverted_triggers,
        })
    }

    /// Resolve tests, request any missing ones, and produce a verdict for
    /// one candidate. `excuse` is mutated with annotations, bounty/penalty,
    /// and the self-test summary as a side effect. Any `RUNNING-REFERENCE`
    /// label the Verdict Engine assigns also gets its `migration-reference/0`
    /// run queued here, through the same Test Requester path as everything
    /// else.
    pub fn evaluate(
        &mut self,
        candidate: &CandidateEvaluation<'_>,
        excuse: &mut dyn ExcuseHandle,
        hints: &dyn HintProvider,
    ) -> Result<Verdict, PolicyError> {
        let no_built_binaries_anywhere = self
            .config
            .adt_arches
            .iter()
            .all(|arch| excuse.built_binary_count(arch) == 0);

        let mut tests_by_key: BTreeMap<(String, String), Vec<migpol_verdict::ArchEvaluation>> =
            BTreeMap::new();

        if !(no_built_binaries_anywhere || excuse.missing_builds().contains("all")) {
            for arch in self.config.adt_arches.clone() {
                if excuse.missing_builds().contains(&arch) {
                    continue;
                }
                if excuse.unsatisfiable_on_archs().contains(&arch)
                    && !excuse.skip_dep_check_archs().contains(&arch)
                {
                    continue;
                }

                let resolution = migpol_resolver::resolve(
                    candidate.source,
                    candidate.version,
                    &arch,
                    candidate.binaries,
                    candidate.candidate_suite,
                    candidate.target_suite,
                    candidate.universe,
                    excuse,
                    &self.inverted_triggers,
                );
                let huge = resolution.is_huge(self.config.adt_huge);
                let trigger = migpol_model::trigger::format(candidate.source, candidate.version);

                for (testsrc, testver) in &resolution.tests {
                    let ctx = RequestContext {
                        series: &self.config.series,
                        uses_object_store: self.config.uses_object_store(),
                        huge,
                        ppas: &self.config.adt_ppas,
                        retry_older_than_seconds: self.config.retry_older_than_seconds(),
                        dry_run: self.config.dry_run,
                        now: chrono::Utc::now(),
                    };
                    let outcome = migpol_broker::request_test(
                        &ctx,
                        &trigger,
                        testsrc,
                        &arch,
                        &resolution.triggers_list,
                        &mut self.store,
                        &mut self.pending,
                        &mut self.baseline,
                        self.object_store.as_mut(),
                        &mut *self.sink,
                    )?;
                    if outcome == migpol_broker::RequestOutcome::Queued && self.sink.requires_pending_persist()
                    {
                        self.pending.save(&self.pending_path)?;
                    }

                    let stored = self.store.get(&trigger, testsrc, &arch).cloned();
                    let pending_flag = self.pending.contains(&trigger, testsrc, &arch);
                    let baseline_result = self.baseline.baseline_for(&self.store, testsrc, &arch);
                    let test_in_target = candidate.target_suite.source(testsrc).is_some();

                    tests_by_key
                        .entry((testsrc.clone(), testver.clone()))
                        .or_default()
                        .push(migpol_verdict::ArchEvaluation {
                            arch: arch.clone(),
                            stored,
                            baseline: baseline_result,
                            pending: pending_flag,
                            test_in_target,
                        });
                }
            }
        }

        let tests = tests_by_key
            .into_iter()
            .map(|((testsrc, testver), per_arch)| migpol_verdict::TestEvaluation {
                testsrc,
                testver,
                per_arch,
            })
            .collect();

        let input = migpol_verdict::VerdictInput {
            source: candidate.source.to_string(),
            version: candidate.version.to_string(),
            no_built_binaries_anywhere,
            missing_builds: excuse.missing_builds().clone(),
            unsatisfiable_on_archs: excuse.unsatisfiable_on_archs().clone(),
            skip_dep_check_archs: excuse.skip_dep_check_archs().clone(),
            configured_arches: self.config.adt_arches.clone(),
            tests,
            is_reference_baseline: self.config.is_reference_baseline(),
            ignore_failure_for_new_tests: self.config.adt_ignore_failure_for_new_tests,
            success_bounty: self.config.adt_success_bounty,
            regression_penalty: self.config.adt_regression_penalty,
        };

        let outcome = migpol_verdict::apply(&input, excuse, hints)?;

        for (testsrc, arch) in &outcome.reference_enqueues {
            let ctx = RequestContext {
                series: &self.config.series,
                uses_object_store: self.config.uses_object_store(),
                huge: false,
                ppas: &self.config.adt_ppas,
                retry_older_than_seconds: self.config.retry_older_than_seconds(),
                dry_run: self.config.dry_run,
                now: chrono::Utc::now(),
            };
            let triggers_list = vec![migpol_model::trigger::REFERENCE_TRIGGER.to_string()];
            let request_outcome = migpol_broker::request_test(
                &ctx,
                migpol_model::trigger::REFERENCE_TRIGGER,
                testsrc,
                arch,
                &triggers_list,
                &mut self.store,
                &mut self.pending,
                &mut self.baseline,
                self.object_store.as_mut(),
                &mut *self.sink,
            )?;
            if request_outcome == migpol_broker::RequestOutcome::Queued
                && self.sink.requires_pending_persist()
            {
                self.pending.save(&self.pending_path)?;
            }
        }

        Ok(outcome.verdict)
    }

    /// Persist both stores at end of run.
    pub fn shutdown(&self, state_dir: &Path) -> Result<(), PolicyError> {
        let results_path = ResultStore::cache_path(state_dir, self.config.adt_shared_results_cache.as_deref());
        self.store.save(&results_path)?;
        self.pending.save(&self.pending_path)?;
        let _ = state_dir;
        Ok(())
    }
}
