use crate::atomic::write_atomic;
use anyhow::{Context, Result};
use migpol_model::{trigger, TestResult, TestStatus};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

type ArchMap = BTreeMap<String, TestResult>;
type SrcMap = BTreeMap<String, ArchMap>;
type TriggerMap = BTreeMap<String, SrcMap>;

/// Outcome of one `update` call, useful for logging at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The stored record was replaced.
    Updated,
    /// A better-or-equal-and-newer record already existed; nothing changed.
    Ignored,
    /// The trigger string was malformed (no `/`).
    MalformedTrigger,
    /// The trigger names `src` itself but the incoming version is older than
    /// the trigger's own version — stale result for a version nobody asked
    /// about anymore.
    OlderThanTrigger,
}

/// Persistent `trigger -> source -> arch -> TestResult` mapping.
///
/// See spec.md §4.1 for the full monotonic update rule this enforces.
#[derive(Debug, Default, Clone)]
pub struct ResultStore {
    data: TriggerMap,
    /// When set, `save` is a no-op: an externally shared, read-only cache.
    read_only: bool,
}

impl ResultStore {
    pub fn new() -> Self {
        ResultStore {
            data: TriggerMap::new(),
            read_only: false,
        }
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Load from `path`, tolerating a missing file (empty store) and
    /// upgrading legacy encodings in place. `now` is used to fill in a
    /// missing timestamp field on legacy records.
    pub fn load(path: &Path, now: i64) -> Result<Self> {
        if !path.exists() {
            return Ok(ResultStore::new());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read result store {:?}", path))?;
        let value: Value = serde_json::from_str(&raw)
            .with_context(|| format!("parse result store {:?}", path))?;
        let data = upgrade(value, now)?;
        Ok(ResultStore {
            data,
            read_only: false,
        })
    }

    /// Write to `path` via write-temp-then-rename. No-op when the store is
    /// marked read-only (`adt_shared_results_cache` configured).
    pub fn save(&self, path: &Path) -> Result<()> {
        if self.read_only {
            return Ok(());
        }
        let value = to_json(&self.data);
        let text = serde_json::to_string_pretty(&value)?;
        write_atomic(path, &text)
    }

    pub fn get(&self, trigger: &str, src: &str, arch: &str) -> Option<&TestResult> {
        self.data.get(trigger)?.get(src)?.get(arch)
    }

    /// Apply the monotonic merge rule for one incoming result.
    pub fn update(
        &mut self,
        trigger_str: &str,
        src: &str,
        ver: &str,
        arch: &str,
        run_id: &str,
        timestamp: i64,
        status: TestStatus,
        baseline_is_reference: bool,
    ) -> UpdateOutcome {
        let (trigsrc, trigver) = match trigger::split(trigger_str) {
            Some(parts) => parts,
            None => return UpdateOutcome::MalformedTrigger,
        };
        if trigsrc == src && migpol_model::version::lt(ver, trigver) {
            return UpdateOutcome::OlderThanTrigger;
        }

        let stored = self
            .data
            .entry(trigger_str.to_string())
            .or_default()
            .entry(src.to_string())
            .or_default()
            .entry(arch.to_string())
            .or_insert_with(TestResult::initial);

        let is_reference_override =
            baseline_is_reference && trigger_str == trigger::REFERENCE_TRIGGER;

        let should_update = if is_reference_override {
            timestamp > stored.timestamp
        } else if status < stored.status {
            true
        } else {
            status == stored.status && timestamp > stored.timestamp
        };

        if should_update {
            stored.status = status;
            stored.version = Some(ver.to_string());
            stored.run_id = run_id.to_string();
            stored.timestamp = timestamp;
            UpdateOutcome::Updated
        } else {
            UpdateOutcome::Ignored
        }
    }

    /// Age out results per spec.md §4.1: reference-trigger runs older than
    /// `reference_max_age` seconds, and any result whose tested version is no
    /// longer present in any known suite.
    pub fn age_out(
        &mut self,
        now: i64,
        reference_max_age: Option<i64>,
        is_in_any_suite: impl Fn(&str, &str) -> bool,
    ) {
        for (trigger_str, src_map) in self.data.iter_mut() {
            for (src, arch_map) in src_map.iter_mut() {
                for result in arch_map.values_mut() {
                    let is_stale_reference = trigger_str == trigger::REFERENCE_TRIGGER
                        && reference_max_age
                            .map(|max_age| result.timestamp < now - max_age)
                            .unwrap_or(false);
                    let version_gone = result
                        .version
                        .as_deref()
                        .map(|v| !is_in_any_suite(src, v))
                        .unwrap_or(false);
                    if is_stale_reference || version_gone {
                        result.status = result.status.age();
                    }
                }
            }
        }
    }

    /// Iterate every stored `(trigger, source, arch, result)` leaf.
    pub fn iter_leaves(&self) -> impl Iterator<Item = (&str, &str, &str, &TestResult)> {
        self.data.iter().flat_map(|(trigger_str, src_map)| {
            src_map.iter().flat_map(move |(src, arch_map)| {
                arch_map
                    .iter()
                    .map(move |(arch, result)| (trigger_str.as_str(), src.as_str(), arch.as_str(), result))
            })
        })
    }

    /// Iterate every `(source, arch, result)` recorded under any trigger,
    /// in trigger-insertion-independent order. Used by the baseline oracle's
    /// historical scan.
    pub fn iter_by_trigger(&self) -> impl Iterator<Item = &SrcMap> {
        self.data.values()
    }

    pub fn cache_path(state_dir: &Path, shared: Option<&Path>) -> PathBuf {
        shared
            .map(PathBuf::from)
            .unwrap_or_else(|| state_dir.join("autopkgtest-results.cache"))
    }
}

fn to_json(data: &TriggerMap) -> Value {
    let mut triggers = serde_json::Map::new();
    for (trigger_str, src_map) in data {
        let mut srcs = serde_json::Map::new();
        for (src, arch_map) in src_map {
            let mut arches = serde_json::Map::new();
            for (arch, result) in arch_map {
                arches.insert(
                    arch.clone(),
                    serde_json::json!([
                        result.status.name(),
                        result.version,
                        result.run_id,
                        result.timestamp,
                    ]),
                );
            }
            srcs.insert(src.clone(), Value::Object(arches));
        }
        triggers.insert(trigger_str.clone(), Value::Object(srcs));
    }
    Value::Object(triggers)
}

/// Parse the on-disk shape, upgrading legacy encodings: a boolean status
/// (`true`→PASS, `false`→FAIL) and a missing timestamp (filled with `now`).
fn upgrade(value: Value, now: i64) -> Result<TriggerMap> {
    let triggers = value
        .as_object()
        .context("result store: expected a top-level object")?;
    let mut out = TriggerMap::new();
    for (trigger_str, src_value) in triggers {
        let srcs = src_value
            .as_object()
            .with_context(|| format!("result store: trigger {trigger_str:?} is not an object"))?;
        let mut src_map = SrcMap::new();
        for (src, arch_value) in srcs {
            let arches = arch_value
                .as_object()
                .with_context(|| format!("result store: source {src:?} is not an object"))?;
            let mut arch_map = ArchMap::new();
            for (arch, leaf) in arches {
                arch_map.insert(arch.clone(), upgrade_leaf(leaf, now)?);
            }
            src_map.insert(src.clone(), arch_map);
        }
        out.insert(trigger_str.clone(), src_map);
    }
    Ok(out)
}

fn upgrade_leaf(leaf: &Value, now: i64) -> Result<TestResult> {
    let arr = leaf.as_array().context("result leaf: expected an array")?;
    let status = match arr.first() {
        Some(Value::String(name)) => {
            TestStatus::parse(name).with_context(|| format!("unknown status {name:?}"))?
        }
        Some(Value::Bool(true)) => TestStatus::Pass,
        Some(Value::Bool(false)) => TestStatus::Fail,
        other => anyhow::bail!("result leaf: unexpected status value {other:?}"),
    };
    let version = arr.get(1).and_then(|v| v.as_str()).map(str::to_string);
    let run_id = arr
        .get(2)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let timestamp = arr.get(3).and_then(|v| v.as_i64()).unwrap_or(now);
    Ok(TestResult {
        status,
        version,
        run_id,
        timestamp,
    })
}
