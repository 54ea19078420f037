use crate::error::IngestError;
use anyhow::{bail, Context};
use migpol_model::{trigger, TestStatus};
use migpol_store::{PendingStore, ResultStore};
use serde_json::Value;
use std::collections::HashSet;
use std::io::Read;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Pull-driven Swift-style object-store backend: one HTTP listing request
/// per (source, arch), memoized for the lifetime of the process so a given
/// pair is never queried twice in one run.
pub struct ObjectStoreBackend {
    client: reqwest::blocking::Client,
    swift_url: String,
    series: String,
    container_suffix: Option<String>,
    baseline_is_reference: bool,
    queried: HashSet<(String, String)>,
}

impl ObjectStoreBackend {
    pub fn new(
        swift_url: &str,
        series: &str,
        ppas: &[String],
        baseline_is_reference: bool,
    ) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("build HTTP client")?;
        Ok(ObjectStoreBackend {
            client,
            swift_url: swift_url.trim_end_matches('/').to_string(),
            series: series.to_string(),
            container_suffix: ppa_container_suffix(ppas),
            baseline_is_reference,
            queried: HashSet::new(),
        })
    }

    fn container(&self) -> String {
        match &self.container_suffix {
            Some(suffix) => format!("autopkgtest-{}-{}", self.series, suffix),
            None => format!("autopkgtest-{}", self.series),
        }
    }

    /// Fetch all not-yet-seen results for `(src, arch)`, updating `store`
    /// and clearing matching `pending` entries. A no-op on the second and
    /// later call for the same pair.
    pub fn fetch_for(
        &mut self,
        src: &str,
        arch: &str,
        marker: Option<&str>,
        store: &mut ResultStore,
        pending: &mut PendingStore,
    ) -> Result<(), IngestError> {
        let key = (src.to_string(), arch.to_string());
        if self.queried.contains(&key) {
            return Ok(());
        }
        self.queried.insert(key);

        let paths = match self.list_runs(src, arch, marker) {
            Ok(paths) => paths,
            Err(ListOutcome::ContainerMissing) => {
                tracing::info!(src, arch, "container not yet present");
                return Ok(());
            }
            Err(ListOutcome::Fatal(e)) => return Err(IngestError::fatal(src, arch, e)),
        };

        for path in paths {
            if let Err(e) = self.ingest_one_run(&path, src, arch, store, pending) {
                tracing::warn!(src, arch, path, error = %e, "skipping damaged or mismatched artifact");
            }
        }
        Ok(())
    }

    fn list_runs(&self, src: &str, arch: &str, marker: Option<&str>) -> Result<Vec<String>, ListOutcome> {
        let prefix = format!("{}/{}/{}/{}/", self.series, arch, trigger::srchash(src), src);
        let mut url = format!(
            "{}/{}?prefix={}&delimiter=@",
            self.swift_url,
            self.container(),
            urlencode(&prefix)
        );
        if let Some(m) = marker {
            url.push_str("&marker=");
            url.push_str(&urlencode(m));
        }

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| ListOutcome::Fatal(anyhow::Error::new(e).context("listing request failed")))?;

        match resp.status().as_u16() {
            200 => {
                let text = resp
                    .text()
                    .map_err(|e| ListOutcome::Fatal(anyhow::Error::new(e).context("read listing body")))?;
                Ok(text.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect())
            }
            204 => Ok(Vec::new()),
            401 => Err(ListOutcome::ContainerMissing),
            other => Err(ListOutcome::Fatal(anyhow::anyhow!(
                "unexpected listing status {other}"
            ))),
        }
    }

    fn ingest_one_run(
        &self,
        path: &str,
        src: &str,
        arch: &str,
        store: &mut ResultStore,
        pending: &mut PendingStore,
    ) -> anyhow::Result<()> {
        let tar_url = format!("{}/{}/{}result.tar", self.swift_url, self.container(), path);
        let resp = self.client.get(&tar_url).send().context("fetch result.tar")?;
        if resp.status().as_u16() == 404 {
            bail!("result.tar missing");
        }
        if !resp.status().is_success() {
            bail!("unexpected result.tar status {}", resp.status());
        }
        let bytes = resp.bytes().context("read result.tar body")?;

        let artifact = read_artifact(&bytes[..]).context("extract result.tar members")?;

        if artifact.ressrc != src {
            bail!("artifact source mismatch: {} != {src}", artifact.ressrc);
        }
        let Some(triggers) = artifact.triggers else {
            bail!("artifact missing ADT_TEST_TRIGGERS");
        };

        let run_id = last_path_segment(path);
        let seen = parse_run_timestamp(run_id).unwrap_or(0);
        let status = TestStatus::from_exit_code(artifact.exit_code);

        for trigger_str in &triggers {
            pending.remove(trigger_str, src, arch);
            store.update(
                trigger_str,
                src,
                &artifact.version,
                arch,
                run_id,
                seen,
                status,
                self.baseline_is_reference,
            );
        }
        Ok(())
    }
}

enum ListOutcome {
    ContainerMissing,
    Fatal(anyhow::Error),
}

struct Artifact {
    exit_code: i64,
    ressrc: String,
    version: String,
    triggers: Option<Vec<String>>,
}

fn read_artifact(bytes: &[u8]) -> anyhow::Result<Artifact> {
    let mut archive = tar::Archive::new(bytes);
    let mut exit_code = None;
    let mut version_line = None;
    let mut testinfo = None;

    for entry in archive.entries().context("read tar entries")? {
        let mut entry = entry.context("read tar entry")?;
        let entry_path = entry.path().context("tar entry path")?.to_string_lossy().to_string();
        let mut content = String::new();
        entry.read_to_string(&mut content).context("read tar entry body")?;
        match entry_path.as_str() {
            "exitcode" => exit_code = Some(content.trim().parse::<i64>().context("parse exitcode")?),
            "testpkg-version" => version_line = Some(content.trim().to_string()),
            "testinfo.json" => testinfo = Some(content),
            _ => {}
        }
    }

    let exit_code = exit_code.context("missing exitcode member")?;
    let version_line = version_line.context("missing testpkg-version member")?;
    let (ressrc, version) = version_line
        .split_once(char::is_whitespace)
        .map(|(a, b)| (a.to_string(), b.trim().to_string()))
        .context("malformed testpkg-version")?;
    let testinfo = testinfo.context("missing testinfo.json member")?;

    let triggers = parse_test_triggers(&testinfo);

    Ok(Artifact {
        exit_code,
        ressrc,
        version,
        triggers,
    })
}

fn parse_test_triggers(testinfo_json: &str) -> Option<Vec<String>> {
    let value: Value = serde_json::from_str(testinfo_json).ok()?;
    let env = value.get("custom_environment")?.as_array()?;
    for entry in env {
        let s = entry.as_str()?;
        if let Some(rest) = s.strip_prefix("ADT_TEST_TRIGGERS=") {
            let triggers: Vec<String> = rest
                .split_whitespace()
                .filter(|t| t.contains('/'))
                .map(str::to_string)
                .collect();
            if triggers.is_empty() {
                return None;
            }
            return Some(triggers);
        }
    }
    None
}

fn last_path_segment(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
}

/// Parse the `YYYYMMDD_HHMMSS@...` prefix of a run-id segment into epoch seconds.
fn parse_run_timestamp(run_id: &str) -> Option<i64> {
    let stamp = run_id.split('@').next()?;
    chrono::NaiveDateTime::parse_from_str(stamp, "%Y%m%d_%H%M%S")
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// A configured PPA set selects the `debci-ppa-*` swift container suffix,
/// derived from the first configured PPA's `owner-name` form.
fn ppa_container_suffix(ppas: &[String]) -> Option<String> {
    let first = ppas.first()?;
    Some(format!("ppa-{}", first.replace('/', "-")))
}
