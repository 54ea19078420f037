use crate::error::IngestError;
use anyhow::Context;
use migpol_model::TestStatus;
use migpol_store::{PendingStore, ResultStore};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct FileDrop {
    #[serde(default)]
    results: Vec<FileDropEntry>,
}

#[derive(Debug, Deserialize)]
struct FileDropEntry {
    suite: String,
    trigger: Option<String>,
    package: String,
    arch: String,
    version: Option<String>,
    status: Option<String>,
    run_id: String,
    updated_at: String,
}

/// Reads one JSON blob of finished + outstanding results, as a drop-in
/// replacement for the object-store backend in local/test setups.
///
/// Every call to [`FileBackend::ingest_at_startup`] fully reconstructs the
/// Pending Store from the blob; nothing is carried over between runs.
pub struct FileBackend {
    path: PathBuf,
    series: String,
    baseline_is_reference: bool,
}

impl FileBackend {
    pub fn new(swift_url: &str, series: &str, baseline_is_reference: bool) -> Self {
        let path = PathBuf::from(swift_url.trim_start_matches("file://"));
        FileBackend {
            path,
            series: series.to_string(),
            baseline_is_reference,
        }
    }

    pub fn ingest_at_startup(
        &mut self,
        store: &mut ResultStore,
        pending: &mut PendingStore,
    ) -> Result<(), IngestError> {
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read file-drop {:?}", self.path))
            .map_err(|e| IngestError::fatal("*", "*", e))?;
        let drop: FileDrop = serde_json::from_str(&raw)
            .context("parse file-drop JSON")
            .map_err(|e| IngestError::fatal("*", "*", e))?;

        for entry in &drop.results {
            if entry.suite != self.series {
                continue;
            }
            let Some(trigger_field) = &entry.trigger else {
                continue;
            };

            let timestamp = parse_updated_at(&entry.updated_at).unwrap_or(0);
            let version = entry
                .version
                .clone()
                .unwrap_or_else(|| "blocked-on-ci-infra".to_string());

            for trigger_str in trigger_field.split_whitespace() {
                match entry.status.as_deref() {
                    None => pending.add(trigger_str, &entry.package, &entry.arch),
                    Some("tmpfail") => {
                        tracing::info!(trigger = trigger_str, "dropping tmpfail result");
                    }
                    Some(status_str) => {
                        let Some(status) = TestStatus::parse(&status_str.to_ascii_uppercase())
                        else {
                            tracing::warn!(status = status_str, "unknown status in file drop");
                            continue;
                        };
                        pending.remove(trigger_str, &entry.package, &entry.arch);
                        store.update(
                            trigger_str,
                            &entry.package,
                            &version,
                            &entry.arch,
                            &entry.run_id,
                            timestamp,
                            status,
                            self.baseline_is_reference,
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

/// Parse `%Y-%m-%dT%H:%M:%S`, tolerating (and discarding) a trailing
/// fractional-second/timezone suffix of up to five characters.
fn parse_updated_at(raw: &str) -> Option<i64> {
    let trimmed = if raw.len() > 19 { &raw[..19] } else { raw };
    chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}
