use crate::atomic::write_atomic;
use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Persistent `trigger -> source -> {arch}` set of outstanding test requests.
///
/// An entry exists from the moment a test is requested until its result (or
/// a terminal failure to request it) is observed; the per-trigger map is
/// pruned of empty sources and the whole trigger entry dropped once its last
/// source is removed, so the on-disk file never accumulates dead triggers.
#[derive(Debug, Default, Clone)]
pub struct PendingStore {
    data: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
}

impl PendingStore {
    pub fn new() -> Self {
        PendingStore::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(PendingStore::new());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read pending store {:?}", path))?;
        let data = serde_json::from_str(&raw)
            .with_context(|| format!("parse pending store {:?}", path))?;
        Ok(PendingStore { data })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.data)?;
        write_atomic(path, &text)
    }

    pub fn add(&mut self, trigger: &str, src: &str, arch: &str) {
        self.data
            .entry(trigger.to_string())
            .or_default()
            .entry(src.to_string())
            .or_default()
            .insert(arch.to_string());
    }

    pub fn remove(&mut self, trigger: &str, src: &str, arch: &str) {
        let Some(src_map) = self.data.get_mut(trigger) else {
            return;
        };
        let Some(arches) = src_map.get_mut(src) else {
            return;
        };
        arches.remove(arch);
        if arches.is_empty() {
            src_map.remove(src);
        }
        if src_map.is_empty() {
            self.data.remove(trigger);
        }
    }

    pub fn contains(&self, trigger: &str, src: &str, arch: &str) -> bool {
        self.data
            .get(trigger)
            .and_then(|srcs| srcs.get(src))
            .map(|arches| arches.contains(arch))
            .unwrap_or(false)
    }

    /// Every `(trigger, source, arch)` currently outstanding.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.data.iter().flat_map(|(trigger, srcs)| {
            srcs.iter().flat_map(move |(src, arches)| {
                arches
                    .iter()
                    .map(move |arch| (trigger.as_str(), src.as_str(), arch.as_str()))
            })
        })
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
