use migpol_universe::{BinaryInfo, SourceInfo, SuiteView};
use std::collections::HashMap;

/// An in-memory suite: sources and per-architecture binaries, built up with
/// [`InMemorySuite::with_source`]/[`InMemorySuite::with_binary`].
pub struct InMemorySuite {
    name: String,
    sources: HashMap<String, SourceInfo>,
    binaries: HashMap<String, HashMap<String, BinaryInfo>>,
    empty_binaries: HashMap<String, BinaryInfo>,
}

impl InMemorySuite {
    pub fn new(name: impl Into<String>) -> Self {
        InMemorySuite {
            name: name.into(),
            sources: HashMap::new(),
            binaries: HashMap::new(),
            empty_binaries: HashMap::new(),
        }
    }

    pub fn with_source(mut self, name: impl Into<String>, info: SourceInfo) -> Self {
        self.sources.insert(name.into(), info);
        self
    }

    pub fn with_binary(mut self, arch: impl Into<String>, info: BinaryInfo) -> Self {
        self.binaries
            .entry(arch.into())
            .or_default()
            .insert(info.pkg_id.package_name.clone(), info);
        self
    }
}

impl SuiteView for InMemorySuite {
    fn name(&self) -> &str {
        &self.name
    }

    fn sources(&self) -> &HashMap<String, SourceInfo> {
        &self.sources
    }

    fn binaries(&self, arch: &str) -> &HashMap<String, BinaryInfo> {
        self.binaries.get(arch).unwrap_or(&self.empty_binaries)
    }
}
