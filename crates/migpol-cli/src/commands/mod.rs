//! Command handler modules for migpol-cli.

pub mod config;
pub mod ingest;
pub mod inspect;

use anyhow::Result;
use migpol_config::EngineConfig;
use std::path::Path;

/// Load layered config from `paths`, collected into owned `&Path`s so the
/// caller doesn't have to juggle lifetimes at every call site.
pub fn load_config(paths: &[String]) -> Result<EngineConfig> {
    let refs: Vec<&Path> = paths.iter().map(Path::new).collect();
    EngineConfig::load(&refs)
}
