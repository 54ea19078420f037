use super::load_config;
use anyhow::Result;
use migpol_store::{PendingStore, ResultStore};
use std::path::Path;

pub fn results(config_paths: &[String], state_dir: &str) -> Result<()> {
    let cfg = load_config(config_paths)?;
    let state_dir = Path::new(state_dir);
    let results_path = ResultStore::cache_path(state_dir, cfg.adt_shared_results_cache.as_deref());
    let store = ResultStore::load(&results_path, chrono::Utc::now().timestamp())?;

    for (trigger, src, arch, result) in store.iter_leaves() {
        println!(
            "{trigger} {src} {arch} {} version={:?} run_id={} timestamp={}",
            result.status.name(),
            result.version,
            result.run_id,
            result.timestamp,
        );
    }
    Ok(())
}

pub fn pending(state_dir: &str) -> Result<()> {
    let path = Path::new(state_dir).join("autopkgtest-pending.json");
    let store = PendingStore::load(&path)?;
    for (trigger, src, arch) in store.iter() {
        println!("{trigger} {src} {arch}");
    }
    Ok(())
}
