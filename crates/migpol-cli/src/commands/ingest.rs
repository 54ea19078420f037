use super::load_config;
use anyhow::Result;
use migpol_ingest::FileBackend;
use migpol_store::{PendingStore, ResultStore};
use std::path::Path;

pub fn run(config_paths: &[String], state_dir: &str) -> Result<()> {
    let cfg = load_config(config_paths)?;
    let state_dir = Path::new(state_dir);

    if cfg.uses_object_store() {
        tracing::info!(
            "adt_swift_url is an object store; it is pulled per (source, arch) as the \
             policy engine resolves candidates, not eagerly by this command"
        );
        return Ok(());
    }

    let now = chrono::Utc::now().timestamp();
    let results_path = ResultStore::cache_path(state_dir, cfg.adt_shared_results_cache.as_deref());
    let pending_path = state_dir.join("autopkgtest-pending.json");

    let mut store = ResultStore::load(&results_path, now)?;
    let mut pending = PendingStore::load(&pending_path)?;

    let mut backend = FileBackend::new(&cfg.adt_swift_url, &cfg.series, cfg.is_reference_baseline());
    backend.ingest_at_startup(&mut store, &mut pending)?;

    store.save(&results_path)?;
    pending.save(&pending_path)?;

    tracing::info!("ingest complete");
    Ok(())
}
