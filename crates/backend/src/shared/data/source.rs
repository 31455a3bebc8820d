use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::dashboards::d402_sales_dashboard::repository::{LoadOutcome, DATASET_CACHE};
use crate::dashboards::d402_sales_dashboard::service::DashboardSettings;

static SOURCE_PATH: OnceCell<PathBuf> = OnceCell::new();
static SETTINGS: OnceCell<DashboardSettings> = OnceCell::new();

/// Register the dataset source and load it once
///
/// Load failures abort startup; an empty dataset does not.
pub fn initialize_source(
    path: &Path,
    settings: DashboardSettings,
) -> anyhow::Result<Arc<LoadOutcome>> {
    SETTINGS
        .set(settings)
        .map_err(|_| anyhow::anyhow!("Dashboard settings are already initialized"))?;
    SOURCE_PATH
        .set(path.to_path_buf())
        .map_err(|_| anyhow::anyhow!("Dataset source is already initialized"))?;

    let outcome = DATASET_CACHE.get_or_load(path)?;
    match outcome.dataset() {
        Some(dataset) => tracing::info!("Dataset ready: {} records", dataset.len()),
        None => tracing::warn!(
            "Dataset {} has no valid records, the dashboard will stay empty",
            path.display()
        ),
    }
    Ok(outcome)
}

pub fn get_source() -> anyhow::Result<&'static Path> {
    SOURCE_PATH
        .get()
        .map(PathBuf::as_path)
        .ok_or_else(|| anyhow::anyhow!("Dataset source has not been initialized"))
}

/// Cycle settings from config.toml (defaults before initialization)
pub fn dashboard_settings() -> DashboardSettings {
    SETTINGS.get().copied().unwrap_or_default()
}

/// Memoized dataset of the configured source
pub fn current_dataset() -> anyhow::Result<Arc<LoadOutcome>> {
    Ok(DATASET_CACHE.get_or_load(get_source()?)?)
}

/// Explicit reload of the configured source
pub fn reload_dataset() -> anyhow::Result<Arc<LoadOutcome>> {
    Ok(DATASET_CACHE.reload(get_source()?)?)
}
