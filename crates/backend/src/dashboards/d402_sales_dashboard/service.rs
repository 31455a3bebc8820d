use contracts::dashboards::d402_sales_dashboard::{
    DashboardControls, DashboardResponse, DashboardStatus, FilterState, Notice,
};

use super::aggregator;
use super::options::{build_controls, resolve_options, selection_notices};
use super::pipeline::{EmptySelectionPolicy, FilterPipeline};
use super::repository::LoadOutcome;
use crate::shared::config::FiltersConfig;

/// Settings of a recomputation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    pub empty_selection: EmptySelectionPolicy,
    pub top_states: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            empty_selection: EmptySelectionPolicy::default(),
            top_states: 20,
        }
    }
}

impl From<&FiltersConfig> for DashboardSettings {
    fn from(config: &FiltersConfig) -> Self {
        Self {
            empty_selection: config.empty_selection,
            top_states: config.top_states,
        }
    }
}

/// One recomputation cycle: filter, resolve options, aggregate
///
/// Never fails. An empty view yields `NoMatchingRecords` without KPIs and
/// charts, an empty dataset yields `EmptyDataset`.
pub fn evaluate(
    outcome: &LoadOutcome,
    state: &FilterState,
    settings: &DashboardSettings,
) -> DashboardResponse {
    let Some(dataset) = outcome.dataset() else {
        return DashboardResponse::empty_dataset();
    };

    let run = FilterPipeline::new(settings.empty_selection).run(dataset, state);
    let options = resolve_options(dataset, &run);
    let controls = build_controls(dataset, state, &options);
    let mut notices = selection_notices(state, &options, settings.empty_selection);
    let view = run.view;

    if view.is_empty() {
        tracing::warn!("No records match the current filters");
        notices.push(Notice::NoMatchingRecords);
        return DashboardResponse {
            status: DashboardStatus::NoMatchingRecords,
            controls,
            total_records: dataset.len(),
            matched_records: 0,
            kpis: None,
            charts: None,
            records: None,
            notices,
        };
    }

    let kpis = aggregator::summarize(&view);
    let charts = aggregator::build_charts(&view, settings.top_states);
    tracing::info!(
        "Dashboard cycle: {} of {} records, sales {}",
        view.len(),
        dataset.len(),
        kpis.formatted.total_sales
    );

    DashboardResponse {
        status: DashboardStatus::Ready,
        controls,
        total_records: dataset.len(),
        matched_records: view.len(),
        kpis: Some(kpis),
        charts: Some(charts),
        records: state.include_records.then(|| view.to_records()),
        notices,
    }
}

/// Controls for the initial (unfiltered) sidebar; None for an empty dataset
pub fn default_controls(outcome: &LoadOutcome, settings: &DashboardSettings) -> Option<DashboardControls> {
    let dataset = outcome.dataset()?;
    let state = FilterState::default();
    let run = FilterPipeline::new(settings.empty_selection).run(dataset, &state);
    build_controls(dataset, &state, &resolve_options(dataset, &run))
}
