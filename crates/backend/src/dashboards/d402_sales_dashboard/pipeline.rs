use contracts::dashboards::d402_sales_dashboard::{Dimension, FilterState, Measure};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::dataset::{Dataset, FilteredView};
use super::options;

/// What an explicitly empty multiselect means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptySelectionPolicy {
    /// Nothing selected = nothing matches
    #[default]
    ExcludeAll,
    /// Nothing selected = the dimension is not filtered
    NoConstraint,
}

/// One predicate of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    OrderDate,
    Categorical(Dimension),
    Numeric(Measure),
}

impl Stage {
    /// Stage that must run before this one
    pub fn depends_on(&self) -> Option<Stage> {
        match self {
            Stage::Categorical(d) => d.depends_on().map(Stage::Categorical),
            _ => None,
        }
    }
}

/// Stages in declaration order (the order controls appear in the sidebar)
const DECLARED_STAGES: [Stage; 12] = [
    Stage::OrderDate,
    Stage::Categorical(Dimension::Region),
    Stage::Categorical(Dimension::Category),
    Stage::Categorical(Dimension::SubCategory),
    Stage::Categorical(Dimension::Segment),
    Stage::Categorical(Dimension::ShipMode),
    Stage::Categorical(Dimension::State),
    Stage::Categorical(Dimension::City),
    Stage::Numeric(Measure::Sales),
    Stage::Numeric(Measure::Quantity),
    Stage::Numeric(Measure::Discount),
    Stage::Numeric(Measure::Profit),
];

static STAGE_ORDER: Lazy<Vec<Stage>> = Lazy::new(|| topological_order(&DECLARED_STAGES));

/// Execution order of the stages: dependencies first, declaration order otherwise
pub fn stage_order() -> &'static [Stage] {
    &STAGE_ORDER
}

/// Kahn's algorithm; among ready stages the earliest declared wins
fn topological_order(stages: &[Stage]) -> Vec<Stage> {
    let mut placed = vec![false; stages.len()];
    let mut order = Vec::with_capacity(stages.len());

    while order.len() < stages.len() {
        let next = stages.iter().enumerate().position(|(i, stage)| {
            !placed[i]
                && stage.depends_on().map_or(true, |dep| {
                    // a dependency outside the declared set does not block
                    !stages.contains(&dep) || order.contains(&dep)
                })
        });

        match next {
            Some(i) => {
                placed[i] = true;
                order.push(stages[i]);
            }
            None => {
                // Cycle: keep the remaining stages in declaration order
                tracing::error!("Filter stage dependency cycle detected");
                order.extend(
                    stages
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| !placed[*i])
                        .map(|(_, s)| *s),
                );
            }
        }
    }

    order
}

/// Result of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineRun<'a> {
    /// Records satisfying every active predicate
    pub view: FilteredView<'a>,
    /// Options of dependent dimensions, computed from the view right before their stage
    pub cascaded_options: BTreeMap<Dimension, Vec<String>>,
    /// Row count after each stage
    pub trace: Vec<(Stage, usize)>,
}

/// Ordered conjunction of predicates over the dataset
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterPipeline {
    policy: EmptySelectionPolicy,
}

impl FilterPipeline {
    pub fn new(policy: EmptySelectionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> EmptySelectionPolicy {
        self.policy
    }

    /// Filtered view of `dataset` under `state`
    pub fn apply<'a>(&self, dataset: &'a Dataset, state: &FilterState) -> FilteredView<'a> {
        self.run(dataset, state).view
    }

    /// Run every stage, capturing the cascading option sets on the way
    pub fn run<'a>(&self, dataset: &'a Dataset, state: &FilterState) -> PipelineRun<'a> {
        let mut view = dataset.view();
        let mut cascaded_options = BTreeMap::new();
        let mut trace = Vec::with_capacity(stage_order().len());

        for &stage in stage_order() {
            if let Stage::Categorical(dimension) = stage {
                if dimension.is_dependent() {
                    cascaded_options.insert(dimension, options::options_for(dimension, &view));
                }
            }

            view = self.apply_stage(stage, &view, state);
            tracing::debug!("Stage {:?}: {} records", stage, view.len());
            trace.push((stage, view.len()));
        }

        PipelineRun {
            view,
            cascaded_options,
            trace,
        }
    }

    /// Apply a single stage to an input view, producing a new view
    pub fn apply_stage<'a>(
        &self,
        stage: Stage,
        view: &FilteredView<'a>,
        state: &FilterState,
    ) -> FilteredView<'a> {
        match stage {
            Stage::OrderDate => match state.date_range {
                Some(range) => view.narrow(|r| range.contains(r.order_date)),
                None => view.clone(),
            },
            Stage::Categorical(dimension) => match state.selection(dimension) {
                None => view.clone(),
                Some(selected) if selected.is_empty() => match self.policy {
                    EmptySelectionPolicy::ExcludeAll => FilteredView::empty(),
                    EmptySelectionPolicy::NoConstraint => view.clone(),
                },
                Some(selected) => view.narrow(|r| selected.contains(r.dimension_value(dimension))),
            },
            Stage::Numeric(measure) => match state.ranges.get(&measure) {
                Some(range) => view.narrow(|r| range.contains(r.measure_value(measure))),
                None => view.clone(),
            },
        }
    }
}
