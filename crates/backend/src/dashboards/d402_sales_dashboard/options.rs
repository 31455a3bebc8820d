use contracts::dashboards::d402_sales_dashboard::{
    DashboardControls, Dimension, DimensionControl, FilterState, Measure,
    MeasureControl, Notice,
};
use std::collections::BTreeMap;

use super::dataset::{Dataset, FilteredView};
use super::pipeline::{EmptySelectionPolicy, PipelineRun};

/// Selectable values of a dimension within a reference view
pub fn options_for(dimension: Dimension, reference: &FilteredView<'_>) -> Vec<String> {
    reference.distinct_values(dimension)
}

/// Option sets of every dimension for the current cycle
///
/// Independent dimensions offer the values of the full dataset, dependent
/// ones the values left by the stages that ran before them.
pub fn resolve_options(dataset: &Dataset, run: &PipelineRun<'_>) -> BTreeMap<Dimension, Vec<String>> {
    Dimension::ALL
        .iter()
        .map(|&dimension| {
            let options = if dimension.is_dependent() {
                run.cascaded_options
                    .get(&dimension)
                    .cloned()
                    .unwrap_or_default()
            } else {
                dataset.base_options(dimension).to_vec()
            };
            (dimension, options)
        })
        .collect()
}

/// Selection as applied: the request intersected with the options,
/// or every option when nothing was requested
pub fn effective_selection(
    dimension: Dimension,
    state: &FilterState,
    options: &[String],
) -> Vec<String> {
    match state.selection(dimension) {
        None => options.to_vec(),
        Some(selected) => options
            .iter()
            .filter(|o| selected.contains(o.as_str()))
            .cloned()
            .collect(),
    }
}

/// Sidebar state: option sets, effective selections and slider bounds
///
/// None for an empty dataset (there are no bounds to offer).
pub fn build_controls(
    dataset: &Dataset,
    state: &FilterState,
    options: &BTreeMap<Dimension, Vec<String>>,
) -> Option<DashboardControls> {
    let date_bounds = dataset.date_bounds()?;

    let dimensions = Dimension::ALL
        .iter()
        .map(|&dimension| {
            let opts = options.get(&dimension).cloned().unwrap_or_default();
            DimensionControl {
                dimension,
                label: dimension.label().to_string(),
                selected: effective_selection(dimension, state, &opts),
                options: opts,
                depends_on: dimension.depends_on(),
            }
        })
        .collect();

    let measures = Measure::ALL
        .iter()
        .filter_map(|&measure| {
            let bounds = dataset.measure_bounds(measure)?;
            Some(MeasureControl {
                measure,
                label: measure.label().to_string(),
                bounds,
                selected: state.ranges.get(&measure).copied().unwrap_or(bounds),
                step: measure.step(),
            })
        })
        .collect();

    Some(DashboardControls {
        date_bounds,
        date_selected: state.date_range.unwrap_or(date_bounds),
        dimensions,
        measures,
    })
}

/// Informational conditions of the filter controls
pub fn selection_notices(
    state: &FilterState,
    options: &BTreeMap<Dimension, Vec<String>>,
    policy: EmptySelectionPolicy,
) -> Vec<Notice> {
    let mut notices = Vec::new();

    if policy == EmptySelectionPolicy::ExcludeAll {
        for dimension in Dimension::ALL {
            if state.selection(dimension).is_some_and(|s| s.is_empty()) {
                notices.push(Notice::EmptySelection { dimension });
            }
        }
    }

    for dimension in Dimension::ALL {
        let Some(governor) = dimension.depends_on() else {
            continue;
        };
        let own_empty = options.get(&dimension).map_or(true, |o| o.is_empty());
        let governor_options = options.get(&governor).map(Vec::as_slice).unwrap_or(&[]);
        let governor_selected = !effective_selection(governor, state, governor_options).is_empty();

        if own_empty && governor_selected {
            notices.push(Notice::DependentOptionsEmpty {
                dimension,
                governed_by: governor,
            });
        }
    }

    notices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d402_sales_dashboard::pipeline::FilterPipeline;
    use crate::dashboards::d402_sales_dashboard::test_data::{date, sample_dataset};
    use contracts::dashboards::d402_sales_dashboard::NumericRange;

    #[test]
    fn test_independent_options_come_from_full_dataset() {
        let dataset = sample_dataset();
        let state = FilterState::new().with_selection(Dimension::Region, ["West"]);
        let run = FilterPipeline::default().run(&dataset, &state);

        let options = resolve_options(&dataset, &run);
        assert_eq!(options[&Dimension::Region], vec!["West", "East", "Central", "South"]);
        assert_eq!(options[&Dimension::State].len(), 8);
    }

    #[test]
    fn test_sub_category_options_only_from_selected_categories() {
        let dataset = sample_dataset();
        let selected = ["Furniture", "Office Supplies"];
        let state = FilterState::new().with_selection(Dimension::Category, selected);
        let run = FilterPipeline::default().run(&dataset, &state);

        let options = resolve_options(&dataset, &run);
        let subs = &options[&Dimension::SubCategory];
        assert_eq!(subs, &vec!["Chairs", "Binders", "Tables", "Paper", "Bookcases"]);
        for sub in subs {
            assert!(dataset
                .records()
                .iter()
                .filter(|r| &r.sub_category == sub)
                .all(|r| selected.contains(&r.category.as_str())));
        }
    }

    #[test]
    fn test_narrowing_sub_category_does_not_narrow_category() {
        let dataset = sample_dataset();
        let state = FilterState::new().with_selection(Dimension::SubCategory, ["Chairs"]);
        let run = FilterPipeline::default().run(&dataset, &state);

        let options = resolve_options(&dataset, &run);
        assert_eq!(options[&Dimension::Category].len(), 3);
        assert_eq!(options[&Dimension::SubCategory].len(), 7);
    }

    #[test]
    fn test_effective_selection_drops_unavailable_values() {
        let options = vec!["Phones".to_string(), "Accessories".to_string()];
        let state = FilterState::new().with_selection(Dimension::SubCategory, ["Phones", "Chairs"]);

        assert_eq!(
            effective_selection(Dimension::SubCategory, &state, &options),
            vec!["Phones"]
        );
        assert_eq!(
            effective_selection(Dimension::City, &state, &options),
            options
        );
    }

    #[test]
    fn test_controls_use_overall_bounds_by_default() {
        let dataset = sample_dataset();
        let state = FilterState::new().with_range(Measure::Sales, 100.0, 300.0);
        let run = FilterPipeline::default().run(&dataset, &state);
        let options = resolve_options(&dataset, &run);

        let controls = build_controls(&dataset, &state, &options).unwrap();
        assert_eq!(controls.date_selected, controls.date_bounds);
        assert_eq!(controls.date_bounds.from, date(2016, 1, 5));

        let sales = &controls.measures[0];
        assert_eq!(sales.bounds, NumericRange::new(20.0, 700.0));
        assert_eq!(sales.selected, NumericRange::new(100.0, 300.0));
        assert_eq!(controls.measures[1].selected, NumericRange::new(1.0, 9.0));

        let city = controls
            .dimensions
            .iter()
            .find(|c| c.dimension == Dimension::City)
            .unwrap();
        assert_eq!(city.depends_on, Some(Dimension::State));
        assert_eq!(city.selected, city.options);
    }

    #[test]
    fn test_empty_dependent_options_raise_notice() {
        let dataset = sample_dataset();
        // no Technology sales in the East
        let state = FilterState::new()
            .with_selection(Dimension::Region, ["East"])
            .with_selection(Dimension::Category, ["Technology"]);
        let run = FilterPipeline::default().run(&dataset, &state);
        let options = resolve_options(&dataset, &run);

        let notices = selection_notices(&state, &options, EmptySelectionPolicy::ExcludeAll);
        assert!(notices.contains(&Notice::DependentOptionsEmpty {
            dimension: Dimension::SubCategory,
            governed_by: Dimension::Category,
        }));
        assert!(notices.contains(&Notice::DependentOptionsEmpty {
            dimension: Dimension::City,
            governed_by: Dimension::State,
        }));
    }

    #[test]
    fn test_empty_selection_notice_depends_on_policy() {
        let dataset = sample_dataset();
        let state = FilterState::new().with_selection(Dimension::Segment, Vec::<String>::new());

        let strict_policy = EmptySelectionPolicy::ExcludeAll;
        let run = FilterPipeline::new(strict_policy).run(&dataset, &state);
        let options = resolve_options(&dataset, &run);
        assert_eq!(
            selection_notices(&state, &options, strict_policy),
            vec![
                Notice::EmptySelection {
                    dimension: Dimension::Segment
                },
                Notice::DependentOptionsEmpty {
                    dimension: Dimension::City,
                    governed_by: Dimension::State,
                },
            ]
        );

        let lenient_policy = EmptySelectionPolicy::NoConstraint;
        let run = FilterPipeline::new(lenient_policy).run(&dataset, &state);
        let options = resolve_options(&dataset, &run);
        assert!(selection_notices(&state, &options, lenient_policy).is_empty());
    }
}
