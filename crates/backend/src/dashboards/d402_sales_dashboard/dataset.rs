use contracts::dashboards::d402_sales_dashboard::{DateRange, Dimension, Measure, NumericRange};
use contracts::domain::a025_sales_record::SalesRecord;
use std::collections::{BTreeMap, HashSet};

/// Immutable set of valid sales records
///
/// Overall bounds and the option lists of independent dimensions are
/// computed once here and never recomputed per filter cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<SalesRecord>,
    date_bounds: Option<DateRange>,
    measure_bounds: BTreeMap<Measure, NumericRange>,
    base_options: BTreeMap<Dimension, Vec<String>>,
}

impl Dataset {
    pub fn new(records: Vec<SalesRecord>) -> Self {
        let date_bounds = date_bounds(&records);

        let measure_bounds = Measure::ALL
            .iter()
            .filter_map(|&m| measure_bounds(&records, m).map(|b| (m, b)))
            .collect();

        let base_options = Dimension::ALL
            .iter()
            .map(|&d| (d, distinct_values(records.iter(), d)))
            .collect();

        Self {
            records,
            date_bounds,
            measure_bounds,
            base_options,
        }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Min/max order date, None for an empty dataset
    pub fn date_bounds(&self) -> Option<DateRange> {
        self.date_bounds
    }

    /// Overall slider bounds for a measure
    pub fn measure_bounds(&self, measure: Measure) -> Option<NumericRange> {
        self.measure_bounds.get(&measure).copied()
    }

    /// Distinct values of a dimension over the full dataset
    pub fn base_options(&self, dimension: Dimension) -> &[String] {
        self.base_options
            .get(&dimension)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Unfiltered view over every record
    pub fn view(&self) -> FilteredView<'_> {
        FilteredView {
            records: self.records.iter().collect(),
        }
    }
}

/// Dataset restricted by some predicates
///
/// Views are values: narrowing a view produces a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView<'a> {
    records: Vec<&'a SalesRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn empty() -> Self {
        Self { records: vec![] }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a SalesRecord> + '_ {
        self.records.iter().copied()
    }

    /// New view with the records matching `predicate`
    pub fn narrow<F>(&self, predicate: F) -> FilteredView<'a>
    where
        F: Fn(&SalesRecord) -> bool,
    {
        FilteredView {
            records: self.iter().filter(|r| predicate(r)).collect(),
        }
    }

    /// Distinct values of a dimension in order of first appearance
    pub fn distinct_values(&self, dimension: Dimension) -> Vec<String> {
        distinct_values(self.iter(), dimension)
    }

    pub fn row_ids(&self) -> Vec<u64> {
        self.iter().map(|r| r.row_id).collect()
    }

    pub fn to_records(&self) -> Vec<SalesRecord> {
        self.iter().cloned().collect()
    }
}

fn distinct_values<'a>(
    records: impl Iterator<Item = &'a SalesRecord>,
    dimension: Dimension,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for record in records {
        let value = record.dimension_value(dimension);
        if seen.insert(value) {
            values.push(value.to_string());
        }
    }
    values
}

fn date_bounds(records: &[SalesRecord]) -> Option<DateRange> {
    let min = records.iter().map(|r| r.order_date).min()?;
    let max = records.iter().map(|r| r.order_date).max()?;
    Some(DateRange::new(min, max))
}

fn measure_bounds(records: &[SalesRecord], measure: Measure) -> Option<NumericRange> {
    let mut values = records.iter().map(|r| r.measure_value(measure));
    let first = values.next()?;
    let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    Some(NumericRange::new(min, max))
}
