use chrono::{Datelike, Months, NaiveDate};
use contracts::dashboards::d402_sales_dashboard::{
    AggregateRow, ChartSet, Dimension, KpiDisplay, KpiSummary, Measure, ScatterPoint,
};
use contracts::domain::a025_sales_record::SalesRecord;
use std::collections::BTreeMap;

use super::dataset::FilteredView;
use crate::shared::format::{format_currency, format_quantity};

/// Aggregation function applied per group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFn {
    Sum,
    Count,
    Mean,
    Min,
    Max,
}

/// What records are grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Dimension(Dimension),
    /// Calendar month of the order date, key "YYYY-MM"
    OrderMonth,
}

impl GroupKey {
    fn key_of(&self, record: &SalesRecord) -> String {
        match self {
            GroupKey::Dimension(d) => record.dimension_value(*d).to_string(),
            GroupKey::OrderMonth => month_key(month_start(record.order_date)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sum: f64,
    count: usize,
    min: f64,
    max: f64,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            sum: 0.0,
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn finish(&self, agg: AggFn) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        match agg {
            AggFn::Sum => self.sum,
            AggFn::Count => self.count as f64,
            AggFn::Mean => self.sum / self.count as f64,
            AggFn::Min => self.min,
            AggFn::Max => self.max,
        }
    }
}

/// KPI scalars; all zero on an empty view
pub fn summarize(view: &FilteredView<'_>) -> KpiSummary {
    let mut total_sales = 0.0;
    let mut total_profit = 0.0;
    let mut total_quantity = 0u64;

    for record in view.iter() {
        total_sales += record.sales;
        total_profit += record.profit;
        total_quantity += u64::from(record.quantity);
    }

    KpiSummary {
        total_sales,
        total_profit,
        total_quantity,
        record_count: view.len(),
        formatted: KpiDisplay {
            total_sales: format_currency(total_sales),
            total_profit: format_currency(total_profit),
            total_quantity: format_quantity(total_quantity),
        },
    }
}

/// Group the view and aggregate one metric per group, ordered by key ascending
///
/// An empty view gives an empty result.
pub fn group_by(
    view: &FilteredView<'_>,
    key: GroupKey,
    metric: Measure,
    agg: AggFn,
) -> Vec<AggregateRow> {
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
    for record in view.iter() {
        groups
            .entry(key.key_of(record))
            .or_default()
            .push(record.measure_value(metric));
    }

    groups
        .into_iter()
        .map(|(key, acc)| AggregateRow::new(key, acc.finish(agg)))
        .collect()
}

/// Largest value first; equal values keep key order
pub fn sort_descending(mut rows: Vec<AggregateRow>) -> Vec<AggregateRow> {
    rows.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.key.cmp(&b.key)));
    rows
}

/// Monthly sales, chronological, every month between the first and the last
/// order present (months without orders = 0)
pub fn monthly_sales_trend(view: &FilteredView<'_>) -> Vec<AggregateRow> {
    let mut months: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in view.iter() {
        *months.entry(month_start(record.order_date)).or_insert(0.0) += record.sales;
    }

    let (Some(&first), Some(&last)) = (months.keys().next(), months.keys().next_back()) else {
        return vec![];
    };

    let mut rows = Vec::new();
    let mut month = first;
    while month <= last {
        let value = months.get(&month).copied().unwrap_or(0.0);
        rows.push(AggregateRow::new(month_key(month), value));
        match month.checked_add_months(Months::new(1)) {
            Some(next) => month = next,
            None => break,
        }
    }
    rows
}

pub fn sales_by_category(view: &FilteredView<'_>) -> Vec<AggregateRow> {
    sort_descending(group_by(
        view,
        GroupKey::Dimension(Dimension::Category),
        Measure::Sales,
        AggFn::Sum,
    ))
}

pub fn profit_by_sub_category(view: &FilteredView<'_>) -> Vec<AggregateRow> {
    sort_descending(group_by(
        view,
        GroupKey::Dimension(Dimension::SubCategory),
        Measure::Profit,
        AggFn::Sum,
    ))
}

pub fn sales_by_region(view: &FilteredView<'_>) -> Vec<AggregateRow> {
    group_by(
        view,
        GroupKey::Dimension(Dimension::Region),
        Measure::Sales,
        AggFn::Sum,
    )
}

pub fn sales_by_segment(view: &FilteredView<'_>) -> Vec<AggregateRow> {
    group_by(
        view,
        GroupKey::Dimension(Dimension::Segment),
        Measure::Sales,
        AggFn::Sum,
    )
}

/// States by sales, descending, first `limit` only
pub fn top_states_by_sales(view: &FilteredView<'_>, limit: usize) -> Vec<AggregateRow> {
    let mut rows = sort_descending(group_by(
        view,
        GroupKey::Dimension(Dimension::State),
        Measure::Sales,
        AggFn::Sum,
    ));
    rows.truncate(limit);
    rows
}

/// One scatter point per record
pub fn sales_vs_profit(view: &FilteredView<'_>) -> Vec<ScatterPoint> {
    view.iter()
        .map(|r| ScatterPoint {
            sales: r.sales,
            profit: r.profit,
            category: r.category.clone(),
            product_name: r.product_name.clone(),
            customer_name: r.customer_name.clone(),
            order_id: r.order_id.clone(),
            order_date: r.order_date,
        })
        .collect()
}

/// Inputs of every chart
pub fn build_charts(view: &FilteredView<'_>, top_states: usize) -> ChartSet {
    ChartSet {
        monthly_sales: monthly_sales_trend(view),
        sales_by_category: sales_by_category(view),
        profit_by_sub_category: profit_by_sub_category(view),
        sales_by_region: sales_by_region(view),
        sales_by_segment: sales_by_segment(view),
        top_states_by_sales: top_states_by_sales(view, top_states),
        sales_vs_profit: sales_vs_profit(view),
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn month_key(month: NaiveDate) -> String {
    month.format("%Y-%m").to_string()
}
