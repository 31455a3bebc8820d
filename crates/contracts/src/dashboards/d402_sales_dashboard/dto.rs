use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::a025_sales_record::SalesRecord;

/// Категориальное измерение, фильтруемое мультиселектом
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Region,
    Category,
    SubCategory,
    Segment,
    ShipMode,
    State,
    City,
}

impl Dimension {
    /// Все измерения в порядке объявления фильтров
    pub const ALL: [Dimension; 7] = [
        Dimension::Region,
        Dimension::Category,
        Dimension::SubCategory,
        Dimension::Segment,
        Dimension::ShipMode,
        Dimension::State,
        Dimension::City,
    ];

    /// Управляющее измерение для каскадных опций (подкатегория от категории, город от штата)
    pub fn depends_on(&self) -> Option<Dimension> {
        match self {
            Dimension::SubCategory => Some(Dimension::Category),
            Dimension::City => Some(Dimension::State),
            _ => None,
        }
    }

    pub fn is_dependent(&self) -> bool {
        self.depends_on().is_some()
    }

    /// Отображаемое имя
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Region => "Region",
            Dimension::Category => "Category",
            Dimension::SubCategory => "Sub-Category",
            Dimension::Segment => "Segment",
            Dimension::ShipMode => "Ship Mode",
            Dimension::State => "State",
            Dimension::City => "City",
        }
    }
}

/// Числовой показатель, фильтруемый слайдером диапазона
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Sales,
    Quantity,
    Discount,
    Profit,
}

impl Measure {
    pub const ALL: [Measure; 4] = [
        Measure::Sales,
        Measure::Quantity,
        Measure::Discount,
        Measure::Profit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Measure::Sales => "Sales",
            Measure::Quantity => "Quantity",
            Measure::Discount => "Discount",
            Measure::Profit => "Profit",
        }
    }

    /// Шаг слайдера
    pub fn step(&self) -> f64 {
        match self {
            Measure::Sales => 10.0,
            Measure::Quantity => 1.0,
            Measure::Discount => 0.01,
            Measure::Profit => 1.0,
        }
    }
}

/// Интервал дат заказа (включительно)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Дата начала в формате "YYYY-MM-DD"
    pub from: NaiveDate,
    /// Дата окончания в формате "YYYY-MM-DD"
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Числовой интервал (включительно)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Активные ограничения фильтров для одного цикла пересчета
///
/// Все поля необязательны: измерение без записи в `selections` сохраняет
/// выбор по умолчанию (все доступные опции), показатель без записи в
/// `ranges` сохраняет общие границы. Явно пустой выбор является
/// ограничением и обрабатывается политикой пустого выбора.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// Интервал дат заказа, None = весь период набора данных
    #[serde(default)]
    pub date_range: Option<DateRange>,
    /// Выбранные значения по измерениям
    #[serde(default)]
    pub selections: BTreeMap<Dimension, BTreeSet<String>>,
    /// Выбранные интервалы по показателям
    #[serde(default)]
    pub ranges: BTreeMap<Measure, NumericRange>,
    /// Вернуть отфильтрованные записи для таблицы сырых данных
    #[serde(default)]
    pub include_records: bool,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_range = Some(DateRange::new(from, to));
        self
    }

    pub fn with_selection<I, S>(mut self, dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selections
            .insert(dimension, values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_range(mut self, measure: Measure, min: f64, max: f64) -> Self {
        self.ranges.insert(measure, NumericRange::new(min, max));
        self
    }

    pub fn with_records(mut self) -> Self {
        self.include_records = true;
        self
    }

    /// Запрошенный выбор по измерению, None = по умолчанию (все опции)
    pub fn selection(&self, dimension: Dimension) -> Option<&BTreeSet<String>> {
        self.selections.get(&dimension)
    }
}

/// Состояние мультиселекта для одного измерения
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionControl {
    pub dimension: Dimension,
    /// Отображаемое имя (например, "Sub-Category")
    pub label: String,
    /// Доступные значения в порядке первого появления
    pub options: Vec<String>,
    /// Фактический выбор (подмножество `options`)
    pub selected: Vec<String>,
    /// Управляющее измерение для каскадных опций
    pub depends_on: Option<Dimension>,
}

/// Состояние слайдера для одного показателя
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureControl {
    pub measure: Measure,
    pub label: String,
    /// Общие границы полного набора данных
    pub bounds: NumericRange,
    /// Текущий примененный интервал
    pub selected: NumericRange,
    pub step: f64,
}

/// Все, что нужно слою представления для боковой панели фильтров
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardControls {
    /// Общие границы дат заказа полного набора данных
    pub date_bounds: DateRange,
    /// Текущий примененный интервал дат заказа
    pub date_selected: DateRange,
    pub dimensions: Vec<DimensionControl>,
    pub measures: Vec<MeasureControl>,
}

/// Ключевые показатели по отфильтрованной выборке
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total_sales: f64,
    pub total_profit: f64,
    pub total_quantity: u64,
    /// Количество записей, по которым посчитаны итоги
    pub record_count: usize,
    pub formatted: KpiDisplay,
}

/// Строки для карточек KPI (например, "$1,234.56")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiDisplay {
    pub total_sales: String,
    pub total_profit: String,
    pub total_quantity: String,
}

/// Строка группового агрегата (ключ группы -> значение метрики)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub key: String,
    pub value: f64,
}

impl AggregateRow {
    pub fn new(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Точка диаграммы рассеяния продажи/прибыль
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub sales: f64,
    pub profit: f64,
    /// Группа цвета
    pub category: String,
    pub product_name: String,
    pub customer_name: String,
    pub order_id: String,
    pub order_date: NaiveDate,
}

/// Подготовленные данные для всех графиков дашборда
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSet {
    /// Ключи "YYYY-MM", по хронологии, месяцы без заказов = 0
    pub monthly_sales: Vec<AggregateRow>,
    /// По убыванию продаж
    pub sales_by_category: Vec<AggregateRow>,
    /// По убыванию прибыли
    pub profit_by_sub_category: Vec<AggregateRow>,
    pub sales_by_region: Vec<AggregateRow>,
    pub sales_by_segment: Vec<AggregateRow>,
    /// По убыванию продаж, обрезано до настроенного top N
    pub top_states_by_sales: Vec<AggregateRow>,
    pub sales_vs_profit: Vec<ScatterPoint>,
}

/// Информационное состояние цикла (не ошибка)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// По измерению ничего не выбрано
    EmptySelection { dimension: Dimension },
    /// У каскадного измерения нет опций, хотя в управляющем есть выбор
    DependentOptionsEmpty {
        dimension: Dimension,
        governed_by: Dimension,
    },
    /// Фильтры исключили все записи
    NoMatchingRecords,
}

impl Notice {
    /// Текст сообщения для боковой панели
    pub fn message(&self) -> String {
        match self {
            Notice::EmptySelection { dimension } => format!(
                "No {} selected. Showing no data for {} related charts.",
                dimension.label(),
                dimension.label().to_lowercase()
            ),
            Notice::DependentOptionsEmpty {
                dimension,
                governed_by,
            } => format!(
                "No {} values match the current filters. Select at least one {} or adjust other filters.",
                dimension.label(),
                governed_by.label()
            ),
            Notice::NoMatchingRecords => {
                "No data available for the selected filters. Please adjust your selections."
                    .to_string()
            }
        }
    }
}

/// Результат цикла
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardStatus {
    /// KPI и графики присутствуют
    Ready,
    /// Фильтры исключили все записи, KPI и графики пропущены
    NoMatchingRecords,
    /// В источнике нет валидных записей после очистки
    EmptyDataset,
}

/// Ответ дашборда продаж
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub status: DashboardStatus,
    /// None, если набор данных пуст
    pub controls: Option<DashboardControls>,
    /// Количество валидных записей в наборе данных
    pub total_records: usize,
    /// Количество записей в отфильтрованной выборке
    pub matched_records: usize,
    pub kpis: Option<KpiSummary>,
    pub charts: Option<ChartSet>,
    /// Отфильтрованные записи, только по запросу
    pub records: Option<Vec<SalesRecord>>,
    pub notices: Vec<Notice>,
}

impl DashboardResponse {
    /// Ответ для источника без валидных записей
    pub fn empty_dataset() -> Self {
        Self {
            status: DashboardStatus::EmptyDataset,
            controls: None,
            total_records: 0,
            matched_records: 0,
            kpis: None,
            charts: None,
            records: None,
            notices: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_state_defaults_from_empty_json() {
        let state: FilterState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, FilterState::default());
        assert!(state.selection(Dimension::Region).is_none());
    }

    #[test]
    fn test_filter_state_json_shape() {
        let json = r#"{
            "date_range": {"from": "2016-01-01", "to": "2016-12-31"},
            "selections": {"sub_category": ["Chairs"], "region": []},
            "ranges": {"sales": {"min": 10.0, "max": 500.0}}
        }"#;
        let state: FilterState = serde_json::from_str(json).unwrap();

        let range = state.date_range.unwrap();
        assert_eq!(range.from, NaiveDate::from_ymd_opt(2016, 1, 1).unwrap());
        assert!(state.selection(Dimension::Region).unwrap().is_empty());
        assert!(state
            .selection(Dimension::SubCategory)
            .unwrap()
            .contains("Chairs"));
        assert_eq!(state.ranges[&Measure::Sales], NumericRange::new(10.0, 500.0));
        assert!(!state.include_records);
    }

    #[test]
    fn test_notice_is_tagged() {
        let notice = Notice::DependentOptionsEmpty {
            dimension: Dimension::City,
            governed_by: Dimension::State,
        };
        let value = serde_json::to_value(&notice).unwrap();
        assert_eq!(value["kind"], "dependent_options_empty");
        assert_eq!(value["dimension"], "city");
        assert_eq!(value["governed_by"], "state");
    }

    #[test]
    fn test_dependencies() {
        assert_eq!(Dimension::SubCategory.depends_on(), Some(Dimension::Category));
        assert_eq!(Dimension::City.depends_on(), Some(Dimension::State));
        assert!(Dimension::ALL
            .iter()
            .filter(|d| d.is_dependent())
            .all(|d| matches!(d, Dimension::SubCategory | Dimension::City)));
    }

    #[test]
    fn test_ranges_are_inclusive() {
        let range = NumericRange::new(1.0, 2.0);
        assert!(range.contains(1.0));
        assert!(range.contains(2.0));
        assert!(!range.contains(2.0001));

        let d = |day| NaiveDate::from_ymd_opt(2017, 3, day).unwrap();
        let dates = DateRange::new(d(1), d(31));
        assert!(dates.contains(d(1)));
        assert!(dates.contains(d(31)));
    }
}
