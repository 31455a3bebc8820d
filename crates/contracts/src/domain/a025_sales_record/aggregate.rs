use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dashboards::d402_sales_dashboard::{Dimension, Measure};

/// Строка продажи (одна позиция заказа)
///
/// Один заказ может содержать несколько строк, поэтому `order_id` не уникален.
/// Уникальный номер строки в источнике - `row_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Номер строки в исходном файле
    pub row_id: u64,
    /// Номер заказа
    pub order_id: String,
    /// Дата заказа
    pub order_date: NaiveDate,
    /// Дата отгрузки
    pub ship_date: NaiveDate,
    /// Способ доставки
    pub ship_mode: String,
    pub customer_id: String,
    pub customer_name: String,
    /// Сегмент покупателя (Consumer, Corporate, ...)
    pub segment: String,
    pub country: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub region: String,
    pub product_id: String,
    pub category: String,
    pub sub_category: String,
    pub product_name: String,
    /// Сумма продажи
    pub sales: f64,
    /// Количество
    pub quantity: u32,
    /// Скидка (доля, 0.2 = 20%)
    pub discount: f64,
    /// Прибыль (может быть отрицательной)
    pub profit: f64,
}

impl SalesRecord {
    /// Значение категориального измерения
    pub fn dimension_value(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Region => &self.region,
            Dimension::Category => &self.category,
            Dimension::SubCategory => &self.sub_category,
            Dimension::Segment => &self.segment,
            Dimension::ShipMode => &self.ship_mode,
            Dimension::State => &self.state,
            Dimension::City => &self.city,
        }
    }

    /// Значение числового показателя
    pub fn measure_value(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Sales => self.sales,
            Measure::Quantity => f64::from(self.quantity),
            Measure::Discount => self.discount,
            Measure::Profit => self.profit,
        }
    }
}
