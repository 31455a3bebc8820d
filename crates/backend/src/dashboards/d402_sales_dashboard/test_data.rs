//! Fixtures shared by the d402 unit tests.

use chrono::NaiveDate;
use contracts::domain::a025_sales_record::SalesRecord;
use std::path::PathBuf;

use super::dataset::Dataset;

pub const HEADER: &str = "Row ID,Order ID,Order Date,Ship Date,Ship Mode,Customer ID,Customer Name,Segment,Country,City,State,Postal Code,Region,Product ID,Category,Sub-Category,Product Name,Sales,Quantity,Discount,Profit";

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Write a CSV fixture into the temp dir, unique per test and process
pub fn write_csv(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "d402_{}_{}.csv",
        name,
        std::process::id()
    ));
    std::fs::write(&path, contents).unwrap();
    path
}

pub struct RecordBuilder {
    record: SalesRecord,
}

impl RecordBuilder {
    pub fn new(row_id: u64) -> Self {
        Self {
            record: SalesRecord {
                row_id,
                order_id: format!("CA-2016-{:06}", row_id),
                order_date: date(2016, 6, 1),
                ship_date: date(2016, 6, 5),
                ship_mode: "Standard Class".to_string(),
                customer_id: "CG-12520".to_string(),
                customer_name: "Claire Gute".to_string(),
                segment: "Consumer".to_string(),
                country: "United States".to_string(),
                city: "Henderson".to_string(),
                state: "Kentucky".to_string(),
                postal_code: "42420".to_string(),
                region: "South".to_string(),
                product_id: "FUR-BO-10001798".to_string(),
                category: "Furniture".to_string(),
                sub_category: "Bookcases".to_string(),
                product_name: "Bush Somerset Collection Bookcase".to_string(),
                sales: 100.0,
                quantity: 2,
                discount: 0.0,
                profit: 10.0,
            },
        }
    }

    pub fn order_date(mut self, date: NaiveDate) -> Self {
        self.record.order_date = date;
        self.record.ship_date = date + chrono::Duration::days(4);
        self
    }

    pub fn region(mut self, region: &str) -> Self {
        self.record.region = region.to_string();
        self
    }

    pub fn location(mut self, state: &str, city: &str) -> Self {
        self.record.state = state.to_string();
        self.record.city = city.to_string();
        self
    }

    pub fn product(mut self, category: &str, sub_category: &str) -> Self {
        self.record.category = category.to_string();
        self.record.sub_category = sub_category.to_string();
        self
    }

    pub fn segment(mut self, segment: &str) -> Self {
        self.record.segment = segment.to_string();
        self
    }

    pub fn ship_mode(mut self, ship_mode: &str) -> Self {
        self.record.ship_mode = ship_mode.to_string();
        self
    }

    pub fn amounts(mut self, sales: f64, quantity: u32, discount: f64, profit: f64) -> Self {
        self.record.sales = sales;
        self.record.quantity = quantity;
        self.record.discount = discount;
        self.record.profit = profit;
        self
    }

    pub fn build(self) -> SalesRecord {
        self.record
    }
}

/// Ten records over four regions, three categories and eight states
///
/// Totals: sales 2380, profit 248, quantity 33.
pub fn sample_records() -> Vec<SalesRecord> {
    let row = |id: u64,
               d: NaiveDate,
               region: &str,
               state: &str,
               city: &str,
               cat: &str,
               sub: &str,
               seg: &str,
               mode: &str| {
        RecordBuilder::new(id)
            .order_date(d)
            .region(region)
            .location(state, city)
            .product(cat, sub)
            .segment(seg)
            .ship_mode(mode)
    };

    vec![
        row(1, date(2016, 1, 5), "West", "California", "Los Angeles", "Furniture", "Chairs", "Consumer", "Second Class")
            .amounts(200.0, 2, 0.0, 30.0)
            .build(),
        row(2, date(2016, 2, 14), "West", "California", "San Francisco", "Technology", "Phones", "Corporate", "Standard Class")
            .amounts(500.0, 5, 0.2, 80.0)
            .build(),
        row(3, date(2016, 2, 20), "East", "New York", "New York City", "Office Supplies", "Binders", "Consumer", "First Class")
            .amounts(50.0, 1, 0.0, 12.0)
            .build(),
        row(4, date(2016, 5, 3), "East", "Pennsylvania", "Philadelphia", "Furniture", "Tables", "Home Office", "Standard Class")
            .amounts(300.0, 3, 0.4, -40.0)
            .build(),
        row(5, date(2016, 5, 30), "Central", "Texas", "Houston", "Office Supplies", "Paper", "Consumer", "Standard Class")
            .amounts(20.0, 4, 0.2, 5.0)
            .build(),
        row(6, date(2016, 9, 12), "Central", "Illinois", "Chicago", "Technology", "Accessories", "Corporate", "Same Day")
            .amounts(120.0, 2, 0.0, 25.0)
            .build(),
        row(7, date(2016, 11, 8), "South", "Kentucky", "Henderson", "Furniture", "Bookcases", "Consumer", "Second Class")
            .amounts(260.0, 2, 0.0, 41.0)
            .build(),
        row(8, date(2017, 1, 15), "South", "Florida", "Miami", "Technology", "Phones", "Home Office", "Standard Class")
            .amounts(700.0, 9, 0.2, 60.0)
            .build(),
        row(9, date(2017, 3, 1), "West", "Washington", "Seattle", "Office Supplies", "Binders", "Corporate", "First Class")
            .amounts(80.0, 3, 0.2, 20.0)
            .build(),
        row(10, date(2017, 3, 20), "East", "New York", "Buffalo", "Furniture", "Chairs", "Consumer", "Standard Class")
            .amounts(150.0, 2, 0.1, 15.0)
            .build(),
    ]
}

pub fn sample_dataset() -> Dataset {
    Dataset::new(sample_records())
}

/// Approximate float comparison for summed currency values
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
