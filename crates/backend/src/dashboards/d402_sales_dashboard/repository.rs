use chrono::{NaiveDate, NaiveDateTime};
use contracts::domain::a025_sales_record::SalesRecord;
use csv::StringRecord;
use once_cell::sync::Lazy;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::dataset::Dataset;
use super::error::LoadError;

/// Columns every source must provide (normalized names)
pub const REQUIRED_COLUMNS: [&str; 21] = [
    "row_id",
    "order_id",
    "order_date",
    "ship_date",
    "ship_mode",
    "customer_id",
    "customer_name",
    "segment",
    "country",
    "city",
    "state",
    "postal_code",
    "region",
    "product_id",
    "category",
    "sub_category",
    "product_name",
    "sales",
    "quantity",
    "discount",
    "profit",
];

/// Result of a successful load
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// At least one valid record
    Loaded(Dataset),
    /// The source parsed but no record survived date cleaning
    Empty { dropped: usize },
}

impl LoadOutcome {
    pub fn dataset(&self) -> Option<&Dataset> {
        match self {
            LoadOutcome::Loaded(dataset) => Some(dataset),
            LoadOutcome::Empty { .. } => None,
        }
    }
}

/// Load the dataset from a CSV file
pub fn load(source: &Path) -> Result<LoadOutcome, LoadError> {
    if !source.exists() {
        return Err(LoadError::NotFound(source.to_path_buf()));
    }

    let file = std::fs::File::open(source).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::NotFound(source.to_path_buf()),
        _ => LoadError::Io(e),
    })?;

    tracing::info!("Loading sales dataset from: {}", source.display());
    load_from_reader(file)
}

/// Load the dataset from any CSV stream
pub fn load_from_reader<R: Read>(reader: R) -> Result<LoadOutcome, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| LoadError::malformed(1, format!("cannot read header row: {}", e)))?
        .clone();
    let columns = ColumnIndex::resolve(&headers)?;

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for result in reader.records() {
        let row = result.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            LoadError::malformed(line, e.to_string())
        })?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        match columns.parse_row(&row, line)? {
            Some(record) => records.push(record),
            None => {
                tracing::debug!("Dropping line {}: unparseable order/ship date", line);
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        tracing::warn!("Dropped {} rows with unparseable dates", dropped);
    }

    if records.is_empty() {
        tracing::warn!("Dataset is empty after cleaning ({} rows dropped)", dropped);
        return Ok(LoadOutcome::Empty { dropped });
    }

    tracing::info!(
        "Loaded {} sales records",
        crate::shared::format::format_number(records.len())
    );

    Ok(LoadOutcome::Loaded(Dataset::new(records)))
}

/// "Sub-Category" -> "sub_category"
fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{FEFF}')
        .trim()
        .to_lowercase()
        .replace([' ', '-'], "_")
}

/// Positions of the required columns in the source header
struct ColumnIndex {
    positions: HashMap<&'static str, usize>,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self, LoadError> {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();

        let mut positions = HashMap::new();
        let mut missing = Vec::new();
        for column in REQUIRED_COLUMNS {
            match normalized.iter().position(|h| h == column) {
                Some(i) => {
                    positions.insert(column, i);
                }
                None => missing.push(column),
            }
        }

        if !missing.is_empty() {
            return Err(LoadError::malformed(
                1,
                format!("missing required column(s): {}", missing.join(", ")),
            ));
        }

        Ok(Self { positions })
    }

    fn text(&self, row: &StringRecord, column: &'static str) -> String {
        self.positions
            .get(column)
            .and_then(|&i| row.get(i))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    fn number<T: std::str::FromStr>(
        &self,
        row: &StringRecord,
        column: &'static str,
        line: u64,
    ) -> Result<T, LoadError> {
        let raw = self.text(row, column);
        parse_number(&raw).ok_or_else(|| {
            LoadError::malformed(line, format!("column `{}`: cannot parse `{}`", column, raw))
        })
    }

    /// Measure column; NaN and infinities are malformed
    fn measure(&self, row: &StringRecord, column: &'static str, line: u64) -> Result<f64, LoadError> {
        let value: f64 = self.number(row, column, line)?;
        if !value.is_finite() {
            return Err(LoadError::malformed(
                line,
                format!("column `{}`: non-finite value `{}`", column, value),
            ));
        }
        Ok(value)
    }

    /// Ok(None) = row dropped because of a date
    fn parse_row(&self, row: &StringRecord, line: u64) -> Result<Option<SalesRecord>, LoadError> {
        let (Some(order_date), Some(ship_date)) = (
            parse_date(&self.text(row, "order_date")),
            parse_date(&self.text(row, "ship_date")),
        ) else {
            return Ok(None);
        };

        Ok(Some(SalesRecord {
            row_id: self.number(row, "row_id", line)?,
            order_id: self.text(row, "order_id"),
            order_date,
            ship_date,
            ship_mode: self.text(row, "ship_mode"),
            customer_id: self.text(row, "customer_id"),
            customer_name: self.text(row, "customer_name"),
            segment: self.text(row, "segment"),
            country: self.text(row, "country"),
            city: self.text(row, "city"),
            state: self.text(row, "state"),
            postal_code: self.text(row, "postal_code"),
            region: self.text(row, "region"),
            product_id: self.text(row, "product_id"),
            category: self.text(row, "category"),
            sub_category: self.text(row, "sub_category"),
            product_name: self.text(row, "product_name"),
            sales: self.measure(row, "sales", line)?,
            quantity: self.number(row, "quantity", line)?,
            discount: self.measure(row, "discount", line)?,
            profit: self.measure(row, "profit", line)?,
        }))
    }
}

/// Parse number that may use comma as decimal separator (European format)
fn parse_number<T: std::str::FromStr>(s: &str) -> Option<T> {
    if let Ok(v) = s.parse::<T>() {
        return Some(v);
    }
    if s.contains(',') && !s.contains('.') {
        return s.replace(',', ".").parse::<T>().ok();
    }
    None
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d.%m.%Y"];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

/// Parse a calendar date in one of the accepted formats, None if unparseable
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}

/// Process-wide memoized loads keyed on the canonical source path
///
/// An entry is replaced only by an explicit `reload`.
pub struct DatasetCache {
    entries: Mutex<HashMap<PathBuf, Arc<LoadOutcome>>>,
}

pub static DATASET_CACHE: Lazy<DatasetCache> = Lazy::new(DatasetCache::new);

impl DatasetCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Memoized load; failures are not cached
    ///
    /// The first load runs under the lock, so concurrent callers share one entry.
    pub fn get_or_load(&self, source: &Path) -> Result<Arc<LoadOutcome>, LoadError> {
        let key = cache_key(source)?;

        match self.lock().entry(key) {
            Entry::Occupied(hit) => Ok(Arc::clone(hit.get())),
            Entry::Vacant(slot) => {
                let outcome = Arc::new(load(slot.key())?);
                Ok(Arc::clone(slot.insert(outcome)))
            }
        }
    }

    /// Load the source again and replace the memoized entry
    ///
    /// On failure the previous entry stays in place.
    pub fn reload(&self, source: &Path) -> Result<Arc<LoadOutcome>, LoadError> {
        let key = cache_key(source)?;
        tracing::info!("Reloading sales dataset: {}", key.display());

        let outcome = match load(&key) {
            Ok(outcome) => Arc::new(outcome),
            Err(e) => {
                tracing::error!(
                    "Reload of {} failed, keeping the previous dataset: {}",
                    key.display(),
                    e
                );
                return Err(e);
            }
        };

        self.lock().insert(key, Arc::clone(&outcome));
        Ok(outcome)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Arc<LoadOutcome>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new()
    }
}

fn cache_key(source: &Path) -> Result<PathBuf, LoadError> {
    source.canonicalize().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::NotFound(source.to_path_buf()),
        _ => LoadError::Io(e),
    })
}
