//! Column type classification.
//!
//! Labels every column of a [`Table`] as numeric, categorical, or temporal.
//! The temporal probe runs before the numeric one, so a column of
//! date-shaped strings (including compact `YYYYMMDD` forms) lands in the
//! temporal bucket even when it looks numeric. Anything that defeats
//! probing falls back to categorical; classification never fails.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::table::Table;

/// Date-only formats accepted by the temporal probe.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y", "%Y%m%d"];

/// Datetime formats accepted by the temporal probe.
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Column names partitioned by semantic kind.
///
/// The three lists are disjoint and together cover every column of the
/// classified table exactly once, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnKinds {
    /// Columns with numeric storage types.
    pub numeric: Vec<String>,
    /// Columns holding free text or anything unprobeable.
    pub categorical: Vec<String>,
    /// Columns holding dates or timestamps.
    pub temporal: Vec<String>,
}

impl ColumnKinds {
    /// Total number of classified columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len() + self.temporal.len()
    }

    /// Returns true if no columns were classified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classify every column of a table.
#[must_use]
pub fn classify(table: &Table) -> ColumnKinds {
    let mut kinds = ColumnKinds::default();

    for name in table.column_names() {
        if is_temporal(table, &name) {
            kinds.temporal.push(name);
        } else if table.is_numeric_column(&name) {
            kinds.numeric.push(name);
        } else {
            kinds.categorical.push(name);
        }
    }

    kinds
}

/// Temporal probe for a single column.
///
/// Date/timestamp storage types pass outright. String columns pass when
/// they hold at least one non-missing value and every non-missing value
/// parses as a date; empty strings count as missing.
fn is_temporal(table: &Table, name: &str) -> bool {
    if table.is_temporal_column(name) {
        return true;
    }
    if !table.is_string_column(name) {
        return false;
    }

    let Some(values) = table.string_values(name) else {
        return false;
    };

    let mut parsed_any = false;
    for value in values.iter().flatten() {
        if value.is_empty() {
            continue;
        }
        if parse_date(value).is_none() {
            return false;
        }
        parsed_any = true;
    }

    parsed_any
}

/// Parse a single cell as a calendar date.
///
/// Tries date-only formats, then datetime formats, then RFC 3339.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    None
}
