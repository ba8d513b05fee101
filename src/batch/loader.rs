use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use crate::batch::RawRecord;
use crate::config::Stylist;
use crate::error::{InvoiceError, Result};

/// Expected positional columns of the batch CSV, after the header row.
const COLUMNS: usize = 10;

/// Load the day's batch file. A missing file yields an empty batch; a
/// malformed row aborts the whole load.
pub fn load_batch(path: &Path) -> Result<Vec<RawRecord>> {
    if !path.exists() {
        warn!(path = %path.display(), "batch file not found, treating as empty batch");
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| InvoiceError::BatchRead {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        // Header is row 1; data rows are numbered from 2.
        let line = idx + 2;
        let row = row.map_err(|e| InvoiceError::BatchRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        if row.len() != COLUMNS {
            return Err(InvoiceError::RowShape {
                line,
                expected: COLUMNS,
                found: row.len(),
            });
        }

        records.push(RawRecord {
            stylist: row[0].trim().to_string(),
            invoice: row[1].trim().to_string(),
            date: parse_date(&row[2], line, "date")?,
            period_from: parse_date(&row[3], line, "period-from")?,
            period_to: parse_date(&row[4], line, "period-to")?,
            weeks: parse_weeks(&row[5], line)?,
            services: parse_money(&row[6], line, "services")?,
            products: parse_money(&row[7], line, "products")?,
            tips: parse_money(&row[8], line, "tips")?,
            extra: parse_money(&row[9], line, "extra")?,
        });
    }

    Ok(records)
}

/// Every stylist named in the batch must be configured before any record is
/// processed; money documents must not half-run on a bad directory.
pub fn validate_stylists(
    records: &[RawRecord],
    stylists: &HashMap<String, Stylist>,
) -> Result<()> {
    let mut unknown: Vec<&str> = records
        .iter()
        .map(|r| r.stylist.as_str())
        .filter(|name| !stylists.contains_key(*name))
        .collect();
    unknown.sort_unstable();
    unknown.dedup();

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(InvoiceError::UnknownStylists(unknown.join(", ")))
    }
}

fn parse_date(value: &str, line: usize, column: &'static str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%d/%m/%Y").map_err(|_| InvoiceError::RowField {
        line,
        column,
        value: value.to_string(),
    })
}

fn parse_weeks(value: &str, line: usize) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| InvoiceError::RowField {
            line,
            column: "weeks",
            value: value.to_string(),
        })
}

/// Money fields arrive with currency symbols and thousands separators;
/// strip them before parsing.
fn parse_money(value: &str, line: usize, column: &'static str) -> Result<f64> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !matches!(c, '£' | '$' | ',' | ' '))
        .collect();

    cleaned.parse::<f64>().map_err(|_| InvoiceError::RowField {
        line,
        column,
        value: value.to_string(),
    })
}
