use chrono::NaiveDate;

/// One validated row of the batch CSV, numeric fields already parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub stylist: String,
    pub invoice: String,
    pub date: NaiveDate,
    pub period_from: NaiveDate,
    pub period_to: NaiveDate,
    pub weeks: u32,
    pub services: f64,
    pub products: f64,
    pub tips: f64,
    pub extra: f64,
}
