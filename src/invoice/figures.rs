use chrono::NaiveDate;

use crate::batch::RawRecord;
use crate::config::{Field, Rates};

/// Everything derived from one batch record. Values stay numeric until the
/// document-fill boundary; rounding happens only when a display string is
/// produced, so the splits always foot against the turnover figures.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceFigures {
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

    pub commission_rate: f64,
    pub vat_rate: f64,

    pub service_charge: f64,
    pub weekly_charge: f64,
    pub service_vat: f64,
    pub service_release: f64,
    pub retail_cost: f64,
    pub retail_profit: f64,
    pub retail_vat: f64,
    pub retail_release: f64,
    pub total_charge: f64,
    pub total_release: f64,
}

/// Derive the full figure set for one record. Pure and deterministic; the
/// same record and rates always produce the same figures.
pub fn compute(record: &RawRecord, rates: &Rates) -> InvoiceFigures {
    let service_charge = (record.services - record.tips) * rates.commission;
    let weekly_charge = record.weeks as f64 * rates.weekly;
    let service_vat = (service_charge + weekly_charge) * rates.vat;
    let service_release = record.services - service_charge - weekly_charge - service_vat;

    let retail_cost = record.products * rates.retail_cost;
    let retail_profit = (record.products - retail_cost) * rates.retail_commission;
    let retail_vat = retail_profit * rates.vat;
    let retail_release = record.products - retail_cost - retail_profit - retail_vat;

    let total_charge =
        service_charge + weekly_charge + retail_cost + retail_profit + service_vat + retail_vat;
    let total_release = service_release + retail_release + record.tips + record.extra;

    InvoiceFigures {
        stylist: record.stylist.clone(),
        invoice: record.invoice.clone(),
        date: record.date,
        period_from: record.period_from,
        period_to: record.period_to,
        weeks: record.weeks,
        services: record.services,
        products: record.products,
        tips: record.tips,
        extra: record.extra,
        commission_rate: rates.commission,
        vat_rate: rates.vat,
        service_charge,
        weekly_charge,
        service_vat,
        service_release,
        retail_cost,
        retail_profit,
        retail_vat,
        retail_release,
        total_charge,
        total_release,
    }
}

impl InvoiceFigures {
    /// Display string for one layout field. This is the only place figures
    /// are rounded.
    pub fn field_text(&self, field: Field, symbol: &str) -> String {
        match field {
            Field::InvoiceNumber => self.invoice.clone(),
            Field::InvoiceDate | Field::FooterDate => display_date(self.date),
            Field::PeriodFrom => display_date(self.period_from),
            Field::PeriodTo => display_date(self.period_to),
            Field::CommissionRate => format_percent(self.commission_rate),
            Field::VatRate => format_percent(self.vat_rate),
            Field::ServiceTurnover => format_money(self.services, symbol),
            Field::ProductTurnover => format_money(self.products, symbol),
            Field::ServiceCharge => format_money(self.service_charge, symbol),
            Field::WeeklyCharge => format_money(self.weekly_charge, symbol),
            Field::ServiceVat => format_money(self.service_vat, symbol),
            Field::ServiceRelease => format_money(self.service_release, symbol),
            Field::RetailCost => format_money(self.retail_cost, symbol),
            Field::RetailProfit => format_money(self.retail_profit, symbol),
            Field::RetailVat => format_money(self.retail_vat, symbol),
            Field::RetailRelease => format_money(self.retail_release, symbol),
            Field::Tips => format_money(self.tips, symbol),
            Field::ExtraAdjustment => format_money(self.extra, symbol),
            Field::TotalCharge => format_money(self.total_charge, symbol),
            Field::TotalRelease => format_money(self.total_release, symbol),
        }
    }
}

/// Currency display: fixed symbol prefix, exactly two decimal places.
pub fn format_money(value: f64, symbol: &str) -> String {
    format!("{symbol}{value:.2}")
}

/// Percentage display: no fixed decimal places (0.45 becomes "45%").
pub fn format_percent(rate: f64) -> String {
    let scaled = rate * 100.0;
    if (scaled - scaled.round()).abs() < 1e-9 {
        format!("{}%", scaled.round() as i64)
    } else {
        format!("{scaled}%")
    }
}

/// Canonical display form for invoice dates, used in filenames and stamped
/// fields alike.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}
