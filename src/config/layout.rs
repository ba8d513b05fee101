use serde::{Deserialize, Serialize};

/// The ordered stamp table for the invoice template. Placements are applied
/// in file order; coordinates are top-down points on the template page.
#[derive(Debug, Deserialize, Serialize)]
pub struct Layout {
    #[serde(rename = "placement", default)]
    pub placements: Vec<Placement>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Placement {
    pub field: Field,
    #[serde(default = "default_page")]
    pub page: u32,
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_box")]
    pub width: f32,
    #[serde(default = "default_box")]
    pub height: f32,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub bold: bool,
}

fn default_page() -> u32 {
    1
}

fn default_box() -> f32 {
    100.0
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    InvoiceNumber,
    InvoiceDate,
    PeriodFrom,
    PeriodTo,
    ServiceTurnover,
    ProductTurnover,
    CommissionRate,
    VatRate,
    ServiceCharge,
    WeeklyCharge,
    ServiceVat,
    ServiceRelease,
    RetailCost,
    RetailProfit,
    RetailVat,
    RetailRelease,
    Tips,
    ExtraAdjustment,
    TotalCharge,
    TotalRelease,
    FooterDate,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::InvoiceNumber => "invoice_number",
            Field::InvoiceDate => "invoice_date",
            Field::PeriodFrom => "period_from",
            Field::PeriodTo => "period_to",
            Field::ServiceTurnover => "service_turnover",
            Field::ProductTurnover => "product_turnover",
            Field::CommissionRate => "commission_rate",
            Field::VatRate => "vat_rate",
            Field::ServiceCharge => "service_charge",
            Field::WeeklyCharge => "weekly_charge",
            Field::ServiceVat => "service_vat",
            Field::ServiceRelease => "service_release",
            Field::RetailCost => "retail_cost",
            Field::RetailProfit => "retail_profit",
            Field::RetailVat => "retail_vat",
            Field::RetailRelease => "retail_release",
            Field::Tips => "tips",
            Field::ExtraAdjustment => "extra_adjustment",
            Field::TotalCharge => "total_charge",
            Field::TotalRelease => "total_release",
            Field::FooterDate => "footer_date",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}
