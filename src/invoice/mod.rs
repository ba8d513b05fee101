mod figures;

pub use figures::{compute, display_date, format_money, format_percent, InvoiceFigures};
