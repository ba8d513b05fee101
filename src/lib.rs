pub mod batch;
pub mod config;
pub mod dist;
pub mod error;
pub mod invoice;
pub mod notify;
pub mod pdf;

pub use batch::{load_batch, process_batch, BatchSummary, RawRecord};
pub use config::{Config, Layout, Rates, Stylist};
pub use error::{InvoiceError, Result};
pub use invoice::{compute, InvoiceFigures};
