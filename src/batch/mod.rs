mod loader;
mod orchestrator;
mod record;

pub use loader::{load_batch, validate_stylists};
pub use orchestrator::{
    process_batch, BatchSummary, Pipeline, RecordFailure, RecordSuccess, Stage,
};
pub use record::RawRecord;
