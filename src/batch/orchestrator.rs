use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Mutex;
use tracing::{error, info};

use crate::batch::RawRecord;
use crate::config::{Layout, OutputSettings, Rates, Stylist};
use crate::dist::{invoice_filename, plan_destinations, Distributor};
use crate::error::InvoiceError;
use crate::invoice::compute;
use crate::notify::{Delivery, Mailer};
use crate::pdf::{fill_document, TemplateStore};

/// Pipeline stage a record failed in, for the end-of-run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fill,
    Distribute,
    Notify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Fill => write!(f, "fill"),
            Stage::Distribute => write!(f, "distribute"),
            Stage::Notify => write!(f, "notify"),
        }
    }
}

#[derive(Debug)]
pub struct RecordSuccess {
    pub stylist: String,
    pub invoice: String,
    pub total_release: f64,
    pub delivery: Option<Delivery>,
}

#[derive(Debug)]
pub struct RecordFailure {
    pub stylist: String,
    pub invoice: String,
    pub stage: Stage,
    pub reason: String,
}

/// Everything a worker needs to process one record. Shared immutably across
/// the pool; the distributor's gate is the only synchronized piece.
pub struct Pipeline<'a> {
    pub rates: &'a Rates,
    pub symbol: &'a str,
    pub layout: &'a Layout,
    pub stylists: &'a HashMap<String, Stylist>,
    pub templates: &'a dyn TemplateStore,
    pub distributor: &'a Distributor,
    pub working_dir: &'a PathBuf,
    pub sync_root: &'a PathBuf,
    pub output: &'a OutputSettings,
    pub mailer: Option<&'a dyn Mailer>,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<RecordSuccess>,
    pub failed: Vec<RecordFailure>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

impl Pipeline<'_> {
    /// Full per-record pipeline: compute, fill, distribute, notify. Each
    /// stage failure is mapped to its stage for the summary; a notify
    /// failure does not roll back the already-saved document.
    fn process(&self, record: &RawRecord) -> Result<RecordSuccess, RecordFailure> {
        let fail = |stage: Stage, e: InvoiceError| RecordFailure {
            stylist: record.stylist.clone(),
            invoice: record.invoice.clone(),
            stage,
            reason: e.to_string(),
        };

        let figures = compute(record, self.rates);

        let bytes = fill_document(self.templates, self.layout, &figures, self.symbol)
            .map_err(|e| fail(Stage::Fill, e))?;

        let stylist = self
            .stylists
            .get(&figures.stylist)
            .ok_or_else(|| {
                fail(
                    Stage::Distribute,
                    InvoiceError::StylistNotFound(figures.stylist.clone()),
                )
            })?;

        let destinations = plan_destinations(
            self.working_dir,
            self.sync_root,
            self.output,
            stylist,
            &figures,
        );
        self.distributor
            .distribute(&bytes, &destinations, &figures)
            .map_err(|e| fail(Stage::Distribute, e))?;

        let delivery = match self.mailer {
            Some(mailer) => Some(
                mailer
                    .send(&figures, &stylist.email, &bytes, &invoice_filename(&figures))
                    .map_err(|e| fail(Stage::Notify, e))?,
            ),
            None => None,
        };

        Ok(RecordSuccess {
            stylist: figures.stylist,
            invoice: figures.invoice,
            total_release: figures.total_release,
            delivery,
        })
    }
}

/// Process every record on a bounded worker pool. Workers pull from a shared
/// queue and report through a channel into the collector owned here; the
/// scope joins every worker before the summary is returned, and one record's
/// failure never aborts its siblings.
pub fn process_batch(records: Vec<RawRecord>, pipeline: &Pipeline<'_>, jobs: usize) -> BatchSummary {
    let mut summary = BatchSummary::default();
    if records.is_empty() {
        return summary;
    }

    let workers = jobs.max(1).min(records.len());
    let queue = Mutex::new(records.into_iter());
    let (tx, rx) = mpsc::channel::<Result<RecordSuccess, RecordFailure>>();

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let queue = &queue;
            scope.spawn(move || loop {
                let record = {
                    let mut guard = match queue.lock() {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    guard.next()
                };
                let Some(record) = record else {
                    break;
                };

                info!(stylist = %record.stylist, invoice = %record.invoice, "processing record");
                let outcome = pipeline.process(&record);
                if tx.send(outcome).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        // Single collector; runs on this thread until every worker is done.
        for outcome in rx {
            match outcome {
                Ok(success) => summary.succeeded.push(success),
                Err(failure) => {
                    error!(
                        stylist = %failure.stylist,
                        invoice = %failure.invoice,
                        stage = %failure.stage,
                        reason = %failure.reason,
                        "record failed"
                    );
                    summary.failed.push(failure);
                }
            }
        }
    });

    summary
}
