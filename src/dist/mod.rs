use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::{OutputSettings, Stylist};
use crate::error::{InvoiceError, Result};
use crate::invoice::{display_date, InvoiceFigures};

/// Filename shared by every copy of a filled invoice.
pub fn invoice_filename(figures: &InvoiceFigures) -> String {
    format!(
        "invoice {} - {}.pdf",
        figures.invoice,
        display_date(figures.date)
    )
}

/// One write target for a filled document. `require` names a directory that
/// must already exist (the stylist's own folder, the accounts root); missing
/// parents below it are created.
#[derive(Debug, Clone)]
pub struct Destination {
    pub path: PathBuf,
    /// Whether the write lands under the shared sync root and must be paced.
    pub synced: bool,
    pub require: Option<PathBuf>,
}

/// Working copy first, then the stylist's sync folder, then the monthly
/// accounts folder. Order matters: the local copy must exist even when the
/// sync destinations fail.
pub fn plan_destinations(
    working_dir: &Path,
    sync_root: &Path,
    output: &OutputSettings,
    stylist: &Stylist,
    figures: &InvoiceFigures,
) -> Vec<Destination> {
    let filename = invoice_filename(figures);
    let folder = stylist.folder_name(&figures.stylist);

    let stylist_dir = sync_root.join(folder);
    let accounts_root = sync_root.join(&output.accounts_dir);
    let monthly = accounts_root
        .join(figures.date.format("%Y").to_string())
        .join(figures.date.format("%B %Y").to_string());

    vec![
        Destination {
            path: working_dir.join(&figures.stylist).join(&filename),
            synced: false,
            require: None,
        },
        Destination {
            path: stylist_dir.join("Invoices").join(&filename),
            synced: true,
            require: Some(stylist_dir),
        },
        Destination {
            path: monthly.join(&filename),
            synced: true,
            require: Some(accounts_root),
        },
    ]
}

/// Minimum-spacing gate for the sync client. One gate is shared by every
/// worker; the sync mechanism is the rate-sensitive resource, not the files.
pub struct SyncGate {
    delay: Duration,
    last: Mutex<Option<Instant>>,
}

impl SyncGate {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last: Mutex::new(None),
        }
    }

    /// Blocks until at least `delay` has passed since the previous paced
    /// write was released.
    pub fn pace(&self) {
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.delay {
                std::thread::sleep(self.delay - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}

pub struct Distributor {
    gate: SyncGate,
}

impl Distributor {
    pub fn new(delay: Duration) -> Self {
        Self {
            gate: SyncGate::new(delay),
        }
    }

    /// Write the finished document to each destination in order. Failures
    /// name the path so a missing stylist folder is diagnosable from the
    /// run summary.
    pub fn distribute(
        &self,
        bytes: &[u8],
        destinations: &[Destination],
        figures: &InvoiceFigures,
    ) -> Result<()> {
        for dest in destinations {
            if let Some(required) = &dest.require {
                if !required.is_dir() {
                    return Err(InvoiceError::DestinationMissing {
                        stylist: figures.stylist.clone(),
                        invoice: figures.invoice.clone(),
                        path: required.clone(),
                    });
                }
            }

            if let Some(parent) = dest.path.parent() {
                fs::create_dir_all(parent).map_err(|e| InvoiceError::DestinationWrite {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }

            if dest.synced {
                self.gate.pace();
            }

            fs::write(&dest.path, bytes).map_err(|e| InvoiceError::DestinationWrite {
                path: dest.path.clone(),
                source: e,
            })?;
            debug!(path = %dest.path.display(), "wrote invoice copy");
        }
        Ok(())
    }
}
