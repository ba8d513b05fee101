use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub rates: Rates,
    pub invoice: InvoiceSettings,
    pub output: OutputSettings,
    #[serde(default)]
    pub batch: BatchSettings,
    pub email: EmailSettings,
}

/// The calculation model applied to every record in a batch.
/// Commission is charged on service turnover net of tips.
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct Rates {
    pub commission: f64,
    pub weekly: f64,
    pub vat: f64,
    pub retail_cost: f64,
    pub retail_commission: f64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InvoiceSettings {
    pub currency_symbol: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct OutputSettings {
    pub working_dir: String,
    pub templates_dir: String,
    /// Root of the shared cloud-sync folder. Writes under it are paced.
    pub sync_root: String,
    /// Accounts folder name under sync_root; year/month subfolders are
    /// created per invoice date.
    pub accounts_dir: String,
    #[serde(default = "default_sync_delay_ms")]
    pub sync_write_delay_ms: u64,
}

fn default_sync_delay_ms() -> u64 {
    750
}

#[derive(Debug, Deserialize, Serialize)]
pub struct BatchSettings {
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
        }
    }
}

fn default_jobs() -> usize {
    4
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EmailSettings {
    pub enabled: bool,
    pub api_url: String,
    /// Name of the environment variable holding the API server token.
    pub token_env: String,
    pub from: String,
    /// Subject line; {invoice} and {date} are substituted per record.
    pub subject: String,
    #[serde(default = "default_email_timeout")]
    pub timeout_secs: u64,
}

fn default_email_timeout() -> u64 {
    10
}
