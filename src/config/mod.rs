mod layout;
mod settings;
mod stylist;

pub use layout::{Align, Field, Layout, Placement};
pub use settings::{BatchSettings, Config, EmailSettings, InvoiceSettings, OutputSettings, Rates};
pub use stylist::Stylist;

use crate::error::{InvoiceError, Result};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.salon-invoice/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "salon-invoice") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.salon-invoice/
    let home = dirs_home().ok_or_else(|| {
        InvoiceError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".salon-invoice"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if path.starts_with("~/") {
        if let Some(home) = dirs_home() {
            return home.join(&path[2..]);
        }
    }
    PathBuf::from(path)
}

/// Resolve a configured directory relative to the config dir when it is not
/// absolute.
pub fn resolve_dir(configured: &str, config_dir: &PathBuf) -> PathBuf {
    let expanded = expand_path(configured);
    if expanded.is_absolute() {
        expanded
    } else {
        config_dir.join(expanded)
    }
}

/// Load the main config.toml
pub fn load_config(config_dir: &PathBuf) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(InvoiceError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| InvoiceError::ConfigParse { path, source: e })
}

/// Load stylists.toml as a HashMap keyed by stylist name
pub fn load_stylists(config_dir: &PathBuf) -> Result<HashMap<String, Stylist>> {
    let path = config_dir.join("stylists.toml");
    if !path.exists() {
        return Err(InvoiceError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| InvoiceError::ConfigParse { path, source: e })
}

/// Load the stamp table from layout.toml
pub fn load_layout(config_dir: &PathBuf) -> Result<Layout> {
    let path = config_dir.join("layout.toml");
    if !path.exists() {
        return Err(InvoiceError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| InvoiceError::ConfigParse { path, source: e })
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[rates]
commission = 0.45        # service commission on (services - tips)
weekly = 5.00            # flat weekly chair charge
vat = 0.20
retail_cost = 0.5        # purchase cost share of product turnover
retail_commission = 0.4  # salon share of retail profit

[invoice]
currency_symbol = "£"

[output]
working_dir = "output"
templates_dir = "templates"
sync_root = "~/Dropbox/Salon"
accounts_dir = "Accounts"
# Minimum spacing between writes into the sync root, in milliseconds.
# The sync client chokes on bursts; keep this in the hundreds.
sync_write_delay_ms = 750

[batch]
jobs = 4

[email]
enabled = false
api_url = "https://api.postmarkapp.com/email"
token_env = "SALON_INVOICE_EMAIL_TOKEN"
from = "accounts@yoursalon.example"
subject = "Your invoice {invoice} for {date}"
timeout_secs = 10
"#;

/// Template content for stylists.toml
pub const STYLISTS_TEMPLATE: &str = r#"# One table per stylist. The table name must match the stylist column of
# the batch CSV exactly. 'folder' overrides the folder name under the sync
# root when it differs from the stylist's name.
#
# Example:
#   salon-invoice run figures/22-05-21.csv

["Alex Example"]
email = "alex@example.com"
# folder = "Alex"
"#;

/// Template content for layout.toml — stamp positions for the invoice
/// template, applied top to bottom. Coordinates are top-down points.
pub const LAYOUT_TEMPLATE: &str = r#"[[placement]]
field = "invoice_number"
x = 78.0
y = 198.0

[[placement]]
field = "invoice_date"
x = 78.0
y = 221.0

[[placement]]
field = "service_turnover"
x = 200.0
y = 281.5
align = "center"

[[placement]]
field = "product_turnover"
x = 200.0
y = 305.5
align = "center"

[[placement]]
field = "service_charge"
x = 200.0
y = 406.5
align = "center"

[[placement]]
field = "weekly_charge"
x = 200.0
y = 433.0
align = "center"

[[placement]]
field = "service_vat"
x = 200.0
y = 458.5
align = "center"

[[placement]]
field = "service_release"
x = 200.0
y = 522.5
align = "center"

[[placement]]
field = "retail_release"
x = 200.0
y = 549.5
align = "center"

[[placement]]
field = "extra_adjustment"
x = 200.0
y = 574.5
align = "center"

[[placement]]
field = "tips"
x = 200.0
y = 600.5
align = "center"

[[placement]]
field = "total_release"
x = 200.0
y = 627.5
align = "center"
bold = true

[[placement]]
field = "footer_date"
x = 200.0
y = 717.5
align = "center"

[[placement]]
field = "retail_cost"
x = 465.0
y = 406.5
align = "center"

[[placement]]
field = "retail_profit"
x = 465.0
y = 433.0
align = "center"

[[placement]]
field = "retail_vat"
x = 465.0
y = 458.5
align = "center"

[[placement]]
field = "total_charge"
x = 465.0
y = 574.5
align = "center"
bold = true
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_template_parses() {
        let config: Config = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.rates.commission, 0.45);
        assert_eq!(config.rates.weekly, 5.00);
        assert_eq!(config.invoice.currency_symbol, "£");
        assert_eq!(config.output.sync_write_delay_ms, 750);
        assert!(!config.email.enabled);
    }

    #[test]
    fn stylists_template_parses() {
        let stylists: HashMap<String, Stylist> = toml::from_str(STYLISTS_TEMPLATE).unwrap();
        let alex = stylists.get("Alex Example").unwrap();
        assert_eq!(alex.email, "alex@example.com");
        assert_eq!(alex.folder_name("Alex Example"), "Alex Example");
    }

    #[test]
    fn layout_template_parses_in_order() {
        let layout: Layout = toml::from_str(LAYOUT_TEMPLATE).unwrap();
        assert_eq!(layout.placements.first().unwrap().field, Field::InvoiceNumber);
        assert_eq!(layout.placements.last().unwrap().field, Field::TotalCharge);
        let bold: Vec<Field> = layout
            .placements
            .iter()
            .filter(|p| p.bold)
            .map(|p| p.field)
            .collect();
        assert_eq!(bold, vec![Field::TotalRelease, Field::TotalCharge]);
    }

    #[test]
    fn resolve_dir_keeps_absolute_paths() {
        let cfg = PathBuf::from("/tmp/cfg");
        assert_eq!(resolve_dir("/var/out", &cfg), PathBuf::from("/var/out"));
        assert_eq!(resolve_dir("output", &cfg), PathBuf::from("/tmp/cfg/output"));
    }
}
