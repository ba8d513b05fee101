mod batch;
mod config;
mod dist;
mod error;
mod invoice;
mod notify;
mod pdf;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tabled::{settings::Style, Table, Tabled};
use tracing_subscriber::EnvFilter;

use crate::batch::{load_batch, process_batch, validate_stylists, Pipeline};
use crate::config::{
    config_dir, expand_path, load_config, load_layout, load_stylists, resolve_dir,
    CONFIG_TEMPLATE, LAYOUT_TEMPLATE, STYLISTS_TEMPLATE,
};
use crate::dist::Distributor;
use crate::error::{InvoiceError, Result};
use crate::invoice::{compute, display_date, format_money};
use crate::notify::{EmailClient, Mailer};
use crate::pdf::PdfTemplates;

#[derive(Parser)]
#[command(name = "salon-invoice")]
#[command(version, about = "Batch salon invoice generator", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.salon-invoice or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with template files
    Init,

    /// Process a batch file: fill, distribute and email every invoice
    Run {
        /// Path to the batch CSV export
        batch: PathBuf,

        /// Skip the email step even when email is enabled in config
        #[arg(long)]
        no_email: bool,

        /// Number of records processed in parallel (default from config)
        #[arg(long)]
        jobs: Option<usize>,
    },

    /// Load a batch and print the computed figures without writing anything
    Check {
        /// Path to the batch CSV export
        batch: PathBuf,
    },

    /// List configured stylists
    Stylists,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Run {
            batch,
            no_email,
            jobs,
        } => cmd_run(&cfg_dir, &batch, no_email, jobs),
        Commands::Check { batch } => cmd_check(&cfg_dir, &batch),
        Commands::Stylists => cmd_stylists(&cfg_dir),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &PathBuf) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(InvoiceError::AlreadyInitialized(cfg_dir.clone()));
    }

    // Create directories
    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;
    fs::create_dir_all(cfg_dir.join("templates"))?;

    // Write template files
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(cfg_dir.join("stylists.toml"), STYLISTS_TEMPLATE)?;
    fs::write(cfg_dir.join("layout.toml"), LAYOUT_TEMPLATE)?;

    println!("Initialized salon-invoice config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Review rates and folders:     $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!(
        "  2. Add your stylists:            $EDITOR {}/stylists.toml",
        cfg_dir.display()
    );
    println!(
        "  3. Drop one PDF template per stylist into {}/templates/",
        cfg_dir.display()
    );
    println!();
    println!("Then process your first batch:");
    println!("  salon-invoice run figures/22-05-21.csv");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct StylistRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "EMAIL")]
    email: String,
    #[tabled(rename = "SYNC FOLDER")]
    folder: String,
}

#[derive(Tabled)]
struct CheckRow {
    #[tabled(rename = "STYLIST")]
    stylist: String,
    #[tabled(rename = "INVOICE")]
    invoice: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "SERVICES")]
    services: String,
    #[tabled(rename = "PRODUCTS")]
    products: String,
    #[tabled(rename = "TIPS")]
    tips: String,
    #[tabled(rename = "CHARGE")]
    charge: String,
    #[tabled(rename = "RELEASE")]
    release: String,
}

#[derive(Tabled)]
struct RunRow {
    #[tabled(rename = "STYLIST")]
    stylist: String,
    #[tabled(rename = "INVOICE")]
    invoice: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "DETAIL")]
    detail: String,
}

/// List configured stylists
fn cmd_stylists(cfg_dir: &PathBuf) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(InvoiceError::ConfigNotFound(cfg_dir.clone()));
    }

    let stylists = load_stylists(cfg_dir)?;

    if stylists.is_empty() {
        println!("No stylists configured.");
        println!("Add stylists to: {}/stylists.toml", cfg_dir.display());
        return Ok(());
    }

    let mut sorted: Vec<_> = stylists.iter().collect();
    sorted.sort_by_key(|(name, _)| *name);

    let rows: Vec<StylistRow> = sorted
        .iter()
        .map(|(name, stylist)| StylistRow {
            name: name.to_string(),
            email: stylist.email.clone(),
            folder: stylist.folder_name(name).to_string(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Load a batch and print the computed figures, touching nothing on disk
fn cmd_check(cfg_dir: &PathBuf, batch_path: &PathBuf) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(InvoiceError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let records = load_batch(batch_path)?;

    if records.is_empty() {
        println!("No invoice records in {}.", batch_path.display());
        return Ok(());
    }

    let symbol = &config.invoice.currency_symbol;
    let rows: Vec<CheckRow> = records
        .iter()
        .map(|record| {
            let figures = compute(record, &config.rates);
            CheckRow {
                stylist: figures.stylist.clone(),
                invoice: figures.invoice.clone(),
                date: display_date(figures.date),
                services: format_money(figures.services, symbol),
                products: format_money(figures.products, symbol),
                tips: format_money(figures.tips, symbol),
                charge: format_money(figures.total_charge, symbol),
                release: format_money(figures.total_release, symbol),
            }
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!("{} record(s) checked", records.len());

    Ok(())
}

/// Process one batch end to end
fn cmd_run(
    cfg_dir: &PathBuf,
    batch_path: &PathBuf,
    no_email: bool,
    jobs: Option<usize>,
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(InvoiceError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let stylists = load_stylists(cfg_dir)?;
    let layout = load_layout(cfg_dir)?;

    let records = load_batch(batch_path)?;
    validate_stylists(&records, &stylists)?;

    let working_dir = resolve_dir(&config.output.working_dir, cfg_dir);
    let templates_dir = resolve_dir(&config.output.templates_dir, cfg_dir);
    let sync_root = expand_path(&config.output.sync_root);

    let templates = PdfTemplates::new(templates_dir);
    let distributor = Distributor::new(Duration::from_millis(config.output.sync_write_delay_ms));

    let mailer = if config.email.enabled && !no_email {
        Some(EmailClient::from_settings(
            &config.email,
            &config.invoice.currency_symbol,
        )?)
    } else {
        None
    };

    let pipeline = Pipeline {
        rates: &config.rates,
        symbol: &config.invoice.currency_symbol,
        layout: &layout,
        stylists: &stylists,
        templates: &templates,
        distributor: &distributor,
        working_dir: &working_dir,
        sync_root: &sync_root,
        output: &config.output,
        mailer: mailer.as_ref().map(|m| m as &dyn Mailer),
    };

    let jobs = jobs.unwrap_or(config.batch.jobs);
    let summary = process_batch(records, &pipeline, jobs);

    println!(
        "Processed {} invoice(s): {} succeeded, {} failed",
        summary.total(),
        summary.succeeded.len(),
        summary.failed.len()
    );

    if summary.total() > 0 {
        let symbol = &config.invoice.currency_symbol;
        let mut rows: Vec<RunRow> = summary
            .succeeded
            .iter()
            .map(|s| RunRow {
                stylist: s.stylist.clone(),
                invoice: s.invoice.clone(),
                status: "OK".to_string(),
                detail: match &s.delivery {
                    Some(delivery) => format!(
                        "released {}, emailed ({})",
                        format_money(s.total_release, symbol),
                        delivery.id
                    ),
                    None => format!("released {}", format_money(s.total_release, symbol)),
                },
            })
            .collect();
        rows.extend(summary.failed.iter().map(|f| RunRow {
            stylist: f.stylist.clone(),
            invoice: f.invoice.clone(),
            status: format!("FAILED ({})", f.stage),
            detail: f.reason.clone(),
        }));

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!();
        println!("{table}");
    }

    Ok(())
}
