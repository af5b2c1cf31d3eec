use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use pace_import::logging::{init_logging, LogFormat};
use pace_import::report::{render_line_item, render_products, render_summary, write_json, write_products_json};
use pace_import::{import::ensure_products, parse_memo, read_rows, ColumnRef, ImportConfig, ImportRun};

#[derive(Parser, Debug)]
#[command(name = "pace-import", version, about = "Parse sales memos and extract the product catalog")]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormatArg::Pretty, global = true)]
    log_format: LogFormatArg,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read a sales export and extract unique products
    Products {
        /// CSV or Excel export
        file: PathBuf,

        /// JSON config file (memo column, skip markers, varieties)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Memo column: 0-based index or header name
        #[arg(long)]
        column: Option<String>,

        /// The first row is a header row
        #[arg(long)]
        headers: bool,

        /// Where to write the products JSON
        #[arg(long, default_value = "extracted-products.json")]
        out: PathBuf,

        /// Also write every parsed line item here
        #[arg(long)]
        lines: Option<PathBuf>,

        /// Also write contacts harvested from non-product rows here
        #[arg(long)]
        contacts: Option<PathBuf>,

        /// Fail when no products were extracted
        #[arg(long)]
        strict: bool,
    },

    /// Parse a single memo and print every extracted field
    Parse {
        memo: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format.into());

    match cli.command {
        Command::Products {
            file,
            config,
            column,
            headers,
            out,
            lines,
            contacts,
            strict,
        } => {
            let mut config = match config {
                Some(path) => ImportConfig::from_file(&path)
                    .with_context(|| format!("Failed to load config: {}", path.display()))?,
                None => ImportConfig::default(),
            };
            if let Some(column) = column {
                config.memo_column = ColumnRef::parse(&column);
            }
            if headers {
                config.has_headers = true;
            }

            run_products(&file, &config, &out, lines.as_deref(), contacts.as_deref(), strict)
        }
        Command::Parse { memo } => {
            print!("{}", render_line_item(&parse_memo(&memo)));
            Ok(())
        }
    }
}

fn run_products(
    file: &Path,
    config: &ImportConfig,
    out: &Path,
    lines: Option<&Path>,
    contacts: Option<&Path>,
    strict: bool,
) -> Result<()> {
    info!(file = %file.display(), "loading sales export");
    let table = read_rows(file, config.has_headers)
        .with_context(|| format!("Failed to read sales export: {}", file.display()))?;

    let outcome = ImportRun::new(config)?.execute(&table)?;

    if strict {
        ensure_products(&outcome)?;
    }

    let products = outcome.catalog.to_list();
    print!("{}", render_products(&products));
    println!();
    print!("{}", render_summary(&outcome.summary));

    if outcome.summary.has_silent_losses() {
        warn!(
            rows = outcome.summary.zero_line_total_rows,
            "some memos produced no line total"
        );
    }

    write_products_json(out, &products)
        .with_context(|| format!("Failed to write products to {}", out.display()))?;
    println!("\nProducts saved to {}", out.display());

    if let Some(path) = lines {
        write_json(path, &outcome.line_items)
            .with_context(|| format!("Failed to write line items to {}", path.display()))?;
        println!("Line items saved to {}", path.display());
    }

    if let Some(path) = contacts {
        write_json(path, &outcome.contacts)
            .with_context(|| format!("Failed to write contacts to {}", path.display()))?;
        println!("Contacts saved to {}", path.display());
    }

    Ok(())
}
