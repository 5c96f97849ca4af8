use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use kit::api::StatsClient;
use kit::commands::{self, Format};
use kit::renderer::chart::ChartOptions;
use kit::source::Source;
use kit::{browse, logging};

#[derive(Parser)]
#[command(name = "kit", version)]
#[command(about = "Daily download stats for krew plugins", long_about = None)]
struct Cli {
    /// Base URL or local directory holding plugins.json
    #[arg(long, global = true, env = "KIT_SOURCE", default_value = ".")]
    source: String,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List plugin names
    Plugins,
    /// Show when the plugin directory was last updated
    Updated,
    /// Show daily downloads of a plugin
    Show {
        /// Plugin name (see `kit plugins`)
        plugin: String,
        /// Start date: YYYY-MM-DD, today, -Nd, or none (default: 7 days ago)
        #[arg(long)]
        from: Option<String>,
        /// End date: YYYY-MM-DD, today, -Nd, or none (default: today)
        #[arg(long)]
        to: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Chart)]
        format: Format,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Leave missing days as gaps instead of bridging them
        #[arg(long)]
        no_connect: bool,
        /// Chart height in rows
        #[arg(long, default_value_t = 10)]
        height: usize,
    },
    /// Pick a plugin and dates interactively
    Browse {
        /// Plugin to start with
        plugin: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.log_file.as_deref())?;

    let source = Source::parse(&cli.source).context("Invalid --source")?;
    let client = StatsClient::new(source).context("Failed to create HTTP client")?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Plugins => {
            print!("{}", runtime.block_on(commands::plugins(&client))?);
        }
        Commands::Updated => {
            print!("{}", runtime.block_on(commands::updated(&client))?);
        }
        Commands::Show {
            plugin,
            from,
            to,
            format,
            output,
            no_connect,
            height,
        } => {
            let range = commands::range_from_args(from.as_deref(), to.as_deref(), today)?;
            let chart_options = ChartOptions {
                height,
                connect_gaps: !no_connect,
                ..ChartOptions::default()
            };
            let rendered = runtime.block_on(commands::show(
                &client,
                &plugin,
                range,
                format,
                &chart_options,
            ))?;

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent).with_context(|| {
                            format!("Failed to create output directory: {}", parent.display())
                        })?;
                    }
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    eprintln!("Report written to: {}", path.display());
                }
                None => print!("{}", rendered),
            }
        }
        Commands::Browse { plugin, from, to } => {
            let range = commands::range_from_args(from.as_deref(), to.as_deref(), today)?;
            runtime.block_on(browse::run(client, range, plugin))?;
        }
    }

    Ok(())
}
