pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::report::ReportFormat;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "bulk-site-import")]
#[command(about = "Bulk-create sites and attach users from comma-separated rows")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Rows to import ("-" reads stdin)
    #[arg(short, long, default_value = "-")]
    pub input: String,

    /// Platform snapshot (JSON); overrides [platform].snapshot
    #[arg(short, long)]
    pub platform: Option<String>,

    /// Override [import].max_rows
    #[arg(long)]
    pub max_rows: Option<usize>,

    /// Report format: text, json or csv
    #[arg(short, long)]
    pub format: Option<ReportFormat>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Save the updated platform snapshot after importing
    #[arg(long)]
    pub write_back: bool,

    /// Only validate the rows, do not touch the platform
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}
