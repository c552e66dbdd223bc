use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Migrate, review, and export a personal net-worth workbook",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Migrate a legacy workbook into the extended Networth / Returns layout
    Migrate(MigrateArgs),
    /// Report statistics and readiness for a migrated workbook
    Review(ReviewArgs),
    /// Print the raw contents of every sheet as aligned tables
    Dump(DumpArgs),
    /// Export migrated records as JSON or CSV
    Export(ExportArgs),
    /// Write a demonstration workbook
    Sample(SampleArgs),
}

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Legacy workbook to migrate (xlsx, xls, or ods)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Destination workbook (defaults to `<input>_improved.xlsx`)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// YAML configuration overriding sentinels, type rules, and styling
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Show the header changes and summary without writing the workbook
    #[arg(long = "dry-run")]
    pub dry_run: bool,
    /// Write the per-row migration report as JSON to this path
    #[arg(long = "report")]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ReviewArgs {
    /// Migrated workbook to review
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// YAML configuration (placeholder values and ticker-bearing types)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Emit the review as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct DumpArgs {
    /// Workbook to dump
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Restrict output to these sheets (repeatable)
    #[arg(long = "sheet", action = clap::ArgAction::Append)]
    pub sheets: Vec<String>,
    /// Number of data rows per sheet (0 means all)
    #[arg(long, default_value_t = 5)]
    pub rows: usize,
    /// Maximum characters per cell (0 means unlimited)
    #[arg(long, default_value_t = 25)]
    pub width: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum ExportTable {
    #[default]
    Investments,
    Returns,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Migrated workbook to export
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output file (stdout if omitted or `-`)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub format: ExportFormat,
    /// Table to write when exporting CSV
    #[arg(long, value_enum, default_value = "investments")]
    pub table: ExportTable,
    /// Keep returns still carrying the link placeholder
    #[arg(long = "include-unlinked")]
    pub include_unlinked: bool,
    /// YAML configuration (placeholder values)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum SampleLayout {
    #[default]
    Legacy,
    Migrated,
}

#[derive(Debug, Args)]
pub struct SampleArgs {
    /// Destination workbook
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Column layout of the generated workbook
    #[arg(long, value_enum, default_value = "legacy")]
    pub layout: SampleLayout,
}
