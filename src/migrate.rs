//! The schema migrator: legacy Networth / Investment Returns sheets in,
//! extended layouts plus the Stock Symbols reference sheet out.
//!
//! [`migrate`] is a pure function over an in-memory [`Workbook`]. The input is
//! never modified, so a failure part way through cannot leave a half-migrated
//! document behind; `execute` only writes once the whole migration succeeded.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use crate::{
    cli::MigrateArgs,
    config::MigrationConfig,
    data::{Cell, DateNormalization, normalize_date},
    error::WorkbookError,
    io_utils,
    layout::{ColumnPlan, DroppedColumn, HeaderRename, SheetLayout, networth, returns, symbols},
    sheet::{Sheet, Workbook},
};

#[derive(Debug, Clone)]
pub struct Migration {
    pub workbook: Workbook,
    pub report: MigrationReport,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationReport {
    pub sheets: Vec<SheetReport>,
    pub stock_symbols_created: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetStatus {
    Migrated,
    AlreadyMigrated,
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetReport {
    pub sheet: String,
    pub status: SheetStatus,
    pub legacy_headers: Vec<String>,
    pub headers: Vec<String>,
    pub rows_migrated: usize,
    /// Sheet row number (1-based, header is row 1) where the anchor scan stopped.
    pub end_of_data_row: Option<usize>,
    pub ids_assigned: usize,
    pub columns_added: Vec<String>,
    pub header_renames: Vec<HeaderRename>,
    pub pruned_columns: Vec<PrunedColumn>,
    pub trimmed_columns: usize,
    pub dates: Vec<DateNote>,
}

impl SheetReport {
    fn skipped(sheet: &Sheet) -> Self {
        Self {
            sheet: sheet.name.clone(),
            status: SheetStatus::AlreadyMigrated,
            legacy_headers: sheet.headers.clone(),
            headers: sheet.headers.clone(),
            rows_migrated: 0,
            end_of_data_row: None,
            ids_assigned: 0,
            columns_added: Vec::new(),
            header_renames: Vec::new(),
            pruned_columns: Vec::new(),
            trimmed_columns: 0,
            dates: Vec::new(),
        }
    }

    pub fn dates_normalized(&self) -> usize {
        self.dates
            .iter()
            .filter(|note| note.outcome.replacement().is_some())
            .count()
    }

    pub fn dates_kept(&self) -> impl Iterator<Item = &DateNote> {
        self.dates.iter().filter(|note| note.outcome.is_kept())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PrunedColumn {
    #[serde(flatten)]
    pub column: DroppedColumn,
    pub non_empty_cells: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateNote {
    pub row: usize,
    pub column: String,
    pub outcome: DateNormalization,
}

pub fn execute(args: &MigrateArgs) -> Result<()> {
    let config = MigrationConfig::load_or_default(args.config.as_deref())?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| io_utils::default_output_path(&args.input));
    io_utils::ensure_distinct_output(&args.input, &output)?;

    info!("Reading legacy workbook {:?}", args.input);
    let legacy = io_utils::read_workbook(&args.input)?;
    let migration = migrate(&legacy, &config)
        .with_context(|| format!("Migrating workbook {:?}", args.input))?;

    if args.dry_run {
        for sheet in &migration.report.sheets {
            print!("{}", render_header_diff(sheet));
        }
        print!("{}", render_summary(&migration.report, None));
        info!("Dry run complete; nothing written");
    } else {
        io_utils::write_workbook(&migration.workbook, &output, &config.style)
            .with_context(|| format!("Writing migrated workbook to {output:?}"))?;
        info!("Migrated workbook written to {output:?}");
        print!("{}", render_summary(&migration.report, Some(&output)));
    }

    if let Some(report_path) = &args.report {
        let json = serde_json::to_string_pretty(&migration.report)?;
        fs::write(report_path, json)
            .with_context(|| format!("Writing migration report to {report_path:?}"))?;
        info!("Migration report written to {report_path:?}");
    }
    Ok(())
}

pub fn migrate(legacy: &Workbook, config: &MigrationConfig) -> Result<Migration, WorkbookError> {
    let networth_sheet = legacy
        .get(networth::SHEET)
        .ok_or_else(|| WorkbookError::MissingSheet(networth::SHEET.to_string()))?;
    let returns_sheet = legacy
        .get(returns::SHEET)
        .ok_or_else(|| WorkbookError::MissingSheet(returns::SHEET.to_string()))?;

    let networth_pending = !networth::LAYOUT.is_migrated(&networth_sheet.headers);
    let returns_pending = !returns::LAYOUT.is_migrated(&returns_sheet.headers);
    if !networth_pending && !returns_pending {
        return Err(WorkbookError::AlreadyMigrated);
    }

    let mut workbook = legacy.clone();
    let mut report = MigrationReport::default();

    if networth_pending {
        let (sheet, sheet_report) = migrate_networth(networth_sheet, config);
        workbook.upsert(sheet);
        report.sheets.push(sheet_report);
    } else {
        warn!("Sheet '{}' already has the target layout; skipping", networth::SHEET);
        report.sheets.push(SheetReport::skipped(networth_sheet));
    }

    if returns_pending {
        let (sheet, sheet_report) = migrate_returns(returns_sheet, config);
        workbook.upsert(sheet);
        report.sheets.push(sheet_report);
    } else {
        warn!("Sheet '{}' already has the target layout; skipping", returns::SHEET);
        report.sheets.push(SheetReport::skipped(returns_sheet));
    }

    report.stock_symbols_created = ensure_stock_symbols(&mut workbook, config);
    Ok(Migration { workbook, report })
}

/// Columns, renames and pruning; rows keep their order and count.
fn restructure(layout: &SheetLayout, legacy: &Sheet) -> (Sheet, SheetReport) {
    let mut plan = ColumnPlan::resolve(layout, &legacy.headers);
    plan.cover_width(layout, legacy.width(), legacy.headers.len());

    let pruned_columns = plan
        .dropped
        .iter()
        .map(|column| {
            let non_empty_cells = legacy
                .rows
                .iter()
                .filter(|row| row.get(column.legacy_index).is_some_and(|c| !c.is_empty()))
                .count();
            if non_empty_cells > 0 {
                warn!(
                    "Sheet '{}': pruning column {} ('{}') discards {} non-empty cell(s)",
                    layout.sheet,
                    column.legacy_index + 1,
                    column.header,
                    non_empty_cells
                );
            }
            PrunedColumn {
                column: column.clone(),
                non_empty_cells,
            }
        })
        .collect();

    let rows = legacy.rows.iter().map(|row| plan.project_row(row)).collect();
    let mut sheet = Sheet::new(legacy.name.clone(), plan.headers.clone()).with_rows(rows);
    let trimmed_columns = sheet.trim_empty_trailing_columns(layout.columns.len());

    let report = SheetReport {
        sheet: legacy.name.clone(),
        status: SheetStatus::Migrated,
        legacy_headers: legacy.headers.clone(),
        headers: sheet.headers.clone(),
        rows_migrated: 0,
        end_of_data_row: None,
        ids_assigned: 0,
        columns_added: plan.added,
        header_renames: plan.renames,
        pruned_columns,
        trimmed_columns,
        dates: Vec::new(),
    };
    (sheet, report)
}

/// Index of the first row whose anchor is empty, or the row count.
fn data_extent(sheet: &Sheet, anchor: usize) -> usize {
    sheet.anchored_rows(anchor).count()
}

fn finish_scan(report: &mut SheetReport, sheet: &Sheet, extent: usize) {
    report.rows_migrated = extent;
    report.end_of_data_row = (extent < sheet.rows.len()).then_some(extent + 2);
    info!(
        "Sheet '{}': migrated {} row(s) into {} column(s)",
        sheet.name,
        extent,
        sheet.headers.len()
    );
}

fn apply_date(
    row: &mut [Cell],
    column: usize,
    column_name: &str,
    row_number: usize,
    sheet: &str,
    config: &MigrationConfig,
    notes: &mut Vec<DateNote>,
) {
    let outcome = normalize_date(&row[column], &config.legacy_date_format);
    if let Some(date) = outcome.replacement() {
        row[column] = Cell::Date(date);
    }
    if let DateNormalization::Kept { original, reason } = &outcome {
        warn!("Sheet '{sheet}' row {row_number}: kept '{original}' in '{column_name}' ({reason})");
    }
    if !matches!(
        outcome,
        DateNormalization::Empty | DateNormalization::AlreadyStructured
    ) {
        notes.push(DateNote {
            row: row_number,
            column: column_name.to_string(),
            outcome,
        });
    }
}

pub fn migrate_networth(legacy: &Sheet, config: &MigrationConfig) -> (Sheet, SheetReport) {
    use networth::*;

    let (mut sheet, mut report) = restructure(&LAYOUT, legacy);
    let extent = data_extent(&sheet, LAYOUT.anchor);
    let mut dates = Vec::new();

    for (offset, row) in sheet.rows.iter_mut().take(extent).enumerate() {
        let row_number = offset + 2;
        row[ID] = Cell::String(config.format_id(offset + 1));

        let platform = row[PLATFORM].as_display();
        let investment_type = row[INVESTMENT_TYPE].as_display();
        if row[ASSET_NAME].is_empty() {
            row[ASSET_NAME] = Cell::String(format!(
                "{} - {}",
                platform.trim(),
                investment_type.trim()
            ));
        }

        if config.wants_auto_update(&investment_type) {
            row[AUTO_UPDATE] = Cell::text("YES");
            if row[TICKER_SYMBOL].is_empty() {
                row[TICKER_SYMBOL] = Cell::String(config.ticker_placeholder.clone());
            }
        } else {
            row[AUTO_UPDATE] = Cell::text("NO");
        }

        apply_date(
            row,
            UPDATED_DATE,
            LAYOUT.columns[UPDATED_DATE].name,
            row_number,
            SHEET,
            config,
            &mut dates,
        );
    }

    report.ids_assigned = extent;
    report.dates = dates;
    finish_scan(&mut report, &sheet, extent);
    (sheet, report)
}

pub fn migrate_returns(legacy: &Sheet, config: &MigrationConfig) -> (Sheet, SheetReport) {
    use returns::*;

    let (mut sheet, mut report) = restructure(&LAYOUT, legacy);
    let extent = data_extent(&sheet, LAYOUT.anchor);
    let mut dates = Vec::new();

    for (offset, row) in sheet.rows.iter_mut().take(extent).enumerate() {
        let row_number = offset + 2;
        if row[INVESTMENT_ID].is_empty() {
            row[INVESTMENT_ID] = Cell::String(config.link_placeholder.clone());
        }
        apply_date(
            row,
            DATE,
            LAYOUT.columns[DATE].name,
            row_number,
            SHEET,
            config,
            &mut dates,
        );
    }

    report.dates = dates;
    finish_scan(&mut report, &sheet, extent);
    (sheet, report)
}

/// Adds the Stock Symbols reference sheet unless one already exists.
/// Returns whether the sheet was created.
pub fn ensure_stock_symbols(workbook: &mut Workbook, config: &MigrationConfig) -> bool {
    if workbook.contains(symbols::SHEET) {
        info!("Sheet '{}' already present; leaving it unchanged", symbols::SHEET);
        return false;
    }
    let headers = symbols::HEADERS.iter().map(|h| h.to_string()).collect();
    let rows = config
        .stock_symbols
        .iter()
        .map(|seed| seed.iter().map(|value| Cell::text(value.as_str())).collect())
        .collect();
    workbook.upsert(Sheet::new(symbols::SHEET, headers).with_rows(rows));
    true
}

pub fn render_header_diff(report: &SheetReport) -> String {
    let before = lines_of(&report.legacy_headers);
    let after = lines_of(&report.headers);
    let diff = TextDiff::from_lines(&before, &after);
    let mut out = format!("--- {} (legacy)\n+++ {} (migrated)\n", report.sheet, report.sheet);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        out.push_str(sign);
        out.push_str(change.value().trim_end_matches('\n'));
        out.push('\n');
    }
    out
}

fn lines_of(headers: &[String]) -> String {
    headers.iter().map(|h| format!("{h}\n")).collect()
}

pub fn render_summary(report: &MigrationReport, output: Option<&Path>) -> String {
    let mut lines = Vec::new();
    match output {
        Some(path) => {
            lines.push("Workbook migrated successfully".to_string());
            lines.push(format!("Saved as: {}", path.display()));
        }
        None => lines.push("Dry run: no file written".to_string()),
    }
    lines.push(String::new());
    lines.push("Changes:".to_string());
    for sheet in &report.sheets {
        lines.push(format!("  {} sheet:", sheet.sheet));
        if sheet.status == SheetStatus::AlreadyMigrated {
            lines.push("    - already migrated, left unchanged".to_string());
            continue;
        }
        lines.push(format!("    - {} data row(s) processed", sheet.rows_migrated));
        if let Some(row) = sheet.end_of_data_row {
            lines.push(format!("    - scan stopped at row {row} (empty anchor cell)"));
        }
        if sheet.ids_assigned > 0 {
            lines.push(format!(
                "    - assigned {} sequential ID(s)",
                sheet.ids_assigned
            ));
        }
        if !sheet.columns_added.is_empty() {
            lines.push(format!(
                "    - added columns: {}",
                sheet.columns_added.join(", ")
            ));
        }
        for rename in &sheet.header_renames {
            lines.push(format!("    - renamed '{}' to '{}'", rename.from, rename.to));
        }
        if !sheet.pruned_columns.is_empty() {
            let lost: usize = sheet.pruned_columns.iter().map(|c| c.non_empty_cells).sum();
            lines.push(format!(
                "    - removed {} column(s) past the retained layout ({lost} non-empty cell(s))",
                sheet.pruned_columns.len()
            ));
        }
        if sheet.trimmed_columns > 0 {
            lines.push(format!(
                "    - trimmed {} empty trailing column(s)",
                sheet.trimmed_columns
            ));
        }
        lines.push(format!(
            "    - normalized {} date(s)",
            sheet.dates_normalized()
        ));
        for note in sheet.dates_kept() {
            if let DateNormalization::Kept { original, reason } = &note.outcome {
                lines.push(format!(
                    "    - row {} {}: kept '{original}' ({reason})",
                    note.row, note.column
                ));
            }
        }
    }
    lines.push(format!("  {} sheet:", symbols::SHEET));
    if report.stock_symbols_created {
        lines.push("    - created with sample entries".to_string());
    } else {
        lines.push("    - already present, left unchanged".to_string());
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
