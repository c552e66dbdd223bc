//! Demonstration workbooks in either the legacy or the migrated layout.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;

use crate::{
    cli::{SampleArgs, SampleLayout},
    config::MigrationConfig,
    data::Cell,
    io_utils,
    layout::{networth, returns},
    migrate,
    sheet::{Sheet, Workbook},
};

pub fn execute(args: &SampleArgs) -> Result<()> {
    let workbook = match args.layout {
        SampleLayout::Legacy => legacy_workbook(),
        SampleLayout::Migrated => migrated_workbook(),
    };
    let config = MigrationConfig::default();
    io_utils::write_workbook(&workbook, &args.output, &config.style)
        .with_context(|| format!("Writing sample workbook to {:?}", args.output))?;
    info!(
        "Sample workbook ({:?} layout) written to {:?}",
        args.layout, args.output
    );
    Ok(())
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn opt_text(value: &str) -> Cell {
    if value.is_empty() {
        Cell::Empty
    } else {
        Cell::text(value)
    }
}

/// Legacy-layout workbook with text dates, one unparseable date, bare-year
/// return dates and stray columns past the Returns layout.
pub fn legacy_workbook() -> Workbook {
    let holdings: [(&str, &str, f64, f64, &str, &str); 6] = [
        ("Coinbase", "CRYPTO", 1000.0, 1200.0, "USD", "27-08-2025"),
        ("CommSec", "STOCK", 15000.0, 18500.0, "AUD", "01-12-2025"),
        ("Interactive Brokers", "ETF", 25000.0, 32000.0, "USD", "05-12-2025"),
        ("ING Direct", "SAVING", 50000.0, 51250.0, "AUD", "15-12-2025"),
        ("Vanguard", "FUND", 35000.0, 38200.0, "AUD", "sometime in 2025"),
        ("Commercial Bank", "BOND", 1_500_000.0, 1_625_000.0, "LKR", "30-11-2025"),
    ];
    let networth_rows = holdings
        .iter()
        .map(|(platform, kind, invested, current, currency, updated)| {
            vec![
                Cell::text(*platform),
                Cell::text(*kind),
                Cell::Float(*invested),
                Cell::Float(*current),
                Cell::Float(current - invested),
                Cell::text(*currency),
                Cell::text(*updated),
            ]
        })
        .collect();
    let networth = Sheet::new(
        networth::SHEET,
        headers(&[
            "Platform",
            "Investment Type",
            "Invested Amount",
            "Current Amount",
            "Profit/Loss",
            "Currency",
            "Updated Date",
        ]),
    )
    .with_rows(networth_rows);

    let payouts: [(&str, &str, Cell, f64, &str, &str); 5] = [
        ("CBA.AX", "DIVIDEND", Cell::text("15-11-2025"), 450.0, "AUD", "Quarterly dividend"),
        ("VOO", "DIVIDEND", Cell::Float(2023.0), 320.0, "USD", "Annual total"),
        ("ING Savings", "INTEREST", Cell::Float(2021.0), 125.0, "AUD", ""),
        ("GSBE29", "BOND", Cell::text("20-11-2025"), 400.0, "AUD", "Semi-annual coupon"),
        ("T-BILL", "INTEREST", Cell::text("30/11/2025"), 62500.0, "LKR", "Maturity"),
    ];
    let returns_rows = payouts
        .into_iter()
        .map(|(instrument, kind, date, amount, currency, notes)| {
            vec![
                Cell::text(instrument),
                Cell::text(kind),
                date,
                Cell::Float(amount),
                Cell::text(currency),
                opt_text(notes),
                Cell::Empty,
                Cell::Empty,
            ]
        })
        .collect();
    let returns = Sheet::new(
        returns::SHEET,
        headers(&[
            "Stock/Instrument",
            "Investment Type/Return type",
            "Date",
            "Amount",
            "Currency",
            "Comments",
            "",
            "Column1",
        ]),
    )
    .with_rows(returns_rows);

    Workbook::new(vec![networth, returns])
}

/// Migrated-layout workbook with resolved tickers and linked returns.
pub fn migrated_workbook() -> Workbook {
    let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).map(Cell::Date).unwrap_or_default();
    let holdings: [(&str, &str, &str, &str, f64, f64, &str, Cell, Cell, f64, &str, &str); 8] = [
        ("CommSec", "STOCK", "CBA.AX", "Commonwealth Bank", 15000.0, 18500.0, "AUD", d(2025, 12, 1), d(2023, 6, 15), 50.0, "YES", "Australian bank stock"),
        ("Interactive Brokers", "ETF", "VOO", "Vanguard S&P 500 ETF", 25000.0, 32000.0, "USD", d(2025, 12, 5), d(2023, 3, 20), 80.0, "YES", "US market ETF"),
        ("Coinbase", "CRYPTO", "BTC", "Bitcoin", 8000.0, 12500.0, "USD", d(2025, 12, 10), d(2024, 1, 10), 0.15, "YES", "Cryptocurrency"),
        ("ING Direct", "SAVING", "N/A", "High Interest Savings", 50000.0, 51250.0, "AUD", d(2025, 12, 15), d(2023, 1, 5), 1.0, "NO", "Savings account 2.5% p.a."),
        ("CommSec", "BOND", "GSBE29", "Australian Government Bond", 20000.0, 20800.0, "AUD", d(2025, 11, 20), d(2023, 8, 12), 20.0, "NO", "10-year treasury bond"),
        ("Interactive Brokers", "ETF", "IWDA.L", "iShares MSCI World", 18000.0, 21500.0, "SGD", d(2025, 11, 28), d(2023, 9, 10), 100.0, "YES", "Global equities"),
        ("Commercial Bank", "BOND", "T-BILL", "Sri Lanka Treasury Bill", 1_500_000.0, 1_625_000.0, "LKR", d(2025, 11, 30), d(2024, 5, 20), 15.0, "NO", "6-month treasury bill"),
        ("Vanguard", "FUND", "N/A", "Managed Growth Fund", 35000.0, 38200.0, "AUD", d(2025, 12, 13), d(2023, 4, 22), 1.0, "NO", "Diversified growth portfolio"),
    ];
    let config = MigrationConfig::default();
    let networth_rows = holdings
        .into_iter()
        .enumerate()
        .map(
            |(idx, (platform, kind, ticker, asset, invested, current, currency, updated, purchased, quantity, auto, notes))| {
                vec![
                    Cell::String(config.format_id(idx + 1)),
                    Cell::text(platform),
                    Cell::text(kind),
                    Cell::text(ticker),
                    Cell::text(asset),
                    Cell::Float(invested),
                    Cell::Float(current),
                    Cell::Float(current - invested),
                    Cell::text(currency),
                    updated,
                    purchased,
                    Cell::Float(quantity),
                    Cell::text(auto),
                    Cell::text(notes),
                ]
            },
        )
        .collect();

    let payouts: [(&str, &str, &str, Cell, f64, &str, &str); 6] = [
        ("INV001", "CBA.AX", "DIVIDEND", d(2025, 11, 15), 450.0, "AUD", "Quarterly dividend"),
        ("INV002", "VOO", "DIVIDEND", d(2025, 10, 20), 320.0, "USD", "Quarterly distribution"),
        ("INV004", "N/A", "INTEREST", d(2025, 11, 30), 125.0, "AUD", "Monthly interest"),
        ("INV005", "GSBE29", "BOND", d(2025, 11, 20), 400.0, "AUD", "Semi-annual coupon"),
        ("INV007", "T-BILL", "INTEREST", d(2025, 11, 30), 62500.0, "LKR", "Treasury bill maturity"),
        ("INV001", "CBA.AX", "DIVIDEND", d(2025, 8, 15), 425.0, "AUD", "Quarterly dividend"),
    ];
    let returns_rows = payouts
        .into_iter()
        .map(|(id, instrument, kind, date, amount, currency, notes)| {
            vec![
                Cell::text(id),
                Cell::text(instrument),
                Cell::text(kind),
                date,
                Cell::Float(amount),
                Cell::text(currency),
                Cell::text(notes),
            ]
        })
        .collect();

    let mut workbook = Workbook::new(vec![
        Sheet::new(networth::SHEET, networth::LAYOUT.headers()).with_rows(networth_rows),
        Sheet::new(returns::SHEET, returns::LAYOUT.headers()).with_rows(returns_rows),
    ]);
    migrate::ensure_stock_symbols(&mut workbook, &config);
    workbook
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_sample_migrates_cleanly() {
        let migration = migrate::migrate(&legacy_workbook(), &MigrationConfig::default())
            .expect("migrate sample");
        let networth_report = &migration.report.sheets[0];
        assert_eq!(networth_report.ids_assigned, 6);
        assert_eq!(networth_report.dates_kept().count(), 1);
        let returns_report = &migration.report.sheets[1];
        assert_eq!(returns_report.dates_normalized(), 4);
        assert_eq!(returns_report.dates_kept().count(), 1);
        assert_eq!(returns_report.pruned_columns.len(), 2);
    }

    #[test]
    fn migrated_sample_is_refused_by_migrate() {
        assert!(migrate::migrate(&migrated_workbook(), &MigrationConfig::default()).is_err());
    }
}
