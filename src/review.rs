use std::{collections::BTreeMap, fmt::Write as _};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use itertools::Itertools;
use log::info;
use regex::Regex;
use serde::Serialize;

use crate::{
    cli::ReviewArgs,
    config::MigrationConfig,
    io_utils,
    layout::{networth, returns},
    records::{self, Investment, ReturnEntry},
    sheet::Workbook,
};

const SAMPLE_ENTRIES: usize = 3;
const LISTED_TICKERS: usize = 10;
const LISTED_MISSING: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    FullyReady,
    PartiallyReady,
    NotReady,
}

impl Readiness {
    pub fn assess(resolved: usize, unresolved: usize) -> Self {
        if unresolved == 0 {
            Readiness::FullyReady
        } else if resolved > 0 {
            Readiness::PartiallyReady
        } else {
            Readiness::NotReady
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworthStats {
    pub columns: Vec<String>,
    pub total_entries: usize,
    pub samples: Vec<Investment>,
    pub by_type: BTreeMap<String, usize>,
    pub by_currency: BTreeMap<String, usize>,
    pub auto_update_enabled: usize,
    pub with_tickers: Vec<(String, String)>,
    pub without_tickers: Vec<String>,
    pub malformed_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReturnsStats {
    pub columns: Vec<String>,
    pub total_entries: usize,
    pub samples: Vec<ReturnEntry>,
    pub by_type: BTreeMap<String, usize>,
    pub by_currency: BTreeMap<String, usize>,
    pub linked: usize,
    pub unlinked: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl ReturnsStats {
    pub fn duration_days(&self) -> Option<i64> {
        match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => Some((last - first).num_days()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadinessCheck {
    pub label: String,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub networth: NetworthStats,
    pub returns: ReturnsStats,
    pub checks: Vec<ReadinessCheck>,
    pub readiness: Readiness,
}

pub fn execute(args: &ReviewArgs) -> Result<()> {
    let config = MigrationConfig::load_or_default(args.config.as_deref())?;
    let workbook = io_utils::read_workbook(&args.input)?;
    let review = review_workbook(&workbook, &config)
        .with_context(|| format!("Reviewing workbook {:?}", args.input))?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&review)?);
    } else {
        print!("{}", render(&review));
    }
    info!(
        "Reviewed {} investment(s) and {} return(s)",
        review.networth.total_entries, review.returns.total_entries
    );
    Ok(())
}

fn count_by<'a>(values: impl Iterator<Item = Option<&'a String>>) -> BTreeMap<String, usize> {
    values.flatten().cloned().counts().into_iter().collect()
}

pub fn review_workbook(workbook: &Workbook, config: &MigrationConfig) -> Result<Review> {
    let investments = records::load_investments(workbook, config)?;
    let entries = records::load_returns(workbook, config)?;
    let id_pattern = Regex::new(&format!(r"^{}\d+$", regex::escape(&config.id_prefix)))?;

    let mut with_tickers = Vec::new();
    let mut without_tickers = Vec::new();
    for investment in &investments {
        let kind = investment.investment_type.as_deref().unwrap_or("");
        if !config.expects_ticker(kind) {
            continue;
        }
        let id = investment.id.clone().unwrap_or_default();
        match &investment.ticker_symbol {
            Some(ticker) => with_tickers.push((id, ticker.clone())),
            None => without_tickers.push(id),
        }
    }

    let networth = NetworthStats {
        columns: column_names(workbook, networth::SHEET),
        total_entries: investments.len(),
        samples: investments.iter().take(SAMPLE_ENTRIES).cloned().collect(),
        by_type: count_by(investments.iter().map(|i| i.investment_type.as_ref())),
        by_currency: count_by(investments.iter().map(|i| i.currency.as_ref())),
        auto_update_enabled: investments.iter().filter(|i| i.auto_update).count(),
        with_tickers,
        without_tickers,
        malformed_ids: investments
            .iter()
            .filter_map(|i| match &i.id {
                Some(id) if id_pattern.is_match(id) => None,
                Some(id) => Some(id.clone()),
                None => Some(format!("<missing> ({})", i.platform)),
            })
            .collect(),
    };

    let (first_date, last_date) = entries
        .iter()
        .filter_map(|e| e.date)
        .minmax()
        .into_option()
        .map_or((None, None), |(first, last)| (Some(first), Some(last)));
    let linked = entries.iter().filter(|e| e.investment_id.is_some()).count();
    let returns = ReturnsStats {
        columns: column_names(workbook, returns::SHEET),
        total_entries: entries.len(),
        samples: entries.iter().take(SAMPLE_ENTRIES).cloned().collect(),
        by_type: count_by(entries.iter().map(|e| e.return_type.as_ref())),
        by_currency: count_by(entries.iter().map(|e| e.currency.as_ref())),
        linked,
        unlinked: entries.len() - linked,
        first_date,
        last_date,
    };

    let check = |label: &str, passed: bool| ReadinessCheck {
        label: label.to_string(),
        passed,
    };
    let checks = vec![
        check("Workbook structure is valid", true),
        check("Investment IDs are assigned", networth.total_entries > 0 && networth.malformed_ids.is_empty()),
        check("Stock ticker symbols defined", !networth.with_tickers.is_empty()),
        check("Auto-update enabled for stocks", networth.auto_update_enabled > 0),
        check("Investment returns data available", returns.total_entries > 0),
        check("Multiple currencies detected", networth.by_currency.len() > 1),
        check("Historical data available", returns.first_date.is_some()),
    ];
    let readiness = Readiness::assess(networth.with_tickers.len(), networth.without_tickers.len());

    Ok(Review {
        networth,
        returns,
        checks,
        readiness,
    })
}

fn column_names(workbook: &Workbook, sheet: &str) -> Vec<String> {
    workbook
        .get(sheet)
        .map(|s| s.headers.clone())
        .unwrap_or_default()
}

fn display_opt<T: ToString>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string())
}

pub fn render(review: &Review) -> String {
    let mut out = String::new();
    let rule = "=".repeat(100);
    let thin = "-".repeat(100);
    let nw = &review.networth;
    let rt = &review.returns;

    let _ = writeln!(out, "{rule}\nNETWORTH SHEET\n{rule}");
    let _ = writeln!(out, "Columns: {}", nw.columns.join(", "));
    let _ = writeln!(out, "Total entries: {}", nw.total_entries);
    let _ = writeln!(out, "\nSample entries (first {SAMPLE_ENTRIES}):\n{thin}");
    for inv in &nw.samples {
        let _ = writeln!(
            out,
            "{}: {}",
            display_opt(&inv.id),
            display_opt(&inv.asset_name)
        );
        let _ = writeln!(
            out,
            "  Platform: {} | Type: {} | Currency: {}",
            inv.platform,
            display_opt(&inv.investment_type),
            display_opt(&inv.currency)
        );
        let _ = writeln!(
            out,
            "  Ticker: {} | Auto Update: {}",
            display_opt(&inv.ticker_symbol),
            if inv.auto_update { "YES" } else { "NO" }
        );
        let _ = writeln!(
            out,
            "  Invested: {} | Current: {} | P/L: {}",
            display_opt(&inv.invested_amount),
            display_opt(&inv.current_amount),
            display_opt(&inv.profit_loss)
        );
    }

    let _ = writeln!(out, "\nPORTFOLIO BREAKDOWN\n{thin}");
    write_counts(&mut out, "By investment type", &nw.by_type);
    write_counts(&mut out, "By currency", &nw.by_currency);
    let _ = writeln!(out, "\nAuto-update enabled: {} investment(s)", nw.auto_update_enabled);
    let _ = writeln!(out, "\nTicker symbol status:");
    let _ = writeln!(out, "  with ticker symbols: {}", nw.with_tickers.len());
    let _ = writeln!(out, "  without ticker symbols: {}", nw.without_tickers.len());
    if !nw.with_tickers.is_empty() {
        let _ = writeln!(out, "\n  Ready for price fetching:");
        for (id, ticker) in nw.with_tickers.iter().take(LISTED_TICKERS) {
            let _ = writeln!(out, "    {id}: {ticker}");
        }
        if nw.with_tickers.len() > LISTED_TICKERS {
            let _ = writeln!(out, "    ... and {} more", nw.with_tickers.len() - LISTED_TICKERS);
        }
    }
    if !nw.without_tickers.is_empty() {
        let _ = writeln!(
            out,
            "\n  Warning: {} entries still need ticker symbols:",
            nw.without_tickers.len()
        );
        let _ = writeln!(
            out,
            "    {}",
            nw.without_tickers.iter().take(LISTED_MISSING).join(", ")
        );
        if nw.without_tickers.len() > LISTED_MISSING {
            let _ = writeln!(
                out,
                "    ... and {} more",
                nw.without_tickers.len() - LISTED_MISSING
            );
        }
    }
    if !nw.malformed_ids.is_empty() {
        let _ = writeln!(out, "\n  Unexpected IDs: {}", nw.malformed_ids.join(", "));
    }

    let _ = writeln!(out, "\n{rule}\nINVESTMENT RETURNS SHEET\n{rule}");
    let _ = writeln!(out, "Columns: {}", rt.columns.join(", "));
    let _ = writeln!(out, "Total entries: {}", rt.total_entries);
    let _ = writeln!(out, "\nSample entries (first {SAMPLE_ENTRIES}):\n{thin}");
    for entry in &rt.samples {
        let _ = writeln!(
            out,
            "  {} ({})",
            entry.instrument,
            display_opt(&entry.return_type)
        );
        let _ = writeln!(
            out,
            "    Investment ID: {} | Date: {} | Amount: {} {}",
            display_opt(&entry.investment_id),
            display_opt(&entry.date),
            display_opt(&entry.amount),
            display_opt(&entry.currency)
        );
    }
    let _ = writeln!(out, "\nRETURNS BREAKDOWN\n{thin}");
    write_counts(&mut out, "By return type", &rt.by_type);
    write_counts(&mut out, "By currency", &rt.by_currency);
    let _ = writeln!(out, "\nLinkage status:");
    let _ = writeln!(out, "  linked to investments: {}", rt.linked);
    let _ = writeln!(out, "  not yet linked: {}", rt.unlinked);
    if let (Some(first), Some(last), Some(days)) = (rt.first_date, rt.last_date, rt.duration_days())
    {
        let _ = writeln!(out, "\nDate range:");
        let _ = writeln!(out, "  From: {}", first.format("%Y-%m-%d"));
        let _ = writeln!(out, "  To: {}", last.format("%Y-%m-%d"));
        let _ = writeln!(
            out,
            "  Duration: {days} days (~{:.1} months)",
            days as f64 / 30.0
        );
    }

    let _ = writeln!(out, "\n{rule}\nREADINESS CHECK\n{rule}");
    for check in &review.checks {
        let mark = if check.passed { "ok  " } else { "warn" };
        let _ = writeln!(out, "  [{mark}] {}", check.label);
    }
    let _ = writeln!(out, "\nRECOMMENDATION\n{rule}");
    let resolved = nw.with_tickers.len();
    let unresolved = nw.without_tickers.len();
    match review.readiness {
        Readiness::FullyReady => {
            let _ = writeln!(out, "Fully ready: every ticker-bearing entry has a ticker symbol.");
        }
        Readiness::PartiallyReady => {
            let _ = writeln!(
                out,
                "Partially ready: {resolved} entries have tickers, {unresolved} are missing."
            );
            let _ = writeln!(out, "Missing ticker symbols can be added later.");
        }
        Readiness::NotReady => {
            let _ = writeln!(out, "Not ready: no ticker symbols found.");
            let _ = writeln!(
                out,
                "Automatic price fetching is unavailable until {unresolved} ticker(s) are filled in."
            );
        }
    }
    out
}

fn write_counts(out: &mut String, title: &str, counts: &BTreeMap<String, usize>) {
    let _ = writeln!(out, "\n{title}:");
    for (key, count) in counts {
        let _ = writeln!(out, "  {key}: {count} entries");
    }
}
