//! Target column layouts and the legacy-to-target column mapping.
//!
//! Each managed sheet has a fixed [`SheetLayout`]. A [`ColumnPlan`] resolves a
//! legacy header row against that layout once, up front, and every data row is
//! then projected into the target order by direct assignment.

use log::{debug, warn};
use serde::Serialize;

use crate::data::{Cell, normalize_column_name};

#[derive(Debug, Clone, Copy)]
pub struct TargetColumn {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    /// Position of the column in the legacy layout, when it has one.
    pub legacy_position: Option<usize>,
}

const fn legacy(name: &'static str, position: usize) -> TargetColumn {
    TargetColumn {
        name,
        aliases: &[],
        legacy_position: Some(position),
    }
}

const fn added(name: &'static str) -> TargetColumn {
    TargetColumn {
        name,
        aliases: &[],
        legacy_position: None,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SheetLayout {
    pub sheet: &'static str,
    pub columns: &'static [TargetColumn],
    /// Target column whose emptiness marks the end of data.
    pub anchor: usize,
    /// Whether unmatched legacy columns are kept after the target columns.
    pub retain_extra_columns: bool,
    /// Legacy columns are taken strictly by position; headers only name renames.
    pub map_by_position: bool,
}

impl SheetLayout {
    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.to_string()).collect()
    }

    /// True when every target header is already present.
    pub fn is_migrated(&self, headers: &[String]) -> bool {
        let present = headers
            .iter()
            .map(|h| normalize_column_name(h))
            .collect::<Vec<_>>();
        self.columns
            .iter()
            .all(|column| present.contains(&normalize_column_name(column.name)))
    }
}

pub mod networth {
    use super::*;

    pub const SHEET: &str = "Networth";

    pub const ID: usize = 0;
    pub const PLATFORM: usize = 1;
    pub const INVESTMENT_TYPE: usize = 2;
    pub const TICKER_SYMBOL: usize = 3;
    pub const ASSET_NAME: usize = 4;
    pub const INVESTED_AMOUNT: usize = 5;
    pub const CURRENT_AMOUNT: usize = 6;
    pub const PROFIT_LOSS: usize = 7;
    pub const CURRENCY: usize = 8;
    pub const UPDATED_DATE: usize = 9;
    pub const PURCHASE_DATE: usize = 10;
    pub const QUANTITY: usize = 11;
    pub const AUTO_UPDATE: usize = 12;
    pub const NOTES: usize = 13;

    pub const LAYOUT: SheetLayout = SheetLayout {
        sheet: SHEET,
        columns: &[
            added("ID"),
            legacy("Platform", 0),
            legacy("Investment Type", 1),
            added("Ticker Symbol"),
            added("Asset Name"),
            legacy("Invested Amount", 2),
            legacy("Current Amount", 3),
            legacy("Profit/Loss", 4),
            legacy("Currency", 5),
            legacy("Updated Date", 6),
            added("Purchase Date"),
            added("Quantity"),
            added("Auto Update"),
            added("Notes"),
        ],
        anchor: PLATFORM,
        retain_extra_columns: true,
        map_by_position: false,
    };
}

pub mod returns {
    use super::*;

    pub const SHEET: &str = "Investment Returns";

    pub const INVESTMENT_ID: usize = 0;
    pub const INSTRUMENT: usize = 1;
    pub const RETURN_TYPE: usize = 2;
    pub const DATE: usize = 3;
    pub const AMOUNT: usize = 4;
    pub const CURRENCY: usize = 5;
    pub const NOTES: usize = 6;

    pub const LAYOUT: SheetLayout = SheetLayout {
        sheet: SHEET,
        columns: &[
            added("Investment ID"),
            TargetColumn {
                name: "Stock/Instrument",
                aliases: &["Instrument", "Stock"],
                legacy_position: Some(0),
            },
            TargetColumn {
                name: "Return Type",
                aliases: &["Investment Type/Return type"],
                legacy_position: Some(1),
            },
            legacy("Date", 2),
            legacy("Amount", 3),
            legacy("Currency", 4),
            legacy("Notes", 5),
        ],
        anchor: INSTRUMENT,
        retain_extra_columns: false,
        map_by_position: true,
    };
}

pub mod symbols {
    pub const SHEET: &str = "Stock Symbols";

    pub const HEADERS: [&str; 6] = [
        "Ticker Symbol",
        "Asset Name",
        "Exchange",
        "Currency",
        "Auto Fetch",
        "Notes",
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource {
    Legacy(usize),
    New,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderRename {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedColumn {
    pub legacy_index: usize,
    pub header: String,
}

#[derive(Debug, Clone)]
pub struct ColumnPlan {
    pub headers: Vec<String>,
    pub sources: Vec<ColumnSource>,
    pub renames: Vec<HeaderRename>,
    pub added: Vec<String>,
    pub dropped: Vec<DroppedColumn>,
}

impl ColumnPlan {
    pub fn resolve(layout: &SheetLayout, legacy_headers: &[String]) -> Self {
        let normalized = legacy_headers
            .iter()
            .map(|h| normalize_column_name(h))
            .collect::<Vec<_>>();
        let mut claimed = vec![false; legacy_headers.len()];
        let mut matched: Vec<Option<usize>> = vec![None; layout.columns.len()];

        let by_name = layout.columns.iter().enumerate().filter(|_| !layout.map_by_position);
        for (target_idx, column) in by_name {
            let names = std::iter::once(column.name)
                .chain(column.aliases.iter().copied())
                .map(normalize_column_name)
                .collect::<Vec<_>>();
            if let Some(idx) = (0..normalized.len())
                .find(|&idx| !claimed[idx] && !normalized[idx].is_empty() && names.contains(&normalized[idx]))
            {
                claimed[idx] = true;
                matched[target_idx] = Some(idx);
            }
        }

        for (target_idx, column) in layout.columns.iter().enumerate() {
            if matched[target_idx].is_some() {
                continue;
            }
            if let Some(position) = column.legacy_position
                && position < legacy_headers.len()
                && !claimed[position]
            {
                if !layout.map_by_position && !legacy_headers[position].trim().is_empty() {
                    warn!(
                        "Sheet '{}': mapping legacy column '{}' to '{}' by position",
                        layout.sheet, legacy_headers[position], column.name
                    );
                }
                claimed[position] = true;
                matched[target_idx] = Some(position);
            }
        }

        let mut headers = Vec::with_capacity(layout.columns.len());
        let mut sources = Vec::with_capacity(layout.columns.len());
        let mut renames = Vec::new();
        let mut added = Vec::new();
        for (column, source) in layout.columns.iter().zip(&matched) {
            headers.push(column.name.to_string());
            match source {
                Some(idx) => {
                    let original = legacy_headers[*idx].trim();
                    if !original.is_empty() && original != column.name {
                        renames.push(HeaderRename {
                            from: original.to_string(),
                            to: column.name.to_string(),
                        });
                    }
                    sources.push(ColumnSource::Legacy(*idx));
                }
                None => {
                    added.push(column.name.to_string());
                    sources.push(ColumnSource::New);
                }
            }
        }

        let mut dropped = Vec::new();
        for (idx, header) in legacy_headers.iter().enumerate() {
            if claimed[idx] {
                continue;
            }
            if layout.retain_extra_columns {
                headers.push(header.clone());
                sources.push(ColumnSource::Legacy(idx));
            } else {
                dropped.push(DroppedColumn {
                    legacy_index: idx,
                    header: header.clone(),
                });
            }
        }

        let plan = Self {
            headers,
            sources,
            renames,
            added,
            dropped,
        };
        debug!("Column plan for '{}': {:?}", layout.sheet, plan.sources);
        plan
    }

    /// Extends the plan with legacy columns that carry data but no header cell.
    pub fn cover_width(&mut self, layout: &SheetLayout, legacy_width: usize, header_count: usize) {
        for idx in header_count..legacy_width {
            if let Some(target) = layout
                .columns
                .iter()
                .position(|column| column.legacy_position == Some(idx))
                && self.sources[target] == ColumnSource::New
            {
                self.sources[target] = ColumnSource::Legacy(idx);
                self.added.retain(|name| name != layout.columns[target].name);
                continue;
            }
            if layout.retain_extra_columns {
                self.headers.push(String::new());
                self.sources.push(ColumnSource::Legacy(idx));
            } else {
                self.dropped.push(DroppedColumn {
                    legacy_index: idx,
                    header: String::new(),
                });
            }
        }
    }

    pub fn project_row(&self, row: &[Cell]) -> Vec<Cell> {
        self.sources
            .iter()
            .map(|source| match source {
                ColumnSource::Legacy(idx) => row.get(*idx).cloned().unwrap_or_default(),
                ColumnSource::New => Cell::Empty,
            })
            .collect()
    }
}
