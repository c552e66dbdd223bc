//! Typed views over a migrated workbook, shared by `review` and `export`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    config::MigrationConfig,
    data::Cell,
    error::WorkbookError,
    layout::{SheetLayout, networth, returns},
    sheet::{Sheet, Workbook},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Investment {
    pub id: Option<String>,
    pub platform: String,
    pub investment_type: Option<String>,
    /// `None` when absent or still the ticker placeholder.
    pub ticker_symbol: Option<String>,
    pub asset_name: Option<String>,
    pub invested_amount: Option<Decimal>,
    pub current_amount: Option<Decimal>,
    pub profit_loss: Option<Decimal>,
    pub currency: Option<String>,
    pub updated_date: Option<NaiveDate>,
    pub purchase_date: Option<NaiveDate>,
    pub quantity: Option<Decimal>,
    pub auto_update: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnEntry {
    /// `None` while the row still carries the link placeholder.
    pub investment_id: Option<String>,
    pub instrument: String,
    pub return_type: Option<String>,
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub notes: Option<String>,
}

/// Maps each target column of `layout` to its position in a migrated sheet.
struct ColumnLookup {
    positions: Vec<usize>,
}

impl ColumnLookup {
    fn new(layout: &SheetLayout, sheet: &Sheet) -> Result<Self, WorkbookError> {
        let positions = layout
            .columns
            .iter()
            .map(|column| {
                sheet
                    .column_index(column.name)
                    .ok_or_else(|| WorkbookError::MissingColumn {
                        sheet: sheet.name.clone(),
                        column: column.name.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { positions })
    }

    fn get<'a>(&self, row: &'a [Cell], target: usize) -> &'a Cell {
        static EMPTY: Cell = Cell::Empty;
        row.get(self.positions[target]).unwrap_or(&EMPTY)
    }
}

fn required_sheet<'a>(workbook: &'a Workbook, name: &str) -> Result<&'a Sheet, WorkbookError> {
    workbook
        .get(name)
        .ok_or_else(|| WorkbookError::MissingSheet(name.to_string()))
}

fn resolved(cell: &Cell, placeholder: &str) -> Option<String> {
    cell.non_empty_text().filter(|value| value != placeholder)
}

pub fn load_investments(
    workbook: &Workbook,
    config: &MigrationConfig,
) -> Result<Vec<Investment>, WorkbookError> {
    use networth::*;

    let sheet = required_sheet(workbook, SHEET)?;
    let lookup = ColumnLookup::new(&LAYOUT, sheet)?;
    let anchor = lookup.positions[LAYOUT.anchor];
    let investments = sheet
        .anchored_rows(anchor)
        .map(|row| {
            let cell = |target| lookup.get(row, target);
            Investment {
                id: cell(ID).non_empty_text(),
                platform: cell(PLATFORM).as_display().trim().to_string(),
                investment_type: cell(INVESTMENT_TYPE).non_empty_text(),
                ticker_symbol: resolved(cell(TICKER_SYMBOL), &config.ticker_placeholder),
                asset_name: cell(ASSET_NAME).non_empty_text(),
                invested_amount: cell(INVESTED_AMOUNT).as_decimal(),
                current_amount: cell(CURRENT_AMOUNT).as_decimal(),
                profit_loss: cell(PROFIT_LOSS).as_decimal(),
                currency: cell(CURRENCY).non_empty_text(),
                updated_date: cell(UPDATED_DATE).as_date(),
                purchase_date: cell(PURCHASE_DATE).as_date(),
                quantity: cell(QUANTITY).as_decimal(),
                auto_update: cell(AUTO_UPDATE)
                    .non_empty_text()
                    .is_some_and(|v| v.eq_ignore_ascii_case("YES")),
                notes: cell(NOTES).non_empty_text(),
            }
        })
        .collect();
    Ok(investments)
}

pub fn load_returns(
    workbook: &Workbook,
    config: &MigrationConfig,
) -> Result<Vec<ReturnEntry>, WorkbookError> {
    use returns::*;

    let sheet = required_sheet(workbook, SHEET)?;
    let lookup = ColumnLookup::new(&LAYOUT, sheet)?;
    let anchor = lookup.positions[LAYOUT.anchor];
    let entries = sheet
        .anchored_rows(anchor)
        .map(|row| {
            let cell = |target| lookup.get(row, target);
            ReturnEntry {
                investment_id: resolved(cell(INVESTMENT_ID), &config.link_placeholder),
                instrument: cell(INSTRUMENT).as_display().trim().to_string(),
                return_type: cell(RETURN_TYPE).non_empty_text(),
                date: cell(DATE).as_date(),
                amount: cell(AMOUNT).as_decimal(),
                currency: cell(CURRENCY).non_empty_text(),
                notes: cell(NOTES).non_empty_text(),
            }
        })
        .collect();
    Ok(entries)
}
