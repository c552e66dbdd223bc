//! In-memory workbook model: ordered named sheets, each a header row plus
//! data rows of [`Cell`] values.

use crate::data::{Cell, normalize_column_name};

static EMPTY_CELL: Cell = Cell::Empty;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<Vec<Cell>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(self.headers.len())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = normalize_column_name(name);
        self.headers
            .iter()
            .position(|header| normalize_column_name(header) == wanted)
    }

    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Rows preceding the first one whose anchor cell is absent.
    pub fn anchored_rows(&self, anchor: usize) -> impl Iterator<Item = &[Cell]> {
        self.rows
            .iter()
            .map(Vec::as_slice)
            .take_while(move |row| !row.get(anchor).is_none_or(Cell::is_absent))
    }

    pub fn column_is_empty(&self, column: usize) -> bool {
        self.rows
            .iter()
            .all(|row| row.get(column).is_none_or(Cell::is_empty))
    }

    /// Drops trailing columns past `keep` that have a blank header and no data.
    pub fn trim_empty_trailing_columns(&mut self, keep: usize) -> usize {
        let mut trimmed = 0;
        loop {
            let width = self.width();
            if width <= keep {
                break;
            }
            let last = width - 1;
            let header_blank = self.headers.get(last).is_none_or(|h| h.trim().is_empty());
            if !header_blank || !self.column_is_empty(last) {
                break;
            }
            self.headers.truncate(last);
            for row in &mut self.rows {
                row.truncate(last);
            }
            trimmed += 1;
        }
        trimmed
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    /// Replaces the sheet with the same name in place, or appends it.
    pub fn upsert(&mut self, sheet: Sheet) {
        match self.get_mut(&sheet.name) {
            Some(existing) => *existing = sheet,
            None => self.sheets.push(sheet),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn anchored_rows_stop_at_first_empty_anchor() {
        let sheet = Sheet::new("Networth", headers(&["Platform", "Type"])).with_rows(vec![
            vec![Cell::text("Coinbase"), Cell::text("CRYPTO")],
            vec![Cell::text("CommSec"), Cell::text("STOCK")],
            vec![Cell::Empty, Cell::text("ETF")],
            vec![Cell::text("Vanguard"), Cell::text("FUND")],
        ]);
        assert_eq!(sheet.anchored_rows(0).count(), 2);
    }

    #[test]
    fn whitespace_anchor_does_not_end_the_scan() {
        let sheet = Sheet::new("Networth", headers(&["Platform"])).with_rows(vec![
            vec![Cell::text("Coinbase")],
            vec![Cell::text("  ")],
            vec![Cell::text("Vanguard")],
            vec![Cell::text("")],
            vec![Cell::text("ING")],
        ]);
        assert_eq!(sheet.anchored_rows(0).count(), 3);
    }

    #[test]
    fn trailing_blank_columns_are_trimmed_past_keep() {
        let mut sheet = Sheet::new("Returns", headers(&["A", "B", "", ""])).with_rows(vec![
            vec![Cell::text("x"), Cell::Empty, Cell::Empty, Cell::Empty],
        ]);
        assert_eq!(sheet.trim_empty_trailing_columns(2), 2);
        assert_eq!(sheet.headers, headers(&["A", "B"]));
        assert_eq!(sheet.rows[0].len(), 2);
    }

    #[test]
    fn column_lookup_ignores_punctuation_and_case() {
        let sheet = Sheet::new("Networth", headers(&["Profit/Loss", "Auto Update"]));
        assert_eq!(sheet.column_index("profit loss"), Some(0));
        assert_eq!(sheet.column_index("AUTO_UPDATE"), Some(1));
        assert_eq!(sheet.column_index("Quantity"), None);
    }

    #[test]
    fn upsert_replaces_existing_sheet() {
        let mut workbook = Workbook::new(vec![Sheet::new("A", Vec::new())]);
        workbook.upsert(Sheet::new("A", headers(&["x"])));
        workbook.upsert(Sheet::new("B", Vec::new()));
        assert_eq!(workbook.sheet_names(), vec!["A", "B"]);
        assert_eq!(workbook.get("A").unwrap().headers, headers(&["x"]));
    }
}
