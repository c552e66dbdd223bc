//! Workbook and CSV I/O.
//!
//! All file I/O in networth-migrate flows through this module. It provides:
//!
//! - **Workbook reading**: `read_workbook` loads every sheet through
//!   `calamine` (xlsx, xls, ods) into the in-memory [`Workbook`] model.
//! - **Workbook writing**: `write_workbook` renders sheets with
//!   `rust_xlsxwriter`, applying the explicit [`StyleConfig`] to managed
//!   sheets, and replaces the destination atomically.
//! - **CSV writing**: `open_csv_writer` for exports, where the `-` path
//!   convention routes to stdout.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use log::debug;
use rust_xlsxwriter::{
    Color, ExcelDateTime, Format, FormatAlign, FormatPattern, Workbook as XlsxWorkbook, Worksheet,
};

use crate::{
    config::StyleConfig,
    data::Cell,
    error::WorkbookError,
    sheet::{Sheet, Workbook},
};

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn read_workbook(path: &Path) -> Result<Workbook, WorkbookError> {
    let mut source = open_workbook_auto(path).map_err(|source| WorkbookError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut sheets = Vec::new();
    for name in source.sheet_names() {
        let range = source
            .worksheet_range(&name)
            .map_err(|source| WorkbookError::ReadSheet {
                path: path.to_path_buf(),
                sheet: name.clone(),
                source,
            })?;
        let (row_offset, col_offset) = range
            .start()
            .map(|(row, col)| (row as usize, col as usize))
            .unwrap_or((0, 0));
        let mut grid: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
        for row in range.rows() {
            let mut cells = vec![Cell::Empty; col_offset];
            cells.extend(row.iter().map(cell_from_data));
            while cells.last().is_some_and(|cell| matches!(cell, Cell::Empty)) {
                cells.pop();
            }
            grid.push(cells);
        }
        while grid.last().is_some_and(|row| row.iter().all(Cell::is_empty)) {
            grid.pop();
        }
        let mut rows = grid.into_iter();
        let headers = rows
            .next()
            .map(|header| header.iter().map(Cell::as_display).collect())
            .unwrap_or_default();
        debug!("Read sheet '{name}' from {path:?}");
        sheets.push(Sheet::new(name, headers).with_rows(rows.collect()));
    }
    Ok(Workbook::new(sheets))
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::String(s.clone()),
        Data::Float(f) => Cell::Float(*f),
        Data::Int(i) => Cell::Int(*i),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(value) => {
            if value.is_duration() {
                return Cell::Float(value.as_f64());
            }
            match value.as_datetime() {
                Some(dt) => Cell::from_datetime(dt),
                None => Cell::Float(value.as_f64()),
            }
        }
        Data::DateTimeIso(raw) => parse_iso(raw).unwrap_or_else(|| Cell::String(raw.clone())),
        Data::DurationIso(raw) => Cell::String(raw.clone()),
        Data::Error(err) => Cell::Error(err.to_string()),
    }
}

fn parse_iso(raw: &str) -> Option<Cell> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Cell::from_datetime(dt));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().map(Cell::Date)
}

/// Writes `workbook` to `path`, replacing it only once the full file is on disk.
pub fn write_workbook(
    workbook: &Workbook,
    path: &Path,
    style: &StyleConfig,
) -> Result<(), WorkbookError> {
    let mut xlsx = XlsxWorkbook::new();
    let formats = Formats::new(style);
    for sheet in &workbook.sheets {
        let worksheet = xlsx.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        write_sheet(worksheet, sheet, style, &formats)?;
    }
    let buffer = xlsx.save_to_buffer()?;
    persist_atomically(path, &buffer)?;
    Ok(())
}

struct Formats {
    header: Option<Format>,
    date: Format,
    datetime: Format,
}

impl Formats {
    fn new(style: &StyleConfig) -> Self {
        // Colors are validated when the config is loaded.
        let header = match (style.fill_rgb(), style.font_rgb()) {
            (Ok(fill), Ok(font)) => {
                let mut format = Format::new()
                    .set_background_color(Color::RGB(fill))
                    .set_pattern(FormatPattern::Solid)
                    .set_font_color(Color::RGB(font))
                    .set_align(FormatAlign::Center)
                    .set_align(FormatAlign::VerticalCenter);
                if style.header_bold {
                    format = format.set_bold();
                }
                Some(format)
            }
            _ => None,
        };
        Self {
            header,
            date: Format::new().set_num_format(DATE_FORMAT),
            datetime: Format::new().set_num_format(DATETIME_FORMAT),
        }
    }
}

fn write_sheet(
    worksheet: &mut Worksheet,
    sheet: &Sheet,
    style: &StyleConfig,
    formats: &Formats,
) -> Result<(), WorkbookError> {
    let header_format = formats
        .header
        .as_ref()
        .filter(|_| style.styles_sheet(&sheet.name));
    for (col, header) in sheet.headers.iter().enumerate() {
        if header.is_empty() {
            continue;
        }
        let col = col as u16;
        match header_format {
            Some(format) => worksheet.write_string_with_format(0, col, header, format)?,
            None => worksheet.write_string(0, col, header)?,
        };
    }
    for (row_idx, row) in sheet.rows.iter().enumerate() {
        let row_num = row_idx as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            write_cell(worksheet, row_num, col as u16, cell, formats)?;
        }
    }
    if style.styles_sheet(&sheet.name) {
        let width = style.column_width(&sheet.name);
        for col in 0..sheet.width() {
            worksheet.set_column_width(col as u16, width)?;
        }
    }
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    formats: &Formats,
) -> Result<(), WorkbookError> {
    match cell {
        Cell::Empty => {}
        Cell::String(s) | Cell::Error(s) => {
            worksheet.write_string(row, col, s)?;
        }
        Cell::Float(f) => {
            worksheet.write_number(row, col, *f)?;
        }
        Cell::Int(i) => {
            worksheet.write_number(row, col, *i as f64)?;
        }
        Cell::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Cell::Date(date) => {
            let value = excel_date(*date)?;
            worksheet.write_datetime_with_format(row, col, &value, &formats.date)?;
        }
        Cell::DateTime(dt) => {
            let value = excel_date(dt.date())?.and_hms(
                dt.hour() as u16,
                dt.minute() as u8,
                dt.second() as u8,
            )?;
            worksheet.write_datetime_with_format(row, col, &value, &formats.datetime)?;
        }
    }
    Ok(())
}

fn excel_date(date: NaiveDate) -> Result<ExcelDateTime, WorkbookError> {
    Ok(ExcelDateTime::from_ymd(
        date.year() as u16,
        date.month() as u8,
        date.day() as u8,
    )?)
}

fn persist_atomically(path: &Path, bytes: &[u8]) -> Result<(), WorkbookError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut temp = tempfile::Builder::new()
        .prefix(".networth-migrate-")
        .suffix(".xlsx.tmp")
        .tempfile_in(&dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path)?;
    Ok(())
}

/// Fails when `output` names the same file as `input`.
pub fn ensure_distinct_output(input: &Path, output: &Path) -> Result<(), WorkbookError> {
    let same = match (input.canonicalize(), output.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => input == output,
    };
    if same {
        return Err(WorkbookError::SameOutput(output.to_path_buf()));
    }
    Ok(())
}

/// `{stem}_improved.xlsx` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("workbook");
    input.with_file_name(format!("{stem}_improved.xlsx"))
}

pub fn open_csv_writer(path: Option<&Path>) -> Result<csv::Writer<Box<dyn Write>>> {
    let writer: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(std::io::stdout()),
    };
    Ok(csv::WriterBuilder::new().has_headers(true).from_writer(writer))
}

pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(std::io::stdout()),
    })
}
