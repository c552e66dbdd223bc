use anyhow::{Result, bail};
use log::info;

use crate::{cli::DumpArgs, data::Cell, io_utils, table};

pub fn execute(args: &DumpArgs) -> Result<()> {
    let workbook = io_utils::read_workbook(&args.input)?;
    for name in &args.sheets {
        if !workbook.contains(name) {
            bail!(
                "Sheet '{name}' not found; available sheets: {}",
                workbook.sheet_names().join(", ")
            );
        }
    }

    let rule = "=".repeat(80);
    let selected = workbook
        .sheets
        .iter()
        .filter(|sheet| args.sheets.is_empty() || args.sheets.contains(&sheet.name))
        .collect::<Vec<_>>();
    for sheet in &selected {
        let shown = if args.rows == 0 {
            sheet.rows.len()
        } else {
            args.rows.min(sheet.rows.len())
        };
        println!("{rule}");
        println!("{} - first {shown} of {} row(s)", sheet.name, sheet.rows.len());
        println!("{rule}");
        let rows = sheet
            .rows
            .iter()
            .take(shown)
            .map(|row| row.iter().map(Cell::as_display).collect())
            .collect::<Vec<Vec<String>>>();
        print!("{}", table::render_table(&sheet.headers, &rows, args.width));
        println!();
    }

    println!("{rule}");
    println!("SUMMARY");
    println!("{rule}");
    println!("Total sheets: {}", workbook.sheets.len());
    println!("Sheet names: {}", workbook.sheet_names().join(", "));
    for sheet in &workbook.sheets {
        println!("{}: {} row(s)", sheet.name, sheet.rows.len());
    }
    info!("Dumped {} sheet(s) from {:?}", selected.len(), args.input);
    Ok(())
}
