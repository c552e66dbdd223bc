use std::io::Write;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    cli::{ExportArgs, ExportFormat, ExportTable},
    config::MigrationConfig,
    io_utils,
    records::{self, Investment, ReturnEntry},
    sheet::Workbook,
};

#[derive(Debug, Serialize)]
pub struct Export {
    pub investments: Vec<Investment>,
    pub returns: Vec<ReturnEntry>,
}

pub fn collect(workbook: &Workbook, config: &MigrationConfig, include_unlinked: bool) -> Result<Export> {
    let investments = records::load_investments(workbook, config)?;
    let mut returns = records::load_returns(workbook, config)?;
    if !include_unlinked {
        let before = returns.len();
        returns.retain(|entry| entry.investment_id.is_some());
        info!("Skipping {} unlinked return(s)", before - returns.len());
    }
    Ok(Export {
        investments,
        returns,
    })
}

pub fn execute(args: &ExportArgs) -> Result<()> {
    let config = MigrationConfig::load_or_default(args.config.as_deref())?;
    let workbook = io_utils::read_workbook(&args.input)?;
    let export = collect(&workbook, &config, args.include_unlinked)
        .with_context(|| format!("Reading records from {:?}", args.input))?;

    match args.format {
        ExportFormat::Json => {
            let mut out = io_utils::open_output(args.output.as_deref())?;
            serde_json::to_writer_pretty(&mut out, &export)?;
            writeln!(out)?;
            out.flush()?;
        }
        ExportFormat::Csv => {
            let mut writer = io_utils::open_csv_writer(args.output.as_deref())?;
            match args.table {
                ExportTable::Investments => {
                    for investment in &export.investments {
                        writer.serialize(investment)?;
                    }
                }
                ExportTable::Returns => {
                    for entry in &export.returns {
                        writer.serialize(entry)?;
                    }
                }
            }
            writer.flush()?;
        }
    }
    info!(
        "Exported {} investment(s) and {} return(s)",
        export.investments.len(),
        export.returns.len()
    );
    Ok(())
}
