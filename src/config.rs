//! Migration and styling configuration, optionally loaded from YAML.

use std::{
    collections::BTreeMap,
    fs,
    path::Path,
};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::layout::{networth, returns, symbols};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// chrono format used to parse textual legacy dates.
    pub legacy_date_format: String,
    pub id_prefix: String,
    pub id_width: usize,
    pub ticker_placeholder: String,
    pub link_placeholder: String,
    /// Investment types that get `Auto Update = YES` and a ticker placeholder.
    pub auto_update_types: Vec<String>,
    /// Investment types expected to carry a ticker symbol when reviewing.
    pub ticker_types: Vec<String>,
    pub style: StyleConfig,
    pub stock_symbols: Vec<[String; 6]>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            legacy_date_format: "%d-%m-%Y".to_string(),
            id_prefix: "INV".to_string(),
            id_width: 3,
            ticker_placeholder: "TO_BE_ADDED".to_string(),
            link_placeholder: "TO_BE_LINKED".to_string(),
            auto_update_types: strings(&["STOCK", "CRYPTO"]),
            ticker_types: strings(&["STOCK", "CRYPTO", "ETF", "FUND"]),
            style: StyleConfig::default(),
            stock_symbols: vec![
                seed(["AAPL", "Apple Inc", "NASDAQ", "USD", "YES", "Example stock"]),
                seed(["DBS.SI", "DBS Bank", "SGX", "SGD", "YES", "Singapore stock"]),
                seed(["BTC-USD", "Bitcoin", "CRYPTO", "USD", "YES", "Cryptocurrency"]),
            ],
        }
    }
}

impl MigrationConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Opening config file {path:?}"))?;
        let config = Self::from_yaml(&raw).with_context(|| format!("Parsing config {path:?}"))?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.legacy_date_format.trim().is_empty(),
            "legacy_date_format cannot be empty"
        );
        ensure!(!self.id_prefix.is_empty(), "id_prefix cannot be empty");
        ensure!(
            (1..=9).contains(&self.id_width),
            "id_width must be between 1 and 9"
        );
        self.style.validate()
    }

    pub fn format_id(&self, sequence: usize) -> String {
        format!(
            "{prefix}{sequence:0width$}",
            prefix = self.id_prefix,
            width = self.id_width
        )
    }

    pub fn wants_auto_update(&self, investment_type: &str) -> bool {
        let trimmed = investment_type.trim();
        self.auto_update_types.iter().any(|t| t == trimmed)
    }

    pub fn expects_ticker(&self, investment_type: &str) -> bool {
        let trimmed = investment_type.trim();
        self.ticker_types.iter().any(|t| t == trimmed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub header_fill: String,
    pub header_font_color: String,
    pub header_bold: bool,
    pub default_column_width: f64,
    pub column_widths: BTreeMap<String, f64>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        let column_widths = [
            (networth::SHEET, 15.0),
            (returns::SHEET, 18.0),
            (symbols::SHEET, 18.0),
        ]
        .into_iter()
        .map(|(sheet, width)| (sheet.to_string(), width))
        .collect();
        Self {
            header_fill: "4472C4".to_string(),
            header_font_color: "FFFFFF".to_string(),
            header_bold: true,
            default_column_width: 15.0,
            column_widths,
        }
    }
}

impl StyleConfig {
    pub fn validate(&self) -> Result<()> {
        parse_hex_color(&self.header_fill).context("style.header_fill")?;
        parse_hex_color(&self.header_font_color).context("style.header_font_color")?;
        ensure!(
            self.default_column_width > 0.0,
            "style.default_column_width must be positive"
        );
        Ok(())
    }

    /// Header styling applies to managed sheets only.
    pub fn styles_sheet(&self, sheet: &str) -> bool {
        [networth::SHEET, returns::SHEET, symbols::SHEET].contains(&sheet)
    }

    pub fn column_width(&self, sheet: &str) -> f64 {
        self.column_widths
            .get(sheet)
            .copied()
            .unwrap_or(self.default_column_width)
    }

    pub fn fill_rgb(&self) -> Result<u32> {
        parse_hex_color(&self.header_fill)
    }

    pub fn font_rgb(&self) -> Result<u32> {
        parse_hex_color(&self.header_font_color)
    }
}

pub fn parse_hex_color(value: &str) -> Result<u32> {
    let digits = value.trim().trim_start_matches('#');
    ensure!(
        digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()),
        "'{value}' is not a 6-digit hex color"
    );
    Ok(u32::from_str_radix(digits, 16)?)
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn seed(values: [&str; 6]) -> [String; 6] {
    values.map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = MigrationConfig::from_yaml("{}").expect("parse");
        assert_eq!(config, MigrationConfig::default());
        assert_eq!(config.format_id(1), "INV001");
        assert_eq!(config.format_id(42), "INV042");
        assert_eq!(config.format_id(1234), "INV1234");
    }

    #[test]
    fn partial_yaml_overrides_selected_fields() {
        let yaml = r##"
id_prefix: ACC
auto_update_types: [STOCK, CRYPTO, ETF]
style:
  header_fill: "#112233"
  column_widths:
    Networth: 22
"##;
        let config = MigrationConfig::from_yaml(yaml).expect("parse");
        assert_eq!(config.format_id(7), "ACC007");
        assert!(config.wants_auto_update("ETF"));
        assert!(!config.wants_auto_update("FUND"));
        assert_eq!(config.style.fill_rgb().unwrap(), 0x112233);
        assert_eq!(config.style.column_width("Networth"), 22.0);
        assert_eq!(config.style.column_width("Other"), 15.0);
        assert_eq!(config.ticker_placeholder, "TO_BE_ADDED");
    }

    #[test]
    fn invalid_color_is_rejected() {
        let err = MigrationConfig::from_yaml("style:\n  header_fill: blue\n").unwrap_err();
        assert!(format!("{err:#}").contains("hex color"));
    }

    #[test]
    fn type_membership_is_exact_after_trim() {
        let config = MigrationConfig::default();
        assert!(config.wants_auto_update(" STOCK "));
        assert!(!config.wants_auto_update("stock"));
        assert!(config.expects_ticker("FUND"));
    }
}
