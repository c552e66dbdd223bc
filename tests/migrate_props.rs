use std::collections::HashSet;

use networth_migrate::{
    config::MigrationConfig,
    data::Cell,
    layout::{networth, returns},
    migrate::{migrate_networth, migrate_returns},
    sheet::Sheet,
};
use proptest::prelude::*;

const LEGACY_HEADERS: [&str; 7] = [
    "Platform",
    "Investment Type",
    "Invested Amount",
    "Current Amount",
    "Profit/Loss",
    "Currency",
    "Updated Date",
];

fn investment_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("STOCK".to_string()),
        Just("CRYPTO".to_string()),
        Just("ETF".to_string()),
        Just("FUND".to_string()),
        Just("SAVING".to_string()),
        "[A-Z]{2,8}",
    ]
}

fn legacy_row() -> impl Strategy<Value = Vec<Cell>> {
    ("[A-Za-z][A-Za-z ]{0,15}", investment_type(), 0.0f64..1e6).prop_map(
        |(platform, kind, invested)| {
            vec![
                Cell::text(platform),
                Cell::text(kind),
                Cell::Float(invested.round()),
                Cell::Float(invested.round()),
                Cell::Float(0.0),
                Cell::text("USD"),
                Cell::text("01-01-2024"),
            ]
        },
    )
}

fn sheet(rows: Vec<Vec<Cell>>) -> Sheet {
    Sheet::new(
        networth::SHEET,
        LEGACY_HEADERS.iter().map(|h| h.to_string()).collect(),
    )
    .with_rows(rows)
}

fn returns_header() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Stock/Instrument".to_string()),
        Just("Investment Type/Return type".to_string()),
        Just("Return Type".to_string()),
        Just("Date".to_string()),
        Just("Amount".to_string()),
        Just("Currency".to_string()),
        Just("Notes".to_string()),
        Just("Investment ID".to_string()),
        Just(String::new()),
        "[A-Za-z]{1,10}",
    ]
}

proptest! {
    #[test]
    fn ids_are_sequential_and_unique(rows in prop::collection::vec(legacy_row(), 0..60)) {
        let n = rows.len();
        let (migrated, report) = migrate_networth(&sheet(rows), &MigrationConfig::default());
        let ids = migrated
            .rows
            .iter()
            .map(|row| row[networth::ID].as_display())
            .collect::<Vec<_>>();
        let expected = (1..=n).map(|i| format!("INV{i:03}")).collect::<Vec<_>>();
        prop_assert_eq!(&ids, &expected);
        prop_assert_eq!(ids.iter().collect::<HashSet<_>>().len(), n);
        prop_assert_eq!(report.ids_assigned, n);
    }

    #[test]
    fn auto_update_is_yes_only_for_stock_and_crypto(rows in prop::collection::vec(legacy_row(), 1..40)) {
        let (migrated, _) = migrate_networth(&sheet(rows), &MigrationConfig::default());
        for row in &migrated.rows {
            let kind = row[networth::INVESTMENT_TYPE].as_display();
            let expected = if kind == "STOCK" || kind == "CRYPTO" { "YES" } else { "NO" };
            prop_assert_eq!(row[networth::AUTO_UPDATE].as_display(), expected);
            let has_placeholder = row[networth::TICKER_SYMBOL] == Cell::text("TO_BE_ADDED");
            prop_assert_eq!(has_placeholder, expected == "YES");
        }
    }

    #[test]
    fn rows_before_empty_anchor_are_migrated_and_order_kept(
        head in prop::collection::vec(legacy_row(), 0..20),
        tail in prop::collection::vec(legacy_row(), 0..20),
    ) {
        let mut rows = head.clone();
        rows.push(vec![Cell::Empty; LEGACY_HEADERS.len()]);
        rows.extend(tail.clone());
        let total = rows.len();
        let (migrated, report) = migrate_networth(&sheet(rows), &MigrationConfig::default());
        prop_assert_eq!(migrated.rows.len(), total);
        prop_assert_eq!(report.rows_migrated, head.len());
        for (row, original) in migrated.rows.iter().skip(head.len() + 1).zip(&tail) {
            prop_assert_eq!(&row[networth::PLATFORM], &original[0]);
            prop_assert_eq!(&row[networth::ID], &Cell::Empty);
        }
    }

    #[test]
    fn returns_keep_first_six_legacy_columns_whatever_the_headers(
        headers in prop::collection::vec(returns_header(), 6..11),
    ) {
        let width = headers.len();
        let row = (0..width).map(|i| Cell::String(format!("cell-{i}"))).collect::<Vec<_>>();
        let sheet = Sheet::new(returns::SHEET, headers).with_rows(vec![row.clone()]);
        let (migrated, report) = migrate_returns(&sheet, &MigrationConfig::default());

        prop_assert_eq!(&migrated.headers, &returns::LAYOUT.headers());
        let kept = &migrated.rows[0][returns::INSTRUMENT..=returns::NOTES];
        prop_assert_eq!(kept, &row[..6]);
        prop_assert!(report.pruned_columns.iter().all(|c| c.column.legacy_index >= 6));
        prop_assert_eq!(report.pruned_columns.len(), width - 6);
    }
}
