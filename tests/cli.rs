mod common;

use std::fs;

use chrono::NaiveDate;
use networth_migrate::{
    data::Cell,
    layout::{networth, returns, symbols},
    sheet::{Sheet, Workbook},
};
use predicates::str::contains;

use common::{TestWorkspace, bin, read, sheet};

fn migrate(ws: &TestWorkspace) -> std::path::PathBuf {
    let input = ws.legacy_workbook();
    let output = ws.file("migrated.xlsx");
    bin()
        .args([
            "migrate",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(contains("Saved as:"))
        .stdout(contains("assigned 6 sequential ID(s)"));
    output
}

#[test]
fn migrate_writes_extended_layouts() {
    let ws = TestWorkspace::new();
    let output = migrate(&ws);
    let workbook = read(&output);
    assert_eq!(
        workbook.sheet_names(),
        vec![networth::SHEET, returns::SHEET, symbols::SHEET]
    );

    let nw = sheet(&workbook, networth::SHEET);
    assert_eq!(nw.headers, networth::LAYOUT.headers());
    let first = &nw.rows[0];
    assert_eq!(first[networth::ID], Cell::text("INV001"));
    assert_eq!(first[networth::ASSET_NAME], Cell::text("Coinbase - CRYPTO"));
    assert_eq!(first[networth::TICKER_SYMBOL], Cell::text("TO_BE_ADDED"));
    assert_eq!(first[networth::AUTO_UPDATE], Cell::text("YES"));
    assert_eq!(
        first[networth::UPDATED_DATE].as_date(),
        NaiveDate::from_ymd_opt(2025, 8, 27)
    );
    let ids = nw
        .rows
        .iter()
        .map(|row| row[networth::ID].as_display())
        .collect::<Vec<_>>();
    assert_eq!(ids, ["INV001", "INV002", "INV003", "INV004", "INV005", "INV006"]);
    assert_eq!(nw.rows[4][networth::UPDATED_DATE], Cell::text("sometime in 2025"));

    let rt = sheet(&workbook, returns::SHEET);
    assert_eq!(rt.headers, returns::LAYOUT.headers());
    assert_eq!(rt.rows[1][returns::INVESTMENT_ID], Cell::text("TO_BE_LINKED"));
    assert_eq!(
        rt.rows[1][returns::DATE].as_date(),
        NaiveDate::from_ymd_opt(2023, 1, 1)
    );
    assert_eq!(rt.rows[4][returns::DATE], Cell::text("30/11/2025"));

    let st = sheet(&workbook, symbols::SHEET);
    assert_eq!(st.headers[0], "Ticker Symbol");
    assert_eq!(st.rows.len(), 3);
}

#[test]
fn migrating_migrated_output_is_refused() {
    let ws = TestWorkspace::new();
    let output = migrate(&ws);
    let again = ws.file("again.xlsx");
    bin()
        .args([
            "migrate",
            "-i",
            output.to_str().unwrap(),
            "-o",
            again.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("already migrated"));
    assert!(!again.exists());
}

#[test]
fn missing_returns_sheet_is_fatal() {
    let ws = TestWorkspace::new();
    let only_networth = Workbook::new(vec![Sheet::new(
        networth::SHEET,
        vec!["Platform".to_string()],
    )]);
    let input = ws.workbook("partial.xlsx", &only_networth);
    let output = ws.file("out.xlsx");
    bin()
        .args([
            "migrate",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("missing the required sheet 'Investment Returns'"));
    assert!(!output.exists());
}

#[test]
fn output_cannot_overwrite_input() {
    let ws = TestWorkspace::new();
    let input = ws.legacy_workbook();
    let before = fs::read(&input).expect("read input");
    bin()
        .args([
            "migrate",
            "-i",
            input.to_str().unwrap(),
            "-o",
            input.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("would overwrite the input"));
    assert_eq!(fs::read(&input).expect("read input"), before);
}

#[test]
fn unreadable_input_reports_open_error() {
    let ws = TestWorkspace::new();
    let bogus = ws.write("bogus.xlsx", "not a spreadsheet");
    bin()
        .args(["migrate", "-i", bogus.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("Unable to open workbook"));
}

#[test]
fn default_output_uses_improved_suffix() {
    let ws = TestWorkspace::new();
    let input = ws.legacy_workbook();
    bin()
        .args(["migrate", "-i", input.to_str().unwrap()])
        .assert()
        .success();
    assert!(ws.file("portfolio_improved.xlsx").exists());
}

#[test]
fn dry_run_prints_diff_and_writes_nothing() {
    let ws = TestWorkspace::new();
    let input = ws.legacy_workbook();
    let output = ws.file("dry.xlsx");
    bin()
        .args([
            "migrate",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(contains("+ID"))
        .stdout(contains("-Investment Type/Return type"))
        .stdout(contains("+Return Type"))
        .stdout(contains("Dry run: no file written"));
    assert!(!output.exists());
}

#[test]
fn report_lists_kept_dates() {
    let ws = TestWorkspace::new();
    let input = ws.legacy_workbook();
    let output = ws.file("out.xlsx");
    let report = ws.file("report.json");
    bin()
        .args([
            "migrate",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--report",
            report.to_str().unwrap(),
        ])
        .assert()
        .success();
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).expect("read report")).expect("json");
    let sheets = json["sheets"].as_array().expect("sheets");
    assert_eq!(sheets.len(), 2);
    let kept = sheets[0]["dates"]
        .as_array()
        .expect("dates")
        .iter()
        .filter(|note| note["outcome"]["status"] == "kept")
        .collect::<Vec<_>>();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0]["outcome"]["original"], "sometime in 2025");
    assert_eq!(json["stock_symbols_created"], true);
}

#[test]
fn config_overrides_id_prefix() {
    let ws = TestWorkspace::new();
    let input = ws.legacy_workbook();
    let config = ws.write("config.yaml", "id_prefix: ACC\nid_width: 4\n");
    let output = ws.file("out.xlsx");
    bin()
        .args([
            "migrate",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "-c",
            config.to_str().unwrap(),
        ])
        .assert()
        .success();
    let workbook = read(&output);
    let nw = sheet(&workbook, networth::SHEET);
    assert_eq!(nw.rows[0][networth::ID], Cell::text("ACC0001"));
}

#[test]
fn review_reports_not_ready_after_fresh_migration() {
    let ws = TestWorkspace::new();
    let output = migrate(&ws);
    bin()
        .args(["review", "-i", output.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Total entries: 6"))
        .stdout(contains("not yet linked: 5"))
        .stdout(contains("Not ready"));
}

#[test]
fn review_json_on_migrated_sample_is_fully_ready() {
    let ws = TestWorkspace::new();
    let path = ws.file("sample.xlsx");
    bin()
        .args(["sample", "-o", path.to_str().unwrap(), "--layout", "migrated"])
        .assert()
        .success();
    let output = bin()
        .args(["review", "-i", path.to_str().unwrap(), "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).expect("json");
    assert_eq!(json["readiness"], "fully_ready");
    assert_eq!(json["networth"]["total_entries"], 8);
    assert_eq!(json["returns"]["linked"], 6);
}

#[test]
fn review_rejects_legacy_workbook() {
    let ws = TestWorkspace::new();
    let input = ws.legacy_workbook();
    bin()
        .args(["review", "-i", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("run `migrate` first"));
}

#[test]
fn dump_limits_rows_and_summarizes() {
    let ws = TestWorkspace::new();
    let output = migrate(&ws);
    bin()
        .args(["dump", "-i", output.to_str().unwrap(), "--rows", "2"])
        .assert()
        .success()
        .stdout(contains("Networth - first 2 of 6 row(s)"))
        .stdout(contains("INV002"))
        .stdout(contains("Total sheets: 3"))
        .stdout(contains("Stock Symbols: 3 row(s)"));
}

#[test]
fn dump_unknown_sheet_fails() {
    let ws = TestWorkspace::new();
    let input = ws.legacy_workbook();
    bin()
        .args(["dump", "-i", input.to_str().unwrap(), "--sheet", "Ledger"])
        .assert()
        .failure()
        .stderr(contains("Sheet 'Ledger' not found"));
}

#[test]
fn export_json_skips_unlinked_returns() {
    let ws = TestWorkspace::new();
    let output = migrate(&ws);
    let json_path = ws.file("export.json");
    bin()
        .args([
            "export",
            "-i",
            output.to_str().unwrap(),
            "-o",
            json_path.to_str().unwrap(),
        ])
        .assert()
        .success();
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).expect("read")).expect("json");
    assert_eq!(json["investments"].as_array().unwrap().len(), 6);
    assert_eq!(json["returns"].as_array().unwrap().len(), 0);
    assert_eq!(json["investments"][0]["id"], "INV001");
    assert_eq!(json["investments"][0]["updated_date"], "2025-08-27");
}

#[test]
fn export_csv_returns_with_unlinked() {
    let ws = TestWorkspace::new();
    let output = migrate(&ws);
    bin()
        .args([
            "export",
            "-i",
            output.to_str().unwrap(),
            "--format",
            "csv",
            "--table",
            "returns",
            "--include-unlinked",
        ])
        .assert()
        .success()
        .stdout(contains("investment_id,instrument,return_type,date"))
        .stdout(contains("CBA.AX,DIVIDEND,2025-11-15"));
}
