// Integration tests: sales export on disk → import run → products JSON

use pace_import::report::write_products_json;
use pace_import::{read_rows, CanonicalProduct, ImportConfig, ImportRun, ParseStatus};
use rust_decimal::Decimal;
use std::fs;
use std::io::Write;
use std::str::FromStr;

const SALES_EXPORT: &str = "\
Brooklyn Nut Co,,,,,
,09/24/2024,Invoice,1001,Commission 2%,80 cases walnuts combo halves and pieces 25# $1.35/lbs
,09/24/2024,Invoice,1001,Commission 2%,210 cases pistachios shelled halves and pieces 30# $6.75/lbs pick up California 09/24
,09/24/2024,Invoice,1001,,\"John Doe
123 Main St
Brooklyn, NY 11201\"
,09/25/2024,Invoice,1002,Commission 5%,20 cases raisins dark 4x10#
,09/26/2024,Invoice,1003,Commission 2%,12 cases walnuts combo halves and pieces 25# $1.40/lbs
,09/26/2024,Invoice,1003,,thank you
";

fn write_export(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("create temp csv");
    file.write_all(content.as_bytes()).expect("write temp csv");
    file
}

#[test]
fn test_sales_export_to_products_json() {
    let export = write_export(SALES_EXPORT);
    let config = ImportConfig::default();

    let table = read_rows(export.path(), config.has_headers).unwrap();
    let outcome = ImportRun::new(&config).unwrap().execute(&table).unwrap();

    // Section header row has no memo column at all
    assert_eq!(outcome.summary.rows_read, 7);
    assert_eq!(outcome.summary.empty_memos, 1);
    assert_eq!(outcome.summary.non_product_rows, 1);
    assert_eq!(outcome.summary.parsed_rows, 5);
    assert_eq!(outcome.summary.complete_rows, 3);
    assert_eq!(outcome.summary.partial_rows, 1);
    assert_eq!(outcome.summary.unparsed_rows, 1);
    assert_eq!(outcome.summary.zero_line_total_rows, 2);

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("extracted-products.json");
    write_products_json(&out, outcome.catalog.products()).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {
                "name": "Walnuts",
                "variety": "Combo Halves and Pieces",
                "grade": null,
                "defaultUnitSize": "25",
                "uom": "lbs"
            },
            {
                "name": "Pistachios Shelled Halves And Pieces",
                "variety": null,
                "grade": null,
                "defaultUnitSize": "30",
                "uom": "lbs"
            },
            {
                "name": "Raisins",
                "variety": "Dark",
                "grade": null,
                "defaultUnitSize": "10",
                "uom": "lbs"
            }
        ])
    );

    let products: Vec<CanonicalProduct> = serde_json::from_value(json).unwrap();
    assert_eq!(products.len(), 3);
}

#[test]
fn test_line_items_keep_source_lines() {
    let export = write_export(SALES_EXPORT);
    let table = read_rows(export.path(), false).unwrap();
    let outcome = ImportRun::new(&ImportConfig::default())
        .unwrap()
        .execute(&table)
        .unwrap();

    let pistachio = outcome
        .line_items
        .iter()
        .find(|r| r.item.memo.contains("pistachios"))
        .unwrap();
    assert_eq!(pistachio.line_number, 3);
    assert_eq!(pistachio.item.status, ParseStatus::Complete);
    assert_eq!(pistachio.item.line_total, Some(Decimal::from_str("42525.00").unwrap()));

    let raisins = outcome
        .line_items
        .iter()
        .find(|r| r.item.memo.contains("raisins"))
        .unwrap();
    assert_eq!(raisins.item.status, ParseStatus::Partial);
    assert_eq!(raisins.product_key.as_deref(), Some("Raisins|Dark|10"));
    assert_eq!(raisins.commission, Some(Decimal::from_str("0.05").unwrap()));

    assert_eq!(outcome.contacts.len(), 1);
    assert_eq!(outcome.contacts[0].line_number, 4);
}

#[test]
fn test_header_row_and_named_column() {
    let export = write_export(
        "Customer,Date,Memo\n\
         Acme,10/01/2024,5 bags almonds natural 25# $3.00/lbs\n\
         Acme,10/02/2024,5 bags almonds natural 25# $3.10/lbs\n",
    );
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{ "memoColumn": "memo", "hasHeaders": true }}"#).unwrap();

    let config = ImportConfig::from_file(file.path()).unwrap();
    let table = read_rows(export.path(), config.has_headers).unwrap();
    let outcome = ImportRun::new(&config).unwrap().execute(&table).unwrap();

    assert_eq!(outcome.summary.rows_read, 2);
    assert_eq!(outcome.catalog.len(), 1);
    assert_eq!(outcome.catalog.products()[0].name, "Almonds");
    assert_eq!(outcome.catalog.products()[0].variety.as_deref(), Some("Natural"));
}

#[test]
fn test_missing_export_is_fatal() {
    let result = read_rows(std::path::Path::new("/nonexistent/SalesByCustomer.csv"), false);
    assert!(result.is_err());
}
