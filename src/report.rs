// 📋 Reports
// Console listing of extracted products and JSON artifacts written at the end of a run

use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::catalog::CanonicalProduct;
use crate::error::{ImportError, Result};
use crate::import::{format_amount, ImportSummary};
use crate::memo::ParsedLineItem;

pub fn render_products(products: &[CanonicalProduct]) -> String {
    let mut out = String::new();

    out.push_str("Extracted Products:\n");
    out.push_str("==================\n");
    for (i, product) in products.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, product.name);
        if let Some(variety) = &product.variety {
            let _ = writeln!(out, "   Variety: {}", variety);
        }
        if let Some(grade) = &product.grade {
            let _ = writeln!(out, "   Grade: {}", grade);
        }
        let _ = writeln!(out, "   Unit Size: {} {}", product.default_unit_size, product.uom);
        out.push_str("---\n");
    }
    let _ = writeln!(out, "\nTotal unique products: {}", products.len());

    out
}

pub fn render_summary(summary: &ImportSummary) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", summary.summary());
    let _ = writeln!(out, "  Rows read:          {}", summary.rows_read);
    let _ = writeln!(out, "  Empty memos:        {}", summary.empty_memos);
    let _ = writeln!(out, "  Non-product rows:   {}", summary.non_product_rows);
    let _ = writeln!(
        out,
        "  Complete / partial / unparsed: {} / {} / {}",
        summary.complete_rows, summary.partial_rows, summary.unparsed_rows
    );
    let _ = writeln!(out, "  Duplicate memos:    {}", summary.duplicate_memos);
    match summary.total_weight {
        Some(weight) => {
            let _ = writeln!(out, "  Total weight:       {} lbs", weight);
        }
        None => {
            let _ = writeln!(out, "  Total weight:       overflowed");
        }
    }
    let _ = writeln!(out, "  Total amount:       {}", format_amount(summary.total_amount));
    if summary.has_silent_losses() {
        let _ = writeln!(
            out,
            "  ⚠️  {} rows have no line total and are excluded from the amount above",
            summary.zero_line_total_rows
        );
    }

    out
}

/// Print every field of one parsed memo, for checking a pattern by hand.
pub fn render_line_item(item: &ParsedLineItem) -> String {
    fn show<T: std::fmt::Display>(value: &Option<T>) -> String {
        value
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "not found".to_string())
    }

    let mut out = String::new();
    let _ = writeln!(out, "Memo:         {}", item.memo);
    let _ = writeln!(out, "Status:       {:?}", item.status);
    let _ = writeln!(out, "Quantity:     {} {}", show(&item.quantity), item.uom.as_str().to_lowercase());
    let _ = writeln!(out, "Product:      {}", show(&item.product_name_raw));
    let _ = writeln!(out, "Unit Size:    {} {}", show(&item.unit_size), item.unit_size_unit);
    let _ = writeln!(out, "UOM:          {}", item.uom);
    let _ = writeln!(
        out,
        "Unit Price:   {}",
        item.unit_price
            .map(|p| format!("${}/{:?}", p.amount, p.basis).to_lowercase())
            .unwrap_or_else(|| "not found".to_string())
    );
    let _ = writeln!(out, "Total Weight: {}", show(&item.total_weight));
    let _ = writeln!(out, "Line Total:   {}", show(&item.line_total));

    out
}

/// Write any serializable value as pretty JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| ImportError::io(path, e))?;
    Ok(())
}

pub fn write_products_json(path: &Path, products: &[CanonicalProduct]) -> Result<()> {
    write_json(path, products)?;
    info!(path = %path.display(), products = products.len(), "products saved");
    Ok(())
}
