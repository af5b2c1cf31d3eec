// 🔄 Import Run
// One pass over a sales export: filter rows, parse memos, build the product catalog
//
// The run owns its catalog. Nothing survives between runs; persisting the
// products is the caller's job.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::{ProductCatalog, SkipReason, UpsertOutcome};
use crate::config::{ColumnRef, ImportConfig};
use crate::contact::{extract_address, extract_contact_info, Address, ContactInfo};
use crate::error::{ImportError, Result};
use crate::filter::RowFilter;
use crate::memo::{parse_commission, parse_memo, parse_payment_terms, ParseStatus, ParsedLineItem};
use crate::normalize::ProductNameNormalizer;
use crate::source::SourceTable;

// ============================================================================
// RECORDS
// ============================================================================

/// A parsed memo plus where it came from and which product it resolved to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRecord {
    pub line_number: usize,
    #[serde(flatten)]
    pub item: ParsedLineItem,
    pub product_key: Option<String>,
    /// Why the memo produced no catalog product
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,
    /// Fraction, e.g. 0.02 for "Commission 2%"
    pub commission: Option<Decimal>,
    pub payment_terms: Option<String>,
    pub fingerprint: String,
}

/// Contact details harvested from a row excluded from product extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub line_number: usize,
    pub contact: Option<ContactInfo>,
    pub address: Option<Address>,
}

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub rows_read: usize,
    pub empty_memos: usize,
    pub non_product_rows: usize,
    pub parsed_rows: usize,
    pub complete_rows: usize,
    pub partial_rows: usize,
    pub unparsed_rows: usize,
    /// Rows whose line total is missing or zero; these silently drop out of totals
    pub zero_line_total_rows: usize,
    pub duplicate_memos: usize,
    pub products_inserted: usize,
    pub products_skipped: usize,
    /// Running sums; `None` once a sum no longer fits a `Decimal`
    pub total_weight: Option<Decimal>,
    pub total_amount: Option<Decimal>,
}

impl ImportSummary {
    fn start() -> Self {
        let now = Utc::now();
        ImportSummary {
            run_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            rows_read: 0,
            empty_memos: 0,
            non_product_rows: 0,
            parsed_rows: 0,
            complete_rows: 0,
            partial_rows: 0,
            unparsed_rows: 0,
            zero_line_total_rows: 0,
            duplicate_memos: 0,
            products_inserted: 0,
            products_skipped: 0,
            total_weight: Some(Decimal::ZERO),
            total_amount: Some(Decimal::ZERO),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Import {}: {} rows, {} parsed ({} complete, {} partial, {} unparsed), {} non-product, {} products, {} total",
            self.run_id,
            self.rows_read,
            self.parsed_rows,
            self.complete_rows,
            self.partial_rows,
            self.unparsed_rows,
            self.non_product_rows,
            self.products_inserted,
            format_amount(self.total_amount)
        )
    }

    fn add_totals(&mut self, line: usize, item: &ParsedLineItem) {
        let weight = add_to_total(self.total_weight, item.total_weight);
        let amount = add_to_total(self.total_amount, item.line_total);

        let overflowed = (self.total_weight.is_some() && weight.is_none())
            || (self.total_amount.is_some() && amount.is_none());
        if overflowed {
            warn!(line, "batch total overflowed; totals are no longer tracked");
        }

        self.total_weight = weight;
        self.total_amount = amount;
    }

    pub fn has_silent_losses(&self) -> bool {
        self.zero_line_total_rows > 0
    }
}

fn add_to_total(total: Option<Decimal>, value: Option<Decimal>) -> Option<Decimal> {
    match value {
        Some(value) => total?.checked_add(value),
        None => total,
    }
}

/// `$1234.50`, or `overflowed` when the sum was lost
pub fn format_amount(amount: Option<Decimal>) -> String {
    match amount {
        Some(amount) => format!("${:.2}", amount),
        None => "overflowed".to_string(),
    }
}

pub struct ImportOutcome {
    pub summary: ImportSummary,
    pub line_items: Vec<LineItemRecord>,
    pub contacts: Vec<ContactRecord>,
    pub catalog: ProductCatalog,
}

// ============================================================================
// IMPORT RUN
// ============================================================================

pub struct ImportRun {
    memo_column: ColumnRef,
    filter: RowFilter,
    normalizer: ProductNameNormalizer,
}

impl ImportRun {
    pub fn new(config: &ImportConfig) -> Result<Self> {
        Ok(ImportRun {
            memo_column: config.memo_column.clone(),
            filter: config.row_filter(),
            normalizer: config.normalizer()?,
        })
    }

    pub fn execute(&self, table: &SourceTable) -> Result<ImportOutcome> {
        let column = table.resolve_column(&self.memo_column)?;
        let mut summary = ImportSummary::start();
        let mut catalog = ProductCatalog::new();
        let mut line_items = Vec::new();
        let mut contacts = Vec::new();
        let mut seen = HashSet::new();

        info!(
            run_id = %summary.run_id,
            rows = table.rows.len(),
            column = %self.memo_column,
            varieties = self.normalizer.varieties().len(),
            "starting import run"
        );

        for row in &table.rows {
            summary.rows_read += 1;

            let memo = match row.get(column).map(str::trim) {
                Some(memo) if !memo.is_empty() => memo,
                _ => {
                    summary.empty_memos += 1;
                    continue;
                }
            };

            if let Some(marker) = self.filter.matched_marker(memo) {
                debug!(line = row.line_number, marker, "non-product row");
                summary.non_product_rows += 1;

                let contact = extract_contact_info(memo);
                let address = extract_address(memo);
                if contact.is_some() || address.is_some() {
                    contacts.push(ContactRecord {
                        line_number: row.line_number,
                        contact,
                        address,
                    });
                }
                continue;
            }

            let item = parse_memo(memo);
            summary.parsed_rows += 1;

            match item.status {
                ParseStatus::Complete => summary.complete_rows += 1,
                ParseStatus::Partial => summary.partial_rows += 1,
                ParseStatus::Unparsed => summary.unparsed_rows += 1,
            }

            if item.has_zero_line_total() {
                summary.zero_line_total_rows += 1;
                warn!(
                    line = row.line_number,
                    status = ?item.status,
                    memo = %item.memo,
                    "memo has no line total"
                );
            }

            summary.add_totals(row.line_number, &item);

            let fingerprint = item.fingerprint();
            if !seen.insert(fingerprint.clone()) {
                summary.duplicate_memos += 1;
            }

            let (product_key, skip_reason) = match item.product_name_raw.as_deref() {
                Some(phrase) => {
                    let name = self.normalizer.normalize(phrase);
                    match catalog.upsert(&item, &name) {
                        UpsertOutcome::Inserted(key) => {
                            summary.products_inserted += 1;
                            debug!(line = row.line_number, key = key.as_str(), "new product");
                            (Some(key.as_str().to_string()), None)
                        }
                        UpsertOutcome::Existing(key) => (Some(key.as_str().to_string()), None),
                        UpsertOutcome::Skipped(reason) => {
                            summary.products_skipped += 1;
                            match reason {
                                // Variety keyword ahead of the product name
                                SkipReason::EmptyName => warn!(
                                    line = row.line_number,
                                    phrase,
                                    variety = ?name.variety,
                                    "product phrase has no base name; product dropped"
                                ),
                                SkipReason::MissingUnitSize => debug!(
                                    line = row.line_number,
                                    reason = reason.as_str(),
                                    "no product for memo"
                                ),
                            }
                            (None, Some(reason))
                        }
                    }
                }
                None => {
                    summary.products_skipped += 1;
                    (None, None)
                }
            };

            line_items.push(LineItemRecord {
                line_number: row.line_number,
                commission: row.cells.iter().find_map(|cell| parse_commission(cell)),
                payment_terms: parse_payment_terms(&item.memo),
                product_key,
                skip_reason,
                fingerprint,
                item,
            });
        }

        summary.finished_at = Utc::now();
        info!(
            run_id = %summary.run_id,
            parsed = summary.parsed_rows,
            unparsed = summary.unparsed_rows,
            zero_total = summary.zero_line_total_rows,
            products = catalog.len(),
            "import run finished"
        );

        Ok(ImportOutcome {
            summary,
            line_items,
            contacts,
            catalog,
        })
    }
}

/// Reject a run that produced nothing usable. Used by the CLI with `--strict`.
pub fn ensure_products(outcome: &ImportOutcome) -> Result<()> {
    if outcome.catalog.is_empty() {
        return Err(ImportError::Config(format!(
            "no products extracted from {} rows; check the memo column",
            outcome.summary.rows_read
        )));
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
