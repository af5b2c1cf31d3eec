// Pace Import - Core Library
// Sales-memo parsing and product catalog extraction for CLI and tests

pub mod error;
pub mod logging;
pub mod config;
pub mod source;
pub mod filter;
pub mod memo;
pub mod normalize;
pub mod catalog;
pub mod contact;
pub mod import;
pub mod report;

// Re-export commonly used types
pub use error::{ImportError, Result};
pub use config::{ColumnRef, ImportConfig};
pub use source::{read_rows, SourceRow, SourceTable};
pub use filter::RowFilter;
pub use memo::{
    parse_commission, parse_memo, parse_payment_terms,
    PackageUnit, ParseStatus, ParsedLineItem, PriceBasis, UnitPrice, Uom,
};
pub use normalize::{
    collapse_whitespace, title_case,
    NormalizedName, ProductNameNormalizer, VarietyRule, VarietyTable,
};
pub use catalog::{CanonicalProduct, ProductCatalog, ProductKey, SkipReason, UpsertOutcome};
pub use contact::{extract_address, extract_contact_info, Address, ContactInfo};
pub use import::{ContactRecord, ImportOutcome, ImportRun, ImportSummary, LineItemRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
