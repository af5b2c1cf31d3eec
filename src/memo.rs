// 🧾 Memo Parser
// Turns one free-text sales memo into a structured line item
//
// Example memo:
//   "210 cases pistachios shelled halves and pieces 30# $6.75/lbs pick up California 09/24"
//
// A memo that matches nothing is still a valid result: every optional field is
// None and `status` is `Unparsed`. Callers decide what to do with it.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::normalize::collapse_whitespace;

// ============================================================================
// PATTERNS
// ============================================================================

static QUANTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s+(master bags?|cases?|bags?)").expect("quantity pattern")
});

static UNIT_SIZE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*#|(\d+)x(\d+)\s*#").expect("unit size pattern")
});

static UNIT_PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$(\d+(?:\.\d+)?)\s*/\s*(lbs?|bag|case)").expect("unit price pattern")
});

static LEADING_QUANTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\d+\s+(master bags?|cases?|bags?)\s+").expect("leading quantity pattern")
});

static TRAILING_SIZE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|\s+)(?:\d+x)?\d+(?:\.\d+)?\s*#.*$").expect("trailing size pattern")
});

static TRAILING_PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+\$\d+(?:\.\d+)?\s*/.*$").expect("trailing price pattern")
});

static TRAILING_LOGISTICS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(pick\s+up|deliver|must leave check).*$").expect("logistics pattern")
});

static COMMISSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Commission\s+(\d+(?:\.\d+)?)%").expect("commission pattern")
});

static PAYMENT_TERMS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)post\s+dated\s+check\s+(\d+)\s+days").expect("payment terms pattern")
});

// ============================================================================
// UNITS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PackageUnit {
    Case,
    Bag,
    MasterBag,
}

impl PackageUnit {
    /// Classify a matched package token by its leading word.
    fn from_token(token: &str) -> Option<Self> {
        let token = token.to_lowercase();
        if token.starts_with("case") {
            Some(PackageUnit::Case)
        } else if token.starts_with("bag") {
            Some(PackageUnit::Bag)
        } else if token.starts_with("master") {
            Some(PackageUnit::MasterBag)
        } else {
            None
        }
    }

    pub fn uom(&self) -> Uom {
        match self {
            PackageUnit::Case => Uom::Case,
            PackageUnit::Bag => Uom::Bag,
            PackageUnit::MasterBag => Uom::MasterBag,
        }
    }
}

/// Unit of measure for a line item. Pounds unless a package token says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Uom {
    #[default]
    #[serde(rename = "LBS")]
    Lbs,
    #[serde(rename = "CASE")]
    Case,
    #[serde(rename = "BAG")]
    Bag,
    #[serde(rename = "MASTER BAG")]
    MasterBag,
}

impl Uom {
    pub fn as_str(&self) -> &'static str {
        match self {
            Uom::Lbs => "LBS",
            Uom::Case => "CASE",
            Uom::Bag => "BAG",
            Uom::MasterBag => "MASTER BAG",
        }
    }
}

impl fmt::Display for Uom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a quoted price is per. Recorded only; totals always treat the
/// price as per pound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceBasis {
    Lb,
    Bag,
    Case,
}

impl PriceBasis {
    fn from_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "lb" | "lbs" => Some(PriceBasis::Lb),
            "bag" => Some(PriceBasis::Bag),
            "case" => Some(PriceBasis::Case),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPrice {
    pub amount: Decimal,
    pub basis: PriceBasis,
}

pub const UNIT_SIZE_UNIT: &str = "lb";

// ============================================================================
// PARSED LINE ITEM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseStatus {
    /// Quantity, unit size and price all found; line total is known
    Complete,
    /// Something matched but the line total cannot be derived
    Partial,
    /// No pattern matched at all
    Unparsed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedLineItem {
    /// Memo after whitespace normalization
    pub memo: String,
    pub quantity: Option<u32>,
    pub package_unit: Option<PackageUnit>,
    pub product_name_raw: Option<String>,
    pub unit_size: Option<Decimal>,
    pub unit_size_unit: String,
    pub unit_price: Option<UnitPrice>,
    pub uom: Uom,
    pub total_weight: Option<Decimal>,
    pub line_total: Option<Decimal>,
    pub status: ParseStatus,
}

impl ParsedLineItem {
    /// True when the row contributes nothing to financial totals.
    pub fn has_zero_line_total(&self) -> bool {
        self.line_total.map_or(true, |total| total.is_zero())
    }

    /// SHA-256 of the lowercased memo, used to spot rows repeated in an export.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.memo.to_lowercase());
        format!("{:x}", hasher.finalize())
    }
}

// ============================================================================
// PARSER
// ============================================================================

pub fn parse_memo(text: &str) -> ParsedLineItem {
    let memo = collapse_whitespace(text);

    let (quantity, package_unit) = match QUANTITY_RE.captures(&memo) {
        Some(caps) => (
            caps[1].parse::<u32>().ok().filter(|q| *q > 0),
            PackageUnit::from_token(&caps[2]),
        ),
        None => (None, None),
    };

    let unit_size = UNIT_SIZE_RE.captures(&memo).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(3))
            .and_then(|m| Decimal::from_str(m.as_str()).ok())
            .map(|size| size.normalize())
            .filter(|size| *size > Decimal::ZERO)
    });

    let unit_price = UNIT_PRICE_RE.captures(&memo).and_then(|caps| {
        let amount = Decimal::from_str(&caps[1]).ok()?;
        let basis = PriceBasis::from_token(&caps[2])?;
        Some(UnitPrice { amount, basis })
    });

    let uom = package_unit.map(|unit| unit.uom()).unwrap_or_default();

    let total_weight = match (quantity, unit_size) {
        (Some(q), Some(size)) => Decimal::from(q).checked_mul(size),
        _ => None,
    };
    let line_total = match (total_weight, unit_price) {
        (Some(weight), Some(price)) => weight.checked_mul(price.amount),
        _ => None,
    };

    let status = if line_total.is_some() {
        ParseStatus::Complete
    } else if quantity.is_some() || unit_size.is_some() || unit_price.is_some() {
        ParseStatus::Partial
    } else {
        ParseStatus::Unparsed
    };

    let product_name_raw = if status == ParseStatus::Unparsed {
        None
    } else {
        extract_product_phrase(&memo)
    };

    ParsedLineItem {
        memo,
        quantity,
        package_unit,
        product_name_raw,
        unit_size,
        unit_size_unit: UNIT_SIZE_UNIT.to_string(),
        unit_price,
        uom,
        total_weight,
        line_total,
        status,
    }
}

/// Strip quantity, size, price and pickup/delivery text from a memo,
/// leaving the product description in between.
pub fn extract_product_phrase(memo: &str) -> Option<String> {
    let phrase = LEADING_QUANTITY_RE.replace(memo.trim(), "");
    let phrase = TRAILING_SIZE_RE.replace(&phrase, "");
    let phrase = TRAILING_PRICE_RE.replace(&phrase, "");
    let phrase = TRAILING_LOGISTICS_RE.replace(&phrase, "");
    let phrase = phrase.trim();

    if phrase.is_empty() {
        None
    } else {
        Some(phrase.to_string())
    }
}

/// "Commission 2%" → 0.02
pub fn parse_commission(text: &str) -> Option<Decimal> {
    let caps = COMMISSION_RE.captures(text)?;
    let percent = Decimal::from_str(&caps[1]).ok()?;
    Some(percent / Decimal::ONE_HUNDRED)
}

/// "post dated check 30 days" → "Net 30"
pub fn parse_payment_terms(text: &str) -> Option<String> {
    PAYMENT_TERMS_RE
        .captures(text)
        .map(|caps| format!("Net {}", &caps[1]))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_pistachio_pickup_memo() {
        let item = parse_memo(
            "210 cases pistachios shelled halves and pieces 30# $6.75/lbs pick up California 09/24",
        );

        assert_eq!(item.quantity, Some(210));
        assert_eq!(item.package_unit, Some(PackageUnit::Case));
        assert_eq!(item.unit_size, Some(d("30")));
        assert_eq!(item.unit_price.map(|p| p.amount), Some(d("6.75")));
        assert_eq!(item.unit_price.map(|p| p.basis), Some(PriceBasis::Lb));
        assert_eq!(item.total_weight, Some(d("6300")));
        assert_eq!(item.line_total, Some(d("42525.00")));
        assert_eq!(item.uom, Uom::Case);
        assert_eq!(item.status, ParseStatus::Complete);
        assert_eq!(
            item.product_name_raw.as_deref(),
            Some("pistachios shelled halves and pieces")
        );
    }

    #[test]
    fn test_walnut_combo_memo() {
        let item = parse_memo("80 cases walnuts combo halves and pieces 25# $1.35/lbs");

        assert_eq!(item.quantity, Some(80));
        assert_eq!(item.unit_size, Some(d("25")));
        assert_eq!(item.unit_price.map(|p| p.amount), Some(d("1.35")));
        assert_eq!(item.total_weight, Some(d("2000")));
        assert_eq!(item.line_total, Some(d("2700.00")));
        assert_eq!(
            item.product_name_raw.as_deref(),
            Some("walnuts combo halves and pieces")
        );
    }

    #[test]
    fn test_bags_template() {
        let item = parse_memo("12 Bags almonds natural 50# $3.10/lb");

        assert_eq!(item.quantity, Some(12));
        assert_eq!(item.uom, Uom::Bag);
        assert_eq!(item.total_weight, Some(d("600")));
        assert_eq!(item.line_total, Some(d("1860")));
    }

    #[test]
    fn test_master_bags() {
        let item = parse_memo("4 master bags raisins dark 30# $2.00/bag");

        assert_eq!(item.quantity, Some(4));
        assert_eq!(item.package_unit, Some(PackageUnit::MasterBag));
        assert_eq!(item.uom, Uom::MasterBag);
        assert_eq!(item.unit_price.map(|p| p.basis), Some(PriceBasis::Bag));
        assert_eq!(item.product_name_raw.as_deref(), Some("raisins dark"));
    }

    #[test]
    fn test_pack_of_n_unit_size() {
        let item = parse_memo("20 cases dates pitted 4x10# $2.50/lbs");

        assert_eq!(item.unit_size, Some(d("10")));
        assert_eq!(item.total_weight, Some(d("200")));
        assert_eq!(item.product_name_raw.as_deref(), Some("dates pitted"));
    }

    #[test]
    fn test_decimal_unit_size() {
        let item = parse_memo("10 cases figs 12.5 # $4/lbs");
        assert_eq!(item.unit_size, Some(d("12.5")));
        assert_eq!(item.line_total, Some(d("500")));
    }

    #[test]
    fn test_first_size_candidate_wins() {
        let item = parse_memo("5 cases cashews 25# repacked from 50#");
        assert_eq!(item.unit_size, Some(d("25")));
    }

    #[test]
    fn test_embedded_newlines() {
        let item = parse_memo("80 cases\nwalnuts\r\n 25#\n$1.35/lbs");
        assert_eq!(item.memo, "80 cases walnuts 25# $1.35/lbs");
        assert_eq!(item.status, ParseStatus::Complete);
        assert_eq!(item.product_name_raw.as_deref(), Some("walnuts"));
    }

    #[test]
    fn test_no_digits_no_dollar() {
        let item = parse_memo("thank you for your business");

        assert_eq!(item.quantity, None);
        assert_eq!(item.unit_size, None);
        assert_eq!(item.unit_price, None);
        assert_eq!(item.total_weight, None);
        assert_eq!(item.line_total, None);
        assert_eq!(item.uom, Uom::Lbs);
        assert_eq!(item.status, ParseStatus::Unparsed);
        assert_eq!(item.product_name_raw, None);
        assert!(item.has_zero_line_total());
    }

    #[test]
    fn test_partial_without_price() {
        let item = parse_memo("80 bags walnuts 50#");

        assert_eq!(item.total_weight, Some(d("4000")));
        assert_eq!(item.line_total, None);
        assert_eq!(item.status, ParseStatus::Partial);
        assert_eq!(item.product_name_raw.as_deref(), Some("walnuts"));
    }

    #[test]
    fn test_zero_quantity_is_absent() {
        let item = parse_memo("0 cases walnuts 25# $1.35/lbs");
        assert_eq!(item.quantity, None);
        assert_eq!(item.line_total, None);
        assert_eq!(item.uom, Uom::Case);
    }

    #[test]
    fn test_fingerprint_ignores_case_and_spacing() {
        let a = parse_memo("80 cases walnuts 25#");
        let b = parse_memo("80  CASES walnuts\n25#");
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_commission() {
        assert_eq!(parse_commission("Commission 2%"), Some(d("0.02")));
        assert_eq!(parse_commission("commission 2.5%"), Some(d("0.025")));
        assert_eq!(parse_commission("no commission here"), None);
    }

    #[test]
    fn test_payment_terms() {
        assert_eq!(
            parse_payment_terms("40 cases pecans 30# post dated check 30 days"),
            Some("Net 30".to_string())
        );
        assert_eq!(parse_payment_terms("pay on delivery"), None);
    }

    #[test]
    fn test_line_item_json_shape() {
        let item = parse_memo("80 cases walnuts 25# $1.35/lbs");
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["quantity"], 80);
        assert_eq!(json["uom"], "CASE");
        assert_eq!(json["unitSize"], "25");
        assert_eq!(json["status"], "complete");
        assert_eq!(json["unitPrice"]["basis"], "lb");
    }
}
