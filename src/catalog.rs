// 📦 Canonical Product Catalog
// One product per distinct (base name, variety, unit size) seen during an import run

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::memo::ParsedLineItem;
use crate::normalize::NormalizedName;

/// Unit of measure recorded on catalog products.
pub const CATALOG_UOM: &str = "lbs";

// ============================================================================
// CANONICAL PRODUCT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalProduct {
    pub name: String,
    pub variety: Option<String>,
    pub grade: Option<String>,
    pub default_unit_size: Decimal,
    pub uom: String,
}

impl CanonicalProduct {
    pub fn key(&self) -> ProductKey {
        ProductKey::new(&self.name, self.variety.as_deref(), self.default_unit_size)
    }
}

/// `base name | variety (or empty) | unit size`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductKey(String);

impl ProductKey {
    pub fn new(base_name: &str, variety: Option<&str>, unit_size: Decimal) -> Self {
        ProductKey(format!(
            "{}|{}|{}",
            base_name,
            variety.unwrap_or(""),
            unit_size.normalize()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// UPSERT OUTCOME
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// First time this key was seen; product added
    Inserted(ProductKey),
    /// Key already present; catalog unchanged
    Existing(ProductKey),
    /// Item cannot identify a product
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingUnitSize,
    EmptyName,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingUnitSize => "missing unit size",
            SkipReason::EmptyName => "empty product name",
        }
    }
}

// ============================================================================
// PRODUCT CATALOG
// ============================================================================

/// Deduplication map for a single run. First-seen attributes win; later
/// items with the same key never modify the stored product.
#[derive(Debug, Default)]
pub struct ProductCatalog {
    index: HashMap<ProductKey, usize>,
    products: Vec<CanonicalProduct>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, item: &ParsedLineItem, name: &NormalizedName) -> UpsertOutcome {
        let unit_size = match item.unit_size {
            Some(size) => size.normalize(),
            None => return UpsertOutcome::Skipped(SkipReason::MissingUnitSize),
        };

        if name.base_name.trim().is_empty() {
            return UpsertOutcome::Skipped(SkipReason::EmptyName);
        }

        let key = ProductKey::new(&name.base_name, name.variety.as_deref(), unit_size);
        if self.index.contains_key(&key) {
            return UpsertOutcome::Existing(key);
        }

        self.index.insert(key.clone(), self.products.len());
        self.products.push(CanonicalProduct {
            name: name.base_name.clone(),
            variety: name.variety.clone(),
            grade: name.grade.clone(),
            default_unit_size: unit_size,
            uom: CATALOG_UOM.to_string(),
        });

        UpsertOutcome::Inserted(key)
    }

    pub fn get(&self, key: &ProductKey) -> Option<&CanonicalProduct> {
        self.index.get(key).map(|&i| &self.products[i])
    }

    /// Products in first-insertion order.
    pub fn to_list(&self) -> Vec<CanonicalProduct> {
        self.products.clone()
    }

    pub fn products(&self) -> &[CanonicalProduct] {
        &self.products
    }

    pub fn into_products(self) -> Vec<CanonicalProduct> {
        self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
