// ⚙️ Import Configuration
// Which column holds the memo, which rows to skip, which varieties to recognize

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{ImportError, Result};
use crate::filter::{default_non_product_markers, RowFilter};
use crate::normalize::{default_variety_rules, ProductNameNormalizer, VarietyRule, VarietyTable};

/// Memo column in the export: 0-based position, or a header name when the
/// file has a header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl ColumnRef {
    /// "5" → Index(5), anything else → Name
    pub fn parse(value: &str) -> Self {
        match value.trim().parse::<usize>() {
            Ok(index) => ColumnRef::Index(index),
            Err(_) => ColumnRef::Name(value.trim().to_string()),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(i) => write!(f, "#{}", i),
            ColumnRef::Name(name) => write!(f, "'{}'", name),
        }
    }
}

fn default_memo_column() -> ColumnRef {
    // Memo/Description column of the sales-by-customer export
    ColumnRef::Index(5)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportConfig {
    #[serde(default = "default_memo_column")]
    pub memo_column: ColumnRef,

    #[serde(default)]
    pub has_headers: bool,

    #[serde(default = "default_non_product_markers")]
    pub non_product_markers: Vec<String>,

    /// Checked in order; first keyword found wins
    #[serde(default = "default_variety_rules")]
    pub varieties: Vec<VarietyRule>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            memo_column: default_memo_column(),
            has_headers: false,
            non_product_markers: default_non_product_markers(),
            varieties: default_variety_rules(),
        }
    }
}

impl ImportConfig {
    /// Load configuration from a JSON file. Missing keys fall back to defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ImportError::io(path, e))?;

        let config: ImportConfig = serde_json::from_str(&content)?;

        // Bad variety keywords fail the load
        config.normalizer()?;

        Ok(config)
    }

    pub fn row_filter(&self) -> RowFilter {
        RowFilter::new(&self.non_product_markers)
    }

    pub fn normalizer(&self) -> Result<ProductNameNormalizer> {
        let table = VarietyTable::from_rules(self.varieties.clone())?;
        Ok(ProductNameNormalizer::new(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_sales_export() {
        let config = ImportConfig::default();
        assert_eq!(config.memo_column, ColumnRef::Index(5));
        assert!(!config.has_headers);
        assert_eq!(config.non_product_markers, vec!["@", "usa", "brooklyn"]);
        assert_eq!(config.varieties.len(), 4);
        assert_eq!(config.varieties[0].keyword, "combo halves and pieces");
    }

    #[test]
    fn test_column_ref_parse() {
        assert_eq!(ColumnRef::parse("7"), ColumnRef::Index(7));
        assert_eq!(ColumnRef::parse(" Memo/Description "), ColumnRef::Name("Memo/Description".to_string()));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "memoColumn": "Memo",
                "hasHeaders": true,
                "varieties": [
                    {{ "keyword": "roasted salted", "label": "Roasted Salted" }},
                    {{ "keyword": "hulled", "label": "Hulled" }}
                ]
            }}"#
        )
        .unwrap();

        let config = ImportConfig::from_file(file.path()).unwrap();
        assert_eq!(config.memo_column, ColumnRef::Name("Memo".to_string()));
        assert!(config.has_headers);
        assert_eq!(config.non_product_markers, default_non_product_markers());

        let name = config.normalizer().unwrap().normalize("almonds roasted salted");
        assert_eq!(name.base_name, "Almonds");
        assert_eq!(name.variety.as_deref(), Some("Roasted Salted"));
    }

    #[test]
    fn test_numeric_column_in_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "memoColumn": 2 }}"#).unwrap();

        let config = ImportConfig::from_file(file.path()).unwrap();
        assert_eq!(config.memo_column, ColumnRef::Index(2));
    }

    #[test]
    fn test_blank_variety_keyword_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "varieties": [{{ "keyword": "", "label": "Nothing" }}] }}"#).unwrap();

        let result = ImportConfig::from_file(file.path());
        assert!(matches!(result, Err(ImportError::Config(_))));
    }

    #[test]
    fn test_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "memoColumn": "#).unwrap();

        let result = ImportConfig::from_file(file.path());
        assert!(matches!(result, Err(ImportError::Json(_))));
    }

    #[test]
    fn test_example_config() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/pace-import.example.json");
        let config = ImportConfig::from_file(path).unwrap();

        assert!(config.row_filter().is_non_product("must leave check"));
        let name = config
            .normalizer()
            .unwrap()
            .normalize("pistachios shelled halves and pieces");
        assert_eq!(name.base_name, "Pistachios Shelled");
        assert_eq!(name.variety.as_deref(), Some("Halves and Pieces"));
    }

    #[test]
    fn test_missing_file() {
        let result = ImportConfig::from_file("/nonexistent/pace-import.json");
        assert!(matches!(result, Err(ImportError::Io { .. })));
    }
}
