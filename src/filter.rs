// 🚧 Row Filter
// Keeps address blocks, e-mail lines and other non-product memos out of product extraction

/// Markers that flag a memo as not describing a product.
pub fn default_non_product_markers() -> Vec<String> {
    vec!["@".to_string(), "usa".to_string(), "brooklyn".to_string()]
}

#[derive(Debug, Clone)]
pub struct RowFilter {
    /// Lowercased markers, matched as plain substrings
    markers: Vec<String>,
}

impl RowFilter {
    pub fn new(markers: &[String]) -> Self {
        RowFilter {
            markers: markers
                .iter()
                .map(|m| m.trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    /// Returns the first marker found in the memo, if any.
    pub fn matched_marker(&self, memo: &str) -> Option<&str> {
        let memo_lower = memo.to_lowercase();
        self.markers
            .iter()
            .find(|marker| memo_lower.contains(marker.as_str()))
            .map(String::as_str)
    }

    pub fn is_non_product(&self, memo: &str) -> bool {
        self.matched_marker(memo).is_some()
    }
}

impl Default for RowFilter {
    fn default() -> Self {
        Self::new(&default_non_product_markers())
    }
}
