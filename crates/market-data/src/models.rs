//! Candidate models for symbol lookup.

use serde::{Deserialize, Serialize};

/// One ticker-symbol match returned by the lookup provider.
///
/// Candidates are kept in the order the provider returned them; the first
/// element is the provider's own best match and is never re-scored here.
/// Every field beyond `symbol` is optional because providers omit them
/// for some listings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Candidate {
    /// Symbol/ticker usable in follow-up API calls (e.g., "AAPL", "SHOP.TO")
    pub symbol: String,

    /// Display variant of the symbol, when it differs (e.g., "BRK.B")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_symbol: Option<String>,

    /// Company name/description (e.g., "Apple Inc")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Security kind (e.g., "Stock", "ETF")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Candidate {
    /// Create a candidate with just the required symbol.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            display_symbol: None,
            description: None,
            kind: None,
        }
    }

    /// Set the display symbol.
    pub fn with_display_symbol(mut self, display_symbol: impl Into<String>) -> Self {
        self.display_symbol = Some(display_symbol.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the security kind.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_fields() {
        let candidate = Candidate::new("AAPL")
            .with_display_symbol("AAPL")
            .with_description("Apple Inc")
            .with_kind("Stock");

        assert_eq!(candidate.symbol, "AAPL");
        assert_eq!(candidate.display_symbol.as_deref(), Some("AAPL"));
        assert_eq!(candidate.description.as_deref(), Some("Apple Inc"));
        assert_eq!(candidate.kind.as_deref(), Some("Stock"));
    }

    #[test]
    fn test_optional_fields_skipped_in_json() {
        let candidate = Candidate::new("AAPL");
        let json = serde_json::to_string(&candidate).unwrap();
        assert_eq!(json, r#"{"symbol":"AAPL"}"#);
    }
}
