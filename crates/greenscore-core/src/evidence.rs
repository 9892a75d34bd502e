//! Structured evidence signals handed over by the OCR/vision subsystem.
//!
//! The engine never touches images or raw documents; it consumes the
//! already-extracted vendor, amount, line items, detected labels, and
//! geotag, and turns them into features and metrics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: Decimal,
    pub lon: Decimal,
}

/// Extracted evidence signals for one submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidenceSignals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_ksh: Option<Decimal>,
    /// Parsed receipt/invoice line items.
    #[serde(default)]
    pub items: Vec<String>,
    /// Labels detected in the uploaded image.
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoPoint>,
}

impl EvidenceSignals {
    /// Lowercased free-text descriptor of what the evidence shows,
    /// combining line items and image labels.
    pub fn action_descriptor(&self) -> String {
        self.items
            .iter()
            .chain(self.labels.iter())
            .map(|s| s.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn labels_contain(&self, needle: &str) -> bool {
        self.labels
            .iter()
            .any(|l| l.to_lowercase().contains(needle))
    }

    pub fn items_contain(&self, needle: &str) -> bool {
        self.items.iter().any(|i| i.to_lowercase().contains(needle))
    }

    pub fn vendor_contains_any(&self, needles: &[&str]) -> bool {
        match &self.vendor {
            Some(vendor) => {
                let vendor = vendor.to_lowercase();
                needles.iter().any(|n| vendor.contains(n))
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_descriptor_combines_items_and_labels() {
        let signals = EvidenceSignals {
            items: vec!["Drip Kit".into()],
            labels: vec!["Solar Panel".into()],
            ..Default::default()
        };
        assert_eq!(signals.action_descriptor(), "drip kit solar panel");
    }

    #[test]
    fn test_labels_contain_is_case_insensitive() {
        let signals = EvidenceSignals {
            labels: vec!["SOLAR panel".into()],
            ..Default::default()
        };
        assert!(signals.labels_contain("solar"));
        assert!(!signals.labels_contain("diesel"));
    }

    #[test]
    fn test_vendor_contains_any() {
        let signals = EvidenceSignals {
            vendor: Some("NEMA Certified Supplies Ltd".into()),
            ..Default::default()
        };
        assert!(signals.vendor_contains_any(&["certified", "approved"]));
        assert!(!signals.vendor_contains_any(&["licensed"]));
    }
}
