use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// The five scoring dimensions of a GreenScore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pillar {
    Energy,
    Water,
    Waste,
    Carbon,
    Community,
}

impl Pillar {
    pub const ALL: [Pillar; 5] = [
        Pillar::Energy,
        Pillar::Water,
        Pillar::Waste,
        Pillar::Carbon,
        Pillar::Community,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pillar::Energy => "energy",
            Pillar::Water => "water",
            Pillar::Waste => "waste",
            Pillar::Carbon => "carbon",
            Pillar::Community => "community",
        }
    }
}

impl std::fmt::Display for Pillar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Carbon credit certification standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CreditStandard {
    #[serde(rename = "VCS")]
    Vcs,
    #[serde(rename = "Gold_Standard")]
    GoldStandard,
    #[serde(rename = "CDM")]
    Cdm,
}

impl CreditStandard {
    pub const ALL: [CreditStandard; 3] = [
        CreditStandard::Vcs,
        CreditStandard::GoldStandard,
        CreditStandard::Cdm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CreditStandard::Vcs => "VCS",
            CreditStandard::GoldStandard => "Gold_Standard",
            CreditStandard::Cdm => "CDM",
        }
    }
}

impl std::fmt::Display for CreditStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A confidence value, clamped to [0, 1] at construction. Serde goes
/// through the same clamp, so no deserialized value can escape the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Confidence(Decimal);

impl Confidence {
    pub fn new(value: Decimal) -> Self {
        Confidence(value.clamp(Decimal::ZERO, Decimal::ONE))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for Confidence {
    fn from(value: Decimal) -> Self {
        Confidence::new(value)
    }
}

impl From<Confidence> for Decimal {
    fn from(confidence: Confidence) -> Self {
        confidence.0
    }
}
