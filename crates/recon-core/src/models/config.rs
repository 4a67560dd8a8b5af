//! Supplier configuration: tax types, rates, fees and rounding policy.
//!
//! Owned by the supplier entity and read-only to the engine. Absent
//! optional fields always fall back to the documented defaults (tax rate
//! 10%, rounding `{total, floor}`), never to an error.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Whether a monetary figure already includes tax or must have tax added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxType {
    Included,
    Excluded,
}

impl Default for TaxType {
    fn default() -> Self {
        Self::Included
    }
}

impl TaxType {
    /// Lenient parse used by configuration loaders; unknown strings fall
    /// back to `Included` (the no-op conversion).
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "excluded" | "exclusive" | "税抜" => Self::Excluded,
            _ => Self::Included,
        }
    }
}

/// The point in a supplier's arithmetic where tax rounding is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationType {
    /// Round each item's price and commission independently.
    PerItem,
    /// Round the price subtotal and commission subtotal once each.
    Subtotal,
    /// Round exactly once, on the grand total.
    Total,
}

impl Default for CalculationType {
    fn default() -> Self {
        Self::Total
    }
}

/// Integer rounding function applied at the configured calculation points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    Floor,
    Ceil,
    /// Round half up, away from zero at .5.
    Round,
}

impl Default for RoundingMode {
    fn default() -> Self {
        Self::Floor
    }
}

impl RoundingMode {
    /// Unknown mode strings default to floor.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "ceil" | "ceiling" => Self::Ceil,
            "round" => Self::Round,
            _ => Self::Floor,
        }
    }
}

/// Rounding policy: where to round and how.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundingConfig {
    pub calculation_type: CalculationType,
    pub rounding_mode: RoundingMode,
}

/// A configured fee with its own tax inclusion semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    pub amount: Decimal,

    #[serde(default)]
    pub tax_type: TaxType,
}

/// Business rules for computing a supplier's expected total.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplierConfig {
    /// Whether line item purchase prices already include tax.
    pub product_price_tax_type: TaxType,

    /// Whether line item commissions already include tax.
    pub commission_tax_type: TaxType,

    /// Tax rate as a decimal fraction (0.1 = 10%).
    pub tax_rate: Decimal,

    /// Per-batch participation fee, if the supplier charges one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participation_fee: Option<FeeConfig>,

    /// Shipping fee, if the supplier charges one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_fee: Option<FeeConfig>,

    /// Rounding policy mirroring the supplier's own bookkeeping.
    pub rounding: RoundingConfig,
}

impl Default for SupplierConfig {
    fn default() -> Self {
        Self {
            product_price_tax_type: TaxType::Included,
            commission_tax_type: TaxType::Included,
            tax_rate: Decimal::from_str("0.10").unwrap(),
            participation_fee: None,
            shipping_fee: None,
            rounding: RoundingConfig::default(),
        }
    }
}

impl SupplierConfig {
    /// Load configuration from a JSON file. Missing fields resolve to the
    /// documented defaults via `#[serde(default)]`.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        config
            .validate()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.tax_rate < Decimal::ZERO {
            return Err(format!("tax_rate must be >= 0, got {}", self.tax_rate));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = SupplierConfig::default();
        assert_eq!(config.tax_rate, Decimal::from_str("0.10").unwrap());
        assert_eq!(config.rounding.calculation_type, CalculationType::Total);
        assert_eq!(config.rounding.rounding_mode, RoundingMode::Floor);
        assert!(config.participation_fee.is_none());
    }

    #[test]
    fn test_absent_fields_fall_back() {
        // An empty object is a valid config: everything defaults.
        let config: SupplierConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.rounding, RoundingConfig::default());
        assert_eq!(config.product_price_tax_type, TaxType::Included);

        // Partial rounding config also defaults field-wise.
        let config: SupplierConfig =
            serde_json::from_str(r#"{"rounding":{"rounding_mode":"ceil"}}"#).unwrap();
        assert_eq!(config.rounding.rounding_mode, RoundingMode::Ceil);
        assert_eq!(config.rounding.calculation_type, CalculationType::Total);
    }

    #[test]
    fn test_rounding_mode_parse_unknown_is_floor() {
        assert_eq!(RoundingMode::parse("banker"), RoundingMode::Floor);
        assert_eq!(RoundingMode::parse("ceil"), RoundingMode::Ceil);
        assert_eq!(RoundingMode::parse("ROUND"), RoundingMode::Round);
    }

    #[test]
    fn test_negative_tax_rate_rejected() {
        let config = SupplierConfig {
            tax_rate: Decimal::from(-1),
            ..SupplierConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
