//! Price catalog: territory → category → unit price.
//!
//! Rural prices are €/ha keyed by [`Category`]; urban coefficients are
//! dimensionless multipliers keyed by the declared use type. Both tables
//! must carry a `default` territory, and every territory a `default` entry.
//! The catalog is loaded once and never mutated.

use crate::domain::category::Category;
use crate::utils::document::parse_document;
use crate::utils::error::{Result, ValuationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_TERRITORY: &str = "default";
pub const DEFAULT_USE: &str = "default";

pub type CropPrices = BTreeMap<Category, f64>;
pub type UseCoefficients = BTreeMap<String, f64>;

/// The catalog document as written on disk; category keys are still text.
#[derive(Debug, Clone, Deserialize)]
struct CatalogDocument {
    version: String,
    #[serde(default)]
    provenance: Vec<String>,
    rural: BTreeMap<String, BTreeMap<String, f64>>,
    urban: BTreeMap<String, UseCoefficients>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceCatalog {
    version: String,
    provenance: Vec<String>,
    rural: BTreeMap<String, CropPrices>,
    urban: BTreeMap<String, UseCoefficients>,
}

/// A rural unit price and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceLookup {
    pub territory: String,
    pub territory_fell_back: bool,
    pub category: Category,
    pub category_fell_back: bool,
    pub unit_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientLookup {
    pub territory: String,
    pub territory_fell_back: bool,
    pub use_key: String,
    pub coefficient: f64,
}

impl PriceCatalog {
    /// Parses and validates a catalog document (TOML or JSON by extension).
    pub fn from_document(path: &str, bytes: &[u8]) -> Result<Self> {
        let document: CatalogDocument = parse_document(path, bytes)?;

        let mut rural = BTreeMap::new();
        for (territory, prices) in document.rural {
            let mut typed = CropPrices::new();
            for (key, price) in prices {
                let category = Category::from_key(&key).ok_or_else(|| {
                    ValuationError::catalog(format!(
                        "unknown category '{}' in rural territory '{}'",
                        key, territory
                    ))
                })?;
                typed.insert(category, price);
            }
            rural.insert(territory, typed);
        }

        let catalog = PriceCatalog {
            version: document.version,
            provenance: document.provenance,
            rural,
            urban: document
                .urban
                .into_iter()
                .map(|(territory, coefficients)| {
                    let normalized = coefficients
                        .into_iter()
                        .map(|(use_key, value)| (use_key.trim().to_lowercase(), value))
                        .collect();
                    (territory, normalized)
                })
                .collect(),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::from_document("catalog.toml", content.as_bytes())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn provenance(&self) -> &[String] {
        &self.provenance
    }

    pub fn rural_territories(&self) -> impl Iterator<Item = &str> {
        self.rural.keys().map(String::as_str)
    }

    fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(ValuationError::catalog("catalog version cannot be empty"));
        }

        if !self.rural.contains_key(DEFAULT_TERRITORY) {
            return Err(ValuationError::catalog(
                "rural table has no 'default' territory",
            ));
        }
        for (territory, prices) in &self.rural {
            if !prices.contains_key(&Category::Default) {
                return Err(ValuationError::catalog(format!(
                    "rural territory '{}' has no 'default' price",
                    territory
                )));
            }
            if let Some((category, price)) = prices.iter().find(|(_, p)| !is_valid_amount(**p)) {
                return Err(ValuationError::catalog(format!(
                    "rural price {}/{} must be a non-negative number, got {}",
                    territory, category, price
                )));
            }
        }

        if !self.urban.contains_key(DEFAULT_TERRITORY) {
            return Err(ValuationError::catalog(
                "urban table has no 'default' territory",
            ));
        }
        for (territory, coefficients) in &self.urban {
            if !coefficients.contains_key(DEFAULT_USE) {
                return Err(ValuationError::catalog(format!(
                    "urban territory '{}' has no 'default' coefficient",
                    territory
                )));
            }
            if let Some((use_key, value)) =
                coefficients.iter().find(|(_, c)| !is_valid_amount(**c))
            {
                return Err(ValuationError::catalog(format!(
                    "urban coefficient {}/{} must be a non-negative number, got {}",
                    territory, use_key, value
                )));
            }
        }

        Ok(())
    }

    /// Unit price for (territory, category), falling back first to the
    /// territory's `default` category, then to the `default` territory.
    pub fn rural_price(&self, territory: &str, category: Category) -> PriceLookup {
        let (applied_territory, prices, territory_fell_back) =
            match self.rural.get_key_value(territory) {
                Some((key, prices)) => (key.as_str(), prices, false),
                None => (DEFAULT_TERRITORY, &self.rural[DEFAULT_TERRITORY], true),
            };

        let (applied_category, unit_price) = match prices.get(&category) {
            Some(price) => (category, *price),
            None => (Category::Default, prices[&Category::Default]),
        };

        PriceLookup {
            territory: applied_territory.to_string(),
            territory_fell_back,
            category: applied_category,
            category_fell_back: applied_category != category,
            unit_price,
        }
    }

    /// Coefficient for a declared urban use. Tries the exact key, then the
    /// first catalog key (in key order) contained in the use text, then
    /// `default`.
    pub fn urban_coefficient(&self, territory: &str, declared_use: &str) -> CoefficientLookup {
        let (applied_territory, coefficients, territory_fell_back) =
            match self.urban.get_key_value(territory) {
                Some((key, coefficients)) => (key.as_str(), coefficients, false),
                None => (DEFAULT_TERRITORY, &self.urban[DEFAULT_TERRITORY], true),
            };

        let use_text = declared_use.trim().to_lowercase();
        let (use_key, coefficient) = coefficients
            .get_key_value(use_text.as_str())
            .or_else(|| {
                coefficients
                    .iter()
                    .filter(|(key, _)| key.as_str() != DEFAULT_USE)
                    .find(|(key, _)| !use_text.is_empty() && use_text.contains(key.as_str()))
            })
            .map(|(key, value)| (key.as_str(), *value))
            .unwrap_or((DEFAULT_USE, coefficients[DEFAULT_USE]));

        CoefficientLookup {
            territory: applied_territory.to_string(),
            territory_fell_back,
            use_key: use_key.to_string(),
            coefficient,
        }
    }
}

fn is_valid_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
