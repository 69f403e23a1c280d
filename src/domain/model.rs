use crate::domain::category::Category;
use crate::utils::numeric::parse_locale_number;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An area or amount as it arrives from the acquisition process: either a
/// JSON number or registry text that needs locale-aware parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measure {
    Number(f64),
    Text(String),
}

impl Measure {
    /// `None` when the text cannot be read as a number.
    pub fn value(&self) -> Option<f64> {
        match self {
            Measure::Number(n) if n.is_finite() => Some(*n),
            Measure::Number(_) => None,
            Measure::Text(text) => parse_locale_number(text),
        }
    }

    pub fn is_negative_number(&self) -> bool {
        matches!(self, Measure::Number(n) if *n < 0.0)
    }
}

impl From<f64> for Measure {
    fn from(value: f64) -> Self {
        Measure::Number(value)
    }
}

impl From<&str> for Measure {
    fn from(text: &str) -> Self {
        Measure::Text(text.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyClass {
    Rural,
    Urban,
    Unknown,
}

impl PropertyClass {
    /// Registry class text ("Rústico", "Urbano") or the plain English names.
    pub fn from_text(text: &str) -> Self {
        let lower = text.trim().to_lowercase();
        if lower.contains("rústico") || lower.contains("rustico") || lower.contains("rural") {
            PropertyClass::Rural
        } else if lower.contains("urban") {
            PropertyClass::Urban
        } else {
            PropertyClass::Unknown
        }
    }
}

/// One cultivation entry of a rural parcel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubParcel {
    #[serde(default, alias = "cultivo_aprovechamiento")]
    pub use_text: String,
    #[serde(default, alias = "superficie_m2")]
    pub area: Option<Measure>,
}

/// One cadastral unit, as produced by the acquisition process. Never mutated
/// by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcelRecord {
    #[serde(alias = "referencia_catastral")]
    pub parcel_id: String,
    #[serde(default, alias = "clase")]
    pub class: String,
    #[serde(default, alias = "uso_principal")]
    pub declared_use: String,
    #[serde(default, alias = "provincia")]
    pub province: String,
    #[serde(default, alias = "municipio")]
    pub municipality: String,
    #[serde(default, alias = "superficie")]
    pub total_area: Option<Measure>,
    #[serde(default, alias = "cultivos")]
    pub sub_parcels: Vec<SubParcel>,
    #[serde(default, alias = "valor_catastral")]
    pub cadastral_value: Option<f64>,
}

impl ParcelRecord {
    pub fn property_class(&self) -> PropertyClass {
        PropertyClass::from_text(&self.class)
    }
}

/// An official reference value obtained independently of the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceValue {
    #[serde(alias = "referencia_catastral")]
    pub parcel_id: String,
    #[serde(alias = "valor_referencia")]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationKind {
    Rural,
    Urban,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationMethod {
    CropMarketPrice,
    CadastralCoefficient,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    Municipality,
    ProvinceGroup,
    NationalDefault,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub use_text: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<String>,
    pub area_m2: f64,
    pub area_ha: f64,
    pub unit_price: f64,
    pub price_fell_back: bool,
    pub sub_estimate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationResult {
    pub parcel_id: String,
    pub kind: ValuationKind,
    pub method: ValuationMethod,
    pub class_text: String,
    pub declared_use: String,
    pub territory: String,
    pub resolution_tier: ResolutionTier,
    pub territory_fell_back: bool,
    pub total_area_m2: f64,
    pub total_area_ha: f64,
    pub estimate: Option<f64>,
    pub value_per_hectare: f64,
    pub value_per_square_meter: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessed_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coefficient: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coefficient_key: Option<String>,
    pub breakdown: Vec<BreakdownEntry>,
    pub price_source: String,
    pub caveats: Vec<String>,
    pub valued_at: DateTime<Utc>,
}

// `valued_at` is wall-clock metadata and takes no part in equality.
impl PartialEq for ValuationResult {
    fn eq(&self, other: &Self) -> bool {
        self.parcel_id == other.parcel_id
            && self.kind == other.kind
            && self.method == other.method
            && self.class_text == other.class_text
            && self.declared_use == other.declared_use
            && self.territory == other.territory
            && self.resolution_tier == other.resolution_tier
            && self.territory_fell_back == other.territory_fell_back
            && self.total_area_m2.to_bits() == other.total_area_m2.to_bits()
            && self.total_area_ha.to_bits() == other.total_area_ha.to_bits()
            && self.estimate.map(f64::to_bits) == other.estimate.map(f64::to_bits)
            && self.value_per_hectare.to_bits() == other.value_per_hectare.to_bits()
            && self.value_per_square_meter.to_bits() == other.value_per_square_meter.to_bits()
            && self.assessed_value.map(f64::to_bits) == other.assessed_value.map(f64::to_bits)
            && self.coefficient.map(f64::to_bits) == other.coefficient.map(f64::to_bits)
            && self.coefficient_key == other.coefficient_key
            && self.breakdown == other.breakdown
            && self.price_source == other.price_source
            && self.caveats == other.caveats
    }
}

/// One slot of a batch run; output order matches input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchEntry {
    Valued(ValuationResult),
    Failed { parcel_id: String, error: String },
}

impl BatchEntry {
    pub fn parcel_id(&self) -> &str {
        match self {
            BatchEntry::Valued(result) => &result.parcel_id,
            BatchEntry::Failed { parcel_id, .. } => parcel_id,
        }
    }

    pub fn result(&self) -> Option<&ValuationResult> {
        match self {
            BatchEntry::Valued(result) => Some(result),
            BatchEntry::Failed { .. } => None,
        }
    }

    pub fn estimate(&self) -> Option<f64> {
        self.result().and_then(|result| result.estimate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub record_count: usize,
    pub valued_count: usize,
    pub failed_count: usize,
    pub total_estimate: f64,
    pub catalog_version: String,
    pub provenance: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub entries: Vec<BatchEntry>,
    pub summary: BatchSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HigherValue {
    ComputedHigher,
    ReferenceHigher,
    Equal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deviation {
    pub diff: f64,
    pub diff_pct: f64,
    pub higher: HigherValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub parcel_id: String,
    pub estimate: Option<f64>,
    pub reference: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation: Option<Deviation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviationStats {
    pub mean_pct: f64,
    pub min_pct: f64,
    pub max_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_records: usize,
    pub with_estimate: usize,
    pub with_reference: usize,
    pub comparable: usize,
    pub estimate_sum: f64,
    pub reference_sum: f64,
    pub total_difference: f64,
    /// Absent when no parcel has both values.
    pub deviation_stats: Option<DeviationStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consolidation {
    pub records: Vec<ComparisonRecord>,
    pub summary: PortfolioSummary,
}

/// What the run shell reads before valuation starts.
#[derive(Debug, Clone, Default)]
pub struct ExtractedInput {
    pub records: Vec<ParcelRecord>,
    pub references: Vec<ReferenceValue>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub batch: BatchOutcome,
    pub consolidation: Consolidation,
}
