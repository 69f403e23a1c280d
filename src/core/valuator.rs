//! Per-parcel valuation: rural crop pricing and urban cadastral coefficients.

use crate::core::catalog::PriceCatalog;
use crate::core::classifier::LandUseClassifier;
use crate::core::territory::{TerritoryMapDocument, TerritoryResolution, TerritoryResolver};
use crate::domain::category::Category;
use crate::domain::model::{
    BreakdownEntry, Measure, ParcelRecord, PropertyClass, ValuationKind, ValuationMethod,
    ValuationResult,
};
use crate::utils::error::{Result, ValuationError};
use crate::utils::numeric::{ratio_or_zero, square_meters_to_hectares};
use chrono::Utc;

pub const RURAL_CAVEATS: &[&str] = &[
    "Estimate based on average 2024/2025 market prices per crop and hectare",
    "Approximate market pricing, not an official assessment",
    "Actual price may vary with exact location, access, water rights and other factors",
    "An official appraisal is recommended for significant transactions",
];

pub const URBAN_CAVEATS: &[&str] = &[
    "Estimate based on indicative cadastral-to-market coefficients",
    "Approximate market pricing, not an official assessment",
    "Official coefficients should be checked against the regional order in force",
    "An official appraisal is recommended for significant transactions",
];

pub const URBAN_UNAVAILABLE_CAVEATS: &[&str] = &[
    "Urban parcels need the cadastral value to be valued",
    "The cadastral value was not present in the acquired record",
    "Consult the cadastral registry directly to obtain it",
];

const UNSPECIFIED_USE: &str = "unspecified";

/// The valuation engine. Holds read-only configuration only, so a single
/// instance can be shared behind an `Arc` by any number of callers.
#[derive(Debug, Clone)]
pub struct Valuator {
    catalog: PriceCatalog,
    classifier: LandUseClassifier,
    resolver: TerritoryResolver,
}

struct ParsedArea {
    square_meters: f64,
    caveat: Option<String>,
}

impl Valuator {
    pub fn new(catalog: PriceCatalog, resolver: TerritoryResolver) -> Self {
        for territory in resolver.territories() {
            if !catalog.rural_territories().any(|known| known == territory) {
                tracing::debug!(
                    "Territory '{}' is not in the price catalog; its parcels will use the default territory",
                    territory
                );
            }
        }

        Self {
            catalog,
            classifier: LandUseClassifier::new(),
            resolver,
        }
    }

    /// Builds the engine from the two collaborator documents. The territory
    /// mapping falls back to the catalog's `default` territory when it names
    /// no national default.
    pub fn from_documents(
        catalog_path: &str,
        catalog_bytes: &[u8],
        territories_path: &str,
        territories_bytes: &[u8],
    ) -> Result<Self> {
        let catalog = PriceCatalog::from_document(catalog_path, catalog_bytes)?;
        let document = TerritoryMapDocument::from_document(territories_path, territories_bytes)?;
        let resolver = TerritoryResolver::new(document, crate::core::catalog::DEFAULT_TERRITORY)?;
        Ok(Self::new(catalog, resolver))
    }

    pub fn catalog(&self) -> &PriceCatalog {
        &self.catalog
    }

    pub fn classifier(&self) -> &LandUseClassifier {
        &self.classifier
    }

    pub fn resolver(&self) -> &TerritoryResolver {
        &self.resolver
    }

    /// Values one parcel. Malformed numbers and lookup misses are recovered
    /// and reported as caveats; only records that cannot be valued at all
    /// return an error.
    pub fn valuate(&self, record: &ParcelRecord) -> Result<ValuationResult> {
        if record.parcel_id.trim().is_empty() {
            return Err(ValuationError::invalid_record(
                &record.parcel_id,
                "parcel identifier is empty",
            ));
        }
        if record
            .total_area
            .as_ref()
            .is_some_and(Measure::is_negative_number)
        {
            return Err(ValuationError::invalid_record(
                &record.parcel_id,
                "total area is negative",
            ));
        }

        match record.property_class() {
            PropertyClass::Rural => self.valuate_rural(record),
            PropertyClass::Urban => self.valuate_urban(record, Vec::new()),
            PropertyClass::Unknown => {
                tracing::debug!(
                    "Parcel {} has unrecognized class '{}', valuing as urban",
                    record.parcel_id,
                    record.class
                );
                let caveat = format!(
                    "Property class '{}' not recognized; valued as urban",
                    record.class
                );
                self.valuate_urban(record, vec![caveat])
            }
        }
    }

    fn resolve(&self, record: &ParcelRecord) -> TerritoryResolution {
        let resolution = self
            .resolver
            .resolve_detailed(&record.province, &record.municipality);
        tracing::debug!(
            "Parcel {} resolved to territory '{}' ({:?})",
            record.parcel_id,
            resolution.territory,
            resolution.tier
        );
        resolution
    }

    fn valuate_rural(&self, record: &ParcelRecord) -> Result<ValuationResult> {
        let resolution = self.resolve(record);
        let mut caveats: Vec<String> = RURAL_CAVEATS.iter().map(|c| c.to_string()).collect();

        let parcel_area = parse_area(record.total_area.as_ref(), "total area");
        // Sub-parcel areas stand in for a missing total.
        if record.total_area.is_some() || record.sub_parcels.is_empty() {
            caveats.extend(parcel_area.caveat);
        }

        let mut breakdown = Vec::with_capacity(record.sub_parcels.len().max(1));
        let mut territory_fell_back = false;
        let mut applied_territory = resolution.territory.clone();

        if record.sub_parcels.is_empty() {
            let lookup = self.catalog.rural_price(&resolution.territory, Category::Default);
            territory_fell_back = lookup.territory_fell_back;
            applied_territory = lookup.territory.clone();

            let area_ha = square_meters_to_hectares(parcel_area.square_meters);
            breakdown.push(BreakdownEntry {
                use_text: UNSPECIFIED_USE.to_string(),
                category: Category::Default,
                matched_rule: None,
                area_m2: parcel_area.square_meters,
                area_ha,
                unit_price: lookup.unit_price,
                price_fell_back: false,
                sub_estimate: area_ha * lookup.unit_price,
            });
        } else {
            for (index, sub_parcel) in record.sub_parcels.iter().enumerate() {
                if sub_parcel
                    .area
                    .as_ref()
                    .is_some_and(Measure::is_negative_number)
                {
                    return Err(ValuationError::invalid_record(
                        &record.parcel_id,
                        format!("sub-parcel {} has a negative area", index + 1),
                    ));
                }

                let area = parse_area(
                    sub_parcel.area.as_ref(),
                    &format!("sub-parcel {} ('{}') area", index + 1, sub_parcel.use_text),
                );
                caveats.extend(area.caveat);

                let classification = self.classifier.classify_detailed(&sub_parcel.use_text);
                let lookup = self
                    .catalog
                    .rural_price(&resolution.territory, classification.category);
                territory_fell_back = lookup.territory_fell_back;
                applied_territory = lookup.territory.clone();

                tracing::debug!(
                    "Parcel {} sub-parcel '{}' -> {} at {} per ha",
                    record.parcel_id,
                    sub_parcel.use_text,
                    lookup.category,
                    lookup.unit_price
                );

                let area_ha = square_meters_to_hectares(area.square_meters);
                breakdown.push(BreakdownEntry {
                    use_text: sub_parcel.use_text.clone(),
                    category: classification.category,
                    matched_rule: classification.rule.map(str::to_string),
                    area_m2: area.square_meters,
                    area_ha,
                    unit_price: lookup.unit_price,
                    price_fell_back: lookup.category_fell_back,
                    sub_estimate: area_ha * lookup.unit_price,
                });
            }
        }

        if territory_fell_back {
            caveats.push(format!(
                "Territory '{}' has no rural prices in catalog {}; default territory prices applied",
                resolution.territory,
                self.catalog.version()
            ));
        }

        let estimate: f64 = breakdown.iter().map(|entry| entry.sub_estimate).sum();
        let total_area_m2 = if parcel_area.square_meters > 0.0 {
            parcel_area.square_meters
        } else {
            breakdown.iter().map(|entry| entry.area_m2).sum()
        };
        let total_area_ha = square_meters_to_hectares(total_area_m2);

        Ok(ValuationResult {
            parcel_id: record.parcel_id.clone(),
            kind: ValuationKind::Rural,
            method: ValuationMethod::CropMarketPrice,
            class_text: record.class.clone(),
            declared_use: record.declared_use.clone(),
            territory: applied_territory.clone(),
            resolution_tier: resolution.tier,
            territory_fell_back,
            total_area_m2,
            total_area_ha,
            estimate: Some(estimate),
            value_per_hectare: ratio_or_zero(estimate, total_area_ha),
            value_per_square_meter: ratio_or_zero(estimate, total_area_m2),
            assessed_value: None,
            coefficient: None,
            coefficient_key: None,
            breakdown,
            price_source: format!("{} - territory {}", self.catalog.version(), applied_territory),
            caveats,
            valued_at: Utc::now(),
        })
    }

    fn valuate_urban(
        &self,
        record: &ParcelRecord,
        mut caveats: Vec<String>,
    ) -> Result<ValuationResult> {
        let resolution = self.resolve(record);
        let area = parse_area(record.total_area.as_ref(), "total area");
        caveats.extend(area.caveat);
        let total_area_ha = square_meters_to_hectares(area.square_meters);

        let lookup = self
            .catalog
            .urban_coefficient(&resolution.territory, &record.declared_use);
        if lookup.territory_fell_back {
            caveats.push(format!(
                "Territory '{}' has no urban coefficients in catalog {}; default territory coefficients applied",
                resolution.territory,
                self.catalog.version()
            ));
        }

        let assessed = match record.cadastral_value {
            Some(value) if !value.is_finite() || value < 0.0 => {
                return Err(ValuationError::invalid_record(
                    &record.parcel_id,
                    format!("cadastral value {} is not a valid amount", value),
                ));
            }
            Some(value) if value > 0.0 => value,
            _ => {
                caveats.extend(URBAN_UNAVAILABLE_CAVEATS.iter().map(|c| c.to_string()));
                return Ok(ValuationResult {
                    parcel_id: record.parcel_id.clone(),
                    kind: ValuationKind::Urban,
                    method: ValuationMethod::Unavailable,
                    class_text: record.class.clone(),
                    declared_use: record.declared_use.clone(),
                    territory: lookup.territory.clone(),
                    resolution_tier: resolution.tier,
                    territory_fell_back: lookup.territory_fell_back,
                    total_area_m2: area.square_meters,
                    total_area_ha,
                    estimate: None,
                    value_per_hectare: 0.0,
                    value_per_square_meter: 0.0,
                    assessed_value: None,
                    coefficient: None,
                    coefficient_key: None,
                    breakdown: Vec::new(),
                    price_source: format!(
                        "{} - territory {}",
                        self.catalog.version(),
                        lookup.territory
                    ),
                    caveats,
                    valued_at: Utc::now(),
                });
            }
        };

        caveats.extend(URBAN_CAVEATS.iter().map(|c| c.to_string()));

        let estimate = assessed * lookup.coefficient;
        tracing::debug!(
            "Parcel {} urban: {} x {} ('{}') = {}",
            record.parcel_id,
            assessed,
            lookup.coefficient,
            lookup.use_key,
            estimate
        );

        Ok(ValuationResult {
            parcel_id: record.parcel_id.clone(),
            kind: ValuationKind::Urban,
            method: ValuationMethod::CadastralCoefficient,
            class_text: record.class.clone(),
            declared_use: record.declared_use.clone(),
            territory: lookup.territory.clone(),
            resolution_tier: resolution.tier,
            territory_fell_back: lookup.territory_fell_back,
            total_area_m2: area.square_meters,
            total_area_ha,
            estimate: Some(estimate),
            value_per_hectare: ratio_or_zero(estimate, total_area_ha),
            value_per_square_meter: ratio_or_zero(estimate, area.square_meters),
            assessed_value: Some(assessed),
            coefficient: Some(lookup.coefficient),
            coefficient_key: Some(lookup.use_key),
            breakdown: Vec::new(),
            price_source: format!("{} - territory {}", self.catalog.version(), lookup.territory),
            caveats,
            valued_at: Utc::now(),
        })
    }
}

fn parse_area(measure: Option<&Measure>, label: &str) -> ParsedArea {
    match measure {
        None => ParsedArea {
            square_meters: 0.0,
            caveat: Some(format!("Missing {}; treated as zero", label)),
        },
        Some(measure) => match measure.value() {
            Some(value) => ParsedArea {
                square_meters: value.max(0.0),
                caveat: None,
            },
            None => {
                tracing::warn!("Could not parse {} {:?}; treating it as zero", label, measure);
                ParsedArea {
                    square_meters: 0.0,
                    caveat: Some(format!(
                        "Could not parse {} '{}'; treated as zero",
                        label,
                        measure_text(measure)
                    )),
                }
            }
        },
    }
}

fn measure_text(measure: &Measure) -> String {
    match measure {
        Measure::Number(n) => n.to_string(),
        Measure::Text(text) => text.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ResolutionTier, SubParcel};

    const CATALOG: &str = r#"
version = "unit-2025"

[rural.default]
default = 10200

[rural.ambito_13]
olive_dry = 12200
almond_irrigated = 18300
default = 10000

[urban.default]
default = 0.5

[urban.ambito_13]
garaje = 0.4
default = 0.5
"#;

    const TERRITORIES: &str = r#"
[municipalities]
oliva = "ambito_13"
"vall de gallinera" = "ambito_17"
"#;

    fn valuator() -> Valuator {
        Valuator::from_documents(
            "catalog.toml",
            CATALOG.as_bytes(),
            "territories.toml",
            TERRITORIES.as_bytes(),
        )
        .unwrap()
    }

    fn rural(id: &str, municipality: &str, sub_parcels: Vec<SubParcel>) -> ParcelRecord {
        ParcelRecord {
            parcel_id: id.to_string(),
            class: "Rústico".to_string(),
            declared_use: "Agrario".to_string(),
            province: "Valencia".to_string(),
            municipality: municipality.to_string(),
            total_area: None,
            sub_parcels,
            cadastral_value: None,
        }
    }

    fn sub(use_text: &str, area: &str) -> SubParcel {
        SubParcel {
            use_text: use_text.to_string(),
            area: Some(Measure::from(area)),
        }
    }

    #[test]
    fn test_rural_sub_parcels_are_summed() {
        let record = rural(
            "R1",
            "Oliva",
            vec![sub("O- Olivos secano", "10.000"), sub("F- Almendro", "5.000")],
        );

        let result = valuator().valuate(&record).unwrap();
        assert_eq!(result.kind, ValuationKind::Rural);
        assert_eq!(result.territory, "ambito_13");
        assert_eq!(result.resolution_tier, ResolutionTier::Municipality);
        assert_eq!(result.breakdown.len(), 2);
        assert_eq!(result.breakdown[1].category, Category::AlmondIrrigated);
        assert!((result.estimate.unwrap() - (12200.0 + 0.5 * 18300.0)).abs() < 1e-9);
        assert!((result.total_area_m2 - 15000.0).abs() < 1e-9);
        assert!((result.value_per_square_meter * result.total_area_m2 - result.estimate.unwrap()).abs() < 1e-6);
    }

    #[test]
    fn test_rural_without_sub_parcels_uses_default_price() {
        let mut record = rural("R2", "Oliva", Vec::new());
        record.total_area = Some(Measure::from("25.000 m²"));

        let result = valuator().valuate(&record).unwrap();
        assert_eq!(result.estimate, Some(25000.0));
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].use_text, "unspecified");
        assert_eq!(result.value_per_hectare, 10000.0);
    }

    #[test]
    fn test_unparseable_area_becomes_zero_with_caveat() {
        let record = rural("R3", "Oliva", vec![sub("O- Olivos secano", "sin datos")]);

        let result = valuator().valuate(&record).unwrap();
        assert_eq!(result.estimate, Some(0.0));
        assert_eq!(result.value_per_hectare, 0.0);
        assert!(result.caveats.iter().any(|c| c.contains("sin datos")));
    }

    #[test]
    fn test_missing_total_area_is_reported() {
        let record = rural("R7", "Oliva", Vec::new());

        let result = valuator().valuate(&record).unwrap();
        assert_eq!(result.estimate, Some(0.0));
        assert!(result
            .caveats
            .iter()
            .any(|c| c == "Missing total area; treated as zero"));
    }

    #[test]
    fn test_sub_parcel_without_area_is_valued_at_zero() {
        let mut record = rural("R8", "Oliva", vec![sub("O- Olivos secano", "10000")]);
        record.sub_parcels.push(SubParcel {
            use_text: "F- Almendro".to_string(),
            area: None,
        });

        let result = valuator().valuate(&record).unwrap();
        assert_eq!(result.breakdown.len(), 2);
        assert_eq!(result.breakdown[1].sub_estimate, 0.0);
        assert_eq!(result.estimate, Some(12200.0));
        assert!(result.caveats.iter().any(|c| c.contains("sub-parcel 2 ('F- Almendro')")));
        assert!(!result.caveats.iter().any(|c| c.contains("total area")));
    }

    #[test]
    fn test_unknown_territory_falls_back_to_catalog_default() {
        let record = rural("R4", "Vall de Gallinera", vec![sub("O- Olivos secano", "10000")]);

        let result = valuator().valuate(&record).unwrap();
        assert!(result.territory_fell_back);
        assert_eq!(result.territory, "default");
        assert_eq!(result.estimate, Some(10200.0));
        assert!(result.caveats.iter().any(|c| c.contains("ambito_17")));
    }

    #[test]
    fn test_urban_coefficient() {
        let record = ParcelRecord {
            parcel_id: "U1".to_string(),
            class: "Urbano".to_string(),
            declared_use: "Garaje".to_string(),
            province: "Valencia".to_string(),
            municipality: "Oliva".to_string(),
            total_area: Some(Measure::from(20.0)),
            sub_parcels: Vec::new(),
            cadastral_value: Some(10000.0),
        };

        let result = valuator().valuate(&record).unwrap();
        assert_eq!(result.method, ValuationMethod::CadastralCoefficient);
        assert_eq!(result.coefficient, Some(0.4));
        assert_eq!(result.coefficient_key.as_deref(), Some("garaje"));
        assert_eq!(result.estimate, Some(4000.0));
        assert_eq!(result.value_per_square_meter, 200.0);
    }

    #[test]
    fn test_urban_without_cadastral_value_has_no_estimate() {
        let record = ParcelRecord {
            parcel_id: "U2".to_string(),
            class: "Urbano".to_string(),
            declared_use: "Residencial".to_string(),
            province: String::new(),
            municipality: String::new(),
            total_area: None,
            sub_parcels: Vec::new(),
            cadastral_value: Some(0.0),
        };

        let result = valuator().valuate(&record).unwrap();
        assert_eq!(result.method, ValuationMethod::Unavailable);
        assert_eq!(result.estimate, None);
        assert!(result.caveats.iter().any(|c| c.contains("cadastral value")));
    }

    #[test]
    fn test_urban_without_value_reports_applied_territory() {
        let record = ParcelRecord {
            parcel_id: "U4".to_string(),
            class: "Urbano".to_string(),
            declared_use: "Vivienda".to_string(),
            province: "Valencia".to_string(),
            municipality: "Vall de Gallinera".to_string(),
            total_area: Some(Measure::from(80.0)),
            sub_parcels: Vec::new(),
            cadastral_value: None,
        };

        let result = valuator().valuate(&record).unwrap();
        assert_eq!(result.method, ValuationMethod::Unavailable);
        assert_eq!(result.territory, "default");
        assert!(result.territory_fell_back);
        assert!(result.caveats.iter().any(|c| c.contains("ambito_17")));
    }

    #[test]
    fn test_unknown_class_is_valued_as_urban() {
        let record = ParcelRecord {
            parcel_id: "X1".to_string(),
            class: "BICE".to_string(),
            declared_use: String::new(),
            province: String::new(),
            municipality: String::new(),
            total_area: None,
            sub_parcels: Vec::new(),
            cadastral_value: Some(1000.0),
        };

        let result = valuator().valuate(&record).unwrap();
        assert_eq!(result.kind, ValuationKind::Urban);
        assert_eq!(result.estimate, Some(500.0));
        assert!(result.caveats[0].contains("BICE"));
    }

    #[test]
    fn test_invalid_records_are_errors() {
        let v = valuator();

        let empty_id = rural("  ", "Oliva", Vec::new());
        assert!(matches!(v.valuate(&empty_id), Err(ValuationError::InvalidRecord { .. })));

        let mut negative = rural("R5", "Oliva", Vec::new());
        negative.total_area = Some(Measure::from(-10.0));
        assert!(v.valuate(&negative).is_err());

        let mut bad_value = rural("U3", "Oliva", Vec::new());
        bad_value.class = "Urbano".to_string();
        bad_value.cadastral_value = Some(-5.0);
        let err = v.valuate(&bad_value).unwrap_err();
        assert!(err.to_string().contains("U3"));
    }

    #[test]
    fn test_valuation_is_repeatable() {
        let v = valuator();
        let record = rural("R6", "Oliva", vec![sub("V- Viña secano", "3.333,3")]);
        assert_eq!(v.valuate(&record).unwrap(), v.valuate(&record).unwrap());
    }
}
