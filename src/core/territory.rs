//! Territory resolution: municipality → province group → national default.

use crate::domain::model::ResolutionTier;
use crate::utils::document::parse_document;
use crate::utils::error::{Result, ValuationError};
use serde::Deserialize;
use std::collections::BTreeMap;

const CONNECTOR_WORDS: &[&str] = &["de", "del", "la", "las", "el", "els", "les", "los", "l", "d", "y", "i"];

/// The territory mapping document as it is stored on disk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TerritoryMapDocument {
    #[serde(default)]
    pub national_default: Option<String>,
    #[serde(default)]
    pub municipalities: BTreeMap<String, String>,
    #[serde(default)]
    pub province_groups: Option<BTreeMap<String, Vec<String>>>,
}

impl TerritoryMapDocument {
    pub fn from_document(path: &str, bytes: &[u8]) -> Result<Self> {
        parse_document(path, bytes)
    }
}

fn builtin_province_groups() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([
        (
            "valencia".to_string(),
            vec!["alicante".into(), "valencia".into(), "castellon".into()],
        ),
        (
            "extremadura".to_string(),
            vec!["badajoz".into(), "caceres".into()],
        ),
    ])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerritoryResolution {
    pub territory: String,
    pub tier: ResolutionTier,
}

/// Lowercases, trims, folds accents, treats `_`, `-`, `'` as spaces and drops
/// connector words, so "Vall de Gallinera", "vall_de_gallinera" and
/// "La Vall de Gallinera" compare equal.
pub fn normalize_place_name(name: &str) -> String {
    let lowered: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            '_' | '-' | '\'' | '’' | '.' | ',' => ' ',
            other => other,
        })
        .collect();

    lowered
        .split_whitespace()
        .filter(|word| !CONNECTOR_WORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone)]
pub struct TerritoryResolver {
    /// Normalized municipality → territory, longest names first so substring
    /// matching prefers the most specific entry.
    municipalities: Vec<(String, String)>,
    provinces: BTreeMap<String, String>,
    national_default: String,
}

impl TerritoryResolver {
    pub fn new(document: TerritoryMapDocument, fallback_territory: &str) -> Result<Self> {
        let national_default = document
            .national_default
            .unwrap_or_else(|| fallback_territory.to_string());
        if national_default.trim().is_empty() {
            return Err(ValuationError::catalog(
                "territory mapping has an empty national default",
            ));
        }

        let mut municipalities: Vec<(String, String)> = document
            .municipalities
            .into_iter()
            .map(|(name, territory)| (normalize_place_name(&name), territory))
            .filter(|(name, _)| !name.is_empty())
            .collect();
        municipalities.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        municipalities.dedup_by(|a, b| a.0 == b.0);

        let mut provinces = BTreeMap::new();
        for (territory, names) in document
            .province_groups
            .unwrap_or_else(builtin_province_groups)
        {
            for name in names {
                provinces.insert(normalize_place_name(&name), territory.clone());
            }
        }

        Ok(Self {
            municipalities,
            provinces,
            national_default,
        })
    }

    pub fn national_default(&self) -> &str {
        &self.national_default
    }

    /// Every territory key this resolver can return.
    pub fn territories(&self) -> impl Iterator<Item = &str> {
        self.municipalities
            .iter()
            .map(|(_, territory)| territory.as_str())
            .chain(self.provinces.values().map(String::as_str))
            .chain(std::iter::once(self.national_default.as_str()))
    }

    pub fn resolve(&self, province: &str, municipality: &str) -> String {
        self.resolve_detailed(province, municipality).territory
    }

    pub fn resolve_detailed(&self, province: &str, municipality: &str) -> TerritoryResolution {
        if let Some(territory) = self.match_municipality(municipality) {
            return TerritoryResolution {
                territory: territory.to_string(),
                tier: ResolutionTier::Municipality,
            };
        }

        if let Some(territory) = self.match_province(province) {
            return TerritoryResolution {
                territory: territory.to_string(),
                tier: ResolutionTier::ProvinceGroup,
            };
        }

        TerritoryResolution {
            territory: self.national_default.clone(),
            tier: ResolutionTier::NationalDefault,
        }
    }

    fn match_municipality(&self, municipality: &str) -> Option<&str> {
        let name = normalize_place_name(municipality);
        if name.is_empty() {
            return None;
        }

        self.municipalities
            .iter()
            .find(|(known, _)| *known == name)
            .or_else(|| {
                self.municipalities
                    .iter()
                    .find(|(known, _)| name.contains(known.as_str()) || known.contains(name.as_str()))
            })
            .map(|(_, territory)| territory.as_str())
    }

    // Bilingual names ("Valencia/València") are tried part by part.
    fn match_province(&self, province: &str) -> Option<&str> {
        province
            .split('/')
            .map(normalize_place_name)
            .filter(|name| !name.is_empty())
            .find_map(|name| self.provinces.get(&name))
            .map(String::as_str)
    }
}
