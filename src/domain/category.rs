use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical land-use categories the price catalog is keyed by.
///
/// The set is closed: a catalog document naming any other key fails to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    OliveDry,
    OliveIrrigated,
    AlmondDry,
    AlmondIrrigated,
    VineDry,
    VineIrrigated,
    FruitDry,
    FruitIrrigated,
    CitrusIrrigated,
    CerealDry,
    CerealIrrigated,
    HorticulturalIrrigated,
    RiceIrrigated,
    Pasture,
    Forestry,
    ArableDry,
    ArableIrrigated,
    TimberPine,
    Scrubland,
    Unproductive,
    Default,
}

impl Category {
    pub const ALL: [Category; 21] = [
        Category::OliveDry,
        Category::OliveIrrigated,
        Category::AlmondDry,
        Category::AlmondIrrigated,
        Category::VineDry,
        Category::VineIrrigated,
        Category::FruitDry,
        Category::FruitIrrigated,
        Category::CitrusIrrigated,
        Category::CerealDry,
        Category::CerealIrrigated,
        Category::HorticulturalIrrigated,
        Category::RiceIrrigated,
        Category::Pasture,
        Category::Forestry,
        Category::ArableDry,
        Category::ArableIrrigated,
        Category::TimberPine,
        Category::Scrubland,
        Category::Unproductive,
        Category::Default,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::OliveDry => "olive_dry",
            Category::OliveIrrigated => "olive_irrigated",
            Category::AlmondDry => "almond_dry",
            Category::AlmondIrrigated => "almond_irrigated",
            Category::VineDry => "vine_dry",
            Category::VineIrrigated => "vine_irrigated",
            Category::FruitDry => "fruit_dry",
            Category::FruitIrrigated => "fruit_irrigated",
            Category::CitrusIrrigated => "citrus_irrigated",
            Category::CerealDry => "cereal_dry",
            Category::CerealIrrigated => "cereal_irrigated",
            Category::HorticulturalIrrigated => "horticultural_irrigated",
            Category::RiceIrrigated => "rice_irrigated",
            Category::Pasture => "pasture",
            Category::Forestry => "forestry",
            Category::ArableDry => "arable_dry",
            Category::ArableIrrigated => "arable_irrigated",
            Category::TimberPine => "timber_pine",
            Category::Scrubland => "scrubland",
            Category::Unproductive => "unproductive",
            Category::Default => "default",
        }
    }

    pub fn from_key(key: &str) -> Option<Category> {
        let key = key.trim();
        Category::ALL.into_iter().find(|category| category.key() == key)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
