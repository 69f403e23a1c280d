//! Land-use classification of cadastral cultivation text.
//!
//! Rules are evaluated top to bottom and the first match wins. The order is
//! part of the contract: several registry codes are short fragments
//! (`o-`, `cr`, `cer`, `mt`) that also occur inside unrelated words, so
//! moving a rule changes results. New rules go at the end.
//!
//! Rules covering a crop grown both ways carry a dry/irrigated split. The
//! dry keywords are checked first, then the irrigated ones, and when neither
//! appears the rule's own default applies. Those defaults differ per crop:
//! olive and arable land default to dry, almond, vine, fruit and cereal to
//! irrigated.

use crate::domain::category::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Irrigation {
    Dry,
    Irrigated,
}

const DRY_KEYWORDS: &[&str] = &["secano", "dry"];
const IRRIGATED_KEYWORDS: &[&str] = &["regadio", "regadío", "irrigated"];

#[derive(Debug, Clone, Copy)]
pub enum Keyword {
    Contains(&'static str),
    AllOf(&'static [&'static str]),
    /// First fragment present, second absent.
    Without(&'static str, &'static str),
}

impl Keyword {
    fn matches(&self, text: &str) -> bool {
        match self {
            Keyword::Contains(fragment) => text.contains(fragment),
            Keyword::AllOf(fragments) => fragments.iter().all(|f| text.contains(f)),
            Keyword::Without(present, absent) => text.contains(present) && !text.contains(absent),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    Fixed(Category),
    Split {
        dry: Category,
        irrigated: Category,
        default: Irrigation,
    },
}

#[derive(Debug, Clone)]
pub struct ClassificationRule {
    pub name: &'static str,
    pub keywords: &'static [Keyword],
    pub outcome: Outcome,
}

impl ClassificationRule {
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|keyword| keyword.matches(lowered))
    }

    fn category_for(&self, lowered: &str) -> Category {
        match self.outcome {
            Outcome::Fixed(category) => category,
            Outcome::Split {
                dry,
                irrigated,
                default,
            } => match irrigation_of(lowered).unwrap_or(default) {
                Irrigation::Dry => dry,
                Irrigation::Irrigated => irrigated,
            },
        }
    }
}

fn irrigation_of(lowered: &str) -> Option<Irrigation> {
    if DRY_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        Some(Irrigation::Dry)
    } else if IRRIGATED_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        Some(Irrigation::Irrigated)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    /// `None` when no rule matched and the text fell to `default`.
    pub rule: Option<&'static str>,
}

use Keyword::{AllOf, Contains, Without};

static REGISTRY_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "olive",
        keywords: &[Contains("oliv"), Contains("o-")],
        outcome: Outcome::Split {
            dry: Category::OliveDry,
            irrigated: Category::OliveIrrigated,
            default: Irrigation::Dry,
        },
    },
    ClassificationRule {
        name: "almond",
        keywords: &[
            Contains("almendr"),
            Contains("a-"),
            Contains("f-"),
            Contains("fruto"),
            Contains("almond"),
        ],
        outcome: Outcome::Split {
            dry: Category::AlmondDry,
            irrigated: Category::AlmondIrrigated,
            default: Irrigation::Irrigated,
        },
    },
    ClassificationRule {
        name: "vine",
        keywords: &[
            Contains("vid"),
            Contains("viña"),
            Contains("v-"),
            Contains("vine"),
            Contains("grape"),
        ],
        outcome: Outcome::Split {
            dry: Category::VineDry,
            irrigated: Category::VineIrrigated,
            default: Irrigation::Irrigated,
        },
    },
    ClassificationRule {
        name: "fruit",
        keywords: &[Contains("frutal"), Contains("frt"), Contains("orchard")],
        outcome: Outcome::Split {
            dry: Category::FruitDry,
            irrigated: Category::FruitIrrigated,
            default: Irrigation::Irrigated,
        },
    },
    ClassificationRule {
        name: "cereal",
        keywords: &[
            Contains("cereal"),
            Contains("cer"),
            Contains("trigo"),
            Contains("cebada"),
            Contains("wheat"),
            Contains("barley"),
        ],
        outcome: Outcome::Split {
            dry: Category::CerealDry,
            irrigated: Category::CerealIrrigated,
            default: Irrigation::Irrigated,
        },
    },
    ClassificationRule {
        name: "arable",
        keywords: &[
            Contains("labor"),
            Contains("labradio"),
            Contains("labradío"),
            Contains("cr"),
            Contains("arable"),
        ],
        outcome: Outcome::Split {
            dry: Category::ArableDry,
            irrigated: Category::ArableIrrigated,
            default: Irrigation::Dry,
        },
    },
    ClassificationRule {
        name: "pasture",
        keywords: &[
            Contains("past"),
            Contains("prado"),
            Contains("e-"),
            Contains("meadow"),
        ],
        outcome: Outcome::Fixed(Category::Pasture),
    },
    ClassificationRule {
        name: "timber_pine",
        keywords: &[
            Contains("mm"),
            AllOf(&["pinar", "maderable"]),
            AllOf(&["pine", "timber"]),
        ],
        outcome: Outcome::Fixed(Category::TimberPine),
    },
    ClassificationRule {
        name: "scrubland",
        keywords: &[
            Contains("mt"),
            Without("matorral", "maderable"),
            Contains("scrub"),
        ],
        outcome: Outcome::Fixed(Category::Scrubland),
    },
    ClassificationRule {
        name: "unproductive",
        keywords: &[
            Contains("i-"),
            Contains("improductivo"),
            Contains("erial"),
            Contains("unproductive"),
        ],
        outcome: Outcome::Fixed(Category::Unproductive),
    },
    ClassificationRule {
        name: "forestry",
        keywords: &[Contains("forestal"), Contains("forest"), Contains("bosque")],
        outcome: Outcome::Fixed(Category::Forestry),
    },
    ClassificationRule {
        name: "citrus",
        keywords: &[
            Contains("cítric"),
            Contains("citric"),
            Contains("citrus"),
            Contains("agrio"),
            Contains("naranj"),
        ],
        outcome: Outcome::Fixed(Category::CitrusIrrigated),
    },
    ClassificationRule {
        name: "horticultural",
        keywords: &[
            Contains("huert"),
            Contains("horta"),
            Contains("hortícola"),
            Contains("horticol"),
            Contains("vegetable"),
        ],
        outcome: Outcome::Fixed(Category::HorticulturalIrrigated),
    },
    ClassificationRule {
        name: "rice",
        keywords: &[Contains("arroz"), Contains("rice")],
        outcome: Outcome::Fixed(Category::RiceIrrigated),
    },
];

/// Maps free-text cultivation descriptions to a [`Category`].
///
/// Total: every input, the empty string included, yields a category.
#[derive(Debug, Clone)]
pub struct LandUseClassifier {
    rules: &'static [ClassificationRule],
}

impl LandUseClassifier {
    pub fn new() -> Self {
        Self {
            rules: REGISTRY_RULES,
        }
    }

    pub fn classify(&self, text: &str) -> Category {
        self.classify_detailed(text).category
    }

    pub fn classify_detailed(&self, text: &str) -> Classification {
        let lowered = text.to_lowercase();

        match self.rules.iter().find(|rule| rule.matches(&lowered)) {
            Some(rule) => Classification {
                category: rule.category_for(&lowered),
                rule: Some(rule.name),
            },
            None => Classification {
                category: Category::Default,
                rule: None,
            },
        }
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        self.rules
    }
}

impl Default for LandUseClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Category {
        LandUseClassifier::new().classify(text)
    }

    #[test]
    fn test_registry_codes() {
        assert_eq!(classify("O- Olivos secano"), Category::OliveDry);
        assert_eq!(classify("O- Olivos regadío"), Category::OliveIrrigated);
        assert_eq!(classify("F- Frutos secos secano"), Category::AlmondDry);
        assert_eq!(classify("V- Viña secano"), Category::VineDry);
        assert_eq!(classify("CR Labor o labradío secano"), Category::ArableDry);
        assert_eq!(classify("CR Labor o labradío regadío"), Category::ArableIrrigated);
        assert_eq!(classify("E- Pastos"), Category::Pasture);
        assert_eq!(classify("MM Pinar maderable"), Category::TimberPine);
        assert_eq!(classify("MT Matorral"), Category::Scrubland);
        assert_eq!(classify("I- Improductivo"), Category::Unproductive);
    }

    #[test]
    fn test_english_descriptions() {
        assert_eq!(classify("olive grove - dry"), Category::OliveDry);
        assert_eq!(classify("olive grove - irrigated"), Category::OliveIrrigated);
        assert_eq!(classify("F- almond"), Category::AlmondIrrigated);
        assert_eq!(classify("wheat, dry"), Category::CerealDry);
    }

    #[test]
    fn test_crop_specific_default_irrigation() {
        // No discriminator keyword: olive and arable default to dry,
        // almond, vine, fruit and cereal to irrigated.
        assert_eq!(classify("Olivar"), Category::OliveDry);
        assert_eq!(classify("Almendros"), Category::AlmondIrrigated);
        assert_eq!(classify("Viña"), Category::VineIrrigated);
        assert_eq!(classify("Frutales"), Category::FruitIrrigated);
        assert_eq!(classify("Trigo"), Category::CerealIrrigated);
        assert_eq!(classify("Labor"), Category::ArableDry);
    }

    #[test]
    fn test_appended_irrigated_only_rules() {
        assert_eq!(classify("Cítricos regadío"), Category::CitrusIrrigated);
        assert_eq!(classify("Naranjos"), Category::CitrusIrrigated);
        assert_eq!(classify("Huerta"), Category::HorticulturalIrrigated);
        assert_eq!(classify("Arroz"), Category::RiceIrrigated);
    }

    #[test]
    fn test_compound_keywords() {
        assert_eq!(classify("Pinar maderable"), Category::TimberPine);
        assert_eq!(classify("Matorral"), Category::Scrubland);
        assert_eq!(classify("Erial"), Category::Unproductive);
        assert_eq!(classify("Monte forestal"), Category::Forestry);
    }

    #[test]
    fn test_unmatched_and_empty_text_fall_to_default() {
        let classifier = LandUseClassifier::new();
        let unmatched = classifier.classify_detailed("terreno sin cultivo");
        assert_eq!(unmatched.category, Category::Default);
        assert_eq!(unmatched.rule, None);
        assert_eq!(classify(""), Category::Default);
        assert_eq!(classify("   "), Category::Default);
    }

    // Short registry fragments matching inside unrelated words. Kept as-is;
    // these pin the first-match behavior.
    #[test]
    fn test_known_fragment_collisions() {
        // "pasto-" ends in "o-", so the olive rule wins.
        assert_eq!(classify("Pasto- secano"), Category::OliveDry);
        // "cerezos" contains "cer".
        assert_eq!(classify("Cerezos regadío"), Category::CerealIrrigated);
        // "commons" contains the timber pine code "mm".
        assert_eq!(classify("Commons land"), Category::TimberPine);
    }

    #[test]
    fn test_rule_order_is_stable() {
        let names: Vec<&str> = LandUseClassifier::new().rules().iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "olive",
                "almond",
                "vine",
                "fruit",
                "cereal",
                "arable",
                "pasture",
                "timber_pine",
                "scrubland",
                "unproductive",
                "forestry",
                "citrus",
                "horticultural",
                "rice",
            ]
        );
    }
}
