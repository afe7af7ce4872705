use serde::{Deserialize, Serialize};

/// Broad nutritional category of a protein source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceCategory {
    Animal,
    Plant,
    Mixed,
    Other,
}

impl SourceCategory {
    pub fn label(&self) -> &'static str {
        match self {
            SourceCategory::Animal => "Animal",
            SourceCategory::Plant => "Plant",
            SourceCategory::Mixed => "Mixed",
            SourceCategory::Other => "Other",
        }
    }
}

/// One entry of the protein source catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo {
    pub key: &'static str,
    pub label: &'static str,
    pub category: SourceCategory,
    pub glyph: &'static str,
}

/// The fixed protein source catalog. Static and not user-editable; unknown
/// keys resolve to `FALLBACK_SOURCE` instead of being rejected.
pub const PROTEIN_SOURCES: &[SourceInfo] = &[
    // Animal-based
    SourceInfo { key: "whey", label: "Whey", category: SourceCategory::Animal, glyph: "🥛" },
    SourceInfo { key: "casein", label: "Casein", category: SourceCategory::Animal, glyph: "🥛" },
    SourceInfo { key: "egg", label: "Egg White", category: SourceCategory::Animal, glyph: "🥚" },
    SourceInfo { key: "beef", label: "Beef", category: SourceCategory::Animal, glyph: "🥩" },
    SourceInfo { key: "chicken", label: "Chicken", category: SourceCategory::Animal, glyph: "🍗" },
    SourceInfo { key: "fish", label: "Fish", category: SourceCategory::Animal, glyph: "🐟" },
    SourceInfo { key: "dairy", label: "Dairy", category: SourceCategory::Animal, glyph: "🧀" },
    // Plant-based
    SourceInfo { key: "pea", label: "Pea", category: SourceCategory::Plant, glyph: "🌱" },
    SourceInfo { key: "soy", label: "Soy", category: SourceCategory::Plant, glyph: "🫘" },
    SourceInfo { key: "rice", label: "Rice", category: SourceCategory::Plant, glyph: "🌾" },
    SourceInfo { key: "hemp", label: "Hemp", category: SourceCategory::Plant, glyph: "🌿" },
    SourceInfo { key: "peanut", label: "Peanut", category: SourceCategory::Plant, glyph: "🥜" },
    SourceInfo { key: "blend-plant", label: "Plant Blend", category: SourceCategory::Plant, glyph: "🥗" },
    // Mixed/Other
    SourceInfo { key: "blend-mixed", label: "Mixed Blend", category: SourceCategory::Mixed, glyph: "🔀" },
    SourceInfo { key: "collagen", label: "Collagen", category: SourceCategory::Other, glyph: "✨" },
    SourceInfo { key: "other", label: "Other", category: SourceCategory::Other, glyph: "📦" },
];

/// Generic entry returned for keys the catalog does not know.
pub const FALLBACK_SOURCE: SourceInfo = SourceInfo {
    key: "other",
    label: "Other",
    category: SourceCategory::Other,
    glyph: "📦",
};

/// Look up a source key, falling back to the generic entry. Call sites never
/// special-case missing keys themselves.
pub fn source_info(key: &str) -> &'static SourceInfo {
    PROTEIN_SOURCES
        .iter()
        .find(|s| s.key == key)
        .unwrap_or(&FALLBACK_SOURCE)
}

/// Category for a source key; unknown keys count as `Other`.
pub fn source_category(key: &str) -> SourceCategory {
    source_info(key).category
}

/// Store catalog: key -> display name. Unknown keys render as themselves so
/// hand-typed store names still show up.
pub const STORES: &[(&str, &str)] = &[
    ("costco", "Costco"),
    ("sams-club", "Sam's Club"),
    ("walmart", "Walmart"),
    ("target", "Target"),
    ("amazon", "Amazon"),
    ("gnc", "GNC"),
    ("vitamin-shoppe", "The Vitamin Shoppe"),
    ("grocery", "Grocery store"),
    ("online", "Online"),
    ("other", "Other"),
];

pub fn store_name(key: &str) -> &str {
    STORES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, name)| *name)
        .unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_source_resolves() {
        let info = source_info("pea");
        assert_eq!(info.label, "Pea");
        assert_eq!(info.category, SourceCategory::Plant);
    }

    #[test]
    fn unknown_source_falls_back() {
        let info = source_info("cricket-flour");
        assert_eq!(info.label, "Other");
        assert_eq!(info.category, SourceCategory::Other);
        assert_eq!(source_category("cricket-flour"), SourceCategory::Other);
    }

    #[test]
    fn store_lookup_falls_back_to_key() {
        assert_eq!(store_name("costco"), "Costco");
        assert_eq!(store_name("corner-bodega"), "corner-bodega");
    }

    #[test]
    fn catalog_keys_are_unique() {
        for (i, a) in PROTEIN_SOURCES.iter().enumerate() {
            for b in &PROTEIN_SOURCES[i + 1..] {
                assert_ne!(a.key, b.key);
            }
        }
    }
}
