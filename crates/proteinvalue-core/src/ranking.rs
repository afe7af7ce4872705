use crate::catalog::{source_category, SourceCategory};
use crate::models::Product;

/// Display sort order for the comparison view.
///
/// "Best" is always defined by cost per gram no matter which key is active;
/// the sort key only affects presentation order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    CostAsc,
    CostDesc,
    ProteinDesc,
    NameAsc,
    DateDesc,
}

impl SortKey {
    /// Parse a key string; anything unrecognized falls back to the default
    /// cost-ascending order rather than erroring.
    pub fn parse(s: &str) -> Self {
        match s {
            "cost-asc" => SortKey::CostAsc,
            "cost-desc" => SortKey::CostDesc,
            "protein-desc" => SortKey::ProteinDesc,
            "name-asc" => SortKey::NameAsc,
            "date-desc" => SortKey::DateDesc,
            _ => SortKey::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::CostAsc => "cost-asc",
            SortKey::CostDesc => "cost-desc",
            SortKey::ProteinDesc => "protein-desc",
            SortKey::NameAsc => "name-asc",
            SortKey::DateDesc => "date-desc",
        }
    }

    pub fn all() -> &'static [SortKey] {
        &[
            SortKey::CostAsc,
            SortKey::CostDesc,
            SortKey::ProteinDesc,
            SortKey::NameAsc,
            SortKey::DateDesc,
        ]
    }
}

/// Sort the collection for display. Stable: products with equal keys keep
/// their input order.
pub fn sorted(products: &[Product], key: SortKey) -> Vec<&Product> {
    let mut view: Vec<&Product> = products.iter().collect();
    match key {
        SortKey::CostAsc => view.sort_by(|a, b| a.cost_per_gram.total_cmp(&b.cost_per_gram)),
        SortKey::CostDesc => view.sort_by(|a, b| b.cost_per_gram.total_cmp(&a.cost_per_gram)),
        SortKey::ProteinDesc => {
            view.sort_by(|a, b| b.protein_per_dollar.total_cmp(&a.protein_per_dollar))
        }
        SortKey::NameAsc => view.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        SortKey::DateDesc => view.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
    view
}

/// The cheapest product per gram of protein, regardless of display sort.
pub fn best(products: &[Product]) -> Option<&Product> {
    products
        .iter()
        .min_by(|a, b| a.cost_per_gram.total_cmp(&b.cost_per_gram))
}

/// The most expensive product per gram of protein.
pub fn worst(products: &[Product]) -> Option<&Product> {
    products
        .iter()
        .max_by(|a, b| a.cost_per_gram.total_cmp(&b.cost_per_gram))
}

/// Arithmetic mean of cost per gram; None on an empty collection (rendered
/// as "--").
pub fn average_cost_per_gram(products: &[Product]) -> Option<f64> {
    if products.is_empty() {
        return None;
    }
    let sum: f64 = products.iter().map(|p| p.cost_per_gram).sum();
    Some(sum / products.len() as f64)
}

/// Savings of the best product against the worst, as a percentage of the
/// worst. Only meaningful with at least two products.
pub fn savings_percent(products: &[Product]) -> Option<f64> {
    if products.len() < 2 {
        return None;
    }
    let best = best(products)?.cost_per_gram;
    let worst = worst(products)?.cost_per_gram;
    Some((worst - best) / worst * 100.0)
}

/// Source diversity snapshot for the tracked collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiversityReport {
    /// Number of distinct source keys.
    pub count: usize,
    /// Distinct source keys in first-seen order.
    pub sources: Vec<String>,
    pub tip: DiversityTip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiversityTip {
    /// Everything comes from a single source.
    TryNewSources,
    /// Both an animal- and a plant-category source are present.
    GreatMix,
    /// More than one source but not yet balanced.
    KeepExploring,
}

impl DiversityTip {
    pub fn message(&self) -> &'static str {
        match self {
            DiversityTip::TryNewSources => {
                "Try adding products from different sources for better nutrition!"
            }
            DiversityTip::GreatMix => {
                "Great diversity! You're getting a good mix of animal and plant protein."
            }
            DiversityTip::KeepExploring => "Good start! Consider adding more variety.",
        }
    }
}

/// Count distinct sources and classify the spread. Unknown source keys fall
/// into the `Other` category via the catalog fallback.
pub fn diversity(products: &[Product]) -> DiversityReport {
    let mut sources: Vec<String> = Vec::new();
    for p in products {
        if !sources.iter().any(|s| s == &p.source) {
            sources.push(p.source.clone());
        }
    }

    let has_animal = sources
        .iter()
        .any(|s| source_category(s) == SourceCategory::Animal);
    let has_plant = sources
        .iter()
        .any(|s| source_category(s) == SourceCategory::Plant);

    let tip = if sources.len() <= 1 {
        DiversityTip::TryNewSources
    } else if has_animal && has_plant {
        DiversityTip::GreatMix
    } else {
        DiversityTip::KeepExploring
    };

    DiversityReport {
        count: sources.len(),
        sources,
        tip,
    }
}
