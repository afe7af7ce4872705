use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::catalog::{source_info, store_name};
use crate::favorites::FavoriteSet;
use crate::models::Product;
use crate::ranking;
use crate::{Error, Result};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Markdown,
}

impl ExportFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            "md" | "markdown" => Some(ExportFormat::Markdown),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Markdown => "md",
        }
    }
}

/// Exporter for the ranked comparison table.
///
/// Callers pass the display-sorted view; the exporter adds rank numbers and
/// the summary block but does not reorder anything.
pub struct Exporter;

impl Exporter {
    /// Export to a file, detecting the format from the extension.
    pub fn export_to_file<P: AsRef<Path>>(
        products: &[&Product],
        favorites: &FavoriteSet,
        path: P,
    ) -> Result<()> {
        let path = path.as_ref();

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ExportFormat::from_extension)
            .ok_or_else(|| {
                Error::Config(
                    "Could not determine export format from extension. Use .json, .csv, or .md"
                        .to_string(),
                )
            })?;

        Self::export_to_file_with_format(products, favorites, path, format)
    }

    pub fn export_to_file_with_format<P: AsRef<Path>>(
        products: &[&Product],
        favorites: &FavoriteSet,
        path: P,
        format: ExportFormat,
    ) -> Result<()> {
        let content = match format {
            ExportFormat::Json => Self::to_json(products)?,
            ExportFormat::Csv => Self::to_csv(products, favorites),
            ExportFormat::Markdown => Self::to_markdown(products, favorites),
        };

        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    pub fn to_json(products: &[&Product]) -> Result<String> {
        Ok(serde_json::to_string_pretty(products)?)
    }

    pub fn to_csv(products: &[&Product], favorites: &FavoriteSet) -> String {
        let mut output = String::new();

        output.push_str(
            "Rank,Name,Brand,Source,Store,Price,Total Protein (g),\
             Cost per Gram,Protein per Dollar,Favorite,Added\n",
        );

        for (i, product) in products.iter().enumerate() {
            output.push_str(&format!(
                "{},{},{},{},{},{:.2},{:.1},{:.4},{:.1},{},{}\n",
                i + 1,
                Self::escape_csv(&product.name),
                Self::escape_csv(product.brand.as_deref().unwrap_or("")),
                source_info(&product.source).label,
                product
                    .store
                    .as_deref()
                    .map(store_name)
                    .unwrap_or_default(),
                product.price,
                product.total_protein,
                product.cost_per_gram,
                product.protein_per_dollar,
                if favorites.contains(product.id) { "yes" } else { "" },
                product.created_at.format("%Y-%m-%d"),
            ));
        }

        output
    }

    pub fn to_markdown(products: &[&Product], favorites: &FavoriteSet) -> String {
        let mut output = String::new();

        output.push_str("# Protein Value Comparison\n\n");
        output.push_str(&format!("Products tracked: {}\n\n", products.len()));

        output.push_str("| # | Product | Source | Price | Protein | $/g | g/$ |\n");
        output.push_str("|---|---------|--------|-------|---------|-----|-----|\n");

        for (i, product) in products.iter().enumerate() {
            let info = source_info(&product.source);
            let mut name = product.name.clone();
            if favorites.contains(product.id) {
                name.push_str(" ★");
            }
            output.push_str(&format!(
                "| {} | {} | {} {} | ${:.2} | {:.0}g | ${:.4} | {:.1}g |\n",
                i + 1,
                name,
                info.glyph,
                info.label,
                product.price,
                product.total_protein,
                product.cost_per_gram,
                product.protein_per_dollar,
            ));
        }

        // Summary block mirrors what the stats view shows
        let owned: Vec<Product> = products.iter().map(|p| (*p).clone()).collect();
        output.push_str("\n## Summary\n\n");

        if let Some(best) = ranking::best(&owned) {
            output.push_str(&format!(
                "- Best value: {} (${:.4}/g, {:.1}g per dollar)\n",
                best.name, best.cost_per_gram, best.protein_per_dollar
            ));
        }
        if let Some(avg) = ranking::average_cost_per_gram(&owned) {
            output.push_str(&format!("- Average cost per gram: ${:.4}\n", avg));
        }
        if let Some(savings) = ranking::savings_percent(&owned) {
            output.push_str(&format!(
                "- Buying the best over the worst saves {:.0}%\n",
                savings
            ));
        }

        let diversity = ranking::diversity(&owned);
        if diversity.count > 0 {
            output.push_str(&format!(
                "- Source diversity: {} ({})\n",
                diversity.count,
                diversity.tip.message()
            ));
        }

        output
    }

    /// Escape CSV special characters
    fn escape_csv(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProteinAmount;
    use chrono::Utc;

    fn sample(id: i64, name: &str, source: &str, price: f64, grams: f64) -> Product {
        Product {
            id,
            name: name.into(),
            brand: Some("Acme".into()),
            notes: None,
            barcode: None,
            store: Some("costco".into()),
            source: source.into(),
            price,
            servings: None,
            protein_per_serving: None,
            total_protein: grams,
            cost_per_gram: price / grams,
            protein_per_dollar: grams / price,
            created_at: Utc::now(),
            updated_at: None,
            contribute_data: false,
            photos: Vec::new(),
        }
    }

    #[test]
    fn format_detection() {
        assert_eq!(ExportFormat::from_extension("json"), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::from_extension("JSON"), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::from_extension("csv"), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_extension("md"), Some(ExportFormat::Markdown));
        assert_eq!(ExportFormat::from_extension("markdown"), Some(ExportFormat::Markdown));
        assert_eq!(ExportFormat::from_extension("txt"), None);
    }

    #[test]
    fn json_export_contains_products() {
        let a = sample(1, "Whey X", "whey", 30.0, 720.0);
        let json = Exporter::to_json(&[&a]).unwrap();
        assert!(json.contains("Whey X"));
        assert!(json.contains("cost_per_gram"));
        assert!(!json.contains("photos"));
    }

    #[test]
    fn csv_export_ranks_and_escapes() {
        let a = sample(1, "Whey, the good one", "whey", 30.0, 720.0);
        let b = sample(2, "Pea Y", "pea", 20.0, 400.0);
        let mut favorites = FavoriteSet::new();
        favorites.toggle(2);

        let csv = Exporter::to_csv(&[&a, &b], &favorites);
        assert!(csv.starts_with("Rank,Name"));
        assert!(csv.contains("\"Whey, the good one\""));
        assert!(csv.contains("Costco"));
        // Second row is the favorite
        let favorite_row = csv.lines().nth(2).unwrap();
        assert!(favorite_row.contains("yes"));
    }

    #[test]
    fn markdown_export_has_table_and_summary() {
        let a = sample(1, "Whey X", "whey", 30.0, 720.0);
        let b = sample(2, "Pea Y", "pea", 20.0, 400.0);
        let favorites = FavoriteSet::new();

        let md = Exporter::to_markdown(&[&a, &b], &favorites);
        assert!(md.contains("# Protein Value Comparison"));
        assert!(md.contains("| 1 | Whey X |"));
        assert!(md.contains("Best value: Whey X"));
        assert!(md.contains("saves"));
        assert!(md.contains("Source diversity: 2"));
    }

    #[test]
    fn markdown_export_of_empty_collection_is_calm() {
        let md = Exporter::to_markdown(&[], &FavoriteSet::new());
        assert!(md.contains("Products tracked: 0"));
        assert!(!md.contains("Best value"));
    }
}
