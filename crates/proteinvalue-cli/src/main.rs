use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use proteinvalue_core::catalog::{self, source_info, store_name};
use proteinvalue_core::persist::FileBlobStore;
use proteinvalue_core::providers::OpenFoodFactsProvider;
use proteinvalue_core::ranking::{self, SortKey};
use proteinvalue_core::{
    Config, Exporter, LookupService, Product, ProductDraft, ProductStore, ProteinAmount,
};

#[derive(Parser)]
#[command(name = "proteinvalue")]
#[command(version, about = "Protein price comparison from your terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Add a product to the comparison
    Add {
        /// Product name
        name: String,
        /// Price paid, in your currency
        #[arg(long)]
        price: f64,
        /// Protein source key (whey, pea, soy, ...; see `sources`)
        #[arg(long)]
        source: String,
        /// Total protein in the container, grams
        #[arg(long)]
        total: Option<f64>,
        /// Servings per container (use together with --per-serving)
        #[arg(long)]
        servings: Option<f64>,
        /// Protein per serving, grams (use together with --servings)
        #[arg(long)]
        per_serving: Option<f64>,
        #[arg(long)]
        brand: Option<String>,
        /// Store key or free-form store name
        #[arg(long)]
        store: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        barcode: Option<String>,
        /// Opt in to sharing anonymized price data
        #[arg(long)]
        contribute: bool,
    },
    /// Show the ranked comparison table
    List {
        /// Sort key: cost-asc, cost-desc, protein-desc, name-asc, date-desc
        #[arg(long)]
        sort: Option<String>,
    },
    /// Show one product in full
    Show { id: i64 },
    /// Edit a product in place; unset flags keep their current value
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        total: Option<f64>,
        #[arg(long)]
        servings: Option<f64>,
        #[arg(long)]
        per_serving: Option<f64>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        store: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        barcode: Option<String>,
    },
    /// Remove a product
    Remove { id: i64 },
    /// Remove every product and favorite
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Toggle favorite status for a product
    Favorite { id: i64 },
    /// List favorite products
    Favorites,
    /// Summary statistics: best value, average, savings, diversity
    Stats,
    /// Export the comparison table (.json, .csv or .md)
    Export { path: PathBuf },
    /// List known protein source keys
    Sources,
    /// Parse recognized nutrition-label text (from a file, or stdin)
    Label { file: Option<PathBuf> },
    /// Look up a product by barcode
    Barcode { code: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "proteinvalue=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Config unreadable, using defaults: {}", e);
        Config::default()
    });

    match cli.command {
        Commands::Add {
            name,
            price,
            source,
            total,
            servings,
            per_serving,
            brand,
            store,
            notes,
            barcode,
            contribute,
        } => {
            let mut store_handle = open_store(&config)?;
            let draft = ProductDraft {
                name,
                brand,
                notes,
                barcode,
                store,
                source,
                price,
                amount: amount_from_args(total, servings, per_serving),
                contribute_data: contribute,
                photos: Vec::new(),
            };
            let product = store_handle.add(draft)?;
            println!("Added: {} (id {})", product.name, product.id);
            println!(
                "  {:.1}g protein for {}{:.2} -> {}{:.4}/g, {:.1}g per {}1",
                product.total_protein,
                config.display.currency,
                product.price,
                config.display.currency,
                product.cost_per_gram,
                product.protein_per_dollar,
                config.display.currency,
            );
        }
        Commands::List { sort } => {
            let store_handle = open_store(&config)?;
            let key = SortKey::parse(sort.as_deref().unwrap_or(&config.display.default_sort));
            print_table(&store_handle, key, &config);
        }
        Commands::Show { id } => {
            let store_handle = open_store(&config)?;
            let product = store_handle
                .find_by_id(id)
                .ok_or(proteinvalue_core::Error::NotFound(id))?;
            print_product(product, store_handle.is_favorite(id), &config);
        }
        Commands::Edit {
            id,
            name,
            price,
            source,
            total,
            servings,
            per_serving,
            brand,
            store,
            notes,
            barcode,
        } => {
            let mut store_handle = open_store(&config)?;
            let existing = store_handle
                .find_by_id(id)
                .ok_or(proteinvalue_core::Error::NotFound(id))?;

            let mut draft = existing.to_draft();
            if let Some(v) = name {
                draft.name = v;
            }
            if let Some(v) = price {
                draft.price = v;
            }
            if let Some(v) = source {
                draft.source = v;
            }
            if let Some(amount) = edited_amount(&draft, total, servings, per_serving) {
                draft.amount = amount;
            }
            if brand.is_some() {
                draft.brand = brand;
            }
            if store.is_some() {
                draft.store = store;
            }
            if notes.is_some() {
                draft.notes = notes;
            }
            if barcode.is_some() {
                draft.barcode = barcode;
            }

            let updated = store_handle.update(id, draft)?;
            println!("Updated: {} (id {})", updated.name, updated.id);
        }
        Commands::Remove { id } => {
            let mut store_handle = open_store(&config)?;
            store_handle.remove(id)?;
            println!("Removed {}", id);
        }
        Commands::Clear { yes } => {
            let mut store_handle = open_store(&config)?;
            if store_handle.is_empty() {
                println!("Nothing to clear.");
                return Ok(());
            }
            if !yes && !confirm("Clear all products? This cannot be undone.")? {
                println!("Kept everything.");
                return Ok(());
            }
            store_handle.clear()?;
            println!("Cleared.");
        }
        Commands::Favorite { id } => {
            let mut store_handle = open_store(&config)?;
            if store_handle.find_by_id(id).is_none() {
                println!("No product with id {}.", id);
            } else if store_handle.toggle_favorite(id)? {
                println!("Favorited {}.", id);
            } else {
                println!("Unfavorited {}.", id);
            }
        }
        Commands::Favorites => {
            let store_handle = open_store(&config)?;
            let favorites: Vec<&Product> = store_handle
                .products()
                .iter()
                .filter(|p| store_handle.is_favorite(p.id))
                .collect();
            if favorites.is_empty() {
                println!("No favorites yet. Star one with `proteinvalue favorite <id>`.");
            } else {
                for product in favorites {
                    let info = source_info(&product.source);
                    println!(
                        "★ {} {} [{}] {}{:.4}/g (id {})",
                        info.glyph,
                        product.name,
                        info.label,
                        config.display.currency,
                        product.cost_per_gram,
                        product.id
                    );
                }
            }
        }
        Commands::Stats => {
            let store_handle = open_store(&config)?;
            print_stats(&store_handle, &config);
        }
        Commands::Export { path } => {
            let store_handle = open_store(&config)?;
            let view = ranking::sorted(store_handle.products(), SortKey::CostAsc);
            Exporter::export_to_file(&view, store_handle.favorites(), &path)?;
            println!("Exported {} product(s) to {}", view.len(), path.display());
        }
        Commands::Sources => {
            for info in catalog::PROTEIN_SOURCES {
                println!(
                    "{:14} {} {} ({})",
                    info.key,
                    info.glyph,
                    info.label,
                    info.category.label()
                );
            }
        }
        Commands::Label { file } => {
            let text = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Could not read {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };

            let reading = proteinvalue_lookup::parse_label_text(&text);
            if reading.is_empty() {
                println!("Could not detect values from label. Please enter manually.");
            } else {
                match reading.protein {
                    Some(g) => println!("Detected protein per serving: {}g", g),
                    None => println!("Detected protein per serving: --"),
                }
                match reading.servings {
                    Some(n) => println!("Detected servings: {}", n),
                    None => println!("Detected servings: --"),
                }
                if let (Some(g), Some(n)) = (reading.protein, reading.servings) {
                    println!("Estimated total protein: {:.0}g", g * n as f64);
                }
            }
        }
        Commands::Barcode { code } => {
            if !config.lookup.enabled {
                println!("Lookups are disabled in the config. Please enter details manually.");
                return Ok(());
            }

            let provider = OpenFoodFactsProvider::with_base_url(config.lookup.api_url.clone());
            let service = LookupService::new(Box::new(provider));
            let ticket = service.begin_scan();

            match service.lookup_barcode(&code, ticket).await {
                Some(hit) => {
                    println!("Found: {}", hit.name);
                    if let Some(brand) = &hit.brand {
                        println!("  Brand: {}", brand);
                    }
                    if let Some(serving) = &hit.serving_size {
                        println!("  Serving size: {}", serving);
                    }
                    match hit.protein_per_serving {
                        Some(g) => println!("  Protein per serving: {}g", g),
                        None => println!("  Protein per serving: unknown"),
                    }
                    println!(
                        "Add it with: proteinvalue add \"{}\" --price <price> --source <source> \
                         --servings <count> --per-serving {}",
                        hit.name,
                        hit.protein_per_serving
                            .map(|g| g.to_string())
                            .unwrap_or_else(|| "<grams>".into())
                    );
                }
                None => {
                    println!(
                        "No product found for {}. Please enter details manually.",
                        code
                    );
                }
            }
        }
    }

    Ok(())
}

/// Resolve the two protein input shapes from the CLI flags. An explicit
/// total wins; otherwise servings x per-serving. With neither, hand the
/// engine a zero total and let the admission check produce the message.
fn amount_from_args(
    total: Option<f64>,
    servings: Option<f64>,
    per_serving: Option<f64>,
) -> ProteinAmount {
    match (total, servings, per_serving) {
        (Some(grams), _, _) => ProteinAmount::Total { grams },
        (None, Some(servings), Some(grams_each)) => ProteinAmount::PerServing {
            servings,
            grams_each,
        },
        _ => ProteinAmount::Total { grams: 0.0 },
    }
}

/// Amount override for edit: only touch the shape if a related flag was
/// passed, merging partial per-serving edits onto the existing shape.
fn edited_amount(
    draft: &ProductDraft,
    total: Option<f64>,
    servings: Option<f64>,
    per_serving: Option<f64>,
) -> Option<ProteinAmount> {
    if let Some(grams) = total {
        return Some(ProteinAmount::Total { grams });
    }
    if servings.is_none() && per_serving.is_none() {
        return None;
    }

    let (current_servings, current_each) = match draft.amount {
        ProteinAmount::PerServing {
            servings,
            grams_each,
        } => (Some(servings), Some(grams_each)),
        ProteinAmount::Total { .. } => (None, None),
    };

    match (servings.or(current_servings), per_serving.or(current_each)) {
        (Some(servings), Some(grams_each)) => Some(ProteinAmount::PerServing {
            servings,
            grams_each,
        }),
        // Half a per-serving pair and no basis to complete it: zero total
        // lets the admission check explain what is missing.
        _ => Some(ProteinAmount::Total { grams: 0.0 }),
    }
}

fn open_store(config: &Config) -> anyhow::Result<ProductStore> {
    let blobs = match &config.storage.data_dir {
        Some(dir) => FileBlobStore::new(dir.clone()),
        None => FileBlobStore::open_default()?,
    };
    Ok(ProductStore::open(Box::new(blobs)))
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    use std::io::Write;
    print!("{} [y/N] ", question);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn print_table(store: &ProductStore, key: SortKey, config: &Config) {
    if store.is_empty() {
        println!("No products yet. Add one with `proteinvalue add`.");
        return;
    }

    let view = ranking::sorted(store.products(), key);
    let best_id = ranking::best(store.products()).map(|p| p.id);
    let currency = &config.display.currency;

    println!(
        "{:>2}  {:30} {:16} {:>9} {:>9} {:>9} {:>8}  id",
        "#", "Product", "Source", "Price", "Protein", "$/g", "g/$"
    );
    for (i, product) in view.iter().enumerate() {
        let info = source_info(&product.source);
        let mut marks = String::new();
        if Some(product.id) == best_id {
            marks.push_str(" 🏆");
        }
        if store.is_favorite(product.id) {
            marks.push_str(" ★");
        }
        println!(
            "{:>2}  {:30} {:16} {:>9} {:>9} {:>9} {:>8}  {}{}",
            i + 1,
            truncate(&product.name, 30),
            format!("{} {}", info.glyph, info.label),
            format!("{}{:.2}", currency, product.price),
            format!("{:.0}g", product.total_protein),
            format!("{}{:.4}", currency, product.cost_per_gram),
            format!("{:.1}g", product.protein_per_dollar),
            product.id,
            marks,
        );
    }
    println!("\nSorted by {}. Best value by cost per gram: 🏆", key.as_str());
}

fn print_product(product: &Product, favorite: bool, config: &Config) {
    let info = source_info(&product.source);
    let currency = &config.display.currency;

    println!(
        "{} {}{}",
        info.glyph,
        product.name,
        if favorite { " ★" } else { "" }
    );
    if let Some(brand) = &product.brand {
        println!("  Brand:      {}", brand);
    }
    println!("  Source:     {} ({})", info.label, info.category.label());
    if let Some(store) = &product.store {
        println!("  Store:      {}", store_name(store));
    }
    println!("  Price:      {}{:.2}", currency, product.price);
    if let (Some(servings), Some(each)) = (product.servings, product.protein_per_serving) {
        println!("  Servings:   {} x {}g", servings, each);
    }
    println!("  Protein:    {:.0}g total", product.total_protein);
    println!("  Cost/gram:  {}{:.4}", currency, product.cost_per_gram);
    println!("  Protein/$:  {:.1}g", product.protein_per_dollar);
    if let Some(barcode) = &product.barcode {
        println!("  Barcode:    {}", barcode);
    }
    if let Some(notes) = &product.notes {
        println!("  Notes:      {}", notes);
    }
    println!("  Added:      {}", product.created_at.format("%Y-%m-%d"));
    if let Some(updated) = product.updated_at {
        println!("  Updated:    {}", updated.format("%Y-%m-%d"));
    }
    println!("  Id:         {}", product.id);
}

fn print_stats(store: &ProductStore, config: &Config) {
    let products = store.products();
    if products.is_empty() {
        println!("No products yet. Add one with `proteinvalue add`.");
        return;
    }
    let currency = &config.display.currency;

    println!("Products tracked: {}", products.len());

    match ranking::average_cost_per_gram(products) {
        Some(avg) => println!("Average cost/gram: {}{:.4}", currency, avg),
        None => println!("Average cost/gram: --"),
    }

    if let Some(best) = ranking::best(products) {
        println!(
            "Best value: {} at {}{:.4}/g ({:.1}g per {}1)",
            best.name, currency, best.cost_per_gram, best.protein_per_dollar, currency
        );
    }

    match ranking::savings_percent(products) {
        Some(savings) => println!("Best vs worst: {:.0}% cheaper", savings),
        None => println!("Best vs worst: --"),
    }

    let diversity = ranking::diversity(products);
    let tags: Vec<String> = diversity
        .sources
        .iter()
        .map(|s| {
            let info = source_info(s);
            format!("{} {}", info.glyph, info.label)
        })
        .collect();
    println!("Source diversity: {} ({})", diversity.count, tags.join(", "));
    println!("{}", diversity.tip.message());
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}
