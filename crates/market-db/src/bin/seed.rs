//! # Seed Data Generator
//!
//! Populates the database with development data.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p market-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p market-db --bin seed -- --count 1000
//!
//! # Point at another server
//! POSTGRES_HOST=db.internal POSTGRES_DATABASE=market_dev cargo run -p market-db --bin seed
//! ```
//!
//! ## Generated Data
//! - Three branches
//! - One category per group below, with a nested "Other" sub-category
//! - `--count` products spread across the categories
//! - One finished intake at the first branch with a line item per product
//!   (capped at 50 lines)

use std::env;
use std::time::Instant;

use market_core::{
    CreateBranch, CreateCategory, CreateProduct, CreateStorageComing,
    CreateStorageComingProduct, ListRequest, Money, StorageComingStatus, UpdateStorageComing,
};
use market_db::{Store, StoreConfig};
use tracing_subscriber::EnvFilter;

const BRANCHES: &[(&str, &str, &str)] = &[
    ("Chilonzor", "Bunyodkor ko'chasi 12", "+998901110011"),
    ("Yunusobod", "Amir Temur shox ko'chasi 108", "+998901110022"),
    ("Sergeli", "Yangi Sergeli 4", "+998901110033"),
];

/// Category groups for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Beverages",
        &[
            "Sparkling water",
            "Still water",
            "Green tea",
            "Black tea",
            "Apple juice",
            "Cherry juice",
            "Cola",
            "Ayran",
        ],
    ),
    (
        "Dairy",
        &[
            "Milk 3.2%",
            "Kefir",
            "Qatiq",
            "Suzma",
            "Butter",
            "Sour cream",
            "Cottage cheese",
            "Yogurt",
        ],
    ),
    (
        "Grocery",
        &[
            "Rice devzira",
            "Rice lazer",
            "Flour",
            "Sugar",
            "Salt",
            "Sunflower oil",
            "Buckwheat",
            "Pasta",
        ],
    ),
    (
        "Bakery",
        &["Non", "Patir", "Baguette", "Rye bread", "Somsa", "Cookies"],
    ),
];

const SIZES: &[(&str, i64)] = &[
    ("0.5", 0),
    ("1", 2_500),
    ("1.5", 4_000),
    ("5", 15_000),
];

const MAX_INTAKE_LINES: usize = 50;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Market Store Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -h, --help         Show this help message");
                println!();
                println!("Connection settings come from POSTGRES_HOST, POSTGRES_USER,");
                println!("POSTGRES_DATABASE, POSTGRES_PASSWORD and POSTGRES_PORT.");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let config = StoreConfig::from_env()?;

    println!("🌱 Market Store Seed Data Generator");
    println!("===================================");
    println!("Database: {}@{}:{}/{}", config.user, config.host, config.port, config.database);
    println!("Products: {}", count);
    println!();

    let store = Store::connect(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = store.product().get_list(&ListRequest::page(0, 1)).await?.count;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        store.close().await;
        return Ok(());
    }

    let start = Instant::now();

    // Branches
    let mut branch_ids = Vec::with_capacity(BRANCHES.len());
    for (name, address, phone_number) in BRANCHES {
        let id = store
            .branch()
            .create(&CreateBranch {
                name: name.to_string(),
                address: address.to_string(),
                phone_number: phone_number.to_string(),
            })
            .await?;
        branch_ids.push(id);
    }
    println!("✓ Created {} branches", branch_ids.len());

    // Categories, each with an "Other" child
    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (name, _) in CATEGORIES {
        let id = store
            .category()
            .create(&CreateCategory {
                name: name.to_string(),
                parent_id: String::new(),
            })
            .await?;
        store
            .category()
            .create(&CreateCategory {
                name: format!("Other {}", name.to_lowercase()),
                parent_id: id.clone(),
            })
            .await?;
        category_ids.push(id);
    }
    println!("✓ Created {} categories", category_ids.len() * 2);

    // Products
    println!();
    println!("Generating products...");

    let variants: Vec<(usize, &str, &str, i64)> = CATEGORIES
        .iter()
        .enumerate()
        .flat_map(|(category_idx, (_, names))| {
            names.iter().flat_map(move |name| {
                SIZES
                    .iter()
                    .map(move |(size, price_addon)| (category_idx, *name, *size, *price_addon))
            })
        })
        .collect();

    let mut lines = Vec::new();
    let mut generated = 0;

    for seed in 0..count {
        let (category_idx, product_name, size, price_addon) = variants[seed % variants.len()];

        // Second and later passes over the variants get a numbered name
        let name = if seed < variants.len() {
            format!("{} {}l", product_name, size)
        } else {
            format!("{} {}l #{}", product_name, size, seed / variants.len())
        };

        let product = CreateProduct {
            name,
            barcode: format!("478{:010}", seed),
            price: Money::from_minor(3_000 + (seed as i64 * 1_700) % 40_000 + price_addon),
            category_id: category_ids[category_idx].clone(),
        };

        if let Err(e) = store.product().create(&product).await {
            eprintln!("Failed to insert {}: {}", product.name, e);
            continue;
        }

        if lines.len() < MAX_INTAKE_LINES {
            lines.push(product);
        }

        generated += 1;
        if generated % 100 == 0 {
            println!("  Generated {} products...", generated);
        }
    }

    println!("✓ Generated {} products", generated);

    // One intake at the first branch
    if let Some(branch_id) = branch_ids.first() {
        let coming_id = format!("WB-{:06}", start.elapsed().as_micros() % 1_000_000);
        let storage_coming_id = store
            .storage_coming()
            .create(&CreateStorageComing {
                coming_id: coming_id.clone(),
                branch_id: branch_id.clone(),
            })
            .await?;

        let mut total = Money::zero();
        for (idx, product) in lines.iter().enumerate() {
            let line = CreateStorageComingProduct {
                name: product.name.clone(),
                quantity: 1 + (idx as i64 % 24),
                price: product.price,
                category_id: product.category_id.clone(),
                storage_coming_id: storage_coming_id.clone(),
            };
            total = total
                .checked_add(line.total_price()?)
                .ok_or("intake total overflows")?;
            store.storage_coming_product().create(&line).await?;
        }

        store
            .storage_coming()
            .update(&UpdateStorageComing {
                id: storage_coming_id,
                coming_id: coming_id.clone(),
                branch_id: branch_id.clone(),
                status: StorageComingStatus::Finished.to_string(),
            })
            .await?;

        println!(
            "✓ Intake {} finished: {} lines, total {}",
            coming_id,
            lines.len(),
            total
        );
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Seed complete in {:?}", elapsed);

    store.close().await;
    Ok(())
}
