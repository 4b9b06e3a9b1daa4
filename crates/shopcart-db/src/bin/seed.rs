//! # Seed Data Generator
//!
//! Populates a Shopcart database with a demo catalog and coupons.
//!
//! ## Usage
//! ```bash
//! # Seed ./shopcart.db (or $DATABASE_PATH)
//! cargo run -p shopcart-db --bin seed
//!
//! # Specify database path
//! cargo run -p shopcart-db --bin seed -- --db ./data/shop.db
//! ```
//!
//! Products get a price of $2.99 - $149.99 and a stock of 0 - 50, derived
//! from their position in [`CATALOG`] so repeated runs on fresh databases
//! produce the same data. A few items are deliberately out of stock.

use std::env;

use shopcart_core::{Coupon, DiscountRate, Money, Product};
use shopcart_db::{Database, DbConfig, DbError};
use tracing_subscriber::EnvFilter;

/// Demo catalog grouped by department.
const CATALOG: &[(&str, &[&str])] = &[
    (
        "Kitchen",
        &[
            "Ceramic Mug",
            "Pour-Over Kettle",
            "Chef Knife",
            "Cutting Board",
            "Cast Iron Skillet",
            "Measuring Cups",
            "Espresso Cups (Set of 4)",
        ],
    ),
    (
        "Home",
        &[
            "Desk Lamp",
            "Linen Throw",
            "Wool Rug",
            "Scented Candle",
            "Wall Clock",
            "Picture Frame",
        ],
    ),
    (
        "Office",
        &[
            "Notebook A5",
            "Fountain Pen",
            "Monitor Stand",
            "Desk Organizer",
            "Mechanical Pencil",
        ],
    ),
    (
        "Outdoor",
        &[
            "Water Bottle",
            "Camping Lantern",
            "Trail Backpack",
            "Picnic Blanket",
        ],
    ),
];

/// (code, discount in basis points)
const COUPONS: &[(&str, u32)] = &[
    ("WELCOME5", 500),
    ("SAVE10", 1000),
    ("HALFOFF", 5000),
    ("FREEBIE", 10_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shopcart_db=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = env::var("DATABASE_PATH").unwrap_or_else(|_| String::from("./shopcart.db"));

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Shopcart Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $DATABASE_PATH or ./shopcart.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Shopcart Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let mut generated = 0;
    for (dept_idx, (department, names)) in CATALOG.iter().enumerate() {
        for (idx, name) in names.iter().enumerate() {
            let product = demo_product(name, dept_idx * 10 + idx);
            if let Err(e) = db.products().insert(&product).await {
                eprintln!("Failed to insert {}: {}", product.name, e);
                continue;
            }
            generated += 1;
        }
        println!("  {}: {} products", department, names.len());
    }
    println!("✓ Generated {} products", generated);

    println!();
    println!("Creating coupons...");
    for (code, bps) in COUPONS {
        let coupon = Coupon::new(*code, DiscountRate::from_bps(*bps));
        match db.coupons().insert(&coupon).await {
            Ok(()) => println!("  {} ({})", coupon.code, coupon.discount),
            Err(DbError::UniqueViolation { .. }) => println!("  {} already exists", code),
            Err(e) => return Err(e.into()),
        }
    }

    let search_results = db.products().search_by_name("mug").await?;
    println!();
    println!("Search 'mug': {} results", search_results.len());

    db.close().await;
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds a product with price and stock spread by `seed`.
fn demo_product(name: &str, seed: usize) -> Product {
    let seed = seed as i64;
    let price_cents = 299 + (seed * 733) % 14_700;
    // every seventh product starts sold out
    let stock = if seed % 7 == 3 { 0 } else { 1 + (seed * 13) % 50 };

    Product::new(name, Money::from_cents(price_cents), stock)
}
