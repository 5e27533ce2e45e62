//! Seed script for the eco-price catalog
//!
//! Logs in as an administrator and creates a demo product set through the
//! admin API, so a fresh backend has something to browse, filter and compare.
//! Run: cargo run --bin seed_catalog -- <admin user> <admin password>
//! (defaults: admin / admin123)

use std::env;
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{error, info};

use ecopreco::controllers::auth::{self, Landing, LoginForm};
use ecopreco::controllers::AppContext;
use ecopreco::models::ProductDraft;
use ecopreco::query::FilterCriteria;
use ecopreco::{config, logging, Config, SessionStore};

const PRODUCTS: &[(&str, &str, &str, &str, &str, Option<&str>)] = &[
    ("Bamboo toothbrush", "12.90", "Verde Vivo", "Hygiene", "EcoShop", Some("FSC")),
    ("Solid shampoo bar", "29.50", "Terra Pura", "Hygiene", "Natural Market", Some("Vegan")),
    ("Reusable beeswax wraps", "45.00", "Abelha", "Kitchen", "EcoShop", None),
    ("Organic cotton tote", "19.99", "Fio Puro", "Accessories", "Feira Verde", Some("GOTS")),
    ("Biodegradable soap", "8.75", "Terra Pura", "Hygiene", "Feira Verde", Some("Ecocert")),
    ("Stainless steel straw kit", "24.00", "Inox Bem", "Kitchen", "Natural Market", None),
    ("Compostable trash bags", "17.40", "Verde Vivo", "Home", "EcoShop", Some("OK Compost")),
    ("Refillable glass bottle", "39.90", "Vidro Claro", "Kitchen", "Feira Verde", None),
    ("Natural loofah sponge", "6.50", "Abelha", "Hygiene", "Natural Market", Some("Vegan")),
    ("Recycled paper notebook", "14.20", "Fio Puro", "Stationery", "EcoShop", Some("FSC")),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::load_env_file();
    let _log_guard = logging::init();
    let mut args = env::args().skip(1);
    let username = args.next().unwrap_or_else(|| "admin".to_string());
    let password = args.next().unwrap_or_else(|| "admin123".to_string());

    // Throwaway session: seeding must not replace the user's CLI login
    let ctx = AppContext::new(Config::load(), SessionStore::in_memory())?;

    let login = auth::login(&ctx, &LoginForm { username, password }).await;
    match login.data {
        Some(Landing::Admin) => info!("Logged in as administrator"),
        Some(Landing::Storefront) => {
            error!("Account has no ROLE_ADMIN; product creation would be rejected");
            return Err("seed account is not an administrator".into());
        }
        None => return Err(login.status.text.into()),
    }

    let mut created = 0;
    for (i, &(name, price, brand, category, store, eco_label)) in PRODUCTS.iter().enumerate() {
        let draft = ProductDraft {
            name: name.to_string(),
            description: format!("{name} from {brand}: everyday swap for a lower-waste home."),
            current_price: Decimal::from_str(price)?,
            brand: brand.to_string(),
            category: category.to_string(),
            eco_label: eco_label.map(str::to_string),
            product_url: format!("https://example.com/products/{}", i + 1),
            image_url: None,
            store: store.to_string(),
            sustainability_info: eco_label.map(|label| format!("Certified {label}")),
        };
        match ctx.catalog.create_product(&draft).await {
            Ok(_) => created += 1,
            Err(e) => error!(%name, "Create failed: {e}"),
        }
    }
    info!("Created {created} of {} demo products", PRODUCTS.len());

    // Read back through the public listing
    let page = ctx.catalog.list_products(&FilterCriteria::page(0, 5)).await?;
    info!("Listing now returns {} products on the first page", page.content.len());

    Ok(())
}
