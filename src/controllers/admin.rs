//! Admin product management. Every action checks the stored admin role first
//! and sends the bearer token; the backend still has the final say.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::auth::require_admin;
use super::{require, AppContext, Outcome, StatusMessage};
use crate::error::{ClientError, Result};
use crate::models::{Product, ProductDraft};

/// Raw product form input.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub brand: String,
    pub category: String,
    pub eco_label: String,
    pub product_url: String,
    pub image_url: String,
    pub store: String,
    pub sustainability_info: String,
}

impl ProductForm {
    /// Required: non-empty name and a numeric price. Anything else (price
    /// sign, URL shape, uniqueness) is the backend's to judge.
    pub fn to_draft(&self) -> Result<ProductDraft> {
        const REQUIRED: &str = "Name and price are required.";
        let name = require(&self.name, REQUIRED)?;
        let price = Decimal::from_str(self.price.trim()).map_err(|_| ClientError::validation(REQUIRED))?;

        Ok(ProductDraft {
            name,
            description: self.description.trim().to_string(),
            current_price: price,
            brand: self.brand.trim().to_string(),
            category: self.category.trim().to_string(),
            eco_label: optional(&self.eco_label),
            product_url: self.product_url.trim().to_string(),
            image_url: optional(&self.image_url),
            store: self.store.trim().to_string(),
            sustainability_info: optional(&self.sustainability_info),
        })
    }
}

impl From<&Product> for ProductForm {
    fn from(p: &Product) -> Self {
        Self {
            name: p.name.clone(),
            description: p.description.clone(),
            price: p.current_price.to_string(),
            brand: p.brand.clone(),
            category: p.category.clone(),
            eco_label: p.eco_label.clone().unwrap_or_default(),
            product_url: p.product_url.clone(),
            image_url: p.image_url.clone().unwrap_or_default(),
            store: p.store.clone(),
            sustainability_info: p.sustainability_info.clone().unwrap_or_default(),
        }
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub async fn list(ctx: &AppContext) -> Outcome<Vec<Product>> {
    if let Err(e) = require_admin(&ctx.session) {
        return Outcome::failed(e);
    }
    match ctx.catalog.all_products().await {
        Ok(products) => {
            let status = StatusMessage::info(format!("{} products", products.len()));
            Outcome::done(products, status)
        }
        Err(e) => Outcome::failed_with(e, "Error loading products."),
    }
}

/// Load a product into a form for editing.
pub async fn edit(ctx: &AppContext, id: i64) -> Outcome<ProductForm> {
    if let Err(e) = require_admin(&ctx.session) {
        return Outcome::failed(e);
    }
    Outcome::from_result(
        ctx.catalog.get_product(id).await.map(|p| ProductForm::from(&p)),
        |_| StatusMessage::info(format!("Editing product #{id}")),
    )
}

/// Create when `editing` is `None`, otherwise update that id.
pub async fn save(ctx: &AppContext, form: &ProductForm, editing: Option<i64>) -> Outcome<Product> {
    let result = async {
        require_admin(&ctx.session)?;
        let draft = form.to_draft()?;
        match editing {
            Some(id) => ctx.catalog.update_product(id, &draft).await,
            None => ctx.catalog.create_product(&draft).await,
        }
    }
    .await;

    let text = if editing.is_some() {
        "Product updated successfully!"
    } else {
        "Product added successfully!"
    };
    Outcome::from_result(result, |_| StatusMessage::success(text))
}

/// Apply `changes` on top of the stored product, then update it. Blank form
/// fields keep the stored value.
pub async fn patch(ctx: &AppContext, id: i64, changes: &ProductForm) -> Outcome<Product> {
    let loaded = edit(ctx, id).await;
    let Some(mut form) = loaded.data else {
        return Outcome {
            status: loaded.status,
            data: None,
            error: loaded.error,
        };
    };
    merge(&mut form, changes);
    save(ctx, &form, Some(id)).await
}

fn merge(form: &mut ProductForm, changes: &ProductForm) {
    let fields = [
        (&mut form.name, &changes.name),
        (&mut form.description, &changes.description),
        (&mut form.price, &changes.price),
        (&mut form.brand, &changes.brand),
        (&mut form.category, &changes.category),
        (&mut form.eco_label, &changes.eco_label),
        (&mut form.product_url, &changes.product_url),
        (&mut form.image_url, &changes.image_url),
        (&mut form.store, &changes.store),
        (&mut form.sustainability_info, &changes.sustainability_info),
    ];
    for (current, change) in fields {
        if !change.trim().is_empty() {
            *current = change.clone();
        }
    }
}

pub async fn delete(ctx: &AppContext, id: i64) -> Outcome<()> {
    let result = async {
        require_admin(&ctx.session)?;
        ctx.catalog.delete_product(id).await
    }
    .await;
    match result {
        Ok(_) => Outcome::done((), StatusMessage::success("Product deleted successfully!")),
        Err(e) => Outcome::failed(e),
    }
}
