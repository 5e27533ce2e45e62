//! Typed access to every backend endpoint the client uses.
//!
//! Auth endpoints, product catalog (public listing, facets, admin CRUD),
//! reviews and price history. Each method is a single `ApiClient` call;
//! shapes are checked here so controllers only see typed records.

use reqwest::Method;
use rust_decimal::Decimal;
use tracing::info;

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse, Page, PriceHistoryEntry, PriceStatistics,
    Product, ProductDraft, RatingCount, RegisterRequest, Review, ReviewDraft,
};
use crate::query::{build_list_url, FilterCriteria};

/// Page size the comparison and admin views use to fetch "everything".
pub const FULL_LISTING_SIZE: u32 = 1000;

/// Distinct attribute values offered as filter choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Categories,
    Brands,
    Stores,
    EcoLabels,
}

impl Facet {
    pub const ALL: [Facet; 4] = [Facet::Categories, Facet::Brands, Facet::Stores, Facet::EcoLabels];

    pub fn path(self) -> &'static str {
        match self {
            Facet::Categories => "/products/public/categories",
            Facet::Brands => "/products/public/brands",
            Facet::Stores => "/products/public/stores",
            Facet::EcoLabels => "/products/public/ecolabels",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Facet::Categories => "categories",
            Facet::Brands => "brands",
            Facet::Stores => "stores",
            Facet::EcoLabels => "eco labels",
        }
    }
}

#[derive(Clone)]
pub struct CatalogService {
    client: ApiClient,
}

impl CatalogService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    // --- Auth ---

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        self.client.send(Method::POST, "/auth/login", request, false).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<MessageResponse> {
        self.client.send(Method::POST, "/auth/register", request, false).await
    }

    pub async fn forgot_password(&self, request: &ForgotPasswordRequest) -> Result<()> {
        self.client
            .request("/auth/forgot-password", Method::POST, Some(request), false)
            .await?;
        Ok(())
    }

    // --- Products ---

    pub async fn list_products(&self, criteria: &FilterCriteria) -> Result<Page<Product>> {
        self.client.get(&build_list_url(criteria), false).await
    }

    /// Every product in one page, as the comparison and admin views load them.
    pub async fn all_products(&self) -> Result<Vec<Product>> {
        let path = format!("/products/public/all?size={FULL_LISTING_SIZE}");
        let page: Page<Product> = self.client.get(&path, false).await?;
        Ok(page.content)
    }

    /// Facet values with blank entries removed.
    pub async fn facet(&self, facet: Facet) -> Result<Vec<String>> {
        let values: Vec<Option<String>> = self.client.get(facet.path(), false).await?;
        Ok(values
            .into_iter()
            .flatten()
            .filter(|v| !v.trim().is_empty())
            .collect())
    }

    pub async fn get_product(&self, id: i64) -> Result<Product> {
        self.client.get(&format!("/products/{id}"), false).await
    }

    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product> {
        let product: Product = self.client.send(Method::POST, "/products", draft, true).await?;
        info!(id = product.id, name = %product.name, "Product created");
        Ok(product)
    }

    pub async fn update_product(&self, id: i64, draft: &ProductDraft) -> Result<Product> {
        self.client
            .send(Method::PUT, &format!("/products/{id}"), draft, true)
            .await
    }

    /// Returns the server's confirmation message, if it sent one.
    pub async fn delete_product(&self, id: i64) -> Result<Option<String>> {
        let body = self.client.call(Method::DELETE, &format!("/products/{id}"), true).await?;
        Ok(message_of(body))
    }

    // --- Reviews ---

    pub async fn product_reviews(&self, product_id: i64, page: u32, size: u32) -> Result<Page<Review>> {
        self.client
            .get(&format!("/reviews/product/{product_id}?page={page}&size={size}"), false)
            .await
    }

    pub async fn recent_reviews(&self, page: u32, size: u32) -> Result<Page<Review>> {
        self.client
            .get(&format!("/reviews/recent?page={page}&size={size}"), false)
            .await
    }

    /// `None` when the product has no reviews yet.
    pub async fn average_rating(&self, product_id: i64) -> Result<Option<Decimal>> {
        self.client
            .get(&format!("/reviews/product/{product_id}/average-rating"), false)
            .await
    }

    pub async fn review_count(&self, product_id: i64) -> Result<i64> {
        let count: Option<i64> = self
            .client
            .get(&format!("/reviews/product/{product_id}/count"), false)
            .await?;
        Ok(count.unwrap_or(0))
    }

    pub async fn create_review(&self, draft: &ReviewDraft) -> Result<Review> {
        self.client.send(Method::POST, "/reviews", draft, true).await
    }

    /// Reviews written by `username`. The backend only serves these to a
    /// logged-in user.
    pub async fn user_reviews(&self, username: &str, page: u32, size: u32) -> Result<Page<Review>> {
        let username: String = form_urlencoded::byte_serialize(username.as_bytes()).collect();
        self.client
            .get(&format!("/reviews/user/{username}?page={page}&size={size}"), true)
            .await
    }

    /// Review count per rating, highest rating first. Ratings nobody gave
    /// are absent.
    pub async fn rating_distribution(&self, product_id: i64) -> Result<Vec<RatingCount>> {
        let mut buckets: Vec<RatingCount> = self
            .client
            .get(&format!("/reviews/product/{product_id}/rating-distribution"), false)
            .await?;
        buckets.sort_by(|a, b| b.rating.cmp(&a.rating));
        Ok(buckets)
    }

    pub async fn update_review(&self, id: i64, draft: &ReviewDraft) -> Result<Review> {
        self.client
            .send(Method::PUT, &format!("/reviews/{id}"), draft, true)
            .await
    }

    pub async fn delete_review(&self, id: i64) -> Result<Option<String>> {
        let body = self.client.call(Method::DELETE, &format!("/reviews/{id}"), true).await?;
        Ok(message_of(body))
    }

    // --- Price history ---

    pub async fn price_history(&self, product_id: i64) -> Result<Vec<PriceHistoryEntry>> {
        self.client
            .get(&format!("/price-history/product/{product_id}"), false)
            .await
    }

    pub async fn price_statistics(&self, product_id: i64) -> Result<PriceStatistics> {
        self.client
            .get(&format!("/price-history/product/{product_id}/statistics"), false)
            .await
    }

    /// Statistics between two ISO local date-times (`2024-01-01T00:00:00`).
    pub async fn price_statistics_between(&self, product_id: i64, start: &str, end: &str) -> Result<PriceStatistics> {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("startDate", start)
            .append_pair("endDate", end)
            .finish();
        self.client
            .get(
                &format!("/price-history/product/{product_id}/statistics/period?{query}"),
                false,
            )
            .await
    }
}

fn message_of(body: Option<serde_json::Value>) -> Option<String> {
    body.and_then(|v| serde_json::from_value::<MessageResponse>(v).ok())
        .map(|m| m.message)
}
