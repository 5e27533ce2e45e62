//! Storefront listing, filter facets and product details.
//!
//! A [`ListingView`] holds what is currently shown. By default a response is
//! applied as soon as it resolves, so with two searches in flight the one
//! that answers last is what stays on screen, even if it was issued first.
//! [`ListingView::sequenced`] opts into dropping responses older than the
//! latest issued request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use futures::future::join_all;
use tracing::{debug, warn};

use super::{AppContext, Outcome, StatusMessage};
use crate::catalog::Facet;
use crate::models::{Page, Product};
use crate::query::FilterCriteria;

/// Monotonic request tickets for one query surface.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    /// Issue the next ticket; tickets start at 1.
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        ticket >= self.latest.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
struct Shown {
    products: Vec<Product>,
    total_pages: Option<u32>,
}

#[derive(Debug, Default)]
pub struct ListingView {
    shown: Mutex<Shown>,
    sequencer: Option<RequestSequencer>,
}

impl ListingView {
    /// Last-resolved-wins view.
    pub fn new() -> Self {
        Self::default()
    }

    /// View that ignores responses superseded by a newer request.
    pub fn sequenced() -> Self {
        Self {
            shown: Mutex::default(),
            sequencer: Some(RequestSequencer::default()),
        }
    }

    /// Fetch a page for `criteria` and show it, unless a sequenced view has
    /// issued a newer request meanwhile. Returns the number of products
    /// fetched.
    pub async fn refresh(&self, ctx: &AppContext, criteria: &FilterCriteria) -> Outcome<usize> {
        let ticket = self.sequencer.as_ref().map(RequestSequencer::issue);

        let page = match ctx.catalog.list_products(criteria).await {
            Ok(page) => page,
            Err(e) => return Outcome::failed_with(e, "Error loading products."),
        };
        let count = page.content.len();

        if let (Some(seq), Some(ticket)) = (&self.sequencer, ticket) {
            if !seq.is_current(ticket) {
                debug!(ticket, "Discarding stale listing response");
                return Outcome::done(count, StatusMessage::info("Newer results pending."));
            }
        }
        self.apply(page);
        Outcome::done(count, StatusMessage::info(format!("{count} products")))
    }

    fn apply(&self, page: Page<Product>) {
        let mut shown = self.shown.lock().unwrap_or_else(|e| e.into_inner());
        shown.products = page.content;
        shown.total_pages = page.total_pages;
    }

    pub fn products(&self) -> Vec<Product> {
        self.shown.lock().unwrap_or_else(|e| e.into_inner()).products.clone()
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.shown.lock().unwrap_or_else(|e| e.into_inner()).total_pages
    }
}

/// Filter choices per facet, fetched concurrently. A facet that fails to
/// load is left empty and only logged; it never turns the listing into an
/// error.
pub async fn load_facets(ctx: &AppContext) -> Vec<(Facet, Vec<String>)> {
    let fetches = Facet::ALL.map(|facet| async move {
        let values = ctx.catalog.facet(facet).await.unwrap_or_else(|e| {
            warn!("Error loading {} filter options: {e}", facet.label());
            Vec::new()
        });
        (facet, values)
    });
    join_all(fetches).await
}

/// One storefront page: fetch products, then refresh facet choices.
pub async fn browse(ctx: &AppContext, criteria: &FilterCriteria) -> Outcome<(Page<Product>, Vec<(Facet, Vec<String>)>)> {
    let page = match ctx.catalog.list_products(criteria).await {
        Ok(page) => page,
        Err(e) => return Outcome::failed_with(e, "Error loading products."),
    };
    let facets = load_facets(ctx).await;
    let status = if page.content.is_empty() {
        StatusMessage::info("No products found.")
    } else {
        StatusMessage::info(format!("{} products", page.content.len()))
    };
    Outcome::done((page, facets), status)
}

pub async fn product_details(ctx: &AppContext, id: i64) -> Outcome<Product> {
    Outcome::from_result(ctx.catalog.get_product(id).await, |p| {
        StatusMessage::info(format!("Product #{}", p.id))
    })
}
