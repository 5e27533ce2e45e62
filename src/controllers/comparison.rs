//! Side-by-side comparison of two products from the full listing.

use super::{AppContext, Outcome, StatusMessage};
use crate::compare::{Comparison, ProductIndex};
use crate::error::ClientError;

pub async fn load_index(ctx: &AppContext) -> Outcome<ProductIndex> {
    match ctx.catalog.all_products().await {
        Ok(products) => {
            let index = ProductIndex::build(products);
            let status = StatusMessage::info(format!("{} products available for comparison", index.len()));
            Outcome::done(index, status)
        }
        Err(e) => Outcome::failed_with(e, "Error loading products for comparison."),
    }
}

/// Both ids are required. An id missing from the listing shows as an empty
/// column rather than an error.
pub fn compare(index: &ProductIndex, left: Option<i64>, right: Option<i64>) -> Outcome<Comparison<'_>> {
    let (Some(left), Some(right)) = (left, right) else {
        return Outcome::failed(ClientError::validation("Please select two products to compare."));
    };
    let cmp = index.compare(left, right);
    let status = if cmp.left.is_some() && cmp.right.is_some() {
        StatusMessage::success("Comparison ready.")
    } else {
        StatusMessage::info("One of the selected products was not found.")
    };
    Outcome::done(cmp, status)
}
