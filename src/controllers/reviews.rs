//! Product reviews: public listing and rating summary, authenticated posting.

use rust_decimal::Decimal;

use super::{AppContext, Outcome, StatusMessage};
use crate::error::ClientError;
use crate::models::{Page, RatingCount, Review, ReviewDraft};

pub async fn for_product(ctx: &AppContext, product_id: i64, page: u32, size: u32) -> Outcome<Page<Review>> {
    match ctx.catalog.product_reviews(product_id, page, size).await {
        Ok(reviews) => {
            let status = StatusMessage::info(format!("{} reviews", reviews.content.len()));
            Outcome::done(reviews, status)
        }
        Err(e) => Outcome::failed_with(e, "Error loading reviews."),
    }
}

pub async fn recent(ctx: &AppContext, page: u32, size: u32) -> Outcome<Page<Review>> {
    match ctx.catalog.recent_reviews(page, size).await {
        Ok(reviews) => {
            let status = StatusMessage::info(format!("{} recent reviews", reviews.content.len()));
            Outcome::done(reviews, status)
        }
        Err(e) => Outcome::failed_with(e, "Error loading reviews."),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingSummary {
    pub average: Option<Decimal>,
    pub count: i64,
}

pub async fn summary(ctx: &AppContext, product_id: i64) -> Outcome<RatingSummary> {
    let result = async {
        let average = ctx.catalog.average_rating(product_id).await?;
        let count = ctx.catalog.review_count(product_id).await?;
        Ok::<_, ClientError>(RatingSummary { average, count })
    }
    .await;
    Outcome::from_result(result, |s| StatusMessage::info(format!("{} reviews", s.count)))
}

pub async fn distribution(ctx: &AppContext, product_id: i64) -> Outcome<Vec<RatingCount>> {
    Outcome::from_result(ctx.catalog.rating_distribution(product_id).await, |buckets| {
        let total: i64 = buckets.iter().map(|b| b.count).sum();
        StatusMessage::info(format!("{total} ratings"))
    })
}

/// Reviews by `username`, or by the logged-in user when `None`.
pub async fn by_user(ctx: &AppContext, username: Option<&str>, page: u32, size: u32) -> Outcome<Page<Review>> {
    let username = match username.map(str::trim).filter(|u| !u.is_empty()) {
        Some(name) => name.to_string(),
        None => match ctx.session.username() {
            Some(name) => name,
            None => return Outcome::failed(ClientError::AuthRequired),
        },
    };
    match ctx.catalog.user_reviews(&username, page, size).await {
        Ok(reviews) => {
            let status = StatusMessage::info(format!("{} reviews by {username}", reviews.content.len()));
            Outcome::done(reviews, status)
        }
        Err(e) => Outcome::failed(e),
    }
}

fn draft(product_id: i64, rating: u8, comment: Option<&str>) -> ReviewDraft {
    ReviewDraft {
        product_id,
        rating,
        comment: comment
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_owned),
    }
}

/// Post a review as the logged-in user. Requires a session; the rating range
/// is checked by the server.
pub async fn add(ctx: &AppContext, product_id: i64, rating: u8, comment: Option<&str>) -> Outcome<Review> {
    let draft = draft(product_id, rating, comment);
    Outcome::from_result(ctx.catalog.create_review(&draft).await, |_| {
        StatusMessage::success("Review posted!")
    })
}

/// Replace rating and comment of one of the user's reviews.
pub async fn edit(
    ctx: &AppContext,
    review_id: i64,
    product_id: i64,
    rating: u8,
    comment: Option<&str>,
) -> Outcome<Review> {
    let draft = draft(product_id, rating, comment);
    Outcome::from_result(ctx.catalog.update_review(review_id, &draft).await, |_| {
        StatusMessage::success("Review updated!")
    })
}

pub async fn delete(ctx: &AppContext, review_id: i64) -> Outcome<()> {
    match ctx.catalog.delete_review(review_id).await {
        Ok(message) => Outcome::done(
            (),
            StatusMessage::success(message.unwrap_or_else(|| "Review deleted.".to_string())),
        ),
        Err(e) => Outcome::failed(e),
    }
}
