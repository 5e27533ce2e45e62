//! Price history and min/max/avg statistics for a product.

use chrono::NaiveDateTime;

use super::{AppContext, Outcome, StatusMessage};
use crate::error::ClientError;
use crate::models::{PriceHistoryEntry, PriceStatistics};

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub async fn history(ctx: &AppContext, product_id: i64) -> Outcome<Vec<PriceHistoryEntry>> {
    match ctx.catalog.price_history(product_id).await {
        Ok(entries) => {
            let status = StatusMessage::info(format!("{} price records", entries.len()));
            Outcome::done(entries, status)
        }
        Err(e) => Outcome::failed_with(e, "Error loading price history."),
    }
}

/// Statistics over all time, or between `start` and `end` when both are
/// given. Each bound accepts `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`.
pub async fn statistics(
    ctx: &AppContext,
    product_id: i64,
    start: Option<&str>,
    end: Option<&str>,
) -> Outcome<PriceStatistics> {
    let result = match (start, end) {
        (None, None) => ctx.catalog.price_statistics(product_id).await,
        (Some(start), Some(end)) => match (parse_bound(start, false), parse_bound(end, true)) {
            (Some(start), Some(end)) => {
                let (start, end) = (
                    start.format(DATE_TIME_FORMAT).to_string(),
                    end.format(DATE_TIME_FORMAT).to_string(),
                );
                ctx.catalog.price_statistics_between(product_id, &start, &end).await
            }
            _ => Err(ClientError::validation(
                "Dates must look like 2024-01-31 or 2024-01-31T12:00:00.",
            )),
        },
        _ => Err(ClientError::validation("Both start and end dates are required.")),
    };
    Outcome::from_result(result, |_| StatusMessage::info("Price statistics"))
}

/// Parse a period bound. A bare date means start of day, or end of day when
/// `end_of_day` is set.
fn parse_bound(raw: &str, end_of_day: bool) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT) {
        return Some(dt);
    }
    let date = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    }
}
