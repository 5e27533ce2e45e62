//! Plain-text rendering of catalog data for the terminal.

use std::fmt::Write;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::compare::Comparison;
use crate::models::{PriceHistoryEntry, PriceStatistics, Product, RatingCount, Review};

const NONE: &str = "N/A";

// Decimal's precision formatting truncates; halves round away from zero.
fn fixed(value: Decimal, places: u32) -> String {
    let rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", places as usize, rounded)
}

pub fn price(value: Decimal) -> String {
    format!("R$ {}", fixed(value, 2))
}

pub fn rating(value: Option<Decimal>) -> String {
    value.map(|r| fixed(r, 1)).unwrap_or_else(|| NONE.to_string())
}

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        NONE
    } else {
        value
    }
}

fn opt_or<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    value.as_deref().filter(|v| !v.trim().is_empty()).unwrap_or(fallback)
}

/// Storefront card.
pub fn product_card(p: &Product) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {}", p.id, p.name);
    let _ = writeln!(out, "  Brand:    {}", or_na(&p.brand));
    let _ = writeln!(out, "  Category: {}", or_na(&p.category));
    let _ = writeln!(out, "  Store:    {}", or_na(&p.store));
    let _ = writeln!(out, "  Eco label: {}", opt_or(&p.eco_label, "None"));
    let _ = writeln!(out, "  Rating:   {}", rating(p.average_rating));
    let _ = writeln!(out, "  Price:    {}", price(p.current_price));
    let _ = write!(out, "  Link:     {}", or_na(&p.product_url));
    out
}

pub fn product_list(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products found.".to_string();
    }
    products.iter().map(product_card).collect::<Vec<_>>().join("\n\n")
}

/// Full details, used by `product` and by each comparison column.
pub fn product_details(p: &Product) -> String {
    let mut out = product_card(p);
    let _ = write!(out, "\n  Description: {}", or_na(&p.description));
    let _ = write!(
        out,
        "\n  Sustainability: {}",
        opt_or(&p.sustainability_info, NONE)
    );
    if let Some(count) = p.review_count {
        let _ = write!(out, "\n  Reviews:  {count}");
    }
    out
}

pub fn comparison(cmp: &Comparison<'_>) -> String {
    let side = |p: Option<&Product>| p.map(product_details).unwrap_or_else(|| "No product selected.".to_string());
    format!("== Product 1 ==\n{}\n\n== Product 2 ==\n{}", side(cmp.left), side(cmp.right))
}

/// Admin table: id, name, price, brand, category.
pub fn admin_table(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products found.".to_string();
    }
    let mut out = format!("{:>6}  {:<32}  {:>12}  {:<16}  {:<16}", "ID", "NAME", "PRICE", "BRAND", "CATEGORY");
    for p in products {
        let _ = write!(
            out,
            "\n{:>6}  {:<32}  {:>12}  {:<16}  {:<16}",
            p.id,
            truncate(&p.name, 32),
            price(p.current_price),
            truncate(&p.brand, 16),
            truncate(&p.category, 16)
        );
    }
    out
}

pub fn facet(label: &str, values: &[String]) -> String {
    if values.is_empty() {
        format!("{label}: (none)")
    } else {
        format!("{label}: {}", values.join(", "))
    }
}

pub fn reviews(reviews: &[Review]) -> String {
    if reviews.is_empty() {
        return "No reviews yet.".to_string();
    }
    reviews
        .iter()
        .map(|r| {
            let stars = "*".repeat(r.rating.min(5) as usize);
            let who = r.username.as_deref().unwrap_or("anonymous");
            let when = r.created_at.map(|t| t.format("%Y-%m-%d").to_string()).unwrap_or_default();
            let mut line = format!("#{} [{stars:<5}] {who} {when}", r.id);
            if let Some(comment) = r.comment.as_deref().filter(|c| !c.trim().is_empty()) {
                let _ = write!(line, "\n    {comment}");
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One bar per rating, scaled to the most common one.
pub fn rating_distribution(buckets: &[RatingCount]) -> String {
    const WIDTH: i64 = 20;
    let max = buckets.iter().map(|b| b.count).max().unwrap_or(0);
    if max <= 0 {
        return "No ratings yet.".to_string();
    }
    buckets
        .iter()
        .map(|b| {
            let bar = "#".repeat((b.count.max(0) * WIDTH / max) as usize);
            format!("{} stars  {bar:<20} {}", b.rating, b.count)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn price_history(entries: &[PriceHistoryEntry]) -> String {
    if entries.is_empty() {
        return "No price history recorded.".to_string();
    }
    entries
        .iter()
        .map(|e| {
            let when = e
                .recorded_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| NONE.to_string());
            format!("{when}  {:>12}  {}", price(e.price), opt_or(&e.store, ""))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn price_statistics(stats: &PriceStatistics) -> String {
    let fmt = |v: Option<Decimal>| v.map(price).unwrap_or_else(|| NONE.to_string());
    let mut out = String::new();
    if let Some(name) = &stats.product_name {
        let _ = writeln!(out, "{name}");
    }
    let _ = write!(
        out,
        "min {}  max {}  avg {}",
        fmt(stats.min_price),
        fmt(stats.max_price),
        fmt(stats.avg_price)
    );
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
        t.push('~');
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_price_and_rating_format() {
        assert_eq!(price(Decimal::from_str("12.5").unwrap()), "R$ 12.50");
        assert_eq!(rating(Some(Decimal::from_str("4.26").unwrap())), "4.3");
        assert_eq!(rating(None), "N/A");
    }

    #[test]
    fn test_price_and_rating_round_instead_of_truncating() {
        assert_eq!(price(Decimal::from_str("12.999").unwrap()), "R$ 13.00");
        assert_eq!(price(Decimal::from_str("7.005").unwrap()), "R$ 7.01");
        assert_eq!(price(Decimal::from_str("3.004").unwrap()), "R$ 3.00");
        assert_eq!(price(Decimal::from(5)), "R$ 5.00");
        assert_eq!(rating(Some(Decimal::from_str("4.25").unwrap())), "4.3");
        assert_eq!(rating(Some(Decimal::from_str("4.96").unwrap())), "5.0");
        assert_eq!(rating(Some(Decimal::from_str("3.04").unwrap())), "3.0");
    }

    #[test]
    fn test_rating_distribution_bars() {
        let buckets = [RatingCount { rating: 5, count: 4 }, RatingCount { rating: 3, count: 2 }];
        let text = rating_distribution(&buckets);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], format!("5 stars  {:<20} 4", "#".repeat(20)));
        assert_eq!(lines[1], format!("3 stars  {:<20} 2", "#".repeat(10)));
        assert_eq!(rating_distribution(&[]), "No ratings yet.");
    }

    #[test]
    fn test_card_fills_missing_fields() {
        let p: Product = serde_json::from_value(serde_json::json!({
            "id": 1, "name": "Soap", "currentPrice": 3, "store": "EcoShop"
        }))
        .unwrap();
        let card = product_card(&p);
        assert!(card.contains("Brand:    N/A"));
        assert!(card.contains("Eco label: None"));
        assert!(card.contains("Store:    EcoShop"));
        assert!(card.contains("R$ 3.00"));
    }

    #[test]
    fn test_truncate_marks_cut() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd~");
    }
}
