use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::catalog::{Product, SortKey, DEFAULT_MAX_PRICE};

/// How an undersized result is cut down to the requested page size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Truncation {
    /// Drops the last product when the result is not larger than the page size.
    #[default]
    Legacy,
    /// Keeps an undersized result as is.
    Exact,
}

pub fn sort_products(products: &mut [Product], key: SortKey) {
    match key {
        SortKey::PriceAsc => products.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortKey::PriceDesc => products.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortKey::DateAsc => products.sort_by(compare_release),
        SortKey::DateDesc => products.sort_by(|a, b| compare_release(b, a)),
    }
}

// Products without a parseable date sort as the oldest.
fn compare_release(a: &Product, b: &Product) -> Ordering {
    match (a.released_at(), b.released_at()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn truncate(mut products: Vec<Product>, size: usize, mode: Truncation) -> Vec<Product> {
    if products.len() > size {
        products.truncate(size);
        return products;
    }
    if mode == Truncation::Legacy {
        if let Some(dropped) = products.pop() {
            tracing::warn!(
                product = %dropped.name,
                remaining = products.len(),
                size,
                "undersized result: dropping last product (use exact truncation to keep it)"
            );
        }
    }
    products
}

/// Bounds typed by the user; blank or unparseable input falls back to 0 and 3000.
pub fn parse_price_bounds(min: Option<&str>, max: Option<&str>) -> (f64, f64) {
    let parse = |raw: Option<&str>| {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite())
    };
    (
        parse(min).unwrap_or(0.0),
        parse(max).unwrap_or(DEFAULT_MAX_PRICE),
    )
}

pub fn filter_price_range(products: Vec<Product>, min: f64, max: f64) -> Vec<Product> {
    products
        .into_iter()
        .filter(|p| p.price >= min && p.price <= max)
        .collect()
}

pub fn filter_name(products: Vec<Product>, term: &str) -> Vec<Product> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return products;
    }
    products
        .into_iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect()
}

/// Client-side filter run on an already fetched page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum PostFilter {
    PriceRange { min: f64, max: f64 },
    Name(String),
}

impl PostFilter {
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        match self {
            PostFilter::PriceRange { min, max } => filter_price_range(products, *min, *max),
            PostFilter::Name(term) => filter_name(products, term),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(name: &str, price: f64, date: &str) -> Product {
        Product {
            name: name.to_string(),
            brand_name: "b".to_string(),
            price,
            date: date.to_string(),
            ..Product::default()
        }
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn price_asc_is_non_decreasing() {
        let mut v = vec![
            priced("a", 30.0, ""),
            priced("b", 10.0, ""),
            priced("c", 20.0, ""),
            priced("d", 10.0, ""),
        ];
        sort_products(&mut v, SortKey::PriceAsc);
        assert!(v.windows(2).all(|w| w[0].price <= w[1].price));
        assert_eq!(names(&v), vec!["b", "d", "c", "a"]);
    }

    #[test]
    fn price_desc_is_non_increasing() {
        let mut v = vec![priced("a", 1.0, ""), priced("b", 3.0, ""), priced("c", 2.0, "")];
        sort_products(&mut v, SortKey::PriceDesc);
        assert_eq!(names(&v), vec!["b", "c", "a"]);
    }

    #[test]
    fn date_sorts_follow_their_labels() {
        let mut v = vec![
            priced("mid", 1.0, "2024-02-01"),
            priced("old", 1.0, "2023-01-01"),
            priced("undated", 1.0, "soon"),
            priced("new", 1.0, "2025-03-01T08:00:00Z"),
        ];
        sort_products(&mut v, SortKey::DateDesc);
        assert_eq!(names(&v), vec!["new", "mid", "old", "undated"]);
        sort_products(&mut v, SortKey::DateAsc);
        assert_eq!(names(&v), vec!["undated", "old", "mid", "new"]);
    }

    #[test]
    fn truncate_keeps_first_size_items() {
        let v: Vec<_> = (0..5).map(|i| priced(&i.to_string(), i as f64, "")).collect();
        let out = truncate(v, 2, Truncation::Legacy);
        assert_eq!(names(&out), vec!["0", "1"]);
    }

    #[test]
    fn legacy_truncate_drops_last_of_undersized_result() {
        let v: Vec<_> = (0..5).map(|i| priced(&i.to_string(), i as f64, "")).collect();
        let out = truncate(v, 10, Truncation::Legacy);
        assert_eq!(out.len(), 4);
        assert_eq!(out.last().unwrap().name, "3");
    }

    #[test]
    fn legacy_truncate_drops_last_when_exactly_size() {
        let v: Vec<_> = (0..3).map(|i| priced(&i.to_string(), i as f64, "")).collect();
        assert_eq!(truncate(v, 3, Truncation::Legacy).len(), 2);
    }

    #[test]
    fn exact_truncate_keeps_undersized_result() {
        let v: Vec<_> = (0..5).map(|i| priced(&i.to_string(), i as f64, "")).collect();
        assert_eq!(truncate(v, 10, Truncation::Exact).len(), 5);
        assert!(truncate(Vec::new(), 10, Truncation::Legacy).is_empty());
    }

    #[test]
    fn name_filter_is_case_insensitive() {
        let v = vec![priced("Red Shirt", 1.0, ""), priced("Blue Pants", 1.0, "")];
        assert_eq!(names(&filter_name(v.clone(), "shirt")), vec!["Red Shirt"]);
        assert_eq!(names(&filter_name(v.clone(), "  SHIRT ")), vec!["Red Shirt"]);
        assert_eq!(filter_name(v, "").len(), 2);
    }

    #[test]
    fn price_range_is_inclusive() {
        let v = vec![
            priced("a", 10.0, ""),
            priced("b", 20.0, ""),
            priced("c", 30.0, ""),
        ];
        assert_eq!(names(&filter_price_range(v, 10.0, 20.0)), vec!["a", "b"]);
    }

    #[test]
    fn price_bounds_fall_back_to_defaults() {
        assert_eq!(parse_price_bounds(None, None), (0.0, 3000.0));
        assert_eq!(parse_price_bounds(Some("abc"), Some(" 80 ")), (0.0, 80.0));
        assert_eq!(parse_price_bounds(Some("15"), Some("")), (15.0, 3000.0));
    }
}
