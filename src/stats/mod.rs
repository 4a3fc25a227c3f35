use std::collections::HashSet;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::catalog::Product;

pub const RECENT_WINDOW_DAYS: i64 = 7;

/// Aggregate values shown next to the product list.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Indicators {
    pub products: usize,
    pub brands: usize,
    pub recent: usize,
    pub p50: Option<f64>,
    pub p90: Option<f64>,
    pub p95: Option<f64>,
    pub last_released: Option<String>,
}

impl Indicators {
    pub fn compute(products: &[Product], now: NaiveDateTime) -> Self {
        Self {
            products: product_count(products),
            brands: brand_count(products),
            recent: recent_count(products, now),
            p50: p50(products),
            p90: p90(products),
            p95: p95(products),
            last_released: last_released(products),
        }
    }
}

pub fn product_count(products: &[Product]) -> usize {
    products.iter().collect::<HashSet<_>>().len()
}

pub fn brand_count(products: &[Product]) -> usize {
    products
        .iter()
        .map(|p| p.brand_name.as_str())
        .collect::<HashSet<_>>()
        .len()
}

pub fn recent_count(products: &[Product], now: NaiveDateTime) -> usize {
    let threshold = now - Duration::days(RECENT_WINDOW_DAYS);
    products
        .iter()
        .filter_map(Product::released_at)
        .filter(|released| *released > threshold)
        .count()
}

/// Price at rank `ceil(p/100 * n) - 1` of the ascending price list.
pub fn percentile(products: &[Product], p: f64) -> Option<f64> {
    if products.is_empty() {
        return None;
    }
    let mut prices: Vec<f64> = products.iter().map(|product| product.price).collect();
    prices.sort_by(f64::total_cmp);
    let rank = ((p / 100.0) * prices.len() as f64).ceil() as usize;
    let index = rank.saturating_sub(1).min(prices.len() - 1);
    prices.get(index).copied()
}

pub fn p50(products: &[Product]) -> Option<f64> {
    percentile(products, 50.0)
}

pub fn p90(products: &[Product]) -> Option<f64> {
    percentile(products, 90.0)
}

pub fn p95(products: &[Product]) -> Option<f64> {
    percentile(products, 95.0)
}

pub fn last_released(products: &[Product]) -> Option<String> {
    products
        .iter()
        .filter_map(|p| p.released_at().map(|at| (at, p)))
        .max_by_key(|(at, _)| *at)
        .map(|(_, p)| p.date.clone())
}
