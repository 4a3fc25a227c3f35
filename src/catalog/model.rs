use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 12;
pub const DEFAULT_MAX_PRICE: f64 = 3000.0;
pub const REASONABLE_PRICE: f64 = 50.0;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub img: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub date: String,
}

impl Product {
    /// Release date parsed from the raw API string, `None` when it is not a
    /// recognizable ISO date.
    pub fn released_at(&self) -> Option<NaiveDateTime> {
        parse_release_date(&self.date)
    }
}

// Structural identity: every field, price by bit pattern.
impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.brand_name == other.brand_name
            && self.price.to_bits() == other.price.to_bits()
            && self.img == other.img
            && self.link == other.link
            && self.date == other.date
    }
}

impl Eq for Product {}

impl Hash for Product {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.brand_name.hash(state);
        self.price.to_bits().hash(state);
        self.img.hash(state);
        self.link.hash(state);
        self.date.hash(state);
    }
}

pub fn parse_release_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub result: Vec<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    #[serde(rename = "price-asc")]
    PriceAsc,
    #[serde(rename = "price-desc")]
    PriceDesc,
    #[serde(rename = "date-asc")]
    DateAsc,
    #[serde(rename = "date-desc")]
    DateDesc,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::DateAsc => "date-asc",
            SortKey::DateDesc => "date-desc",
        }
    }

    /// Parses an optional control value. Blank means "no sort".
    pub fn parse_optional(value: &str) -> Result<Option<Self>, String> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        value.parse().map(Some)
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "price-asc" => Ok(SortKey::PriceAsc),
            "price-desc" => Ok(SortKey::PriceDesc),
            "date-asc" => Ok(SortKey::DateAsc),
            "date-desc" => Ok(SortKey::DateDesc),
            other => Err(format!(
                "unknown sort '{other}', expected price-asc, price-desc, date-asc or date-desc"
            )),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryParameters {
    pub size: usize,
    pub brand: Option<String>,
    pub sort: Option<SortKey>,
    pub max_price: Option<f64>,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            size: DEFAULT_PAGE_SIZE,
            brand: None,
            sort: None,
            max_price: None,
        }
    }
}

impl QueryParameters {
    /// Brand filter to send, ignoring blank selector values.
    pub fn brand_filter(&self) -> Option<&str> {
        self.brand
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_deserializes_camel_case_fields() {
        let raw = r#"{"name":"Red Shirt","brandName":"Nike","price":19.5,"img":"https://i/1.jpg","link":"https://l/1","date":"2026-10-01"}"#;
        let p: Product = serde_json::from_str(raw).unwrap();
        assert_eq!(p.brand_name, "Nike");
        assert_eq!(p.price, 19.5);
        assert!(p.released_at().is_some());
    }

    #[test]
    fn missing_fields_default() {
        let p: Product = serde_json::from_str(r#"{"name":"x","price":3}"#).unwrap();
        assert_eq!(p.img, "");
        assert_eq!(p.date, "");
        assert!(p.released_at().is_none());
    }

    #[test]
    fn release_date_formats() {
        assert!(parse_release_date("2024-05-01T10:11:12.000Z").is_some());
        assert!(parse_release_date("2024-05-01T10:11:12").is_some());
        assert!(parse_release_date("2024-05-01").is_some());
        assert!(parse_release_date("not a date").is_none());
    }

    #[test]
    fn sort_key_parses_and_rejects() {
        assert_eq!("price-desc".parse::<SortKey>().unwrap(), SortKey::PriceDesc);
        assert_eq!(SortKey::parse_optional("  ").unwrap(), None);
        assert!("name-asc".parse::<SortKey>().is_err());
    }

    #[test]
    fn response_accepts_meta_or_count() {
        let a: SearchResponse =
            serde_json::from_str(r#"{"result":[],"meta":{"currentPage":1}}"#).unwrap();
        assert!(a.meta.is_some());
        let b: SearchResponse = serde_json::from_str(r#"{"result":[],"count":0}"#).unwrap();
        assert_eq!(b.count, Some(0));
    }
}
