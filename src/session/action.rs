use serde::Serialize;

use crate::catalog::{QueryParameters, SortKey, DEFAULT_PAGE_SIZE, REASONABLE_PRICE};
use crate::pipeline::PostFilter;

/// Current values of the page controls (page size, brand, sort).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Controls {
    pub size: usize,
    pub brand: Option<String>,
    pub sort: Option<SortKey>,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            size: DEFAULT_PAGE_SIZE,
            brand: None,
            sort: None,
        }
    }
}

/// A user interaction. Every action triggers a fresh fetch.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Refresh,
    Show(usize),
    Brand(Option<String>),
    Sort(Option<SortKey>),
    ReasonablePrice,
    PriceRange { min: f64, max: f64 },
    Search(String),
}

impl Action {
    pub fn apply(&self, controls: &mut Controls) {
        match self {
            Action::Show(size) => controls.size = *size,
            Action::Brand(brand) => {
                controls.brand = brand
                    .as_deref()
                    .map(str::trim)
                    .filter(|b| !b.is_empty())
                    .map(str::to_string)
            }
            Action::Sort(sort) => controls.sort = *sort,
            Action::Refresh
            | Action::ReasonablePrice
            | Action::PriceRange { .. }
            | Action::Search(_) => {}
        }
    }

    pub fn query(&self, controls: &Controls) -> QueryParameters {
        let max_price = match self {
            Action::ReasonablePrice => Some(REASONABLE_PRICE),
            Action::PriceRange { max, .. } => Some(*max),
            Action::Refresh
            | Action::Show(_)
            | Action::Brand(_)
            | Action::Sort(_)
            | Action::Search(_) => None,
        };
        QueryParameters {
            size: controls.size,
            brand: controls.brand.clone(),
            sort: controls.sort,
            max_price,
        }
    }

    pub fn post_filter(&self) -> Option<PostFilter> {
        match self {
            Action::PriceRange { min, max } => Some(PostFilter::PriceRange {
                min: *min,
                max: *max,
            }),
            Action::Search(term) => Some(PostFilter::Name(term.trim().to_string())),
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Action::Refresh => "refresh".to_string(),
            Action::Show(size) => format!("show {size}"),
            Action::Brand(brand) => format!("brand {}", brand.as_deref().unwrap_or("all")),
            Action::Sort(sort) => format!("sort {}", sort.map(|s| s.as_str()).unwrap_or("none")),
            Action::ReasonablePrice => "reasonable price".to_string(),
            Action::PriceRange { min, max } => format!("price {min}-{max}"),
            Action::Search(term) => format!("search '{}'", term.trim()),
        }
    }
}
