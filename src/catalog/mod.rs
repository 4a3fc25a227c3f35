pub mod model;

use std::time::Duration;

use itertools::Itertools;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

use crate::pipeline::{self, Truncation};

pub use model::{
    parse_release_date, Product, QueryParameters, SearchResponse, SortKey, DEFAULT_MAX_PRICE,
    DEFAULT_PAGE_SIZE, REASONABLE_PRICE,
};

pub const DEFAULT_BASE_URL: &str = "https://server-psi-murex.vercel.app";
pub const DEFAULT_LIMIT: u32 = 3000;

#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub base_url: String,
    pub limit: u32,
    pub timeout_seconds: u64,
    pub proxy: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            limit: DEFAULT_LIMIT,
            timeout_seconds: 10,
            proxy: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Clone, Debug)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: Url,
    limit: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BrandsBody {
    List(Vec<String>),
    Wrapped { result: Vec<String> },
}

impl CatalogClient {
    pub fn new(options: ClientOptions) -> Result<Self, CatalogError> {
        let trimmed = options.base_url.trim().trim_end_matches('/');
        let base_url = Url::parse(trimmed).map_err(|_| CatalogError::InvalidBaseUrl {
            url: options.base_url.clone(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidBaseUrl {
                url: options.base_url,
            });
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(concat!(
                "catalog-browser/",
                env!("CARGO_PKG_VERSION")
            )),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(options.timeout_seconds.max(1)));

        if let Some(proxy) = options.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| CatalogError::ProxySetup {
                proxy: proxy.to_string(),
                source: e,
            })?;
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|e| CatalogError::HttpClientBuild { source: e })?;

        Ok(Self {
            http,
            base_url,
            limit: options.limit,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `/products/search?limit=N[&brandName=..][&price=..]`
    pub fn search_url(&self, query: &QueryParameters) -> Url {
        let mut url = self.endpoint(&["products", "search"]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &self.limit.to_string());
            if let Some(brand) = query.brand_filter() {
                pairs.append_pair("brandName", brand);
            }
            if let Some(price) = query.max_price {
                pairs.append_pair("price", &format_price(price));
            }
        }
        url
    }

    pub async fn fetch(&self, query: &QueryParameters) -> Result<SearchResponse, CatalogError> {
        let url = self.search_url(query);
        tracing::debug!(%url, "fetching products");
        self.get_json::<SearchResponse>(url).await
    }

    /// Fetches, sorts the full result, then cuts it down to `query.size`.
    pub async fn fetch_products(
        &self,
        query: &QueryParameters,
        truncation: Truncation,
    ) -> Result<SearchResponse, CatalogError> {
        let mut body = self.fetch(query).await?;
        if let Some(sort) = query.sort {
            pipeline::sort_products(&mut body.result, sort);
        }
        tracing::debug!(
            fetched = body.result.len(),
            size = query.size,
            "applying page size"
        );
        body.result = pipeline::truncate(body.result, query.size, truncation);
        Ok(body)
    }

    pub async fn brands(&self) -> Result<Vec<String>, CatalogError> {
        let url = self.endpoint(&["brands"]);
        tracing::debug!(%url, "fetching brands");
        let body = self.get_json::<BrandsBody>(url).await?;
        let brands = match body {
            BrandsBody::List(list) => list,
            BrandsBody::Wrapped { result } => result,
        };
        Ok(brands
            .into_iter()
            .filter(|b| !b.trim().is_empty())
            .sorted()
            .dedup()
            .collect())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CatalogError::Request {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| CatalogError::Decode {
            url: url.to_string(),
            source: e,
        })
    }
}

fn format_price(price: f64) -> String {
    if price.fract() == 0.0 && price.abs() < 1e15 {
        format!("{}", price as i64)
    } else {
        price.to_string()
    }
}
