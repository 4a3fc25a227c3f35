pub mod report;
pub mod terminal;

use serde::Serialize;
use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::catalog::Product;
use crate::session::Controls;
use crate::stats::Indicators;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to open output file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize page: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}

/// Everything one render needs: the page, its indicators and the controls
/// that produced it.
#[derive(Clone, Debug, Serialize)]
pub struct PageView<'a> {
    pub controls: &'a Controls,
    pub products: &'a [Product],
    pub indicators: &'a Indicators,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn format_price(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

pub fn format_indicator(value: Option<f64>) -> String {
    value.map(format_price).unwrap_or_else(|| "-".to_string())
}

pub fn render_text(view: &PageView<'_>) -> Vec<u8> {
    let mut out = String::new();
    if let Some(error) = view.error.as_deref() {
        out.push_str(&format!("error: {error}\n"));
    }
    for p in view.products {
        out.push_str(&format!(
            "{} | {} | ${} | {} | {}\n",
            p.brand_name,
            p.name,
            format_price(p.price),
            p.date,
            p.link
        ));
    }
    let ind = view.indicators;
    out.push_str(&format!("products: {}\n", ind.products));
    out.push_str(&format!("brands: {}\n", ind.brands));
    out.push_str(&format!("new products: {}\n", ind.recent));
    out.push_str(&format!("p50: {}\n", format_indicator(ind.p50)));
    out.push_str(&format!("p90: {}\n", format_indicator(ind.p90)));
    out.push_str(&format!("p95: {}\n", format_indicator(ind.p95)));
    out.push_str(&format!(
        "last released: {}\n",
        ind.last_released.as_deref().unwrap_or("-")
    ));
    out.into_bytes()
}

pub fn render_json(view: &PageView<'_>) -> Result<Vec<u8>, OutputError> {
    let mut out =
        serde_json::to_vec_pretty(view).map_err(|e| OutputError::Serialize { source: e })?;
    out.push(b'\n');
    Ok(out)
}

pub fn render_html(view: &PageView<'_>) -> Vec<u8> {
    report::render_page(view).into_bytes()
}

pub fn render(view: &PageView<'_>, format: OutputFormat) -> Result<Vec<u8>, OutputError> {
    match format {
        OutputFormat::Text => Ok(render_text(view)),
        OutputFormat::Json => render_json(view),
        OutputFormat::Html => Ok(render_html(view)),
    }
}

/// Replaces the whole file; nothing from an earlier render survives.
pub async fn write_output(path: &str, rendered: &[u8]) -> Result<(), OutputError> {
    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(|e| OutputError::Open {
            path: path.to_string(),
            source: e,
        })?;
    outfile
        .write_all(rendered)
        .await
        .map_err(|e| OutputError::Write {
            path: path.to_string(),
            source: e,
        })?;
    outfile.flush().await.map_err(|e| OutputError::Write {
        path: path.to_string(),
        source: e,
    })
}
