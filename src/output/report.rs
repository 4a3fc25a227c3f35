use crate::catalog::Product;
use crate::stats::Indicators;

use super::{format_indicator, format_price, PageView};

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn product_card(product: &Product) -> String {
    let name = escape_html(&product.name);
    format!(
        r#"
      <div class="product rounded-2xl border border-slate-200 bg-white p-5 shadow-sm">
        <div class="product-img">
          <img src="{img}" alt="{name}" width="200" height="200">
        </div>
        <div class="product-info mt-4 flex flex-col gap-1">
          <div class="product-brand text-xs font-bold uppercase text-slate-500">{brand}</div>
          <div class="product-name text-sm font-semibold"><a class="text-primary hover:underline" href="{link}" target="_blank" rel="noreferrer">{name}</a></div>
          <div class="product-price text-sm font-bold">${price}</div>
        </div>
      </div>"#,
        img = escape_html(&product.img),
        brand = escape_html(&product.brand_name),
        link = escape_html(&product.link),
        name = name,
        price = format_price(product.price),
    )
}

/// Contents of the `#products` container: one card per product.
pub fn render_products_fragment(products: &[Product]) -> String {
    let cards: String = products.iter().map(product_card).collect();
    format!(r#"<div class="grid grid-cols-1 md:grid-cols-2 xl:grid-cols-4 gap-5">{cards}</div>"#)
}

fn indicator(id: &str, label: &str, value: &str) -> String {
    format!(
        r#"
        <div class="flex flex-col gap-1">
          <span class="text-[11px] font-bold uppercase tracking-widest text-slate-500">{label}</span>
          <span id="{id}" class="text-xl font-bold">{value}</span>
        </div>"#,
        value = escape_html(value),
    )
}

pub fn render_indicators_fragment(ind: &Indicators) -> String {
    let mut out = String::new();
    out.push_str(&indicator("nbProducts", "Products", &ind.products.to_string()));
    out.push_str(&indicator("nbBrands", "Brands", &ind.brands.to_string()));
    out.push_str(&indicator("newProducts", "New products", &ind.recent.to_string()));
    out.push_str(&indicator("p50", "p50 price", &format_indicator(ind.p50)));
    out.push_str(&indicator("p90", "p90 price", &format_indicator(ind.p90)));
    out.push_str(&indicator("p95", "p95 price", &format_indicator(ind.p95)));
    out.push_str(&indicator(
        "lastReleased",
        "Last released",
        ind.last_released.as_deref().unwrap_or("-"),
    ));
    out
}

pub fn render_page(view: &PageView<'_>) -> String {
    let controls = view.controls;
    let brand = controls.brand.as_deref().unwrap_or("all");
    let sort = controls.sort.map(|s| s.as_str()).unwrap_or("none");
    let error_banner = match view.error.as_deref() {
        Some(message) => format!(
            r#"
      <div id="error" class="bg-rose-50 border border-rose-200 rounded-2xl p-5 mb-8 text-rose-800 font-bold">{}</div>"#,
            escape_html(message)
        ),
        None => String::new(),
    };

    format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>Catalog</title>
  <script src="https://cdn.tailwindcss.com?plugins=forms,container-queries"></script>
  <script id="tailwind-config">
    tailwind.config = {{
      theme: {{
        extend: {{
          colors: {{
            "primary": "#135bec",
            "background-light": "#f8fafc"
          }}
        }}
      }}
    }};
  </script>
</head>
<body class="bg-background-light text-slate-900 min-h-screen">
  <main class="max-w-[1440px] mx-auto w-full px-8 py-10">
    <div class="flex flex-col md:flex-row justify-between items-start md:items-end mb-10 gap-4">
      <h1 class="text-5xl font-extrabold">CATALOG</h1>
      <p id="controls" class="text-slate-500 text-base font-medium">show {size} &middot; brand {brand} &middot; sort {sort}</p>
    </div>{error_banner}
    <div id="indicators" class="bg-white rounded-2xl border border-slate-200 p-5 mb-8 shadow-sm flex flex-wrap gap-8">{indicators}
    </div>
    <section id="products">{products}</section>
  </main>
</body>
</html>
"####,
        size = controls.size,
        brand = escape_html(brand),
        sort = sort,
        error_banner = error_banner,
        indicators = render_indicators_fragment(view.indicators),
        products = render_products_fragment(view.products),
    )
}
