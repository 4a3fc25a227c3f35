use colored::Colorize;

use super::{format_indicator, format_price, PageView};

fn kv_line(label: &str, value: &str) -> String {
    format!(":: {:<14}: {}", label, value)
}

pub fn print_products(view: &PageView<'_>) {
    if view.products.is_empty() {
        println!("{}", "no products".bold().yellow());
        return;
    }
    for p in view.products {
        println!(
            "{} {} {} {}",
            format!("${}", format_price(p.price)).bold().green(),
            p.brand_name.bold().cyan(),
            p.name.bold().white(),
            p.date.dimmed()
        );
    }
}

pub fn print_indicators(view: &PageView<'_>) {
    let ind = view.indicators;
    println!(
        "{}",
        "----------------------------------------------------------"
            .bold()
            .white()
    );
    println!("{}", kv_line("Products", &ind.products.to_string()));
    println!("{}", kv_line("Brands", &ind.brands.to_string()));
    println!("{}", kv_line("New products", &ind.recent.to_string()));
    println!("{}", kv_line("p50", &format_indicator(ind.p50)));
    println!("{}", kv_line("p90", &format_indicator(ind.p90)));
    println!("{}", kv_line("p95", &format_indicator(ind.p95)));
    println!(
        "{}",
        kv_line(
            "Last released",
            ind.last_released.as_deref().unwrap_or("-")
        )
    );
    println!(
        "{}",
        "----------------------------------------------------------"
            .bold()
            .white()
    );
}

pub fn print_error(message: &str) {
    eprintln!(
        "{}{}{} {}",
        "[".bold().white(),
        "ERR".bold().red(),
        "]".bold().white(),
        message.bold().white()
    );
}

pub fn print_page(view: &PageView<'_>) {
    if let Some(error) = view.error.as_deref() {
        print_error(error);
    }
    print_products(view);
    print_indicators(view);
}
