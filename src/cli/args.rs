use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "catalog-browser",
    version,
    about = "terminal catalog browser",
    long_about = "catalog-browser fetches the product catalog, applies the page controls (size, brand, sort, price, search) and renders the page with its indicators.\n\nExamples:\n  catalog-browser\n  catalog-browser --brand loom --sort price-desc -o catalog.html\n  catalog-browser --min-price 10 --max-price 80 --search shirt\n  catalog-browser --interactive\n\nTip: Use --config to persist settings and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the rendered page to a file (replaced on every render)."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'A',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format (html, json, text). Inferred from the file extension when omitted."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.catalog-browser/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        short = 'i',
        long = "it",
        visible_alias = "interactive",
        help_heading = "Input",
        help = "Read control changes from stdin (type 'help' at the prompt)."
    )]
    pub interactive: bool,

    #[arg(
        short = 'n',
        long = "sz",
        visible_aliases = ["size", "show"],
        value_name = "N",
        help_heading = "Controls",
        help = "Number of products to show."
    )]
    pub size: Option<usize>,

    #[arg(
        short = 'b',
        long = "br",
        visible_alias = "brand",
        value_name = "NAME",
        help_heading = "Controls",
        help = "Only products of this brand."
    )]
    pub brand: Option<String>,

    #[arg(
        short = 's',
        long = "srt",
        visible_alias = "sort",
        value_name = "KEY",
        help_heading = "Controls",
        help = "Sort order (price-asc, price-desc, date-asc, date-desc)."
    )]
    pub sort: Option<String>,

    #[arg(
        short = 'R',
        long = "rp",
        visible_alias = "reasonable",
        help_heading = "Controls",
        conflicts_with_all = ["min_price", "max_price"],
        help = "Only products at a reasonable price (up to 50)."
    )]
    pub reasonable: bool,

    #[arg(
        long = "min",
        visible_alias = "min-price",
        value_name = "PRICE",
        help_heading = "Controls",
        help = "Lower price bound (default 0)."
    )]
    pub min_price: Option<String>,

    #[arg(
        long = "max",
        visible_alias = "max-price",
        value_name = "PRICE",
        help_heading = "Controls",
        help = "Upper price bound (default 3000)."
    )]
    pub max_price: Option<String>,

    #[arg(
        short = 'q',
        long = "sn",
        visible_alias = "search",
        value_name = "TERM",
        help_heading = "Controls",
        conflicts_with_all = ["reasonable", "min_price", "max_price"],
        help = "Case-insensitive product name search."
    )]
    pub search: Option<String>,

    #[arg(
        short = 'u',
        long = "api",
        visible_alias = "base-url",
        value_name = "URL",
        help_heading = "HTTP",
        help = "Catalog API base URL."
    )]
    pub base_url: Option<String>,

    #[arg(
        long = "lim",
        visible_alias = "limit",
        value_name = "N",
        help_heading = "HTTP",
        help = "Maximum number of products requested from the API (default 3000)."
    )]
    pub limit: Option<u32>,

    #[arg(
        short = 'p',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "HTTP proxy URL (e.g. http://127.0.0.1:8080)."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'w',
        long = "wrk",
        visible_alias = "workers",
        value_name = "N",
        help_heading = "Performance",
        help = "Number of runtime worker threads."
    )]
    pub workers: Option<usize>,

    #[arg(
        short = 'x',
        long = "xt",
        visible_alias = "exact-truncation",
        help_heading = "Controls",
        help = "Keep every product when the result is not larger than the page size."
    )]
    pub exact_truncation: bool,
}
