use std::path::PathBuf;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::task::JoinHandle;

use crate::catalog::{CatalogClient, ClientOptions, SortKey, DEFAULT_BASE_URL, DEFAULT_LIMIT};
use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::output::{self, terminal, OutputFormat, PageView};
use crate::pipeline::{self, Truncation};
use crate::session::command::{self, Command};
use crate::session::{Action, AppState, Controls, Outcome, Session};

fn print_banner() {
    const BANNER: &str = r#"
   ___      _        _
  / __\__ _| |_ __ _| | ___   __ _
 / /  / _` | __/ _` | |/ _ \ / _` |
/ /__| (_| | || (_| | | (_) | (_| |
\____/\__,_|\__\__,_|_|\___/ \__, |
                             |___/
        catalog browser
    "#;
    println!("{}", BANNER.bold().cyan());
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

#[derive(Clone, Debug)]
struct RunConfig {
    client: ClientOptions,
    workers: usize,
    controls: Controls,
    initial: Action,
    interactive: bool,
    output: Option<String>,
    output_format: OutputFormat,
    truncation: Truncation,
    no_color: bool,
    verbose: u8,
}

fn initial_action(args: &CliArgs) -> Action {
    if let Some(term) = args.search.as_ref() {
        return Action::Search(term.clone());
    }
    if args.min_price.is_some() || args.max_price.is_some() {
        let (min, max) =
            pipeline::parse_price_bounds(args.min_price.as_deref(), args.max_price.as_deref());
        return Action::PriceRange { min, max };
    }
    if args.reasonable {
        return Action::ReasonablePrice;
    }
    Action::Refresh
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);
    let initial = initial_action(&args);

    let base_url = args
        .base_url
        .or(cfg.base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let limit = args.limit.or(cfg.limit).unwrap_or(DEFAULT_LIMIT);
    if limit == 0 {
        return Err("invalid limit, expected positive integer".to_string());
    }
    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    let workers = args.workers.or(cfg.workers).unwrap_or(2).max(1);
    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());

    let size = args
        .size
        .or(cfg.size)
        .unwrap_or(crate::catalog::DEFAULT_PAGE_SIZE);
    if size == 0 {
        return Err("invalid size, expected positive integer".to_string());
    }
    let brand = args
        .brand
        .or(cfg.brand)
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty());
    let sort_raw = args.sort.or(cfg.sort).unwrap_or_default();
    let sort = SortKey::parse_optional(&sort_raw)
        .map_err(|e| format!("invalid sort '{sort_raw}': {e}"))?;

    let output = args
        .output
        .or(cfg.output)
        .filter(|p| !p.trim().is_empty())
        .map(|p| config::expand_tilde_string(&p));
    let output_format_raw = args.output_format.or(cfg.output_format);
    let output_format = match output_format_raw.as_deref() {
        Some(raw) => OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected html, json or text"))?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Html),
    };

    let truncation = if args.exact_truncation || cfg.exact_truncation.unwrap_or(false) {
        Truncation::Exact
    } else {
        Truncation::Legacy
    };

    Ok(RunConfig {
        client: ClientOptions {
            base_url,
            limit,
            timeout_seconds: timeout,
            proxy,
        },
        workers,
        controls: Controls { size, brand, sort },
        initial,
        interactive: args.interactive,
        output,
        output_format,
        truncation,
        no_color,
        verbose: args.verbose,
    })
}

async fn publish(run: &RunConfig, state: &AppState, error: Option<String>) -> Result<(), String> {
    let view = PageView {
        controls: &state.controls,
        products: &state.products,
        indicators: &state.indicators,
        error,
    };
    terminal::print_page(&view);

    if let Some(path) = run.output.as_deref() {
        let rendered = output::render(&view, run.output_format).map_err(|e| e.to_string())?;
        output::write_output(path, &rendered)
            .await
            .map_err(|e| e.to_string())?;
        tracing::info!(path, "page written");
    }
    Ok(())
}

/// Renders an outcome. Returns the error message when the fetch failed.
async fn handle_outcome(run: &RunConfig, outcome: Outcome) -> Result<Option<String>, String> {
    match outcome {
        Outcome::Applied(state) => {
            publish(run, &state, None).await?;
            Ok(None)
        }
        Outcome::Stale { seq, latest } => {
            tracing::debug!(seq, latest, "outcome superseded by a newer action");
            Ok(None)
        }
        Outcome::Failed { error, state, .. } => {
            let message = error.to_string();
            publish(run, &state, Some(message.clone())).await?;
            Ok(Some(message))
        }
    }
}

async fn run_once(run: &RunConfig, session: &Session) -> Result<(), String> {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {elapsed} {msg}")
            .map_err(|e| format!("invalid progress template: {e}"))?,
    );
    pb.set_message(format!("fetching ({})", run.initial.label()));

    let outcome = session
        .run(run.initial.clone())
        .await
        .map_err(|e| format!("fetch task failed: {e}"));
    pb.finish_and_clear();

    match handle_outcome(run, outcome?).await? {
        Some(message) => Err(message),
        None => Ok(()),
    }
}

async fn print_brands(session: &Session) {
    match session.client().brands().await {
        Ok(brands) if brands.is_empty() => println!("{}", "no brands".bold().yellow()),
        Ok(brands) => {
            for brand in brands {
                println!("  {}", brand.bold().cyan());
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to list brands");
            terminal::print_error(&e.to_string());
        }
    }
}

async fn prompt() {
    let mut stdout = tokio::io::stdout();
    let _ = stdout.write_all(b"> ").await;
    let _ = stdout.flush().await;
}

async fn run_interactive(run: &RunConfig, session: &Session) -> Result<(), String> {
    let mut pending: FuturesUnordered<JoinHandle<Outcome>> = FuturesUnordered::new();
    pending.push(session.dispatch(run.initial.clone()).await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    prompt().await;

    while stdin_open || !pending.is_empty() {
        tokio::select! {
            Some(joined) = pending.next(), if !pending.is_empty() => {
                match joined {
                    Ok(outcome) => {
                        handle_outcome(run, outcome).await?;
                    }
                    Err(e) => tracing::error!(error = %e, "fetch task failed"),
                }
                if stdin_open {
                    prompt().await;
                }
            }
            line = lines.next_line(), if stdin_open => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        stdin_open = false;
                        continue;
                    }
                    Err(e) => return Err(format!("failed to read stdin: {e}")),
                };
                match command::parse_command(&line) {
                    Ok(Some(Command::Run(action))) => {
                        pending.push(session.dispatch(action).await);
                    }
                    Ok(Some(Command::Brands)) => {
                        print_brands(session).await;
                        prompt().await;
                    }
                    Ok(Some(Command::Help)) => {
                        println!("{}", command::HELP);
                        prompt().await;
                    }
                    Ok(Some(Command::Quit)) => break,
                    Ok(None) => prompt().await,
                    Err(e) => {
                        terminal::print_error(&e);
                        prompt().await;
                    }
                }
            }
        }
    }
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    print_banner();

    let client = CatalogClient::new(run.client.clone()).map_err(|e| e.to_string())?;
    format_kv_line("API", client.base_url().as_str());
    format_kv_line("Show", &run.controls.size.to_string());
    format_kv_line(
        "Brand",
        run.controls.brand.as_deref().unwrap_or("all"),
    );
    format_kv_line(
        "Sort",
        run.controls.sort.map(|s| s.as_str()).unwrap_or("none"),
    );
    if let Some(path) = run.output.as_deref() {
        format_kv_line("Output", path);
    }
    println!();

    let session = Session::new(client, run.truncation, run.controls.clone());
    if run.interactive {
        run_interactive(&run, &session).await
    } else {
        run_once(&run, &session).await
    }
}

/// A user supplied path must exist. The default path gets the commented
/// template written on first run; failing to write it is not fatal.
fn load_config_file(
    user_path: Option<&PathBuf>,
    default_path: Option<PathBuf>,
) -> Result<(ConfigFile, Option<String>), String> {
    if let Some(path) = user_path {
        return Ok((config::load_config(path, false)?, None));
    }
    let Some(path) = default_path else {
        return Ok((ConfigFile::default(), None));
    };
    let init_error = config::ensure_default_config_file(&path).err();
    Ok((config::load_config(&path, true)?, init_error))
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));
    let (cfg, init_error) =
        load_config_file(user_config_path.as_ref(), config::default_config_path())?;

    let run = build_run_config(args, cfg)?;
    crate::logging::setup_logging(run.verbose, run.no_color).map_err(|e| e.to_string())?;
    if let Some(error) = init_error {
        tracing::warn!(%error, "could not write default config file");
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(run.workers)
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
