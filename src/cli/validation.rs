use crate::catalog::SortKey;
use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(size) = args.size {
        if size == 0 {
            return Err("invalid size, expected positive integer".to_string());
        }
    }
    if let Some(raw) = args.sort.as_deref() {
        SortKey::parse_optional(raw).map_err(|e| format!("invalid --sort '{raw}': {e}"))?;
    }
    if let Some(limit) = args.limit {
        if limit == 0 {
            return Err("invalid limit, expected positive integer".to_string());
        }
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive integer".to_string());
        }
    }
    if let Some(workers) = args.workers {
        if workers == 0 {
            return Err("invalid workers, expected positive integer".to_string());
        }
    }
    if let Some(raw) = args.output_format.as_deref() {
        if crate::output::OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected html, json or text"
            ));
        }
    }
    Ok(())
}
