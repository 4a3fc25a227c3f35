use crate::catalog::SortKey;
use crate::pipeline;

use super::Action;

/// One line typed into the interactive prompt.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Run(Action),
    Brands,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  show <n>              page size
  brand [<name>]        filter by brand (no name clears it)
  sort [<key>]          price-asc, price-desc, date-asc, date-desc (no key clears it)
  reasonable            only products up to 50
  price [<min>] [<max>] price range (defaults 0 and 3000)
  search [<term>]       case-insensitive name search
  refresh               fetch again with the current controls
  brands                list available brands
  help                  this text
  quit                  leave";

pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "show" => {
            let size = rest
                .parse::<usize>()
                .map_err(|_| format!("invalid page size '{rest}'"))?;
            Command::Run(Action::Show(size))
        }
        "brand" => Command::Run(Action::Brand(Some(rest.to_string()).filter(|b| !b.is_empty()))),
        "sort" => Command::Run(Action::Sort(SortKey::parse_optional(rest)?)),
        "reasonable" => Command::Run(Action::ReasonablePrice),
        "price" => {
            let mut parts = rest.split_whitespace();
            let (min, max) = pipeline::parse_price_bounds(parts.next(), parts.next());
            Command::Run(Action::PriceRange { min, max })
        }
        "search" => Command::Run(Action::Search(rest.to_string())),
        "refresh" => Command::Run(Action::Refresh),
        "brands" => Command::Brands,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{other}', type 'help'")),
    };
    Ok(Some(command))
}
