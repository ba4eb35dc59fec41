//! Text commands read from the terminal, one per line.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Categories,
    SelectCategory { category: String },
    Toggle { product_name: String },
    Remove { index: usize },
    ClearAll,
    GenerateRoutine,
    Ask { text: String },
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  categories            list catalog categories
  category <name>       show the products of a category
  toggle <product>      select or unselect a displayed product
  remove <index>        remove an entry from the selected list
  clear                 remove every selected product (asks first)
  generate              generate a routine for the selection
  ask <question>        ask a follow-up question (plain text works too)
  show                  redraw every view
  help                  this text
  quit                  leave";

/// Lines that are not a known command are follow-up questions.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "categories" => Command::Categories,
        "category" | "cat" => {
            if rest.is_empty() {
                return Err("usage: category <name>".to_string());
            }
            Command::SelectCategory {
                category: rest.to_string(),
            }
        }
        "toggle" | "t" => {
            if rest.is_empty() {
                return Err("usage: toggle <product name>".to_string());
            }
            Command::Toggle {
                product_name: rest.to_string(),
            }
        }
        "remove" | "rm" => {
            let index = rest
                .parse::<usize>()
                .map_err(|_| "usage: remove <index>".to_string())?;
            Command::Remove { index }
        }
        "clear" => Command::ClearAll,
        "generate" | "routine" => Command::GenerateRoutine,
        "ask" => Command::Ask {
            text: rest.to_string(),
        },
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Ask {
            text: line.to_string(),
        },
    };
    Ok(Some(command))
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    )
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
