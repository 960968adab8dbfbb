//! Line-oriented event loop around the todo screen.
//!
//! Commands: `add <text>`, `toggle <row>`, `del <row>`, `refresh`, `quit`.
//! Rows are the 1-based numbers shown next to each rendered line.

use std::io::{self, BufRead, Write};

use todoq::transport::UreqTransport;
use todoq::view::TodoView;
use todoq_core::DEFAULT_BASE_URL;
use tracing_subscriber::EnvFilter;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Add(String),
    Toggle(usize),
    Delete(usize),
    Refresh,
    Quit,
}

/// Parse one input line; row numbers are converted to zero-based indexes.
fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(' ') {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    match verb {
        "add" => Some(Command::Add(rest.to_string())),
        "toggle" => parse_row(rest).map(Command::Toggle),
        "del" | "delete" => parse_row(rest).map(Command::Delete),
        "refresh" => Some(Command::Refresh),
        "quit" | "q" => Some(Command::Quit),
        _ => None,
    }
}

fn parse_row(rest: &str) -> Option<usize> {
    rest.parse::<usize>().ok().filter(|n| *n >= 1).map(|n| n - 1)
}

fn print_help() {
    println!("commands: add <text> | toggle <row> | del <row> | refresh | quit");
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut view = TodoView::new(UreqTransport::new(), DEFAULT_BASE_URL);
    print!("{}", view.render());
    print_help();

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match parse_command(&line) {
            Some(Command::Add(text)) => {
                view.set_input(&text);
                view.submit_add();
            }
            Some(Command::Toggle(row)) => view.toggle(row),
            Some(Command::Delete(row)) => view.delete(row),
            Some(Command::Refresh) => view.refresh(),
            Some(Command::Quit) => break,
            None => {
                print_help();
                continue;
            }
        }
        print!("{}", view.render());
    }
    view.close();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_with_text() {
        assert_eq!(
            parse_command("add Buy milk\n"),
            Some(Command::Add("Buy milk".to_string()))
        );
    }

    #[test]
    fn parses_rows_as_one_based() {
        assert_eq!(parse_command("toggle 1"), Some(Command::Toggle(0)));
        assert_eq!(parse_command("del 3"), Some(Command::Delete(2)));
        assert_eq!(parse_command("toggle 0"), None);
        assert_eq!(parse_command("del x"), None);
    }

    #[test]
    fn unknown_verbs_are_rejected() {
        assert_eq!(parse_command("frobnicate"), None);
        assert_eq!(parse_command(""), None);
    }
}
