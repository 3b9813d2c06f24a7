// UI layer: line-oriented console access and table rendering.
//
// The session talks to a `Console` so it can be scripted in tests; the
// real terminal uses `dialoguer` prompts and an `indicatif` spinner while
// a request is in flight.

use std::io;
use std::time::Duration;

use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::{Dress, DressLoan};
use crate::error::{DomainError, SessionError};

/// Interactive input and output used by the menus.
pub trait Console {
    /// Prompt for a line of text.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    /// Prompt for a line of text without echoing it.
    fn read_secret(&mut self, prompt: &str) -> io::Result<String>;

    /// Print a line on standard output.
    fn say(&mut self, line: &str);

    /// Print a line on the error stream.
    fn complain(&mut self, line: &str);

    /// Signal that a slow operation started.
    fn busy(&mut self, _message: &str) {}

    /// Signal that the slow operation finished.
    fn idle(&mut self) {}
}

/// Console backed by the real terminal.
#[derive(Default)]
pub struct TerminalConsole {
    spinner: Option<ProgressBar>,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Console for TerminalConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
    }

    fn read_secret(&mut self, prompt: &str) -> io::Result<String> {
        Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
    }

    fn say(&mut self, line: &str) {
        println!("{}", line);
    }

    fn complain(&mut self, line: &str) {
        eprintln!("{}", line);
    }

    fn busy(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn idle(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

/// Ask until `parse` accepts the trimmed answer.
///
/// Rejected answers print "Format not satisfied" and ask again; only a
/// console failure ends the loop with an error.
pub fn read_with<T>(
    console: &mut dyn Console,
    prompt: &str,
    parse: impl Fn(&str) -> Result<T, DomainError>,
) -> Result<T, SessionError> {
    loop {
        let line = console.read_line(prompt)?;
        match parse(line.trim()) {
            Ok(value) => return Ok(value),
            Err(err) => {
                tracing::debug!(prompt, %err, "rejected input");
                console.say("Format not satisfied");
            }
        }
    }
}

/// Like [`read_with`] but without echo.
pub fn read_secret_with<T>(
    console: &mut dyn Console,
    prompt: &str,
    parse: impl Fn(&str) -> Result<T, DomainError>,
) -> Result<T, SessionError> {
    loop {
        let line = console.read_secret(prompt)?;
        match parse(line.trim()) {
            Ok(value) => return Ok(value),
            Err(_) => console.say("Format not satisfied"),
        }
    }
}

const SEPARATOR_WIDTH: usize = 140;

fn separator() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

/// Render dresses as a numbered table. Empty input renders nothing.
pub fn dress_table(dresses: &[Dress]) -> Vec<String> {
    if dresses.is_empty() {
        return Vec::new();
    }
    let row = |n: &str, brand: &str, price: &str, material: &str, color: &str, size: &str, desc: &str, deleted: &str| {
        format!(
            "{:<8} {:<20} {:<12} {:<15} {:<12} {:<6} {:<40} {:<8}",
            n, brand, price, material, color, size, desc, deleted
        )
        .trim_end()
        .to_string()
    };
    let mut lines = vec![
        separator(),
        row("Number", "Brand", "Price", "Material", "Color", "Size", "Description", "Deleted"),
        separator(),
    ];
    for (index, dress) in dresses.iter().enumerate() {
        lines.push(row(
            &(index + 1).to_string(),
            dress.brand.as_str(),
            &dress.price.to_string(),
            dress.material.as_str(),
            dress.color.as_str(),
            &dress.size.to_string(),
            dress.description.as_str(),
            &dress.deleted.to_string(),
        ));
    }
    lines.push(separator());
    lines
}

/// Render loans as a numbered table. Empty input renders nothing.
pub fn loan_table(loans: &[DressLoan]) -> Vec<String> {
    if loans.is_empty() {
        return Vec::new();
    }
    let row = |n: &str, dress: &str, start: &str, end: &str, days: &str, total: &str, terminated: &str| {
        format!(
            "{:<8} {:<38} {:<20} {:<20} {:<6} {:<14} {:<10}",
            n, dress, start, end, days, total, terminated
        )
        .trim_end()
        .to_string()
    };
    let mut lines = vec![
        separator(),
        row("Number", "Dress", "Start-Date", "End-Date", "Days", "Total Price", "Terminated"),
        separator(),
    ];
    for (index, loan) in loans.iter().enumerate() {
        lines.push(row(
            &(index + 1).to_string(),
            loan.dress.as_str(),
            loan.start_date.as_str(),
            loan.end_date.as_str(),
            &loan.duration.to_string(),
            &loan.total_price.to_string(),
            &loan.terminated.to_string(),
        ));
    }
    lines.push(separator());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::*;
    use std::collections::VecDeque;

    struct Scripted {
        input: VecDeque<&'static str>,
        output: Vec<String>,
    }

    impl Console for Scripted {
        fn read_line(&mut self, _prompt: &str) -> io::Result<String> {
            self.input
                .pop_front()
                .map(String::from)
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script ended"))
        }

        fn read_secret(&mut self, prompt: &str) -> io::Result<String> {
            self.read_line(prompt)
        }

        fn say(&mut self, line: &str) {
            self.output.push(line.to_string());
        }

        fn complain(&mut self, line: &str) {
            self.output.push(line.to_string());
        }
    }

    #[test]
    fn read_with_reprompts_until_valid() {
        let mut console = Scripted {
            input: VecDeque::from(["abc", "0", " 12 "]),
            output: Vec::new(),
        };
        let size = read_with(&mut console, "Size", |s| s.parse::<Size>()).unwrap();
        assert_eq!(size.value(), 12);
        assert_eq!(console.output, ["Format not satisfied", "Format not satisfied"]);
    }

    #[test]
    fn read_with_surfaces_console_failure() {
        let mut console = Scripted {
            input: VecDeque::new(),
            output: Vec::new(),
        };
        let err = read_with(&mut console, "Size", |s| s.parse::<Size>()).unwrap_err();
        assert!(matches!(err, SessionError::Io(_)));
    }

    #[test]
    fn empty_tables_render_nothing() {
        assert!(dress_table(&[]).is_empty());
        assert!(loan_table(&[]).is_empty());
    }

    #[test]
    fn dress_rows_are_numbered_from_one() {
        let dress = Dress {
            id: DressId::new("d1").unwrap(),
            brand: Brand::new("Prada").unwrap(),
            price: Price::parse("99.9").unwrap(),
            material: Material::new("Linen").unwrap(),
            color: Color::new("Blue").unwrap(),
            size: Size::new(36).unwrap(),
            description: Description::new("Cocktail").unwrap(),
            deleted: Deleted::new(false),
        };
        let lines = dress_table(&[dress]);
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("Number"));
        assert!(lines[3].starts_with("1 "));
        assert!(lines[3].contains("99.09"));
        assert!(lines[3].contains("Prada"));
    }
}
