use std::io::{self, Write};
use std::sync::Mutex;

use crate::errors::{CaseError, Result};
use crate::results::MatchingError;

/// Where verification results are reported.
pub trait ResultPrinter: Send + Sync {
    fn print_error(&self, error: &MatchingError) -> Result<()>;
    fn print_failure_title(&self, example_name: &str) -> Result<()>;
    fn print_success_title(&self, example_name: &str) -> Result<()>;
}

fn indent(size: usize, text: &str) -> String {
    let pad = " ".repeat(size);
    format!("{pad}{}", text.replace('\n', &format!("\n{pad}")))
}

/// Renders one error as a block: message, expected, actual, then where.
pub fn render_error(error: &MatchingError) -> String {
    format!(
        "{}\n{}\n{}\n\n{}\n",
        indent(6, &format!("MATCHING ERROR: {}", error.message())),
        indent(9, &format!("Expected something like:\n{}", indent(3, &error.expected().to_string()))),
        indent(9, &format!("Actual:\n{}", indent(3, &error.actual().to_string()))),
        indent(12, &format!(" - {} [{}]", error.location(), error.kind())),
    )
}

/// Writes human-readable results to any writer; stdout by default.
pub struct ConsolePrinter<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsolePrinter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsolePrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> Result<W> {
        self.out
            .into_inner()
            .map_err(|_| CaseError::Core("result printer lock was poisoned".into()))
    }

    /// Each block goes out in a single write so concurrent runs don't interleave.
    fn write_block(&self, block: &str) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| CaseError::Core("result printer lock was poisoned".into()))?;
        writeln!(out, "{block}")?;
        out.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> ResultPrinter for ConsolePrinter<W> {
    fn print_error(&self, error: &MatchingError) -> Result<()> {
        self.write_block(&render_error(error))
    }

    fn print_failure_title(&self, example_name: &str) -> Result<()> {
        self.write_block(&indent(3, &format!("\n✘ {example_name}\n   Error details follow:\n")))
    }

    fn print_success_title(&self, example_name: &str) -> Result<()> {
        self.write_block(&indent(3, &format!("\n✔ {example_name}\n")))
    }
}
