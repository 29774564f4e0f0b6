use std::io::{self, Write};

use serde::Serialize;

use crate::analysis::AnalysisReport;
use crate::catalog::SearchOutcome;
use crate::guard::Payload;

pub const NO_RESULTS: &str = "No results found.";

/// Results go to stdout; diagnostics stay on stderr.
pub struct JsonOutput;

impl JsonOutput {
    pub fn print_search(outcome: &SearchOutcome<'_>) -> io::Result<()> {
        match outcome {
            SearchOutcome::Matches(entries) => Self::print_json(entries),
            SearchOutcome::NoResults => Self::print_text(NO_RESULTS),
        }
    }

    pub fn print_payload(payload: &Payload) -> io::Result<()> {
        Self::print_json(payload)
    }

    pub fn print_report(report: &AnalysisReport) -> io::Result<()> {
        let mut stdout = io::stdout();
        write!(stdout, "{report}")?;
        stdout.flush()
    }

    fn print_text(text: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(text.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        Self::print_text(&json)
    }
}
