//! Terminal operator for interactive matching.

use std::io::{self, BufRead, Write};

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table};
use tracing::{debug, warn};

use mcc_map::{OperatorDecision, OperatorResolver, RankedCandidate, parse_decision};

/// Asks the operator on a line-oriented terminal.
///
/// End of input counts as a stop, and so does a prompt that cannot be
/// written.
pub struct TerminalResolver<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalResolver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn show_prompt(&mut self, field: &str, candidates: &[RankedCandidate]) -> io::Result<()> {
        writeln!(self.output, "Target field: {field}")?;
        writeln!(self.output, "{}", candidate_table(candidates))?;
        writeln!(
            self.output,
            "Enter the ID of the header that matches the target field, 0 if none does, or 'x' to stop."
        )?;
        write!(self.output, "Field ID: ")?;
        self.output.flush()
    }

    fn read_answer(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line),
        }
    }
}

impl<R: BufRead, W: Write> OperatorResolver for TerminalResolver<R, W> {
    fn decide(&mut self, field: &str, candidates: &[RankedCandidate]) -> OperatorDecision {
        if let Err(error) = self.show_prompt(field, candidates) {
            warn!(field, %error, "operator prompt could not be written, stopping");
            return OperatorDecision::Stop;
        }

        let Some(answer) = self.read_answer() else {
            debug!(field, "operator input closed");
            return OperatorDecision::Stop;
        };
        let decision = parse_decision(&answer, candidates.len());
        debug!(field, answer = answer.trim(), ?decision, "operator answered");
        decision
    }

    fn notify(&mut self, message: &str) {
        if let Err(error) = writeln!(self.output, "{message}") {
            warn!(%error, "operator message could not be written");
        }
    }
}

/// Numbered candidate table, best first.
pub fn candidate_table(candidates: &[RankedCandidate]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Confidence"),
        header_cell("Header"),
    ]);
    for (idx, candidate) in candidates.iter().enumerate() {
        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(format!("{:.2}", candidate.score)),
            Cell::new(&candidate.header),
        ]);
    }
    for index in [0, 1] {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    table
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}
