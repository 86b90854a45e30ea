//! End-of-run report
//!
//! Diagnostics are collected by the engine while it runs and surfaced here
//! exactly once: every entry goes to the log, and the console summary counts
//! them by kind and lists the first few.

use std::fmt::Write;

use sllvm_core::{Diagnostic, Summary};

/// Diagnostics listed in full on the console
const LISTED_DIAGNOSTICS: usize = 10;

fn kind(diagnostic: &Diagnostic) -> &'static str {
    match diagnostic {
        Diagnostic::MissingInputFile { .. } => "missing input files",
        Diagnostic::MalformedArray { .. } => "malformed arrays",
        Diagnostic::ShortTrajectory { .. } => "short trajectories",
        Diagnostic::MissingVariableList { .. } => "missing value lists",
    }
}

/// Send every diagnostic to the log
pub fn log_diagnostics(summary: &Summary) {
    for diagnostic in summary.diagnostics.iter() {
        match diagnostic.cell() {
            Some(cell) => tracing::warn!(
                outer = cell.outer,
                variable = cell.variable,
                seed = cell.seed,
                "{diagnostic}"
            ),
            None => tracing::warn!("{diagnostic}"),
        }
    }
}

/// Console summary of one task
pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}: {}", summary.task, summary.description);
    let _ = writeln!(out, "  coverage: {:.1}%", summary.coverage * 100.0);

    if summary.outputs.is_empty() {
        let _ = writeln!(out, "  no files written");
    }
    for path in &summary.outputs {
        let _ = writeln!(out, "  wrote {}", path.display());
    }

    if summary.diagnostics.is_empty() {
        return out;
    }

    let mut counts: Vec<(&'static str, usize)> = Vec::new();
    for diagnostic in summary.diagnostics.iter() {
        let k = kind(diagnostic);
        match counts.iter_mut().find(|(name, _)| *name == k) {
            Some((_, n)) => *n += 1,
            None => counts.push((k, 1)),
        }
    }
    let _ = writeln!(out, "  {} diagnostics:", summary.diagnostics.len());
    for (name, n) in counts {
        let _ = writeln!(out, "    {n} {name}");
    }
    for diagnostic in summary.diagnostics.iter().take(LISTED_DIAGNOSTICS) {
        let _ = writeln!(out, "    - {diagnostic}");
    }
    if summary.diagnostics.len() > LISTED_DIAGNOSTICS {
        let _ = writeln!(
            out,
            "    ... {} more in the log",
            summary.diagnostics.len() - LISTED_DIAGNOSTICS
        );
    }
    out
}
