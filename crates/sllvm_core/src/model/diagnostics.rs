use std::fmt;
use std::path::PathBuf;

use super::Series;

/// Position of a cell in a sweep: `[outer, variable, seed]`.
///
/// `outer` indexes H in the optimal-exponent search and is 0 elsewhere;
/// `variable` is 0 for sweeps without an independent variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CellIndex {
    pub outer: usize,
    pub variable: usize,
    pub seed: usize,
}

impl CellIndex {
    pub fn new(variable: usize, seed: usize) -> Self {
        Self {
            outer: 0,
            variable,
            seed,
        }
    }

    #[must_use]
    pub fn with_outer(self, outer: usize) -> Self {
        Self { outer, ..self }
    }
}

/// A non-fatal problem found while loading or aggregating one cell
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// The per-seed array does not exist; the cell is left at zero
    MissingInputFile {
        cell: CellIndex,
        seed: i64,
        series: Series,
        dir: PathBuf,
        suffix: String,
    },
    /// The array exists but could not be used as-is
    MalformedArray {
        cell: CellIndex,
        path: PathBuf,
        reason: String,
    },
    /// Fewer samples than the tail window; all samples were averaged
    ShortTrajectory {
        cell: CellIndex,
        path: PathBuf,
        len: usize,
        window: usize,
    },
    /// The list of swept values is absent; the sweep is empty
    MissingVariableList { path: PathBuf },
}

impl Diagnostic {
    pub fn cell(&self) -> Option<CellIndex> {
        match self {
            Diagnostic::MissingInputFile { cell, .. }
            | Diagnostic::MalformedArray { cell, .. }
            | Diagnostic::ShortTrajectory { cell, .. } => Some(*cell),
            Diagnostic::MissingVariableList { .. } => None,
        }
    }

    /// Move the cell into slot `outer` of an enclosing sweep
    #[must_use]
    pub fn with_outer(mut self, outer: usize) -> Self {
        match &mut self {
            Diagnostic::MissingInputFile { cell, .. }
            | Diagnostic::MalformedArray { cell, .. }
            | Diagnostic::ShortTrajectory { cell, .. } => *cell = cell.with_outer(outer),
            Diagnostic::MissingVariableList { .. } => {}
        }
        self
    }

    /// Whether the cell this refers to holds no data
    pub fn is_missing(&self) -> bool {
        matches!(self, Diagnostic::MissingInputFile { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingInputFile {
                seed,
                series,
                dir,
                suffix,
                ..
            } => write!(
                f,
                "missing {} for seed {seed}: {} (suffix {suffix})",
                series.stem(),
                dir.display()
            ),
            Diagnostic::MalformedArray { path, reason, .. } => {
                write!(f, "malformed array {}: {reason}", path.display())
            }
            Diagnostic::ShortTrajectory {
                path, len, window, ..
            } => write!(
                f,
                "{} has {len} samples, fewer than the tail window of {window}",
                path.display()
            ),
            Diagnostic::MissingVariableList { path } => {
                write!(f, "value list {} not found, sweep is empty", path.display())
            }
        }
    }
}

/// Collector for diagnostics of one batch
///
/// Cells may be processed in any order; [`Diagnostics::finish`] sorts by cell
/// so the final report is the same for serial and parallel runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn append(&mut self, other: &mut Diagnostics) {
        self.entries.append(&mut other.entries);
    }

    /// Sort by cell index, batch-level entries first
    #[must_use]
    pub fn finish(mut self) -> Self {
        self.entries.sort_by_key(Diagnostic::cell);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn missing_count(&self) -> usize {
        self.entries.iter().filter(|d| d.is_missing()).count()
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
