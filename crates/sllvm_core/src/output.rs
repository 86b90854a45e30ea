//! Persisting aggregated arrays as `.npy` files

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ndarray::{ArrayBase, Data, Dimension};
use ndarray_npy::WriteNpyExt;

use crate::error::{AnalysisError, Result};

/// Writes `<results_dir>/<name><suffix>.npy`
///
/// Files are written to a temporary sibling first and renamed into place, so
/// an interrupted run never leaves a truncated result behind and reruns
/// overwrite earlier output.
#[derive(Debug, Clone)]
pub struct ResultWriter {
    results_dir: PathBuf,
}

impl ResultWriter {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    pub fn path(&self, name: &str, suffix: &str) -> PathBuf {
        self.results_dir.join(format!("{name}{suffix}.npy"))
    }

    /// Write one array and return its final path
    pub fn write<S, D>(&self, name: &str, suffix: &str, array: &ArrayBase<S, D>) -> Result<PathBuf>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        fs::create_dir_all(&self.results_dir)
            .map_err(|e| AnalysisError::io(&self.results_dir, e))?;

        let path = self.path(name, suffix);
        let temp_path = path.with_extension("npy.tmp");

        let file = File::create(&temp_path).map_err(|e| AnalysisError::io(&temp_path, e))?;
        let mut writer = BufWriter::new(file);
        array
            .write_npy(&mut writer)
            .map_err(|source| AnalysisError::Write {
                path: temp_path.clone(),
                source,
            })?;
        writer
            .flush()
            .map_err(|e| AnalysisError::io(&temp_path, e))?;
        drop(writer);

        fs::rename(&temp_path, &path).map_err(|e| AnalysisError::io(&path, e))?;
        tracing::debug!(path = %path.display(), shape = ?array.shape(), "wrote result");
        Ok(path)
    }
}
