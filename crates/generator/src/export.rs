//! Flat CSV snapshot of the generated dataset.
//!
//! Snapshots are staged in a temporary file next to the target and only
//! renamed over it on [`StagedExport::commit`], so an aborted run leaves the
//! previous snapshot in place.

use campaign_core::types::PerformanceRecord;
use campaign_core::{InsightsError, InsightsResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// A fully written snapshot waiting to replace its target path.
/// Dropping it without committing removes the staged file.
#[derive(Debug)]
pub struct StagedExport {
    file: NamedTempFile,
    target: PathBuf,
    rows: usize,
}

impl StagedExport {
    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn staged_path(&self) -> &Path {
        self.file.path()
    }

    /// Atomically rename the staged file over the target.
    pub fn commit(self) -> InsightsResult<PathBuf> {
        let Self { file, target, rows } = self;
        file.persist(&target)
            .map_err(|e| InsightsError::Export(format!("{}: {}", target.display(), e)))?;
        info!(rows, path = %target.display(), "Wrote CSV snapshot");
        Ok(target)
    }
}

/// Write `records` to a temporary file in the directory of `path`.
pub fn stage_csv(
    records: &[PerformanceRecord],
    path: impl AsRef<Path>,
) -> InsightsResult<StagedExport> {
    let target = path.as_ref().to_path_buf();
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut file = NamedTempFile::new_in(&dir)?;
    write_csv(records, file.as_file_mut())?;
    debug!(staged = %file.path().display(), target = %target.display(), "Staged CSV snapshot");
    Ok(StagedExport {
        file,
        target,
        rows: records.len(),
    })
}

/// Write `records` to `path`, replacing any existing file in one rename.
pub fn export_csv(records: &[PerformanceRecord], path: impl AsRef<Path>) -> InsightsResult<()> {
    stage_csv(records, path)?.commit()?;
    Ok(())
}

/// Header row plus one line per record, columns in table order.
pub fn write_csv<W: Write>(records: &[PerformanceRecord], writer: W) -> InsightsResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| InsightsError::Export(e.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
