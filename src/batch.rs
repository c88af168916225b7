//! Converting every scan file in a folder.
//!
//! Files are independent units of work: a failure in one is recorded and
//! the run moves on to the next file.

use log::{error, info, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::converter::Converter;
use crate::error::{Error, Result};
use crate::models::{ConversionReport, SchemaVersion};
use crate::schema::probe;
use crate::tree::TreeOpener;

/// Extension of the scan files picked up from a folder.
pub const SCAN_EXTENSION: &str = "nxs";

/// Accumulated outcome of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub new_files: usize,
    pub old_files: usize,
    /// Files whose layout could not be determined
    pub skipped: usize,
    /// Warning and error lines, in the order they occurred
    pub errors: Vec<String>,
    pub files: Vec<ConversionReport>,
}

impl BatchReport {
    pub fn summary(&self) -> String {
        format!(
            "NUMBER OF PROCESSED NEW FILES: {}\nNUMBER OF PROCESSED OLD FILES: {}\nSKIPPED FILES: {}",
            self.new_files, self.old_files, self.skipped
        )
    }
}

/// List the scan files directly inside `folder`, sorted by name.
pub fn scan_files(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(Error::InvalidInput(format!(
            "The provided path {} is not a valid folder",
            folder.display()
        )));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(folder)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some(SCAN_EXTENSION))
        .collect();
    files.sort();
    Ok(files)
}

pub struct BatchRunner<O: TreeOpener> {
    opener: O,
    converter: Converter,
}

impl<O: TreeOpener> BatchRunner<O> {
    pub fn new(opener: O, converter: Converter) -> Self {
        Self { opener, converter }
    }

    /// Convert every scan file in `folder`.
    ///
    /// # Errors
    ///
    /// Only a folder that is not a directory (or cannot be listed) is an
    /// error. Per-file failures are collected in [`BatchReport::errors`].
    pub fn run(&self, folder: &Path) -> Result<BatchReport> {
        let files = scan_files(folder)?;
        let mut report = BatchReport::default();

        if files.is_empty() {
            info!("No .{} files found in the folder {}", SCAN_EXTENSION, folder.display());
            return Ok(report);
        }

        for (idx, path) in files.iter().enumerate() {
            info!("[{}/{}] Processing file: {}", idx + 1, files.len(), path.display());
            self.run_one(path, &mut report);
        }

        Ok(report)
    }

    fn run_one(&self, path: &Path, report: &mut BatchReport) {
        let tree = match self.opener.open(path) {
            Ok(tree) => tree,
            Err(e) => {
                warn!("Error reading {}: {}", path.display(), e);
                warn!("Skipping {} due to missing main node.", path.display());
                report.skipped += 1;
                return;
            }
        };

        let schema = probe(&tree);
        match schema {
            SchemaVersion::New => report.new_files += 1,
            SchemaVersion::Old => report.old_files += 1,
            SchemaVersion::Unknown => {
                warn!("Skipping {} due to missing main node.", path.display());
                report.skipped += 1;
                return;
            }
        }

        match self.converter.convert_tree(&tree, schema, path) {
            Ok(conversion) => {
                if conversion.is_empty_output() {
                    warn!("   └─ No output written for {}", path.display());
                    report
                        .errors
                        .push(format!("WARNING empty result {}", path.display()));
                }
                report.files.push(conversion);
            }
            Err(e) => {
                error!("   └─ ✗ Conversion failed for {}: {}", path.display(), e);
                report.errors.push(format!("ERROR {} : {}", path.display(), e));
            }
        }
    }
}
