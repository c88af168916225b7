//! Routing one scan file through the conversion pipeline of its layout.

use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::classifier::ScanClassifier;
use crate::config::HeaderPolicy;
use crate::error::{Error, Result};
use crate::models::{ConversionReport, ScanArchetype, SchemaVersion, SkipReason};
use crate::schema::{probe, SchemaConventions};
use crate::table::TableBuilder;
use crate::tree::{Tree, TreeOpener};
use crate::writer::TableWriter;

/// Converts scan files into `.dat` tables next to the source file.
///
/// # Examples
///
/// ```no_run
/// # #[cfg(feature = "hdf5")]
/// # fn run() -> nxs2txt::Result<()> {
/// use nxs2txt::{Converter, HeaderPolicy, Hdf5Opener};
///
/// let report = Converter::new(HeaderPolicy::default())
///     .convert_file(&Hdf5Opener, "/data/b07-12345.nxs".as_ref())?;
/// for stats in &report.written {
///     println!("{}", stats.summary());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Converter {
    header: HeaderPolicy,
}

impl Converter {
    pub fn new(header: HeaderPolicy) -> Self {
        Self { header }
    }

    pub fn header_policy(&self) -> HeaderPolicy {
        self.header
    }

    /// Open, probe, classify and convert one file.
    ///
    /// A file that cannot be opened or has no known root group is reported
    /// as [`SchemaVersion::Unknown`] rather than failing. The file handle is
    /// released before this returns, on every path.
    ///
    /// # Errors
    ///
    /// Returns an error if the instrument group is missing, a required
    /// dataset cannot be read, or an output file cannot be written.
    pub fn convert_file<O: TreeOpener>(&self, opener: &O, path: &Path) -> Result<ConversionReport> {
        let tree = match opener.open(path) {
            Ok(tree) => tree,
            Err(e) => {
                warn!("Error reading {}: {}", path.display(), e);
                let mut report = ConversionReport::new(path.to_path_buf(), SchemaVersion::Unknown);
                report.skipped.push(SkipReason::SchemaUndetermined);
                return Ok(report);
            }
        };

        let schema = probe(&tree);
        self.convert_tree(&tree, schema, path)
    }

    /// Convert an already opened tree whose layout is known.
    pub fn convert_tree<T: Tree>(
        &self,
        tree: &T,
        schema: SchemaVersion,
        source: &Path,
    ) -> Result<ConversionReport> {
        let mut report = ConversionReport::new(source.to_path_buf(), schema);

        let Some(conventions) = SchemaConventions::for_version(schema) else {
            warn!("No main node found in {}", source.display());
            report.skipped.push(SkipReason::SchemaUndetermined);
            return Ok(report);
        };
        if !tree.is_group(conventions.instrument) {
            return Err(Error::MissingNode(conventions.instrument.to_string()));
        }

        let source_name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        report.archetype = ScanClassifier::new(conventions).classify_tree(tree)?;
        if report.archetype == ScanArchetype::Unknown {
            info!(
                "Could not detect type of scan for {}. No output file will be written.",
                source_name
            );
        } else {
            info!("{} determined to be a {} scan", source_name, report.archetype);
        }

        let outcome = TableBuilder::new(tree, conventions).build(report.archetype, &source_name)?;
        report.skipped.extend(outcome.skipped);

        let writer = TableWriter::new(output_directory(source)).titles(self.header.titles_for(schema));
        for named in &outcome.tables {
            let stats = writer.write(&named.file_name, &named.table)?;
            info!("   ├─ {}", stats.summary());
            report.written.push(stats);
        }

        Ok(report)
    }
}

fn output_directory(source: &Path) -> PathBuf {
    match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
