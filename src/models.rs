use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::writer::WriteStats;

/// Which generation of the B07 file layout a scan file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SchemaVersion {
    /// Legacy layout rooted at `/entry1`
    Old,
    /// Current layout rooted at `/entry`
    New,
    /// Neither root is present, or the file could not be opened
    Unknown,
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::Old => write!(f, "OLD"),
            SchemaVersion::New => write!(f, "NEW"),
            SchemaVersion::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScanArchetype {
    Xps,
    Nexafs,
    NexafsWithAnalyser,
    PositionScan,
    Unknown,
}

impl ScanArchetype {
    /// Suffix appended to the output file stem, if this archetype writes files.
    pub fn file_suffix(self) -> Option<&'static str> {
        match self {
            ScanArchetype::Xps => Some("XPS"),
            ScanArchetype::Nexafs | ScanArchetype::NexafsWithAnalyser => Some("NEXAFS"),
            ScanArchetype::PositionScan => Some("XY"),
            ScanArchetype::Unknown => None,
        }
    }
}

impl fmt::Display for ScanArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScanArchetype::Xps => "XPS",
            ScanArchetype::Nexafs => "NEXAFS",
            ScanArchetype::NexafsWithAnalyser => "NEXAFS with analyser",
            ScanArchetype::PositionScan => "position (XY) scan",
            ScanArchetype::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// One column's formatted values, derived from a single source array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Series(Vec<String>);

impl Series {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for Series {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub series: Series,
}

/// An ordered set of named columns.
///
/// Columns may have different lengths. Rows are produced by zipping the
/// columns positionally, so the table is as long as its shortest column and
/// the tails of longer columns are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, series: Series) {
        self.columns.push(Column {
            name: name.into(),
            series,
        });
    }

    pub fn insert_front(&mut self, name: impl Into<String>, series: Series) {
        self.columns.insert(
            0,
            Column {
                name: name.into(),
                series,
            },
        );
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.columns
            .iter()
            .map(|c| c.series.len())
            .min()
            .unwrap_or(0)
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        (0..self.row_count()).map(move |i| {
            self.columns
                .iter()
                .map(|c| c.series.values()[i].as_str())
                .collect()
        })
    }
}

/// A table together with the file name it is written under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTable {
    pub file_name: String,
    pub table: Table,
}

/// Why a scan, region or file produced no output. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// Neither known root group was found, or the file could not be opened
    SchemaUndetermined,
    /// No archetype matched the scan fields
    ClassificationFailed,
    /// The region's binding energy axis has zero length
    EmptyRegion { region: String },
    /// A dataset the region needs is missing or unreadable
    UnreadableRegion { region: String, message: String },
    /// NEXAFS with analyser needs exactly one region
    RegionCountMismatch { found: usize },
    /// Every candidate column was empty or absent
    NoUsableColumns,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::SchemaUndetermined => write!(f, "no known main node"),
            SkipReason::ClassificationFailed => write!(f, "could not detect scan type"),
            SkipReason::EmptyRegion { region } => {
                write!(f, "empty binding energy dataset in region {}", region)
            }
            SkipReason::UnreadableRegion { region, message } => {
                write!(f, "region {} could not be read: {}", region, message)
            }
            SkipReason::RegionCountMismatch { found } => {
                write!(f, "expected exactly one analyser region, found {}", found)
            }
            SkipReason::NoUsableColumns => write!(f, "no usable data columns"),
        }
    }
}

/// Outcome of converting one scan file.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub source: PathBuf,
    pub schema: SchemaVersion,
    pub archetype: ScanArchetype,
    pub written: Vec<WriteStats>,
    pub skipped: Vec<SkipReason>,
}

impl ConversionReport {
    pub fn new(source: PathBuf, schema: SchemaVersion) -> Self {
        Self {
            source,
            schema,
            archetype: ScanArchetype::Unknown,
            written: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// A classified scan that still wrote nothing.
    pub fn is_empty_output(&self) -> bool {
        self.archetype != ScanArchetype::Unknown && self.written.is_empty()
    }
}
