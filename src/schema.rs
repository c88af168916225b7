//! Schema generation probing and the per-generation node conventions.
//!
//! The same beamline has written two layouts over time. Both are handled by
//! one classifier and one extractor, configured by a [`SchemaConventions`]
//! value chosen from the probe result.

use log::{debug, warn};
use std::path::Path;

use crate::models::SchemaVersion;
use crate::tree::{Tree, TreeOpener};

/// Root group of the legacy layout.
pub const MAIN_NODE_OLD: &str = "entry1";
/// Root group of the current layout.
pub const MAIN_NODE_NEW: &str = "entry";

pub const PHOTON_ENERGY: &str = "pgm_energy";
pub const CURRENT_MARKER: &str = "ca";
pub const ELECTROMETER_MARKER: &str = "femto";
pub const ANALYSER: &str = "analyser";
/// Scannables whose presence marks a position scan.
pub const MANIPULATOR_FIELDS: [&str; 4] = ["sm21b_x", "sm21b_y", "sm21b_z", "dummy_a"];
/// Substrings selecting the leading column of a position scan table.
pub const MANIPULATOR_MARKERS: [&str; 2] = ["sm21b", "dummy"];

/// How a field name is tested against a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    Prefix,
    Substring,
}

impl MatchMode {
    pub fn matches(self, name: &str, marker: &str) -> bool {
        match self {
            MatchMode::Exact => name == marker,
            MatchMode::Prefix => name.starts_with(marker),
            MatchMode::Substring => name.contains(marker),
        }
    }

    pub fn any<S: AsRef<str>>(self, names: &[S], marker: &str) -> bool {
        names.iter().any(|name| self.matches(name.as_ref(), marker))
    }
}

/// How multi-dimensional datasets are turned into one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayConvention {
    /// Every element of any non-scalar shape, row-major
    Flatten,
    /// 1-D arrays whole, the first row of 2-D arrays, nothing otherwise
    Vector,
}

/// Where the values of an instrument child live, relative to the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuePath {
    /// `<name>/value`
    Value,
    /// `<name>/<name>`
    SameName,
}

impl ValuePath {
    pub fn relative_to(self, name: &str) -> String {
        match self {
            ValuePath::Value => format!("{}/value", name),
            ValuePath::SameName => format!("{}/{}", name, name),
        }
    }
}

/// Path templates and matching rules for one schema generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaConventions {
    pub version: SchemaVersion,
    pub instrument: &'static str,
    /// Explicit list of scanned fields; `None` classifies on instrument members.
    pub scan_fields: Option<&'static str>,
    /// Match mode for photon energy, analyser and manipulator fields.
    pub anchor_match: MatchMode,
    /// Match mode for current and electrometer fields.
    pub detector_match: MatchMode,
    pub value_paths: &'static [ValuePath],
    pub arrays: ArrayConvention,
    pub region_list: ArrayConvention,
    /// Drop `spectrum_N` datasets whose first axis is empty.
    pub skip_empty_spectra: bool,
}

pub const OLD_CONVENTIONS: SchemaConventions = SchemaConventions {
    version: SchemaVersion::Old,
    instrument: "/entry1/instrument",
    scan_fields: None,
    anchor_match: MatchMode::Exact,
    detector_match: MatchMode::Substring,
    value_paths: &[ValuePath::SameName],
    arrays: ArrayConvention::Flatten,
    region_list: ArrayConvention::Flatten,
    skip_empty_spectra: false,
};

pub const NEW_CONVENTIONS: SchemaConventions = SchemaConventions {
    version: SchemaVersion::New,
    instrument: "/entry/instrument",
    scan_fields: Some("/entry/diamond_scan/scan_fields"),
    anchor_match: MatchMode::Prefix,
    detector_match: MatchMode::Prefix,
    value_paths: &[ValuePath::Value, ValuePath::SameName],
    arrays: ArrayConvention::Vector,
    region_list: ArrayConvention::Vector,
    skip_empty_spectra: true,
};

impl SchemaConventions {
    pub fn for_version(version: SchemaVersion) -> Option<&'static SchemaConventions> {
        match version {
            SchemaVersion::Old => Some(&OLD_CONVENTIONS),
            SchemaVersion::New => Some(&NEW_CONVENTIONS),
            SchemaVersion::Unknown => None,
        }
    }
}

/// Decide the schema generation from the root group's members.
///
/// The legacy root wins when both are present. A root that cannot be listed
/// counts as unknown.
pub fn probe<T: Tree>(tree: &T) -> SchemaVersion {
    let roots = match tree.member_names("/") {
        Ok(roots) => roots,
        Err(e) => {
            warn!("Could not list root group: {}", e);
            return SchemaVersion::Unknown;
        }
    };

    if roots.iter().any(|r| r == MAIN_NODE_OLD) {
        debug!("File structure is OLD");
        SchemaVersion::Old
    } else if roots.iter().any(|r| r == MAIN_NODE_NEW) {
        debug!("File structure is NEW");
        SchemaVersion::New
    } else {
        warn!("No main node found among root members {:?}", roots);
        SchemaVersion::Unknown
    }
}

/// Open `path` just long enough to probe it. Open failures are logged and
/// reported as [`SchemaVersion::Unknown`].
pub fn probe_file<O: TreeOpener>(opener: &O, path: &Path) -> SchemaVersion {
    match opener.open(path) {
        Ok(tree) => probe(&tree),
        Err(e) => {
            warn!("Error reading {}: {}", path.display(), e);
            SchemaVersion::Unknown
        }
    }
}
