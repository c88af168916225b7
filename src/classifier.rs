//! Scan type detection.
//!
//! A blunt distinction is used: photon energy plus a current measurement is
//! NEXAFS (with or without the analyser), the analyser alone is XPS, and a
//! manipulator or dummy scannable without either is a position scan.

use log::{debug, warn};

use crate::error::Result;
use crate::models::ScanArchetype;
use crate::schema::{
    SchemaConventions, ANALYSER, CURRENT_MARKER, ELECTROMETER_MARKER, MANIPULATOR_FIELDS,
    PHOTON_ENERGY,
};
use crate::tree::Tree;

pub struct ScanClassifier<'a> {
    conventions: &'a SchemaConventions,
}

impl<'a> ScanClassifier<'a> {
    pub fn new(conventions: &'a SchemaConventions) -> Self {
        Self { conventions }
    }

    /// Classify a scan from the names of its scanned fields. First match wins.
    pub fn classify<S: AsRef<str>>(&self, names: &[S]) -> ScanArchetype {
        let anchor = self.conventions.anchor_match;
        let detector = self.conventions.detector_match;

        let has_current =
            detector.any(names, CURRENT_MARKER) || detector.any(names, ELECTROMETER_MARKER);

        if anchor.any(names, PHOTON_ENERGY) && has_current {
            if anchor.any(names, ANALYSER) {
                ScanArchetype::NexafsWithAnalyser
            } else {
                ScanArchetype::Nexafs
            }
        } else if anchor.any(names, ANALYSER) {
            ScanArchetype::Xps
        } else if MANIPULATOR_FIELDS
            .iter()
            .any(|field| anchor.any(names, field))
        {
            ScanArchetype::PositionScan
        } else {
            ScanArchetype::Unknown
        }
    }

    /// The names classification is based on: the explicit scan-fields list
    /// when the layout has one, the instrument group's members otherwise.
    ///
    /// Returns `None` when the scan-fields dataset is absent.
    pub fn field_names<T: Tree>(&self, tree: &T) -> Result<Option<Vec<String>>> {
        match self.conventions.scan_fields {
            Some(path) => {
                if !tree.exists(path) {
                    warn!("No scan fields dataset at {}", path);
                    return Ok(None);
                }
                Ok(Some(tree.read_text(path)?.values().to_vec()))
            }
            None => Ok(Some(tree.member_names(self.conventions.instrument)?)),
        }
    }

    pub fn classify_tree<T: Tree>(&self, tree: &T) -> Result<ScanArchetype> {
        let Some(names) = self.field_names(tree)? else {
            return Ok(ScanArchetype::Unknown);
        };
        debug!("Classification fields: {:?}", names);
        Ok(self.classify(&names))
    }
}
