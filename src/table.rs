//! Per-archetype column selection and ordering.
//!
//! Column order is fixed by the scan type, not by discovery order:
//!
//! - XPS: `binding_energy`, `intensity`, `spectrum_1` .. `spectrum_k`, one
//!   table per analyser region.
//! - NEXAFS: `pgm_energy` first, then the analyser region (if any), then
//!   current and electrometer channels in encounter order.
//! - Position scans: manipulator or dummy scannables at the front (each new
//!   match goes in front of the previous ones), then currents.
//!
//! Columns whose series comes back empty are left out entirely.

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::extractor::{format_series, SeriesExtractor};
use crate::models::{NamedTable, ScanArchetype, Series, SkipReason, Table};
use crate::schema::{
    ArrayConvention, SchemaConventions, ANALYSER, CURRENT_MARKER, ELECTROMETER_MARKER,
    MANIPULATOR_MARKERS, PHOTON_ENERGY,
};
use crate::tree::{join, Tree};

const BINDING_ENERGY: &str = "binding_energy";
const SPECTRUM: &str = "spectrum";
const SPECTRUM_PREFIX: &str = "spectrum_";
const INTENSITY_TITLE: &str = "intensity";

/// Tables produced for one scan, plus whatever was skipped on the way.
#[derive(Debug, Default)]
pub struct BuildOutcome {
    pub tables: Vec<NamedTable>,
    pub skipped: Vec<SkipReason>,
}

pub struct TableBuilder<'a, T: Tree> {
    tree: &'a T,
    conventions: &'a SchemaConventions,
    extractor: SeriesExtractor<'a, T>,
}

impl<'a, T: Tree> TableBuilder<'a, T> {
    pub fn new(tree: &'a T, conventions: &'a SchemaConventions) -> Self {
        Self {
            tree,
            conventions,
            extractor: SeriesExtractor::new(tree, conventions),
        }
    }

    fn instrument(&self) -> &'static str {
        self.conventions.instrument
    }

    /// Build every table for a scan of the given archetype.
    ///
    /// `source_name` is the scan file's name; output names are derived from it.
    pub fn build(&self, archetype: ScanArchetype, source_name: &str) -> Result<BuildOutcome> {
        let mut outcome = BuildOutcome::default();

        match archetype {
            ScanArchetype::Xps => {
                let regions = self.region_names()?;
                info!("Number of regions found: {}", regions.len());
                for region in regions {
                    debug!("Region {}", region);
                    match self.xps_table(&region) {
                        Ok(Some(table)) => outcome.tables.push(NamedTable {
                            file_name: output_file_name(source_name, Some(&region), "XPS"),
                            table,
                        }),
                        Ok(None) => {
                            warn!("Empty binding energy dataset in region {} - skipping", region);
                            outcome.skipped.push(SkipReason::EmptyRegion { region });
                        }
                        Err(e) => {
                            warn!("Region {} could not be read - skipping: {}", region, e);
                            outcome.skipped.push(SkipReason::UnreadableRegion {
                                region,
                                message: e.to_string(),
                            });
                        }
                    }
                }
            }
            ScanArchetype::Nexafs => {
                let table = self.nexafs_table(None)?;
                self.push_single(&mut outcome, table, archetype, source_name);
            }
            ScanArchetype::NexafsWithAnalyser => {
                let regions = self.region_names()?;
                if let [region] = regions.as_slice() {
                    info!("Region name: {}", region);
                    let table = self.nexafs_table(Some(region))?;
                    self.push_single(&mut outcome, table, archetype, source_name);
                } else {
                    warn!(
                        "Number of regions does not equal 1 ({}). Not sure what to do with this file.",
                        regions.len()
                    );
                    outcome.skipped.push(SkipReason::RegionCountMismatch {
                        found: regions.len(),
                    });
                }
            }
            ScanArchetype::PositionScan => {
                let table = self.position_table()?;
                self.push_single(&mut outcome, table, archetype, source_name);
            }
            ScanArchetype::Unknown => {
                outcome.skipped.push(SkipReason::ClassificationFailed);
            }
        }

        Ok(outcome)
    }

    fn push_single(
        &self,
        outcome: &mut BuildOutcome,
        table: Table,
        archetype: ScanArchetype,
        source_name: &str,
    ) {
        match archetype.file_suffix() {
            Some(suffix) if !table.is_empty() => {
                info!("Data types found: {}", table.column_names().join(" "));
                outcome.tables.push(NamedTable {
                    file_name: output_file_name(source_name, None, suffix),
                    table,
                });
            }
            _ => outcome.skipped.push(SkipReason::NoUsableColumns),
        }
    }

    /// Region names listed by the analyser, decoded to text.
    pub fn region_names(&self) -> Result<Vec<String>> {
        let path = join(self.instrument(), &format!("{}/region_list", ANALYSER));
        if !self.tree.exists(&path) {
            return Err(Error::MissingNode(path));
        }
        let list = self.tree.read_text(&path)?;
        let names = match self.conventions.region_list {
            ArrayConvention::Vector => list.first_row(),
            ArrayConvention::Flatten => list.values(),
        };
        Ok(names.to_vec())
    }

    /// Binding energy, intensity and auxiliary spectra of one region.
    ///
    /// Returns `None` when the binding energy axis is empty.
    pub fn xps_table(&self, region: &str) -> Result<Option<Table>> {
        let region_path = join(self.instrument(), region);
        let binding_path = join(&region_path, BINDING_ENERGY);

        if self.tree.shape(&self.require(&binding_path)?)?.first() == Some(&0) {
            return Ok(None);
        }

        let mut table = Table::new();
        table.push(BINDING_ENERGY, self.first_row_series(&binding_path)?);
        let spectrum_path = join(&region_path, SPECTRUM);
        table.push(INTENSITY_TITLE, self.first_row_series(&self.require(&spectrum_path)?)?);

        let count = self.spectrum_count(&region_path)?;
        for index in 1..=count {
            let name = format!("{}{}", SPECTRUM_PREFIX, index);
            let path = self.require(&join(&region_path, &name))?;
            table.push(name, self.first_row_series(&path)?);
        }

        Ok(Some(table))
    }

    fn spectrum_count(&self, region_path: &str) -> Result<usize> {
        let count = self
            .tree
            .member_names(region_path)?
            .iter()
            .filter(|name| name.contains(SPECTRUM_PREFIX))
            .filter(|name| {
                !self.conventions.skip_empty_spectra
                    || self
                        .tree
                        .shape(&join(region_path, name))
                        .map(|shape| shape.first().is_some_and(|&len| len > 0))
                        .unwrap_or(false)
            })
            .count();
        Ok(count)
    }

    /// Photon energy against currents, optionally with the single analyser
    /// region's integrated signal.
    pub fn nexafs_table(&self, region: Option<&str>) -> Result<Table> {
        let mut table = Table::new();

        if let Some(region) = region {
            self.push_if_usable(&mut table, region, false)?;
        }

        for item in self.tree.member_names(self.instrument())? {
            if item == PHOTON_ENERGY {
                self.push_if_usable(&mut table, &item, true)?;
            } else if is_detector(&item) {
                self.push_if_usable(&mut table, &item, false)?;
            }
        }

        Ok(table)
    }

    /// Manipulator or dummy scannables against currents.
    pub fn position_table(&self) -> Result<Table> {
        let mut table = Table::new();

        for item in self.tree.member_names(self.instrument())? {
            if MANIPULATOR_MARKERS.iter().any(|marker| item.contains(marker)) {
                self.push_if_usable(&mut table, &item, true)?;
            } else if is_detector(&item) {
                self.push_if_usable(&mut table, &item, false)?;
            }
        }

        Ok(table)
    }

    fn push_if_usable(&self, table: &mut Table, name: &str, front: bool) -> Result<()> {
        let series = self.extractor.extract(self.instrument(), name)?;
        if series.is_empty() {
            debug!("Skipping {}: no usable data", name);
        } else if front {
            table.insert_front(name, series);
        } else {
            table.push(name, series);
        }
        Ok(())
    }

    fn first_row_series(&self, path: &str) -> Result<Series> {
        let array = self.tree.read_numeric(path)?;
        Ok(format_series(array.first_row()))
    }

    fn require(&self, path: &str) -> Result<String> {
        if self.tree.exists(path) {
            Ok(path.to_string())
        } else {
            Err(Error::MissingNode(path.to_string()))
        }
    }
}

fn is_detector(name: &str) -> bool {
    name.contains(CURRENT_MARKER) || name.contains(ELECTROMETER_MARKER)
}

/// Output file name for a scan file: the name up to its first `.`, the
/// region (if any) and archetype suffix appended, spaces replaced by `_`.
pub fn output_file_name(source_name: &str, region: Option<&str>, suffix: &str) -> String {
    let stem = source_name.split('.').next().unwrap_or(source_name);
    let name = match region {
        Some(region) => format!("{}_{}_{}.dat", stem, region, suffix),
        None => format!("{}_{}.dat", stem, suffix),
    };
    name.replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("sample.nxs", None, "NEXAFS"), "sample_NEXAFS.dat");
        assert_eq!(
            output_file_name("b07-1234.nxs", Some("C 1s"), "XPS"),
            "b07-1234_C_1s_XPS.dat"
        );
        assert_eq!(output_file_name("my scan.v2.nxs", None, "XY"), "my_scan_XY.dat");
    }

    #[test]
    fn test_is_detector() {
        assert!(is_detector("ca1"));
        assert!(is_detector("femto3"));
        assert!(is_detector("scaler"));
        assert!(!is_detector("pgm_energy"));
    }
}
