//! Experiment log: one tab-separated row of summary values per scan file.

use chrono::{DateTime, NaiveDateTime};
use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::batch::scan_files;
use crate::config::{ColumnSpec, LogConfig, LogField};
use crate::error::Result;
use crate::extractor::format_number;
use crate::tree::{NodeKind, Tree, TreeOpener};

const SCAN_COMMAND: &str = "entry/scan_command";
const START_TIME: &str = "entry/start_time";
const PHOTON_ENERGY: &str = "entry/instrument/pgm_energy/value";
const REGION_LIST: &str = "entry/analyser/region_list";

/// Outcome of writing an experiment log.
#[derive(Debug, Clone, Serialize)]
pub struct LogReport {
    pub output: PathBuf,
    pub rows: usize,
    /// Files that could not be read, with the reason
    pub skipped: Vec<String>,
}

/// Find the experiment number (two letters, five digits, `-`, one digit,
/// e.g. `si12345-1`) in a directory path.
pub fn experiment_id(path: &str) -> Option<&str> {
    path.as_bytes()
        .windows(9)
        .position(|w| {
            w[..2].iter().all(u8::is_ascii_alphabetic)
                && w[2..7].iter().all(u8::is_ascii_digit)
                && w[7] == b'-'
                && w[8].is_ascii_digit()
        })
        .map(|start| &path[start..start + 9])
}

/// Name of the log file written for the experiment directory `dir`.
pub fn log_file_name(dir: &Path) -> String {
    match experiment_id(&dir.to_string_lossy()) {
        Some(id) => format!("{}_log.tsv", id),
        None => "scan_log.tsv".to_string(),
    }
}

/// Parse the ISO 8601 start time of a scan, with or without an offset.
/// Times with an offset keep their local wall-clock value.
pub fn parse_start_time(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(text) {
        return Ok(with_offset.naive_local());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(naive);
    }
    Ok(NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")?)
}

/// Render the dataset at `path` as a log cell; absent paths and groups give
/// an empty cell.
pub fn render_path<T: Tree>(tree: &T, path: &str) -> Result<String> {
    let rendered = match tree.node_kind(path) {
        None | Some(NodeKind::Group) => String::new(),
        Some(NodeKind::Numeric) => {
            let array = tree.read_numeric(path)?;
            let cells: Vec<String> = array.flatten().iter().copied().map(format_number).collect();
            bracket(array.shape(), cells)
        }
        Some(NodeKind::Text) => {
            let array = tree.read_text(path)?;
            if array.shape().is_empty() {
                array.first().unwrap_or_default().to_string()
            } else {
                let cells = array.values().iter().map(|v| format!("'{}'", v)).collect();
                bracket(array.shape(), cells)
            }
        }
    };
    Ok(rendered.replace('\n', ""))
}

// Scalars render bare, 1-D as `[a b]`, 2-D as `[[a b] [c d]]`.
fn bracket(shape: &[usize], cells: Vec<String>) -> String {
    match shape {
        [] => cells.into_iter().next().unwrap_or_default(),
        [_, width] if *width > 0 => {
            let rows: Vec<String> = cells
                .chunks(*width)
                .map(|row| format!("[{}]", row.join(" ")))
                .collect();
            format!("[{}]", rows.join(" "))
        }
        _ => format!("[{}]", cells.join(" ")),
    }
}

fn read_start_time<T: Tree>(tree: &T, scan_number: &str) -> Option<NaiveDateTime> {
    if tree.node_kind(START_TIME) != Some(NodeKind::Text) {
        return None;
    }
    let text = tree.read_text(START_TIME).ok()?;
    match parse_start_time(text.first()?) {
        Ok(time) => Some(time),
        Err(e) => {
            warn!("Unreadable start time in scan {}: {}", scan_number, e);
            None
        }
    }
}

/// Per-file values shared by the derived columns.
struct ScanContext<'a, T: Tree> {
    tree: &'a T,
    scan_number: String,
    command: String,
    start_time: Option<NaiveDateTime>,
}

impl<'a, T: Tree> ScanContext<'a, T> {
    fn new(tree: &'a T, path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let scan_number = file_name.split(".nxs").next().unwrap_or_default().to_string();
        let command = render_path(tree, SCAN_COMMAND)?;
        let start_time = read_start_time(tree, &scan_number);

        Ok(Self {
            tree,
            scan_number,
            command,
            start_time,
        })
    }

    fn is_xps(&self) -> bool {
        self.command.contains("dummy_a 0 0 1")
    }

    fn scan_type(&self) -> &'static str {
        if self.is_xps() {
            "XPS"
        } else if self.command.contains("pgm_energy") {
            "NEXAFS"
        } else {
            " "
        }
    }

    fn endstation(&self) -> u8 {
        if self.command.contains("ca35b") {
            2
        } else {
            1
        }
    }

    fn cell(&self, column: &ColumnSpec) -> Result<String> {
        let value = match column {
            ColumnSpec::Path { path, .. } => render_path(self.tree, path)?,
            ColumnSpec::Motor {
                motor, endstation, ..
            } => {
                if self.endstation() == *endstation {
                    render_path(self.tree, &format!("entry/instrument/{}/value", motor))?
                } else {
                    " ".to_string()
                }
            }
            ColumnSpec::Field { field, .. } => match field {
                LogField::ScanNumber => self.scan_number.clone(),
                LogField::SampleName | LogField::NexafsRegion => String::new(),
                LogField::ScanType => self.scan_type().to_string(),
                LogField::XpsRegion if self.is_xps() => render_path(self.tree, REGION_LIST)?,
                LogField::XpsRegion => String::new(),
                LogField::PhotonEnergy if self.is_xps() => render_path(self.tree, PHOTON_ENERGY)?,
                LogField::PhotonEnergy => " ".to_string(),
                LogField::Endstation => self.endstation().to_string(),
                LogField::Date => self
                    .start_time
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                LogField::Time => self
                    .start_time
                    .map(|t| t.format("%H:%M:%S").to_string())
                    .unwrap_or_default(),
            },
        };
        Ok(value)
    }
}

/// Builds the experiment log for a folder of scan files.
pub struct ScanLogBuilder<O: TreeOpener> {
    opener: O,
    config: LogConfig,
}

impl<O: TreeOpener> ScanLogBuilder<O> {
    pub fn new(opener: O, config: LogConfig) -> Self {
        Self { opener, config }
    }

    /// One row of cells for an opened scan file, in configured column order.
    pub fn row<T: Tree>(&self, tree: &T, path: &Path) -> Result<Vec<String>> {
        let context = ScanContext::new(tree, path)?;
        self.config
            .columns
            .iter()
            .map(|column| context.cell(column))
            .collect()
    }

    /// Write `<experiment>_log.tsv` into `out_dir` summarizing every scan
    /// file in `dir`, in file name order.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is not a folder or the log cannot be written.
    /// Unreadable scan files are skipped and listed in the report.
    pub fn build(&self, dir: &Path, out_dir: &Path) -> Result<LogReport> {
        let files = scan_files(dir)?;
        let output = out_dir.join(log_file_name(dir));

        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .terminator(csv::Terminator::Any(b'\n'))
            .from_path(&output)?;
        writer.write_record(self.config.titles())?;

        let mut report = LogReport {
            output: output.clone(),
            rows: 0,
            skipped: Vec::new(),
        };

        for path in &files {
            let row = self
                .opener
                .open(path)
                .and_then(|tree| self.row(&tree, path));
            match row {
                Ok(row) => {
                    writer.write_record(&row)?;
                    report.rows += 1;
                }
                Err(e) => {
                    warn!("Skipping {} in log: {}", path.display(), e);
                    report.skipped.push(format!("{} : {}", path.display(), e));
                }
            }
        }
        writer.flush()?;

        info!("saved sample log to: {}", output.display());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experiment_id() {
        assert_eq!(experiment_id("/dls/b07/data/2024/si12345-1/raw"), Some("si12345-1"));
        assert_eq!(experiment_id("/tmp/scans"), None);
        assert_eq!(experiment_id("cm1234-1"), None);
    }

    #[test]
    fn test_log_file_name() {
        assert_eq!(log_file_name(Path::new("/data/si12345-1")), "si12345-1_log.tsv");
        assert_eq!(log_file_name(Path::new("/data/other")), "scan_log.tsv");
    }

    #[test]
    fn test_parse_start_time_variants() {
        let with_offset = parse_start_time("2024-03-05T14:07:09.123+01:00").unwrap();
        assert_eq!(with_offset.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-03-05 14:07:09");

        let naive = parse_start_time("2024-03-05T14:07:09").unwrap();
        assert_eq!(naive.format("%H:%M:%S").to_string(), "14:07:09");

        assert!(parse_start_time("yesterday").is_err());
    }

    #[test]
    fn test_bracket_rendering() {
        let cells = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(bracket(&[], cells(&["1.5"])), "1.5");
        assert_eq!(bracket(&[2], cells(&["1", "2"])), "[1 2]");
        assert_eq!(bracket(&[2, 2], cells(&["1", "2", "3", "4"])), "[[1 2] [3 4]]");
    }
}
