//! Run configuration: header policy for converted tables and the column set
//! of the experiment log.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::SchemaVersion;

/// Whether converted tables get a header row.
///
/// The two layouts have opposite defaults: tables from legacy files carry
/// titles unless `titles_off` is set, tables from current files only carry
/// them when `titles_on` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderPolicy {
    pub titles_on: bool,
    pub titles_off: bool,
}

impl HeaderPolicy {
    pub fn titles_for(&self, schema: SchemaVersion) -> bool {
        match schema {
            SchemaVersion::Old => !self.titles_off,
            SchemaVersion::New => self.titles_on,
            SchemaVersion::Unknown => false,
        }
    }
}

/// Values computed from the scan rather than read from one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogField {
    ScanNumber,
    SampleName,
    ScanType,
    NexafsRegion,
    XpsRegion,
    PhotonEnergy,
    Endstation,
    Date,
    Time,
}

/// One column of the experiment log.
///
/// In TOML each column is a `[[column]]` table with a `title` and exactly
/// one of `path`, `field`, or `motor` + `endstation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSpec {
    /// Value of a motor that is only meaningful on one endstation.
    Motor {
        title: String,
        motor: String,
        endstation: u8,
    },
    /// Rendered value of the dataset at `path`; empty when absent.
    Path { title: String, path: String },
    Field { title: String, field: LogField },
}

impl ColumnSpec {
    pub fn title(&self) -> &str {
        match self {
            ColumnSpec::Motor { title, .. }
            | ColumnSpec::Path { title, .. }
            | ColumnSpec::Field { title, .. } => title,
        }
    }

    fn field(title: &str, field: LogField) -> Self {
        ColumnSpec::Field {
            title: title.to_string(),
            field,
        }
    }

    fn path(title: &str, path: &str) -> Self {
        ColumnSpec::Path {
            title: title.to_string(),
            path: path.to_string(),
        }
    }

    fn motor(title: &str, motor: &str, endstation: u8) -> Self {
        ColumnSpec::Motor {
            title: title.to_string(),
            motor: motor.to_string(),
            endstation,
        }
    }
}

/// Column set of the experiment log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(rename = "column")]
    pub columns: Vec<ColumnSpec>,
}

impl LogConfig {
    /// Parse a TOML column configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the text is not valid or lists no columns.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: LogConfig = toml::from_str(text)?;
        if config.columns.is_empty() {
            return Err(Error::Config("no columns configured".to_string()));
        }
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&text)
    }

    pub fn titles(&self) -> Vec<&str> {
        self.columns.iter().map(ColumnSpec::title).collect()
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        use LogField::*;

        let columns = vec![
            ColumnSpec::field("Scan Number", ScanNumber),
            ColumnSpec::field("Sample Name", SampleName),
            ColumnSpec::field("Scan Type", ScanType),
            ColumnSpec::field("NEXAFS Region", NexafsRegion),
            ColumnSpec::field("XPS Region", XpsRegion),
            ColumnSpec::field("Photon Energy", PhotonEnergy),
            ColumnSpec::path("cff", "entry/instrument/pgm_cff/value"),
            ColumnSpec::field("Endstation", Endstation),
            ColumnSpec::path("s4b_Ygapsize", "entry/instrument/s4b_ygapsize/value"),
            ColumnSpec::path("Scan Command", "entry/scan_command"),
            ColumnSpec::motor("sm21b_x", "sm21b_x", 2),
            ColumnSpec::motor("sm21b_y", "sm21b_y", 2),
            ColumnSpec::motor("sm21b_z", "sm21b_z", 2),
            ColumnSpec::motor("sm21b_roty", "sm21b_roty", 2),
            ColumnSpec::motor("sm52b_xp", "sm52b_xp", 1),
            ColumnSpec::motor("sm52b_yp", "sm52b_yp", 1),
            ColumnSpec::motor("sm52b_zp", "sm52b_zp", 1),
            ColumnSpec::motor("sm52b_rotY", "sm52b_roty", 1),
            ColumnSpec::motor("sm52b_rotZ", "sm52b_rotz", 1),
            ColumnSpec::path(
                "m4b YBASE motor position",
                "entry/instrument/m4b_y_base_positioner/value",
            ),
            ColumnSpec::path(
                "m5b YBASE motor position",
                "entry/instrument/m5b_y_base_positioner/value",
            ),
            ColumnSpec::field("Date", Date),
            ColumnSpec::field("Time", Time),
        ];

        Self { columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_policy_defaults() {
        let policy = HeaderPolicy::default();
        assert!(policy.titles_for(SchemaVersion::Old));
        assert!(!policy.titles_for(SchemaVersion::New));

        let flipped = HeaderPolicy {
            titles_on: true,
            titles_off: true,
        };
        assert!(!flipped.titles_for(SchemaVersion::Old));
        assert!(flipped.titles_for(SchemaVersion::New));
    }

    #[test]
    fn test_default_log_columns() {
        let config = LogConfig::default();
        let titles = config.titles();
        assert_eq!(titles.len(), 23);
        assert_eq!(titles.first(), Some(&"Scan Number"));
        assert_eq!(titles.last(), Some(&"Time"));
    }

    #[test]
    fn test_parse_toml_columns() {
        let text = r#"
            [[column]]
            title = "Scan"
            field = "scan_number"

            [[column]]
            title = "cff"
            path = "entry/instrument/pgm_cff/value"

            [[column]]
            title = "X"
            motor = "sm21b_x"
            endstation = 2
        "#;
        let config = LogConfig::from_toml(text).unwrap();
        assert_eq!(
            config.columns,
            vec![
                ColumnSpec::field("Scan", LogField::ScanNumber),
                ColumnSpec::path("cff", "entry/instrument/pgm_cff/value"),
                ColumnSpec::motor("X", "sm21b_x", 2),
            ]
        );
    }

    #[test]
    fn test_empty_config_rejected() {
        assert!(matches!(
            LogConfig::from_toml("column = []"),
            Err(Error::Config(_))
        ));
        assert!(LogConfig::from_toml("not toml [").is_err());
    }
}
