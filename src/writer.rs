//! Writing tables out as tab-separated text.

use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::Table;

/// Writer for tab-delimited `.dat` tables.
///
/// Rows are the positional zip of the table's columns; an optional header
/// row of column names comes first.
///
/// # Examples
///
/// ```no_run
/// use nxs2txt::models::{Series, Table};
/// use nxs2txt::TableWriter;
///
/// let mut table = Table::new();
/// table.push("pgm_energy", Series::new(vec!["280".into(), "281".into()]));
/// table.push("ca1", Series::new(vec!["0.5".into(), "0.6".into()]));
///
/// let stats = TableWriter::new("./output")
///     .titles(true)
///     .write("sample_NEXAFS.dat", &table)?;
/// println!("{}", stats.summary());
/// # Ok::<(), nxs2txt::Error>(())
/// ```
pub struct TableWriter {
    output_directory: PathBuf,
    titles: bool,
}

impl TableWriter {
    /// Create a writer that places files in `output_directory`.
    ///
    /// Titles are off by default.
    pub fn new<P: AsRef<Path>>(output_directory: P) -> Self {
        Self {
            output_directory: output_directory.as_ref().to_path_buf(),
            titles: false,
        }
    }

    /// Write a header row of column names before the data.
    pub fn titles(mut self, enabled: bool) -> Self {
        self.titles = enabled;
        self
    }

    /// Write `table` to `file_name` inside the output directory, replacing
    /// any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write(&self, file_name: &str, table: &Table) -> Result<WriteStats> {
        let path = self.output_directory.join(file_name);
        let file = File::create(&path)?;
        let row_count = self.write_to(file, table)?;

        Ok(WriteStats {
            path,
            num_columns: table.columns().len(),
            num_rows: row_count,
        })
    }

    /// Serialize `table` into any writer. Returns the number of data rows.
    pub fn write_to<W: std::io::Write>(&self, out: W, table: &Table) -> Result<usize> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(out);

        if self.titles {
            writer.write_record(table.column_names())?;
        }
        let mut rows = 0;
        for row in table.rows() {
            writer.write_record(row)?;
            rows += 1;
        }
        writer.flush()?;

        Ok(rows)
    }
}

/// Statistics about one written table.
#[derive(Debug, Clone, Serialize)]
pub struct WriteStats {
    pub path: PathBuf,
    pub num_columns: usize,
    pub num_rows: usize,
}

impl WriteStats {
    /// Get a human-readable summary of the write operation.
    pub fn summary(&self) -> String {
        format!(
            "Wrote {} rows x {} columns to {}",
            self.num_rows,
            self.num_columns,
            self.path.display()
        )
    }
}
