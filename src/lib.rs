//! # nxs2txt
//!
//! Converts B07 beamline NeXus scan files (`.nxs`) into plain tab-separated
//! `.dat` tables, and builds tab-separated experiment logs summarizing many
//! scans.
//!
//! ## Features
//!
//! - **Two layouts**: legacy (`/entry1`) and current (`/entry`) files are
//!   detected per file and routed automatically
//! - **Scan classification**: XPS, NEXAFS (with or without the analyser),
//!   and manipulator/dummy position scans
//! - **Deterministic columns**: fixed per-scan-type column order, numbers
//!   written with eight significant digits
//! - **Batch runs**: a failing file is recorded and the run continues
//!
//! ## Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "hdf5")]
//! # fn run() -> nxs2txt::Result<()> {
//! use nxs2txt::{BatchRunner, Converter, HeaderPolicy, Hdf5Opener};
//!
//! let runner = BatchRunner::new(Hdf5Opener, Converter::new(HeaderPolicy::default()));
//! let report = runner.run("/dls/b07/data/2024/si12345-1".as_ref())?;
//!
//! println!("{}", report.summary());
//! for line in &report.errors {
//!     println!("{}", line);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Output
//!
//! | Scan type        | File                          | Columns |
//! |------------------|-------------------------------|---------|
//! | XPS              | `<stem>_<region>_XPS.dat`     | `binding_energy`, `intensity`, `spectrum_1`.. |
//! | NEXAFS           | `<stem>_NEXAFS.dat`           | `pgm_energy`, region, currents |
//! | Position scan    | `<stem>_XY.dat`               | scannables, currents |
//!
//! Columns of different lengths are zipped; the table is as long as its
//! shortest column.
//!
//! ## Reading Files
//!
//! Everything works on the [`Tree`](tree::Tree) trait. The `hdf5` feature
//! provides [`Hdf5Opener`]; [`MemoryTree`](tree::MemoryTree) builds trees in
//! memory:
//!
//! ```
//! use nxs2txt::classifier::ScanClassifier;
//! use nxs2txt::models::ScanArchetype;
//! use nxs2txt::schema::{probe, SchemaConventions};
//! use nxs2txt::tree::{MemoryTree, NumericArray, TextArray};
//!
//! let tree = MemoryTree::new()
//!     .text("/entry/diamond_scan/scan_fields", TextArray::list(["pgm_energy", "ca1"]))
//!     .numeric("/entry/instrument/pgm_energy/value", NumericArray::vector(vec![280.0, 281.0]))
//!     .numeric("/entry/instrument/ca1/value", NumericArray::vector(vec![0.1, 0.2]));
//!
//! let conventions = SchemaConventions::for_version(probe(&tree)).unwrap();
//! let archetype = ScanClassifier::new(conventions).classify_tree(&tree)?;
//! assert_eq!(archetype, ScanArchetype::Nexafs);
//! # Ok::<(), nxs2txt::Error>(())
//! ```

// Public API modules
pub mod batch;
pub mod config;
pub mod converter;
pub mod error;
pub mod scan_log;
pub mod writer;

// Re-export commonly used types
pub use batch::{BatchReport, BatchRunner};
pub use config::{HeaderPolicy, LogConfig};
pub use converter::Converter;
pub use error::{Error, Result};
pub use scan_log::{LogReport, ScanLogBuilder};
pub use writer::{TableWriter, WriteStats};

#[cfg(feature = "hdf5")]
pub use hdf5_tree::{Hdf5Opener, Hdf5Tree};

// Building blocks (public but not part of the high-level API)
pub mod classifier;
pub mod extractor;
pub mod models;
pub mod schema;
pub mod table;
pub mod tree;

#[cfg(feature = "hdf5")]
pub mod hdf5_tree;
