//! [`Tree`] backend over HDF5 files (NeXus `.nxs`).
//!
//! Requires the system HDF5 library; enabled with the `hdf5` cargo feature.

use hdf5::types::{FixedAscii, FixedUnicode, TypeDescriptor, VarLenAscii, VarLenUnicode};
use hdf5::{Dataset, File};
use log::warn;
use std::path::Path;

use crate::error::{Error, Result};
use crate::tree::{NodeKind, NumericArray, TextArray, Tree, TreeOpener};

// Read buffers for fixed-length strings, smallest first. A stored string is
// converted up to the first capacity that holds it.
const FIXED_STRING_CAPACITIES: [usize; 4] = [256, 1024, 4096, 16384];

/// An open HDF5 file. Dropping it closes the file.
pub struct Hdf5Tree {
    file: File,
}

impl Hdf5Tree {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            file: File::open(path)?,
        })
    }

    // Walk one link at a time so missing parents never reach the HDF5 error stack.
    fn link_exists(&self, path: &str) -> bool {
        let mut prefix = String::new();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            prefix.push('/');
            prefix.push_str(part);
            if !self.file.link_exists(&prefix) {
                return false;
            }
        }
        true
    }

    fn dataset(&self, path: &str) -> Result<Dataset> {
        Ok(self.file.dataset(path)?)
    }
}

fn is_text(descriptor: &TypeDescriptor) -> bool {
    matches!(
        descriptor,
        TypeDescriptor::FixedAscii(_)
            | TypeDescriptor::FixedUnicode(_)
            | TypeDescriptor::VarLenAscii
            | TypeDescriptor::VarLenUnicode
    )
}

impl Tree for Hdf5Tree {
    fn node_kind(&self, path: &str) -> Option<NodeKind> {
        if path.trim_matches('/').is_empty() {
            return Some(NodeKind::Group);
        }
        if !self.link_exists(path) {
            return None;
        }
        if self.file.group(path).is_ok() {
            return Some(NodeKind::Group);
        }
        let descriptor = self.file.dataset(path).ok()?.dtype().ok()?.to_descriptor().ok()?;
        if is_text(&descriptor) {
            Some(NodeKind::Text)
        } else {
            Some(NodeKind::Numeric)
        }
    }

    fn member_names(&self, path: &str) -> Result<Vec<String>> {
        Ok(self.file.group(path)?.member_names()?)
    }

    fn shape(&self, path: &str) -> Result<Vec<usize>> {
        Ok(self.dataset(path)?.shape())
    }

    fn read_numeric(&self, path: &str) -> Result<NumericArray> {
        let dataset = self.dataset(path)?;
        let data = dataset.read_raw::<f64>()?;
        NumericArray::new(dataset.shape(), data)
    }

    fn read_text(&self, path: &str) -> Result<TextArray> {
        let dataset = self.dataset(path)?;
        let values: Vec<String> = match dataset.dtype()?.to_descriptor()? {
            TypeDescriptor::VarLenUnicode => dataset
                .read_raw::<VarLenUnicode>()?
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
            TypeDescriptor::VarLenAscii => dataset
                .read_raw::<VarLenAscii>()?
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
            TypeDescriptor::FixedUnicode(size) => read_fixed(&dataset, size, true)?,
            TypeDescriptor::FixedAscii(size) => read_fixed(&dataset, size, false)?,
            other => {
                return Err(Error::Container(format!(
                    "{} is not a string dataset ({:?})",
                    path, other
                )))
            }
        };
        TextArray::new(dataset.shape(), values)
    }
}

/// Buffer capacity for a fixed-length string of `size` bytes, or `None` when
/// the string is longer than every supported buffer.
fn fixed_capacity(size: usize) -> Option<usize> {
    FIXED_STRING_CAPACITIES.into_iter().find(|&capacity| size <= capacity)
}

fn read_fixed(dataset: &Dataset, size: usize, unicode: bool) -> Result<Vec<String>> {
    let capacity = match fixed_capacity(size) {
        Some(capacity) => capacity,
        None => {
            let largest = FIXED_STRING_CAPACITIES[FIXED_STRING_CAPACITIES.len() - 1];
            warn!(
                "Fixed-length strings in {} hold {} bytes; reading only the first {}",
                dataset.name(),
                size,
                largest
            );
            largest
        }
    };

    match (capacity, unicode) {
        (256, true) => read_fixed_unicode::<256>(dataset),
        (256, false) => read_fixed_ascii::<256>(dataset),
        (1024, true) => read_fixed_unicode::<1024>(dataset),
        (1024, false) => read_fixed_ascii::<1024>(dataset),
        (4096, true) => read_fixed_unicode::<4096>(dataset),
        (4096, false) => read_fixed_ascii::<4096>(dataset),
        (_, true) => read_fixed_unicode::<16384>(dataset),
        (_, false) => read_fixed_ascii::<16384>(dataset),
    }
}

fn read_fixed_ascii<const N: usize>(dataset: &Dataset) -> Result<Vec<String>> {
    Ok(dataset
        .read_raw::<FixedAscii<N>>()?
        .iter()
        .map(|s| s.as_str().trim_end_matches('\0').to_string())
        .collect())
}

fn read_fixed_unicode<const N: usize>(dataset: &Dataset) -> Result<Vec<String>> {
    Ok(dataset
        .read_raw::<FixedUnicode<N>>()?
        .iter()
        .map(|s| s.as_str().trim_end_matches('\0').to_string())
        .collect())
}

/// Opens `.nxs` files through the HDF5 library.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hdf5Opener;

impl TreeOpener for Hdf5Opener {
    type Tree = Hdf5Tree;

    fn open(&self, path: &Path) -> Result<Hdf5Tree> {
        Hdf5Tree::open(path)
    }
}
