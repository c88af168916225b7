//! Test utilities for building scan trees in both file layouts
#![allow(dead_code)]

use nxs2txt::tree::{MemoryTree, NumericArray, TextArray, TreeOpener};
use nxs2txt::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Old,
    New,
}

/// Builder for scan trees laid out like B07 NeXus files
pub struct ScanBuilder {
    layout: Layout,
    tree: MemoryTree,
    scan_fields: Vec<String>,
}

impl ScanBuilder {
    /// Current layout rooted at `/entry`, classified from `scan_fields`
    pub fn new_layout() -> Self {
        Self {
            layout: Layout::New,
            tree: MemoryTree::new().group("/entry/instrument"),
            scan_fields: Vec::new(),
        }
    }

    /// Legacy layout rooted at `/entry1`, classified from instrument members
    pub fn old_layout() -> Self {
        Self {
            layout: Layout::Old,
            tree: MemoryTree::new().group("/entry1/instrument"),
            scan_fields: Vec::new(),
        }
    }

    pub fn instrument(&self) -> &'static str {
        match self.layout {
            Layout::Old => "/entry1/instrument",
            Layout::New => "/entry/instrument",
        }
    }

    fn value_path(&self, name: &str) -> String {
        match self.layout {
            Layout::Old => format!("{}/{}/{}", self.instrument(), name, name),
            Layout::New => format!("{}/{}/value", self.instrument(), name),
        }
    }

    /// Add a scanned field with array data at the layout's value path
    pub fn field(mut self, name: &str, array: NumericArray) -> Self {
        let path = self.value_path(name);
        self.tree = self.tree.numeric(&path, array);
        self.scan_fields.push(name.to_string());
        self
    }

    /// Add a 1-D scanned field
    pub fn vector(self, name: &str, values: &[f64]) -> Self {
        self.field(name, NumericArray::vector(values.to_vec()))
    }

    /// Add a scanned field holding a single scalar
    pub fn scalar(self, name: &str, value: f64) -> Self {
        self.field(name, NumericArray::scalar(value))
    }

    /// Add an instrument child that has no value dataset at all
    pub fn bare_group(mut self, name: &str) -> Self {
        let path = format!("{}/{}", self.instrument(), name);
        self.tree = self.tree.group(&path);
        self
    }

    /// Add the analyser with its region list
    pub fn analyser(mut self, regions: &[&str]) -> Self {
        let path = format!("{}/analyser/region_list", self.instrument());
        let list = match self.layout {
            Layout::Old => TextArray::list(regions.iter().copied()),
            Layout::New => TextArray::row(regions.iter().copied()),
        };
        self.tree = self.tree.text(&path, list);
        self.scan_fields.push("analyser".to_string());
        self
    }

    /// Add a region's binding energy and spectrum arrays
    pub fn region(mut self, name: &str, binding_energy: NumericArray, spectrum: NumericArray) -> Self {
        let base = format!("{}/{}", self.instrument(), name);
        self.tree = self
            .tree
            .numeric(&format!("{}/binding_energy", base), binding_energy)
            .numeric(&format!("{}/spectrum", base), spectrum);
        self
    }

    /// Add an auxiliary dataset (e.g. `spectrum_1`) to a region
    pub fn region_dataset(mut self, region: &str, name: &str, array: NumericArray) -> Self {
        let path = format!("{}/{}/{}", self.instrument(), region, name);
        self.tree = self.tree.numeric(&path, array);
        self
    }

    /// Add a name to the explicit scan-fields list only
    pub fn scan_field(mut self, name: &str) -> Self {
        self.scan_fields.push(name.to_string());
        self
    }

    pub fn build(self) -> MemoryTree {
        match self.layout {
            Layout::New => self.tree.text(
                "/entry/diamond_scan/scan_fields",
                TextArray::list(self.scan_fields),
            ),
            Layout::Old => self.tree,
        }
    }
}

/// A 2-D array with a single row
pub fn single_row(values: &[f64]) -> NumericArray {
    NumericArray::matrix(vec![values.to_vec()]).unwrap()
}

/// Opener serving in-memory trees keyed by file name
#[derive(Default)]
pub struct FixtureOpener {
    trees: HashMap<String, MemoryTree>,
}

impl FixtureOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, file_name: &str, tree: MemoryTree) -> Self {
        self.trees.insert(file_name.to_string(), tree);
        self
    }
}

impl TreeOpener for FixtureOpener {
    type Tree = MemoryTree;

    fn open(&self, path: &Path) -> Result<MemoryTree> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.trees
            .get(&name)
            .cloned()
            .ok_or_else(|| Error::Container(format!("unable to open {}", name)))
    }
}

/// Create an empty placeholder file so directory scans find it
pub fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"").unwrap();
    path
}

/// Read a written table back as rows of fields
pub fn read_rows(path: &Path) -> Vec<Vec<String>> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}
