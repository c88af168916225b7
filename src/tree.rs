//! Read-only access to hierarchical scan containers.
//!
//! A NeXus file is consumed as a tree of named groups and datasets addressed
//! by `/`-separated paths. Everything above this module only talks to the
//! [`Tree`] trait, so the HDF5 backend and the in-memory [`MemoryTree`] are
//! interchangeable.

use crate::error::{Error, Result};
use std::path::Path;

/// What a path in the tree points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Numeric,
    Text,
}

/// Read access to one opened hierarchical file.
pub trait Tree {
    /// Kind of the node at `path`, or `None` if nothing lives there.
    fn node_kind(&self, path: &str) -> Option<NodeKind>;

    /// Names of the members of the group at `path`, in file-defined order.
    fn member_names(&self, path: &str) -> Result<Vec<String>>;

    /// Shape of the dataset at `path`. Scalars have an empty shape.
    fn shape(&self, path: &str) -> Result<Vec<usize>>;

    /// Read a numeric dataset, converting elements to `f64`.
    fn read_numeric(&self, path: &str) -> Result<NumericArray>;

    /// Read a string dataset, decoding byte strings as UTF-8.
    fn read_text(&self, path: &str) -> Result<TextArray>;

    fn exists(&self, path: &str) -> bool {
        self.node_kind(path).is_some()
    }

    fn is_group(&self, path: &str) -> bool {
        self.node_kind(path) == Some(NodeKind::Group)
    }
}

/// Opens scan files into [`Tree`] handles.
///
/// The returned tree owns the underlying file handle; dropping it releases
/// the file.
pub trait TreeOpener {
    type Tree: Tree;

    fn open(&self, path: &Path) -> Result<Self::Tree>;
}

/// Join a child name onto a group path.
pub fn join(parent: &str, child: &str) -> String {
    let parent = parent.trim_end_matches('/');
    let child = child.trim_start_matches('/');
    if parent.is_empty() {
        format!("/{}", child)
    } else {
        format!("{}/{}", parent, child)
    }
}

fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|part| !part.is_empty())
}

/// Row-major numeric dataset contents.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl NumericArray {
    /// Build an array from a shape and row-major data.
    ///
    /// # Errors
    ///
    /// Returns an error if the element count does not match the shape.
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(Error::Container(format!(
                "shape {:?} needs {} elements, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    pub fn scalar(value: f64) -> Self {
        Self {
            shape: Vec::new(),
            data: vec![value],
        }
    }

    pub fn vector(data: Vec<f64>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Build a 2-D array from equally long rows.
    pub fn matrix(rows: Vec<Vec<f64>>) -> Result<Self> {
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != width) {
            return Err(Error::Container("ragged rows in 2-D array".to_string()));
        }
        let height = rows.len();
        Self::new(vec![height, width], rows.into_iter().flatten().collect())
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Length of the first axis; `None` for scalars.
    pub fn first_axis_len(&self) -> Option<usize> {
        self.shape.first().copied()
    }

    /// All elements in row-major order, whatever the shape.
    pub fn flatten(&self) -> &[f64] {
        &self.data
    }

    /// The `[0, ...]` slice: the whole array for 1-D data, the first row for
    /// 2-D data, nothing for scalars or arrays with an empty first axis.
    pub fn first_row(&self) -> &[f64] {
        match self.shape.split_first() {
            None => &[],
            Some((_, [])) => &self.data,
            Some((&rows, rest)) => {
                if rows == 0 {
                    return &[];
                }
                let width: usize = rest.iter().product();
                &self.data[..width]
            }
        }
    }
}

/// String dataset contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextArray {
    shape: Vec<usize>,
    values: Vec<String>,
}

impl TextArray {
    pub fn new(shape: Vec<usize>, values: Vec<String>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(Error::Container(format!(
                "shape {:?} needs {} strings, got {}",
                shape,
                expected,
                values.len()
            )));
        }
        Ok(Self { shape, values })
    }

    pub fn scalar(value: impl Into<String>) -> Self {
        Self {
            shape: Vec::new(),
            values: vec![value.into()],
        }
    }

    pub fn list<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        Self {
            shape: vec![values.len()],
            values,
        }
    }

    /// A `(1, n)` array, the layout newer files use for region lists.
    pub fn row<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        Self {
            shape: vec![1, values.len()],
            values,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// First string, used for scalar text fields such as timestamps.
    pub fn first(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// The `[0, :]` slice for 2-D data, everything otherwise.
    pub fn first_row(&self) -> &[String] {
        match self.shape.as_slice() {
            [0, ..] => &[],
            [_, rest @ ..] if !rest.is_empty() => {
                let width: usize = rest.iter().product();
                &self.values[..width]
            }
            _ => &self.values,
        }
    }
}

#[derive(Debug, Clone)]
enum MemoryNode {
    Group(Vec<(String, MemoryNode)>),
    Numeric(NumericArray),
    Text(TextArray),
}

impl MemoryNode {
    fn kind(&self) -> NodeKind {
        match self {
            MemoryNode::Group(_) => NodeKind::Group,
            MemoryNode::Numeric(_) => NodeKind::Numeric,
            MemoryNode::Text(_) => NodeKind::Text,
        }
    }
}

/// An in-memory tree that keeps group members in insertion order.
///
/// # Examples
///
/// ```
/// use nxs2txt::tree::{MemoryTree, NumericArray, Tree};
///
/// let tree = MemoryTree::new()
///     .numeric("/entry/instrument/pgm_energy/value", NumericArray::vector(vec![280.0, 281.0]))
///     .group("/entry/instrument/analyser");
///
/// assert_eq!(
///     tree.member_names("/entry/instrument").unwrap(),
///     vec!["pgm_energy", "analyser"]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct MemoryTree {
    root: MemoryNode,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self {
            root: MemoryNode::Group(Vec::new()),
        }
    }

    /// Ensure a group exists at `path`, creating parents as needed.
    pub fn group(mut self, path: &str) -> Self {
        let parts: Vec<&str> = components(path).collect();
        insert_at(&mut self.root, &parts, None);
        self
    }

    /// Place a numeric dataset at `path`, replacing whatever was there.
    pub fn numeric(mut self, path: &str, array: NumericArray) -> Self {
        let parts: Vec<&str> = components(path).collect();
        insert_at(&mut self.root, &parts, Some(MemoryNode::Numeric(array)));
        self
    }

    /// Place a string dataset at `path`, replacing whatever was there.
    pub fn text(mut self, path: &str, array: TextArray) -> Self {
        let parts: Vec<&str> = components(path).collect();
        insert_at(&mut self.root, &parts, Some(MemoryNode::Text(array)));
        self
    }

    fn lookup(&self, path: &str) -> Option<&MemoryNode> {
        let mut node = &self.root;
        for part in components(path) {
            match node {
                MemoryNode::Group(members) => {
                    node = members
                        .iter()
                        .find(|(name, _)| name == part)
                        .map(|(_, child)| child)?;
                }
                _ => return None,
            }
        }
        Some(node)
    }

    fn require(&self, path: &str) -> Result<&MemoryNode> {
        self.lookup(path)
            .ok_or_else(|| Error::MissingNode(path.to_string()))
    }
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

// Intermediate datasets in the way of a new path are replaced by groups.
fn insert_at(node: &mut MemoryNode, parts: &[&str], leaf: Option<MemoryNode>) {
    let Some((first, rest)) = parts.split_first() else {
        match leaf {
            Some(leaf) => *node = leaf,
            None if !matches!(node, MemoryNode::Group(_)) => {
                *node = MemoryNode::Group(Vec::new());
            }
            None => {}
        }
        return;
    };

    if !matches!(node, MemoryNode::Group(_)) {
        *node = MemoryNode::Group(Vec::new());
    }
    if let MemoryNode::Group(members) = node {
        let idx = match members.iter().position(|(name, _)| name == first) {
            Some(idx) => idx,
            None => {
                members.push((first.to_string(), MemoryNode::Group(Vec::new())));
                members.len() - 1
            }
        };
        insert_at(&mut members[idx].1, rest, leaf);
    }
}

impl Tree for MemoryTree {
    fn node_kind(&self, path: &str) -> Option<NodeKind> {
        self.lookup(path).map(MemoryNode::kind)
    }

    fn member_names(&self, path: &str) -> Result<Vec<String>> {
        match self.require(path)? {
            MemoryNode::Group(members) => Ok(members.iter().map(|(name, _)| name.clone()).collect()),
            _ => Err(Error::Container(format!("{} is not a group", path))),
        }
    }

    fn shape(&self, path: &str) -> Result<Vec<usize>> {
        match self.require(path)? {
            MemoryNode::Numeric(array) => Ok(array.shape().to_vec()),
            MemoryNode::Text(array) => Ok(array.shape().to_vec()),
            MemoryNode::Group(_) => Err(Error::Container(format!("{} is a group", path))),
        }
    }

    fn read_numeric(&self, path: &str) -> Result<NumericArray> {
        match self.require(path)? {
            MemoryNode::Numeric(array) => Ok(array.clone()),
            _ => Err(Error::Container(format!("{} is not a numeric dataset", path))),
        }
    }

    fn read_text(&self, path: &str) -> Result<TextArray> {
        match self.require(path)? {
            MemoryNode::Text(array) => Ok(array.clone()),
            _ => Err(Error::Container(format!("{} is not a string dataset", path))),
        }
    }
}
