//! Turning instrument children into formatted numeric series.

use log::debug;

use crate::error::Result;
use crate::models::Series;
use crate::schema::{ArrayConvention, SchemaConventions};
use crate::tree::{join, NodeKind, NumericArray, Tree};

/// Significant digits written for every numeric field.
pub const SIGNIFICANT_DIGITS: usize = 8;

/// Format a number like C's `%.8g`.
///
/// Fixed notation is used when the decimal exponent (after rounding to eight
/// significant digits) is in `-4..8`, scientific notation otherwise. Trailing
/// zeros are removed in both cases.
///
/// # Examples
///
/// ```
/// use nxs2txt::extractor::format_number;
///
/// assert_eq!(format_number(284.2), "284.2");
/// assert_eq!(format_number(1.0 / 3.0), "0.33333333");
/// assert_eq!(format_number(123456789.0), "1.2345679e+08");
/// assert_eq!(format_number(0.00001), "1e-05");
/// ```
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let scientific = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };

    if exponent < -4 || exponent >= SIGNIFICANT_DIGITS as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    } else {
        let decimals = (SIGNIFICANT_DIGITS as i32 - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

pub fn format_series(values: &[f64]) -> Series {
    Series::new(values.iter().copied().map(format_number).collect())
}

/// Resolves and formats the data of named instrument children.
pub struct SeriesExtractor<'a, T: Tree> {
    tree: &'a T,
    conventions: &'a SchemaConventions,
}

impl<'a, T: Tree> SeriesExtractor<'a, T> {
    pub fn new(tree: &'a T, conventions: &'a SchemaConventions) -> Self {
        Self { tree, conventions }
    }

    /// Path of the dataset holding `name`'s values under `parent`, trying
    /// each of the layout's value paths in turn.
    pub fn resolve(&self, parent: &str, name: &str) -> Option<String> {
        self.conventions
            .value_paths
            .iter()
            .map(|template| join(parent, &template.relative_to(name)))
            .find(|path| self.tree.exists(path))
    }

    /// Extract the series for child `name` of `parent`.
    ///
    /// An empty series means "not usable": the child has no value dataset,
    /// holds text, or is a scalar. Only failures to read an existing numeric
    /// dataset are errors.
    pub fn extract(&self, parent: &str, name: &str) -> Result<Series> {
        let Some(path) = self.resolve(parent, name) else {
            debug!("No value dataset for {}", name);
            return Ok(Series::empty());
        };
        if self.tree.node_kind(&path) != Some(NodeKind::Numeric) {
            debug!("{} is not numeric", path);
            return Ok(Series::empty());
        }

        let array = self.tree.read_numeric(&path)?;
        Ok(format_series(self.select(&array)))
    }

    fn select<'b>(&self, array: &'b NumericArray) -> &'b [f64] {
        match (self.conventions.arrays, array.ndim()) {
            (_, 0) => &[],
            (ArrayConvention::Flatten, _) => array.flatten(),
            (ArrayConvention::Vector, 1 | 2) => array.first_row(),
            (ArrayConvention::Vector, _) => &[],
        }
    }
}
