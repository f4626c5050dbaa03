use super::point::SweepPoint;
use std::fmt;
use std::ops::Range;
use thiserror::Error;

/// Identifies one of the two sweep axes.
///
/// Axis A is conventionally the correlation time and axis B the relaxation (spin-diffusion)
/// rate, but the engine treats both as opaque coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisId {
    A,
    B,
}

impl AxisId {
    pub fn token(self) -> char {
        match self {
            AxisId::A => 'a',
            AxisId::B => 'b',
        }
    }
}

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "axis-{}", self.token())
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum GridError {
    #[error("{axis} has no values")]
    EmptyAxis { axis: AxisId },

    #[error("{axis} contains a non-finite value at index {index}")]
    NonFinite { axis: AxisId, index: usize },

    #[error("A log-spaced axis needs at least one point")]
    ZeroCount,
}

/// Returns `count` values evenly spaced on a decadic log scale between `10^start` and
/// `10^stop`, both inclusive.
///
/// The exponents are computed as `start + k * step` so that regenerating an axis from the
/// same parameters reproduces it bit for bit.
pub fn logspace(start: f64, stop: f64, count: usize) -> Result<Vec<f64>, GridError> {
    match count {
        0 => Err(GridError::ZeroCount),
        1 => Ok(vec![10f64.powf(start)]),
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            Ok((0..count)
                .map(|k| {
                    let exponent = if k == count - 1 {
                        stop
                    } else {
                        start + k as f64 * step
                    };
                    10f64.powf(exponent)
                })
                .collect())
        }
    }
}

/// The immutable coordinate grid of a sweep.
///
/// Equality is exact floating-point equality of both axes, which is sufficient because axes
/// are always regenerated deterministically from the same parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    axis_a: Vec<f64>,
    axis_b: Vec<f64>,
}

impl Grid {
    pub fn new(axis_a: Vec<f64>, axis_b: Vec<f64>) -> Result<Self, GridError> {
        Self::validate(AxisId::A, &axis_a)?;
        Self::validate(AxisId::B, &axis_b)?;
        Ok(Self { axis_a, axis_b })
    }

    fn validate(axis: AxisId, values: &[f64]) -> Result<(), GridError> {
        if values.is_empty() {
            return Err(GridError::EmptyAxis { axis });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(GridError::NonFinite { axis, index });
        }
        Ok(())
    }

    pub fn axis_a(&self) -> &[f64] {
        &self.axis_a
    }

    pub fn axis_b(&self) -> &[f64] {
        &self.axis_b
    }

    pub fn axis(&self, id: AxisId) -> &[f64] {
        match id {
            AxisId::A => &self.axis_a,
            AxisId::B => &self.axis_b,
        }
    }

    /// `(len(axis_a), len(axis_b))`.
    pub fn shape(&self) -> (usize, usize) {
        (self.axis_a.len(), self.axis_b.len())
    }

    pub fn len(&self) -> usize {
        self.axis_a.len() * self.axis_b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn point(&self, i: usize, j: usize) -> Option<SweepPoint> {
        let a = *self.axis_a.get(i)?;
        let b = *self.axis_b.get(j)?;
        Some(SweepPoint { i, j, a, b })
    }

    /// Every point of the grid in row-major order (`i` outer, `j` inner).
    pub fn points(&self) -> Points<'_> {
        Points::new(self, 0..self.axis_a.len(), 0..self.axis_b.len())
    }

    /// The points of a single axis-B column, in axis-A order. Returns `None` if `j` is out of
    /// range.
    pub fn column(&self, j: usize) -> Option<Points<'_>> {
        (j < self.axis_b.len()).then(|| Points::new(self, 0..self.axis_a.len(), j..j + 1))
    }
}

/// A lazy, restartable row-major walk over a rectangular block of a [`Grid`].
#[derive(Debug, Clone)]
pub struct Points<'g> {
    grid: &'g Grid,
    rows: Range<usize>,
    columns: Range<usize>,
    cursor: usize,
}

impl<'g> Points<'g> {
    fn new(grid: &'g Grid, rows: Range<usize>, columns: Range<usize>) -> Self {
        Self {
            grid,
            rows,
            columns,
            cursor: 0,
        }
    }

    fn block_len(&self) -> usize {
        self.rows.len() * self.columns.len()
    }
}

impl Iterator for Points<'_> {
    type Item = SweepPoint;

    fn next(&mut self) -> Option<SweepPoint> {
        if self.cursor >= self.block_len() {
            return None;
        }
        let width = self.columns.len();
        let i = self.rows.start + self.cursor / width;
        let j = self.columns.start + self.cursor % width;
        self.cursor += 1;
        self.grid.point(i, j)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.block_len().saturating_sub(self.cursor);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Points<'_> {}
