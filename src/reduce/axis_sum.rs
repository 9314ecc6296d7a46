//! Summing reduction along one frame axis.

use crate::data::{Frame, ReducedRow, RowShape};
use crate::error::{AppResult, FramestackError};
use crate::reduce::{checked_dims, Axis, Reduction};

/// Sums sample values along one axis into unsigned 16-bit accumulators.
///
/// This is the default reduction. Accumulation wraps modulo 2^16; saturating
/// or widening behavior belongs to a different reduction, not a mode switch
/// here.
#[derive(Debug, Clone, Copy)]
pub struct AxisSum {
    axis: Axis,
}

impl AxisSum {
    /// Create a summing reduction that collapses the given axis.
    pub fn new(axis: Axis) -> Self {
        Self { axis }
    }

    /// The axis this reduction collapses.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    fn sum_rows_of_columns<T: Copy + Into<u16>>(samples: &[T], cols: usize) -> Vec<u16> {
        let mut acc = vec![0u16; cols];
        for row in samples.chunks_exact(cols) {
            for (c, &px) in row.iter().enumerate() {
                acc[c] = acc[c].wrapping_add(px.into());
            }
        }
        acc
    }

    fn sum_columns_of_rows<T: Copy + Into<u16>>(samples: &[T], cols: usize) -> Vec<u16> {
        samples
            .chunks_exact(cols)
            .map(|row| {
                let mut sum = 0u16;
                for &px in row {
                    sum = sum.wrapping_add(px.into());
                }
                sum
            })
            .collect()
    }
}

impl Default for AxisSum {
    fn default() -> Self {
        Self::new(Axis::Columns)
    }
}

impl Reduction for AxisSum {
    fn name(&self) -> &'static str {
        match self.axis {
            Axis::Rows => "axis_sum_rows",
            Axis::Columns => "axis_sum_columns",
        }
    }

    fn reduce(&self, frame: &Frame) -> AppResult<ReducedRow> {
        let (rows, cols) = checked_dims(frame)?;

        let acc = match (self.axis, frame.bit_depth) {
            (Axis::Columns, 8) => Self::sum_columns_of_rows(&frame.data, cols),
            (Axis::Rows, 8) => Self::sum_rows_of_columns(&frame.data, cols),
            (axis, _) => {
                let samples = frame.as_u16_slice().ok_or_else(|| {
                    FramestackError::Processing(
                        "16-bit frame payload is not readable as u16 samples".to_string(),
                    )
                })?;
                match axis {
                    Axis::Columns => Self::sum_columns_of_rows(samples, cols),
                    Axis::Rows => Self::sum_rows_of_columns(samples, cols),
                }
            }
        };

        let len = match self.axis {
            Axis::Columns => rows as u32,
            Axis::Rows => cols as u32,
        };
        ReducedRow::from_u16(RowShape::Vector { len }, &acc)
    }
}
