//! Column binning for spectrometer-style readouts.

use crate::data::{Frame, ReducedRow, RowShape};
use crate::error::{AppResult, FramestackError};
use crate::reduce::{checked_dims, Reduction};

/// Sums contiguous groups of `bin_factor` columns per row.
///
/// One frame reduces to a `Matrix` record of
/// `(rows, cols / bin_factor)` u16 accumulators. Trailing columns that do
/// not fill a whole bin are discarded.
#[derive(Debug, Clone, Copy)]
pub struct SpectralBin {
    bin_factor: u32,
}

impl SpectralBin {
    /// Create a binning reduction. The factor must be at least 1.
    pub fn new(bin_factor: u32) -> AppResult<Self> {
        if bin_factor == 0 {
            return Err(FramestackError::Configuration(
                "bin_factor must be at least 1".to_string(),
            ));
        }
        Ok(Self { bin_factor })
    }

    /// Number of raw columns summed into one output sample.
    pub fn bin_factor(&self) -> u32 {
        self.bin_factor
    }

    fn bin_rows<T: Copy + Into<u16>>(samples: &[T], cols: usize, bin: usize) -> Vec<u16> {
        let out_cols = cols / bin;
        let mut acc = Vec::with_capacity(samples.len() / cols * out_cols);
        for row in samples.chunks_exact(cols) {
            for group in row.chunks_exact(bin) {
                let mut sum = 0u16;
                for &px in group {
                    sum = sum.wrapping_add(px.into());
                }
                acc.push(sum);
            }
        }
        acc
    }
}

impl Reduction for SpectralBin {
    fn name(&self) -> &'static str {
        "spectral_bin"
    }

    fn reduce(&self, frame: &Frame) -> AppResult<ReducedRow> {
        let (rows, cols) = checked_dims(frame)?;
        let bin = self.bin_factor as usize;
        let out_cols = cols / bin;
        if out_cols == 0 {
            return Err(FramestackError::Processing(format!(
                "bin_factor {} exceeds frame width {}",
                self.bin_factor, cols
            )));
        }

        let acc = match frame.bit_depth {
            8 => Self::bin_rows(&frame.data, cols, bin),
            _ => {
                let samples = frame.as_u16_slice().ok_or_else(|| {
                    FramestackError::Processing(
                        "16-bit frame payload is not readable as u16 samples".to_string(),
                    )
                })?;
                Self::bin_rows(samples, cols, bin)
            }
        };

        ReducedRow::from_u16(
            RowShape::Matrix {
                rows: rows as u32,
                cols: out_cols as u32,
            },
            &acc,
        )
    }
}
