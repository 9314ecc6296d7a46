//! Configurable per-frame reductions.
//!
//! A [`Reduction`] turns one [`Frame`] into one [`ReducedRow`]. The transform
//! must be deterministic: for a given frame it always produces the same record
//! with the same shape and sample type, because the first record processed in
//! a session latches the contract every later record is checked against.
//!
//! Two reductions ship with the crate: [`AxisSum`], the minimal pass-through
//! style transform that sums samples along one axis, and [`SpectralBin`],
//! which sums contiguous groups of columns the way a spectrometer readout is
//! binned.

mod axis_sum;
mod spectral_bin;

pub use axis_sum::AxisSum;
pub use spectral_bin::SpectralBin;

use crate::data::{Frame, ReducedRow};
use crate::error::{AppResult, FramestackError};

/// Axis collapsed by a summing reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Sum down the rows of each column; the output has one sample per column.
    Rows,
    /// Sum across the columns of each row; the output has one sample per row.
    Columns,
}

/// A deterministic transform from one frame to one reduced record.
pub trait Reduction: Send + Sync {
    /// Short identifier used in logs and configuration.
    fn name(&self) -> &'static str;

    /// Apply the reduction to one frame.
    fn reduce(&self, frame: &Frame) -> AppResult<ReducedRow>;
}

/// Validate a frame before reducing it and return `(rows, cols)`.
///
/// Rejects zero-sized frames, unsupported bit depths, and payloads whose
/// length does not match the declared dimensions.
pub(crate) fn checked_dims(frame: &Frame) -> AppResult<(usize, usize)> {
    if frame.width == 0 || frame.height == 0 {
        return Err(FramestackError::Processing(format!(
            "cannot reduce zero-sized frame ({}x{})",
            frame.height, frame.width
        )));
    }

    let bytes_per_pixel = match frame.bit_depth {
        8 => 1,
        16 => 2,
        other => {
            return Err(FramestackError::Processing(format!(
                "unsupported bit depth {}",
                other
            )))
        }
    };

    let rows = frame.height as usize;
    let cols = frame.width as usize;
    let expected = rows * cols * bytes_per_pixel;
    if frame.data.len() != expected {
        return Err(FramestackError::Processing(format!(
            "frame payload is {} bytes, expected {} for {}x{} at {} bits",
            frame.data.len(),
            expected,
            frame.height,
            frame.width,
            frame.bit_depth
        )));
    }

    Ok((rows, cols))
}
