//! Custom error types for the application.
//!
//! This module defines the primary error type, `FramestackError`, for the entire
//! crate. Using the `thiserror` crate, it provides a centralized and consistent
//! way to handle the different kinds of errors that can occur, from I/O and
//! configuration issues to per-frame contract violations.
//!
//! ## Error Categories
//!
//! Errors fall into two broad classes:
//!
//! 1. **Frame drops** - `InputShapeChanged`, `OutputShapeChanged`,
//!    `OutputDtypeChanged`. The offending frame is discarded, the session and
//!    the scratch store are untouched, and capture continues with subsequent
//!    frames. Use [`FramestackError::is_frame_drop`] to detect this class.
//!
//! 2. **Fatal errors** - everything else. `NoFramesProcessed` and
//!    `CorruptScratchStore` abort finalization without writing an artifact
//!    (the scratch store is left on disk for inspection); I/O and TIFF
//!    encoding failures mean the session cannot safely continue. There is no
//!    automatic retry anywhere: a dropped frame is simply lost, and a failed
//!    finalize is surfaced to the operator rather than re-attempted.

use crate::data::{RowShape, SampleType};
use thiserror::Error;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, FramestackError>;

/// Primary error type for the capture and reduction pipeline.
#[derive(Error, Debug)]
pub enum FramestackError {
    /// Configuration file parsing failed.
    ///
    /// Occurs when loading the TOML configuration file or merging environment
    /// overrides. Wraps `figment::Error`.
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    /// Configuration validation failed.
    ///
    /// Occurs when configuration values parse correctly but fail semantic
    /// validation (unknown reduction kind, zero bin factor, empty base name).
    #[error("Configuration validation error: {0}")]
    Configuration(String),

    /// Standard I/O operation failed.
    ///
    /// Covers creating, appending to, and reading back the scratch store, and
    /// creating the output artifact file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TIFF encoding or decoding failed while writing the output artifact.
    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// The acquisition source failed or its worker task died.
    #[error("Acquisition error: {0}")]
    Acquisition(String),

    /// Data processing error inside a reduction.
    ///
    /// Raised for frames a reduction cannot handle at all, such as an
    /// unsupported bit depth or a zero-sized frame. Unlike the contract
    /// violations below this is not tied to the latched session contract.
    #[error("Data processing error: {0}")]
    Processing(String),

    /// A frame arrived whose shape differs from the latched input shape.
    ///
    /// The frame is dropped; the session stays usable.
    #[error(
        "Input frame shape changed: expected {expected_rows}x{expected_cols}, \
         got {actual_rows}x{actual_cols}"
    )]
    InputShapeChanged {
        /// Rows latched by the first processed frame.
        expected_rows: u32,
        /// Columns latched by the first processed frame.
        expected_cols: u32,
        /// Rows of the offending frame.
        actual_rows: u32,
        /// Columns of the offending frame.
        actual_cols: u32,
    },

    /// The reduction produced a record whose shape differs from the latched
    /// output shape.
    ///
    /// The frame is dropped; the session stays usable.
    #[error("Reduced record shape changed: expected {expected}, got {actual}")]
    OutputShapeChanged {
        /// Shape latched by the first processed frame.
        expected: RowShape,
        /// Shape produced for the offending frame.
        actual: RowShape,
    },

    /// The reduction produced a record whose sample type differs from the
    /// latched output type.
    ///
    /// The frame is dropped; the session stays usable.
    #[error("Reduced record sample type changed: expected {expected}, got {actual}")]
    OutputDtypeChanged {
        /// Sample type latched by the first processed frame.
        expected: SampleType,
        /// Sample type produced for the offending frame.
        actual: SampleType,
    },

    /// `process` was called after the session was finalized.
    #[error("Session is already finalized; no further frames are accepted")]
    SessionFinalized,

    /// `finish` was called before any frame was successfully processed.
    #[error("No frames processed; nothing to finalize")]
    NoFramesProcessed,

    /// The scratch store does not hold a whole number of reduced records.
    ///
    /// Indicates a truncated or otherwise corrupt scratch file. No artifact
    /// is written; the scratch store is left on disk for inspection.
    #[error(
        "Scratch store corrupt: {bytes} bytes is not a whole number of \
         {row_bytes}-byte records"
    )]
    CorruptScratchStore {
        /// Total bytes found in the scratch store.
        bytes: u64,
        /// Size of one reduced record under the latched contract.
        row_bytes: u64,
    },
}

impl FramestackError {
    /// Whether this error discards a single frame but leaves the session and
    /// the scratch store intact, so capture can continue.
    pub fn is_frame_drop(&self) -> bool {
        matches!(
            self,
            Self::InputShapeChanged { .. }
                | Self::OutputShapeChanged { .. }
                | Self::OutputDtypeChanged { .. }
        )
    }
}
