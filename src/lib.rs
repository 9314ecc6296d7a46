//! # Framestack
//!
//! Streaming frame reduction and multi-frame TIFF finalization for scientific
//! camera captures. An acquisition source hands over one 2-D frame at a time;
//! a configurable reduction collapses each frame to a small record; records
//! are appended to an on-disk scratch store as they arrive; and when the
//! capture stops the records are reassembled into a single multi-frame TIFF.
//!
//! ## Crate Structure
//!
//! The library is organized into several modules, each with a distinct
//! responsibility:
//!
//! - **`capture`**: The capture runner that pulls a [`capture::FrameSource`]
//!   on a blocking worker and feeds the session, plus the stop/limit options
//!   and the final report.
//! - **`config`**: Loading and validating the TOML + environment
//!   configuration. See [`config::CaptureConfig`].
//! - **`data`**: Frame and reduced-record types shared across the pipeline.
//! - **`error`**: The crate-wide [`error::FramestackError`] type.
//! - **`hardware`**: Frame source implementations; currently the
//!   deterministic mock camera used in tests.
//! - **`reduce`**: The [`reduce::Reduction`] trait and the shipped
//!   reductions (axis sums, spectral binning).
//! - **`session`**: The [`session::ReductionSession`] state machine that
//!   latches the session contract, appends records, and finalizes.
//! - **`storage`**: The append-only scratch store and the multi-page TIFF
//!   writer.
//! - **`tracing_setup`**: Structured logging bootstrap.

pub mod capture;
pub mod config;
pub mod data;
pub mod error;
pub mod hardware;
pub mod reduce;
pub mod session;
pub mod storage;
pub mod tracing_setup;

pub use capture::{run_capture, CaptureOptions, CaptureReport, FrameSource};
pub use data::Frame;
pub use error::{AppResult, FramestackError};
pub use session::{ReductionSession, SessionContract};
