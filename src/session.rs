//! Reduction session: contract latching, per-frame appends, finalization.
//!
//! A [`ReductionSession`] is the consumer end of one capture. It receives
//! frames one at a time, reduces each to a record, and appends the record to
//! the session's scratch store. The first successfully processed frame
//! latches a [`SessionContract`]; every later frame is validated against it
//! and dropped on mismatch without touching the store. `finish` reads the
//! scratch store back, reassembles the records, and writes the multi-frame
//! TIFF artifact.
//!
//! The session moves through three states: uninitialized (no contract),
//! initialized (contract latched), finalized. Frames offered after
//! finalization are rejected with [`FramestackError::SessionFinalized`].
//!
//! `process` and `finish` both take `&mut self`, so ownership rules forbid
//! running them concurrently; the capture runner hands the session from the
//! processing loop to finalization sequentially.

use crate::data::{Frame, RowShape, SampleType};
use crate::error::{AppResult, FramestackError};
use crate::reduce::Reduction;
use crate::storage::{write_gray_stack, FlushPolicy, ScratchStore};
use std::fs;
use std::path::{Path, PathBuf};

/// The shape and sample-type agreement all frames in a session must satisfy.
///
/// Latched exactly once, by the first successfully processed frame, and never
/// renegotiated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContract {
    /// Input frame shape as `(rows, cols)`.
    pub input_shape: (u32, u32),
    /// Shape of every reduced record.
    pub output_shape: RowShape,
    /// Sample type of every reduced record.
    pub output_dtype: SampleType,
}

impl SessionContract {
    /// Size in bytes of one reduced record under this contract.
    pub fn row_bytes(&self) -> usize {
        self.output_shape.element_count() * self.output_dtype.bytes()
    }
}

/// Streaming frame reducer and finalizer for one capture session.
pub struct ReductionSession {
    reduction: Box<dyn Reduction>,
    scratch: ScratchStore,
    artifact_path: PathBuf,
    contract: Option<SessionContract>,
    finalized: bool,
    frames_accepted: u64,
    frames_dropped: u64,
}

impl ReductionSession {
    /// Open a session writing to `<output_dir>/<base_name>.temp` and, at
    /// finalization, `<output_dir>/<base_name>.tiff`.
    ///
    /// Creates the output directory if needed and truncates any scratch file
    /// left behind by a previous session with the same base name.
    pub fn new(
        reduction: Box<dyn Reduction>,
        output_dir: &Path,
        base_name: &str,
        policy: FlushPolicy,
    ) -> AppResult<Self> {
        if base_name.is_empty() {
            return Err(FramestackError::Configuration(
                "base_name must not be empty".to_string(),
            ));
        }
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }

        let scratch = ScratchStore::create(
            output_dir.join(format!("{}.temp", base_name)),
            policy,
        )?;
        let artifact_path = output_dir.join(format!("{}.tiff", base_name));

        tracing::info!(
            reduction = reduction.name(),
            scratch = %scratch.path().display(),
            "Initialized reduction session"
        );

        Ok(Self {
            reduction,
            scratch,
            artifact_path,
            contract: None,
            finalized: false,
            frames_accepted: 0,
            frames_dropped: 0,
        })
    }

    /// Reduce one frame and append the record to the scratch store.
    ///
    /// The first successful call latches the session contract. Later calls
    /// validate, in order, the input shape, the reduced shape, and the
    /// reduced sample type; a mismatch drops the frame and returns the
    /// corresponding error while leaving the session and the scratch store
    /// untouched. Every successful call grows the scratch store by exactly
    /// one record.
    pub fn process(&mut self, frame: &Frame) -> AppResult<()> {
        if self.finalized {
            return Err(FramestackError::SessionFinalized);
        }

        let reduced = self.reduction.reduce(frame)?;

        match self.contract {
            None => {
                let contract = SessionContract {
                    input_shape: frame.shape(),
                    output_shape: reduced.shape(),
                    output_dtype: reduced.dtype(),
                };
                tracing::debug!(
                    input_shape = ?contract.input_shape,
                    output_shape = %contract.output_shape,
                    output_dtype = %contract.output_dtype,
                    "Latched session contract"
                );
                self.contract = Some(contract);
            }
            Some(contract) => {
                if frame.shape() != contract.input_shape {
                    self.frames_dropped += 1;
                    let (expected_rows, expected_cols) = contract.input_shape;
                    let (actual_rows, actual_cols) = frame.shape();
                    return Err(FramestackError::InputShapeChanged {
                        expected_rows,
                        expected_cols,
                        actual_rows,
                        actual_cols,
                    });
                }
                if reduced.shape() != contract.output_shape {
                    self.frames_dropped += 1;
                    return Err(FramestackError::OutputShapeChanged {
                        expected: contract.output_shape,
                        actual: reduced.shape(),
                    });
                }
                if reduced.dtype() != contract.output_dtype {
                    self.frames_dropped += 1;
                    return Err(FramestackError::OutputDtypeChanged {
                        expected: contract.output_dtype,
                        actual: reduced.dtype(),
                    });
                }
            }
        }

        self.scratch.append(reduced.as_bytes())?;
        self.frames_accepted += 1;
        Ok(())
    }

    /// Read the scratch store back and write the multi-frame TIFF artifact.
    ///
    /// The record count is derived from the store's byte length; a remainder
    /// means a truncated or corrupt store and aborts without writing. Vector
    /// records become the columns of a single page; matrix records become one
    /// page each, in submission order.
    ///
    /// Safe to call more than once: a repeat call re-reads the unchanged
    /// store and rewrites a byte-identical artifact. After the first call the
    /// session stops accepting frames.
    pub fn finish(&mut self) -> AppResult<PathBuf> {
        let contract = self.contract.ok_or(FramestackError::NoFramesProcessed)?;

        let raw = self.scratch.read_all()?;
        if raw.is_empty() {
            return Err(FramestackError::NoFramesProcessed);
        }

        let row_bytes = contract.row_bytes();
        if raw.len() % row_bytes != 0 {
            return Err(FramestackError::CorruptScratchStore {
                bytes: raw.len() as u64,
                row_bytes: row_bytes as u64,
            });
        }
        let frame_count = raw.len() / row_bytes;

        match contract.output_shape {
            RowShape::Vector { len } => {
                let page = interleave_columns(
                    &raw,
                    contract.output_dtype.bytes(),
                    len as usize,
                    frame_count,
                );
                write_gray_stack(
                    &self.artifact_path,
                    frame_count as u32,
                    len,
                    contract.output_dtype,
                    &[page.as_slice()],
                )?;
            }
            RowShape::Matrix { rows, cols } => {
                let pages: Vec<&[u8]> = raw.chunks_exact(row_bytes).collect();
                write_gray_stack(
                    &self.artifact_path,
                    cols,
                    rows,
                    contract.output_dtype,
                    &pages,
                )?;
            }
        }

        self.finalized = true;
        tracing::info!(
            path = %self.artifact_path.display(),
            frame_count,
            dropped = self.frames_dropped,
            "Finalized capture artifact"
        );
        Ok(self.artifact_path.clone())
    }

    /// The latched contract, if any frame has been accepted yet.
    pub fn contract(&self) -> Option<&SessionContract> {
        self.contract.as_ref()
    }

    /// Frames reduced and appended so far.
    pub fn frames_accepted(&self) -> u64 {
        self.frames_accepted
    }

    /// Frames dropped for contract violations so far.
    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped
    }

    /// Whether `finish` has completed at least once.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Location of the scratch store file.
    pub fn scratch_path(&self) -> &Path {
        self.scratch.path()
    }

    /// Location the artifact is (or will be) written to.
    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }
}

/// Lay frame-major vector records out as the columns of one row-major page.
///
/// `raw` holds `count` records of `len` elements each; the output page has
/// `len` rows and `count` columns, with record `j` in column `j`.
fn interleave_columns(raw: &[u8], elem_bytes: usize, len: usize, count: usize) -> Vec<u8> {
    let mut page = vec![0u8; raw.len()];
    for j in 0..count {
        for i in 0..len {
            let src = (j * len + i) * elem_bytes;
            let dst = (i * count + j) * elem_bytes;
            page[dst..dst + elem_bytes].copy_from_slice(&raw[src..src + elem_bytes]);
        }
    }
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleave_places_records_in_columns() {
        // Two records of three u16 elements: [1, 2, 3] and [4, 5, 6].
        let raw: Vec<u8> = [1u16, 2, 3, 4, 5, 6]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();

        let page = interleave_columns(&raw, 2, 3, 2);
        let samples: Vec<u16> = page
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();

        // Page is 3 rows x 2 cols: row i holds element i of each record.
        assert_eq!(samples, vec![1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn contract_row_bytes() {
        let contract = SessionContract {
            input_shape: (2, 4),
            output_shape: RowShape::Vector { len: 2 },
            output_dtype: SampleType::U16,
        };
        assert_eq!(contract.row_bytes(), 4);
    }
}
