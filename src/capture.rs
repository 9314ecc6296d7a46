//! Capture runner: single-producer frame pull with sequential finalization.
//!
//! The acquisition source is pulled on a blocking worker thread and frames
//! cross a bounded channel to the consumer, which owns the
//! [`ReductionSession`]. Contract violations drop the offending frame and
//! capture continues; any other error aborts the run. Finalization happens
//! only after the producer has stopped and the channel has drained, so
//! `process` and `finish` never run concurrently.
//!
//! Cancellation is external: a stop flag ends the producer loop after the
//! frame currently being appended has landed completely.

use crate::data::Frame;
use crate::error::{AppResult, FramestackError};
use crate::session::ReductionSession;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// A source of frames in capture order.
///
/// Implementations hand over one frame per call and must never deliver two
/// frames concurrently; the runner guarantees a single caller.
pub trait FrameSource: Send {
    /// Pull the next frame. `Ok(None)` ends the stream.
    fn next_frame(&mut self) -> anyhow::Result<Option<Frame>>;
}

/// Options controlling one capture run.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Stop producing after this many frames. `None` runs until the source
    /// ends or the stop flag is raised.
    pub max_frames: Option<u64>,
    /// Externally raised to end the capture.
    pub stop: Arc<AtomicBool>,
    /// Capacity of the frame channel between producer and consumer.
    pub channel_capacity: usize,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            max_frames: None,
            stop: Arc::new(AtomicBool::new(false)),
            channel_capacity: 16,
        }
    }
}

/// Summary of a completed capture run.
#[derive(Debug, Clone)]
pub struct CaptureReport {
    /// Frames reduced and appended to the scratch store.
    pub frames_accepted: u64,
    /// Frames dropped for contract violations.
    pub frames_dropped: u64,
    /// Location of the finalized artifact.
    pub artifact: PathBuf,
}

/// Pull frames from `source` into `session` until the source ends, the frame
/// limit is reached, or the stop flag is raised; then finalize.
///
/// Returns the capture report on success. Fatal errors abort the run without
/// finalizing; the scratch store is left on disk.
pub async fn run_capture<S>(
    source: S,
    mut session: ReductionSession,
    options: CaptureOptions,
) -> AppResult<CaptureReport>
where
    S: FrameSource + 'static,
{
    let (tx, mut rx) = mpsc::channel::<Frame>(options.channel_capacity);
    let stop = Arc::clone(&options.stop);
    let max_frames = options.max_frames;

    let producer = tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let mut source = source;
        let mut produced: u64 = 0;
        loop {
            if stop.load(Ordering::SeqCst) {
                break;
            }
            if let Some(limit) = max_frames {
                if produced >= limit {
                    break;
                }
            }
            match source.next_frame()? {
                Some(frame) => {
                    produced += 1;
                    // A send error means the consumer is gone; stop quietly.
                    if tx.blocking_send(frame).is_err() {
                        break;
                    }
                }
                None => break,
            }
        }
        tracing::debug!(produced, "Acquisition loop stopped");
        Ok(())
    });

    let mut fatal: Option<FramestackError> = None;
    while let Some(frame) = rx.recv().await {
        match session.process(&frame) {
            Ok(()) => {}
            Err(err) if err.is_frame_drop() => {
                tracing::warn!(error = %err, "Dropped frame");
            }
            Err(err) => {
                fatal = Some(err);
                break;
            }
        }
    }

    if let Some(err) = fatal {
        options.stop.store(true, Ordering::SeqCst);
        drop(rx);
        let _ = producer.await;
        return Err(err);
    }

    match producer.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => return Err(FramestackError::Acquisition(err.to_string())),
        Err(err) => {
            return Err(FramestackError::Acquisition(format!(
                "acquisition worker failed: {}",
                err
            )))
        }
    }

    let artifact = session.finish()?;
    Ok(CaptureReport {
        frames_accepted: session.frames_accepted(),
        frames_dropped: session.frames_dropped(),
        artifact,
    })
}
