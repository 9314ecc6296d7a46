//! Capture runner integration tests.
//!
//! Exercises the producer/consumer split end to end: frame limits, external
//! stop, drop accounting through the report, and abort on acquisition
//! failure. Sources are deterministic so no test depends on timing.

use framestack::capture::{run_capture, CaptureOptions, FrameSource};
use framestack::data::Frame;
use framestack::error::FramestackError;
use framestack::hardware::{MockCamera, MockCameraConfig};
use framestack::reduce::AxisSum;
use framestack::session::ReductionSession;
use framestack::storage::FlushPolicy;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn column_sum_session(dir: &Path, base_name: &str) -> ReductionSession {
    ReductionSession::new(
        Box::new(AxisSum::default()),
        dir,
        base_name,
        FlushPolicy::EveryRow,
    )
    .unwrap()
}

/// Source that raises the shared stop flag once it has emitted `limit` frames.
struct SelfStopping {
    emitted: u64,
    limit: u64,
    stop: Arc<AtomicBool>,
}

impl FrameSource for SelfStopping {
    fn next_frame(&mut self) -> anyhow::Result<Option<Frame>> {
        self.emitted += 1;
        if self.emitted >= self.limit {
            self.stop.store(true, Ordering::SeqCst);
        }
        Ok(Some(Frame::from_u16(8, 4, &[1; 32])))
    }
}

/// Source that fails partway through the stream.
struct FailingSource {
    emitted: u64,
}

impl FrameSource for FailingSource {
    fn next_frame(&mut self) -> anyhow::Result<Option<Frame>> {
        if self.emitted >= 2 {
            anyhow::bail!("readout failed");
        }
        self.emitted += 1;
        Ok(Some(Frame::from_u16(8, 4, &[1; 32])))
    }
}

/// Source whose third frame has a different shape.
struct GlitchingSource {
    emitted: u64,
}

impl FrameSource for GlitchingSource {
    fn next_frame(&mut self) -> anyhow::Result<Option<Frame>> {
        if self.emitted >= 5 {
            return Ok(None);
        }
        self.emitted += 1;
        if self.emitted == 3 {
            return Ok(Some(Frame::from_u16(6, 4, &[1; 24])));
        }
        Ok(Some(Frame::from_u16(8, 4, &[1; 32])))
    }
}

#[tokio::test]
async fn captures_until_source_ends() {
    let dir = TempDir::new().unwrap();
    let camera = MockCamera::new(MockCameraConfig {
        width: 16,
        height: 8,
        bit_depth: 16,
        max_frames: Some(6),
    })
    .unwrap();
    let session = column_sum_session(dir.path(), "mockcam");

    let report = run_capture(camera, session, CaptureOptions::default())
        .await
        .unwrap();

    assert_eq!(report.frames_accepted, 6);
    assert_eq!(report.frames_dropped, 0);
    assert!(report.artifact.exists());
}

#[tokio::test]
async fn frame_limit_caps_the_run() {
    let dir = TempDir::new().unwrap();
    let camera = MockCamera::new(MockCameraConfig {
        width: 16,
        height: 8,
        bit_depth: 16,
        max_frames: None,
    })
    .unwrap();
    let session = column_sum_session(dir.path(), "limited");

    let options = CaptureOptions {
        max_frames: Some(4),
        ..CaptureOptions::default()
    };
    let report = run_capture(camera, session, options).await.unwrap();

    assert_eq!(report.frames_accepted, 4);
}

#[tokio::test]
async fn stop_flag_ends_the_capture() {
    let dir = TempDir::new().unwrap();
    let stop = Arc::new(AtomicBool::new(false));
    let source = SelfStopping {
        emitted: 0,
        limit: 3,
        stop: Arc::clone(&stop),
    };
    let session = column_sum_session(dir.path(), "stopped");

    let options = CaptureOptions {
        stop,
        ..CaptureOptions::default()
    };
    let report = run_capture(source, session, options).await.unwrap();

    assert_eq!(report.frames_accepted, 3);
    assert!(report.artifact.exists());
}

#[tokio::test]
async fn contract_violations_are_counted_not_fatal() {
    let dir = TempDir::new().unwrap();
    let source = GlitchingSource { emitted: 0 };
    let session = column_sum_session(dir.path(), "glitch");

    let report = run_capture(source, session, CaptureOptions::default())
        .await
        .unwrap();

    assert_eq!(report.frames_accepted, 4);
    assert_eq!(report.frames_dropped, 1);
}

#[tokio::test]
async fn acquisition_failure_aborts_without_artifact() {
    let dir = TempDir::new().unwrap();
    let source = FailingSource { emitted: 0 };
    let session = column_sum_session(dir.path(), "failing");
    let artifact = dir.path().join("failing.tiff");
    let scratch = dir.path().join("failing.temp");

    let err = run_capture(source, session, CaptureOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FramestackError::Acquisition(_)));
    assert!(err.to_string().contains("readout failed"));
    assert!(!artifact.exists());
    // Frames delivered before the failure remain inspectable on disk.
    assert_eq!(std::fs::metadata(&scratch).unwrap().len(), 16);
}
