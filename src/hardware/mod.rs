//! Frame source implementations.
//!
//! Real deployments plug a camera driver in behind
//! [`FrameSource`](crate::capture::FrameSource); this module ships the
//! deterministic mock used by tests and throughput checks.

pub mod mock;

pub use mock::{MockCamera, MockCameraConfig};
