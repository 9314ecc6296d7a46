//! Mock camera producing deterministic test patterns.

use crate::capture::FrameSource;
use crate::data::Frame;
use anyhow::{bail, Result};
use serde::Deserialize;

/// Configuration for the mock camera.
#[derive(Debug, Clone, Deserialize)]
pub struct MockCameraConfig {
    /// Frame width in pixels (default: 2048).
    #[serde(default = "default_width")]
    pub width: u32,

    /// Frame height in pixels (default: 2048).
    #[serde(default = "default_height")]
    pub height: u32,

    /// Bits per pixel, 8 or 16 (default: 16).
    #[serde(default = "default_bit_depth")]
    pub bit_depth: u32,

    /// Stop emitting after this many frames (default: unlimited).
    #[serde(default)]
    pub max_frames: Option<u64>,
}

fn default_width() -> u32 {
    2048
}
fn default_height() -> u32 {
    2048
}
fn default_bit_depth() -> u32 {
    16
}

impl Default for MockCameraConfig {
    fn default() -> Self {
        Self {
            width: 2048,
            height: 2048,
            bit_depth: 16,
            max_frames: None,
        }
    }
}

/// Deterministic gradient-pattern frame source.
///
/// Pixel `(x, y)` of frame `n` is `(x + y + n) mod 4096` for 16-bit output
/// and `(x + y + n) mod 256` for 8-bit, so any emitted frame can be
/// reconstructed from its index alone.
#[derive(Debug)]
pub struct MockCamera {
    config: MockCameraConfig,
    frames_emitted: u64,
}

impl MockCamera {
    /// Create a mock camera, validating the configuration.
    pub fn new(config: MockCameraConfig) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            bail!("Camera resolution must be non-zero");
        }
        if config.bit_depth != 8 && config.bit_depth != 16 {
            bail!("Bit depth must be 8 or 16");
        }
        Ok(Self {
            config,
            frames_emitted: 0,
        })
    }

    /// Frames handed out so far.
    pub fn frames_emitted(&self) -> u64 {
        self.frames_emitted
    }
}

impl FrameSource for MockCamera {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if let Some(limit) = self.config.max_frames {
            if self.frames_emitted >= limit {
                return Ok(None);
            }
        }

        let offset = (self.frames_emitted % 4096) as u32;
        self.frames_emitted += 1;

        let width = self.config.width;
        let height = self.config.height;

        let frame = if self.config.bit_depth == 8 {
            let data: Vec<u8> = (0..height)
                .flat_map(|y| (0..width).map(move |x| ((x + y + offset) % 256) as u8))
                .collect();
            Frame::from_u8(width, height, data)
        } else {
            let pixels: Vec<u16> = (0..height)
                .flat_map(|y| (0..width).map(move |x| ((x + y + offset) % 4096) as u16))
                .collect();
            Frame::from_u16(width, height, &pixels)
        };

        Ok(Some(frame))
    }
}
