//! Multi-page grayscale TIFF output.
//!
//! Writes the finalized capture artifact through the `tiff` crate encoder.
//! Every page shares one set of dimensions and one sample type; pages are
//! appended in submission order, so page *n* of the artifact is record *n*
//! of the session.

use crate::data::SampleType;
use crate::error::{AppResult, FramestackError};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tiff::encoder::{colortype, TiffEncoder};

/// Write a stack of grayscale pages to a single TIFF file.
///
/// Each entry of `pages` is one page's raw little-endian sample bytes and
/// must be exactly `width * height * dtype.bytes()` long.
///
/// # Errors
///
/// Returns an error if:
/// - `pages` is empty
/// - a page's byte length does not match the page dimensions
/// - the file cannot be created or TIFF encoding fails
pub fn write_gray_stack(
    path: &Path,
    width: u32,
    height: u32,
    dtype: SampleType,
    pages: &[&[u8]],
) -> AppResult<()> {
    if pages.is_empty() {
        return Err(FramestackError::Processing(
            "cannot write an empty page stack".to_string(),
        ));
    }

    let expected = width as usize * height as usize * dtype.bytes();
    for (i, page) in pages.iter().enumerate() {
        if page.len() != expected {
            return Err(FramestackError::Processing(format!(
                "page {} has {} bytes, expected {} for {}x{} {}",
                i,
                page.len(),
                expected,
                width,
                height,
                dtype
            )));
        }
    }

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let mut encoder = TiffEncoder::new(writer)?;

    for page in pages {
        match dtype {
            SampleType::U8 => {
                encoder.write_image::<colortype::Gray8>(width, height, page)?;
            }
            SampleType::U16 => {
                let samples: Vec<u16> = page
                    .chunks_exact(2)
                    .map(|c| u16::from_le_bytes([c[0], c[1]]))
                    .collect();
                encoder.write_image::<colortype::Gray16>(width, height, &samples)?;
            }
            SampleType::U32 => {
                let samples: Vec<u32> = page
                    .chunks_exact(4)
                    .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect();
                encoder.write_image::<colortype::Gray32>(width, height, &samples)?;
            }
        }
    }

    tracing::info!(
        path = %path.display(),
        num_pages = pages.len(),
        dimensions = format!("{}x{}", width, height),
        dtype = %dtype,
        "Wrote TIFF stack"
    );

    Ok(())
}
