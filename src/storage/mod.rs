//! Scratch store and TIFF artifact output.

pub mod scratch;
pub mod tiff;

pub use scratch::{FlushPolicy, ScratchStore};
pub use tiff::write_gray_stack;
