//! Region editor module
//!
//! Redaction operators applied to an RGBA buffer, scoped to the rectangles of
//! a [`SelectionSet`](crate::SelectionSet).
//!
//! # Operators
//!
//! - **Crop** - keep only the first rectangle (clamped); may yield a 0x0 image
//! - **Blackout** - fill every rectangle with opaque black
//! - **Blur** - Gaussian-smooth every rectangle in place
//!
//! None of the operators fail. Degenerate rectangles are no-ops and an empty
//! selection set returns the input unchanged.

mod redact;
mod types;

pub use redact::RegionEditor;
pub use types::{EditorOptions, EditorOptionsBuilder, RedactOp, DEFAULT_BLUR_RADIUS};
