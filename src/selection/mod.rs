//! Selection module
//!
//! Rectangular regions of interest drawn by the client on a single image.
//!
//! # Features
//!
//! - [`Rect`] with inclusive point containment and clamping to image bounds
//! - [`SelectionSet`] ordered, duplicate-tolerant collection of rectangles
//! - Append and point-based removal, each producing a new set
//!
//! # Example
//!
//! ```rust
//! use investigator::{Rect, SelectionSet};
//!
//! let set = SelectionSet::new().add(Rect::new(0, 0, 5, 5));
//! assert_eq!(set.remove_at_point(2, 2).len(), 0);
//! assert_eq!(set.remove_at_point(50, 50).len(), 1);
//! ```

mod store;
mod types;

pub use types::{ClampedRegion, Rect, SelectionSet};
