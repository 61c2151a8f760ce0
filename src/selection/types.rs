//! Selection core types

use serde::{Deserialize, Serialize};

// ============================================================
// Rect
// ============================================================

/// Axis-aligned rectangle with its origin at the top-left corner.
///
/// Width and height are taken as supplied by the client and may be zero or
/// negative. Nothing is validated here; consumers clamp to image bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (`x + width`), widened so extreme inputs cannot overflow
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Bottom edge (`y + height`)
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Closed-bounds containment: both edges count as inside.
    pub fn contains_point(&self, px: i64, py: i64) -> bool {
        px >= self.x as i64 && px <= self.right() && py >= self.y as i64 && py <= self.bottom()
    }

    /// Clamp to `[0, width) x [0, height)`.
    ///
    /// The result may be empty (`right <= left` or `bottom <= top`).
    pub fn clamp_to(&self, width: u32, height: u32) -> ClampedRegion {
        let left = (self.x as i64).max(0);
        let top = (self.y as i64).max(0);
        let right = self.right().min(width as i64);
        let bottom = self.bottom().min(height as i64);

        if right <= left || bottom <= top {
            return ClampedRegion::EMPTY;
        }

        ClampedRegion {
            left: left as u32,
            top: top as u32,
            right: right as u32,
            bottom: bottom as u32,
        }
    }
}

// ============================================================
// ClampedRegion
// ============================================================

/// Rectangle clamped to an image, in half-open pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClampedRegion {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl ClampedRegion {
    /// Zero-area region
    pub const EMPTY: ClampedRegion = ClampedRegion {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Whether the image pixel `(x, y)` lies inside the region
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

// ============================================================
// SelectionSet
// ============================================================

/// Ordered sequence of rectangles on one image.
///
/// Insertion order is preserved, including through serialization, and
/// duplicates are allowed. Operations return a new set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet(Vec<Rect>);

impl SelectionSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First rectangle, the one crop and object extraction operate on
    pub fn first(&self) -> Option<&Rect> {
        self.0.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rect> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Rect] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Rect> {
        self.0
    }
}

impl From<Vec<Rect>> for SelectionSet {
    fn from(rects: Vec<Rect>) -> Self {
        Self(rects)
    }
}

impl FromIterator<Rect> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = Rect>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a Rect;
    type IntoIter = std::slice::Iter<'a, Rect>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
