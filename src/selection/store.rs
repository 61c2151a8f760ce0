//! Selection set operations
//!
//! Both operations are pure: the receiver is left untouched and a fresh set
//! is returned, so concurrent readers never see a partial update.

use super::types::{Rect, SelectionSet};

impl SelectionSet {
    /// Append `rect` to the end of the sequence.
    #[must_use]
    pub fn add(&self, rect: Rect) -> SelectionSet {
        let mut rects = Vec::with_capacity(self.len() + 1);
        rects.extend_from_slice(self.as_slice());
        rects.push(rect);
        SelectionSet::from(rects)
    }

    /// Drop every rectangle whose closed bounds contain `(x, y)`.
    ///
    /// Overlapping rectangles under the point are all removed; the rest keep
    /// their relative order.
    #[must_use]
    pub fn remove_at_point(&self, x: i64, y: i64) -> SelectionSet {
        self.iter()
            .filter(|r| !r.contains_point(x, y))
            .copied()
            .collect()
    }
}
