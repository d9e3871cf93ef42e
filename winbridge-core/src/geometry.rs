//! Integer rectangles and dirty-region accumulation.

use nalgebra::Point2;

/// An axis-aligned rectangle in device units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width. Non-positive widths make the rectangle empty.
    pub width: i32,
    /// Height. Non-positive heights make the rectangle empty.
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle at the origin with the given size.
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Check if a point lies within the rectangle (right/bottom edges excluded).
    pub fn contains(&self, point: Point2<f64>) -> bool {
        point.x >= self.x as f64
            && point.x < self.right() as f64
            && point.y >= self.y as f64
            && point.y < self.bottom() as f64
    }

    /// Check if `other` lies completely inside this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        !other.is_empty()
            && other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// The overlapping part of both rectangles, if any.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        let rect = Rect::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y));
        (!rect.is_empty()).then_some(rect)
    }

    /// The smallest rectangle containing both.
    pub fn united(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y))
    }
}

/// Accumulates damaged rectangles until they are flushed by a repaint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyRegion {
    rects: Vec<Rect>,
}

impl DirtyRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rectangle, folding it into rectangles that already cover it.
    pub fn add(&mut self, rect: Rect) {
        if rect.is_empty() || self.rects.iter().any(|r| r.contains_rect(&rect)) {
            return;
        }
        self.rects.retain(|r| !rect.contains_rect(r));
        self.rects.push(rect);
    }

    /// Merge another region into this one.
    pub fn merge(&mut self, other: &DirtyRegion) {
        for rect in &other.rects {
            self.add(*rect);
        }
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// The bounding rectangle of all dirty rectangles.
    pub fn bounding_rect(&self) -> Option<Rect> {
        let mut iter = self.rects.iter();
        let first = *iter.next()?;
        Some(iter.fold(first, |acc, rect| acc.united(rect)))
    }

    /// Take the accumulated region, leaving this one empty.
    pub fn take(&mut self) -> DirtyRegion {
        std::mem::take(self)
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }
}

impl From<Rect> for DirtyRegion {
    fn from(rect: Rect) -> Self {
        let mut region = DirtyRegion::new();
        region.add(rect);
        region
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_folds_contained_rects() {
        let mut region = DirtyRegion::new();
        region.add(Rect::new(10, 10, 5, 5));
        region.add(Rect::new(0, 0, 100, 100));
        region.add(Rect::new(20, 20, 5, 5));

        assert_eq!(region.rects(), &[Rect::new(0, 0, 100, 100)]);
    }

    #[test]
    fn test_region_bounding_rect() {
        let mut region = DirtyRegion::new();
        region.add(Rect::new(0, 0, 10, 10));
        region.add(Rect::new(50, 40, 10, 10));

        assert_eq!(region.bounding_rect(), Some(Rect::new(0, 0, 60, 50)));
        assert_eq!(region.take().rects().len(), 2);
        assert!(region.is_empty());
    }

    #[test]
    fn test_intersection() {
        let a = Rect::new(0, 0, 10, 10);
        assert_eq!(
            a.intersection(&Rect::new(5, 5, 10, 10)),
            Some(Rect::new(5, 5, 5, 5))
        );
        assert_eq!(a.intersection(&Rect::new(10, 0, 5, 5)), None);
    }

    #[test]
    fn test_extreme_geometry_saturates() {
        let rect = Rect::new(i32::MAX - 10, i32::MIN, 100, i32::MAX);
        assert_eq!(rect.right(), i32::MAX);
        assert_eq!(rect.bottom(), -1);

        let huge = Rect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        let united = huge.united(&rect);
        assert_eq!(united.x, i32::MIN);
        assert_eq!(united.width, i32::MAX);
        assert!(rect.intersection(&Rect::new(0, 0, 10, 10)).is_none());
    }
}
