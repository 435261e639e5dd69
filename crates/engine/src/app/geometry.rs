use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

/// World-space vector. `+y` points down, matching surface rows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Unit vector in the same direction, or `None` for zero/non-finite input.
    pub fn normalized(self) -> Option<Vec2> {
        let length = self.length();
        if length == 0.0 || !length.is_finite() {
            return None;
        }
        Some(Vec2 {
            x: self.x / length,
            y: self.y / length,
        })
    }

    /// Pixel cell containing this point. Saturates far outside the `i32` range.
    pub fn to_pixel(self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Pixel rectangle on a surface; `right`/`bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ScreenRect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Edge-touching rects do not overlap.
    pub fn overlaps(&self, other: &ScreenRect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        (self.x as i64) < other.right()
            && (other.x as i64) < self.right()
            && (self.y as i64) < other.bottom()
            && (other.y as i64) < self.bottom()
    }

    pub fn contains_rect(&self, other: &ScreenRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_rejects_zero_and_non_finite() {
        assert_eq!(Vec2::ZERO.normalized(), None);
        assert_eq!(Vec2::new(f32::NAN, 1.0).normalized(), None);
        assert_eq!(Vec2::new(f32::INFINITY, 0.0).normalized(), None);
    }

    #[test]
    fn normalized_diagonal_has_unit_length() {
        let unit = Vec2::new(1.0, -1.0).normalized().expect("unit");
        assert!((unit.length() - 1.0).abs() < 1e-6);
        assert!(unit.x > 0.0 && unit.y < 0.0);
    }

    #[test]
    fn to_pixel_floors_negative_values() {
        assert_eq!(Vec2::new(2.7, -0.2).to_pixel(), (2, -1));
        assert_eq!(Vec2::new(-3.0, 3.0).to_pixel(), (-3, 3));
    }

    #[test]
    fn to_pixel_saturates_far_out_of_range() {
        assert_eq!(Vec2::new(1.0e12, -1.0e12).to_pixel(), (i32::MAX, i32::MIN));
    }

    #[test]
    fn touching_rects_do_not_overlap() {
        let top = ScreenRect::new(0, 0, 640, 240);
        let bottom = ScreenRect::new(0, 240, 640, 240);
        assert!(!top.overlaps(&bottom));
        assert!(!bottom.overlaps(&top));
    }

    #[test]
    fn intersecting_rects_overlap_symmetrically() {
        let a = ScreenRect::new(0, 0, 100, 100);
        let b = ScreenRect::new(99, 99, 10, 10);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn empty_rect_never_overlaps() {
        let a = ScreenRect::new(0, 0, 100, 100);
        let empty = ScreenRect::new(10, 10, 0, 50);
        assert!(!a.overlaps(&empty));
    }

    #[test]
    fn contains_rect_checks_all_edges() {
        let display = ScreenRect::new(0, 0, 640, 480);
        assert!(display.contains_rect(&ScreenRect::new(0, 240, 640, 240)));
        assert!(!display.contains_rect(&ScreenRect::new(0, 241, 640, 240)));
        assert!(!display.contains_rect(&ScreenRect::new(-1, 0, 10, 10)));
    }
}
