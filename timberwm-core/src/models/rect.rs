use serde::{Deserialize, Serialize};

/// A screen-space rectangle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Moves the rectangle without changing its size.
    pub const fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Shrinks the rectangle by the given edge widths. Width and height
    /// never go below zero.
    pub fn inset(&self, left: i32, right: i32, top: i32, bottom: i32) -> Self {
        Self {
            x: self.x + left,
            y: self.y + top,
            w: (self.w - left - right).max(0),
            h: (self.h - top - bottom).max(0),
        }
    }

    pub const fn has_area(&self) -> bool {
        self.w > 0 && self.h > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inset_shrinks_all_edges() {
        let a = Rect::new(10, 10, 100, 50);
        assert_eq!(a.inset(2, 2, 20, 2), Rect::new(12, 30, 96, 28));
    }

    #[test]
    fn inset_clamps_to_zero() {
        let a = Rect::new(0, 0, 3, 3);
        let r = a.inset(2, 2, 2, 2);
        assert_eq!((r.w, r.h), (0, 0));
        assert!(!r.has_area());
    }

    #[test]
    fn translate_keeps_size() {
        let a = Rect::new(5, 5, 10, 10);
        assert_eq!(a.translate(-5, 15), Rect::new(0, 20, 10, 10));
    }
}
