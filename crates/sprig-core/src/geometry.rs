use std::ops::Add;

use crate::math::Vec2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect<T> {
    pub x: T,
    pub y: T,
    pub width: T,
    pub height: T,
}

impl<T> Rect<T> {
    pub const fn new(x: T, y: T, width: T, height: T) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

impl<T: Copy + Add<Output = T>> Rect<T> {
    pub fn right(&self) -> T {
        self.x + self.width
    }

    pub fn bottom(&self) -> T {
        self.y + self.height
    }

    pub fn translate(self, dx: T, dy: T) -> Self {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }
}

impl Rect<f32> {
    pub const ZERO: Self = Rect::new(0.0, 0.0, 0.0, 0.0);

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Size<f32> {
        Size::new(self.width, self.height)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

impl<T> Size<T> {
    pub const fn new(width: T, height: T) -> Self {
        Size { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(rect.right(), 40.0);
        assert_eq!(rect.bottom(), 60.0);
        assert!(rect.contains(Vec2::new(15.0, 25.0)));
        assert!(!rect.contains(Vec2::new(5.0, 25.0)));
    }

    #[test]
    fn test_rect_translate() {
        let rect = Rect::new(1.0, 2.0, 3.0, 4.0).translate(10.0, -2.0);
        assert_eq!(rect, Rect::new(11.0, 0.0, 3.0, 4.0));
    }
}
