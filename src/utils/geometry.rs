use std::fmt;
use std::ops::{Add, Sub};

/// A point as defined by its x and y coordinates
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point<N> {
    /// horizontal coordinate
    pub x: N,
    /// vertical coordinate
    pub y: N,
}

impl<N: fmt::Debug> fmt::Debug for Point<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Point")
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}

impl<N> From<(N, N)> for Point<N> {
    #[inline]
    fn from((x, y): (N, N)) -> Point<N> {
        Point { x, y }
    }
}

impl<N> From<Point<N>> for (N, N) {
    #[inline]
    fn from(point: Point<N>) -> (N, N) {
        (point.x, point.y)
    }
}

impl<N: Add<Output = N>> Add for Point<N> {
    type Output = Point<N>;
    #[inline]
    fn add(self, other: Point<N>) -> Point<N> {
        Point {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl<N: Sub<Output = N>> Sub for Point<N> {
    type Output = Point<N>;
    #[inline]
    fn sub(self, other: Point<N>) -> Point<N> {
        Point {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/// A size as defined by its width and height
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size<N> {
    /// horizontal coordinate
    pub w: N,
    /// vertical coordinate
    pub h: N,
}

impl<N: fmt::Debug> fmt::Debug for Size<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Size")
            .field("w", &self.w)
            .field("h", &self.h)
            .finish()
    }
}

impl<N> From<(N, N)> for Size<N> {
    #[inline]
    fn from((w, h): (N, N)) -> Size<N> {
        Size { w, h }
    }
}

impl<N> From<Size<N>> for (N, N) {
    #[inline]
    fn from(size: Size<N>) -> (N, N) {
        (size.w, size.h)
    }
}

impl<N: Default + PartialOrd> Size<N> {
    /// Check if this [`Size`] is empty
    ///
    /// Returns true if either the width or the height is zero or negative
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w <= N::default() || self.h <= N::default()
    }
}

/// A rectangle defined by its top-left corner and dimensions
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rectangle<N> {
    /// Location of the top-left corner of the rectangle
    pub loc: Point<N>,
    /// Size of the rectangle, as (width, height)
    pub size: Size<N>,
}

impl<N: fmt::Debug> fmt::Debug for Rectangle<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rectangle")
            .field("x", &self.loc.x)
            .field("y", &self.loc.y)
            .field("width", &self.size.w)
            .field("height", &self.size.h)
            .finish()
    }
}

impl<N> Rectangle<N> {
    /// Create a new [`Rectangle`] from the coordinates of its top-left corner and its dimensions
    #[inline]
    pub fn from_loc_and_size(loc: impl Into<Point<N>>, size: impl Into<Size<N>>) -> Self {
        Rectangle {
            loc: loc.into(),
            size: size.into(),
        }
    }
}

impl<N: Copy + Default + PartialOrd + Add<Output = N>> Rectangle<N> {
    /// A rectangle is valid when both of its dimensions are strictly positive
    #[inline]
    pub fn is_valid(&self) -> bool {
        !self.size.is_empty()
    }

    /// Checks whether given [`Point`] is inside the rectangle
    #[inline]
    pub fn contains<P: Into<Point<N>>>(self, point: P) -> bool {
        let p: Point<N> = point.into();
        (p.x >= self.loc.x)
            && (p.x < self.loc.x + self.size.w)
            && (p.y >= self.loc.y)
            && (p.y < self.loc.y + self.size.h)
    }
}
