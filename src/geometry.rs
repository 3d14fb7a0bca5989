//! Core geometry types: Vector, FractionVector, Align.
//!
//! These are the foundational coordinate types used throughout winlet for
//! positioning and sizing items in window pixel space.

use std::ops::{Add, Neg, Sub};

// ---------------------------------------------------------------------------
// Vector
// ---------------------------------------------------------------------------

/// A 2D integer pair in window pixels. Used for both positions and sizes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Vector {
    pub x: i32,
    pub y: i32,
}

impl Vector {
    /// A zero vector.
    pub const ZERO: Vector = Vector { x: 0, y: 0 };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether `point` lies inside the rectangle spanned by `self` (as a
    /// position) and `size`: `x <= point.x < x + size.x`, same for y.
    #[inline]
    pub const fn rect_contains(self, size: Vector, point: Vector) -> bool {
        self.x <= point.x
            && point.x < self.x + size.x
            && self.y <= point.y
            && point.y < self.y + size.y
    }
}

impl Add for Vector {
    type Output = Vector;
    #[inline]
    fn add(self, rhs: Vector) -> Vector {
        Vector { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Vector {
    type Output = Vector;
    #[inline]
    fn sub(self, rhs: Vector) -> Vector {
        Vector { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Neg for Vector {
    type Output = Vector;
    #[inline]
    fn neg(self) -> Vector {
        Vector { x: -self.x, y: -self.y }
    }
}

// ---------------------------------------------------------------------------
// FractionVector
// ---------------------------------------------------------------------------

/// A 2D pair of fractions of a parent size.
///
/// A `FractionVector` is not a usable position or size on its own; it must be
/// resolved against a concrete parent [`Vector`] first.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FractionVector {
    pub x: f32,
    pub y: f32,
}

impl FractionVector {
    /// Create a new fraction vector.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Resolve against a concrete parent size, truncating toward zero.
    #[inline]
    pub fn resolve(self, parent: Vector) -> Vector {
        Vector {
            x: (self.x * parent.x as f32) as i32,
            y: (self.y * parent.y as f32) as i32,
        }
    }
}

// ---------------------------------------------------------------------------
// Align
// ---------------------------------------------------------------------------

/// Alignment along one axis.
///
/// `Start` means left on the horizontal axis and top on the vertical axis;
/// `End` means right and bottom. The near/near and far/far pairs share a
/// variant on purpose: the same value means "near edge" on whichever axis it
/// is applied to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Align {
    /// Left / top.
    Start,
    /// Centered.
    #[default]
    Center,
    /// Right / bottom.
    End,
}
