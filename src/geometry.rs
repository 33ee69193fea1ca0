use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/**
 * A location in the 2D simulation plane
 */
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/**
 * A displacement or velocity in the 2D simulation plane
 */
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vector2d {
    pub x: f64,
    pub y: f64,
}

// ============================================================================
impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Vector2d {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Vector2d) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn norm_squared(self) -> f64 {
        self.dot(self)
    }

    pub fn norm(self) -> f64 {
        self.norm_squared().sqrt()
    }

    /**
     * This vector rotated by +90 degrees.
     */
    pub fn perp(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /**
     * This vector scaled to unit length. The zero vector is returned
     * unchanged.
     */
    pub fn unit(self) -> Self {
        let n = self.norm();
        if n == 0.0 {
            self
        } else {
            self * (1.0 / n)
        }
    }
}

// ============================================================================
impl Sub for Point {
    type Output = Vector2d;

    fn sub(self, other: Point) -> Vector2d {
        Vector2d::new(self.x - other.x, self.y - other.y)
    }
}

impl Add<Vector2d> for Point {
    type Output = Point;

    fn add(self, other: Vector2d) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Add for Vector2d {
    type Output = Vector2d;

    fn add(self, other: Vector2d) -> Vector2d {
        Vector2d::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vector2d {
    type Output = Vector2d;

    fn sub(self, other: Vector2d) -> Vector2d {
        Vector2d::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Vector2d {
    type Output = Vector2d;

    fn mul(self, scale: f64) -> Vector2d {
        Vector2d::new(self.x * scale, self.y * scale)
    }
}

impl Neg for Vector2d {
    type Output = Vector2d;

    fn neg(self) -> Vector2d {
        Vector2d::new(-self.x, -self.y)
    }
}
