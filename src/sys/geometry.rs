//! Plain geometry types used across the layout pipeline.
//!
//! Coordinates follow the window-system convention of a top-left origin with
//! `y` growing downwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size { width: 0.0, height: 0.0 };

    pub const fn new(width: f64, height: f64) -> Self { Self { width, height } }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(origin: Point, size: Size) -> Self { Self { origin, size } }

    pub const fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(Point::new(x, y), Size::new(width, height))
    }

    pub fn width(&self) -> f64 { self.size.width }

    pub fn height(&self) -> f64 { self.size.height }

    /// The top-left corner.
    pub fn min(&self) -> Point { self.origin }

    /// The bottom-right corner.
    pub fn max(&self) -> Point {
        Point::new(self.origin.x + self.size.width, self.origin.y + self.size.height)
    }

    pub fn contains_rect(&self, other: Rect) -> bool {
        let (min, max) = (self.min(), self.max());
        let (other_min, other_max) = (other.min(), other.max());
        other_min.x >= min.x
            && other_min.y >= min.y
            && other_max.x <= max.x
            && other_max.y <= max.y
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.origin.x, self.origin.y, self.size.width, self.size.height
        )
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseRectError {
    #[error("expected 4 comma-separated values (x,y,w,h), got {0}")]
    WrongArity(usize),
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
}

impl FromStr for Rect {
    type Err = ParseRectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(ParseRectError::WrongArity(parts.len()));
        }
        let mut values = [0.0; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse::<f64>()
                .map_err(|_| ParseRectError::InvalidNumber(part.to_string()))?;
        }
        let [x, y, w, h] = values;
        Ok(Rect::from_xywh(x, y, w, h))
    }
}
