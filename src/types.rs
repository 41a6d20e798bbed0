use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Axis-aligned box in pixels, y growing downwards
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// 2D point in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A known substring of the source paragraph that an external label lines up with
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub index: usize,
    pub name: String,
    /// Fixed number of padding spaces. `None` measures the marker instead.
    pub padding: Option<usize>,
}

impl Marker {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            padding: None,
        }
    }

    pub fn with_padding(mut self, spaces: usize) -> Self {
        self.padding = Some(spaces);
        self
    }
}

/// One visual line of the padded paragraph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineFragment {
    pub text: String,
    /// Char range of this line inside the padded text
    pub chars: Range<usize>,
    /// Measured top of the line inside the measuring block
    pub top: f32,
}

/// Gap left in the rendered text by a marker, in char offsets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatedMarker {
    pub start: usize,
    pub end: usize,
    pub marker_index: usize,
}

impl LocatedMarker {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// How far a label must move to sit one line above its marker's gap
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacementOffset {
    pub marker_index: usize,
    pub dx: f32,
    pub dy: f32,
}
