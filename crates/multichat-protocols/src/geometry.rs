//! Screen-coordinate geometry types.

use serde::{Deserialize, Serialize};

use crate::handles::DisplayId;

/// A realized rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Axis-aligned half-open containment test: `left <= x < left + width`.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left
            && x < self.left + self.width as i32
            && y >= self.top
            && y < self.top + self.height as i32
    }
}

/// Possibly-unrealized window bounds.
///
/// Any field may be absent for a window that has not been placed yet;
/// geometry consumers must tolerate that.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: Option<i32>,
    pub top: Option<i32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Bounds {
    /// Center point of the window, if its position is known.
    ///
    /// Missing width/height are treated as zero, matching how the
    /// browser reports windows mid-creation.
    pub fn center(&self) -> Option<(i32, i32)> {
        let (left, top) = (self.left?, self.top?);
        let x = left + self.width.unwrap_or(0) as i32 / 2;
        let y = top + self.height.unwrap_or(0) as i32 / 2;
        Some((x, y))
    }
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        Self {
            left: Some(rect.left),
            top: Some(rect.top),
            width: Some(rect.width),
            height: Some(rect.height),
        }
    }
}

/// Window display state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowState {
    Normal,
    Minimized,
    Maximized,
    Fullscreen,
}

impl Default for WindowState {
    fn default() -> Self {
        Self::Normal
    }
}

/// A physical display as supplied by the platform on each query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayDescriptor {
    pub id: DisplayId,
    /// Usable screen rectangle, excluding OS taskbars/docks.
    pub work_area: Rect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_half_open() {
        let rect = Rect::new(0, 0, 100, 50);
        assert!(rect.contains(0, 0));
        assert!(rect.contains(99, 49));
        assert!(!rect.contains(100, 0));
        assert!(!rect.contains(0, 50));
        assert!(!rect.contains(-1, 0));
    }

    #[test]
    fn test_bounds_center() {
        let bounds = Bounds::from(Rect::new(100, 200, 400, 300));
        assert_eq!(bounds.center(), Some((300, 350)));
    }

    #[test]
    fn test_bounds_center_missing_position() {
        let bounds = Bounds {
            left: None,
            top: Some(10),
            width: Some(100),
            height: Some(100),
        };
        assert_eq!(bounds.center(), None);
    }

    #[test]
    fn test_bounds_center_missing_size() {
        let bounds = Bounds {
            left: Some(10),
            top: Some(20),
            width: None,
            height: None,
        };
        // Zero size collapses the center onto the origin corner
        assert_eq!(bounds.center(), Some((10, 20)));
    }
}
