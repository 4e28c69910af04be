//! Display containment resolution.

use multichat_protocols::{Bounds, DisplayDescriptor};

/// Which display a window belongs to.
///
/// Returns the first display whose work area contains the window's
/// center point. Windows with an undefined position, and windows
/// whose center falls in no display's work area, resolve to
/// `displays[0]` (the primary display). The primary-display fallback
/// is a deliberate simplification for multi-monitor edge cases and
/// must be preserved.
///
/// An empty `displays` slice is a precondition violation left to the
/// caller.
pub fn display_containing<'a>(
    bounds: &Bounds,
    displays: &'a [DisplayDescriptor],
) -> &'a DisplayDescriptor {
    let Some((x, y)) = bounds.center() else {
        return &displays[0];
    };
    displays
        .iter()
        .find(|display| display.work_area.contains(x, y))
        .unwrap_or(&displays[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use multichat_protocols::{DisplayId, Rect};

    fn display(id: &str, left: i32, top: i32, width: u32, height: u32) -> DisplayDescriptor {
        DisplayDescriptor {
            id: DisplayId::new(id),
            work_area: Rect::new(left, top, width, height),
        }
    }

    fn two_monitors() -> Vec<DisplayDescriptor> {
        vec![
            display("primary", 0, 0, 1920, 1080),
            display("secondary", 1920, 0, 2560, 1440),
        ]
    }

    #[test]
    fn test_center_on_primary() {
        let displays = two_monitors();
        let bounds = Bounds::from(Rect::new(100, 100, 800, 600));
        assert_eq!(display_containing(&bounds, &displays).id, DisplayId::new("primary"));
    }

    #[test]
    fn test_center_on_secondary() {
        let displays = two_monitors();
        let bounds = Bounds::from(Rect::new(2000, 100, 800, 600));
        assert_eq!(
            display_containing(&bounds, &displays).id,
            DisplayId::new("secondary")
        );
    }

    #[test]
    fn test_window_straddling_uses_center() {
        let displays = two_monitors();
        // Left edge on primary, center at x = 1500 + 420 = well past 1920
        let bounds = Bounds::from(Rect::new(1500, 100, 1000, 600));
        assert_eq!(
            display_containing(&bounds, &displays).id,
            DisplayId::new("secondary")
        );
    }

    #[test]
    fn test_undefined_position_falls_back_to_primary() {
        let displays = two_monitors();
        let bounds = Bounds::default();
        assert_eq!(display_containing(&bounds, &displays).id, DisplayId::new("primary"));
    }

    #[test]
    fn test_offscreen_center_falls_back_to_primary() {
        let displays = two_monitors();
        let bounds = Bounds::from(Rect::new(-5000, -5000, 100, 100));
        assert_eq!(display_containing(&bounds, &displays).id, DisplayId::new("primary"));
    }

    #[test]
    fn test_half_open_boundary() {
        let displays = two_monitors();
        // Center exactly at x=1920 belongs to the secondary display
        let bounds = Bounds::from(Rect::new(1820, 0, 200, 200));
        assert_eq!(
            display_containing(&bounds, &displays).id,
            DisplayId::new("secondary")
        );
    }
}
