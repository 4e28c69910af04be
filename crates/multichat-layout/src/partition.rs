//! Work-area partition math.
//!
//! Both tiling and retiling go through these functions so a retile
//! lands windows on exactly the rectangles a fresh tile would have
//! produced. Widths use integer division; the last service window
//! absorbs the remainder so the partition covers the services area
//! with no gap or overlap.

use multichat_protocols::Rect;

/// Computed rectangles for one tiled layout: one per service window,
/// in order, plus the control popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSlots {
    pub services: Vec<Rect>,
    pub popup: Rect,
}

/// Vertical layout: service windows side by side at full height, the
/// popup in a strip on the right taking `1/popup_divisor` of the
/// work-area width.
pub fn vertical_slots(work_area: &Rect, count: usize, popup_divisor: u32) -> LayoutSlots {
    let width = work_area.width.max(1);
    let height = work_area.height.max(1);
    let popup_width = (width / popup_divisor).max(1);
    let services_width = (width - popup_width).max(1);
    let per_window = (services_width / count as u32).max(1);

    let services = (0..count)
        .map(|i| {
            let left = work_area.left + (i as u32 * per_window) as i32;
            let window_width = if i == count - 1 {
                services_width
                    .saturating_sub(per_window * (count as u32 - 1))
                    .max(1)
            } else {
                per_window
            };
            Rect::new(left, work_area.top, window_width, height)
        })
        .collect();

    let popup = Rect::new(
        work_area.left + services_width as i32,
        work_area.top,
        popup_width,
        height,
    );

    LayoutSlots { services, popup }
}

/// Bottom layout: service windows side by side at full width above a
/// fixed-height popup strip along the bottom.
pub fn bottom_slots(work_area: &Rect, count: usize, popup_height: u32) -> LayoutSlots {
    let width = work_area.width.max(1);
    let services_height = work_area.height.saturating_sub(popup_height).max(1);
    let per_window = (width / count as u32).max(1);

    let services = (0..count)
        .map(|i| {
            let left = work_area.left + (i as u32 * per_window) as i32;
            let window_width = if i == count - 1 {
                width.saturating_sub(per_window * (count as u32 - 1)).max(1)
            } else {
                per_window
            };
            Rect::new(left, work_area.top, window_width, services_height)
        })
        .collect();

    let popup = Rect::new(
        work_area.left,
        work_area.top + services_height as i32,
        work_area.width,
        popup_height,
    );

    LayoutSlots { services, popup }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_service_width(slots: &LayoutSlots) -> u32 {
        slots.services.iter().map(|r| r.width).sum()
    }

    #[test]
    fn test_bottom_three_on_1920() {
        let work = Rect::new(0, 0, 1920, 1080);
        let slots = bottom_slots(&work, 3, 140);
        assert_eq!(slots.services.len(), 3);
        for rect in &slots.services {
            assert_eq!(rect.width, 640);
            assert_eq!(rect.height, 940);
            assert_eq!(rect.top, 0);
        }
        assert_eq!(slots.services[1].left, 640);
        assert_eq!(slots.popup, Rect::new(0, 940, 1920, 140));
    }

    #[test]
    fn test_vertical_reserves_quarter_for_popup() {
        let work = Rect::new(100, 50, 2000, 1200);
        let slots = vertical_slots(&work, 3, 4);
        assert_eq!(slots.popup.width, 500);
        assert_eq!(slots.popup.left, 100 + 1500);
        assert_eq!(total_service_width(&slots), 1500);
        // 1500 / 3 divides evenly
        assert!(slots.services.iter().all(|r| r.width == 500 && r.height == 1200));
    }

    #[test]
    fn test_last_window_absorbs_remainder_exactly() {
        // Exhaustive partition-exactness sweep over widths and counts
        for width in [640u32, 1000, 1366, 1920, 2561, 3440] {
            for count in 1..=7usize {
                let work = Rect::new(-10, 20, width, 900);

                let v = vertical_slots(&work, count, 4);
                let services_width = width - width / 4;
                assert_eq!(total_service_width(&v), services_width, "vertical {width}x{count}");
                for rect in &v.services[..count - 1] {
                    assert_eq!(rect.width, services_width / count as u32);
                }

                let b = bottom_slots(&work, count, 140);
                assert_eq!(total_service_width(&b), width, "bottom {width}x{count}");
                for rect in &b.services[..count - 1] {
                    assert_eq!(rect.width, width / count as u32);
                }
            }
        }
    }

    #[test]
    fn test_adjacent_windows_do_not_overlap() {
        let work = Rect::new(0, 0, 1366, 768);
        let slots = bottom_slots(&work, 5, 140);
        for pair in slots.services.windows(2) {
            assert_eq!(pair[0].left + pair[0].width as i32, pair[1].left);
        }
        let last = slots.services.last().unwrap();
        assert_eq!(last.left + last.width as i32, 1366);
    }

    #[test]
    fn test_degenerate_work_area_stays_positive() {
        let work = Rect::new(0, 0, 10, 100);
        let slots = bottom_slots(&work, 3, 140);
        // Popup taller than the work area: service strip clamps to 1
        assert!(slots.services.iter().all(|r| r.height == 1));
        let slots = vertical_slots(&work, 3, 4);
        assert!(slots.services.iter().all(|r| r.width >= 1));
    }
}
