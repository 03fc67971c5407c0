//! Background geometry for the demo: panels whose scrolling content is
//! clipped by nested clip rectangles.

use scenegui_ui::{ClipRect, DrawCallback, DrawList, Rectangle, Size};

const PANEL: [u8; 4] = [30, 34, 40, 255];
const ROW_EVEN: [u8; 4] = [55, 75, 95, 255];
const ROW_ODD: [u8; 4] = [45, 60, 78, 255];

/// Number of panels laid out across the window.
pub const PANEL_COUNT: usize = 3;

const MARGIN: f32 = 16.0;
const ROW_HEIGHT: f32 = 18.0;

/// Build the panel layer for a display of `display` points.
///
/// `scroll` shifts the rows inside each panel; rows outside the panel's
/// inner area are clipped, not culled.
pub fn build_panels(display: Size, top: f32, scroll: f32) -> DrawList {
    let mut list = DrawList::new();
    let screen = Rectangle::new(0.0, 0.0, display.width, display.height);
    let area = Rectangle::new(0.0, top, display.width, (display.height - top).max(0.0));
    let width = ((area.width - MARGIN * (PANEL_COUNT as f32 + 1.0)) / PANEL_COUNT as f32).max(0.0);

    for i in 0..PANEL_COUNT {
        let x = MARGIN + i as f32 * (width + MARGIN);
        let panel = Rectangle::new(x, area.y + MARGIN, width, (area.height - 2.0 * MARGIN).max(0.0));
        let panel_clip = panel.intersect(&screen);
        list.add_rect(panel, PANEL, ClipRect::from(panel_clip));

        let inner = panel.with_padding(MARGIN / 2.0);
        let inner_clip = ClipRect::from(inner.intersect(&panel_clip));
        let offset = (scroll * (i as f32 + 1.0)) % (ROW_HEIGHT * 2.0);
        let rows = (inner.height / ROW_HEIGHT) as usize + 2;
        for r in 0..rows {
            let y = inner.y - offset + r as f32 * ROW_HEIGHT;
            let color = if r % 2 == 0 { ROW_EVEN } else { ROW_ODD };
            list.add_rect(Rectangle::new(inner.x, y, inner.width, ROW_HEIGHT), color, inner_clip);
        }
    }

    list.add_callback(
        ClipRect::from(screen),
        DrawCallback::new(|list, _| {
            log::trace!("Panel layer: {} vertices", list.vtx_buffer.len());
        }),
    );
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_each_panel_adds_two_clips() {
        let list = build_panels(Size::new(800.0, 600.0), 24.0, 5.0);
        let clips: HashSet<String> = list
            .commands
            .iter()
            .filter(|c| !c.is_callback())
            .map(|c| format!("{:?}", c.clip_rect))
            .collect();
        assert_eq!(clips.len(), PANEL_COUNT * 2);
        assert!(list.commands.last().is_some_and(|c| c.is_callback()));
    }

    #[test]
    fn test_content_clip_nested_in_panel() {
        let list = build_panels(Size::new(800.0, 600.0), 24.0, 0.0);
        let panel = list.commands[0].clip_rect;
        let inner = list.commands[1].clip_rect;
        assert!(inner.x1 >= panel.x1 && inner.y1 >= panel.y1);
        assert!(inner.x2 <= panel.x2 && inner.y2 <= panel.y2);
    }

    #[test]
    fn test_tiny_display_does_not_panic() {
        let list = build_panels(Size::new(10.0, 10.0), 24.0, 3.0);
        let total: u32 = list.commands.iter().map(|c| c.elem_count).sum();
        assert_eq!(total as usize, list.idx_buffer.len());
    }
}
