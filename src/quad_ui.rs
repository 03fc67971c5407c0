//! A minimal [`ImmediateUi`] that lays widgets out as flat quads.
//!
//! There is no text rendering; labels are drawn as bars as wide as the text
//! would be. Popups are clipped to their own region, so a frame with open
//! menus produces several distinct clip rectangles.

use std::collections::HashSet;

use scenegui_ui::{ClipRect, DrawList, ImmediateUi, Menu, Point, Rectangle, Size, StyleMetrics};

mod palette {
    pub const BAR: [u8; 4] = [45, 45, 52, 255];
    pub const BUTTON: [u8; 4] = [70, 70, 82, 255];
    pub const BUTTON_DISABLED: [u8; 4] = [50, 50, 56, 255];
    pub const ARROW: [u8; 4] = [95, 95, 110, 255];
    pub const POPUP: [u8; 4] = [35, 35, 40, 245];
    pub const HIGHLIGHT: [u8; 4] = [60, 100, 170, 255];
    pub const TEXT: [u8; 4] = [220, 220, 220, 255];
    pub const TEXT_DISABLED: [u8; 4] = [120, 120, 120, 255];
    pub const SEPARATOR: [u8; 4] = [80, 80, 80, 255];
}

const DEFAULT_POPUP_WIDTH: f32 = 160.0;

#[derive(Debug)]
struct Popup {
    id: String,
    x: f32,
    y: f32,
    width: f32,
    clip: ClipRect,
}

#[derive(Debug)]
pub struct QuadUi {
    metrics: StyleMetrics,
    display: Size,
    list: DrawList,
    open: HashSet<String>,
    click: Option<Point>,
    cursor: Point,
    content_width: Option<f32>,
    popups: Vec<Popup>,
    bar_x: Option<f32>,
}

impl QuadUi {
    pub fn new(metrics: StyleMetrics) -> Self {
        Self {
            metrics,
            display: Size::zero(),
            list: DrawList::new(),
            open: HashSet::new(),
            click: None,
            cursor: Point::default(),
            content_width: None,
            popups: Vec::new(),
            bar_x: None,
        }
    }

    /// Start a frame for a display of `display` points. `click` is the
    /// position of a mouse press since the last frame.
    pub fn begin_frame(&mut self, display: Size, click: Option<Point>) {
        self.display = display;
        self.click = click;
        self.list = DrawList::new();
        self.cursor = Point::default();
        self.popups.clear();
    }

    /// Finish the frame and hand over its geometry.
    pub fn end_frame(&mut self) -> DrawList {
        std::mem::take(&mut self.list)
    }

    pub fn metrics(&self) -> &StyleMetrics {
        &self.metrics
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.open.contains(id)
    }

    fn screen_clip(&self) -> ClipRect {
        ClipRect::new(0.0, 0.0, self.display.width, self.display.height)
    }

    fn row_height(&self) -> f32 {
        self.metrics.frame_height()
    }

    fn clicked(&self, rect: Rectangle) -> bool {
        self.click.is_some_and(|p| rect.contains(p))
    }

    fn toggle(&mut self, id: &str) {
        if !self.open.remove(id) {
            self.open.insert(id.to_string());
        }
    }

    fn close_menus(&mut self) {
        self.open.retain(|id| !id.starts_with("menu:"));
    }

    fn label(&mut self, x: f32, rect: Rectangle, text: &str, enabled: bool, clip: ClipRect) {
        let pad = self.metrics.frame_padding;
        let width = self.calc_text_width(text).min((rect.right() - x - pad[0]).max(0.0));
        let bar = Rectangle::new(x, rect.y + pad[1] + 2.0, width, rect.height - 2.0 * pad[1] - 4.0);
        let color = if enabled {
            palette::TEXT
        } else {
            palette::TEXT_DISABLED
        };
        self.list.add_rect(bar, color, clip);
    }

    /// Rectangle for the next row of the innermost popup; advances it.
    fn next_row(&mut self, height: f32) -> Option<(Rectangle, ClipRect)> {
        let popup = self.popups.last_mut()?;
        let rect = Rectangle::new(popup.x, popup.y, popup.width, height);
        popup.y += height;
        Some((rect, popup.clip))
    }

    fn push_popup(&mut self, id: &str, x: f32, y: f32, width: f32) {
        let region = Rectangle::new(x, y, width, (self.display.height - y).max(0.0));
        let screen = Rectangle::new(0.0, 0.0, self.display.width, self.display.height);
        let clip = ClipRect::from(region.intersect(&screen));
        self.popups.push(Popup {
            id: id.to_string(),
            x,
            y,
            width,
            clip,
        });
    }
}

impl ImmediateUi for QuadUi {
    fn is_popup_open(&self, id: &str) -> bool {
        self.open.contains(id)
    }

    fn set_cursor_pos(&mut self, pos: Point) {
        self.cursor = pos;
    }

    fn set_next_window_content_width(&mut self, width: f32) {
        self.content_width = Some(width);
    }

    fn begin_combo(&mut self, id: &str, preview: &str, width: f32, enabled: bool) -> bool {
        let clip = self.screen_clip();
        let height = self.row_height();
        let button = Rectangle::new(self.cursor.x, self.cursor.y, width, height);
        let color = if enabled {
            palette::BUTTON
        } else {
            palette::BUTTON_DISABLED
        };
        self.list.add_rect(button, color, clip);
        let arrow = Rectangle::new(button.right() - height, button.y, height, height);
        self.list.add_rect(arrow, palette::ARROW, clip);
        let text_area = Rectangle::new(button.x, button.y, width - height, height);
        self.label(button.x + self.metrics.frame_padding[0], text_area, preview, enabled, clip);

        if enabled && self.clicked(button) {
            self.toggle(id);
            // The press that opened the popup must not also pick an item.
            self.click = None;
        }
        if !enabled || !self.open.contains(id) {
            return false;
        }
        self.push_popup(id, button.x, button.bottom(), width);
        true
    }

    fn selectable(&mut self, label: &str, selected: bool) -> bool {
        let height = self.row_height();
        let Some((row, clip)) = self.next_row(height) else {
            return false;
        };
        self.list.add_rect(row, palette::POPUP, clip);
        if selected {
            self.list.add_rect(row, palette::HIGHLIGHT, clip);
        }
        self.label(row.x + self.metrics.frame_padding[0], row, label, true, clip);

        let clicked = self.clicked(row);
        if clicked {
            if let Some(popup) = self.popups.last() {
                let id = popup.id.clone();
                self.open.remove(&id);
            }
        }
        clicked
    }

    fn end_combo(&mut self) {
        self.popups.pop();
    }

    fn begin_menu(&mut self, name: &str, enabled: bool) -> bool {
        let id = format!("menu:{name}");
        let width = self.content_width.take().unwrap_or(DEFAULT_POPUP_WIDTH);
        let pad = self.metrics.frame_padding[0];

        let (title, clip, popup_origin) = if let Some(x) = self.bar_x {
            let bar_height = Menu::calc_height(&self.metrics);
            let title_width = self.calc_text_width(name) + 2.0 * pad;
            let title = Rectangle::new(x, 0.0, title_width, bar_height);
            self.bar_x = Some(title.right());
            (title, self.screen_clip(), Point::new(title.x, title.bottom()))
        } else {
            let height = self.row_height();
            let Some((row, clip)) = self.next_row(height) else {
                return false;
            };
            self.list.add_rect(row, palette::POPUP, clip);
            (row, clip, Point::new(row.right(), row.y))
        };

        let is_open = self.open.contains(&id);
        if is_open {
            self.list.add_rect(title, palette::HIGHLIGHT, clip);
        }
        self.label(title.x + pad, title, name, enabled, clip);

        if enabled && self.clicked(title) {
            self.toggle(&id);
            self.click = None;
        }
        if !enabled || !self.open.contains(&id) {
            return false;
        }
        self.push_popup(&id, popup_origin.x, popup_origin.y, width);
        true
    }

    fn menu_item(&mut self, label: &str, shortcut: &str, checked: bool, enabled: bool) -> bool {
        let height = self.row_height();
        let Some((row, clip)) = self.next_row(height) else {
            return false;
        };
        self.list.add_rect(row, palette::POPUP, clip);

        let margin = self.metrics.default_margin;
        if checked {
            let size = height * 0.4;
            let mark = Rectangle::new(row.x + margin, row.y + (height - size) / 2.0, size, size);
            self.list.add_rect(mark, palette::TEXT, clip);
        }
        self.label(row.x + margin + height, row, label, enabled, clip);
        if !shortcut.is_empty() {
            let x = row.right() - margin - self.calc_text_width(shortcut);
            self.label(x, row, shortcut, enabled, clip);
        }

        let clicked = enabled && self.clicked(row);
        if clicked {
            self.close_menus();
        }
        clicked
    }

    fn separator(&mut self) {
        let Some((row, clip)) = self.next_row(self.metrics.default_margin) else {
            return;
        };
        self.list.add_rect(row, palette::POPUP, clip);
        let line = Rectangle::new(row.x, row.y + row.height / 2.0, row.width, 1.0);
        self.list.add_rect(line, palette::SEPARATOR, clip);
    }

    fn end_menu(&mut self) {
        self.popups.pop();
    }

    fn begin_main_menu_bar(&mut self) -> bool {
        let bar = Rectangle::new(0.0, 0.0, self.display.width, Menu::calc_height(&self.metrics));
        let clip = self.screen_clip();
        self.list.add_rect(bar, palette::BAR, clip);
        self.bar_x = Some(self.metrics.frame_padding[0]);
        true
    }

    fn end_main_menu_bar(&mut self) {
        self.bar_x = None;
    }

    fn calc_text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.metrics.font_size * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenegui_ui::{Combobox, DrawContext, DrawResult, ItemId};

    const DISPLAY: Size = Size {
        width: 800.0,
        height: 600.0,
    };

    fn combo() -> Combobox {
        let mut combo = Combobox::with_items(["one", "two", "three"]);
        combo.set_frame(Rectangle::new(100.0, 100.0, 150.0, 22.0));
        combo
    }

    #[test]
    fn test_click_opens_then_selects() {
        let mut ui = QuadUi::new(StyleMetrics::default());
        let ctx = DrawContext::default();
        let mut combo = combo();

        ui.begin_frame(DISPLAY, Some(Point::new(110.0, 110.0)));
        assert_eq!(combo.draw(&mut ui, &ctx), DrawResult::Redraw);
        assert!(ui.is_open(combo.id()));
        ui.end_frame();

        // Rows are 22 high below the button: "two" spans y 144..166.
        ui.begin_frame(DISPLAY, Some(Point::new(110.0, 150.0)));
        assert_eq!(combo.draw(&mut ui, &ctx), DrawResult::Redraw);
        assert_eq!(combo.selected_value(), "two");
        assert!(!ui.is_open(combo.id()));
    }

    #[test]
    fn test_open_popup_gets_its_own_clip() {
        let mut ui = QuadUi::new(StyleMetrics::default());
        let ctx = DrawContext::default();
        let mut combo = combo();

        ui.begin_frame(DISPLAY, Some(Point::new(110.0, 110.0)));
        combo.draw(&mut ui, &ctx);
        let list = ui.end_frame();

        let clips: HashSet<_> = list
            .commands
            .iter()
            .map(|c| format!("{:?}", c.clip_rect))
            .collect();
        assert_eq!(clips.len(), 2);
    }

    #[test]
    fn test_menu_bar_activation() {
        let mut file = Menu::new();
        file.add_item("Quit", ItemId(1));
        let mut bar = Menu::new();
        bar.add_menu("File", file);

        let mut ui = QuadUi::new(StyleMetrics::default());
        let ctx = DrawContext::default();

        ui.begin_frame(DISPLAY, Some(Point::new(10.0, 5.0)));
        assert_eq!(bar.draw_menu_bar(&mut ui, &ctx, true), None);
        assert!(ui.is_open("menu:File"));
        ui.end_frame();

        // Bar is 24 high; the first item row spans y 24..46.
        ui.begin_frame(DISPLAY, Some(Point::new(10.0, 30.0)));
        assert_eq!(bar.draw_menu_bar(&mut ui, &ctx, true), Some(ItemId(1)));
        assert!(!ui.is_open("menu:File"));
    }
}
