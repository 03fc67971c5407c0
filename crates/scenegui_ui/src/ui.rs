//! The immediate-mode UI seam widgets draw through.

use crate::layout::Point;

/// Calls a widget makes against the immediate-mode UI for one frame.
///
/// `begin_*` calls that return `true` must be matched by the corresponding
/// `end_*` call; those returning `false` must not.
pub trait ImmediateUi {
    fn is_popup_open(&self, id: &str) -> bool;

    /// Position the next item relative to the current window.
    fn set_cursor_pos(&mut self, pos: Point);

    /// Width the next popup window's content should reserve.
    fn set_next_window_content_width(&mut self, width: f32);

    /// Combo box showing `preview`. Returns `true` while its popup is open.
    fn begin_combo(&mut self, id: &str, preview: &str, width: f32, enabled: bool) -> bool;

    /// A selectable row inside a popup. Returns `true` when clicked.
    fn selectable(&mut self, label: &str, selected: bool) -> bool;

    fn end_combo(&mut self);

    /// Returns `true` while the menu named `name` is open.
    fn begin_menu(&mut self, name: &str, enabled: bool) -> bool;

    /// Returns `true` when the item is activated.
    fn menu_item(&mut self, label: &str, shortcut: &str, checked: bool, enabled: bool) -> bool;

    fn separator(&mut self);

    fn end_menu(&mut self);

    fn begin_main_menu_bar(&mut self) -> bool;

    fn end_main_menu_bar(&mut self);

    /// Width of `text` in the current font.
    fn calc_text_width(&self, text: &str) -> f32;
}

/// Style metrics the widgets size themselves with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleMetrics {
    pub font_size: f32,
    /// Height of one line of text.
    pub line_height: f32,
    /// Padding inside framed items, per axis.
    pub frame_padding: [f32; 2],
    pub default_margin: f32,
}

impl StyleMetrics {
    /// Height of a framed item such as a combo box button.
    pub fn frame_height(&self) -> f32 {
        self.line_height + 2.0 * self.frame_padding[1]
    }
}

impl Default for StyleMetrics {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            line_height: 16.0,
            frame_padding: [4.0, 3.0],
            default_margin: 8.0,
        }
    }
}

/// Per-draw state handed to widgets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DrawContext {
    /// Offset of the UI window the widgets draw into; frames are given in
    /// window-independent coordinates.
    pub ui_offset: Point,
    pub metrics: StyleMetrics,
}

/// Whether a widget needs another frame drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawResult {
    #[default]
    None,
    Redraw,
}
