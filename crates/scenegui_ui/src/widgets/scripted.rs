//! Scripted [`ImmediateUi`] used by widget tests.

use std::collections::HashSet;

use crate::layout::Point;
use crate::ui::ImmediateUi;

/// Opens the popups and menus it is told to, clicks the labels it is told
/// to, and records every call.
#[derive(Debug, Default)]
pub struct ScriptedUi {
    pub open_popups: HashSet<String>,
    /// Whether `begin_combo` reports an open popup.
    pub combo_open: bool,
    pub open_menus: HashSet<String>,
    pub clicks: HashSet<String>,
    pub calls: Vec<String>,
    pub cursor: Vec<Point>,
    pub content_widths: Vec<f32>,
    pub menu_bar_open: bool,
}

impl ScriptedUi {
    pub fn new() -> Self {
        Self {
            menu_bar_open: true,
            ..Default::default()
        }
    }

    pub fn click(mut self, label: &str) -> Self {
        self.clicks.insert(label.to_string());
        self
    }

    pub fn open_menu(mut self, name: &str) -> Self {
        self.open_menus.insert(name.to_string());
        self
    }

    pub fn with_combo_open(mut self, popup_was_open: Option<&str>) -> Self {
        self.combo_open = true;
        if let Some(id) = popup_was_open {
            self.open_popups.insert(id.to_string());
        }
        self
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls.iter().filter(|c| c.starts_with(prefix)).count()
    }
}

impl ImmediateUi for ScriptedUi {
    fn is_popup_open(&self, id: &str) -> bool {
        self.open_popups.contains(id)
    }

    fn set_cursor_pos(&mut self, pos: Point) {
        self.cursor.push(pos);
    }

    fn set_next_window_content_width(&mut self, width: f32) {
        self.content_widths.push(width);
    }

    fn begin_combo(&mut self, id: &str, preview: &str, width: f32, enabled: bool) -> bool {
        self.calls
            .push(format!("begin_combo {id} '{preview}' {width} {enabled}"));
        self.combo_open && enabled
    }

    fn selectable(&mut self, label: &str, selected: bool) -> bool {
        self.calls.push(format!("selectable {label} {selected}"));
        self.clicks.contains(label)
    }

    fn end_combo(&mut self) {
        self.calls.push("end_combo".to_string());
    }

    fn begin_menu(&mut self, name: &str, enabled: bool) -> bool {
        self.calls.push(format!("begin_menu {name}"));
        enabled && self.open_menus.contains(name)
    }

    fn menu_item(&mut self, label: &str, shortcut: &str, checked: bool, enabled: bool) -> bool {
        self.calls
            .push(format!("menu_item {label} '{shortcut}' {checked} {enabled}"));
        enabled && self.clicks.contains(label)
    }

    fn separator(&mut self) {
        self.calls.push("separator".to_string());
    }

    fn end_menu(&mut self) {
        self.calls.push("end_menu".to_string());
    }

    fn begin_main_menu_bar(&mut self) -> bool {
        self.calls.push("begin_main_menu_bar".to_string());
        self.menu_bar_open
    }

    fn end_main_menu_bar(&mut self) {
        self.calls.push("end_main_menu_bar".to_string());
    }

    fn calc_text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * 8.0
    }
}
