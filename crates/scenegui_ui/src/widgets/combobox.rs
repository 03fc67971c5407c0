//! Drop-down list of strings with a single selected entry.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::callback::SelectionCallback;
use crate::layout::{Point, Rectangle, Size};
use crate::ui::{DrawContext, DrawResult, ImmediateUi, StyleMetrics};

static NEXT_COMBOBOX_ID: AtomicUsize = AtomicUsize::new(1);

#[derive(Debug)]
pub struct Combobox {
    id: String,
    items: Vec<String>,
    selected: usize,
    enabled: bool,
    frame: Rectangle,
    on_value_changed: SelectionCallback,
}

impl Combobox {
    pub fn new() -> Self {
        let n = NEXT_COMBOBOX_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            id: format!("##combobox_{n}"),
            items: Vec::new(),
            selected: 0,
            enabled: true,
            frame: Rectangle::default(),
            on_value_changed: SelectionCallback::none(),
        }
    }

    pub fn with_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut combo = Self::new();
        combo.items.extend(items.into_iter().map(Into::into));
        combo
    }

    /// Popup id, unique per instance.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn add_item(&mut self, name: impl Into<String>) {
        self.items.push(name.into());
    }

    /// Remove every item and reset the selection to the first slot.
    pub fn clear_items(&mut self) {
        self.items.clear();
        self.selected = 0;
    }

    pub fn item(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// The selected item, or `""` when there is none.
    pub fn selected_value(&self) -> &str {
        self.item(self.selected).unwrap_or("")
    }

    /// Out-of-range indices are ignored. Never fires the change callback.
    pub fn set_selected_index(&mut self, index: usize) {
        if index < self.items.len() {
            self.selected = index;
        }
    }

    /// Select the first item equal to `value`; unknown values are ignored.
    pub fn set_selected_value(&mut self, value: &str) {
        if let Some(index) = self.items.iter().position(|item| item == value) {
            self.set_selected_index(index);
        }
    }

    /// Called with `(value, index)` whenever the user picks an item.
    pub fn set_on_value_changed<F>(&mut self, f: F)
    where
        F: FnMut(&str, usize) + 'static,
    {
        self.on_value_changed = SelectionCallback::new(f);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_frame(&mut self, frame: Rectangle) {
        self.frame = frame;
    }

    pub fn frame(&self) -> Rectangle {
        self.frame
    }

    /// Widest item plus the square arrow button and horizontal padding.
    pub fn preferred_size(&self, ui: &dyn ImmediateUi, metrics: &StyleMetrics) -> Size {
        let button_width = metrics.frame_height();
        let widest = self
            .items
            .iter()
            .map(|item| ui.calc_text_width(item).ceil())
            .fold(0.0, f32::max);
        Size::new(
            widest + button_width + 2.0 * metrics.frame_padding[0],
            metrics.frame_height().ceil(),
        )
    }

    /// Draw the combo box and its popup if open.
    ///
    /// Returns [`DrawResult::Redraw`] when the user changed the value or the
    /// popup opened this frame.
    pub fn draw(&mut self, ui: &mut dyn ImmediateUi, ctx: &DrawContext) -> DrawResult {
        let was_open = ui.is_popup_open(&self.id);
        let mut did_open = false;
        let mut value_changed = false;

        ui.set_cursor_pos(Point::new(
            self.frame.x - ctx.ui_offset.x,
            self.frame.y - ctx.ui_offset.y,
        ));

        let preview = self.selected_value().to_string();
        if ui.begin_combo(&self.id, &preview, self.frame.width, self.enabled) {
            did_open = !was_open;
            for (i, item) in self.items.iter().enumerate() {
                if ui.selectable(item, i == self.selected) {
                    self.selected = i;
                    value_changed = true;
                    self.on_value_changed.call(item, i);
                }
            }
            ui.end_combo();
        }

        if value_changed || did_open {
            DrawResult::Redraw
        } else {
            DrawResult::None
        }
    }
}

impl Default for Combobox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::scripted::ScriptedUi;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn colors() -> Combobox {
        Combobox::with_items(["red", "green", "blue"])
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Combobox::new();
        let b = Combobox::new();
        assert_ne!(a.id(), b.id());
        assert!(a.id().starts_with("##combobox_"));
    }

    #[test]
    fn test_set_selected_index_out_of_range_ignored() {
        let mut combo = colors();
        combo.set_selected_index(2);
        combo.set_selected_index(3);
        combo.set_selected_index(usize::MAX);
        assert_eq!(combo.selected_index(), 2);
        assert_eq!(combo.selected_value(), "blue");
    }

    #[test]
    fn test_set_selected_value_unknown_ignored() {
        let mut combo = colors();
        combo.set_selected_value("green");
        combo.set_selected_value("purple");
        assert_eq!(combo.selected_index(), 1);
    }

    #[test]
    fn test_setters_do_not_fire_callback() {
        let fired = Rc::new(RefCell::new(0));
        let sink = fired.clone();
        let mut combo = colors();
        combo.set_on_value_changed(move |_, _| *sink.borrow_mut() += 1);

        combo.set_selected_index(1);
        combo.set_selected_value("blue");
        assert_eq!(*fired.borrow(), 0);
    }

    #[test]
    fn test_empty_and_cleared() {
        let mut combo = Combobox::new();
        assert_eq!(combo.selected_value(), "");
        combo.set_selected_index(0);
        assert_eq!(combo.selected_index(), 0);

        let mut combo = colors();
        combo.set_selected_index(2);
        combo.clear_items();
        assert!(combo.is_empty());
        assert_eq!(combo.selected_index(), 0);
        assert_eq!(combo.selected_value(), "");
        assert_eq!(combo.item(0), None);
    }

    #[test]
    fn test_user_selection_fires_once() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut combo = colors();
        combo.set_on_value_changed(move |value, index| {
            sink.borrow_mut().push((value.to_string(), index))
        });

        let mut ui = ScriptedUi::new().with_combo_open(Some(combo.id())).click("green");
        let result = combo.draw(&mut ui, &DrawContext::default());

        assert_eq!(result, DrawResult::Redraw);
        assert_eq!(combo.selected_index(), 1);
        assert_eq!(*seen.borrow(), vec![("green".to_string(), 1)]);
        assert_eq!(ui.count("end_combo"), 1);
    }

    #[test]
    fn test_opening_requests_redraw_without_change() {
        let fired = Rc::new(RefCell::new(0));
        let sink = fired.clone();
        let mut combo = colors();
        combo.set_on_value_changed(move |_, _| *sink.borrow_mut() += 1);

        let mut ui = ScriptedUi::new().with_combo_open(None);
        assert_eq!(combo.draw(&mut ui, &DrawContext::default()), DrawResult::Redraw);
        assert_eq!(*fired.borrow(), 0);
        assert_eq!(ui.count("selectable"), 3);
        assert!(ui.calls.contains(&"selectable red true".to_string()));

        // Already open, nothing clicked.
        let mut ui = ScriptedUi::new().with_combo_open(Some(combo.id()));
        assert_eq!(combo.draw(&mut ui, &DrawContext::default()), DrawResult::None);
    }

    #[test]
    fn test_closed_combo_draws_preview_only() {
        let mut combo = colors();
        combo.set_selected_index(2);
        combo.set_frame(Rectangle::new(30.0, 40.0, 120.0, 22.0));
        let ctx = DrawContext {
            ui_offset: Point::new(10.0, 10.0),
            ..Default::default()
        };

        let mut ui = ScriptedUi::new();
        assert_eq!(combo.draw(&mut ui, &ctx), DrawResult::None);
        assert_eq!(ui.cursor, vec![Point::new(20.0, 30.0)]);
        assert_eq!(ui.calls, vec![format!("begin_combo {} 'blue' 120 true", combo.id())]);
    }

    #[test]
    fn test_disabled_combo_does_not_open() {
        let mut combo = colors();
        combo.set_enabled(false);
        let mut ui = ScriptedUi::new().with_combo_open(None).click("red");
        assert_eq!(combo.draw(&mut ui, &DrawContext::default()), DrawResult::None);
        assert_eq!(ui.count("selectable"), 0);
    }

    #[test]
    fn test_preferred_size() {
        let combo = colors();
        let metrics = StyleMetrics::default();
        let ui = ScriptedUi::new();
        // "green" is 5 * 8 = 40, frame height 16 + 2 * 3 = 22, padding 2 * 4.
        assert_eq!(combo.preferred_size(&ui, &metrics), Size::new(70.0, 22.0));
    }
}
