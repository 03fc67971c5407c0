//! Menu trees for popup menus and the main menu bar.
//!
//! A [`Menu`] owns its children directly. Items are looked up by id with a
//! depth-first walk: a menu's own items are checked before any submenu, and
//! submenus are searched in insertion order.

use std::fmt;

use crate::ui::{DrawContext, ImmediateUi, StyleMetrics};

/// Extra vertical padding applied to the menu bar.
const EXTRA_PADDING_Y: f32 = 1.0;

/// Application-chosen identifier of a menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item {}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub id: ItemId,
    pub name: String,
    /// Shortcut text shown right-aligned, e.g. `"Ctrl+S"`.
    pub shortcut: Option<String>,
    pub enabled: bool,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuNode {
    Item(MenuItem),
    Submenu { name: String, menu: Menu },
    Separator,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Menu {
    nodes: Vec<MenuNode>,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, name: impl Into<String>, id: ItemId) {
        self.push_item(name.into(), id, None);
    }

    pub fn add_item_with_shortcut(
        &mut self,
        name: impl Into<String>,
        id: ItemId,
        shortcut: impl Into<String>,
    ) {
        self.push_item(name.into(), id, Some(shortcut.into()));
    }

    fn push_item(&mut self, name: String, id: ItemId, shortcut: Option<String>) {
        self.nodes.push(MenuNode::Item(MenuItem {
            id,
            name,
            shortcut,
            enabled: true,
            checked: false,
        }));
    }

    pub fn add_menu(&mut self, name: impl Into<String>, menu: Menu) {
        self.nodes.push(MenuNode::Submenu {
            name: name.into(),
            menu,
        });
    }

    pub fn add_separator(&mut self) {
        self.nodes.push(MenuNode::Separator);
    }

    pub fn nodes(&self) -> &[MenuNode] {
        &self.nodes
    }

    pub fn find_item(&self, id: ItemId) -> Option<&MenuItem> {
        let direct = self.nodes.iter().find_map(|node| match node {
            MenuNode::Item(item) if item.id == id => Some(item),
            _ => None,
        });
        direct.or_else(|| {
            self.nodes.iter().find_map(|node| match node {
                MenuNode::Submenu { menu, .. } => menu.find_item(id),
                _ => None,
            })
        })
    }

    pub fn find_item_mut(&mut self, id: ItemId) -> Option<&mut MenuItem> {
        let direct = self
            .nodes
            .iter()
            .position(|node| matches!(node, MenuNode::Item(item) if item.id == id));
        if let Some(index) = direct {
            return match &mut self.nodes[index] {
                MenuNode::Item(item) => Some(item),
                _ => None,
            };
        }
        self.nodes.iter_mut().find_map(|node| match node {
            MenuNode::Submenu { menu, .. } => menu.find_item_mut(id),
            _ => None,
        })
    }

    /// `false` for unknown ids.
    pub fn is_enabled(&self, id: ItemId) -> bool {
        self.find_item(id).is_some_and(|item| item.enabled)
    }

    pub fn set_enabled(&mut self, id: ItemId, enabled: bool) {
        if let Some(item) = self.find_item_mut(id) {
            item.enabled = enabled;
        }
    }

    /// `false` for unknown ids.
    pub fn is_checked(&self, id: ItemId) -> bool {
        self.find_item(id).is_some_and(|item| item.checked)
    }

    pub fn set_checked(&mut self, id: ItemId, checked: bool) {
        if let Some(item) = self.find_item_mut(id) {
            item.checked = checked;
        }
    }

    /// Height of the main menu bar.
    pub fn calc_height(metrics: &StyleMetrics) -> f32 {
        (metrics.line_height.ceil() + 2.0 * (metrics.frame_padding[1] + EXTRA_PADDING_Y)).ceil()
    }

    /// Popup content width: margins, the widest name and shortcut with
    /// two-em gaps, and room for the check mark.
    pub fn calc_content_width(&self, ui: &dyn ImmediateUi, metrics: &StyleMetrics) -> f32 {
        let em = metrics.line_height.ceil();
        let padding = metrics.default_margin;
        let mut name_width = 0.0f32;
        let mut shortcut_width = 0.0f32;
        for node in &self.nodes {
            let (name, shortcut) = match node {
                MenuNode::Item(item) => (item.name.as_str(), item.shortcut.as_deref()),
                MenuNode::Submenu { name, .. } => (name.as_str(), None),
                MenuNode::Separator => continue,
            };
            name_width = name_width.max(ui.calc_text_width(name).ceil());
            if let Some(shortcut) = shortcut {
                shortcut_width = shortcut_width.max(ui.calc_text_width(shortcut).ceil());
            }
        }
        padding + name_width + 2.0 * em + shortcut_width + 2.0 * em + (1.5 * em).ceil() + padding
    }

    /// Draw this menu as a popup titled `name`.
    ///
    /// Returns the id of the item activated this frame, if any.
    pub fn draw(
        &self,
        ui: &mut dyn ImmediateUi,
        ctx: &DrawContext,
        name: &str,
        enabled: bool,
    ) -> Option<ItemId> {
        let mut activated = None;

        let width = self.calc_content_width(ui, &ctx.metrics);
        ui.set_next_window_content_width(width);
        if !ui.begin_menu(name, enabled) {
            return None;
        }

        for node in &self.nodes {
            match node {
                MenuNode::Separator => ui.separator(),
                MenuNode::Submenu { name, menu } => {
                    if let Some(id) = menu.draw(ui, ctx, name, enabled) {
                        activated = Some(id);
                    }
                }
                MenuNode::Item(item) => {
                    let shortcut = item.shortcut.as_deref().unwrap_or("");
                    if ui.menu_item(&item.name, shortcut, item.checked, item.enabled) {
                        activated = Some(item.id);
                    }
                }
            }
        }

        ui.end_menu();
        activated
    }

    /// Draw the top-level submenus into the main menu bar.
    ///
    /// Plain items and separators at the top level are not shown.
    pub fn draw_menu_bar(
        &self,
        ui: &mut dyn ImmediateUi,
        ctx: &DrawContext,
        enabled: bool,
    ) -> Option<ItemId> {
        if !ui.begin_main_menu_bar() {
            return None;
        }

        let mut activated = None;
        for node in &self.nodes {
            if let MenuNode::Submenu { name, menu } = node {
                if let Some(id) = menu.draw(ui, ctx, name, enabled) {
                    activated = Some(id);
                }
            }
        }

        ui.end_main_menu_bar();
        if let Some(id) = activated {
            log::debug!("Menu bar activated {id}");
        }
        activated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::scripted::ScriptedUi;

    const OPEN: ItemId = ItemId(1);
    const SAVE: ItemId = ItemId(2);
    const QUIT: ItemId = ItemId(3);
    const WIREFRAME: ItemId = ItemId(10);
    const DEEP: ItemId = ItemId(20);

    fn menu_bar() -> Menu {
        let mut file = Menu::new();
        file.add_item("Open", OPEN);
        file.add_item_with_shortcut("Save", SAVE, "Ctrl+S");
        file.add_separator();
        file.add_item("Quit", QUIT);

        let mut advanced = Menu::new();
        advanced.add_item("Deep", DEEP);
        let mut view = Menu::new();
        view.add_item("Wireframe", WIREFRAME);
        view.add_menu("Advanced", advanced);

        let mut bar = Menu::new();
        bar.add_menu("File", file);
        bar.add_menu("View", view);
        bar
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut menu = menu_bar();
        let before = menu.clone();

        menu.set_enabled(ItemId(99), false);
        menu.set_checked(ItemId(99), true);

        assert_eq!(menu, before);
        assert!(!menu.is_enabled(ItemId(99)));
        assert!(!menu.is_checked(ItemId(99)));
    }

    #[test]
    fn test_nested_lookup() {
        let mut menu = menu_bar();
        assert!(menu.is_enabled(DEEP));

        menu.set_checked(DEEP, true);
        menu.set_enabled(WIREFRAME, false);

        assert!(menu.is_checked(DEEP));
        assert!(!menu.is_enabled(WIREFRAME));
        assert_eq!(menu.find_item(DEEP).map(|i| i.name.as_str()), Some("Deep"));
    }

    #[test]
    fn test_direct_items_win_over_submenus() {
        let mut sub = Menu::new();
        sub.add_item("Nested", OPEN);
        let mut menu = Menu::new();
        menu.add_menu("Sub", sub);
        menu.add_item("Direct", OPEN);

        assert_eq!(menu.find_item(OPEN).unwrap().name, "Direct");
        menu.set_checked(OPEN, true);
        assert!(menu.find_item(OPEN).unwrap().checked);
    }

    #[test]
    fn test_draw_returns_activated_item() {
        let menu = menu_bar();
        let mut ui = ScriptedUi::new().open_menu("File").click("Save");

        let activated = menu.draw_menu_bar(&mut ui, &DrawContext::default(), true);

        assert_eq!(activated, Some(SAVE));
        assert!(ui.calls.contains(&"menu_item Save 'Ctrl+S' false true".to_string()));
        assert_eq!(ui.count("separator"), 1);
        assert_eq!(ui.count("end_menu"), 1);
        assert_eq!(ui.count("end_main_menu_bar"), 1);
    }

    #[test]
    fn test_draw_nested_activation() {
        let menu = menu_bar();
        let mut ui = ScriptedUi::new()
            .open_menu("View")
            .open_menu("Advanced")
            .click("Deep");

        assert_eq!(menu.draw_menu_bar(&mut ui, &DrawContext::default(), true), Some(DEEP));
        assert_eq!(ui.count("end_menu"), 2);
    }

    #[test]
    fn test_closed_menu_returns_none() {
        let menu = menu_bar();
        let mut ui = ScriptedUi::new().click("Save");
        assert_eq!(menu.draw_menu_bar(&mut ui, &DrawContext::default(), true), None);
        assert_eq!(ui.count("menu_item"), 0);
        assert_eq!(ui.count("end_menu"), 0);
    }

    #[test]
    fn test_disabled_item_not_activated() {
        let mut menu = menu_bar();
        menu.set_enabled(SAVE, false);
        let mut ui = ScriptedUi::new().open_menu("File").click("Save");

        assert_eq!(menu.draw_menu_bar(&mut ui, &DrawContext::default(), true), None);
        assert!(ui.calls.contains(&"menu_item Save 'Ctrl+S' false false".to_string()));
    }

    #[test]
    fn test_disabled_bar_keeps_menus_closed() {
        let menu = menu_bar();
        let mut ui = ScriptedUi::new().open_menu("File").click("Open");
        assert_eq!(menu.draw_menu_bar(&mut ui, &DrawContext::default(), false), None);
    }

    #[test]
    fn test_calc_height() {
        let metrics = StyleMetrics {
            line_height: 15.5,
            frame_padding: [4.0, 3.0],
            ..Default::default()
        };
        // ceil(16 + 2 * (3 + 1))
        assert_eq!(Menu::calc_height(&metrics), 24.0);
    }

    #[test]
    fn test_content_width() {
        let menu = menu_bar();
        let mut file = None;
        if let MenuNode::Submenu { menu, .. } = &menu.nodes()[0] {
            file = Some(menu);
        }
        let ui = ScriptedUi::new();
        let metrics = StyleMetrics::default();
        // 8 + 32 ("Open"/"Save"/"Quit") + 32 + 48 ("Ctrl+S") + 32 + 24 + 8
        assert_eq!(file.unwrap().calc_content_width(&ui, &metrics), 184.0);
    }
}
