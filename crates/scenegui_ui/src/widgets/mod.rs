// Widget implementations

mod combobox;
mod menu;
#[cfg(test)]
pub(crate) mod scripted;

pub use combobox::Combobox;
pub use menu::{ItemId, Menu, MenuItem, MenuNode};
