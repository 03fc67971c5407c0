//! scenegui_ui - immediate-mode UI draw data bridged onto a scene-graph renderer
//!
//! The [`Bridge`] turns each frame's [`DrawData`] into engine primitives.
//! [`Combobox`] and [`Menu`] are widgets drawn through the [`ImmediateUi`] seam.

pub mod bridge;
mod callback;
mod draw;
mod error;
mod layout;
mod ui;
mod widgets;

pub use bridge::{Bridge, BridgeConfig, FrameStats, ScissorKey};
pub use callback::{DrawCallback, SelectionCallback};
pub use draw::{ClipRect, DrawCmd, DrawData, DrawList};
pub use error::{BridgeError, Result};
pub use layout::{Point, Rectangle, Size};
pub use ui::{DrawContext, DrawResult, ImmediateUi, StyleMetrics};
pub use widgets::{Combobox, ItemId, Menu, MenuItem, MenuNode};

// Re-export the engine types callers need to drive a bridge
pub use scenegui_gpu::{DrawIdx, DrawVert, HeadlessEngine, RenderEngine};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bridge::{Bridge, BridgeConfig};
    pub use crate::draw::{ClipRect, DrawData, DrawList};
    pub use crate::layout::{Point, Rectangle};
    pub use crate::ui::{DrawContext, DrawResult, ImmediateUi};
    pub use crate::widgets::{Combobox, ItemId, Menu};
}
