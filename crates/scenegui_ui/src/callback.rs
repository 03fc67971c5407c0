//! Callback wrappers used by widgets and draw commands.
//!
//! Boxed closures don't implement `Debug`, so these thin wrappers let the
//! types holding them keep `#[derive(Debug)]`.

use std::fmt;

use crate::draw::{DrawCmd, DrawList};

/// Optional handler notified with `(value, index)` when a user picks an item.
pub struct SelectionCallback {
    f: Option<Box<dyn FnMut(&str, usize)>>,
}

impl SelectionCallback {
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut(&str, usize) + 'static,
    {
        Self {
            f: Some(Box::new(f)),
        }
    }

    pub fn none() -> Self {
        Self { f: None }
    }

    /// Invoke the handler if one is set.
    pub fn call(&mut self, value: &str, index: usize) {
        if let Some(f) = self.f.as_mut() {
            f(value, index);
        }
    }

    pub fn is_some(&self) -> bool {
        self.f.is_some()
    }
}

impl Default for SelectionCallback {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for SelectionCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionCallback")
            .field("set", &self.is_some())
            .finish()
    }
}

/// User callback attached to a draw command.
///
/// Invoked by the bridge in place of emitting a primitive for that command.
pub struct DrawCallback {
    f: Box<dyn Fn(&DrawList, &DrawCmd)>,
}

impl DrawCallback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&DrawList, &DrawCmd) + 'static,
    {
        Self { f: Box::new(f) }
    }

    pub fn call(&self, list: &DrawList, cmd: &DrawCmd) {
        (self.f)(list, cmd)
    }
}

impl fmt::Debug for DrawCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DrawCallback")
    }
}
