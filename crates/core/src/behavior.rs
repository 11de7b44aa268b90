use crossterm::event::KeyEvent;

use crate::{form::FormHost, input::TextInput};

/// A key press travelling through a field's behaviors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyDispatch {
    key: KeyEvent,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl KeyDispatch {
    pub fn new(key: KeyEvent) -> Self {
        Self {
            key,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn key(&self) -> &KeyEvent {
        &self.key
    }

    /// The input's own editing action for this key will not run.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Handlers outside the field (form-level shortcuts) will not see this key.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Something attached to a field that reacts to its key presses.
pub trait Behavior {
    fn name(&self) -> &'static str;

    fn on_key(&mut self, event: &mut KeyDispatch, input: &mut TextInput, host: &mut FormHost);
}
