use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::info;

use crate::{
    behavior::{Behavior, KeyDispatch},
    form::{FormHost, SubmitEvent},
    input::TextInput,
};

/// Submits the enclosing form on Ctrl+Enter.
#[derive(Clone, Copy, Debug, Default)]
pub struct CtrlEnterSubmitter;

impl CtrlEnterSubmitter {
    pub fn new() -> Self {
        Self
    }

    /// Enter with exactly the Control modifier.
    pub fn matches(key: &KeyEvent) -> bool {
        key.code == KeyCode::Enter
            && key.modifiers == KeyModifiers::CONTROL
            && matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat)
    }
}

impl Behavior for CtrlEnterSubmitter {
    fn name(&self) -> &'static str {
        "ctrl-enter"
    }

    fn on_key(&mut self, event: &mut KeyDispatch, _input: &mut TextInput, host: &mut FormHost) {
        if !Self::matches(event.key()) {
            return;
        }
        event.prevent_default();
        event.stop_propagation();
        info!(target: "ctrl_enter", "submitting form");
        host.submit(SubmitEvent::Key(*event.key()));
    }
}
