use crossterm::event::KeyEvent;
use tracing::{debug, info};

use crate::{
    accessor::{Binding, ValueAccessor},
    behavior::{Behavior, KeyDispatch},
    ctrl_enter::CtrlEnterSubmitter,
    error::{Error, Result},
    form::{FormGroup, FormHost, SubmitEvent},
    history::{HistoryCycler, HistoryOptions, HistoryView},
    input::TextInput,
};

pub type FieldId = usize;

/// A text input plus the behaviors attached to it.
pub struct Field {
    label: String,
    input: TextInput,
    behaviors: Vec<Box<dyn Behavior>>,
    history: Option<HistoryView>,
}

impl Field {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn input(&self) -> &TextInput {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut TextInput {
        &mut self.input
    }

    pub fn behavior_names(&self) -> Vec<&'static str> {
        self.behaviors.iter().map(|b| b.name()).collect()
    }

    /// Size of the first attached history, if any.
    pub fn history_len(&self) -> Option<usize> {
        self.history.as_ref().and_then(HistoryView::entry_count)
    }

    /// Every attached behavior sees the key in attach order; the input's own
    /// editing runs afterwards unless one of them prevented it.
    pub fn on_key(&mut self, key: KeyEvent, host: &mut FormHost) -> KeyDispatch {
        self.input.sync_from_control();
        let mut event = KeyDispatch::new(key);
        for behavior in self.behaviors.iter_mut() {
            behavior.on_key(&mut event, &mut self.input, host);
        }
        if !event.is_default_prevented() {
            self.input.handle_key(&key);
        }
        event
    }
}

/// A form host with its fields and keyboard focus.
pub struct Form {
    host: FormHost,
    fields: Vec<Field>,
    focus: FieldId,
}

impl Form {
    pub fn new(group: FormGroup) -> Self {
        Self {
            host: FormHost::new(group),
            fields: Vec::new(),
            focus: 0,
        }
    }

    /// Creates a field whose binding is resolved against the form's group right away.
    pub fn add_field<S: Into<String>>(
        &mut self,
        label: S,
        binding: Binding,
        input: TextInput,
    ) -> Result<FieldId> {
        let accessor = ValueAccessor::resolve(&binding, self.host.group())?;
        self.fields.push(Field {
            label: label.into(),
            input: input.with_accessor(accessor),
            behaviors: Vec::new(),
            history: None,
        });
        Ok(self.fields.len() - 1)
    }

    pub fn attach(&mut self, id: FieldId, behavior: Box<dyn Behavior>) -> Result<()> {
        let field = self.fields.get_mut(id).ok_or(Error::UnknownField(id))?;
        debug!(target: "form", field = %field.label, behavior = behavior.name(), "attach");
        field.behaviors.push(behavior);
        Ok(())
    }

    pub fn attach_history(&mut self, id: FieldId, options: HistoryOptions) -> Result<()> {
        let field = self.fields.get(id).ok_or(Error::UnknownField(id))?;
        let cycler = HistoryCycler::attach(&field.input, &mut self.host, options)?;
        let view = cycler.view();
        self.attach(id, Box::new(cycler))?;
        if let Some(field) = self.fields.get_mut(id) {
            field.history.get_or_insert(view);
        }
        Ok(())
    }

    pub fn attach_ctrl_enter(&mut self, id: FieldId) -> Result<()> {
        self.attach(id, Box::new(CtrlEnterSubmitter::new()))
    }

    /// Drops every behavior attached to the field.
    pub fn detach_behaviors(&mut self, id: FieldId) -> Result<()> {
        let field = self.fields.get_mut(id).ok_or(Error::UnknownField(id))?;
        info!(target: "form", field = %field.label, count = field.behaviors.len(), "detach");
        field.behaviors.clear();
        field.history = None;
        Ok(())
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.get(id)
    }

    pub fn field_mut(&mut self, id: FieldId) -> Option<&mut Field> {
        self.fields.get_mut(id)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn focus(&self) -> FieldId {
        self.focus
    }

    pub fn set_focus(&mut self, id: FieldId) {
        if id == self.focus || id >= self.fields.len() {
            return;
        }
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.input.blur();
        }
        self.focus = id;
    }

    pub fn focus_next(&mut self) {
        if self.fields.is_empty() {
            return;
        }
        self.set_focus((self.focus + 1) % self.fields.len());
    }

    pub fn focus_prev(&mut self) {
        if self.fields.is_empty() {
            return;
        }
        let n = self.fields.len();
        self.set_focus((self.focus + n - 1) % n);
    }

    /// Routes the key to the focused field. `None` when the form has no fields.
    pub fn on_key(&mut self, key: KeyEvent) -> Option<KeyDispatch> {
        let Self {
            host,
            fields,
            focus,
        } = self;
        fields.get_mut(*focus).map(|field| field.on_key(key, host))
    }

    pub fn submit(&mut self, event: SubmitEvent) -> bool {
        self.host.submit(event)
    }

    pub fn take_submissions(&mut self) -> Vec<SubmitEvent> {
        self.host.state_mut().take_submissions()
    }

    /// Brings every input's visible text in line with model-side writes.
    pub fn sync_views(&mut self) {
        for field in self.fields.iter_mut() {
            field.input.sync_from_control();
        }
    }

    pub fn host(&self) -> &FormHost {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut FormHost {
        &mut self.host
    }

    pub fn group(&self) -> &FormGroup {
        self.host.group()
    }

    pub fn group_mut(&mut self) -> &mut FormGroup {
        self.host.group_mut()
    }
}
