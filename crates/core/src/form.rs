use std::{cell::RefCell, collections::VecDeque, fmt, rc::Rc};

use crossterm::event::KeyEvent;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// A single form-managed value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormControl {
    value: String,
    pristine: bool,
    touched: bool,
    revision: u64,
}

pub type ControlRef = Rc<RefCell<FormControl>>;

impl FormControl {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self {
            value: value.into(),
            pristine: true,
            touched: false,
            revision: 0,
        }
    }

    pub fn shared<S: Into<String>>(value: S) -> ControlRef {
        Rc::new(RefCell::new(Self::new(value)))
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Model-side write. Bound inputs pick the new value up on their next sync.
    pub fn set_value<S: Into<String>>(&mut self, value: S) {
        self.value = value.into();
        self.revision = self.revision.wrapping_add(1);
    }

    /// View-side write from a bound input; marks the control dirty when the value changed.
    /// Returns the revision the writer has now seen.
    pub(crate) fn commit_from_view(&mut self, value: &str) -> u64 {
        if self.value != value {
            self.value = value.to_string();
            self.pristine = false;
            self.revision = self.revision.wrapping_add(1);
        }
        self.revision
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_pristine(&self) -> bool {
        self.pristine
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    pub fn mark_as_pristine(&mut self) {
        self.pristine = true;
    }

    pub fn mark_as_touched(&mut self) {
        self.touched = true;
    }

    pub fn mark_as_untouched(&mut self) {
        self.touched = false;
    }
}

impl Default for FormControl {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// Ordered set of named controls.
#[derive(Clone, Debug, Default)]
pub struct FormGroup {
    controls: Vec<(String, ControlRef)>,
}

impl FormGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_control<N: Into<String>, S: Into<String>>(mut self, name: N, value: S) -> Self {
        self.add_control(name, FormControl::shared(value));
        self
    }

    /// Registers `control` under `name`, replacing any control already registered there.
    pub fn add_control<N: Into<String>>(&mut self, name: N, control: ControlRef) {
        let name = name.into();
        if let Some(slot) = self.controls.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = control;
        } else {
            self.controls.push((name, control));
        }
    }

    pub fn get(&self, name: &str) -> Option<ControlRef> {
        self.controls
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| Rc::clone(c))
    }

    pub fn value(&self, name: &str) -> Option<String> {
        self.get(name).map(|c| c.borrow().value().to_string())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.controls.iter().map(|(n, _)| n.as_str())
    }

    /// Sets every control at once. Every control must be named and every name must exist;
    /// nothing is written when either check fails.
    pub fn set_values<'a, I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, String)>,
    {
        let values: Vec<(&str, String)> = values.into_iter().collect();
        for (name, _) in &values {
            if self.get(name).is_none() {
                return Err(Error::UnknownControl((*name).to_string()));
            }
        }
        for name in self.names() {
            if !values.iter().any(|(n, _)| *n == name) {
                return Err(Error::MissingControlValue(name.to_string()));
            }
        }
        for (name, value) in values {
            if let Some(control) = self.get(name) {
                control.borrow_mut().set_value(value);
            }
        }
        Ok(())
    }

    /// Empties every value and marks the group pristine and untouched.
    pub fn reset(&mut self) {
        for (_, control) in &self.controls {
            let mut c = control.borrow_mut();
            c.set_value(String::new());
            c.mark_as_pristine();
            c.mark_as_untouched();
        }
    }

    pub fn mark_as_pristine(&mut self) {
        for (_, control) in &self.controls {
            control.borrow_mut().mark_as_pristine();
        }
    }

    pub fn mark_as_untouched(&mut self) {
        for (_, control) in &self.controls {
            control.borrow_mut().mark_as_untouched();
        }
    }

    pub fn is_pristine(&self) -> bool {
        self.controls.iter().all(|(_, c)| c.borrow().is_pristine())
    }

    pub fn is_touched(&self) -> bool {
        self.controls.iter().any(|(_, c)| c.borrow().is_touched())
    }
}

/// The event that triggered a submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitEvent {
    Key(KeyEvent),
    Programmatic,
}

/// A group plus the submission bookkeeping of the form that owns it.
#[derive(Debug, Default)]
pub struct FormState {
    group: FormGroup,
    submitted: bool,
    submissions: VecDeque<SubmitEvent>,
}

impl FormState {
    pub fn new(group: FormGroup) -> Self {
        Self {
            group,
            submitted: false,
            submissions: VecDeque::new(),
        }
    }

    pub fn group(&self) -> &FormGroup {
        &self.group
    }

    pub fn group_mut(&mut self) -> &mut FormGroup {
        &mut self.group
    }

    pub fn submitted(&self) -> bool {
        self.submitted
    }

    pub fn take_submissions(&mut self) -> Vec<SubmitEvent> {
        self.submissions.drain(..).collect()
    }

    pub fn pending_submissions(&self) -> usize {
        self.submissions.len()
    }
}

pub trait SubmitHandler {
    /// Returns `false` when the submission's own default action should be suppressed.
    fn handle(&mut self, state: &mut FormState, event: &SubmitEvent) -> bool;
}

impl<F> SubmitHandler for F
where
    F: FnMut(&mut FormState, &SubmitEvent) -> bool,
{
    fn handle(&mut self, state: &mut FormState, event: &SubmitEvent) -> bool {
        self(state, event)
    }
}

fn default_submit(state: &mut FormState, event: &SubmitEvent) -> bool {
    state.submitted = true;
    state.submissions.push_back(event.clone());
    info!(target: "form", ?event, "submitted");
    false
}

/// Work done before a submission reaches the form's handler.
pub trait SubmitStep {
    fn before_submit(&mut self, state: &FormState, event: &SubmitEvent);

    /// A step that reports `false` is dropped from the host at the next chance.
    fn is_live(&self) -> bool {
        true
    }
}

impl<F> SubmitStep for F
where
    F: FnMut(&FormState, &SubmitEvent),
{
    fn before_submit(&mut self, state: &FormState, event: &SubmitEvent) {
        self(state, event)
    }
}

/// Runs its steps, newest first, and then delegates to the handler it wraps,
/// passing the same arguments and returning the wrapped handler's result
/// unchanged. Steps that are no longer live are removed rather than skipped.
pub struct BeforeSubmit {
    steps: Vec<Box<dyn SubmitStep>>,
    inner: Box<dyn SubmitHandler>,
}

impl BeforeSubmit {
    pub fn new(inner: Box<dyn SubmitHandler>) -> Self {
        Self {
            steps: Vec::new(),
            inner,
        }
    }

    pub fn push(&mut self, step: Box<dyn SubmitStep>) {
        self.prune();
        self.steps.push(step);
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    fn prune(&mut self) {
        let before = self.steps.len();
        self.steps.retain(|step| step.is_live());
        let removed = before - self.steps.len();
        if removed > 0 {
            debug!(target: "form", removed, "dropped detached submit steps");
        }
    }
}

impl SubmitHandler for BeforeSubmit {
    fn handle(&mut self, state: &mut FormState, event: &SubmitEvent) -> bool {
        self.prune();
        for step in self.steps.iter_mut().rev() {
            step.before_submit(state, event);
        }
        self.inner.handle(state, event)
    }
}

/// The form-level submission entry point that field behaviors attach to.
pub struct FormHost {
    state: FormState,
    handler: BeforeSubmit,
}

impl FormHost {
    pub fn new(group: FormGroup) -> Self {
        Self {
            state: FormState::new(group),
            handler: BeforeSubmit::new(Box::new(default_submit)),
        }
    }

    pub fn submit(&mut self, event: SubmitEvent) -> bool {
        self.handler.handle(&mut self.state, &event)
    }

    /// Replaces the handler behind the submit steps with whatever `wrap` builds
    /// around it. Steps installed with [`FormHost::intercept_submit`] keep
    /// running first.
    pub fn wrap_submit<W>(&mut self, wrap: W)
    where
        W: FnOnce(Box<dyn SubmitHandler>) -> Box<dyn SubmitHandler>,
    {
        let original = std::mem::replace(&mut self.handler.inner, Box::new(default_submit));
        self.handler.inner = wrap(original);
    }

    /// Installs `step` to run before every submission reaches the current handler.
    pub fn intercept_submit<S>(&mut self, step: S)
    where
        S: SubmitStep + 'static,
    {
        self.handler.push(Box::new(step));
    }

    /// Steps currently installed in front of the handler.
    pub fn submit_step_count(&self) -> usize {
        self.handler.step_count()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut FormState {
        &mut self.state
    }

    pub fn group(&self) -> &FormGroup {
        &self.state.group
    }

    pub fn group_mut(&mut self) -> &mut FormGroup {
        &mut self.state.group
    }
}

impl fmt::Debug for FormHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormHost")
            .field("state", &self.state)
            .field("submit_steps", &self.handler.step_count())
            .finish_non_exhaustive()
    }
}
