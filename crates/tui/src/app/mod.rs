use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use arrow_state::{Binding, FieldId, Form, FormGroup, TextInput};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::Rect;
use tracing::info;

use crate::config::{DemoConfig, FieldConfig};
use crate::strings::{LABEL_DESCRIPTION, LABEL_NAME, SUBMITTED, SUBMITTED_MS};

pub mod snackbar;

use snackbar::Snackbar;

pub const NAME: &str = "name";
pub const DESCRIPTION: &str = "description";

pub struct App {
    pub form: Form,
    pub name: FieldId,
    pub description: FieldId,
    pub snackbar: Option<Snackbar>,
    pub should_quit: bool,
    pub dirty: bool,
    pub field_areas: Vec<(FieldId, Rect)>,
}

fn add_field(
    form: &mut Form,
    label: &str,
    control: &str,
    input: TextInput,
    cfg: &FieldConfig,
) -> Result<FieldId> {
    let id = form
        .add_field(label, Binding::name(control), input.with_update_on(cfg.update_on))
        .with_context(|| format!("create field {control}"))?;
    form.attach_history(id, cfg.history)
        .with_context(|| format!("attach history to {control}"))?;
    if cfg.submit_on_ctrl_enter {
        form.attach_ctrl_enter(id)
            .with_context(|| format!("attach ctrl+enter to {control}"))?;
    }
    Ok(id)
}

impl App {
    pub fn new(config: &DemoConfig) -> Result<Self> {
        let group = FormGroup::new()
            .with_control(NAME, "")
            .with_control(DESCRIPTION, "");
        let mut form = Form::new(group);
        let name = add_field(
            &mut form,
            LABEL_NAME,
            NAME,
            TextInput::single_line(),
            &config.name,
        )?;
        let description = add_field(
            &mut form,
            LABEL_DESCRIPTION,
            DESCRIPTION,
            TextInput::multi_line(),
            &config.description,
        )?;
        Ok(Self {
            form,
            name,
            description,
            snackbar: None,
            should_quit: false,
            dirty: true,
            field_areas: Vec::new(),
        })
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            KeyCode::Tab => self.form.focus_next(),
            KeyCode::BackTab => self.form.focus_prev(),
            _ => {
                if let Some(ev) = self.form.on_key(key) {
                    if ev.is_propagation_stopped() {
                        info!(target: "tui", code = ?key.code, "key handled by field");
                    }
                }
            }
        }
        self.drain_submissions(Instant::now());
        self.dirty = true;
    }

    pub fn insert_text(&mut self, s: &str) {
        let id = self.form.focus();
        if let Some(field) = self.form.field_mut(id) {
            field.input_mut().paste(s);
            self.dirty = true;
        }
    }

    pub fn on_click(&mut self, x: u16, y: u16) {
        let hit = self.field_areas.iter().find(|(_, a)| {
            x >= a.x && x < a.x + a.width && y >= a.y && y < a.y + a.height
        });
        if let Some((id, _)) = hit {
            self.form.set_focus(*id);
            self.dirty = true;
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        if self.snackbar.as_ref().is_some_and(|s| s.is_expired(now)) {
            self.snackbar = None;
            self.dirty = true;
        }
    }

    fn drain_submissions(&mut self, now: Instant) {
        for event in self.form.take_submissions() {
            info!(target: "tui", ?event, "form submitted");
            self.reset_and_notify(now);
        }
    }

    /// Clears both fields, marks the form pristine and untouched, and shows the confirmation.
    pub fn reset_and_notify(&mut self, now: Instant) {
        let group = self.form.group_mut();
        let cleared = group.set_values([(NAME, String::new()), (DESCRIPTION, String::new())]);
        if let Err(e) = cleared {
            tracing::error!(target: "tui", error = %e, "reset failed");
        }
        group.mark_as_pristine();
        group.mark_as_untouched();
        self.form.sync_views();
        self.snackbar = Some(Snackbar::new(
            SUBMITTED,
            Duration::from_millis(SUBMITTED_MS),
            now,
        ));
    }
}
