use std::{
    cell::RefCell,
    collections::VecDeque,
    rc::{Rc, Weak},
};

use crossterm::event::{KeyCode, KeyEventKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    accessor::ValueAccessor,
    behavior::{Behavior, KeyDispatch},
    error::{Error, Result},
    form::{FormHost, FormState, SubmitEvent, SubmitStep},
    input::{TextCursor, TextInput},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryOptions {
    /// Up at the start of the text cycles to the previous entry.
    pub move_to_start_on_up_arrow: bool,
    /// Down at the end of the text cycles to the next entry.
    pub move_to_end_on_down_arrow: bool,
    /// Accepted for configuration; cycling does not read it.
    pub save_unsubmitted_values: bool,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            move_to_start_on_up_arrow: true,
            move_to_end_on_down_arrow: true,
            save_unsubmitted_values: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

type Ring = VecDeque<String>;

/// Per-field submission history, cycled with the arrow keys.
///
/// The ring is seeded with the field's value at attach time and grows by one
/// entry per form submission. Rotation moves entries between the ends and never
/// changes the ring's size. Dropping the cycler discards the ring, and the
/// submit step it installed is removed from the host.
#[derive(Debug)]
pub struct HistoryCycler {
    history: Rc<RefCell<Ring>>,
    accessor: ValueAccessor,
    options: HistoryOptions,
}

impl HistoryCycler {
    /// Fails with [`Error::MissingValueAccessor`] when `input` is not bound to a control.
    pub fn attach(input: &TextInput, host: &mut FormHost, options: HistoryOptions) -> Result<Self> {
        let accessor = input
            .accessor()
            .cloned()
            .ok_or(Error::MissingValueAccessor)?;

        let history = Rc::new(RefCell::new(Ring::new()));
        host.intercept_submit(RecordSubmission {
            ring: Rc::downgrade(&history),
            accessor: accessor.clone(),
        });

        history.borrow_mut().push_back(accessor.value());
        info!(target: "history", field = accessor.name(), ?options, "attached");

        Ok(Self {
            history,
            accessor,
            options,
        })
    }

    /// Snapshot of the ring, oldest position first.
    pub fn history(&self) -> Vec<String> {
        self.history.borrow().iter().cloned().collect()
    }

    pub fn entry_count(&self) -> usize {
        self.history.borrow().len()
    }

    /// A handle that reads the ring without keeping it alive.
    pub fn view(&self) -> HistoryView {
        HistoryView(Rc::downgrade(&self.history))
    }

    pub fn should_rotate<C: TextCursor + ?Sized>(&self, direction: Direction, cursor: &C) -> bool {
        let enabled = match direction {
            Direction::Up => self.options.move_to_start_on_up_arrow,
            Direction::Down => self.options.move_to_end_on_down_arrow,
        };
        enabled && should_rotate(self.entry_count(), direction, cursor)
    }

    /// Moves the newest entry to the front and shows it, caret at the start.
    pub fn on_arrow_up(&mut self, input: &mut TextInput) -> bool {
        if !self.should_rotate(Direction::Up, input) {
            return false;
        }
        let mut ring = self.history.borrow_mut();
        let Some(last) = ring.pop_back() else {
            return false;
        };
        self.accessor.set_value(last.clone());
        ring.push_front(last);
        drop(ring);

        input.sync_from_control();
        input.set_caret(0);
        debug!(target: "history", field = self.accessor.name(), "rotated up");
        true
    }

    /// Moves the oldest entry to the back and shows it, caret at the end.
    pub fn on_arrow_down(&mut self, input: &mut TextInput) -> bool {
        if !self.should_rotate(Direction::Down, input) {
            return false;
        }
        let mut ring = self.history.borrow_mut();
        let Some(first) = ring.pop_front() else {
            return false;
        };
        self.accessor.set_value(first.clone());
        ring.push_back(first);
        drop(ring);

        input.sync_from_control();
        let end = input.len();
        input.set_caret(end);
        debug!(target: "history", field = self.accessor.name(), "rotated down");
        true
    }
}

impl Behavior for HistoryCycler {
    fn name(&self) -> &'static str {
        "history"
    }

    fn on_key(&mut self, event: &mut KeyDispatch, input: &mut TextInput, _host: &mut FormHost) {
        let key = event.key();
        if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat)
            || !key.modifiers.is_empty()
        {
            return;
        }
        let rotated = match key.code {
            KeyCode::Up => self.on_arrow_up(input),
            KeyCode::Down => self.on_arrow_down(input),
            _ => return,
        };
        if rotated {
            event.prevent_default();
        }
    }
}

impl Drop for HistoryCycler {
    fn drop(&mut self) {
        debug!(target: "history", field = self.accessor.name(), entries = self.entry_count(), "detached");
    }
}

/// Appends the field's value to the ring ahead of every submission.
struct RecordSubmission {
    ring: Weak<RefCell<Ring>>,
    accessor: ValueAccessor,
}

impl SubmitStep for RecordSubmission {
    fn before_submit(&mut self, _state: &FormState, _event: &SubmitEvent) {
        if let Some(ring) = self.ring.upgrade() {
            let value = self.accessor.value();
            debug!(target: "history", field = self.accessor.name(), %value, "recorded submission");
            ring.borrow_mut().push_back(value);
        }
    }

    fn is_live(&self) -> bool {
        self.ring.strong_count() > 0
    }
}

/// Read-only view of a cycler's ring.
#[derive(Clone, Debug)]
pub struct HistoryView(Weak<RefCell<Ring>>);

impl HistoryView {
    /// `None` once the cycler has been dropped.
    pub fn entry_count(&self) -> Option<usize> {
        self.0.upgrade().map(|ring| ring.borrow().len())
    }
}

/// Boundary-only rotation policy, independent of the per-direction options.
pub fn should_rotate<C: TextCursor + ?Sized>(
    history_len: usize,
    direction: Direction,
    cursor: &C,
) -> bool {
    if history_len < 2 {
        return false;
    }
    if cursor.visible_text().is_empty() {
        return true;
    }
    let (start, end) = cursor.selection_range();
    if start != end {
        return false;
    }
    match direction {
        Direction::Up => start == 0,
        Direction::Down => start == cursor.text_len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        accessor::Binding,
        form::FormGroup,
    };
    use crossterm::event::{KeyEvent, KeyModifiers};

    struct Caret {
        text: &'static str,
        range: (usize, usize),
    }

    impl TextCursor for Caret {
        fn visible_text(&self) -> &str {
            self.text
        }

        fn selection_range(&self) -> (usize, usize) {
            self.range
        }
    }

    fn setup(seed: &str) -> (FormHost, TextInput, HistoryCycler) {
        let mut host = FormHost::new(FormGroup::new().with_control("name", seed));
        let acc = ValueAccessor::resolve(&Binding::name("name"), host.group()).unwrap();
        let input = TextInput::single_line().with_accessor(acc);
        let cycler = HistoryCycler::attach(&input, &mut host, HistoryOptions::default()).unwrap();
        (host, input, cycler)
    }

    fn submit_value(host: &mut FormHost, input: &mut TextInput, value: &str) {
        input.set_text(value);
        input.commit();
        host.submit(SubmitEvent::Programmatic);
    }

    fn press(code: KeyCode) -> KeyDispatch {
        KeyDispatch::new(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn policy_needs_two_entries() {
        let empty = Caret { text: "", range: (0, 0) };
        assert!(!should_rotate(0, Direction::Up, &empty));
        assert!(!should_rotate(1, Direction::Down, &empty));
        assert!(should_rotate(2, Direction::Up, &empty));
    }

    #[test]
    fn policy_empty_text_rotates_both_ways() {
        let empty = Caret { text: "", range: (0, 0) };
        assert!(should_rotate(3, Direction::Up, &empty));
        assert!(should_rotate(3, Direction::Down, &empty));
    }

    #[test]
    fn policy_selection_blocks_rotation() {
        let all = Caret { text: "abc", range: (0, 3) };
        assert!(!should_rotate(3, Direction::Up, &all));
        assert!(!should_rotate(3, Direction::Down, &all));
    }

    #[test]
    fn policy_checks_the_matching_boundary() {
        let start = Caret { text: "abc", range: (0, 0) };
        let middle = Caret { text: "abc", range: (1, 1) };
        let end = Caret { text: "abc", range: (3, 3) };
        assert!(should_rotate(2, Direction::Up, &start));
        assert!(!should_rotate(2, Direction::Down, &start));
        assert!(!should_rotate(2, Direction::Up, &middle));
        assert!(!should_rotate(2, Direction::Down, &middle));
        assert!(should_rotate(2, Direction::Down, &end));
        assert!(!should_rotate(2, Direction::Up, &end));
    }

    #[test]
    fn attach_seeds_with_current_value() {
        let (_host, _input, cycler) = setup("seed");
        assert_eq!(cycler.history(), vec!["seed"]);
    }

    #[test]
    fn attach_without_accessor_fails() {
        let mut host = FormHost::new(FormGroup::new());
        let input = TextInput::single_line();
        let err = HistoryCycler::attach(&input, &mut host, HistoryOptions::default()).unwrap_err();
        assert_eq!(err, Error::MissingValueAccessor);
    }

    #[test]
    fn each_submission_appends_one_entry() {
        let (mut host, mut input, cycler) = setup("initial");
        for (i, v) in ["a", "b", "c"].into_iter().enumerate() {
            submit_value(&mut host, &mut input, v);
            assert_eq!(cycler.entry_count(), i + 2);
        }
        assert_eq!(cycler.history(), vec!["initial", "a", "b", "c"]);
    }

    #[test]
    fn submission_captured_before_original_handler() {
        let (mut host, mut input, cycler) = setup("");
        host.wrap_submit(|mut original| {
            Box::new(move |state: &mut crate::form::FormState, event: &SubmitEvent| {
                let result = original.handle(state, event);
                state.group_mut().reset();
                result
            })
        });
        submit_value(&mut host, &mut input, "kept");
        assert_eq!(cycler.history(), vec!["", "kept"]);
        assert_eq!(host.group().value("name").as_deref(), Some(""));
    }

    #[test]
    fn single_entry_does_not_rotate() {
        let (mut host, mut input, mut cycler) = setup("only");
        input.set_caret(0);
        let mut ev = press(KeyCode::Up);
        cycler.on_key(&mut ev, &mut input, &mut host);
        assert!(!ev.is_default_prevented());
        assert_eq!(input.text(), "only");

        input.set_text("");
        let mut ev = press(KeyCode::Down);
        cycler.on_key(&mut ev, &mut input, &mut host);
        assert!(!ev.is_default_prevented());
        assert_eq!(input.text(), "");
        assert_eq!(cycler.history(), vec!["only"]);
    }

    #[test]
    fn caret_inside_text_leaves_value() {
        let (mut host, mut input, mut cycler) = setup("one");
        submit_value(&mut host, &mut input, "two");
        input.set_caret(1);
        assert!(!cycler.on_arrow_up(&mut input));
        assert!(!cycler.on_arrow_down(&mut input));
        assert_eq!(input.text(), "two");
        assert_eq!(cycler.history(), vec!["one", "two"]);
    }

    #[test]
    fn selection_leaves_value() {
        let (mut host, mut input, mut cycler) = setup("one");
        submit_value(&mut host, &mut input, "two");
        input.select(0, 3);
        assert!(!cycler.on_arrow_up(&mut input));
        input.select(3, 0);
        assert!(!cycler.on_arrow_down(&mut input));
        assert_eq!(input.text(), "two");
    }

    #[test]
    fn empty_text_rotates() {
        let (mut host, mut input, mut cycler) = setup("one");
        submit_value(&mut host, &mut input, "two");
        input.set_text("");
        assert!(cycler.on_arrow_down(&mut input));
        assert_eq!(input.text(), "one");
        assert_eq!(cycler.history(), vec!["two", "one"]);
    }

    #[test]
    fn up_then_down_restores_ring_and_value() {
        let (mut host, mut input, mut cycler) = setup("initial");
        submit_value(&mut host, &mut input, "first");
        submit_value(&mut host, &mut input, "second");
        let before = cycler.history();

        input.set_caret(0);
        assert!(cycler.on_arrow_up(&mut input));
        assert_eq!(input.cursor(), 0);
        assert_eq!(cycler.history(), vec!["second", "initial", "first"]);
        assert_eq!(input.text(), "second");
        let end = input.len();
        input.set_caret(end);
        assert!(cycler.on_arrow_down(&mut input));

        assert_eq!(cycler.history(), before);
        assert_eq!(input.text(), "second");
        assert_eq!(host.group().value("name").as_deref(), Some("second"));
    }

    #[test]
    fn disabled_direction_is_ignored() {
        let mut host = FormHost::new(FormGroup::new().with_control("name", "a"));
        let acc = ValueAccessor::resolve(&Binding::name("name"), host.group()).unwrap();
        let mut input = TextInput::single_line().with_accessor(acc);
        let options = HistoryOptions {
            move_to_start_on_up_arrow: false,
            ..HistoryOptions::default()
        };
        let mut cycler = HistoryCycler::attach(&input, &mut host, options).unwrap();
        submit_value(&mut host, &mut input, "b");

        input.set_caret(0);
        assert!(!cycler.on_arrow_up(&mut input));
        let end = input.len();
        input.set_caret(end);
        assert!(cycler.on_arrow_down(&mut input));
        assert_eq!(input.text(), "a");
    }

    #[test]
    fn modified_arrows_are_ignored() {
        let (mut host, mut input, mut cycler) = setup("one");
        submit_value(&mut host, &mut input, "two");
        input.set_caret(0);
        let mut ev = KeyDispatch::new(KeyEvent::new(KeyCode::Up, KeyModifiers::SHIFT));
        cycler.on_key(&mut ev, &mut input, &mut host);
        assert!(!ev.is_default_prevented());
        assert_eq!(input.text(), "two");
    }

    #[test]
    fn dropping_detaches_from_submissions() {
        let (mut host, mut input, cycler) = setup("x");
        drop(cycler);
        submit_value(&mut host, &mut input, "y");
        assert!(host.state().submitted());
    }

    #[test]
    fn detached_cyclers_leave_no_submit_steps() {
        let (mut host, mut input, cycler) = setup("x");
        assert_eq!(host.submit_step_count(), 1);
        let view = cycler.view();
        assert_eq!(view.entry_count(), Some(1));
        drop(cycler);
        assert_eq!(view.entry_count(), None);

        for _ in 0..1_000 {
            let again = HistoryCycler::attach(&input, &mut host, HistoryOptions::default()).unwrap();
            drop(again);
        }
        submit_value(&mut host, &mut input, "y");
        assert_eq!(host.submit_step_count(), 0);
        assert_eq!(host.state().pending_submissions(), 1);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: HistoryOptions =
            serde_json::from_str(r#"{ "move_to_end_on_down_arrow": false }"#).unwrap();
        assert!(opts.move_to_start_on_up_arrow);
        assert!(!opts.move_to_end_on_down_arrow);
        assert!(opts.save_unsubmitted_values);
    }
}
