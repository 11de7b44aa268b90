use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::accessor::ValueAccessor;

/// When edits made in an input are written back to its control.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOn {
    #[default]
    Change,
    Blur,
}

/// Caret and selection introspection over the text the user currently sees,
/// which may differ from the bound control's value while an edit is uncommitted.
pub trait TextCursor {
    fn visible_text(&self) -> &str;

    /// Selection bounds in graphemes with `start <= end`; equal when nothing is selected.
    fn selection_range(&self) -> (usize, usize);

    fn text_len(&self) -> usize {
        self.visible_text().graphemes(true).count()
    }
}

/// A single- or multi-line text entry element.
///
/// Offsets (caret, selection anchor) count graphemes, not bytes.
#[derive(Clone, Debug)]
pub struct TextInput {
    text: String,
    cursor: usize,
    anchor: Option<usize>,
    multiline: bool,
    update_on: UpdateOn,
    accessor: Option<ValueAccessor>,
    seen_revision: u64,
}

impl TextInput {
    pub fn new(multiline: bool) -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            anchor: None,
            multiline,
            update_on: UpdateOn::Change,
            accessor: None,
            seen_revision: 0,
        }
    }

    pub fn single_line() -> Self {
        Self::new(false)
    }

    pub fn multi_line() -> Self {
        Self::new(true)
    }

    /// Binds the input and takes over the control's current value.
    pub fn with_accessor(mut self, accessor: Option<ValueAccessor>) -> Self {
        self.accessor = accessor;
        if let Some(acc) = &self.accessor {
            self.text = acc.value();
            self.cursor = self.len();
            self.anchor = None;
            self.seen_revision = acc.revision();
        }
        self
    }

    pub fn with_update_on(mut self, update_on: UpdateOn) -> Self {
        self.update_on = update_on;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.text.graphemes(true).count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    pub fn update_on(&self) -> UpdateOn {
        self.update_on
    }

    pub fn accessor(&self) -> Option<&ValueAccessor> {
        self.accessor.as_ref()
    }

    /// Non-empty selection as `(start, end)`.
    pub fn selection(&self) -> Option<(usize, usize)> {
        let (start, end) = self.selection_range();
        (start != end).then_some((start, end))
    }

    pub fn has_selection(&self) -> bool {
        self.selection().is_some()
    }

    pub fn set_caret(&mut self, pos: usize) {
        self.cursor = pos.min(self.len());
        self.anchor = None;
    }

    pub fn select(&mut self, anchor: usize, cursor: usize) {
        let len = self.len();
        self.anchor = Some(anchor.min(len));
        self.cursor = cursor.min(len);
    }

    pub fn select_all(&mut self) {
        self.select(0, self.len());
    }

    /// Replaces the visible text without touching the control; the caret moves to the end.
    pub fn set_text<S: Into<String>>(&mut self, text: S) {
        self.text = text.into();
        if !self.multiline {
            self.text = strip_newlines(&self.text);
        }
        self.cursor = self.len();
        self.anchor = None;
    }

    /// Pulls the control's value into the visible text if it was written since the last sync.
    pub fn sync_from_control(&mut self) -> bool {
        let Some(acc) = &self.accessor else {
            return false;
        };
        let revision = acc.revision();
        if revision == self.seen_revision {
            return false;
        }
        let value = acc.value();
        self.seen_revision = revision;
        self.set_text(value);
        true
    }

    /// Writes the visible text to the control.
    pub fn commit(&mut self) {
        if let Some(acc) = &self.accessor {
            self.seen_revision = acc.control().borrow_mut().commit_from_view(&self.text);
        }
    }

    pub fn blur(&mut self) {
        if self.update_on == UpdateOn::Blur {
            self.commit();
        }
        if let Some(acc) = &self.accessor {
            acc.control().borrow_mut().mark_as_touched();
        }
        self.anchor = None;
    }

    /// Applies the key's default editing action. Returns whether the key was consumed.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return false;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let before = self.text.clone();

        match key.code {
            KeyCode::Char('a') if ctrl => self.move_cursor_line_start(false),
            KeyCode::Char('e') if ctrl => self.move_cursor_line_end(false),
            KeyCode::Char('w') if ctrl => self.delete_prev_word(),
            KeyCode::Char('u') if ctrl => self.kill_to_line_start(),
            KeyCode::Char('k') if ctrl => self.kill_to_line_end(),
            KeyCode::Char(_) if ctrl || alt => return false,
            KeyCode::Char(ch) => {
                let mut buf = [0u8; 4];
                self.insert_text(ch.encode_utf8(&mut buf));
            }
            KeyCode::Enter if self.multiline && !ctrl && !alt => self.insert_text("\n"),
            KeyCode::Backspace => self.delete_left_grapheme(),
            KeyCode::Delete => self.delete_right_grapheme(),
            KeyCode::Left if ctrl => self.move_cursor_word_left(shift),
            KeyCode::Right if ctrl => self.move_cursor_word_right(shift),
            KeyCode::Left => self.move_left(shift),
            KeyCode::Right => self.move_right(shift),
            KeyCode::Up => self.move_up(shift),
            KeyCode::Down => self.move_down(shift),
            KeyCode::Home => self.move_cursor_line_start(shift),
            KeyCode::End => self.move_cursor_line_end(shift),
            _ => return false,
        }

        if self.update_on == UpdateOn::Change && self.text != before {
            self.commit();
        }
        true
    }

    /// Inserts pasted text and commits it like a typed edit.
    pub fn paste(&mut self, s: &str) {
        self.insert_text(s);
        if self.update_on == UpdateOn::Change {
            self.commit();
        }
    }

    pub fn insert_text(&mut self, s: &str) {
        let cleaned;
        let s = if self.multiline {
            s
        } else {
            cleaned = strip_newlines(s);
            cleaned.as_str()
        };
        self.delete_selection();
        let idx = self.cursor.min(self.len());
        let at = self.byte_offset(idx);
        self.text.insert_str(at, s);
        let added = s.graphemes(true).count();
        self.cursor = (idx + added).min(self.len());
    }

    pub fn delete_left_grapheme(&mut self) {
        if self.delete_selection() || self.cursor == 0 {
            return;
        }
        let idx = self.cursor;
        self.replace_range(idx - 1, idx, "");
        self.cursor = idx - 1;
    }

    pub fn delete_right_grapheme(&mut self) {
        if self.delete_selection() {
            return;
        }
        let idx = self.cursor.min(self.len());
        if idx < self.len() {
            self.replace_range(idx, idx + 1, "");
        }
    }

    pub fn move_left(&mut self, extend: bool) {
        if !extend {
            if let Some((start, _)) = self.selection() {
                self.set_caret(start);
                return;
            }
        }
        self.begin_move(extend);
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self, extend: bool) {
        if !extend {
            if let Some((_, end)) = self.selection() {
                self.set_caret(end);
                return;
            }
        }
        self.begin_move(extend);
        self.cursor = (self.cursor + 1).min(self.len());
    }

    /// On the first line the caret goes to the start of the text, otherwise one line up.
    pub fn move_up(&mut self, extend: bool) {
        self.begin_move(extend);
        let parts: Vec<&str> = self.text.graphemes(true).collect();
        let cur = self.cursor.min(parts.len());
        let line_start = line_start_of(&parts, cur);
        if line_start == 0 {
            self.cursor = 0;
            return;
        }
        let col = cur - line_start;
        let prev_end = line_start - 1;
        let prev_start = line_start_of(&parts, prev_end);
        self.cursor = prev_start + col.min(prev_end - prev_start);
    }

    /// On the last line the caret goes to the end of the text, otherwise one line down.
    pub fn move_down(&mut self, extend: bool) {
        self.begin_move(extend);
        let parts: Vec<&str> = self.text.graphemes(true).collect();
        let cur = self.cursor.min(parts.len());
        let line_end = line_end_of(&parts, cur);
        if line_end == parts.len() {
            self.cursor = parts.len();
            return;
        }
        let col = cur - line_start_of(&parts, cur);
        let next_start = line_end + 1;
        let next_end = line_end_of(&parts, next_start);
        self.cursor = next_start + col.min(next_end - next_start);
    }

    pub fn move_cursor_line_start(&mut self, extend: bool) {
        self.begin_move(extend);
        let parts: Vec<&str> = self.text.graphemes(true).collect();
        self.cursor = line_start_of(&parts, self.cursor.min(parts.len()));
    }

    pub fn move_cursor_line_end(&mut self, extend: bool) {
        self.begin_move(extend);
        let parts: Vec<&str> = self.text.graphemes(true).collect();
        self.cursor = line_end_of(&parts, self.cursor.min(parts.len()));
    }

    pub fn move_cursor_word_left(&mut self, extend: bool) {
        self.begin_move(extend);
        let parts: Vec<&str> = self.text.graphemes(true).collect();
        let mut i = self.cursor.min(parts.len());
        while i > 0 && parts[i - 1].trim().is_empty() {
            i -= 1;
        }
        while i > 0 && !parts[i - 1].trim().is_empty() {
            i -= 1;
        }
        self.cursor = i;
    }

    pub fn move_cursor_word_right(&mut self, extend: bool) {
        self.begin_move(extend);
        let parts: Vec<&str> = self.text.graphemes(true).collect();
        let mut i = self.cursor.min(parts.len());
        while i < parts.len() && parts[i].trim().is_empty() {
            i += 1;
        }
        while i < parts.len() && !parts[i].trim().is_empty() {
            i += 1;
        }
        self.cursor = i;
    }

    pub fn delete_prev_word(&mut self) {
        if self.delete_selection() || self.cursor == 0 {
            return;
        }
        let end = self.cursor;
        self.move_cursor_word_left(false);
        let start = self.cursor;
        self.replace_range(start, end, "");
    }

    pub fn kill_to_line_start(&mut self) {
        if self.delete_selection() {
            return;
        }
        let end = self.cursor;
        self.move_cursor_line_start(false);
        let start = self.cursor;
        self.replace_range(start, end, "");
    }

    pub fn kill_to_line_end(&mut self) {
        if self.delete_selection() {
            return;
        }
        let start = self.cursor;
        let parts: Vec<&str> = self.text.graphemes(true).collect();
        let end = line_end_of(&parts, start.min(parts.len()));
        self.replace_range(start, end, "");
    }

    fn delete_selection(&mut self) -> bool {
        let Some((start, end)) = self.selection() else {
            self.anchor = None;
            return false;
        };
        self.replace_range(start, end, "");
        self.set_caret(start);
        true
    }

    fn begin_move(&mut self, extend: bool) {
        if extend {
            if self.anchor.is_none() {
                self.anchor = Some(self.cursor);
            }
        } else {
            self.anchor = None;
        }
    }

    fn byte_offset(&self, idx: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .nth(idx)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    fn replace_range(&mut self, start: usize, end: usize, with: &str) {
        let (b0, b1) = (self.byte_offset(start), self.byte_offset(end));
        self.text.replace_range(b0..b1, with);
    }
}

impl TextCursor for TextInput {
    fn visible_text(&self) -> &str {
        &self.text
    }

    fn selection_range(&self) -> (usize, usize) {
        match self.anchor {
            Some(a) => (a.min(self.cursor), a.max(self.cursor)),
            None => (self.cursor, self.cursor),
        }
    }
}

fn line_start_of(parts: &[&str], from: usize) -> usize {
    let mut i = from;
    while i > 0 && parts[i - 1] != "\n" {
        i -= 1;
    }
    i
}

fn line_end_of(parts: &[&str], from: usize) -> usize {
    let mut i = from;
    while i < parts.len() && parts[i] != "\n" {
        i += 1;
    }
    i
}

fn strip_newlines(s: &str) -> String {
    s.chars().filter(|c| *c != '\n' && *c != '\r').collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{accessor::Binding, form::FormGroup};

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn typed(input: &mut TextInput, s: &str) {
        for ch in s.chars() {
            input.handle_key(&key(KeyCode::Char(ch), KeyModifiers::NONE));
        }
    }

    fn bound(multiline: bool, value: &str) -> (FormGroup, TextInput) {
        let group = FormGroup::new().with_control("field", value);
        let acc = ValueAccessor::resolve(&Binding::name("field"), &group).unwrap();
        let input = TextInput::new(multiline).with_accessor(acc);
        (group, input)
    }

    #[test]
    fn typing_commits_to_control_on_change() {
        let (group, mut input) = bound(false, "");
        typed(&mut input, "héllo");
        assert_eq!(input.text(), "héllo");
        assert_eq!(input.cursor(), 5);
        assert_eq!(group.value("field").as_deref(), Some("héllo"));
        assert!(!group.is_pristine());
    }

    #[test]
    fn blur_strategy_defers_commit() {
        let (group, input) = bound(false, "seed");
        let mut input = input.with_update_on(UpdateOn::Blur);
        typed(&mut input, "!");
        assert_eq!(input.text(), "seed!");
        assert_eq!(group.value("field").as_deref(), Some("seed"));

        input.blur();
        assert_eq!(group.value("field").as_deref(), Some("seed!"));
        assert!(group.is_touched());
    }

    #[test]
    fn model_writes_resync_visible_text() {
        let (group, mut input) = bound(false, "a");
        group.get("field").unwrap().borrow_mut().set_value("from model");
        assert!(input.sync_from_control());
        assert_eq!(input.text(), "from model");
        assert_eq!(input.cursor(), input.len());
        assert!(!input.sync_from_control());
    }

    #[test]
    fn own_commits_do_not_resync() {
        let (_group, mut input) = bound(false, "");
        typed(&mut input, "ab");
        input.set_caret(1);
        assert!(!input.sync_from_control());
        assert_eq!(input.cursor(), 1);
    }

    #[test]
    fn insert_replaces_selection() {
        let mut input = TextInput::single_line();
        input.set_text("hello world");
        input.select(0, 5);
        input.insert_text("bye");
        assert_eq!(input.text(), "bye world");
        assert_eq!(input.cursor(), 3);
        assert!(!input.has_selection());
    }

    #[test]
    fn single_line_drops_newlines() {
        let mut input = TextInput::single_line();
        input.insert_text("a\r\nb");
        assert_eq!(input.text(), "ab");
        assert!(!input.handle_key(&key(KeyCode::Enter, KeyModifiers::NONE)));
    }

    #[test]
    fn paste_commits_and_keeps_newlines_in_multi_line() {
        let (group, mut input) = bound(true, "");
        input.paste("line one\nline two");
        assert_eq!(input.text(), "line one\nline two");
        assert_eq!(group.value("field").as_deref(), Some("line one\nline two"));
    }

    #[test]
    fn multi_line_enter_inserts_newline() {
        let mut input = TextInput::multi_line();
        typed(&mut input, "a");
        assert!(input.handle_key(&key(KeyCode::Enter, KeyModifiers::NONE)));
        assert_eq!(input.text(), "a\n");
        assert!(!input.handle_key(&key(KeyCode::Enter, KeyModifiers::CONTROL)));
        assert_eq!(input.text(), "a\n");
    }

    #[test]
    fn shift_arrows_extend_selection() {
        let mut input = TextInput::single_line();
        input.set_text("abcd");
        input.set_caret(1);
        input.handle_key(&key(KeyCode::Right, KeyModifiers::SHIFT));
        input.handle_key(&key(KeyCode::Right, KeyModifiers::SHIFT));
        assert_eq!(input.selection(), Some((1, 3)));
        input.handle_key(&key(KeyCode::Left, KeyModifiers::NONE));
        assert_eq!(input.selection(), None);
        assert_eq!(input.cursor(), 1);
    }

    #[test]
    fn backspace_removes_selection_or_grapheme() {
        let mut input = TextInput::single_line();
        input.set_text("abcd");
        input.select(1, 3);
        input.handle_key(&key(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(input.text(), "ad");
        input.handle_key(&key(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(input.text(), "d");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn up_and_down_walk_lines_then_stop_at_edges() {
        let mut input = TextInput::multi_line();
        input.set_text("abc\nde\nfghi");
        input.set_caret(10);
        input.move_up(false);
        // column 3 clamps to the end of "de"
        assert_eq!(input.cursor(), 6);
        input.move_up(false);
        assert_eq!(input.cursor(), 2);
        input.move_up(false);
        assert_eq!(input.cursor(), 0);

        input.move_down(false);
        assert_eq!(input.cursor(), 4);
        input.move_down(false);
        assert_eq!(input.cursor(), 7);
        input.move_down(false);
        assert_eq!(input.cursor(), 11);
    }

    #[test]
    fn single_line_up_down_jump_to_edges() {
        let mut input = TextInput::single_line();
        input.set_text("abc");
        input.set_caret(1);
        input.handle_key(&key(KeyCode::Up, KeyModifiers::NONE));
        assert_eq!(input.cursor(), 0);
        input.handle_key(&key(KeyCode::Down, KeyModifiers::NONE));
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn word_and_line_kills() {
        let mut input = TextInput::single_line();
        input.set_text("one two three");
        input.delete_prev_word();
        assert_eq!(input.text(), "one two ");
        input.set_caret(4);
        input.kill_to_line_end();
        assert_eq!(input.text(), "one ");
        input.kill_to_line_start();
        assert_eq!(input.text(), "");
    }

    #[test]
    fn selection_range_is_ordered() {
        let mut input = TextInput::single_line();
        input.set_text("abcdef");
        input.select(4, 1);
        assert_eq!(input.selection_range(), (1, 4));
        assert_eq!(input.text_len(), 6);
    }
}
