// Centralized UI strings and labels. ASCII-friendly by default.

use unicode_width::UnicodeWidthStr;

pub const TITLE_FORM: &str = " arrow-state demo ";
pub const LABEL_NAME: &str = " Name ";
pub const LABEL_DESCRIPTION: &str = " Description ";

pub const HINT_NAME: &str = "Type a name";
pub const HINT_DESCRIPTION: &str = "Type a description, Enter for newline";

// Fixed confirmation shown after every submission
pub const SUBMITTED: &str = "form submitted and reset ";
pub const SUBMITTED_MS: u64 = 3000;

// Build the status line with width-aware compaction.
// - focus: label of the focused field
// - history: (field label, entries) for every field with a history cycler
// - pristine/touched: form flags
// - max_width: available width for the status text
pub fn build_status_line(
    focus: &str,
    history: &[(String, usize)],
    pristine: bool,
    touched: bool,
    max_width: u16,
) -> String {
    let mut segments: Vec<String> = Vec::new();
    segments.push(format!("[{}]", focus.trim()));
    for (label, n) in history {
        segments.push(format!("{}:{}", label.trim(), n));
    }
    segments.push(
        match (pristine, touched) {
            (true, false) => "pristine",
            (true, true) => "pristine/touched",
            (false, false) => "dirty",
            (false, true) => "dirty/touched",
        }
        .to_string(),
    );
    // Hints ordered by importance; appended while space allows.
    let hints: [&str; 4] = [
        "Ctrl+Enter: submit",
        "Up/Down at text edge: history",
        "Tab: next field",
        "Esc/Ctrl-C: quit",
    ];
    for h in hints {
        segments.push(h.to_string());
    }

    let sep = "  |  ";
    let mut out = String::new();
    let mut used = 0usize;
    for (i, seg) in segments.iter().enumerate() {
        let segw = UnicodeWidthStr::width(seg.as_str());
        let addw = segw
            + if i == 0 {
                0
            } else {
                UnicodeWidthStr::width(sep)
            };
        if used + addw > max_width as usize {
            break;
        }
        if i > 0 {
            out.push_str(sep);
            used += UnicodeWidthStr::width(sep);
        }
        out.push_str(seg);
        used += segw;
    }
    out
}
