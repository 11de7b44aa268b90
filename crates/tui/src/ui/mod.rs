use arrow_state::{FieldId, TextInput};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::strings::{build_status_line, HINT_DESCRIPTION, HINT_NAME, TITLE_FORM};
use crate::theme::THEME;

pub fn draw(f: &mut Frame, app: &mut App) {
    let outer = Block::default()
        .title(Span::styled(
            TITLE_FORM,
            Style::default()
                .fg(THEME.title)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(THEME.border_inactive));
    let inner = outer.inner(f.area());
    f.render_widget(outer, f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    app.field_areas.clear();
    for (id, area) in [(app.name, chunks[0]), (app.description, chunks[1])] {
        app.field_areas.push((id, area));
        draw_field(f, area, app, id);
    }
    draw_status(f, chunks[2], app);
    draw_snackbar(f, chunks[3], app);
}

fn draw_field(f: &mut Frame, area: Rect, app: &App, id: FieldId) {
    let Some(field) = app.form.field(id) else {
        return;
    };
    let focused = app.form.focus() == id;
    let border_style = if focused {
        Style::default().fg(THEME.border_focus)
    } else {
        Style::default().fg(THEME.border_inactive)
    };
    let block = Block::default()
        .title(field.label().to_string())
        .borders(Borders::ALL)
        .border_style(border_style);

    let input = field.input();
    let inner_width = area.width.saturating_sub(2);
    let visible_lines = area.height.saturating_sub(2).max(1);
    let graphemes: Vec<&str> = input.text().graphemes(true).collect();
    let upto = input.cursor().min(graphemes.len());
    let (line_idx, col_width) = measure_prefix_line_col(&graphemes, upto, inner_width);
    let offset_y = line_idx.saturating_sub(visible_lines - 1);

    let para = if input.is_empty() {
        let hint = if input.is_multiline() {
            HINT_DESCRIPTION
        } else {
            HINT_NAME
        };
        Paragraph::new(Line::from(Span::styled(
            hint,
            Style::default().fg(THEME.hint),
        )))
        .block(block)
    } else {
        Paragraph::new(styled_lines(input, inner_width))
            .block(block)
            .scroll((offset_y, 0))
    };
    f.render_widget(para, area);

    if focused {
        let cursor_x = area.x + 1 + col_width;
        let cursor_y = area.y + 1 + line_idx.saturating_sub(offset_y);
        f.set_cursor_position(Position::new(cursor_x, cursor_y));
    }
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let focus = app
        .form
        .field(app.form.focus())
        .map(|fld| fld.label())
        .unwrap_or_default();
    let history: Vec<(String, usize)> = app
        .form
        .fields()
        .iter()
        .filter_map(|fld| fld.history_len().map(|n| (fld.label().to_string(), n)))
        .collect();
    let group = app.form.group();
    let line = build_status_line(
        focus,
        &history,
        group.is_pristine(),
        group.is_touched(),
        area.width,
    );
    let para = Paragraph::new(Span::styled(line, Style::default().fg(THEME.hint)));
    f.render_widget(para, area);
}

fn draw_snackbar(f: &mut Frame, area: Rect, app: &App) {
    let Some(snackbar) = &app.snackbar else {
        return;
    };
    let style = Style::default()
        .fg(THEME.snackbar_fg)
        .bg(THEME.snackbar_bg)
        .add_modifier(Modifier::BOLD);
    let para = Paragraph::new(Span::styled(format!(" {} ", snackbar.message), style))
        .alignment(Alignment::Center);
    f.render_widget(para, area);
}

// Selected graphemes are drawn inverted. Newlines split lines and rows wrap at
// grapheme boundaries, the same way `measure_prefix_line_col` counts them.
fn styled_lines(input: &TextInput, width: u16) -> Vec<Line<'static>> {
    let selection = input.selection();
    let selected = Style::default()
        .fg(THEME.selection_fg)
        .bg(THEME.selection_bg);
    let mut lines = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_selected = false;
    let mut col = 0usize;
    for (i, g) in input.text().graphemes(true).enumerate() {
        if g == "\n" {
            flush_run(&mut spans, &mut run, run_selected, selected);
            lines.push(Line::from(std::mem::take(&mut spans)));
            col = 0;
            continue;
        }
        let w = UnicodeWidthStr::width(g);
        if width > 0 && col > 0 && col + w > width as usize {
            flush_run(&mut spans, &mut run, run_selected, selected);
            lines.push(Line::from(std::mem::take(&mut spans)));
            col = 0;
        }
        col += w;
        let in_selection = selection.is_some_and(|(s, e)| i >= s && i < e);
        if in_selection != run_selected {
            flush_run(&mut spans, &mut run, run_selected, selected);
            run_selected = in_selection;
        }
        run.push_str(g);
    }
    flush_run(&mut spans, &mut run, run_selected, selected);
    lines.push(Line::from(spans));
    lines
}

fn flush_run(spans: &mut Vec<Span<'static>>, run: &mut String, is_selected: bool, style: Style) {
    if run.is_empty() {
        return;
    }
    let text = std::mem::take(run);
    spans.push(if is_selected {
        Span::styled(text, style)
    } else {
        Span::raw(text)
    });
}

fn measure_prefix_line_col(graphemes: &[&str], upto: usize, width: u16) -> (u16, u16) {
    if width == 0 {
        return (0, 0);
    }
    let mut line = 0usize;
    let mut col = 0usize;
    for g in graphemes.iter().take(upto) {
        if *g == "\n" {
            line += 1;
            col = 0;
            continue;
        }
        let w = UnicodeWidthStr::width(*g);
        if col > 0 && col + w > width as usize {
            line += 1;
            col = 0;
        }
        col += w;
    }
    // a caret after a full row sits at the start of the next one
    if col >= width as usize {
        line += 1;
        col = 0;
    }
    (line as u16, col as u16)
}
