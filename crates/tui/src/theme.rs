use ratatui::style::Color;

pub struct Theme {
    pub border_focus: Color,
    pub border_inactive: Color,
    pub title: Color,
    pub hint: Color,
    pub selection_fg: Color,
    pub selection_bg: Color,
    pub snackbar_fg: Color,
    pub snackbar_bg: Color,
}

pub const THEME: Theme = Theme {
    border_focus: Color::Cyan,
    border_inactive: Color::DarkGray,
    title: Color::Yellow,
    hint: Color::DarkGray,
    selection_fg: Color::Black,
    selection_bg: Color::Cyan,
    snackbar_fg: Color::Black,
    snackbar_bg: Color::Yellow,
};
