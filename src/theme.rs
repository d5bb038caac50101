use ratatui::style::{Color, Modifier, Style};

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub(crate) const TITLE_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const WEEKDAY_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const GREEN_DAY_STYLE: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::Green)
    .add_modifier(Modifier::BOLD);

pub(crate) const RED_DAY_STYLE: Style = Style::new()
    .fg(Color::White)
    .bg(Color::Red)
    .add_modifier(Modifier::BOLD);

/// Today, before it has been marked
pub(crate) const CURRENT_DAY_STYLE: Style = Style::new()
    .fg(Color::White)
    .bg(Color::DarkGray)
    .add_modifier(Modifier::BOLD);

/// A day that can be marked but hasn't been
pub(crate) const OPEN_DAY_STYLE: Style = BASE_STYLE;

/// Before the install date or in the future
pub(crate) const CLOSED_DAY_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

pub(crate) const CURSOR_MODIFIER: Modifier = Modifier::REVERSED;

pub(crate) const STATUS_STYLE: Style = BASE_STYLE.fg(Color::Gray);

pub(crate) const WARNING_STYLE: Style = BASE_STYLE
    .fg(Color::LightYellow)
    .add_modifier(Modifier::BOLD);

pub(crate) mod score {
    use super::*;

    pub(crate) const NONE_STYLE: Style = BASE_STYLE.fg(Color::Gray).add_modifier(Modifier::BOLD);

    pub(crate) const HIGH_STYLE: Style = BASE_STYLE.fg(Color::Green).add_modifier(Modifier::BOLD);

    pub(crate) const MEDIUM_STYLE: Style = BASE_STYLE
        .fg(Color::Rgb(0xFF, 0xA5, 0x00))
        .add_modifier(Modifier::BOLD);

    pub(crate) const LOW_STYLE: Style = BASE_STYLE.fg(Color::Red).add_modifier(Modifier::BOLD);
}

pub(crate) mod jumpto {
    use super::*;

    pub(crate) const UNFILLED_CELL_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

    pub(crate) const READY_ENTER_STYLE: Style = BASE_STYLE.add_modifier(Modifier::UNDERLINED);
}
