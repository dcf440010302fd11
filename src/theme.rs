use ratatui::style::{Color, Modifier, Style};

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub(crate) const MONTH_NAME_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const WEEKDAY_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const WEEK_NUMBER_STYLE: Style = BASE_STYLE.fg(Color::Cyan);

pub(crate) const STATUS_STYLE: Style = BASE_STYLE.fg(Color::Gray);

pub(crate) mod day {
    use super::*;

    pub(crate) const WEEKEND_STYLE: Style = Style::new().fg(Color::LightRed);

    pub(crate) const PASSIVE_STYLE: Style = Style::new().fg(Color::DarkGray);

    pub(crate) const DISABLED_STYLE: Style = Style::new()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::CROSSED_OUT);

    pub(crate) const TODAY_STYLE: Style = Style::new().add_modifier(Modifier::BOLD);

    pub(crate) const DEFAULT_RANGE_COLOR: Color = Color::Blue;

    /// Combined with the range's color as background
    pub(crate) const RANGE_STYLE: Style = Style::new().fg(Color::White);

    pub(crate) const RANGE_EDGE_STYLE: Style = RANGE_STYLE.add_modifier(Modifier::BOLD);

    pub(crate) const PREVIEW_STYLE: Style = Style::new().add_modifier(Modifier::UNDERLINED);

    pub(crate) const SELECTED_STYLE: Style = Style::new()
        .fg(Color::Black)
        .bg(Color::LightBlue)
        .add_modifier(Modifier::BOLD);
}

pub(crate) mod jumpto {
    use super::*;

    pub(crate) const UNFILLED_CELL_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

    pub(crate) const READY_ENTER_STYLE: Style = BASE_STYLE.add_modifier(Modifier::UNDERLINED);
}

pub(crate) mod help {
    use super::*;

    pub(crate) const HEADING_STYLE: Style = Style::new().add_modifier(Modifier::BOLD);
}
