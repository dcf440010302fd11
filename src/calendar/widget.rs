use super::day::{DayCell, MonthEvent, PointerAction};
use super::month::{GridCell, MonthGrid};
use crate::theme::{
    day::{
        DEFAULT_RANGE_COLOR, DISABLED_STYLE, PASSIVE_STYLE, PREVIEW_STYLE, RANGE_EDGE_STYLE,
        RANGE_STYLE, SELECTED_STYLE, TODAY_STYLE, WEEKEND_STYLE,
    },
    BASE_STYLE, MONTH_NAME_STYLE, WEEKDAY_STYLE, WEEK_NUMBER_STYLE,
};
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::Style,
    text::{Span, Text},
    widgets::{Paragraph, StatefulWidget, Widget},
};
use std::iter::zip;
use time::Date;

/// Number of columns per cell
const DAY_WIDTH: u16 = 4;

/// Labels longer than this are cut short so that every cell keeps its width
const LABEL_WIDTH: usize = 2;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Month<'a> {
    grid: &'a MonthGrid,
}

impl<'a> Month<'a> {
    pub(crate) fn new(grid: &'a MonthGrid) -> Month<'a> {
        Month { grid }
    }

    pub(crate) fn width(&self) -> u16 {
        self.grid.columns() * DAY_WIDTH
    }

    pub(crate) fn height(&self) -> u16 {
        self.header_lines() + self.grid.rows()
    }

    fn header_lines(&self) -> u16 {
        u16::from(self.grid.month_name.is_some()) + u16::from(self.grid.weekdays.is_some())
    }
}

impl StatefulWidget for Month<'_> {
    type State = MonthState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut MonthState) {
        let mut canvas = BufferCanvas::new(area, buf);
        let mut y = 0;
        if let Some(name) = &self.grid.month_name {
            let width = u16::try_from(Span::raw(name.as_str()).width()).unwrap_or(u16::MAX);
            canvas.mvprint(
                y,
                self.width().saturating_sub(width) / 2,
                name,
                MONTH_NAME_STYLE,
            );
            y += 1;
        }
        if let Some(labels) = &self.grid.weekdays {
            for (col, label) in zip(0u16.., labels) {
                canvas.mvprint(
                    y,
                    col * DAY_WIDTH,
                    format!(" {:>2} ", clip(label)),
                    WEEKDAY_STYLE,
                );
            }
            y += 1;
        }
        state.days_area = Rect {
            x: area.x,
            y: area.y.saturating_add(y),
            width: self.width(),
            height: self.grid.rows(),
        }
        .intersection(area);
        state.hitboxes.clear();
        let columns = self.grid.columns();
        for (i, cell) in zip(0u16.., &self.grid.cells) {
            let row = y + i / columns;
            let col = (i % columns) * DAY_WIDTH;
            let span = cell_span(cell);
            canvas.mvprint(row, col, span.content, span.style);
            let hitbox = Rect {
                x: area.x.saturating_add(col),
                y: area.y.saturating_add(row),
                width: DAY_WIDTH,
                height: 1,
            }
            .intersection(area);
            state.hitboxes.push((hitbox, usize::from(i)));
        }
    }
}

/// Where the cells of a month were last drawn, and where the pointer was last
/// seen over them
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct MonthState {
    days_area: Rect,
    hitboxes: Vec<(Rect, usize)>,
    hovered: Option<usize>,
    pointer_inside: bool,
    /// Month whose cells `hovered` indexes
    hovered_month: Option<Date>,
}

impl MonthState {
    pub(crate) fn handle_mouse(&mut self, grid: &MonthGrid, event: MouseEvent) -> Vec<MonthEvent> {
        let pointer = Position::new(event.column, event.row);
        // A cell index from another month names a different day
        if self.hovered_month != Some(grid.month) {
            self.hovered = None;
            self.hovered_month = Some(grid.month);
        }
        if !self.days_area.contains(pointer) {
            self.hovered = None;
            return if std::mem::replace(&mut self.pointer_inside, false) {
                vec![MonthEvent::MouseLeave]
            } else {
                Vec::new()
            };
        }
        self.pointer_inside = true;
        let hit = self
            .hitboxes
            .iter()
            .find(|(area, _)| area.contains(pointer))
            .map(|&(_, i)| i);
        let entered = hit != self.hovered;
        self.hovered = hit;
        let mut events = Vec::new();
        let Some(cell) = hit.and_then(|i| grid.cells.get(i)) else {
            return events;
        };
        if entered {
            events.extend(cell.respond(PointerAction::Enter));
        }
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                events.extend(cell.respond(PointerAction::Press));
            }
            MouseEventKind::Up(MouseButton::Left) => {
                events.extend(cell.respond(PointerAction::Release));
            }
            _ => (),
        }
        events
    }
}

fn clip(label: &str) -> String {
    label.chars().take(LABEL_WIDTH).collect()
}

fn cell_span(cell: &GridCell) -> Span<'static> {
    match cell {
        GridCell::WeekNumber(n) => Span::styled(format!(" {n:>2} "), WEEK_NUMBER_STYLE),
        GridCell::Day(day) => {
            let label = clip(&day.label);
            let s = if day.flags.is_today {
                format!("[{label:>2}]")
            } else {
                format!(" {label:>2} ")
            };
            Span::styled(s, day_style(day))
        }
    }
}

fn day_style(day: &DayCell) -> Style {
    let mut style = BASE_STYLE;
    if day.flags.is_weekend {
        style = style.patch(WEEKEND_STYLE);
    }
    if day.flags.is_passive {
        style = style.patch(PASSIVE_STYLE);
    }
    for mark in &day.ranges {
        let range_style = if mark.position.is_edge() {
            RANGE_EDGE_STYLE
        } else {
            RANGE_STYLE
        };
        style = style.patch(range_style.bg(mark.color.unwrap_or(DEFAULT_RANGE_COLOR)));
    }
    if day.selected {
        style = style.patch(SELECTED_STYLE);
    }
    if day.preview.is_some() {
        style = style.patch(PREVIEW_STYLE);
    }
    if day.flags.disabled {
        style = style.patch(DISABLED_STYLE);
    }
    if day.flags.is_today {
        style = style.patch(TODAY_STYLE);
    }
    style
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self { area, buf }
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Style) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style);
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // A Paragraph truncates text running past the month's area, so long
            // as the Rect handed to it lies entirely within the buffer.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{MonthProps, MonthSettings, Selection};
    use crossterm::event::KeyModifiers;
    use time::macros::date;

    fn grid(settings: &MonthSettings) -> MonthGrid {
        grid_for(settings, date!(2025 - 01 - 01))
    }

    fn grid_for(settings: &MonthSettings, month: Date) -> MonthGrid {
        MonthGrid::build(&MonthProps {
            month,
            today: date!(2025 - 01 - 22),
            settings,
            disabled_day: &|d: Date| d == date!(2025 - 01 - 08),
            selection: &Selection::default(),
        })
        .unwrap()
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_render() {
        let grid = grid(&MonthSettings::default());
        let month = Month::new(&grid);
        assert_eq!(month.width(), 28);
        assert_eq!(month.height(), 7);
        let area = Rect::new(0, 0, 28, 7);
        let mut buffer = Buffer::empty(area);
        month.render(area, &mut buffer, &mut MonthState::default());
        let mut expected = Buffer::with_lines([
            "        January 2025        ",
            " Su  Mo  Tu  We  Th  Fr  Sa ",
            " 29  30  31   1   2   3   4 ",
            "  5   6   7   8   9  10  11 ",
            " 12  13  14  15  16  17  18 ",
            " 19  20  21 [22] 23  24  25 ",
            " 26  27  28  29  30  31   1 ",
        ]);
        expected.set_style(Rect::new(8, 0, 12, 1), MONTH_NAME_STYLE);
        expected.set_style(Rect::new(0, 1, 28, 1), WEEKDAY_STYLE);
        expected.set_style(Rect::new(0, 2, 28, 5), BASE_STYLE);
        expected.set_style(Rect::new(0, 2, 4, 5), WEEKEND_STYLE);
        expected.set_style(Rect::new(24, 2, 4, 5), WEEKEND_STYLE);
        expected.set_style(Rect::new(0, 2, 12, 1), PASSIVE_STYLE);
        expected.set_style(Rect::new(24, 6, 4, 1), PASSIVE_STYLE);
        expected.set_style(Rect::new(12, 3, 4, 1), DISABLED_STYLE);
        expected.set_style(Rect::new(12, 5, 4, 1), TODAY_STYLE);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn test_render_broadcast() {
        let settings = MonthSettings {
            broadcast_calendar: true,
            show_month_name: false,
            ..MonthSettings::default()
        };
        let grid = grid(&settings);
        let month = Month::new(&grid);
        assert_eq!(month.width(), 32);
        assert_eq!(month.height(), 5);
        let area = Rect::new(0, 0, 32, 5);
        let mut buffer = Buffer::empty(area);
        month.render(area, &mut buffer, &mut MonthState::default());
        let mut expected = Buffer::with_lines([
            "  #  Mo  Tu  We  Th  Fr  Sa  Su ",
            "  1  30  31   1   2   3   4   5 ",
            "  2   6   7   8   9  10  11  12 ",
            "  3  13  14  15  16  17  18  19 ",
            "  4  20  21 [22] 23  24  25  26 ",
        ]);
        expected.set_style(Rect::new(0, 0, 32, 1), WEEKDAY_STYLE);
        expected.set_style(Rect::new(0, 1, 4, 4), WEEK_NUMBER_STYLE);
        expected.set_style(Rect::new(4, 1, 28, 4), BASE_STYLE);
        expected.set_style(Rect::new(24, 1, 8, 4), WEEKEND_STYLE);
        expected.set_style(Rect::new(12, 2, 4, 1), DISABLED_STYLE);
        expected.set_style(Rect::new(12, 4, 4, 1), TODAY_STYLE);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn test_render_clipped() {
        let grid = grid(&MonthSettings::default());
        let area = Rect::new(0, 0, 10, 3);
        let mut buffer = Buffer::empty(area);
        let mut state = MonthState::default();
        Month::new(&grid).render(area, &mut buffer, &mut state);
        assert_eq!(state.days_area, Rect::new(0, 2, 10, 1));
        assert_eq!(buffer.cell((9, 2)).map(ratatui::buffer::Cell::symbol), Some("3"));
        assert_eq!(buffer.cell((2, 2)).map(ratatui::buffer::Cell::symbol), Some("9"));
    }

    #[test]
    fn test_mouse() {
        let grid = grid(&MonthSettings::default());
        let area = Rect::new(0, 0, 28, 7);
        let mut buffer = Buffer::empty(area);
        let mut state = MonthState::default();
        Month::new(&grid).render(area, &mut buffer, &mut state);
        assert_eq!(
            state.handle_mouse(&grid, mouse(MouseEventKind::Down(MouseButton::Left), 13, 5)),
            [
                MonthEvent::DragMove(date!(2025 - 01 - 22)),
                MonthEvent::PreviewChange(Some(date!(2025 - 01 - 22))),
                MonthEvent::DragStart(date!(2025 - 01 - 22)),
            ]
        );
        assert!(state
            .handle_mouse(&grid, mouse(MouseEventKind::Drag(MouseButton::Left), 14, 5))
            .is_empty());
        assert_eq!(
            state.handle_mouse(&grid, mouse(MouseEventKind::Drag(MouseButton::Left), 1, 6)),
            [
                MonthEvent::DragMove(date!(2025 - 01 - 26)),
                MonthEvent::PreviewChange(Some(date!(2025 - 01 - 26))),
            ]
        );
        assert_eq!(
            state.handle_mouse(&grid, mouse(MouseEventKind::Up(MouseButton::Left), 1, 6)),
            [MonthEvent::DragEnd(date!(2025 - 01 - 26))]
        );
        assert_eq!(
            state.handle_mouse(&grid, mouse(MouseEventKind::Moved, 1, 0)),
            [MonthEvent::MouseLeave]
        );
        assert!(state
            .handle_mouse(&grid, mouse(MouseEventKind::Moved, 2, 0))
            .is_empty());
    }

    #[test]
    fn test_hover_survives_only_within_month() {
        let january = grid(&MonthSettings::default());
        let area = Rect::new(0, 0, 28, 7);
        let mut buffer = Buffer::empty(area);
        let mut state = MonthState::default();
        Month::new(&january).render(area, &mut buffer, &mut state);
        assert_eq!(
            state.handle_mouse(&january, mouse(MouseEventKind::Moved, 13, 5)),
            [
                MonthEvent::DragMove(date!(2025 - 01 - 22)),
                MonthEvent::PreviewChange(Some(date!(2025 - 01 - 22))),
            ]
        );
        let february = grid_for(&MonthSettings::default(), date!(2025 - 02 - 01));
        Month::new(&february).render(area, &mut buffer, &mut state);
        assert_eq!(
            state.handle_mouse(&february, mouse(MouseEventKind::Moved, 14, 5)),
            [
                MonthEvent::DragMove(date!(2025 - 02 - 19)),
                MonthEvent::PreviewChange(Some(date!(2025 - 02 - 19))),
            ]
        );
        assert!(state
            .handle_mouse(&february, mouse(MouseEventKind::Moved, 15, 5))
            .is_empty());
    }

    #[test]
    fn test_mouse_disabled_day() {
        let grid = grid(&MonthSettings::default());
        let area = Rect::new(5, 5, 28, 7);
        let mut buffer = Buffer::empty(Rect::new(0, 0, 40, 15));
        let mut state = MonthState::default();
        Month::new(&grid).render(area, &mut buffer, &mut state);
        // January 8th, the fourth cell of the second week
        assert_eq!(
            state.handle_mouse(&grid, mouse(MouseEventKind::Down(MouseButton::Left), 17, 8)),
            [MonthEvent::PreviewChange(None), MonthEvent::PreviewChange(None)]
        );
        assert_eq!(
            state.handle_mouse(&grid, mouse(MouseEventKind::Moved, 21, 8)),
            [
                MonthEvent::DragMove(date!(2025 - 01 - 09)),
                MonthEvent::PreviewChange(Some(date!(2025 - 01 - 09))),
            ]
        );
    }
}
