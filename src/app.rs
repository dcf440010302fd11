use crate::calendar::{
    DayFilter, DisplayMode, Month, MonthError, MonthEvent, MonthGrid, MonthState,
};
use crate::help::Help;
use crate::jumpto::{JumpTo, JumpToInput, JumpToOutput, JumpToState};
use crate::picker::Picker;
use crate::theme::{BASE_STYLE, STATUS_STYLE};
use crossterm::event::{
    read, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::Rect,
    text::Line,
    widgets::{StatefulWidget, Widget},
    Terminal,
};
use std::io::{self, Write};
use std::iter::zip;
use thiserror::Error;

/// Columns of blank space between two months
const MONTH_GAP: u16 = 3;

#[derive(Debug)]
pub(crate) struct App<F> {
    picker: Picker<F>,
    month_count: usize,
    grids: Vec<MonthGrid>,
    months: Vec<MonthState>,
    state: AppState,
}

impl<F: DayFilter> App<F> {
    pub(crate) fn new(picker: Picker<F>, month_count: usize) -> Result<App<F>, MonthError> {
        let mut app = App {
            picker,
            month_count,
            grids: Vec::new(),
            months: Vec::new(),
            state: AppState::Picking,
        };
        app.refresh()?;
        Ok(app)
    }

    /// Runs until the user quits or accepts.  On acceptance, returns the
    /// selection as printable lines.
    pub(crate) fn run<B: Backend>(
        mut self,
        mut terminal: Terminal<B>,
    ) -> Result<Option<Vec<String>>, AppError>
    where
        io::Error: From<B::Error>,
    {
        while !self.done() {
            self.refresh()?;
            self.draw(&mut terminal)?;
            self.handle_input()?;
        }
        Ok((self.state == AppState::Accepted).then(|| self.picker.describe()))
    }

    fn refresh(&mut self) -> Result<(), MonthError> {
        self.grids = (0..self.month_count)
            .map(|i| MonthGrid::build(&self.picker.month_props(i)?))
            .collect::<Result<_, _>>()?;
        self.months.resize_with(self.month_count, MonthState::default);
        Ok(())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()>
    where
        io::Error: From<B::Error>,
    {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        let event = read()?;
        if let Event::Mouse(mouse) = event {
            self.handle_mouse(mouse);
        } else if let Some(KeyEvent {
            code, modifiers, ..
        }) = event.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match &mut self.state {
            AppState::Picking => match key {
                KeyCode::Char('h') | KeyCode::Left | KeyCode::PageUp => {
                    self.picker.one_month_backwards().is_ok()
                }
                KeyCode::Char('l') | KeyCode::Right | KeyCode::PageDown => {
                    self.picker.one_month_forwards().is_ok()
                }
                KeyCode::Char('0') | KeyCode::Home => self.picker.jump_to_today().is_ok(),
                KeyCode::Char('g') => {
                    self.state = AppState::Jumping(JumpToState::new());
                    true
                }
                KeyCode::Tab => self.picker.focus_next_range(),
                KeyCode::Enter => {
                    tracing::debug!(selection = ?self.picker.describe(), "accepted");
                    self.state = AppState::Accepted;
                    true
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.state = AppState::Quitting;
                    true
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                _ => false,
            },
            AppState::Helping => {
                self.state = AppState::Picking;
                true
            }
            AppState::Jumping(state) => {
                if matches!(key, KeyCode::Char('q' | 'g') | KeyCode::Esc) {
                    self.state = AppState::Picking;
                    true
                } else {
                    let output = match key {
                        KeyCode::Char('-') => state.handle_input(JumpToInput::Negative),
                        KeyCode::Char('+') => state.handle_input(JumpToInput::Positive),
                        KeyCode::Char(c) => {
                            match c.to_digit(10).and_then(|d| u8::try_from(d).ok()) {
                                Some(d) => state.handle_input(JumpToInput::Digit(d)),
                                None => JumpToOutput::Invalid,
                            }
                        }
                        KeyCode::Backspace | KeyCode::Delete => {
                            state.handle_input(JumpToInput::Backspace)
                        }
                        KeyCode::Enter => state.handle_input(JumpToInput::Enter),
                        _ => JumpToOutput::Invalid,
                    };
                    match output {
                        JumpToOutput::Ok => true,
                        JumpToOutput::Invalid => false,
                        JumpToOutput::Jump(date) => {
                            self.state = AppState::Picking;
                            self.picker.jump_to(date).is_ok()
                        }
                    }
                }
            }
            AppState::Accepted | AppState::Quitting => false,
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.state != AppState::Picking {
            return;
        }
        let mut events = Vec::new();
        for (state, grid) in zip(&mut self.months, &self.grids) {
            events.extend(state.handle_mouse(grid, mouse));
        }
        // When the pointer crosses from one month to another, the month it
        // left must not clear the preview set by the month it entered.
        events.sort_by_key(|ev| !matches!(ev, MonthEvent::MouseLeave));
        let drag_ended = events.iter().any(|ev| matches!(ev, MonthEvent::DragEnd(_)));
        for ev in events {
            tracing::trace!(?ev, "month event");
            self.picker.handle(ev);
        }
        if mouse.kind == MouseEventKind::Up(MouseButton::Left) && !drag_ended {
            self.picker.cancel_drag();
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn done(&self) -> bool {
        matches!(self.state, AppState::Accepted | AppState::Quitting)
    }

    fn status_line(&self) -> String {
        let lines = self.picker.describe();
        match self.picker.display_mode() {
            DisplayMode::Date => format!("date {}", lines.join(" ")),
            DisplayMode::DateRange => {
                let focused = self.picker.selection().focused_range;
                zip(0usize.., lines)
                    .map(|(i, ln)| if i == focused { format!("[{ln}]") } else { ln })
                    .collect::<Vec<_>>()
                    .join("   ")
            }
        }
    }
}

impl<F: DayFilter> Widget for &mut App<F> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let widths = self
            .grids
            .iter()
            .map(|g| Month::new(g).width())
            .collect::<Vec<_>>();
        let gaps = u16::try_from(widths.len().saturating_sub(1))
            .unwrap_or(u16::MAX)
            .saturating_mul(MONTH_GAP);
        let total = widths
            .iter()
            .fold(gaps, |acc, &w| acc.saturating_add(w));
        let mut x = area.x.saturating_add(area.width.saturating_sub(total) / 2);
        let y = area.y.saturating_add(1);
        for (grid, state) in zip(&self.grids, &mut self.months) {
            let month = Month::new(grid);
            let month_area = Rect {
                x,
                y,
                width: month.width(),
                height: month.height(),
            }
            .intersection(area);
            month.render(month_area, buf, state);
            x = x.saturating_add(month.width()).saturating_add(MONTH_GAP);
        }
        if area.height > 0 {
            let status_area = Rect {
                y: area.bottom() - 1,
                height: 1,
                ..area
            };
            Line::styled(self.status_line(), STATUS_STYLE)
                .centered()
                .render(status_area, buf);
        }
        if self.state == AppState::Helping {
            Help(BASE_STYLE).render(area, buf);
        } else if let AppState::Jumping(ref mut state) = self.state {
            JumpTo.render(area, buf, state);
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Picking,
    Helping,
    Jumping(JumpToState),
    Accepted,
    Quitting,
}

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("terminal I/O failed")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Month(#[from] MonthError),
}
