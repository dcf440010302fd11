use crate::calendar::{
    next_month, nth_month_after, previous_month, start_of_month, DateRange, DateSpan, DayFilter,
    DisplayMode, DragState, MonthEvent, MonthProps, MonthSettings, OutOfTimeError, Selection,
};
use time::Date;

/// Which end of the focused range the next click sets
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum RangeStep {
    #[default]
    Start,
    End,
}

/// Owns everything the month grids display but do not decide: the month
/// shown first, the ranges, and the drag in progress.
#[derive(Clone, Debug)]
pub(crate) struct Picker<F> {
    today: Date,
    month: Date,
    settings: MonthSettings,
    filter: F,
    selection: Selection,
    step: RangeStep,
}

impl<F: DayFilter> Picker<F> {
    pub(crate) fn new(
        today: Date,
        settings: MonthSettings,
        ranges: Vec<DateRange>,
        filter: F,
    ) -> Result<Self, OutOfTimeError> {
        let ranges = if ranges.is_empty() {
            vec![DateRange::new("selection")]
        } else {
            ranges
        };
        let focused_range = ranges.iter().position(|r| !r.disabled).unwrap_or_default();
        Ok(Picker {
            today,
            month: start_of_month(today)?,
            settings,
            filter,
            selection: Selection {
                ranges,
                focused_range,
                ..Selection::default()
            },
            step: RangeStep::Start,
        })
    }

    pub(crate) fn start_month(mut self, date: Date) -> Result<Self, OutOfTimeError> {
        self.month = start_of_month(date)?;
        Ok(self)
    }

    pub(crate) fn month(&self) -> Date {
        self.month
    }

    pub(crate) fn selection(&self) -> &Selection {
        &self.selection
    }

    pub(crate) fn display_mode(&self) -> DisplayMode {
        self.settings.display_mode
    }

    /// Props for the month `offset` months after the first one shown
    pub(crate) fn month_props(&self, offset: usize) -> Result<MonthProps<'_>, OutOfTimeError> {
        Ok(MonthProps {
            month: nth_month_after(self.month, offset)?,
            today: self.today,
            settings: &self.settings,
            disabled_day: &self.filter,
            selection: &self.selection,
        })
    }

    pub(crate) fn one_month_forwards(&mut self) -> Result<(), OutOfTimeError> {
        self.month = next_month(self.month)?;
        tracing::debug!(month = %self.month, "moved forwards");
        Ok(())
    }

    pub(crate) fn one_month_backwards(&mut self) -> Result<(), OutOfTimeError> {
        self.month = previous_month(self.month)?;
        tracing::debug!(month = %self.month, "moved backwards");
        Ok(())
    }

    pub(crate) fn jump_to_today(&mut self) -> Result<(), OutOfTimeError> {
        self.jump_to(self.today)
    }

    pub(crate) fn jump_to(&mut self, date: Date) -> Result<(), OutOfTimeError> {
        self.month = start_of_month(date)?;
        tracing::debug!(month = %self.month, "jumped");
        Ok(())
    }

    /// Moves focus to the next range that is not disabled.  Returns `false` if
    /// there is no other such range.
    pub(crate) fn focus_next_range(&mut self) -> bool {
        let count = self.selection.ranges.len();
        let next = (1..count)
            .map(|k| (self.selection.focused_range + k) % count)
            .find(|&i| !self.selection.ranges[i].disabled);
        match next {
            Some(i) => {
                self.selection.focused_range = i;
                self.step = RangeStep::Start;
                self.selection.drag = DragState::default();
                tracing::debug!(key = %self.selection.ranges[i].key, "focused range");
                true
            }
            None => false,
        }
    }

    pub(crate) fn handle(&mut self, event: MonthEvent) {
        match event {
            MonthEvent::DragStart(date) => {
                self.selection.drag = DragState {
                    status: true,
                    range: DateSpan::day(date),
                    disable_preview: true,
                };
            }
            MonthEvent::DragMove(date) => {
                if self.selection.drag.status {
                    self.selection.drag.range.end_date = Some(date);
                }
            }
            MonthEvent::DragEnd(date) => {
                let drag = std::mem::take(&mut self.selection.drag);
                if self.settings.display_mode == DisplayMode::Date
                    || !drag.status
                    || drag.range.start_date == Some(date)
                {
                    self.click(date);
                } else {
                    let span = DateSpan::new(drag.range.start_date, Some(date)).normalized();
                    if let Some(range) = self.focused_range_mut() {
                        range.span = span;
                        tracing::debug!(key = %range.key, ?span, "dragged out range");
                        self.step = RangeStep::Start;
                    }
                }
            }
            MonthEvent::PreviewChange(date) => {
                self.selection.preview = date.map(|d| self.preview_for(d));
            }
            MonthEvent::MouseLeave => self.selection.preview = None,
        }
    }

    /// Abandons a drag whose button was released away from every day
    pub(crate) fn cancel_drag(&mut self) {
        if self.selection.drag.status {
            tracing::debug!(range = ?self.selection.drag.range, "drag abandoned");
        }
        self.selection.drag = DragState::default();
    }

    fn click(&mut self, date: Date) {
        if self.settings.display_mode == DisplayMode::Date {
            self.selection.date = Some(date);
            tracing::debug!(%date, "picked date");
            return;
        }
        let step = self.step;
        let Some(range) = self.focused_range_mut() else {
            return;
        };
        let next_step = match step {
            RangeStep::Start => {
                range.span = DateSpan::day(date);
                RangeStep::End
            }
            RangeStep::End => {
                range.span = DateSpan::new(range.span.start_date, Some(date)).normalized();
                RangeStep::Start
            }
        };
        tracing::debug!(key = %range.key, span = ?range.span, "clicked range");
        self.step = next_step;
    }

    fn focused_range_mut(&mut self) -> Option<&mut DateRange> {
        self.selection
            .ranges
            .get_mut(self.selection.focused_range)
            .filter(|r| !r.disabled)
    }

    fn preview_for(&self, date: Date) -> DateSpan {
        let start = self
            .selection
            .ranges
            .get(self.selection.focused_range)
            .and_then(|r| r.span.start_date);
        match (self.settings.display_mode, self.step, start) {
            (DisplayMode::DateRange, RangeStep::End, Some(start)) => {
                DateSpan::new(Some(start), Some(date)).normalized()
            }
            _ => DateSpan::day(date),
        }
    }

    /// One line per range (or the single picked date) describing the current
    /// selection
    pub(crate) fn describe(&self) -> Vec<String> {
        match self.settings.display_mode {
            DisplayMode::Date => vec![show_endpoint(self.selection.date)],
            DisplayMode::DateRange => self
                .selection
                .ranges
                .iter()
                .map(|r| {
                    format!(
                        "{} {} {}",
                        r.key,
                        show_endpoint(r.span.start_date),
                        show_endpoint(r.span.end_date)
                    )
                })
                .collect(),
        }
    }
}

fn show_endpoint(date: Option<Date>) -> String {
    date.map_or_else(|| String::from("-"), |d| d.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::MonthGrid;
    use time::macros::date;

    const TODAY: Date = date!(2025 - 01 - 22);

    const NO_FILTER: fn(Date) -> bool = |_| false;

    fn picker(settings: MonthSettings) -> Picker<fn(Date) -> bool> {
        Picker::new(TODAY, settings, Vec::new(), NO_FILTER).unwrap()
    }

    fn span(start: Date, end: Date) -> DateSpan {
        DateSpan::new(Some(start), Some(end))
    }

    #[test]
    fn test_default_range() {
        let picker = picker(MonthSettings::default());
        assert_eq!(picker.month(), date!(2025 - 01 - 01));
        assert_eq!(picker.selection().ranges, [DateRange::new("selection")]);
        assert_eq!(picker.describe(), ["selection - -"]);
    }

    #[test]
    fn test_drag_selects_range() {
        let mut picker = picker(MonthSettings::default());
        picker.handle(MonthEvent::DragStart(date!(2025 - 01 - 22)));
        assert!(picker.selection().drag.status);
        assert!(picker.selection().drag.disable_preview);
        picker.handle(MonthEvent::DragMove(date!(2025 - 01 - 24)));
        picker.handle(MonthEvent::DragMove(date!(2025 - 01 - 15)));
        assert_eq!(
            picker.selection().drag.range,
            span(date!(2025 - 01 - 22), date!(2025 - 01 - 15))
        );
        picker.handle(MonthEvent::DragEnd(date!(2025 - 01 - 15)));
        assert_eq!(picker.selection().drag, DragState::default());
        assert_eq!(
            picker.selection().ranges[0].span,
            span(date!(2025 - 01 - 15), date!(2025 - 01 - 22))
        );
        assert_eq!(picker.describe(), ["selection 2025-01-15 2025-01-22"]);
    }

    #[test]
    fn test_grid_follows_drag() {
        let mut picker = picker(MonthSettings::default());
        picker.handle(MonthEvent::DragStart(date!(2025 - 01 - 10)));
        picker.handle(MonthEvent::DragMove(date!(2025 - 01 - 12)));
        picker.handle(MonthEvent::PreviewChange(Some(date!(2025 - 01 - 12))));
        let grid = MonthGrid::build(&picker.month_props(0).unwrap()).unwrap();
        let day = grid.days().find(|d| d.date == date!(2025 - 01 - 11)).unwrap();
        assert!(day.ranges[0].position.in_range);
        assert!(grid.days().all(|d| d.preview.is_none()));
    }

    #[test]
    fn test_clicks_alternate_ends() {
        let mut picker = picker(MonthSettings::default());
        picker.handle(MonthEvent::DragStart(date!(2025 - 01 - 20)));
        picker.handle(MonthEvent::DragEnd(date!(2025 - 01 - 20)));
        assert_eq!(
            picker.selection().ranges[0].span,
            DateSpan::day(date!(2025 - 01 - 20))
        );
        picker.handle(MonthEvent::PreviewChange(Some(date!(2025 - 01 - 17))));
        assert_eq!(
            picker.selection().preview,
            Some(span(date!(2025 - 01 - 17), date!(2025 - 01 - 20)))
        );
        picker.handle(MonthEvent::DragStart(date!(2025 - 01 - 17)));
        picker.handle(MonthEvent::DragEnd(date!(2025 - 01 - 17)));
        assert_eq!(
            picker.selection().ranges[0].span,
            span(date!(2025 - 01 - 17), date!(2025 - 01 - 20))
        );
        picker.handle(MonthEvent::PreviewChange(Some(date!(2025 - 01 - 25))));
        assert_eq!(
            picker.selection().preview,
            Some(DateSpan::day(date!(2025 - 01 - 25)))
        );
        picker.handle(MonthEvent::MouseLeave);
        assert_eq!(picker.selection().preview, None);
    }

    #[test]
    fn test_date_mode() {
        let mut picker = picker(MonthSettings {
            display_mode: DisplayMode::Date,
            ..MonthSettings::default()
        });
        assert_eq!(picker.describe(), ["-"]);
        picker.handle(MonthEvent::DragStart(date!(2025 - 01 - 03)));
        picker.handle(MonthEvent::DragMove(date!(2025 - 01 - 09)));
        picker.handle(MonthEvent::DragEnd(date!(2025 - 01 - 09)));
        assert_eq!(picker.selection().date, Some(date!(2025 - 01 - 09)));
        assert_eq!(picker.selection().ranges[0].span, DateSpan::default());
        assert_eq!(picker.describe(), ["2025-01-09"]);
    }

    #[test]
    fn test_release_without_drag_is_click() {
        let mut picker = picker(MonthSettings::default());
        picker.handle(MonthEvent::DragMove(date!(2025 - 01 - 09)));
        assert!(!picker.selection().drag.status);
        picker.handle(MonthEvent::DragEnd(date!(2025 - 01 - 09)));
        assert_eq!(
            picker.selection().ranges[0].span,
            DateSpan::day(date!(2025 - 01 - 09))
        );
    }

    #[test]
    fn test_cancel_drag() {
        let mut picker = picker(MonthSettings::default());
        picker.handle(MonthEvent::DragStart(date!(2025 - 01 - 22)));
        picker.handle(MonthEvent::DragMove(date!(2025 - 01 - 24)));
        picker.cancel_drag();
        assert_eq!(picker.selection().drag, DragState::default());
        picker.handle(MonthEvent::DragMove(date!(2025 - 01 - 26)));
        assert!(!picker.selection().drag.status);
        assert_eq!(picker.selection().ranges[0].span, DateSpan::default());
    }

    #[test]
    fn test_focus_skips_disabled_ranges() {
        let ranges = vec![
            DateRange::new("a"),
            DateRange {
                disabled: true,
                ..DateRange::new("b")
            },
            DateRange::new("c"),
        ];
        let mut picker = Picker::new(TODAY, MonthSettings::default(), ranges, NO_FILTER).unwrap();
        assert_eq!(picker.selection().focused_range, 0);
        assert!(picker.focus_next_range());
        assert_eq!(picker.selection().focused_range, 2);
        picker.handle(MonthEvent::DragStart(date!(2025 - 01 - 02)));
        picker.handle(MonthEvent::DragEnd(date!(2025 - 01 - 04)));
        assert_eq!(
            picker.selection().ranges[2].span,
            span(date!(2025 - 01 - 02), date!(2025 - 01 - 04))
        );
        assert!(picker.focus_next_range());
        assert_eq!(picker.selection().focused_range, 0);
    }

    #[test]
    fn test_single_range_focus() {
        let mut picker = picker(MonthSettings::default());
        assert!(!picker.focus_next_range());
    }

    #[test]
    fn test_navigation() {
        let mut picker = picker(MonthSettings::default());
        picker.one_month_backwards().unwrap();
        assert_eq!(picker.month(), date!(2024 - 12 - 01));
        picker.one_month_forwards().unwrap();
        picker.one_month_forwards().unwrap();
        assert_eq!(picker.month(), date!(2025 - 02 - 01));
        assert_eq!(
            picker.month_props(11).unwrap().month,
            date!(2026 - 01 - 01)
        );
        picker.jump_to(date!(1999 - 07 - 14)).unwrap();
        assert_eq!(picker.month(), date!(1999 - 07 - 01));
        picker.jump_to_today().unwrap();
        assert_eq!(picker.month(), date!(2025 - 01 - 01));
    }

    #[test]
    fn test_start_month() {
        let picker = picker(MonthSettings::default())
            .start_month(date!(2030 - 05 - 31))
            .unwrap();
        assert_eq!(picker.month(), date!(2030 - 05 - 01));
    }
}
