use super::day::{DateRange, DateSpan, DayCell, DayFlags, MonthEvent, PointerAction};
use super::util::{
    broadcast_week_number, each_day, end_of_week, is_weekend, month_display_range,
    should_render_broadcast_day, start_of_week, DateOptions, OutOfTimeError, DAYS_IN_WEEK,
};
use super::DayFilter;
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::BTreeSet;
use thiserror::Error;
use time::{
    format_description::{BorrowedFormatItem, OwnedFormatItem},
    macros::format_description,
    Date, Weekday,
};

static MONTH_FMT: &[BorrowedFormatItem<'_>] = format_description!("[month repr:long] [year]");

static WEEKDAY_FMT: &[BorrowedFormatItem<'_>] = format_description!("[weekday repr:short]");

static DAY_FMT: &[BorrowedFormatItem<'_>] = format_description!("[day padding:none]");

/// Heading of the week-number column in broadcast mode
pub(crate) const WEEK_NUMBER_HEADING: &str = "#";

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum DisplayMode {
    #[default]
    DateRange,
    Date,
}

#[derive(Clone, Debug)]
pub(crate) struct DisplayFormats {
    pub(crate) month: OwnedFormatItem,
    pub(crate) weekday: OwnedFormatItem,
    pub(crate) day: OwnedFormatItem,
}

impl Default for DisplayFormats {
    fn default() -> DisplayFormats {
        DisplayFormats {
            month: OwnedFormatItem::from(MONTH_FMT),
            weekday: OwnedFormatItem::from(WEEKDAY_FMT),
            day: OwnedFormatItem::from(DAY_FMT),
        }
    }
}

/// Everything about a month's appearance that does not change as the user
/// interacts with it
#[derive(Clone, Debug)]
pub(crate) struct MonthSettings {
    pub(crate) date_options: DateOptions,
    pub(crate) display_mode: DisplayMode,
    pub(crate) min_date: Option<Date>,
    pub(crate) max_date: Option<Date>,
    pub(crate) disabled_dates: BTreeSet<Date>,
    pub(crate) formats: DisplayFormats,
    pub(crate) show_week_days: bool,
    pub(crate) show_month_name: bool,
    pub(crate) fixed_height: bool,
    pub(crate) broadcast_calendar: bool,
    pub(crate) show_preview: bool,
}

impl MonthSettings {
    /// Broadcast weeks run Monday through Sunday no matter what the locale
    /// says.
    pub(crate) fn effective_date_options(&self) -> DateOptions {
        if self.broadcast_calendar {
            DateOptions {
                week_starts_on: Weekday::Monday,
            }
        } else {
            self.date_options
        }
    }

    fn out_of_bounds(&self, day: Date) -> bool {
        self.min_date.is_some_and(|min| day < min) || self.max_date.is_some_and(|max| day > max)
    }
}

impl Default for MonthSettings {
    fn default() -> MonthSettings {
        MonthSettings {
            date_options: DateOptions::default(),
            display_mode: DisplayMode::default(),
            min_date: None,
            max_date: None,
            disabled_dates: BTreeSet::new(),
            formats: DisplayFormats::default(),
            show_week_days: true,
            show_month_name: true,
            fixed_height: false,
            broadcast_calendar: false,
            show_preview: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct DragState {
    pub(crate) status: bool,
    pub(crate) range: DateSpan,
    pub(crate) disable_preview: bool,
}

/// The user's choices so far, owned by whoever drives the month grids
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Selection {
    pub(crate) ranges: Vec<DateRange>,
    pub(crate) focused_range: usize,
    pub(crate) drag: DragState,
    pub(crate) preview: Option<DateSpan>,
    pub(crate) date: Option<Date>,
}

impl Selection {
    /// The ranges as they should be drawn in range mode: while a drag is
    /// underway, the focused range follows the drag.
    pub(crate) fn displayed_ranges(&self) -> Cow<'_, [DateRange]> {
        if self.drag.status {
            Cow::Owned(
                self.ranges
                    .iter()
                    .enumerate()
                    .map(|(i, range)| {
                        if i == self.focused_range {
                            range.clone().span(self.drag.range)
                        } else {
                            range.clone()
                        }
                    })
                    .collect(),
            )
        } else {
            Cow::Borrowed(&self.ranges)
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct MonthProps<'a> {
    /// Any day in the month to draw
    pub(crate) month: Date,
    pub(crate) today: Date,
    pub(crate) settings: &'a MonthSettings,
    pub(crate) disabled_day: &'a dyn DayFilter,
    pub(crate) selection: &'a Selection,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum GridCell {
    WeekNumber(u8),
    Day(DayCell),
}

impl GridCell {
    pub(crate) fn respond(&self, action: PointerAction) -> Vec<MonthEvent> {
        match self {
            // Week numbers are always disabled
            GridCell::WeekNumber(_) => vec![MonthEvent::PreviewChange(None)],
            GridCell::Day(day) => day.respond(action),
        }
    }

    #[cfg(test)]
    pub(crate) fn as_day(&self) -> Option<&DayCell> {
        match self {
            GridCell::WeekNumber(_) => None,
            GridCell::Day(day) => Some(day),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MonthGrid {
    /// First day of the month the grid shows
    pub(crate) month: Date,
    pub(crate) month_name: Option<String>,
    pub(crate) weekdays: Option<Vec<String>>,
    pub(crate) cells: Vec<GridCell>,
    broadcast: bool,
}

impl MonthGrid {
    pub(crate) fn build(props: &MonthProps<'_>) -> Result<MonthGrid, MonthError> {
        let settings = props.settings;
        let selection = props.selection;
        let options = settings.effective_date_options();
        let bounds = month_display_range(props.month, options, settings.fixed_height)?;
        let month_name = if settings.show_month_name {
            Some(props.month.format(&settings.formats.month)?)
        } else {
            None
        };
        let weekdays = if settings.show_week_days {
            Some(weekday_header(
                props.today,
                options,
                &settings.formats.weekday,
                settings.broadcast_calendar,
            )?)
        } else {
            None
        };
        let ranges = match settings.display_mode {
            DisplayMode::DateRange => selection.displayed_ranges(),
            DisplayMode::Date => Cow::Borrowed(&[][..]),
        };
        let preview = selection
            .preview
            .filter(|_| settings.show_preview && !selection.drag.disable_preview);
        let selected_date = match settings.display_mode {
            DisplayMode::DateRange => None,
            DisplayMode::Date => selection.date,
        };
        let mut cells = Vec::new();
        for (index, day) in bounds.days().enumerate() {
            let disabled = settings.out_of_bounds(day)
                || settings.disabled_dates.contains(&day)
                || props.disabled_day.is_disabled(day);
            if settings.broadcast_calendar {
                if !should_render_broadcast_day(day, props.month)? {
                    continue;
                }
                if index % DAYS_IN_WEEK == 0 {
                    cells.push(GridCell::WeekNumber(broadcast_week_number(day)?));
                }
            }
            let flags = DayFlags {
                is_weekend: is_weekend(day),
                is_today: day == props.today,
                is_start_of_week: day == start_of_week(day, options.week_starts_on)?,
                is_end_of_week: day == end_of_week(day, options.week_starts_on)?,
                is_start_of_month: day == bounds.start_of_month,
                is_end_of_month: day == bounds.end_of_month,
                is_passive: !settings.broadcast_calendar && !bounds.in_month(day),
                disabled,
            };
            let label = day.format(&settings.formats.day)?;
            cells.push(GridCell::Day(
                DayCell::new(day, label, flags)
                    .mark_ranges(&ranges)
                    .mark_preview(preview)
                    .mark_selected(selected_date),
            ));
        }
        tracing::trace!(month = %bounds.start_of_month, cells = cells.len(), "built month grid");
        Ok(MonthGrid {
            month: bounds.start_of_month,
            month_name,
            weekdays,
            cells,
            broadcast: settings.broadcast_calendar,
        })
    }

    /// Number of cells in each row of the grid
    pub(crate) fn columns(&self) -> u16 {
        if self.broadcast {
            8
        } else {
            7
        }
    }

    pub(crate) fn rows(&self) -> u16 {
        let cells = u16::try_from(self.cells.len()).unwrap_or(u16::MAX);
        cells.div_ceil(self.columns())
    }

    #[cfg(test)]
    pub(crate) fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.cells.iter().filter_map(GridCell::as_day)
    }
}

fn weekday_header(
    today: Date,
    options: DateOptions,
    format: &OwnedFormatItem,
    broadcast: bool,
) -> Result<Vec<String>, MonthError> {
    let mut labels = Vec::with_capacity(DAYS_IN_WEEK + 1);
    if broadcast {
        labels.push(String::from(WEEK_NUMBER_HEADING));
    }
    let start = start_of_week(today, options.week_starts_on)?;
    let end = end_of_week(today, options.week_starts_on)?;
    for day in each_day(start, end) {
        labels.push(day.format(format)?);
    }
    Ok(labels)
}

#[derive(Debug, Error)]
pub(crate) enum MonthError {
    #[error(transparent)]
    OutOfTime(#[from] OutOfTimeError),
    #[error("failed to format calendar label")]
    Format(#[from] time::error::Format),
}
