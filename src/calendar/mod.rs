mod day;
mod month;
mod util;
mod widget;
pub(crate) use self::day::{DateRange, DateSpan, MonthEvent};
pub(crate) use self::month::{
    DisplayFormats, DisplayMode, DragState, MonthError, MonthGrid, MonthProps, MonthSettings,
    Selection,
};
pub(crate) use self::util::{
    next_month, nth_month_after, previous_month, start_of_month, DateOptions, OutOfTimeError,
};
pub(crate) use self::widget::{Month, MonthState};
use time::Date;

/// Decides which days the user may not pick, on top of the fixed bounds and
/// explicit dates in [`MonthSettings`]
pub(crate) trait DayFilter {
    fn is_disabled(&self, date: Date) -> bool;
}

impl<F: Fn(Date) -> bool> DayFilter for F {
    fn is_disabled(&self, date: Date) -> bool {
        self(date)
    }
}
