use std::iter::successors;
use thiserror::Error;
use time::{Date, Duration, Month, Weekday};

pub(crate) const DAYS_IN_WEEK: usize = 7;

/// A padded month whose calendar span is at most this many days apart gets an
/// extra week when a fixed height is requested
const SHORT_MONTH_SPAN: i64 = 34;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct DateOptions {
    pub(crate) week_starts_on: Weekday,
}

impl Default for DateOptions {
    fn default() -> DateOptions {
        DateOptions {
            week_starts_on: Weekday::Sunday,
        }
    }
}

pub(crate) trait WeekdayExt {
    /// Column of the weekday in a week that begins on `week_starts_on`
    fn index_from(&self, week_starts_on: Weekday) -> u8;
}

impl WeekdayExt for Weekday {
    fn index_from(&self, week_starts_on: Weekday) -> u8 {
        (self.number_days_from_monday() + 7 - week_starts_on.number_days_from_monday()) % 7
    }
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("reached the end of time")]
pub(crate) struct OutOfTimeError;

/// The days drawn for a month: whole weeks from `start` through `end`, plus
/// the bounds of the month proper.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct MonthDisplay {
    pub(crate) start: Date,
    pub(crate) end: Date,
    pub(crate) start_of_month: Date,
    pub(crate) end_of_month: Date,
}

impl MonthDisplay {
    pub(crate) fn days(&self) -> impl Iterator<Item = Date> {
        each_day(self.start, self.end)
    }

    pub(crate) fn in_month(&self, date: Date) -> bool {
        (self.start_of_month..=self.end_of_month).contains(&date)
    }
}

pub(crate) fn month_display_range(
    month: Date,
    options: DateOptions,
    fixed_height: bool,
) -> Result<MonthDisplay, OutOfTimeError> {
    let start_of_month = start_of_month(month)?;
    let end_of_month = end_of_month(month)?;
    let start = start_of_week(start_of_month, options.week_starts_on)?;
    let mut end = end_of_week(end_of_month, options.week_starts_on)?;
    if fixed_height && (end - start).whole_days() <= SHORT_MONTH_SPAN {
        end = add_days(end, 7)?;
    }
    Ok(MonthDisplay {
        start,
        end,
        start_of_month,
        end_of_month,
    })
}

pub(crate) fn start_of_week(date: Date, week_starts_on: Weekday) -> Result<Date, OutOfTimeError> {
    add_days(
        date,
        -i64::from(date.weekday().index_from(week_starts_on)),
    )
}

pub(crate) fn end_of_week(date: Date, week_starts_on: Weekday) -> Result<Date, OutOfTimeError> {
    add_days(
        date,
        6 - i64::from(date.weekday().index_from(week_starts_on)),
    )
}

pub(crate) fn start_of_month(date: Date) -> Result<Date, OutOfTimeError> {
    add_days(date, 1 - i64::from(date.day()))
}

pub(crate) fn end_of_month(date: Date) -> Result<Date, OutOfTimeError> {
    iter_days_from(date)
        .take_while(|d| d.month() == date.month())
        .last()
        .ok_or(OutOfTimeError)
}

pub(crate) fn next_month(date: Date) -> Result<Date, OutOfTimeError> {
    end_of_month(date)?.next_day().ok_or(OutOfTimeError)
}

pub(crate) fn previous_month(date: Date) -> Result<Date, OutOfTimeError> {
    let last = start_of_month(date)?
        .previous_day()
        .ok_or(OutOfTimeError)?;
    start_of_month(last)
}

/// Returns the first day of the month `n` months after the one containing
/// `date`
pub(crate) fn nth_month_after(date: Date, n: usize) -> Result<Date, OutOfTimeError> {
    let mut month = start_of_month(date)?;
    for _ in 0..n {
        month = next_month(month)?;
    }
    Ok(month)
}

pub(crate) fn is_weekend(date: Date) -> bool {
    matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
}

/// Every day from `start` through `end`, inclusive
pub(crate) fn each_day(start: Date, end: Date) -> impl Iterator<Item = Date> {
    iter_days_from(start).take_while(move |&d| d <= end)
}

// Broadcast weeks always run Monday through Sunday, and a week belongs to the
// month (and year) in which its Sunday falls.
fn broadcast_week_end(date: Date) -> Result<Date, OutOfTimeError> {
    end_of_week(date, Weekday::Monday)
}

pub(crate) fn broadcast_week_number(date: Date) -> Result<u8, OutOfTimeError> {
    let sunday = broadcast_week_end(date)?;
    let new_year = Date::from_calendar_date(sunday.year(), Month::January, 1)
        .map_err(|_| OutOfTimeError)?;
    let year_start = start_of_week(new_year, Weekday::Monday)?;
    let weeks = (start_of_week(date, Weekday::Monday)? - year_start).whole_weeks();
    u8::try_from(weeks + 1).map_err(|_| OutOfTimeError)
}

/// Whether `date` is drawn in the broadcast month corresponding to the
/// calendar month containing `month`
pub(crate) fn should_render_broadcast_day(date: Date, month: Date) -> Result<bool, OutOfTimeError> {
    let sunday = broadcast_week_end(date)?;
    Ok(sunday.year() == month.year() && sunday.month() == month.month())
}

fn add_days(date: Date, days: i64) -> Result<Date, OutOfTimeError> {
    date.checked_add(Duration::days(days)).ok_or(OutOfTimeError)
}

fn iter_days_from(date: Date) -> impl Iterator<Item = Date> {
    successors(Some(date), |&d| d.next_day())
}
