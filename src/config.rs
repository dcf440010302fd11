use crate::calendar::{
    DateOptions, DateRange, DateSpan, DayFilter, DisplayFormats, DisplayMode, MonthSettings,
};
use ratatui::style::Color;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use time::{
    format_description::{self, BorrowedFormatItem, OwnedFormatItem},
    macros::{date, format_description},
    Date, Weekday,
};

pub(crate) static YMD_FMT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Most months that can be shown side by side
const MAX_MONTHS: usize = 12;

/// Settings loaded from the `--config` file, or the defaults when there is
/// none
#[derive(Clone, Debug)]
pub(crate) struct Config {
    pub(crate) settings: MonthSettings,
    pub(crate) months: usize,
    pub(crate) ranges: Vec<DateRange>,
    pub(crate) disabled_weekdays: DisabledWeekdays,
}

impl Config {
    pub(crate) fn load(path: &Path) -> Result<Config, ConfigError> {
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = src.parse::<Config>()?;
        tracing::debug!(
            path = %path.display(),
            months = config.months,
            ranges = config.ranges.len(),
            "loaded configuration"
        );
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            settings: MonthSettings::default(),
            months: 1,
            ranges: Vec::new(),
            disabled_weekdays: DisabledWeekdays::default(),
        }
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Config, ConfigError> {
        toml::from_str::<RawConfig>(s)?.try_into()
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    week_starts_on: Option<WeekdayName>,
    months: Option<usize>,
    display_mode: DisplayMode,
    show_week_days: Option<bool>,
    show_month_name: Option<bool>,
    show_preview: Option<bool>,
    fixed_height: bool,
    broadcast_calendar: bool,
    min_date: Option<String>,
    max_date: Option<String>,
    disabled_dates: Vec<String>,
    disabled_weekdays: Vec<WeekdayName>,
    formats: RawFormats,
    ranges: Vec<RawRange>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawFormats {
    month: Option<String>,
    weekday: Option<String>,
    day: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRange {
    key: String,
    start_date: Option<String>,
    end_date: Option<String>,
    color: Option<String>,
    #[serde(default)]
    disabled: bool,
}

impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Config, ConfigError> {
        let defaults = MonthSettings::default();
        let week_starts_on = raw
            .week_starts_on
            .map_or(defaults.date_options.week_starts_on, Weekday::from);
        if raw.broadcast_calendar && week_starts_on != Weekday::Monday {
            tracing::warn!(
                %week_starts_on,
                "broadcast calendar weeks start on Monday; ignoring week_starts_on"
            );
        }
        let months = raw.months.unwrap_or(1);
        if !(1..=MAX_MONTHS).contains(&months) {
            return Err(ConfigError::Months(months));
        }
        let min_date = raw.min_date.as_deref().map(parse_date).transpose()?;
        let max_date = raw.max_date.as_deref().map(parse_date).transpose()?;
        if let (Some(min), Some(max)) = (min_date, max_date) {
            if min > max {
                return Err(ConfigError::Bounds { min, max });
            }
        }
        let disabled_dates = raw
            .disabled_dates
            .iter()
            .map(|s| parse_date(s))
            .collect::<Result<BTreeSet<_>, _>>()?;
        let defaults_fmt = DisplayFormats::default();
        let formats = DisplayFormats {
            month: parse_format("month", raw.formats.month, defaults_fmt.month)?,
            weekday: parse_format("weekday", raw.formats.weekday, defaults_fmt.weekday)?,
            day: parse_format("day", raw.formats.day, defaults_fmt.day)?,
        };
        let ranges = raw
            .ranges
            .into_iter()
            .map(DateRange::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let settings = MonthSettings {
            date_options: DateOptions { week_starts_on },
            display_mode: raw.display_mode,
            min_date,
            max_date,
            disabled_dates,
            formats,
            show_week_days: raw.show_week_days.unwrap_or(defaults.show_week_days),
            show_month_name: raw.show_month_name.unwrap_or(defaults.show_month_name),
            fixed_height: raw.fixed_height,
            broadcast_calendar: raw.broadcast_calendar,
            show_preview: raw.show_preview.unwrap_or(defaults.show_preview),
        };
        Ok(Config {
            settings,
            months,
            ranges,
            disabled_weekdays: DisabledWeekdays(
                raw.disabled_weekdays.into_iter().map(Weekday::from).collect(),
            ),
        })
    }
}

impl TryFrom<RawRange> for DateRange {
    type Error = ConfigError;

    fn try_from(raw: RawRange) -> Result<DateRange, ConfigError> {
        let span = DateSpan::new(
            raw.start_date.as_deref().map(parse_date).transpose()?,
            raw.end_date.as_deref().map(parse_date).transpose()?,
        );
        let mut range = DateRange::new(&raw.key).span(span);
        if let Some(value) = raw.color {
            let color = value
                .parse::<Color>()
                .map_err(|_| ConfigError::Color { value })?;
            range = range.color(color);
        }
        range.disabled = raw.disabled;
        Ok(range)
    }
}

fn parse_date(value: &str) -> Result<Date, ConfigError> {
    Date::parse(value, YMD_FMT).map_err(|source| ConfigError::Date {
        value: value.to_owned(),
        source,
    })
}

// Formats naming hours or offsets parse but cannot format a bare date.
fn parse_format(
    field: &'static str,
    value: Option<String>,
    default: OwnedFormatItem,
) -> Result<OwnedFormatItem, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    let item = format_description::parse_owned::<2>(&value)
        .map_err(|source| ConfigError::Format { field, source })?;
    date!(2000 - 01 - 01)
        .format(&item)
        .map_err(|source| ConfigError::UnusableFormat { field, source })?;
    Ok(item)
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
enum WeekdayName {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<WeekdayName> for Weekday {
    fn from(value: WeekdayName) -> Weekday {
        match value {
            WeekdayName::Monday => Weekday::Monday,
            WeekdayName::Tuesday => Weekday::Tuesday,
            WeekdayName::Wednesday => Weekday::Wednesday,
            WeekdayName::Thursday => Weekday::Thursday,
            WeekdayName::Friday => Weekday::Friday,
            WeekdayName::Saturday => Weekday::Saturday,
            WeekdayName::Sunday => Weekday::Sunday,
        }
    }
}

/// Days of the week the user may never pick
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct DisabledWeekdays(Vec<Weekday>);

impl DayFilter for DisabledWeekdays {
    fn is_disabled(&self, date: Date) -> bool {
        self.0.contains(&date.weekday())
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read configuration file {}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid configuration")]
    Parse(#[from] toml::de::Error),
    #[error("invalid date {value:?}; expected YYYY-MM-DD")]
    Date {
        value: String,
        source: time::error::Parse,
    },
    #[error("invalid {field} format description")]
    Format {
        field: &'static str,
        source: time::error::InvalidFormatDescription,
    },
    #[error("{field} format description cannot be used to format a date")]
    UnusableFormat {
        field: &'static str,
        source: time::error::Format,
    },
    #[error("invalid range color {value:?}")]
    Color { value: String },
    #[error("min_date {min} is after max_date {max}")]
    Bounds { min: Date, max: Date },
    #[error("months must be between 1 and {MAX_MONTHS}, got {0}")]
    Months(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty() {
        let config = "".parse::<Config>().unwrap();
        assert_eq!(config.months, 1);
        assert!(config.ranges.is_empty());
        assert_eq!(config.settings.date_options.week_starts_on, Weekday::Sunday);
        assert_eq!(config.settings.display_mode, DisplayMode::DateRange);
        assert!(config.settings.show_week_days);
        assert!(config.settings.show_preview);
        assert!(!config.settings.fixed_height);
        assert!(!config.disabled_weekdays.is_disabled(date!(2025 - 01 - 04)));
    }

    #[test]
    fn test_full() {
        let src = r##"
week_starts_on = "monday"
months = 2
display_mode = "date_range"
show_month_name = false
fixed_height = true
min_date = "2025-01-01"
max_date = "2025-12-31"
disabled_dates = ["2025-01-08", "2025-01-09"]
disabled_weekdays = ["saturday", "sunday"]

[formats]
day = "[day]"

[[ranges]]
key = "stay"
start_date = "2025-01-10"
end_date = "2025-01-15"
color = "green"

[[ranges]]
key = "return"
color = "#ff8800"
disabled = true
"##;
        let config = src.parse::<Config>().unwrap();
        assert_eq!(config.months, 2);
        let settings = &config.settings;
        assert_eq!(settings.date_options.week_starts_on, Weekday::Monday);
        assert!(!settings.show_month_name);
        assert!(settings.show_week_days);
        assert!(settings.fixed_height);
        assert_eq!(settings.min_date, Some(date!(2025 - 01 - 01)));
        assert_eq!(settings.max_date, Some(date!(2025 - 12 - 31)));
        assert_eq!(
            settings.disabled_dates.iter().copied().collect::<Vec<_>>(),
            [date!(2025 - 01 - 08), date!(2025 - 01 - 09)]
        );
        assert_eq!(
            date!(2025 - 01 - 08).format(&settings.formats.day).unwrap(),
            "08"
        );
        assert!(config.disabled_weekdays.is_disabled(date!(2025 - 01 - 04)));
        assert!(!config.disabled_weekdays.is_disabled(date!(2025 - 01 - 06)));
        assert_eq!(
            config.ranges,
            [
                DateRange::new("stay")
                    .span(DateSpan::new(
                        Some(date!(2025 - 01 - 10)),
                        Some(date!(2025 - 01 - 15))
                    ))
                    .color(Color::Green),
                DateRange {
                    disabled: true,
                    ..DateRange::new("return").color(Color::Rgb(0xff, 0x88, 0x00))
                },
            ]
        );
    }

    #[test]
    fn test_date_mode() {
        let config = "display_mode = \"date\"".parse::<Config>().unwrap();
        assert_eq!(config.settings.display_mode, DisplayMode::Date);
    }

    #[test]
    fn test_unknown_field() {
        let r = "weeks_start_on = \"monday\"".parse::<Config>();
        assert!(matches!(r, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_bad_weekday() {
        let r = "week_starts_on = \"funday\"".parse::<Config>();
        assert!(matches!(r, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_bad_date() {
        let r = "min_date = \"2025-02-30\"".parse::<Config>();
        assert!(matches!(r, Err(ConfigError::Date { value, .. }) if value == "2025-02-30"));
    }

    #[test]
    fn test_bounds_reversed() {
        let r = "min_date = \"2025-02-01\"\nmax_date = \"2025-01-31\"".parse::<Config>();
        assert!(matches!(
            r,
            Err(ConfigError::Bounds { min, max }) if min == date!(2025 - 02 - 01) && max == date!(2025 - 01 - 31)
        ));
    }

    #[test]
    fn test_months_out_of_range() {
        assert!(matches!(
            "months = 0".parse::<Config>(),
            Err(ConfigError::Months(0))
        ));
        assert!(matches!(
            "months = 13".parse::<Config>(),
            Err(ConfigError::Months(13))
        ));
    }

    #[test]
    fn test_bad_format() {
        let r = "[formats]\nmonth = \"[month repr:long\"".parse::<Config>();
        assert!(matches!(r, Err(ConfigError::Format { field: "month", .. })));
    }

    #[test]
    fn test_format_needs_time() {
        let r = "[formats]\nday = \"[hour]\"".parse::<Config>();
        assert!(matches!(
            r,
            Err(ConfigError::UnusableFormat { field: "day", .. })
        ));
    }

    #[test]
    fn test_bad_color() {
        let r = "[[ranges]]\nkey = \"a\"\ncolor = \"not a color\"".parse::<Config>();
        assert!(matches!(r, Err(ConfigError::Color { value }) if value == "not a color"));
    }

    #[test]
    fn test_broadcast_keeps_configured_week_start() {
        let config = "broadcast_calendar = true\nweek_starts_on = \"sunday\""
            .parse::<Config>()
            .unwrap();
        assert!(config.settings.broadcast_calendar);
        assert_eq!(
            config.settings.effective_date_options().week_starts_on,
            Weekday::Monday
        );
    }

    #[test]
    fn test_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "months = 3").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.months, 3);
    }

    #[test]
    fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nonexistent.toml");
        let r = Config::load(&path);
        assert!(matches!(r, Err(ConfigError::Read { path: p, .. }) if p == path));
    }
}
