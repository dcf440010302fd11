mod app;
mod calendar;
mod config;
mod help;
mod jumpto;
mod picker;
mod theme;
use crate::app::App;
use crate::config::{Config, YMD_FMT};
use crate::picker::Picker;
use anyhow::Context;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use time::{Date, OffsetDateTime};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives
const LOG_ENV: &str = "RANGEPICK_LOG";

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run {
        month: Option<Date>,
        config: Option<PathBuf>,
        log_file: Option<PathBuf>,
    },
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut month = None;
        let mut config = None;
        let mut log_file = None;
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('c') | Arg::Long("config") => {
                    config = Some(PathBuf::from(parser.value()?));
                }
                Arg::Long("log-file") => log_file = Some(PathBuf::from(parser.value()?)),
                Arg::Value(value) if month.is_none() => {
                    let value = value.string()?;
                    match Date::parse(&format!("{value}-01"), YMD_FMT) {
                        Ok(d) => month = Some(d),
                        Err(e) => {
                            return Err(lexopt::Error::ParsingFailed {
                                value,
                                error: Box::new(e),
                            })
                        }
                    }
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run {
            month,
            config,
            log_file,
        })
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run {
                month,
                config,
                log_file,
            } => {
                if let Some(path) = log_file {
                    init_logging(&path)?;
                }
                let config = match config {
                    Some(path) => Config::load(&path)?,
                    None => Config::default(),
                };
                let today = OffsetDateTime::now_local()
                    .context("failed to determine local date")?
                    .date();
                let mut picker = Picker::new(
                    today,
                    config.settings,
                    config.ranges,
                    config.disabled_weekdays,
                )?;
                if let Some(month) = month {
                    picker = picker.start_month(month)?;
                }
                tracing::info!(month = %picker.month(), months = config.months, "starting");
                let app = App::new(picker, config.months)?;
                let selection = with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    Ok(app.run(terminal)?)
                })?;
                for line in selection.into_iter().flatten() {
                    println!("{line}");
                }
                Ok(())
            }
            Command::Help => {
                println!("Usage: rangepick [--config FILE] [--log-file FILE] [YYYY-MM]");
                println!();
                println!("Pick date ranges from a terminal month calendar");
                println!();
                println!("Options:");
                println!("  -c FILE, --config FILE");
                println!("                    Read display settings and ranges from a TOML file");
                println!();
                println!("  --log-file FILE   Write logs to FILE; filter with ${LOG_ENV}");
                println!();
                println!("  -h, --help        Display this help message and exit");
                println!("  -V, --version     Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = execute!(io::stdout(), EnableMouseCapture)
        .context("failed to enable mouse capture")
        .and_then(|()| func(terminal));
    // Restore even if disabling capture fails
    let disabled = execute!(io::stdout(), DisableMouseCapture);
    ratatui::restore();
    let value = r?;
    disabled.context("failed to disable mouse capture")?;
    Ok(value)
}
