mod app;
mod calendar;
mod clock;
mod datekey;
mod help;
mod jumpto;
mod logging;
mod score;
mod storage;
mod store;
mod theme;
use crate::app::App;
use crate::clock::SystemClock;
use crate::datekey::DateKey;
use crate::storage::{JsonFileStorage, MemoryStorage, Storage};
use crate::store::DateStateStore;
use anyhow::Context;
use lexopt::{Arg, Parser, ValueExt};
use log::{info, warn};
use ratatui::DefaultTerminal;
use std::path::PathBuf;

/// Environment variable naming the data file when `--data-file` isn't given
const DATA_FILE_VAR: &str = "DAYMARK_DATA_FILE";

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run(Options),
    Help,
    Version,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Options {
    start: Option<DateKey>,
    data_file: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    log_level: Option<&'static str>,
    score: bool,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut opts = Options::default();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Long("data-file") => opts.data_file = Some(PathBuf::from(parser.value()?)),
                Arg::Long("log-dir") => opts.log_dir = Some(PathBuf::from(parser.value()?)),
                Arg::Long("log-level") => {
                    let value = parser.value()?.string()?;
                    match logging::normalize_level(&value) {
                        Ok(level) => opts.log_level = Some(level),
                        Err(e) => {
                            return Err(lexopt::Error::ParsingFailed {
                                value,
                                error: Box::new(e),
                            })
                        }
                    }
                }
                Arg::Long("score") => opts.score = true,
                Arg::Value(value) if opts.start.is_none() => {
                    opts.start = Some(value.parse::<DateKey>()?);
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run(opts))
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run(opts) => opts.run(),
            Command::Help => {
                println!("Usage: daymark [<options>] [YYYY-MM-DD]");
                println!();
                println!("Terminal calendar for marking each day of a habit green or red");
                println!();
                println!("Options:");
                println!("  --data-file <PATH>  Store marks in the given file");
                println!("                      [default: ${DATA_FILE_VAR} or a file in the");
                println!("                      local data directory]");
                println!("  --log-dir <PATH>    Write log files to the given directory");
                println!("  --log-level <LEVEL> trace, debug, info, warn, error, or off");
                println!("                      [default: {}]", logging::default_log_level());
                println!("  --score             Print the current score and exit");
                println!("  -h, --help          Display this help message and exit");
                println!("  -V, --version       Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

impl Options {
    fn run(self) -> anyhow::Result<()> {
        // Must happen while we're still single-threaded, i.e., before the
        // logger starts
        let clock = SystemClock::local();
        let _logger = self.start_logging();
        let clock = clock.unwrap_or_else(|e| {
            warn!("Could not determine local UTC offset ({e}); using UTC");
            SystemClock::utc()
        });
        let path = self.data_file()?;
        let storage = JsonFileStorage::new(path);
        info!("Using data file {}", storage.path().display());
        if self.score {
            let store = DateStateStore::open(storage, clock)
                .context("failed to load marked days")?;
            print!("{}", store.score());
            return Ok(());
        }
        let boxed: Box<dyn Storage> = Box::new(storage);
        let (store, warning) = match DateStateStore::open(boxed, clock) {
            Ok(store) => (store, None),
            Err(e) => {
                let msg = format!("{:#}; marks will not be saved", anyhow::Error::new(e));
                warn!("{msg}");
                eprintln!("{}: warning: {msg}", env!("CARGO_PKG_NAME"));
                let memory: Box<dyn Storage> = Box::new(MemoryStorage::new());
                let store = DateStateStore::open(memory, clock)
                    .context("failed to set up in-memory storage")?;
                (store, Some(msg))
            }
        };
        let mut app = App::new(store);
        if let Some(start) = self.start {
            app = app.start_date(start.date());
        }
        if let Some(msg) = warning {
            app = app.with_warning(msg);
        }
        with_terminal(|mut terminal| {
            terminal.hide_cursor().context("failed to hide cursor")?;
            app.run(terminal)?;
            Ok(())
        })
    }

    fn data_file(&self) -> anyhow::Result<PathBuf> {
        if let Some(ref path) = self.data_file {
            return Ok(path.clone());
        }
        if let Some(path) = std::env::var_os(DATA_FILE_VAR).filter(|s| !s.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        Ok(data_dir()?.join("days.json"))
    }

    fn log_dir(&self) -> anyhow::Result<PathBuf> {
        match self.log_dir {
            Some(ref dir) => Ok(dir.clone()),
            None => Ok(data_dir()?.join("logs")),
        }
    }

    /// Logging is best-effort: failure to set it up is reported and then
    /// ignored
    fn start_logging(&self) -> Option<flexi_logger::LoggerHandle> {
        let level = self.log_level.unwrap_or_else(logging::default_log_level);
        let r = self
            .log_dir()
            .and_then(|dir| logging::init(level, &dir).map_err(anyhow::Error::from));
        match r {
            Ok(handle) => Some(handle),
            Err(e) => {
                eprintln!("{}: warning: logging disabled: {e:#}", env!("CARGO_PKG_NAME"));
                None
            }
        }
    }
}

fn data_dir() -> anyhow::Result<PathBuf> {
    dirs::data_local_dir()
        .map(|dir| dir.join(env!("CARGO_PKG_NAME")))
        .context("could not determine local data directory")
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}
