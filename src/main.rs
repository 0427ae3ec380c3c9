use clap::{error::ErrorKind, ArgAction, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use tracing::{info, warn};

use trailmark::{
    app::App,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    locale::Locale,
    logging::init_logging,
    runtime::{spawn_locator, CrosstermEventSource, FixedTicker, Runner},
    session::{Notice, NoticeLevel, SessionConfig, SessionController},
    store::{BlobStore, MemoryBlobStore, SqliteBlobStore, WorkoutStore},
    ui::{TerminalForm, TerminalList, TerminalMap},
    workout::Coords,
};

const TICK_RATE_MS: u64 = 50;

/// terminal workout log: mark a spot on the map, record a run or a ride
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Mark a spot on the world map, log a run or a ride with distance, duration and cadence or elevation, and keep the log across restarts."
)]
pub struct Cli {
    /// latitude the map opens at (overrides config)
    #[clap(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// longitude the map opens at (overrides config)
    #[clap(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// language for workout descriptions and units
    #[clap(short = 'l', long, value_enum)]
    locale: Option<Locale>,

    /// map zoom level used when opening and when centering on a workout
    #[clap(short = 'z', long)]
    zoom: Option<f64>,

    /// workout database file (default: ~/.local/state/trailmark/workouts.db)
    #[clap(long)]
    db: Option<PathBuf>,

    /// delete all saved workouts before starting
    #[clap(long)]
    reset: bool,

    /// write the effective settings to the config file
    #[clap(long)]
    save_config: bool,

    /// increase log verbosity (-v, -vv)
    #[clap(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// decrease log verbosity (-q, -qq)
    #[clap(short = 'q', long, action = ArgAction::Count)]
    quiet: u8,
}

impl Cli {
    /// Layer command line overrides on top of the stored config
    fn apply(&self, mut cfg: Config) -> Config {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            cfg.home = Some(Coords::new(lat, lon));
        }
        if let Some(locale) = self.locale {
            cfg.locale = locale;
        }
        if let Some(zoom) = self.zoom {
            cfg.zoom = zoom;
        }
        cfg
    }
}

fn open_store(cli: &Cli) -> (Box<dyn BlobStore>, Option<Notice>) {
    let path = cli
        .db
        .clone()
        .or_else(AppDirs::db_path)
        .unwrap_or_else(|| PathBuf::from("trailmark.db"));

    match SqliteBlobStore::open(&path) {
        Ok(store) => {
            info!(path = %path.display(), "opened workout database");
            (Box::new(store), None)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "falling back to in-memory storage");
            let notice = Notice {
                level: NoticeLevel::Warning,
                message: format!("Workouts will not be saved ({e})"),
            };
            (Box::new(MemoryBlobStore::new()), Some(notice))
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(log_path) = AppDirs::log_path() {
        init_logging(cli.verbose, cli.quiet, &log_path);
    }

    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());
    if cli.save_config {
        config_store.save(&config)?;
        info!(path = %config_store.path().display(), "config saved");
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let (blobs, store_notice) = open_store(&cli);
    let mut session = SessionController::new(
        SessionConfig::from(&config),
        TerminalMap::new(),
        TerminalForm::new(),
        TerminalList::new(),
        WorkoutStore::new(blobs, config.storage_key.clone()),
    );
    if cli.reset {
        session.reset();
    } else {
        session.start();
    }

    let mut app = App::new(session);
    if let Some(notice) = store_notice {
        app.set_status(notice);
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = CrosstermEventSource::new();
    spawn_locator(events.sender(), config.home);
    let runner = Runner::new(events, FixedTicker::new(Duration::from_millis(TICK_RATE_MS)));

    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, S: BlobStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
    runner: &Runner<CrosstermEventSource, FixedTicker>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        let event = runner.step();
        app.handle_event(event, runner.tick_interval());

        if app.should_quit {
            info!(records = app.session.log().len(), "quitting");
            return Ok(());
        }
    }
}
