use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use typepad::{
    app::App,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    quote_generator::QuoteGenerator,
    runtime::{CrosstermEventSource, FixedTicker, Runner},
    session::{Player, Session},
    sources::select_source,
    stats::SpeedUnit,
};

const TICK_RATE_MS: u64 = 100;

/// terminal typing trainer with a pacing robot
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type quotes, prose or code in the terminal. Tracks speed, accuracy and your most mistyped characters, and lets a robot set the pace."
)]
pub struct Cli {
    /// text files to draw quotes from, paragraphs are separated by blank lines
    #[clap(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// lines per quote
    #[clap(short = 'l', long)]
    maxlines: Option<usize>,

    /// columns per quote line
    #[clap(short = 'w', long)]
    width: Option<usize>,

    /// wrap quotes at this column, 0 wraps at the width
    #[clap(long)]
    wrap: Option<usize>,

    /// trim lines and collapse runs of whitespace
    #[clap(long)]
    strip: bool,

    /// tab stop distance
    #[clap(short = 't', long)]
    tabsize: Option<usize>,

    /// require an explicit enter at the end of every line
    #[clap(long)]
    strict: bool,

    /// do not type the leading whitespace of the next line on enter
    #[clap(long)]
    no_indent: bool,

    /// do not continue comments on enter
    #[clap(long)]
    no_syntax: bool,

    /// robot speed in the chosen unit, 0 disables the robot
    #[clap(short = 'r', long)]
    robot: Option<f64>,

    /// unit speeds are shown and given in
    #[clap(short = 'u', long, value_enum)]
    unit: Option<SpeedUnit>,

    /// your name on the scoreboard
    #[clap(short = 'n', long)]
    name: Option<String>,

    /// custom prompt to use
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// type random sentences instead of the bundled quotes
    #[clap(short = 's', long)]
    sentences: bool,

    /// write logs to this file
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// write logs to the default log file
    #[clap(long, conflicts_with = "log_file")]
    log: bool,

    /// log level or filter directives, RUST_LOG takes precedence
    #[clap(long)]
    log_level: Option<String>,

    /// store the resulting settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Applies the flags that were given on top of stored settings.
    fn merge(&self, mut config: Config) -> Config {
        if let Some(maxlines) = self.maxlines {
            config.maxlines = maxlines;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(wrap) = self.wrap {
            config.wrap = wrap;
        }
        if let Some(tabsize) = self.tabsize {
            config.tabsize = tabsize;
        }
        if let Some(robot) = self.robot {
            config.robot_speed = robot;
        }
        if let Some(unit) = self.unit {
            config.unit = unit;
        }
        if let Some(name) = &self.name {
            config.player_name = name.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if !self.files.is_empty() {
            config.files = self.files.clone();
        }
        if let Some(path) = &self.log_file {
            config.log_file = Some(path.clone());
        } else if self.log {
            config.log_file = AppDirs::log_path();
        }
        config.strip |= self.strip;
        config.strict |= self.strict;
        config.sentences |= self.sentences;
        config.indent &= !self.no_indent;
        config.syntax &= !self.no_syntax;
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let store = FileConfigStore::new();
    let config = cli.merge(store.load());
    if let Err(err) = config.validate() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::InvalidValue, err.to_string()).exit();
    }
    if cli.save_config {
        store.save(&config)?;
    }

    init_logging(&config)?;

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let source = select_source(cli.prompt.clone(), &config.files, config.sentences)?;
    let generator = QuoteGenerator::from_boxed(source, config.maxlines, config.width)
        .with_options(config.clean_options());
    let session = Session::new(
        config.session_config(),
        Player::new(config.player_name.clone(), 0.0),
        Player::new(config.robot_name.clone(), config.robot_cps()),
    );
    let mut app = App::new(generator, session, config.unit)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    info!(rounds = app.rounds, "session ended");
    result
}

fn init_logging(config: &Config) -> Result<(), Box<dyn Error>> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let size = terminal.size()?;
    app.on_resize(size.width, size.height);

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    while !app.should_quit() {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        app.handle_event(runner.step())?;
    }

    Ok(())
}
