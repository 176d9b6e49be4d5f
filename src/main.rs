pub mod config;
pub mod input;
pub mod language;
pub mod metrics;
pub mod runtime;
pub mod session;
pub mod theme;
pub mod time_series;
pub mod ui;
pub mod word_source;

use crate::{
    config::{Config, ConfigStore, FileConfigStore},
    input::InputAdapter,
    language::Language,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    session::{Mode, OptionsPatch, Session, DURATIONS, WORD_COUNTS},
    theme::Theme,
    word_source::RandomWords,
};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{
        KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

const TICK_RATE_MS: u64 = 100;

/// minimal typing test tui with live wpm and accuracy
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A minimal typing test for the terminal: fixed-time or fixed-word-count sessions over random common words, with live wpm, accuracy and an on-screen keyboard."
)]
pub struct Cli {
    /// test mode
    #[clap(short, long, value_enum)]
    mode: Option<CliMode>,

    /// seconds to run in time mode (15, 30, 60 or 120)
    #[clap(short, long)]
    duration: Option<u64>,

    /// words to type in words mode (10, 25, 50 or 100)
    #[clap(short, long)]
    words: Option<usize>,

    /// color theme (default, light or matrix)
    #[clap(short, long)]
    theme: Option<String>,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum CliMode {
    Time,
    Words,
}

impl CliMode {
    fn as_mode(&self) -> Mode {
        match self {
            CliMode::Time => Mode::Time,
            CliMode::Words => Mode::Words,
        }
    }
}

/// Overlay CLI flags on the persisted config, rejecting values outside the
/// supported sets with a proper clap error.
fn apply_cli(cli: &Cli, config: &mut Config) {
    if let Some(mode) = cli.mode {
        config.mode = mode.as_mode();
    }
    if let Some(duration) = cli.duration {
        if !DURATIONS.contains(&duration) {
            Cli::command()
                .error(
                    ErrorKind::InvalidValue,
                    format!("duration must be one of {DURATIONS:?}"),
                )
                .exit();
        }
        config.duration_secs = duration;
    }
    if let Some(words) = cli.words {
        if !WORD_COUNTS.contains(&words) {
            Cli::command()
                .error(
                    ErrorKind::InvalidValue,
                    format!("words must be one of {WORD_COUNTS:?}"),
                )
                .exit();
        }
        config.word_count = words;
    }
    if let Some(theme) = &cli.theme {
        if Theme::named(theme).is_none() {
            Cli::command()
                .error(
                    ErrorKind::InvalidValue,
                    format!("theme must be one of {:?}", Theme::preset_names()),
                )
                .exit();
        }
        config.theme = theme.clone();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Typing,
    Results,
}

pub struct App {
    pub session: Session,
    pub keyboard: InputAdapter,
    pub theme: Theme,
    pub state: AppState,
}

impl App {
    pub fn new(config: &Config, key_releases: bool) -> Self {
        let source = RandomWords::new(Language::default());
        Self {
            session: Session::new(config.options(), Box::new(source)),
            keyboard: InputAdapter::new(key_releases),
            theme: Theme::resolve(&config.theme),
            state: AppState::Typing,
        }
    }

    fn restart(&mut self) {
        self.session.restart();
        self.keyboard.clear();
        self.state = AppState::Typing;
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let mut config = store.load();
    apply_cli(&cli, &mut config);
    let _ = store.save(&config);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Key release reporting lets the on-screen keyboard drop highlights;
    // not every terminal supports it.
    let key_releases = supports_keyboard_enhancement().unwrap_or(false);
    if key_releases {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config, key_releases);
    let res = run(&mut terminal, &mut app, &store, &mut config);

    if key_releases {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    store: &FileConfigStore,
    config: &mut Config,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            AppEvent::Tick => {
                if app.session.has_started() && !app.session.has_finished() {
                    app.session.on_tick();
                    if app.session.has_finished() {
                        app.state = AppState::Results;
                    }
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::Key(key) => {
                if handle_key(app, &key, store, config) {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

/// Process one key event. Returns true when the app should quit.
fn handle_key(app: &mut App, key: &KeyEvent, store: &FileConfigStore, config: &mut Config) -> bool {
    // Releases only affect keyboard highlights.
    if key.kind == KeyEventKind::Release {
        let current = app.session.input.clone();
        app.keyboard.handle_key(key, &current);
        return false;
    }

    if key.code == KeyCode::Esc {
        return true;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match key.code {
        // Options controls; any change restarts the session.
        KeyCode::Tab => {
            let mode = match app.session.options.mode {
                Mode::Time => Mode::Words,
                Mode::Words => Mode::Time,
            };
            change_options(
                app,
                config,
                store,
                OptionsPatch {
                    mode: Some(mode),
                    ..OptionsPatch::default()
                },
            );
        }
        KeyCode::Up | KeyCode::Down => {
            let forward = key.code == KeyCode::Up;
            let patch = match app.session.options.mode {
                Mode::Time => OptionsPatch {
                    duration_secs: Some(cycle(
                        &DURATIONS,
                        app.session.options.duration_secs,
                        forward,
                    )),
                    ..OptionsPatch::default()
                },
                Mode::Words => OptionsPatch {
                    word_count: Some(cycle(
                        &WORD_COUNTS,
                        app.session.options.word_count,
                        forward,
                    )),
                    ..OptionsPatch::default()
                },
            };
            change_options(app, config, store, patch);
        }
        KeyCode::Left => {
            app.restart();
        }
        _ => match app.state {
            AppState::Typing => {
                let current = app.session.input.clone();
                if let Some(value) = app.keyboard.handle_key(key, &current) {
                    app.session.apply_input(&value);
                    if app.session.has_finished() {
                        app.state = AppState::Results;
                    }
                }
            }
            AppState::Results => {
                if key.code == KeyCode::Char('r') {
                    app.restart();
                }
            }
        },
    }

    false
}

fn change_options(
    app: &mut App,
    config: &mut Config,
    store: &FileConfigStore,
    patch: OptionsPatch,
) {
    app.session.set_options(patch);
    app.keyboard.clear();
    app.state = AppState::Typing;

    config.mode = app.session.options.mode;
    config.duration_secs = app.session.options.duration_secs;
    config.word_count = app.session.options.word_count;
    let _ = store.save(config);
}

/// Next (or previous) entry of a fixed option set, wrapping around.
fn cycle<T: Copy + PartialEq>(values: &[T], current: T, forward: bool) -> T {
    let len = values.len();
    let idx = values.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward {
        (idx + 1) % len
    } else {
        (idx + len - 1) % len
    };
    values[next]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_wraps_both_ways() {
        assert_eq!(cycle(&DURATIONS, 15, true), 30);
        assert_eq!(cycle(&DURATIONS, 120, true), 15);
        assert_eq!(cycle(&DURATIONS, 15, false), 120);
        assert_eq!(cycle(&WORD_COUNTS, 25, false), 10);
    }

    #[test]
    fn cycle_recovers_from_unknown_values() {
        // A hand-edited config can hold a value outside the set.
        assert_eq!(cycle(&DURATIONS, 99, true), 30);
    }
}
