//! # Tombs of the Ancient Kings
//!
//! Terminal front end. Draws with ratatui on a crossterm backend, turns key
//! and mouse events into commands and feeds them to the input handler.

use clap::Parser;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use tombs::game::save;
use tombs::{
    config, Command, GameState, GenerationConfig, InputHandler, Renderer, TombsError, TombsResult,
    UiMode,
};
#[cfg(not(feature = "dev-tools"))]
use log::{error, info, warn};
#[cfg(feature = "dev-tools")]
use tracing::{error, info, warn};

/// Command line arguments for Tombs of the Ancient Kings.
#[derive(Parser, Debug)]
#[command(name = "tombs")]
#[command(about = "A turn-based dungeon crawler with procedural floors")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON file with generation settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save file location
    #[arg(long, default_value = config::SAVE_FILE_NAME)]
    save: PathBuf,

    /// Continue the last saved game
    #[arg(long = "continue")]
    continue_game: bool,

    /// Map width override
    #[arg(long)]
    width: Option<i32>,

    /// Map height override
    #[arg(long)]
    height: Option<i32>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> TombsResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);
    info!("Starting Tombs of the Ancient Kings v{}", tombs::VERSION);

    let mut state = start_game(&args)?;
    let mut terminal = setup_terminal()?;
    let session = run_game_loop(&mut terminal, &mut state);
    let restored = restore_terminal(&mut terminal);
    finish(session.and(restored), &state, &args.save)
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) {
    #[cfg(feature = "dev-tools")]
    {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new(log_level))
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new().parse_filters(log_level).init();
    }
}

fn generation_config(args: &Args) -> TombsResult<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::from_json_file(path)?,
        None => GenerationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(width) = args.width {
        config.map_width = width;
    }
    if let Some(height) = args.height {
        config.map_height = height;
    }
    config.validate()?;
    Ok(config)
}

/// Loads the saved game if asked to, otherwise starts a new one.
fn start_game(args: &Args) -> TombsResult<GameState> {
    if args.continue_game {
        match save::load_from_file(&args.save) {
            Ok(state) => return Ok(state),
            Err(TombsError::NoSave) => println!("No saved game to load."),
            Err(error) => println!("Failed to load save: {error}"),
        }
    }
    GameState::new_game(generation_config(args)?)
}

type Tui = Terminal<CrosstermBackend<Stdout>>;

fn setup_terminal() -> TombsResult<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Tui) -> TombsResult<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Plays until the player quits. The caller saves the game.
fn run_game_loop(terminal: &mut Tui, state: &mut GameState) -> TombsResult<()> {
    let input_handler = InputHandler::new();
    let mut renderer = Renderer::new();
    let mut mode = UiMode::initial(state);

    loop {
        terminal.draw(|frame| renderer.draw(frame, state, mode))?;

        let event = event::read()?;
        let Some(command) = Command::from_event(&event) else {
            continue;
        };
        if let Command::Hover(cell) = command {
            renderer.mouse_location = state.map.in_bounds(cell).then_some(cell);
        }
        match input_handler.dispatch(mode, command, state) {
            Some(next) => mode = next,
            None => break,
        }
    }

    info!("Player quit");
    Ok(())
}

/// Saves or clears the game however the session ended.
///
/// A failed session still saves; its error is reported ahead of any save
/// error.
fn finish(session: TombsResult<()>, state: &GameState, save_path: &Path) -> TombsResult<()> {
    let saved = quit(state, save_path);
    if let Err(err) = &session {
        error!("Session ended with an error: {err}");
    }
    session.and(saved)
}

/// Saves a living game; a dead player's save is deleted instead.
fn quit(state: &GameState, save_path: &Path) -> TombsResult<()> {
    if state.is_player_alive() {
        save::save_to_file(state, save_path)
    } else {
        warn!("Player is dead, removing save");
        save::delete_save(save_path)
    }
}
