//! `wardbook` — terminal client for the hospital management API.
//!
//! # Usage
//!
//! ```
//! wardbook --url http://localhost:5000/api
//! wardbook --config ~/.config/wardbook/config.toml
//! wardbook register --file new-patient.toml
//! ```

mod app;
mod register;
mod ui;

use std::{
  io,
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
  },
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use wardbook_client::{
  api::{ApiClient, ApiConfig},
  session::SessionManager,
  token::{FileTokenStore, TokenStore},
};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "wardbook", about = "Terminal client for the hospital API")]
struct Args {
  /// Path to a TOML config file (url, token_file).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the API (default: http://localhost:5000/api).
  #[arg(long, env = "WARDBOOK_URL")]
  url: Option<String>,

  /// Where the token pair is persisted between runs.
  #[arg(long, env = "WARDBOOK_TOKEN_FILE")]
  token_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Validate a registration draft step by step and submit it.
  Register {
    /// TOML file with the patient draft fields.
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:        String,
  #[serde(default)]
  token_file: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let base_url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| "http://localhost:5000/api".to_string());
  let token_path = args
    .token_file
    .or_else(|| {
      (!file_cfg.token_file.is_empty())
        .then(|| PathBuf::from(&file_cfg.token_file))
    })
    .unwrap_or_else(|| {
      expand_tilde(Path::new("~/.config/wardbook/tokens.toml"))
    });

  let tokens: Arc<dyn TokenStore> =
    Arc::new(FileTokenStore::new(expand_tilde(&token_path)));
  let api = ApiClient::new(ApiConfig { base_url }, Arc::clone(&tokens))
    .context("building HTTP client")?;
  let mut session = SessionManager::new(api.clone(), tokens);

  // Restoration resolves before anything renders — the initial screen is
  // chosen from the restored state, never flashed and corrected.
  session.restore();

  match args.command {
    Some(Command::Register { file }) => {
      // Non-interactive mode logs to stderr; the TUI owns the screen and
      // stays silent instead.
      tracing_subscriber::fmt()
        .with_env_filter(
          EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy(),
        )
        .init();
      register::run(&api, &session, &file).await
    }
    None => run_tui(api, session).await,
  }
}

// ─── TUI lifecycle ────────────────────────────────────────────────────────────

async fn run_tui(
  api: ApiClient,
  session: SessionManager<ApiClient, Arc<dyn TokenStore>>,
) -> Result<()> {
  let mut app = App::new(api, session);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Load initial data, then run the event loop; restore the terminal
  // even on error.
  app.load_initial().await;
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(evt) = maybe_event {
      match evt {
        Event::Key(key) => {
          let cont = app.handle_key(key).await?;
          if !cont {
            break;
          }
        }
        Event::Resize(_, _) => {
          // Terminal will redraw on next iteration.
        }
        _ => {}
      }
    }
  }

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
