//! lending-admin binary entry point.
//!
//! Parses flags, loads config files, resolves the session, initializes the
//! terminal in raw mode, runs the TUI event loop, and restores the terminal
//! state on exit.
//!
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use lending_admin::api::http::HttpCatalog;
use lending_admin::app::keymap::Keymap;
use lending_admin::app::settings::Settings;
use lending_admin::app::{self, AppState, Theme, config_file_path};
use lending_admin::dispatch::Worker;
use lending_admin::session::{Gate, Session, SessionStore};

#[derive(Parser, Debug)]
#[command(name = "lending-admin")]
#[command(author, version, about = "Terminal admin dashboard for a community book-lending backend", long_about = None)]
struct Cli {
    /// Base URL of the lending backend (overrides settings.conf)
    #[arg(long, env = "LENDING_ADMIN_URL")]
    base_url: Option<String>,

    /// Per-request timeout in seconds (overrides settings.conf)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Signed-in user id; saved to session.conf
    #[arg(long, env = "LENDING_ADMIN_USER_ID")]
    user_id: Option<String>,

    /// Role of the signed-in user (ADMIN or USER)
    #[arg(long, env = "LENDING_ADMIN_ROLE")]
    role: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, env = "LENDING_ADMIN_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Where to write the log (overrides settings.conf)
    #[arg(long)]
    log_file: Option<String>,
}

fn path_str(name: &str) -> String {
    config_file_path(name).to_string_lossy().to_string()
}

/// Send tracing output to a file; the terminal belongs to the TUI.
fn init_logging(path: &str) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {path}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lending_admin=info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// Flags win over the stored session; a session given by flags is remembered.
fn resolve_session(cli: &Cli, store: &SessionStore) -> Option<Session> {
    let Some(user_id) = cli.user_id.as_deref() else {
        return store.load();
    };
    let session = Session::from_parts(user_id, cli.role.as_deref(), cli.token.as_deref())?;
    if let Err(e) = store.save(&session) {
        warn!("could not save session to {}: {e}", store.path().display());
    }
    Some(session)
}

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load_or_init(&path_str("settings.conf"));
    if let Some(url) = &cli.base_url {
        settings.base_url = url.clone();
    }
    if let Some(secs) = cli.timeout_secs.filter(|s| *s > 0) {
        settings.timeout_secs = secs;
    }
    if let Some(log_file) = &cli.log_file {
        settings.log_file = log_file.clone();
    }
    init_logging(&settings.log_file)?;
    info!("starting lending-admin v{} against {}", env!("CARGO_PKG_VERSION"), settings.base_url);

    let store = SessionStore::new(config_file_path("session.conf"));
    let session = resolve_session(&cli, &store);
    let token = session.as_ref().and_then(|s| s.token.clone());
    let gate = Gate::resolve(session);

    let theme = Theme::load_or_init(&path_str("theme.conf"));
    let keymap = Keymap::load_or_init(&path_str("keybinds.conf"));

    let catalog = HttpCatalog::new(&settings.base_url, settings.timeout(), token)
        .context("configure backend client")?;
    let worker = Worker::new(Arc::new(catalog));
    let mut state = AppState::new(gate, theme, keymap).with_session_store(store);

    let mut terminal = init_terminal().context("init terminal")?;
    let res = app::run(&mut terminal, &mut state, &worker);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        warn!("application error: {err:#}");
        eprintln!("application error: {err:#}");
    }
    info!("lending-admin stopped");
    Ok(())
}
