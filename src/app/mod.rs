//! Application state types and entry glue.
//!
//! Defines the dashboard state (tabs, listings, modals), the colour theme,
//! config file locations, and re-exports the event loop as `run`.
//!
pub mod keymap;
pub mod settings;
pub mod update;

use ratatui::style::Color;
use std::path::PathBuf;

use crate::api::{CatalogBook, LibraryUser, Role};
use crate::dispatch::{Envelope, Request, Ticket, TicketSeq};
use crate::session::{Gate, SessionStore};
use crate::workflow::{AcquisitionWorkflow, DraftBook, DraftForm};

/// Directory holding `settings.conf`, `theme.conf`, `keybinds.conf` and `session.conf`.
pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join("lending-admin");
    }
    if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(home).join(".config").join("lending-admin");
    }
    PathBuf::from(".")
}

/// Path of a config file, creating the config directory if needed.
pub fn config_file_path(name: &str) -> PathBuf {
    let dir = config_dir();
    if std::fs::create_dir_all(&dir).is_err() {
        return PathBuf::from(name);
    }
    dir.join(name)
}

/// Top-level active tab in the UI.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActiveTab {
    Books,
    Users,
}

/// Current input mode for key handling outside dialogs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    SearchBooks,
    SearchUsers,
    Modal,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub danger: Color,
    pub accent: Color,
}

impl Theme {
    /// Dark default theme.
    pub fn dark() -> Self {
        Self {
            text: Color::Gray,
            muted: Color::DarkGray,
            title: Color::Cyan,
            border: Color::Gray,
            header_bg: Color::Black,
            header_fg: Color::Cyan,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            highlight_bg: Color::Reset,
            danger: Color::Red,
            accent: Color::Green,
        }
    }

    /// Catppuccin Mocha theme defaults.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),        // overlay1
            title: Color::Rgb(0xcb, 0xa6, 0xf7),        // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            danger: Color::Rgb(0xf3, 0x8b, 0xa8),       // red
            accent: Color::Rgb(0xa6, 0xe3, 0xa1),       // green
        }
    }

    /// Load theme from a `key = value` file. Unknown or missing keys fall back to `mocha`.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut theme = Self::mocha();

        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let key = parts.next().map(|s| s.trim()).unwrap_or("");
            let val = parts.next().map(|s| s.trim()).unwrap_or("");
            if key.is_empty() || val.is_empty() {
                continue;
            }
            if let Some(color) = Self::parse_color(val) {
                match key {
                    "text" => theme.text = color,
                    "muted" => theme.muted = color,
                    "title" => theme.title = color,
                    "border" => theme.border = color,
                    "header_bg" => theme.header_bg = color,
                    "header_fg" => theme.header_fg = color,
                    "status_bg" => theme.status_bg = color,
                    "status_fg" => theme.status_fg = color,
                    "highlight_fg" => theme.highlight_fg = color,
                    "highlight_bg" => theme.highlight_bg = color,
                    "danger" => theme.danger = color,
                    "accent" => theme.accent = color,
                    _ => {}
                }
            }
        }

        Some(theme)
    }

    /// Parse a color from hex ("#RRGGBB" or "RRGGBB") or "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = lower.strip_prefix('#').unwrap_or(lower.as_str());
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Some(Color::Rgb(r, g, b));
            }
        }
        None
    }

    /// Persist the theme in `key = value` format.
    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# lending-admin theme configuration\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n\n");

        fn color_to_str(c: Color) -> String {
            match c {
                Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
                Color::Reset => "reset".to_string(),
                // named colors: best-effort hex approximation
                Color::Black => "#000000".to_string(),
                Color::Red => "#FF0000".to_string(),
                Color::Green => "#00FF00".to_string(),
                Color::Yellow => "#FFFF00".to_string(),
                Color::Blue => "#0000FF".to_string(),
                Color::Magenta => "#FF00FF".to_string(),
                Color::Cyan => "#00FFFF".to_string(),
                Color::Gray => "#B3B3B3".to_string(),
                Color::DarkGray => "#4D4D4D".to_string(),
                Color::LightRed => "#FF6666".to_string(),
                Color::LightGreen => "#66FF66".to_string(),
                Color::LightYellow => "#FFFF66".to_string(),
                Color::LightBlue => "#6666FF".to_string(),
                Color::LightMagenta => "#FF66FF".to_string(),
                Color::LightCyan => "#66FFFF".to_string(),
                Color::White => "#FFFFFF".to_string(),
                Color::Indexed(_) => "reset".to_string(),
            }
        }

        let mut kv = |k: &str, v: Color| {
            let _ = writeln!(&mut buf, "{} = {}", k, color_to_str(v));
        };

        kv("text", self.text);
        kv("muted", self.muted);
        kv("title", self.title);
        kv("border", self.border);
        kv("header_bg", self.header_bg);
        kv("header_fg", self.header_fg);
        kv("status_bg", self.status_bg);
        kv("status_fg", self.status_fg);
        kv("highlight_fg", self.highlight_fg);
        kv("highlight_bg", self.highlight_bg);
        kv("danger", self.danger);
        kv("accent", self.accent);

        std::fs::write(path, buf)
    }

    /// Load the theme file, writing a default one first if it is missing.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_else(Self::mocha);
        }
        let t = Self::mocha();
        let _ = t.write_file(path);
        t
    }
}

/// Two-button confirmation choice. Defaults to `No` so a stray Enter is harmless.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Confirm {
    Yes,
    No,
}

impl Confirm {
    pub fn toggled(self) -> Self {
        match self {
            Confirm::Yes => Confirm::No,
            Confirm::No => Confirm::Yes,
        }
    }
}

/// Modal dialogs other than the book-acquisition workflow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalState {
    ConfirmDelete {
        book_id: String,
        title: String,
        choice: Confirm,
    },
    ConfirmRoleChange {
        user_id: String,
        name: String,
        role: Role,
        choice: Confirm,
    },
    EditBook {
        book_id: String,
        stock: u32,
        form: DraftForm,
    },
    Info {
        message: String,
    },
    Help {
        scroll: u16,
    },
}

/// A server listing with its own loading flag and newest-wins ticket.
#[derive(Clone, Debug)]
pub struct Listing<T> {
    /// Everything the backend returned.
    pub all: Vec<T>,
    /// `all` after the search query.
    pub visible: Vec<T>,
    pub loading: bool,
    pub latest: Option<Ticket>,
    pub selected: usize,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self { all: Vec::new(), visible: Vec::new(), loading: false, latest: None, selected: 0 }
    }
}

impl<T: Clone> Listing<T> {
    pub fn current(&self) -> Option<&T> {
        self.visible.get(self.selected)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn clamp_selection(&mut self) {
        if self.selected >= self.visible.len() {
            self.selected = self.visible.len().saturating_sub(1);
        }
    }
}

pub struct AppState {
    pub gate: Gate,
    pub session_store: Option<SessionStore>,
    pub books: Listing<CatalogBook>,
    pub users: Listing<LibraryUser>,
    pub active_tab: ActiveTab,
    pub rows_per_page: usize,
    pub input_mode: InputMode,
    pub search_query: String,
    pub theme: Theme,
    pub keymap: keymap::Keymap,
    pub modal: Option<ModalState>,
    pub workflow: AcquisitionWorkflow,
    pub tickets: TicketSeq,
    /// Requests waiting to be handed to the dispatcher.
    pub outbox: Vec<Envelope>,
    /// Ticket of the in-flight book edit, if any.
    pub edit_pending: Option<Ticket>,
}

impl AppState {
    /// Create the dashboard for an already-resolved session gate.
    pub fn new(gate: Gate, theme: Theme, keymap: keymap::Keymap) -> Self {
        Self {
            gate,
            session_store: None,
            books: Listing::default(),
            users: Listing::default(),
            active_tab: ActiveTab::Books,
            rows_per_page: 10,
            input_mode: InputMode::Normal,
            search_query: String::new(),
            theme,
            keymap,
            modal: None,
            workflow: AcquisitionWorkflow::new(),
            tickets: TicketSeq::default(),
            outbox: Vec::new(),
            edit_pending: None,
        }
    }

    pub fn with_session_store(mut self, store: SessionStore) -> Self {
        self.session_store = Some(store);
        self
    }

    /// Queue a request and return its ticket.
    pub fn dispatch(&mut self, request: Request) -> Ticket {
        let ticket = self.tickets.issue();
        self.outbox.push(Envelope { ticket, request });
        ticket
    }

    /// Initial authorized mount: load both listings.
    pub fn mount(&mut self) {
        if self.gate.is_authorized() {
            self.refresh_books();
            self.refresh_users();
        }
    }

    pub fn refresh_books(&mut self) {
        let ticket = self.dispatch(Request::FetchBooks);
        self.books.loading = true;
        self.books.latest = Some(ticket);
    }

    pub fn refresh_users(&mut self) {
        let ticket = self.dispatch(Request::FetchUsers);
        self.users.loading = true;
        self.users.latest = Some(ticket);
    }

    pub fn open_modal(&mut self, modal: ModalState) {
        self.modal = Some(modal);
        self.input_mode = InputMode::Modal;
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.open_modal(ModalState::Info { message: message.into() });
    }

    /// Open the edit form for the selected book.
    pub fn begin_edit_selected(&mut self) {
        let Some(book) = self.books.current().cloned() else {
            return;
        };
        let draft = DraftBook {
            title: book.title,
            author: book.author,
            isbn: book.isbn.unwrap_or_default(),
            description: book.description.unwrap_or_default(),
            cover_image: book.cover_image.unwrap_or_default(),
        };
        self.open_modal(ModalState::EditBook {
            book_id: book.id,
            stock: book.stock,
            form: DraftForm::new(draft),
        });
    }

    /// Ask for confirmation before deleting the selected book.
    pub fn confirm_delete_selected(&mut self) {
        if let Some(book) = self.books.current() {
            let modal = ModalState::ConfirmDelete {
                book_id: book.id.clone(),
                title: book.title.clone(),
                choice: Confirm::No,
            };
            self.open_modal(modal);
        }
    }

    /// Ask for confirmation before flipping the selected user's role.
    pub fn confirm_role_change_selected(&mut self) {
        if let Some(user) = self.users.current() {
            let modal = ModalState::ConfirmRoleChange {
                user_id: user.id.clone(),
                name: user.name.clone(),
                role: user.role.toggled(),
                choice: Confirm::No,
            };
            self.open_modal(modal);
        }
    }

    /// Teardown: forget the session and everything loaded under it.
    pub fn logout(&mut self) {
        if let Some(store) = &self.session_store {
            if let Err(e) = store.clear() {
                tracing::warn!("could not remove session file {}: {e}", store.path().display());
            }
        }
        self.gate = Gate::LoginRequired;
        self.books.clear();
        self.users.clear();
        self.workflow.cancel();
        self.edit_pending = None;
        self.search_query.clear();
        self.close_modal();
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
