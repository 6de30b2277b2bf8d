//! Keybinding configuration: parse `keybinds.conf`, provide defaults, and map keys to actions.
//!
//! Only the dashboard (no dialog open) goes through the keymap. Dialogs use
//! fixed keys: Tab/arrows to move, Enter to activate, Esc to close.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Semantic keyboard actions that can be bound to key combinations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Exit the application.
    Quit,
    /// Switch between the Books and Users tabs.
    SwitchTab,
    /// Start filtering the active tab.
    StartSearch,
    /// Open the add-book dialog.
    AddBook,
    /// Edit the selected book.
    EditBook,
    /// Delete the selected book (after confirmation).
    DeleteBook,
    /// Flip the selected user's role (after confirmation).
    ToggleRole,
    /// Context action: edit on Books, role change on Users.
    EnterAction,
    /// Re-fetch the active listing.
    Refresh,
    OpenHelp,
    /// Clear the session.
    Logout,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    Ignore,
}

const ACTIONS: [(&str, KeyAction); 16] = [
    ("Quit", KeyAction::Quit),
    ("SwitchTab", KeyAction::SwitchTab),
    ("StartSearch", KeyAction::StartSearch),
    ("AddBook", KeyAction::AddBook),
    ("EditBook", KeyAction::EditBook),
    ("DeleteBook", KeyAction::DeleteBook),
    ("ToggleRole", KeyAction::ToggleRole),
    ("EnterAction", KeyAction::EnterAction),
    ("Refresh", KeyAction::Refresh),
    ("OpenHelp", KeyAction::OpenHelp),
    ("Logout", KeyAction::Logout),
    ("MoveUp", KeyAction::MoveUp),
    ("MoveDown", KeyAction::MoveDown),
    ("PageUp", KeyAction::PageUp),
    ("PageDown", KeyAction::PageDown),
    ("Ignore", KeyAction::Ignore),
];

/// Mapping from `(KeyModifiers, KeyCode)` to [`KeyAction`].
#[derive(Clone, Debug)]
pub struct Keymap {
    bindings: HashMap<(KeyModifiers, KeyCode), KeyAction>,
}

impl Keymap {
    /// Default keybindings: arrows and vim keys to move, mnemonic letters for actions.
    pub fn new_defaults() -> Self {
        use KeyCode::*;
        use KeyModifiers as M;
        let mut bindings = HashMap::new();
        bindings.insert((M::NONE, Char('q')), KeyAction::Quit);
        bindings.insert((M::NONE, Esc), KeyAction::Ignore);
        bindings.insert((M::NONE, Tab), KeyAction::SwitchTab);
        bindings.insert((M::NONE, Char('/')), KeyAction::StartSearch);
        bindings.insert((M::NONE, Char('n')), KeyAction::AddBook);
        bindings.insert((M::NONE, Char('e')), KeyAction::EditBook);
        bindings.insert((M::NONE, Char('d')), KeyAction::DeleteBook);
        bindings.insert((M::NONE, Delete), KeyAction::DeleteBook);
        bindings.insert((M::NONE, Char('r')), KeyAction::ToggleRole);
        bindings.insert((M::NONE, Enter), KeyAction::EnterAction);
        bindings.insert((M::CONTROL, Char('r')), KeyAction::Refresh);
        bindings.insert((M::NONE, Char('?')), KeyAction::OpenHelp);
        // Shift+L arrives with or without the SHIFT flag depending on the terminal
        bindings.insert((M::SHIFT, Char('L')), KeyAction::Logout);
        bindings.insert((M::NONE, Char('L')), KeyAction::Logout);

        bindings.insert((M::NONE, Up), KeyAction::MoveUp);
        bindings.insert((M::NONE, Down), KeyAction::MoveDown);
        bindings.insert((M::NONE, Char('k')), KeyAction::MoveUp);
        bindings.insert((M::NONE, Char('j')), KeyAction::MoveDown);
        bindings.insert((M::NONE, PageUp), KeyAction::PageUp);
        bindings.insert((M::NONE, PageDown), KeyAction::PageDown);
        bindings.insert((M::NONE, Left), KeyAction::PageUp);
        bindings.insert((M::NONE, Right), KeyAction::PageDown);

        Self { bindings }
    }

    /// Load a keymap from `path`, or write the defaults there when it does not exist.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        let km = Self::default();
        let _ = km.write_file(path);
        km
    }

    /// Load `<Action> = <KeySpec>` lines on top of the defaults.
    ///
    /// Returns `None` when the file cannot be read. Lines that do not parse are skipped.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut map = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let lhs = parts.next().map(|s| s.trim()).unwrap_or("");
            let rhs = parts.next().map(|s| s.trim()).unwrap_or("");
            if let (Some(action), Some(key)) = (parse_action(lhs), parse_key(rhs)) {
                map.bindings.insert(key, action);
            }
        }
        Some(map)
    }

    /// Write the current bindings, sorted by action then key, with a header explaining the format.
    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# lending-admin keybindings\n");
        buf.push_str("# Format: <Action> = <KeySpec>\n");
        buf.push_str("# KeySpec examples: q, Ctrl+r, Enter, Esc, Tab, Up, Down, Left, Right, PageUp, PageDown, Delete, /, ?\n");
        let names: Vec<&str> = ACTIONS.iter().map(|(n, _)| *n).collect();
        let _ = writeln!(&mut buf, "# Actions: {}\n", names.join(", "));

        let mut lines: Vec<String> = self
            .bindings
            .iter()
            .filter(|((mods, _), _)| !mods.contains(KeyModifiers::SHIFT))
            .map(|((mods, code), action)| {
                format!("{} = {}", format_action(*action), Self::format_key(*mods, *code))
            })
            .collect();
        lines.sort();
        for line in lines {
            let _ = writeln!(&mut buf, "{line}");
        }
        std::fs::write(path, buf)
    }

    /// Resolve a key event to its action, if bound.
    pub fn resolve(&self, key: &KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&(key.modifiers, key.code)).copied()
    }

    /// Snapshot of all bindings as ((modifiers, code), action) pairs.
    pub fn all_bindings(&self) -> Vec<((KeyModifiers, KeyCode), KeyAction)> {
        self.bindings.iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Keys bound to `action`, formatted for display and sorted.
    pub fn keys_for(&self, action: KeyAction) -> Vec<String> {
        let mut keys: Vec<String> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .filter(|((mods, _), _)| !mods.contains(KeyModifiers::SHIFT))
            .map(|((mods, code), _)| Self::format_key(*mods, *code))
            .collect();
        keys.sort();
        keys
    }

    /// Format a key like "Ctrl+r" or "PageUp".
    pub fn format_key(mods: KeyModifiers, code: KeyCode) -> String {
        use KeyCode::*;
        let base = match code {
            Enter => "Enter".to_string(),
            Delete => "Delete".to_string(),
            Esc => "Esc".to_string(),
            Tab => "Tab".to_string(),
            BackTab => "BackTab".to_string(),
            Up => "Up".to_string(),
            Down => "Down".to_string(),
            Left => "Left".to_string(),
            Right => "Right".to_string(),
            PageUp => "PageUp".to_string(),
            PageDown => "PageDown".to_string(),
            F(n) => format!("F{n}"),
            Char(c) => c.to_string(),
            _ => format!("{:?}", code),
        };
        if mods.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{}", base)
        } else {
            base
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new_defaults()
    }
}

fn parse_key(spec: &str) -> Option<(KeyModifiers, KeyCode)> {
    use KeyCode::*;
    let s = spec.trim();
    let (mods, rest) = match s.strip_prefix("Ctrl+") {
        Some(after) => (KeyModifiers::CONTROL, after),
        None => (KeyModifiers::NONE, s),
    };
    let code = match rest {
        "Enter" => Enter,
        "Delete" => Delete,
        "Esc" | "Escape" => Esc,
        "Tab" => Tab,
        "BackTab" => BackTab,
        "Up" => Up,
        "Down" => Down,
        "Left" => Left,
        "Right" => Right,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        _ => {
            if let Some(n) = rest.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
                F(n)
            } else {
                let mut chars = rest.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Char(c),
                    _ => return None,
                }
            }
        }
    };
    Some((mods, code))
}

fn parse_action(s: &str) -> Option<KeyAction> {
    let s = s.trim();
    ACTIONS.iter().find(|(name, _)| *name == s).map(|(_, a)| *a)
}

pub fn format_action(a: KeyAction) -> &'static str {
    ACTIONS
        .iter()
        .find(|(_, action)| *action == a)
        .map(|(name, _)| *name)
        .unwrap_or("Ignore")
}
