//! Authenticated-session context and the dashboard access gate.
//!
//! The session is an explicit value handed to the app at start-up. It is
//! read from the command line or from `session.conf`, checked by
//! [`Gate::resolve`], and torn down by [`SessionStore::clear`] on logout.
//!
use std::path::{Path, PathBuf};
use tracing::info;

use crate::api::Role;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    /// `None` when the stored role is missing or unrecognized.
    pub role: Option<Role>,
    pub token: Option<String>,
}

impl Session {
    /// Build a session from raw values; `None` without a usable user id.
    pub fn from_parts(user_id: &str, role: Option<&str>, token: Option<&str>) -> Option<Self> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return None;
        }
        Some(Self {
            user_id: user_id.to_string(),
            role: role.and_then(Role::parse),
            token: token.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string),
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

/// Outcome of validating the session for dashboard access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Gate {
    /// No session at all: the admin must log in first.
    LoginRequired,
    /// Logged in, but not as an administrator.
    AccessDenied(Session),
    Authorized(Session),
}

impl Gate {
    pub fn resolve(session: Option<Session>) -> Self {
        match session {
            None => Gate::LoginRequired,
            Some(s) if s.is_admin() => Gate::Authorized(s),
            Some(s) => Gate::AccessDenied(s),
        }
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self, Gate::Authorized(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Gate::LoginRequired => None,
            Gate::AccessDenied(s) | Gate::Authorized(s) => Some(s),
        }
    }
}

/// Persisted session in `key = value` form.
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session, if the file exists and names a user.
    pub fn load(&self) -> Option<Session> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        let mut user_id = "";
        let mut role = None;
        let mut token = None;
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let key = parts.next().map(|s| s.trim()).unwrap_or("");
            let val = parts.next().map(|s| s.trim()).unwrap_or("");
            match key {
                "user_id" => user_id = val,
                "role" => role = Some(val),
                "token" => token = Some(val),
                _ => {}
            }
        }
        Session::from_parts(user_id, role, token)
    }

    pub fn save(&self, session: &Session) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# lending-admin session\n");
        let _ = writeln!(&mut buf, "user_id = {}", session.user_id);
        if let Some(role) = session.role {
            let _ = writeln!(&mut buf, "role = {}", role.as_str());
        }
        if let Some(token) = &session.token {
            let _ = writeln!(&mut buf, "token = {}", token);
        }
        std::fs::write(&self.path, buf)?;
        info!("session for '{}' saved", session.user_id);
        Ok(())
    }

    /// Logout: forget the stored session. A missing file is already logged out.
    pub fn clear(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
