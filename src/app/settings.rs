//! Connection settings: parse/write `settings.conf`.
//!
//! Holds where the lending backend lives and how long to wait for it.
//! Command-line flags override whatever the file says.

/// Settings persisted in `settings.conf`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Base URL of the lending backend; API paths are resolved below it.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// File receiving the tracing output (the terminal belongs to the TUI).
    pub log_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: 15,
            log_file: "lending-admin.log".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, writing defaults there first if it is missing.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        let cfg = Self::default();
        let _ = cfg.write_file(path);
        cfg
    }

    /// Parse a `key = value` file; unknown keys and bad values keep defaults.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut cfg = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let lhs = parts.next().map(|s| s.trim()).unwrap_or("");
            let rhs = parts.next().map(|s| s.trim()).unwrap_or("");
            if lhs.is_empty() || rhs.is_empty() {
                continue;
            }
            match lhs {
                "base_url" => cfg.base_url = rhs.to_string(),
                "timeout_secs" => {
                    if let Ok(secs) = rhs.parse::<u64>() {
                        if secs > 0 {
                            cfg.timeout_secs = secs;
                        }
                    }
                }
                "log_file" => cfg.log_file = rhs.to_string(),
                _ => {}
            }
        }
        Some(cfg)
    }

    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# lending-admin settings\n");
        buf.push_str("# base_url: where the lending backend is served\n");
        let _ = writeln!(&mut buf, "base_url = {}", self.base_url);
        buf.push_str("# timeout_secs: per-request timeout\n");
        let _ = writeln!(&mut buf, "timeout_secs = {}", self.timeout_secs);
        let _ = writeln!(&mut buf, "log_file = {}", self.log_file);
        std::fs::write(path, buf)
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}
