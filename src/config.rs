// config.rs

use std::env;
use std::path::PathBuf;

pub const PAGER_VAR: &str = "ST_HISTORY_PAGER";
pub const COLOR_VAR: &str = "ST_HISTORY_COLOR";
pub const LINES_VAR: &str = "ST_HISTORY_LINES";
pub const PATH_VAR: &str = "ST_HISTORY_PATH";

pub const DEFAULT_PAGER: &str = "less +G -e -R";
pub const DEFAULT_MAX_ROWS: usize = 1000;
pub const DEFAULT_DIR: &str = "/tmp/st";

/// History settings, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Viewer command; `None` disables history review.
    pub viewer: Option<String>,
    /// Emit color escapes into the log.
    pub color: bool,
    /// Rows kept before the log is rotated.
    pub max_rows: usize,
    pub dir: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            viewer: Some(DEFAULT_PAGER.to_string()),
            color: false,
            max_rows: DEFAULT_MAX_ROWS,
            dir: PathBuf::from(DEFAULT_DIR),
        }
    }
}

impl HistoryConfig {
    /// Read the `ST_HISTORY_*` overrides and remove them from the environment
    /// so they are not inherited by the viewer.
    pub fn from_env() -> Self {
        let config = Self::from_lookup(|name| env::var(name).ok());
        for name in [PAGER_VAR, COLOR_VAR, LINES_VAR, PATH_VAR] {
            env::remove_var(name);
        }
        config
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let viewer = match lookup(PAGER_VAR) {
            Some(cmd) if cmd.trim().is_empty() => None,
            Some(cmd) => Some(cmd),
            None => Some(DEFAULT_PAGER.to_string()),
        };
        let max_rows = lookup(LINES_VAR)
            .map(|v| parse_max_rows(&v))
            .unwrap_or(DEFAULT_MAX_ROWS);
        let dir = lookup(PATH_VAR)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR));

        Self {
            viewer,
            color: lookup(COLOR_VAR).is_some(),
            max_rows,
            dir,
        }
    }
}

// Zero, negative and garbage all mean "use the default".
fn parse_max_rows(value: &str) -> usize {
    match value.trim().parse::<i64>() {
        Ok(n) if n > 0 => usize::try_from(n).unwrap_or(DEFAULT_MAX_ROWS),
        _ => DEFAULT_MAX_ROWS,
    }
}
