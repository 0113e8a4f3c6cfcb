//! Scrollback history for terminal emulators.
//!
//! Rendered rows are appended to a per-process log file that is rotated once
//! it holds a configured number of rows. On request, an external viewer is
//! started in a new terminal window to page through that file.

pub mod cell;
pub mod config;
pub mod encoder;
pub mod error;
pub mod history;
pub mod launcher;
pub mod pager;

pub use cell::{Attrs, Cell, Grid, TextGrid};
pub use config::HistoryConfig;
pub use error::{HistoryError, LaunchError};
pub use history::HistoryLog;
pub use launcher::{ShowOutcome, Trigger, ViewerLauncher, ViewerSpawner, WindowId};
pub use pager::Pager;
