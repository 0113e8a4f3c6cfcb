// pager.rs

use crate::cell::Grid;
use crate::config::HistoryConfig;
use crate::history::HistoryLog;
use crate::launcher::{
    ForkExecSpawner, Geometry, ShowOutcome, Trigger, ViewerLauncher, ViewerSpawner, WindowId,
};

/// Scrollback history for one terminal: the rotating log plus the viewer
/// launcher. Row writes and resets are expected on the render thread.
pub struct Pager<S: ViewerSpawner = ForkExecSpawner> {
    log: HistoryLog,
    launcher: ViewerLauncher<S>,
}

impl Pager<ForkExecSpawner> {
    /// Set up history for the terminal program `program` from the
    /// `ST_HISTORY_*` environment, which is cleared afterwards.
    pub fn initialize(program: &str) -> Self {
        Self::with_config(program, &HistoryConfig::from_env())
    }

    pub fn with_config(program: &str, config: &HistoryConfig) -> Self {
        Self::with_spawner(program, config, ForkExecSpawner)
    }
}

impl<S: ViewerSpawner> Pager<S> {
    pub fn with_spawner(program: &str, config: &HistoryConfig, spawner: S) -> Self {
        Self {
            log: HistoryLog::open(config, program),
            launcher: ViewerLauncher::with_spawner(program, config.viewer.clone(), spawner),
        }
    }

    pub fn write_row<G: Grid + ?Sized>(&mut self, grid: &G, y: usize) {
        self.log.write_row(grid, y);
    }

    pub fn reset(&mut self) {
        self.log.reset();
    }

    /// Returns whether the event was a history trigger.
    pub fn request_show<G: Grid + ?Sized>(&mut self, window: WindowId, trigger: Trigger, grid: &G) -> bool {
        self.show(window, trigger, grid).consumed()
    }

    pub fn show<G: Grid + ?Sized>(&mut self, window: WindowId, trigger: Trigger, grid: &G) -> ShowOutcome {
        self.launcher
            .request(window, trigger, Geometry::of(grid), self.log.path())
    }

    pub fn log(&self) -> &HistoryLog {
        &self.log
    }

    pub fn launcher(&self) -> &ViewerLauncher<S> {
        &self.launcher
    }

    pub fn viewer_running(&self) -> bool {
        self.launcher.is_running()
    }

    /// Wait for a running viewer to exit.
    pub fn wait_viewer(&mut self) {
        self.launcher.wait();
    }
}
