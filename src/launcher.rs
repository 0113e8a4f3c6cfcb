// launcher.rs
//
// Starts the external history viewer without blocking the render thread.
// One worker thread per launch forks the viewer and waits for it; the launch
// guard stays set until that worker is done, so at most one viewer runs.

use std::ffi::CString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use nix::sys::wait::waitpid;
use nix::unistd::{execv, fork, ForkResult};
use tracing::{debug, warn};

use crate::cell::Grid;
use crate::error::LaunchError;

const SHELL: &str = "/bin/sh";
const WORKER_NAME: &str = "history-viewer";

/// Mouse button reported for wheel-up.
pub const SCROLL_UP_BUTTON: u32 = 4;
/// Button value the host passes for an explicit (keyboard) request.
pub const EXPLICIT_BUTTON: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    ScrollUp,
    Explicit,
    Other(u32),
}

impl Trigger {
    pub fn from_button(button: u32) -> Self {
        match button {
            SCROLL_UP_BUTTON => Trigger::ScrollUp,
            EXPLICIT_BUTTON => Trigger::Explicit,
            other => Trigger::Other(other),
        }
    }

    pub fn is_recognized(self) -> bool {
        !matches!(self, Trigger::Other(_))
    }
}

/// Native window handle of the terminal, printed as fixed-width hex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub cols: usize,
    pub rows: usize,
}

impl Geometry {
    pub fn of<G: Grid + ?Sized>(grid: &G) -> Self {
        Self {
            cols: grid.cols(),
            rows: grid.rows(),
        }
    }
}

/// The command line handed to the shell to open the viewer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewerCommand {
    pub terminal: String,
    pub geometry: Geometry,
    pub window: WindowId,
    pub viewer: String,
    pub history: PathBuf,
}

impl fmt::Display for ViewerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -g {}x{} -w {} -e {} {}",
            self.terminal,
            self.geometry.cols,
            self.geometry.rows,
            self.window,
            self.viewer,
            self.history.display()
        )
    }
}

/// Runs a viewer command to completion.
pub trait ViewerSpawner: Send + Sync + 'static {
    fn spawn_and_wait(&self, command: &ViewerCommand) -> Result<(), LaunchError>;
}

/// Forks and execs `/bin/sh -c <command>`, then waits for the child.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForkExecSpawner;

impl ViewerSpawner for ForkExecSpawner {
    fn spawn_and_wait(&self, command: &ViewerCommand) -> Result<(), LaunchError> {
        // Everything the child needs is allocated before forking.
        let shell = CString::new(SHELL)?;
        let argv = [
            shell.clone(),
            CString::new("-c")?,
            CString::new(command.to_string())?,
        ];

        match unsafe { fork() } {
            Ok(ForkResult::Child) => {
                let _ = execv(&shell, &argv);
                unsafe { libc::_exit(127) }
            }
            Ok(ForkResult::Parent { child }) => {
                debug!(pid = %child, "viewer started");
                waitpid(child, None).map_err(LaunchError::Wait)?;
                debug!(pid = %child, "viewer exited");
                Ok(())
            }
            Err(e) => Err(LaunchError::Fork(e)),
        }
    }
}

/// Single-flight flag shared between the render thread and the viewer worker.
#[derive(Debug, Clone, Default)]
pub struct LaunchGuard {
    running: Arc<AtomicBool>,
}

impl LaunchGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Set the flag unless it is already set.
    pub fn try_acquire(&self) -> Option<LaunchToken> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LaunchToken {
                running: Arc::clone(&self.running),
            })
    }
}

/// Clears the launch guard when dropped.
#[derive(Debug)]
pub struct LaunchToken {
    running: Arc<AtomicBool>,
}

impl Drop for LaunchToken {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShowOutcome {
    /// Not a history trigger, or no viewer configured.
    Ignored,
    /// Recognized, but there is no history file to show.
    Unavailable,
    /// Recognized, but a viewer is already being shown.
    Busy,
    /// Recognized, but the worker could not be started.
    Failed,
    Launched,
}

impl ShowOutcome {
    /// Whether the host should treat the event as handled.
    pub fn consumed(self) -> bool {
        self != ShowOutcome::Ignored
    }
}

pub struct ViewerLauncher<S: ViewerSpawner = ForkExecSpawner> {
    terminal: String,
    viewer: Option<String>,
    guard: LaunchGuard,
    spawner: Arc<S>,
    worker: Option<JoinHandle<()>>,
}

impl ViewerLauncher<ForkExecSpawner> {
    pub fn new(terminal: impl Into<String>, viewer: Option<String>) -> Self {
        Self::with_spawner(terminal, viewer, ForkExecSpawner)
    }
}

impl<S: ViewerSpawner> ViewerLauncher<S> {
    pub fn with_spawner(terminal: impl Into<String>, viewer: Option<String>, spawner: S) -> Self {
        Self {
            terminal: terminal.into(),
            viewer,
            guard: LaunchGuard::new(),
            spawner: Arc::new(spawner),
            worker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_running()
    }

    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Handle a history trigger. Never blocks on the viewer itself.
    pub fn request(
        &mut self,
        window: WindowId,
        trigger: Trigger,
        geometry: Geometry,
        history: Option<&Path>,
    ) -> ShowOutcome {
        if !trigger.is_recognized() {
            return ShowOutcome::Ignored;
        }
        let Some(viewer) = self.viewer.clone() else {
            return ShowOutcome::Ignored;
        };
        let Some(history) = history else {
            return ShowOutcome::Unavailable;
        };
        let Some(token) = self.guard.try_acquire() else {
            debug!("viewer already running, ignoring {:?}", trigger);
            return ShowOutcome::Busy;
        };

        // The previous worker released the guard, so it is finishing or done.
        self.reap();

        let command = ViewerCommand {
            terminal: self.terminal.clone(),
            geometry,
            window,
            viewer,
            history: history.to_path_buf(),
        };
        debug!(%command, "launching history viewer");

        let spawner = Arc::clone(&self.spawner);
        let spawned = thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .spawn(move || {
                let _token = token;
                if let Err(e) = spawner.spawn_and_wait(&command) {
                    warn!("history viewer: {}", e);
                }
            });

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                ShowOutcome::Launched
            }
            Err(e) => {
                // The closure, and with it the token, is dropped on failure.
                warn!("history viewer: {}", LaunchError::Worker(e));
                ShowOutcome::Failed
            }
        }
    }

    /// Block until the current viewer worker, if any, has finished.
    pub fn wait(&mut self) {
        self.reap();
    }

    fn reap(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("history viewer worker panicked");
            }
        }
    }
}
