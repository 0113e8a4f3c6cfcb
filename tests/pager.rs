use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use scrollpager::cell::{Attrs, Cell, Grid, TextGrid, DEFAULT_BG, DEFAULT_FG};
use scrollpager::launcher::ViewerCommand;
use scrollpager::{HistoryConfig, LaunchError, Pager, ShowOutcome, Trigger, ViewerSpawner, WindowId};
use tempfile::TempDir;

struct Gate {
    launches: AtomicUsize,
    open: Mutex<Receiver<()>>,
}

impl ViewerSpawner for Gate {
    fn spawn_and_wait(&self, _command: &ViewerCommand) -> Result<(), LaunchError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        let _ = self.open.lock().unwrap().recv();
        Ok(())
    }
}

fn gate() -> (Gate, Sender<()>) {
    let (tx, rx) = mpsc::channel();
    let gate = Gate {
        launches: AtomicUsize::new(0),
        open: Mutex::new(rx),
    };
    (gate, tx)
}

fn config(dir: PathBuf, max_rows: usize, color: bool) -> HistoryConfig {
    HistoryConfig {
        viewer: Some("less -R".to_string()),
        color,
        max_rows,
        dir,
    }
}

struct Screen(Vec<Vec<Cell>>);

impl Grid for Screen {
    fn cols(&self) -> usize {
        self.0.first().map_or(0, Vec::len)
    }
    fn rows(&self) -> usize {
        self.0.len()
    }
    fn cell(&self, x: usize, y: usize) -> Cell {
        self.0[y][x]
    }
}

fn read(pager: &Pager<impl ViewerSpawner>) -> String {
    std::fs::read_to_string(pager.log().path().unwrap()).unwrap()
}

#[test]
fn rotation_keeps_only_rows_after_boundary() {
    let temp = TempDir::new().unwrap();
    let mut pager = Pager::with_config("st", &config(temp.path().to_path_buf(), 3, false));
    let mut grid = TextGrid::new(1, 4);

    for text in ["a", "b", "c", "d"] {
        grid.push_line(text, DEFAULT_FG, DEFAULT_BG, Attrs::NONE);
        pager.write_row(&grid, grid.rows() - 1);
    }

    assert_eq!(read(&pager), "d\n");
    assert_eq!(pager.log().rows_written(), 1);
}

#[test]
fn exact_capacity_leaves_empty_file() {
    let temp = TempDir::new().unwrap();
    for max in 1..=4 {
        let dir = temp.path().join(max.to_string());
        let mut pager = Pager::with_config("st", &config(dir, max, false));
        let mut grid = TextGrid::new(2, 1);
        for i in 0..max {
            grid.push_line(&i.to_string(), DEFAULT_FG, DEFAULT_BG, Attrs::NONE);
            pager.write_row(&grid, 0);
        }
        assert_eq!(pager.log().rows_written(), 0, "capacity {}", max);
        assert_eq!(read(&pager), "", "capacity {}", max);
    }
}

#[test]
fn colors_are_tagged_once_per_run() {
    let temp = TempDir::new().unwrap();
    let mut pager = Pager::with_config("st", &config(temp.path().to_path_buf(), 100, true));
    let red = |c| Cell::new(c, 1, 0, Attrs::NONE);
    let blue = |c| Cell::new(c, 4, 0, Attrs::NONE);
    let screen = Screen(vec![
        vec![red('r'), red('e'), red('d'), blue('b')],
        vec![blue('l'), blue('u'), blue('e'), blue('!')],
    ]);

    pager.write_row(&screen, 0);
    pager.write_row(&screen, 1);

    assert_eq!(
        read(&pager),
        "\x1b[0m\x1b[40;31mred\x1b[0m\x1b[40;34mb\nlue!\n"
    );
}

#[test]
fn colors_are_not_tagged_without_flag() {
    let temp = TempDir::new().unwrap();
    let mut pager = Pager::with_config("st", &config(temp.path().to_path_buf(), 100, false));
    let screen = Screen(vec![vec![
        Cell::new('x', 1, 2, Attrs::BOLD),
        Cell::new('y', 3, 4, Attrs::NONE),
    ]]);

    pager.write_row(&screen, 0);
    assert_eq!(read(&pager), "xy\n");
}

#[test]
fn second_show_before_exit_launches_nothing() {
    let temp = TempDir::new().unwrap();
    let (spawner, open) = gate();
    let mut pager = Pager::with_spawner("st", &config(temp.path().to_path_buf(), 100, false), spawner);
    let grid = TextGrid::new(80, 24);

    assert_eq!(pager.show(WindowId(42), Trigger::ScrollUp, &grid), ShowOutcome::Launched);
    assert!(pager.request_show(WindowId(42), Trigger::Explicit, &grid));
    assert!(pager.viewer_running());

    open.send(()).unwrap();
    pager.wait_viewer();
    assert!(!pager.viewer_running());
    assert_eq!(pager.launcher().spawner().launches.load(Ordering::SeqCst), 1);
}

#[test]
fn other_buttons_are_not_consumed() {
    let temp = TempDir::new().unwrap();
    let (spawner, _open) = gate();
    let mut pager = Pager::with_spawner("st", &config(temp.path().to_path_buf(), 100, false), spawner);
    let grid = TextGrid::new(80, 24);

    assert!(!pager.request_show(WindowId(1), Trigger::from_button(1), &grid));
    assert!(!pager.request_show(WindowId(1), Trigger::from_button(5), &grid));
    assert_eq!(pager.launcher().spawner().launches.load(Ordering::SeqCst), 0);
}

#[test]
fn unusable_directory_turns_logging_into_no_ops() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("history");
    std::fs::write(&blocker, b"").unwrap();

    let (spawner, _open) = gate();
    let mut pager = Pager::with_spawner("st", &config(blocker, 2, false), spawner);
    let mut grid = TextGrid::new(4, 2);
    grid.push_line("text", DEFAULT_FG, DEFAULT_BG, Attrs::NONE);

    for _ in 0..5 {
        pager.write_row(&grid, 1);
    }
    pager.reset();

    assert!(!pager.log().is_enabled());
    assert_eq!(pager.log().rows_written(), 0);
    assert_eq!(
        pager.show(WindowId(1), Trigger::Explicit, &grid),
        ShowOutcome::Unavailable
    );
    assert_eq!(pager.launcher().spawner().launches.load(Ordering::SeqCst), 0);
}
