// repl.rs

use anyhow::Context as _;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config, Editor};

use scrollpager::cell::{Attrs, TextGrid, DEFAULT_BG, DEFAULT_FG};
use scrollpager::{Grid, Pager, ShowOutcome, Trigger, WindowId};

use crate::completion::CommandCompleter;

const COLS: usize = 80;
const ROWS: usize = 24;

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Show,
    Reset,
    Fg(u32),
    Bg(u32),
    Bold,
    Status,
    Quit,
    Text(String),
    Invalid(String),
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if !trimmed.starts_with(':') {
        return Command::Text(line.to_string());
    }
    let mut parts = trimmed.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();
    match (name, arg) {
        (":show", None) => Command::Show,
        (":reset", None) => Command::Reset,
        (":bold", None) => Command::Bold,
        (":status", None) => Command::Status,
        (":quit", None) => Command::Quit,
        (":fg", Some(n)) => parse_color(n).map(Command::Fg).unwrap_or_else(|| invalid(trimmed)),
        (":bg", Some(n)) => parse_color(n).map(Command::Bg).unwrap_or_else(|| invalid(trimmed)),
        _ => invalid(trimmed),
    }
}

fn parse_color(arg: &str) -> Option<u32> {
    arg.parse::<u32>().ok().filter(|n| *n <= 7)
}

fn invalid(line: &str) -> Command {
    Command::Invalid(line.to_string())
}

/// A toy line-mode terminal: typed lines are rendered into a screen and every
/// rendered row goes into the scrollback history.
pub struct Host {
    pager: Pager,
    grid: TextGrid,
    window: WindowId,
    fg: u32,
    bg: u32,
    attrs: Attrs,
}

impl Host {
    pub fn new(pager: Pager, window: WindowId) -> Self {
        Self {
            pager,
            grid: TextGrid::new(COLS, ROWS),
            window,
            fg: DEFAULT_FG,
            bg: DEFAULT_BG,
            attrs: Attrs::NONE,
        }
    }

    /// Returns false when the host should exit.
    pub fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Text(text) => self.render(&text),
            Command::Show => match self.pager.show(self.window, Trigger::Explicit, &self.grid) {
                ShowOutcome::Launched => println!("opening history viewer"),
                ShowOutcome::Busy => println!("history viewer is already open"),
                ShowOutcome::Unavailable | ShowOutcome::Failed => println!("history is not available"),
                ShowOutcome::Ignored => println!("no history viewer configured"),
            },
            Command::Reset => {
                self.pager.reset();
                self.fg = DEFAULT_FG;
                self.bg = DEFAULT_BG;
                self.attrs = Attrs::NONE;
            }
            Command::Fg(n) => self.fg = n,
            Command::Bg(n) => self.bg = n,
            Command::Bold => self.attrs.insert(Attrs::BOLD),
            Command::Status => self.status(),
            Command::Quit => return false,
            Command::Invalid(line) => println!("{}: unknown command", line),
        }
        true
    }

    fn render(&mut self, text: &str) {
        let produced = self.grid.push_line(text, self.fg, self.bg, self.attrs);
        let rows = self.grid.rows();
        for y in rows - produced..rows {
            self.pager.write_row(&self.grid, y);
        }
    }

    fn status(&self) {
        let log = self.pager.log();
        match log.path() {
            Some(path) if log.is_enabled() => println!(
                "{}: {}/{} rows{}",
                path.display(),
                log.rows_written(),
                log.max_rows(),
                if self.pager.viewer_running() { ", viewer open" } else { "" }
            ),
            _ => println!("history disabled"),
        }
    }

    pub fn finish(mut self) {
        self.pager.wait_viewer();
    }
}

fn window_from_env() -> WindowId {
    std::env::var("WINDOWID")
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .map(WindowId)
        .unwrap_or_default()
}

pub fn start_repl(terminal: &str) -> anyhow::Result<()> {
    let pager = Pager::initialize(terminal);
    let mut host = Host::new(pager, window_from_env());

    let config = Config::builder().completion_type(CompletionType::List).build();
    let mut rl: Editor<CommandCompleter, DefaultHistory> =
        Editor::with_config(config).context("failed to create line editor")?;
    rl.set_helper(Some(CommandCompleter::new()));

    loop {
        match rl.readline("$ ") {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                if !host.handle(parse_command(&line)) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err).context("failed to read input"),
        }
    }
    host.finish();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command(":show"), Command::Show);
        assert_eq!(parse_command("  :quit "), Command::Quit);
        assert_eq!(parse_command(":fg 3"), Command::Fg(3));
        assert_eq!(parse_command(":bg 0"), Command::Bg(0));
    }

    #[test]
    fn text_is_kept_verbatim() {
        assert_eq!(parse_command("  ls -l"), Command::Text("  ls -l".to_string()));
    }

    #[test]
    fn rejects_bad_commands() {
        assert_eq!(parse_command(":fg 9"), Command::Invalid(":fg 9".to_string()));
        assert_eq!(parse_command(":show now"), Command::Invalid(":show now".to_string()));
        assert_eq!(parse_command(":nope"), Command::Invalid(":nope".to_string()));
    }
}
