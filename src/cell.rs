// cell.rs

use std::collections::VecDeque;
use std::ops::BitOr;

/// Color slots the host uses for "default foreground/background". They lie
/// outside the 8-color palette, so cells using them are never color tagged.
pub const DEFAULT_FG: u32 = 256;
pub const DEFAULT_BG: u32 = 257;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Attrs(u16);

impl Attrs {
    pub const NONE: Attrs = Attrs(0);
    pub const BOLD: Attrs = Attrs(1 << 0);
    /// The row continues on the next line.
    pub const WRAP: Attrs = Attrs(1 << 8);

    pub fn contains(self, other: Attrs) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Attrs) {
        self.0 |= other.0;
    }
}

impl BitOr for Attrs {
    type Output = Attrs;

    fn bitor(self, rhs: Attrs) -> Attrs {
        Attrs(self.0 | rhs.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: u32,
    pub bg: u32,
    pub attrs: Attrs,
}

impl Cell {
    pub fn new(ch: char, fg: u32, bg: u32, attrs: Attrs) -> Self {
        Self { ch, fg, bg, attrs }
    }

    /// A cell in the host's default colors.
    pub fn plain(ch: char) -> Self {
        Self::new(ch, DEFAULT_FG, DEFAULT_BG, Attrs::NONE)
    }

    pub fn blank() -> Self {
        Self::plain(' ')
    }

    pub fn is_bold(&self) -> bool {
        self.attrs.contains(Attrs::BOLD)
    }

    pub fn wraps(&self) -> bool {
        self.attrs.contains(Attrs::WRAP)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank()
    }
}

/// Read access to the host terminal's rendered screen.
pub trait Grid {
    fn cols(&self) -> usize;
    fn rows(&self) -> usize;
    fn cell(&self, x: usize, y: usize) -> Cell;
}

/// A fixed-size screen that scrolls up as lines are pushed at the bottom.
///
/// Lines wider than the screen are split across rows, and every row but the
/// last carries [`Attrs::WRAP`] on its final cell.
#[derive(Debug, Clone)]
pub struct TextGrid {
    cols: usize,
    lines: VecDeque<Vec<Cell>>,
}

impl TextGrid {
    pub fn new(cols: usize, rows: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        let lines = (0..rows).map(|_| vec![Cell::blank(); cols]).collect();
        Self { cols, lines }
    }

    /// Render `text` at the bottom of the screen, scrolling as needed.
    /// Returns how many rows were produced; they occupy the last rows of the grid.
    pub fn push_line(&mut self, text: &str, fg: u32, bg: u32, attrs: Attrs) -> usize {
        let chars: Vec<char> = text.chars().collect();
        let chunks: Vec<&[char]> = if chars.is_empty() {
            vec![&chars[..]]
        } else {
            chars.chunks(self.cols).collect()
        };
        let count = chunks.len();
        for (i, chunk) in chunks.into_iter().enumerate() {
            let mut row: Vec<Cell> = chunk.iter().map(|&c| Cell::new(c, fg, bg, attrs)).collect();
            row.resize(self.cols, Cell::blank());
            if i + 1 < count {
                if let Some(last) = row.last_mut() {
                    last.attrs.insert(Attrs::WRAP);
                }
            }
            self.scroll_in(row);
        }
        count.min(self.lines.len())
    }

    fn scroll_in(&mut self, row: Vec<Cell>) {
        self.lines.pop_front();
        self.lines.push_back(row);
    }
}

impl Grid for TextGrid {
    fn cols(&self) -> usize {
        self.cols
    }

    fn rows(&self) -> usize {
        self.lines.len()
    }

    fn cell(&self, x: usize, y: usize) -> Cell {
        self.lines
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or_default()
    }
}
