// encoder.rs
//
// Turns rendered rows into the byte stream stored in the history file:
// characters as UTF-8, optionally interleaved with SGR color changes.

use std::fmt::Write as _;
use std::io::{self, Write};

use bytes::BytesMut;

use crate::cell::{Cell, Grid};

pub const STAGING_CAPACITY: usize = 128;

/// Highest palette index that gets a color tag.
const MAX_TAGGED_COLOR: u32 = 7;

/// Fixed-capacity batch of bytes waiting to be written to the history file.
#[derive(Debug)]
pub struct StagingBuffer {
    buf: BytesMut,
    capacity: usize,
}

impl StagingBuffer {
    pub fn new() -> Self {
        Self::with_capacity(STAGING_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append `bytes`, first flushing to `sink` if they would not fit.
    pub fn push<W: Write>(&mut self, bytes: &[u8], sink: &mut W) -> io::Result<()> {
        if self.buf.len() + bytes.len() > self.capacity {
            self.flush(sink)?;
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Write everything staged. The buffer is emptied even if the write fails.
    pub fn flush<W: Write>(&mut self, sink: &mut W) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let res = sink.write_all(&self.buf);
        self.buf.clear();
        res
    }

    pub fn discard(&mut self) {
        self.buf.clear();
    }
}

impl Default for StagingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Colors of the last cell written, used to drop redundant color tags.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ColorRunState {
    last: Option<(u32, u32)>,
}

impl ColorRunState {
    pub fn same_as(&self, cell: &Cell) -> bool {
        self.last == Some((cell.fg, cell.bg))
    }

    pub fn update(&mut self, cell: &Cell) {
        self.last = Some((cell.fg, cell.bg));
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}

#[derive(Debug)]
pub struct RowEncoder {
    color: bool,
    run: ColorRunState,
    staging: StagingBuffer,
    scratch: String,
}

impl RowEncoder {
    pub fn new(color: bool) -> Self {
        Self::with_staging(color, StagingBuffer::new())
    }

    pub fn with_staging(color: bool, staging: StagingBuffer) -> Self {
        Self {
            color,
            run: ColorRunState::default(),
            staging,
            scratch: String::with_capacity(16),
        }
    }

    /// Encode row `y` of `grid` into `sink`.
    ///
    /// A cell flagged [`Attrs::WRAP`](crate::cell::Attrs::WRAP) marks the row
    /// as continuing on the next one: the column after it is skipped and no
    /// newline is written. All staged bytes are flushed before returning.
    pub fn encode_row<G, W>(&mut self, grid: &G, y: usize, sink: &mut W) -> io::Result<()>
    where
        G: Grid + ?Sized,
        W: Write,
    {
        let cols = grid.cols();
        let mut wrapped = false;
        let mut x = 0;

        while x < cols {
            let cell = grid.cell(x, y);
            self.scratch.clear();
            self.encode_cell(&cell);
            self.staging.push(self.scratch.as_bytes(), sink)?;
            self.run.update(&cell);

            if cell.wraps() {
                wrapped = true;
                x += 1;
            }
            x += 1;
        }

        if !wrapped {
            self.staging.push(b"\n", sink)?;
        }
        self.staging.flush(sink)
    }

    /// Forget staged bytes and the color run, e.g. after the file was truncated.
    pub fn reset(&mut self) {
        self.staging.discard();
        self.run.clear();
    }

    fn encode_cell(&mut self, cell: &Cell) {
        if let Some((bg, fg)) = self.color_tag(cell) {
            // Writing into a String cannot fail.
            let _ = write!(self.scratch, "\x1b[0m\x1b[{};{}m", bg, fg);
        }
        self.scratch.push(cell.ch);
    }

    fn color_tag(&self, cell: &Cell) -> Option<(u32, u32)> {
        if !self.color
            || self.run.same_as(cell)
            || cell.fg > MAX_TAGGED_COLOR
            || cell.bg > MAX_TAGGED_COLOR
        {
            return None;
        }
        let bg = if cell.is_bold() { 1 } else { 40 + cell.bg };
        Some((bg, 30 + cell.fg))
    }
}
