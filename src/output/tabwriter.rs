//! Elastic tab alignment with width memory
//!
//! Buffers tab-separated lines and aligns them on flush. Every tab-terminated
//! cell is padded to its column width, `max(min_width, widest cell + padding)`,
//! measured in terminal columns;
//! the last cell of a line is written as is. Column widths are remembered
//! across flushes so later rows of a group line up with earlier ones, until
//! `reset_widths` is called.

use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

pub const DEFAULT_MIN_WIDTH: usize = 6;
pub const DEFAULT_PADDING: usize = 3;

#[derive(Debug)]
pub struct TabWriter<W: Write> {
    inner: W,
    buf: Vec<u8>,
    widths: Vec<usize>,
    min_width: usize,
    padding: usize,
    aligned: bool,
}

impl<W: Write> TabWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_layout(inner, DEFAULT_MIN_WIDTH, DEFAULT_PADDING)
    }

    pub fn with_layout(inner: W, min_width: usize, padding: usize) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            widths: Vec::new(),
            min_width,
            padding,
            aligned: true,
        }
    }

    /// Forget remembered column widths
    pub fn reset_widths(&mut self) {
        self.widths.clear();
    }

    /// Switch between aligned (buffered) and pass-through output
    ///
    /// Buffered lines are written out before switching.
    pub fn set_aligned(&mut self, aligned: bool) -> io::Result<()> {
        if self.aligned != aligned {
            self.flush_buffered()?;
            self.aligned = aligned;
        }
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn into_inner(mut self) -> io::Result<W> {
        self.flush_buffered()?;
        Ok(self.inner)
    }

    fn flush_buffered(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let buffered = std::mem::take(&mut self.buf);
        let text = String::from_utf8_lossy(&buffered);

        let lines: Vec<(Vec<&str>, bool)> = text
            .split_inclusive('\n')
            .map(|line| match line.strip_suffix('\n') {
                Some(content) => (content.split('\t').collect(), true),
                None => (line.split('\t').collect(), false),
            })
            .collect();

        for (cells, _) in &lines {
            let aligned_cells = cells.len().saturating_sub(1);
            if self.widths.len() < aligned_cells {
                self.widths.resize(aligned_cells, 0);
            }
            for (column, cell) in cells.iter().take(aligned_cells).enumerate() {
                let width = (cell.width() + self.padding).max(self.min_width);
                if width > self.widths[column] {
                    self.widths[column] = width;
                }
            }
        }

        let mut out = String::with_capacity(buffered.len() * 2);
        for (cells, terminated) in &lines {
            let last = cells.len().saturating_sub(1);
            for (column, cell) in cells.iter().enumerate() {
                out.push_str(cell);
                if column < last {
                    let pad = self.widths[column].saturating_sub(cell.width());
                    out.extend(std::iter::repeat_n(' ', pad));
                }
            }
            if *terminated {
                out.push('\n');
            }
        }
        self.inner.write_all(out.as_bytes())
    }
}

impl<W: Write> Write for TabWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.aligned {
            return self.inner.write(buf);
        }
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_buffered()?;
        self.inner.flush()
    }
}
