//! Grouped stream output
//!
//! The byte sink is wrapped as `TabWriter -> SeparatorWriter -> TrackingWriter
//! -> sink`. The listing pipeline drives three behaviours through
//! `GroupedStreamWriter`:
//! - column widths are remembered within a group and reset between groups
//! - a blank separator line is emitted on demand before a new group
//! - the number of bytes that reached the sink is tracked

pub mod tabwriter;
pub mod writers;

pub use tabwriter::TabWriter;
pub use writers::{SeparatorWriter, TrackingWriter};

use std::io::{self, Write};

/// Writer shared by every printer of one listing
#[derive(Debug)]
pub struct GroupedStreamWriter<W: Write> {
    tab: TabWriter<SeparatorWriter<TrackingWriter<W>>>,
}

impl<W: Write> GroupedStreamWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            tab: TabWriter::new(SeparatorWriter::new(TrackingWriter::new(sink))),
        }
    }

    /// Forget remembered column widths (new group)
    pub fn reset_widths(&mut self) {
        self.tab.reset_widths();
    }

    /// Arm or disarm the blank-line separator
    pub fn set_separator_ready(&mut self, ready: bool) {
        self.tab.get_mut().set_ready(ready);
    }

    pub fn is_separator_ready(&self) -> bool {
        self.tab.get_ref().is_ready()
    }

    /// Bytes that reached the sink so far; buffered rows are not counted
    /// until flushed
    pub fn bytes_written(&self) -> u64 {
        self.tab.get_ref().get_ref().written()
    }

    /// Align output in columns (tables) or pass it through (documents)
    pub fn set_aligned(&mut self, aligned: bool) -> io::Result<()> {
        self.tab.set_aligned(aligned)
    }

    /// Flush buffered output and return the sink
    pub fn into_inner(self) -> io::Result<W> {
        Ok(self.tab.into_inner()?.into_inner().into_inner())
    }
}

impl<W: Write> Write for GroupedStreamWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.tab.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.tab.flush()
    }
}
