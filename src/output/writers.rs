//! Byte-tracking and separator writers

use std::io::{self, Write};

/// Counts bytes that reached the inner writer
#[derive(Debug)]
pub struct TrackingWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> TrackingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for TrackingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Emits one blank line before the next non-empty write when ready
#[derive(Debug)]
pub struct SeparatorWriter<W> {
    inner: W,
    ready: bool,
}

impl<W: Write> SeparatorWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            ready: false,
        }
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for SeparatorWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.ready && !buf.is_empty() {
            self.inner.write_all(b"\n")?;
            self.ready = false;
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_counts_bytes() {
        let mut writer = TrackingWriter::new(Vec::new());
        writer.write_all(b"hello").unwrap();
        writer.write_all(b"").unwrap();
        assert_eq!(writer.written(), 5);
    }

    #[test]
    fn test_separator_fires_once_on_non_empty_write() {
        let mut writer = SeparatorWriter::new(Vec::new());
        writer.write_all(b"a\n").unwrap();
        writer.set_ready(true);
        writer.write_all(b"").unwrap();
        assert!(writer.is_ready());
        writer.write_all(b"b\n").unwrap();
        writer.write_all(b"c\n").unwrap();
        assert!(!writer.is_ready());
        assert_eq!(writer.into_inner(), b"a\n\nb\nc\n");
    }
}
