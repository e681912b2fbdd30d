//! Input sources and output sinks

use crate::error::Result;
use std::io::{self, Read, Write};

/// Destination for bytes written by `Output`
pub trait OutputSink {
    /// Write one byte
    fn write_byte(&mut self, byte: u8) -> Result<()>;

    /// Flush buffered bytes
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl OutputSink for Vec<u8> {
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.push(byte);
        Ok(())
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        (**self).write_byte(byte)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Buffered standard output
#[derive(Debug)]
pub struct StdoutSink(io::BufWriter<io::Stdout>);

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StdoutSink {
    /// Create a sink over the process's stdout
    pub fn new() -> Self {
        Self(io::BufWriter::new(io::stdout()))
    }
}

impl OutputSink for StdoutSink {
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.0.write_all(&[byte])?;
        if byte == b'\n' {
            self.0.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.0.flush()?;
        Ok(())
    }
}

/// Standard input as a byte iterator
///
/// Read errors end the stream, like end of file.
#[derive(Debug)]
pub struct StdinInput(io::Bytes<io::StdinLock<'static>>);

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

impl StdinInput {
    /// Lock stdin for byte-wise reading
    pub fn new() -> Self {
        Self(io::stdin().lock().bytes())
    }
}

impl Iterator for StdinInput {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        match self.0.next()? {
            Ok(byte) => Some(byte),
            Err(err) => {
                tracing::warn!("stdin read failed, treating as end of input: {}", err);
                None
            }
        }
    }
}
