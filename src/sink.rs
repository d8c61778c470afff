//! Output sinks shared by the translation workers.
//!
//! Every worker accumulates translated text in a private buffer and hands
//! the whole buffer to the sink in one call. A sink must keep each buffer
//! contiguous in the destination; the order between buffers is whatever
//! order the workers flush in.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;

/// Errors that can occur while writing translated output.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("fail to write to output file: {0}")]
    Write(#[from] io::Error),
}

/// Destination for translated bytes, callable from any worker.
pub trait OutputSink: Sync {
    /// Appends one buffer to the destination as a single write.
    fn write_buffer(&self, bytes: &[u8]) -> Result<(), SinkError>;

    /// Flushes anything buffered below the sink. Called once after all
    /// workers are done.
    fn finish(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Writes to a file through a shared handle, without locking.
///
/// `&File` implements `Write`, so every worker writes straight to the file
/// descriptor; a buffer is handed to the OS in one `write_all`.
#[derive(Debug)]
pub struct FileSink {
    file: File,
}

impl FileSink {
    /// Creates (or truncates) the output file.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::from_file(File::create(path)?))
    }

    /// Wraps an already opened file.
    pub fn from_file(file: File) -> Self {
        Self { file }
    }
}

impl OutputSink for FileSink {
    fn write_buffer(&self, bytes: &[u8]) -> Result<(), SinkError> {
        (&self.file).write_all(bytes)?;
        Ok(())
    }

    fn finish(&self) -> Result<(), SinkError> {
        (&self.file).flush()?;
        Ok(())
    }
}

/// Writes to standard output.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write_buffer(&self, bytes: &[u8]) -> Result<(), SinkError> {
        io::stdout().lock().write_all(bytes)?;
        Ok(())
    }

    fn finish(&self) -> Result<(), SinkError> {
        io::stdout().lock().flush()?;
        Ok(())
    }
}

/// Collects output in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    buffer: Mutex<Vec<u8>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl OutputSink for MemorySink {
    fn write_buffer(&self, bytes: &[u8]) -> Result<(), SinkError> {
        self.buffer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(bytes);
        Ok(())
    }
}
