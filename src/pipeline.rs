//! Concurrent translation pipeline.
//!
//! This module provides:
//! - A generic task pool: one producer feeding a bounded queue, a fixed
//!   number of workers, a shared cancellation token and a first-error slot
//! - The FASTA → protein pipeline built on top of it
//!
//! ## Data flow
//!
//! ```text
//! FastaReader ──▶ bounded queue (10) ──▶ worker 0..n
//!                                           │
//!                                           ▼
//!                                     private buffer ──▶ OutputSink
//! ```
//!
//! The first failure, from the producer or from any worker, is stored and
//! cancels the run. Producer and workers check the token between items and
//! never in the middle of one. The pool returns only after every thread has
//! exited.
//!
//! Records are queued in file order, but workers flush independently, so
//! with more than one worker the output order of records is not defined.

use std::fmt;
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use log::{debug, warn};
use thiserror::Error;

use crate::fasta::{FastaError, FastaReader};
use crate::genetic_code::CodeTable;
use crate::sink::{OutputSink, SinkError};
use crate::translate::{FrameMask, Translator};

/// Capacity of the record queue between the parser and the workers.
pub const QUEUE_DEPTH: usize = 10;

/// A worker hands its buffer to the sink once it grows past this size.
pub const FLUSH_THRESHOLD: usize = 10 * 1000 * 1000;

/// Shared flag telling every thread of a run to stop.
#[derive(Debug, Default)]
pub struct CancellationToken {
    cancelled: AtomicBool,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the run. Returns true for the call that actually set the flag.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::AcqRel)
    }

    /// Returns true once the run has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Holds the first error reported during a run; later ones are dropped.
#[derive(Debug)]
pub struct ErrorSlot<E> {
    slot: Mutex<Option<E>>,
}

impl<E> ErrorSlot<E> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self { slot: Mutex::new(None) }
    }

    /// Stores `error` unless an error is already present. Returns true if
    /// it was stored.
    pub fn report(&self, error: E) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            return false;
        }
        *slot = Some(error);
        true
    }

    /// Consumes the slot and returns the stored error, if any.
    pub fn into_inner(self) -> Option<E> {
        self.slot.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<E> Default for ErrorSlot<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer side of the queue.
pub struct Feeder<'a, T> {
    tx: Sender<T>,
    token: &'a CancellationToken,
}

impl<T> Feeder<'_, T> {
    /// Queues one item, blocking while the queue is full.
    ///
    /// Returns false if the run was cancelled or every worker is gone; the
    /// producer should stop.
    pub fn push(&self, item: T) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.tx.send(item).is_ok()
    }

    /// Returns true once the run has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Worker side of the queue.
pub struct Jobs<'a, T> {
    rx: Receiver<T>,
    token: &'a CancellationToken,
}

impl<T> Jobs<'_, T> {
    /// Waits for the next item. Returns `None` once the queue is closed and
    /// drained, or as soon as the run is cancelled.
    pub fn next_job(&self) -> Option<T> {
        if self.token.is_cancelled() {
            return None;
        }
        let item = self.rx.recv().ok()?;
        if self.token.is_cancelled() {
            return None;
        }
        Some(item)
    }

    /// Returns true once the run has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Fixed-size pool running one producer and `workers` consumers.
#[derive(Debug, Clone, Copy)]
pub struct TaskPool {
    workers: usize,
    queue_depth: usize,
}

impl TaskPool {
    /// Creates a pool with `workers` consumers (at least one).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            queue_depth: QUEUE_DEPTH,
        }
    }

    /// Sets the queue capacity (at least one).
    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth.max(1);
        self
    }

    /// Returns the number of workers.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs `produce` on its own thread and `work` on every worker thread,
    /// then waits for all of them.
    ///
    /// `work` receives the worker index and the queue. The first `Err`
    /// returned by any closure cancels the run and becomes the result.
    pub fn run<T, E, P, W>(&self, produce: P, work: W) -> Result<(), E>
    where
        T: Send,
        E: Send + fmt::Display,
        P: FnOnce(&Feeder<'_, T>) -> Result<(), E> + Send,
        W: Fn(usize, &Jobs<'_, T>) -> Result<(), E> + Sync,
    {
        let token = CancellationToken::new();
        let errors = ErrorSlot::new();
        let (tx, rx) = crossbeam_channel::bounded(self.queue_depth);

        let fail = |error: E| {
            warn!("Cancelling run: {}", error);
            errors.report(error);
            token.cancel();
        };

        thread::scope(|s| {
            for idx in 0..self.workers {
                let jobs = Jobs {
                    rx: rx.clone(),
                    token: &token,
                };
                let (work, fail) = (&work, &fail);
                s.spawn(move || {
                    if let Err(e) = work(idx, &jobs) {
                        fail(e);
                    }
                });
            }
            // Only workers hold receivers, so a send fails once they are all gone
            drop(rx);

            let feeder = Feeder { tx, token: &token };
            let fail = &fail;
            s.spawn(move || {
                if let Err(e) = produce(&feeder) {
                    fail(e);
                }
                // Dropping the feeder closes the queue
            });
        });

        match errors.into_inner() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Errors that abort a translation run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] FastaError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Totals of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Number of input records translated
    pub records: usize,
    /// Number of bytes handed to the sink
    pub bytes: u64,
}

/// Translates every record of `reader` into `sink` using `workers` threads.
pub fn run<R, S>(
    reader: FastaReader<R>,
    table: &CodeTable,
    mask: FrameMask,
    workers: usize,
    sink: &S,
) -> Result<RunSummary, PipelineError>
where
    R: BufRead + Send,
    S: OutputSink + ?Sized,
{
    run_with_threshold(reader, table, mask, workers, FLUSH_THRESHOLD, sink)
}

/// Same as [`run`], with workers flushing once their buffer exceeds
/// `flush_threshold` bytes.
pub(crate) fn run_with_threshold<R, S>(
    reader: FastaReader<R>,
    table: &CodeTable,
    mask: FrameMask,
    workers: usize,
    flush_threshold: usize,
    sink: &S,
) -> Result<RunSummary, PipelineError>
where
    R: BufRead + Send,
    S: OutputSink + ?Sized,
{
    let records = AtomicUsize::new(0);
    let bytes = AtomicU64::new(0);
    let pool = TaskPool::new(workers);

    debug!(
        "Starting {} workers on {} frame(s) with table {}",
        pool.workers(),
        mask.count(),
        table.id()
    );

    let flush = |buffer: &mut Vec<u8>| -> Result<(), PipelineError> {
        sink.write_buffer(buffer)?;
        bytes.fetch_add(buffer.len() as u64, Ordering::Relaxed);
        buffer.clear();
        Ok(())
    };

    pool.run::<_, PipelineError, _, _>(
        move |feeder| {
            let mut reader = reader;
            while let Some(record) = reader.next_record()? {
                if !feeder.push(record) {
                    debug!("Parser stopped at line {}", reader.line_number());
                    break;
                }
            }
            Ok(())
        },
        |idx, jobs| {
            let translator = Translator::new(table, mask);
            let mut buffer = Vec::new();
            let mut translated = 0;

            while let Some(record) = jobs.next_job() {
                translator.translate_record(record, &mut buffer);
                translated += 1;
                if buffer.len() > flush_threshold {
                    flush(&mut buffer)?;
                }
            }

            if jobs.is_cancelled() {
                debug!("Worker {} cancelled after {} records", idx, translated);
                return Ok(());
            }
            if !buffer.is_empty() {
                flush(&mut buffer)?;
            }

            records.fetch_add(translated, Ordering::Relaxed);
            debug!("Worker {} translated {} records", idx, translated);
            Ok(())
        },
    )?;

    sink.finish()?;

    Ok(RunSummary {
        records: records.into_inner(),
        bytes: bytes.into_inner(),
    })
}
