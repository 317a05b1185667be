//! crates/timestamp/src/recorder.rs
//! Recorder state and the `emit` operation.

use std::io::{self, Stdout, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::clock::{Clock, SystemClock};
use crate::config::RecorderConfig;
use crate::line::{EventKind, TimingLine};

/// Anything that accepts timing labels.
///
/// [`Recorder`] is the canonical implementation; the trait lets scope guards,
/// the JSON facade and the tracing bridge hold a recorder without naming its
/// clock and writer types.
pub trait Emitter {
    /// Records one event. Must never fail or panic the caller.
    fn emit(&self, label: &str);

    /// Whether [`emit`](Self::emit) produces output. Callers use this to skip
    /// building labels that would be thrown away.
    fn is_enabled(&self) -> bool;
}

impl<E> Emitter for &E
where
    E: Emitter + ?Sized,
{
    fn emit(&self, label: &str) {
        (**self).emit(label);
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }
}

impl<E> Emitter for Arc<E>
where
    E: Emitter + ?Sized,
{
    fn emit(&self, label: &str) {
        (**self).emit(label);
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }
}

/// Mutable part of the recorder, updated on every enabled emit.
#[derive(Debug)]
struct RecorderState<W> {
    last: Instant,
    depth: i64,
    writer: W,
}

impl<W> RecorderState<W>
where
    W: Write,
{
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

/// Prints nested, timestamped event lines when enabled.
///
/// Each line carries the time since the recorder was built and the time since
/// the previous line, both in milliseconds, followed by the label indented two
/// spaces per open event. A label starting with `>` opens a level after its
/// own line is printed; a label starting with `<` closes a level before its
/// line is printed, so matching open and close lines share a column.
///
/// The mutable state sits behind a single mutex, which makes the recorder
/// `Sync`. Threads still share one nesting depth, so indentation is only
/// meaningful for a single call tree. A disabled recorder never takes the
/// lock or reads the clock.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use timestamp::{ManualClock, Recorder, RecorderConfig};
///
/// let clock = ManualClock::new();
/// let config = RecorderConfig::enabled().with_syscall_marker(false);
/// let recorder = Recorder::with_parts(config, &clock, Vec::new());
///
/// recorder.emit(">load");
/// clock.advance(Duration::from_millis(2));
/// recorder.emit("<load");
///
/// let output = String::from_utf8(recorder.into_writer()).unwrap();
/// assert_eq!(output, "##   0.0  0.00: >load\n##   2.0  2.00: <load\n");
/// ```
#[derive(Debug)]
pub struct Recorder<C = SystemClock, W = Stdout> {
    enabled: bool,
    prefix: String,
    syscall_marker: bool,
    start: Instant,
    clock: C,
    state: Mutex<RecorderState<W>>,
}

impl Recorder {
    /// Builds a recorder on the system clock that writes to standard output.
    #[must_use]
    pub fn new(config: RecorderConfig) -> Self {
        Self::with_parts(config, SystemClock, io::stdout())
    }

    /// Builds a standard-output recorder enabled by `--timestamps` in the
    /// process arguments.
    #[must_use]
    pub fn from_env_args() -> Self {
        Self::new(RecorderConfig::from_env_args())
    }
}

impl<C, W> Recorder<C, W>
where
    C: Clock,
{
    /// Builds a recorder from an explicit clock and writer.
    ///
    /// The start instant is read from `clock` here, once.
    pub fn with_parts(config: RecorderConfig, clock: C, writer: W) -> Self {
        let start = clock.now();
        Self {
            enabled: config.enabled,
            prefix: config.prefix,
            syscall_marker: config.syscall_marker,
            start,
            clock,
            state: Mutex::new(RecorderState {
                last: start,
                depth: 0,
                writer,
            }),
        }
    }
}

impl<C, W> Recorder<C, W> {
    /// Whether lines are produced.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Marker written at the start of each line.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Instant the recorder was built.
    pub const fn start(&self) -> Instant {
        self.start
    }

    /// Current nesting depth. Negative after unmatched close events.
    pub fn depth(&self) -> i64 {
        self.lock().depth
    }

    /// Runs `f` with a shared borrow of the writer.
    pub fn with_writer<R>(&self, f: impl FnOnce(&W) -> R) -> R {
        f(&self.lock().writer)
    }

    /// Consumes the recorder and returns its writer.
    pub fn into_writer(self) -> W {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .writer
    }

    fn lock(&self) -> MutexGuard<'_, RecorderState<W>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C, W> Recorder<C, W>
where
    C: Clock,
    W: Write,
{
    /// Prints one line for `label` if the recorder is enabled.
    ///
    /// Write errors are dropped after being reported at debug level through
    /// `tracing`; the caller never sees them.
    pub fn emit(&self, label: &str) {
        if !self.enabled {
            return;
        }

        let kind = EventKind::of(label);
        let mut state = self.lock();
        let now = self.clock.now();

        state.depth += kind.depth_before();
        let line = TimingLine {
            prefix: &self.prefix,
            elapsed: now.saturating_duration_since(self.start),
            delta: now.saturating_duration_since(state.last),
            depth: state.depth,
            label,
        }
        .to_string();
        state.depth += kind.depth_after();
        state.last = now;

        if self.syscall_marker {
            syscall_marker(&line);
        }
        let result = state.write_line(&line);
        drop(state);

        if let Err(error) = result {
            tracing::debug!(%error, label, "dropping timing line");
        }
    }
}

impl<C, W> Emitter for Recorder<C, W>
where
    C: Clock,
    W: Write,
{
    fn emit(&self, label: &str) {
        Self::emit(self, label);
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Probes the filesystem with the line text as a path so `strace` shows the
/// line in sequence with the traced program's own syscalls.
fn syscall_marker(line: &str) {
    let _ = Path::new(line).try_exists();
}
