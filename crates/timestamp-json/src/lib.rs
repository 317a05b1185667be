#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/timestamp-json/src/lib.rs
//!
//! # Overview
//!
//! `timestamp-json` wraps `serde_json` with call-timing events. Encoding and
//! decoding a whole value emits an open line before the call and a close line
//! after it, on success and on failure alike:
//!
//! ```text
//! ##   0.2  0.20: >json::to_vec(BTreeMap<String, u32>)
//! ##   0.3  0.08: <json::to_vec
//! ```
//!
//! The stream constructors hand back plain `serde_json` serializers and
//! deserializers. Their later reads and writes are not timed.
//!
//! # Invariants
//!
//! - Results and errors are exactly what `serde_json` returns; the facade
//!   adds no error kinds and never alters output bytes.
//! - Every open event has a matching close event, including on error paths.
//!
//! # Examples
//!
//! ```
//! use timestamp::{ManualClock, Recorder, RecorderConfig};
//! use timestamp_json::TimestampedJson;
//!
//! let clock = ManualClock::new();
//! let recorder = Recorder::with_parts(
//!     RecorderConfig::enabled().with_syscall_marker(false),
//!     &clock,
//!     Vec::new(),
//! );
//! let json = TimestampedJson::new(&recorder);
//!
//! assert_eq!(json.to_vec(&42)?, b"42");
//! let value: u8 = json.from_slice(b"7")?;
//! assert_eq!(value, 7);
//!
//! let output = String::from_utf8(recorder.into_writer()).unwrap();
//! let lines: Vec<&str> = output.lines().collect();
//! assert_eq!(
//!     lines,
//!     [
//!         "##   0.0  0.00: >json::to_vec(i32)",
//!         "##   0.0  0.00: <json::to_vec",
//!         "##   0.0  0.00: >json::from_slice",
//!         "##   0.0  0.00: <json::from_slice",
//!     ]
//! );
//! # Ok::<(), serde_json::Error>(())
//! ```

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use serde_json::de::IoRead;
use timestamp::{Emitter, Scope};

// Labels name the serde_json entry points being wrapped, so a decode shows as
// `json::from_slice` rather than a `json.Unmarshal` style name.
const FROM_SLICE: &str = "json::from_slice";
const TO_VEC: &str = "json::to_vec";

/// `serde_json` front end that records timing events around whole-value
/// encode and decode calls.
#[derive(Clone, Copy)]
pub struct TimestampedJson<'r> {
    emitter: &'r dyn Emitter,
}

impl TimestampedJson<'static> {
    /// Facade over the process-wide recorder.
    #[must_use]
    pub fn global() -> Self {
        Self::new(timestamp::global())
    }
}

impl Default for TimestampedJson<'static> {
    fn default() -> Self {
        Self::global()
    }
}

impl<'r> TimestampedJson<'r> {
    /// Facade over an explicit recorder.
    #[must_use]
    pub fn new(emitter: &'r dyn Emitter) -> Self {
        Self { emitter }
    }

    /// Decodes `data` into a `T`, like [`serde_json::from_slice`].
    ///
    /// Emits `>json::from_slice` before decoding and `<json::from_slice`
    /// after it.
    pub fn from_slice<'de, T>(&self, data: &'de [u8]) -> serde_json::Result<T>
    where
        T: Deserialize<'de>,
    {
        let _scope = Scope::enter(self.emitter, FROM_SLICE);
        serde_json::from_slice(data)
    }

    /// Decodes `data` into an existing `target`.
    ///
    /// `target` is only overwritten when decoding succeeds. Emits the same
    /// events as [`from_slice`](Self::from_slice).
    pub fn from_slice_into<'de, T>(
        &self,
        data: &'de [u8],
        target: &mut T,
    ) -> serde_json::Result<()>
    where
        T: Deserialize<'de>,
    {
        let _scope = Scope::enter(self.emitter, FROM_SLICE);
        *target = serde_json::from_slice(data)?;
        Ok(())
    }

    /// Encodes `value`, like [`serde_json::to_vec`].
    ///
    /// Emits `>json::to_vec(<type>)` before encoding, where `<type>` is
    /// [`type_label::<T>()`](type_label), and `<json::to_vec` after it.
    pub fn to_vec<T>(&self, value: &T) -> serde_json::Result<Vec<u8>>
    where
        T: ?Sized + Serialize,
    {
        let _scope = if self.emitter.is_enabled() {
            Scope::enter_with_detail(self.emitter, TO_VEC, type_label::<T>())
        } else {
            Scope::enter(self.emitter, TO_VEC)
        };
        serde_json::to_vec(value)
    }

    /// Returns a streaming encoder writing to `sink`. No events are emitted.
    #[allow(clippy::unused_self)]
    pub fn stream_encoder<W>(&self, sink: W) -> serde_json::Serializer<W>
    where
        W: io::Write,
    {
        serde_json::Serializer::new(sink)
    }

    /// Returns a streaming decoder reading from `source`. No events are
    /// emitted.
    #[allow(clippy::unused_self)]
    pub fn stream_decoder<R>(&self, source: R) -> serde_json::Deserializer<IoRead<R>>
    where
        R: io::Read,
    {
        serde_json::Deserializer::from_reader(source)
    }
}

impl fmt::Debug for TimestampedJson<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimestampedJson")
            .field("enabled", &self.emitter.is_enabled())
            .finish()
    }
}

/// Name of `T` with module paths removed.
///
/// ```
/// use timestamp_json::type_label;
///
/// assert_eq!(type_label::<i32>(), "i32");
/// assert_eq!(type_label::<Vec<String>>(), "Vec<String>");
/// assert_eq!(type_label::<str>(), "str");
/// ```
#[must_use]
pub fn type_label<T>() -> String
where
    T: ?Sized,
{
    strip_paths(std::any::type_name::<T>())
}

fn strip_paths(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            out.truncate(segment_start);
        } else {
            out.push(c);
            if !(c.is_alphanumeric() || c == '_') {
                segment_start = out.len();
            }
        }
    }
    out
}
