#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/timestamp/src/lib.rs
//!
//! # Overview
//!
//! `timestamp` is an opt-in call-timing recorder. When a program is started
//! with `--timestamps` it prints one line per traced event, carrying the time
//! since start and the time since the previous event, with the event label
//! indented by nesting depth:
//!
//! ```text
//! ##   0.1  0.10: >json::from_slice
//! ##   0.4  0.31: <json::from_slice
//! ##   0.5  0.05: >json::to_vec(Config)
//! ##   0.6  0.12: <json::to_vec
//! ```
//!
//! Without the flag every call is a no-op that neither reads the clock nor
//! takes a lock.
//!
//! # Design
//!
//! [`Recorder`] owns the timing state and the output writer. It is built
//! once, either explicitly with [`Recorder::with_parts`] and passed by
//! reference, or lazily as the process-wide instance returned by [`global()`].
//! Labels starting with `>` open a nesting level after their own line is
//! printed, labels starting with `<` close one before it, so a matching pair
//! lines up in the same column. [`Scope`] pairs the two on a drop guard.
//!
//! Consumers depend on the [`Emitter`] trait rather than a concrete recorder,
//! which keeps the clock and writer type parameters out of their signatures.
//!
//! # Invariants
//!
//! - Configuration is fixed at construction; there is no runtime toggle.
//! - Elapsed and delta times never decrease for a given recorder.
//! - Depth is not corrected on imbalance. An unmatched close drives it
//!   negative and such lines render without indentation.
//!
//! # Errors
//!
//! Emitting never fails. Writer errors are reported through `tracing` at
//! debug level and otherwise ignored.
//!
//! # Feature flags
//!
//! - `serde`: `Serialize`/`Deserialize` for [`RecorderConfig`].
//! - `tracing-bridge`: `TimestampLayer`, a `tracing-subscriber` layer
//!   that maps span entry and exit onto open and close events.

mod clock;
mod config;
mod global;
mod line;
mod recorder;
mod scope;
#[cfg(feature = "tracing-bridge")]
mod tracing_bridge;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ACTIVATION_FLAG, DEFAULT_PREFIX, RecorderConfig};
pub use global::{emit, enabled, global, init, scope};
pub use line::{EventKind, TimingLine};
pub use recorder::{Emitter, Recorder};
pub use scope::Scope;
#[cfg(feature = "tracing-bridge")]
pub use tracing_bridge::{TimestampLayer, init_tracing, init_tracing_with_filter};
