//! crates/timestamp/src/tracing_bridge.rs
//! Bridge between the tracing crate and the timing recorder.
//!
//! [`TimestampLayer`] turns span entry into an open event, span exit into a
//! close event and every other event into a plain line carrying its message
//! and fields, so code that is already instrumented with `tracing` spans gets
//! call-timing output without extra calls.
//!
//! # Usage
//!
//! ```rust,ignore
//! use timestamp::init_tracing;
//!
//! init_tracing();
//!
//! let span = tracing::info_span!("load_config");
//! let _entered = span.enter();
//! tracing::info!("reading file");
//! ```
//!
//! Run the program with `--timestamps` to see the lines.

use std::fmt;

use tracing::Subscriber;
use tracing::span;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::global::global;
use crate::recorder::Emitter;

/// A tracing layer that forwards span transitions to an [`Emitter`].
#[derive(Clone, Debug)]
pub struct TimestampLayer<E> {
    emitter: E,
}

impl<E> TimestampLayer<E> {
    /// Creates a layer writing through `emitter`.
    #[must_use]
    pub const fn new(emitter: E) -> Self {
        Self { emitter }
    }

    /// Events raised by this crate, such as dropped-line reports, are not fed
    /// back into the recorder.
    fn is_own_target(target: &str) -> bool {
        target == env!("CARGO_CRATE_NAME")
            || target
                .strip_prefix(env!("CARGO_CRATE_NAME"))
                .is_some_and(|rest| rest.starts_with("::"))
    }
}

impl<S, E> Layer<S> for TimestampLayer<E>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    E: Emitter + 'static,
{
    fn on_enter(&self, id: &span::Id, ctx: Context<'_, S>) {
        if !self.emitter.is_enabled() {
            return;
        }
        if let Some(span) = ctx.span(id) {
            self.emitter.emit(&format!(">{}", span.name()));
        }
    }

    fn on_exit(&self, id: &span::Id, ctx: Context<'_, S>) {
        if !self.emitter.is_enabled() {
            return;
        }
        if let Some(span) = ctx.span(id) {
            self.emitter.emit(&format!("<{}", span.name()));
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if !self.emitter.is_enabled() {
            return;
        }
        let target = event.metadata().target();
        if Self::is_own_target(target) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if let Some(line) = visitor.into_line() {
            self.emitter.emit(&format!("{target}: {line}"));
        }
    }
}

/// Visitor to extract the message and the remaining fields from a tracing
/// event.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: Vec<String>,
}

impl MessageVisitor {
    /// Message followed by `name=value` pairs, or `None` for an empty event.
    fn into_line(self) -> Option<String> {
        let mut parts = Vec::with_capacity(self.fields.len() + 1);
        parts.extend(self.message);
        parts.extend(self.fields);
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            self.fields.push(format!("{}={value:?}", field.name()));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        } else {
            self.fields.push(format!("{}={value:?}", field.name()));
        }
    }
}

/// Installs a global subscriber that feeds the process-wide recorder.
///
/// Panics if a global subscriber is already set, like
/// [`SubscriberInitExt::init`](tracing_subscriber::util::SubscriberInitExt::init).
pub fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(TimestampLayer::new(global()))
        .init();
}

/// Installs a global subscriber combining `filter` with the timing layer.
///
/// # Example
///
/// ```rust,ignore
/// use timestamp::init_tracing_with_filter;
/// use tracing_subscriber::EnvFilter;
///
/// init_tracing_with_filter(EnvFilter::from_default_env());
/// ```
pub fn init_tracing_with_filter<F>(filter: F)
where
    F: Layer<tracing_subscriber::Registry> + Send + Sync + 'static,
{
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(filter)
        .with(TimestampLayer::new(global()))
        .init();
}
