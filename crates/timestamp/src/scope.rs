//! crates/timestamp/src/scope.rs
//! RAII guard pairing an open event with its close event.

use std::fmt;

use crate::recorder::Emitter;

/// Emits `>name` on creation and `<name` when dropped.
///
/// The close event fires on every exit path, including `?` returns and
/// unwinding, which keeps the recorder's depth balanced around fallible
/// calls. When the emitter is disabled no label is built at all.
///
/// # Examples
///
/// ```
/// use timestamp::{Emitter, ManualClock, Recorder, RecorderConfig, Scope};
///
/// let clock = ManualClock::new();
/// let recorder = Recorder::with_parts(
///     RecorderConfig::enabled().with_syscall_marker(false),
///     &clock,
///     Vec::new(),
/// );
///
/// fn parse(recorder: &dyn Emitter, text: &str) -> Result<u32, std::num::ParseIntError> {
///     let _scope = Scope::enter(recorder, "parse");
///     text.parse()
/// }
///
/// assert!(parse(&recorder, "nope").is_err());
/// assert_eq!(recorder.depth(), 0);
///
/// let output = String::from_utf8(recorder.into_writer()).unwrap();
/// assert!(output.contains(">parse\n"));
/// assert!(output.contains("<parse\n"));
/// ```
#[must_use = "dropping the scope immediately emits its close event"]
pub struct Scope<'a> {
    emitter: &'a dyn Emitter,
    close: Option<String>,
}

impl<'a> Scope<'a> {
    /// Opens a scope labelled `name`.
    pub fn enter(emitter: &'a dyn Emitter, name: &str) -> Self {
        if !emitter.is_enabled() {
            return Self::inactive(emitter);
        }
        emitter.emit(&format!(">{name}"));
        Self {
            emitter,
            close: Some(format!("<{name}")),
        }
    }

    /// Opens a scope whose open label carries `detail` in parentheses.
    ///
    /// The close label is the bare `<name`.
    pub fn enter_with_detail(
        emitter: &'a dyn Emitter,
        name: &str,
        detail: impl fmt::Display,
    ) -> Self {
        if !emitter.is_enabled() {
            return Self::inactive(emitter);
        }
        emitter.emit(&format!(">{name}({detail})"));
        Self {
            emitter,
            close: Some(format!("<{name}")),
        }
    }

    fn inactive(emitter: &'a dyn Emitter) -> Self {
        Self {
            emitter,
            close: None,
        }
    }

    /// Whether dropping this guard will emit a close event.
    pub const fn is_active(&self) -> bool {
        self.close.is_some()
    }

    /// Emits the close event now.
    pub fn close(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if let Some(label) = self.close.take() {
            self.emitter.emit(&label);
        }
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}

impl fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("close", &self.close)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Collect {
        enabled: bool,
        labels: RefCell<Vec<String>>,
    }

    impl Collect {
        fn on() -> Self {
            Self {
                enabled: true,
                ..Self::default()
            }
        }
    }

    impl Emitter for Collect {
        fn emit(&self, label: &str) {
            self.labels.borrow_mut().push(label.to_owned());
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }
    }

    #[test]
    fn drop_emits_close() {
        let sink = Collect::on();
        {
            let scope = Scope::enter(&sink, "work");
            assert!(scope.is_active());
        }
        assert_eq!(*sink.labels.borrow(), [">work", "<work"]);
    }

    #[test]
    fn detail_only_on_open_label() {
        let sink = Collect::on();
        drop(Scope::enter_with_detail(&sink, "json::to_vec", "i32"));
        assert_eq!(
            *sink.labels.borrow(),
            [">json::to_vec(i32)", "<json::to_vec"]
        );
    }

    #[test]
    fn explicit_close_emits_once() {
        let sink = Collect::on();
        let scope = Scope::enter(&sink, "once");
        scope.close();
        assert_eq!(sink.labels.borrow().len(), 2);
    }

    #[test]
    fn disabled_emitter_sees_nothing() {
        let sink = Collect::default();
        let scope = Scope::enter(&sink, "quiet");
        assert!(!scope.is_active());
        drop(scope);
        drop(Scope::enter_with_detail(&sink, "quiet", 1));
        assert!(sink.labels.borrow().is_empty());
    }

    #[test]
    fn nested_scopes_close_in_reverse_order() {
        let sink = Collect::on();
        {
            let _outer = Scope::enter(&sink, "outer");
            let _inner = Scope::enter(&sink, "inner");
        }
        assert_eq!(
            *sink.labels.borrow(),
            [">outer", ">inner", "<inner", "<outer"]
        );
    }

    #[test]
    fn close_fires_during_unwind() {
        let sink = Collect::on();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _scope = Scope::enter(&sink, "boom");
            panic!("delegate failed");
        }));
        assert!(result.is_err());
        assert_eq!(*sink.labels.borrow(), [">boom", "<boom"]);
    }
}
