//! crates/timestamp/src/line.rs
//! Event classification and the textual layout of a timing line.

use std::fmt;
use std::time::Duration;

/// Role of a label in the call tree, decided by its first character.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventKind {
    /// Label starts with `>`: entry into a traced operation.
    Open,
    /// Label starts with `<`: exit from a traced operation.
    Close,
    /// Any other label, including the empty one. Depth is left untouched.
    Plain,
}

impl EventKind {
    /// Classifies `label`.
    ///
    /// ```
    /// use timestamp::EventKind;
    ///
    /// assert_eq!(EventKind::of(">decode"), EventKind::Open);
    /// assert_eq!(EventKind::of("<decode"), EventKind::Close);
    /// assert_eq!(EventKind::of("note"), EventKind::Plain);
    /// assert_eq!(EventKind::of(""), EventKind::Plain);
    /// ```
    #[must_use]
    pub fn of(label: &str) -> Self {
        match label.as_bytes().first() {
            Some(b'>') => Self::Open,
            Some(b'<') => Self::Close,
            _ => Self::Plain,
        }
    }

    /// Depth change applied before the line is formatted.
    pub(crate) const fn depth_before(self) -> i64 {
        match self {
            Self::Close => -1,
            Self::Open | Self::Plain => 0,
        }
    }

    /// Depth change applied after the line is formatted.
    pub(crate) const fn depth_after(self) -> i64 {
        match self {
            Self::Open => 1,
            Self::Close | Self::Plain => 0,
        }
    }
}

/// One rendered timing line, without the trailing newline.
///
/// Layout: `{prefix}{elapsed:5.1} {delta:5.2}: {indent}{label}` with both
/// times in milliseconds and `indent` being two spaces per nesting level.
/// Negative depths render with no indentation.
///
/// ```
/// use std::time::Duration;
/// use timestamp::TimingLine;
///
/// let line = TimingLine {
///     prefix: "## ",
///     elapsed: Duration::from_micros(12_300),
///     delta: Duration::from_micros(4_560),
///     depth: 0,
///     label: ">decode",
/// };
/// assert_eq!(line.to_string(), "##  12.3  4.56: >decode");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TimingLine<'a> {
    /// Marker written first.
    pub prefix: &'a str,
    /// Time since the recorder started.
    pub elapsed: Duration,
    /// Time since the previous line.
    pub delta: Duration,
    /// Nesting depth used for indentation.
    pub depth: i64,
    /// Event label, written verbatim.
    pub label: &'a str,
}

impl TimingLine<'_> {
    /// Number of indentation spaces this line carries.
    #[must_use]
    pub fn indent_width(&self) -> usize {
        usize::try_from(self.depth.max(0)).map_or(usize::MAX, |depth| depth.saturating_mul(2))
    }
}

impl fmt::Display for TimingLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:5.1} {:5.2}: {:indent$}{}",
            self.prefix,
            millis(self.elapsed),
            millis(self.delta),
            "",
            self.label,
            indent = self.indent_width(),
        )
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
