//! crates/timestamp/src/config.rs
//! Recorder configuration derived from the process invocation.

use std::ffi::OsStr;

/// Command-line token that switches timing output on.
pub const ACTIVATION_FLAG: &str = "--timestamps";

/// Marker written at the start of every timing line.
pub const DEFAULT_PREFIX: &str = "## ";

/// Settings captured once when a [`Recorder`](crate::Recorder) is built.
///
/// The configuration is immutable for the lifetime of the recorder: there is
/// no runtime toggle, matching the activation contract of the `--timestamps`
/// flag.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecorderConfig {
    /// Whether timing lines are produced at all.
    pub enabled: bool,
    /// Text written before the elapsed column of each line.
    pub prefix: String,
    /// Whether each line is also issued as a filesystem probe so it shows up
    /// in syscall traces.
    pub syscall_marker: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            prefix: DEFAULT_PREFIX.to_owned(),
            syscall_marker: true,
        }
    }
}

impl RecorderConfig {
    /// Builds an enabled configuration with the default prefix.
    #[must_use]
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Scans `args` for [`ACTIVATION_FLAG`].
    ///
    /// Only an exact match counts; `--timestamps=1` or `--timestamps-foo` do
    /// not enable the recorder. Repeating the flag has the same effect as
    /// passing it once.
    ///
    /// # Examples
    ///
    /// ```
    /// use timestamp::RecorderConfig;
    ///
    /// assert!(RecorderConfig::from_args(["prog", "--timestamps"]).enabled);
    /// assert!(!RecorderConfig::from_args(["prog", "--timestamps=1"]).enabled);
    /// ```
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let enabled = args
            .into_iter()
            .any(|arg| arg.as_ref() == OsStr::new(ACTIVATION_FLAG));
        Self {
            enabled,
            ..Self::default()
        }
    }

    /// Reads the activation flag from [`std::env::args_os`].
    pub fn from_env_args() -> Self {
        Self::from_args(std::env::args_os())
    }

    /// Replaces the line prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Turns the syscall trace marker on or off.
    #[must_use]
    pub fn with_syscall_marker(mut self, syscall_marker: bool) -> Self {
        self.syscall_marker = syscall_marker;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn default_is_disabled_with_standard_prefix() {
        let config = RecorderConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.prefix, "## ");
        assert!(config.syscall_marker);
    }

    #[test]
    fn flag_anywhere_enables() {
        assert!(RecorderConfig::from_args(["--timestamps", "prog"]).enabled);
        assert!(RecorderConfig::from_args(["prog", "a", "--timestamps", "b"]).enabled);
    }

    #[test]
    fn missing_flag_disables() {
        assert!(!RecorderConfig::from_args(["prog", "--verbose"]).enabled);
        assert!(!RecorderConfig::from_args(Vec::<String>::new()).enabled);
    }

    #[test]
    fn near_miss_tokens_do_not_enable() {
        for token in [
            "--timestamp",
            "--timestamps=1",
            "-timestamps",
            "--TIMESTAMPS",
            " --timestamps",
        ] {
            assert!(
                !RecorderConfig::from_args(["prog", token]).enabled,
                "{token:?} must not enable the recorder"
            );
        }
    }

    #[test]
    fn repeated_flag_matches_single_flag() {
        let once = RecorderConfig::from_args(["prog", "--timestamps"]);
        let twice = RecorderConfig::from_args(["prog", "--timestamps", "x", "--timestamps"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn accepts_os_strings() {
        let args = vec![OsString::from("prog"), OsString::from("--timestamps")];
        assert!(RecorderConfig::from_args(&args).enabled);
    }

    #[test]
    fn builders_override_fields() {
        let config = RecorderConfig::enabled()
            .with_prefix(">> ")
            .with_syscall_marker(false);
        assert!(config.enabled);
        assert_eq!(config.prefix, ">> ");
        assert!(!config.syscall_marker);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_serializes_through_json() {
        let config = RecorderConfig::enabled().with_prefix("@@ ");
        let json = serde_json::to_string(&config).expect("serialize");
        let back: RecorderConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, config);
    }
}
