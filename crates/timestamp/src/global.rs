//! crates/timestamp/src/global.rs
//! Process-wide recorder for call sites that cannot thread one through.

use std::sync::OnceLock;

use crate::config::RecorderConfig;
use crate::recorder::Recorder;
use crate::scope::Scope;

static RECORDER: OnceLock<Recorder> = OnceLock::new();

/// Returns the process-wide recorder, building it on first use.
///
/// The first call reads `--timestamps` from the process arguments unless
/// [`init`] installed a configuration earlier. The recorder lives until the
/// process exits.
pub fn global() -> &'static Recorder {
    RECORDER.get_or_init(Recorder::from_env_args)
}

/// Installs `config` as the process-wide configuration.
///
/// Returns `false` when the recorder was already built, in which case the
/// existing configuration stays in effect.
pub fn init(config: RecorderConfig) -> bool {
    RECORDER.set(Recorder::new(config)).is_ok()
}

/// Emits `label` through the process-wide recorder.
pub fn emit(label: &str) {
    global().emit(label);
}

/// Whether the process-wide recorder produces output.
pub fn enabled() -> bool {
    global().is_enabled()
}

/// Opens a [`Scope`] on the process-wide recorder.
pub fn scope(name: &str) -> Scope<'static> {
    Scope::enter(global(), name)
}
