/// Injected error logging

/// Sink for workflow diagnostics.
///
/// The orchestrator reports every failure through this trait instead of a
/// process-wide logger so tests can count and inspect entries.
pub trait ErrorLog: Send + Sync {
    fn error(&self, msg: &str);
}

/// Forwards to `log::error!`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacade;

impl ErrorLog for LogFacade {
    fn error(&self, msg: &str) {
        log::error!(target: "scoreshare", "{}", msg);
    }
}
