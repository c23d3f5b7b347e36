//! # Runtime Error Guard
//!
//! Any failure inside frame processing or prompt display stops the session
//! and tells the player something went wrong, exactly once. A failure cascade
//! (the stop itself failing, collaborators erroring while the stop runs)
//! must not trigger a second stop-and-report cycle, so the guard latches a
//! busy flag for the duration of the first report.
//!
//! The user-visible strings are fixed; whatever detail the error carried
//! goes to the log and nowhere else.

use std::cell::Cell;

use crate::MessageTone;

/// Status line shown when the guard stops a session.
pub const RUNTIME_ERROR_STATUS: &str = "Something went wrong. The session was stopped.";

/// Result line shown when the guard stops a session.
pub const RUNTIME_ERROR_RESULT: &str = "An unexpected error occurred. Please start again.";

/// Session collaborators the guard drives.
///
/// Methods take `&self` so an implementation with interior mutability can
/// re-enter the guard from inside `stop_session` without a borrow conflict;
/// the guard's busy latch turns that reentry into a log-only call.
pub trait SessionHooks {
    fn stop_session(&self) -> anyhow::Result<()>;
    fn set_status(&self, text: &str);
    fn set_result(&self, text: &str, tone: MessageTone);
    fn log_error(&self, context: &str, detail: &str);
}

/// Reentrancy-safe stop-and-report wrapper.
#[derive(Debug, Default)]
pub struct ErrorGuard {
    handling: Cell<bool>,
}

impl ErrorGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports a runtime error.
    ///
    /// The error is logged unconditionally. If no report is already in
    /// flight, the guard stops the session (a failing stop is logged
    /// separately and swallowed) and posts the fixed status and result
    /// messages. Reports arriving while one is in flight are logged only.
    pub fn report(&self, hooks: &dyn SessionHooks, context: &str, error: &anyhow::Error) {
        hooks.log_error(context, &format!("{:#}", error));

        if self.handling.get() {
            return;
        }
        self.handling.set(true);

        if let Err(stop_error) = hooks.stop_session() {
            hooks.log_error("error guard stop", &format!("{:#}", stop_error));
        }
        hooks.set_status(RUNTIME_ERROR_STATUS);
        hooks.set_result(RUNTIME_ERROR_RESULT, MessageTone::Error);

        self.handling.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Recorder {
        stops: Cell<u32>,
        statuses: RefCell<Vec<String>>,
        results: RefCell<Vec<String>>,
        logs: RefCell<Vec<(String, String)>>,
        fail_stop: Cell<bool>,
    }

    struct PlainHooks<'a>(&'a Recorder);

    impl SessionHooks for PlainHooks<'_> {
        fn stop_session(&self) -> anyhow::Result<()> {
            self.0.stops.set(self.0.stops.get() + 1);
            if self.0.fail_stop.get() {
                return Err(anyhow!("audio device busy"));
            }
            Ok(())
        }
        fn set_status(&self, text: &str) {
            self.0.statuses.borrow_mut().push(text.to_string());
        }
        fn set_result(&self, text: &str, _tone: MessageTone) {
            self.0.results.borrow_mut().push(text.to_string());
        }
        fn log_error(&self, context: &str, detail: &str) {
            self.0
                .logs
                .borrow_mut()
                .push((context.to_string(), detail.to_string()));
        }
    }

    #[test]
    fn report_stops_once_with_fixed_messages() {
        let recorder = Recorder::default();
        let guard = ErrorGuard::new();
        guard.report(&PlainHooks(&recorder), "frame processing", &anyhow!("boom"));

        assert_eq!(recorder.stops.get(), 1);
        assert_eq!(
            *recorder.statuses.borrow(),
            vec![RUNTIME_ERROR_STATUS.to_string()]
        );
        assert_eq!(
            *recorder.results.borrow(),
            vec![RUNTIME_ERROR_RESULT.to_string()]
        );
        // The detail lands in the log, not in the user-facing strings.
        assert!(recorder.logs.borrow()[0].1.contains("boom"));
    }

    #[test]
    fn failing_stop_is_logged_and_swallowed() {
        let recorder = Recorder::default();
        recorder.fail_stop.set(true);
        let guard = ErrorGuard::new();
        guard.report(&PlainHooks(&recorder), "frame processing", &anyhow!("boom"));

        let logs = recorder.logs.borrow();
        assert!(logs.iter().any(|(ctx, _)| ctx == "error guard stop"));
        // Status and result still go out after the failed stop.
        assert_eq!(recorder.statuses.borrow().len(), 1);
        assert_eq!(recorder.results.borrow().len(), 1);
    }

    /// Hooks whose `stop_session` raises a second report against the same
    /// guard, as a collaborator failing mid-teardown would.
    struct ReentrantHooks<'a> {
        recorder: &'a Recorder,
        guard: &'a ErrorGuard,
    }

    impl SessionHooks for ReentrantHooks<'_> {
        fn stop_session(&self) -> anyhow::Result<()> {
            self.recorder.stops.set(self.recorder.stops.get() + 1);
            self.guard
                .report(self, "nested failure", &anyhow!("listener refused to stop"));
            Ok(())
        }
        fn set_status(&self, text: &str) {
            self.recorder.statuses.borrow_mut().push(text.to_string());
        }
        fn set_result(&self, text: &str, _tone: MessageTone) {
            self.recorder.results.borrow_mut().push(text.to_string());
        }
        fn log_error(&self, context: &str, detail: &str) {
            self.recorder
                .logs
                .borrow_mut()
                .push((context.to_string(), detail.to_string()));
        }
    }

    #[test]
    fn reentrant_report_is_logged_but_does_not_stop_twice() {
        let recorder = Recorder::default();
        let guard = ErrorGuard::new();
        let hooks = ReentrantHooks { recorder: &recorder, guard: &guard };

        guard.report(&hooks, "frame processing", &anyhow!("boom"));

        // Exactly one stop end-to-end, one status, one result.
        assert_eq!(recorder.stops.get(), 1);
        assert_eq!(recorder.statuses.borrow().len(), 1);
        assert_eq!(recorder.results.borrow().len(), 1);
        // Both the original and the nested error were logged.
        let logs = recorder.logs.borrow();
        assert!(logs.iter().any(|(ctx, _)| ctx == "frame processing"));
        assert!(logs.iter().any(|(ctx, _)| ctx == "nested failure"));
    }
}
