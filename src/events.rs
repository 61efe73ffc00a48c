//! Run diagnostics
//!
//! Components do not talk to a global logger directly. Each run threads an
//! [`EventLog`] through its components; events are forwarded to the `log`
//! facade and retained for the run summary. Warning and error events are
//! additionally echoed to standard output for immediate operator visibility.

use log::Level;

/// Severity of a run diagnostic.
///
/// `Warning` covers advisory conditions (unrecognized metadata keys,
/// validation failures); `Error` covers line- and batch-scoped failures
/// (unknown override markers, aborted batches).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    fn level(self) -> Level {
        match self {
            Self::Info => Level::Info,
            Self::Warning => Level::Warn,
            Self::Error => Level::Error,
        }
    }
}

/// A single diagnostic emitted during a run.
#[derive(Debug, Clone)]
pub struct Event {
    pub severity: Severity,
    pub message: String,
}

/// Diagnostic sink threaded explicitly through each component of a run.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<Event>,
    echo: bool,
}

impl EventLog {
    /// A sink that echoes warnings and errors to standard output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            echo: true,
        }
    }

    /// A sink without the stdout echo.
    #[must_use]
    pub fn quiet() -> Self {
        Self {
            events: Vec::new(),
            echo: false,
        }
    }

    pub fn record(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        log::log!(severity.level(), "{message}");
        if self.echo && severity >= Severity::Warning {
            println!("{message}");
        }
        self.events.push(Event { severity, message });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(Severity::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.record(Severity::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.record(Severity::Error, message);
    }

    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events at or above the given severity.
    #[must_use]
    pub fn count_at_least(&self, severity: Severity) -> usize {
        self.events.iter().filter(|e| e.severity >= severity).count()
    }

    /// Absorbs the events of another sink, preserving their order.
    ///
    /// Used to merge per-batch sinks back into the run sink after a
    /// parallel fan-out; the merged events are not re-echoed.
    pub fn absorb(&mut self, other: EventLog) {
        self.events.extend(other.events);
    }
}
