use parking_lot::Mutex;
use std::collections::HashMap;

/// Input noise that is dropped on purpose but can still be observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    /// A catalogue path that did not decompose into model/version/file
    MalformedPath(String),
    /// A `$ref` that points outside the document or at nothing
    UnresolvedReference(String),
    /// A `$ref` re-entered while it was already being expanded
    CyclicReference(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    MalformedPath,
    UnresolvedReference,
    CyclicReference,
}

impl DiagnosticEvent {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            DiagnosticEvent::MalformedPath(_) => DiagnosticKind::MalformedPath,
            DiagnosticEvent::UnresolvedReference(_) => DiagnosticKind::UnresolvedReference,
            DiagnosticEvent::CyclicReference(_) => DiagnosticKind::CyclicReference,
        }
    }
}

pub trait Diagnostics: Send + Sync {
    fn record(&self, event: DiagnosticEvent);
}

/// Logs at debug level and keeps nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn record(&self, event: DiagnosticEvent) {
        log::debug!("dropped input: {:?}", event);
    }
}

/// Keeps every event, mostly useful in tests
#[derive(Debug, Default)]
pub struct CountingDiagnostics {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl CountingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.events.lock().iter().filter(|e| e.kind() == kind).count()
    }

    pub fn counts(&self) -> HashMap<DiagnosticKind, usize> {
        let mut counts = HashMap::new();
        for event in self.events.lock().iter() {
            *counts.entry(event.kind()).or_insert(0) += 1;
        }
        counts
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().clone()
    }
}

impl Diagnostics for CountingDiagnostics {
    fn record(&self, event: DiagnosticEvent) {
        log::debug!("dropped input: {:?}", event);
        self.events.lock().push(event);
    }
}
