// SPDX-License-Identifier: MIT OR Apache-2.0
//! Non-fatal diagnostics collected during a conversion.

use crate::error::{UnresolvedLinkError, UnsupportedKindError, ValueDomainWarning};
use crate::snapshot::SourceNodeId;
use std::fmt;

/// Pipeline stage that produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Graph snapshot
    Snapshot,
    /// Node instantiation
    Instantiate,
    /// Property transfer
    Transfer,
    /// Link reconstruction
    Links,
    /// Post-processing
    PostProcess,
    /// Gamma correction
    Gamma,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Snapshot => "snapshot",
            Self::Instantiate => "instantiate",
            Self::Transfer => "transfer",
            Self::Links => "links",
            Self::PostProcess => "post-process",
            Self::Gamma => "gamma",
        };
        f.write_str(name)
    }
}

/// What went wrong
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    /// Node left unconverted
    UnsupportedKind(UnsupportedKindError),
    /// Link dropped
    UnresolvedLink(UnresolvedLinkError),
    /// Value clamped or defaulted
    ValueDomain(ValueDomainWarning),
    /// Informational note (e.g. a helper node could not be created)
    Note,
}

/// A structured non-fatal warning
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Stage that raised it
    pub stage: Stage,
    /// Source node involved, if any
    pub source_node: Option<SourceNodeId>,
    /// Classification
    pub kind: DiagnosticKind,
    /// Human readable message
    pub message: String,
}

impl Diagnostic {
    /// Whether this is an unsupported-kind record
    pub fn is_unsupported_kind(&self) -> bool {
        matches!(self.kind, DiagnosticKind::UnsupportedKind(_))
    }

    /// Whether this is an unresolved-link record
    pub fn is_unresolved_link(&self) -> bool {
        matches!(self.kind, DiagnosticKind::UnresolvedLink(_))
    }

    /// Whether this is a value-domain record
    pub fn is_value_domain(&self) -> bool {
        matches!(self.kind, DiagnosticKind::ValueDomain(_))
    }
}

/// Receiver for diagnostics. Delivery is fire-and-forget.
pub trait DiagnosticSink: Send + Sync {
    /// Accept one record
    fn report(&self, diagnostic: &Diagnostic);
}

/// Sink that forwards every record as a `tracing` warning
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        tracing::warn!(
            stage = %diagnostic.stage,
            source_node = ?diagnostic.source_node,
            "{}",
            diagnostic.message
        );
    }
}

/// Accumulator for the diagnostics of one conversion
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic
    pub fn push(
        &mut self,
        stage: Stage,
        source_node: Option<SourceNodeId>,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) {
        self.records.push(Diagnostic {
            stage,
            source_node,
            kind,
            message: message.into(),
        });
    }

    /// Record an unsupported kind
    pub fn unsupported(&mut self, source_node: SourceNodeId, error: UnsupportedKindError) {
        let message = error.to_string();
        self.push(
            Stage::Instantiate,
            Some(source_node),
            DiagnosticKind::UnsupportedKind(error),
            message,
        );
    }

    /// Record a dropped link
    pub fn unresolved(
        &mut self,
        stage: Stage,
        source_node: Option<SourceNodeId>,
        error: UnresolvedLinkError,
    ) {
        let message = error.to_string();
        self.push(stage, source_node, DiagnosticKind::UnresolvedLink(error), message);
    }

    /// Record a clamped value
    pub fn clamped(&mut self, source_node: SourceNodeId, warning: ValueDomainWarning) {
        let message = warning.to_string();
        self.push(
            Stage::Transfer,
            Some(source_node),
            DiagnosticKind::ValueDomain(warning),
            message,
        );
    }

    /// Record an informational note
    pub fn note(&mut self, stage: Stage, source_node: Option<SourceNodeId>, message: impl Into<String>) {
        self.push(stage, source_node, DiagnosticKind::Note, message);
    }

    /// All records in arrival order
    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Forward every record to a sink
    pub fn deliver(&self, sink: &dyn DiagnosticSink) {
        for record in &self.records {
            sink.report(record);
        }
    }

    /// Take the records
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recording(Mutex<Vec<Stage>>);

    impl DiagnosticSink for Recording {
        fn report(&self, diagnostic: &Diagnostic) {
            self.0.lock().push(diagnostic.stage);
        }
    }

    #[test]
    fn test_deliver_in_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.note(Stage::Links, None, "first");
        diagnostics.clamped(
            SourceNodeId(3),
            ValueDomainWarning {
                property: "IOR".into(),
                value: 0.2,
                clamped: 1.0,
            },
        );

        let sink = Recording::default();
        diagnostics.deliver(&sink);
        assert_eq!(*sink.0.lock(), vec![Stage::Links, Stage::Transfer]);
        assert!(diagnostics.records()[1].is_value_domain());
        assert_eq!(diagnostics.records()[1].message, "'IOR' value 0.2 clamped to 1");
    }
}
