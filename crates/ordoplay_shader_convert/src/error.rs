// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error taxonomy for conversions.
//!
//! `SnapshotError` and `CyclicGraphError` abort a conversion and surface as
//! [`ConversionError`]. The per-node and per-link families never propagate;
//! they travel inside [`Diagnostic`](crate::diagnostics::Diagnostic) records.

use crate::snapshot::SourceNodeId;
use ordoplay_shader_graph::MaterialId;

/// Failure reported by a source graph provider
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider has no node with this name
    #[error("Source node not found: {0}")]
    NodeNotFound(String),

    /// The provider could not produce its graph
    #[error("Source graph unreadable: {0}")]
    Unreadable(String),

    /// Filesystem failure while loading a source document
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The source graph could not be captured
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Provider failure
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Two nodes share a name
    #[error("Duplicate source node name '{0}'")]
    DuplicateNode(String),

    /// A link names a node that does not exist
    #[error("Link references missing node '{0}'")]
    DanglingLink(String),

    /// A link names a socket that does not exist on its node
    #[error("Link references missing socket '{socket}' on node '{node}'")]
    DanglingSocket {
        /// Node name
        node: String,
        /// Socket name or identifier
        socket: String,
    },

    /// The snapshot could not be encoded for fingerprinting
    #[error("Failed to fingerprint snapshot: {0}")]
    Fingerprint(String),
}

/// The link graph has a cycle after reroute flattening
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Source graph is cyclic; {} node(s) could not be ordered", .nodes.len())]
pub struct CyclicGraphError {
    /// Nodes left unscheduled, in ascending ID order
    pub nodes: Vec<SourceNodeId>,
}

/// No candidate target kind could be created for a source kind
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No creatable target kind for '{kind}' (tried: {})", .tried.join(", "))]
pub struct UnsupportedKindError {
    /// Source kind tag
    pub kind: String,
    /// Candidates that were tried
    pub tried: Vec<String>,
}

/// A source link could not be rebuilt in the target graph
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unresolved link {from} -> {to}: {reason}")]
pub struct UnresolvedLinkError {
    /// Producer side, `node.socket`
    pub from: String,
    /// Consumer side, `node.socket`
    pub to: String,
    /// Why it was dropped
    pub reason: String,
}

/// A value was outside the domain its handler expects
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("'{property}' value {value} clamped to {clamped}")]
pub struct ValueDomainWarning {
    /// Property or socket name
    pub property: String,
    /// Value read from the source
    pub value: f32,
    /// Value written to the target
    pub clamped: f32,
}

/// Fatal conversion failure
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// Snapshot failed
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Scheduling failed
    #[error(transparent)]
    Cyclic(#[from] CyclicGraphError),

    /// The host lost the material mid-conversion
    #[error("Target material not found: {0}")]
    MaterialNotFound(MaterialId),
}
