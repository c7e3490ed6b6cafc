// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader graph conversion for `OrdoPlay`.
//!
//! Converts a source material node graph into the target engine's node
//! vocabulary. A conversion runs in fixed stages:
//! - Snapshot: immutable copy of the source graph, passthroughs flattened
//! - Schedule: producers before consumers
//! - Instantiate: target nodes per source node, with a correspondence table
//! - Transfer: per-kind property handlers
//! - Links: socket resolution cascade
//! - Post-process: emission, transparency, normal and volume fixes
//! - Gamma: absolute gamma on colour image sites
//!
//! [`Converter`] drives the stages and consults a [`DedupCache`] so an
//! unchanged source is converted once.

pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod gamma;
pub mod instantiate;
pub mod kind;
pub mod links;
pub mod pipeline;
pub mod post;
pub mod registry;
pub mod schedule;
pub mod snapshot;
pub mod target;
pub mod transfer;
pub mod volume;

pub use cache::{CacheError, CacheLookup, CacheRecord, DedupCache};
pub use config::{ConversionSettings, FlattenPolicy, SettingsError};
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, Diagnostics, Stage, TracingSink};
pub use document::{DocumentNode, SourceDocument};
pub use error::{
    ConversionError, CyclicGraphError, ProviderError, SnapshotError, UnresolvedLinkError,
    UnsupportedKindError, ValueDomainWarning,
};
pub use gamma::apply_gamma;
pub use instantiate::{Correspondence, NodeRole};
pub use kind::{PassthroughFamily, SourceKind};
pub use links::{LinkRecord, MatchStrategy};
pub use pipeline::{ConversionOutcome, ConversionRequest, Converter};
pub use registry::TypeRegistry;
pub use snapshot::{Snapshot, SourceGraphProvider, SourceLink, SourceNode, SourceNodeId};
pub use target::{InMemoryScene, TargetGraph, TargetGraphExt, TargetHost};
