// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph model for `OrdoPlay` shader conversion.
//!
//! This crate describes the graphs a conversion produces:
//! - Typed input/output ports with implicit conversions
//! - Nodes instantiated from a registry of node types
//! - Connection validation (direction, type, single-input, acyclicity)
//! - The catalog of node kinds the target engine exposes
//! - Materials with RON serialization

pub mod node;
pub mod port;
pub mod connection;
pub mod graph;
pub mod catalog;
pub mod material;

pub use node::{Node, NodeCategory, NodeId, NodeRegistry, NodeType};
pub use port::{Port, PortId, PortType, PortDirection, PortValue};
pub use connection::{Connection, ConnectionId, Socket};
pub use graph::{ConnectionError, Graph};
pub use material::{Material, MaterialError, MaterialId};
