// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.

use crate::connection::{Connection, ConnectionId, Socket};
use crate::node::{Node, NodeId};
use crate::port::{PortDirection, PortId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A node graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Connections between nodes
    connections: IndexMap<ConnectionId, Connection>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node and its connections
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.connections.retain(|_, c| !c.touches(node_id));
        // Remove the node
        self.nodes.shift_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Add a connection between ports
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_port: PortId,
        to_node: NodeId,
        to_port: PortId,
    ) -> Result<ConnectionId, ConnectionError> {
        // Validate nodes exist
        let source_node = self.nodes.get(&from_node)
            .ok_or(ConnectionError::NodeNotFound(from_node))?;
        let target_node = self.nodes.get(&to_node)
            .ok_or(ConnectionError::NodeNotFound(to_node))?;

        // Validate ports exist
        let source_port = source_node.port(&from_port)
            .ok_or(ConnectionError::PortNotFound(from_port))?;
        let target_port = target_node.port(&to_port)
            .ok_or(ConnectionError::PortNotFound(to_port))?;

        if source_port.direction != PortDirection::Output
            || target_port.direction != PortDirection::Input
        {
            return Err(ConnectionError::WrongDirection);
        }

        // Validate connection is valid
        if !source_port.can_connect(target_port) {
            return Err(ConnectionError::IncompatiblePorts);
        }

        // Check for existing connection to this input (if not multi-connect)
        if !target_port.multi_connect && self.connections.values().any(|c| c.to.port == to_port) {
            return Err(ConnectionError::PortAlreadyConnected(to_port));
        }

        // Prevent self-loops
        if from_node == to_node {
            return Err(ConnectionError::SelfLoop);
        }

        // Shading graphs are acyclic: reject edges that close a loop
        if self.reaches(to_node, from_node) {
            return Err(ConnectionError::Cycle);
        }

        let connection = Connection::new(
            Socket::new(from_node, from_port, source_port.name.clone()),
            Socket::new(to_node, to_port, target_port.name.clone()),
        );
        let id = connection.id;
        self.connections.insert(id, connection);
        Ok(id)
    }

    /// Connect two ports addressed by node and port name
    pub fn connect_named(
        &mut self,
        from_node: NodeId,
        from_port: &str,
        to_node: NodeId,
        to_port: &str,
    ) -> Result<ConnectionId, ConnectionError> {
        let from_id = self.port_id(from_node, PortDirection::Output, from_port)?;
        let to_id = self.port_id(to_node, PortDirection::Input, to_port)?;
        self.connect(from_node, from_id, to_node, to_id)
    }

    /// Look up the ID of a named port on a node
    pub fn port_id(
        &self,
        node_id: NodeId,
        direction: PortDirection,
        name: &str,
    ) -> Result<PortId, ConnectionError> {
        let node = self.nodes.get(&node_id)
            .ok_or(ConnectionError::NodeNotFound(node_id))?;
        node.port_named(direction, name)
            .map(|p| p.id)
            .ok_or_else(|| ConnectionError::PortNameNotFound(name.to_string()))
    }

    /// Remove a connection
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        self.connections.shift_remove(&connection_id)
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// The link entering a named input, if any
    pub fn connection_into(&self, node_id: NodeId, input: &str) -> Option<&Connection> {
        self.connections.values().find(|c| c.enters(node_id, input))
    }

    /// Unlink a named input; returns the number of links removed
    pub fn disconnect_input(&mut self, node_id: NodeId, input: &str) -> usize {
        let before = self.connections.len();
        self.connections.retain(|_, c| !c.enters(node_id, input));
        before - self.connections.len()
    }

    /// Links touching a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.touches(node_id))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Whether `to` is reachable from `from` by following connections downstream
    pub fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            for connection in self.connections.values() {
                if connection.from.node == current {
                    stack.push(connection.to.node);
                }
            }
        }
        false
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Error when creating a connection
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Port not found
    #[error("Port not found: {0:?}")]
    PortNotFound(PortId),

    /// No port with that name
    #[error("No port named '{0}'")]
    PortNameNotFound(String),

    /// Connection must run from an output to an input
    #[error("Connections must run from an output to an input")]
    WrongDirection,

    /// Incompatible port types
    #[error("Incompatible port types")]
    IncompatiblePorts,

    /// Port is already connected
    #[error("Port already connected: {0:?}")]
    PortAlreadyConnected(PortId),

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,

    /// The connection would close a cycle
    #[error("Connection would create a cycle")]
    Cycle,
}
