// SPDX-License-Identifier: MIT OR Apache-2.0
//! Links between node sockets.
//!
//! A link remembers both socket names next to the port IDs, so a material
//! read back from disk still says which sockets it joins without resolving
//! every port.

use crate::node::NodeId;
use crate::port::PortId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a link inside one graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Fresh link ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// One end of a link
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Socket {
    /// Owning node
    pub node: NodeId,
    /// Port on that node
    pub port: PortId,
    /// Port name as declared by the node type
    pub name: String,
}

impl Socket {
    /// Address a named port
    pub fn new(node: NodeId, port: PortId, name: impl Into<String>) -> Self {
        Self {
            node,
            port,
            name: name.into(),
        }
    }

    /// Whether this is the named socket of `node`
    pub fn is(&self, node: NodeId, name: &str) -> bool {
        self.node == node && self.name == name
    }
}

/// A link from an output socket into an input socket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Link ID
    pub id: ConnectionId,
    /// Producing output
    pub from: Socket,
    /// Consuming input
    pub to: Socket,
}

impl Connection {
    /// Link `from` into `to`
    pub fn new(from: Socket, to: Socket) -> Self {
        Self {
            id: ConnectionId::new(),
            from,
            to,
        }
    }

    /// Whether either end sits on `node`
    pub fn touches(&self, node: NodeId) -> bool {
        self.from.node == node || self.to.node == node
    }

    /// Whether the link enters the named input of `node`
    pub fn enters(&self, node: NodeId, input: &str) -> bool {
        self.to.is(node, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_ends() {
        let (a, b) = (NodeId::new(), NodeId::new());
        let link = Connection::new(
            Socket::new(a, PortId::new(), "OutTex"),
            Socket::new(b, PortId::new(), "Albedo color"),
        );
        assert!(link.touches(a) && link.touches(b));
        assert!(!link.touches(NodeId::new()));
        assert!(link.enters(b, "Albedo color"));
        assert!(!link.enters(a, "Albedo color"));
        assert!(!link.enters(b, "Roughness"));
    }
}
