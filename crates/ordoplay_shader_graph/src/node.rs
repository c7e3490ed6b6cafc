// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph framework.

use crate::port::{Port, PortDirection, PortId, PortValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Node type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Surface materials
    Material,
    /// Texture generators and texture math
    Texture,
    /// Emission distributions
    Emission,
    /// Volume media
    Medium,
    /// Projections and coordinate transforms
    Coordinates,
    /// Constant inputs
    Input,
    /// Output nodes
    Output,
    /// Environments
    Environment,
}

/// Node type definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeType {
    /// Unique type identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: String,
    /// Default input ports
    pub inputs: Vec<Port>,
    /// Default output ports
    pub outputs: Vec<Port>,
}

/// A node instance in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node type ID
    pub node_type: String,
    /// Display name (can be customized)
    pub name: String,
    /// Position in the graph UI
    pub position: [f32; 2],
    /// Input ports
    pub inputs: Vec<Port>,
    /// Output ports
    pub outputs: Vec<Port>,
    /// Node-level parameters (modes, flags, file paths)
    pub params: IndexMap<String, PortValue>,
}

impl Node {
    /// Create a new node from a type definition
    pub fn new(node_type: &NodeType) -> Self {
        Self {
            id: NodeId::new(),
            node_type: node_type.id.clone(),
            name: node_type.name.clone(),
            position: [0.0, 0.0],
            inputs: node_type.inputs.iter().map(Port::instantiate).collect(),
            outputs: node_type.outputs.iter().map(Port::instantiate).collect(),
            params: IndexMap::new(),
        }
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Get an input port by index
    pub fn input(&self, index: usize) -> Option<&Port> {
        self.inputs.get(index)
    }

    /// Get an output port by index
    pub fn output(&self, index: usize) -> Option<&Port> {
        self.outputs.get(index)
    }

    /// Get a port by ID
    pub fn port(&self, port_id: &PortId) -> Option<&Port> {
        self.inputs.iter().find(|p| p.id == *port_id)
            .or_else(|| self.outputs.iter().find(|p| p.id == *port_id))
    }

    /// Find a port by exact name in one direction
    pub fn port_named(&self, direction: PortDirection, name: &str) -> Option<&Port> {
        self.ports_in(direction).iter().find(|p| p.name == name)
    }

    /// Find a mutable input port by exact name
    pub fn input_named_mut(&mut self, name: &str) -> Option<&mut Port> {
        self.inputs.iter_mut().find(|p| p.name == name)
    }

    /// Ports of one direction, in declaration order
    pub fn ports_in(&self, direction: PortDirection) -> &[Port] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }

    /// Get all ports
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// Set a node-level parameter, returning the previous value
    pub fn set_param(&mut self, name: impl Into<String>, value: PortValue) -> Option<PortValue> {
        self.params.insert(name.into(), value)
    }

    /// Get a node-level parameter
    pub fn param(&self, name: &str) -> Option<&PortValue> {
        self.params.get(name)
    }
}

/// Registry of available node types
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    /// Registered node types by ID
    types: IndexMap<String, NodeType>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            types: IndexMap::new(),
        }
    }

    /// Register a node type
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.id.clone(), node_type);
    }

    /// Remove a node type (e.g. to model an engine build that lacks it)
    pub fn unregister(&mut self, id: &str) -> Option<NodeType> {
        self.types.shift_remove(id)
    }

    /// Get a node type by ID
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// Whether a node type is registered
    pub fn contains(&self, id: &str) -> bool {
        self.types.contains_key(id)
    }

    /// Get all registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Get types by category
    pub fn types_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeType> {
        self.types.values().filter(move |t| t.category == category)
    }

    /// Create a node from a type ID
    pub fn create_node(&self, type_id: &str) -> Option<Node> {
        self.get(type_id).map(Node::new)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::PortType;

    fn sample_type() -> NodeType {
        NodeType {
            id: "sample".to_string(),
            name: "Sample".to_string(),
            category: NodeCategory::Texture,
            description: String::new(),
            inputs: vec![Port::input("Amount", PortType::Float)],
            outputs: vec![Port::output("OutTex", PortType::Texture)],
        }
    }

    #[test]
    fn test_instances_get_fresh_port_ids() {
        let ty = sample_type();
        let a = Node::new(&ty);
        let b = Node::new(&ty);
        assert_ne!(a.inputs[0].id, b.inputs[0].id);
        assert_eq!(a.inputs[0].name, b.inputs[0].name);
    }

    #[test]
    fn test_registry_unregister() {
        let mut registry = NodeRegistry::new();
        registry.register(sample_type());
        assert!(registry.create_node("sample").is_some());
        registry.unregister("sample");
        assert!(!registry.contains("sample"));
        assert!(registry.create_node("sample").is_none());
    }
}
