// SPDX-License-Identifier: MIT OR Apache-2.0
//! Target graph mutation interface and the in-memory host.
//!
//! The converter only ever talks to the target engine through
//! [`TargetGraph`]. Node kinds may fail to create, and sockets are only
//! known once a node exists.

use ordoplay_shader_graph::catalog::create_target_registry;
use ordoplay_shader_graph::{
    Connection, ConnectionError, Graph, Material, MaterialId, Node, NodeId, NodeRegistry,
    PortDirection, PortType, PortValue,
};
use indexmap::IndexMap;
use std::sync::Arc;

/// A socket as discovered on a live target node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketInfo {
    /// Socket name
    pub name: String,
    /// Value type
    pub port_type: PortType,
}

/// A link between two target sockets, addressed by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetLink {
    /// Producer node
    pub from_node: NodeId,
    /// Producer output name
    pub from_socket: String,
    /// Consumer node
    pub to_node: NodeId,
    /// Consumer input name
    pub to_socket: String,
}

impl From<&Connection> for TargetLink {
    fn from(link: &Connection) -> Self {
        Self {
            from_node: link.from.node,
            from_socket: link.from.name.clone(),
            to_node: link.to.node,
            to_socket: link.to.name.clone(),
        }
    }
}

/// Capability-query interface over one target material graph
pub trait TargetGraph {
    /// Whether a node kind is available in this environment
    fn can_create(&self, kind: &str) -> bool;

    /// Create a node; `None` if the kind is not available
    fn create_node(&mut self, kind: &str) -> Option<NodeId>;

    /// Remove a node and every link touching it
    fn remove_node(&mut self, node: NodeId) -> bool;

    /// Kind of a node
    fn node_kind(&self, node: NodeId) -> Option<String>;

    /// All nodes in creation order
    fn node_ids(&self) -> Vec<NodeId>;

    /// Set the display label
    fn set_label(&mut self, node: NodeId, label: &str);

    /// Set the editor position
    fn set_position(&mut self, node: NodeId, position: [f32; 2]);

    /// Sockets of one direction, in declaration order
    fn sockets(&self, node: NodeId, direction: PortDirection) -> Vec<SocketInfo>;

    /// Set a node-level parameter
    fn set_parameter(&mut self, node: NodeId, name: &str, value: PortValue);

    /// Read a node-level parameter
    fn parameter(&self, node: NodeId, name: &str) -> Option<PortValue>;

    /// Set the literal value of an input, coerced to its type.
    /// Returns false if the input is missing or the value cannot be coerced.
    fn set_input(&mut self, node: NodeId, socket: &str, value: PortValue) -> bool;

    /// Literal value of an input
    fn input_value(&self, node: NodeId, socket: &str) -> Option<PortValue>;

    /// Link an output to an input
    fn create_link(
        &mut self,
        from_node: NodeId,
        from_socket: &str,
        to_node: NodeId,
        to_socket: &str,
    ) -> Result<(), ConnectionError>;

    /// All links in creation order
    fn links(&self) -> Vec<TargetLink>;

    /// Remove the link entering an input, if any
    fn remove_links_into(&mut self, node: NodeId, socket: &str) -> usize;
}

/// Query helpers shared by the later stages
pub trait TargetGraphExt: TargetGraph {
    /// Whether a node exposes a socket
    fn has_socket(&self, node: NodeId, direction: PortDirection, name: &str) -> bool {
        self.sockets(node, direction).iter().any(|s| s.name == name)
    }

    /// Type of a socket
    fn socket_type(&self, node: NodeId, direction: PortDirection, name: &str) -> Option<PortType> {
        self.sockets(node, direction)
            .into_iter()
            .find(|s| s.name == name)
            .map(|s| s.port_type)
    }

    /// The link entering an input
    fn link_into(&self, node: NodeId, socket: &str) -> Option<TargetLink> {
        self.links()
            .into_iter()
            .find(|l| l.to_node == node && l.to_socket == socket)
    }

    /// Links leaving a node
    fn links_from(&self, node: NodeId) -> Vec<TargetLink> {
        self.links().into_iter().filter(|l| l.from_node == node).collect()
    }

    /// Whether an input carries a link
    fn is_linked(&self, node: NodeId, socket: &str) -> bool {
        self.link_into(node, socket).is_some()
    }

    /// Nodes of one kind
    fn nodes_of_kind(&self, kind: &str) -> Vec<NodeId> {
        self.node_ids()
            .into_iter()
            .filter(|id| self.node_kind(*id).as_deref() == Some(kind))
            .collect()
    }
}

impl<T: TargetGraph + ?Sized> TargetGraphExt for T {}

/// Host scene that owns target materials
pub trait TargetHost {
    /// Create an empty material
    fn create_material(&mut self, name: &str) -> MaterialId;

    /// Whether a material still exists
    fn contains_material(&self, id: MaterialId) -> bool;

    /// Drop a material, e.g. a partial result of a failed run
    fn discard_material(&mut self, id: MaterialId) -> bool;

    /// Mutable graph access to a material
    fn material_graph(&mut self, id: MaterialId) -> Option<&mut dyn TargetGraph>;
}

/// A material together with the registry its nodes come from
#[derive(Debug, Clone)]
pub struct SceneMaterial {
    material: Material,
    registry: Arc<NodeRegistry>,
}

impl SceneMaterial {
    /// Wrap a material
    pub fn new(material: Material, registry: Arc<NodeRegistry>) -> Self {
        Self { material, registry }
    }

    /// The material
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Take the material
    pub fn into_material(self) -> Material {
        self.material
    }

    fn graph(&self) -> &Graph {
        &self.material.graph
    }

    fn graph_mut(&mut self) -> &mut Graph {
        &mut self.material.graph
    }

    fn input_mut(&mut self, node: NodeId, socket: &str) -> Option<&mut ordoplay_shader_graph::Port> {
        self.graph_mut().node_mut(node)?.input_named_mut(socket)
    }
}

impl TargetGraph for SceneMaterial {
    fn can_create(&self, kind: &str) -> bool {
        self.registry.contains(kind)
    }

    fn create_node(&mut self, kind: &str) -> Option<NodeId> {
        let node: Node = self.registry.create_node(kind)?;
        Some(self.graph_mut().add_node(node))
    }

    fn remove_node(&mut self, node: NodeId) -> bool {
        self.graph_mut().remove_node(node).is_some()
    }

    fn node_kind(&self, node: NodeId) -> Option<String> {
        self.graph().node(node).map(|n| n.node_type.clone())
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.graph().node_ids().collect()
    }

    fn set_label(&mut self, node: NodeId, label: &str) {
        if let Some(node) = self.graph_mut().node_mut(node) {
            node.name = label.to_string();
        }
    }

    fn set_position(&mut self, node: NodeId, position: [f32; 2]) {
        if let Some(node) = self.graph_mut().node_mut(node) {
            node.position = position;
        }
    }

    fn sockets(&self, node: NodeId, direction: PortDirection) -> Vec<SocketInfo> {
        self.graph()
            .node(node)
            .map(|n| {
                n.ports_in(direction)
                    .iter()
                    .map(|p| SocketInfo {
                        name: p.name.clone(),
                        port_type: p.port_type,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn set_parameter(&mut self, node: NodeId, name: &str, value: PortValue) {
        if let Some(node) = self.graph_mut().node_mut(node) {
            node.set_param(name, value);
        }
    }

    fn parameter(&self, node: NodeId, name: &str) -> Option<PortValue> {
        self.graph().node(node)?.param(name).cloned()
    }

    fn set_input(&mut self, node: NodeId, socket: &str, value: PortValue) -> bool {
        let Some(port) = self.input_mut(node, socket) else {
            return false;
        };
        match value.coerce_to(port.port_type) {
            Some(coerced) => {
                port.default_value = Some(coerced);
                true
            }
            None => false,
        }
    }

    fn input_value(&self, node: NodeId, socket: &str) -> Option<PortValue> {
        self.graph()
            .node(node)?
            .port_named(PortDirection::Input, socket)?
            .default_value
            .clone()
    }

    fn create_link(
        &mut self,
        from_node: NodeId,
        from_socket: &str,
        to_node: NodeId,
        to_socket: &str,
    ) -> Result<(), ConnectionError> {
        self.graph_mut()
            .connect_named(from_node, from_socket, to_node, to_socket)
            .map(|_| ())
    }

    fn links(&self) -> Vec<TargetLink> {
        self.graph().connections().map(TargetLink::from).collect()
    }

    fn remove_links_into(&mut self, node: NodeId, socket: &str) -> usize {
        self.graph_mut().disconnect_input(node, socket)
    }
}

/// Host scene kept entirely in memory
#[derive(Debug, Clone)]
pub struct InMemoryScene {
    registry: Arc<NodeRegistry>,
    materials: IndexMap<MaterialId, SceneMaterial>,
}

impl InMemoryScene {
    /// Scene whose materials draw nodes from `registry`
    pub fn new(registry: NodeRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            materials: IndexMap::new(),
        }
    }

    /// Scene backed by the full target catalog
    pub fn with_catalog() -> Self {
        Self::new(create_target_registry())
    }

    /// Node registry of this scene
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// A material
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id).map(SceneMaterial::material)
    }

    /// Read-only graph view of a material
    pub fn graph(&self, id: MaterialId) -> Option<&SceneMaterial> {
        self.materials.get(&id)
    }

    /// Add an existing material, e.g. one loaded from disk
    pub fn insert_material(&mut self, material: Material) -> MaterialId {
        let id = material.id;
        self.materials
            .insert(id, SceneMaterial::new(material, Arc::clone(&self.registry)));
        id
    }

    /// Take a material out of the scene
    pub fn take_material(&mut self, id: MaterialId) -> Option<Material> {
        self.materials.shift_remove(&id).map(SceneMaterial::into_material)
    }

    /// All materials in creation order
    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.materials.values().map(SceneMaterial::material)
    }

    /// Number of materials
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}

impl Default for InMemoryScene {
    fn default() -> Self {
        Self::with_catalog()
    }
}

impl TargetHost for InMemoryScene {
    fn create_material(&mut self, name: &str) -> MaterialId {
        self.insert_material(Material::new(name))
    }

    fn contains_material(&self, id: MaterialId) -> bool {
        self.materials.contains_key(&id)
    }

    fn discard_material(&mut self, id: MaterialId) -> bool {
        self.materials.shift_remove(&id).is_some()
    }

    fn material_graph(&mut self, id: MaterialId) -> Option<&mut dyn TargetGraph> {
        self.materials
            .get_mut(&id)
            .map(|m| m as &mut dyn TargetGraph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_link_by_name() {
        let mut scene = InMemoryScene::with_catalog();
        let id = scene.create_material("Test");
        let graph = scene.material_graph(id).unwrap();

        let image = graph.create_node("ShaderNodeOctImageTex").unwrap();
        let material = graph.create_node("ShaderNodeOctUniversalMat").unwrap();
        assert!(graph.create_node("OctaneImageTexture").is_none());

        graph.create_link(image, "OutTex", material, "Albedo color").unwrap();
        assert!(graph.is_linked(material, "Albedo color"));
        assert!(graph
            .create_link(image, "OutTex", material, "Albedo color")
            .is_err());

        assert_eq!(graph.remove_links_into(material, "Albedo color"), 1);
        assert!(graph.links().is_empty());
    }

    #[test]
    fn test_set_input_coerces() {
        let mut scene = InMemoryScene::with_catalog();
        let id = scene.create_material("Test");
        let graph = scene.material_graph(id).unwrap();
        let material = graph.create_node("ShaderNodeOctUniversalMat").unwrap();

        assert!(graph.set_input(material, "Albedo color", PortValue::Float(0.5)));
        assert_eq!(
            graph.input_value(material, "Albedo color"),
            Some(PortValue::Color([0.5, 0.5, 0.5, 1.0]))
        );
        assert!(!graph.set_input(material, "No such socket", PortValue::Float(1.0)));
    }

    #[test]
    fn test_discard_material() {
        let mut scene = InMemoryScene::with_catalog();
        let id = scene.create_material("Gone");
        assert!(scene.contains_material(id));
        assert!(scene.discard_material(id));
        assert!(!scene.contains_material(id));
    }
}
