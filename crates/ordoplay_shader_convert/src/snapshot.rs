// SPDX-License-Identifier: MIT OR Apache-2.0
//! Immutable snapshot of a source material graph.
//!
//! Capturing reads every node, socket and link from a
//! [`SourceGraphProvider`], then flattens passthrough nodes: each link that
//! enters a real consumer is traced back through passthroughs to the real
//! producer, and the passthroughs themselves are kept only as annotations.

use crate::config::{ConversionSettings, FlattenPolicy};
use crate::error::{ProviderError, SnapshotError};
use crate::kind::SourceKind;
use ordoplay_shader_graph::{PortDirection, PortType, PortValue};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Stable identifier of a node within one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceNodeId(pub u32);

impl fmt::Display for SourceNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A socket on a source node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSocket {
    /// Display name (not unique: a mix shader has two "Shader" inputs)
    pub name: String,
    /// Unique identifier within the node's inputs or outputs
    #[serde(default)]
    pub identifier: String,
    /// Value type
    pub socket_type: PortType,
    /// Literal value used when the socket is unlinked
    #[serde(default)]
    pub default: Option<PortValue>,
}

impl SourceSocket {
    /// Create a socket whose identifier equals its name
    pub fn new(name: impl Into<String>, socket_type: PortType) -> Self {
        let name = name.into();
        Self {
            identifier: name.clone(),
            name,
            socket_type,
            default: None,
        }
    }

    /// Override the identifier
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Set the literal default
    pub fn with_default(mut self, value: PortValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Key that addresses this socket within its node
    pub fn key(&self) -> &str {
        if self.identifier.is_empty() {
            &self.name
        } else {
            &self.identifier
        }
    }
}

/// Stop of a colour ramp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RampStop {
    /// Position in [0, 1]
    pub position: f32,
    /// RGBA colour
    pub color: [f32; 4],
}

/// Kind-specific node property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Flag
    Bool(bool),
    /// Integer
    Int(i64),
    /// Scalar
    Float(f32),
    /// Enum value, name or path
    Text(String),
    /// 3D vector
    Vector([f32; 3]),
    /// RGBA colour
    Color([f32; 4]),
    /// Colour ramp stops
    Ramp(Vec<RampStop>),
}

impl PropertyValue {
    /// Read as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Read as a flag
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(i) => Some(*i != 0),
            _ => None,
        }
    }

    /// Read as ramp stops
    pub fn as_ramp(&self) -> Option<&[RampStop]> {
        match self {
            Self::Ramp(stops) => Some(stops),
            _ => None,
        }
    }
}

/// A link as reported by the provider, addressed by node name and socket
/// identifier (or name)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLink {
    /// Producer node name
    pub from_node: String,
    /// Producer output identifier or name
    pub from_socket: String,
    /// Consumer node name
    pub to_node: String,
    /// Consumer input identifier or name
    pub to_socket: String,
}

/// Read-only access to an external source graph
pub trait SourceGraphProvider {
    /// Name of the material the graph belongs to
    fn material_name(&self) -> &str;

    /// Node names, in the provider's order
    fn node_names(&self) -> Result<Vec<String>, ProviderError>;

    /// Type tag of a node
    fn node_kind(&self, node: &str) -> Result<String, ProviderError>;

    /// User label of a node
    fn node_label(&self, node: &str) -> Result<Option<String>, ProviderError> {
        let _ = node;
        Ok(None)
    }

    /// Editor location of a node
    fn node_location(&self, node: &str) -> Result<[f32; 2], ProviderError> {
        let _ = node;
        Ok([0.0, 0.0])
    }

    /// Kind-specific properties of a node
    fn node_properties(&self, node: &str) -> Result<BTreeMap<String, PropertyValue>, ProviderError>;

    /// Sockets of a node with their defaults
    fn node_sockets(
        &self,
        node: &str,
        direction: PortDirection,
    ) -> Result<Vec<SourceSocket>, ProviderError>;

    /// All links
    fn links(&self) -> Result<Vec<RawLink>, ProviderError>;
}

/// A node of the snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceNode {
    /// Stable ID
    pub id: SourceNodeId,
    /// Name in the source graph
    pub name: String,
    /// Kind
    pub kind: SourceKind,
    /// User label
    pub label: Option<String>,
    /// Editor location
    pub location: [f32; 2],
    /// Input sockets in declaration order
    pub inputs: Vec<SourceSocket>,
    /// Output sockets in declaration order
    pub outputs: Vec<SourceSocket>,
    /// Kind-specific properties
    pub properties: BTreeMap<String, PropertyValue>,
}

fn find_socket<'a>(sockets: &'a [SourceSocket], key: &str) -> Option<(usize, &'a SourceSocket)> {
    sockets
        .iter()
        .enumerate()
        .find(|(_, s)| s.identifier == key)
        .or_else(|| sockets.iter().enumerate().find(|(_, s)| s.name == key))
}

impl SourceNode {
    /// Input by identifier, falling back to the first input with that name
    pub fn input(&self, key: &str) -> Option<&SourceSocket> {
        find_socket(&self.inputs, key).map(|(_, s)| s)
    }

    /// Output by identifier, falling back to the first output with that name
    pub fn output(&self, key: &str) -> Option<&SourceSocket> {
        find_socket(&self.outputs, key).map(|(_, s)| s)
    }

    /// Ordinal of a socket among the sockets of one direction
    pub fn socket_index(&self, direction: PortDirection, key: &str) -> Option<usize> {
        find_socket(self.sockets(direction), key).map(|(i, _)| i)
    }

    /// Sockets of one direction
    pub fn sockets(&self, direction: PortDirection) -> &[SourceSocket] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }

    /// Literal default of an input
    pub fn input_value(&self, key: &str) -> Option<&PortValue> {
        self.input(key).and_then(|s| s.default.as_ref())
    }

    /// Literal default of the first present input among several spellings
    pub fn first_value(&self, keys: &[&str]) -> Option<&PortValue> {
        keys.iter().find_map(|k| self.input_value(k))
    }

    /// Scalar default of an input
    pub fn float(&self, key: &str) -> Option<f32> {
        self.input_value(key).and_then(PortValue::as_float)
    }

    /// Colour default of an input
    pub fn color(&self, key: &str) -> Option<[f32; 4]> {
        self.input_value(key).and_then(PortValue::as_color)
    }

    /// Vector default of an input
    pub fn vector(&self, key: &str) -> Option<[f32; 3]> {
        self.input_value(key).and_then(PortValue::as_vector)
    }

    /// A property
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// A text property
    pub fn text_property(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(PropertyValue::as_text)
    }

    /// Label if set, else name
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// A flattened link between two real nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLink {
    /// Producer
    pub from_node: SourceNodeId,
    /// Producer output key
    pub from_socket: String,
    /// Consumer
    pub to_node: SourceNodeId,
    /// Consumer input key
    pub to_socket: String,
    /// Passthrough nodes that were skipped, producer side first
    pub via: Vec<SourceNodeId>,
}

/// Annotation left in place of an elided node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passthrough {
    /// ID the node would have had
    pub id: SourceNodeId,
    /// Name in the source graph
    pub name: String,
    /// Kind
    pub kind: SourceKind,
    /// Real producer feeding it, if any
    pub upstream: Option<(SourceNodeId, String)>,
}

#[derive(Debug, Clone)]
struct RawEdge {
    from: SourceNodeId,
    from_key: String,
    to: SourceNodeId,
    to_key: String,
}

/// Immutable copy of a source material graph
#[derive(Debug, Clone)]
pub struct Snapshot {
    material: String,
    nodes: BTreeMap<SourceNodeId, SourceNode>,
    links: Vec<SourceLink>,
    passthroughs: BTreeMap<SourceNodeId, Passthrough>,
}

impl Snapshot {
    /// Read a source graph and flatten passthroughs per `policy`
    pub fn capture(
        provider: &dyn SourceGraphProvider,
        policy: &FlattenPolicy,
    ) -> Result<Self, SnapshotError> {
        let names = provider.node_names()?;
        let mut ids: HashMap<String, SourceNodeId> = HashMap::with_capacity(names.len());
        let mut all: BTreeMap<SourceNodeId, SourceNode> = BTreeMap::new();

        for (index, name) in names.iter().enumerate() {
            let id = SourceNodeId(index as u32);
            if ids.insert(name.clone(), id).is_some() {
                return Err(SnapshotError::DuplicateNode(name.clone()));
            }
            let node = SourceNode {
                id,
                name: name.clone(),
                kind: SourceKind::from_tag(&provider.node_kind(name)?),
                label: provider.node_label(name)?,
                location: provider.node_location(name)?,
                inputs: provider.node_sockets(name, PortDirection::Input)?,
                outputs: provider.node_sockets(name, PortDirection::Output)?,
                properties: provider.node_properties(name)?,
            };
            all.insert(id, node);
        }

        // Resolve raw links to IDs and canonical socket keys
        let mut edges = Vec::new();
        for link in provider.links()? {
            let from = *ids
                .get(&link.from_node)
                .ok_or_else(|| SnapshotError::DanglingLink(link.from_node.clone()))?;
            let to = *ids
                .get(&link.to_node)
                .ok_or_else(|| SnapshotError::DanglingLink(link.to_node.clone()))?;
            let from_key = all
                .get(&from)
                .and_then(|n| n.output(&link.from_socket))
                .map(|s| s.key().to_string())
                .ok_or_else(|| SnapshotError::DanglingSocket {
                    node: link.from_node.clone(),
                    socket: link.from_socket.clone(),
                })?;
            let to_key = all
                .get(&to)
                .and_then(|n| n.input(&link.to_socket))
                .map(|s| s.key().to_string())
                .ok_or_else(|| SnapshotError::DanglingSocket {
                    node: link.to_node.clone(),
                    socket: link.to_socket.clone(),
                })?;
            edges.push(RawEdge { from, from_key, to, to_key });
        }

        let elided: BTreeSet<SourceNodeId> = all
            .values()
            .filter(|n| {
                n.kind
                    .passthrough_family()
                    .is_some_and(|family| policy.flattens(family))
            })
            .map(|n| n.id)
            .collect();

        // Each passthrough is fed by the producer of its first linked input
        let mut feeding: BTreeMap<SourceNodeId, (SourceNodeId, String)> = BTreeMap::new();
        for id in &elided {
            let Some(node) = all.get(id) else { continue };
            let first = node.inputs.iter().find_map(|socket| {
                edges
                    .iter()
                    .find(|e| e.to == *id && e.to_key == socket.key())
            });
            if let Some(edge) = first {
                feeding.insert(*id, (edge.from, edge.from_key.clone()));
            }
        }

        let trace = |start: SourceNodeId, key: &str| -> Option<(SourceNodeId, String, Vec<SourceNodeId>)> {
            let mut via = Vec::new();
            let (mut node, mut socket) = (start, key.to_string());
            while elided.contains(&node) {
                if via.contains(&node) {
                    // Loop made only of passthroughs: nothing real upstream
                    return None;
                }
                via.push(node);
                let (up, up_key) = feeding.get(&node)?;
                node = *up;
                socket = up_key.clone();
            }
            via.reverse();
            Some((node, socket, via))
        };

        let mut links = Vec::new();
        for edge in &edges {
            if elided.contains(&edge.to) {
                continue;
            }
            match trace(edge.from, &edge.from_key) {
                Some((from_node, from_socket, via)) => links.push(SourceLink {
                    from_node,
                    from_socket,
                    to_node: edge.to,
                    to_socket: edge.to_key.clone(),
                    via,
                }),
                None => tracing::debug!(
                    from = %edge.from,
                    to = %edge.to,
                    "dropping link with no real producer behind passthroughs"
                ),
            }
        }

        let mut passthroughs = BTreeMap::new();
        for id in &elided {
            let Some(node) = all.remove(id) else { continue };
            let upstream = feeding
                .get(id)
                .and_then(|(up, key)| trace(*up, key))
                .map(|(node, socket, _)| (node, socket));
            passthroughs.insert(
                *id,
                Passthrough {
                    id: *id,
                    name: node.name,
                    kind: node.kind,
                    upstream,
                },
            );
        }

        tracing::debug!(
            material = provider.material_name(),
            nodes = all.len(),
            links = links.len(),
            passthroughs = passthroughs.len(),
            "snapshot captured"
        );

        Ok(Self {
            material: provider.material_name().to_string(),
            nodes: all,
            links,
            passthroughs,
        })
    }

    /// Source material name
    pub fn material(&self) -> &str {
        &self.material
    }

    /// A real node
    pub fn node(&self, id: SourceNodeId) -> Option<&SourceNode> {
        self.nodes.get(&id)
    }

    /// Real nodes in ascending ID order
    pub fn nodes(&self) -> impl Iterator<Item = &SourceNode> {
        self.nodes.values()
    }

    /// Number of real nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// A real node by source name
    pub fn node_by_name(&self, name: &str) -> Option<&SourceNode> {
        self.nodes.values().find(|n| n.name == name)
    }

    /// Flattened links in provider order
    pub fn links(&self) -> &[SourceLink] {
        &self.links
    }

    /// Links entering a node
    pub fn links_into(&self, id: SourceNodeId) -> impl Iterator<Item = &SourceLink> {
        self.links.iter().filter(move |l| l.to_node == id)
    }

    /// Links leaving a node
    pub fn links_from(&self, id: SourceNodeId) -> impl Iterator<Item = &SourceLink> {
        self.links.iter().filter(move |l| l.from_node == id)
    }

    /// The link entering an input, addressed by identifier or name
    pub fn link_into(&self, id: SourceNodeId, key: &str) -> Option<&SourceLink> {
        let canonical = self.node(id)?.input(key)?.key().to_string();
        self.links_into(id).find(|l| l.to_socket == canonical)
    }

    /// Whether an input carries a link after flattening
    pub fn is_input_linked(&self, id: SourceNodeId, key: &str) -> bool {
        self.link_into(id, key).is_some()
    }

    /// Passthrough annotations
    pub fn passthroughs(&self) -> impl Iterator<Item = &Passthrough> {
        self.passthroughs.values()
    }

    /// Whether an ID belongs to an elided node
    pub fn is_passthrough(&self, id: SourceNodeId) -> bool {
        self.passthroughs.contains_key(&id)
    }

    /// Content hash over everything that affects conversion.
    ///
    /// Labels and editor locations are excluded. `object_scale` is included
    /// because it changes procedural scale, and so are the settings that
    /// shape the target graph. Gamma is not: it is reapplied on every hit.
    pub fn fingerprint(
        &self,
        object_scale: [f32; 3],
        settings: &ConversionSettings,
    ) -> Result<String, SnapshotError> {
        #[derive(Serialize)]
        struct NodeView<'a> {
            id: SourceNodeId,
            kind: &'a SourceKind,
            inputs: &'a [SourceSocket],
            outputs: &'a [SourceSocket],
            properties: &'a BTreeMap<String, PropertyValue>,
        }

        #[derive(Serialize)]
        struct SettingsView {
            transmission_threshold: f32,
            scale_tolerance: f32,
            flatten: FlattenPolicy,
            insert_emission_helpers: bool,
            merge_volumes: bool,
            fake_shadows_for_transmission: bool,
        }

        #[derive(Serialize)]
        struct View<'a> {
            nodes: Vec<NodeView<'a>>,
            links: &'a [SourceLink],
            passthroughs: Vec<(SourceNodeId, &'a SourceKind, &'a Option<(SourceNodeId, String)>)>,
            object_scale: [f32; 3],
            settings: SettingsView,
        }

        let view = View {
            nodes: self
                .nodes
                .values()
                .map(|n| NodeView {
                    id: n.id,
                    kind: &n.kind,
                    inputs: &n.inputs,
                    outputs: &n.outputs,
                    properties: &n.properties,
                })
                .collect(),
            links: &self.links,
            passthroughs: self
                .passthroughs
                .values()
                .map(|p| (p.id, &p.kind, &p.upstream))
                .collect(),
            object_scale,
            settings: SettingsView {
                transmission_threshold: settings.transmission_threshold,
                scale_tolerance: settings.scale_tolerance,
                flatten: settings.flatten,
                insert_emission_helpers: settings.insert_emission_helpers,
                merge_volumes: settings.merge_volumes,
                fake_shadows_for_transmission: settings.fake_shadows_for_transmission,
            },
        };

        let bytes =
            bincode::serialize(&view).map_err(|e| SnapshotError::Fingerprint(e.to_string()))?;
        let digest = Sha256::digest(&bytes);
        Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentNode, SourceDocument};

    fn chain_document() -> SourceDocument {
        let mut doc = SourceDocument::new("Chain");
        doc.push_node(DocumentNode::standard("Image", SourceKind::ImageTexture));
        doc.push_node(DocumentNode::standard("Separate", SourceKind::SeparateColor));
        doc.push_node(DocumentNode::standard("Math", SourceKind::Math));
        doc.push_node(DocumentNode::standard("BSDF", SourceKind::Principled));
        doc.link("Image", "Color", "Separate", "Color");
        doc.link("Separate", "Red", "Math", "Value");
        doc.link("Math", "Value", "BSDF", "Roughness");
        doc
    }

    #[test]
    fn test_passthrough_chain_flattens_to_single_link() {
        let snapshot = Snapshot::capture(&chain_document(), &FlattenPolicy::default()).unwrap();

        assert_eq!(snapshot.node_count(), 2);
        assert_eq!(snapshot.links().len(), 1);
        let link = &snapshot.links()[0];
        assert_eq!(snapshot.node(link.from_node).unwrap().name, "Image");
        assert_eq!(link.from_socket, "Color");
        assert_eq!(snapshot.node(link.to_node).unwrap().name, "BSDF");
        assert_eq!(link.via, vec![SourceNodeId(1), SourceNodeId(2)]);

        let math = snapshot.passthroughs().find(|p| p.name == "Math").unwrap();
        assert_eq!(math.upstream, Some((SourceNodeId(0), "Color".to_string())));
    }

    #[test]
    fn test_preserved_math_stays_real() {
        let mut policy = FlattenPolicy::default();
        policy.math = false;
        let snapshot = Snapshot::capture(&chain_document(), &policy).unwrap();
        assert_eq!(snapshot.node_count(), 3);
        assert!(snapshot.node_by_name("Math").is_some());
    }

    #[test]
    fn test_passthrough_without_input_drops_link() {
        let mut doc = SourceDocument::new("Orphan");
        doc.push_node(DocumentNode::standard("Reroute", SourceKind::Reroute));
        doc.push_node(DocumentNode::standard("BSDF", SourceKind::Diffuse));
        doc.link("Reroute", "Output", "BSDF", "Color");
        let snapshot = Snapshot::capture(&doc, &FlattenPolicy::default()).unwrap();
        assert!(snapshot.links().is_empty());
        assert!(!snapshot.is_input_linked(SourceNodeId(1), "Color"));
    }

    #[test]
    fn test_reroute_loop_is_dropped() {
        let mut doc = SourceDocument::new("Loop");
        doc.push_node(DocumentNode::standard("A", SourceKind::Reroute));
        doc.push_node(DocumentNode::standard("B", SourceKind::Reroute));
        doc.push_node(DocumentNode::standard("BSDF", SourceKind::Diffuse));
        doc.link("A", "Output", "B", "Input");
        doc.link("B", "Output", "A", "Input");
        doc.link("B", "Output", "BSDF", "Color");
        let snapshot = Snapshot::capture(&doc, &FlattenPolicy::default()).unwrap();
        assert!(snapshot.links().is_empty());
    }

    #[test]
    fn test_dangling_link_is_error() {
        let mut doc = SourceDocument::new("Dangling");
        doc.push_node(DocumentNode::standard("BSDF", SourceKind::Diffuse));
        doc.link("Ghost", "Color", "BSDF", "Color");
        assert!(matches!(
            Snapshot::capture(&doc, &FlattenPolicy::default()),
            Err(SnapshotError::DanglingLink(name)) if name == "Ghost"
        ));

        let mut doc = SourceDocument::new("Dangling socket");
        doc.push_node(DocumentNode::standard("Image", SourceKind::ImageTexture));
        doc.push_node(DocumentNode::standard("BSDF", SourceKind::Diffuse));
        doc.link("Image", "Nope", "BSDF", "Color");
        assert!(matches!(
            Snapshot::capture(&doc, &FlattenPolicy::default()),
            Err(SnapshotError::DanglingSocket { .. })
        ));
    }

    #[test]
    fn test_opaque_kind_is_kept() {
        let mut doc = SourceDocument::new("Custom");
        doc.push_node(DocumentNode::new("Thing", "ShaderNodeCustomThing"));
        let snapshot = Snapshot::capture(&doc, &FlattenPolicy::default()).unwrap();
        assert!(snapshot.node_by_name("Thing").unwrap().kind.is_opaque());
    }

    #[test]
    fn test_fingerprint_tracks_content_not_layout() {
        let policy = FlattenPolicy::default();
        let settings = ConversionSettings::default();
        let base = Snapshot::capture(&chain_document(), &policy).unwrap();
        let fingerprint = base.fingerprint([1.0; 3], &settings).unwrap();
        assert_eq!(fingerprint.len(), 64);

        let mut moved = chain_document();
        moved.nodes[0].location = [500.0, 20.0];
        moved.nodes[0].label = Some("Albedo".into());
        let moved = Snapshot::capture(&moved, &policy).unwrap();
        assert_eq!(moved.fingerprint([1.0; 3], &settings).unwrap(), fingerprint);

        let mut edited = chain_document();
        edited.nodes[3].set_input_default("Metallic", PortValue::Float(1.0));
        let edited = Snapshot::capture(&edited, &policy).unwrap();
        assert_ne!(edited.fingerprint([1.0; 3], &settings).unwrap(), fingerprint);

        assert_ne!(base.fingerprint([2.0, 1.0, 1.0], &settings).unwrap(), fingerprint);
    }

    #[test]
    fn test_fingerprint_tracks_structural_settings() {
        let settings = ConversionSettings::default();
        let snapshot = Snapshot::capture(&chain_document(), &settings.flatten).unwrap();
        let fingerprint = snapshot.fingerprint([1.0; 3], &settings).unwrap();

        let regamma = ConversionSettings {
            default_gamma: 1.0,
            ..settings.clone()
        };
        assert_eq!(snapshot.fingerprint([1.0; 3], &regamma).unwrap(), fingerprint);

        let unmerged = ConversionSettings {
            merge_volumes: false,
            ..settings.clone()
        };
        assert_ne!(snapshot.fingerprint([1.0; 3], &unmerged).unwrap(), fingerprint);

        let threshold = ConversionSettings {
            transmission_threshold: 0.9,
            ..settings
        };
        assert_ne!(snapshot.fingerprint([1.0; 3], &threshold).unwrap(), fingerprint);
    }
}
