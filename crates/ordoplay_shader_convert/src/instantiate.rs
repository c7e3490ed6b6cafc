// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node instantiation and the source-to-target correspondence table.

use crate::diagnostics::{Diagnostics, Stage};
use crate::error::UnsupportedKindError;
use crate::registry::{Expansion, Resolution, TypeRegistry, EMISSION_HELPER_CANDIDATES};
use crate::snapshot::{Snapshot, SourceNode, SourceNodeId};
use crate::target::TargetGraph;
use ordoplay_shader_graph::NodeId;
use std::collections::BTreeMap;
use std::fmt;

/// Role of a target node produced for a source node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeRole {
    /// The node that stands in for the source node
    Primary,
    /// Texture-emission helper feeding the primary's emission input
    EmissionAux,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Primary => "primary",
            Self::EmissionAux => "emission-aux",
        })
    }
}

/// Source node ID to role-tagged target nodes.
///
/// Nodes that failed resolution never get an entry; they are listed as
/// unconvertible instead.
#[derive(Debug, Clone, Default)]
pub struct Correspondence {
    entries: BTreeMap<SourceNodeId, Vec<(NodeRole, NodeId)>>,
    resolutions: BTreeMap<SourceNodeId, Resolution>,
    unconvertible: BTreeMap<SourceNodeId, UnsupportedKindError>,
}

impl Correspondence {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a target node under a role, replacing an earlier node with
    /// the same role
    pub fn insert(&mut self, source: SourceNodeId, role: NodeRole, node: NodeId) {
        let roles = self.entries.entry(source).or_default();
        roles.retain(|(r, _)| *r != role);
        roles.push((role, node));
        roles.sort_by_key(|(r, _)| *r);
    }

    /// Forget one role of a source node
    pub fn remove_role(&mut self, source: SourceNodeId, role: NodeRole) -> Option<NodeId> {
        let roles = self.entries.get_mut(&source)?;
        let index = roles.iter().position(|(r, _)| *r == role)?;
        let (_, node) = roles.remove(index);
        if roles.is_empty() {
            self.entries.remove(&source);
        }
        Some(node)
    }

    /// Target node of one role
    pub fn get(&self, source: SourceNodeId, role: NodeRole) -> Option<NodeId> {
        self.entries
            .get(&source)?
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, node)| *node)
    }

    /// Primary target node
    pub fn primary(&self, source: SourceNodeId) -> Option<NodeId> {
        self.get(source, NodeRole::Primary)
    }

    /// Emission helper, if one exists
    pub fn emission_aux(&self, source: SourceNodeId) -> Option<NodeId> {
        self.get(source, NodeRole::EmissionAux)
    }

    /// All role-tagged nodes of a source node
    pub fn roles(&self, source: SourceNodeId) -> &[(NodeRole, NodeId)] {
        self.entries.get(&source).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether a source node has target nodes
    pub fn contains(&self, source: SourceNodeId) -> bool {
        self.entries.contains_key(&source)
    }

    /// Source node and role a target node was created for
    pub fn source_of(&self, node: NodeId) -> Option<(SourceNodeId, NodeRole)> {
        self.entries.iter().find_map(|(source, roles)| {
            roles
                .iter()
                .find(|(_, n)| *n == node)
                .map(|(role, _)| (*source, *role))
        })
    }

    /// Converted source nodes in ascending ID order
    pub fn sources(&self) -> impl Iterator<Item = SourceNodeId> + '_ {
        self.entries.keys().copied()
    }

    /// Number of converted source nodes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was converted
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How a source node was resolved
    pub fn resolution(&self, source: SourceNodeId) -> Option<&Resolution> {
        self.resolutions.get(&source)
    }

    /// Whether a source node failed resolution
    pub fn is_unconvertible(&self, source: SourceNodeId) -> bool {
        self.unconvertible.contains_key(&source)
    }

    /// Unconvertible source nodes and why
    pub fn unconvertible(&self) -> impl Iterator<Item = (SourceNodeId, &UnsupportedKindError)> {
        self.unconvertible.iter().map(|(id, e)| (*id, e))
    }
}

/// Create a texture-emission helper next to `primary`.
///
/// Returns `None` when no helper kind is available in this environment.
pub fn create_emission_helper(
    graph: &mut dyn TargetGraph,
    source: &SourceNode,
) -> Option<NodeId> {
    let kind = EMISSION_HELPER_CANDIDATES
        .iter()
        .find(|kind| graph.can_create(kind))?;
    let helper = graph.create_node(kind)?;
    graph.set_label(helper, &format!("{} Emission", source.display_name()));
    graph.set_position(helper, [source.location[0] - 250.0, source.location[1] - 150.0]);
    Some(helper)
}

/// Create target nodes for every scheduled source node.
///
/// A node whose kind cannot be resolved is recorded as unconvertible and
/// the walk continues.
pub fn instantiate(
    snapshot: &Snapshot,
    order: &[SourceNodeId],
    registry: &TypeRegistry,
    graph: &mut dyn TargetGraph,
    diagnostics: &mut Diagnostics,
) -> Correspondence {
    let mut table = Correspondence::new();

    for id in order {
        let Some(source) = snapshot.node(*id) else { continue };

        let resolved = registry
            .resolve(source, |kind| graph.can_create(kind))
            .and_then(|resolution| {
                graph
                    .create_node(&resolution.target_kind)
                    .map(|node| (resolution.clone(), node))
                    .ok_or_else(|| UnsupportedKindError {
                        kind: source.kind.tag().to_string(),
                        tried: vec![resolution.target_kind.clone()],
                    })
            });

        let (resolution, node) = match resolved {
            Ok(created) => created,
            Err(error) => {
                tracing::debug!(node = %source.name, %error, "node left unconverted");
                diagnostics.unsupported(*id, error.clone());
                table.unconvertible.insert(*id, error);
                continue;
            }
        };

        graph.set_label(node, source.display_name());
        graph.set_position(node, source.location);
        table.insert(*id, NodeRole::Primary, node);

        if resolution.expansion == Expansion::EmissionHelper {
            match create_emission_helper(graph, source) {
                Some(helper) => table.insert(*id, NodeRole::EmissionAux, helper),
                None => diagnostics.note(
                    Stage::Instantiate,
                    Some(*id),
                    format!("No emission helper kind available for '{}'", source.name),
                ),
            }
        }

        table.resolutions.insert(*id, resolution);
    }

    tracing::info!(
        converted = table.len(),
        unconvertible = table.unconvertible.len(),
        "nodes instantiated"
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlattenPolicy;
    use crate::document::{DocumentNode, SourceDocument};
    use crate::kind::SourceKind;
    use crate::schedule::schedule;
    use crate::target::{InMemoryScene, TargetHost};

    fn run(doc: &SourceDocument) -> (InMemoryScene, ordoplay_shader_graph::MaterialId, Correspondence, Diagnostics) {
        let snapshot = Snapshot::capture(doc, &FlattenPolicy::default()).unwrap();
        let order = schedule(&snapshot).unwrap();
        let mut scene = InMemoryScene::with_catalog();
        let id = scene.create_material(doc.name.as_str());
        let mut diagnostics = Diagnostics::new();
        let table = instantiate(
            &snapshot,
            &order,
            &TypeRegistry::standard(),
            scene.material_graph(id).unwrap(),
            &mut diagnostics,
        );
        (scene, id, table, diagnostics)
    }

    #[test]
    fn test_emission_expands_into_two_roles() {
        let mut doc = SourceDocument::new("Glow");
        doc.push_node(DocumentNode::standard("Emission", SourceKind::Emission));
        let (mut scene, id, table, diagnostics) = run(&doc);

        assert!(diagnostics.is_empty());
        let roles = table.roles(SourceNodeId(0));
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].0, NodeRole::Primary);
        assert_eq!(roles[1].0, NodeRole::EmissionAux);

        let graph = scene.material_graph(id).unwrap();
        assert_eq!(
            graph.node_kind(roles[0].1).as_deref(),
            Some("ShaderNodeOctDiffuseMat")
        );
        assert_eq!(
            graph.node_kind(roles[1].1).as_deref(),
            Some("ShaderNodeOctTextureEmission")
        );
        assert_eq!(table.source_of(roles[1].1), Some((SourceNodeId(0), NodeRole::EmissionAux)));
    }

    #[test]
    fn test_unknown_kind_is_unconvertible() {
        let mut doc = SourceDocument::new("Mixed");
        doc.push_node(DocumentNode::new("Custom", "ShaderNodeCustomThing"));
        doc.push_node(DocumentNode::standard("BSDF", SourceKind::Diffuse));
        let (_, _, table, diagnostics) = run(&doc);

        assert!(table.is_unconvertible(SourceNodeId(0)));
        assert!(!table.contains(SourceNodeId(0)));
        assert!(table.contains(SourceNodeId(1)));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.records()[0].is_unsupported_kind());
    }

    #[test]
    fn test_labels_and_positions_carry_over() {
        let mut doc = SourceDocument::new("Layout");
        let mut node = DocumentNode::standard("BSDF", SourceKind::Diffuse).at(120.0, -40.0);
        node.label = Some("Wall".into());
        doc.push_node(node);
        let (scene, id, table, _) = run(&doc);

        let material = scene.material(id).unwrap();
        let node = material.graph.node(table.primary(SourceNodeId(0)).unwrap()).unwrap();
        assert_eq!(node.name, "Wall");
        assert_eq!(node.position, [120.0, -40.0]);
    }
}
