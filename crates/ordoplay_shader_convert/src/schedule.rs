// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dependency scheduling: a creation order with producers before consumers.

use crate::error::CyclicGraphError;
use crate::snapshot::{Snapshot, SourceNodeId};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

/// Topologically order the real nodes of a snapshot.
///
/// Zero in-degree nodes are extracted smallest ID first, so the order is
/// deterministic for a given snapshot. Parallel links between the same pair
/// of nodes count once.
pub fn schedule(snapshot: &Snapshot) -> Result<Vec<SourceNodeId>, CyclicGraphError> {
    let mut in_degree: BTreeMap<SourceNodeId, usize> =
        snapshot.nodes().map(|n| (n.id, 0)).collect();
    let mut consumers: BTreeMap<SourceNodeId, BTreeSet<SourceNodeId>> = BTreeMap::new();

    for link in snapshot.links() {
        if !in_degree.contains_key(&link.from_node) || !in_degree.contains_key(&link.to_node) {
            continue;
        }
        if consumers.entry(link.from_node).or_default().insert(link.to_node) {
            if let Some(degree) = in_degree.get_mut(&link.to_node) {
                *degree += 1;
            }
        }
    }

    let mut ready: BinaryHeap<Reverse<SourceNodeId>> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| Reverse(*id))
        .collect();

    let mut order = Vec::with_capacity(in_degree.len());
    while let Some(Reverse(id)) = ready.pop() {
        order.push(id);
        let Some(next) = consumers.get(&id) else { continue };
        for consumer in next {
            if let Some(degree) = in_degree.get_mut(consumer) {
                *degree -= 1;
                if *degree == 0 {
                    ready.push(Reverse(*consumer));
                }
            }
        }
    }

    if order.len() < in_degree.len() {
        let scheduled: BTreeSet<SourceNodeId> = order.iter().copied().collect();
        let nodes = in_degree
            .keys()
            .filter(|id| !scheduled.contains(id))
            .copied()
            .collect();
        return Err(CyclicGraphError { nodes });
    }

    tracing::debug!(nodes = order.len(), "schedule computed");
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlattenPolicy;
    use crate::document::{DocumentNode, SourceDocument};
    use crate::kind::SourceKind;

    fn capture(doc: &SourceDocument) -> Snapshot {
        Snapshot::capture(doc, &FlattenPolicy::default()).unwrap()
    }

    fn position(order: &[SourceNodeId], id: SourceNodeId) -> usize {
        order.iter().position(|x| *x == id).unwrap()
    }

    #[test]
    fn test_producers_precede_consumers() {
        let mut doc = SourceDocument::new("Order");
        doc.push_node(DocumentNode::standard("Output", SourceKind::MaterialOutput));
        doc.push_node(DocumentNode::standard("BSDF", SourceKind::Principled));
        doc.push_node(DocumentNode::standard("Image", SourceKind::ImageTexture));
        doc.push_node(DocumentNode::standard("Mapping", SourceKind::Mapping));
        doc.link("BSDF", "BSDF", "Output", "Surface");
        doc.link("Image", "Color", "BSDF", "Base Color");
        doc.link("Image", "Alpha", "BSDF", "Alpha");
        doc.link("Mapping", "Vector", "Image", "Vector");

        let snapshot = capture(&doc);
        let order = schedule(&snapshot).unwrap();
        assert_eq!(order.len(), 4);
        for link in snapshot.links() {
            assert!(position(&order, link.from_node) < position(&order, link.to_node));
        }
        assert_eq!(order[0], SourceNodeId(3));
    }

    #[test]
    fn test_ties_break_by_ascending_id() {
        let mut doc = SourceDocument::new("Independent");
        doc.push_node(DocumentNode::standard("C", SourceKind::Rgb));
        doc.push_node(DocumentNode::standard("A", SourceKind::Value));
        doc.push_node(DocumentNode::standard("B", SourceKind::Diffuse));
        let order = schedule(&capture(&doc)).unwrap();
        assert_eq!(order, vec![SourceNodeId(0), SourceNodeId(1), SourceNodeId(2)]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let mut doc = SourceDocument::new("Cycle");
        doc.push_node(DocumentNode::standard("First", SourceKind::Invert));
        doc.push_node(DocumentNode::standard("Second", SourceKind::Invert));
        doc.push_node(DocumentNode::standard("Free", SourceKind::Value));
        doc.link("First", "Color", "Second", "Color");
        doc.link("Second", "Color", "First", "Color");

        let error = schedule(&capture(&doc)).unwrap_err();
        assert_eq!(error.nodes, vec![SourceNodeId(0), SourceNodeId(1)]);
    }
}
