// SPDX-License-Identifier: MIT OR Apache-2.0
//! Volume media: merging absorption into scatter, and wiring the result
//! into the surface material.
//!
//! When an absorption and a scatter medium are blended by one mix, the
//! scatter node survives and the mix goes away. Its scattering colour
//! stays, the absorption colour is copied into its absorption channel, and
//! the absorption density overrides its own.

use crate::diagnostics::Stage;
use crate::kind::SourceKind;
use crate::post::PostContext;
use crate::snapshot::SourceNodeId;
use crate::target::TargetGraphExt;
use ordoplay_shader_graph::{NodeId, PortDirection};
use std::collections::{BTreeMap, BTreeSet};

/// Channels the absorption medium hands over to the kept node
const MERGED_CHANNELS: [&str; 2] = ["Absorption", "Density"];

const MIX_SLOTS: [&str; 2] = ["Material1", "Material2"];

/// Converted media of one source kind, by target node
fn converted(ctx: &PostContext<'_>, kind: SourceKind) -> BTreeMap<NodeId, SourceNodeId> {
    ctx.snapshot
        .nodes()
        .filter(|n| n.kind == kind)
        .filter_map(|n| ctx.table.primary(n.id).map(|node| (node, n.id)))
        .collect()
}

/// A scatter and an absorption medium blended by the same mix
struct MediaPair {
    mix: NodeId,
    kept: NodeId,
    scatter_id: SourceNodeId,
    absorb: NodeId,
    absorb_id: SourceNodeId,
}

fn media_pairs(ctx: &PostContext<'_>) -> Vec<MediaPair> {
    let scatters = converted(ctx, SourceKind::VolumeScatter);
    let absorbers = converted(ctx, SourceKind::VolumeAbsorption);
    if scatters.is_empty() || absorbers.is_empty() {
        return Vec::new();
    }

    let mut pairs = Vec::new();
    for mix in ctx.graph.node_ids() {
        let slots: Vec<NodeId> = MIX_SLOTS
            .iter()
            .filter_map(|slot| ctx.graph.link_into(mix, slot))
            .map(|l| l.from_node)
            .collect();
        let [a, b] = slots[..] else { continue };
        let found = match (scatters.get(&a), absorbers.get(&b)) {
            (Some(scatter), Some(absorb)) => Some((a, *scatter, b, *absorb)),
            _ => scatters
                .get(&b)
                .zip(absorbers.get(&a))
                .map(|(scatter, absorb)| (b, *scatter, a, *absorb)),
        };
        if let Some((kept, scatter_id, absorb, absorb_id)) = found {
            pairs.push(MediaPair {
                mix,
                kept,
                scatter_id,
                absorb,
                absorb_id,
            });
        }
    }
    pairs
}

/// Fold each absorption medium into the scatter medium it is mixed with.
/// Media that never meet in a mix are left alone.
pub fn merge_media(ctx: &mut PostContext<'_>) {
    let mut consumed = BTreeSet::new();
    for pair in media_pairs(ctx) {
        if consumed.contains(&pair.kept) || consumed.contains(&pair.absorb) {
            continue;
        }
        merge_pair(ctx, &pair);
        consumed.insert(pair.kept);
        consumed.insert(pair.absorb);
    }
}

fn merge_pair(ctx: &mut PostContext<'_>, pair: &MediaPair) {
    let MediaPair {
        mix,
        kept,
        scatter_id,
        absorb,
        absorb_id,
    } = *pair;
    let Some(kept_out) = ctx.main_output(kept) else { return };

    for channel in MERGED_CHANNELS {
        if !ctx.graph.has_socket(kept, PortDirection::Input, channel) {
            continue;
        }
        if let Some(link) = ctx.graph.link_into(absorb, channel) {
            ctx.relink(link.from_node, &link.from_socket, kept, channel);
        } else if let Some(value) = ctx.graph.input_value(absorb, channel) {
            ctx.graph.remove_links_into(kept, channel);
            ctx.graph.set_input(kept, channel, value);
        }
    }

    // The mix only blended the two media
    for link in ctx.graph.links_from(mix) {
        ctx.relink(kept, &kept_out, link.to_node, &link.to_socket);
    }
    ctx.remove(mix);

    for link in ctx.graph.links_from(absorb) {
        ctx.relink(kept, &kept_out, link.to_node, &link.to_socket);
    }
    ctx.remove(absorb);

    let name = |id: SourceNodeId| ctx.snapshot.node(id).map_or_else(String::new, |n| n.name.clone());
    let message = format!("Absorption '{}' merged into scatter '{}'", name(absorb_id), name(scatter_id));
    ctx.diagnostics.note(Stage::PostProcess, Some(absorb_id), message);
    tracing::debug!(scatter = %scatter_id, absorption = %absorb_id, "volume media merged");
}

/// Connect the medium feeding the output's volume socket to the surface
/// material's medium input
pub fn wire_medium(ctx: &mut PostContext<'_>) {
    let outputs: Vec<NodeId> = ctx
        .snapshot
        .nodes()
        .filter(|n| n.kind == SourceKind::MaterialOutput)
        .filter_map(|n| ctx.table.primary(n.id))
        .collect();

    for output in outputs {
        let (Some(medium), Some(surface)) = (
            ctx.graph.link_into(output, "Volume"),
            ctx.graph.link_into(output, "Surface"),
        ) else {
            continue;
        };
        let target = surface.from_node;
        if !ctx.graph.has_socket(target, PortDirection::Input, "Medium") || ctx.graph.is_linked(target, "Medium") {
            continue;
        }
        if let Err(error) = ctx
            .graph
            .create_link(medium.from_node, &medium.from_socket, target, "Medium")
        {
            tracing::debug!(%error, "medium could not be wired into the surface material");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ConversionSettings;
    use crate::document::{DocumentNode, SourceDocument};
    use crate::kind::SourceKind;
    use crate::links::reconstruct;
    use crate::post::{post_process, PostContext};
    use crate::target::{TargetGraph, TargetGraphExt, TargetHost};
    use crate::transfer::harness::{run, Transferred};
    use ordoplay_shader_graph::PortValue;

    fn finish(doc: &SourceDocument, settings: &ConversionSettings) -> Transferred {
        let mut result = run(doc);
        let graph = result.scene.material_graph(result.material).unwrap();
        reconstruct(&result.snapshot, &result.table, &mut *graph, &mut result.diagnostics);
        let mut ctx = PostContext {
            graph,
            snapshot: &result.snapshot,
            settings,
            table: &mut result.table,
            notes: &result.notes,
            diagnostics: &mut result.diagnostics,
        };
        post_process(&mut ctx);
        result
    }

    fn smoke() -> SourceDocument {
        smoke_into(SourceDocument::new("Smoke"))
    }

    fn smoke_into(mut doc: SourceDocument) -> SourceDocument {
        doc.push_node(DocumentNode::standard("Shell", SourceKind::Principled));
        doc.push_node(
            DocumentNode::standard("Scatter", SourceKind::VolumeScatter)
                .with_default("Color", PortValue::Color([0.2, 0.4, 0.6, 1.0]))
                .with_default("Density", PortValue::Float(0.5)),
        );
        doc.push_node(
            DocumentNode::standard("Absorb", SourceKind::VolumeAbsorption)
                .with_default("Color", PortValue::Color([0.9, 0.1, 0.1, 1.0]))
                .with_default("Density", PortValue::Float(3.0)),
        );
        doc.push_node(DocumentNode::standard("Blend", SourceKind::MixShader));
        doc.push_node(DocumentNode::standard("Output", SourceKind::MaterialOutput));
        doc.link("Scatter", "Volume", "Blend", "Shader");
        doc.link("Absorb", "Volume", "Blend", "Shader_001");
        doc.link("Blend", "Shader", "Output", "Volume");
        doc.link("Shell", "BSDF", "Output", "Surface");
        doc
    }

    #[test]
    fn test_absorption_merges_into_scatter() {
        let result = finish(&smoke(), &ConversionSettings::default());
        let graph = result.graph();
        let kept = result.primary("Scatter");

        assert_eq!(graph.input_value(kept, "Density"), Some(PortValue::Float(3.0)));
        assert_eq!(
            graph.input_value(kept, "Absorption"),
            Some(PortValue::Color([0.9, 0.1, 0.1, 1.0]))
        );
        assert_eq!(
            graph.input_value(kept, "Scattering"),
            Some(PortValue::Color([0.2, 0.4, 0.6, 1.0]))
        );
        assert!(graph.nodes_of_kind("ShaderNodeOctAbsorptionMedium").is_empty());
        assert!(graph.nodes_of_kind("ShaderNodeOctMixMat").is_empty());

        let output = graph.nodes_of_kind("ShaderNodeOutputMaterial")[0];
        assert_eq!(graph.link_into(output, "Volume").unwrap().from_node, kept);
    }

    #[test]
    fn test_merged_medium_reaches_surface() {
        let result = finish(&smoke(), &ConversionSettings::default());
        let graph = result.graph();
        let shell = result.primary("Shell");
        assert_eq!(graph.link_into(shell, "Medium").unwrap().from_node, result.primary("Scatter"));
    }

    fn fog() -> DocumentNode {
        DocumentNode::standard("Fog", SourceKind::VolumeScatter)
            .with_default("Density", PortValue::Float(0.5))
    }

    #[test]
    fn test_unrelated_media_stay_apart() {
        let mut doc = SourceDocument::new("Two rooms");
        doc.push_node(fog());
        doc.push_node(
            DocumentNode::standard("Ink", SourceKind::VolumeAbsorption)
                .with_default("Density", PortValue::Float(3.0)),
        );
        doc.push_node(DocumentNode::standard("Output", SourceKind::MaterialOutput));
        doc.push_node(DocumentNode::standard("Output2", SourceKind::MaterialOutput));
        doc.link("Fog", "Volume", "Output", "Volume");
        doc.link("Ink", "Volume", "Output2", "Volume");

        let result = finish(&doc, &ConversionSettings::default());
        let graph = result.graph();
        let fog = result.primary("Fog");
        assert_eq!(graph.input_value(fog, "Density"), Some(PortValue::Float(0.5)));
        assert_eq!(graph.nodes_of_kind("ShaderNodeOctAbsorptionMedium").len(), 1);
        assert!(!result.diagnostics.records().iter().any(|d| d.stage == crate::diagnostics::Stage::PostProcess));
    }

    #[test]
    fn test_only_mixed_media_merge() {
        let mut doc = SourceDocument::new("Smoke and fog");
        doc.push_node(fog());
        doc.push_node(DocumentNode::standard("Output2", SourceKind::MaterialOutput));
        doc.link("Fog", "Volume", "Output2", "Volume");
        let doc = smoke_into(doc);

        let result = finish(&doc, &ConversionSettings::default());
        let graph = result.graph();
        let fog = result.primary("Fog");
        let kept = result.primary("Scatter");
        assert_eq!(graph.input_value(fog, "Density"), Some(PortValue::Float(0.5)));
        assert_eq!(graph.input_value(kept, "Density"), Some(PortValue::Float(3.0)));
        assert!(graph.nodes_of_kind("ShaderNodeOctAbsorptionMedium").is_empty());

        let outputs: Vec<_> = graph
            .nodes_of_kind("ShaderNodeOutputMaterial")
            .into_iter()
            .filter_map(|output| graph.link_into(output, "Volume"))
            .map(|link| link.from_node)
            .collect();
        assert!(outputs.contains(&fog));
        assert!(outputs.contains(&kept));
    }

    #[test]
    fn test_merge_can_be_disabled() {
        let settings = ConversionSettings {
            merge_volumes: false,
            ..ConversionSettings::default()
        };
        let result = finish(&smoke(), &settings);
        let graph = result.graph();
        assert_eq!(graph.nodes_of_kind("ShaderNodeOctAbsorptionMedium").len(), 1);
        assert_eq!(graph.nodes_of_kind("ShaderNodeOctMixMat").len(), 1);
    }
}
