// SPDX-License-Identifier: MIT OR Apache-2.0
//! Post-processing: fixes that need the finished target graph.

use crate::config::ConversionSettings;
use crate::diagnostics::{Diagnostics, Stage};
use crate::gamma;
use crate::instantiate::{create_emission_helper, Correspondence, NodeRole};
use crate::kind::SourceKind;
use crate::snapshot::{Snapshot, SourceNode, SourceNodeId};
use crate::target::{TargetGraph, TargetGraphExt};
use crate::transfer::{HandlerId, TransferNotes};
use crate::volume;
use ordoplay_shader_graph::{NodeId, PortDirection, PortType, PortValue};

const INVERT_KIND: &str = "ShaderNodeOctInvertTex";

/// State shared by the post-processing passes
pub struct PostContext<'a> {
    /// Target graph
    pub graph: &'a mut dyn TargetGraph,
    /// Source snapshot
    pub snapshot: &'a Snapshot,
    /// Conversion settings
    pub settings: &'a ConversionSettings,
    /// Correspondence table; removed nodes drop out of it
    pub table: &'a mut Correspondence,
    /// Facts recorded during transfer
    pub notes: &'a TransferNotes,
    /// Diagnostics for this run
    pub diagnostics: &'a mut Diagnostics,
}

impl PostContext<'_> {
    /// Remove a target node and forget its role
    pub(crate) fn remove(&mut self, node: NodeId) {
        if let Some((source, role)) = self.table.source_of(node) {
            self.table.remove_role(source, role);
        }
        self.graph.remove_node(node);
    }

    /// Replace whatever feeds `to.socket` with `from.from_socket`
    pub(crate) fn relink(&mut self, from: NodeId, from_socket: &str, to: NodeId, to_socket: &str) -> bool {
        self.graph.remove_links_into(to, to_socket);
        match self.graph.create_link(from, from_socket, to, to_socket) {
            Ok(()) => true,
            Err(error) => {
                tracing::debug!(%error, socket = to_socket, "post-process relink failed");
                false
            }
        }
    }

    /// Main output of a target node
    pub(crate) fn main_output(&self, node: NodeId) -> Option<String> {
        self.graph
            .sockets(node, PortDirection::Output)
            .into_iter()
            .next()
            .map(|s| s.name)
    }

    fn producer(&self, consumer: SourceNodeId, key: &str) -> Option<&SourceNode> {
        let link = self.snapshot.link_into(consumer, key)?;
        self.snapshot.node(link.from_node)
    }
}

/// Run every post-processing pass in order
pub fn post_process(ctx: &mut PostContext<'_>) {
    let transparent = transparency_mixes(ctx);
    swap_mix_slots(ctx, &transparent);
    ensure_emission(ctx);
    reroute_emission_textures(ctx);
    normal_fallback(ctx);
    if ctx.settings.merge_volumes {
        volume::merge_media(ctx);
    }
    volume::wire_medium(ctx);
    gamma::tag_data_images(&mut *ctx.graph);
    tracing::debug!(nodes = ctx.graph.node_ids().len(), "post-processing done");
}

/// Fold mixes against a transparent shader into the other branch's opacity.
/// Returns the source mixes that were removed.
fn transparency_mixes(ctx: &mut PostContext<'_>) -> Vec<SourceNodeId> {
    let snapshot = ctx.snapshot;
    let mut folded = Vec::new();
    let mixes: Vec<SourceNodeId> = ctx.notes.mix_plans.keys().copied().collect();

    for mix_id in mixes {
        let Some(mix_source) = snapshot.node(mix_id) else { continue };
        if mix_source.kind != SourceKind::MixShader {
            continue;
        }
        let first = ctx.producer(mix_id, "Shader").map(|n| (n.id, n.kind.clone()));
        let second = ctx.producer(mix_id, "Shader_001").map(|n| (n.id, n.kind.clone()));

        // Source mix is (1 - fac) * first + fac * second
        let (null_id, material_id, opacity_is_factor) = match (first, second) {
            (Some((null, SourceKind::Transparent)), Some((material, kind))) if kind != SourceKind::Transparent => {
                (null, material, true)
            }
            (Some((material, kind)), Some((null, SourceKind::Transparent))) if kind != SourceKind::Transparent => {
                (null, material, false)
            }
            _ => continue,
        };
        let (Some(mix), Some(material)) = (ctx.table.primary(mix_id), ctx.table.primary(material_id)) else {
            continue;
        };
        if !ctx.graph.has_socket(material, PortDirection::Input, "Opacity") {
            ctx.diagnostics.note(
                Stage::PostProcess,
                Some(mix_id),
                format!("Transparency mix '{}' kept: material has no opacity", mix_source.name),
            );
            continue;
        }

        match ctx.graph.link_into(mix, "Amount") {
            Some(factor) if opacity_is_factor => {
                ctx.relink(factor.from_node, &factor.from_socket, material, "Opacity");
            }
            Some(factor) => {
                let Some(invert) = ctx.graph.create_node(INVERT_KIND) else {
                    ctx.diagnostics.note(
                        Stage::PostProcess,
                        Some(mix_id),
                        "No invert texture available for a transparency factor",
                    );
                    continue;
                };
                ctx.graph.set_label(invert, &format!("{} Opacity", mix_source.display_name()));
                ctx.graph
                    .set_position(invert, [mix_source.location[0] - 200.0, mix_source.location[1]]);
                ctx.relink(factor.from_node, &factor.from_socket, invert, "Texture");
                if let Some(out) = ctx.main_output(invert) {
                    ctx.relink(invert, &out, material, "Opacity");
                }
            }
            None => {
                let factor = mix_source.float("Fac").unwrap_or(0.5).clamp(0.0, 1.0);
                let opacity = if opacity_is_factor { factor } else { 1.0 - factor };
                ctx.graph.set_input(material, "Opacity", PortValue::Float(opacity));
            }
        }

        // Consumers of the mix now read the material directly
        if let Some(out) = ctx.main_output(material) {
            for link in ctx.graph.links_from(mix) {
                ctx.relink(material, &out, link.to_node, &link.to_socket);
            }
        }
        ctx.remove(mix);
        if let Some(null) = ctx.table.primary(null_id) {
            if ctx.graph.links_from(null).is_empty() {
                ctx.remove(null);
            }
        }
        tracing::debug!(mix = %mix_source.name, "transparency mix folded into opacity");
        folded.push(mix_id);
    }
    folded
}

/// Swap the material slots of mixes whose plan asks for it
fn swap_mix_slots(ctx: &mut PostContext<'_>, skip: &[SourceNodeId]) {
    let swapped: Vec<SourceNodeId> = ctx
        .notes
        .mix_plans
        .iter()
        .filter(|(id, plan)| plan.swapped && !skip.contains(id))
        .map(|(id, _)| *id)
        .collect();

    for id in swapped {
        let Some(mix) = ctx.table.primary(id) else { continue };
        let first = ctx.graph.link_into(mix, "Material1");
        let second = ctx.graph.link_into(mix, "Material2");
        ctx.graph.remove_links_into(mix, "Material1");
        ctx.graph.remove_links_into(mix, "Material2");
        if let Some(link) = second {
            ctx.relink(link.from_node, &link.from_socket, mix, "Material1");
        }
        if let Some(link) = first {
            ctx.relink(link.from_node, &link.from_socket, mix, "Material2");
        }
    }
}

fn strength_key(kind: &SourceKind) -> &'static str {
    match kind {
        SourceKind::Principled => "Emission Strength",
        _ => "Strength",
    }
}

/// Make sure every converted emitter has a helper wired into its emission
/// channel
fn ensure_emission(ctx: &mut PostContext<'_>) {
    let snapshot = ctx.snapshot;
    let emitters: Vec<SourceNodeId> = ctx
        .table
        .sources()
        .filter(|id| {
            ctx.table.resolution(*id).map(|r| r.handler) == Some(HandlerId::Emission)
                || ctx.notes.emissive.contains_key(id)
        })
        .collect();

    for id in emitters {
        let Some(source) = snapshot.node(id) else { continue };
        let Some(primary) = ctx.table.primary(id) else { continue };
        if !ctx.graph.has_socket(primary, PortDirection::Input, "Emission") {
            continue;
        }

        let helper = match ctx.table.emission_aux(id) {
            Some(helper) => helper,
            None if ctx.settings.insert_emission_helpers => match create_emission_helper(ctx.graph, source) {
                Some(helper) => {
                    ctx.table.insert(id, NodeRole::EmissionAux, helper);
                    helper
                }
                None => {
                    ctx.diagnostics.note(
                        Stage::PostProcess,
                        Some(id),
                        format!("No emission helper kind available for '{}'", source.name),
                    );
                    continue;
                }
            },
            None => continue,
        };

        let key = strength_key(&source.kind);
        if !snapshot.is_input_linked(id, key) && !ctx.graph.is_linked(helper, "Power") {
            if let Some(strength) = source.float(key) {
                ctx.graph.set_input(helper, "Power", PortValue::Float(strength.max(0.0)));
            }
        }
        let wired = ctx
            .graph
            .link_into(primary, "Emission")
            .is_some_and(|l| l.from_node == helper);
        if !wired {
            if let Some(out) = ctx.main_output(helper) {
                ctx.relink(helper, &out, primary, "Emission");
            }
        }
        ctx.graph.set_parameter(primary, "surface_brightness", PortValue::Bool(true));
    }
}

/// Route textures wired straight into an emission socket through a helper
fn reroute_emission_textures(ctx: &mut PostContext<'_>) {
    let snapshot = ctx.snapshot;
    for node in ctx.graph.node_ids() {
        let Some(link) = ctx.graph.link_into(node, "Emission") else { continue };
        let producer_type = ctx
            .graph
            .socket_type(link.from_node, PortDirection::Output, &link.from_socket);
        if producer_type == Some(PortType::Emission) {
            continue;
        }
        let Some((source_id, _)) = ctx.table.source_of(node) else { continue };
        let Some(source) = snapshot.node(source_id) else { continue };

        let helper = match ctx.table.emission_aux(source_id) {
            Some(helper) if helper != link.from_node => helper,
            Some(_) => continue,
            None => match create_emission_helper(ctx.graph, source) {
                Some(helper) => {
                    ctx.table.insert(source_id, NodeRole::EmissionAux, helper);
                    helper
                }
                None => continue,
            },
        };
        ctx.relink(link.from_node, &link.from_socket, helper, "Texture");
        if let Some(out) = ctx.main_output(helper) {
            ctx.relink(helper, &out, node, "Emission");
        }
        tracing::debug!(node = %source.name, "emission texture routed through helper");
    }
}

/// Connect normal maps that feed a bump or displacement chain
fn normal_fallback(ctx: &mut PostContext<'_>) {
    let maps: Vec<SourceNodeId> = ctx
        .snapshot
        .nodes()
        .filter(|n| n.kind == SourceKind::NormalMap)
        .map(|n| n.id)
        .collect();

    for map_id in maps {
        let Some(map) = ctx.table.primary(map_id) else { continue };
        let Some(out) = ctx.main_output(map) else { continue };
        let bumps: Vec<SourceNodeId> = ctx
            .snapshot
            .links_from(map_id)
            .map(|l| l.to_node)
            .filter(|id| {
                ctx.snapshot
                    .node(*id)
                    .is_some_and(|n| matches!(n.kind, SourceKind::Bump | SourceKind::Displacement))
            })
            .collect();

        for bump_id in bumps {
            if let Some(bump) = ctx.table.primary(bump_id) {
                // Routed through the created bump node
                if ctx.graph.has_socket(bump, PortDirection::Input, "Normal") && !ctx.graph.is_linked(bump, "Normal") {
                    ctx.relink(map, &out, bump, "Normal");
                }
                continue;
            }
            // No bump node: the map drives the materials directly
            let consumers: Vec<SourceNodeId> = ctx.snapshot.links_from(bump_id).map(|l| l.to_node).collect();
            for consumer in consumers {
                let Some(material) = ctx.table.primary(consumer) else { continue };
                if ctx.graph.has_socket(material, PortDirection::Input, "Normal")
                    && !ctx.graph.is_linked(material, "Normal")
                {
                    ctx.relink(map, &out, material, "Normal");
                }
            }
        }
    }
}
