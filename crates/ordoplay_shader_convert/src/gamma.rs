// SPDX-License-Identifier: MIT OR Apache-2.0
//! Gamma correction of colour image sites.

use crate::target::{TargetGraph, TargetGraphExt};
use ordoplay_shader_graph::{NodeId, PortDirection, PortValue};
use std::collections::HashSet;

/// Colour-space tag left on image nodes during transfer
pub const COLOR_SPACE_PARAM: &str = "color_space";

/// Tag value of data images that must never be gamma corrected
pub const NON_COLOR: &str = "non-color";

/// Texture nodes whose input is read as height or normal data
const DATA_SINKS: &[&str] = &[
    "ShaderNodeOctNormalMapTex",
    "ShaderNodeOctBumpTex",
    "ShaderNodeOctDisplacementTex",
];

/// Input name fragments that read a texture as scalar or vector data
const DATA_INPUTS: &[&str] = &[
    "rough", "normal", "bump", "displace", "opacity", "amount", "index", "ior",
    "anisotropy", "metallic", "width", "radius", "scale", "strength", "level",
    "density", "phase", "power",
];

fn is_data_input(socket: &str) -> bool {
    let socket = socket.to_ascii_lowercase();
    DATA_INPUTS.iter().any(|fragment| socket.contains(fragment))
}

/// Whether any use of `image` reads it as colour. Texture operators are
/// followed through to their own consumers. An unused image counts as colour.
fn feeds_colour(graph: &dyn TargetGraph, image: NodeId) -> bool {
    let mut visited = HashSet::new();
    let mut pending = vec![image];
    let mut used = false;
    while let Some(node) = pending.pop() {
        if !visited.insert(node) {
            continue;
        }
        for link in graph.links_from(node) {
            used = true;
            if is_data_input(&link.to_socket) {
                continue;
            }
            let kind = graph.node_kind(link.to_node).unwrap_or_default();
            if DATA_SINKS.contains(&kind.as_str()) {
                continue;
            }
            if graph.has_socket(link.to_node, PortDirection::Output, "OutTex") {
                pending.push(link.to_node);
                continue;
            }
            return true;
        }
    }
    !used
}

/// Retag colour images that only ever feed data inputs (roughness, bump,
/// normal maps and the like) as non-colour, with linear gamma.
/// Returns the number of images retagged.
pub fn tag_data_images(graph: &mut dyn TargetGraph) -> usize {
    let images: Vec<_> = graph
        .node_ids()
        .into_iter()
        .filter(|node| {
            matches!(
                graph.parameter(*node, COLOR_SPACE_PARAM),
                Some(PortValue::String(space)) if space != NON_COLOR
            )
        })
        .filter(|node| !feeds_colour(&*graph, *node))
        .collect();

    for node in &images {
        graph.set_parameter(*node, COLOR_SPACE_PARAM, PortValue::String(NON_COLOR.to_string()));
        if graph.has_socket(*node, PortDirection::Input, "Gamma") {
            graph.set_input(*node, "Gamma", PortValue::Float(1.0));
        }
    }
    if !images.is_empty() {
        tracing::debug!(images = images.len(), "data images retagged as non-colour");
    }
    images.len()
}

/// Set `gamma` on every colour-tagged image site of a target graph.
///
/// The value is written as absolute state, so re-applying replaces the
/// previous setting. Returns the number of sites updated.
pub fn apply_gamma(graph: &mut dyn TargetGraph, gamma: f32) -> usize {
    let sites: Vec<_> = graph
        .node_ids()
        .into_iter()
        .filter(|node| match graph.parameter(*node, COLOR_SPACE_PARAM) {
            Some(PortValue::String(space)) => space != NON_COLOR,
            _ => false,
        })
        .collect();

    for node in &sites {
        if graph.has_socket(*node, PortDirection::Input, "Gamma") {
            graph.set_input(*node, "Gamma", PortValue::Float(gamma));
        }
        graph.set_parameter(*node, "gamma", PortValue::Float(gamma));
    }
    tracing::debug!(sites = sites.len(), gamma, "gamma applied");
    sites.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{InMemoryScene, TargetHost};

    fn scene_with_images() -> (InMemoryScene, ordoplay_shader_graph::MaterialId) {
        let mut scene = InMemoryScene::with_catalog();
        let id = scene.create_material("Images");
        let graph = scene.material_graph(id).unwrap();
        for space in ["color", NON_COLOR] {
            let image = graph.create_node("ShaderNodeOctImageTex").unwrap();
            graph.set_parameter(image, COLOR_SPACE_PARAM, PortValue::String(space.into()));
            graph.set_input(image, "Gamma", PortValue::Float(if space == NON_COLOR { 1.0 } else { 2.2 }));
        }
        graph.create_node("ShaderNodeOctNoiseTex").unwrap();
        (scene, id)
    }

    fn gammas(scene: &InMemoryScene, id: ordoplay_shader_graph::MaterialId) -> Vec<Option<PortValue>> {
        let graph = scene.graph(id).unwrap();
        graph
            .nodes_of_kind("ShaderNodeOctImageTex")
            .into_iter()
            .map(|n| graph.input_value(n, "Gamma"))
            .collect()
    }

    #[test]
    fn test_skips_non_color_sites() {
        let (mut scene, id) = scene_with_images();
        let updated = apply_gamma(scene.material_graph(id).unwrap(), 1.8);
        assert_eq!(updated, 1);
        assert_eq!(
            gammas(&scene, id),
            vec![Some(PortValue::Float(1.8)), Some(PortValue::Float(1.0))]
        );
    }

    #[test]
    fn test_data_images_are_retagged() {
        let mut scene = InMemoryScene::with_catalog();
        let id = scene.create_material("Data");
        let graph = scene.material_graph(id).unwrap();
        let material = graph.create_node("ShaderNodeOctUniversalMat").unwrap();
        let normal_map = graph.create_node("ShaderNodeOctNormalMapTex").unwrap();
        let invert = graph.create_node("ShaderNodeOctInvertTex").unwrap();
        let mut images = Vec::new();
        for _ in 0..4 {
            let image = graph.create_node("ShaderNodeOctImageTex").unwrap();
            graph.set_parameter(image, COLOR_SPACE_PARAM, PortValue::String("color".into()));
            images.push(image);
        }
        // Roughness, a normal map, albedo through an invert, and nothing
        graph.create_link(images[0], "OutTex", material, "Roughness").unwrap();
        graph.create_link(images[1], "OutTex", normal_map, "Texture").unwrap();
        graph.create_link(normal_map, "OutTex", material, "Normal").unwrap();
        graph.create_link(images[2], "OutTex", invert, "Texture").unwrap();
        graph.create_link(invert, "OutTex", material, "Albedo color").unwrap();

        assert_eq!(tag_data_images(&mut *graph), 2);
        let space = |node| graph.parameter(node, COLOR_SPACE_PARAM);
        assert_eq!(space(images[0]), Some(PortValue::String(NON_COLOR.into())));
        assert_eq!(space(images[1]), Some(PortValue::String(NON_COLOR.into())));
        assert_eq!(space(images[2]), Some(PortValue::String("color".into())));
        assert_eq!(space(images[3]), Some(PortValue::String("color".into())));

        assert_eq!(apply_gamma(&mut *graph, 2.2), 2);
        assert_eq!(graph.input_value(images[0], "Gamma"), Some(PortValue::Float(1.0)));
    }

    #[test]
    fn test_reapplying_never_compounds() {
        let (mut scene, id) = scene_with_images();
        for _ in 0..3 {
            apply_gamma(scene.material_graph(id).unwrap(), 2.2);
        }
        let first = gammas(&scene, id);
        apply_gamma(scene.material_graph(id).unwrap(), 2.2);
        assert_eq!(gammas(&scene, id), first);
        assert_eq!(first[0], Some(PortValue::Float(2.2)));

        apply_gamma(scene.material_graph(id).unwrap(), 1.0);
        assert_eq!(gammas(&scene, id)[0], Some(PortValue::Float(1.0)));
    }
}
