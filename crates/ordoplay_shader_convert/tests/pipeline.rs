// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end conversion scenarios.

use ordoplay_shader_convert::instantiate::instantiate;
use ordoplay_shader_convert::schedule::schedule;
use ordoplay_shader_convert::snapshot::{PropertyValue, SourceSocket};
use ordoplay_shader_convert::{
    ConversionRequest, Converter, DedupCache, Diagnostics, DocumentNode, FlattenPolicy, InMemoryScene,
    Snapshot, SourceDocument, SourceKind, TargetGraph, TargetGraphExt, TargetHost, TypeRegistry,
};
use ordoplay_shader_graph::{MaterialId, PortType, PortValue};

fn convert(doc: &SourceDocument) -> (InMemoryScene, ordoplay_shader_convert::ConversionOutcome) {
    let converter = Converter::default();
    let cache = DedupCache::new();
    let mut scene = InMemoryScene::with_catalog();
    let outcome = converter
        .convert_material(&cache, doc, &mut scene, &ConversionRequest::new(doc.name.clone()))
        .unwrap();
    (scene, outcome)
}

fn textured() -> SourceDocument {
    let mut doc = SourceDocument::new("Brick");
    doc.push_node(DocumentNode::standard("Output", SourceKind::MaterialOutput).at(400.0, 0.0));
    doc.push_node(DocumentNode::standard("BSDF", SourceKind::Principled).at(200.0, 0.0));
    doc.push_node(
        DocumentNode::standard("Albedo", SourceKind::ImageTexture)
            .property("image", PropertyValue::Text("brick_albedo.png".into()))
            .property("color_space", PropertyValue::Text("sRGB".into())),
    );
    doc.push_node(
        DocumentNode::standard("Rough", SourceKind::ImageTexture)
            .property("image", PropertyValue::Text("brick_rough.png".into()))
            .property("color_space", PropertyValue::Text("Non-Color".into())),
    );
    doc.push_node(DocumentNode::standard("Coords", SourceKind::TexCoord));
    doc.link("Coords", "UV", "Albedo", "Vector");
    doc.link("Coords", "UV", "Rough", "Vector");
    doc.link("Albedo", "Color", "BSDF", "Base Color");
    doc.link("Rough", "Color", "BSDF", "Roughness");
    doc.link("BSDF", "BSDF", "Output", "Surface");
    doc
}

fn image_gammas(scene: &InMemoryScene, id: MaterialId) -> Vec<(String, Option<PortValue>)> {
    let graph = scene.graph(id).unwrap();
    graph
        .nodes_of_kind("ShaderNodeOctImageTex")
        .into_iter()
        .map(|n| {
            let space = match graph.parameter(n, "color_space") {
                Some(PortValue::String(space)) => space,
                _ => String::new(),
            };
            (space, graph.input_value(n, "Gamma"))
        })
        .collect()
}

#[test]
fn test_schedule_is_topological() {
    let doc = textured();
    let snapshot = Snapshot::capture(&doc, &FlattenPolicy::default()).unwrap();
    let order = schedule(&snapshot).unwrap();

    assert_eq!(order.len(), snapshot.node_count());
    let position = |id| order.iter().position(|o| *o == id).unwrap();
    for link in snapshot.links() {
        assert!(position(link.from_node) < position(link.to_node));
    }
}

#[test]
fn test_second_conversion_hits_cache() {
    let doc = textured();
    let converter = Converter::default();
    let cache = DedupCache::new();
    let mut scene = InMemoryScene::with_catalog();
    let request = ConversionRequest::new("Brick");

    let first = converter.convert_material(&cache, &doc, &mut scene, &request).unwrap();
    let second = converter.convert_material(&cache, &doc, &mut scene, &request).unwrap();

    assert!(!first.cache_hit);
    assert!(second.cache_hit);
    assert_eq!(first.target_id, second.target_id);
    assert!(second.links.is_empty());
    assert_eq!(scene.material_count(), 1);
}

#[test]
fn test_cosmetic_edit_keeps_cache() {
    let mut doc = textured();
    let converter = Converter::default();
    let cache = DedupCache::new();
    let mut scene = InMemoryScene::with_catalog();
    let request = ConversionRequest::new("Brick");

    let first = converter.convert_material(&cache, &doc, &mut scene, &request).unwrap();
    doc.node_mut("BSDF").unwrap().location = [900.0, 900.0];
    let moved = converter.convert_material(&cache, &doc, &mut scene, &request).unwrap();
    assert!(moved.cache_hit);

    doc.node_mut("BSDF")
        .unwrap()
        .set_input_default("Roughness", PortValue::Float(0.9));
    let edited = converter.convert_material(&cache, &doc, &mut scene, &request).unwrap();
    assert!(!edited.cache_hit);
    assert_ne!(edited.target_id, first.target_id);
}

#[test]
fn test_gamma_is_absolute() {
    let doc = textured();
    let converter = Converter::default();
    let cache = DedupCache::new();
    let mut scene = InMemoryScene::with_catalog();
    let request = ConversionRequest::new("Brick").with_gamma(1.8);

    let outcome = converter.convert_material(&cache, &doc, &mut scene, &request).unwrap();
    let mut gammas = image_gammas(&scene, outcome.target_id);
    gammas.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        gammas,
        vec![
            ("color".to_string(), Some(PortValue::Float(1.8))),
            ("non-color".to_string(), Some(PortValue::Float(1.0))),
        ]
    );

    for _ in 0..3 {
        assert_eq!(converter.update_gamma(&mut scene, outcome.target_id, 2.2).unwrap(), 1);
    }
    let mut after = image_gammas(&scene, outcome.target_id);
    after.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(after[0].1, Some(PortValue::Float(2.2)));
    assert_eq!(after[1].1, Some(PortValue::Float(1.0)));
}

#[test]
fn test_data_images_skip_gamma_whatever_their_tag() {
    let mut doc = SourceDocument::new("Varnish");
    doc.push_node(DocumentNode::standard("Output", SourceKind::MaterialOutput));
    doc.push_node(DocumentNode::standard("BSDF", SourceKind::Principled));
    doc.push_node(DocumentNode::standard("Map", SourceKind::NormalMap));
    doc.push_node(
        DocumentNode::standard("Paint", SourceKind::ImageTexture)
            .property("image", PropertyValue::Text("paint.png".into()))
            .property("color_space", PropertyValue::Text("sRGB".into())),
    );
    doc.push_node(
        DocumentNode::standard("Grain", SourceKind::ImageTexture)
            .property("image", PropertyValue::Text("grain.png".into()))
            .property("color_space", PropertyValue::Text("sRGB".into())),
    );
    doc.push_node(
        DocumentNode::standard("Dents", SourceKind::ImageTexture)
            .property("image", PropertyValue::Text("dents.png".into())),
    );
    doc.link("Paint", "Color", "BSDF", "Base Color");
    doc.link("Grain", "Color", "BSDF", "Roughness");
    doc.link("Dents", "Color", "Map", "Color");
    doc.link("Map", "Normal", "BSDF", "Normal");
    doc.link("BSDF", "BSDF", "Output", "Surface");

    let converter = Converter::default();
    let cache = DedupCache::new();
    let mut scene = InMemoryScene::with_catalog();
    let request = ConversionRequest::new("Varnish").with_gamma(1.8);
    let outcome = converter.convert_material(&cache, &doc, &mut scene, &request).unwrap();

    let gamma_of = |scene: &InMemoryScene, file: &str| {
        let graph = scene.graph(outcome.target_id).unwrap();
        let image = graph
            .nodes_of_kind("ShaderNodeOctImageTex")
            .into_iter()
            .find(|n| graph.parameter(*n, "image") == Some(PortValue::String(file.into())))
            .unwrap();
        (graph.parameter(image, "color_space"), graph.input_value(image, "Gamma"))
    };
    let linear = (Some(PortValue::String("non-color".into())), Some(PortValue::Float(1.0)));
    assert_eq!(
        gamma_of(&scene, "paint.png"),
        (Some(PortValue::String("color".into())), Some(PortValue::Float(1.8)))
    );
    assert_eq!(gamma_of(&scene, "grain.png"), linear);
    assert_eq!(gamma_of(&scene, "dents.png"), linear);

    assert_eq!(converter.update_gamma(&mut scene, outcome.target_id, 2.4).unwrap(), 1);
    assert_eq!(gamma_of(&scene, "grain.png"), linear);
    assert_eq!(gamma_of(&scene, "paint.png").1, Some(PortValue::Float(2.4)));
}

#[test]
fn test_link_sockets_are_deterministic() {
    let doc = textured();
    let (_, first) = convert(&doc);
    let (_, second) = convert(&doc);

    let pairs = |links: &[ordoplay_shader_convert::LinkRecord]| -> Vec<(String, String)> {
        links
            .iter()
            .map(|l| (l.from_socket.clone(), l.to_socket.clone()))
            .collect()
    };
    assert_eq!(first.links.len(), 5);
    assert_eq!(pairs(&first.links), pairs(&second.links));
}

#[test]
fn test_passthrough_chain_flattens() {
    let mut doc = SourceDocument::new("Channels");
    doc.push_node(DocumentNode::standard("Image", SourceKind::ImageTexture));
    doc.push_node(DocumentNode::standard("Split", SourceKind::SeparateColor));
    doc.push_node(DocumentNode::standard("Scale", SourceKind::Math));
    doc.push_node(DocumentNode::standard("BSDF", SourceKind::Principled));
    doc.link("Image", "Color", "Split", "Color");
    doc.link("Split", "Red", "Scale", "Value");
    doc.link("Scale", "Value", "BSDF", "Roughness");

    let snapshot = Snapshot::capture(&doc, &FlattenPolicy::default()).unwrap();
    assert_eq!(snapshot.links().len(), 1);
    let link = &snapshot.links()[0];
    assert_eq!(snapshot.node(link.from_node).unwrap().name, "Image");
    assert_eq!(snapshot.node(link.to_node).unwrap().name, "BSDF");
    assert_eq!(link.via.len(), 2);

    let order = schedule(&snapshot).unwrap();
    let mut scene = InMemoryScene::with_catalog();
    let material = scene.create_material("Channels");
    let mut diagnostics = Diagnostics::new();
    let table = instantiate(
        &snapshot,
        &order,
        &TypeRegistry::standard(),
        scene.material_graph(material).unwrap(),
        &mut diagnostics,
    );
    for passthrough in snapshot.passthroughs() {
        assert!(!table.contains(passthrough.id));
    }
    assert_eq!(table.len(), 2);
}

#[test]
fn test_transmissive_principled_enters_specular_mode() {
    let mut doc = SourceDocument::new("Glass");
    doc.push_node(
        DocumentNode::standard("BSDF", SourceKind::Principled)
            .with_default("Transmission Weight", PortValue::Float(0.8)),
    );
    doc.push_node(DocumentNode::standard("Output", SourceKind::MaterialOutput));
    doc.link("BSDF", "BSDF", "Output", "Surface");

    let (scene, outcome) = convert(&doc);
    let graph = scene.graph(outcome.target_id).unwrap();
    let universal = graph.nodes_of_kind("ShaderNodeOctUniversalMat")[0];
    assert_eq!(graph.parameter(universal, "specular_mode"), Some(PortValue::Bool(true)));
    assert_eq!(
        graph.input_value(universal, "Albedo color"),
        Some(PortValue::Color([0.0, 0.0, 0.0, 1.0]))
    );
}

#[test]
fn test_mix_shader_swaps_high_factor() {
    let mut doc = SourceDocument::new("Blend");
    doc.push_node(DocumentNode::standard("Matte", SourceKind::Diffuse));
    doc.push_node(DocumentNode::standard("Shiny", SourceKind::Glossy));
    doc.push_node(DocumentNode::standard("Mix", SourceKind::MixShader).with_default("Fac", PortValue::Float(0.9)));
    doc.push_node(DocumentNode::standard("Output", SourceKind::MaterialOutput));
    doc.link("Matte", "BSDF", "Mix", "Shader");
    doc.link("Shiny", "BSDF", "Mix", "Shader_001");
    doc.link("Mix", "Shader", "Output", "Surface");

    let (scene, outcome) = convert(&doc);
    let graph = scene.graph(outcome.target_id).unwrap();
    let mix = graph.nodes_of_kind("ShaderNodeOctMixMat")[0];
    let first = graph.link_into(mix, "Material1").unwrap();
    assert_eq!(graph.node_kind(first.from_node).as_deref(), Some("ShaderNodeOctGlossyMat"));
    assert_eq!(graph.input_value(mix, "Amount"), Some(PortValue::Float(0.9)));
}

#[test]
fn test_unregistered_kind_is_not_fatal() {
    let mut doc = SourceDocument::new("Mystery");
    doc.push_node(DocumentNode::standard("Image", SourceKind::ImageTexture));
    doc.push_node(
        DocumentNode::new("Filter", "ShaderNodeFromTheFuture")
            .input(SourceSocket::new("Color", PortType::Color))
            .output(SourceSocket::new("Color", PortType::Color)),
    );
    doc.push_node(
        DocumentNode::new("Source", "ShaderNodeAlsoFromTheFuture").output(SourceSocket::new("Value", PortType::Float)),
    );
    doc.push_node(DocumentNode::standard("BSDF", SourceKind::Principled));
    doc.link("Image", "Color", "Filter", "Color");
    doc.link("Filter", "Color", "BSDF", "Base Color");
    doc.link("Source", "Value", "BSDF", "Roughness");

    let (scene, outcome) = convert(&doc);
    let unsupported = outcome.diagnostics.iter().filter(|d| d.is_unsupported_kind()).count();
    assert_eq!(unsupported, 2);
    assert_eq!(outcome.diagnostics.iter().filter(|d| d.is_unresolved_link()).count(), 1);

    let graph = scene.graph(outcome.target_id).unwrap();
    assert_eq!(graph.node_ids().len(), 2);
    let universal = graph.nodes_of_kind("ShaderNodeOctUniversalMat")[0];
    let albedo = graph.link_into(universal, "Albedo color").unwrap();
    assert_eq!(graph.node_kind(albedo.from_node).as_deref(), Some("ShaderNodeOctImageTex"));
    assert!(!graph.is_linked(universal, "Roughness"));
}

#[test]
fn test_batch_continues_after_failure() {
    let good = textured();
    let mut cyclic = SourceDocument::new("Loop");
    cyclic.push_node(DocumentNode::standard("A", SourceKind::Invert));
    cyclic.push_node(DocumentNode::standard("B", SourceKind::Invert));
    cyclic.link("A", "Color", "B", "Color");
    cyclic.link("B", "Color", "A", "Color");

    let converter = Converter::default();
    let cache = DedupCache::new();
    let mut scene = InMemoryScene::with_catalog();
    let jobs: Vec<(&dyn ordoplay_shader_convert::SourceGraphProvider, ConversionRequest)> = vec![
        (&cyclic, ConversionRequest::new("Loop")),
        (&good, ConversionRequest::new("Brick")),
    ];
    let results = converter.convert_batch(&cache, &mut scene, jobs);

    assert_eq!(results.len(), 2);
    assert!(results[0].1.is_err());
    assert!(results[1].1.is_ok());
    assert_eq!(scene.material_count(), 1);
}
