// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader and volume handlers.

use super::{MixPlan, TransferContext};
use crate::snapshot::SourceNode;
use ordoplay_shader_graph::{NodeId, PortValue};

const BLACK: PortValue = PortValue::Color([0.0, 0.0, 0.0, 1.0]);

/// Principled BSDF onto a universal material
pub(super) fn principled(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    let base = source.color("Base Color");

    if let Some(metallic) = ctx.unit(source, "Metallic") {
        ctx.set(node, &["Metallic", "Metallic float"], PortValue::Float(metallic));
    }
    if let Some(roughness) = ctx.unit(source, "Roughness") {
        ctx.set(node, &["Roughness", "Roughness float"], PortValue::Float(roughness));
    }
    if let Some(ior) = ctx.ior(source, "IOR") {
        ctx.set(node, &["Dielectric IOR", "Index", "IOR"], PortValue::Float(ior));
    }
    if let Some(specular) = ctx.unit(source, "Specular IOR Level") {
        ctx.set(node, &["Specular", "Specular float"], PortValue::Float(specular));
    }
    ctx.copy(source, "Specular Tint", node, &["Specular color"]);
    if let Some(alpha) = ctx.unit(source, "Alpha") {
        ctx.set(node, &["Opacity", "Opacity float"], PortValue::Float(alpha));
    }

    if let Some(anisotropy) = ctx.unit(source, "Anisotropic") {
        ctx.set(node, &["Anisotropy"], PortValue::Float(anisotropy));
    }
    if let Some(rotation) = ctx.unit(source, "Anisotropic Rotation") {
        ctx.set(node, &["Anisotropy rotation"], PortValue::Float(rotation));
    }

    if let Some(coat) = ctx.unit(source, "Coat Weight") {
        ctx.set(node, &["Coating", "Coating float"], PortValue::Float(coat));
    }
    if let Some(roughness) = ctx.unit(source, "Coat Roughness") {
        ctx.set(node, &["Coating roughness"], PortValue::Float(roughness));
    }
    if let Some(ior) = ctx.ior(source, "Coat IOR") {
        ctx.set(node, &["Coating IOR"], PortValue::Float(ior));
    }

    if let Some(sheen) = ctx.unit(source, "Sheen Weight") {
        ctx.set(node, &["Sheen"], PortValue::Float(sheen));
    }
    if let Some(roughness) = ctx.unit(source, "Sheen Roughness") {
        ctx.set(node, &["Sheen roughness"], PortValue::Float(roughness));
    }

    if let Some(thickness) = ctx.non_negative(source, "Thin Film Thickness") {
        ctx.set(node, &["Film width"], PortValue::Float(thickness));
    }
    if let Some(ior) = ctx.ior(source, "Thin Film IOR") {
        ctx.set(node, &["Film IOR"], PortValue::Float(ior));
    }

    // Subsurface radius/scale drive the internal medium
    ctx.copy(source, "Subsurface Radius", node, &["Medium radius", "Absorption"]);
    if let Some(scale) = ctx.non_negative(source, "Subsurface Scale") {
        ctx.set(node, &["Medium scale", "Density"], PortValue::Float(scale));
    }

    // Transmission above the threshold switches to specular mode
    let transmission_key = if source.input("Transmission Weight").is_some() {
        "Transmission Weight"
    } else {
        "Transmission"
    };
    let transmission = ctx.unit(source, transmission_key).unwrap_or(0.0);
    let transmissive =
        transmission > ctx.settings.transmission_threshold || ctx.is_linked(source, transmission_key);
    ctx.set(node, &["Transmission", "Transmission float"], PortValue::Float(transmission));

    if transmissive {
        ctx.set(node, &["Albedo color", "Albedo"], BLACK);
        if let Some(base) = base {
            ctx.set(node, &["Transmission color"], PortValue::Color(base));
        }
        ctx.param(node, "specular_mode", PortValue::Bool(true));
        if ctx.settings.fake_shadows_for_transmission {
            ctx.param(node, "fake_shadows", PortValue::Bool(true));
        }
    } else if let Some(base) = base {
        ctx.set(node, &["Albedo color", "Albedo"], PortValue::Color(base));
    }

    emission_channel(ctx, source, node, "Emission Color", "Emission Strength");
}

/// Route emission colour/strength through a texture-emission helper
fn emission_channel(
    ctx: &mut TransferContext<'_>,
    source: &SourceNode,
    node: NodeId,
    color_key: &str,
    strength_key: &str,
) {
    let color_linked = ctx.is_linked(source, color_key);
    let strength_linked = ctx.is_linked(source, strength_key);
    let strength = ctx.non_negative(source, strength_key).unwrap_or(0.0);
    if strength <= 0.0 && !strength_linked {
        return;
    }

    ctx.notes.emissive.insert(source.id, strength);
    ctx.param(node, "surface_brightness", PortValue::Bool(true));

    if !ctx.settings.insert_emission_helpers && ctx.table.emission_aux(source.id).is_none() {
        return;
    }
    let Some(helper) = ctx.emission_helper(source) else { return };

    if !color_linked {
        let color = source.color(color_key).unwrap_or([1.0, 1.0, 1.0, 1.0]);
        ctx.set(helper, &["Texture"], PortValue::Color(color));
    }
    ctx.set(helper, &["Power"], PortValue::Float(strength));

    if let Err(error) = ctx.graph.create_link(helper, "OutEmission", node, "Emission") {
        tracing::debug!(node = %source.name, %error, "emission helper left unwired");
    }
}

/// Glass BSDF onto a specular material
pub(super) fn glass(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    ctx.copy(source, "Color", node, &["Transmission"]);
    if let Some(roughness) = ctx.unit(source, "Roughness") {
        ctx.set(node, &["Roughness"], PortValue::Float(roughness));
    }
    if let Some(ior) = ctx.ior(source, "IOR") {
        ctx.set(node, &["Index", "Dielectric IOR"], PortValue::Float(ior));
    }
    if ctx.settings.fake_shadows_for_transmission {
        ctx.param(node, "fake_shadows", PortValue::Bool(true));
    }
}

/// Refraction BSDF: glass without a reflection lobe
pub(super) fn refraction(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    glass(ctx, source, node);
    ctx.set(node, &["Reflection"], BLACK);
}

/// Glossy BSDF (and the specular shader) onto a glossy material
pub(super) fn glossy(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    let specular = source.first_value(&["Color", "Specular"]).cloned();
    if let Some(specular) = specular {
        ctx.set(node, &["Specular", "Reflection"], specular);
    }
    let diffuse = source
        .color("Base Color")
        .map(PortValue::Color)
        .unwrap_or(BLACK);
    ctx.set(node, &["Diffuse"], diffuse);
    if let Some(roughness) = ctx.unit(source, "Roughness") {
        ctx.set(node, &["Roughness"], PortValue::Float(roughness));
    }
    if let Some(ior) = ctx.ior(source, "IOR") {
        ctx.set(node, &["Index"], PortValue::Float(ior));
    }
}

/// Diffuse BSDF
pub(super) fn diffuse(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    ctx.copy(source, "Color", node, &["Diffuse", "Albedo color"]);
    if let Some(roughness) = ctx.unit(source, "Roughness") {
        ctx.set(node, &["Roughness"], PortValue::Float(roughness));
    }
}

/// Translucent BSDF: diffuse that also transmits its colour
pub(super) fn translucent(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    ctx.copy(source, "Color", node, &["Diffuse"]);
    ctx.copy(source, "Color", node, &["Transmission"]);
}

/// Emission and world background onto a black diffuse plus helper
pub(super) fn emission(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    ctx.set(node, &["Diffuse", "Albedo color"], BLACK);
    emission_channel(ctx, source, node, "Color", "Strength");
}

/// Metallic BSDF
pub(super) fn metallic(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    ctx.copy(source, "Base Color", node, &["Albedo color"]);
    ctx.copy(source, "Color", node, &["Albedo color"]);
    ctx.copy(source, "Edge Tint", node, &["Specular color", "Specular"]);
    if let Some(roughness) = ctx.unit(source, "Roughness") {
        ctx.set(node, &["Roughness"], PortValue::Float(roughness));
    }
    if let Some(anisotropy) = ctx.unit(source, "Anisotropy") {
        ctx.set(node, &["Anisotropy"], PortValue::Float(anisotropy));
    }
    if let Some(rotation) = ctx.unit(source, "Rotation") {
        ctx.set(node, &["Anisotropy rotation"], PortValue::Float(rotation));
    }
    // Falling back to a universal material needs full metalness
    ctx.set(node, &["Metallic"], PortValue::Float(1.0));
}

/// Sheen BSDF onto a universal material with only the sheen layer
pub(super) fn sheen(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    ctx.set(node, &["Albedo color"], BLACK);
    ctx.set(node, &["Sheen"], PortValue::Float(1.0));
    if let Some(roughness) = ctx.unit(source, "Roughness") {
        ctx.set(node, &["Sheen roughness"], PortValue::Float(roughness));
    }
}

/// Toon BSDF
pub(super) fn toon(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    ctx.copy(source, "Color", node, &["Diffuse"]);
    if let Some(size) = ctx.unit(source, "Size") {
        ctx.set(node, &["Roughness"], PortValue::Float(size));
    }
}

/// Subsurface scattering onto a universal material's medium
pub(super) fn subsurface(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    ctx.copy(source, "Color", node, &["Albedo color"]);
    ctx.copy(source, "Radius", node, &["Medium radius"]);
    if let Some(scale) = ctx.non_negative(source, "Scale") {
        ctx.set(node, &["Medium scale"], PortValue::Float(scale));
    }
    if let Some(ior) = ctx.ior(source, "IOR") {
        ctx.set(node, &["Dielectric IOR"], PortValue::Float(ior));
    }
}

/// Mix shader: choose the slot order and amount
pub(super) fn mix_shader(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    let factor_key = if source.input("Fac").is_some() { "Fac" } else { "Factor" };
    let linked = ctx.is_linked(source, factor_key);
    let factor = ctx.unit(source, factor_key).unwrap_or(0.5);

    let swapped = linked || factor > 0.5;
    let amount = if swapped { factor } else { 1.0 - factor };
    ctx.set(node, &["Amount"], PortValue::Float(amount));
    ctx.notes.mix_plans.insert(source.id, MixPlan { swapped, amount });
}

/// Add shader: an even mix
pub(super) fn add_shader(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    ctx.set(node, &["Amount"], PortValue::Float(0.5));
    ctx.notes.mix_plans.insert(
        source.id,
        MixPlan {
            swapped: false,
            amount: 0.5,
        },
    );
}

/// Volume absorption medium
pub(super) fn volume_absorption(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    ctx.copy(source, "Color", node, &["Absorption"]);
    if let Some(density) = ctx.non_negative(source, "Density") {
        ctx.set(node, &["Density"], PortValue::Float(density));
    }
}

/// Volume scatter medium
pub(super) fn volume_scatter(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    ctx.copy(source, "Color", node, &["Scattering"]);
    if let Some(density) = ctx.non_negative(source, "Density") {
        ctx.set(node, &["Density"], PortValue::Float(density));
    }
    if let Some(phase) = ctx.clamped(source, "Anisotropy", -1.0, 1.0) {
        ctx.set(node, &["Phase"], PortValue::Float(phase));
    }
}

/// Principled volume onto a volume medium
pub(super) fn principled_volume(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    ctx.copy(source, "Color", node, &["Scattering"]);
    ctx.copy(source, "Absorption Color", node, &["Absorption"]);
    if let Some(density) = ctx.non_negative(source, "Density") {
        ctx.set(node, &["Density"], PortValue::Float(density));
    }
    if let Some(phase) = ctx.clamped(source, "Anisotropy", -1.0, 1.0) {
        ctx.set(node, &["Phase"], PortValue::Float(phase));
    }
}

#[cfg(test)]
mod tests {
    use super::super::harness::{run, run_with};
    use crate::config::ConversionSettings;
    use crate::document::{DocumentNode, SourceDocument};
    use crate::kind::SourceKind;
    use crate::target::{TargetGraph, TargetGraphExt};
    use ordoplay_shader_graph::PortValue;

    fn principled(transmission: f32) -> SourceDocument {
        let mut doc = SourceDocument::new("Principled");
        doc.push_node(
            DocumentNode::standard("BSDF", SourceKind::Principled)
                .with_default("Base Color", PortValue::Color([0.9, 0.1, 0.1, 1.0]))
                .with_default("Transmission Weight", PortValue::Float(transmission)),
        );
        doc
    }

    #[test]
    fn test_transmission_enables_specular_mode() {
        let result = run(&principled(0.8));
        assert_eq!(result.param("BSDF", "specular_mode"), Some(PortValue::Bool(true)));
        assert_eq!(result.param("BSDF", "fake_shadows"), Some(PortValue::Bool(true)));
        assert_eq!(
            result.input("BSDF", "Albedo color"),
            Some(PortValue::Color([0.0, 0.0, 0.0, 1.0]))
        );
        assert_eq!(
            result.input("BSDF", "Transmission color"),
            Some(PortValue::Color([0.9, 0.1, 0.1, 1.0]))
        );
    }

    #[test]
    fn test_low_transmission_keeps_albedo() {
        let result = run(&principled(0.3));
        assert_eq!(result.param("BSDF", "specular_mode"), None);
        assert_eq!(
            result.input("BSDF", "Albedo color"),
            Some(PortValue::Color([0.9, 0.1, 0.1, 1.0]))
        );
    }

    #[test]
    fn test_fake_shadows_follow_setting() {
        let settings = ConversionSettings {
            fake_shadows_for_transmission: false,
            ..ConversionSettings::default()
        };
        let result = run_with(&principled(0.9), &settings);
        assert_eq!(result.param("BSDF", "specular_mode"), Some(PortValue::Bool(true)));
        assert_eq!(result.param("BSDF", "fake_shadows"), None);
    }

    #[test]
    fn test_emissive_principled_gets_helper() {
        let mut doc = principled(0.0);
        doc.nodes[0].set_input_default("Emission Strength", PortValue::Float(3.0));
        doc.nodes[0].set_input_default("Emission Color", PortValue::Color([1.0, 0.5, 0.0, 1.0]));
        let result = run(&doc);

        let id = result.snapshot.node_by_name("BSDF").unwrap().id;
        let helper = result.table.emission_aux(id).unwrap();
        let primary = result.primary("BSDF");
        let graph = result.graph();

        assert_eq!(result.param("BSDF", "surface_brightness"), Some(PortValue::Bool(true)));
        assert_eq!(graph.input_value(helper, "Power"), Some(PortValue::Float(3.0)));
        assert_eq!(
            graph.input_value(helper, "Texture"),
            Some(PortValue::Color([1.0, 0.5, 0.0, 1.0]))
        );
        let link = graph.link_into(primary, "Emission").unwrap();
        assert_eq!(link.from_node, helper);
        assert_eq!(result.notes.emissive.get(&id), Some(&3.0));
    }

    #[test]
    fn test_out_of_range_ior_is_clamped() {
        let mut doc = principled(0.0);
        doc.nodes[0].set_input_default("IOR", PortValue::Float(0.4));
        let result = run(&doc);
        assert_eq!(result.input("BSDF", "Dielectric IOR"), Some(PortValue::Float(1.0)));
        assert!(result.diagnostics.records().iter().any(|d| d.is_value_domain()));
    }

    #[test]
    fn test_mix_factor_swaps_slots() {
        let mut doc = SourceDocument::new("Mix");
        doc.push_node(
            DocumentNode::standard("Mix", SourceKind::MixShader)
                .with_default("Fac", PortValue::Float(0.9)),
        );
        let result = run(&doc);
        let id = result.snapshot.node_by_name("Mix").unwrap().id;
        let plan = result.notes.mix_plans[&id];
        assert!(plan.swapped);
        assert!((plan.amount - 0.9).abs() < 1e-6);

        let mut doc = SourceDocument::new("Mix");
        doc.push_node(
            DocumentNode::standard("Mix", SourceKind::MixShader)
                .with_default("Fac", PortValue::Float(0.2)),
        );
        let result = run(&doc);
        let id = result.snapshot.node_by_name("Mix").unwrap().id;
        let plan = result.notes.mix_plans[&id];
        assert!(!plan.swapped);
        assert!((plan.amount - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_emission_shader_uses_black_diffuse() {
        let mut doc = SourceDocument::new("Glow");
        doc.push_node(
            DocumentNode::standard("Light", SourceKind::Emission)
                .with_default("Strength", PortValue::Float(5.0)),
        );
        let result = run(&doc);
        assert_eq!(
            result.input("Light", "Diffuse"),
            Some(PortValue::Color([0.0, 0.0, 0.0, 1.0]))
        );
        let id = result.snapshot.node_by_name("Light").unwrap().id;
        let helper = result.table.emission_aux(id).unwrap();
        assert_eq!(result.graph().input_value(helper, "Power"), Some(PortValue::Float(5.0)));
    }
}
