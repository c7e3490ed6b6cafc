// SPDX-License-Identifier: MIT OR Apache-2.0
//! Texture and colour handlers.

use super::TransferContext;
use crate::gamma::{COLOR_SPACE_PARAM, NON_COLOR};
use crate::snapshot::{PropertyValue, SourceNode};
use ordoplay_shader_graph::{NodeId, PortValue};

/// Colour spaces that carry data rather than colour
const NON_COLOR_SPACES: &[&str] = &["Non-Color", "Linear", "Raw", "Linear Rec.709", "XYZ"];

fn is_non_color(space: &str) -> bool {
    NON_COLOR_SPACES.iter().any(|s| s.eq_ignore_ascii_case(space))
}

fn projection_mode(projection: &str) -> &'static str {
    match projection {
        "BOX" => "BOX",
        "SPHERE" => "SPHERICAL",
        "TUBE" => "CYLINDRICAL",
        _ => "XY",
    }
}

/// Common part of image and environment lookups
fn bitmap(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    if let Some(path) = source.text_property("image") {
        ctx.param(node, "image", PortValue::String(path.to_string()));
    }
    if let Some(interpolation) = source.text_property("interpolation") {
        ctx.param(node, "interpolation", PortValue::String(interpolation.to_string()));
    }

    let non_color = source.text_property("color_space").is_some_and(is_non_color);
    let (space, gamma) = if non_color {
        ctx.notes.non_color.insert(source.id);
        (NON_COLOR, 1.0)
    } else {
        ("color", ctx.settings.default_gamma)
    };
    ctx.param(node, COLOR_SPACE_PARAM, PortValue::String(space.to_string()));
    ctx.set(node, &["Gamma"], PortValue::Float(gamma));
}

/// Image texture
pub(super) fn image_texture(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    bitmap(ctx, source, node);
    let projection = source.text_property("projection").unwrap_or("FLAT");
    ctx.param(node, "projection", PortValue::String(projection_mode(projection).to_string()));
}

/// Environment texture: an image with spherical projection
pub(super) fn environment_texture(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    bitmap(ctx, source, node);
    ctx.param(node, "projection", PortValue::String("SPHERICAL".to_string()));
}

/// Noise and musgrave style fractals
pub(super) fn noise(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    if let Some(detail) = ctx.clamped(source, "Detail", 0.0, 15.0) {
        ctx.set(node, &["Octaves"], PortValue::Float(detail));
    }
    if let Some(roughness) = ctx.unit(source, "Roughness") {
        ctx.set(node, &["Omega"], PortValue::Float(roughness));
    }
    if let Some(distortion) = ctx.non_negative(source, "Distortion") {
        ctx.set(node, &["Distortion"], PortValue::Float(distortion));
    }
    if let Some(lacunarity) = ctx.non_negative(source, "Lacunarity") {
        ctx.set(node, &["Lacunarity"], PortValue::Float(lacunarity));
    }
    procedural_scale(ctx, source, node);
}

/// Source scale adjusted for the object scale, kept as a parameter since
/// the fractal has no scale input
fn procedural_scale(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    if let Some(scale) = source.float("Scale") {
        let scale = scale * ctx.procedural_scale();
        if ctx.set(node, &["Scale"], PortValue::Float(scale)).is_none() {
            ctx.param(node, "procedural_scale", PortValue::Float(scale));
        }
    }
}

/// Voronoi
pub(super) fn voronoi(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    procedural_scale(ctx, source, node);
    if let Some(randomness) = ctx.unit(source, "Randomness") {
        ctx.set(node, &["Randomness"], PortValue::Float(randomness));
    }
}

/// Wave
pub(super) fn wave(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    procedural_scale(ctx, source, node);
    if let Some(wave_type) = source.text_property("wave_type") {
        ctx.param(node, "wave_type", PortValue::String(wave_type.to_string()));
    }
}

/// Checker
pub(super) fn checker(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    ctx.copy(source, "Color1", node, &["Color1"]);
    ctx.copy(source, "Color2", node, &["Color2"]);
    procedural_scale(ctx, source, node);
}

/// Colour ramp onto a gradient map: the outer stops become the ends
pub(super) fn color_ramp(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    let Some(stops) = source.property("color_ramp").and_then(PropertyValue::as_ramp) else {
        return;
    };
    let mut sorted = stops.to_vec();
    sorted.sort_by(|a, b| a.position.total_cmp(&b.position));
    if let (Some(first), Some(last)) = (sorted.first(), sorted.last()) {
        ctx.set(node, &["Start color"], PortValue::Color(first.color));
        ctx.set(node, &["End color"], PortValue::Color(last.color));
    }
    if sorted.len() > 2 {
        tracing::debug!(node = %source.name, stops = sorted.len(), "inner ramp stops dropped");
    }
    if let Some(interpolation) = source.text_property("interpolation") {
        ctx.param(node, "interpolation", PortValue::String(interpolation.to_string()));
    }
}

fn blend(
    ctx: &mut TransferContext<'_>,
    source: &SourceNode,
    node: NodeId,
    [factor, first, second]: [&str; 3],
) {
    if let Some(amount) = ctx.unit(source, factor) {
        ctx.set(node, &["Amount"], PortValue::Float(amount));
    }
    ctx.copy(source, first, node, &["Texture1"]);
    ctx.copy(source, second, node, &["Texture2"]);
    let blend_type = source.text_property("blend_type").unwrap_or("MIX");
    ctx.param(node, "blend_type", PortValue::String(blend_type.to_string()));
    if source.property("use_clamp").and_then(PropertyValue::as_bool) == Some(true) {
        ctx.param(node, "clamp", PortValue::Bool(true));
    }
}

/// Legacy Mix RGB
pub(super) fn mix_rgb(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    blend(ctx, source, node, ["Fac", "Color1", "Color2"]);
}

/// Mix node in colour mode
pub(super) fn mix(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    let first = if source.input("A_Color").is_some() { "A_Color" } else { "A" };
    let second = if source.input("B_Color").is_some() { "B_Color" } else { "B" };
    blend(ctx, source, node, ["Factor", first, second]);
}

/// Invert
pub(super) fn invert(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    ctx.copy(source, "Color", node, &["Texture"]);
}

/// Hue/Saturation/Value onto colour correction
pub(super) fn hue_saturation(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    ctx.copy(source, "Color", node, &["Texture"]);
    if let Some(hue) = ctx.unit(source, "Hue") {
        // Source hue is centred on 0.5
        ctx.set(node, &["Hue"], PortValue::Float(hue - 0.5));
    }
    if let Some(saturation) = ctx.non_negative(source, "Saturation") {
        ctx.set(node, &["Saturation"], PortValue::Float(saturation));
    }
    if let Some(value) = ctx.non_negative(source, "Value") {
        ctx.set(node, &["Brightness"], PortValue::Float(value));
    }
}

/// Bright/Contrast onto colour correction
pub(super) fn bright_contrast(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    ctx.copy(source, "Color", node, &["Texture"]);
    if let Some(bright) = source.float("Bright") {
        let brightness = ctx.guard(source.id, "Bright", 1.0 + bright, 0.0, f32::INFINITY);
        ctx.set(node, &["Brightness"], PortValue::Float(brightness));
    }
    if let Some(contrast) = ctx.clamped(source, "Contrast", -1.0, 1.0) {
        ctx.set(node, &["Contrast"], PortValue::Float(contrast));
    }
}

/// Gamma
pub(super) fn gamma(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    ctx.copy(source, "Color", node, &["Texture"]);
    if let Some(gamma) = ctx.clamped(source, "Gamma", 0.001, 100.0) {
        ctx.set(node, &["Gamma"], PortValue::Float(gamma));
    }
}

/// RGB to BW: colour correction with saturation removed
pub(super) fn rgb_to_bw(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    ctx.copy(source, "Color", node, &["Texture"]);
    ctx.set(node, &["Saturation"], PortValue::Float(0.0));
}

#[cfg(test)]
mod tests {
    use super::super::harness::{run, run_preserving, run_with};
    use crate::config::ConversionSettings;
    use crate::document::{DocumentNode, SourceDocument};
    use crate::kind::SourceKind;
    use crate::snapshot::{PropertyValue, RampStop, SourceSocket};
    use ordoplay_shader_graph::{PortType, PortValue};

    fn image(color_space: &str) -> SourceDocument {
        let mut doc = SourceDocument::new("Image");
        doc.push_node(
            DocumentNode::standard("Tex", SourceKind::ImageTexture)
                .property("image", PropertyValue::Text("//textures/wood.png".into()))
                .property("color_space", PropertyValue::Text(color_space.into()))
                .property("projection", PropertyValue::Text("BOX".into())),
        );
        doc
    }

    #[test]
    fn test_color_image_uses_default_gamma() {
        let result = run(&image("sRGB"));
        assert_eq!(result.input("Tex", "Gamma"), Some(PortValue::Float(2.2)));
        assert_eq!(
            result.param("Tex", "color_space"),
            Some(PortValue::String("color".into()))
        );
        assert_eq!(
            result.param("Tex", "image"),
            Some(PortValue::String("//textures/wood.png".into()))
        );
        assert_eq!(result.param("Tex", "projection"), Some(PortValue::String("BOX".into())));
        assert!(result.notes.non_color.is_empty());
    }

    #[test]
    fn test_non_color_image_is_linear() {
        let result = run(&image("Non-Color"));
        assert_eq!(result.input("Tex", "Gamma"), Some(PortValue::Float(1.0)));
        assert_eq!(
            result.param("Tex", "color_space"),
            Some(PortValue::String("non-color".into()))
        );
        assert_eq!(result.notes.non_color.len(), 1);
    }

    #[test]
    fn test_noise_scale_follows_object_scale() {
        let mut doc = SourceDocument::new("Noise");
        doc.object_scale = [2.0, 2.0, 2.0];
        doc.push_node(
            DocumentNode::standard("Noise", SourceKind::NoiseTexture)
                .with_default("Scale", PortValue::Float(3.0))
                .with_default("Detail", PortValue::Float(4.0)),
        );
        let result = run_with(&doc, &ConversionSettings::default());
        assert_eq!(result.param("Noise", "procedural_scale"), Some(PortValue::Float(6.0)));
        assert_eq!(result.input("Noise", "Octaves"), Some(PortValue::Float(4.0)));
    }

    #[test]
    fn test_ramp_ends_become_gradient_colors() {
        let mut doc = SourceDocument::new("Ramp");
        doc.push_node(DocumentNode::standard("Ramp", SourceKind::ColorRamp).property(
            "color_ramp",
            PropertyValue::Ramp(vec![
                RampStop { position: 1.0, color: [1.0, 0.0, 0.0, 1.0] },
                RampStop { position: 0.4, color: [0.0, 1.0, 0.0, 1.0] },
                RampStop { position: 0.0, color: [0.0, 0.0, 1.0, 1.0] },
            ]),
        ));
        let result = run(&doc);
        assert_eq!(
            result.input("Ramp", "Start color"),
            Some(PortValue::Color([0.0, 0.0, 1.0, 1.0]))
        );
        assert_eq!(
            result.input("Ramp", "End color"),
            Some(PortValue::Color([1.0, 0.0, 0.0, 1.0]))
        );
    }

    #[test]
    fn test_hue_is_recentred() {
        let mut doc = SourceDocument::new("Hsv");
        doc.push_node(
            DocumentNode::standard("Hsv", SourceKind::HueSaturation)
                .with_default("Hue", PortValue::Float(0.75))
                .with_default("Value", PortValue::Float(1.5)),
        );
        let result = run_preserving(&doc);
        assert_eq!(result.input("Hsv", "Hue"), Some(PortValue::Float(0.25)));
        assert_eq!(result.input("Hsv", "Brightness"), Some(PortValue::Float(1.5)));
    }

    #[test]
    fn test_bright_contrast_offsets_brightness() {
        let mut doc = SourceDocument::new("Bc");
        doc.push_node(
            DocumentNode::new("Bc", SourceKind::BrightContrast.tag())
                .input(SourceSocket::new("Color", PortType::Color))
                .input(SourceSocket::new("Bright", PortType::Float).with_default(PortValue::Float(0.25)))
                .input(SourceSocket::new("Contrast", PortType::Float).with_default(PortValue::Float(0.5))),
        );
        let result = run_preserving(&doc);
        assert_eq!(result.input("Bc", "Brightness"), Some(PortValue::Float(1.25)));
        assert_eq!(result.input("Bc", "Contrast"), Some(PortValue::Float(0.5)));
    }

    #[test]
    fn test_mix_rgb_records_blend_mode() {
        let mut doc = SourceDocument::new("Blend");
        doc.push_node(
            DocumentNode::standard("Mix", SourceKind::MixRgb)
                .with_default("Fac", PortValue::Float(0.3))
                .property("blend_type", PropertyValue::Text("MIX".into())),
        );
        let result = run(&doc);
        assert_eq!(result.input("Mix", "Amount"), Some(PortValue::Float(0.3)));
        assert_eq!(
            result.param("Mix", "blend_type"),
            Some(PortValue::String("MIX".into()))
        );
    }
}
