// SPDX-License-Identifier: MIT OR Apache-2.0
//! Vector, math, constant and attribute handlers.

use super::TransferContext;
use crate::registry::translate_math_operation;
use crate::snapshot::{PropertyValue, SourceNode};
use ordoplay_shader_graph::{NodeId, PortDirection, PortValue};

fn text_param(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId, property: &str, param: &str) {
    if let Some(text) = source.text_property(property) {
        ctx.param(node, param, PortValue::String(text.to_string()));
    }
}

/// Normal map
pub(super) fn normal_map(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    if let Some(strength) = ctx.non_negative(source, "Strength") {
        ctx.set(node, &["Strength"], PortValue::Float(strength));
    }
    ctx.copy(source, "Color", node, &["Texture"]);
    let space = source.text_property("space").unwrap_or("TANGENT");
    ctx.param(node, "space", PortValue::String(space.to_string()));
    ctx.notes.non_color.insert(source.id);
}

/// Bump: strength is folded with the distance
pub(super) fn bump(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    let strength = ctx.unit(source, "Strength").unwrap_or(1.0);
    let distance = ctx.non_negative(source, "Distance").unwrap_or(1.0);
    ctx.set(node, &["Strength"], PortValue::Float(strength * distance));
    ctx.copy(source, "Height", node, &["Texture"]);
    if let Some(invert) = source.property("invert").and_then(PropertyValue::as_bool) {
        ctx.param(node, "invert", PortValue::Bool(invert));
    }
}

/// Displacement and vector displacement
pub(super) fn displacement(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    if let Some(scale) = source.float("Scale") {
        ctx.set(node, &["Amount"], PortValue::Float(scale));
    }
    if let Some(mid) = ctx.unit(source, "Midlevel") {
        ctx.set(node, &["Mid level"], PortValue::Float(mid));
    }
    ctx.copy(source, "Height", node, &["Texture"]);
    text_param(ctx, source, node, "space", "space");
}

/// Mapping onto a 3D transform; rotation in degrees
pub(super) fn mapping(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    if let Some(location) = source.vector("Location") {
        ctx.set(node, &["Translation"], PortValue::Vector(location));
    }
    if let Some(rotation) = source.vector("Rotation") {
        ctx.set(node, &["Rotation"], PortValue::Vector(rotation.map(f32::to_degrees)));
    }
    if let Some(scale) = source.vector("Scale") {
        let tolerance = ctx.settings.scale_tolerance;
        let object = ctx.object_scale;
        let scaled = if object.iter().all(|s| (s - 1.0).abs() <= tolerance) {
            scale
        } else {
            [scale[0] * object[0], scale[1] * object[1], scale[2] * object[2]]
        };
        ctx.set(node, &["Scale"], PortValue::Vector(scaled));
    }
    text_param(ctx, source, node, "vector_type", "vector_type");
}

/// UV map onto a mesh UV projection
pub(super) fn uv_map(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    text_param(ctx, source, node, "uv_map", "uv_set");
}

/// Scalar math
pub(super) fn math(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    let requested = source.text_property("operation").unwrap_or("ADD");
    let (operation, warning) = translate_math_operation(requested);
    if let Some(warning) = warning {
        ctx.warn(source.id, warning);
    }
    ctx.param(node, "operation", PortValue::String(operation.to_string()));

    ctx.copy(source, "Value", node, &["Input1", "Texture1"]);
    ctx.copy(source, "Value_001", node, &["Input2", "Texture2"]);
    if source.property("use_clamp").and_then(PropertyValue::as_bool) == Some(true) {
        ctx.param(node, "clamp", PortValue::Bool(true));
    }
}

/// Vector math
pub(super) fn vector_math(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    let operation = source.text_property("operation").unwrap_or("ADD");
    ctx.param(node, "operation", PortValue::String(operation.to_string()));
    ctx.copy(source, "Vector", node, &["Texture1", "Input1"]);
    ctx.copy(source, "Vector_001", node, &["Texture2", "Input2"]);
}

/// Map range onto a range texture
pub(super) fn map_range(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    ctx.copy(source, "Value", node, &["Input"]);
    ctx.copy(source, "From Min", node, &["Input min"]);
    ctx.copy(source, "From Max", node, &["Input max"]);
    ctx.copy(source, "To Min", node, &["Output min"]);
    ctx.copy(source, "To Max", node, &["Output max"]);
    text_param(ctx, source, node, "interpolation_type", "interpolation");
}

/// Clamp
pub(super) fn clamp(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    ctx.copy(source, "Value", node, &["Input"]);
    ctx.copy(source, "Min", node, &["Minimum"]);
    ctx.copy(source, "Max", node, &["Maximum"]);
}

/// RGB constant
pub(super) fn rgb(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    let color = match source.property("color") {
        Some(PropertyValue::Color(color)) => Some(*color),
        _ => source
            .outputs
            .first()
            .and_then(|s| s.default.as_ref())
            .and_then(PortValue::as_color),
    };
    if let Some(color) = color {
        ctx.set(node, &["Color"], PortValue::Color(color));
    }
}

/// Scalar constant
pub(super) fn value(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    let value = match source.property("value") {
        Some(PropertyValue::Float(value)) => Some(*value),
        _ => source
            .outputs
            .first()
            .and_then(|s| s.default.as_ref())
            .and_then(PortValue::as_float),
    };
    if let Some(value) = value {
        ctx.set(node, &["Value"], PortValue::Float(value));
    }
}

/// Fresnel and layer weight
pub(super) fn fresnel(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    let ior = if source.input("Blend").is_some() {
        // Layer weight blend b maps onto IOR (1 + sqrt b) / (1 - sqrt b)
        let blend = ctx.clamped(source, "Blend", 0.0, 0.99).unwrap_or(0.5);
        let root = blend.sqrt();
        Some((1.0 + root) / (1.0 - root))
    } else {
        source.float("IOR")
    };
    if let Some(ior) = ior {
        let ior = ctx.guard(source.id, "IOR", ior, 1.0, 10.0);
        ctx.set(node, &["IOR", "Index"], PortValue::Float(ior));
    }
}

/// Colour attribute
pub(super) fn vertex_color(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    text_param(ctx, source, node, "layer_name", "name");
}

/// Named attribute
pub(super) fn attribute(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    text_param(ctx, source, node, "attribute_name", "name");
}

/// Ambient occlusion onto a dirt texture
pub(super) fn ambient_occlusion(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    if let Some(distance) = ctx.non_negative(source, "Distance") {
        ctx.set(node, &["Radius"], PortValue::Float(distance));
    }
    ctx.copy(source, "Color", node, &["Bright color"]);
    if let Some(inside) = source.property("inside").and_then(PropertyValue::as_bool) {
        ctx.param(node, "inside", PortValue::Bool(inside));
    }
}

/// Blackbody onto a black body emission
pub(super) fn blackbody(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    if let Some(temperature) = ctx.clamped(source, "Temperature", 500.0, 12000.0) {
        ctx.set(node, &["Temperature"], PortValue::Float(temperature));
    }
    ctx.set(node, &["Power"], PortValue::Float(1.0));
    ctx.set(node, &["Normalize"], PortValue::Bool(true));
}

/// Copy every literal default onto a target input of the same name
pub(super) fn generic(ctx: &mut TransferContext<'_>, source: &SourceNode, node: NodeId) {
    let targets = ctx.graph.sockets(node, PortDirection::Input);
    for socket in &source.inputs {
        let Some(value) = socket.default.clone() else { continue };
        let Some(target) = targets.iter().find(|t| t.name.eq_ignore_ascii_case(&socket.name)) else {
            continue;
        };
        let name = target.name.clone();
        ctx.set(node, &[name.as_str()], value);
    }
}

/// Nothing to transfer
pub(super) fn noop(_: &mut TransferContext<'_>, _: &SourceNode, _: NodeId) {}
