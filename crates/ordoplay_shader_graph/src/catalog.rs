// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node catalog of the target render engine.
//!
//! Type IDs follow the engine's own identifiers so candidate lists can name
//! them directly. Only one identifier per kind is registered; legacy aliases
//! are left out on purpose, which mirrors an installed engine that exposes a
//! single spelling.

use crate::node::{NodeCategory, NodeRegistry, NodeType};
use crate::port::{Port, PortType, PortValue};

/// Main material output of a universal/diffuse/glossy material
pub const MATERIAL_OUT: &str = "OutMat";
/// Main output of texture nodes
pub const TEXTURE_OUT: &str = "OutTex";
/// Main output of emission distributions
pub const EMISSION_OUT: &str = "OutEmission";
/// Main output of media
pub const MEDIUM_OUT: &str = "OutMedium";

fn float(name: &str, value: f32) -> Port {
    Port::input(name, PortType::Float).with_default(PortValue::Float(value))
}

fn color(name: &str, rgb: [f32; 3]) -> Port {
    Port::input(name, PortType::Color).with_default(PortValue::Color([rgb[0], rgb[1], rgb[2], 1.0]))
}

fn vector(name: &str, value: [f32; 3]) -> Port {
    Port::input(name, PortType::Vector).with_default(PortValue::Vector(value))
}

fn texture(name: &str) -> Port {
    Port::input(name, PortType::Texture)
}

fn node_type(
    id: &str,
    name: &str,
    category: NodeCategory,
    description: &str,
    inputs: Vec<Port>,
    outputs: Vec<Port>,
) -> NodeType {
    NodeType {
        id: id.to_string(),
        name: name.to_string(),
        category,
        description: description.to_string(),
        inputs,
        outputs,
    }
}

fn texture_node(id: &str, name: &str, description: &str, inputs: Vec<Port>) -> NodeType {
    node_type(
        id,
        name,
        NodeCategory::Texture,
        description,
        inputs,
        vec![Port::output(TEXTURE_OUT, PortType::Texture)],
    )
}

fn material_node(id: &str, name: &str, description: &str, inputs: Vec<Port>) -> NodeType {
    node_type(
        id,
        name,
        NodeCategory::Material,
        description,
        inputs,
        vec![Port::output(MATERIAL_OUT, PortType::Shader)],
    )
}

fn medium_node(id: &str, name: &str, inputs: Vec<Port>) -> NodeType {
    node_type(
        id,
        name,
        NodeCategory::Medium,
        "Volume medium",
        inputs,
        vec![Port::output(MEDIUM_OUT, PortType::Medium)],
    )
}

fn surface_extras() -> Vec<Port> {
    vec![
        float("Opacity", 1.0),
        vector("Normal", [0.0, 0.0, 0.0]),
        texture("Bump"),
        texture("Displacement"),
    ]
}

/// Create the registry of target node kinds available to conversions
pub fn create_target_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    // ========================================================================
    // Output
    // ========================================================================

    registry.register(node_type(
        "ShaderNodeOutputMaterial",
        "Material Output",
        NodeCategory::Output,
        "Final material output",
        vec![
            Port::input("Surface", PortType::Shader),
            Port::input("Volume", PortType::Medium),
            texture("Displacement"),
        ],
        vec![],
    ));

    // ========================================================================
    // Materials
    // ========================================================================

    let mut universal = vec![
        color("Albedo color", [0.7, 0.7, 0.7]),
        float("Metallic", 0.0),
        float("Specular", 1.0),
        color("Specular color", [1.0, 1.0, 1.0]),
        float("Roughness", 0.063),
        float("Anisotropy", 0.0),
        float("Anisotropy rotation", 0.0),
        float("Dielectric IOR", 1.5),
        float("Transmission", 0.0),
        color("Transmission color", [0.0, 0.0, 0.0]),
        float("Coating", 0.0),
        float("Coating roughness", 0.0),
        float("Coating IOR", 1.5),
        vector("Coating normal", [0.0, 0.0, 0.0]),
        float("Sheen", 0.0),
        float("Sheen roughness", 0.2),
        float("Film width", 0.0),
        float("Film IOR", 1.45),
        float("Medium radius", 1.0),
        float("Medium scale", 1.0),
    ];
    universal.extend(surface_extras());
    universal.push(Port::input("Emission", PortType::Emission));
    universal.push(Port::input("Medium", PortType::Medium));
    registry.register(material_node(
        "ShaderNodeOctUniversalMat",
        "Universal Material",
        "Layered physically based material",
        universal,
    ));

    let mut specular = vec![
        color("Reflection", [1.0, 1.0, 1.0]),
        color("Transmission", [1.0, 1.0, 1.0]),
        float("Roughness", 0.0),
        float("Index", 1.45),
    ];
    specular.extend(surface_extras());
    specular.push(Port::input("Medium", PortType::Medium));
    registry.register(material_node(
        "ShaderNodeOctSpecularMat",
        "Specular Material",
        "Refractive material for glass and liquids",
        specular,
    ));

    let mut glossy = vec![
        color("Diffuse", [0.7, 0.7, 0.7]),
        color("Specular", [1.0, 1.0, 1.0]),
        float("Roughness", 0.063),
        float("Index", 1.3),
    ];
    glossy.extend(surface_extras());
    registry.register(material_node(
        "ShaderNodeOctGlossyMat",
        "Glossy Material",
        "Diffuse base with a specular coat",
        glossy,
    ));

    let mut diffuse = vec![
        color("Diffuse", [0.7, 0.7, 0.7]),
        float("Roughness", 0.0),
        color("Transmission", [0.0, 0.0, 0.0]),
    ];
    diffuse.extend(surface_extras());
    diffuse.push(Port::input("Emission", PortType::Emission));
    diffuse.push(Port::input("Medium", PortType::Medium));
    registry.register(material_node(
        "ShaderNodeOctDiffuseMat",
        "Diffuse Material",
        "Lambertian material, also used for emitters",
        diffuse,
    ));

    registry.register(material_node(
        "ShaderNodeOctNullMat",
        "Null Material",
        "Invisible material that only carries a medium",
        vec![float("Opacity", 1.0), Port::input("Medium", PortType::Medium)],
    ));

    registry.register(material_node(
        "ShaderNodeOctMixMat",
        "Mix Material",
        "Blend of two materials; Amount weights the first",
        vec![
            float("Amount", 0.5),
            Port::input("Material1", PortType::Shader),
            Port::input("Material2", PortType::Shader),
        ],
    ));

    let mut metallic = vec![
        color("Albedo color", [0.7, 0.7, 0.7]),
        color("Specular", [1.0, 1.0, 1.0]),
        float("Roughness", 0.063),
        float("Anisotropy", 0.0),
        float("Anisotropy rotation", 0.0),
    ];
    metallic.extend(surface_extras());
    registry.register(material_node(
        "ShaderNodeOctMetallicMat",
        "Metallic Material",
        "Conductor material",
        metallic,
    ));

    let mut toon = vec![
        color("Diffuse", [0.7, 0.7, 0.7]),
        color("Specular", [1.0, 1.0, 1.0]),
        float("Roughness", 0.063),
    ];
    toon.extend(surface_extras());
    registry.register(material_node(
        "ShaderNodeOctToonMat",
        "Toon Material",
        "Cel shaded material",
        toon,
    ));

    registry.register(material_node(
        "ShaderNodeOctHairMat",
        "Hair Material",
        "Fibre scattering material",
        vec![
            color("Albedo color", [0.7, 0.5, 0.3]),
            float("Roughness", 0.2),
            float("Index", 1.55),
            float("Opacity", 1.0),
        ],
    ));

    // ========================================================================
    // Procedural and image textures
    // ========================================================================

    registry.register(texture_node(
        "ShaderNodeOctImageTex",
        "Image Texture",
        "Bitmap lookup",
        vec![
            float("Power", 1.0),
            float("Gamma", 2.2),
            Port::input("Invert", PortType::Bool).with_default(PortValue::Bool(false)),
            Port::input("Transform", PortType::Transform),
            Port::input("Projection", PortType::Projection),
        ],
    ));

    let coordinates = || {
        vec![
            Port::input("Transform", PortType::Transform),
            Port::input("Projection", PortType::Projection),
        ]
    };

    let mut noise = vec![
        float("Omega", 0.7),
        float("Octaves", 5.0),
        float("Lacunarity", 2.0),
        float("Distortion", 0.0),
    ];
    noise.extend(coordinates());
    registry.register(texture_node("ShaderNodeOctNoiseTex", "Noise Texture", "Fractal noise", noise));

    let mut voronoi = vec![float("Scale", 5.0), float("Randomness", 1.0)];
    voronoi.extend(coordinates());
    registry.register(texture_node("ShaderNodeOctVoronoiTex", "Voronoi Texture", "Cellular noise", voronoi));

    let mut wave = vec![float("Scale", 5.0)];
    wave.extend(coordinates());
    registry.register(texture_node("ShaderNodeOctWaveTex", "Wave Texture", "Banded pattern", wave));

    let mut checks = vec![
        color("Color1", [1.0, 1.0, 1.0]),
        color("Color2", [0.0, 0.0, 0.0]),
        float("Scale", 5.0),
    ];
    checks.extend(coordinates());
    registry.register(texture_node("ShaderNodeOctChecksTex", "Checks Texture", "Checkerboard", checks));

    let mut marble = vec![
        float("Power", 1.0),
        float("Offset", 0.0),
        float("Octaves", 5.0),
        float("Omega", 0.7),
        float("Variance", 0.5),
    ];
    marble.extend(coordinates());
    registry.register(texture_node("ShaderNodeOctMarbleTex", "Marble Texture", "Veined pattern", marble));

    registry.register(texture_node(
        "ShaderNodeOctGradientTex",
        "Gradient Map",
        "Maps a scalar input onto a colour gradient",
        vec![
            texture("Input"),
            color("Start color", [0.0, 0.0, 0.0]),
            color("End color", [1.0, 1.0, 1.0]),
        ],
    ));

    // ========================================================================
    // Texture math
    // ========================================================================

    registry.register(texture_node(
        "ShaderNodeOctMixTex",
        "Mix Texture",
        "Linear blend of two textures",
        vec![float("Amount", 0.5), texture("Texture1"), texture("Texture2")],
    ));
    for (id, name) in [
        ("ShaderNodeOctMultiplyTex", "Multiply Texture"),
        ("ShaderNodeOctAddTex", "Add Texture"),
        ("ShaderNodeOctSubtractTex", "Subtract Texture"),
    ] {
        registry.register(texture_node(
            id,
            name,
            "Binary texture arithmetic",
            vec![texture("Texture1"), texture("Texture2")],
        ));
    }
    registry.register(texture_node(
        "ShaderNodeOctInvertTex",
        "Invert Texture",
        "One minus the input",
        vec![texture("Texture")],
    ));
    registry.register(texture_node(
        "ShaderNodeOctColorCorrectionTex",
        "Color Correction",
        "Brightness, hue, saturation, gamma and contrast adjustment",
        vec![
            texture("Texture"),
            float("Brightness", 1.0),
            float("Hue", 0.0),
            float("Saturation", 1.0),
            float("Gamma", 1.0),
            float("Contrast", 0.0),
        ],
    ));
    registry.register(texture_node(
        "ShaderNodeOctGammaCorrectionTex",
        "Gamma Correction",
        "Power curve on the input",
        vec![texture("Texture"), float("Gamma", 1.0)],
    ));
    registry.register(texture_node(
        "ShaderNodeOctFloatMathTex",
        "Float Math",
        "Scalar operation selected by the operation parameter",
        vec![float("Input1", 0.0), float("Input2", 0.0)],
    ));
    registry.register(texture_node(
        "ShaderNodeOctRangeTex",
        "Range",
        "Remaps an input range onto an output range",
        vec![
            float("Input", 0.0),
            float("Input min", 0.0),
            float("Input max", 1.0),
            float("Output min", 0.0),
            float("Output max", 1.0),
        ],
    ));
    registry.register(texture_node(
        "ShaderNodeOctClampTex",
        "Clamp Texture",
        "Clamps the input to a range",
        vec![float("Input", 0.0), float("Minimum", 0.0), float("Maximum", 1.0)],
    ));

    // ========================================================================
    // Constants and attributes
    // ========================================================================

    registry.register(texture_node(
        "ShaderNodeOctRGBColorTex",
        "RGB Color",
        "Constant colour",
        vec![color("Color", [1.0, 1.0, 1.0])],
    ));
    registry.register(texture_node(
        "ShaderNodeOctFloatTex",
        "Float Value",
        "Constant scalar",
        vec![float("Value", 0.0)],
    ));
    registry.register(texture_node(
        "ShaderNodeOctFresnelTex",
        "Fresnel",
        "View dependent falloff",
        vec![float("IOR", 1.5)],
    ));
    registry.register(texture_node("ShaderNodeOctVertexColorTex", "Color Vertex Attribute", "Mesh colour layer", vec![]));
    registry.register(texture_node("ShaderNodeOctAttributeTex", "Attribute", "Named geometry attribute", vec![]));
    registry.register(texture_node(
        "ShaderNodeOctDirtTex",
        "Dirt Texture",
        "Ambient occlusion style cavity mask",
        vec![
            float("Radius", 1.0),
            color("Bright color", [1.0, 1.0, 1.0]),
            color("Dark color", [0.0, 0.0, 0.0]),
        ],
    ));
    registry.register(texture_node("ShaderNodeOctInstanceColorTex", "Instance Color", "Per-instance colour", vec![]));
    registry.register(texture_node("ShaderNodeOctHairDataTex", "Hair Data", "Strand parameters", vec![]));
    registry.register(texture_node("ShaderNodeOctFalloffTex", "Falloff Texture", "Angular falloff", vec![]));
    registry.register(texture_node("ShaderNodeOctWireframeTex", "Wireframe", "Polygon edge mask", vec![]));
    registry.register(texture_node(
        "ShaderNodeOctBevelTex",
        "Round Edges",
        "Rounded edge normal",
        vec![float("Radius", 0.05)],
    ));

    // ========================================================================
    // Surface detail
    // ========================================================================

    registry.register(texture_node(
        "ShaderNodeOctNormalMapTex",
        "Normal Map",
        "Tangent space normal map",
        vec![texture("Texture"), float("Strength", 1.0)],
    ));
    registry.register(texture_node(
        "ShaderNodeOctBumpTex",
        "Bump Texture",
        "Height driven normal perturbation",
        vec![
            texture("Texture"),
            float("Strength", 1.0),
            float("Mid level", 0.5),
            vector("Normal", [0.0, 0.0, 0.0]),
        ],
    ));
    registry.register(texture_node(
        "ShaderNodeOctDisplacementTex",
        "Displacement",
        "Geometric displacement",
        vec![texture("Texture"), float("Amount", 1.0), float("Mid level", 0.5)],
    ));

    // ========================================================================
    // Coordinates
    // ========================================================================

    registry.register(node_type(
        "ShaderNodeOct3DTransform",
        "3D Transform",
        NodeCategory::Coordinates,
        "Translation, rotation and scale",
        vec![
            vector("Rotation", [0.0, 0.0, 0.0]),
            vector("Scale", [1.0, 1.0, 1.0]),
            vector("Translation", [0.0, 0.0, 0.0]),
        ],
        vec![Port::output("OutTransform", PortType::Transform)],
    ));
    registry.register(node_type(
        "ShaderNodeOctMeshUVProjection",
        "Mesh UV Projection",
        NodeCategory::Coordinates,
        "Projection through a mesh UV set",
        vec![],
        vec![Port::output("OutProjection", PortType::Projection)],
    ));

    // ========================================================================
    // Emission and environment
    // ========================================================================

    registry.register(node_type(
        "ShaderNodeOctTextureEmission",
        "Texture Emission",
        NodeCategory::Emission,
        "Emission driven by a texture",
        vec![texture("Texture"), float("Power", 1.0)],
        vec![Port::output(EMISSION_OUT, PortType::Emission)],
    ));
    registry.register(node_type(
        "ShaderNodeOctBlackBodyEmission",
        "Black Body Emission",
        NodeCategory::Emission,
        "Emission following a black body spectrum",
        vec![
            float("Temperature", 6500.0),
            float("Power", 1.0),
            Port::input("Normalize", PortType::Bool).with_default(PortValue::Bool(true)),
        ],
        vec![Port::output(EMISSION_OUT, PortType::Emission)],
    ));
    registry.register(node_type(
        "ShaderNodeOctDaylightEnv",
        "Daylight Environment",
        NodeCategory::Environment,
        "Analytic sky",
        vec![
            vector("Sun direction", [0.0, 0.0, 1.0]),
            float("Turbidity", 2.2),
            float("Power", 1.0),
        ],
        vec![Port::output("OutEnv", PortType::Texture)],
    ));

    // ========================================================================
    // Media
    // ========================================================================

    registry.register(medium_node(
        "ShaderNodeOctAbsorptionMedium",
        "Absorption Medium",
        vec![color("Absorption", [0.8, 0.8, 0.8]), float("Density", 1.0)],
    ));
    registry.register(medium_node(
        "ShaderNodeOctScatterMedium",
        "Scattering Medium",
        vec![
            color("Absorption", [0.0, 0.0, 0.0]),
            color("Scattering", [0.8, 0.8, 0.8]),
            float("Phase", 0.0),
            float("Density", 1.0),
        ],
    ));
    registry.register(medium_node(
        "ShaderNodeOctVolumeMedium",
        "Volume Medium",
        vec![
            color("Absorption", [0.8, 0.8, 0.8]),
            color("Scattering", [0.0, 0.0, 0.0]),
            float("Phase", 0.0),
            float("Density", 1.0),
            Port::input("Emission", PortType::Emission),
        ],
    ));

    registry
}
