// SPDX-License-Identifier: MIT OR Apache-2.0
//! Socket alias table: semantic role to concrete target socket names.
//!
//! Rows for a specific target kind are consulted before the `*` rows.
//! Names are candidates only; the matcher keeps the first one the target
//! node actually exposes.

use super::roles::{SocketRole, SocketRole as R};

const ANY: &str = "*";

/// Alias rows as `(target kind or "*", role, names)`
const ALIASES: &[(&str, SocketRole, &[&str])] = &[
    // Kind-specific spellings
    ("ShaderNodeOctTextureEmission", R::EmissionColor, &["Texture"]),
    ("ShaderNodeOctTextureEmission", R::EmissionStrength, &["Power"]),
    ("ShaderNodeOctDiffuseMat", R::BaseColor, &["Diffuse"]),
    ("ShaderNodeOctDiffuseMat", R::Transmission, &["Transmission"]),
    ("ShaderNodeOctGlossyMat", R::BaseColor, &["Diffuse"]),
    ("ShaderNodeOctGlossyMat", R::SpecularColor, &["Specular"]),
    ("ShaderNodeOctToonMat", R::BaseColor, &["Diffuse"]),
    ("ShaderNodeOctSpecularMat", R::BaseColor, &["Transmission"]),
    ("ShaderNodeOctSpecularMat", R::SpecularColor, &["Reflection"]),
    ("ShaderNodeOctSpecularMat", R::Ior, &["Index"]),
    ("ShaderNodeOctNoiseTex", R::Scale, &["Omega"]),
    ("ShaderNodeOctNoiseTex", R::Detail, &["Octaves"]),
    ("ShaderNodeOctNullMat", R::Alpha, &["Opacity"]),
    ("ShaderNodeOctGradientTex", R::Input, &["Input"]),
    ("ShaderNodeOctRangeTex", R::Input, &["Input"]),
    ("ShaderNodeOctClampTex", R::Input, &["Input"]),
    ("ShaderNodeOctFloatMathTex", R::FirstInput, &["Input1"]),
    ("ShaderNodeOctFloatMathTex", R::SecondInput, &["Input2"]),
    ("ShaderNodeOctChecksTex", R::FirstInput, &["Color1"]),
    ("ShaderNodeOctChecksTex", R::SecondInput, &["Color2"]),
    ("ShaderNodeOctDirtTex", R::Distance, &["Radius"]),
    ("ShaderNodeOctDirtTex", R::AoColor, &["Bright color"]),
    ("ShaderNodeOctBumpTex", R::Distance, &["Strength"]),
    ("ShaderNodeOctScatterMedium", R::ScatterColor, &["Scattering"]),
    ("ShaderNodeOctVolumeMedium", R::ScatterColor, &["Scattering"]),
    // Shared spellings
    (ANY, R::BaseColor, &["Albedo color", "Albedo", "Diffuse"]),
    (ANY, R::SpecularColor, &["Specular color", "Specular", "Reflection"]),
    (ANY, R::ReflectionColor, &["Reflection", "Specular", "Albedo color"]),
    (ANY, R::Metallic, &["Metallic", "Metallic float"]),
    (ANY, R::Roughness, &["Roughness", "Roughness float"]),
    (ANY, R::Specular, &["Specular", "Specular float"]),
    (ANY, R::Ior, &["Dielectric IOR", "Index", "IOR"]),
    (ANY, R::Transmission, &["Transmission", "Transmission float"]),
    (ANY, R::Alpha, &["Opacity", "Opacity float"]),
    (ANY, R::Normal, &["Normal", "Bump", "ShaderNormal"]),
    (ANY, R::CoatWeight, &["Coating", "Coating float"]),
    (ANY, R::CoatRoughness, &["Coating roughness"]),
    (ANY, R::CoatIor, &["Coating IOR"]),
    (ANY, R::CoatNormal, &["Coating normal"]),
    (ANY, R::SheenWeight, &["Sheen"]),
    (ANY, R::SheenRoughness, &["Sheen roughness"]),
    (ANY, R::EmissionColor, &["Emission", "Emission color"]),
    (ANY, R::EmissionStrength, &["Emission power", "Emission weight", "Power"]),
    (ANY, R::SubsurfaceRadius, &["Medium radius", "Absorption"]),
    (ANY, R::SubsurfaceScale, &["Medium scale", "Density"]),
    (ANY, R::Anisotropy, &["Anisotropy"]),
    (ANY, R::AnisotropyRotation, &["Anisotropy rotation", "Rotation"]),
    (ANY, R::FilmThickness, &["Film width"]),
    (ANY, R::FilmIor, &["Film IOR"]),
    (ANY, R::Factor, &["Amount", "Factor"]),
    (ANY, R::FirstShader, &["Material1", "Shader1"]),
    (ANY, R::SecondShader, &["Material2", "Shader2"]),
    (ANY, R::FirstInput, &["Texture1", "Color1", "Input1", "A"]),
    (ANY, R::SecondInput, &["Texture2", "Color2", "Input2", "B"]),
    (ANY, R::Input, &["Texture", "Input"]),
    (ANY, R::Vector, &["Transform", "Projection"]),
    (ANY, R::Scale, &["Scale", "Omega"]),
    (ANY, R::Detail, &["Octaves", "Detail"]),
    (ANY, R::Distortion, &["Distortion"]),
    (ANY, R::Randomness, &["Randomness"]),
    (ANY, R::Location, &["Translation", "Position"]),
    (ANY, R::Rotation, &["Rotation"]),
    (ANY, R::Strength, &["Strength", "Bump strength", "Power"]),
    (ANY, R::MidLevel, &["Mid level"]),
    (ANY, R::DisplacementScale, &["Amount", "Height"]),
    (ANY, R::Distance, &["Radius", "Distance"]),
    (ANY, R::AoColor, &["Bright color", "Color"]),
    (ANY, R::FromMin, &["Input min"]),
    (ANY, R::FromMax, &["Input max"]),
    (ANY, R::ToMin, &["Output min"]),
    (ANY, R::ToMax, &["Output max"]),
    (ANY, R::Minimum, &["Minimum", "Min"]),
    (ANY, R::Maximum, &["Maximum", "Max"]),
    (ANY, R::Hue, &["Hue", "Hue shift"]),
    (ANY, R::Saturation, &["Saturation"]),
    (ANY, R::Brightness, &["Brightness", "Value"]),
    (ANY, R::Contrast, &["Contrast"]),
    (ANY, R::Gamma, &["Gamma"]),
    (ANY, R::Temperature, &["Temperature"]),
    (ANY, R::Density, &["Density", "Density float"]),
    (ANY, R::Phase, &["Phase", "Anisotropy"]),
    (ANY, R::AbsorptionColor, &["Absorption", "Color"]),
    (ANY, R::ScatterColor, &["Scattering", "Color"]),
    (ANY, R::Surface, &["Surface", "Shader", "Material"]),
    (ANY, R::Volume, &["Volume", "Medium"]),
    (ANY, R::Displacement, &["Displacement", "Height"]),
    // Outputs
    (ANY, R::ShaderOut, &["OutMat", "Material out", "Output"]),
    (ANY, R::TextureOut, &["OutTex", "Texture out", "Output"]),
    (ANY, R::AlphaOut, &["Alpha", "OutTex"]),
    (ANY, R::MediumOut, &["OutMedium", "Medium out"]),
    (ANY, R::TransformOut, &["OutTransform", "Transform out"]),
    (ANY, R::ProjectionOut, &["OutProjection", "Projection out"]),
    (ANY, R::EmissionOut, &["OutEmission", "Emission out"]),
];

/// Candidate target socket names for a role on a target kind, kind-specific
/// rows first
pub fn alias_names(target_kind: &str, role: SocketRole) -> Vec<&'static str> {
    let specific = ALIASES
        .iter()
        .filter(|(kind, r, _)| *kind == target_kind && *r == role);
    let shared = ALIASES.iter().filter(|(kind, r, _)| *kind == ANY && *r == role);

    let mut names: Vec<&'static str> = Vec::new();
    for (_, _, row) in specific.chain(shared) {
        for name in row.iter() {
            if !names.contains(name) {
                names.push(name);
            }
        }
    }
    names
}

/// Designated primary input of a target kind, if it has exactly one
pub fn primary_input(target_kind: &str) -> Option<&'static str> {
    let name = match target_kind {
        "ShaderNodeOctUniversalMat" | "ShaderNodeOctMetallicMat" | "ShaderNodeOctHairMat" => {
            "Albedo color"
        }
        "ShaderNodeOctDiffuseMat" | "ShaderNodeOctGlossyMat" | "ShaderNodeOctToonMat" => "Diffuse",
        "ShaderNodeOctSpecularMat" => "Reflection",
        "ShaderNodeOctNullMat" => "Opacity",
        "ShaderNodeOctInvertTex"
        | "ShaderNodeOctColorCorrectionTex"
        | "ShaderNodeOctGammaCorrectionTex"
        | "ShaderNodeOctNormalMapTex"
        | "ShaderNodeOctBumpTex"
        | "ShaderNodeOctDisplacementTex"
        | "ShaderNodeOctTextureEmission" => "Texture",
        "ShaderNodeOctGradientTex" | "ShaderNodeOctRangeTex" | "ShaderNodeOctClampTex" => "Input",
        "ShaderNodeOctFloatMathTex" => "Input1",
        "ShaderNodeOctImageTex"
        | "ShaderNodeOctNoiseTex"
        | "ShaderNodeOctVoronoiTex"
        | "ShaderNodeOctWaveTex"
        | "ShaderNodeOctChecksTex"
        | "ShaderNodeOctMarbleTex" => "Transform",
        "ShaderNodeOctAbsorptionMedium" | "ShaderNodeOctScatterMedium" | "ShaderNodeOctVolumeMedium" => {
            "Absorption"
        }
        "ShaderNodeOutputMaterial" => "Surface",
        _ => return None,
    };
    Some(name)
}

/// Designated primary output names, tried in order
pub fn primary_output(target_kind: &str) -> &'static [&'static str] {
    match target_kind {
        "ShaderNodeOctTextureEmission" | "ShaderNodeOctBlackBodyEmission" => &["OutEmission"],
        "ShaderNodeOct3DTransform" => &["OutTransform"],
        "ShaderNodeOctMeshUVProjection" => &["OutProjection"],
        "ShaderNodeOctDaylightEnv" => &["OutEnv"],
        _ => &["OutMat", "OutTex", "OutMedium", "OutEmission"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_rows_come_first() {
        let names = alias_names("ShaderNodeOctTextureEmission", SocketRole::EmissionColor);
        assert_eq!(names[0], "Texture");
        assert!(names.contains(&"Emission"));

        let names = alias_names("ShaderNodeOctUniversalMat", SocketRole::BaseColor);
        assert_eq!(names, vec!["Albedo color", "Albedo", "Diffuse"]);
    }

    #[test]
    fn test_primary_sockets() {
        assert_eq!(primary_input("ShaderNodeOctInvertTex"), Some("Texture"));
        assert_eq!(primary_input("ShaderNodeOctMixMat"), None);
        assert_eq!(primary_output("ShaderNodeOct3DTransform"), &["OutTransform"]);
    }
}
