// SPDX-License-Identifier: MIT OR Apache-2.0
//! Semantic roles of source sockets.

use crate::kind::SourceKind;

/// What a socket means, independent of how either engine spells it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum SocketRole {
    // Surface inputs
    BaseColor,
    SpecularColor,
    ReflectionColor,
    Metallic,
    Roughness,
    Specular,
    Ior,
    Transmission,
    Alpha,
    Normal,
    CoatWeight,
    CoatRoughness,
    CoatIor,
    CoatNormal,
    SheenWeight,
    SheenRoughness,
    EmissionColor,
    EmissionStrength,
    SubsurfaceRadius,
    SubsurfaceScale,
    Anisotropy,
    AnisotropyRotation,
    FilmThickness,
    FilmIor,
    // Mixing
    Factor,
    FirstShader,
    SecondShader,
    FirstInput,
    SecondInput,
    Input,
    // Textures and coordinates
    Vector,
    Scale,
    Detail,
    Distortion,
    Randomness,
    Location,
    Rotation,
    // Surface detail
    Strength,
    MidLevel,
    DisplacementScale,
    Distance,
    AoColor,
    // Range
    FromMin,
    FromMax,
    ToMin,
    ToMax,
    Minimum,
    Maximum,
    // Colour adjustment
    Hue,
    Saturation,
    Brightness,
    Contrast,
    Gamma,
    Temperature,
    // Volume
    Density,
    Phase,
    AbsorptionColor,
    ScatterColor,
    // Output node
    Surface,
    Volume,
    Displacement,
    // Outputs
    ShaderOut,
    TextureOut,
    AlphaOut,
    MediumOut,
    TransformOut,
    ProjectionOut,
    EmissionOut,
}

/// Role of an input socket, addressed by identifier
pub fn input_role(kind: &SourceKind, key: &str) -> Option<SocketRole> {
    use SocketRole as R;
    use SourceKind as K;

    // Kind-specific meanings first
    let specific = match (kind, key) {
        (K::Glossy, "Color") | (K::Specular, "Specular") => Some(R::SpecularColor),
        (K::Metallic, "Edge Tint") | (K::Principled, "Specular Tint") => Some(R::SpecularColor),
        (K::Glass | K::Refraction, "Color") => Some(R::ReflectionColor),
        (K::Emission | K::Background, "Color") => Some(R::EmissionColor),
        (K::Emission | K::Background, "Strength") => Some(R::EmissionStrength),
        (K::VolumeAbsorption | K::PrincipledVolume, "Color") => Some(R::AbsorptionColor),
        (K::VolumeScatter, "Color") => Some(R::ScatterColor),
        (K::VolumeScatter | K::PrincipledVolume, "Anisotropy") => Some(R::Phase),
        (K::AmbientOcclusion, "Color") => Some(R::AoColor),
        (K::Displacement | K::VectorDisplacement, "Scale") => Some(R::DisplacementScale),
        (K::Displacement | K::VectorDisplacement, "Height" | "Vector") => Some(R::Input),
        (K::Bump, "Height") | (K::NormalMap, "Color") => Some(R::Input),
        (K::Bump, "Distance") => Some(R::MidLevel),
        (K::MixShader | K::AddShader, "Shader") => Some(R::FirstShader),
        (K::MixShader | K::AddShader, "Shader_001") => Some(R::SecondShader),
        (K::MixRgb, "Color1") | (K::Mix, "A" | "A_Color" | "A_Float" | "A_Vector") => {
            Some(R::FirstInput)
        }
        (K::MixRgb, "Color2") | (K::Mix, "B" | "B_Color" | "B_Float" | "B_Vector") => {
            Some(R::SecondInput)
        }
        (K::Math, "Value") | (K::VectorMath, "Vector") => Some(R::FirstInput),
        (K::Math, "Value_001") | (K::VectorMath, "Vector_001" | "Scale") => Some(R::SecondInput),
        (K::MapRange | K::Clamp, "Value") | (K::ColorRamp, "Fac") => Some(R::Input),
        (K::HueSaturation, "Value") => Some(R::Brightness),
        (K::BrightContrast, "Bright") => Some(R::Brightness),
        (K::CheckerTexture, "Color1") => Some(R::FirstInput),
        (K::CheckerTexture, "Color2") => Some(R::SecondInput),
        (K::Mapping, "Vector") => Some(R::Input),
        (K::LayerWeight, "Blend") => Some(R::Ior),
        (
            K::Invert | K::HueSaturation | K::BrightContrast | K::Gamma | K::RgbCurves | K::RgbToBw,
            "Color",
        ) => Some(R::Input),
        (K::MaterialOutput, "Surface") => Some(R::Surface),
        (K::MaterialOutput, "Volume") => Some(R::Volume),
        (K::MaterialOutput, "Displacement") => Some(R::Displacement),
        _ => None,
    };
    if specific.is_some() {
        return specific;
    }

    // Spellings shared by many kinds
    let role = match key {
        "Base Color" | "Color" => R::BaseColor,
        "Metallic" => R::Metallic,
        "Roughness" | "Diffuse Roughness" => R::Roughness,
        "Specular IOR Level" | "Specular" => R::Specular,
        "IOR" => R::Ior,
        "Transmission Weight" | "Transmission" => R::Transmission,
        "Alpha" => R::Alpha,
        "Normal" => R::Normal,
        "Coat Weight" => R::CoatWeight,
        "Coat Roughness" => R::CoatRoughness,
        "Coat IOR" => R::CoatIor,
        "Coat Normal" => R::CoatNormal,
        "Sheen Weight" => R::SheenWeight,
        "Sheen Roughness" => R::SheenRoughness,
        "Emission Color" | "Emission" => R::EmissionColor,
        "Emission Strength" => R::EmissionStrength,
        "Subsurface Radius" | "Radius" => R::SubsurfaceRadius,
        "Subsurface Scale" => R::SubsurfaceScale,
        "Anisotropic" | "Anisotropy" => R::Anisotropy,
        "Anisotropic Rotation" | "Rotation" if !matches!(kind, K::Mapping) => R::AnisotropyRotation,
        "Rotation" => R::Rotation,
        "Thin Film Thickness" => R::FilmThickness,
        "Thin Film IOR" => R::FilmIor,
        "Fac" | "Factor" | "Factor_Float" | "Factor_Vector" => R::Factor,
        "Vector" => R::Vector,
        "Scale" => R::Scale,
        "Detail" => R::Detail,
        "Distortion" => R::Distortion,
        "Randomness" => R::Randomness,
        "Location" => R::Location,
        "Strength" => R::Strength,
        "Midlevel" => R::MidLevel,
        "Distance" => R::Distance,
        "From Min" => R::FromMin,
        "From Max" => R::FromMax,
        "To Min" => R::ToMin,
        "To Max" => R::ToMax,
        "Min" => R::Minimum,
        "Max" => R::Maximum,
        "Hue" => R::Hue,
        "Saturation" => R::Saturation,
        "Contrast" => R::Contrast,
        "Gamma" => R::Gamma,
        "Temperature" => R::Temperature,
        "Density" => R::Density,
        _ => return None,
    };
    Some(role)
}

/// Role of an output socket, addressed by identifier
pub fn output_role(kind: &SourceKind, key: &str) -> SocketRole {
    use SocketRole as R;
    use SourceKind as K;
    match kind {
        K::Principled
        | K::Glass
        | K::Glossy
        | K::Diffuse
        | K::Emission
        | K::Transparent
        | K::Translucent
        | K::Refraction
        | K::MixShader
        | K::AddShader
        | K::Metallic
        | K::Sheen
        | K::Toon
        | K::Hair
        | K::PrincipledHair
        | K::RayPortal
        | K::Subsurface
        | K::Background
        | K::Holdout
        | K::Specular => R::ShaderOut,
        K::VolumeAbsorption | K::VolumeScatter | K::PrincipledVolume => R::MediumOut,
        K::Mapping | K::VectorRotate | K::VectorTransform => R::TransformOut,
        K::TexCoord | K::UvMap => R::ProjectionOut,
        K::Blackbody => R::EmissionOut,
        K::ImageTexture if key == "Alpha" => R::AlphaOut,
        _ => R::TextureOut,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_shader_slots_by_identifier() {
        assert_eq!(input_role(&SourceKind::MixShader, "Shader"), Some(SocketRole::FirstShader));
        assert_eq!(
            input_role(&SourceKind::MixShader, "Shader_001"),
            Some(SocketRole::SecondShader)
        );
        assert_eq!(input_role(&SourceKind::MixShader, "Fac"), Some(SocketRole::Factor));
    }

    #[test]
    fn test_color_meaning_depends_on_kind() {
        assert_eq!(input_role(&SourceKind::Diffuse, "Color"), Some(SocketRole::BaseColor));
        assert_eq!(input_role(&SourceKind::Glossy, "Color"), Some(SocketRole::SpecularColor));
        assert_eq!(input_role(&SourceKind::Glass, "Color"), Some(SocketRole::ReflectionColor));
        assert_eq!(input_role(&SourceKind::Emission, "Color"), Some(SocketRole::EmissionColor));
        assert_eq!(input_role(&SourceKind::Mapping, "Rotation"), Some(SocketRole::Rotation));
    }

    #[test]
    fn test_output_roles() {
        assert_eq!(output_role(&SourceKind::ImageTexture, "Alpha"), SocketRole::AlphaOut);
        assert_eq!(output_role(&SourceKind::ImageTexture, "Color"), SocketRole::TextureOut);
        assert_eq!(output_role(&SourceKind::VolumeScatter, "Volume"), SocketRole::MediumOut);
    }
}
