// SPDX-License-Identifier: MIT OR Apache-2.0
//! Closed vocabulary of source node kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! source_kinds {
    ($($(#[$doc:meta])* $variant:ident => $tag:literal,)*) => {
        /// Kind of a source node, keyed by the source engine's type tag
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum SourceKind {
            $($(#[$doc])* $variant,)*
            /// Tag with no registered kind; kept verbatim
            Opaque(String),
        }

        impl SourceKind {
            /// Parse a type tag. Unknown tags become [`SourceKind::Opaque`].
            pub fn from_tag(tag: &str) -> Self {
                match tag {
                    $($tag => Self::$variant,)*
                    other => Self::Opaque(other.to_string()),
                }
            }

            /// The source engine's type tag
            pub fn tag(&self) -> &str {
                match self {
                    $(Self::$variant => $tag,)*
                    Self::Opaque(tag) => tag,
                }
            }
        }
    };
}

source_kinds! {
    // Shaders
    /// Principled BSDF
    Principled => "ShaderNodeBsdfPrincipled",
    /// Glass BSDF
    Glass => "ShaderNodeBsdfGlass",
    /// Glossy BSDF
    Glossy => "ShaderNodeBsdfGlossy",
    /// Diffuse BSDF
    Diffuse => "ShaderNodeBsdfDiffuse",
    /// Emission shader
    Emission => "ShaderNodeEmission",
    /// Transparent BSDF
    Transparent => "ShaderNodeBsdfTransparent",
    /// Translucent BSDF
    Translucent => "ShaderNodeBsdfTranslucent",
    /// Refraction BSDF
    Refraction => "ShaderNodeBsdfRefraction",
    /// Mix Shader
    MixShader => "ShaderNodeMixShader",
    /// Add Shader
    AddShader => "ShaderNodeAddShader",
    /// Metallic BSDF
    Metallic => "ShaderNodeBsdfMetallic",
    /// Sheen BSDF
    Sheen => "ShaderNodeBsdfSheen",
    /// Toon BSDF
    Toon => "ShaderNodeBsdfToon",
    /// Hair BSDF
    Hair => "ShaderNodeBsdfHair",
    /// Principled Hair BSDF
    PrincipledHair => "ShaderNodeBsdfHairPrincipled",
    /// Ray Portal BSDF
    RayPortal => "ShaderNodeBsdfRayPortal",
    /// Subsurface Scattering
    Subsurface => "ShaderNodeSubsurfaceScattering",
    /// World background
    Background => "ShaderNodeBackground",
    /// Holdout
    Holdout => "ShaderNodeHoldout",
    /// Specular BSDF
    Specular => "ShaderNodeEeveeSpecular",

    // Textures
    /// Image texture
    ImageTexture => "ShaderNodeTexImage",
    /// Noise texture
    NoiseTexture => "ShaderNodeTexNoise",
    /// Voronoi texture
    VoronoiTexture => "ShaderNodeTexVoronoi",
    /// Wave texture
    WaveTexture => "ShaderNodeTexWave",
    /// Musgrave texture
    MusgraveTexture => "ShaderNodeTexMusgrave",
    /// Checker texture
    CheckerTexture => "ShaderNodeTexChecker",
    /// Brick texture
    BrickTexture => "ShaderNodeTexBrick",
    /// Gradient texture
    GradientTexture => "ShaderNodeTexGradient",
    /// Environment texture
    EnvironmentTexture => "ShaderNodeTexEnvironment",
    /// Magic texture
    MagicTexture => "ShaderNodeTexMagic",
    /// Sky texture
    SkyTexture => "ShaderNodeTexSky",
    /// White noise texture
    WhiteNoiseTexture => "ShaderNodeTexWhiteNoise",
    /// Gabor texture
    GaborTexture => "ShaderNodeTexGabor",

    // Colour
    /// Color Ramp
    ColorRamp => "ShaderNodeValToRGB",
    /// Legacy Mix RGB
    MixRgb => "ShaderNodeMixRGB",
    /// Mix
    Mix => "ShaderNodeMix",
    /// Invert
    Invert => "ShaderNodeInvert",
    /// Hue/Saturation/Value
    HueSaturation => "ShaderNodeHueSaturation",
    /// Bright/Contrast
    BrightContrast => "ShaderNodeBrightContrast",
    /// Gamma
    Gamma => "ShaderNodeGamma",
    /// RGB Curves
    RgbCurves => "ShaderNodeRGBCurves",
    /// RGB to BW
    RgbToBw => "ShaderNodeRGBToBW",
    /// Blackbody
    Blackbody => "ShaderNodeBlackbody",
    /// Wavelength
    Wavelength => "ShaderNodeWavelength",
    /// Shader to RGB
    ShaderToRgb => "ShaderNodeShaderToRGB",

    // Math
    /// Math
    Math => "ShaderNodeMath",
    /// Vector Math
    VectorMath => "ShaderNodeVectorMath",
    /// Map Range
    MapRange => "ShaderNodeMapRange",
    /// Clamp
    Clamp => "ShaderNodeClamp",

    // Vector and input
    /// Mapping
    Mapping => "ShaderNodeMapping",
    /// Texture Coordinate
    TexCoord => "ShaderNodeTexCoord",
    /// UV Map
    UvMap => "ShaderNodeUVMap",
    /// Normal Map
    NormalMap => "ShaderNodeNormalMap",
    /// Bump
    Bump => "ShaderNodeBump",
    /// Displacement
    Displacement => "ShaderNodeDisplacement",
    /// Vector Displacement
    VectorDisplacement => "ShaderNodeVectorDisplacement",
    /// Vector Rotate
    VectorRotate => "ShaderNodeVectorRotate",
    /// Vector Transform
    VectorTransform => "ShaderNodeVectorTransform",
    /// RGB constant
    Rgb => "ShaderNodeRGB",
    /// Value constant
    Value => "ShaderNodeValue",
    /// Fresnel
    Fresnel => "ShaderNodeFresnel",
    /// Layer Weight
    LayerWeight => "ShaderNodeLayerWeight",
    /// Vertex colour
    VertexColor => "ShaderNodeVertexColor",
    /// Attribute
    Attribute => "ShaderNodeAttribute",
    /// Ambient Occlusion
    AmbientOcclusion => "ShaderNodeAmbientOcclusion",
    /// Normal
    Normal => "ShaderNodeNormal",
    /// Tangent
    Tangent => "ShaderNodeTangent",
    /// Object Info
    ObjectInfo => "ShaderNodeObjectInfo",
    /// Camera Data
    CameraData => "ShaderNodeCameraData",
    /// Particle Info
    ParticleInfo => "ShaderNodeParticleInfo",
    /// Hair Info
    HairInfo => "ShaderNodeHairInfo",
    /// Light Falloff
    LightFalloff => "ShaderNodeLightFalloff",
    /// Wireframe
    Wireframe => "ShaderNodeWireframe",
    /// Bevel
    Bevel => "ShaderNodeBevel",

    // Volume
    /// Volume Absorption
    VolumeAbsorption => "ShaderNodeVolumeAbsorption",
    /// Volume Scatter
    VolumeScatter => "ShaderNodeVolumeScatter",
    /// Principled Volume
    PrincipledVolume => "ShaderNodeVolumePrincipled",
    /// Volume Info
    VolumeInfo => "ShaderNodeVolumeInfo",

    // Structure
    /// Material Output
    MaterialOutput => "ShaderNodeOutputMaterial",
    /// Reroute
    Reroute => "NodeReroute",
    /// Frame
    Frame => "NodeFrame",
    /// Node group instance
    Group => "ShaderNodeGroup",
    /// Group input
    GroupInput => "NodeGroupInput",
    /// Group output
    GroupOutput => "NodeGroupOutput",

    // Channels
    /// Separate Color
    SeparateColor => "ShaderNodeSeparateColor",
    /// Separate RGB
    SeparateRgb => "ShaderNodeSeparateRGB",
    /// Separate XYZ
    SeparateXyz => "ShaderNodeSeparateXYZ",
    /// Combine Color
    CombineColor => "ShaderNodeCombineColor",
    /// Combine RGB
    CombineRgb => "ShaderNodeCombineRGB",
    /// Combine XYZ
    CombineXyz => "ShaderNodeCombineXYZ",

    // Info
    /// Geometry
    Geometry => "ShaderNodeNewGeometry",
    /// Light Path
    LightPath => "ShaderNodeLightPath",
}

/// Groups of kinds that may be elided during snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassthroughFamily {
    /// Reroutes, frames and group plumbing
    Routing,
    /// Channel split/combine
    Channels,
    /// Colour adjustment
    ColorAdjust,
    /// Math
    Math,
    /// Range remapping and clamping
    Range,
    /// Geometry and light path info
    GeometryInfo,
}

impl SourceKind {
    /// Passthrough family of this kind, if it can be elided
    pub fn passthrough_family(&self) -> Option<PassthroughFamily> {
        use SourceKind::*;
        match self {
            Reroute | Frame | Group | GroupInput | GroupOutput => Some(PassthroughFamily::Routing),
            SeparateColor | SeparateRgb | SeparateXyz | CombineColor | CombineRgb | CombineXyz => {
                Some(PassthroughFamily::Channels)
            }
            HueSaturation | BrightContrast | Gamma | RgbCurves | RgbToBw => {
                Some(PassthroughFamily::ColorAdjust)
            }
            Math | VectorMath => Some(PassthroughFamily::Math),
            MapRange | Clamp => Some(PassthroughFamily::Range),
            Geometry | LightPath => Some(PassthroughFamily::GeometryInfo),
            _ => None,
        }
    }

    /// Whether the tag was not recognised
    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque(_))
    }

    /// Whether this kind produces a volume closure
    pub fn is_volume(&self) -> bool {
        matches!(
            self,
            Self::VolumeAbsorption | Self::VolumeScatter | Self::PrincipledVolume
        )
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for kind in [SourceKind::Principled, SourceKind::MixShader, SourceKind::Reroute] {
            assert_eq!(SourceKind::from_tag(kind.tag()), kind);
        }
    }

    #[test]
    fn test_unknown_tag_is_opaque() {
        let kind = SourceKind::from_tag("ShaderNodeCustomThing");
        assert!(kind.is_opaque());
        assert_eq!(kind.tag(), "ShaderNodeCustomThing");
        assert_eq!(kind.passthrough_family(), None);
    }

    #[test]
    fn test_families() {
        assert_eq!(SourceKind::Math.passthrough_family(), Some(PassthroughFamily::Math));
        assert_eq!(
            SourceKind::SeparateColor.passthrough_family(),
            Some(PassthroughFamily::Channels)
        );
        assert_eq!(SourceKind::Invert.passthrough_family(), None);
    }
}
