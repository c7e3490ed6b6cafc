// SPDX-License-Identifier: MIT OR Apache-2.0
//! Type registry: source kind to target kind candidates and handlers.
//!
//! Candidates are tried in order until one is creatable in the current
//! target environment. Legacy spellings stay in the lists so that older
//! engine builds still resolve.

pub mod aliases;
pub mod roles;

pub use aliases::{alias_names, primary_input, primary_output};
pub use roles::{input_role, output_role, SocketRole};

use crate::error::{UnsupportedKindError, ValueDomainWarning};
use crate::kind::SourceKind;
use crate::snapshot::SourceNode;
use crate::transfer::HandlerId;
use std::collections::HashMap;

/// Target kind of the texture-emission helper
pub const EMISSION_HELPER_CANDIDATES: &[&str] =
    &["ShaderNodeOctTextureEmission", "OctaneTextureEmission"];

/// Extra target nodes a source kind expands into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    /// One target node
    Single,
    /// Primary node plus an `emission-aux` texture-emission helper
    EmissionHelper,
}

/// Registry entry for one source kind
#[derive(Debug, Clone)]
pub struct KindEntry {
    /// Target kinds in priority order
    pub candidates: &'static [&'static str],
    /// Property-transfer handler
    pub handler: HandlerId,
    /// Expansion rule
    pub expansion: Expansion,
}

impl KindEntry {
    fn new(candidates: &'static [&'static str], handler: HandlerId) -> Self {
        Self {
            candidates,
            handler,
            expansion: Expansion::Single,
        }
    }

    fn expanding(mut self, expansion: Expansion) -> Self {
        self.expansion = expansion;
        self
    }
}

/// Outcome of resolving one source node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// First creatable candidate
    pub target_kind: String,
    /// Property-transfer handler
    pub handler: HandlerId,
    /// Expansion rule
    pub expansion: Expansion,
}

/// Static mapping from source kinds to target candidates
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    entries: HashMap<SourceKind, KindEntry>,
}

const UNIVERSAL: &[&str] = &["ShaderNodeOctUniversalMat", "OctaneUniversalMaterial"];
const SPECULAR: &[&str] = &["ShaderNodeOctSpecularMat", "OctaneSpecularMaterial"];
const GLOSSY: &[&str] = &["ShaderNodeOctGlossyMat", "OctaneGlossyMaterial"];
const DIFFUSE: &[&str] = &["ShaderNodeOctDiffuseMat", "OctaneDiffuseMaterial"];
const NULL: &[&str] = &["ShaderNodeOctNullMat", "OctaneNullMaterial"];
const MIX_MAT: &[&str] = &["ShaderNodeOctMixMat", "OctaneMixMaterial"];
const HAIR: &[&str] = &["ShaderNodeOctHairMat", "OctaneHairMaterial", "ShaderNodeOctUniversalMat"];
const IMAGE: &[&str] = &["ShaderNodeOctImageTex", "OctaneImageTexture", "OctaneRGBImage"];
const NOISE: &[&str] = &["ShaderNodeOctNoiseTex", "OctaneNoiseTexture"];
const MARBLE: &[&str] = &["ShaderNodeOctMarbleTex", "OctaneMarbleTexture"];
const GRADIENT: &[&str] = &["ShaderNodeOctGradientTex", "OctaneGradientTexture"];
const MIX_TEX: &[&str] = &["ShaderNodeOctMixTex", "OctaneMixTexture"];
const MULTIPLY_TEX: &[&str] = &["ShaderNodeOctMultiplyTex", "OctaneMultiplyTexture"];
const ADD_TEX: &[&str] = &["ShaderNodeOctAddTex", "OctaneAddTexture"];
const SUBTRACT_TEX: &[&str] = &["ShaderNodeOctSubtractTex", "OctaneSubtractTexture"];
const FLOAT_MATH: &[&str] = &["ShaderNodeOctFloatMathTex", "OctaneFloatMath"];
const COLOR_CORRECTION: &[&str] = &["ShaderNodeOctColorCorrectionTex", "OctaneColorCorrection"];
const RGB_COLOR: &[&str] = &["ShaderNodeOctRGBColorTex", "OctaneRGBColor"];
const FLOAT_TEX: &[&str] = &["ShaderNodeOctFloatTex", "OctaneFloatValue"];
const TRANSFORM: &[&str] = &["ShaderNodeOct3DTransform", "OctaneTransform3D"];
const UV_PROJECTION: &[&str] = &["ShaderNodeOctMeshUVProjection", "OctaneMeshUVProjection"];
const NORMAL_MAP: &[&str] = &["ShaderNodeOctNormalMapTex", "OctaneNormalTexture"];
const DISPLACEMENT: &[&str] = &["ShaderNodeOctDisplacementTex", "OctaneDisplacement"];
const FRESNEL: &[&str] = &["ShaderNodeOctFresnelTex", "OctaneFresnel"];

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry covering the closed source vocabulary
    pub fn standard() -> Self {
        use HandlerId as H;
        use SourceKind as K;

        let mut registry = Self::new();
        let mut add = |kind: SourceKind, entry: KindEntry| registry.register(kind, entry);

        // Shaders
        add(K::Principled, KindEntry::new(UNIVERSAL, H::Principled));
        add(K::Glass, KindEntry::new(SPECULAR, H::Glass));
        add(K::Glossy, KindEntry::new(GLOSSY, H::Glossy));
        add(K::Diffuse, KindEntry::new(DIFFUSE, H::Diffuse));
        add(
            K::Emission,
            KindEntry::new(DIFFUSE, H::Emission).expanding(Expansion::EmissionHelper),
        );
        add(K::Transparent, KindEntry::new(NULL, H::Noop));
        add(K::Translucent, KindEntry::new(DIFFUSE, H::Translucent));
        add(K::Refraction, KindEntry::new(SPECULAR, H::Refraction));
        add(K::MixShader, KindEntry::new(MIX_MAT, H::MixShader));
        add(K::AddShader, KindEntry::new(MIX_MAT, H::AddShader));
        add(
            K::Metallic,
            KindEntry::new(
                &["ShaderNodeOctMetallicMat", "OctaneMetallicMaterial", "ShaderNodeOctUniversalMat"],
                H::Metallic,
            ),
        );
        add(K::Sheen, KindEntry::new(UNIVERSAL, H::Sheen));
        add(K::Toon, KindEntry::new(&["ShaderNodeOctToonMat", "OctaneToonMaterial"], H::Toon));
        add(K::Hair, KindEntry::new(HAIR, H::Generic));
        add(K::PrincipledHair, KindEntry::new(HAIR, H::Generic));
        add(K::RayPortal, KindEntry::new(NULL, H::Noop));
        add(K::Subsurface, KindEntry::new(UNIVERSAL, H::Subsurface));
        add(
            K::Background,
            KindEntry::new(DIFFUSE, H::Emission).expanding(Expansion::EmissionHelper),
        );
        add(K::Holdout, KindEntry::new(NULL, H::Noop));
        add(K::Specular, KindEntry::new(SPECULAR, H::Glossy));

        // Textures
        add(K::ImageTexture, KindEntry::new(IMAGE, H::ImageTexture));
        add(K::NoiseTexture, KindEntry::new(NOISE, H::Noise));
        add(
            K::VoronoiTexture,
            KindEntry::new(&["ShaderNodeOctVoronoiTex", "OctaneVoronoiTexture"], H::Voronoi),
        );
        add(K::WaveTexture, KindEntry::new(&["ShaderNodeOctWaveTex", "OctaneWaveTexture"], H::Wave));
        add(K::MusgraveTexture, KindEntry::new(NOISE, H::Noise));
        add(
            K::CheckerTexture,
            KindEntry::new(&["ShaderNodeOctChecksTex", "OctaneChecksTexture"], H::Checker),
        );
        add(K::BrickTexture, KindEntry::new(MARBLE, H::Generic));
        add(K::GradientTexture, KindEntry::new(GRADIENT, H::Generic));
        add(K::EnvironmentTexture, KindEntry::new(IMAGE, H::EnvironmentTexture));
        add(K::MagicTexture, KindEntry::new(MARBLE, H::Generic));
        add(
            K::SkyTexture,
            KindEntry::new(&["ShaderNodeOctDaylightEnv", "OctaneDaylightEnvironment"], H::Noop),
        );
        add(K::WhiteNoiseTexture, KindEntry::new(NOISE, H::Noise));
        add(K::GaborTexture, KindEntry::new(NOISE, H::Noise));

        // Colour
        add(K::ColorRamp, KindEntry::new(GRADIENT, H::ColorRamp));
        add(K::MixRgb, KindEntry::new(MIX_TEX, H::MixRgb));
        add(K::Mix, KindEntry::new(MIX_TEX, H::Mix));
        add(K::Invert, KindEntry::new(&["ShaderNodeOctInvertTex", "OctaneInvertTexture"], H::Invert));
        add(K::HueSaturation, KindEntry::new(COLOR_CORRECTION, H::HueSaturation));
        add(K::BrightContrast, KindEntry::new(COLOR_CORRECTION, H::BrightContrast));
        add(
            K::Gamma,
            KindEntry::new(&["ShaderNodeOctGammaCorrectionTex", "OctaneGammaCorrection"], H::Gamma),
        );
        add(K::RgbCurves, KindEntry::new(COLOR_CORRECTION, H::Generic));
        add(K::RgbToBw, KindEntry::new(COLOR_CORRECTION, H::RgbToBw));
        add(
            K::Blackbody,
            KindEntry::new(&["ShaderNodeOctBlackBodyEmission", "OctaneBlackBodyEmission"], H::Blackbody),
        );
        add(K::Wavelength, KindEntry::new(RGB_COLOR, H::Generic));
        add(K::ShaderToRgb, KindEntry::new(MIX_TEX, H::Noop));

        // Math
        add(
            K::Math,
            KindEntry::new(
                &[
                    "ShaderNodeOctMathTex",
                    "ShaderNodeOctMath",
                    "ShaderNodeOctCyclesMath",
                    "ShaderNodeOctFloatMathTex",
                    "OctaneMath",
                    "OctaneFloatMath",
                ],
                H::Math,
            ),
        );
        add(
            K::VectorMath,
            KindEntry::new(
                &[
                    "ShaderNodeOctVectorMathTex",
                    "ShaderNodeOctVectorMath",
                    "ShaderNodeOctCyclesVectorMath",
                    "OctaneVectorMath",
                    "ShaderNodeOctAddTex",
                    "OctaneAddTexture",
                ],
                H::VectorMath,
            ),
        );
        add(K::MapRange, KindEntry::new(&["ShaderNodeOctRangeTex", "OctaneRange"], H::MapRange));
        add(K::Clamp, KindEntry::new(&["ShaderNodeOctClampTex", "OctaneClamp"], H::Clamp));

        // Vector and input
        add(
            K::Mapping,
            KindEntry::new(
                &["ShaderNodeOct3DTransform", "ShaderNodeOctFullTransform", "OctaneTransform3D"],
                H::Mapping,
            ),
        );
        add(K::TexCoord, KindEntry::new(UV_PROJECTION, H::Noop));
        add(K::UvMap, KindEntry::new(UV_PROJECTION, H::UvMap));
        add(
            K::NormalMap,
            KindEntry::new(
                &[
                    "ShaderNodeOctNormalMapTex",
                    "OctaneNormalTexture",
                    "OctaneNormalMap",
                    "ShaderNodeOctNormalMap",
                    "OctaneImageTexture",
                ],
                H::NormalMap,
            ),
        );
        add(
            K::Bump,
            KindEntry::new(
                &["ShaderNodeOctBumpTex", "OctaneBumpTexture", "OctaneBumpMap", "ShaderNodeOctBumpMap"],
                H::Bump,
            ),
        );
        add(K::Displacement, KindEntry::new(DISPLACEMENT, H::Displacement));
        add(K::VectorDisplacement, KindEntry::new(DISPLACEMENT, H::Displacement));
        add(K::VectorRotate, KindEntry::new(TRANSFORM, H::Generic));
        add(K::VectorTransform, KindEntry::new(TRANSFORM, H::Generic));
        add(K::Rgb, KindEntry::new(RGB_COLOR, H::Rgb));
        add(K::Value, KindEntry::new(FLOAT_TEX, H::Value));
        add(K::Fresnel, KindEntry::new(FRESNEL, H::Fresnel));
        add(K::LayerWeight, KindEntry::new(FRESNEL, H::Fresnel));
        add(
            K::VertexColor,
            KindEntry::new(&["ShaderNodeOctVertexColorTex", "OctaneColorVertexAttribute"], H::VertexColor),
        );
        add(
            K::Attribute,
            KindEntry::new(&["ShaderNodeOctAttributeTex", "OctaneAttribute"], H::Attribute),
        );
        add(
            K::AmbientOcclusion,
            KindEntry::new(&["ShaderNodeOctDirtTex", "OctaneDirtTexture"], H::AmbientOcclusion),
        );
        add(K::Normal, KindEntry::new(NORMAL_MAP, H::Noop));
        add(K::Tangent, KindEntry::new(NORMAL_MAP, H::Noop));
        add(
            K::ObjectInfo,
            KindEntry::new(&["ShaderNodeOctInstanceColorTex", "OctaneInstanceColor"], H::Noop),
        );
        add(K::CameraData, KindEntry::new(&["ShaderNodeOctFloatTex"], H::Noop));
        add(K::ParticleInfo, KindEntry::new(&["ShaderNodeOctFloatTex"], H::Noop));
        add(K::HairInfo, KindEntry::new(&["ShaderNodeOctHairDataTex", "OctaneHairData"], H::Noop));
        add(
            K::LightFalloff,
            KindEntry::new(&["ShaderNodeOctFalloffTex", "OctaneFalloffTexture"], H::Noop),
        );
        add(K::Wireframe, KindEntry::new(&["ShaderNodeOctWireframeTex", "OctaneWireframe"], H::Noop));
        add(K::Bevel, KindEntry::new(&["ShaderNodeOctBevelTex", "OctaneBevelTexture"], H::Generic));

        // Volume
        add(
            K::VolumeAbsorption,
            KindEntry::new(&["ShaderNodeOctAbsorptionMedium", "OctaneAbsorptionMedium"], H::VolumeAbsorption),
        );
        add(
            K::VolumeScatter,
            KindEntry::new(&["ShaderNodeOctScatterMedium", "OctaneScatteringMedium"], H::VolumeScatter),
        );
        add(
            K::PrincipledVolume,
            KindEntry::new(
                &["ShaderNodeOctVolumeMedium", "OctaneVolumeMedium", "ShaderNodeOctAbsorptionMedium"],
                H::PrincipledVolume,
            ),
        );
        add(K::VolumeInfo, KindEntry::new(&["ShaderNodeOctFloatTex"], H::Noop));

        // Structure
        add(K::MaterialOutput, KindEntry::new(&["ShaderNodeOutputMaterial"], H::Noop));

        registry
    }

    /// Register or replace the entry for a kind
    pub fn register(&mut self, kind: SourceKind, entry: KindEntry) {
        self.entries.insert(kind, entry);
    }

    /// Remove the entry for a kind
    pub fn unregister(&mut self, kind: &SourceKind) -> Option<KindEntry> {
        self.entries.remove(kind)
    }

    /// Entry for a kind
    pub fn entry(&self, kind: &SourceKind) -> Option<&KindEntry> {
        self.entries.get(kind)
    }

    /// Whether a kind has an entry
    pub fn contains(&self, kind: &SourceKind) -> bool {
        self.entries.contains_key(kind)
    }

    /// Candidate target kinds for a node, property overrides first
    pub fn candidates(&self, node: &SourceNode) -> Vec<&'static str> {
        let mut candidates: Vec<&'static str> = Vec::new();

        let overrides = match node.kind {
            SourceKind::MixRgb | SourceKind::Mix => {
                node.text_property("blend_type").and_then(blend_candidates)
            }
            SourceKind::VectorMath => node
                .text_property("operation")
                .and_then(vector_math_candidates),
            _ => None,
        };
        if let Some(overrides) = overrides {
            candidates.extend_from_slice(overrides);
        }

        if let Some(entry) = self.entries.get(&node.kind) {
            for candidate in entry.candidates {
                if !candidates.contains(candidate) {
                    candidates.push(candidate);
                }
            }
        }
        candidates
    }

    /// Resolve a node to the first creatable candidate
    pub fn resolve(
        &self,
        node: &SourceNode,
        creatable: impl Fn(&str) -> bool,
    ) -> Result<Resolution, UnsupportedKindError> {
        let candidates = self.candidates(node);
        let unsupported = || UnsupportedKindError {
            kind: node.kind.tag().to_string(),
            tried: candidates.iter().map(|c| c.to_string()).collect(),
        };

        let entry = self.entries.get(&node.kind).ok_or_else(unsupported)?;
        let target_kind = candidates
            .iter()
            .find(|candidate| creatable(candidate))
            .ok_or_else(unsupported)?;

        Ok(Resolution {
            target_kind: target_kind.to_string(),
            handler: entry.handler,
            expansion: entry.expansion,
        })
    }
}

/// Dedicated target kinds for a mix blend mode
pub fn blend_candidates(blend: &str) -> Option<&'static [&'static str]> {
    let candidates = match blend {
        "MULTIPLY" => MULTIPLY_TEX,
        "ADD" => ADD_TEX,
        "SUBTRACT" | "DIFFERENCE" => SUBTRACT_TEX,
        "SCREEN" | "OVERLAY" => MIX_TEX,
        _ => return None,
    };
    Some(candidates)
}

/// Dedicated target kinds for a vector math operation
pub fn vector_math_candidates(operation: &str) -> Option<&'static [&'static str]> {
    let candidates = match operation {
        "ADD" => ADD_TEX,
        "SUBTRACT" => SUBTRACT_TEX,
        "MULTIPLY" | "SCALE" => MULTIPLY_TEX,
        "DOT_PRODUCT" | "DISTANCE" | "LENGTH" => FLOAT_MATH,
        "DIVIDE" | "CROSS_PRODUCT" | "PROJECT" | "REFLECT" | "REFRACT" | "FACEFORWARD"
        | "NORMALIZE" | "ABSOLUTE" | "MINIMUM" | "MAXIMUM" | "FLOOR" | "CEIL" | "FRACTION"
        | "MODULO" | "WRAP" | "SNAP" | "SINE" | "COSINE" | "TANGENT" => MIX_TEX,
        _ => return None,
    };
    Some(candidates)
}

/// Target operation name for a source math operation
pub fn math_operation(operation: &str) -> Option<&'static str> {
    let name = match operation {
        "ADD" => "ADD",
        "SUBTRACT" => "SUBTRACT",
        "MULTIPLY" => "MULTIPLY",
        "DIVIDE" => "DIVIDE",
        "MULTIPLY_ADD" => "MULTIPLY_ADD",
        "POWER" => "POWER",
        "LOGARITHM" => "LOGARITHM",
        "SQRT" => "SQRT",
        "INVERSE_SQRT" => "INVERSE_SQRT",
        "ABSOLUTE" => "ABSOLUTE",
        "EXPONENT" => "EXPONENT",
        "MINIMUM" => "MINIMUM",
        "MAXIMUM" => "MAXIMUM",
        "LESS_THAN" => "LESS_THAN",
        "GREATER_THAN" => "GREATER_THAN",
        "SIGN" => "SIGN",
        "COMPARE" => "COMPARE",
        "SMOOTH_MIN" => "SMOOTH_MIN",
        "SMOOTH_MAX" => "SMOOTH_MAX",
        "ROUND" => "ROUND",
        "FLOOR" => "FLOOR",
        "CEIL" => "CEIL",
        "TRUNC" => "TRUNC",
        "FRACT" => "FRACT",
        "MODULO" => "MODULO",
        "FLOORED_MODULO" => "FLOORED_MODULO",
        "WRAP" => "WRAP",
        "SNAP" => "SNAP",
        "PINGPONG" => "PINGPONG",
        "SINE" => "SIN",
        "COSINE" => "COS",
        "TANGENT" => "TAN",
        "ARCSINE" => "ASIN",
        "ARCCOSINE" => "ACOS",
        "ARCTANGENT" => "ATAN",
        "ARCTAN2" => "ATAN2",
        "SINH" => "SINH",
        "COSH" => "COSH",
        "TANH" => "TANH",
        "RADIANS" => "RADIANS",
        "DEGREES" => "DEGREES",
        _ => return None,
    };
    Some(name)
}

/// Translate a math operation, defaulting unknown names to ADD
pub fn translate_math_operation(operation: &str) -> (&'static str, Option<ValueDomainWarning>) {
    match math_operation(operation) {
        Some(name) => (name, None),
        None => (
            "ADD",
            Some(ValueDomainWarning {
                property: format!("operation {operation}"),
                value: f32::NAN,
                clamped: 0.0,
            }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{PropertyValue, SourceNodeId};
    use std::collections::BTreeMap;

    fn node(kind: SourceKind) -> SourceNode {
        SourceNode {
            id: SourceNodeId(0),
            name: "node".into(),
            kind,
            label: None,
            location: [0.0, 0.0],
            inputs: Vec::new(),
            outputs: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    #[test]
    fn test_first_creatable_candidate_wins() {
        let registry = TypeRegistry::standard();
        let math = node(SourceKind::Math);
        let resolution = registry
            .resolve(&math, |kind| kind == "ShaderNodeOctFloatMathTex")
            .unwrap();
        assert_eq!(resolution.target_kind, "ShaderNodeOctFloatMathTex");
        assert_eq!(resolution.handler, HandlerId::Math);
    }

    #[test]
    fn test_nothing_creatable_is_unsupported() {
        let registry = TypeRegistry::standard();
        let error = registry.resolve(&node(SourceKind::Principled), |_| false).unwrap_err();
        assert_eq!(error.kind, "ShaderNodeBsdfPrincipled");
        assert_eq!(error.tried.len(), 2);

        let error = registry
            .resolve(&node(SourceKind::Opaque("Custom".into())), |_| true)
            .unwrap_err();
        assert!(error.tried.is_empty());
    }

    #[test]
    fn test_blend_mode_overrides_candidates() {
        let registry = TypeRegistry::standard();
        let mut mix = node(SourceKind::MixRgb);
        mix.properties
            .insert("blend_type".into(), PropertyValue::Text("MULTIPLY".into()));
        assert_eq!(registry.candidates(&mix)[0], "ShaderNodeOctMultiplyTex");

        mix.properties
            .insert("blend_type".into(), PropertyValue::Text("MIX".into()));
        assert_eq!(registry.candidates(&mix)[0], "ShaderNodeOctMixTex");
    }

    #[test]
    fn test_emission_expands() {
        let registry = TypeRegistry::standard();
        let entry = registry.entry(&SourceKind::Emission).unwrap();
        assert_eq!(entry.expansion, Expansion::EmissionHelper);
    }

    #[test]
    fn test_math_operation_table() {
        assert_eq!(math_operation("SINE"), Some("SIN"));
        assert_eq!(math_operation("FRACT"), Some("FRACT"));
        let (name, warning) = translate_math_operation("BOGUS");
        assert_eq!(name, "ADD");
        assert!(warning.is_some());
    }
}
