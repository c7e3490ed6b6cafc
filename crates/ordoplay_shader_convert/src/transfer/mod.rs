// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property transfer: per-kind handlers that write target parameters.
//!
//! Handlers are plain functions keyed by [`HandlerId`]. They only set
//! literal values and parameters; wiring is left to the link stage, except
//! for helper nodes a handler must create up front (emission helpers).

mod shaders;
mod textures;
mod utility;

use crate::config::ConversionSettings;
use crate::diagnostics::{Diagnostics, Stage};
use crate::error::ValueDomainWarning;
use crate::instantiate::{create_emission_helper, Correspondence, NodeRole};
use crate::snapshot::{Snapshot, SourceNode, SourceNodeId};
use crate::target::TargetGraph;
use ordoplay_shader_graph::{NodeId, PortDirection, PortValue};
use std::collections::{BTreeMap, BTreeSet};

/// Identifier of a property-transfer handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum HandlerId {
    // Shaders
    Principled,
    Glass,
    Glossy,
    Diffuse,
    Emission,
    Translucent,
    Refraction,
    MixShader,
    AddShader,
    Metallic,
    Sheen,
    Toon,
    Subsurface,
    // Textures and colour
    ImageTexture,
    EnvironmentTexture,
    Noise,
    Voronoi,
    Wave,
    Checker,
    ColorRamp,
    MixRgb,
    Mix,
    Invert,
    HueSaturation,
    BrightContrast,
    Gamma,
    RgbToBw,
    // Utility
    NormalMap,
    Bump,
    Displacement,
    Mapping,
    UvMap,
    Math,
    VectorMath,
    MapRange,
    Clamp,
    Rgb,
    Value,
    Fresnel,
    VertexColor,
    Attribute,
    AmbientOcclusion,
    Blackbody,
    // Volume
    VolumeAbsorption,
    VolumeScatter,
    PrincipledVolume,
    /// Copy defaults onto same-named target inputs
    Generic,
    /// Nothing to transfer
    Noop,
}

/// Handler signature: source node and its primary target node
pub type Handler = fn(&mut TransferContext<'_>, &SourceNode, NodeId);

impl HandlerId {
    /// Function implementing this handler
    pub fn handler(self) -> Handler {
        use HandlerId as H;
        match self {
            H::Principled => shaders::principled,
            H::Glass => shaders::glass,
            H::Glossy => shaders::glossy,
            H::Diffuse => shaders::diffuse,
            H::Emission => shaders::emission,
            H::Translucent => shaders::translucent,
            H::Refraction => shaders::refraction,
            H::MixShader => shaders::mix_shader,
            H::AddShader => shaders::add_shader,
            H::Metallic => shaders::metallic,
            H::Sheen => shaders::sheen,
            H::Toon => shaders::toon,
            H::Subsurface => shaders::subsurface,
            H::VolumeAbsorption => shaders::volume_absorption,
            H::VolumeScatter => shaders::volume_scatter,
            H::PrincipledVolume => shaders::principled_volume,
            H::ImageTexture => textures::image_texture,
            H::EnvironmentTexture => textures::environment_texture,
            H::Noise => textures::noise,
            H::Voronoi => textures::voronoi,
            H::Wave => textures::wave,
            H::Checker => textures::checker,
            H::ColorRamp => textures::color_ramp,
            H::MixRgb => textures::mix_rgb,
            H::Mix => textures::mix,
            H::Invert => textures::invert,
            H::HueSaturation => textures::hue_saturation,
            H::BrightContrast => textures::bright_contrast,
            H::Gamma => textures::gamma,
            H::RgbToBw => textures::rgb_to_bw,
            H::NormalMap => utility::normal_map,
            H::Bump => utility::bump,
            H::Displacement => utility::displacement,
            H::Mapping => utility::mapping,
            H::UvMap => utility::uv_map,
            H::Math => utility::math,
            H::VectorMath => utility::vector_math,
            H::MapRange => utility::map_range,
            H::Clamp => utility::clamp,
            H::Rgb => utility::rgb,
            H::Value => utility::value,
            H::Fresnel => utility::fresnel,
            H::VertexColor => utility::vertex_color,
            H::Attribute => utility::attribute,
            H::AmbientOcclusion => utility::ambient_occlusion,
            H::Blackbody => utility::blackbody,
            H::Generic => utility::generic,
            H::Noop => utility::noop,
        }
    }
}

/// Slot order chosen for a mix material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixPlan {
    /// The second source shader goes into the first target slot
    pub swapped: bool,
    /// Target amount, weighting the first target slot
    pub amount: f32,
}

/// Facts handlers hand on to post-processing
#[derive(Debug, Clone, Default)]
pub struct TransferNotes {
    /// Slot plans of mix/add shaders
    pub mix_plans: BTreeMap<SourceNodeId, MixPlan>,
    /// Emissive source shaders and their strength
    pub emissive: BTreeMap<SourceNodeId, f32>,
    /// Source nodes whose colour space is non-colour data
    pub non_color: BTreeSet<SourceNodeId>,
}

/// State shared by handlers during one transfer pass
pub struct TransferContext<'a> {
    /// Target graph being filled
    pub graph: &'a mut dyn TargetGraph,
    /// Source snapshot
    pub snapshot: &'a Snapshot,
    /// Conversion settings
    pub settings: &'a ConversionSettings,
    /// Scale of the host object
    pub object_scale: [f32; 3],
    /// Correspondence table; handlers may add helper roles
    pub table: &'a mut Correspondence,
    /// Diagnostics sink for this run
    pub diagnostics: &'a mut Diagnostics,
    /// Notes for post-processing
    pub notes: &'a mut TransferNotes,
}

impl TransferContext<'_> {
    /// Set the first candidate input the node exposes.
    /// Returns the socket that took the value.
    pub fn set(&mut self, node: NodeId, candidates: &[&str], value: PortValue) -> Option<String> {
        let inputs = self.graph.sockets(node, PortDirection::Input);
        let name = candidates
            .iter()
            .find(|c| inputs.iter().any(|s| s.name == **c))?;
        self.graph
            .set_input(node, name, value)
            .then(|| name.to_string())
    }

    /// Copy a source input's literal default onto the first candidate
    pub fn copy(&mut self, source: &SourceNode, key: &str, node: NodeId, candidates: &[&str]) {
        if let Some(value) = source.input_value(key).cloned() {
            self.set(node, candidates, value);
        }
    }

    /// Set a node parameter
    pub fn param(&mut self, node: NodeId, name: &str, value: PortValue) {
        self.graph.set_parameter(node, name, value);
    }

    /// Scalar input clamped to `[min, max]`, reporting any clamp
    pub fn clamped(&mut self, source: &SourceNode, key: &str, min: f32, max: f32) -> Option<f32> {
        let value = source.float(key)?;
        Some(self.guard(source.id, key, value, min, max))
    }

    /// Scalar input clamped to `[0, 1]`
    pub fn unit(&mut self, source: &SourceNode, key: &str) -> Option<f32> {
        self.clamped(source, key, 0.0, 1.0)
    }

    /// Scalar input clamped to `>= 0`
    pub fn non_negative(&mut self, source: &SourceNode, key: &str) -> Option<f32> {
        self.clamped(source, key, 0.0, f32::INFINITY)
    }

    /// IOR input clamped to `[1, 10]`
    pub fn ior(&mut self, source: &SourceNode, key: &str) -> Option<f32> {
        self.clamped(source, key, 1.0, 10.0)
    }

    /// Clamp a value, recording a warning when it moves
    pub fn guard(&mut self, source: SourceNodeId, property: &str, value: f32, min: f32, max: f32) -> f32 {
        let clamped = if value.is_nan() { min } else { value.clamp(min, max) };
        if clamped != value {
            self.diagnostics.clamped(
                source,
                ValueDomainWarning {
                    property: property.to_string(),
                    value,
                    clamped,
                },
            );
        }
        clamped
    }

    /// Record a non-fatal warning from a handler
    pub fn warn(&mut self, source: SourceNodeId, warning: ValueDomainWarning) {
        self.diagnostics.clamped(source, warning);
    }

    /// Whether a source input carries a link after flattening
    pub fn is_linked(&self, source: &SourceNode, key: &str) -> bool {
        self.snapshot.is_input_linked(source.id, key)
    }

    /// Emission helper of a source node, creating it if needed
    pub fn emission_helper(&mut self, source: &SourceNode) -> Option<NodeId> {
        if let Some(helper) = self.table.emission_aux(source.id) {
            return Some(helper);
        }
        match create_emission_helper(self.graph, source) {
            Some(helper) => {
                self.table.insert(source.id, NodeRole::EmissionAux, helper);
                Some(helper)
            }
            None => {
                self.diagnostics.note(
                    Stage::Transfer,
                    Some(source.id),
                    format!("No emission helper kind available for '{}'", source.name),
                );
                None
            }
        }
    }

    /// Derived scale factor for procedural coordinates: the mean object
    /// scale, or 1 when the object is unscaled within tolerance
    pub fn procedural_scale(&self) -> f32 {
        let tolerance = self.settings.scale_tolerance;
        if self.object_scale.iter().all(|s| (s - 1.0).abs() <= tolerance) {
            1.0
        } else {
            self.object_scale.iter().sum::<f32>() / 3.0
        }
    }
}

/// Run every converted node's handler, in scheduled order
pub fn transfer(ctx: &mut TransferContext<'_>, order: &[SourceNodeId]) {
    let snapshot = ctx.snapshot;
    for id in order {
        let Some(handler) = ctx.table.resolution(*id).map(|r| r.handler) else { continue };
        let Some(primary) = ctx.table.primary(*id) else { continue };
        let Some(source) = snapshot.node(*id) else { continue };

        tracing::trace!(node = %source.name, ?handler, "transferring properties");
        (handler.handler())(ctx, source, primary);
    }
    tracing::debug!(
        mixes = ctx.notes.mix_plans.len(),
        emissive = ctx.notes.emissive.len(),
        "properties transferred"
    );
}
