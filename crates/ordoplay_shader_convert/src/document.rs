// SPDX-License-Identifier: MIT OR Apache-2.0
//! Serialized source materials.
//!
//! A [`SourceDocument`] is the on-disk form of a source graph (RON or JSON)
//! and implements [`SourceGraphProvider`] directly.

use crate::error::ProviderError;
use crate::kind::SourceKind;
use crate::snapshot::{PropertyValue, RawLink, SourceGraphProvider, SourceSocket};
use ordoplay_shader_graph::{PortDirection, PortType, PortValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// A node in a source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    /// Unique name
    pub name: String,
    /// Type tag
    pub kind: String,
    /// User label
    #[serde(default)]
    pub label: Option<String>,
    /// Editor location
    #[serde(default)]
    pub location: [f32; 2],
    /// Input sockets
    #[serde(default)]
    pub inputs: Vec<SourceSocket>,
    /// Output sockets
    #[serde(default)]
    pub outputs: Vec<SourceSocket>,
    /// Kind-specific properties
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl DocumentNode {
    /// Node with no sockets
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            label: None,
            location: [0.0, 0.0],
            inputs: Vec::new(),
            outputs: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Node with the standard socket layout of its kind
    pub fn standard(name: impl Into<String>, kind: SourceKind) -> Self {
        let (inputs, outputs) = standard_sockets(&kind);
        Self {
            inputs,
            outputs,
            ..Self::new(name, kind.tag())
        }
    }

    /// Add an input
    pub fn input(mut self, socket: SourceSocket) -> Self {
        self.inputs.push(socket);
        self
    }

    /// Add an output
    pub fn output(mut self, socket: SourceSocket) -> Self {
        self.outputs.push(socket);
        self
    }

    /// Set a property
    pub fn property(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Set the editor location
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.location = [x, y];
        self
    }

    /// Set the default of an existing input (by identifier, then name)
    pub fn with_default(mut self, key: &str, value: PortValue) -> Self {
        self.set_input_default(key, value);
        self
    }

    /// Set the default of an existing input in place
    pub fn set_input_default(&mut self, key: &str, value: PortValue) -> bool {
        let index = self
            .inputs
            .iter()
            .position(|s| s.identifier == key)
            .or_else(|| self.inputs.iter().position(|s| s.name == key));
        match index {
            Some(i) => {
                self.inputs[i].default = Some(value);
                true
            }
            None => false,
        }
    }
}

/// A serialized source material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Material name
    pub name: String,
    /// Scale of the object the material is assigned to
    #[serde(default = "unit_scale")]
    pub object_scale: [f32; 3],
    /// Nodes
    #[serde(default)]
    pub nodes: Vec<DocumentNode>,
    /// Links
    #[serde(default)]
    pub links: Vec<RawLink>,
}

impl SourceDocument {
    /// Empty document
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            object_scale: unit_scale(),
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Append a node
    pub fn push_node(&mut self, node: DocumentNode) -> &mut Self {
        self.nodes.push(node);
        self
    }

    /// Append a link
    pub fn link(
        &mut self,
        from_node: &str,
        from_socket: &str,
        to_node: &str,
        to_socket: &str,
    ) -> &mut Self {
        self.links.push(RawLink {
            from_node: from_node.to_string(),
            from_socket: from_socket.to_string(),
            to_node: to_node.to_string(),
            to_socket: to_socket.to_string(),
        });
        self
    }

    /// Mutable access to a node by name
    pub fn node_mut(&mut self, name: &str) -> Option<&mut DocumentNode> {
        self.nodes.iter_mut().find(|n| n.name == name)
    }

    fn find(&self, name: &str) -> Result<&DocumentNode, ProviderError> {
        self.nodes
            .iter()
            .find(|n| n.name == name)
            .ok_or_else(|| ProviderError::NodeNotFound(name.to_string()))
    }

    /// Load from a `.ron` or `.json` file
    pub fn load(path: &Path) -> Result<Self, ProviderError> {
        let content = std::fs::read_to_string(path)?;
        let parsed = if is_json(path) {
            serde_json::from_str(&content).map_err(|e| ProviderError::Unreadable(e.to_string()))
        } else {
            ron::from_str(&content).map_err(|e| ProviderError::Unreadable(e.to_string()))
        };
        let document: SourceDocument = parsed?;
        tracing::debug!(path = %path.display(), nodes = document.nodes.len(), "loaded source document");
        Ok(document)
    }

    /// Save to a `.ron` or `.json` file
    pub fn save(&self, path: &Path) -> Result<(), ProviderError> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self).map_err(|e| ProviderError::Unreadable(e.to_string()))?
        } else {
            let config = ron::ser::PrettyConfig::default().struct_names(true);
            ron::ser::to_string_pretty(self, config)
                .map_err(|e| ProviderError::Unreadable(e.to_string()))?
        };
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

impl SourceGraphProvider for SourceDocument {
    fn material_name(&self) -> &str {
        &self.name
    }

    fn node_names(&self) -> Result<Vec<String>, ProviderError> {
        Ok(self.nodes.iter().map(|n| n.name.clone()).collect())
    }

    fn node_kind(&self, node: &str) -> Result<String, ProviderError> {
        Ok(self.find(node)?.kind.clone())
    }

    fn node_label(&self, node: &str) -> Result<Option<String>, ProviderError> {
        Ok(self.find(node)?.label.clone())
    }

    fn node_location(&self, node: &str) -> Result<[f32; 2], ProviderError> {
        Ok(self.find(node)?.location)
    }

    fn node_properties(&self, node: &str) -> Result<BTreeMap<String, PropertyValue>, ProviderError> {
        Ok(self.find(node)?.properties.clone())
    }

    fn node_sockets(
        &self,
        node: &str,
        direction: PortDirection,
    ) -> Result<Vec<SourceSocket>, ProviderError> {
        let node = self.find(node)?;
        Ok(match direction {
            PortDirection::Input => node.inputs.clone(),
            PortDirection::Output => node.outputs.clone(),
        })
    }

    fn links(&self) -> Result<Vec<RawLink>, ProviderError> {
        Ok(self.links.clone())
    }
}

fn f(name: &str, value: f32) -> SourceSocket {
    SourceSocket::new(name, PortType::Float).with_default(PortValue::Float(value))
}

fn c(name: &str, rgb: [f32; 3]) -> SourceSocket {
    SourceSocket::new(name, PortType::Color).with_default(PortValue::Color([rgb[0], rgb[1], rgb[2], 1.0]))
}

fn v(name: &str, value: [f32; 3]) -> SourceSocket {
    SourceSocket::new(name, PortType::Vector).with_default(PortValue::Vector(value))
}

fn link_only(name: &str, socket_type: PortType) -> SourceSocket {
    SourceSocket::new(name, socket_type)
}

fn out(name: &str, socket_type: PortType) -> SourceSocket {
    SourceSocket::new(name, socket_type)
}

/// Standard socket layout of common source kinds.
///
/// Kinds without a layout here get no sockets; callers add them explicitly.
pub fn standard_sockets(kind: &SourceKind) -> (Vec<SourceSocket>, Vec<SourceSocket>) {
    use SourceKind as K;
    let shader_out = |name: &str| vec![out(name, PortType::Shader)];
    match kind {
        K::Principled => (
            vec![
                c("Base Color", [0.8, 0.8, 0.8]),
                f("Metallic", 0.0),
                f("Roughness", 0.5),
                f("IOR", 1.5),
                f("Alpha", 1.0),
                link_only("Normal", PortType::Vector),
                f("Subsurface Weight", 0.0),
                v("Subsurface Radius", [1.0, 0.2, 0.1]),
                f("Subsurface Scale", 0.05),
                f("Specular IOR Level", 0.5),
                c("Specular Tint", [1.0, 1.0, 1.0]),
                f("Anisotropic", 0.0),
                f("Anisotropic Rotation", 0.0),
                link_only("Tangent", PortType::Vector),
                f("Transmission Weight", 0.0),
                f("Coat Weight", 0.0),
                f("Coat Roughness", 0.03),
                f("Coat IOR", 1.5),
                c("Coat Tint", [1.0, 1.0, 1.0]),
                link_only("Coat Normal", PortType::Vector),
                f("Sheen Weight", 0.0),
                f("Sheen Roughness", 0.5),
                c("Sheen Tint", [1.0, 1.0, 1.0]),
                c("Emission Color", [1.0, 1.0, 1.0]),
                f("Emission Strength", 0.0),
                f("Thin Film Thickness", 0.0),
                f("Thin Film IOR", 1.33),
            ],
            shader_out("BSDF"),
        ),
        K::Diffuse | K::Translucent => (
            vec![
                c("Color", [0.8, 0.8, 0.8]),
                f("Roughness", 0.0),
                link_only("Normal", PortType::Vector),
            ],
            shader_out("BSDF"),
        ),
        K::Glossy | K::Metallic | K::Sheen | K::Toon => (
            vec![
                c("Color", [0.8, 0.8, 0.8]),
                f("Roughness", 0.5),
                link_only("Normal", PortType::Vector),
            ],
            shader_out("BSDF"),
        ),
        K::Glass | K::Refraction => (
            vec![
                c("Color", [1.0, 1.0, 1.0]),
                f("Roughness", 0.0),
                f("IOR", 1.45),
                link_only("Normal", PortType::Vector),
            ],
            shader_out("BSDF"),
        ),
        K::Emission => (
            vec![c("Color", [1.0, 1.0, 1.0]), f("Strength", 1.0)],
            shader_out("Emission"),
        ),
        K::Transparent | K::Holdout => (vec![c("Color", [1.0, 1.0, 1.0])], shader_out("BSDF")),
        K::MixShader => (
            vec![
                f("Fac", 0.5),
                link_only("Shader", PortType::Shader),
                link_only("Shader", PortType::Shader).with_identifier("Shader_001"),
            ],
            shader_out("Shader"),
        ),
        K::AddShader => (
            vec![
                link_only("Shader", PortType::Shader),
                link_only("Shader", PortType::Shader).with_identifier("Shader_001"),
            ],
            shader_out("Shader"),
        ),
        K::ImageTexture | K::EnvironmentTexture => (
            vec![link_only("Vector", PortType::Vector)],
            vec![out("Color", PortType::Color), out("Alpha", PortType::Float)],
        ),
        K::NoiseTexture | K::MusgraveTexture => (
            vec![
                link_only("Vector", PortType::Vector),
                f("Scale", 5.0),
                f("Detail", 2.0),
                f("Roughness", 0.5),
                f("Distortion", 0.0),
            ],
            vec![out("Fac", PortType::Float), out("Color", PortType::Color)],
        ),
        K::CheckerTexture => (
            vec![
                link_only("Vector", PortType::Vector),
                c("Color1", [0.8, 0.8, 0.8]),
                c("Color2", [0.2, 0.2, 0.2]),
                f("Scale", 5.0),
            ],
            vec![out("Color", PortType::Color), out("Fac", PortType::Float)],
        ),
        K::ColorRamp => (
            vec![f("Fac", 0.5)],
            vec![out("Color", PortType::Color), out("Alpha", PortType::Float)],
        ),
        K::MixRgb => (
            vec![f("Fac", 0.5), c("Color1", [0.5, 0.5, 0.5]), c("Color2", [0.5, 0.5, 0.5])],
            vec![out("Color", PortType::Color)],
        ),
        K::Mix => (
            vec![f("Factor", 0.5), c("A", [0.5, 0.5, 0.5]), c("B", [0.5, 0.5, 0.5])],
            vec![out("Result", PortType::Color)],
        ),
        K::Invert => (
            vec![f("Fac", 1.0), c("Color", [0.0, 0.0, 0.0])],
            vec![out("Color", PortType::Color)],
        ),
        K::HueSaturation => (
            vec![
                f("Hue", 0.5),
                f("Saturation", 1.0),
                f("Value", 1.0),
                f("Fac", 1.0),
                c("Color", [0.8, 0.8, 0.8]),
            ],
            vec![out("Color", PortType::Color)],
        ),
        K::Math => (
            vec![
                f("Value", 0.5),
                f("Value", 0.5).with_identifier("Value_001"),
                f("Value", 0.5).with_identifier("Value_002"),
            ],
            vec![out("Value", PortType::Float)],
        ),
        K::MapRange => (
            vec![
                f("Value", 1.0),
                f("From Min", 0.0),
                f("From Max", 1.0),
                f("To Min", 0.0),
                f("To Max", 1.0),
            ],
            vec![out("Result", PortType::Float)],
        ),
        K::Clamp => (
            vec![f("Value", 1.0), f("Min", 0.0), f("Max", 1.0)],
            vec![out("Result", PortType::Float)],
        ),
        K::Mapping => (
            vec![
                v("Vector", [0.0, 0.0, 0.0]),
                v("Location", [0.0, 0.0, 0.0]),
                v("Rotation", [0.0, 0.0, 0.0]),
                v("Scale", [1.0, 1.0, 1.0]),
            ],
            vec![out("Vector", PortType::Vector)],
        ),
        K::TexCoord => (
            vec![],
            ["Generated", "Normal", "UV", "Object", "Camera", "Window", "Reflection"]
                .iter()
                .map(|n| out(n, PortType::Vector))
                .collect(),
        ),
        K::UvMap => (vec![], vec![out("UV", PortType::Vector)]),
        K::NormalMap => (
            vec![f("Strength", 1.0), c("Color", [0.5, 0.5, 1.0])],
            vec![out("Normal", PortType::Vector)],
        ),
        K::Bump => (
            vec![
                f("Strength", 1.0),
                f("Distance", 1.0),
                f("Height", 1.0),
                link_only("Normal", PortType::Vector),
            ],
            vec![out("Normal", PortType::Vector)],
        ),
        K::Displacement => (
            vec![
                f("Height", 0.0),
                f("Midlevel", 0.5),
                f("Scale", 1.0),
                link_only("Normal", PortType::Vector),
            ],
            vec![out("Displacement", PortType::Vector)],
        ),
        K::Rgb => (vec![], vec![out("Color", PortType::Color)]),
        K::Value => (vec![], vec![out("Value", PortType::Float)]),
        K::Fresnel => (
            vec![f("IOR", 1.45), link_only("Normal", PortType::Vector)],
            vec![out("Fac", PortType::Float)],
        ),
        K::VolumeAbsorption => (
            vec![c("Color", [0.8, 0.8, 0.8]), f("Density", 1.0)],
            shader_out("Volume"),
        ),
        K::VolumeScatter => (
            vec![c("Color", [0.8, 0.8, 0.8]), f("Density", 1.0), f("Anisotropy", 0.0)],
            shader_out("Volume"),
        ),
        K::Blackbody => (vec![f("Temperature", 1500.0)], vec![out("Color", PortType::Color)]),
        K::MaterialOutput => (
            vec![
                link_only("Surface", PortType::Shader),
                link_only("Volume", PortType::Shader),
                link_only("Displacement", PortType::Vector),
            ],
            vec![],
        ),
        K::Reroute => (
            vec![link_only("Input", PortType::Any)],
            vec![out("Output", PortType::Any)],
        ),
        K::SeparateColor | K::SeparateRgb => (
            vec![c("Color", [0.8, 0.8, 0.8])],
            vec![
                out("Red", PortType::Float),
                out("Green", PortType::Float),
                out("Blue", PortType::Float),
            ],
        ),
        K::CombineColor | K::CombineRgb => (
            vec![f("Red", 0.0), f("Green", 0.0), f("Blue", 0.0)],
            vec![out("Color", PortType::Color)],
        ),
        _ => (Vec::new(), Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_formats_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = SourceDocument::new("Stone");
        doc.object_scale = [2.0, 2.0, 2.0];
        doc.push_node(DocumentNode::standard("BSDF", SourceKind::Principled));
        doc.push_node(DocumentNode::standard("Out", SourceKind::MaterialOutput));
        doc.link("BSDF", "BSDF", "Out", "Surface");

        for file in ["stone.ron", "stone.json"] {
            let path = dir.path().join(file);
            doc.save(&path).unwrap();
            assert_eq!(SourceDocument::load(&path).unwrap(), doc);
        }
    }

    #[test]
    fn test_mix_shader_inputs_have_distinct_identifiers() {
        let node = DocumentNode::standard("Mix", SourceKind::MixShader);
        let ids: Vec<&str> = node.inputs.iter().map(SourceSocket::key).collect();
        assert_eq!(ids, vec!["Fac", "Shader", "Shader_001"]);
    }

    #[test]
    fn test_provider_reports_missing_node() {
        let doc = SourceDocument::new("Empty");
        assert!(matches!(
            doc.node_kind("Missing"),
            Err(ProviderError::NodeNotFound(_))
        ));
    }
}
