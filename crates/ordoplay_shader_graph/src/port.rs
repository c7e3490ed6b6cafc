// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortId(pub Uuid);

impl PortId {
    /// Create a new random port ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PortId {
    fn default() -> Self {
        Self::new()
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// Data type that can flow through ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortType {
    /// Boolean value
    Bool,
    /// Integer value
    Int,
    /// Floating point value
    Float,
    /// 3D vector
    Vector,
    /// Color (RGBA)
    Color,
    /// Shader closure / material
    Shader,
    /// Texture (procedural or image)
    Texture,
    /// Emission distribution
    Emission,
    /// Volume medium
    Medium,
    /// UV / coordinate projection
    Projection,
    /// Coordinate transform
    Transform,
    /// String value
    String,
    /// Any type (for generic nodes)
    Any,
}

impl PortType {
    /// Check if this type can connect to another type
    pub fn can_connect_to(&self, other: &PortType) -> bool {
        // Any type can connect to anything
        if matches!(self, Self::Any) || matches!(other, Self::Any) {
            return true;
        }

        // Same types can always connect
        if self == other {
            return true;
        }

        // Implicit conversions
        match (self, other) {
            // Numeric conversions
            (Self::Int, Self::Float) | (Self::Float, Self::Int) => true,
            (Self::Bool, Self::Float | Self::Int) => true,
            // Scalars, colors and vectors broadcast into each other
            (Self::Float | Self::Int, Self::Vector | Self::Color) => true,
            (Self::Vector | Self::Color, Self::Float) => true,
            (Self::Color, Self::Vector) | (Self::Vector, Self::Color) => true,
            // Any value-like output can drive a texture input
            (Self::Float | Self::Int | Self::Color | Self::Vector, Self::Texture) => true,
            (Self::Texture, Self::Float | Self::Color | Self::Vector) => true,
            // Textures drive emission helpers
            (Self::Texture | Self::Color, Self::Emission) => true,
            // Coordinate plumbing
            (Self::Vector, Self::Projection | Self::Transform) => true,
            (Self::Projection | Self::Transform, Self::Vector) => true,
            // Volume closures come out of the shader family
            (Self::Shader, Self::Medium) | (Self::Medium, Self::Shader) => true,
            // No other implicit conversions
            _ => false,
        }
    }

    /// Whether values of this type carry color data
    pub fn is_color(&self) -> bool {
        matches!(self, Self::Color)
    }
}

/// A port on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    /// Unique port ID
    pub id: PortId,
    /// Port name
    pub name: String,
    /// Port direction
    pub direction: PortDirection,
    /// Data type
    pub port_type: PortType,
    /// Default value (for inputs)
    pub default_value: Option<PortValue>,
    /// Whether multiple connections are allowed
    pub multi_connect: bool,
}

impl Port {
    /// Create a new input port
    pub fn input(name: impl Into<String>, port_type: PortType) -> Self {
        Self {
            id: PortId::new(),
            name: name.into(),
            direction: PortDirection::Input,
            port_type,
            default_value: None,
            multi_connect: false,
        }
    }

    /// Create a new output port
    pub fn output(name: impl Into<String>, port_type: PortType) -> Self {
        Self {
            id: PortId::new(),
            name: name.into(),
            direction: PortDirection::Output,
            port_type,
            default_value: None,
            multi_connect: true, // Outputs can have multiple connections by default
        }
    }

    /// Set the default value
    pub fn with_default(mut self, value: PortValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Give the port a fresh identity, keeping its definition.
    ///
    /// Node types hold template ports; every instantiated node needs its own IDs.
    pub fn instantiate(&self) -> Self {
        Self {
            id: PortId::new(),
            ..self.clone()
        }
    }

    /// Check if a connection to another port is valid
    pub fn can_connect(&self, other: &Port) -> bool {
        // Must be opposite directions
        if self.direction == other.direction {
            return false;
        }

        // Check type compatibility
        self.port_type.can_connect_to(&other.port_type)
    }
}

/// Value that can be stored in a port or node parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PortValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i32),
    /// Float
    Float(f32),
    /// 3D vector
    Vector([f32; 3]),
    /// Color
    Color([f32; 4]),
    /// String
    String(String),
}

impl PortValue {
    /// Get the port type for this value
    pub fn port_type(&self) -> PortType {
        match self {
            Self::Bool(_) => PortType::Bool,
            Self::Int(_) => PortType::Int,
            Self::Float(_) => PortType::Float,
            Self::Vector(_) => PortType::Vector,
            Self::Color(_) => PortType::Color,
            Self::String(_) => PortType::String,
        }
    }

    /// Read the value as a scalar, averaging vector/color channels
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Int(i) => Some(*i as f32),
            Self::Float(f) => Some(*f),
            Self::Vector(v) => Some((v[0] + v[1] + v[2]) / 3.0),
            Self::Color(c) => Some((c[0] + c[1] + c[2]) / 3.0),
            Self::String(_) => None,
        }
    }

    /// Read the value as an RGBA color, broadcasting scalars
    pub fn as_color(&self) -> Option<[f32; 4]> {
        match self {
            Self::Color(c) => Some(*c),
            Self::Vector(v) => Some([v[0], v[1], v[2], 1.0]),
            Self::Float(f) => Some([*f, *f, *f, 1.0]),
            Self::Int(i) => {
                let f = *i as f32;
                Some([f, f, f, 1.0])
            }
            Self::Bool(_) | Self::String(_) => None,
        }
    }

    /// Read the value as a 3D vector, broadcasting scalars
    pub fn as_vector(&self) -> Option<[f32; 3]> {
        match self {
            Self::Vector(v) => Some(*v),
            Self::Color(c) => Some([c[0], c[1], c[2]]),
            Self::Float(f) => Some([*f, *f, *f]),
            Self::Int(i) => {
                let f = *i as f32;
                Some([f, f, f])
            }
            Self::Bool(_) | Self::String(_) => None,
        }
    }

    /// Coerce the value into the given port type, if a sensible conversion exists
    pub fn coerce_to(&self, port_type: PortType) -> Option<PortValue> {
        match port_type {
            PortType::Float => self.as_float().map(Self::Float),
            // Texture pins take either an RGB value or a scalar
            PortType::Texture => match self {
                Self::Color(_) | Self::Vector(_) => self.as_color().map(Self::Color),
                _ => self.as_float().map(Self::Float),
            },
            PortType::Int => self.as_float().map(|f| Self::Int(f.round() as i32)),
            PortType::Bool => self.as_float().map(|f| Self::Bool(f > 0.5)),
            PortType::Vector | PortType::Transform | PortType::Projection => {
                self.as_vector().map(Self::Vector)
            }
            PortType::Color | PortType::Emission => self.as_color().map(Self::Color),
            PortType::String => match self {
                Self::String(s) => Some(Self::String(s.clone())),
                _ => None,
            },
            PortType::Any => Some(self.clone()),
            PortType::Shader | PortType::Medium => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implicit_conversions() {
        assert!(PortType::Float.can_connect_to(&PortType::Color));
        assert!(PortType::Color.can_connect_to(&PortType::Texture));
        assert!(PortType::Shader.can_connect_to(&PortType::Medium));
        assert!(!PortType::Shader.can_connect_to(&PortType::Color));
        assert!(!PortType::String.can_connect_to(&PortType::Float));
    }

    #[test]
    fn test_coerce_values() {
        let color = PortValue::Float(0.25).coerce_to(PortType::Color);
        assert_eq!(color, Some(PortValue::Color([0.25, 0.25, 0.25, 1.0])));

        // Texture inputs keep RGB values and take scalars as-is
        let rgb = PortValue::Color([0.0, 0.5, 1.0, 1.0]).coerce_to(PortType::Texture);
        assert_eq!(rgb, Some(PortValue::Color([0.0, 0.5, 1.0, 1.0])));
        let scalar = PortValue::Int(2).coerce_to(PortType::Texture);
        assert_eq!(scalar, Some(PortValue::Float(2.0)));

        assert_eq!(PortValue::String("x".into()).coerce_to(PortType::Float), None);
    }
}
