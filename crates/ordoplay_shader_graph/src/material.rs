// SPDX-License-Identifier: MIT OR Apache-2.0
//! Materials: named node graphs owned by a scene.

use crate::graph::Graph;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Current on-disk format version for materials
pub const MATERIAL_FORMAT_VERSION: u32 = 2;

/// Unique identifier for a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub Uuid);

impl MaterialId {
    /// Create a new random material ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MaterialId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MaterialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A material and its node graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    /// Format version
    #[serde(default = "default_version")]
    pub version: u32,
    /// Unique material ID
    pub id: MaterialId,
    /// Material name
    pub name: String,
    /// Node graph
    pub graph: Graph,
}

fn default_version() -> u32 {
    MATERIAL_FORMAT_VERSION
}

impl Material {
    /// Create an empty material
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            version: MATERIAL_FORMAT_VERSION,
            id: MaterialId::new(),
            graph: Graph::new(name.clone()),
            name,
        }
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, MaterialError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(self, config).map_err(|e| MaterialError::Format(e.to_string()))
    }

    /// Parse from RON, rejecting newer format versions
    pub fn from_ron(content: &str) -> Result<Self, MaterialError> {
        let material: Material =
            ron::from_str(content).map_err(|e| MaterialError::Format(e.to_string()))?;
        if material.version > MATERIAL_FORMAT_VERSION {
            return Err(MaterialError::UnsupportedVersion(material.version));
        }
        Ok(material)
    }

    /// Load a material from a RON file
    pub fn load(path: &Path) -> Result<Self, MaterialError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Save the material to a RON file
    pub fn save(&self, path: &Path) -> Result<(), MaterialError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

/// Error reading or writing a material
#[derive(Debug, thiserror::Error)]
pub enum MaterialError {
    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed content
    #[error("Invalid material data: {0}")]
    Format(String),

    /// Written by a newer version
    #[error("Material version {0} is newer than supported version {MATERIAL_FORMAT_VERSION}")]
    UnsupportedVersion(u32),
}
