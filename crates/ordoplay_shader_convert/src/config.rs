// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversion settings, stored as RON.

use crate::kind::PassthroughFamily;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Which passthrough families are elided during snapshot.
///
/// Routing constructs (reroutes, groups, frames) are always flattened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenPolicy {
    /// Separate/combine colour, RGB and XYZ
    pub channels: bool,
    /// Hue/saturation, brightness/contrast, gamma, curves, RGB to BW
    pub color_adjust: bool,
    /// Math and vector math
    pub math: bool,
    /// Map range and clamp
    pub range: bool,
    /// Geometry and light path info
    pub geometry_info: bool,
}

impl Default for FlattenPolicy {
    fn default() -> Self {
        Self {
            channels: true,
            color_adjust: true,
            math: true,
            range: true,
            geometry_info: true,
        }
    }
}

impl FlattenPolicy {
    /// Keep every optional family as real nodes
    pub fn preserve_all() -> Self {
        Self {
            channels: false,
            color_adjust: false,
            math: false,
            range: false,
            geometry_info: false,
        }
    }

    /// Whether nodes of this family are elided
    pub fn flattens(&self, family: PassthroughFamily) -> bool {
        match family {
            PassthroughFamily::Routing => true,
            PassthroughFamily::Channels => self.channels,
            PassthroughFamily::ColorAdjust => self.color_adjust,
            PassthroughFamily::Math => self.math,
            PassthroughFamily::Range => self.range,
            PassthroughFamily::GeometryInfo => self.geometry_info,
        }
    }
}

/// Settings that steer a conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionSettings {
    /// Format version
    pub version: u32,
    /// Gamma used when a request does not name one
    pub default_gamma: f32,
    /// Transmission above this switches materials into specular mode
    pub transmission_threshold: f32,
    /// Object scale components within this distance of 1 are left alone
    pub scale_tolerance: f32,
    /// Passthrough elision
    pub flatten: FlattenPolicy,
    /// Insert texture-emission helpers where emission is wired directly
    pub insert_emission_helpers: bool,
    /// Merge absorption and scatter media into one node
    pub merge_volumes: bool,
    /// Enable fake shadows on transmissive materials
    pub fake_shadows_for_transmission: bool,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            default_gamma: 2.2,
            transmission_threshold: 0.5,
            scale_tolerance: 0.001,
            flatten: FlattenPolicy::default(),
            insert_emission_helpers: true,
            merge_volumes: true,
            fake_shadows_for_transmission: true,
        }
    }
}

impl ConversionSettings {
    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let settings: ConversionSettings =
            ron::from_str(&content).map_err(|e| SettingsError::Parse(e.to_string()))?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::UnsupportedVersion(settings.version));
        }

        Ok(settings)
    }

    /// Save settings to a RON file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config)
            .map_err(|e| SettingsError::Parse(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Failure loading or saving settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed RON
    #[error("Invalid settings: {0}")]
    Parse(String),

    /// Written by a newer version
    #[error("Settings version {0} is newer than supported version {SETTINGS_FORMAT_VERSION}")]
    UnsupportedVersion(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.ron");

        let mut settings = ConversionSettings::default();
        settings.default_gamma = 1.8;
        settings.flatten.math = false;
        settings.save(&path).unwrap();

        let loaded = ConversionSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings: ConversionSettings = ron::from_str("(merge_volumes: false)").unwrap();
        assert!(!settings.merge_volumes);
        assert_eq!(settings.default_gamma, 2.2);
        assert!(settings.flatten.flattens(PassthroughFamily::Routing));
    }

    #[test]
    fn test_preserve_all_keeps_routing_flattened() {
        let policy = FlattenPolicy::preserve_all();
        assert!(policy.flattens(PassthroughFamily::Routing));
        assert!(!policy.flattens(PassthroughFamily::Math));
    }
}
