//! Configuration options for speculo.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Resolutions of the mirror subsystem's off-screen targets.
///
/// Mask and reflection resolutions may differ; when they do, each target
/// gets its own depth allocation (both still created once, at construction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Width of the plane-ID mask target.
    pub mask_width: u32,
    /// Height of the plane-ID mask target.
    pub mask_height: u32,
    /// Width of the reflection color target.
    pub reflect_width: u32,
    /// Height of the reflection color target.
    pub reflect_height: u32,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            mask_width: 800,
            mask_height: 600,
            reflect_width: 800,
            reflect_height: 600,
        }
    }
}

impl MirrorConfig {
    /// Whether both targets share one resolution (and thus one depth buffer).
    pub fn shared_depth(&self) -> bool {
        self.mask_width == self.reflect_width && self.mask_height == self.reflect_height
    }
}

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Options {
    /// Initial window width in logical pixels.
    pub window_width: u32,

    /// Initial window height in logical pixels.
    pub window_height: u32,

    /// Window title.
    pub title: String,

    /// Background clear color.
    pub background_color: Vec3,

    /// Whether presentation waits for vertical sync.
    pub vsync: bool,

    /// Mirror target resolutions.
    pub mirror: MirrorConfig,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 600,
            title: "speculo".to_string(),
            background_color: Vec3::splat(0.35),
            vsync: true,
            mirror: MirrorConfig::default(),
        }
    }
}

impl Options {
    /// Parses options from a JSON string.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes options to pretty-printed JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference() {
        let options = Options::default();
        assert_eq!(options.window_width, 800);
        assert_eq!(options.window_height, 600);
        assert_eq!(options.mirror, MirrorConfig::default());
        assert!(options.mirror.shared_depth());
    }

    #[test]
    fn test_json_round_trip() {
        let mut options = Options::default();
        options.mirror.reflect_width = 1024;
        options.mirror.reflect_height = 768;

        let json = options.to_json().unwrap();
        let parsed = Options::from_json(&json).unwrap();
        assert_eq!(parsed.mirror.reflect_width, 1024);
        assert!(!parsed.mirror.shared_depth());
    }
}
