//! JSON rig configuration.

use crate::PipelineError;
use birdseye_core::{LayoutParams, PointQuad};
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

/// Mounting position of a camera on the vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPosition {
    Front,
    Back,
    Left,
    Right,
}

impl CameraPosition {
    pub const ALL: [CameraPosition; 4] = [Self::Front, Self::Back, Self::Left, Self::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for CameraPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One camera: its image and the ground quad picked in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub image_path: String,
    pub points: PointQuad,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigCameras {
    pub front: CameraConfig,
    pub back: CameraConfig,
    pub left: CameraConfig,
    pub right: CameraConfig,
}

impl RigCameras {
    pub fn get(&self, pos: CameraPosition) -> &CameraConfig {
        match pos {
            CameraPosition::Front => &self.front,
            CameraPosition::Back => &self.back,
            CameraPosition::Left => &self.left,
            CameraPosition::Right => &self.right,
        }
    }
}

fn default_patch_size() -> usize {
    400
}

/// Configuration of a four-camera surround rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigConfig {
    #[serde(default = "default_patch_size")]
    pub patch_width: usize,
    #[serde(default = "default_patch_size")]
    pub patch_height: usize,
    #[serde(default)]
    pub layout: LayoutParams,
    pub cameras: RigCameras,
    #[serde(default)]
    pub vehicle_icon_path: Option<String>,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub report_path: Option<String>,
    /// Directory for the individual rectified patches, if wanted.
    #[serde(default)]
    pub patch_dir: Option<String>,
}

impl RigConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PipelineError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the composite output path against `base_dir`.
    pub fn output_path(&self, base_dir: &Path) -> PathBuf {
        resolve_path(
            base_dir,
            self.output_path.as_deref().unwrap_or("birds_eye_view.png"),
        )
    }

    pub fn report_path(&self, base_dir: &Path) -> Option<PathBuf> {
        self.report_path.as_deref().map(|p| resolve_path(base_dir, p))
    }

    pub fn patch_dir(&self, base_dir: &Path) -> Option<PathBuf> {
        self.patch_dir.as_deref().map(|p| resolve_path(base_dir, p))
    }

    pub fn image_path(&self, pos: CameraPosition, base_dir: &Path) -> PathBuf {
        resolve_path(base_dir, &self.cameras.get(pos).image_path)
    }
}

/// Join relative paths onto `base_dir`; absolute paths pass through.
pub fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RIG_JSON: &str = r#"{
        "cameras": {
            "front": { "image_path": "front.jpeg", "points": [[470,377],[838,387],[1158,557],[10,524]] },
            "back":  { "image_path": "back.jpeg",  "points": [[215,114],[1049,114],[1126,687],[122,683]] },
            "left":  { "image_path": "left.jpeg",  "points": [[360,372],[991,352],[1278,708],[75,704]] },
            "right": { "image_path": "/abs/right.jpeg", "points": [[335,386],[956,366],[1277,715],[41,713]] }
        }
    }"#;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg: RigConfig = serde_json::from_str(RIG_JSON).expect("parse");
        assert_eq!((cfg.patch_width, cfg.patch_height), (400, 400));
        assert_eq!(cfg.layout, LayoutParams::default());
        assert_eq!(
            cfg.cameras.back.points,
            PointQuad::from_array([[215.0, 114.0], [1049.0, 114.0], [1126.0, 687.0], [122.0, 683.0]])
        );
        let base = Path::new("/rig");
        assert_eq!(cfg.output_path(base), PathBuf::from("/rig/birds_eye_view.png"));
        assert!(cfg.report_path(base).is_none());
    }

    #[test]
    fn image_paths_resolve_against_base() {
        let cfg: RigConfig = serde_json::from_str(RIG_JSON).expect("parse");
        let base = Path::new("/rig");
        assert_eq!(
            cfg.image_path(CameraPosition::Front, base),
            PathBuf::from("/rig/front.jpeg")
        );
        assert_eq!(
            cfg.image_path(CameraPosition::Right, base),
            PathBuf::from("/abs/right.jpeg")
        );
    }

    #[test]
    fn positions_serialize_lowercase() {
        let json = serde_json::to_string(&CameraPosition::Left).expect("serialize");
        assert_eq!(json, "\"left\"");
        assert_eq!(CameraPosition::Back.to_string(), "back");
    }
}
