// config.rs - Scene parameters with optional JSON overrides
use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraParams {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Downward tilt of the camera, radians
    pub rotation_x: f32,
    pub height: f32,
    pub z: f32,
    /// Travel per key-down event
    pub walk_speed: f32,
    /// Radians of rotation per pixel of pointer offset from the viewport center
    pub look_sensitivity: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            fov: 45.0,
            near: 0.1,
            far: 300.0,
            rotation_x: -0.2,
            height: 3.0,
            z: 20.0,
            walk_speed: 0.06,
            look_sensitivity: 0.001,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RoadParams {
    pub width: f32,
    pub length: f32,
    pub rotation_x: f32,
    pub color: [f32; 3],
}

impl Default for RoadParams {
    fn default() -> Self {
        Self {
            width: 4.0,
            length: 100.0,
            rotation_x: -std::f32::consts::FRAC_PI_2,
            color: hex_rgb(0xb9d5ff),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StarParams {
    pub count: usize,
    pub size: f32,
    /// Fraction of the camera far plane used as the maximum star radius
    pub radius_fraction: f32,
    /// Starfield spin around the travel axis, radians per second
    pub spin_rate: f32,
    pub texture: String,
}

impl Default for StarParams {
    fn default() -> Self {
        Self {
            count: 3000,
            size: 0.5,
            radius_fraction: 0.5,
            spin_rate: 0.1,
            texture: "assets/textures/particles/1.png".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RingParams {
    pub thickness: f32,
    /// Gap between the road edge and the ring's inner radius
    pub clearance: f32,
    pub initial_segments: u32,
    pub segment_candidates: Vec<u32>,
    pub initial_z: f32,
    pub reset_z: f32,
    /// Spin around the ring's own axis, radians per second (negative is clockwise)
    pub spin_rate: f32,
    pub color: [f32; 3],
}

impl Default for RingParams {
    fn default() -> Self {
        Self {
            thickness: 0.2,
            clearance: 3.0,
            initial_segments: 40,
            segment_candidates: vec![3, 4, 5, 6, 8, 40],
            initial_z: 40.0,
            reset_z: 20.0,
            spin_rate: -0.3,
            color: hex_rgb(0xe89535),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightParams {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub point_color: [f32; 3],
    pub point_intensity: f32,
    /// Distance at which the point light reaches zero
    pub point_range: f32,
    pub point_decay: f32,
    pub point_position: [f32; 3],
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            ambient_color: hex_rgb(0xb9d5ff),
            ambient_intensity: 0.12,
            point_color: [1.0, 1.0, 1.0],
            point_intensity: 0.4,
            point_range: 10.0,
            point_decay: 2.0,
            point_position: [0.0, 4.0, 20.0],
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationParams {
    /// Whole seconds between gate openings
    pub period: u64,
    /// Ring travel per frame while advancing
    pub step: f32,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self { period: 7, step: 0.2 }
    }
}

/// Every numeric constant of the scene. Defaults give the stock look.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneParams {
    pub camera: CameraParams,
    pub road: RoadParams,
    pub stars: StarParams,
    pub ring: RingParams,
    pub lights: LightParams,
    pub animation: AnimationParams,
    pub clear_color: [f32; 3],
}

impl SceneParams {
    /// Load overrides from a JSON file; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let params = Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ring.segment_candidates.is_empty() {
            return Err(invalid("ring.segment_candidates", "must not be empty"));
        }
        if let Some(&bad) = self
            .ring
            .segment_candidates
            .iter()
            .chain(std::iter::once(&self.ring.initial_segments))
            .find(|&&n| n < 3)
        {
            return Err(invalid(
                "ring.segment_candidates",
                format!("segment count {bad} is below 3"),
            ));
        }
        if self.animation.period == 0 {
            return Err(invalid("animation.period", "must be at least one second"));
        }
        if self.animation.step <= 0.0 {
            return Err(invalid("animation.step", "must be positive"));
        }
        if self.road.length <= 0.0 {
            return Err(invalid("road.length", "must be positive"));
        }
        for (field, z) in [("ring.reset_z", self.ring.reset_z), ("ring.initial_z", self.ring.initial_z)] {
            if z < self.recycle_threshold() {
                return Err(invalid(
                    field,
                    format!("{z} is past the recycle threshold {}", self.recycle_threshold()),
                ));
            }
        }
        if self.camera.near <= 0.0 || self.camera.near >= self.camera.far {
            return Err(invalid("camera.near", "must satisfy 0 < near < far"));
        }
        Ok(())
    }

    /// Inner radius of the ring: road width plus clearance
    pub fn ring_inner_radius(&self) -> f32 {
        self.road.width + self.ring.clearance
    }

    /// Ring position below which the ring is recycled
    pub fn recycle_threshold(&self) -> f32 {
        -self.road.length
    }
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            camera: CameraParams::default(),
            road: RoadParams::default(),
            stars: StarParams::default(),
            ring: RingParams::default(),
            lights: LightParams::default(),
            animation: AnimationParams::default(),
            clear_color: hex_rgb(0x19262e),
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Split 0xRRGGBB into sRGB [r, g, b] in 0..1
pub fn hex_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}
