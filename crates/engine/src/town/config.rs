use serde::Deserialize;
use thiserror::Error;

use super::geometry::Size;
use super::interaction::InteractionRanges;

pub const CAMERA_ZOOM_DEFAULT: f32 = 1.0;
pub const CAMERA_ZOOM_MIN: f32 = 0.5;
pub const CAMERA_ZOOM_MAX: f32 = 2.0;
pub const CAMERA_ZOOM_STEP: f32 = 0.1;

/// Tunable constants for movement, camera and interaction.
///
/// Speeds are pixels per tick. The tick driver runs at a fixed rate, so a
/// slower frame rate slows the actor down instead of making it jump.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub move_speed: f32,
    pub camera_pan_speed: f32,
    pub recenter_rate: f32,
    pub recenter_threshold: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub zoom_step: f32,
    pub zoom_default: f32,
    pub house_range: f32,
    pub object_range: f32,
    pub actor_width: f32,
    pub actor_height: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            move_speed: 4.0,
            camera_pan_speed: 8.0,
            recenter_rate: 0.1,
            recenter_threshold: 1.0,
            zoom_min: CAMERA_ZOOM_MIN,
            zoom_max: CAMERA_ZOOM_MAX,
            zoom_step: CAMERA_ZOOM_STEP,
            zoom_default: CAMERA_ZOOM_DEFAULT,
            house_range: 64.0,
            object_range: 80.0,
            actor_width: 32.0,
            actor_height: 32.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub default: f32,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineConfigError {
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f32 },
    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("recenter_rate must be in (0, 1], got {value}")]
    RecenterRateOutOfRange { value: f32 },
    #[error("zoom limits must satisfy zoom_min <= zoom_default <= zoom_max, got {min} <= {default} <= {max}")]
    ZoomRange { min: f32, default: f32, max: f32 },
}

impl EngineConfig {
    pub fn actor_size(&self) -> Size {
        Size::new(self.actor_width, self.actor_height)
    }

    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits {
            min: self.zoom_min,
            max: self.zoom_max,
            step: self.zoom_step,
            default: self.zoom_default,
        }
    }

    pub fn interaction_ranges(&self) -> InteractionRanges {
        InteractionRanges {
            house: self.house_range,
            object: self.object_range,
        }
    }

    pub fn validate(&self) -> Result<(), EngineConfigError> {
        let fields = [
            ("move_speed", self.move_speed),
            ("camera_pan_speed", self.camera_pan_speed),
            ("recenter_rate", self.recenter_rate),
            ("recenter_threshold", self.recenter_threshold),
            ("zoom_min", self.zoom_min),
            ("zoom_max", self.zoom_max),
            ("zoom_step", self.zoom_step),
            ("zoom_default", self.zoom_default),
            ("house_range", self.house_range),
            ("object_range", self.object_range),
            ("actor_width", self.actor_width),
            ("actor_height", self.actor_height),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(EngineConfigError::NonFinite { field, value });
            }
        }

        for (field, value) in [
            ("move_speed", self.move_speed),
            ("camera_pan_speed", self.camera_pan_speed),
            ("recenter_threshold", self.recenter_threshold),
        ] {
            if value < 0.0 {
                return Err(EngineConfigError::Negative { field, value });
            }
        }

        for (field, value) in [
            ("zoom_min", self.zoom_min),
            ("zoom_step", self.zoom_step),
            ("house_range", self.house_range),
            ("object_range", self.object_range),
            ("actor_width", self.actor_width),
            ("actor_height", self.actor_height),
        ] {
            if value <= 0.0 {
                return Err(EngineConfigError::NotPositive { field, value });
            }
        }

        if self.recenter_rate <= 0.0 || self.recenter_rate > 1.0 {
            return Err(EngineConfigError::RecenterRateOutOfRange {
                value: self.recenter_rate,
            });
        }

        if !(self.zoom_min <= self.zoom_default && self.zoom_default <= self.zoom_max) {
            return Err(EngineConfigError::ZoomRange {
                min: self.zoom_min,
                default: self.zoom_default,
                max: self.zoom_max,
            });
        }

        Ok(())
    }
}
