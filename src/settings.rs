use std::f32::consts::PI;

use bevy::prelude::*;

use crate::lifecycle::ResidencyPolicy;


#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct HapticSettings {
    pub intensity: f32,
    pub duration_ms: u32,
}

impl Default for HapticSettings {
    fn default() -> Self {
        Self {
            intensity: 0.5,
            duration_ms: 40,
        }
    }
}


#[derive(Resource, Clone, Debug, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct CarouselSettings {
    pub residency: ResidencyPolicy,

    /// distance in front of the tracking origin the splat is placed at
    pub forward_offset: f32,

    /// splat files are authored upside down relative to bevy's y-up
    pub flip_x: bool,

    pub stabilization_threshold: f32,
    pub haptics: HapticSettings,
}

impl Default for CarouselSettings {
    fn default() -> Self {
        Self {
            residency: ResidencyPolicy::default(),
            forward_offset: 2.0,
            flip_x: true,
            stabilization_threshold: 0.25,
            haptics: HapticSettings::default(),
        }
    }
}

impl CarouselSettings {
    pub fn anchor_transform(&self) -> Transform {
        let rotation = if self.flip_x {
            Quat::from_rotation_x(PI)
        } else {
            Quat::IDENTITY
        };

        Transform::from_xyz(0.0, 0.0, -self.forward_offset)
            .with_rotation(rotation)
    }
}
