use bevy::prelude::*;
use bevy_args::{
    Deserialize,
    Parser,
    Serialize,
};

use crate::{
    error::CarouselError,
    lifecycle::ResidencyPolicy,
    registry::AssetRegistry,
    settings::{
        CarouselSettings,
        HapticSettings,
    },
};


#[derive(
    Clone,
    Debug,
    Resource,
    Serialize,
    Deserialize,
    Parser,
)]
#[command(about = "bevy_splat_carousel viewer", version, long_about = None)]
pub struct SplatCarouselViewer {
    #[arg(long, default_value = "false")]
    pub editor: bool,

    #[arg(long, default_value = "true")]
    pub press_esc_close: bool,

    #[arg(long, default_value = "true")]
    pub show_fps: bool,

    #[arg(long, default_value = "1920.0")]
    pub width: f32,

    #[arg(long, default_value = "1080.0")]
    pub height: f32,

    #[arg(long, default_value = "bevy_splat_carousel")]
    pub name: String,

    /// splat sources in cycle order, defaults to the bundled library
    #[arg(long = "splat", value_delimiter = ',')]
    pub splats: Vec<String>,

    /// json manifest, takes precedence over --splat
    #[arg(long, default_value = "")]
    pub manifest: String,

    #[arg(long, value_enum, default_value_t = ResidencyPolicy::OnDemand)]
    pub residency: ResidencyPolicy,

    #[arg(long, default_value = "2.0")]
    pub forward_offset: f32,

    #[arg(long, default_value = "0.25")]
    pub stabilization_threshold: f32,

    #[arg(long, default_value = "0.5")]
    pub haptic_intensity: f32,

    #[arg(long, default_value = "40")]
    pub haptic_duration_ms: u32,
}

impl Default for SplatCarouselViewer {
    fn default() -> SplatCarouselViewer {
        SplatCarouselViewer {
            editor: false,
            press_esc_close: true,
            show_fps: true,
            width: 1920.0,
            height: 1080.0,
            name: "bevy_splat_carousel".to_string(),
            splats: Vec::new(),
            manifest: "".to_string(),
            residency: ResidencyPolicy::OnDemand,
            forward_offset: 2.0,
            stabilization_threshold: 0.25,
            haptic_intensity: 0.5,
            haptic_duration_ms: 40,
        }
    }
}

impl SplatCarouselViewer {
    pub fn carousel_settings(&self) -> CarouselSettings {
        CarouselSettings {
            residency: self.residency,
            forward_offset: self.forward_offset,
            stabilization_threshold: self.stabilization_threshold,
            haptics: HapticSettings {
                intensity: self.haptic_intensity,
                duration_ms: self.haptic_duration_ms,
            },
            ..default()
        }
    }

    /// `manifest_bytes` is the content of `--manifest` when one was given
    pub fn registry(&self, manifest_bytes: Option<&[u8]>) -> Result<AssetRegistry, CarouselError> {
        if let Some(bytes) = manifest_bytes {
            return AssetRegistry::from_json(bytes);
        }

        if self.splats.is_empty() {
            return Ok(AssetRegistry::default_library());
        }

        Ok(AssetRegistry::from_uris(self.splats.iter().cloned()))
    }
}


pub fn setup_hooks() {
    #[cfg(debug_assertions)]
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
    }
}
