use bevy::prelude::*;

pub mod loader;

pub use loader::{
    SplatSourceLoader,
    SplatSourceLoaderError,
};


#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    Reflect,
)]
pub enum SplatFormat {
    Splat,
    Ply,
    Spz,
    Gcloud,
}

impl SplatFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "splat" => Some(Self::Splat),
            "ply" => Some(Self::Ply),
            "spz" => Some(Self::Spz),
            "gcloud" => Some(Self::Gcloud),
            _ => None,
        }
    }
}


// decoding is left to the splat renderer, the carousel only moves bytes around
#[derive(Asset, Clone, Debug, TypePath)]
pub struct SplatSource {
    pub format: SplatFormat,
    pub bytes: Vec<u8>,
}


#[derive(Component, Clone, Debug, Default, Reflect)]
#[require(Transform, Visibility)]
pub struct SplatSourceHandle(pub Handle<SplatSource>);


#[derive(Default)]
pub struct SplatIoPlugin;

impl Plugin for SplatIoPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<SplatSource>();
        app.init_asset_loader::<SplatSourceLoader>();

        app.register_type::<SplatSourceHandle>();
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_map_to_formats() {
        assert_eq!(SplatFormat::from_extension("splat"), Some(SplatFormat::Splat));
        assert_eq!(SplatFormat::from_extension("gcloud"), Some(SplatFormat::Gcloud));
        assert_eq!(SplatFormat::from_extension("glb"), None);
    }
}
