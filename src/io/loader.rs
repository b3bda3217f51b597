use bevy::asset::{
    AssetLoader,
    LoadContext,
    io::Reader,
};
use thiserror::Error;

use crate::io::{
    SplatFormat,
    SplatSource,
};


#[derive(Debug, Error)]
pub enum SplatSourceLoaderError {
    #[error("could not read splat source: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported splat extension `{0}`, expected one of splat, ply, spz, gcloud")]
    UnsupportedExtension(String),

    #[error("splat source is empty")]
    Empty,
}


#[derive(Default)]
pub struct SplatSourceLoader;

impl AssetLoader for SplatSourceLoader {
    type Asset = SplatSource;
    type Settings = ();
    type Error = SplatSourceLoaderError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let extension = load_context
            .path()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let format = SplatFormat::from_extension(&extension)
            .ok_or_else(|| SplatSourceLoaderError::UnsupportedExtension(extension.clone()))?;

        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;

        if bytes.is_empty() {
            return Err(SplatSourceLoaderError::Empty);
        }

        Ok(SplatSource {
            format,
            bytes,
        })
    }

    fn extensions(&self) -> &[&str] {
        &["splat", "ply", "spz", "gcloud"]
    }
}
