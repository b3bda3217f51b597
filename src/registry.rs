use std::path::Path;

use bevy::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};

use crate::error::CarouselError;


pub const DEFAULT_LIBRARY: [&str; 5] = [
    "gs_Peter.splat",
    "gs_Dead_Christ.splat",
    "gs_TheseusAndMinotaurLuma.splat",
    "gs_Elephant.splat",
    "gs_Eistiens.splat",
];


#[derive(
    Clone,
    Debug,
    Eq,
    Hash,
    PartialEq,
    Reflect,
    Serialize,
    Deserialize,
)]
pub struct AssetDescriptor {
    pub id: String,
    pub source_uri: String,
    pub order: usize,
}

impl AssetDescriptor {
    pub fn from_uri(source_uri: impl Into<String>, order: usize) -> Self {
        let source_uri = source_uri.into();
        let id = Path::new(&source_uri)
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| format!("splat_{order}"));

        Self {
            id,
            source_uri,
            order,
        }
    }
}


#[derive(Debug, Deserialize)]
struct Manifest {
    assets: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    id: Option<String>,
    source_uri: String,
    order: Option<usize>,
}


/// Ordered, immutable library of splat sources. Order defines the cycle sequence.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct AssetRegistry {
    descriptors: Vec<AssetDescriptor>,
}

impl AssetRegistry {
    pub fn new(mut descriptors: Vec<AssetDescriptor>) -> Self {
        descriptors.sort_by_key(|descriptor| descriptor.order);
        Self { descriptors }
    }

    pub fn from_uris<I, S>(uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let descriptors = uris
            .into_iter()
            .enumerate()
            .map(|(order, uri)| AssetDescriptor::from_uri(uri, order))
            .collect();

        Self::new(descriptors)
    }

    pub fn default_library() -> Self {
        Self::from_uris(DEFAULT_LIBRARY)
    }

    /// entries without an explicit `order` keep their manifest position
    pub fn from_json(bytes: &[u8]) -> Result<Self, CarouselError> {
        let manifest: Manifest = serde_json::from_slice(bytes)
            .map_err(|err| CarouselError::InvalidManifest(err.to_string()))?;

        let descriptors = manifest.assets
            .into_iter()
            .enumerate()
            .map(|(position, entry)| {
                let order = entry.order.unwrap_or(position);
                let mut descriptor = AssetDescriptor::from_uri(entry.source_uri, order);
                if let Some(id) = entry.id {
                    descriptor.id = id;
                }
                descriptor
            })
            .collect();

        Ok(Self::new(descriptors))
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AssetDescriptor> {
        self.descriptors.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetDescriptor> {
        self.descriptors.iter()
    }
}
