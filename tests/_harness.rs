#![allow(dead_code)]

use std::{
    path::PathBuf,
    time::Duration,
};

use bevy::{
    asset::AssetPlugin,
    prelude::*,
};

use bevy_splat_carousel::{
    AssetRegistry,
    CarouselSettings,
    SplatCarouselPlugin,
};


// windowless app: the carousel only needs assets, time and events
pub struct TestHarness {
    pub registry: AssetRegistry,
    pub settings: CarouselSettings,
    pub asset_root: Option<PathBuf>,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self {
            registry: AssetRegistry::default(),
            settings: CarouselSettings::default(),
            asset_root: None,
        }
    }
}

pub fn test_harness_app(harness: TestHarness) -> App {
    let mut app = App::new();

    let asset_plugin = match &harness.asset_root {
        Some(root) => AssetPlugin {
            file_path: root.to_string_lossy().to_string(),
            ..default()
        },
        None => AssetPlugin::default(),
    };

    app.add_plugins((MinimalPlugins, asset_plugin));

    app.insert_resource(harness.registry);
    app.insert_resource(harness.settings);
    app.add_plugins(SplatCarouselPlugin);

    app.finish();
    app.cleanup();

    app
}

/// Steps the app until `done` holds, giving async asset loads time to land.
pub fn update_until(
    app: &mut App,
    mut done: impl FnMut(&mut World) -> bool,
) -> bool {
    for _ in 0..2000 {
        app.update();
        if done(app.world_mut()) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }

    false
}

/// Writes `files` into a fresh directory under the system temp dir.
pub fn temp_asset_root(
    name: &str,
    files: &[(&str, &[u8])],
) -> PathBuf {
    let root = std::env::temp_dir().join(format!(
        "bevy_splat_carousel_{name}_{}",
        std::process::id(),
    ));
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(&root).unwrap();

    for (file, bytes) in files {
        std::fs::write(root.join(file), bytes).unwrap();
    }

    root
}
