use bevy::{
    app::AppExit,
    color::palettes::css::GOLD,
    core_pipeline::tonemapping::Tonemapping,
    diagnostic::{
        DiagnosticsStore,
        FrameTimeDiagnosticsPlugin,
    },
    prelude::*,
};
use bevy_args::{
    BevyArgsPlugin,
    parse_args,
};
use bevy_inspector_egui::{
    bevy_egui::EguiPlugin,
    quick::WorldInspectorPlugin,
};
use bevy_panorbit_camera::{
    PanOrbitCamera,
    PanOrbitCameraPlugin,
};

use bevy_splat_carousel::{
    AssetRegistry,
    SplatCarouselPlugin,
    TrackingAnchor,
    utils::{
        SplatCarouselViewer,
        setup_hooks,
    },
};

#[cfg(feature = "simulated_runtime")]
use bevy_splat_carousel::xr::simulated::SimulatedHead;


fn setup_camera_rig(
    mut commands: Commands,
    config: Res<SplatCarouselViewer>,
) {
    let focus = Vec3::new(0.0, 0.0, -config.forward_offset);

    commands
        .spawn((
            TrackingAnchor::default(),
            Name::new("tracking_anchor"),
        ))
        .with_children(|rig| {
            #[allow(unused_mut, unused_variables)]
            let mut head = rig.spawn((
                Camera3d::default(),
                Tonemapping::None,
                Transform::from_xyz(0.0, 1.6, 0.0).looking_at(focus, Vec3::Y),
                PanOrbitCamera {
                    focus,
                    radius: Some(config.forward_offset.max(0.5)),
                    allow_upside_down: true,
                    ..default()
                },
                Name::new("head"),
            ));

            #[cfg(feature = "simulated_runtime")]
            head.insert(SimulatedHead);
        });

    info!("arrow keys or space cycle splats");
}


fn load_registry(config: &SplatCarouselViewer) -> AssetRegistry {
    let manifest = if config.manifest.is_empty() {
        None
    } else {
        match std::fs::read(&config.manifest) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                error!("could not read manifest {}: {err}", config.manifest);
                None
            },
        }
    };

    config
        .registry(manifest.as_deref())
        .unwrap_or_else(|err| {
            error!("{err}, falling back to the bundled library");
            AssetRegistry::default_library()
        })
}


fn viewer_app() {
    let config = parse_args::<SplatCarouselViewer>();
    let mut app = App::new();

    #[cfg(target_arch = "wasm32")]
    let primary_window = Some(Window {
        fit_canvas_to_parent: true,
        mode: bevy::window::WindowMode::Windowed,
        present_mode: bevy::window::PresentMode::AutoVsync,
        prevent_default_event_handling: true,
        title: config.name.clone(),
        ..default()
    });

    #[cfg(not(target_arch = "wasm32"))]
    let primary_window = Some(Window {
        fit_canvas_to_parent: true,
        mode: bevy::window::WindowMode::Windowed,
        present_mode: bevy::window::PresentMode::AutoVsync,
        prevent_default_event_handling: false,
        resolution: (config.width, config.height).into(),
        title: config.name.clone(),
        ..default()
    });

    #[cfg(feature = "file_asset")]
    app.add_plugins(bevy_file_asset::FileAssetPlugin);

    #[cfg(feature = "web_asset")]
    app.add_plugins(bevy_web_asset::WebAssetPlugin::default());

    app.insert_resource(ClearColor(Color::srgb_u8(0, 0, 0)));
    app.add_plugins(
        DefaultPlugins
        .set(ImagePlugin::default_nearest())
        .set(WindowPlugin {
            primary_window,
            ..default()
        }),
    );
    app.add_plugins(BevyArgsPlugin::<SplatCarouselViewer>::default());
    app.add_plugins(PanOrbitCameraPlugin);

    if config.editor {
        app.add_plugins(EguiPlugin {
            enable_multipass_for_primary_context: true,
        });
        app.add_plugins(WorldInspectorPlugin::new());
    }

    if config.press_esc_close {
        app.add_systems(Update, esc_close);
    }

    if config.show_fps {
        app.add_plugins(FrameTimeDiagnosticsPlugin::default());
        app.add_systems(Startup, fps_display_setup);
        app.add_systems(Update, fps_update_system);
    }

    app.insert_resource(load_registry(&config));
    app.insert_resource(config.carousel_settings());
    app.add_plugins(SplatCarouselPlugin);
    app.add_systems(Startup, setup_camera_rig);

    app.run();
}


pub fn esc_close(
    keys: Res<ButtonInput<KeyCode>>,
    mut exit: EventWriter<AppExit>,
) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}

fn fps_display_setup(mut commands: Commands) {
    commands
        .spawn((
            Text::new("fps: "),
            TextFont {
                font_size: 60.0,
                ..default()
            },
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(5.0),
                left: Val::Px(15.0),
                ..default()
            },
        ))
        .with_child((
            TextSpan::default(),
            TextFont {
                font_size: 60.0,
                ..default()
            },
            TextColor(GOLD.into()),
            FpsText,
        ));
}

#[derive(Component)]
struct FpsText;

fn fps_update_system(
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<&mut TextSpan, With<FpsText>>,
) {
    for mut text in &mut query {
        if let Some(fps) = diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS) {
            if let Some(value) = fps.smoothed() {
                **text = format!("{value:.2}");
            }
        }
    }
}


pub fn main() {
    setup_hooks();
    viewer_app();
}
