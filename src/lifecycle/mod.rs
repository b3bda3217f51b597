use bevy::{
    app::AppExit,
    prelude::*,
};
use clap::ValueEnum;
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    driver::CarouselSet,
    input::{
        CycleApplied,
        CycleRequest,
    },
    registry::AssetRegistry,
    settings::CarouselSettings,
};

pub mod backend;
pub mod manager;

pub use backend::{
    CarouselSplat,
    EcsSplatBackend,
    LoadStatus,
    SplatBackend,
    SplatRenderRoot,
};
pub use manager::{
    AssetPool,
    CycleState,
    LifecycleEvent,
    LifecycleManager,
    PendingLoad,
    PoolMember,
    PoolMemberState,
    ResidentAsset,
};


#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
    Reflect,
)]
pub struct LoadGeneration(pub u64);

impl LoadGeneration {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}


#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    Reflect,
    Serialize,
    Deserialize,
    ValueEnum,
)]
pub enum ResidencyPolicy {
    /// one splat resident, load on every cycle
    #[default]
    OnDemand,
    /// every splat loaded at startup, cycling flips visibility
    Preloaded,
}


/// `((index + delta) mod len + len) mod len`, without overflowing for any `delta`.
pub fn wrap_index(index: usize, delta: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }

    let len = len as i64;
    let index = index as i64 % len;

    (index + delta % len).rem_euclid(len) as usize
}


#[derive(Resource, Debug, Default, Deref, DerefMut)]
pub struct SplatCarousel(pub LifecycleManager<Entity>);


#[derive(Event, Clone, Debug, PartialEq)]
pub struct SplatLoadEvent(pub LifecycleEvent);


#[derive(Default)]
pub struct LifecyclePlugin;

impl Plugin for LifecyclePlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<SplatRenderRoot>();
        app.register_type::<CarouselSplat>();

        app.init_resource::<AssetRegistry>();
        app.init_resource::<SplatCarousel>();
        app.add_event::<SplatLoadEvent>();

        app.add_systems(Startup, (spawn_render_root, start_carousel).chain());
        app.add_systems(
            Update,
            (
                apply_cycle_requests,
                poll_splat_loads,
            )
                .chain()
                .in_set(CarouselSet::Lifecycle),
        );
        app.add_systems(Last, dispose_on_exit);
    }
}


fn spawn_render_root(
    mut commands: Commands,
    roots: Query<(), With<SplatRenderRoot>>,
) {
    if roots.is_empty() {
        commands.spawn((
            SplatRenderRoot,
            Name::new("splat_render_root"),
        ));
    }
}

fn start_carousel(
    settings: Res<CarouselSettings>,
    registry: Res<AssetRegistry>,
    mut carousel: ResMut<SplatCarousel>,
    mut backend: EcsSplatBackend,
) {
    if carousel.is_started() {
        return;
    }

    carousel.0 = LifecycleManager::new(settings.residency, settings.anchor_transform());
    carousel.start(&registry, &mut backend);

    info!(
        "splat carousel started with {} splats ({:?} residency)",
        registry.len(),
        settings.residency,
    );
}

fn apply_cycle_requests(
    mut requests: EventReader<CycleRequest>,
    mut applied: EventWriter<CycleApplied>,
    registry: Res<AssetRegistry>,
    mut carousel: ResMut<SplatCarousel>,
    mut backend: EcsSplatBackend,
) {
    for request in requests.read() {
        let Some(index) = carousel.cycle(request.delta, &registry, &mut backend) else {
            continue;
        };

        if let Some(descriptor) = registry.get(index) {
            info!("cycling to splat `{}` ({}/{})", descriptor.id, index + 1, registry.len());
        }

        applied.write(CycleApplied {
            origin: request.origin,
            index,
        });
    }
}

fn poll_splat_loads(
    registry: Res<AssetRegistry>,
    mut carousel: ResMut<SplatCarousel>,
    mut backend: EcsSplatBackend,
    mut load_events: EventWriter<SplatLoadEvent>,
) {
    if !carousel.has_in_flight() {
        return;
    }

    for event in carousel.poll(&registry, &mut backend) {
        match &event {
            LifecycleEvent::Attached { index } => {
                if let Some(descriptor) = registry.get(*index) {
                    info!("attached splat `{}`", descriptor.id);
                }
            },
            LifecycleEvent::Failed { error, .. } => warn!("{error}"),
            LifecycleEvent::Discarded { error, .. } => debug!("{error}"),
        }

        load_events.write(SplatLoadEvent(event));
    }
}

fn dispose_on_exit(
    mut exit: EventReader<AppExit>,
    mut carousel: ResMut<SplatCarousel>,
    mut backend: EcsSplatBackend,
) {
    if exit.read().next().is_none() {
        return;
    }

    carousel.dispose_all(&mut backend);
}
