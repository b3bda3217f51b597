use bevy::{
    asset::LoadState,
    ecs::system::SystemParam,
    prelude::*,
};

use crate::{
    io::{
        SplatSource,
        SplatSourceHandle,
    },
    registry::AssetDescriptor,
};


#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LoadStatus {
    Pending,
    Ready,
    Failed(String),
}


/// The render-owner seam. Implementations construct, attach, show/hide and
/// release splats; they never draw.
pub trait SplatBackend {
    type Handle;

    /// begin an asynchronous load, the returned handle is detached until `attach`
    fn load(&mut self, descriptor: &AssetDescriptor, anchor: &Transform) -> Self::Handle;

    fn status(&self, handle: &Self::Handle) -> LoadStatus;

    fn attach(&mut self, handle: &Self::Handle, visible: bool);

    fn set_visible(&mut self, handle: &Self::Handle, visible: bool);

    /// must tolerate handles that were already disposed
    fn dispose(&mut self, handle: &Self::Handle);
}


/// Parent of every attached splat. Splat renderers draw the children of this
/// entity in their own pass.
#[derive(Component, Clone, Copy, Debug, Default, Reflect)]
#[reflect(Component)]
#[require(Transform, Visibility)]
pub struct SplatRenderRoot;

#[derive(Component, Clone, Debug, Default, Reflect)]
#[reflect(Component)]
pub struct CarouselSplat {
    pub id: String,
}


#[derive(SystemParam)]
pub struct EcsSplatBackend<'w, 's> {
    commands: Commands<'w, 's>,
    asset_server: Res<'w, AssetServer>,
    sources: Res<'w, Assets<SplatSource>>,
    roots: Query<'w, 's, Entity, With<SplatRenderRoot>>,
    splats: Query<'w, 's, &'static SplatSourceHandle, With<CarouselSplat>>,
}

impl SplatBackend for EcsSplatBackend<'_, '_> {
    type Handle = Entity;

    fn load(&mut self, descriptor: &AssetDescriptor, anchor: &Transform) -> Entity {
        let handle = self.asset_server.load::<SplatSource>(descriptor.source_uri.clone());

        self.commands
            .spawn((
                Name::new(descriptor.id.clone()),
                CarouselSplat {
                    id: descriptor.id.clone(),
                },
                SplatSourceHandle(handle),
                *anchor,
                Visibility::Hidden,
            ))
            .id()
    }

    fn status(&self, handle: &Entity) -> LoadStatus {
        // spawned this frame, commands not applied yet
        let Ok(source) = self.splats.get(*handle) else {
            return LoadStatus::Pending;
        };

        if self.sources.contains(&source.0) {
            return LoadStatus::Ready;
        }

        match self.asset_server.get_load_state(&source.0) {
            Some(LoadState::Failed(err)) => LoadStatus::Failed(err.to_string()),
            _ => LoadStatus::Pending,
        }
    }

    fn attach(&mut self, handle: &Entity, visible: bool) {
        let Ok(mut splat) = self.commands.get_entity(*handle) else {
            return;
        };

        match self.roots.single() {
            Ok(root) => {
                splat.try_insert(ChildOf(root));
            },
            Err(_) => warn!("no SplatRenderRoot, attaching splat at the world origin"),
        }

        splat.try_insert(visibility(visible));
    }

    fn set_visible(&mut self, handle: &Entity, visible: bool) {
        if let Ok(mut splat) = self.commands.get_entity(*handle) {
            splat.try_insert(visibility(visible));
        }
    }

    fn dispose(&mut self, handle: &Entity) {
        if let Ok(mut splat) = self.commands.get_entity(*handle) {
            splat.try_despawn();
        }
    }
}


fn visibility(visible: bool) -> Visibility {
    if visible {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    }
}
