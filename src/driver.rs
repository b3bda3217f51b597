use bevy::prelude::*;

use crate::{
    error::CarouselError,
    xr::immersive_session_active,
};


/// Per-frame stages, run in this order inside `Update`. The splat renderer
/// extracts and draws after `Update` has finished.
#[derive(SystemSet, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CarouselSet {
    Session,
    Input,
    Lifecycle,
    Feedback,
    FallbackNavigation,
    Stabilization,
}


/// Frame boundary for non-fatal errors. A stage that fails marks the frame
/// skipped and `Stabilization` does not run until the next frame. Stages that
/// consume events always run, so no discrete input is dropped.
#[derive(Resource, Debug, Default)]
pub struct FrameGuard {
    error: Option<CarouselError>,
    skipped_frames: u64,
}

impl FrameGuard {
    pub fn fail(&mut self, error: CarouselError) {
        if self.error.is_none() {
            warn!("skipping frame: {error}");
            self.skipped_frames += 1;
            self.error = Some(error);
        }
    }

    pub fn error(&self) -> Option<&CarouselError> {
        self.error.as_ref()
    }

    pub fn is_healthy(&self) -> bool {
        self.error.is_none()
    }

    pub fn skipped_frames(&self) -> u64 {
        self.skipped_frames
    }

    fn begin_frame(&mut self) {
        self.error = None;
    }
}

pub fn frame_healthy(guard: Res<FrameGuard>) -> bool {
    guard.is_healthy()
}


#[derive(Default)]
pub struct RenderLoopDriverPlugin;

impl Plugin for RenderLoopDriverPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FrameGuard>();

        app.configure_sets(
            Update,
            (
                CarouselSet::Session,
                CarouselSet::Input,
                CarouselSet::Lifecycle,
                CarouselSet::Feedback,
                CarouselSet::FallbackNavigation
                    .run_if(not(immersive_session_active)),
                CarouselSet::Stabilization
                    .run_if(frame_healthy),
            )
                .chain(),
        );

        app.add_systems(First, begin_frame);

        #[cfg(feature = "viewer")]
        {
            app.add_systems(
                Update,
                (
                    fallback::toggle_orbit_control.in_set(CarouselSet::Input),
                    fallback::focus_orbit_on_splat.in_set(CarouselSet::FallbackNavigation),
                ),
            );
        }
    }
}


fn begin_frame(mut guard: ResMut<FrameGuard>) {
    guard.begin_frame();
}


#[cfg(feature = "viewer")]
mod fallback {
    use bevy::prelude::*;
    use bevy_panorbit_camera::PanOrbitCamera;

    use crate::{
        lifecycle::{
            LifecycleEvent,
            SplatCarousel,
            SplatLoadEvent,
        },
        xr::ImmersiveSession,
    };

    pub fn toggle_orbit_control(
        session: Res<ImmersiveSession>,
        mut cameras: Query<&mut PanOrbitCamera>,
    ) {
        if !session.is_changed() {
            return;
        }

        for mut camera in cameras.iter_mut() {
            camera.enabled = !session.active;
        }
    }

    pub fn focus_orbit_on_splat(
        carousel: Res<SplatCarousel>,
        mut load_events: EventReader<SplatLoadEvent>,
        mut cameras: Query<&mut PanOrbitCamera>,
    ) {
        let attached = load_events
            .read()
            .filter(|event| matches!(event.0, LifecycleEvent::Attached { .. }))
            .count() > 0;
        if !attached {
            return;
        }

        let focus = carousel.anchor().translation;
        for mut camera in cameras.iter_mut() {
            camera.target_focus = focus;
        }
    }
}
