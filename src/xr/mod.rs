use bevy::prelude::*;

use crate::{
    driver::CarouselSet,
    stabilization::StabilizationState,
};

#[cfg(feature = "simulated_runtime")]
pub mod simulated;


#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct TrackedPose {
    pub position: Vec3,
    pub orientation: Quat,
}

/// Written by the immersive runtime before `Update`, consumed by stabilization.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct HeadPose(pub Option<TrackedPose>);

#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
#[reflect(Resource)]
pub struct ImmersiveSession {
    pub active: bool,
}

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImmersiveSessionEvent {
    Started,
    Ended,
}


/// The tracking-space origin (camera rig) that jump corrections translate.
#[derive(Component, Clone, Copy, Debug, Default, Reflect)]
#[reflect(Component)]
#[require(Transform, Visibility)]
pub struct TrackingAnchor {
    pub origin: Vec3,
}


pub fn immersive_session_active(session: Res<ImmersiveSession>) -> bool {
    session.active
}


#[derive(Default)]
pub struct ImmersivePlugin;

impl Plugin for ImmersivePlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<ImmersiveSession>();
        app.register_type::<TrackingAnchor>();

        app.init_resource::<ImmersiveSession>();
        app.init_resource::<HeadPose>();
        app.add_event::<ImmersiveSessionEvent>();

        app.add_systems(
            Update,
            apply_session_events.in_set(CarouselSet::Session),
        );
    }
}


pub(crate) fn apply_session_events(
    mut events: EventReader<ImmersiveSessionEvent>,
    head: Res<HeadPose>,
    mut session: ResMut<ImmersiveSession>,
    mut stabilization: ResMut<StabilizationState>,
) {
    for event in events.read() {
        match event {
            ImmersiveSessionEvent::Started => {
                info!("immersive session started");
                session.active = true;
                stabilization.reset(head.0.map(|pose| pose.position));
                stabilization.clear_offset();
            },
            ImmersiveSessionEvent::Ended => {
                info!("immersive session ended");
                session.active = false;
                stabilization.reset(None);
                stabilization.clear_offset();
            },
        }
    }
}
