// desktop stand-in for a headset with coarse inside-out tracking
use bevy::prelude::*;
use rand::Rng;

use crate::xr::{
    HeadPose,
    ImmersiveSession,
    ImmersiveSessionEvent,
    TrackedPose,
};


#[derive(Resource, Clone, Debug, Reflect)]
#[reflect(Resource)]
pub struct SimulatedHeadset {
    pub toggle_key: KeyCode,
    pub eye_height: f32,
    pub sway_radius: f32,
    pub jump_probability: f32,
    pub jump_distance: f32,
    relocalization: Vec3,
}

impl Default for SimulatedHeadset {
    fn default() -> Self {
        Self {
            toggle_key: KeyCode::KeyV,
            eye_height: 1.6,
            sway_radius: 0.05,
            jump_probability: 0.005,
            jump_distance: 0.4,
            relocalization: Vec3::ZERO,
        }
    }
}


/// Camera driven by the simulated pose, expected to be a child of the `TrackingAnchor`.
#[derive(Component, Clone, Copy, Debug, Default, Reflect)]
#[reflect(Component)]
pub struct SimulatedHead;


#[derive(Default)]
pub struct SimulatedHeadsetPlugin;

impl Plugin for SimulatedHeadsetPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<SimulatedHeadset>();
        app.register_type::<SimulatedHead>();
        app.init_resource::<SimulatedHeadset>();

        app.add_systems(PreUpdate, (toggle_session, sample_head_pose).chain());
    }
}


fn toggle_session(
    keys: Res<ButtonInput<KeyCode>>,
    headset: Res<SimulatedHeadset>,
    session: Res<ImmersiveSession>,
    mut events: EventWriter<ImmersiveSessionEvent>,
) {
    if !keys.just_pressed(headset.toggle_key) {
        return;
    }

    events.write(if session.active {
        ImmersiveSessionEvent::Ended
    } else {
        ImmersiveSessionEvent::Started
    });
}

fn sample_head_pose(
    time: Res<Time>,
    session: Res<ImmersiveSession>,
    mut headset: ResMut<SimulatedHeadset>,
    mut head_pose: ResMut<HeadPose>,
    mut heads: Query<&mut Transform, With<SimulatedHead>>,
) {
    if !session.active {
        return;
    }

    let mut rng = rand::thread_rng();
    if rng.gen_bool(headset.jump_probability.clamp(0.0, 1.0) as f64) {
        let direction = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-0.2..0.2),
            rng.gen_range(-1.0..1.0),
        )
        .normalize_or_zero();

        headset.relocalization += direction * headset.jump_distance;
        debug!("simulated relocalization, tracking origin now {:?}", headset.relocalization);
    }

    let t = time.elapsed_secs();
    let sway = Vec3::new(t.sin(), 0.0, (t * 0.7).cos()) * headset.sway_radius;
    let position = Vec3::Y * headset.eye_height + sway + headset.relocalization;
    let orientation = Quat::from_rotation_y((t * 0.3).sin() * 0.2);

    head_pose.0 = Some(TrackedPose {
        position,
        orientation,
    });

    for mut transform in heads.iter_mut() {
        transform.translation = position;
        transform.rotation = orientation;
    }
}
