use bevy::prelude::*;

use crate::{
    driver::{
        CarouselSet,
        FrameGuard,
    },
    error::CarouselError,
    settings::CarouselSettings,
    xr::{
        HeadPose,
        TrackingAnchor,
        apply_session_events,
    },
};


/// Single-sample jump filter for tracked head position.
///
/// Below `threshold` it does nothing. Above it, the anchor is shifted by
/// `last_known_position - position`, cancelling exactly the observed jump.
/// The last known position follows the tracked position every frame.
#[derive(Resource, Clone, Debug, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct StabilizationState {
    last_known_position: Option<Vec3>,
    threshold: f32,
    applied_offset: Vec3,
}

impl Default for StabilizationState {
    fn default() -> Self {
        Self::new(CarouselSettings::default().stabilization_threshold)
    }
}

impl StabilizationState {
    pub fn new(threshold: f32) -> Self {
        Self {
            last_known_position: None,
            threshold,
            applied_offset: Vec3::ZERO,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    pub fn last_known_position(&self) -> Option<Vec3> {
        self.last_known_position
    }

    pub fn applied_offset(&self) -> Vec3 {
        self.applied_offset
    }

    /// Seeds the filter, `None` makes the next sample the seed.
    pub fn reset(&mut self, position: Option<Vec3>) {
        self.last_known_position = position;
    }

    pub fn clear_offset(&mut self) {
        self.applied_offset = Vec3::ZERO;
    }

    /// Feeds one tracked position, returning the correction applied this frame.
    pub fn update(&mut self, position: Vec3) -> Result<Option<Vec3>, CarouselError> {
        if !position.is_finite() {
            return Err(CarouselError::InvalidPose(position.to_array()));
        }

        let correction = self.last_known_position
            .filter(|last| last.distance(position) > self.threshold)
            .map(|last| last - position);

        if let Some(correction) = correction {
            self.applied_offset += correction;
        }

        self.last_known_position = Some(position);

        Ok(correction)
    }
}


#[derive(Default)]
pub struct StabilizationPlugin;

impl Plugin for StabilizationPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<StabilizationState>();
        app.init_resource::<StabilizationState>();

        app.add_systems(Startup, configure_threshold);
        app.add_systems(
            Update,
            (
                screen_head_pose
                    .in_set(CarouselSet::Session)
                    .before(apply_session_events),
                stabilize_tracking_anchor.in_set(CarouselSet::Stabilization),
            ),
        );
    }
}


fn configure_threshold(
    settings: Res<CarouselSettings>,
    mut state: ResMut<StabilizationState>,
) {
    let threshold = settings.stabilization_threshold;
    if threshold.is_finite() && threshold > 0.0 {
        state.set_threshold(threshold);
    } else {
        warn!("ignoring invalid stabilization threshold {threshold}, keeping {}", state.threshold());
    }
}

fn screen_head_pose(
    mut head: ResMut<HeadPose>,
    mut guard: ResMut<FrameGuard>,
) {
    let Some(pose) = head.0 else {
        return;
    };

    if !pose.position.is_finite() {
        head.0 = None;
        guard.fail(CarouselError::InvalidPose(pose.position.to_array()));
    }
}

fn stabilize_tracking_anchor(
    mut head: ResMut<HeadPose>,
    mut state: ResMut<StabilizationState>,
    mut guard: ResMut<FrameGuard>,
    mut anchors: Query<(&mut Transform, &TrackingAnchor)>,
) {
    // poses never outlive the frame they were sampled in
    if let Some(pose) = head.0.take() {
        match state.update(pose.position) {
            Ok(Some(correction)) => {
                debug!("tracking jump of {:.3}, correcting by {correction:?}", correction.length());
            },
            Ok(None) => {},
            Err(err) => {
                guard.fail(err);
                return;
            },
        }
    }

    let offset = state.applied_offset();
    for (mut transform, anchor) in anchors.iter_mut() {
        let translation = anchor.origin + offset;
        if transform.translation != translation {
            transform.translation = translation;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_above_threshold_is_corrected() {
        let mut state = StabilizationState::new(0.2);
        state.reset(Some(Vec3::ZERO));

        let position = Vec3::new(0.25, 0.0, 0.0);
        let correction = state.update(position).unwrap();

        assert_eq!(correction, Some(Vec3::new(-0.25, 0.0, 0.0)));
        assert_eq!(state.last_known_position(), Some(position));
        assert_eq!(state.applied_offset(), Vec3::new(-0.25, 0.0, 0.0));
    }

    #[test]
    fn motion_below_threshold_is_tracked_not_corrected() {
        let mut state = StabilizationState::new(0.2);
        state.reset(Some(Vec3::ZERO));

        let position = Vec3::new(0.0, 0.15, 0.0);

        assert_eq!(state.update(position).unwrap(), None);
        assert_eq!(state.last_known_position(), Some(position));
        assert_eq!(state.applied_offset(), Vec3::ZERO);
    }

    #[test]
    fn first_sample_after_reset_seeds_without_correction() {
        let mut state = StabilizationState::new(0.2);
        state.reset(None);

        assert_eq!(state.update(Vec3::new(5.0, 1.6, -3.0)).unwrap(), None);
        assert_eq!(state.applied_offset(), Vec3::ZERO);
    }

    #[test]
    fn non_finite_positions_are_rejected() {
        let mut state = StabilizationState::new(0.2);
        state.reset(Some(Vec3::ZERO));

        let result = state.update(Vec3::new(f32::NAN, 0.0, 0.0));

        assert!(matches!(result, Err(CarouselError::InvalidPose(_))));
        assert_eq!(state.last_known_position(), Some(Vec3::ZERO));
    }
}
