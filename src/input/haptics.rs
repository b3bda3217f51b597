use std::collections::HashMap;

use bevy::prelude::*;
use thiserror::Error;

use crate::{
    driver::CarouselSet,
    error::CarouselError,
    input::{
        CycleApplied,
        Handedness,
        InputSource,
    },
    settings::CarouselSettings,
};


#[derive(Debug, Error, Clone, PartialEq)]
pub enum HapticError {
    #[error("haptic actuator disconnected")]
    Disconnected,

    #[error("haptic pulse rejected: {0}")]
    Rejected(String),
}


/// A per-hand vibration motor exposed by the immersive runtime.
pub trait HapticActuator: Send + Sync + 'static {
    fn pulse(&mut self, intensity: f32, duration_ms: u32) -> Result<(), HapticError>;
}


#[derive(Resource, Default)]
pub struct HapticActuators {
    actuators: HashMap<Handedness, Box<dyn HapticActuator>>,
}

impl HapticActuators {
    pub fn register(&mut self, hand: Handedness, actuator: impl HapticActuator) {
        self.actuators.insert(hand, Box::new(actuator));
    }

    pub fn remove(&mut self, hand: Handedness) {
        self.actuators.remove(&hand);
    }

    pub fn has_actuator(&self, hand: Handedness) -> bool {
        self.actuators.contains_key(&hand)
    }

    pub fn probe(&self, hand: Handedness) -> Result<(), CarouselError> {
        if self.has_actuator(hand) {
            Ok(())
        } else {
            Err(CarouselError::MissingCapability("haptic actuator"))
        }
    }

    /// Pulses `source` if it has an actuator. Keyboard input never does.
    pub fn pulse(
        &mut self,
        source: InputSource,
        intensity: f32,
        duration_ms: u32,
    ) -> Option<Result<(), HapticError>> {
        let InputSource::Hand(hand) = source else {
            return None;
        };

        self.actuators
            .get_mut(&hand)
            .map(|actuator| actuator.pulse(intensity.clamp(0.0, 1.0), duration_ms))
    }
}


#[derive(Default)]
pub struct HapticsPlugin;

impl Plugin for HapticsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HapticActuators>();

        app.add_systems(
            Update,
            pulse_on_cycle.in_set(CarouselSet::Feedback),
        );
    }
}


fn pulse_on_cycle(
    settings: Res<CarouselSettings>,
    mut applied: EventReader<CycleApplied>,
    mut actuators: ResMut<HapticActuators>,
) {
    let haptics = settings.haptics;

    for event in applied.read() {
        // keyboard cycling has nothing to pulse
        let InputSource::Hand(hand) = event.origin else {
            continue;
        };

        if let Err(err) = actuators.probe(hand) {
            debug!("no haptic pulse for {hand:?}: {err}");
            continue;
        }

        if let Some(Err(err)) = actuators.pulse(event.origin, haptics.intensity, haptics.duration_ms) {
            debug!("ignoring haptic failure on {hand:?}: {err}");
        }
    }
}


#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        Mutex,
    };

    use super::*;

    #[derive(Clone, Default)]
    struct RecordingActuator {
        pulses: Arc<Mutex<Vec<(f32, u32)>>>,
    }

    impl HapticActuator for RecordingActuator {
        fn pulse(&mut self, intensity: f32, duration_ms: u32) -> Result<(), HapticError> {
            self.pulses.lock().unwrap().push((intensity, duration_ms));
            Ok(())
        }
    }

    #[test]
    fn pulses_only_hands_with_actuators() {
        let recorder = RecordingActuator::default();
        let mut actuators = HapticActuators::default();
        actuators.register(Handedness::Right, recorder.clone());

        assert!(actuators.has_actuator(Handedness::Right));
        assert!(!actuators.has_actuator(Handedness::Left));

        assert_eq!(actuators.pulse(InputSource::Hand(Handedness::Right), 2.0, 40), Some(Ok(())));
        assert_eq!(actuators.pulse(InputSource::Hand(Handedness::Left), 0.5, 40), None);
        assert_eq!(actuators.pulse(InputSource::Keyboard, 0.5, 40), None);

        assert_eq!(*recorder.pulses.lock().unwrap(), vec![(1.0, 40)]);
    }

    #[test]
    fn probing_reports_missing_actuators() {
        let mut actuators = HapticActuators::default();
        assert_eq!(
            actuators.probe(Handedness::Left),
            Err(CarouselError::MissingCapability("haptic actuator")),
        );

        actuators.register(Handedness::Left, RecordingActuator::default());
        assert_eq!(actuators.probe(Handedness::Left), Ok(()));

        actuators.remove(Handedness::Left);
        assert!(actuators.probe(Handedness::Left).is_err());
    }
}
