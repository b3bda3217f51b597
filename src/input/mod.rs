use std::collections::HashMap;

use bevy::prelude::*;

use crate::driver::CarouselSet;

pub mod haptics;

pub use haptics::{
    HapticActuator,
    HapticActuators,
    HapticError,
    HapticsPlugin,
};


#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    Reflect,
)]
pub enum Handedness {
    Left,
    Right,
}

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    Reflect,
)]
pub enum InputSource {
    Hand(Handedness),
    Keyboard,
}

/// The discrete events an immersive runtime reports per hand or controller.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    Reflect,
)]
pub enum Gesture {
    PinchStart,
    SelectStart,
    SqueezeStart,
}

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    Reflect,
)]
pub enum CarouselAction {
    Advance,
    Retreat,
}

impl CarouselAction {
    pub fn delta(self) -> i64 {
        match self {
            Self::Advance => 1,
            Self::Retreat => -1,
        }
    }
}


#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct XrInputEvent {
    pub hand: Handedness,
    pub gesture: Gesture,
}

#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct CycleRequest {
    pub delta: i64,
    pub origin: InputSource,
}

/// Emitted by the lifecycle stage when a request actually moved the selection.
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct CycleApplied {
    pub origin: InputSource,
    pub index: usize,
}


#[derive(Resource, Clone, Debug, PartialEq)]
pub struct ActionBindings {
    pub gestures: HashMap<(Handedness, Gesture), CarouselAction>,
    pub keys: HashMap<KeyCode, CarouselAction>,
}

impl Default for ActionBindings {
    fn default() -> Self {
        use CarouselAction::{Advance, Retreat};
        use Gesture::{PinchStart, SelectStart, SqueezeStart};
        use Handedness::{Left, Right};

        let gestures = [
            ((Right, PinchStart), Advance),
            ((Right, SelectStart), Advance),
            ((Right, SqueezeStart), Retreat),
            ((Left, PinchStart), Retreat),
            ((Left, SelectStart), Retreat),
            ((Left, SqueezeStart), Advance),
        ];

        let keys = [
            (KeyCode::ArrowRight, Advance),
            (KeyCode::Space, Advance),
            (KeyCode::ArrowLeft, Retreat),
        ];

        Self {
            gestures: gestures.into_iter().collect(),
            keys: keys.into_iter().collect(),
        }
    }
}

impl ActionBindings {
    pub fn gesture_action(&self, hand: Handedness, gesture: Gesture) -> Option<CarouselAction> {
        self.gestures.get(&(hand, gesture)).copied()
    }

    pub fn key_action(&self, key: KeyCode) -> Option<CarouselAction> {
        self.keys.get(&key).copied()
    }

    pub fn gesture_request(&self, event: &XrInputEvent) -> Option<CycleRequest> {
        self.gesture_action(event.hand, event.gesture)
            .map(|action| CycleRequest {
                delta: action.delta(),
                origin: InputSource::Hand(event.hand),
            })
    }

    pub fn key_request(&self, key: KeyCode) -> Option<CycleRequest> {
        self.key_action(key)
            .map(|action| CycleRequest {
                delta: action.delta(),
                origin: InputSource::Keyboard,
            })
    }
}


#[derive(Default)]
pub struct InputDispatchPlugin;

impl Plugin for InputDispatchPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<InputSource>();

        app.init_resource::<ActionBindings>();
        app.init_resource::<ButtonInput<KeyCode>>();

        app.add_event::<XrInputEvent>();
        app.add_event::<CycleRequest>();
        app.add_event::<CycleApplied>();

        app.add_systems(
            Update,
            (
                dispatch_gestures,
                dispatch_keys,
            )
                .chain()
                .in_set(CarouselSet::Input),
        );
    }
}


fn dispatch_gestures(
    bindings: Res<ActionBindings>,
    mut gestures: EventReader<XrInputEvent>,
    mut requests: EventWriter<CycleRequest>,
) {
    for event in gestures.read() {
        match bindings.gesture_request(event) {
            Some(request) => {
                requests.write(request);
            },
            None => debug!("unbound gesture {:?} on {:?} hand", event.gesture, event.hand),
        }
    }
}

fn dispatch_keys(
    bindings: Res<ActionBindings>,
    keys: Res<ButtonInput<KeyCode>>,
    mut requests: EventWriter<CycleRequest>,
) {
    for key in keys.get_just_pressed() {
        if let Some(request) = bindings.key_request(*key) {
            requests.write(request);
        }
    }
}
