use std::sync::{
    Arc,
    Mutex,
};

use bevy::{
    ecs::event::Events,
    prelude::*,
};

use bevy_splat_carousel::{
    AssetRegistry,
    CarouselSet,
    CycleApplied,
    CycleRequest,
    FrameGuard,
    Gesture,
    Handedness,
    HapticActuator,
    HapticActuators,
    HeadPose,
    ImmersiveSessionEvent,
    InputSource,
    StabilizationState,
    TrackedPose,
    TrackingAnchor,
    XrInputEvent,
    input::HapticError,
};

use _harness::{
    TestHarness,
    test_harness_app,
};

mod _harness;


#[derive(Clone, Default)]
struct RecordingActuator {
    pulses: Arc<Mutex<Vec<(f32, u32)>>>,
    broken: bool,
}

impl HapticActuator for RecordingActuator {
    fn pulse(&mut self, intensity: f32, duration_ms: u32) -> Result<(), HapticError> {
        if self.broken {
            return Err(HapticError::Disconnected);
        }

        self.pulses.lock().unwrap().push((intensity, duration_ms));
        Ok(())
    }
}


fn read_events<E: Event + Clone>(app: &App) -> Vec<E> {
    let events = app.world().resource::<Events<E>>();
    events.get_cursor().read(events).cloned().collect()
}

fn feed_pose(app: &mut App, position: Vec3) {
    app.world_mut().resource_mut::<HeadPose>().0 = Some(TrackedPose {
        position,
        orientation: Quat::IDENTITY,
    });
}

fn anchor_translation(app: &mut App) -> Vec3 {
    app.world_mut()
        .query_filtered::<&Transform, With<TrackingAnchor>>()
        .single(app.world())
        .unwrap()
        .translation
}


#[test]
fn gestures_and_keys_become_one_request_each() {
    let mut app = test_harness_app(TestHarness::default());

    app.world_mut().send_event(XrInputEvent {
        hand: Handedness::Right,
        gesture: Gesture::PinchStart,
    });
    app.world_mut().send_event(XrInputEvent {
        hand: Handedness::Left,
        gesture: Gesture::SqueezeStart,
    });
    app.world_mut().send_event(XrInputEvent {
        hand: Handedness::Left,
        gesture: Gesture::PinchStart,
    });
    {
        let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keys.press(KeyCode::ArrowLeft);
        keys.press(KeyCode::Space);
    }

    app.update();

    let requests = read_events::<CycleRequest>(&app);
    assert_eq!(requests[..3], [
        CycleRequest { delta: 1, origin: InputSource::Hand(Handedness::Right) },
        CycleRequest { delta: 1, origin: InputSource::Hand(Handedness::Left) },
        CycleRequest { delta: -1, origin: InputSource::Hand(Handedness::Left) },
    ]);

    // pressed keys are unordered
    let mut key_deltas = requests[3..]
        .iter()
        .map(|request| {
            assert_eq!(request.origin, InputSource::Keyboard);
            request.delta
        })
        .collect::<Vec<_>>();
    key_deltas.sort();
    assert_eq!(key_deltas, vec![-1, 1]);
}

#[test]
fn pinch_cycles_and_pulses_the_originating_hand() {
    let mut app = test_harness_app(TestHarness {
        registry: AssetRegistry::from_uris(["a.splat", "b.splat", "c.splat"]),
        ..default()
    });

    let right = RecordingActuator::default();
    let left = RecordingActuator {
        broken: true,
        ..default()
    };
    {
        let mut actuators = app.world_mut().resource_mut::<HapticActuators>();
        actuators.register(Handedness::Right, right.clone());
        actuators.register(Handedness::Left, left.clone());
    }

    app.update();

    app.world_mut().send_event(XrInputEvent {
        hand: Handedness::Right,
        gesture: Gesture::PinchStart,
    });
    app.update();

    assert_eq!(read_events::<CycleApplied>(&app), vec![
        CycleApplied { origin: InputSource::Hand(Handedness::Right), index: 1 },
    ]);
    assert_eq!(*right.pulses.lock().unwrap(), vec![(0.5, 40)]);

    // a failing actuator never blocks cycling
    app.world_mut().send_event(XrInputEvent {
        hand: Handedness::Left,
        gesture: Gesture::PinchStart,
    });
    app.update();

    assert_eq!(read_events::<CycleApplied>(&app).last(), Some(&CycleApplied {
        origin: InputSource::Hand(Handedness::Left),
        index: 0,
    }));
    assert_eq!(right.pulses.lock().unwrap().len(), 1);
}

#[test]
fn session_start_seeds_the_filter_and_jumps_are_cancelled() {
    let mut app = test_harness_app(TestHarness::default());
    app.world_mut().spawn(TrackingAnchor::default());
    app.update();

    feed_pose(&mut app, Vec3::new(0.0, 1.6, 0.0));
    app.world_mut().send_event(ImmersiveSessionEvent::Started);
    app.update();

    assert_eq!(anchor_translation(&mut app), Vec3::ZERO);
    assert_eq!(app.world().resource::<HeadPose>().0, None);

    feed_pose(&mut app, Vec3::new(0.3, 1.6, 0.0));
    app.update();
    assert!(anchor_translation(&mut app).abs_diff_eq(Vec3::new(-0.3, 0.0, 0.0), 1e-5));

    feed_pose(&mut app, Vec3::new(0.35, 1.6, 0.0));
    app.update();
    assert!(anchor_translation(&mut app).abs_diff_eq(Vec3::new(-0.3, 0.0, 0.0), 1e-5));
    assert_eq!(
        app.world().resource::<StabilizationState>().last_known_position(),
        Some(Vec3::new(0.35, 1.6, 0.0)),
    );

    app.world_mut().send_event(ImmersiveSessionEvent::Ended);
    app.update();
    assert_eq!(anchor_translation(&mut app), Vec3::ZERO);
}

#[test]
fn session_start_drops_offsets_from_outside_the_session() {
    let mut app = test_harness_app(TestHarness::default());
    app.world_mut().spawn(TrackingAnchor::default());

    feed_pose(&mut app, Vec3::ZERO);
    app.update();
    feed_pose(&mut app, Vec3::new(1.0, 0.0, 0.0));
    app.update();
    assert!(anchor_translation(&mut app).abs_diff_eq(Vec3::new(-1.0, 0.0, 0.0), 1e-5));

    feed_pose(&mut app, Vec3::new(1.0, 0.0, 0.0));
    app.world_mut().send_event(ImmersiveSessionEvent::Started);
    app.update();

    assert_eq!(app.world().resource::<StabilizationState>().applied_offset(), Vec3::ZERO);
    assert_eq!(anchor_translation(&mut app), Vec3::ZERO);
}

#[test]
fn invalid_pose_skips_only_that_frame() {
    let mut app = test_harness_app(TestHarness::default());
    app.world_mut().spawn(TrackingAnchor::default());

    feed_pose(&mut app, Vec3::ZERO);
    app.update();

    feed_pose(&mut app, Vec3::new(f32::NAN, 0.0, 0.0));
    app.update();
    {
        let guard = app.world().resource::<FrameGuard>();
        assert!(!guard.is_healthy());
        assert_eq!(guard.skipped_frames(), 1);
    }

    feed_pose(&mut app, Vec3::new(1.0, 0.0, 0.0));
    app.update();

    let guard = app.world().resource::<FrameGuard>();
    assert!(guard.is_healthy());
    assert!(anchor_translation(&mut app).abs_diff_eq(Vec3::new(-1.0, 0.0, 0.0), 1e-5));
}


#[derive(Resource, Default)]
struct StageLog(Vec<&'static str>);

fn log_stage(stage: &'static str) -> impl FnMut(ResMut<StageLog>) {
    move |mut log: ResMut<StageLog>| log.0.push(stage)
}

#[test]
fn invalid_pose_skips_stabilization_but_still_cycles() {
    let mut app = test_harness_app(TestHarness {
        registry: AssetRegistry::from_uris(["a.splat", "b.splat", "c.splat"]),
        ..default()
    });
    app.init_resource::<StageLog>();
    app.add_systems(Update, (
        log_stage("input").in_set(CarouselSet::Input),
        log_stage("lifecycle").in_set(CarouselSet::Lifecycle),
        log_stage("fallback").in_set(CarouselSet::FallbackNavigation),
        log_stage("stabilization").in_set(CarouselSet::Stabilization),
    ));
    app.update();
    app.world_mut().resource_mut::<StageLog>().0.clear();

    feed_pose(&mut app, Vec3::new(0.0, f32::INFINITY, 0.0));
    app.world_mut().send_event(CycleRequest {
        delta: 1,
        origin: InputSource::Keyboard,
    });
    app.update();

    assert_eq!(
        app.world().resource::<StageLog>().0,
        vec!["input", "lifecycle", "fallback"],
    );
    assert_eq!(read_events::<CycleApplied>(&app), vec![
        CycleApplied { origin: InputSource::Keyboard, index: 1 },
    ]);
    assert_eq!(app.world().resource::<StabilizationState>().last_known_position(), None);
    assert_eq!(app.world().resource::<HeadPose>().0, None);

    app.world_mut().resource_mut::<StageLog>().0.clear();
    app.update();
    assert_eq!(
        app.world().resource::<StageLog>().0,
        vec!["input", "lifecycle", "fallback", "stabilization"],
    );
}

#[test]
fn stages_run_once_per_frame_in_order() {
    let mut app = test_harness_app(TestHarness::default());
    app.init_resource::<StageLog>();

    app.add_systems(Update, (
        log_stage("stabilization").in_set(CarouselSet::Stabilization),
        log_stage("fallback").in_set(CarouselSet::FallbackNavigation),
        log_stage("lifecycle").in_set(CarouselSet::Lifecycle),
        log_stage("input").in_set(CarouselSet::Input),
    ));

    app.update();
    assert_eq!(
        app.world().resource::<StageLog>().0,
        vec!["input", "lifecycle", "fallback", "stabilization"],
    );

    app.world_mut().resource_mut::<StageLog>().0.clear();
    app.world_mut().send_event(ImmersiveSessionEvent::Started);
    app.update();

    assert_eq!(
        app.world().resource::<StageLog>().0,
        vec!["input", "lifecycle", "stabilization"],
    );
}
