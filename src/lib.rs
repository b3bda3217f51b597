use bevy::prelude::*;

pub use driver::{
    CarouselSet,
    FrameGuard,
    RenderLoopDriverPlugin,
};
pub use error::CarouselError;
pub use input::{
    ActionBindings,
    CarouselAction,
    CycleApplied,
    CycleRequest,
    Gesture,
    Handedness,
    HapticActuator,
    HapticActuators,
    HapticsPlugin,
    InputDispatchPlugin,
    InputSource,
    XrInputEvent,
};
pub use io::{
    SplatFormat,
    SplatIoPlugin,
    SplatSource,
    SplatSourceHandle,
};
pub use lifecycle::{
    LifecycleManager,
    LifecyclePlugin,
    ResidencyPolicy,
    SplatCarousel,
    SplatLoadEvent,
    SplatRenderRoot,
    wrap_index,
};
pub use registry::{
    AssetDescriptor,
    AssetRegistry,
};
pub use settings::CarouselSettings;
pub use stabilization::{
    StabilizationPlugin,
    StabilizationState,
};
pub use xr::{
    HeadPose,
    ImmersivePlugin,
    ImmersiveSession,
    ImmersiveSessionEvent,
    TrackedPose,
    TrackingAnchor,
};

pub mod driver;
pub mod error;
pub mod input;
pub mod io;
pub mod lifecycle;
pub mod registry;
pub mod settings;
pub mod stabilization;
pub mod utils;
pub mod xr;


pub struct SplatCarouselPlugin;

impl Plugin for SplatCarouselPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<CarouselSettings>();
        app.init_resource::<CarouselSettings>();

        app.add_plugins((
            RenderLoopDriverPlugin,
            SplatIoPlugin,
            LifecyclePlugin,
            InputDispatchPlugin,
            HapticsPlugin,
            ImmersivePlugin,
            StabilizationPlugin,
        ));

        #[cfg(feature = "simulated_runtime")]
        app.add_plugins(xr::simulated::SimulatedHeadsetPlugin);
    }
}
