use std::fmt::Debug;

use bevy::prelude::*;

use crate::{
    error::CarouselError,
    lifecycle::{
        LoadGeneration,
        ResidencyPolicy,
        backend::{
            LoadStatus,
            SplatBackend,
        },
        wrap_index,
    },
    registry::AssetRegistry,
};


#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CycleState {
    pub current_index: usize,
}


#[derive(Clone, Debug, PartialEq)]
pub struct ResidentAsset<H> {
    pub index: usize,
    pub handle: H,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PendingLoad<H> {
    pub generation: LoadGeneration,
    pub index: usize,
    pub handle: H,
}


#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PoolMemberState {
    Loading,
    Attached,
    Failed,
}

/// `visible` marks the member on display. It may lag the selection while the
/// selected member is loading or has failed.
#[derive(Clone, Debug, PartialEq)]
pub struct PoolMember<H> {
    pub handle: H,
    pub visible: bool,
    pub state: PoolMemberState,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssetPool<H> {
    pub members: Vec<PoolMember<H>>,
}

impl<H> AssetPool<H> {
    pub fn visible_count(&self) -> usize {
        self.members.iter().filter(|member| member.visible).count()
    }

    pub fn shown(&self) -> Option<usize> {
        self.members.iter().position(|member| member.visible)
    }

    fn is_attached(&self, index: usize) -> bool {
        self.members
            .get(index)
            .is_some_and(|member| member.state == PoolMemberState::Attached)
    }

    fn nearest_attached(&self, from: usize) -> Option<usize> {
        let len = self.members.len();
        (0..len)
            .map(|step| (from + step) % len)
            .find(|&index| self.is_attached(index))
    }

    /// Moves the display toward `selected`. An attached splat on screen is
    /// only replaced by another attached splat.
    fn display<B: SplatBackend<Handle = H>>(
        &mut self,
        selected: usize,
        backend: &mut B,
    ) {
        let Some(target) = self.members.get(selected).map(|member| member.state) else {
            return;
        };

        let shown = self.shown();
        let holding = shown.is_some_and(|index| self.is_attached(index));

        let next = match target {
            PoolMemberState::Attached => Some(selected),
            PoolMemberState::Loading | PoolMemberState::Failed if holding => shown,
            PoolMemberState::Loading => Some(selected),
            PoolMemberState::Failed => self.nearest_attached(selected).or(shown),
        };

        if next == shown {
            return;
        }

        if let Some(index) = shown {
            self.set_member_visible(index, false, backend);
        }
        if let Some(index) = next {
            self.set_member_visible(index, true, backend);
        }
    }

    fn set_member_visible<B: SplatBackend<Handle = H>>(
        &mut self,
        index: usize,
        visible: bool,
        backend: &mut B,
    ) {
        let member = &mut self.members[index];
        member.visible = visible;
        if member.state == PoolMemberState::Attached {
            backend.set_visible(&member.handle, visible);
        }
    }
}


#[derive(Clone, Debug, PartialEq)]
enum Residency<H> {
    OnDemand {
        resident: Option<ResidentAsset<H>>,
        pending: Vec<PendingLoad<H>>,
    },
    Preloaded(AssetPool<H>),
}


#[derive(Clone, Debug, PartialEq)]
pub enum LifecycleEvent {
    Attached {
        index: usize,
    },
    Failed {
        index: usize,
        error: CarouselError,
    },
    Discarded {
        index: usize,
        error: CarouselError,
    },
}


/// Owns the displayed splat(s) and the cycle position.
///
/// Under [`ResidencyPolicy::OnDemand`] the previously attached splat stays
/// resident until its replacement attaches, so a failed load leaves the old
/// splat on screen. Loads superseded by a later `cycle` are discarded when
/// they resolve.
///
/// Under [`ResidencyPolicy::Preloaded`] the same holds for the pool: the
/// attached splat on screen stays until the selected member attaches, and a
/// member that failed to load is never swapped in.
#[derive(Clone, Debug, PartialEq)]
pub struct LifecycleManager<H> {
    policy: ResidencyPolicy,
    anchor: Transform,
    cycle: CycleState,
    latest: LoadGeneration,
    started: bool,
    residency: Residency<H>,
}

impl<H> Default for LifecycleManager<H> {
    fn default() -> Self {
        Self::new(ResidencyPolicy::default(), Transform::IDENTITY)
    }
}

impl<H> LifecycleManager<H> {
    pub fn new(
        policy: ResidencyPolicy,
        anchor: Transform,
    ) -> Self {
        let residency = match policy {
            ResidencyPolicy::OnDemand => Residency::OnDemand {
                resident: None,
                pending: Vec::new(),
            },
            ResidencyPolicy::Preloaded => Residency::Preloaded(AssetPool {
                members: Vec::new(),
            }),
        };

        Self {
            policy,
            anchor,
            cycle: CycleState::default(),
            latest: LoadGeneration::default(),
            started: false,
            residency,
        }
    }

    pub fn policy(&self) -> ResidencyPolicy {
        self.policy
    }

    pub fn anchor(&self) -> &Transform {
        &self.anchor
    }

    pub fn current_index(&self) -> usize {
        self.cycle.current_index
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn latest_generation(&self) -> LoadGeneration {
        self.latest
    }

    pub fn resident(&self) -> Option<&ResidentAsset<H>> {
        match &self.residency {
            Residency::OnDemand { resident, .. } => resident.as_ref(),
            Residency::Preloaded(_) => None,
        }
    }

    pub fn pending(&self) -> &[PendingLoad<H>] {
        match &self.residency {
            Residency::OnDemand { pending, .. } => pending,
            Residency::Preloaded(_) => &[],
        }
    }

    pub fn pool(&self) -> Option<&AssetPool<H>> {
        match &self.residency {
            Residency::Preloaded(pool) => Some(pool),
            Residency::OnDemand { .. } => None,
        }
    }

    pub fn has_in_flight(&self) -> bool {
        match &self.residency {
            Residency::OnDemand { pending, .. } => !pending.is_empty(),
            Residency::Preloaded(pool) => pool.members
                .iter()
                .any(|member| member.state == PoolMemberState::Loading),
        }
    }
}

impl<H: Clone + Debug> LifecycleManager<H> {
    /// Issues the initial load(s). Calling it again is a no-op.
    pub fn start<B: SplatBackend<Handle = H>>(
        &mut self,
        registry: &AssetRegistry,
        backend: &mut B,
    ) {
        if self.started {
            return;
        }
        self.started = true;
        self.cycle.current_index = 0;

        if registry.is_empty() {
            warn!("splat registry is empty, nothing to display");
            return;
        }

        if self.policy == ResidencyPolicy::OnDemand {
            self.request(0, registry, backend);
            return;
        }

        let anchor = self.anchor;
        if let Residency::Preloaded(pool) = &mut self.residency {
            pool.members = registry.iter()
                .enumerate()
                .map(|(index, descriptor)| PoolMember {
                    handle: backend.load(descriptor, &anchor),
                    visible: index == 0,
                    state: PoolMemberState::Loading,
                })
                .collect();

            info!("preloading {} splats", pool.members.len());
        }
    }

    /// Moves the current index by `delta` with wraparound, returning the new
    /// index when the selection changed.
    pub fn cycle<B: SplatBackend<Handle = H>>(
        &mut self,
        delta: i64,
        registry: &AssetRegistry,
        backend: &mut B,
    ) -> Option<usize> {
        let len = registry.len();
        if len == 0 || delta == 0 || !self.started {
            return None;
        }

        let previous = self.cycle.current_index;
        let next = wrap_index(previous, delta, len);
        if next == previous {
            return None;
        }
        self.cycle.current_index = next;

        match self.policy {
            ResidencyPolicy::OnDemand => {
                let already_resident = self
                    .resident()
                    .is_some_and(|resident| resident.index == next);

                if already_resident {
                    // invalidates whatever is still in flight
                    self.latest = self.latest.next();
                    debug!("cycled back to resident splat {next}, {} loads now stale", self.pending().len());
                } else {
                    self.request(next, registry, backend);
                }
            },
            ResidencyPolicy::Preloaded => {
                let Residency::Preloaded(pool) = &mut self.residency else {
                    return Some(next);
                };

                pool.display(next, backend);
                if pool.members.get(next).is_some_and(|member| member.state == PoolMemberState::Failed) {
                    debug!("splat {next} failed to load, keeping {:?} on screen", pool.shown());
                }
            },
        }

        Some(next)
    }

    /// Resolves finished loads. Call once per frame.
    pub fn poll<B: SplatBackend<Handle = H>>(
        &mut self,
        registry: &AssetRegistry,
        backend: &mut B,
    ) -> Vec<LifecycleEvent> {
        let latest = self.latest;
        let selected = self.cycle.current_index;
        let mut events = Vec::new();

        match &mut self.residency {
            Residency::OnDemand { resident, pending } => {
                let mut still_pending = Vec::with_capacity(pending.len());

                for load in pending.drain(..) {
                    let status = backend.status(&load.handle);
                    let uri = source_uri(registry, load.index);

                    match status {
                        LoadStatus::Pending => {
                            still_pending.push(load);
                        },
                        _ if load.generation != latest => {
                            backend.dispose(&load.handle);
                            events.push(LifecycleEvent::Discarded {
                                index: load.index,
                                error: CarouselError::StaleResultDiscarded {
                                    uri,
                                    generation: load.generation,
                                    latest,
                                },
                            });
                        },
                        LoadStatus::Ready => {
                            backend.attach(&load.handle, true);
                            if let Some(previous) = resident.take() {
                                backend.dispose(&previous.handle);
                            }

                            *resident = Some(ResidentAsset {
                                index: load.index,
                                handle: load.handle,
                            });
                            events.push(LifecycleEvent::Attached { index: load.index });
                        },
                        LoadStatus::Failed(reason) => {
                            backend.dispose(&load.handle);
                            events.push(LifecycleEvent::Failed {
                                index: load.index,
                                error: CarouselError::AssetLoadFailure {
                                    uri,
                                    reason,
                                },
                            });
                        },
                    }
                }

                *pending = still_pending;
            },
            Residency::Preloaded(pool) => {
                for (index, member) in pool.members.iter_mut().enumerate() {
                    if member.state != PoolMemberState::Loading {
                        continue;
                    }

                    match backend.status(&member.handle) {
                        LoadStatus::Pending => {},
                        LoadStatus::Ready => {
                            backend.attach(&member.handle, member.visible);
                            member.state = PoolMemberState::Attached;
                            events.push(LifecycleEvent::Attached { index });
                        },
                        LoadStatus::Failed(reason) => {
                            member.state = PoolMemberState::Failed;
                            events.push(LifecycleEvent::Failed {
                                index,
                                error: CarouselError::AssetLoadFailure {
                                    uri: source_uri(registry, index),
                                    reason,
                                },
                            });
                        },
                    }
                }

                pool.display(selected, backend);
            },
        }

        events
    }

    /// Releases everything the manager owns, including in-flight loads.
    pub fn dispose_all<B: SplatBackend<Handle = H>>(
        &mut self,
        backend: &mut B,
    ) {
        match &mut self.residency {
            Residency::OnDemand { resident, pending } => {
                for load in pending.drain(..) {
                    backend.dispose(&load.handle);
                }
                if let Some(resident) = resident.take() {
                    backend.dispose(&resident.handle);
                }
            },
            Residency::Preloaded(pool) => {
                for member in pool.members.drain(..) {
                    backend.dispose(&member.handle);
                }
            },
        }

        self.latest = self.latest.next();
        self.started = false;
    }

    fn request<B: SplatBackend<Handle = H>>(
        &mut self,
        index: usize,
        registry: &AssetRegistry,
        backend: &mut B,
    ) {
        let Some(descriptor) = registry.get(index) else {
            return;
        };

        self.latest = self.latest.next();
        let handle = backend.load(descriptor, &self.anchor);

        if let Residency::OnDemand { pending, .. } = &mut self.residency {
            debug!("loading splat `{}` as generation {:?}", descriptor.id, self.latest);
            pending.push(PendingLoad {
                generation: self.latest,
                index,
                handle,
            });
        }
    }
}


fn source_uri(registry: &AssetRegistry, index: usize) -> String {
    registry
        .get(index)
        .map(|descriptor| descriptor.source_uri.clone())
        .unwrap_or_default()
}
