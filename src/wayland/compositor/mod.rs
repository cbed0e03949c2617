//! Minimal `wl_compositor` implementation
//!
//! Extensions of this crate attach their state to surfaces and need to know when a surface
//! goes away, nothing more. This module creates surfaces, gives each of them a
//! [`UserDataMap`] and runs destruction hooks when they are destroyed. Buffers, damage,
//! commits and roles are out of its scope.
//!
//! ```
//! use plasma_wayland_server::delegate_compositor;
//! use plasma_wayland_server::protocols::wayland_core::wl_surface::WlSurface;
//! use plasma_wayland_server::wayland::compositor::{CompositorHandler, CompositorState};
//! use plasma_wayland_server::wayland::{Display, MemoryTransport, Resource};
//!
//! struct State {
//!     compositor: CompositorState,
//! }
//!
//! impl CompositorHandler for State {
//!     fn compositor_state(&mut self) -> &mut CompositorState {
//!         &mut self.compositor
//!     }
//!
//!     fn surface_destroyed(&mut self, surface: &Resource<WlSurface>) {
//!         // forget about the surface
//!     }
//! }
//!
//! delegate_compositor!(State);
//!
//! let display = Display::<State>::new(MemoryTransport::new());
//! let state = State {
//!     compositor: CompositorState::new::<State>(&display.handle()),
//! };
//! ```

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;

use tracing::{error, trace};

use crate::protocols::wayland_core::wl_compositor::{self, WlCompositor};
use crate::protocols::wayland_core::wl_surface::{self, WlSurface};
use crate::utils::user_data::UserDataMap;
use crate::utils::{DeadResource, IsAlive};
use crate::wayland::{
    ClientId, DataInit, Dispatch, DisplayHandle, GlobalDispatch, GlobalId, New, Resource, ResourceSet,
};

const COMPOSITOR_VERSION: u32 = 1;

/// Identifier of a destruction hook, to remove it later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

type DestructionHook<D> = Box<dyn FnOnce(&mut D, &Resource<WlSurface>)>;

/// Data attached to every `wl_surface`
pub struct SurfaceData {
    user_data: UserDataMap,
    next_hook: Cell<u64>,
    // boxed `DestructionHook<D>`, `D` is only known when they run
    hooks: RefCell<Vec<(HookId, Box<dyn Any>)>>,
}

impl SurfaceData {
    fn new() -> SurfaceData {
        SurfaceData {
            user_data: UserDataMap::new(),
            next_hook: Cell::new(0),
            hooks: RefCell::new(Vec::new()),
        }
    }

    /// The user data map of the surface
    pub fn user_data(&self) -> &UserDataMap {
        &self.user_data
    }
}

impl fmt::Debug for SurfaceData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceData")
            .field("user_data", &self.user_data)
            .field("hooks", &self.hooks.borrow().len())
            .finish()
    }
}

/// Access the data of a surface
///
/// Returns `None` if the object was not created by [`CompositorState`].
pub fn with_surface_data<T>(surface: &Resource<WlSurface>, f: impl FnOnce(&SurfaceData) -> T) -> Option<T> {
    surface.data::<SurfaceData>().map(f)
}

/// The user data map of a surface
pub fn surface_user_data(surface: &Resource<WlSurface>) -> Option<&UserDataMap> {
    surface.data::<SurfaceData>().map(SurfaceData::user_data)
}

/// Run `hook` when `surface` gets destroyed
///
/// Hooks run once, in the order they were added, before
/// [`CompositorHandler::surface_destroyed`]. Fails if the surface is already dead.
pub fn add_destruction_hook<D, F>(surface: &Resource<WlSurface>, hook: F) -> Result<HookId, DeadResource>
where
    D: 'static,
    F: FnOnce(&mut D, &Resource<WlSurface>) + 'static,
{
    let Some(data) = surface.data::<SurfaceData>() else {
        return Err(DeadResource);
    };
    if !surface.alive() {
        return Err(DeadResource);
    }
    let id = HookId(data.next_hook.get());
    data.next_hook.set(id.0 + 1);
    let hook: DestructionHook<D> = Box::new(hook);
    data.hooks.borrow_mut().push((id, Box::new(hook)));
    Ok(id)
}

/// Remove a destruction hook before it ran
pub fn remove_destruction_hook(surface: &Resource<WlSurface>, hook: HookId) {
    if let Some(data) = surface.data::<SurfaceData>() {
        data.hooks.borrow_mut().retain(|(id, _)| *id != hook);
    }
}

/// Handler for the compositor global
pub trait CompositorHandler {
    /// [`CompositorState`] getter
    fn compositor_state(&mut self) -> &mut CompositorState;

    /// A client created a surface
    fn new_surface(&mut self, _surface: &Resource<WlSurface>) {}

    /// A surface was destroyed, its destruction hooks already ran
    fn surface_destroyed(&mut self, _surface: &Resource<WlSurface>) {}
}

/// State of the `wl_compositor` global
#[derive(Debug)]
pub struct CompositorState {
    global: GlobalId,
    surfaces: ResourceSet<WlSurface>,
}

impl CompositorState {
    /// Create the `wl_compositor` global
    pub fn new<D>(display: &DisplayHandle) -> CompositorState
    where
        D: GlobalDispatch<WlCompositor, ()>
            + Dispatch<WlCompositor, ()>
            + Dispatch<WlSurface, SurfaceData>
            + CompositorHandler
            + 'static,
    {
        let global = display.create_global::<D, WlCompositor, _>(COMPOSITOR_VERSION, ());
        CompositorState {
            global: global.id(),
            surfaces: ResourceSet::new(),
        }
    }

    /// Id of the global
    pub fn global(&self) -> GlobalId {
        self.global
    }

    /// Every live surface
    pub fn surfaces(&self) -> Vec<Resource<WlSurface>> {
        self.surfaces.snapshot()
    }
}

impl<D> GlobalDispatch<WlCompositor, (), D> for CompositorState
where
    D: GlobalDispatch<WlCompositor, ()>
        + Dispatch<WlCompositor, ()>
        + Dispatch<WlSurface, SurfaceData>
        + CompositorHandler
        + 'static,
{
    fn bind(
        _state: &mut D,
        _handle: &DisplayHandle,
        _client: ClientId,
        resource: New<WlCompositor>,
        _global_data: &(),
        data_init: &mut DataInit<'_, D>,
    ) {
        data_init.init(resource, ());
    }
}

impl<D> Dispatch<WlCompositor, (), D> for CompositorState
where
    D: Dispatch<WlCompositor, ()> + Dispatch<WlSurface, SurfaceData> + CompositorHandler + 'static,
{
    fn request(
        state: &mut D,
        _client: ClientId,
        _resource: &Resource<WlCompositor>,
        request: wl_compositor::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        data_init: &mut DataInit<'_, D>,
    ) {
        match request {
            wl_compositor::Request::CreateSurface { id } => {
                let surface = data_init.init(id, SurfaceData::new());
                state.compositor_state().surfaces.insert(&surface);
                state.new_surface(&surface);
            }
        }
    }
}

impl<D> Dispatch<WlSurface, SurfaceData, D> for CompositorState
where
    D: Dispatch<WlSurface, SurfaceData> + CompositorHandler + 'static,
{
    fn request(
        _state: &mut D,
        _client: ClientId,
        _resource: &Resource<WlSurface>,
        request: wl_surface::Request,
        _data: &SurfaceData,
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, D>,
    ) {
        match request {
            wl_surface::Request::Destroy => {}
        }
    }

    fn destroyed(state: &mut D, _client: ClientId, surface: &Resource<WlSurface>, data: &SurfaceData) {
        let hooks = std::mem::take(&mut *data.hooks.borrow_mut());
        trace!(surface = ?surface, hooks = hooks.len(), "Running destruction hooks");
        for (_, hook) in hooks {
            match hook.downcast::<DestructionHook<D>>() {
                Ok(hook) => (*hook)(state, surface),
                Err(_) => error!(surface = ?surface, "Destruction hook was added for another state type"),
            }
        }
        state.surface_destroyed(surface);
    }
}

/// Implement the `wl_compositor` and `wl_surface` dispatching for a state type
#[macro_export]
macro_rules! delegate_compositor {
    ($ty: ty) => {
        $crate::delegate_global_dispatch!($ty: [
            $crate::protocols::wayland_core::wl_compositor::WlCompositor: ()
        ] => $crate::wayland::compositor::CompositorState);

        $crate::delegate_dispatch!($ty: [
            $crate::protocols::wayland_core::wl_compositor::WlCompositor: (),
            $crate::protocols::wayland_core::wl_surface::WlSurface: $crate::wayland::compositor::SurfaceData
        ] => $crate::wayland::compositor::CompositorState);
    };
}
