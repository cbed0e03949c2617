//! Plasma window management
//!
//! Publishes the windows of the compositor to task managers and pagers. The compositor
//! creates a [`PlasmaWindow`] for each window it manages and keeps its properties up to
//! date, clients fetch window objects with `get_window` and receive the whole state
//! followed by `initial_state`.
//!
//! Requests of the clients (closing a window, changing its state...) are only forwarded
//! to the [`PlasmaWindowManagementHandler`], the compositor decides what happens.
//!
//! ```
//! use plasma_wayland_server::delegate_plasma_window_management;
//! use plasma_wayland_server::protocols::plasma_window_management::org_kde_plasma_window::State as WindowState;
//! use plasma_wayland_server::protocols::plasma_window_management::org_kde_plasma_window_management::ShowDesktop;
//! use plasma_wayland_server::wayland::plasma_window_management::{
//!     PlasmaWindow, PlasmaWindowManagementHandler, PlasmaWindowManagementState,
//! };
//! use plasma_wayland_server::wayland::{Display, MemoryTransport};
//!
//! struct State {
//!     windows: PlasmaWindowManagementState,
//! }
//!
//! impl PlasmaWindowManagementHandler for State {
//!     fn plasma_window_management_state(&mut self) -> &mut PlasmaWindowManagementState {
//!         &mut self.windows
//!     }
//!
//!     fn request_state_change(&mut self, window: &PlasmaWindow, flag: WindowState, enabled: bool) {
//!         if flag == WindowState::MINIMIZED {
//!             window.set_minimized(enabled);
//!         }
//!     }
//! }
//!
//! delegate_plasma_window_management!(State);
//!
//! let display = Display::<State>::new(MemoryTransport::new());
//! let mut windows = PlasmaWindowManagementState::new::<State>(&display.handle(), ShowDesktop::Disabled);
//! let window = windows.create_window();
//! window.set_title("Konsole");
//! window.set_app_id("org.kde.konsole");
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{self, Rc};

use tracing::{debug, trace, warn};

use crate::protocols::plasma_window_management::org_kde_plasma_window::{OrgKdePlasmaWindow, State};
use crate::protocols::plasma_window_management::org_kde_plasma_window_management::{
    self, OrgKdePlasmaWindowManagement, ShowDesktop,
};
use crate::utils::IsAlive;
use crate::wayland::plasma_virtual_desktop::{DesktopRegistry, PlasmaVirtualDesktopState};
use crate::wayland::{ClientId, DataInit, Dispatch, DisplayHandle, Global, GlobalDispatch, GlobalId, New, Resource, WEnum};

mod icon;
mod window;

pub use icon::WindowIcon;
pub use window::{PlasmaWindow, PlasmaWindowData, WindowLifecycle};

const MANAGEMENT_VERSION: u32 = 11;

/// Handler of the window management requests
pub trait PlasmaWindowManagementHandler {
    /// [`PlasmaWindowManagementState`] getter
    fn plasma_window_management_state(&mut self) -> &mut PlasmaWindowManagementState;

    /// A client asked to enter or leave the show desktop mode
    fn request_show_desktop(&mut self, _state: ShowDesktop) {}

    /// A client asked to change a state flag of a window
    ///
    /// Called once per flag of a `set_state` request.
    fn request_state_change(&mut self, _window: &PlasmaWindow, _flag: State, _enabled: bool) {}

    /// A client asked to move a window to a legacy virtual desktop number
    fn request_virtual_desktop(&mut self, _window: &PlasmaWindow, _number: u32) {}

    /// The taskbar entry geometries of a window changed
    fn minimized_geometries_changed(&mut self, _window: &PlasmaWindow) {}

    /// A client asked to close a window
    fn close_requested(&mut self, _window: &PlasmaWindow) {}

    /// A client asked for an interactive move
    fn move_requested(&mut self, _window: &PlasmaWindow) {}

    /// A client asked for an interactive resize
    fn resize_requested(&mut self, _window: &PlasmaWindow) {}

    /// A client asked to put a window on a virtual desktop
    fn enter_virtual_desktop_requested(&mut self, _window: &PlasmaWindow, _desktop: &str) {}

    /// A client asked to put a window on a new virtual desktop
    fn enter_new_virtual_desktop_requested(&mut self, _window: &PlasmaWindow) {}

    /// A client asked to take a window off a virtual desktop
    fn leave_virtual_desktop_requested(&mut self, _window: &PlasmaWindow, _desktop: &str) {}
}

#[derive(Debug)]
pub(crate) struct ManagerInner {
    windows: RefCell<Vec<PlasmaWindow>>,
    unmapped: RefCell<Vec<PlasmaWindow>>,
    next_id: Cell<u32>,
    show_desktop: Cell<ShowDesktop>,
    stacking_order: RefCell<Vec<u32>>,
    desktops: RefCell<Option<DesktopRegistry>>,
}

impl ManagerInner {
    fn find(&self, internal_id: u32) -> Option<PlasmaWindow> {
        self.windows
            .borrow()
            .iter()
            .find(|window| window.internal_id() == internal_id)
            .cloned()
    }
}

/// State of the `org_kde_plasma_window_management` global
#[derive(Debug)]
pub struct PlasmaWindowManagementState {
    inner: Rc<ManagerInner>,
    global: Global<OrgKdePlasmaWindowManagement>,
}

impl PlasmaWindowManagementState {
    /// Create the window management global
    pub fn new<D>(display: &DisplayHandle, show_desktop: ShowDesktop) -> PlasmaWindowManagementState
    where
        D: GlobalDispatch<OrgKdePlasmaWindowManagement, ()>
            + Dispatch<OrgKdePlasmaWindowManagement, ()>
            + Dispatch<OrgKdePlasmaWindow, PlasmaWindowData>
            + PlasmaWindowManagementHandler
            + 'static,
    {
        let global = display.create_global::<D, OrgKdePlasmaWindowManagement, _>(MANAGEMENT_VERSION, ());
        PlasmaWindowManagementState {
            inner: Rc::new(ManagerInner {
                windows: RefCell::new(Vec::new()),
                unmapped: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
                show_desktop: Cell::new(show_desktop),
                stacking_order: RefCell::new(Vec::new()),
                desktops: RefCell::new(None),
            }),
            global,
        }
    }

    /// Id of the global
    pub fn global(&self) -> GlobalId {
        self.global.id()
    }

    /// Create a mapped window and announce it
    pub fn create_window(&mut self) -> PlasmaWindow {
        let internal_id = self.inner.next_id.get();
        self.inner.next_id.set(internal_id.wrapping_add(1));

        let window = PlasmaWindow::new(internal_id, Rc::downgrade(&self.inner), WindowLifecycle::Mapped);
        self.inner.windows.borrow_mut().push(window.clone());
        debug!(internal_id, "Window created");

        self.global.resources().broadcast(|manager| {
            manager.send_event(org_kde_plasma_window_management::Event::Window { id: internal_id });
        });
        window
    }

    /// Mapped windows, in creation order
    pub fn windows(&self) -> Vec<PlasmaWindow> {
        self.inner.windows.borrow().clone()
    }

    /// Windows gone on the compositor side that clients still hold
    pub fn unmapped_windows(&self) -> Vec<PlasmaWindow> {
        self.inner.unmapped.borrow().clone()
    }

    /// The mapped window with this internal id
    pub fn window(&self, internal_id: u32) -> Option<PlasmaWindow> {
        self.inner.find(internal_id)
    }

    /// Current show desktop state
    pub fn show_desktop(&self) -> ShowDesktop {
        self.inner.show_desktop.get()
    }

    /// Enter or leave the show desktop mode
    pub fn set_show_desktop(&mut self, state: ShowDesktop) {
        if self.inner.show_desktop.replace(state) == state {
            return;
        }
        self.global.resources().broadcast(|manager| {
            manager.send_event(org_kde_plasma_window_management::Event::ShowDesktopChanged { state });
        });
    }

    /// Internal ids of the windows, bottom-most first
    pub fn stacking_order(&self) -> Vec<u32> {
        self.inner.stacking_order.borrow().clone()
    }

    /// Change the stacking order
    pub fn set_stacking_order(&mut self, ids: Vec<u32>) {
        if *self.inner.stacking_order.borrow() == ids {
            return;
        }
        *self.inner.stacking_order.borrow_mut() = ids.clone();
        self.global.resources().broadcast(|manager| {
            manager.send_event(org_kde_plasma_window_management::Event::StackingOrderChanged { ids: ids.clone() });
        });
    }

    /// Link the windows with virtual desktops
    ///
    /// Windows can then only be put on desktops of `desktops`, and leave a desktop when
    /// it is removed. Linking is meant to happen once.
    pub fn set_virtual_desktop_management(&mut self, desktops: &PlasmaVirtualDesktopState) {
        let registry = desktops.registry().clone();
        let manager = Rc::downgrade(&self.inner);
        registry.on_removed(move |id| leave_removed_desktop(&manager, id));
        if self.inner.desktops.replace(Some(registry)).is_some() {
            warn!("Window management was already linked to virtual desktops");
        }
    }
}

fn leave_removed_desktop(manager: &rc::Weak<ManagerInner>, id: &str) {
    let Some(manager) = manager.upgrade() else {
        return;
    };
    let windows: Vec<PlasmaWindow> = manager
        .windows
        .borrow()
        .iter()
        .chain(manager.unmapped.borrow().iter())
        .cloned()
        .collect();
    for window in windows {
        window.remove_plasma_virtual_desktop(id);
    }
}

impl<D> GlobalDispatch<OrgKdePlasmaWindowManagement, (), D> for PlasmaWindowManagementState
where
    D: GlobalDispatch<OrgKdePlasmaWindowManagement, ()>
        + Dispatch<OrgKdePlasmaWindowManagement, ()>
        + Dispatch<OrgKdePlasmaWindow, PlasmaWindowData>
        + PlasmaWindowManagementHandler
        + 'static,
{
    fn bind(
        state: &mut D,
        _handle: &DisplayHandle,
        _client: ClientId,
        resource: New<OrgKdePlasmaWindowManagement>,
        _global_data: &(),
        data_init: &mut DataInit<'_, D>,
    ) {
        let manager = data_init.init(resource, ());
        let inner = state.plasma_window_management_state().inner.clone();

        for window in inner.windows.borrow().iter() {
            manager.send_event(org_kde_plasma_window_management::Event::Window {
                id: window.internal_id(),
            });
        }
        manager.send_event(org_kde_plasma_window_management::Event::StackingOrderChanged {
            ids: inner.stacking_order.borrow().clone(),
        });
        manager.send_event(org_kde_plasma_window_management::Event::ShowDesktopChanged {
            state: inner.show_desktop.get(),
        });
    }
}

impl<D> Dispatch<OrgKdePlasmaWindowManagement, (), D> for PlasmaWindowManagementState
where
    D: Dispatch<OrgKdePlasmaWindowManagement, ()>
        + Dispatch<OrgKdePlasmaWindow, PlasmaWindowData>
        + PlasmaWindowManagementHandler
        + 'static,
{
    fn request(
        state: &mut D,
        _client: ClientId,
        _resource: &Resource<OrgKdePlasmaWindowManagement>,
        request: org_kde_plasma_window_management::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        data_init: &mut DataInit<'_, D>,
    ) {
        match request {
            org_kde_plasma_window_management::Request::ShowDesktop { state: show_desktop } => match show_desktop {
                WEnum::Value(show_desktop) => state.request_show_desktop(show_desktop),
                WEnum::Unknown(value) => warn!(value, "Unknown show desktop state"),
            },
            org_kde_plasma_window_management::Request::GetWindow { id, internal_window_id } => {
                let inner = state.plasma_window_management_state().inner.clone();
                let (window, temporary) = match inner.find(internal_window_id) {
                    Some(window) => (window, false),
                    None => {
                        trace!(internal_window_id, "Client asked for an unknown window");
                        let window =
                            PlasmaWindow::new(internal_window_id, Rc::downgrade(&inner), WindowLifecycle::Unmapped);
                        (window, true)
                    }
                };
                let resource = data_init.init(id, PlasmaWindowData::new(&window));
                if !resource.alive() {
                    return;
                }
                if temporary {
                    inner.unmapped.borrow_mut().push(window.clone());
                }
                window.attach(&resource);
            }
        }
    }
}

#[allow(missing_docs)]
#[macro_export]
macro_rules! delegate_plasma_window_management {
    ($ty: ty) => {
        $crate::delegate_global_dispatch!($ty: [
            $crate::protocols::plasma_window_management::org_kde_plasma_window_management::OrgKdePlasmaWindowManagement: ()
        ] => $crate::wayland::plasma_window_management::PlasmaWindowManagementState);

        $crate::delegate_dispatch!($ty: [
            $crate::protocols::plasma_window_management::org_kde_plasma_window_management::OrgKdePlasmaWindowManagement: (),
            $crate::protocols::plasma_window_management::org_kde_plasma_window::OrgKdePlasmaWindow:
                $crate::wayland::plasma_window_management::PlasmaWindowData
        ] => $crate::wayland::plasma_window_management::PlasmaWindowManagementState);
    };
}
