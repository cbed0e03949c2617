//! Plasma virtual desktops
//!
//! The compositor owns the list of virtual desktops and publishes it with
//! [`PlasmaVirtualDesktopState`]. Clients such as pagers only *request* changes, the
//! requests end up in the [`PlasmaVirtualDesktopHandler`] and the compositor decides.
//!
//! Window management can be linked with
//! [`PlasmaWindowManagementState::set_virtual_desktop_management`](crate::wayland::plasma_window_management::PlasmaWindowManagementState::set_virtual_desktop_management),
//! windows then leave a desktop when it gets removed.
//!
//! ```
//! use plasma_wayland_server::delegate_plasma_virtual_desktop;
//! use plasma_wayland_server::wayland::plasma_virtual_desktop::{
//!     PlasmaVirtualDesktop, PlasmaVirtualDesktopHandler, PlasmaVirtualDesktopState,
//! };
//! use plasma_wayland_server::wayland::{Display, MemoryTransport};
//!
//! struct State {
//!     desktops: PlasmaVirtualDesktopState,
//! }
//!
//! impl PlasmaVirtualDesktopHandler for State {
//!     fn plasma_virtual_desktop_state(&mut self) -> &mut PlasmaVirtualDesktopState {
//!         &mut self.desktops
//!     }
//!
//!     fn activate_requested(&mut self, desktop: &PlasmaVirtualDesktop) {
//!         for other in self.desktops.desktops() {
//!             other.set_active(other == *desktop);
//!         }
//!     }
//! }
//!
//! delegate_plasma_virtual_desktop!(State);
//!
//! let display = Display::<State>::new(MemoryTransport::new());
//! let mut desktops = PlasmaVirtualDesktopState::new::<State>(&display.handle());
//! let first = desktops.create_desktop("0001", None);
//! first.set_name("Desktop 1");
//! first.set_active(true);
//! desktops.send_done();
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{self, Rc};

use tracing::{debug, trace};

use crate::protocols::plasma_virtual_desktop::org_kde_plasma_virtual_desktop::{
    self, OrgKdePlasmaVirtualDesktop,
};
use crate::protocols::plasma_virtual_desktop::org_kde_plasma_virtual_desktop_management::{
    self, OrgKdePlasmaVirtualDesktopManagement,
};
use crate::wayland::{
    ClientId, DataInit, Dispatch, DisplayHandle, Global, GlobalDispatch, GlobalId, New, Resource, ResourceSet,
};

const MANAGEMENT_VERSION: u32 = 2;

struct DesktopInner {
    id: String,
    name: RefCell<String>,
    active: Cell<bool>,
    resources: ResourceSet<OrgKdePlasmaVirtualDesktop>,
}

/// A virtual desktop
///
/// Clones designate the same desktop.
#[derive(Clone)]
pub struct PlasmaVirtualDesktop {
    inner: Rc<DesktopInner>,
}

impl PlasmaVirtualDesktop {
    /// Unique id of the desktop
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// User visible name of the desktop
    pub fn name(&self) -> String {
        self.inner.name.borrow().clone()
    }

    /// Whether the desktop is currently active
    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }

    /// Change the name of the desktop
    pub fn set_name(&self, name: impl Into<String>) {
        let name = name.into();
        if *self.inner.name.borrow() == name {
            return;
        }
        *self.inner.name.borrow_mut() = name.clone();
        self.inner.resources.broadcast(|desktop| {
            desktop.send_event(org_kde_plasma_virtual_desktop::Event::Name { name: name.clone() });
        });
    }

    /// Activate or deactivate the desktop
    pub fn set_active(&self, active: bool) {
        if self.inner.active.replace(active) == active {
            return;
        }
        self.inner.resources.broadcast(|desktop| {
            desktop.send_event(if active {
                org_kde_plasma_virtual_desktop::Event::Activated
            } else {
                org_kde_plasma_virtual_desktop::Event::Deactivated
            });
        });
    }

    /// Tell the clients the desktop changes are complete
    pub fn send_done(&self) {
        self.inner
            .resources
            .broadcast(|desktop| desktop.send_event(org_kde_plasma_virtual_desktop::Event::Done));
    }

    /// Retrieve the desktop of a desktop resource, `None` for inert resources
    pub fn from_resource(resource: &Resource<OrgKdePlasmaVirtualDesktop>) -> Option<PlasmaVirtualDesktop> {
        resource
            .data::<PlasmaVirtualDesktopData>()
            .and_then(|data| data.desktop.upgrade())
            .map(|inner| PlasmaVirtualDesktop { inner })
    }

    fn replay(&self, desktop: &Resource<OrgKdePlasmaVirtualDesktop>) {
        desktop.send_event(org_kde_plasma_virtual_desktop::Event::DesktopId {
            desktop_id: self.inner.id.clone(),
        });
        desktop.send_event(org_kde_plasma_virtual_desktop::Event::Name { name: self.name() });
        if self.is_active() {
            desktop.send_event(org_kde_plasma_virtual_desktop::Event::Activated);
        }
        desktop.send_event(org_kde_plasma_virtual_desktop::Event::Done);
    }
}

impl PartialEq for PlasmaVirtualDesktop {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for PlasmaVirtualDesktop {}

impl fmt::Debug for PlasmaVirtualDesktop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlasmaVirtualDesktop")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name.borrow())
            .field("active", &self.inner.active.get())
            .finish()
    }
}

type RemovalHook = Rc<dyn Fn(&str)>;

#[derive(Default)]
struct RegistryInner {
    desktops: RefCell<Vec<PlasmaVirtualDesktop>>,
    rows: Cell<u32>,
    removal_hooks: RefCell<Vec<RemovalHook>>,
}

/// Shared view of the desktop list, used by window management
#[derive(Clone, Default)]
pub(crate) struct DesktopRegistry {
    inner: Rc<RegistryInner>,
}

impl DesktopRegistry {
    pub(crate) fn contains(&self, id: &str) -> bool {
        self.inner.desktops.borrow().iter().any(|d| d.id() == id)
    }

    pub(crate) fn active_ids(&self) -> Vec<String> {
        self.inner
            .desktops
            .borrow()
            .iter()
            .filter(|d| d.is_active())
            .map(|d| d.id().to_owned())
            .collect()
    }

    pub(crate) fn on_removed(&self, hook: impl Fn(&str) + 'static) {
        self.inner.removal_hooks.borrow_mut().push(Rc::new(hook));
    }

    fn find(&self, id: &str) -> Option<PlasmaVirtualDesktop> {
        self.inner.desktops.borrow().iter().find(|d| d.id() == id).cloned()
    }
}

impl fmt::Debug for DesktopRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesktopRegistry")
            .field("desktops", &self.inner.desktops.borrow())
            .field("rows", &self.inner.rows.get())
            .finish_non_exhaustive()
    }
}

/// Global data of the virtual desktop management global
#[derive(Debug)]
pub struct PlasmaVirtualDesktopGlobalData {
    registry: DesktopRegistry,
}

/// User data of a desktop resource
#[derive(Debug)]
pub struct PlasmaVirtualDesktopData {
    desktop: rc::Weak<DesktopInner>,
}

/// Handler of the virtual desktop management requests
pub trait PlasmaVirtualDesktopHandler {
    /// [`PlasmaVirtualDesktopState`] getter
    fn plasma_virtual_desktop_state(&mut self) -> &mut PlasmaVirtualDesktopState;

    /// A client asked for a new desktop at `position`
    fn create_desktop_requested(&mut self, _name: String, _position: u32) {}

    /// A client asked for a desktop to be removed
    fn remove_desktop_requested(&mut self, _id: &str) {}

    /// A client asked for a desktop to be activated
    fn activate_requested(&mut self, _desktop: &PlasmaVirtualDesktop) {}
}

/// State of the `org_kde_plasma_virtual_desktop_management` global
#[derive(Debug)]
pub struct PlasmaVirtualDesktopState {
    registry: DesktopRegistry,
    global: Global<OrgKdePlasmaVirtualDesktopManagement>,
}

impl PlasmaVirtualDesktopState {
    /// Create the virtual desktop management global
    pub fn new<D>(display: &DisplayHandle) -> PlasmaVirtualDesktopState
    where
        D: GlobalDispatch<OrgKdePlasmaVirtualDesktopManagement, PlasmaVirtualDesktopGlobalData>
            + Dispatch<OrgKdePlasmaVirtualDesktopManagement, ()>
            + Dispatch<OrgKdePlasmaVirtualDesktop, PlasmaVirtualDesktopData>
            + PlasmaVirtualDesktopHandler
            + 'static,
    {
        let registry = DesktopRegistry::default();
        let global = display.create_global::<D, OrgKdePlasmaVirtualDesktopManagement, _>(
            MANAGEMENT_VERSION,
            PlasmaVirtualDesktopGlobalData {
                registry: registry.clone(),
            },
        );
        PlasmaVirtualDesktopState { registry, global }
    }

    /// Id of the global
    pub fn global(&self) -> GlobalId {
        self.global.id()
    }

    /// Create a desktop, or return the existing one with this id
    ///
    /// `position` is clamped to the number of desktops, `None` appends.
    pub fn create_desktop(&mut self, id: impl Into<String>, position: Option<u32>) -> PlasmaVirtualDesktop {
        let id = id.into();
        if let Some(desktop) = self.registry.find(&id) {
            return desktop;
        }

        let desktop = PlasmaVirtualDesktop {
            inner: Rc::new(DesktopInner {
                id: id.clone(),
                name: RefCell::new(String::new()),
                active: Cell::new(false),
                resources: ResourceSet::new(),
            }),
        };
        let position = {
            let mut desktops = self.registry.inner.desktops.borrow_mut();
            let position = position.map_or(desktops.len(), |p| (p as usize).min(desktops.len()));
            desktops.insert(position, desktop.clone());
            position as u32
        };
        debug!(id = %id, position, "Virtual desktop created");

        self.global.resources().broadcast(|manager| {
            manager.send_event(org_kde_plasma_virtual_desktop_management::Event::DesktopCreated {
                desktop_id: id.clone(),
                position,
            });
        });
        desktop
    }

    /// Remove a desktop
    ///
    /// Its resources receive `removed` and get destroyed, linked window management makes
    /// its windows leave it.
    pub fn remove_desktop(&mut self, id: &str) {
        let removed = {
            let mut desktops = self.registry.inner.desktops.borrow_mut();
            let Some(idx) = desktops.iter().position(|d| d.id() == id) else {
                return;
            };
            desktops.remove(idx)
        };
        debug!(id, "Virtual desktop removed");

        removed.inner.resources.broadcast(|desktop| {
            desktop.send_event(org_kde_plasma_virtual_desktop::Event::Removed);
            if let Some(dh) = desktop.display_handle() {
                dh.destroy_object(desktop);
            }
        });
        self.global.resources().broadcast(|manager| {
            manager.send_event(org_kde_plasma_virtual_desktop_management::Event::DesktopRemoved {
                desktop_id: id.to_owned(),
            });
        });

        let hooks = self.registry.inner.removal_hooks.borrow().clone();
        for hook in hooks {
            hook(id);
        }
    }

    /// Set the number of rows of the desktop grid
    pub fn set_rows(&mut self, rows: u32) {
        if self.registry.inner.rows.replace(rows) == rows {
            return;
        }
        self.global.resources().broadcast(|manager| {
            manager.send_event(org_kde_plasma_virtual_desktop_management::Event::Rows { rows });
        });
    }

    /// Number of rows of the desktop grid
    pub fn rows(&self) -> u32 {
        self.registry.inner.rows.get()
    }

    /// Tell the clients the desktop list changes are complete
    pub fn send_done(&self) {
        self.global
            .resources()
            .broadcast(|manager| manager.send_event(org_kde_plasma_virtual_desktop_management::Event::Done));
    }

    /// Every desktop, in order
    pub fn desktops(&self) -> Vec<PlasmaVirtualDesktop> {
        self.registry.inner.desktops.borrow().clone()
    }

    /// The desktop with this id
    pub fn desktop(&self, id: &str) -> Option<PlasmaVirtualDesktop> {
        self.registry.find(id)
    }

    pub(crate) fn registry(&self) -> &DesktopRegistry {
        &self.registry
    }
}

impl<D> GlobalDispatch<OrgKdePlasmaVirtualDesktopManagement, PlasmaVirtualDesktopGlobalData, D>
    for PlasmaVirtualDesktopState
where
    D: GlobalDispatch<OrgKdePlasmaVirtualDesktopManagement, PlasmaVirtualDesktopGlobalData>
        + Dispatch<OrgKdePlasmaVirtualDesktopManagement, ()>
        + Dispatch<OrgKdePlasmaVirtualDesktop, PlasmaVirtualDesktopData>
        + PlasmaVirtualDesktopHandler
        + 'static,
{
    fn bind(
        _state: &mut D,
        _handle: &DisplayHandle,
        _client: ClientId,
        resource: New<OrgKdePlasmaVirtualDesktopManagement>,
        global_data: &PlasmaVirtualDesktopGlobalData,
        data_init: &mut DataInit<'_, D>,
    ) {
        let manager = data_init.init(resource, ());
        let desktops = global_data.registry.inner.desktops.borrow().clone();
        for (position, desktop) in desktops.iter().enumerate() {
            manager.send_event(org_kde_plasma_virtual_desktop_management::Event::DesktopCreated {
                desktop_id: desktop.id().to_owned(),
                position: position as u32,
            });
        }
        manager.send_event(org_kde_plasma_virtual_desktop_management::Event::Rows {
            rows: global_data.registry.inner.rows.get(),
        });
        manager.send_event(org_kde_plasma_virtual_desktop_management::Event::Done);
    }
}

impl<D> Dispatch<OrgKdePlasmaVirtualDesktopManagement, (), D> for PlasmaVirtualDesktopState
where
    D: Dispatch<OrgKdePlasmaVirtualDesktopManagement, ()>
        + Dispatch<OrgKdePlasmaVirtualDesktop, PlasmaVirtualDesktopData>
        + PlasmaVirtualDesktopHandler
        + 'static,
{
    fn request(
        state: &mut D,
        _client: ClientId,
        _resource: &Resource<OrgKdePlasmaVirtualDesktopManagement>,
        request: org_kde_plasma_virtual_desktop_management::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        data_init: &mut DataInit<'_, D>,
    ) {
        match request {
            org_kde_plasma_virtual_desktop_management::Request::GetVirtualDesktop { id, desktop_id } => {
                let desktop = state.plasma_virtual_desktop_state().registry.find(&desktop_id);
                match desktop {
                    Some(desktop) => {
                        let resource = data_init.init(
                            id,
                            PlasmaVirtualDesktopData {
                                desktop: Rc::downgrade(&desktop.inner),
                            },
                        );
                        desktop.inner.resources.insert(&resource);
                        desktop.replay(&resource);
                    }
                    None => {
                        trace!(desktop_id = %desktop_id, "Client asked for an unknown virtual desktop");
                        let resource = data_init.init(
                            id,
                            PlasmaVirtualDesktopData {
                                desktop: rc::Weak::new(),
                            },
                        );
                        resource.send_event(org_kde_plasma_virtual_desktop::Event::Removed);
                    }
                }
            }
            org_kde_plasma_virtual_desktop_management::Request::RequestCreateVirtualDesktop { name, position } => {
                state.create_desktop_requested(name, position);
            }
            org_kde_plasma_virtual_desktop_management::Request::RequestRemoveVirtualDesktop { desktop_id } => {
                state.remove_desktop_requested(&desktop_id);
            }
        }
    }
}

impl<D> Dispatch<OrgKdePlasmaVirtualDesktop, PlasmaVirtualDesktopData, D> for PlasmaVirtualDesktopState
where
    D: Dispatch<OrgKdePlasmaVirtualDesktop, PlasmaVirtualDesktopData> + PlasmaVirtualDesktopHandler + 'static,
{
    fn request(
        state: &mut D,
        _client: ClientId,
        resource: &Resource<OrgKdePlasmaVirtualDesktop>,
        request: org_kde_plasma_virtual_desktop::Request,
        _data: &PlasmaVirtualDesktopData,
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, D>,
    ) {
        match request {
            org_kde_plasma_virtual_desktop::Request::RequestActivate => {
                if let Some(desktop) = PlasmaVirtualDesktop::from_resource(resource) {
                    state.activate_requested(&desktop);
                }
            }
        }
    }
}

#[allow(missing_docs)]
#[macro_export]
macro_rules! delegate_plasma_virtual_desktop {
    ($ty: ty) => {
        $crate::delegate_global_dispatch!($ty: [
            $crate::protocols::plasma_virtual_desktop::org_kde_plasma_virtual_desktop_management::OrgKdePlasmaVirtualDesktopManagement:
                $crate::wayland::plasma_virtual_desktop::PlasmaVirtualDesktopGlobalData
        ] => $crate::wayland::plasma_virtual_desktop::PlasmaVirtualDesktopState);

        $crate::delegate_dispatch!($ty: [
            $crate::protocols::plasma_virtual_desktop::org_kde_plasma_virtual_desktop_management::OrgKdePlasmaVirtualDesktopManagement: (),
            $crate::protocols::plasma_virtual_desktop::org_kde_plasma_virtual_desktop::OrgKdePlasmaVirtualDesktop:
                $crate::wayland::plasma_virtual_desktop::PlasmaVirtualDesktopData
        ] => $crate::wayland::plasma_virtual_desktop::PlasmaVirtualDesktopState);
    };
}
