use std::cell::RefCell;
use std::fmt;
use std::os::unix::io::OwnedFd;
use std::rc::{self, Rc};

use tracing::{trace, warn};

use crate::protocols::plasma_window_management::org_kde_plasma_window::{self, OrgKdePlasmaWindow, State};
use crate::protocols::wayland_core::wl_surface::WlSurface;
use crate::utils::Rectangle;
use crate::wayland::compositor::{add_destruction_hook, remove_destruction_hook, HookId};
use crate::wayland::plasma_virtual_desktop::DesktopRegistry;
use crate::wayland::{ClientId, DataInit, Dispatch, DisplayHandle, Resource, ResourceSet, Weak};

use super::icon::{self, WindowIcon};
use super::{ManagerInner, PlasmaWindowManagementHandler, PlasmaWindowManagementState};

/// Lifecycle of a [`PlasmaWindow`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowLifecycle {
    /// Managed by the compositor and listed by the manager global
    Mapped,
    /// Unmapped while clients still hold window objects
    Unmapped,
    /// Gone for good
    Destroyed,
}

#[derive(Debug)]
struct MinimizedGeometry {
    panel: Weak<WlSurface>,
    geometry: Rectangle<i32>,
    hook: HookId,
}

#[derive(Debug)]
struct WindowState {
    title: String,
    app_id: String,
    pid: u32,
    icon: Option<WindowIcon>,
    application_menu: Option<(String, String)>,
    virtual_desktop: u32,
    flags: State,
    desktops: Vec<String>,
    parent: Option<rc::Weak<WindowInner>>,
    children: Vec<rc::Weak<WindowInner>>,
    geometry: Rectangle<i32>,
    minimized: Vec<MinimizedGeometry>,
    lifecycle: WindowLifecycle,
}

pub(super) struct WindowInner {
    internal_id: u32,
    state: RefCell<WindowState>,
    resources: ResourceSet<OrgKdePlasmaWindow>,
    manager: rc::Weak<ManagerInner>,
}

/// A window as seen by task managers
///
/// Created by [`PlasmaWindowManagementState::create_window`], clones designate the same
/// window.
#[derive(Clone)]
pub struct PlasmaWindow {
    inner: Rc<WindowInner>,
}

/// User data of a window resource
#[derive(Debug)]
pub struct PlasmaWindowData {
    window: rc::Weak<WindowInner>,
}

impl PlasmaWindowData {
    pub(super) fn new(window: &PlasmaWindow) -> PlasmaWindowData {
        PlasmaWindowData {
            window: Rc::downgrade(&window.inner),
        }
    }

    /// The window of this resource, `None` once it is destroyed
    pub fn window(&self) -> Option<PlasmaWindow> {
        self.window.upgrade().map(|inner| PlasmaWindow { inner })
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

macro_rules! state_setters {
    ($($(#[$attr:meta])* $name:ident => $flag:ident,)*) => {
        $(
            $(#[$attr])*
            pub fn $name(&self, enabled: bool) {
                self.set_state_flag(State::$flag, enabled);
            }
        )*
    };
}

impl PlasmaWindow {
    pub(super) fn new(internal_id: u32, manager: rc::Weak<ManagerInner>, lifecycle: WindowLifecycle) -> PlasmaWindow {
        PlasmaWindow {
            inner: Rc::new(WindowInner {
                internal_id,
                state: RefCell::new(WindowState {
                    title: String::new(),
                    app_id: String::new(),
                    pid: 0,
                    icon: None,
                    application_menu: None,
                    virtual_desktop: 0,
                    flags: State::empty(),
                    desktops: Vec::new(),
                    parent: None,
                    children: Vec::new(),
                    geometry: Rectangle::default(),
                    minimized: Vec::new(),
                    lifecycle,
                }),
                resources: ResourceSet::new(),
                manager,
            }),
        }
    }

    /// Id used by clients in `get_window`
    pub fn internal_id(&self) -> u32 {
        self.inner.internal_id
    }

    /// Current lifecycle state
    pub fn lifecycle(&self) -> WindowLifecycle {
        self.inner.state.borrow().lifecycle
    }

    /// Window title
    pub fn title(&self) -> String {
        self.inner.state.borrow().title.clone()
    }

    /// Application id
    pub fn app_id(&self) -> String {
        self.inner.state.borrow().app_id.clone()
    }

    /// Process id, 0 when unknown
    pub fn pid(&self) -> u32 {
        self.inner.state.borrow().pid
    }

    /// Icon of the window
    pub fn icon(&self) -> Option<WindowIcon> {
        self.inner.state.borrow().icon.clone()
    }

    /// DBus service name and object path of the application menu
    pub fn application_menu(&self) -> Option<(String, String)> {
        self.inner.state.borrow().application_menu.clone()
    }

    /// Legacy virtual desktop number
    pub fn virtual_desktop(&self) -> u32 {
        self.inner.state.borrow().virtual_desktop
    }

    /// State flags
    pub fn state(&self) -> State {
        self.inner.state.borrow().flags
    }

    /// Whether the window is shown on every virtual desktop
    pub fn is_on_all_desktops(&self) -> bool {
        self.state().contains(State::ON_ALL_DESKTOPS)
    }

    /// Ids of the virtual desktops the window is on
    pub fn plasma_virtual_desktops(&self) -> Vec<String> {
        self.inner.state.borrow().desktops.clone()
    }

    /// Transient parent
    pub fn parent_window(&self) -> Option<PlasmaWindow> {
        self.inner
            .state
            .borrow()
            .parent
            .as_ref()
            .and_then(rc::Weak::upgrade)
            .map(|inner| PlasmaWindow { inner })
    }

    /// Geometry as last set, valid or not
    pub fn geometry(&self) -> Rectangle<i32> {
        self.inner.state.borrow().geometry
    }

    /// Window objects clients hold for this window
    pub fn resources(&self) -> Vec<Resource<OrgKdePlasmaWindow>> {
        self.inner.resources.snapshot()
    }

    /// Taskbar entry geometries, for the panels that are still alive
    pub fn minimized_geometries(&self) -> Vec<(Resource<WlSurface>, Rectangle<i32>)> {
        self.inner
            .state
            .borrow()
            .minimized
            .iter()
            .filter_map(|entry| entry.panel.upgrade().ok().map(|panel| (panel, entry.geometry)))
            .collect()
    }

    /// Retrieve the window of a window resource
    pub fn from_resource(resource: &Resource<OrgKdePlasmaWindow>) -> Option<PlasmaWindow> {
        resource.data::<PlasmaWindowData>().and_then(PlasmaWindowData::window)
    }

    /// Change the title
    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        if !replace(&mut self.inner.state.borrow_mut().title, title.clone()) {
            return;
        }
        self.inner.resources.broadcast(|window| {
            window.send_event(org_kde_plasma_window::Event::TitleChanged { title: title.clone() });
        });
    }

    /// Change the application id
    pub fn set_app_id(&self, app_id: impl Into<String>) {
        let app_id = app_id.into();
        if !replace(&mut self.inner.state.borrow_mut().app_id, app_id.clone()) {
            return;
        }
        self.inner.resources.broadcast(|window| {
            window.send_event(org_kde_plasma_window::Event::AppIdChanged { app_id: app_id.clone() });
        });
    }

    /// Change the process id
    pub fn set_pid(&self, pid: u32) {
        if !replace(&mut self.inner.state.borrow_mut().pid, pid) {
            return;
        }
        self.inner
            .resources
            .broadcast(|window| window.send_event(org_kde_plasma_window::Event::PidChanged { pid }));
    }

    /// Use an icon of the icon theme
    pub fn set_themed_icon_name(&self, name: impl Into<String>) {
        self.set_icon(Some(WindowIcon::Themed(name.into())));
    }

    /// Change the icon
    ///
    /// Anything but a themed icon resets the themed name and sends `icon_changed`, clients
    /// then fetch the pixels with `get_icon`.
    pub fn set_icon(&self, icon: Option<WindowIcon>) {
        let (old_name, new_name) = {
            let mut state = self.inner.state.borrow_mut();
            if state.icon == icon {
                return;
            }
            let old_name = state.icon.as_ref().map_or("", WindowIcon::themed_name).to_owned();
            let new_name = icon.as_ref().map_or("", WindowIcon::themed_name).to_owned();
            state.icon = icon;
            (old_name, new_name)
        };

        if old_name != new_name {
            self.inner.resources.broadcast(|window| {
                window.send_event(org_kde_plasma_window::Event::ThemedIconNameChanged {
                    name: new_name.clone(),
                });
            });
        }
        if new_name.is_empty() {
            self.inner
                .resources
                .broadcast(|window| window.send_event(org_kde_plasma_window::Event::IconChanged));
        }
    }

    /// Change the DBus location of the application menu
    pub fn set_application_menu_paths(&self, service_name: impl Into<String>, object_path: impl Into<String>) {
        let menu = (service_name.into(), object_path.into());
        if !replace(&mut self.inner.state.borrow_mut().application_menu, Some(menu.clone())) {
            return;
        }
        self.inner.resources.broadcast(|window| {
            window.send_event(org_kde_plasma_window::Event::ApplicationMenu {
                service_name: menu.0.clone(),
                object_path: menu.1.clone(),
            });
        });
    }

    /// Change the legacy virtual desktop number
    pub fn set_virtual_desktop(&self, number: u32) {
        if !replace(&mut self.inner.state.borrow_mut().virtual_desktop, number) {
            return;
        }
        self.inner.resources.broadcast(|window| {
            window.send_event(org_kde_plasma_window::Event::VirtualDesktopChanged { number: number as i32 });
        });
    }

    state_setters! {
        /// Whether the window is active
        set_active => ACTIVE,
        /// Whether the window is minimized
        set_minimized => MINIMIZED,
        /// Whether the window is maximized
        set_maximized => MAXIMIZED,
        /// Whether the window is fullscreen
        set_fullscreen => FULLSCREEN,
        /// Whether the window is kept above the others
        set_keep_above => KEEP_ABOVE,
        /// Whether the window is kept below the others
        set_keep_below => KEEP_BELOW,
        /// Whether the window demands attention
        set_demands_attention => DEMANDS_ATTENTION,
        /// Whether the window can be closed
        set_closeable => CLOSEABLE,
        /// Whether the window can be minimized
        set_minimizable => MINIMIZABLE,
        /// Whether the window can be maximized
        set_maximizable => MAXIMIZABLE,
        /// Whether the window can be made fullscreen
        set_fullscreenable => FULLSCREENABLE,
        /// Whether the window is hidden from taskbars
        set_skip_taskbar => SKIPTASKBAR,
        /// Whether the window is hidden from window switchers
        set_skip_switcher => SKIPSWITCHER,
        /// Whether the window can be shaded
        set_shadeable => SHADEABLE,
        /// Whether the window is shaded
        set_shaded => SHADED,
        /// Whether the window can be moved
        set_movable => MOVABLE,
        /// Whether the window can be resized
        set_resizable => RESIZABLE,
        /// Whether the virtual desktop of the window can be changed
        set_virtual_desktop_changeable => VIRTUAL_DESKTOP_CHANGEABLE,
    }

    fn set_state_flag(&self, flag: State, enabled: bool) -> bool {
        let flags = {
            let mut state = self.inner.state.borrow_mut();
            let mut flags = state.flags;
            flags.set(flag, enabled);
            if !replace(&mut state.flags, flags) {
                return false;
            }
            flags
        };
        self.inner
            .resources
            .broadcast(|window| window.send_event(org_kde_plasma_window::Event::StateChanged { flags }));
        true
    }

    /// Show the window on every desktop, or only on the active ones
    pub fn set_on_all_desktops(&self, on_all: bool) {
        if !self.set_state_flag(State::ON_ALL_DESKTOPS, on_all) {
            return;
        }

        if on_all {
            let left = std::mem::take(&mut self.inner.state.borrow_mut().desktops);
            for id in left {
                self.inner.resources.broadcast(|window| {
                    window.send_event(org_kde_plasma_window::Event::VirtualDesktopLeft { id: id.clone() });
                });
            }
        } else {
            let active = self.registry().map(|registry| registry.active_ids()).unwrap_or_default();
            for id in active {
                self.enter_desktop(id);
            }
        }
    }

    /// Put the window on a virtual desktop
    ///
    /// Only desktops known to the linked virtual desktop management are accepted.
    pub fn add_plasma_virtual_desktop(&self, id: &str) {
        let Some(registry) = self.registry() else {
            warn!(id, "Window management is not linked to virtual desktops");
            return;
        };
        if !registry.contains(id) {
            trace!(id, "Ignoring unknown virtual desktop");
            return;
        }
        if !self.enter_desktop(id.to_owned()) {
            return;
        }
        if self.is_on_all_desktops() {
            self.set_state_flag(State::ON_ALL_DESKTOPS, false);
        }
    }

    /// Take the window off a virtual desktop
    ///
    /// Removing the last desktop puts the window on all desktops.
    pub fn remove_plasma_virtual_desktop(&self, id: &str) {
        let now_empty = {
            let mut state = self.inner.state.borrow_mut();
            let Some(idx) = state.desktops.iter().position(|desktop| desktop == id) else {
                return;
            };
            state.desktops.remove(idx);
            state.desktops.is_empty()
        };
        self.inner.resources.broadcast(|window| {
            window.send_event(org_kde_plasma_window::Event::VirtualDesktopLeft { id: id.to_owned() });
        });
        if now_empty {
            self.set_on_all_desktops(true);
        }
    }

    fn enter_desktop(&self, id: String) -> bool {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.desktops.contains(&id) {
                return false;
            }
            state.desktops.push(id.clone());
        }
        self.inner.resources.broadcast(|window| {
            window.send_event(org_kde_plasma_window::Event::VirtualDesktopEntered { id: id.clone() });
        });
        true
    }

    fn registry(&self) -> Option<DesktopRegistry> {
        self.inner.manager.upgrade()?.desktops.borrow().clone()
    }

    /// Change the transient parent
    pub fn set_parent_window(&self, parent: Option<&PlasmaWindow>) {
        if parent.is_some_and(|parent| parent == self) {
            warn!(window = self.inner.internal_id, "A window cannot be its own parent");
            return;
        }
        let previous = {
            let mut state = self.inner.state.borrow_mut();
            let unchanged = match (&state.parent, parent) {
                (Some(current), Some(parent)) => current.as_ptr() == Rc::as_ptr(&parent.inner),
                (None, None) => true,
                _ => false,
            };
            if unchanged {
                return;
            }
            std::mem::replace(&mut state.parent, parent.map(|parent| Rc::downgrade(&parent.inner)))
        };
        let me = Rc::as_ptr(&self.inner);
        if let Some(previous) = previous.as_ref().and_then(rc::Weak::upgrade) {
            previous
                .state
                .borrow_mut()
                .children
                .retain(|child| child.strong_count() > 0 && child.as_ptr() != me);
        }
        if let Some(parent) = parent {
            let mut state = parent.inner.state.borrow_mut();
            state.children.retain(|child| child.strong_count() > 0);
            if !state.children.iter().any(|child| child.as_ptr() == me) {
                state.children.push(Rc::downgrade(&self.inner));
            }
        }
        self.inner.resources.broadcast(|window| self.send_parent(window));
    }

    /// Windows having this one as transient parent
    pub fn child_windows(&self) -> Vec<PlasmaWindow> {
        self.inner
            .state
            .borrow()
            .children
            .iter()
            .filter_map(rc::Weak::upgrade)
            .map(|inner| PlasmaWindow { inner })
            .collect()
    }

    fn send_parent(&self, window: &Resource<OrgKdePlasmaWindow>) {
        let parent = self
            .parent_window()
            .and_then(|parent| parent.inner.resources.first_for_client(window.client_id()))
            .map(|parent| parent.id());
        window.send_event(org_kde_plasma_window::Event::ParentWindow { parent });
    }

    /// Change the geometry, only valid rectangles are sent to clients
    pub fn set_geometry(&self, geometry: Rectangle<i32>) {
        if !replace(&mut self.inner.state.borrow_mut().geometry, geometry) || !geometry.is_valid() {
            return;
        }
        self.inner
            .resources
            .broadcast(|window| window.send_event(geometry_event(geometry)));
    }

    /// The window went away on the compositor side
    ///
    /// Clients holding window objects are told with `unmapped`, the window is destroyed
    /// once they all released them.
    pub fn unmap(&self) {
        if self.lifecycle() != WindowLifecycle::Mapped {
            return;
        }
        let manager = self.inner.manager.upgrade();
        if let Some(manager) = &manager {
            manager.windows.borrow_mut().retain(|window| window != self);
        }

        if self.inner.resources.is_empty() {
            self.mark_destroyed();
            return;
        }

        self.inner.state.borrow_mut().lifecycle = WindowLifecycle::Unmapped;
        if let Some(manager) = &manager {
            manager.unmapped.borrow_mut().push(self.clone());
        }
        self.inner
            .resources
            .broadcast(|window| window.send_event(org_kde_plasma_window::Event::Unmapped));
    }

    fn mark_destroyed(&self) {
        let (children, minimized) = {
            let mut state = self.inner.state.borrow_mut();
            state.lifecycle = WindowLifecycle::Destroyed;
            (std::mem::take(&mut state.children), std::mem::take(&mut state.minimized))
        };
        trace!(window = self.inner.internal_id, "Window destroyed");

        if let Some(manager) = self.inner.manager.upgrade() {
            manager.unmapped.borrow_mut().retain(|window| window != self);
        }
        for entry in minimized {
            if let Ok(panel) = entry.panel.upgrade() {
                remove_destruction_hook(&panel, entry.hook);
            }
        }
        for child in children.iter().filter_map(rc::Weak::upgrade) {
            let child = PlasmaWindow { inner: child };
            let orphaned = {
                let mut state = child.inner.state.borrow_mut();
                let orphaned = state
                    .parent
                    .as_ref()
                    .is_some_and(|parent| parent.as_ptr() == Rc::as_ptr(&self.inner));
                if orphaned {
                    state.parent = None;
                }
                orphaned
            };
            if orphaned {
                child.inner.resources.broadcast(|window| child.send_parent(window));
            }
        }
    }

    pub(super) fn attach(&self, window: &Resource<OrgKdePlasmaWindow>) {
        self.inner.resources.insert(window);
        self.replay(window);
    }

    fn replay(&self, window: &Resource<OrgKdePlasmaWindow>) {
        let (unmapped, geometry) = {
            let state = self.inner.state.borrow();
            window.send_event(org_kde_plasma_window::Event::VirtualDesktopChanged {
                number: state.virtual_desktop as i32,
            });
            for id in &state.desktops {
                window.send_event(org_kde_plasma_window::Event::VirtualDesktopEntered { id: id.clone() });
            }
            if !state.app_id.is_empty() {
                window.send_event(org_kde_plasma_window::Event::AppIdChanged {
                    app_id: state.app_id.clone(),
                });
            }
            if state.pid != 0 {
                window.send_event(org_kde_plasma_window::Event::PidChanged { pid: state.pid });
            }
            if !state.title.is_empty() {
                window.send_event(org_kde_plasma_window::Event::TitleChanged {
                    title: state.title.clone(),
                });
            }
            if let Some((service_name, object_path)) = &state.application_menu {
                window.send_event(org_kde_plasma_window::Event::ApplicationMenu {
                    service_name: service_name.clone(),
                    object_path: object_path.clone(),
                });
            }
            window.send_event(org_kde_plasma_window::Event::StateChanged { flags: state.flags });
            match &state.icon {
                Some(WindowIcon::Themed(name)) if !name.is_empty() => {
                    window.send_event(org_kde_plasma_window::Event::ThemedIconNameChanged { name: name.clone() });
                }
                _ => window.send_event(org_kde_plasma_window::Event::IconChanged),
            }
            (state.lifecycle == WindowLifecycle::Unmapped, state.geometry)
        };

        self.send_parent(window);
        if unmapped {
            window.send_event(org_kde_plasma_window::Event::Unmapped);
        }
        if geometry.is_valid() {
            window.send_event(geometry_event(geometry));
        }
        window.send_event(org_kde_plasma_window::Event::InitialState);
    }

    fn set_minimized_geometry<D>(&self, panel: &Resource<WlSurface>, geometry: Rectangle<i32>) -> bool
    where
        D: PlasmaWindowManagementHandler + 'static,
    {
        {
            let mut state = self.inner.state.borrow_mut();
            if let Some(entry) = state.minimized.iter_mut().find(|entry| entry.panel.is(panel)) {
                return replace(&mut entry.geometry, geometry);
            }
        }

        let window = Rc::downgrade(&self.inner);
        let hook = add_destruction_hook::<D, _>(panel, move |state: &mut D, panel: &Resource<WlSurface>| {
            let Some(inner) = window.upgrade() else {
                return;
            };
            let window = PlasmaWindow { inner };
            if window.forget_panel(panel) {
                state.minimized_geometries_changed(&window);
            }
        });
        let Ok(hook) = hook else {
            return false;
        };
        self.inner.state.borrow_mut().minimized.push(MinimizedGeometry {
            panel: panel.downgrade(),
            geometry,
            hook,
        });
        true
    }

    fn unset_minimized_geometry(&self, panel: &Resource<WlSurface>) -> bool {
        let entry = {
            let mut state = self.inner.state.borrow_mut();
            let Some(idx) = state.minimized.iter().position(|entry| entry.panel.is(panel)) else {
                return false;
            };
            state.minimized.remove(idx)
        };
        remove_destruction_hook(panel, entry.hook);
        true
    }

    fn forget_panel(&self, panel: &Resource<WlSurface>) -> bool {
        let mut state = self.inner.state.borrow_mut();
        let before = state.minimized.len();
        state.minimized.retain(|entry| !entry.panel.is(panel));
        state.minimized.len() != before
    }

    fn write_icon(&self, fd: OwnedFd) {
        if let Err(err) = icon::spawn_writer(self.icon(), fd) {
            warn!(%err, window = self.inner.internal_id, "Failed to spawn the icon writer");
        }
    }
}

fn geometry_event(geometry: Rectangle<i32>) -> org_kde_plasma_window::Event {
    org_kde_plasma_window::Event::Geometry {
        x: geometry.loc.x,
        y: geometry.loc.y,
        width: geometry.size.w as u32,
        height: geometry.size.h as u32,
    }
}

impl PartialEq for PlasmaWindow {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for PlasmaWindow {}

impl fmt::Debug for PlasmaWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("PlasmaWindow")
            .field("internal_id", &self.inner.internal_id)
            .field("title", &state.title)
            .field("lifecycle", &state.lifecycle)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for WindowInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowInner")
            .field("internal_id", &self.internal_id)
            .finish_non_exhaustive()
    }
}

impl<D> Dispatch<OrgKdePlasmaWindow, PlasmaWindowData, D> for PlasmaWindowManagementState
where
    D: Dispatch<OrgKdePlasmaWindow, PlasmaWindowData> + PlasmaWindowManagementHandler + 'static,
{
    fn request(
        state: &mut D,
        _client: ClientId,
        _resource: &Resource<OrgKdePlasmaWindow>,
        request: org_kde_plasma_window::Request,
        data: &PlasmaWindowData,
        dh: &DisplayHandle,
        _data_init: &mut DataInit<'_, D>,
    ) {
        let Some(window) = data.window() else {
            return;
        };

        match request {
            org_kde_plasma_window::Request::SetState { flags, state: values } => {
                let values = State::from_bits_truncate(values);
                for flag in State::from_bits_truncate(flags).iter() {
                    state.request_state_change(&window, flag, values.contains(flag));
                }
            }
            org_kde_plasma_window::Request::SetVirtualDesktop { number } => {
                state.request_virtual_desktop(&window, number);
            }
            org_kde_plasma_window::Request::SetMinimizedGeometry {
                panel,
                x,
                y,
                width,
                height,
            } => {
                let Ok(panel) = dh.get_object::<WlSurface>(panel) else {
                    trace!(window = window.internal_id(), "Minimized geometry for an unknown panel");
                    return;
                };
                let geometry =
                    Rectangle::from_loc_and_size((x as i32, y as i32), (width as i32, height as i32));
                if window.set_minimized_geometry::<D>(&panel, geometry) {
                    state.minimized_geometries_changed(&window);
                }
            }
            org_kde_plasma_window::Request::UnsetMinimizedGeometry { panel } => {
                let Ok(panel) = dh.get_object::<WlSurface>(panel) else {
                    return;
                };
                if window.unset_minimized_geometry(&panel) {
                    state.minimized_geometries_changed(&window);
                }
            }
            org_kde_plasma_window::Request::Close => state.close_requested(&window),
            org_kde_plasma_window::Request::RequestMove => state.move_requested(&window),
            org_kde_plasma_window::Request::RequestResize => state.resize_requested(&window),
            org_kde_plasma_window::Request::Destroy => {}
            org_kde_plasma_window::Request::GetIcon { fd } => window.write_icon(fd),
            org_kde_plasma_window::Request::RequestEnterVirtualDesktop { id } => {
                state.enter_virtual_desktop_requested(&window, &id);
            }
            org_kde_plasma_window::Request::RequestEnterNewVirtualDesktop => {
                state.enter_new_virtual_desktop_requested(&window);
            }
            org_kde_plasma_window::Request::RequestLeaveVirtualDesktop { id } => {
                state.leave_virtual_desktop_requested(&window, &id);
            }
        }
    }

    fn destroyed(_state: &mut D, _client: ClientId, _resource: &Resource<OrgKdePlasmaWindow>, data: &PlasmaWindowData) {
        let Some(window) = data.window() else {
            return;
        };
        if window.lifecycle() == WindowLifecycle::Unmapped && window.inner.resources.is_empty() {
            window.mark_destroyed();
        }
    }
}
