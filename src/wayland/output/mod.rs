//! Output advertising
//!
//! This module provides the `wl_output` global through [`Output`], and KDE's
//! `org_kde_kwin_outputdevice` through [`OutputDevice`]. Both keep their modes in a
//! [`ModeList`] and replay their whole state to every new binding.
//!
//! An [`Output`] is a handle: create it, advertise it with [`Output::create_global`], then
//! keep it around and use its setters when the properties of the screen change. Every
//! change is forwarded to the bound clients.
//!
//! ```
//! use plasma_wayland_server::delegate_output;
//! use plasma_wayland_server::protocols::wayland_core::wl_output::Subpixel;
//! use plasma_wayland_server::wayland::output::{Mode, ModeFlags, Output, PhysicalProperties};
//! use plasma_wayland_server::wayland::{Display, MemoryTransport};
//!
//! struct State;
//! delegate_output!(State);
//!
//! let display = Display::<State>::new(MemoryTransport::new());
//!
//! let output = Output::new(
//!     "DP-1",
//!     PhysicalProperties {
//!         size: (600, 340).into(),
//!         subpixel: Subpixel::HorizontalRgb,
//!         make: "Screens Inc".into(),
//!         model: "Monitor Ultra".into(),
//!     },
//! );
//! output.add_mode(Mode::new((1920, 1080), 60000).with_flags(ModeFlags::PREFERRED));
//! output.add_mode(Mode::new((1280, 720), 60000));
//! output.create_global::<State>(&display.handle());
//!
//! output.set_current_mode((1280, 720).into(), 60000).unwrap();
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{self, Rc};

use tracing::{debug, trace_span, warn};

use crate::protocols::wayland_core::wl_output::{self, Subpixel, Transform, WlOutput};
use crate::protocols::wayland_core::wl_surface::{self, WlSurface};
use crate::utils::user_data::UserDataMap;
use crate::utils::{IsAlive, Point, Size};
use crate::wayland::{
    ClientId, DataInit, Dispatch, DisplayHandle, GlobalDispatch, GlobalId, New, Resource, ResourceSet,
};

mod device;
mod mode;

pub use device::{OutputDevice, OutputDeviceGlobalData, OutputDeviceUserData};
pub use mode::{Mode, ModeFlags, ModeList, OutputError};

const OUTPUT_VERSION: u32 = 3;

/// The physical properties of an output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalProperties {
    /// The size of the monitor, in millimeters
    pub size: Size<i32>,
    /// The subpixel geometry
    pub subpixel: Subpixel,
    /// Textual representation of the make
    pub make: String,
    /// Textual representation of the model
    pub model: String,
}

impl Default for PhysicalProperties {
    fn default() -> Self {
        PhysicalProperties {
            size: Size::default(),
            subpixel: Subpixel::Unknown,
            make: String::new(),
            model: String::new(),
        }
    }
}

#[derive(Debug)]
struct OutputState {
    physical: PhysicalProperties,
    location: Point<i32>,
    transform: Transform,
    scale: i32,
    modes: ModeList,
}

struct OutputInner {
    name: String,
    state: RefCell<OutputState>,
    global: Cell<Option<GlobalId>>,
    resources: ResourceSet<WlOutput>,
    user_data: UserDataMap,
}

/// An output, advertised as a `wl_output` global
///
/// Clones designate the same output.
#[derive(Clone)]
pub struct Output {
    inner: Rc<OutputInner>,
}

/// Global data of a `wl_output` global
#[derive(Debug)]
pub struct OutputGlobalData {
    output: Output,
}

/// User data of a `wl_output` resource
#[derive(Debug)]
pub struct OutputUserData {
    output: rc::Weak<OutputInner>,
}

impl Output {
    /// Create a new output, it is not advertised until [`Output::create_global`]
    pub fn new(name: impl Into<String>, physical: PhysicalProperties) -> Output {
        Output {
            inner: Rc::new(OutputInner {
                name: name.into(),
                state: RefCell::new(OutputState {
                    physical,
                    location: Point::default(),
                    transform: Transform::Normal,
                    scale: 1,
                    modes: ModeList::new(),
                }),
                global: Cell::new(None),
                resources: ResourceSet::new(),
                user_data: UserDataMap::new(),
            }),
        }
    }

    /// Advertise this output with a `wl_output` global
    pub fn create_global<D>(&self, display: &DisplayHandle) -> GlobalId
    where
        D: GlobalDispatch<WlOutput, OutputGlobalData> + Dispatch<WlOutput, OutputUserData> + 'static,
    {
        let global = display.create_global::<D, WlOutput, _>(
            OUTPUT_VERSION,
            OutputGlobalData { output: self.clone() },
        );
        self.inner.global.set(Some(global.id()));
        global.id()
    }

    /// The global of this output, if it was created
    pub fn global(&self) -> Option<GlobalId> {
        self.inner.global.get()
    }

    /// Name of the output
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Physical properties of the output
    pub fn physical_properties(&self) -> PhysicalProperties {
        self.inner.state.borrow().physical.clone()
    }

    /// Position of the output in the global compositor space
    pub fn location(&self) -> Point<i32> {
        self.inner.state.borrow().location
    }

    /// Transform of the output
    pub fn transform(&self) -> Transform {
        self.inner.state.borrow().transform
    }

    /// Integer scale of the output
    pub fn scale(&self) -> i32 {
        self.inner.state.borrow().scale
    }

    /// Every mode of the output, in insertion order
    pub fn modes(&self) -> Vec<Mode> {
        self.inner.state.borrow().modes.modes().to_vec()
    }

    /// The current mode
    pub fn current_mode(&self) -> Option<Mode> {
        self.inner.state.borrow().modes.current()
    }

    /// The preferred mode
    pub fn preferred_mode(&self) -> Option<Mode> {
        self.inner.state.borrow().modes.preferred()
    }

    /// Add a mode, or update the flags of a known one
    ///
    /// If this changed the list of modes, every client gets the updated modes.
    pub fn add_mode(&self, mode: Mode) {
        let changed = self.inner.state.borrow_mut().modes.add(mode);
        if changed {
            self.broadcast_modes();
        }
    }

    /// Change the current mode
    ///
    /// The mode must have been added first.
    pub fn set_current_mode(&self, size: Size<i32>, refresh: i32) -> Result<(), OutputError> {
        let changed = self.inner.state.borrow_mut().modes.set_current(size, refresh);
        match changed {
            Ok(true) => {
                self.broadcast_modes();
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(err) => {
                warn!(output = self.name(), %err, "Cannot change the current mode");
                Err(err)
            }
        }
    }

    /// Change the integer scale of the output
    pub fn set_scale(&self, scale: i32) {
        if std::mem::replace(&mut self.inner.state.borrow_mut().scale, scale) == scale {
            return;
        }
        self.inner.resources.broadcast(|output| {
            output.send_event(wl_output::Event::Scale { factor: scale });
            output.send_event(wl_output::Event::Done);
        });
    }

    /// Change the position and the transform of the output
    pub fn change_geometry(&self, location: Point<i32>, transform: Transform) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.location == location && state.transform == transform {
                return;
            }
            state.location = location;
            state.transform = transform;
        }
        self.inner.resources.broadcast(|output| {
            self.send_geometry(output);
            output.send_event(wl_output::Event::Done);
        });
    }

    /// Notify a surface that it entered this output
    ///
    /// The event is sent with the output resources of the client owning the surface, it is
    /// a no-op if that client did not bind this output or if the surface is dead.
    pub fn enter(&self, surface: &Resource<WlSurface>) {
        if !surface.alive() {
            return;
        }
        for output in self.client_resources(surface.client_id()) {
            surface.send_event(wl_surface::Event::Enter { output: output.id() });
        }
    }

    /// Notify a surface that it left this output
    pub fn leave(&self, surface: &Resource<WlSurface>) {
        if !surface.alive() {
            return;
        }
        for output in self.client_resources(surface.client_id()) {
            surface.send_event(wl_surface::Event::Leave { output: output.id() });
        }
    }

    /// The `wl_output` resources of one client for this output
    pub fn client_resources(&self, client: ClientId) -> Vec<Resource<WlOutput>> {
        self.inner.resources.for_client(client)
    }

    /// Whether `resource` is a binding of this output
    pub fn owns(&self, resource: &Resource<WlOutput>) -> bool {
        resource
            .data::<OutputUserData>()
            .is_some_and(|data| std::ptr::eq(data.output.as_ptr(), Rc::as_ptr(&self.inner)))
    }

    /// Retrieve the output a `wl_output` resource was bound from
    pub fn from_resource(resource: &Resource<WlOutput>) -> Option<Output> {
        resource
            .data::<OutputUserData>()
            .and_then(|data| data.output.upgrade())
            .map(|inner| Output { inner })
    }

    /// User data of the output
    pub fn user_data(&self) -> &UserDataMap {
        &self.inner.user_data
    }

    fn send_geometry(&self, output: &Resource<WlOutput>) {
        let state = self.inner.state.borrow();
        output.send_event(wl_output::Event::Geometry {
            x: state.location.x,
            y: state.location.y,
            physical_width: state.physical.size.w,
            physical_height: state.physical.size.h,
            subpixel: state.physical.subpixel,
            make: state.physical.make.clone(),
            model: state.physical.model.clone(),
            transform: state.transform,
        });
    }

    fn send_modes(&self, output: &Resource<WlOutput>) {
        let modes: Vec<Mode> = self.inner.state.borrow().modes.replay_order().collect();
        for mode in modes {
            output.send_event(wl_output::Event::Mode {
                flags: wl_output::Mode::from_bits_truncate(mode.flags.bits()),
                width: mode.size.w,
                height: mode.size.h,
                refresh: mode.refresh,
            });
        }
    }

    fn broadcast_modes(&self) {
        self.inner.resources.broadcast(|output| {
            self.send_modes(output);
            output.send_event(wl_output::Event::Done);
        });
    }
}

impl PartialEq for Output {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Output {}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("name", &self.inner.name)
            .field("state", &self.inner.state.borrow())
            .field("resources", &self.inner.resources.len())
            .finish_non_exhaustive()
    }
}

/// Dispatching of the output globals
///
/// Outputs need no handler, use [`delegate_output!`](crate::delegate_output) to route their
/// requests here.
#[derive(Debug)]
pub struct OutputManagerState;

impl<D> GlobalDispatch<WlOutput, OutputGlobalData, D> for OutputManagerState
where
    D: GlobalDispatch<WlOutput, OutputGlobalData> + Dispatch<WlOutput, OutputUserData> + 'static,
{
    fn bind(
        _state: &mut D,
        _handle: &DisplayHandle,
        _client: ClientId,
        resource: New<WlOutput>,
        global_data: &OutputGlobalData,
        data_init: &mut DataInit<'_, D>,
    ) {
        let output = &global_data.output;
        let _span = trace_span!("output_bind", name = output.name()).entered();

        let resource = data_init.init(
            resource,
            OutputUserData {
                output: Rc::downgrade(&output.inner),
            },
        );
        output.inner.resources.insert(&resource);
        debug!(version = resource.version(), "Output bound");

        output.send_geometry(&resource);
        output.send_modes(&resource);
        let scale = output.scale();
        resource.send_event(wl_output::Event::Scale { factor: scale });
        resource.send_event(wl_output::Event::Done);
    }
}

impl<D> Dispatch<WlOutput, OutputUserData, D> for OutputManagerState
where
    D: Dispatch<WlOutput, OutputUserData> + 'static,
{
    fn request(
        _state: &mut D,
        _client: ClientId,
        _resource: &Resource<WlOutput>,
        request: wl_output::Request,
        _data: &OutputUserData,
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, D>,
    ) {
        match request {
            wl_output::Request::Release => {}
        }
    }
}

/// Implement the dispatching of `wl_output` and `org_kde_kwin_outputdevice` for a state type
#[macro_export]
macro_rules! delegate_output {
    ($ty: ty) => {
        $crate::delegate_global_dispatch!($ty: [
            $crate::protocols::wayland_core::wl_output::WlOutput: $crate::wayland::output::OutputGlobalData,
            $crate::protocols::outputdevice::org_kde_kwin_outputdevice::OrgKdeKwinOutputdevice:
                $crate::wayland::output::OutputDeviceGlobalData
        ] => $crate::wayland::output::OutputManagerState);

        $crate::delegate_dispatch!($ty: [
            $crate::protocols::wayland_core::wl_output::WlOutput: $crate::wayland::output::OutputUserData,
            $crate::protocols::outputdevice::org_kde_kwin_outputdevice::OrgKdeKwinOutputdevice:
                $crate::wayland::output::OutputDeviceUserData
        ] => $crate::wayland::output::OutputManagerState);
    };
}
