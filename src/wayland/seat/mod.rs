//! Minimal `wl_seat` implementation
//!
//! A [`Seat`] is a named group of input devices. This module only advertises seats, their
//! name and their capabilities: extensions such as text input and tablets hang their
//! per-seat state off [`Seat::user_data`] and resolve the `wl_seat` arguments of their
//! requests with [`Seat::from_resource`].
//!
//! ```
//! use plasma_wayland_server::delegate_seat;
//! use plasma_wayland_server::protocols::wayland_core::wl_seat::Capability;
//! use plasma_wayland_server::wayland::seat::{SeatHandler, SeatState};
//! use plasma_wayland_server::wayland::{Display, MemoryTransport};
//!
//! struct State {
//!     seat_state: SeatState,
//! }
//!
//! impl SeatHandler for State {
//!     fn seat_state(&mut self) -> &mut SeatState {
//!         &mut self.seat_state
//!     }
//! }
//!
//! delegate_seat!(State);
//!
//! let display = Display::<State>::new(MemoryTransport::new());
//! let mut seat_state = SeatState::new();
//! let seat = seat_state.new_wl_seat::<State>(&display.handle(), "seat0");
//! seat.set_capabilities(Capability::POINTER | Capability::KEYBOARD);
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::{self, Rc};

use tracing::trace;

use crate::protocols::wayland_core::wl_seat::{self, Capability, WlSeat};
use crate::utils::user_data::UserDataMap;
use crate::wayland::{
    ClientId, DataInit, Dispatch, DisplayHandle, GlobalDispatch, GlobalId, New, Resource, ResourceSet,
};

const SEAT_VERSION: u32 = 5;

struct SeatInner {
    name: String,
    capabilities: Cell<Capability>,
    global: Cell<Option<GlobalId>>,
    resources: ResourceSet<WlSeat>,
    user_data: UserDataMap,
}

/// A seat advertised to clients
///
/// This is a cheaply clonable handle, clones designate the same seat.
#[derive(Clone)]
pub struct Seat {
    inner: Rc<SeatInner>,
}

impl Seat {
    /// Name of the seat
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Id of the `wl_seat` global of this seat
    pub fn global(&self) -> Option<GlobalId> {
        self.inner.global.get()
    }

    /// Current capabilities of the seat
    pub fn capabilities(&self) -> Capability {
        self.inner.capabilities.get()
    }

    /// Change the capabilities of the seat and notify the clients
    pub fn set_capabilities(&self, capabilities: Capability) {
        if self.inner.capabilities.replace(capabilities) == capabilities {
            return;
        }
        self.inner
            .resources
            .broadcast(|seat| seat.send_event(wl_seat::Event::Capabilities { capabilities }));
    }

    /// User data of the seat
    pub fn user_data(&self) -> &UserDataMap {
        &self.inner.user_data
    }

    /// The `wl_seat` resources of one client for this seat
    pub fn client_resources(&self, client: ClientId) -> Vec<Resource<WlSeat>> {
        self.inner.resources.for_client(client)
    }

    /// Whether `resource` is a binding of this seat
    pub fn owns(&self, resource: &Resource<WlSeat>) -> bool {
        resource
            .data::<SeatUserData>()
            .is_some_and(|data| std::ptr::eq(data.seat.as_ptr(), Rc::as_ptr(&self.inner)))
    }

    /// Retrieve the seat a `wl_seat` resource was bound from
    pub fn from_resource(resource: &Resource<WlSeat>) -> Option<Seat> {
        resource
            .data::<SeatUserData>()
            .and_then(|data| data.seat.upgrade())
            .map(|inner| Seat { inner })
    }

    fn downgrade(&self) -> rc::Weak<SeatInner> {
        Rc::downgrade(&self.inner)
    }
}

impl PartialEq for Seat {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Seat {}

impl fmt::Debug for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seat")
            .field("name", &self.inner.name)
            .field("capabilities", &self.inner.capabilities.get())
            .field("resources", &self.inner.resources.len())
            .finish_non_exhaustive()
    }
}

/// Global data of a `wl_seat` global
#[derive(Debug)]
pub struct SeatGlobalData {
    seat: Seat,
}

/// User data of a `wl_seat` resource
#[derive(Debug)]
pub struct SeatUserData {
    seat: rc::Weak<SeatInner>,
}

/// Handler trait for seats
pub trait SeatHandler {
    /// [`SeatState`] getter
    fn seat_state(&mut self) -> &mut SeatState;
}

/// Every seat created by the compositor
#[derive(Debug, Default)]
pub struct SeatState {
    seats: Vec<Seat>,
}

impl SeatState {
    /// Create an empty seat registry
    pub fn new() -> SeatState {
        SeatState::default()
    }

    /// Create a seat and its `wl_seat` global
    pub fn new_wl_seat<D>(&mut self, display: &DisplayHandle, name: impl Into<String>) -> Seat
    where
        D: GlobalDispatch<WlSeat, SeatGlobalData> + Dispatch<WlSeat, SeatUserData> + SeatHandler + 'static,
    {
        let seat = Seat {
            inner: Rc::new(SeatInner {
                name: name.into(),
                capabilities: Cell::new(Capability::empty()),
                global: Cell::new(None),
                resources: ResourceSet::new(),
                user_data: UserDataMap::new(),
            }),
        };
        let global = display.create_global::<D, WlSeat, _>(SEAT_VERSION, SeatGlobalData { seat: seat.clone() });
        seat.inner.global.set(Some(global.id()));
        self.seats.push(seat.clone());
        seat
    }

    /// Every seat
    pub fn seats(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter()
    }
}

impl<D> GlobalDispatch<WlSeat, SeatGlobalData, D> for SeatState
where
    D: GlobalDispatch<WlSeat, SeatGlobalData> + Dispatch<WlSeat, SeatUserData> + SeatHandler + 'static,
{
    fn bind(
        _state: &mut D,
        _handle: &DisplayHandle,
        _client: ClientId,
        resource: New<WlSeat>,
        global_data: &SeatGlobalData,
        data_init: &mut DataInit<'_, D>,
    ) {
        let seat = &global_data.seat;
        let resource = data_init.init(
            resource,
            SeatUserData {
                seat: seat.downgrade(),
            },
        );
        seat.inner.resources.insert(&resource);
        trace!(seat = seat.name(), ?resource, "Seat bound");

        resource.send_event(wl_seat::Event::Capabilities {
            capabilities: seat.capabilities(),
        });
        resource.send_event(wl_seat::Event::Name {
            name: seat.name().to_owned(),
        });
    }
}

impl<D> Dispatch<WlSeat, SeatUserData, D> for SeatState
where
    D: Dispatch<WlSeat, SeatUserData> + SeatHandler + 'static,
{
    fn request(
        _state: &mut D,
        _client: ClientId,
        _resource: &Resource<WlSeat>,
        request: wl_seat::Request,
        _data: &SeatUserData,
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, D>,
    ) {
        match request {
            wl_seat::Request::Release => {}
        }
    }
}

#[allow(missing_docs)]
#[macro_export]
macro_rules! delegate_seat {
    ($ty: ty) => {
        $crate::delegate_global_dispatch!($ty: [
            $crate::protocols::wayland_core::wl_seat::WlSeat: $crate::wayland::seat::SeatGlobalData
        ] => $crate::wayland::seat::SeatState);

        $crate::delegate_dispatch!($ty: [
            $crate::protocols::wayland_core::wl_seat::WlSeat: $crate::wayland::seat::SeatUserData
        ] => $crate::wayland::seat::SeatState);
    };
}
