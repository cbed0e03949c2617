//! Utilities for graphics tablet support
//!
//! This module provides helpers to handle graphics tablets.
//!
//! ```
//! use plasma_wayland_server::{delegate_seat, delegate_tablet_manager};
//! use plasma_wayland_server::protocols::tablet_v2::zwp_tablet_tool_v2::ToolType;
//! use plasma_wayland_server::wayland::seat::{SeatHandler, SeatState};
//! use plasma_wayland_server::wayland::tablet_manager::{
//!     TabletCursor, TabletDescriptor, TabletManagerState, TabletSeatTrait, TabletToolCapabilities,
//!     TabletToolDescriptor, TabletToolHandle, TabletToolHandler,
//! };
//! use plasma_wayland_server::wayland::{Display, MemoryTransport};
//!
//! struct State {
//!     seats: SeatState,
//! }
//!
//! impl SeatHandler for State {
//!     fn seat_state(&mut self) -> &mut SeatState {
//!         &mut self.seats
//!     }
//! }
//!
//! impl TabletToolHandler for State {
//!     fn tablet_tool_cursor_changed(&mut self, tool: &TabletToolHandle, cursor: &TabletCursor) {
//!         // update the cursor image of the tool
//!     }
//! }
//!
//! delegate_seat!(State);
//! delegate_tablet_manager!(State);
//!
//! let display = Display::<State>::new(MemoryTransport::new());
//! let dh = display.handle();
//! // First we need a regular seat
//! let mut seats = SeatState::new();
//! let seat = seats.new_wl_seat::<State>(&dh, "seat-0");
//!
//! // Create the manager global
//! let tablet_manager = TabletManagerState::new::<State>(&dh);
//!
//! let tablet_seat = seat.tablet_seat(); // Get TabletSeat associated with this seat
//! tablet_seat.add_tablet::<State>(&dh, &TabletDescriptor { // Add a new tablet to a seat
//!     name: "Test".into(),
//!     usb_id: None,
//!     paths: Vec::new(),
//! });
//! let pen = tablet_seat.add_tool::<State>(&dh, &TabletToolDescriptor {
//!     tool_type: ToolType::Pen,
//!     hardware_serial: 1,
//!     hardware_id_wacom: 0,
//!     capabilities: TabletToolCapabilities::PRESSURE | TabletToolCapabilities::TILT,
//! });
//! ```

use tracing::warn;

use crate::protocols::tablet_v2::zwp_tablet_manager_v2::{self, ZwpTabletManagerV2};
use crate::protocols::tablet_v2::zwp_tablet_seat_v2::ZwpTabletSeatV2;
use crate::protocols::tablet_v2::zwp_tablet_tool_v2::ZwpTabletToolV2;
use crate::protocols::tablet_v2::zwp_tablet_v2::ZwpTabletV2;
use crate::protocols::wayland_core::wl_seat::WlSeat;
use crate::wayland::seat::Seat;
use crate::wayland::{ClientId, DataInit, Dispatch, DisplayHandle, GlobalDispatch, GlobalId, New, Resource};

const MANAGER_VERSION: u32 = 1;

mod tablet;
mod tablet_seat;
mod tablet_tool;

pub use tablet::{TabletDescriptor, TabletHandle, TabletUserData};
pub use tablet_seat::{TabletSeatHandle, TabletSeatUserData};
pub use tablet_tool::{
    TabletCursor, TabletToolCapabilities, TabletToolDescriptor, TabletToolHandle, TabletToolUserData,
};

/// Handler for the requests of tablet tools
pub trait TabletToolHandler {
    /// The client the tool is in proximity of changed the cursor of the tool
    fn tablet_tool_cursor_changed(&mut self, tool: &TabletToolHandle, cursor: &TabletCursor);
}

/// Extends [Seat] with graphic tablet specific functionality
pub trait TabletSeatTrait {
    /// Get tablet seat associated with this seat
    fn tablet_seat(&self) -> TabletSeatHandle;
}

impl TabletSeatTrait for Seat {
    fn tablet_seat(&self) -> TabletSeatHandle {
        self.user_data().get_or_insert(TabletSeatHandle::default).clone()
    }
}

/// State of the tablet manager
#[derive(Debug)]
pub struct TabletManagerState {
    global: GlobalId,
}

impl TabletManagerState {
    /// Initialize a tablet manager global.
    pub fn new<D>(display: &DisplayHandle) -> TabletManagerState
    where
        D: GlobalDispatch<ZwpTabletManagerV2, ()>
            + Dispatch<ZwpTabletManagerV2, ()>
            + Dispatch<ZwpTabletSeatV2, TabletSeatUserData>
            + Dispatch<ZwpTabletV2, TabletUserData>
            + Dispatch<ZwpTabletToolV2, TabletToolUserData>
            + TabletToolHandler
            + 'static,
    {
        let global = display.create_global::<D, ZwpTabletManagerV2, _>(MANAGER_VERSION, ());
        TabletManagerState { global: global.id() }
    }

    /// Get the id of ZwpTabletManagerV2 global
    pub fn global(&self) -> GlobalId {
        self.global
    }
}

impl<D> GlobalDispatch<ZwpTabletManagerV2, (), D> for TabletManagerState
where
    D: GlobalDispatch<ZwpTabletManagerV2, ()>
        + Dispatch<ZwpTabletManagerV2, ()>
        + Dispatch<ZwpTabletSeatV2, TabletSeatUserData>
        + Dispatch<ZwpTabletV2, TabletUserData>
        + Dispatch<ZwpTabletToolV2, TabletToolUserData>
        + 'static,
{
    fn bind(
        _state: &mut D,
        _handle: &DisplayHandle,
        _client: ClientId,
        resource: New<ZwpTabletManagerV2>,
        _global_data: &(),
        data_init: &mut DataInit<'_, D>,
    ) {
        data_init.init(resource, ());
    }
}

impl<D> Dispatch<ZwpTabletManagerV2, (), D> for TabletManagerState
where
    D: Dispatch<ZwpTabletManagerV2, ()>
        + Dispatch<ZwpTabletSeatV2, TabletSeatUserData>
        + Dispatch<ZwpTabletV2, TabletUserData>
        + Dispatch<ZwpTabletToolV2, TabletToolUserData>
        + 'static,
{
    fn request(
        _state: &mut D,
        client: ClientId,
        manager: &Resource<ZwpTabletManagerV2>,
        request: zwp_tablet_manager_v2::Request,
        _data: &(),
        dh: &DisplayHandle,
        data_init: &mut DataInit<'_, D>,
    ) {
        match request {
            zwp_tablet_manager_v2::Request::GetTabletSeat { tablet_seat, seat } => {
                let Some(seat) = dh.get_object::<WlSeat>(seat).ok().and_then(|seat| Seat::from_resource(&seat)) else {
                    warn!(?client, "Tablet seat requested for an invalid seat");
                    manager.post_error(0u32, "invalid seat");
                    return;
                };

                let handle = seat.tablet_seat();
                let instance = data_init.init(tablet_seat, TabletSeatUserData::new(handle.clone()));
                handle.add_instance::<D>(dh, &instance);
            }
            zwp_tablet_manager_v2::Request::Destroy => {
                // Nothing to do
            }
        }
    }
}

#[allow(missing_docs)]
#[macro_export]
macro_rules! delegate_tablet_manager {
    ($ty: ty) => {
        $crate::delegate_global_dispatch!($ty: [
            $crate::protocols::tablet_v2::zwp_tablet_manager_v2::ZwpTabletManagerV2: ()
        ] => $crate::wayland::tablet_manager::TabletManagerState);

        $crate::delegate_dispatch!($ty: [
            $crate::protocols::tablet_v2::zwp_tablet_manager_v2::ZwpTabletManagerV2: (),
            $crate::protocols::tablet_v2::zwp_tablet_seat_v2::ZwpTabletSeatV2: $crate::wayland::tablet_manager::TabletSeatUserData,
            $crate::protocols::tablet_v2::zwp_tablet_v2::ZwpTabletV2: $crate::wayland::tablet_manager::TabletUserData,
            $crate::protocols::tablet_v2::zwp_tablet_tool_v2::ZwpTabletToolV2: $crate::wayland::tablet_manager::TabletToolUserData
        ] => $crate::wayland::tablet_manager::TabletManagerState);
    };
}
