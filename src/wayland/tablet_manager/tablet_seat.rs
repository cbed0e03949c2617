use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::protocols::tablet_v2::zwp_tablet_seat_v2::{self, ZwpTabletSeatV2};
use crate::protocols::tablet_v2::zwp_tablet_tool_v2::ZwpTabletToolV2;
use crate::protocols::tablet_v2::zwp_tablet_v2::ZwpTabletV2;
use crate::wayland::{ClientId, DataInit, Dispatch, DisplayHandle, Resource, ResourceSet};

use super::tablet::{TabletDescriptor, TabletHandle, TabletUserData};
use super::tablet_tool::{TabletToolDescriptor, TabletToolHandle, TabletToolUserData};
use super::TabletManagerState;

#[derive(Debug, Default)]
struct TabletSeat {
    tablets: IndexMap<TabletDescriptor, TabletHandle>,
    tools: IndexMap<TabletToolDescriptor, TabletToolHandle>,
}

/// Handle to a tablet seat
///
/// TabletSeat extends `Seat` with graphic tablet specific functionality
///
/// TabletSeatHandle can be used to advertise available graphics tablets and tools to wayland clients
#[derive(Default, Debug, Clone)]
pub struct TabletSeatHandle {
    instances: ResourceSet<ZwpTabletSeatV2>,
    inner: Rc<RefCell<TabletSeat>>,
}

/// User data of a `zwp_tablet_seat_v2` resource
#[derive(Debug)]
pub struct TabletSeatUserData {
    handle: TabletSeatHandle,
}

impl TabletSeatUserData {
    pub(super) fn new(handle: TabletSeatHandle) -> TabletSeatUserData {
        TabletSeatUserData { handle }
    }

    /// The tablet seat this resource belongs to
    pub fn handle(&self) -> &TabletSeatHandle {
        &self.handle
    }
}

impl TabletSeatHandle {
    pub(super) fn add_instance<D>(&self, dh: &DisplayHandle, seat: &Resource<ZwpTabletSeatV2>)
    where
        D: Dispatch<ZwpTabletV2, TabletUserData> + Dispatch<ZwpTabletToolV2, TabletToolUserData> + 'static,
    {
        self.instances.insert(seat);

        let (tablets, tools) = {
            let inner = self.inner.borrow();
            (
                inner.tablets.iter().map(|(d, t)| (d.clone(), t.clone())).collect::<Vec<_>>(),
                inner.tools.values().cloned().collect::<Vec<_>>(),
            )
        };

        // Notify new instance about available tablets
        for (desc, tablet) in tablets {
            tablet.new_instance::<D>(dh, seat, &desc);
        }

        // Notify new instance about available tools
        for tool in tools {
            tool.new_instance::<D>(dh, seat);
        }
    }

    /// Whether the client bound this tablet seat
    pub fn client_supports_tablets(&self, client: ClientId) -> bool {
        self.instances.first_for_client(client).is_some()
    }

    /// Add a new tablet to a seat.
    ///
    /// Returns new [TabletHandle] if tablet was not know by this seat, if tablet was already know it returns existing handle.
    pub fn add_tablet<D>(&self, dh: &DisplayHandle, tablet_desc: &TabletDescriptor) -> TabletHandle
    where
        D: Dispatch<ZwpTabletV2, TabletUserData> + 'static,
    {
        if let Some(tablet) = self.get_tablet(tablet_desc) {
            return tablet;
        }

        let tablet = TabletHandle::default();
        self.inner
            .borrow_mut()
            .tablets
            .insert(tablet_desc.clone(), tablet.clone());

        // Create new tablet instance for every seat instance
        self.instances
            .broadcast(|seat| tablet.new_instance::<D>(dh, seat, tablet_desc));

        tablet
    }

    /// Get a handle to a tablet
    pub fn get_tablet(&self, tablet_desc: &TabletDescriptor) -> Option<TabletHandle> {
        self.inner.borrow().tablets.get(tablet_desc).cloned()
    }

    /// Count all tablet devices
    pub fn count_tablets(&self) -> usize {
        self.inner.borrow().tablets.len()
    }

    /// Remove tablet device
    ///
    /// Clients get the `removed` event, the tablet objects stay alive until they destroy them.
    pub fn remove_tablet(&self, tablet_desc: &TabletDescriptor) {
        let tablet = self.inner.borrow_mut().tablets.shift_remove(tablet_desc);
        if let Some(tablet) = tablet {
            tablet.removed();
        }
    }

    /// Add a new tool to a seat.
    ///
    /// Returns new [TabletToolHandle] if tool was not know by this seat, if tool was already know it returns existing handle,
    /// it allows you to send tool input events to clients.
    pub fn add_tool<D>(&self, dh: &DisplayHandle, tool_desc: &TabletToolDescriptor) -> TabletToolHandle
    where
        D: Dispatch<ZwpTabletToolV2, TabletToolUserData> + 'static,
    {
        if let Some(tool) = self.get_tool(tool_desc) {
            return tool;
        }

        let tool = TabletToolHandle::new(tool_desc.clone());
        self.inner.borrow_mut().tools.insert(tool_desc.clone(), tool.clone());

        // Create new tool instance for every seat instance
        self.instances.broadcast(|seat| tool.new_instance::<D>(dh, seat));

        tool
    }

    /// Get a handle to a tablet tool
    pub fn get_tool(&self, tool_desc: &TabletToolDescriptor) -> Option<TabletToolHandle> {
        self.inner.borrow().tools.get(tool_desc).cloned()
    }

    /// Find a tool by its hardware serial
    pub fn tool_by_hardware_serial(&self, hardware_serial: u64) -> Option<TabletToolHandle> {
        self.inner
            .borrow()
            .tools
            .iter()
            .find(|(desc, _)| desc.hardware_serial == hardware_serial)
            .map(|(_, tool)| tool.clone())
    }

    /// Count all tablet tool devices
    pub fn count_tools(&self) -> usize {
        self.inner.borrow().tools.len()
    }

    /// Remove tablet tool device
    ///
    /// Policy of tool removal is a compositor-specific.
    ///
    /// One possible policy would be to remove a tool when all tablets the tool was used on are removed.
    pub fn remove_tool(&self, tool_desc: &TabletToolDescriptor) {
        let tool = self.inner.borrow_mut().tools.shift_remove(tool_desc);
        if let Some(tool) = tool {
            tool.removed();
        }
    }
}

impl<D> Dispatch<ZwpTabletSeatV2, TabletSeatUserData, D> for TabletManagerState
where
    D: Dispatch<ZwpTabletSeatV2, TabletSeatUserData> + 'static,
{
    fn request(
        _state: &mut D,
        _client: ClientId,
        _seat: &Resource<ZwpTabletSeatV2>,
        request: zwp_tablet_seat_v2::Request,
        _data: &TabletSeatUserData,
        _dh: &DisplayHandle,
        _data_init: &mut DataInit<'_, D>,
    ) {
        match request {
            zwp_tablet_seat_v2::Request::Destroy => {
                // Nothing to do
            }
        }
    }
}
