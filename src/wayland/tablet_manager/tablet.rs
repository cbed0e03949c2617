use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use crate::protocols::tablet_v2::zwp_tablet_seat_v2::{self, ZwpTabletSeatV2};
use crate::protocols::tablet_v2::zwp_tablet_v2::{self, ZwpTabletV2};
use crate::protocols::wayland_core::wl_surface::WlSurface;
use crate::wayland::{ClientId, DataInit, Dispatch, DisplayHandle, Resource, ResourceSet};

use super::TabletManagerState;

/// Description of graphics tablet device
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct TabletDescriptor {
    /// Tablet device name
    pub name: String,
    /// Tablet device USB (vendor, product) id
    pub usb_id: Option<(u32, u32)>,
    /// Paths to the device
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Default)]
struct Tablet {
    instances: ResourceSet<ZwpTabletV2>,
    removed: Cell<bool>,
}

/// Handle to a tablet device
///
/// Tablet represents one graphics tablet device
#[derive(Debug, Default, Clone)]
pub struct TabletHandle {
    inner: Rc<Tablet>,
}

impl PartialEq for TabletHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// User data of a `zwp_tablet_v2` resource
#[derive(Debug)]
pub struct TabletUserData {
    handle: TabletHandle,
}

impl TabletUserData {
    /// The tablet this resource describes
    pub fn handle(&self) -> &TabletHandle {
        &self.handle
    }
}

impl TabletHandle {
    pub(super) fn new_instance<D>(&self, dh: &DisplayHandle, seat: &Resource<ZwpTabletSeatV2>, tablet: &TabletDescriptor)
    where
        D: Dispatch<ZwpTabletV2, TabletUserData> + 'static,
    {
        if self.inner.removed.get() {
            return;
        }
        let Ok(wl_tablet) = dh.create_resource::<ZwpTabletV2, _, D>(
            seat.client_id(),
            seat.version(),
            TabletUserData { handle: self.clone() },
        ) else {
            return;
        };
        self.inner.instances.insert(&wl_tablet);

        seat.send_event(zwp_tablet_seat_v2::Event::TabletAdded { id: wl_tablet.id() });
        wl_tablet.send_event(zwp_tablet_v2::Event::Name {
            name: tablet.name.clone(),
        });
        if let Some((vid, pid)) = tablet.usb_id {
            wl_tablet.send_event(zwp_tablet_v2::Event::Id { vid, pid });
        }
        for path in tablet.paths.iter().filter_map(|p| p.to_str()) {
            wl_tablet.send_event(zwp_tablet_v2::Event::Path { path: path.to_owned() });
        }
        wl_tablet.send_event(zwp_tablet_v2::Event::Done);
    }

    /// The tablet object of the client owning `surface`
    pub fn resource_for_surface(&self, surface: &Resource<WlSurface>) -> Option<Resource<ZwpTabletV2>> {
        self.inner.instances.first_for_client(surface.client_id())
    }

    /// Whether the client bound this tablet
    pub fn client_supports_tablet(&self, client: ClientId) -> bool {
        self.inner.instances.first_for_client(client).is_some()
    }

    /// Whether the tablet was removed from its seat
    pub fn is_removed(&self) -> bool {
        self.inner.removed.get()
    }

    pub(super) fn removed(&self) {
        if self.inner.removed.replace(true) {
            return;
        }
        self.inner
            .instances
            .broadcast(|instance| instance.send_event(zwp_tablet_v2::Event::Removed));
    }
}

impl<D> Dispatch<ZwpTabletV2, TabletUserData, D> for TabletManagerState
where
    D: Dispatch<ZwpTabletV2, TabletUserData> + 'static,
{
    fn request(
        _state: &mut D,
        _client: ClientId,
        _tablet: &Resource<ZwpTabletV2>,
        request: zwp_tablet_v2::Request,
        _data: &TabletUserData,
        _dh: &DisplayHandle,
        _data_init: &mut DataInit<'_, D>,
    ) {
        match request {
            zwp_tablet_v2::Request::Destroy => {
                // Nothing to do
            }
        }
    }
}
