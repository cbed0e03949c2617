use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use tracing::trace;

use crate::protocols::tablet_v2::zwp_tablet_seat_v2::{self, ZwpTabletSeatV2};
use crate::protocols::tablet_v2::zwp_tablet_tool_v2::{self, ButtonState, Capability, ToolType, ZwpTabletToolV2};
use crate::protocols::wayland_core::wl_surface::WlSurface;
use crate::utils::Point;
use crate::wayland::{ClientId, DataInit, Dispatch, DisplayHandle, Resource, ResourceSet, Weak};

use super::tablet::TabletHandle;
use super::{TabletManagerState, TabletToolHandler};

bitflags! {
    /// Axes and features a tool supports
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TabletToolCapabilities: u32 {
        /// Tilt axes
        const TILT = 1;
        /// Pressure axis
        const PRESSURE = 2;
        /// Distance axis
        const DISTANCE = 4;
        /// Z-rotation axis
        const ROTATION = 8;
        /// Slider axis
        const SLIDER = 16;
        /// Wheel axis
        const WHEEL = 32;
    }
}

impl TabletToolCapabilities {
    fn protocol_capabilities(self) -> impl Iterator<Item = Capability> {
        [
            (TabletToolCapabilities::TILT, Capability::Tilt),
            (TabletToolCapabilities::PRESSURE, Capability::Pressure),
            (TabletToolCapabilities::DISTANCE, Capability::Distance),
            (TabletToolCapabilities::ROTATION, Capability::Rotation),
            (TabletToolCapabilities::SLIDER, Capability::Slider),
            (TabletToolCapabilities::WHEEL, Capability::Wheel),
        ]
        .into_iter()
        .filter(move |(flag, _)| self.contains(*flag))
        .map(|(_, capability)| capability)
    }
}

/// Description of a physical tablet tool
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TabletToolDescriptor {
    /// Type of the tool
    pub tool_type: ToolType,
    /// Unique serial number of the tool, 0 if unknown
    pub hardware_serial: u64,
    /// Hardware id in Wacom's format, 0 if unknown
    pub hardware_id_wacom: u64,
    /// Capabilities of the tool
    pub capabilities: TabletToolCapabilities,
}

fn split(value: u64) -> (u32, u32) {
    ((value >> 32) as u32, (value & u64::from(u32::MAX)) as u32)
}

/// Cursor set by a client for a tool with `set_cursor`
#[derive(Debug, Clone, Default)]
pub struct TabletCursor {
    /// Serial of the `proximity_in` event the request answers
    pub serial: u32,
    /// Cursor surface, `None` when the cursor is hidden
    pub surface: Option<Weak<WlSurface>>,
    /// Hotspot in surface-local coordinates
    pub hotspot: Point<i32>,
}

impl TabletCursor {
    /// The cursor surface, if it is still alive
    pub fn surface(&self) -> Option<Resource<WlSurface>> {
        self.surface.as_ref().and_then(|surface| surface.upgrade().ok())
    }

    fn same_as(&self, serial: u32, surface: Option<&Resource<WlSurface>>, hotspot: Point<i32>) -> bool {
        let same_surface = match (&self.surface, surface) {
            (None, None) => true,
            (Some(current), Some(surface)) => current.is(surface),
            _ => false,
        };
        self.serial == serial && same_surface && self.hotspot == hotspot
    }
}

#[derive(Debug, Default)]
struct Pending {
    pressure: Option<u32>,
    distance: Option<u32>,
    tilt: Option<(f64, f64)>,
    rotation: Option<f64>,
    slider: Option<i32>,
    wheel: Option<(f64, i32)>,
}

#[derive(Debug)]
struct TabletTool {
    desc: TabletToolDescriptor,
    focus: Option<Weak<WlSurface>>,
    tablet: Option<TabletHandle>,
    is_down: bool,
    removed: bool,
    pending: Pending,
}

impl TabletTool {
    fn focus(&self) -> Option<Resource<WlSurface>> {
        self.focus.as_ref().and_then(|focus| focus.upgrade().ok())
    }
}

/// Handle to a tablet tool
///
/// Tools are physical devices shared by every client; events about a tool only go to the
/// client owning the surface the tool is in proximity of.
#[derive(Clone)]
pub struct TabletToolHandle {
    instances: ResourceSet<ZwpTabletToolV2>,
    inner: Rc<RefCell<TabletTool>>,
}

impl fmt::Debug for TabletToolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabletToolHandle")
            .field("desc", &self.inner.borrow().desc)
            .field("instances", &self.instances.len())
            .finish()
    }
}

impl PartialEq for TabletToolHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// User data of a `zwp_tablet_tool_v2` resource
#[derive(Debug)]
pub struct TabletToolUserData {
    handle: TabletToolHandle,
    cursor: RefCell<Option<TabletCursor>>,
}

impl TabletToolUserData {
    /// The tool this resource describes
    pub fn handle(&self) -> &TabletToolHandle {
        &self.handle
    }

    /// The cursor this client set for the tool, `None` until it set one
    pub fn cursor(&self) -> Option<TabletCursor> {
        self.cursor.borrow().clone()
    }
}

impl TabletToolHandle {
    pub(super) fn new(desc: TabletToolDescriptor) -> TabletToolHandle {
        TabletToolHandle {
            instances: ResourceSet::new(),
            inner: Rc::new(RefCell::new(TabletTool {
                desc,
                focus: None,
                tablet: None,
                is_down: false,
                removed: false,
                pending: Pending::default(),
            })),
        }
    }

    pub(super) fn new_instance<D>(&self, dh: &DisplayHandle, seat: &Resource<ZwpTabletSeatV2>)
    where
        D: Dispatch<ZwpTabletToolV2, TabletToolUserData> + 'static,
    {
        let desc = {
            let inner = self.inner.borrow();
            if inner.removed {
                return;
            }
            inner.desc.clone()
        };

        let Ok(tool) = dh.create_resource::<ZwpTabletToolV2, _, D>(
            seat.client_id(),
            seat.version(),
            TabletToolUserData {
                handle: self.clone(),
                cursor: RefCell::new(None),
            },
        ) else {
            return;
        };
        self.instances.insert(&tool);

        seat.send_event(zwp_tablet_seat_v2::Event::ToolAdded { id: tool.id() });
        tool.send_event(zwp_tablet_tool_v2::Event::Type {
            tool_type: desc.tool_type,
        });
        let (hardware_serial_hi, hardware_serial_lo) = split(desc.hardware_serial);
        tool.send_event(zwp_tablet_tool_v2::Event::HardwareSerial {
            hardware_serial_hi,
            hardware_serial_lo,
        });
        let (hardware_id_hi, hardware_id_lo) = split(desc.hardware_id_wacom);
        tool.send_event(zwp_tablet_tool_v2::Event::HardwareIdWacom {
            hardware_id_hi,
            hardware_id_lo,
        });
        for capability in desc.capabilities.protocol_capabilities() {
            tool.send_event(zwp_tablet_tool_v2::Event::Capability { capability });
        }
        tool.send_event(zwp_tablet_tool_v2::Event::Done);
    }

    pub(super) fn removed(&self) {
        if std::mem::replace(&mut self.inner.borrow_mut().removed, true) {
            return;
        }
        self.instances
            .broadcast(|tool| tool.send_event(zwp_tablet_tool_v2::Event::Removed));
    }

    /// Description of the tool
    pub fn descriptor(&self) -> TabletToolDescriptor {
        self.inner.borrow().desc.clone()
    }

    /// Surface the tool is in proximity of
    pub fn focus(&self) -> Option<Resource<WlSurface>> {
        self.inner.borrow().focus()
    }

    /// Whether the tool is making contact
    pub fn is_down(&self) -> bool {
        self.inner.borrow().is_down
    }

    /// Tablet the tool was last brought in proximity of
    pub fn tablet(&self) -> Option<TabletHandle> {
        self.inner.borrow().tablet.clone()
    }

    fn target(&self) -> Option<Resource<ZwpTabletToolV2>> {
        let focus = self.inner.borrow().focus()?;
        self.instances.first_for_client(focus.client_id())
    }

    /// Whether the client owning the focused surface bound this tool
    pub fn is_client_supported(&self) -> bool {
        self.target().is_some()
    }

    /// The cursor `client` set for this tool
    pub fn cursor_for_client(&self, client: ClientId) -> Option<TabletCursor> {
        self.instances
            .first_for_client(client)
            .and_then(|tool| tool.data::<TabletToolUserData>().and_then(TabletToolUserData::cursor))
    }

    /// The cursor set by the client owning the focused surface
    pub fn current_cursor(&self) -> Option<TabletCursor> {
        self.target()
            .and_then(|tool| tool.data::<TabletToolUserData>().and_then(TabletToolUserData::cursor))
    }

    fn send(&self, event: zwp_tablet_tool_v2::Event) {
        if let Some(tool) = self.target() {
            tool.send_event(event);
        }
    }

    fn flush_pending(&self, tool: &Resource<ZwpTabletToolV2>) {
        let pending = std::mem::take(&mut self.inner.borrow_mut().pending);
        if let Some(pressure) = pending.pressure {
            tool.send_event(zwp_tablet_tool_v2::Event::Pressure { pressure });
        }
        if let Some(distance) = pending.distance {
            tool.send_event(zwp_tablet_tool_v2::Event::Distance { distance });
        }
        if let Some((tilt_x, tilt_y)) = pending.tilt {
            tool.send_event(zwp_tablet_tool_v2::Event::Tilt { tilt_x, tilt_y });
        }
        if let Some(degrees) = pending.rotation {
            tool.send_event(zwp_tablet_tool_v2::Event::Rotation { degrees });
        }
        if let Some(position) = pending.slider {
            tool.send_event(zwp_tablet_tool_v2::Event::Slider { position });
        }
        if let Some((degrees, clicks)) = pending.wheel {
            tool.send_event(zwp_tablet_tool_v2::Event::Wheel { degrees, clicks });
        }
    }

    /// Move the tool over a new surface
    ///
    /// The previous target client, if it still has the tool, gets `proximity_out` and a
    /// `frame` first. The new target gets `proximity_in` when it bound both the tool and
    /// `tablet`. If the client owning `surface` set a cursor for the tool, the handler is
    /// told about it.
    pub fn proximity_in<D: TabletToolHandler>(
        &self,
        state: &mut D,
        surface: &Resource<WlSurface>,
        tablet: &TabletHandle,
        serial: u32,
        time: u32,
    ) {
        if self.focus().as_ref() == Some(surface) {
            return;
        }
        self.enter(surface, tablet, serial, time);
        if let Some(cursor) = self.cursor_for_client(surface.client_id()) {
            state.tablet_tool_cursor_changed(self, &cursor);
        }
    }

    fn enter(&self, surface: &Resource<WlSurface>, tablet: &TabletHandle, serial: u32, time: u32) {
        if let Some(previous) = self.target() {
            previous.send_event(zwp_tablet_tool_v2::Event::ProximityOut);
            previous.send_event(zwp_tablet_tool_v2::Event::Frame { time });
        }

        {
            let mut inner = self.inner.borrow_mut();
            inner.focus = Some(surface.downgrade());
            inner.tablet = Some(tablet.clone());
            inner.is_down = false;
            inner.pending = Pending::default();
        }

        let Some(tool) = self.target() else {
            trace!(client = ?surface.client_id(), "Tablet tool not bound by the focused client");
            return;
        };
        let Some(wl_tablet) = tablet.resource_for_surface(surface) else {
            trace!(client = ?surface.client_id(), "Tablet not bound by the focused client");
            return;
        };
        tool.send_event(zwp_tablet_tool_v2::Event::ProximityIn {
            serial,
            tablet: wl_tablet.id(),
            surface: surface.id(),
        });
        tool.send_event(zwp_tablet_tool_v2::Event::Frame { time });
    }

    /// The tool left the focused surface
    pub fn proximity_out(&self, time: u32) {
        if let Some(tool) = self.target() {
            if self.is_down() {
                tool.send_event(zwp_tablet_tool_v2::Event::Up);
            }
            tool.send_event(zwp_tablet_tool_v2::Event::ProximityOut);
            tool.send_event(zwp_tablet_tool_v2::Event::Frame { time });
        }
        let mut inner = self.inner.borrow_mut();
        inner.focus = None;
        inner.tablet = None;
        inner.is_down = false;
        inner.pending = Pending::default();
    }

    /// The tool started making contact
    pub fn tip_down(&self, serial: u32, time: u32) {
        self.inner.borrow_mut().is_down = true;
        if let Some(tool) = self.target() {
            tool.send_event(zwp_tablet_tool_v2::Event::Down { serial });
            self.flush_pending(&tool);
            tool.send_event(zwp_tablet_tool_v2::Event::Frame { time });
        }
    }

    /// The tool stopped making contact
    pub fn tip_up(&self, time: u32) {
        self.inner.borrow_mut().is_down = false;
        if let Some(tool) = self.target() {
            tool.send_event(zwp_tablet_tool_v2::Event::Up);
            self.flush_pending(&tool);
            tool.send_event(zwp_tablet_tool_v2::Event::Frame { time });
        }
    }

    /// The tool moved, in surface-local coordinates
    ///
    /// Queued axis updates are sent in the same frame.
    pub fn motion(&self, location: Point<f64>, time: u32) {
        if let Some(tool) = self.target() {
            tool.send_event(zwp_tablet_tool_v2::Event::Motion {
                x: location.x,
                y: location.y,
            });
            self.flush_pending(&tool);
            tool.send_event(zwp_tablet_tool_v2::Event::Frame { time });
        }
    }

    /// Queue a pressure update, from 0 to 65535
    pub fn pressure(&self, pressure: u32) {
        self.inner.borrow_mut().pending.pressure = Some(pressure);
    }

    /// Queue a distance update, from 0 to 65535
    pub fn distance(&self, distance: u32) {
        self.inner.borrow_mut().pending.distance = Some(distance);
    }

    /// Queue a tilt update, in degrees
    pub fn tilt(&self, tilt_x: f64, tilt_y: f64) {
        self.inner.borrow_mut().pending.tilt = Some((tilt_x, tilt_y));
    }

    /// Queue a z-rotation update, in degrees
    pub fn rotation(&self, degrees: f64) {
        self.inner.borrow_mut().pending.rotation = Some(degrees);
    }

    /// Queue a slider update, from -65535 to 65535
    pub fn slider(&self, position: i32) {
        self.inner.borrow_mut().pending.slider = Some(position);
    }

    /// Queue a wheel update
    pub fn wheel(&self, degrees: f64, clicks: i32) {
        self.inner.borrow_mut().pending.wheel = Some((degrees, clicks));
    }

    /// Button on the tool was pressed or released
    pub fn button(&self, button: u32, state: ButtonState, serial: u32, time: u32) {
        if let Some(tool) = self.target() {
            tool.send_event(zwp_tablet_tool_v2::Event::Button { serial, button, state });
            tool.send_event(zwp_tablet_tool_v2::Event::Frame { time });
        }
    }

    /// Send the queued axis updates and terminate the frame
    pub fn frame(&self, time: u32) {
        match self.target() {
            Some(tool) => {
                self.flush_pending(&tool);
                tool.send_event(zwp_tablet_tool_v2::Event::Frame { time });
            }
            None => self.inner.borrow_mut().pending = Pending::default(),
        }
    }
}

impl<D> Dispatch<ZwpTabletToolV2, TabletToolUserData, D> for TabletManagerState
where
    D: Dispatch<ZwpTabletToolV2, TabletToolUserData> + TabletToolHandler + 'static,
{
    fn request(
        state: &mut D,
        _client: ClientId,
        tool: &Resource<ZwpTabletToolV2>,
        request: zwp_tablet_tool_v2::Request,
        data: &TabletToolUserData,
        dh: &DisplayHandle,
        _data_init: &mut DataInit<'_, D>,
    ) {
        match request {
            zwp_tablet_tool_v2::Request::SetCursor {
                serial,
                surface,
                hotspot_x,
                hotspot_y,
            } => {
                let surface = surface.and_then(|surface| dh.get_object::<WlSurface>(surface).ok());
                let hotspot = Point::from((hotspot_x, hotspot_y));

                let cursor = {
                    let mut cursor = data.cursor.borrow_mut();
                    if cursor
                        .as_ref()
                        .is_some_and(|cursor| cursor.same_as(serial, surface.as_ref(), hotspot))
                    {
                        return;
                    }
                    let new = TabletCursor {
                        serial,
                        surface: surface.as_ref().map(Resource::downgrade),
                        hotspot,
                    };
                    *cursor = Some(new.clone());
                    new
                };

                if data.handle.target().as_ref() == Some(tool) {
                    state.tablet_tool_cursor_changed(&data.handle, &cursor);
                }
            }
            zwp_tablet_tool_v2::Request::Destroy => {
                // Nothing to do
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardware_ids_are_split_in_halves() {
        assert_eq!(split(0x0000_0001_0000_0002), (1, 2));
        assert_eq!(split(u64::MAX), (u32::MAX, u32::MAX));
    }

    #[test]
    fn capabilities_follow_protocol_order() {
        let caps = TabletToolCapabilities::WHEEL | TabletToolCapabilities::TILT | TabletToolCapabilities::PRESSURE;
        assert_eq!(
            caps.protocol_capabilities().collect::<Vec<_>>(),
            vec![Capability::Tilt, Capability::Pressure, Capability::Wheel]
        );
    }
}
