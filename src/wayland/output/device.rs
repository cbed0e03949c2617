use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{self, Rc};

use tracing::{debug, trace_span, warn};

use crate::protocols::outputdevice::org_kde_kwin_outputdevice::{
    self, Enablement, OrgKdeKwinOutputdevice, Subpixel, Transform,
};
use crate::utils::{Point, Size};
use crate::wayland::{
    ClientId, DataInit, Dispatch, DisplayHandle, GlobalDispatch, GlobalId, New, Resource, ResourceSet,
};

use super::{Mode, ModeList, OutputError, OutputManagerState};

const OUTPUT_DEVICE_VERSION: u32 = 2;

#[derive(Debug)]
struct DeviceState {
    uuid: String,
    edid: Vec<u8>,
    enabled: bool,
    scale: f64,
    manufacturer: String,
    model: String,
    serial_number: String,
    eisa_id: String,
    physical_size: Size<i32>,
    global_position: Point<i32>,
    subpixel: Subpixel,
    transform: Transform,
    modes: ModeList,
}

struct DeviceInner {
    state: RefCell<DeviceState>,
    global: Cell<Option<GlobalId>>,
    resources: ResourceSet<OrgKdeKwinOutputdevice>,
}

/// An output device, advertised as an `org_kde_kwin_outputdevice` global
///
/// Output devices describe every connected screen, enabled or not, for configuration
/// tools. Every setter only notifies the clients if the value changed, each notification
/// ends with `done`.
#[derive(Clone)]
pub struct OutputDevice {
    inner: Rc<DeviceInner>,
}

/// Global data of an `org_kde_kwin_outputdevice` global
#[derive(Debug)]
pub struct OutputDeviceGlobalData {
    device: OutputDevice,
}

/// User data of an `org_kde_kwin_outputdevice` resource
#[derive(Debug)]
pub struct OutputDeviceUserData {
    device: rc::Weak<DeviceInner>,
}

impl OutputDevice {
    /// A new, enabled, output device
    pub fn new(uuid: impl Into<String>) -> OutputDevice {
        OutputDevice {
            inner: Rc::new(DeviceInner {
                state: RefCell::new(DeviceState {
                    uuid: uuid.into(),
                    edid: Vec::new(),
                    enabled: true,
                    scale: 1.0,
                    manufacturer: "org.kde.kwin".into(),
                    model: "none".into(),
                    serial_number: String::new(),
                    eisa_id: String::new(),
                    physical_size: Size::default(),
                    global_position: Point::default(),
                    subpixel: Subpixel::Unknown,
                    transform: Transform::Normal,
                    modes: ModeList::new(),
                }),
                global: Cell::new(None),
                resources: ResourceSet::new(),
            }),
        }
    }

    /// Advertise the device
    pub fn create_global<D>(&self, display: &DisplayHandle) -> GlobalId
    where
        D: GlobalDispatch<OrgKdeKwinOutputdevice, OutputDeviceGlobalData>
            + Dispatch<OrgKdeKwinOutputdevice, OutputDeviceUserData>
            + 'static,
    {
        let global = display.create_global::<D, OrgKdeKwinOutputdevice, _>(
            OUTPUT_DEVICE_VERSION,
            OutputDeviceGlobalData { device: self.clone() },
        );
        self.inner.global.set(Some(global.id()));
        global.id()
    }

    /// The global of this device, if it was created
    pub fn global(&self) -> Option<GlobalId> {
        self.inner.global.get()
    }

    /// Uuid of the device
    pub fn uuid(&self) -> String {
        self.inner.state.borrow().uuid.clone()
    }

    /// Raw EDID of the device
    pub fn edid(&self) -> Vec<u8> {
        self.inner.state.borrow().edid.clone()
    }

    /// Whether the device is enabled
    pub fn enabled(&self) -> bool {
        self.inner.state.borrow().enabled
    }

    /// Scale of the device
    pub fn scale(&self) -> f64 {
        self.inner.state.borrow().scale
    }

    /// Every mode of the device, in insertion order
    pub fn modes(&self) -> Vec<Mode> {
        self.inner.state.borrow().modes.modes().to_vec()
    }

    /// The current mode
    pub fn current_mode(&self) -> Option<Mode> {
        self.inner.state.borrow().modes.current()
    }

    /// Add a mode or update the flags of a known one
    ///
    /// Modes of output devices are identified by [`Mode::id`]. An id already used by
    /// another mode is refused.
    pub fn add_mode(&self, mode: Mode) {
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            if let Some(existing) = state.modes.by_id(mode.id) {
                if existing.size != mode.size || existing.refresh != mode.refresh {
                    warn!(id = mode.id, ?existing, ?mode, "Mode id is already used by another mode");
                    return;
                }
            }
            state.modes.add(mode)
        };
        if changed {
            self.broadcast_modes();
        }
    }

    /// Change the current mode, by mode id
    pub fn set_current_mode(&self, id: i32) -> Result<(), OutputError> {
        let changed = self.inner.state.borrow_mut().modes.set_current_by_id(id);
        match changed {
            Ok(true) => {
                self.broadcast_modes();
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(err) => {
                warn!(%err, "Cannot change the current mode of the output device");
                Err(err)
            }
        }
    }

    /// Set the uuid
    pub fn set_uuid(&self, uuid: impl Into<String>) {
        let uuid = uuid.into();
        if self.update(|state| replace(&mut state.uuid, uuid.clone())) {
            self.broadcast(|device| device.send_event(org_kde_kwin_outputdevice::Event::Uuid { uuid: uuid.clone() }));
        }
    }

    /// Set the raw EDID
    pub fn set_edid(&self, edid: Vec<u8>) {
        let raw = base64_encode(&edid);
        if self.update(|state| replace(&mut state.edid, edid)) {
            self.broadcast(|device| device.send_event(org_kde_kwin_outputdevice::Event::Edid { raw: raw.clone() }));
        }
    }

    /// Enable or disable the device
    pub fn set_enabled(&self, enabled: bool) {
        if self.update(|state| replace(&mut state.enabled, enabled)) {
            self.broadcast(|device| {
                device.send_event(org_kde_kwin_outputdevice::Event::Enabled {
                    enabled: enablement(enabled),
                })
            });
        }
    }

    /// Set the scale
    ///
    /// Clients bound before version 2 get it rounded to an integer.
    pub fn set_scale(&self, scale: f64) {
        if self.update(|state| replace(&mut state.scale, scale)) {
            self.broadcast(|device| send_scale(device, scale));
        }
    }

    /// Set the textual description of the manufacturer
    pub fn set_manufacturer(&self, manufacturer: impl Into<String>) {
        let manufacturer = manufacturer.into();
        if self.update(|state| replace(&mut state.manufacturer, manufacturer)) {
            self.broadcast(|device| self.send_geometry(device));
        }
    }

    /// Set the textual description of the model
    pub fn set_model(&self, model: impl Into<String>) {
        let model = model.into();
        if self.update(|state| replace(&mut state.model, model)) {
            self.broadcast(|device| self.send_geometry(device));
        }
    }

    /// Set the serial number
    pub fn set_serial_number(&self, serial_number: impl Into<String>) {
        let serial_number = serial_number.into();
        if self.update(|state| replace(&mut state.serial_number, serial_number.clone())) {
            self.broadcast(|device| {
                device.send_event(org_kde_kwin_outputdevice::Event::SerialNumber {
                    serial_number: serial_number.clone(),
                })
            });
        }
    }

    /// Set the EISA id of the manufacturer
    pub fn set_eisa_id(&self, eisa_id: impl Into<String>) {
        let eisa_id = eisa_id.into();
        if self.update(|state| replace(&mut state.eisa_id, eisa_id.clone())) {
            self.broadcast(|device| {
                device.send_event(org_kde_kwin_outputdevice::Event::EisaId {
                    eisa_id: eisa_id.clone(),
                })
            });
        }
    }

    /// Set the physical size, in millimeters
    pub fn set_physical_size(&self, size: Size<i32>) {
        if self.update(|state| replace(&mut state.physical_size, size)) {
            self.broadcast(|device| self.send_geometry(device));
        }
    }

    /// Set the position in the global compositor space
    pub fn set_global_position(&self, position: Point<i32>) {
        if self.update(|state| replace(&mut state.global_position, position)) {
            self.broadcast(|device| self.send_geometry(device));
        }
    }

    /// Set the subpixel layout
    pub fn set_subpixel(&self, subpixel: Subpixel) {
        if self.update(|state| replace(&mut state.subpixel, subpixel)) {
            self.broadcast(|device| self.send_geometry(device));
        }
    }

    /// Set the transform
    pub fn set_transform(&self, transform: Transform) {
        if self.update(|state| replace(&mut state.transform, transform)) {
            self.broadcast(|device| self.send_geometry(device));
        }
    }

    /// Whether `resource` is a binding of this device
    pub fn owns(&self, resource: &Resource<OrgKdeKwinOutputdevice>) -> bool {
        resource
            .data::<OutputDeviceUserData>()
            .is_some_and(|data| std::ptr::eq(data.device.as_ptr(), Rc::as_ptr(&self.inner)))
    }

    fn update(&self, f: impl FnOnce(&mut DeviceState) -> bool) -> bool {
        f(&mut self.inner.state.borrow_mut())
    }

    fn broadcast(&self, mut f: impl FnMut(&Resource<OrgKdeKwinOutputdevice>)) {
        self.inner.resources.broadcast(|device| {
            f(device);
            device.send_event(org_kde_kwin_outputdevice::Event::Done);
        });
    }

    fn broadcast_modes(&self) {
        self.broadcast(|device| self.send_modes(device));
    }

    fn send_geometry(&self, device: &Resource<OrgKdeKwinOutputdevice>) {
        let state = self.inner.state.borrow();
        device.send_event(org_kde_kwin_outputdevice::Event::Geometry {
            x: state.global_position.x,
            y: state.global_position.y,
            physical_width: state.physical_size.w,
            physical_height: state.physical_size.h,
            subpixel: state.subpixel,
            make: state.manufacturer.clone(),
            model: state.model.clone(),
            transform: state.transform,
        });
    }

    fn send_modes(&self, device: &Resource<OrgKdeKwinOutputdevice>) {
        let modes: Vec<Mode> = self.inner.state.borrow().modes.replay_order().collect();
        for mode in modes {
            device.send_event(org_kde_kwin_outputdevice::Event::Mode {
                flags: org_kde_kwin_outputdevice::Mode::from_bits_truncate(mode.flags.bits()),
                width: mode.size.w,
                height: mode.size.h,
                refresh: mode.refresh,
                mode_id: mode.id,
            });
        }
    }

    fn replay(&self, device: &Resource<OrgKdeKwinOutputdevice>) {
        self.send_geometry(device);
        self.send_modes(device);

        let state = self.inner.state.borrow();
        send_scale(device, state.scale);
        device.send_event(org_kde_kwin_outputdevice::Event::Edid {
            raw: base64_encode(&state.edid),
        });
        device.send_event(org_kde_kwin_outputdevice::Event::Enabled {
            enabled: enablement(state.enabled),
        });
        device.send_event(org_kde_kwin_outputdevice::Event::Uuid {
            uuid: state.uuid.clone(),
        });
        device.send_event(org_kde_kwin_outputdevice::Event::SerialNumber {
            serial_number: state.serial_number.clone(),
        });
        device.send_event(org_kde_kwin_outputdevice::Event::EisaId {
            eisa_id: state.eisa_id.clone(),
        });
        device.send_event(org_kde_kwin_outputdevice::Event::Done);
    }
}

impl PartialEq for OutputDevice {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for OutputDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputDevice")
            .field("state", &self.inner.state.borrow())
            .field("resources", &self.inner.resources.len())
            .finish_non_exhaustive()
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn enablement(enabled: bool) -> Enablement {
    if enabled {
        Enablement::Enabled
    } else {
        Enablement::Disabled
    }
}

fn send_scale(device: &Resource<OrgKdeKwinOutputdevice>, scale: f64) {
    if device.version() >= org_kde_kwin_outputdevice::EVT_SCALEF_SINCE {
        device.send_event(org_kde_kwin_outputdevice::Event::Scalef { factor: scale });
    } else {
        device.send_event(org_kde_kwin_outputdevice::Event::Scale {
            factor: scale.round() as i32,
        });
    }
}

const BASE64_ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Standard base64 with padding, the encoding of the `edid` event
fn base64_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() + 2) / 3 * 4);
    for chunk in data.chunks(3) {
        let b = [chunk[0], *chunk.get(1).unwrap_or(&0), *chunk.get(2).unwrap_or(&0)];
        let n = (u32::from(b[0]) << 16) | (u32::from(b[1]) << 8) | u32::from(b[2]);
        for i in 0..4 {
            if i <= chunk.len() {
                out.push(BASE64_ALPHABET[((n >> (18 - 6 * i)) & 0x3f) as usize] as char);
            } else {
                out.push('=');
            }
        }
    }
    out
}

impl<D> GlobalDispatch<OrgKdeKwinOutputdevice, OutputDeviceGlobalData, D> for OutputManagerState
where
    D: GlobalDispatch<OrgKdeKwinOutputdevice, OutputDeviceGlobalData>
        + Dispatch<OrgKdeKwinOutputdevice, OutputDeviceUserData>
        + 'static,
{
    fn bind(
        _state: &mut D,
        _handle: &DisplayHandle,
        _client: ClientId,
        resource: New<OrgKdeKwinOutputdevice>,
        global_data: &OutputDeviceGlobalData,
        data_init: &mut DataInit<'_, D>,
    ) {
        let device = &global_data.device;
        let _span = trace_span!("outputdevice_bind", uuid = %device.uuid()).entered();

        let resource = data_init.init(
            resource,
            OutputDeviceUserData {
                device: Rc::downgrade(&device.inner),
            },
        );
        device.inner.resources.insert(&resource);
        debug!(version = resource.version(), "Output device bound");
        device.replay(&resource);
    }
}

impl<D> Dispatch<OrgKdeKwinOutputdevice, OutputDeviceUserData, D> for OutputManagerState
where
    D: Dispatch<OrgKdeKwinOutputdevice, OutputDeviceUserData> + 'static,
{
    fn request(
        _state: &mut D,
        _client: ClientId,
        _resource: &Resource<OrgKdeKwinOutputdevice>,
        request: org_kde_kwin_outputdevice::Request,
        _data: &OutputDeviceUserData,
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, D>,
    ) {
        match request {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64() {
        assert_eq!(base64_encode(b""), "");
        assert_eq!(base64_encode(b"f"), "Zg==");
        assert_eq!(base64_encode(b"fo"), "Zm8=");
        assert_eq!(base64_encode(b"foo"), "Zm9v");
        assert_eq!(base64_encode(b"foobar"), "Zm9vYmFy");
        assert_eq!(base64_encode(&[0x00, 0xff, 0xee, 0x10]), "AP/uEA==");
    }

    #[test]
    fn duplicate_mode_id_is_refused() {
        let device = OutputDevice::new("uuid");
        device.add_mode(Mode::new((1920, 1080), 60000).with_id(0));
        device.add_mode(Mode::new((1280, 720), 60000).with_id(0));
        assert_eq!(device.modes().len(), 1);

        device.add_mode(Mode::new((1280, 720), 60000).with_id(1));
        assert!(device.set_current_mode(1).is_ok());
        assert_eq!(device.current_mode().map(|m| m.id), Some(1));
        assert_eq!(device.set_current_mode(5), Err(OutputError::UnknownModeId(5)));
    }
}
