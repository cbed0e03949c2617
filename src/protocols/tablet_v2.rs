//! Wayland tablet protocol, unstable revision 2
//!
//! Pads are not implemented, the `pad_added` event is never sent.

/// `zwp_tablet_manager_v2`: controller object for graphic tablet devices
pub mod zwp_tablet_manager_v2 {
    use crate::wayland::{
        ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, New, ObjectId,
        RequestMessage,
    };

    use super::zwp_tablet_seat_v2::ZwpTabletSeatV2;

    /// Marker type of `zwp_tablet_manager_v2`
    #[derive(Debug)]
    pub struct ZwpTabletManagerV2;

    impl Interface for ZwpTabletManagerV2 {
        const NAME: &'static str = "zwp_tablet_manager_v2";
        const VERSION: u32 = 1;
        type Request = Request;
        type Event = Event;
    }

    /// get the tablet seat
    pub const REQ_GET_TABLET_SEAT_OPCODE: u16 = 0;
    /// release the memory for the tablet manager object
    pub const REQ_DESTROY_OPCODE: u16 = 1;

    /// Requests of `zwp_tablet_manager_v2`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// get the tablet seat
        GetTabletSeat {
            /// the new tablet seat
            tablet_seat: New<ZwpTabletSeatV2>,
            /// the `wl_seat` object
            seat: ObjectId,
        },
        /// release the memory for the tablet manager object
        Destroy,
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let mut args = Arguments::new(ZwpTabletManagerV2::NAME, message, version);
            match args.opcode() {
                REQ_GET_TABLET_SEAT_OPCODE => Ok(Request::GetTabletSeat {
                    tablet_seat: args.new_id()?,
                    seat: args.object()?,
                }),
                REQ_DESTROY_OPCODE => Ok(Request::Destroy),
                _ => Err(args.bad_opcode()),
            }
        }

        fn is_destructor(&self) -> bool {
            matches!(self, Request::Destroy)
        }
    }

    /// `zwp_tablet_manager_v2` has no events
    #[derive(Debug)]
    pub enum Event {}

    impl EventMessage for Event {
        fn opcode(&self) -> u16 {
            match *self {}
        }

        fn into_args(self) -> ArgumentList {
            match self {}
        }
    }
}

/// `zwp_tablet_seat_v2`: controller object for graphic tablet devices of a seat
pub mod zwp_tablet_seat_v2 {
    use smallvec::smallvec;

    use crate::wayland::{
        Argument, ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, ObjectId,
        RequestMessage,
    };

    /// Marker type of `zwp_tablet_seat_v2`
    #[derive(Debug)]
    pub struct ZwpTabletSeatV2;

    impl Interface for ZwpTabletSeatV2 {
        const NAME: &'static str = "zwp_tablet_seat_v2";
        const VERSION: u32 = 1;
        type Request = Request;
        type Event = Event;
    }

    /// release the memory for the tablet seat object
    pub const REQ_DESTROY_OPCODE: u16 = 0;

    /// new device notification
    pub const EVT_TABLET_ADDED_OPCODE: u16 = 0;
    /// a new tool has been used with a tablet
    pub const EVT_TOOL_ADDED_OPCODE: u16 = 1;
    /// new pad notification
    pub const EVT_PAD_ADDED_OPCODE: u16 = 2;

    /// Requests of `zwp_tablet_seat_v2`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// release the memory for the tablet seat object
        Destroy,
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let args = Arguments::new(ZwpTabletSeatV2::NAME, message, version);
            match args.opcode() {
                REQ_DESTROY_OPCODE => Ok(Request::Destroy),
                _ => Err(args.bad_opcode()),
            }
        }

        fn is_destructor(&self) -> bool {
            matches!(self, Request::Destroy)
        }
    }

    /// Events of `zwp_tablet_seat_v2`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Event {
        /// new device notification
        TabletAdded {
            /// the `zwp_tablet_v2` created by the server
            id: ObjectId,
        },
        /// a new tool has been used with a tablet
        ToolAdded {
            /// the `zwp_tablet_tool_v2` created by the server
            id: ObjectId,
        },
    }

    impl EventMessage for Event {
        fn opcode(&self) -> u16 {
            match self {
                Event::TabletAdded { .. } => EVT_TABLET_ADDED_OPCODE,
                Event::ToolAdded { .. } => EVT_TOOL_ADDED_OPCODE,
            }
        }

        fn into_args(self) -> ArgumentList {
            match self {
                Event::TabletAdded { id } | Event::ToolAdded { id } => smallvec![Argument::NewId(id)],
            }
        }
    }
}

/// `zwp_tablet_tool_v2`: a physical tablet tool
pub mod zwp_tablet_tool_v2 {
    use smallvec::smallvec;

    use crate::protocols::protocol_enum;
    use crate::wayland::{
        Argument, ArgumentList, Arguments, DispatchError, EventMessage, Fixed, Interface, Message,
        ObjectId, RequestMessage,
    };

    /// Marker type of `zwp_tablet_tool_v2`
    #[derive(Debug)]
    pub struct ZwpTabletToolV2;

    impl Interface for ZwpTabletToolV2 {
        const NAME: &'static str = "zwp_tablet_tool_v2";
        const VERSION: u32 = 1;
        type Request = Request;
        type Event = Event;
    }

    /// set the tablet tool's surface
    pub const REQ_SET_CURSOR_OPCODE: u16 = 0;
    /// destroy the tool object
    pub const REQ_DESTROY_OPCODE: u16 = 1;

    /// tool type
    pub const EVT_TYPE_OPCODE: u16 = 0;
    /// unique hardware serial number of the tool
    pub const EVT_HARDWARE_SERIAL_OPCODE: u16 = 1;
    /// hardware id notification in Wacom's format
    pub const EVT_HARDWARE_ID_WACOM_OPCODE: u16 = 2;
    /// tool capability notification
    pub const EVT_CAPABILITY_OPCODE: u16 = 3;
    /// tool description events sequence complete
    pub const EVT_DONE_OPCODE: u16 = 4;
    /// tool removed
    pub const EVT_REMOVED_OPCODE: u16 = 5;
    /// proximity in event
    pub const EVT_PROXIMITY_IN_OPCODE: u16 = 6;
    /// proximity out event
    pub const EVT_PROXIMITY_OUT_OPCODE: u16 = 7;
    /// tablet tool is making contact
    pub const EVT_DOWN_OPCODE: u16 = 8;
    /// tablet tool is no longer making contact
    pub const EVT_UP_OPCODE: u16 = 9;
    /// motion event
    pub const EVT_MOTION_OPCODE: u16 = 10;
    /// pressure change event
    pub const EVT_PRESSURE_OPCODE: u16 = 11;
    /// distance change event
    pub const EVT_DISTANCE_OPCODE: u16 = 12;
    /// tilt change event
    pub const EVT_TILT_OPCODE: u16 = 13;
    /// z-rotation change event
    pub const EVT_ROTATION_OPCODE: u16 = 14;
    /// slider position change event
    pub const EVT_SLIDER_OPCODE: u16 = 15;
    /// wheel delta event
    pub const EVT_WHEEL_OPCODE: u16 = 16;
    /// button event
    pub const EVT_BUTTON_OPCODE: u16 = 17;
    /// frame event
    pub const EVT_FRAME_OPCODE: u16 = 18;

    protocol_enum! {
        /// a physical tool type
        pub enum ToolType {
            /// pen
            Pen = 0x140,
            /// eraser
            Eraser = 0x141,
            /// brush
            Brush = 0x142,
            /// pencil
            Pencil = 0x143,
            /// airbrush
            Airbrush = 0x144,
            /// finger
            Finger = 0x145,
            /// mouse
            Mouse = 0x146,
            /// lens
            Lens = 0x147,
        }
    }

    protocol_enum! {
        /// capability flags for a tool
        pub enum Capability {
            /// tilt axes
            Tilt = 1,
            /// pressure axis
            Pressure = 2,
            /// distance axis
            Distance = 3,
            /// z-rotation axis
            Rotation = 4,
            /// slider axis
            Slider = 5,
            /// wheel axis
            Wheel = 6,
        }
    }

    protocol_enum! {
        /// physical button state
        pub enum ButtonState {
            /// button is not pressed
            Released = 0,
            /// button is pressed
            Pressed = 1,
        }
    }

    /// Requests of `zwp_tablet_tool_v2`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// set the tablet tool's surface
        SetCursor {
            /// serial of the proximity_in event
            serial: u32,
            /// the cursor `wl_surface`, none to hide the cursor
            surface: Option<ObjectId>,
            /// surface-local x of the hotspot
            hotspot_x: i32,
            /// surface-local y of the hotspot
            hotspot_y: i32,
        },
        /// destroy the tool object
        Destroy,
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let mut args = Arguments::new(ZwpTabletToolV2::NAME, message, version);
            match args.opcode() {
                REQ_SET_CURSOR_OPCODE => Ok(Request::SetCursor {
                    serial: args.uint()?,
                    surface: args.opt_object()?,
                    hotspot_x: args.int()?,
                    hotspot_y: args.int()?,
                }),
                REQ_DESTROY_OPCODE => Ok(Request::Destroy),
                _ => Err(args.bad_opcode()),
            }
        }

        fn is_destructor(&self) -> bool {
            matches!(self, Request::Destroy)
        }
    }

    /// Events of `zwp_tablet_tool_v2`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Event {
        /// tool type
        Type {
            /// the physical tool type
            tool_type: ToolType,
        },
        /// unique hardware serial number of the tool
        HardwareSerial {
            /// the unique serial number of the tool, most significant bits
            hardware_serial_hi: u32,
            /// the unique serial number of the tool, least significant bits
            hardware_serial_lo: u32,
        },
        /// hardware id notification in Wacom's format
        HardwareIdWacom {
            /// the hardware id, most significant bits
            hardware_id_hi: u32,
            /// the hardware id, least significant bits
            hardware_id_lo: u32,
        },
        /// tool capability notification
        Capability {
            /// the capability
            capability: Capability,
        },
        /// tool description events sequence complete
        Done,
        /// tool removed
        Removed,
        /// proximity in event
        ProximityIn {
            /// serial
            serial: u32,
            /// the `zwp_tablet_v2` the tool is in proximity of
            tablet: ObjectId,
            /// the `wl_surface` under the tool
            surface: ObjectId,
        },
        /// proximity out event
        ProximityOut,
        /// tablet tool is making contact
        Down {
            /// serial
            serial: u32,
        },
        /// tablet tool is no longer making contact
        Up,
        /// motion event
        Motion {
            /// surface-local x
            x: f64,
            /// surface-local y
            y: f64,
        },
        /// pressure change event
        Pressure {
            /// the current pressure value, 0 to 65535
            pressure: u32,
        },
        /// distance change event
        Distance {
            /// the current distance value, 0 to 65535
            distance: u32,
        },
        /// tilt change event
        Tilt {
            /// tilt along the x axis, in degrees
            tilt_x: f64,
            /// tilt along the y axis, in degrees
            tilt_y: f64,
        },
        /// z-rotation change event
        Rotation {
            /// rotation in degrees
            degrees: f64,
        },
        /// slider position change event
        Slider {
            /// the current position, -65535 to 65535
            position: i32,
        },
        /// wheel delta event
        Wheel {
            /// rotation in degrees
            degrees: f64,
            /// number of logical wheel clicks
            clicks: i32,
        },
        /// button event
        Button {
            /// serial
            serial: u32,
            /// the button
            button: u32,
            /// new state of the button
            state: ButtonState,
        },
        /// frame event
        Frame {
            /// timestamp in milliseconds
            time: u32,
        },
    }

    impl EventMessage for Event {
        fn opcode(&self) -> u16 {
            match self {
                Event::Type { .. } => EVT_TYPE_OPCODE,
                Event::HardwareSerial { .. } => EVT_HARDWARE_SERIAL_OPCODE,
                Event::HardwareIdWacom { .. } => EVT_HARDWARE_ID_WACOM_OPCODE,
                Event::Capability { .. } => EVT_CAPABILITY_OPCODE,
                Event::Done => EVT_DONE_OPCODE,
                Event::Removed => EVT_REMOVED_OPCODE,
                Event::ProximityIn { .. } => EVT_PROXIMITY_IN_OPCODE,
                Event::ProximityOut => EVT_PROXIMITY_OUT_OPCODE,
                Event::Down { .. } => EVT_DOWN_OPCODE,
                Event::Up => EVT_UP_OPCODE,
                Event::Motion { .. } => EVT_MOTION_OPCODE,
                Event::Pressure { .. } => EVT_PRESSURE_OPCODE,
                Event::Distance { .. } => EVT_DISTANCE_OPCODE,
                Event::Tilt { .. } => EVT_TILT_OPCODE,
                Event::Rotation { .. } => EVT_ROTATION_OPCODE,
                Event::Slider { .. } => EVT_SLIDER_OPCODE,
                Event::Wheel { .. } => EVT_WHEEL_OPCODE,
                Event::Button { .. } => EVT_BUTTON_OPCODE,
                Event::Frame { .. } => EVT_FRAME_OPCODE,
            }
        }

        fn into_args(self) -> ArgumentList {
            match self {
                Event::Type { tool_type } => smallvec![Argument::Uint(tool_type.into())],
                Event::HardwareSerial {
                    hardware_serial_hi,
                    hardware_serial_lo,
                } => smallvec![Argument::Uint(hardware_serial_hi), Argument::Uint(hardware_serial_lo)],
                Event::HardwareIdWacom {
                    hardware_id_hi,
                    hardware_id_lo,
                } => smallvec![Argument::Uint(hardware_id_hi), Argument::Uint(hardware_id_lo)],
                Event::Capability { capability } => smallvec![Argument::Uint(capability.into())],
                Event::Done | Event::Removed | Event::ProximityOut | Event::Up => smallvec![],
                Event::ProximityIn {
                    serial,
                    tablet,
                    surface,
                } => smallvec![
                    Argument::Uint(serial),
                    Argument::Object(Some(tablet)),
                    Argument::Object(Some(surface)),
                ],
                Event::Down { serial } => smallvec![Argument::Uint(serial)],
                Event::Motion { x, y } => smallvec![
                    Argument::Fixed(Fixed::from_f64(x)),
                    Argument::Fixed(Fixed::from_f64(y)),
                ],
                Event::Pressure { pressure } => smallvec![Argument::Uint(pressure)],
                Event::Distance { distance } => smallvec![Argument::Uint(distance)],
                Event::Tilt { tilt_x, tilt_y } => smallvec![
                    Argument::Fixed(Fixed::from_f64(tilt_x)),
                    Argument::Fixed(Fixed::from_f64(tilt_y)),
                ],
                Event::Rotation { degrees } => smallvec![Argument::Fixed(Fixed::from_f64(degrees))],
                Event::Slider { position } => smallvec![Argument::Int(position)],
                Event::Wheel { degrees, clicks } => {
                    smallvec![Argument::Fixed(Fixed::from_f64(degrees)), Argument::Int(clicks)]
                }
                Event::Button { serial, button, state } => smallvec![
                    Argument::Uint(serial),
                    Argument::Uint(button),
                    Argument::Uint(state.into()),
                ],
                Event::Frame { time } => smallvec![Argument::Uint(time)],
            }
        }
    }
}

/// `zwp_tablet_v2`: graphics tablet device
pub mod zwp_tablet_v2 {
    use smallvec::smallvec;

    use crate::wayland::{
        Argument, ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, RequestMessage,
    };

    /// Marker type of `zwp_tablet_v2`
    #[derive(Debug)]
    pub struct ZwpTabletV2;

    impl Interface for ZwpTabletV2 {
        const NAME: &'static str = "zwp_tablet_v2";
        const VERSION: u32 = 1;
        type Request = Request;
        type Event = Event;
    }

    /// destroy the tablet object
    pub const REQ_DESTROY_OPCODE: u16 = 0;

    /// tablet device name
    pub const EVT_NAME_OPCODE: u16 = 0;
    /// tablet device USB vendor/product id
    pub const EVT_ID_OPCODE: u16 = 1;
    /// path to the device
    pub const EVT_PATH_OPCODE: u16 = 2;
    /// tablet description events sequence complete
    pub const EVT_DONE_OPCODE: u16 = 3;
    /// tablet removed event
    pub const EVT_REMOVED_OPCODE: u16 = 4;

    /// Requests of `zwp_tablet_v2`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// destroy the tablet object
        Destroy,
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let args = Arguments::new(ZwpTabletV2::NAME, message, version);
            match args.opcode() {
                REQ_DESTROY_OPCODE => Ok(Request::Destroy),
                _ => Err(args.bad_opcode()),
            }
        }

        fn is_destructor(&self) -> bool {
            matches!(self, Request::Destroy)
        }
    }

    /// Events of `zwp_tablet_v2`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Event {
        /// tablet device name
        Name {
            /// the device name
            name: String,
        },
        /// tablet device USB vendor/product id
        Id {
            /// USB vendor id
            vid: u32,
            /// USB product id
            pid: u32,
        },
        /// path to the device
        Path {
            /// path to local device
            path: String,
        },
        /// tablet description events sequence complete
        Done,
        /// tablet removed event
        Removed,
    }

    impl EventMessage for Event {
        fn opcode(&self) -> u16 {
            match self {
                Event::Name { .. } => EVT_NAME_OPCODE,
                Event::Id { .. } => EVT_ID_OPCODE,
                Event::Path { .. } => EVT_PATH_OPCODE,
                Event::Done => EVT_DONE_OPCODE,
                Event::Removed => EVT_REMOVED_OPCODE,
            }
        }

        fn into_args(self) -> ArgumentList {
            match self {
                Event::Name { name } => smallvec![Argument::Str(Some(name))],
                Event::Id { vid, pid } => smallvec![Argument::Uint(vid), Argument::Uint(pid)],
                Event::Path { path } => smallvec![Argument::Str(Some(path))],
                Event::Done | Event::Removed => smallvec![],
            }
        }
    }
}
