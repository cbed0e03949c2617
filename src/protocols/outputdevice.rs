//! KDE output device protocol
//!
//! Describes every connected screen, enabled or not, with enough detail for a screen
//! configuration tool.

/// `org_kde_kwin_outputdevice`: output configuration representation
pub mod org_kde_kwin_outputdevice {
    use smallvec::smallvec;

    use crate::protocols::protocol_enum;
    use crate::wayland::{
        Argument, ArgumentList, Arguments, DispatchError, EventMessage, Fixed, Interface, Message,
        RequestMessage,
    };

    pub use crate::protocols::wayland_core::wl_output::{Mode, Subpixel, Transform};

    /// Marker type of `org_kde_kwin_outputdevice`
    #[derive(Debug)]
    pub struct OrgKdeKwinOutputdevice;

    impl Interface for OrgKdeKwinOutputdevice {
        const NAME: &'static str = "org_kde_kwin_outputdevice";
        const VERSION: u32 = 2;
        type Request = Request;
        type Event = Event;
    }

    /// geometric properties of the output
    pub const EVT_GEOMETRY_OPCODE: u16 = 0;
    /// advertise available output modes and current one
    pub const EVT_MODE_OPCODE: u16 = 1;
    /// sent all information about output
    pub const EVT_DONE_OPCODE: u16 = 2;
    /// output scaling properties
    pub const EVT_SCALE_OPCODE: u16 = 3;
    /// advertise EDID data for the output
    pub const EVT_EDID_OPCODE: u16 = 4;
    /// output is enabled or disabled
    pub const EVT_ENABLED_OPCODE: u16 = 5;
    /// a unique id for this outputdevice
    pub const EVT_UUID_OPCODE: u16 = 6;
    /// output scaling properties, as a fixed point number
    pub const EVT_SCALEF_OPCODE: u16 = 7;
    /// first version with `scalef`
    pub const EVT_SCALEF_SINCE: u32 = 2;
    /// serial number of the output
    pub const EVT_SERIAL_NUMBER_OPCODE: u16 = 9;
    /// first version with `serial_number`
    pub const EVT_SERIAL_NUMBER_SINCE: u32 = 2;
    /// EISA id of the output
    pub const EVT_EISA_ID_OPCODE: u16 = 10;
    /// first version with `eisa_id`
    pub const EVT_EISA_ID_SINCE: u32 = 2;

    protocol_enum! {
        /// describes whether a device is enabled
        pub enum Enablement {
            /// the output is disabled
            Disabled = 0,
            /// the output is enabled
            Enabled = 1,
        }
    }

    /// `org_kde_kwin_outputdevice` has no requests
    #[derive(Debug)]
    pub enum Request {}

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            Err(Arguments::new(OrgKdeKwinOutputdevice::NAME, message, version).bad_opcode())
        }
    }

    /// Events of `org_kde_kwin_outputdevice`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Event {
        /// geometric properties of the output
        Geometry {
            /// x position within the global compositor space
            x: i32,
            /// y position within the global compositor space
            y: i32,
            /// width in millimeters of the output
            physical_width: i32,
            /// height in millimeters of the output
            physical_height: i32,
            /// subpixel orientation of the output
            subpixel: Subpixel,
            /// textual description of the manufacturer
            make: String,
            /// textual description of the model
            model: String,
            /// transform that maps framebuffer to output
            transform: Transform,
        },
        /// advertise available output modes and current one
        Mode {
            /// bitfield of mode flags
            flags: Mode,
            /// width of the mode in hardware units
            width: i32,
            /// height of the mode in hardware units
            height: i32,
            /// vertical refresh rate in mHz
            refresh: i32,
            /// per outputdevice unique id to identify a mode
            mode_id: i32,
        },
        /// sent all information about output
        Done,
        /// output scaling properties
        Scale {
            /// scaling factor of output
            factor: i32,
        },
        /// advertise EDID data for the output
        Edid {
            /// base64-encoded EDID string
            raw: String,
        },
        /// output is enabled or disabled
        Enabled {
            /// output enabled state
            enabled: Enablement,
        },
        /// a unique id for this outputdevice
        Uuid {
            /// output devices ID
            uuid: String,
        },
        /// output scaling properties, as a fixed point number
        Scalef {
            /// scaling factor of output
            factor: f64,
        },
        /// serial number of the output
        SerialNumber {
            /// textual representation of serial number
            serial_number: String,
        },
        /// EISA id of the output
        EisaId {
            /// textual representation of EISA identifier
            eisa_id: String,
        },
    }

    impl EventMessage for Event {
        fn opcode(&self) -> u16 {
            match self {
                Event::Geometry { .. } => EVT_GEOMETRY_OPCODE,
                Event::Mode { .. } => EVT_MODE_OPCODE,
                Event::Done => EVT_DONE_OPCODE,
                Event::Scale { .. } => EVT_SCALE_OPCODE,
                Event::Edid { .. } => EVT_EDID_OPCODE,
                Event::Enabled { .. } => EVT_ENABLED_OPCODE,
                Event::Uuid { .. } => EVT_UUID_OPCODE,
                Event::Scalef { .. } => EVT_SCALEF_OPCODE,
                Event::SerialNumber { .. } => EVT_SERIAL_NUMBER_OPCODE,
                Event::EisaId { .. } => EVT_EISA_ID_OPCODE,
            }
        }

        fn since(&self) -> u32 {
            match self {
                Event::Scalef { .. } => EVT_SCALEF_SINCE,
                Event::SerialNumber { .. } => EVT_SERIAL_NUMBER_SINCE,
                Event::EisaId { .. } => EVT_EISA_ID_SINCE,
                _ => 1,
            }
        }

        fn into_args(self) -> ArgumentList {
            match self {
                Event::Geometry {
                    x,
                    y,
                    physical_width,
                    physical_height,
                    subpixel,
                    make,
                    model,
                    transform,
                } => smallvec![
                    Argument::Int(x),
                    Argument::Int(y),
                    Argument::Int(physical_width),
                    Argument::Int(physical_height),
                    Argument::Int(u32::from(subpixel) as i32),
                    Argument::Str(Some(make)),
                    Argument::Str(Some(model)),
                    Argument::Int(u32::from(transform) as i32),
                ],
                Event::Mode {
                    flags,
                    width,
                    height,
                    refresh,
                    mode_id,
                } => smallvec![
                    Argument::Uint(flags.bits()),
                    Argument::Int(width),
                    Argument::Int(height),
                    Argument::Int(refresh),
                    Argument::Int(mode_id),
                ],
                Event::Done => smallvec![],
                Event::Scale { factor } => smallvec![Argument::Int(factor)],
                Event::Edid { raw } => smallvec![Argument::Str(Some(raw))],
                Event::Enabled { enabled } => smallvec![Argument::Int(u32::from(enabled) as i32)],
                Event::Uuid { uuid } => smallvec![Argument::Str(Some(uuid))],
                Event::Scalef { factor } => smallvec![Argument::Fixed(Fixed::from_f64(factor))],
                Event::SerialNumber { serial_number } => smallvec![Argument::Str(Some(serial_number))],
                Event::EisaId { eisa_id } => smallvec![Argument::Str(Some(eisa_id))],
            }
        }
    }
}
