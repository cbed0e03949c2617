//! The subset of the core `wayland` protocol implemented by this crate

/// `wl_compositor`: surface factory
pub mod wl_compositor {
    use crate::wayland::{
        ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, New, RequestMessage,
    };

    use super::wl_surface::WlSurface;

    /// Marker type of `wl_compositor`
    #[derive(Debug)]
    pub struct WlCompositor;

    impl Interface for WlCompositor {
        const NAME: &'static str = "wl_compositor";
        const VERSION: u32 = 1;
        type Request = Request;
        type Event = Event;
    }

    /// create new surface
    pub const REQ_CREATE_SURFACE_OPCODE: u16 = 0;

    /// Requests of `wl_compositor`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// create new surface
        CreateSurface {
            /// the new surface
            id: New<WlSurface>,
        },
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let mut args = Arguments::new(WlCompositor::NAME, message, version);
            match args.opcode() {
                REQ_CREATE_SURFACE_OPCODE => Ok(Request::CreateSurface { id: args.new_id()? }),
                _ => Err(args.bad_opcode()),
            }
        }
    }

    /// `wl_compositor` has no events
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

/// `wl_surface`: an onscreen surface
pub mod wl_surface {
    use smallvec::smallvec;

    use crate::wayland::{
        Argument, ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, ObjectId,
        RequestMessage,
    };

    /// Marker type of `wl_surface`
    #[derive(Debug)]
    pub struct WlSurface;

    impl Interface for WlSurface {
        const NAME: &'static str = "wl_surface";
        const VERSION: u32 = 1;
        type Request = Request;
        type Event = Event;
    }

    /// delete surface
    pub const REQ_DESTROY_OPCODE: u16 = 0;

    /// surface enters an output
    pub const EVT_ENTER_OPCODE: u16 = 0;
    /// surface leaves an output
    pub const EVT_LEAVE_OPCODE: u16 = 1;

    /// Requests of `wl_surface`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// delete surface
        Destroy,
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let args = Arguments::new(WlSurface::NAME, message, version);
            match args.opcode() {
                REQ_DESTROY_OPCODE => Ok(Request::Destroy),
                _ => Err(args.bad_opcode()),
            }
        }

        fn is_destructor(&self) -> bool {
            matches!(self, Request::Destroy)
        }
    }

    /// Events of `wl_surface`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Event {
        /// surface enters an output
        Enter {
            /// `wl_output` entered by the surface
            output: ObjectId,
        },
        /// surface leaves an output
        Leave {
            /// `wl_output` left by the surface
            output: ObjectId,
        },
    }

    impl EventMessage for Event {
        fn opcode(&self) -> u16 {
            match self {
                Event::Enter { .. } => EVT_ENTER_OPCODE,
                Event::Leave { .. } => EVT_LEAVE_OPCODE,
            }
        }

        fn into_args(self) -> ArgumentList {
            match self {
                Event::Enter { output } | Event::Leave { output } => smallvec![Argument::Object(Some(output))],
            }
        }
    }
}

/// `wl_seat`: group of input devices
pub mod wl_seat {
    use smallvec::smallvec;

    use crate::wayland::{
        Argument, ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, RequestMessage,
    };

    /// Marker type of `wl_seat`
    #[derive(Debug)]
    pub struct WlSeat;

    impl Interface for WlSeat {
        const NAME: &'static str = "wl_seat";
        const VERSION: u32 = 5;
        type Request = Request;
        type Event = Event;
    }

    /// release the seat object
    pub const REQ_RELEASE_OPCODE: u16 = 3;
    /// first version with `release`
    pub const REQ_RELEASE_SINCE: u32 = 5;

    /// seat capabilities changed
    pub const EVT_CAPABILITIES_OPCODE: u16 = 0;
    /// unique identifier for this seat
    pub const EVT_NAME_OPCODE: u16 = 1;
    /// first version with `name`
    pub const EVT_NAME_SINCE: u32 = 2;

    bitflags::bitflags! {
        /// seat capability bitmask
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct Capability: u32 {
            /// the seat has pointer devices
            const POINTER = 1;
            /// the seat has one or more keyboards
            const KEYBOARD = 2;
            /// the seat has touch devices
            const TOUCH = 4;
        }
    }

    /// Requests of `wl_seat`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// release the seat object
        Release,
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let args = Arguments::new(WlSeat::NAME, message, version);
            match args.opcode() {
                REQ_RELEASE_OPCODE => {
                    args.since(REQ_RELEASE_SINCE)?;
                    Ok(Request::Release)
                }
                _ => Err(args.bad_opcode()),
            }
        }

        fn is_destructor(&self) -> bool {
            matches!(self, Request::Release)
        }
    }

    /// Events of `wl_seat`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Event {
        /// seat capabilities changed
        Capabilities {
            /// capabilities of the seat
            capabilities: Capability,
        },
        /// unique identifier for this seat
        Name {
            /// seat identifier
            name: String,
        },
    }

    impl EventMessage for Event {
        fn opcode(&self) -> u16 {
            match self {
                Event::Capabilities { .. } => EVT_CAPABILITIES_OPCODE,
                Event::Name { .. } => EVT_NAME_OPCODE,
            }
        }

        fn since(&self) -> u32 {
            match self {
                Event::Capabilities { .. } => 1,
                Event::Name { .. } => EVT_NAME_SINCE,
            }
        }

        fn into_args(self) -> ArgumentList {
            match self {
                Event::Capabilities { capabilities } => smallvec![Argument::Uint(capabilities.bits())],
                Event::Name { name } => smallvec![Argument::Str(Some(name))],
            }
        }
    }
}

/// `wl_output`: compositor output region
pub mod wl_output {
    use smallvec::smallvec;

    use crate::protocols::protocol_enum;
    use crate::wayland::{
        Argument, ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, RequestMessage,
    };

    /// Marker type of `wl_output`
    #[derive(Debug)]
    pub struct WlOutput;

    impl Interface for WlOutput {
        const NAME: &'static str = "wl_output";
        const VERSION: u32 = 3;
        type Request = Request;
        type Event = Event;
    }

    /// release the output object
    pub const REQ_RELEASE_OPCODE: u16 = 0;
    /// first version with `release`
    pub const REQ_RELEASE_SINCE: u32 = 3;

    /// properties of the output
    pub const EVT_GEOMETRY_OPCODE: u16 = 0;
    /// advertise available modes for the output
    pub const EVT_MODE_OPCODE: u16 = 1;
    /// sent all information about output
    pub const EVT_DONE_OPCODE: u16 = 2;
    /// first version with `done`
    pub const EVT_DONE_SINCE: u32 = 2;
    /// output scaling properties
    pub const EVT_SCALE_OPCODE: u16 = 3;
    /// first version with `scale`
    pub const EVT_SCALE_SINCE: u32 = 2;

    protocol_enum! {
        /// subpixel geometry information
        pub enum Subpixel {
            /// unknown geometry
            Unknown = 0,
            /// no geometry
            None = 1,
            /// horizontal RGB
            HorizontalRgb = 2,
            /// horizontal BGR
            HorizontalBgr = 3,
            /// vertical RGB
            VerticalRgb = 4,
            /// vertical BGR
            VerticalBgr = 5,
        }
    }

    protocol_enum! {
        /// transform from framebuffer to output
        #[allow(non_camel_case_types)]
        pub enum Transform {
            /// no transform
            Normal = 0,
            /// 90 degrees counter-clockwise
            _90 = 1,
            /// 180 degrees counter-clockwise
            _180 = 2,
            /// 270 degrees counter-clockwise
            _270 = 3,
            /// 180 degree flip around a vertical axis
            Flipped = 4,
            /// flip and rotate 90 degrees counter-clockwise
            Flipped90 = 5,
            /// flip and rotate 180 degrees counter-clockwise
            Flipped180 = 6,
            /// flip and rotate 270 degrees counter-clockwise
            Flipped270 = 7,
        }
    }

    bitflags::bitflags! {
        /// mode information
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct Mode: u32 {
            /// indicates this is the current mode
            const CURRENT = 0x1;
            /// indicates this is the preferred mode
            const PREFERRED = 0x2;
        }
    }

    /// Requests of `wl_output`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// release the output object
        Release,
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let args = Arguments::new(WlOutput::NAME, message, version);
            match args.opcode() {
                REQ_RELEASE_OPCODE => {
                    args.since(REQ_RELEASE_SINCE)?;
                    Ok(Request::Release)
                }
                _ => Err(args.bad_opcode()),
            }
        }

        fn is_destructor(&self) -> bool {
            matches!(self, Request::Release)
        }
    }

    /// Events of `wl_output`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Event {
        /// properties of the output
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
        /// advertise available modes for the output
        Mode {
            /// bitfield of mode flags
            flags: Mode,
            /// width of the mode in hardware units
            width: i32,
            /// height of the mode in hardware units
            height: i32,
            /// vertical refresh rate in mHz
            refresh: i32,
        },
        /// sent all information about output
        Done,
        /// output scaling properties
        Scale {
            /// scaling factor of output
            factor: i32,
        },
    }

    impl EventMessage for Event {
        fn opcode(&self) -> u16 {
            match self {
                Event::Geometry { .. } => EVT_GEOMETRY_OPCODE,
                Event::Mode { .. } => EVT_MODE_OPCODE,
                Event::Done => EVT_DONE_OPCODE,
                Event::Scale { .. } => EVT_SCALE_OPCODE,
            }
        }

        fn since(&self) -> u32 {
            match self {
                Event::Geometry { .. } | Event::Mode { .. } => 1,
                Event::Done => EVT_DONE_SINCE,
                Event::Scale { .. } => EVT_SCALE_SINCE,
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
                } => smallvec![
                    Argument::Uint(flags.bits()),
                    Argument::Int(width),
                    Argument::Int(height),
                    Argument::Int(refresh),
                ],
                Event::Done => smallvec![],
                Event::Scale { factor } => smallvec![Argument::Int(factor)],
            }
        }
    }
}
