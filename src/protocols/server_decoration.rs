//! KDE server decoration protocol
//!
//! Negotiates whether a surface is decorated by the client or by the compositor.

use crate::protocols::protocol_enum;

protocol_enum! {
    /// Possible values to use in `request_mode` and the event `mode`
    pub enum DecorationMode {
        /// Undecorated: neither client nor server decorate the surface
        None = 0,
        /// Client-side decoration
        Client = 1,
        /// Server-side decoration
        Server = 2,
    }
}

/// `org_kde_kwin_server_decoration_manager`: server-side window decoration manager
pub mod org_kde_kwin_server_decoration_manager {
    use smallvec::smallvec;

    use crate::wayland::{
        Argument, ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, New, ObjectId,
        RequestMessage,
    };

    use super::org_kde_kwin_server_decoration::OrgKdeKwinServerDecoration;
    pub use super::DecorationMode as Mode;

    /// Marker type of `org_kde_kwin_server_decoration_manager`
    #[derive(Debug)]
    pub struct OrgKdeKwinServerDecorationManager;

    impl Interface for OrgKdeKwinServerDecorationManager {
        const NAME: &'static str = "org_kde_kwin_server_decoration_manager";
        const VERSION: u32 = 1;
        type Request = Request;
        type Event = Event;
    }

    /// create a server-side decoration object for a given surface
    pub const REQ_CREATE_OPCODE: u16 = 0;

    /// the default mode used on the server
    pub const EVT_DEFAULT_MODE_OPCODE: u16 = 0;

    /// Requests of `org_kde_kwin_server_decoration_manager`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// create a server-side decoration object for a given surface
        Create {
            /// the new decoration object
            id: New<OrgKdeKwinServerDecoration>,
            /// the decorated `wl_surface`
            surface: ObjectId,
        },
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let mut args = Arguments::new(OrgKdeKwinServerDecorationManager::NAME, message, version);
            match args.opcode() {
                REQ_CREATE_OPCODE => Ok(Request::Create {
                    id: args.new_id()?,
                    surface: args.object()?,
                }),
                _ => Err(args.bad_opcode()),
            }
        }
    }

    /// Events of `org_kde_kwin_server_decoration_manager`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Event {
        /// the default mode used on the server
        DefaultMode {
            /// the default mode
            mode: Mode,
        },
    }

    impl EventMessage for Event {
        fn opcode(&self) -> u16 {
            match self {
                Event::DefaultMode { .. } => EVT_DEFAULT_MODE_OPCODE,
            }
        }

        fn into_args(self) -> ArgumentList {
            match self {
                Event::DefaultMode { mode } => smallvec![Argument::Uint(mode.into())],
            }
        }
    }
}

/// `org_kde_kwin_server_decoration`: decoration of one surface
pub mod org_kde_kwin_server_decoration {
    use smallvec::smallvec;

    use crate::wayland::{
        Argument, ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, RequestMessage,
        WEnum,
    };

    pub use super::DecorationMode as Mode;

    /// Marker type of `org_kde_kwin_server_decoration`
    #[derive(Debug)]
    pub struct OrgKdeKwinServerDecoration;

    impl Interface for OrgKdeKwinServerDecoration {
        const NAME: &'static str = "org_kde_kwin_server_decoration";
        const VERSION: u32 = 1;
        type Request = Request;
        type Event = Event;
    }

    /// release the server decoration object
    pub const REQ_RELEASE_OPCODE: u16 = 0;
    /// the decoration mode the client wants
    pub const REQ_REQUEST_MODE_OPCODE: u16 = 1;

    /// the new decoration mode applied by the server
    pub const EVT_MODE_OPCODE: u16 = 0;

    /// Requests of `org_kde_kwin_server_decoration`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// release the server decoration object
        Release,
        /// the decoration mode the client wants
        RequestMode {
            /// the requested mode
            mode: WEnum<Mode>,
        },
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let mut args = Arguments::new(OrgKdeKwinServerDecoration::NAME, message, version);
            match args.opcode() {
                REQ_RELEASE_OPCODE => Ok(Request::Release),
                REQ_REQUEST_MODE_OPCODE => Ok(Request::RequestMode { mode: args.wenum()? }),
                _ => Err(args.bad_opcode()),
            }
        }

        fn is_destructor(&self) -> bool {
            matches!(self, Request::Release)
        }
    }

    /// Events of `org_kde_kwin_server_decoration`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Event {
        /// the new decoration mode applied by the server
        Mode {
            /// the applied mode
            mode: Mode,
        },
    }

    impl EventMessage for Event {
        fn opcode(&self) -> u16 {
            match self {
                Event::Mode { .. } => EVT_MODE_OPCODE,
            }
        }

        fn into_args(self) -> ArgumentList {
            match self {
                Event::Mode { mode } => smallvec![Argument::Uint(mode.into())],
            }
        }
    }
}
