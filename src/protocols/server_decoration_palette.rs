//! KDE server decoration palette protocol
//!
//! Lets a client pick the color scheme the server-side decoration of a surface is drawn
//! with.

/// `org_kde_kwin_server_decoration_palette_manager`: palette manager
pub mod org_kde_kwin_server_decoration_palette_manager {
    use crate::wayland::{
        ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, New, ObjectId,
        RequestMessage,
    };

    use super::org_kde_kwin_server_decoration_palette::OrgKdeKwinServerDecorationPalette;

    /// Marker type of `org_kde_kwin_server_decoration_palette_manager`
    #[derive(Debug)]
    pub struct OrgKdeKwinServerDecorationPaletteManager;

    impl Interface for OrgKdeKwinServerDecorationPaletteManager {
        const NAME: &'static str = "org_kde_kwin_server_decoration_palette_manager";
        const VERSION: u32 = 1;
        type Request = Request;
        type Event = Event;
    }

    /// create a palette object for a surface
    pub const REQ_CREATE_OPCODE: u16 = 0;

    /// Requests of `org_kde_kwin_server_decoration_palette_manager`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// create a palette object for a surface
        Create {
            /// the new palette object
            id: New<OrgKdeKwinServerDecorationPalette>,
            /// the decorated `wl_surface`
            surface: ObjectId,
        },
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let mut args = Arguments::new(OrgKdeKwinServerDecorationPaletteManager::NAME, message, version);
            match args.opcode() {
                REQ_CREATE_OPCODE => Ok(Request::Create {
                    id: args.new_id()?,
                    surface: args.object()?,
                }),
                _ => Err(args.bad_opcode()),
            }
        }
    }

    /// `org_kde_kwin_server_decoration_palette_manager` has no events
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

/// `org_kde_kwin_server_decoration_palette`: palette of one surface
pub mod org_kde_kwin_server_decoration_palette {
    use crate::wayland::{
        ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, RequestMessage,
    };

    /// Marker type of `org_kde_kwin_server_decoration_palette`
    #[derive(Debug)]
    pub struct OrgKdeKwinServerDecorationPalette;

    impl Interface for OrgKdeKwinServerDecorationPalette {
        const NAME: &'static str = "org_kde_kwin_server_decoration_palette";
        const VERSION: u32 = 1;
        type Request = Request;
        type Event = Event;
    }

    /// set the palette of the decoration
    pub const REQ_SET_PALETTE_OPCODE: u16 = 0;
    /// release the palette object
    pub const REQ_RELEASE_OPCODE: u16 = 1;

    /// Requests of `org_kde_kwin_server_decoration_palette`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// set the palette of the decoration
        SetPalette {
            /// name of a color scheme, or an absolute path to one
            palette: String,
        },
        /// release the palette object
        Release,
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let mut args = Arguments::new(OrgKdeKwinServerDecorationPalette::NAME, message, version);
            match args.opcode() {
                REQ_SET_PALETTE_OPCODE => Ok(Request::SetPalette {
                    palette: args.string()?,
                }),
                REQ_RELEASE_OPCODE => Ok(Request::Release),
                _ => Err(args.bad_opcode()),
            }
        }

        fn is_destructor(&self) -> bool {
            matches!(self, Request::Release)
        }
    }

    /// `org_kde_kwin_server_decoration_palette` has no events
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
