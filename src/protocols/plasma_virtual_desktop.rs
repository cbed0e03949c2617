//! Plasma virtual desktop protocol

/// `org_kde_plasma_virtual_desktop_management`: list and control virtual desktops
pub mod org_kde_plasma_virtual_desktop_management {
    use smallvec::smallvec;

    use crate::wayland::{
        Argument, ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, New,
        RequestMessage,
    };

    use super::org_kde_plasma_virtual_desktop::OrgKdePlasmaVirtualDesktop;

    /// Marker type of `org_kde_plasma_virtual_desktop_management`
    #[derive(Debug)]
    pub struct OrgKdePlasmaVirtualDesktopManagement;

    impl Interface for OrgKdePlasmaVirtualDesktopManagement {
        const NAME: &'static str = "org_kde_plasma_virtual_desktop_management";
        const VERSION: u32 = 2;
        type Request = Request;
        type Event = Event;
    }

    /// get a desktop object for a desktop id
    pub const REQ_GET_VIRTUAL_DESKTOP_OPCODE: u16 = 0;
    /// ask the server to create a new desktop
    pub const REQ_REQUEST_CREATE_VIRTUAL_DESKTOP_OPCODE: u16 = 1;
    /// ask the server to remove a desktop
    pub const REQ_REQUEST_REMOVE_VIRTUAL_DESKTOP_OPCODE: u16 = 2;

    /// a desktop has been created
    pub const EVT_DESKTOP_CREATED_OPCODE: u16 = 0;
    /// a desktop has been removed
    pub const EVT_DESKTOP_REMOVED_OPCODE: u16 = 1;
    /// all the initial state has been sent
    pub const EVT_DONE_OPCODE: u16 = 2;
    /// number of rows of the desktop grid
    pub const EVT_ROWS_OPCODE: u16 = 3;
    /// first version with `rows`
    pub const EVT_ROWS_SINCE: u32 = 2;

    /// Requests of `org_kde_plasma_virtual_desktop_management`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// get a desktop object for a desktop id
        GetVirtualDesktop {
            /// the new desktop object
            id: New<OrgKdePlasmaVirtualDesktop>,
            /// id of the desktop
            desktop_id: String,
        },
        /// ask the server to create a new desktop
        RequestCreateVirtualDesktop {
            /// name of the new desktop
            name: String,
            /// requested position in the list
            position: u32,
        },
        /// ask the server to remove a desktop
        RequestRemoveVirtualDesktop {
            /// id of the desktop
            desktop_id: String,
        },
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let mut args = Arguments::new(OrgKdePlasmaVirtualDesktopManagement::NAME, message, version);
            match args.opcode() {
                REQ_GET_VIRTUAL_DESKTOP_OPCODE => Ok(Request::GetVirtualDesktop {
                    id: args.new_id()?,
                    desktop_id: args.string()?,
                }),
                REQ_REQUEST_CREATE_VIRTUAL_DESKTOP_OPCODE => Ok(Request::RequestCreateVirtualDesktop {
                    name: args.string()?,
                    position: args.uint()?,
                }),
                REQ_REQUEST_REMOVE_VIRTUAL_DESKTOP_OPCODE => Ok(Request::RequestRemoveVirtualDesktop {
                    desktop_id: args.string()?,
                }),
                _ => Err(args.bad_opcode()),
            }
        }
    }

    /// Events of `org_kde_plasma_virtual_desktop_management`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Event {
        /// a desktop has been created
        DesktopCreated {
            /// id of the desktop
            desktop_id: String,
            /// position in the list
            position: u32,
        },
        /// a desktop has been removed
        DesktopRemoved {
            /// id of the desktop
            desktop_id: String,
        },
        /// all the initial state has been sent
        Done,
        /// number of rows of the desktop grid
        Rows {
            /// number of rows
            rows: u32,
        },
    }

    impl EventMessage for Event {
        fn opcode(&self) -> u16 {
            match self {
                Event::DesktopCreated { .. } => EVT_DESKTOP_CREATED_OPCODE,
                Event::DesktopRemoved { .. } => EVT_DESKTOP_REMOVED_OPCODE,
                Event::Done => EVT_DONE_OPCODE,
                Event::Rows { .. } => EVT_ROWS_OPCODE,
            }
        }

        fn since(&self) -> u32 {
            match self {
                Event::Rows { .. } => EVT_ROWS_SINCE,
                _ => 1,
            }
        }

        fn into_args(self) -> ArgumentList {
            match self {
                Event::DesktopCreated { desktop_id, position } => {
                    smallvec![Argument::Str(Some(desktop_id)), Argument::Uint(position)]
                }
                Event::DesktopRemoved { desktop_id } => smallvec![Argument::Str(Some(desktop_id))],
                Event::Done => smallvec![],
                Event::Rows { rows } => smallvec![Argument::Uint(rows)],
            }
        }
    }
}

/// `org_kde_plasma_virtual_desktop`: one virtual desktop
pub mod org_kde_plasma_virtual_desktop {
    use smallvec::smallvec;

    use crate::wayland::{
        Argument, ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, RequestMessage,
    };

    /// Marker type of `org_kde_plasma_virtual_desktop`
    #[derive(Debug)]
    pub struct OrgKdePlasmaVirtualDesktop;

    impl Interface for OrgKdePlasmaVirtualDesktop {
        const NAME: &'static str = "org_kde_plasma_virtual_desktop";
        const VERSION: u32 = 2;
        type Request = Request;
        type Event = Event;
    }

    /// ask the server to activate the desktop
    pub const REQ_REQUEST_ACTIVATE_OPCODE: u16 = 0;

    /// id of the desktop
    pub const EVT_DESKTOP_ID_OPCODE: u16 = 0;
    /// user-visible name of the desktop
    pub const EVT_NAME_OPCODE: u16 = 1;
    /// the desktop became the active one
    pub const EVT_ACTIVATED_OPCODE: u16 = 2;
    /// the desktop is no longer the active one
    pub const EVT_DEACTIVATED_OPCODE: u16 = 3;
    /// all the pending changes have been sent
    pub const EVT_DONE_OPCODE: u16 = 4;
    /// the desktop has been removed
    pub const EVT_REMOVED_OPCODE: u16 = 5;

    /// Requests of `org_kde_plasma_virtual_desktop`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// ask the server to activate the desktop
        RequestActivate,
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let args = Arguments::new(OrgKdePlasmaVirtualDesktop::NAME, message, version);
            match args.opcode() {
                REQ_REQUEST_ACTIVATE_OPCODE => Ok(Request::RequestActivate),
                _ => Err(args.bad_opcode()),
            }
        }
    }

    /// Events of `org_kde_plasma_virtual_desktop`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Event {
        /// id of the desktop
        DesktopId {
            /// the id
            desktop_id: String,
        },
        /// user-visible name of the desktop
        Name {
            /// the name
            name: String,
        },
        /// the desktop became the active one
        Activated,
        /// the desktop is no longer the active one
        Deactivated,
        /// all the pending changes have been sent
        Done,
        /// the desktop has been removed
        Removed,
    }

    impl EventMessage for Event {
        fn opcode(&self) -> u16 {
            match self {
                Event::DesktopId { .. } => EVT_DESKTOP_ID_OPCODE,
                Event::Name { .. } => EVT_NAME_OPCODE,
                Event::Activated => EVT_ACTIVATED_OPCODE,
                Event::Deactivated => EVT_DEACTIVATED_OPCODE,
                Event::Done => EVT_DONE_OPCODE,
                Event::Removed => EVT_REMOVED_OPCODE,
            }
        }

        fn into_args(self) -> ArgumentList {
            match self {
                Event::DesktopId { desktop_id } => smallvec![Argument::Str(Some(desktop_id))],
                Event::Name { name } => smallvec![Argument::Str(Some(name))],
                Event::Activated | Event::Deactivated | Event::Done | Event::Removed => smallvec![],
            }
        }
    }
}
