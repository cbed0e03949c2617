//! Plasma window management protocol
//!
//! Lets privileged clients such as task managers and pagers list the windows of the
//! compositor, track their metadata and ask for state changes.

/// `org_kde_plasma_window_management`: application windows management
pub mod org_kde_plasma_window_management {
    use smallvec::smallvec;

    use crate::protocols::protocol_enum;
    use crate::wayland::{
        Argument, ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, New,
        RequestMessage, WEnum,
    };

    use super::org_kde_plasma_window::OrgKdePlasmaWindow;

    /// Marker type of `org_kde_plasma_window_management`
    #[derive(Debug)]
    pub struct OrgKdePlasmaWindowManagement;

    impl Interface for OrgKdePlasmaWindowManagement {
        const NAME: &'static str = "org_kde_plasma_window_management";
        const VERSION: u32 = 11;
        type Request = Request;
        type Event = Event;
    }

    /// set show desktop
    pub const REQ_SHOW_DESKTOP_OPCODE: u16 = 0;
    /// get a window object for an internal window id
    pub const REQ_GET_WINDOW_OPCODE: u16 = 1;

    /// notify the client when the show desktop mode is entered or left
    pub const EVT_SHOW_DESKTOP_CHANGED_OPCODE: u16 = 0;
    /// notify the client that a window got created
    pub const EVT_WINDOW_OPCODE: u16 = 1;
    /// notify the client when the stacking order changed
    pub const EVT_STACKING_ORDER_CHANGED_OPCODE: u16 = 2;
    /// first version with `stacking_order_changed`
    pub const EVT_STACKING_ORDER_CHANGED_SINCE: u32 = 11;

    protocol_enum! {
        /// show desktop state
        pub enum ShowDesktop {
            /// show desktop mode is left
            Disabled = 0,
            /// show desktop mode is entered
            Enabled = 1,
        }
    }

    /// Requests of `org_kde_plasma_window_management`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// set show desktop
        ShowDesktop {
            /// requested state
            state: WEnum<ShowDesktop>,
        },
        /// get a window object for an internal window id
        GetWindow {
            /// the new window object
            id: New<OrgKdePlasmaWindow>,
            /// internal id of the window
            internal_window_id: u32,
        },
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let mut args = Arguments::new(OrgKdePlasmaWindowManagement::NAME, message, version);
            match args.opcode() {
                REQ_SHOW_DESKTOP_OPCODE => Ok(Request::ShowDesktop { state: args.wenum()? }),
                REQ_GET_WINDOW_OPCODE => Ok(Request::GetWindow {
                    id: args.new_id()?,
                    internal_window_id: args.uint()?,
                }),
                _ => Err(args.bad_opcode()),
            }
        }
    }

    /// Events of `org_kde_plasma_window_management`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Event {
        /// notify the client when the show desktop mode is entered or left
        ShowDesktopChanged {
            /// new show desktop state
            state: ShowDesktop,
        },
        /// notify the client that a window got created
        Window {
            /// internal id of the window
            id: u32,
        },
        /// notify the client when the stacking order changed
        StackingOrderChanged {
            /// internal window ids, bottom to top
            ids: Vec<u32>,
        },
    }

    impl EventMessage for Event {
        fn opcode(&self) -> u16 {
            match self {
                Event::ShowDesktopChanged { .. } => EVT_SHOW_DESKTOP_CHANGED_OPCODE,
                Event::Window { .. } => EVT_WINDOW_OPCODE,
                Event::StackingOrderChanged { .. } => EVT_STACKING_ORDER_CHANGED_OPCODE,
            }
        }

        fn since(&self) -> u32 {
            match self {
                Event::StackingOrderChanged { .. } => EVT_STACKING_ORDER_CHANGED_SINCE,
                _ => 1,
            }
        }

        fn into_args(self) -> ArgumentList {
            match self {
                Event::ShowDesktopChanged { state } => smallvec![Argument::Uint(state.into())],
                Event::Window { id } => smallvec![Argument::Uint(id)],
                Event::StackingOrderChanged { ids } => {
                    let bytes = ids.iter().flat_map(|id| id.to_ne_bytes()).collect();
                    smallvec![Argument::Array(bytes)]
                }
            }
        }
    }
}

/// `org_kde_plasma_window`: interface to control application windows
pub mod org_kde_plasma_window {
    use std::os::unix::io::OwnedFd;

    use smallvec::smallvec;

    use crate::wayland::{
        Argument, ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, ObjectId,
        RequestMessage,
    };

    /// Marker type of `org_kde_plasma_window`
    #[derive(Debug)]
    pub struct OrgKdePlasmaWindow;

    impl Interface for OrgKdePlasmaWindow {
        const NAME: &'static str = "org_kde_plasma_window";
        const VERSION: u32 = 11;
        type Request = Request;
        type Event = Event;
    }

    /// set the state of the window
    pub const REQ_SET_STATE_OPCODE: u16 = 0;
    /// map the window to a different virtual desktop
    pub const REQ_SET_VIRTUAL_DESKTOP_OPCODE: u16 = 1;
    /// set the geometry of the taskbar entry of the window
    pub const REQ_SET_MINIMIZED_GEOMETRY_OPCODE: u16 = 2;
    /// unset the geometry of the taskbar entry of the window
    pub const REQ_UNSET_MINIMIZED_GEOMETRY_OPCODE: u16 = 3;
    /// close the window
    pub const REQ_CLOSE_OPCODE: u16 = 4;
    /// request an interactive move
    pub const REQ_REQUEST_MOVE_OPCODE: u16 = 5;
    /// request an interactive resize
    pub const REQ_REQUEST_RESIZE_OPCODE: u16 = 6;
    /// remove the resource
    pub const REQ_DESTROY_OPCODE: u16 = 7;
    /// request the icon of the window
    pub const REQ_GET_ICON_OPCODE: u16 = 8;
    /// first version with `get_icon`
    pub const REQ_GET_ICON_SINCE: u32 = 7;
    /// enter a virtual desktop
    pub const REQ_REQUEST_ENTER_VIRTUAL_DESKTOP_OPCODE: u16 = 9;
    /// enter a new virtual desktop
    pub const REQ_REQUEST_ENTER_NEW_VIRTUAL_DESKTOP_OPCODE: u16 = 10;
    /// leave a virtual desktop
    pub const REQ_REQUEST_LEAVE_VIRTUAL_DESKTOP_OPCODE: u16 = 11;
    /// first version with the virtual desktop requests
    pub const REQ_VIRTUAL_DESKTOP_REQUESTS_SINCE: u32 = 8;

    /// window title has been changed
    pub const EVT_TITLE_CHANGED_OPCODE: u16 = 0;
    /// application id has been changed
    pub const EVT_APP_ID_CHANGED_OPCODE: u16 = 1;
    /// the window state has been changed
    pub const EVT_STATE_CHANGED_OPCODE: u16 = 2;
    /// the legacy virtual desktop number changed
    pub const EVT_VIRTUAL_DESKTOP_CHANGED_OPCODE: u16 = 3;
    /// the window's themed icon name changed
    pub const EVT_THEMED_ICON_NAME_CHANGED_OPCODE: u16 = 4;
    /// the window got unmapped
    pub const EVT_UNMAPPED_OPCODE: u16 = 5;
    /// all the initial state was sent
    pub const EVT_INITIAL_STATE_OPCODE: u16 = 6;
    /// first version with `initial_state`
    pub const EVT_INITIAL_STATE_SINCE: u32 = 4;
    /// the parent window changed
    pub const EVT_PARENT_WINDOW_OPCODE: u16 = 7;
    /// first version with `parent_window`
    pub const EVT_PARENT_WINDOW_SINCE: u32 = 5;
    /// the window geometry changed
    pub const EVT_GEOMETRY_OPCODE: u16 = 8;
    /// first version with `geometry`
    pub const EVT_GEOMETRY_SINCE: u32 = 6;
    /// the pixel icon of the window changed
    pub const EVT_ICON_CHANGED_OPCODE: u16 = 9;
    /// first version with `icon_changed`
    pub const EVT_ICON_CHANGED_SINCE: u32 = 7;
    /// the process id of the window changed
    pub const EVT_PID_CHANGED_OPCODE: u16 = 10;
    /// the window entered a virtual desktop
    pub const EVT_VIRTUAL_DESKTOP_ENTERED_OPCODE: u16 = 11;
    /// the window left a virtual desktop
    pub const EVT_VIRTUAL_DESKTOP_LEFT_OPCODE: u16 = 12;
    /// first version with `pid_changed` and the virtual desktop events
    pub const EVT_PID_CHANGED_SINCE: u32 = 8;
    /// the application menu of the window changed
    pub const EVT_APPLICATION_MENU_OPCODE: u16 = 13;
    /// first version with `application_menu`
    pub const EVT_APPLICATION_MENU_SINCE: u32 = 10;

    bitflags::bitflags! {
        /// window state flags
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct State: u32 {
            /// the window is active
            const ACTIVE = 1 << 0;
            /// the window is minimized
            const MINIMIZED = 1 << 1;
            /// the window is maximized
            const MAXIMIZED = 1 << 2;
            /// the window is fullscreen
            const FULLSCREEN = 1 << 3;
            /// the window is kept above other windows
            const KEEP_ABOVE = 1 << 4;
            /// the window is kept below other windows
            const KEEP_BELOW = 1 << 5;
            /// the window is on all desktops
            const ON_ALL_DESKTOPS = 1 << 6;
            /// the window demands attention
            const DEMANDS_ATTENTION = 1 << 7;
            /// the window can be closed
            const CLOSEABLE = 1 << 8;
            /// the window can be minimized
            const MINIMIZABLE = 1 << 9;
            /// the window can be maximized
            const MAXIMIZABLE = 1 << 10;
            /// the window can be made fullscreen
            const FULLSCREENABLE = 1 << 11;
            /// the window should not be shown in a taskbar
            const SKIPTASKBAR = 1 << 12;
            /// the window can be shaded
            const SHADEABLE = 1 << 13;
            /// the window is shaded
            const SHADED = 1 << 14;
            /// the window can be moved
            const MOVABLE = 1 << 15;
            /// the window can be resized
            const RESIZABLE = 1 << 16;
            /// the virtual desktop of the window can be changed
            const VIRTUAL_DESKTOP_CHANGEABLE = 1 << 17;
            /// the window should not be shown in a window switcher
            const SKIPSWITCHER = 1 << 18;
        }
    }

    /// Requests of `org_kde_plasma_window`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// set the state of the window
        SetState {
            /// flags to change
            flags: u32,
            /// new values of the changed flags
            state: u32,
        },
        /// map the window to a different virtual desktop
        SetVirtualDesktop {
            /// legacy virtual desktop number
            number: u32,
        },
        /// set the geometry of the taskbar entry of the window
        SetMinimizedGeometry {
            /// `wl_surface` of the panel
            panel: ObjectId,
            /// x, relative to the panel
            x: u32,
            /// y, relative to the panel
            y: u32,
            /// width
            width: u32,
            /// height
            height: u32,
        },
        /// unset the geometry of the taskbar entry of the window
        UnsetMinimizedGeometry {
            /// `wl_surface` of the panel
            panel: ObjectId,
        },
        /// close the window
        Close,
        /// request an interactive move
        RequestMove,
        /// request an interactive resize
        RequestResize,
        /// remove the resource
        Destroy,
        /// request the icon of the window
        GetIcon {
            /// file descriptor the icon gets written to
            fd: OwnedFd,
        },
        /// enter a virtual desktop
        RequestEnterVirtualDesktop {
            /// id of the desktop
            id: String,
        },
        /// enter a new virtual desktop
        RequestEnterNewVirtualDesktop,
        /// leave a virtual desktop
        RequestLeaveVirtualDesktop {
            /// id of the desktop
            id: String,
        },
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let mut args = Arguments::new(OrgKdePlasmaWindow::NAME, message, version);
            match args.opcode() {
                REQ_SET_STATE_OPCODE => Ok(Request::SetState {
                    flags: args.uint()?,
                    state: args.uint()?,
                }),
                REQ_SET_VIRTUAL_DESKTOP_OPCODE => Ok(Request::SetVirtualDesktop { number: args.uint()? }),
                REQ_SET_MINIMIZED_GEOMETRY_OPCODE => Ok(Request::SetMinimizedGeometry {
                    panel: args.object()?,
                    x: args.uint()?,
                    y: args.uint()?,
                    width: args.uint()?,
                    height: args.uint()?,
                }),
                REQ_UNSET_MINIMIZED_GEOMETRY_OPCODE => {
                    Ok(Request::UnsetMinimizedGeometry { panel: args.object()? })
                }
                REQ_CLOSE_OPCODE => Ok(Request::Close),
                REQ_REQUEST_MOVE_OPCODE => Ok(Request::RequestMove),
                REQ_REQUEST_RESIZE_OPCODE => Ok(Request::RequestResize),
                REQ_DESTROY_OPCODE => Ok(Request::Destroy),
                REQ_GET_ICON_OPCODE => {
                    args.since(REQ_GET_ICON_SINCE)?;
                    Ok(Request::GetIcon { fd: args.fd()? })
                }
                REQ_REQUEST_ENTER_VIRTUAL_DESKTOP_OPCODE => {
                    args.since(REQ_VIRTUAL_DESKTOP_REQUESTS_SINCE)?;
                    Ok(Request::RequestEnterVirtualDesktop { id: args.string()? })
                }
                REQ_REQUEST_ENTER_NEW_VIRTUAL_DESKTOP_OPCODE => {
                    args.since(REQ_VIRTUAL_DESKTOP_REQUESTS_SINCE)?;
                    Ok(Request::RequestEnterNewVirtualDesktop)
                }
                REQ_REQUEST_LEAVE_VIRTUAL_DESKTOP_OPCODE => {
                    args.since(REQ_VIRTUAL_DESKTOP_REQUESTS_SINCE)?;
                    Ok(Request::RequestLeaveVirtualDesktop { id: args.string()? })
                }
                _ => Err(args.bad_opcode()),
            }
        }

        fn is_destructor(&self) -> bool {
            matches!(self, Request::Destroy)
        }
    }

    /// Events of `org_kde_plasma_window`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Event {
        /// window title has been changed
        TitleChanged {
            /// new title
            title: String,
        },
        /// application id has been changed
        AppIdChanged {
            /// new application id
            app_id: String,
        },
        /// the window state has been changed
        StateChanged {
            /// new window state
            flags: State,
        },
        /// the legacy virtual desktop number changed
        VirtualDesktopChanged {
            /// new virtual desktop number
            number: i32,
        },
        /// the window's themed icon name changed
        ThemedIconNameChanged {
            /// new themed icon name
            name: String,
        },
        /// the window got unmapped
        Unmapped,
        /// all the initial state was sent
        InitialState,
        /// the parent window changed
        ParentWindow {
            /// parent window of the same client, or none
            parent: Option<ObjectId>,
        },
        /// the window geometry changed
        Geometry {
            /// x in global coordinates
            x: i32,
            /// y in global coordinates
            y: i32,
            /// width
            width: u32,
            /// height
            height: u32,
        },
        /// the pixel icon of the window changed
        IconChanged,
        /// the process id of the window changed
        PidChanged {
            /// new process id
            pid: u32,
        },
        /// the window entered a virtual desktop
        VirtualDesktopEntered {
            /// id of the desktop
            id: String,
        },
        /// the window left a virtual desktop
        VirtualDesktopLeft {
            /// id of the desktop
            id: String,
        },
        /// the application menu of the window changed
        ApplicationMenu {
            /// D-Bus service name of the menu
            service_name: String,
            /// D-Bus object path of the menu
            object_path: String,
        },
    }

    impl EventMessage for Event {
        fn opcode(&self) -> u16 {
            match self {
                Event::TitleChanged { .. } => EVT_TITLE_CHANGED_OPCODE,
                Event::AppIdChanged { .. } => EVT_APP_ID_CHANGED_OPCODE,
                Event::StateChanged { .. } => EVT_STATE_CHANGED_OPCODE,
                Event::VirtualDesktopChanged { .. } => EVT_VIRTUAL_DESKTOP_CHANGED_OPCODE,
                Event::ThemedIconNameChanged { .. } => EVT_THEMED_ICON_NAME_CHANGED_OPCODE,
                Event::Unmapped => EVT_UNMAPPED_OPCODE,
                Event::InitialState => EVT_INITIAL_STATE_OPCODE,
                Event::ParentWindow { .. } => EVT_PARENT_WINDOW_OPCODE,
                Event::Geometry { .. } => EVT_GEOMETRY_OPCODE,
                Event::IconChanged => EVT_ICON_CHANGED_OPCODE,
                Event::PidChanged { .. } => EVT_PID_CHANGED_OPCODE,
                Event::VirtualDesktopEntered { .. } => EVT_VIRTUAL_DESKTOP_ENTERED_OPCODE,
                Event::VirtualDesktopLeft { .. } => EVT_VIRTUAL_DESKTOP_LEFT_OPCODE,
                Event::ApplicationMenu { .. } => EVT_APPLICATION_MENU_OPCODE,
            }
        }

        fn since(&self) -> u32 {
            match self {
                Event::InitialState => EVT_INITIAL_STATE_SINCE,
                Event::ParentWindow { .. } => EVT_PARENT_WINDOW_SINCE,
                Event::Geometry { .. } => EVT_GEOMETRY_SINCE,
                Event::IconChanged => EVT_ICON_CHANGED_SINCE,
                Event::PidChanged { .. } | Event::VirtualDesktopEntered { .. } | Event::VirtualDesktopLeft { .. } => {
                    EVT_PID_CHANGED_SINCE
                }
                Event::ApplicationMenu { .. } => EVT_APPLICATION_MENU_SINCE,
                _ => 1,
            }
        }

        fn into_args(self) -> ArgumentList {
            match self {
                Event::TitleChanged { title } => smallvec![Argument::Str(Some(title))],
                Event::AppIdChanged { app_id } => smallvec![Argument::Str(Some(app_id))],
                Event::StateChanged { flags } => smallvec![Argument::Uint(flags.bits())],
                Event::VirtualDesktopChanged { number } => smallvec![Argument::Int(number)],
                Event::ThemedIconNameChanged { name } => smallvec![Argument::Str(Some(name))],
                Event::Unmapped | Event::InitialState | Event::IconChanged => smallvec![],
                Event::ParentWindow { parent } => smallvec![Argument::Object(parent)],
                Event::Geometry { x, y, width, height } => smallvec![
                    Argument::Int(x),
                    Argument::Int(y),
                    Argument::Uint(width),
                    Argument::Uint(height),
                ],
                Event::PidChanged { pid } => smallvec![Argument::Uint(pid)],
                Event::VirtualDesktopEntered { id } | Event::VirtualDesktopLeft { id } => {
                    smallvec![Argument::Str(Some(id))]
                }
                Event::ApplicationMenu {
                    service_name,
                    object_path,
                } => smallvec![Argument::Str(Some(service_name)), Argument::Str(Some(object_path))],
            }
        }
    }
}
