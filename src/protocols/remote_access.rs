//! KDE remote access protocol
//!
//! Hands the buffers of an output over to a privileged client, for screen sharing and
//! remote desktop.

/// `org_kde_kwin_remote_access_manager`: remote access manager
pub mod org_kde_kwin_remote_access_manager {
    use smallvec::smallvec;

    use crate::wayland::{
        Argument, ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, New, ObjectId,
        RequestMessage,
    };

    use super::org_kde_kwin_remote_buffer::OrgKdeKwinRemoteBuffer;

    /// Marker type of `org_kde_kwin_remote_access_manager`
    #[derive(Debug)]
    pub struct OrgKdeKwinRemoteAccessManager;

    impl Interface for OrgKdeKwinRemoteAccessManager {
        const NAME: &'static str = "org_kde_kwin_remote_access_manager";
        const VERSION: u32 = 1;
        type Request = Request;
        type Event = Event;
    }

    /// fetch a buffer announced with `buffer_ready`
    pub const REQ_GET_BUFFER_OPCODE: u16 = 0;
    /// release the manager
    pub const REQ_RELEASE_OPCODE: u16 = 1;

    /// a buffer of an output is ready
    pub const EVT_BUFFER_READY_OPCODE: u16 = 0;

    /// Requests of `org_kde_kwin_remote_access_manager`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// fetch a buffer announced with `buffer_ready`
        GetBuffer {
            /// the new buffer object
            buffer: New<OrgKdeKwinRemoteBuffer>,
            /// id announced in `buffer_ready`
            internal_buffer_id: i32,
        },
        /// release the manager
        Release,
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let mut args = Arguments::new(OrgKdeKwinRemoteAccessManager::NAME, message, version);
            match args.opcode() {
                REQ_GET_BUFFER_OPCODE => Ok(Request::GetBuffer {
                    buffer: args.new_id()?,
                    internal_buffer_id: args.int()?,
                }),
                REQ_RELEASE_OPCODE => Ok(Request::Release),
                _ => Err(args.bad_opcode()),
            }
        }

        fn is_destructor(&self) -> bool {
            matches!(self, Request::Release)
        }
    }

    /// Events of `org_kde_kwin_remote_access_manager`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Event {
        /// a buffer of an output is ready
        BufferReady {
            /// internal id of the buffer
            id: i32,
            /// the `wl_output` the buffer belongs to
            output: ObjectId,
        },
    }

    impl EventMessage for Event {
        fn opcode(&self) -> u16 {
            match self {
                Event::BufferReady { .. } => EVT_BUFFER_READY_OPCODE,
            }
        }

        fn into_args(self) -> ArgumentList {
            match self {
                Event::BufferReady { id, output } => smallvec![Argument::Int(id), Argument::Object(Some(output))],
            }
        }
    }
}

/// `org_kde_kwin_remote_buffer`: a buffer fetched by a remote access client
pub mod org_kde_kwin_remote_buffer {
    use std::os::unix::io::OwnedFd;

    use smallvec::smallvec;

    use crate::wayland::{
        Argument, ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, RequestMessage,
    };

    /// Marker type of `org_kde_kwin_remote_buffer`
    #[derive(Debug)]
    pub struct OrgKdeKwinRemoteBuffer;

    impl Interface for OrgKdeKwinRemoteBuffer {
        const NAME: &'static str = "org_kde_kwin_remote_buffer";
        const VERSION: u32 = 1;
        type Request = Request;
        type Event = Event;
    }

    /// release the buffer
    pub const REQ_RELEASE_OPCODE: u16 = 0;

    /// the handle of the buffer
    pub const EVT_GBM_HANDLE_OPCODE: u16 = 0;

    /// Requests of `org_kde_kwin_remote_buffer`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// release the buffer
        Release,
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let args = Arguments::new(OrgKdeKwinRemoteBuffer::NAME, message, version);
            match args.opcode() {
                REQ_RELEASE_OPCODE => Ok(Request::Release),
                _ => Err(args.bad_opcode()),
            }
        }

        fn is_destructor(&self) -> bool {
            matches!(self, Request::Release)
        }
    }

    /// Events of `org_kde_kwin_remote_buffer`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Event {
        /// the handle of the buffer
        GbmHandle {
            /// file descriptor of the buffer
            fd: OwnedFd,
            /// width in pixels
            width: u32,
            /// height in pixels
            height: u32,
            /// stride in bytes
            stride: u32,
            /// DRM fourcc pixel format
            format: u32,
        },
    }

    impl EventMessage for Event {
        fn opcode(&self) -> u16 {
            match self {
                Event::GbmHandle { .. } => EVT_GBM_HANDLE_OPCODE,
            }
        }

        fn into_args(self) -> ArgumentList {
            match self {
                Event::GbmHandle {
                    fd,
                    width,
                    height,
                    stride,
                    format,
                } => smallvec![
                    Argument::Fd(fd),
                    Argument::Uint(width),
                    Argument::Uint(height),
                    Argument::Uint(stride),
                    Argument::Uint(format),
                ],
            }
        }
    }
}
