//! KDE remote access
//!
//! Hands the buffers of an output over to privileged clients, for screen sharing and remote
//! desktop. Each [`BufferHandle`] announced with [`RemoteAccessState::send_buffer_ready`]
//! is reference-counted across the clients it was announced to: it comes back to the
//! compositor through [`RemoteAccessHandler::buffer_released`] once every one of them
//! released it, fetched or not, or disconnected.
//!
//! Buffers are usually produced off the event loop. [`RemoteAccessState::buffer_channel`]
//! creates a [`calloop`] channel to hand them over:
//!
//! ```no_run
//! use plasma_wayland_server::delegate_remote_access;
//! use plasma_wayland_server::wayland::output::Output;
//! use plasma_wayland_server::wayland::remote_access::{BufferHandle, RemoteAccessHandler, RemoteAccessState};
//! use plasma_wayland_server::wayland::{Display, MemoryTransport};
//!
//! struct State {
//!     remote_access: RemoteAccessState,
//!     outputs: Vec<Output>,
//! }
//!
//! impl RemoteAccessHandler for State {
//!     fn remote_access_state(&mut self) -> &mut RemoteAccessState {
//!         &mut self.remote_access
//!     }
//!
//!     fn remote_access_output(&self, name: &str) -> Option<Output> {
//!         self.outputs.iter().find(|output| output.name() == name).cloned()
//!     }
//!
//!     fn buffer_released(&mut self, buffer: BufferHandle) {
//!         // the buffer can be reused for the next frame
//!     }
//! }
//!
//! delegate_remote_access!(State);
//!
//! let display = Display::<State>::new(MemoryTransport::new());
//! let mut event_loop = calloop::EventLoop::<State>::try_new().unwrap();
//!
//! let (sender, channel) = RemoteAccessState::buffer_channel();
//! event_loop
//!     .handle()
//!     .insert_source(channel, |event, _, state| {
//!         RemoteAccessState::handle_ready_buffer(state, event)
//!     })
//!     .unwrap();
//!
//! // `sender` goes to the thread producing the buffers
//! # drop(sender);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::os::unix::io::{AsFd, AsRawFd, OwnedFd};
use std::rc::Rc;

use calloop::channel::{self, Channel, Sender};
use drm_fourcc::DrmFourcc;
use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::protocols::remote_access::org_kde_kwin_remote_access_manager::{self, OrgKdeKwinRemoteAccessManager};
use crate::protocols::remote_access::org_kde_kwin_remote_buffer::{self, OrgKdeKwinRemoteBuffer};
use crate::utils::IsAlive;
use crate::wayland::output::Output;
use crate::wayland::{ClientId, DataInit, Dispatch, DisplayHandle, Global, GlobalDispatch, GlobalId, New, Resource};

const MANAGER_VERSION: u32 = 1;

/// A buffer shared with remote access clients
pub struct BufferHandle {
    fd: OwnedFd,
    width: u32,
    height: u32,
    stride: u32,
    format: DrmFourcc,
}

impl fmt::Debug for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferHandle")
            .field("fd", &self.fd.as_raw_fd())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("format", &self.format)
            .finish()
    }
}

impl BufferHandle {
    /// Wrap the file descriptor of a buffer
    pub fn new(fd: OwnedFd, width: u32, height: u32, stride: u32, format: DrmFourcc) -> BufferHandle {
        BufferHandle {
            fd,
            width,
            height,
            stride,
            format,
        }
    }

    /// Id of the buffer on the wire, the value of its file descriptor
    pub fn internal_id(&self) -> i32 {
        self.fd.as_raw_fd()
    }

    /// File descriptor of the buffer
    pub fn fd(&self) -> &OwnedFd {
        &self.fd
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Stride in bytes
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Pixel format
    pub fn format(&self) -> DrmFourcc {
        self.format
    }

    /// Take back the file descriptor
    pub fn into_fd(self) -> OwnedFd {
        self.fd
    }
}

/// A buffer produced off the loop, for [`RemoteAccessState::buffer_channel`]
#[derive(Debug)]
pub struct ReadyBuffer {
    /// Name of the output the buffer shows
    pub output_name: String,
    /// The buffer
    pub buffer: BufferHandle,
}

#[derive(Debug)]
struct SharedBuffer {
    id: i32,
    handle: RefCell<Option<BufferHandle>>,
    refcount: Cell<usize>,
}

/// User data of an `org_kde_kwin_remote_access_manager` resource
#[derive(Debug, Default)]
pub struct RemoteAccessManagerData {
    pending: RefCell<IndexMap<i32, Rc<SharedBuffer>>>,
}

impl RemoteAccessManagerData {
    /// Number of buffers announced to this client and not fetched yet
    pub fn pending_buffers(&self) -> usize {
        self.pending.borrow().len()
    }
}

/// User data of an `org_kde_kwin_remote_buffer` resource
#[derive(Debug)]
pub struct RemoteBufferData {
    buffer: Rc<SharedBuffer>,
}

impl RemoteBufferData {
    /// Id of the wrapped buffer
    pub fn internal_id(&self) -> i32 {
        self.buffer.id
    }
}

/// Handler for remote access
pub trait RemoteAccessHandler {
    /// [`RemoteAccessState`] getter
    fn remote_access_state(&mut self) -> &mut RemoteAccessState;

    /// Find an output by its name, for [`RemoteAccessState::handle_ready_buffer`]
    fn remote_access_output(&self, name: &str) -> Option<Output>;

    /// Every client the buffer was announced to released it
    fn buffer_released(&mut self, buffer: BufferHandle);
}

/// State of the remote access global
#[derive(Debug)]
pub struct RemoteAccessState {
    global: Global<OrgKdeKwinRemoteAccessManager>,
    live_buffers: usize,
}

impl RemoteAccessState {
    /// Create the `org_kde_kwin_remote_access_manager` global
    pub fn new<D>(display: &DisplayHandle) -> RemoteAccessState
    where
        D: GlobalDispatch<OrgKdeKwinRemoteAccessManager, ()>
            + Dispatch<OrgKdeKwinRemoteAccessManager, RemoteAccessManagerData>
            + Dispatch<OrgKdeKwinRemoteBuffer, RemoteBufferData>
            + RemoteAccessHandler
            + 'static,
    {
        let global = display.create_global::<D, OrgKdeKwinRemoteAccessManager, _>(MANAGER_VERSION, ());
        RemoteAccessState {
            global,
            live_buffers: 0,
        }
    }

    /// Id of the global
    pub fn global(&self) -> GlobalId {
        self.global.id()
    }

    /// Whether a client bound the manager
    pub fn is_bound(&self) -> bool {
        !self.global.resources().is_empty()
    }

    /// Number of announced buffers not released yet
    pub fn live_buffers(&self) -> usize {
        self.live_buffers
    }

    /// Announce a buffer of `output` to every client that bound both the manager and the output
    ///
    /// Each client gets `buffer_ready` with its own `wl_output`. When no client qualifies
    /// the buffer is released right away.
    pub fn send_buffer_ready<D: RemoteAccessHandler>(state: &mut D, output: &Output, buffer: BufferHandle) {
        let shared = Rc::new(SharedBuffer {
            id: buffer.internal_id(),
            handle: RefCell::new(Some(buffer)),
            refcount: Cell::new(0),
        });

        for manager in state.remote_access_state().global.resources().snapshot() {
            let Some(wl_output) = output.client_resources(manager.client_id()).into_iter().next() else {
                continue;
            };
            let Some(data) = manager.data::<RemoteAccessManagerData>() else {
                continue;
            };
            data.pending.borrow_mut().insert(shared.id, shared.clone());
            shared.refcount.set(shared.refcount.get() + 1);
            manager.send_event(org_kde_kwin_remote_access_manager::Event::BufferReady {
                id: shared.id,
                output: wl_output.id(),
            });
        }

        debug!(
            id = shared.id,
            output = output.name(),
            clients = shared.refcount.get(),
            "Remote buffer ready"
        );
        if shared.refcount.get() > 0 {
            state.remote_access_state().live_buffers += 1;
            return;
        }
        let buffer = shared.handle.borrow_mut().take();
        if let Some(buffer) = buffer {
            state.buffer_released(buffer);
        }
    }

    /// A channel for producer threads to hand buffers to the event loop
    pub fn buffer_channel() -> (Sender<ReadyBuffer>, Channel<ReadyBuffer>) {
        channel::channel()
    }

    /// Deliver a buffer received on the channel of [`RemoteAccessState::buffer_channel`]
    pub fn handle_ready_buffer<D: RemoteAccessHandler>(state: &mut D, event: channel::Event<ReadyBuffer>) {
        match event {
            channel::Event::Msg(ReadyBuffer { output_name, buffer }) => match state.remote_access_output(&output_name) {
                Some(output) => Self::send_buffer_ready(state, &output, buffer),
                None => {
                    warn!(output = %output_name, "Remote buffer for an unknown output");
                    state.buffer_released(buffer);
                }
            },
            channel::Event::Closed => trace!("Remote buffer channel closed"),
        }
    }
}

fn unref<D: RemoteAccessHandler>(state: &mut D, buffer: &SharedBuffer) {
    let count = buffer.refcount.get().saturating_sub(1);
    buffer.refcount.set(count);
    if count > 0 {
        return;
    }
    let handle = buffer.handle.borrow_mut().take();
    if let Some(handle) = handle {
        trace!(id = buffer.id, "Remote buffer released by every client");
        let remote_access = state.remote_access_state();
        remote_access.live_buffers = remote_access.live_buffers.saturating_sub(1);
        state.buffer_released(handle);
    }
}

impl<D> GlobalDispatch<OrgKdeKwinRemoteAccessManager, (), D> for RemoteAccessState
where
    D: GlobalDispatch<OrgKdeKwinRemoteAccessManager, ()>
        + Dispatch<OrgKdeKwinRemoteAccessManager, RemoteAccessManagerData>
        + RemoteAccessHandler
        + 'static,
{
    fn bind(
        _state: &mut D,
        _handle: &DisplayHandle,
        _client: ClientId,
        resource: New<OrgKdeKwinRemoteAccessManager>,
        _global_data: &(),
        data_init: &mut DataInit<'_, D>,
    ) {
        data_init.init(resource, RemoteAccessManagerData::default());
    }
}

impl<D> Dispatch<OrgKdeKwinRemoteAccessManager, RemoteAccessManagerData, D> for RemoteAccessState
where
    D: Dispatch<OrgKdeKwinRemoteAccessManager, RemoteAccessManagerData>
        + Dispatch<OrgKdeKwinRemoteBuffer, RemoteBufferData>
        + RemoteAccessHandler
        + 'static,
{
    fn request(
        state: &mut D,
        client: ClientId,
        manager: &Resource<OrgKdeKwinRemoteAccessManager>,
        request: org_kde_kwin_remote_access_manager::Request,
        data: &RemoteAccessManagerData,
        _dh: &DisplayHandle,
        data_init: &mut DataInit<'_, D>,
    ) {
        match request {
            org_kde_kwin_remote_access_manager::Request::GetBuffer {
                buffer,
                internal_buffer_id,
            } => {
                let Some(shared) = data.pending.borrow_mut().shift_remove(&internal_buffer_id) else {
                    warn!(?client, id = internal_buffer_id, "Unknown remote buffer requested");
                    manager.post_error(0u32, format!("unknown buffer {}", internal_buffer_id));
                    return;
                };

                let wrapper = data_init.init(buffer, RemoteBufferData { buffer: shared.clone() });
                if !wrapper.alive() {
                    // nothing will ever destroy the wrapper, drop its reference now
                    debug!(?client, id = internal_buffer_id, "Remote buffer wrapper refused");
                    unref(state, &shared);
                    return;
                }

                let details = {
                    let handle = shared.handle.borrow();
                    handle.as_ref().map(|handle| {
                        (
                            rustix::io::dup(handle.fd().as_fd()),
                            handle.width,
                            handle.height,
                            handle.stride,
                            handle.format as u32,
                        )
                    })
                };

                match details {
                    Some((Ok(fd), width, height, stride, format)) => {
                        wrapper.send_event(org_kde_kwin_remote_buffer::Event::GbmHandle {
                            fd,
                            width,
                            height,
                            stride,
                            format,
                        });
                    }
                    Some((Err(err), ..)) => warn!(?client, ?err, "Failed to duplicate remote buffer fd"),
                    None => warn!(?client, "Remote buffer fetched after its release"),
                }
            }
            org_kde_kwin_remote_access_manager::Request::Release => {}
        }
    }

    fn destroyed(
        state: &mut D,
        _client: ClientId,
        _resource: &Resource<OrgKdeKwinRemoteAccessManager>,
        data: &RemoteAccessManagerData,
    ) {
        let pending = std::mem::take(&mut *data.pending.borrow_mut());
        for buffer in pending.values() {
            unref(state, buffer);
        }
    }
}

impl<D> Dispatch<OrgKdeKwinRemoteBuffer, RemoteBufferData, D> for RemoteAccessState
where
    D: Dispatch<OrgKdeKwinRemoteBuffer, RemoteBufferData> + RemoteAccessHandler + 'static,
{
    fn request(
        _state: &mut D,
        _client: ClientId,
        _resource: &Resource<OrgKdeKwinRemoteBuffer>,
        request: org_kde_kwin_remote_buffer::Request,
        _data: &RemoteBufferData,
        _dh: &DisplayHandle,
        _data_init: &mut DataInit<'_, D>,
    ) {
        match request {
            org_kde_kwin_remote_buffer::Request::Release => {}
        }
    }

    fn destroyed(state: &mut D, _client: ClientId, _resource: &Resource<OrgKdeKwinRemoteBuffer>, data: &RemoteBufferData) {
        unref(state, &data.buffer);
    }
}

#[allow(missing_docs)]
#[macro_export]
macro_rules! delegate_remote_access {
    ($ty: ty) => {
        $crate::delegate_global_dispatch!($ty: [
            $crate::protocols::remote_access::org_kde_kwin_remote_access_manager::OrgKdeKwinRemoteAccessManager: ()
        ] => $crate::wayland::remote_access::RemoteAccessState);

        $crate::delegate_dispatch!($ty: [
            $crate::protocols::remote_access::org_kde_kwin_remote_access_manager::OrgKdeKwinRemoteAccessManager: $crate::wayland::remote_access::RemoteAccessManagerData,
            $crate::protocols::remote_access::org_kde_kwin_remote_buffer::OrgKdeKwinRemoteBuffer: $crate::wayland::remote_access::RemoteBufferData
        ] => $crate::wayland::remote_access::RemoteAccessState);
    };
}
