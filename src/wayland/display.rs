//! The display: clients, globals and the object table
//!
//! A [`Display`] owns everything protocol-facing of one server instance. Several displays
//! can coexist in one process, nothing in this crate is global.
//!
//! The compositor drives it from its event loop:
//!
//! - [`Display::create_client`] when the transport accepted a connection,
//! - [`Display::bind`] and [`Display::dispatch_request`] for every decoded request,
//! - [`Display::disconnect`] when the connection went away,
//! - [`Display::flush_clients`] before going back to sleep.
//!
//! Extensions only ever see the cheaply clonable [`DisplayHandle`].

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::io;
use std::marker::PhantomData;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, error, trace, warn};

use super::client::{ClientConnection, ClientCredentials, ClientId};
use super::global::{
    global_bind, global_can_view, BindFn, CanViewFn, Global, GlobalDispatch, GlobalFilter, GlobalId,
    GlobalInfo, GlobalRecord,
};
use super::interface::Interface;
use super::message::{CoreError, DispatchError, Message};
use super::resource::{Dispatch, New, ObjectId, ObjectInner, ObjectVTable, Resource, ResourceSet};
use super::transport::Transport;
use crate::utils::{Serial, SerialCounter};

/// Protocol id of the display object of every client, errors are posted on it
const DISPLAY_OBJECT: u32 = 1;

/// Failure to bind a global
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// No global has this name
    #[error("no global named {0}")]
    UnknownGlobal(u32),
    /// The client asked for another interface than the one of the global
    #[error("global {name} is a {expected}, not a {requested}")]
    InterfaceMismatch {
        /// registry name of the global
        name: u32,
        /// interface of the global
        expected: &'static str,
        /// interface the client asked for
        requested: String,
    },
    /// Version 0 does not exist
    #[error("invalid version 0 requested for {0}")]
    InvalidVersion(&'static str),
    /// The global is hidden from this client
    #[error("global {0} is not visible to this client")]
    Hidden(u32),
    /// The client is gone or already got a protocol error
    #[error("client {0:?} is not accepting requests")]
    ClientGone(ClientId),
}

/// An operation was given a client or an object that does not exist (anymore)
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid client or object id")]
pub struct InvalidId;

struct GlobalEntry {
    info: GlobalInfo,
    record: Rc<dyn Any>,
    /// `BindFn<D>` of the state type the global was created for
    bind: Box<dyn Any>,
    can_view: CanViewFn,
}

struct ObjectEntry {
    inner: Rc<ObjectInner>,
    /// `ObjectVTable<D>` of the state type the object was created for
    vtable: Box<dyn Any>,
}

impl ObjectEntry {
    fn vtable<D: 'static>(&self) -> Option<ObjectVTable<D>> {
        self.vtable.downcast_ref::<ObjectVTable<D>>().copied()
    }
}

struct DisplayState {
    clients: IndexMap<ClientId, ClientConnection>,
    next_client_id: u64,
    globals: Vec<GlobalEntry>,
    objects: IndexMap<ObjectId, ObjectEntry>,
    pending_destroyed: Vec<ObjectEntry>,
}

pub(crate) struct DisplayInner {
    state: RefCell<DisplayState>,
    transport: RefCell<Box<dyn Transport>>,
    serial: SerialCounter,
    filter: RefCell<Option<Rc<dyn GlobalFilter>>>,
}

impl DisplayInner {
    fn client_active(&self, client: ClientId) -> bool {
        self.state
            .borrow()
            .clients
            .get(&client)
            .is_some_and(ClientConnection::is_active)
    }

    fn is_visible(&self, entry: &GlobalEntry, client: ClientId, credentials: &ClientCredentials) -> bool {
        if !(entry.can_view)(&entry.record, client, credentials) {
            return false;
        }
        match self.filter.borrow().as_ref() {
            Some(filter) => filter.can_view(client, credentials, &entry.info),
            None => true,
        }
    }

    pub(crate) fn send_event(&self, message: Message) {
        let client = message.sender_id.client_id();
        if !self.client_active(client) {
            trace!(object = %message.sender_id, opcode = message.opcode, "Dropping event for inactive client");
            return;
        }
        self.transport.borrow_mut().send_event(client, message);
    }

    pub(crate) fn post_error(&self, object: ObjectId, code: u32, message: String) {
        let client = object.client_id();
        {
            let mut state = self.state.borrow_mut();
            match state.clients.get_mut(&client) {
                Some(connection) if connection.is_active() => connection.failed = true,
                _ => return,
            }
        }
        warn!(client = ?client, object = %object, code, message = %message, "Posting protocol error");
        self.transport.borrow_mut().post_error(client, object, code, message);
    }

    /// Remove an object from the table and detach it
    ///
    /// With `expected` set, only that exact object is removed, so a stale handle can never
    /// take down an object that reused its id.
    fn take_object(&self, id: ObjectId, expected: Option<&Rc<ObjectInner>>) -> Option<ObjectEntry> {
        let (entry, notify) = {
            let mut state = self.state.borrow_mut();
            match state.objects.get(&id) {
                Some(entry) if expected.map_or(true, |inner| Rc::ptr_eq(&entry.inner, inner)) => {}
                _ => return None,
            }
            let entry = state.objects.shift_remove(&id)?;
            let notify = state.clients.get(&id.client_id()).is_some_and(|c| c.alive);
            (entry, notify)
        };
        entry.inner.detach();
        trace!(object = %id, interface = entry.inner.interface, "Object removed");
        if notify {
            self.transport.borrow_mut().object_destroyed(id);
        }
        Some(entry)
    }

    /// Detach every object and forget every client and global
    fn release_all(&self) {
        let mut entries = {
            let mut state = self.state.borrow_mut();
            let mut entries: Vec<ObjectEntry> = state.objects.drain(..).map(|(_, entry)| entry).collect();
            entries.append(&mut state.pending_destroyed);
            for connection in state.clients.values_mut() {
                connection.alive = false;
            }
            entries
        };
        for entry in entries.iter().rev() {
            entry.inner.detach();
        }
        entries.clear();

        let globals = {
            let mut state = self.state.borrow_mut();
            state.clients.clear();
            std::mem::take(&mut state.globals)
        };
        drop(globals);
    }
}

/// A handle to a [`Display`]
///
/// Extensions keep one to create globals, allocate server-side objects and resolve object
/// ids received in requests.
#[derive(Clone)]
pub struct DisplayHandle {
    pub(crate) inner: Rc<DisplayInner>,
}

impl fmt::Debug for DisplayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("DisplayHandle")
            .field("clients", &state.clients.len())
            .field("globals", &state.globals.len())
            .field("objects", &state.objects.len())
            .finish()
    }
}

impl PartialEq for DisplayHandle {
    fn eq(&self, other: &DisplayHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl DisplayHandle {
    pub(crate) fn from_inner(inner: Rc<DisplayInner>) -> DisplayHandle {
        DisplayHandle { inner }
    }

    /// Create a global and advertise it to every client allowed to see it
    ///
    /// The version is clamped to the highest version this crate implements for `I`.
    pub fn create_global<D, I, G>(&self, version: u32, data: G) -> Global<I>
    where
        D: GlobalDispatch<I, G> + 'static,
        I: Interface,
        G: 'static,
    {
        let version = if version > I::VERSION {
            warn!(
                interface = I::NAME,
                requested = version,
                max = I::VERSION,
                "Global version is higher than the supported one, clamping"
            );
            I::VERSION
        } else {
            version.max(1)
        };

        let resources = ResourceSet::new();
        let record: Rc<dyn Any> = Rc::new(GlobalRecord::<I, G>::new(data, resources.clone()));
        let bind: BindFn<D> = global_bind::<I, G, D>;

        let (info, targets) = {
            let mut state = self.inner.state.borrow_mut();
            let info = GlobalInfo {
                id: GlobalId::new(state.globals.len() as u32 + 1),
                interface: I::NAME,
                version,
            };
            let entry = GlobalEntry {
                info: info.clone(),
                record,
                bind: Box::new(bind),
                can_view: global_can_view::<I, G, D>,
            };
            let targets: Vec<ClientId> = state
                .clients
                .iter()
                .filter(|(id, connection)| {
                    connection.is_active() && self.inner.is_visible(&entry, **id, &connection.credentials)
                })
                .map(|(id, _)| *id)
                .collect();
            state.globals.push(entry);
            (info, targets)
        };

        debug!(name = info.id.name(), interface = I::NAME, version, "Global created");
        let mut transport = self.inner.transport.borrow_mut();
        for client in targets {
            transport.global_added(client, &info);
        }

        Global::new(info, resources)
    }

    pub(crate) fn init_object<I, U, D>(&self, new: New<I>, data: U) -> Resource<I>
    where
        I: Interface,
        U: 'static,
        D: Dispatch<I, U> + 'static,
    {
        let (id, version, set) = new.into_parts();
        let inner = Rc::new(ObjectInner::new(
            id,
            I::NAME,
            version,
            Rc::downgrade(&self.inner),
            data,
        ));
        let resource = Resource::<I>::from_inner(inner.clone());

        // `Err(true)` on an id collision, `Err(false)` for a client that stopped listening
        let outcome = {
            let mut state = self.inner.state.borrow_mut();
            match state.clients.get(&id.client_id()) {
                Some(connection) if connection.is_active() => {
                    if state.objects.contains_key(&id) {
                        Err(true)
                    } else {
                        state.objects.insert(
                            id,
                            ObjectEntry {
                                inner: inner.clone(),
                                vtable: Box::new(ObjectVTable::<D>::new::<I, U>()),
                            },
                        );
                        Ok(())
                    }
                }
                _ => Err(false),
            }
        };

        match outcome {
            Ok(()) => {
                trace!(object = %id, interface = I::NAME, version, "New object");
                if let Some(set) = set {
                    set.insert(&resource);
                }
            }
            Err(collision) => {
                inner.detach();
                if collision {
                    self.inner.post_error(
                        ObjectId::new(id.client_id(), DISPLAY_OBJECT),
                        CoreError::InvalidObject.into(),
                        format!("id {} is already in use", id.protocol_id()),
                    );
                } else {
                    trace!(object = %id, interface = I::NAME, "Object for inactive client is inert");
                }
            }
        }

        resource
    }

    /// Create an object on the server side, for `client`
    ///
    /// Running out of server ids posts `no_memory` to the client and discards the object.
    pub fn create_resource<I, U, D>(&self, client: ClientId, version: u32, data: U) -> Result<Resource<I>, InvalidId>
    where
        I: Interface,
        U: 'static,
        D: Dispatch<I, U> + 'static,
    {
        let allocated = {
            let mut state = self.inner.state.borrow_mut();
            match state.clients.get_mut(&client) {
                Some(connection) if connection.is_active() => Some(connection.allocate_server_id()),
                _ => None,
            }
        };
        match allocated {
            None => Err(InvalidId),
            Some(None) => {
                self.inner.post_error(
                    ObjectId::new(client, DISPLAY_OBJECT),
                    CoreError::NoMemory.into(),
                    format!("no server-side id left for {}", I::NAME),
                );
                Err(InvalidId)
            }
            Some(Some(protocol_id)) => {
                let new = New::new(ObjectId::new(client, protocol_id), version.clamp(1, I::VERSION));
                let resource = self.init_object::<I, U, D>(new, data);
                if resource.inner.alive() {
                    Ok(resource)
                } else {
                    Err(InvalidId)
                }
            }
        }
    }

    /// Destroy an object from the server side
    ///
    /// The object is detached right away, its `destroyed` handler runs at the end of the
    /// current dispatch.
    pub fn destroy_object<I: Interface>(&self, resource: &Resource<I>) {
        if let Some(entry) = self.inner.take_object(resource.id(), Some(&resource.inner)) {
            self.inner.state.borrow_mut().pending_destroyed.push(entry);
        }
    }

    /// Resolve an object id received in a request
    pub fn get_object<I: Interface>(&self, id: ObjectId) -> Result<Resource<I>, InvalidId> {
        let state = self.inner.state.borrow();
        match state.objects.get(&id) {
            Some(entry) if entry.inner.interface == I::NAME && entry.inner.alive() => {
                Ok(Resource::from_inner(entry.inner.clone()))
            }
            _ => Err(InvalidId),
        }
    }

    /// Interface of a live object
    pub fn object_interface(&self, id: ObjectId) -> Option<&'static str> {
        self.inner.state.borrow().objects.get(&id).map(|entry| entry.inner.interface)
    }

    /// Get the next serial of this display
    pub fn next_serial(&self) -> Serial {
        self.inner.serial.next_serial()
    }

    /// Credentials of a connected client
    pub fn client_credentials(&self, client: ClientId) -> Result<ClientCredentials, InvalidId> {
        self.inner
            .state
            .borrow()
            .clients
            .get(&client)
            .filter(|connection| connection.alive)
            .map(|connection| connection.credentials.clone())
            .ok_or(InvalidId)
    }

    /// Whether the client is connected and did not get a protocol error
    pub fn is_client_active(&self, client: ClientId) -> bool {
        self.inner.client_active(client)
    }

    /// Every connected client
    pub fn clients(&self) -> Vec<ClientId> {
        self.inner
            .state
            .borrow()
            .clients
            .iter()
            .filter(|(_, connection)| connection.alive)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Every global of the display, in creation order
    pub fn globals(&self) -> Vec<GlobalInfo> {
        self.inner
            .state
            .borrow()
            .globals
            .iter()
            .map(|entry| entry.info.clone())
            .collect()
    }

    /// Flush the queued events of one client
    pub fn flush(&self, client: ClientId) -> io::Result<()> {
        self.inner.transport.borrow_mut().flush(Some(client))
    }
}

/// A protocol server for compositor state `D`
pub struct Display<D: 'static> {
    handle: DisplayHandle,
    _state: PhantomData<fn(&mut D)>,
}

impl<D: 'static> fmt::Debug for Display<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Display").field("handle", &self.handle).finish()
    }
}

impl<D: 'static> Display<D> {
    /// Create a display sending its traffic through `transport`
    pub fn new<T: Transport + 'static>(transport: T) -> Display<D> {
        let inner = DisplayInner {
            state: RefCell::new(DisplayState {
                clients: IndexMap::new(),
                next_client_id: 0,
                globals: Vec::new(),
                objects: IndexMap::new(),
                pending_destroyed: Vec::new(),
            }),
            transport: RefCell::new(Box::new(transport)),
            serial: SerialCounter::new(),
            filter: RefCell::new(None),
        };
        Display {
            handle: DisplayHandle::from_inner(Rc::new(inner)),
            _state: PhantomData,
        }
    }

    /// Get a handle to this display
    pub fn handle(&self) -> DisplayHandle {
        self.handle.clone()
    }

    /// Install the filter deciding which clients see which globals
    ///
    /// Clients already connected keep the globals they were shown.
    pub fn set_global_filter(&mut self, filter: impl GlobalFilter + 'static) {
        *self.handle.inner.filter.borrow_mut() = Some(Rc::new(filter));
    }

    /// Register a new client connection and advertise the globals it may see
    pub fn create_client(&mut self, credentials: ClientCredentials) -> ClientId {
        let inner = &self.handle.inner;
        let (client, visible) = {
            let mut state = inner.state.borrow_mut();
            state.next_client_id += 1;
            let client = ClientId::from_raw(state.next_client_id);
            let visible: Vec<GlobalInfo> = state
                .globals
                .iter()
                .filter(|entry| inner.is_visible(entry, client, &credentials))
                .map(|entry| entry.info.clone())
                .collect();
            state.clients.insert(client, ClientConnection::new(credentials));
            (client, visible)
        };

        debug!(client = ?client, globals = visible.len(), "New client");
        let mut transport = inner.transport.borrow_mut();
        for info in &visible {
            transport.global_added(client, info);
        }
        client
    }

    /// Bind the global `name` for `client` as object `new_id`
    ///
    /// The negotiated version is the lowest of the requested one and the global's. Binding
    /// an unknown or hidden global, the wrong interface or version 0 posts a protocol error.
    pub fn bind(
        &mut self,
        state: &mut D,
        client: ClientId,
        name: u32,
        interface: &str,
        version: u32,
        new_id: u32,
    ) -> Result<ObjectId, BindError> {
        let inner = self.handle.inner.clone();
        let lookup = {
            let display_state = inner.state.borrow();
            match display_state.clients.get(&client) {
                Some(connection) if connection.is_active() => {
                    match display_state.globals.iter().find(|entry| entry.info.id.name() == name) {
                        None => Err(BindError::UnknownGlobal(name)),
                        Some(entry) if !inner.is_visible(entry, client, &connection.credentials) => {
                            Err(BindError::Hidden(name))
                        }
                        Some(entry) if entry.info.interface != interface => Err(BindError::InterfaceMismatch {
                            name,
                            expected: entry.info.interface,
                            requested: interface.to_owned(),
                        }),
                        Some(entry) if version == 0 => Err(BindError::InvalidVersion(entry.info.interface)),
                        Some(entry) => match entry.bind.downcast_ref::<BindFn<D>>() {
                            Some(bind) => Ok((entry.info.clone(), entry.record.clone(), *bind)),
                            None => {
                                error!(
                                    interface = entry.info.interface,
                                    "Global was created for another state type"
                                );
                                Err(BindError::UnknownGlobal(name))
                            }
                        },
                    }
                }
                _ => Err(BindError::ClientGone(client)),
            }
        };

        let (info, record, bind) = match lookup {
            Ok(found) => found,
            Err(BindError::ClientGone(client)) => return Err(BindError::ClientGone(client)),
            Err(err) => {
                let code = match err {
                    BindError::InterfaceMismatch { .. } | BindError::InvalidVersion(_) => CoreError::InvalidMethod,
                    _ => CoreError::InvalidObject,
                };
                inner.post_error(ObjectId::new(client, DISPLAY_OBJECT), code.into(), err.to_string());
                return Err(err);
            }
        };

        let id = ObjectId::new(client, new_id);
        let version = version.min(info.version);
        debug!(client = ?client, interface = info.interface, version, "Binding global");
        bind(state, &self.handle, &record, id, version);
        self.dispatch_pending(state);
        Ok(id)
    }

    /// Dispatch one request
    ///
    /// Requests from clients that disconnected or got a protocol error are dropped. Unknown
    /// objects and malformed requests post a protocol error.
    #[profiling::function]
    pub fn dispatch_request(&mut self, state: &mut D, message: Message) -> Result<(), DispatchError> {
        let inner = self.handle.inner.clone();
        let id = message.sender_id;
        let client = id.client_id();

        let lookup = {
            let display_state = inner.state.borrow();
            if !display_state
                .clients
                .get(&client)
                .is_some_and(ClientConnection::is_active)
            {
                trace!(object = %id, opcode = message.opcode, "Dropping request of inactive client");
                return Err(DispatchError::ClientGone(client));
            }
            display_state
                .objects
                .get(&id)
                .map(|entry| (entry.inner.clone(), entry.vtable::<D>()))
        };

        let (object, vtable) = match lookup {
            Some((object, Some(vtable))) => (object, vtable),
            Some((object, None)) => {
                error!(object = %id, interface = object.interface, "Object was created for another state type");
                inner.post_error(
                    ObjectId::new(client, DISPLAY_OBJECT),
                    CoreError::Implementation.into(),
                    format!("object {} cannot be dispatched", id.protocol_id()),
                );
                return Err(DispatchError::InvalidObject(id));
            }
            None => {
                inner.post_error(
                    ObjectId::new(client, DISPLAY_OBJECT),
                    CoreError::InvalidObject.into(),
                    format!("invalid object {}", id.protocol_id()),
                );
                return Err(DispatchError::InvalidObject(id));
            }
        };

        match (vtable.request)(state, &self.handle, &object, message) {
            Ok(true) => {
                if let Some(entry) = inner.take_object(id, Some(&object)) {
                    destroyed::<D>(state, entry);
                }
            }
            Ok(false) => {}
            Err(err) => {
                inner.post_error(id, err.code().into(), err.to_string());
                self.dispatch_pending(state);
                return Err(err);
            }
        }

        self.dispatch_pending(state);
        Ok(())
    }

    /// Run the `destroyed` handlers of objects destroyed from the server side
    pub fn dispatch_pending(&mut self, state: &mut D) {
        loop {
            let pending = std::mem::take(&mut self.handle.inner.state.borrow_mut().pending_destroyed);
            if pending.is_empty() {
                break;
            }
            for entry in pending {
                destroyed::<D>(state, entry);
            }
        }
    }

    /// A client went away
    ///
    /// Its objects are destroyed one by one, latest first, exactly as if the client had
    /// destroyed them itself. Events sent while this happens are dropped.
    pub fn disconnect(&mut self, state: &mut D, client: ClientId) {
        let inner = self.handle.inner.clone();
        let ids: Vec<ObjectId> = {
            let mut display_state = inner.state.borrow_mut();
            match display_state.clients.get_mut(&client) {
                Some(connection) if connection.alive => connection.alive = false,
                _ => return,
            }
            display_state
                .objects
                .keys()
                .filter(|id| id.client_id() == client)
                .copied()
                .collect()
        };

        debug!(client = ?client, objects = ids.len(), "Client disconnected");
        for id in ids.into_iter().rev() {
            if let Some(entry) = inner.take_object(id, None) {
                destroyed::<D>(state, entry);
            }
        }
        self.dispatch_pending(state);
        inner.state.borrow_mut().clients.shift_remove(&client);
    }

    /// Disconnect every client
    pub fn shutdown(&mut self, state: &mut D) {
        for client in self.handle.clients() {
            self.disconnect(state, client);
        }
    }

    /// Flush the queued events of every client
    pub fn flush_clients(&mut self) -> io::Result<()> {
        self.handle.inner.transport.borrow_mut().flush(None)
    }
}

impl<D: 'static> Drop for Display<D> {
    fn drop(&mut self) {
        self.handle.inner.release_all();
    }
}

fn destroyed<D: 'static>(state: &mut D, entry: ObjectEntry) {
    match entry.vtable::<D>() {
        Some(vtable) => (vtable.destroyed)(state, &entry.inner),
        None => error!(
            object = %entry.inner.id,
            interface = entry.inner.interface,
            "Object was created for another state type"
        ),
    }
}
