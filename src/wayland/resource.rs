//! Protocol objects bound by clients
//!
//! A [`Resource`] is one object instance owned by one client at one negotiated version.
//! It stays valid until the client destroys it, the server destroys it, or the client
//! disconnects. At that point it is detached from every [`ResourceSet`] it was inserted
//! in, *before* the `destroyed` notification of its [`Dispatch`] implementation runs.
//! Containers therefore never hold dead resources.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::rc::{self, Rc};

use tracing::{error, trace};

use super::client::ClientId;
use super::display::{DisplayHandle, DisplayInner};
use super::interface::{EventMessage, Interface, RequestMessage};
use super::message::{DispatchError, Message};
use crate::utils::{AliveTracker, DeadResource, IsAlive};

/// Identifier of a protocol object
///
/// Protocol ids are only unique within one client, so the owning client is part of the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId {
    client: ClientId,
    protocol_id: u32,
}

impl ObjectId {
    /// Build an object id
    pub const fn new(client: ClientId, protocol_id: u32) -> ObjectId {
        ObjectId { client, protocol_id }
    }

    /// The client owning the object
    pub fn client_id(&self) -> ClientId {
        self.client
    }

    /// The protocol id of the object, as seen by the client
    pub fn protocol_id(&self) -> u32 {
        self.protocol_id
    }

    /// Whether both objects are owned by the same client
    pub fn same_client_as(&self, other: &ObjectId) -> bool {
        self.client == other.client
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.protocol_id, self.client.as_raw())
    }
}

type DetachHook = Box<dyn FnOnce()>;

pub(crate) struct ObjectInner {
    pub(crate) id: ObjectId,
    pub(crate) interface: &'static str,
    pub(crate) version: u32,
    pub(crate) display: rc::Weak<DisplayInner>,
    alive: AliveTracker,
    data: Box<dyn Any>,
    detach: RefCell<Vec<DetachHook>>,
}

impl ObjectInner {
    pub(crate) fn new<U: 'static>(
        id: ObjectId,
        interface: &'static str,
        version: u32,
        display: rc::Weak<DisplayInner>,
        data: U,
    ) -> ObjectInner {
        ObjectInner {
            id,
            interface,
            version,
            display,
            alive: AliveTracker::default(),
            data: Box::new(data),
            detach: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn alive(&self) -> bool {
        self.alive.alive()
    }

    /// Mark the object dead and remove it from every container it was inserted in
    ///
    /// Returns `false` if the object was already dead.
    pub(crate) fn detach(&self) -> bool {
        if !self.alive.destroy_notify() {
            return false;
        }
        let hooks = std::mem::take(&mut *self.detach.borrow_mut());
        for hook in hooks {
            hook();
        }
        true
    }
}

impl fmt::Debug for ObjectInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectInner")
            .field("id", &self.id)
            .field("interface", &self.interface)
            .field("version", &self.version)
            .field("alive", &self.alive.alive())
            .finish_non_exhaustive()
    }
}

/// A protocol object of interface `I`
pub struct Resource<I: Interface> {
    pub(crate) inner: Rc<ObjectInner>,
    _interface: PhantomData<fn() -> I>,
}

impl<I: Interface> Resource<I> {
    pub(crate) fn from_inner(inner: Rc<ObjectInner>) -> Resource<I> {
        Resource {
            inner,
            _interface: PhantomData,
        }
    }

    /// Id of this object
    pub fn id(&self) -> ObjectId {
        self.inner.id
    }

    /// Client owning this object
    pub fn client_id(&self) -> ClientId {
        self.inner.id.client
    }

    /// Negotiated version of this object
    pub fn version(&self) -> u32 {
        self.inner.version
    }

    /// Access the user data the object was initialized with
    pub fn data<U: 'static>(&self) -> Option<&U> {
        self.inner.data.downcast_ref::<U>()
    }

    /// Whether this object is owned by the same client as `other`
    pub fn same_client_as(&self, other: &ObjectId) -> bool {
        self.inner.id.same_client_as(other)
    }

    /// Send an event to the client owning this object
    ///
    /// Events are silently dropped if the object is dead, if its client is gone, or if the
    /// event was introduced after the negotiated version of the object.
    pub fn send_event(&self, event: I::Event) {
        if !self.inner.alive() {
            trace!(object = %self.inner.id, interface = I::NAME, ?event, "Dropping event for dead object");
            return;
        }
        if event.since() > self.inner.version {
            trace!(
                object = %self.inner.id,
                interface = I::NAME,
                version = self.inner.version,
                ?event,
                "Dropping event newer than the object version"
            );
            return;
        }
        let Some(display) = self.inner.display.upgrade() else {
            return;
        };
        trace!(object = %self.inner.id, interface = I::NAME, ?event, "Sending event");
        display.send_event(Message {
            sender_id: self.inner.id,
            opcode: event.opcode(),
            args: event.into_args(),
        });
    }

    /// Post a protocol error on this object
    ///
    /// The client is considered failed afterwards: its further requests are ignored and no
    /// more events are sent to it until the transport disconnects it.
    pub fn post_error(&self, code: impl Into<u32>, message: impl Into<String>) {
        if let Some(display) = self.inner.display.upgrade() {
            display.post_error(self.inner.id, code.into(), message.into());
        }
    }

    /// Create a weak reference to this object
    pub fn downgrade(&self) -> Weak<I> {
        Weak {
            inner: Rc::downgrade(&self.inner),
            id: self.inner.id,
            _interface: PhantomData,
        }
    }

    /// A handle to the display this object lives in, if it still exists
    pub fn display_handle(&self) -> Option<DisplayHandle> {
        self.inner.display.upgrade().map(DisplayHandle::from_inner)
    }

    /// Run `hook` when this object gets detached
    pub(crate) fn on_detach(&self, hook: impl FnOnce() + 'static) {
        if self.inner.alive() {
            self.inner.detach.borrow_mut().push(Box::new(hook));
        }
    }

    fn ptr(&self) -> *const ObjectInner {
        Rc::as_ptr(&self.inner)
    }
}

impl<I: Interface> IsAlive for Resource<I> {
    #[inline]
    fn alive(&self) -> bool {
        self.inner.alive()
    }
}

impl<I: Interface> Clone for Resource<I> {
    fn clone(&self) -> Self {
        Resource {
            inner: self.inner.clone(),
            _interface: PhantomData,
        }
    }
}

impl<I: Interface> PartialEq for Resource<I> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<I: Interface> Eq for Resource<I> {}

impl<I: Interface> Hash for Resource<I> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl<I: Interface> fmt::Debug for Resource<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{} (v{})", I::NAME, self.inner.id, self.inner.version)
    }
}

/// A weak reference to a [`Resource`]
pub struct Weak<I: Interface> {
    inner: rc::Weak<ObjectInner>,
    id: ObjectId,
    _interface: PhantomData<fn() -> I>,
}

impl<I: Interface> Weak<I> {
    /// Try to get back the object, fails if it has been destroyed
    pub fn upgrade(&self) -> Result<Resource<I>, DeadResource> {
        match self.inner.upgrade() {
            Some(inner) if inner.alive() => Ok(Resource::from_inner(inner)),
            _ => Err(DeadResource),
        }
    }

    /// Id of the referenced object, still available once it is dead
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Whether this weak reference points to `resource`
    pub fn is(&self, resource: &Resource<I>) -> bool {
        std::ptr::eq(self.inner.as_ptr(), resource.ptr())
    }
}

impl<I: Interface> IsAlive for Weak<I> {
    fn alive(&self) -> bool {
        self.inner.upgrade().map(|inner| inner.alive()).unwrap_or(false)
    }
}

impl<I: Interface> Clone for Weak<I> {
    fn clone(&self) -> Self {
        Weak {
            inner: self.inner.clone(),
            id: self.id,
            _interface: PhantomData,
        }
    }
}

impl<I: Interface> PartialEq for Weak<I> {
    fn eq(&self, other: &Self) -> bool {
        self.inner.ptr_eq(&other.inner)
    }
}

impl<I: Interface> Eq for Weak<I> {}

impl<I: Interface> fmt::Debug for Weak<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Weak({}#{})", I::NAME, self.id)
    }
}

/// A collection of live resources
///
/// Resources inserted in a set remove themselves when they are destroyed, before any
/// destruction callback runs. Iteration is only offered over snapshots, so handlers
/// destroying resources while a broadcast is in progress can never invalidate the
/// iteration.
pub struct ResourceSet<I: Interface> {
    inner: Rc<RefCell<Vec<Resource<I>>>>,
}

impl<I: Interface> ResourceSet<I> {
    /// Create an empty set
    pub fn new() -> ResourceSet<I> {
        ResourceSet {
            inner: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Insert a resource, does nothing if it is dead or already in the set
    pub fn insert(&self, resource: &Resource<I>) {
        if !resource.alive() || self.contains(resource) {
            return;
        }
        self.inner.borrow_mut().push(resource.clone());

        let set = Rc::downgrade(&self.inner);
        let ptr = resource.ptr();
        resource.on_detach(move || {
            if let Some(set) = set.upgrade() {
                set.borrow_mut().retain(|r| r.ptr() != ptr);
            }
        });
    }

    /// Remove a resource from the set
    pub fn remove(&self, resource: &Resource<I>) {
        self.inner.borrow_mut().retain(|r| r != resource);
    }

    /// Whether the resource is in the set
    pub fn contains(&self, resource: &Resource<I>) -> bool {
        self.inner.borrow().iter().any(|r| r == resource)
    }

    /// Copy of the current content, in insertion order
    pub fn snapshot(&self) -> Vec<Resource<I>> {
        self.inner.borrow().clone()
    }

    /// Resources owned by one client
    pub fn for_client(&self, client: ClientId) -> Vec<Resource<I>> {
        self.inner
            .borrow()
            .iter()
            .filter(|r| r.client_id() == client)
            .cloned()
            .collect()
    }

    /// First resource owned by one client
    pub fn first_for_client(&self, client: ClientId) -> Option<Resource<I>> {
        self.inner.borrow().iter().find(|r| r.client_id() == client).cloned()
    }

    /// Run `f` for every resource of a snapshot of the set
    ///
    /// Resources that die while the broadcast is in progress are skipped.
    pub fn broadcast(&self, mut f: impl FnMut(&Resource<I>)) {
        for resource in self.snapshot() {
            if resource.alive() {
                f(&resource);
            }
        }
    }

    /// Number of resources in the set
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl<I: Interface> Default for ResourceSet<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Interface> Clone for ResourceSet<I> {
    fn clone(&self) -> Self {
        ResourceSet {
            inner: self.inner.clone(),
        }
    }
}

impl<I: Interface> fmt::Debug for ResourceSet<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.borrow().iter()).finish()
    }
}

/// An object the client asked to create, waiting for initialization
#[must_use = "the object must be initialized with `DataInit::init`"]
pub struct New<I: Interface> {
    id: ObjectId,
    version: u32,
    set: Option<ResourceSet<I>>,
}

impl<I: Interface> New<I> {
    pub(crate) fn new(id: ObjectId, version: u32) -> New<I> {
        New { id, version, set: None }
    }

    pub(crate) fn with_set(id: ObjectId, version: u32, set: ResourceSet<I>) -> New<I> {
        New {
            id,
            version,
            set: Some(set),
        }
    }

    /// Id the object will have
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Version the object will have
    pub fn version(&self) -> u32 {
        self.version
    }

    pub(crate) fn into_parts(self) -> (ObjectId, u32, Option<ResourceSet<I>>) {
        (self.id, self.version, self.set)
    }
}

impl<I: Interface> fmt::Debug for New<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "New({}#{} v{})", I::NAME, self.id, self.version)
    }
}

/// Handling of requests to objects of interface `I` with user data `U`
///
/// This is implemented by the state types of the extensions of this crate, and forwarded
/// from the compositor state `D` with the `delegate_*` macros.
pub trait Dispatch<I: Interface, U, D = Self> {
    /// A request was sent to the object
    fn request(
        state: &mut D,
        client: ClientId,
        resource: &Resource<I>,
        request: I::Request,
        data: &U,
        dhandle: &DisplayHandle,
        data_init: &mut DataInit<'_, D>,
    );

    /// The object was destroyed
    ///
    /// By the time this runs the resource is dead and detached from every set.
    fn destroyed(_state: &mut D, _client: ClientId, _resource: &Resource<I>, _data: &U) {}
}

/// Initializer of objects created by requests
pub struct DataInit<'a, D> {
    handle: &'a DisplayHandle,
    _state: PhantomData<fn(&mut D)>,
}

impl<'a, D: 'static> DataInit<'a, D> {
    pub(crate) fn new(handle: &'a DisplayHandle) -> DataInit<'a, D> {
        DataInit {
            handle,
            _state: PhantomData,
        }
    }

    /// Initialize a new object with its user data
    ///
    /// Objects created by a bind are registered in the resource set of their global at
    /// this point, before the caller gets to replay any state.
    pub fn init<I, U>(&mut self, resource: New<I>, data: U) -> Resource<I>
    where
        I: Interface,
        U: 'static,
        D: Dispatch<I, U>,
    {
        self.handle.init_object::<I, U, D>(resource, data)
    }
}

impl<D> fmt::Debug for DataInit<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataInit").finish_non_exhaustive()
    }
}

type RequestFn<D> = fn(&mut D, &DisplayHandle, &Rc<ObjectInner>, Message) -> Result<bool, DispatchError>;
type DestroyedFn<D> = fn(&mut D, &Rc<ObjectInner>);

/// Type-erased entry points of one (interface, user data) pair
pub(crate) struct ObjectVTable<D> {
    pub(crate) request: RequestFn<D>,
    pub(crate) destroyed: DestroyedFn<D>,
}

impl<D> Clone for ObjectVTable<D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for ObjectVTable<D> {}

impl<D: 'static> ObjectVTable<D> {
    pub(crate) fn new<I, U>() -> ObjectVTable<D>
    where
        I: Interface,
        U: 'static,
        D: Dispatch<I, U>,
    {
        ObjectVTable {
            request: dispatch_request::<I, U, D>,
            destroyed: dispatch_destroyed::<I, U, D>,
        }
    }
}

fn dispatch_request<I, U, D>(
    state: &mut D,
    handle: &DisplayHandle,
    inner: &Rc<ObjectInner>,
    message: Message,
) -> Result<bool, DispatchError>
where
    I: Interface,
    U: 'static,
    D: Dispatch<I, U> + 'static,
{
    let request = <I::Request as RequestMessage>::parse(message, inner.version)?;
    let destructor = request.is_destructor();
    let resource = Resource::<I>::from_inner(inner.clone());
    let Some(data) = inner.data.downcast_ref::<U>() else {
        error!(object = %inner.id, interface = I::NAME, "User data does not match the object");
        return Ok(destructor);
    };
    trace!(object = %inner.id, interface = I::NAME, ?request, "Dispatching request");
    let mut data_init = DataInit::new(handle);
    <D as Dispatch<I, U>>::request(state, inner.id.client, &resource, request, data, handle, &mut data_init);
    Ok(destructor)
}

fn dispatch_destroyed<I, U, D>(state: &mut D, inner: &Rc<ObjectInner>)
where
    I: Interface,
    U: 'static,
    D: Dispatch<I, U> + 'static,
{
    let resource = Resource::<I>::from_inner(inner.clone());
    if let Some(data) = inner.data.downcast_ref::<U>() {
        trace!(object = %inner.id, interface = I::NAME, "Object destroyed");
        <D as Dispatch<I, U>>::destroyed(state, inner.id.client, &resource, data);
    }
}
