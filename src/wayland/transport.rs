//! The connection layer seen from the protocol core
//!
//! Accepting connections, framing and marshalling messages and passing file descriptors
//! are the job of a lower-level library. The core only needs to push messages out, post
//! errors and announce globals, which is what [`Transport`] covers.
//!
//! [`MemoryTransport`] keeps everything in per-client queues. It is what the tests of
//! this crate run on, and can serve as an in-process loopback.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::rc::Rc;

use super::client::ClientId;
use super::global::GlobalInfo;
use super::message::Message;
use super::resource::ObjectId;

/// Outbound side of the connection layer
pub trait Transport {
    /// Queue an event for a client, events to one client must be delivered in order
    fn send_event(&mut self, client: ClientId, message: Message);

    /// Post a fatal protocol error to a client
    fn post_error(&mut self, client: ClientId, object: ObjectId, code: u32, message: String);

    /// Advertise a global to a client
    fn global_added(&mut self, client: ClientId, global: &GlobalInfo);

    /// An object was destroyed, the transport may release its id
    fn object_destroyed(&mut self, _object: ObjectId) {}

    /// Flush queued events, of one client or of all of them
    fn flush(&mut self, _client: Option<ClientId>) -> io::Result<()> {
        Ok(())
    }
}

/// A protocol error as recorded by [`MemoryTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedError {
    /// Object the error was posted on
    pub object: ObjectId,
    /// Interface-specific error code
    pub code: u32,
    /// Human readable description
    pub message: String,
}

#[derive(Debug, Default)]
struct ClientQueue {
    events: VecDeque<Message>,
    errors: Vec<PostedError>,
    globals: Vec<GlobalInfo>,
    destroyed: Vec<ObjectId>,
    flushes: usize,
}

/// A [`Transport`] recording all its traffic in memory
///
/// Clones share the same queues, keep one around after handing the other to the display.
#[derive(Debug, Default, Clone)]
pub struct MemoryTransport {
    queues: Rc<RefCell<HashMap<ClientId, ClientQueue>>>,
}

impl MemoryTransport {
    /// Create a transport with empty queues
    pub fn new() -> MemoryTransport {
        MemoryTransport::default()
    }

    /// Take every event queued for `client`, in delivery order
    pub fn take_events(&self, client: ClientId) -> Vec<Message> {
        self.queues
            .borrow_mut()
            .get_mut(&client)
            .map(|queue| queue.events.drain(..).collect())
            .unwrap_or_default()
    }

    /// Number of events queued for `client`
    pub fn pending_events(&self, client: ClientId) -> usize {
        self.queues
            .borrow()
            .get(&client)
            .map(|queue| queue.events.len())
            .unwrap_or(0)
    }

    /// Protocol errors posted to `client`
    pub fn errors(&self, client: ClientId) -> Vec<PostedError> {
        self.queues
            .borrow()
            .get(&client)
            .map(|queue| queue.errors.clone())
            .unwrap_or_default()
    }

    /// Globals advertised to `client`, in advertisement order
    pub fn globals(&self, client: ClientId) -> Vec<GlobalInfo> {
        self.queues
            .borrow()
            .get(&client)
            .map(|queue| queue.globals.clone())
            .unwrap_or_default()
    }

    /// Find the advertised global of an interface
    pub fn global_named(&self, client: ClientId, interface: &str) -> Option<GlobalInfo> {
        self.globals(client)
            .into_iter()
            .find(|global| global.interface == interface)
    }

    /// Ids of `client`'s objects that were destroyed
    pub fn destroyed_objects(&self, client: ClientId) -> Vec<ObjectId> {
        self.queues
            .borrow()
            .get(&client)
            .map(|queue| queue.destroyed.clone())
            .unwrap_or_default()
    }

    /// How many times the queues of `client` were flushed
    pub fn flushes(&self, client: ClientId) -> usize {
        self.queues
            .borrow()
            .get(&client)
            .map(|queue| queue.flushes)
            .unwrap_or(0)
    }
}

impl Transport for MemoryTransport {
    fn send_event(&mut self, client: ClientId, message: Message) {
        self.queues
            .borrow_mut()
            .entry(client)
            .or_default()
            .events
            .push_back(message);
    }

    fn post_error(&mut self, client: ClientId, object: ObjectId, code: u32, message: String) {
        self.queues
            .borrow_mut()
            .entry(client)
            .or_default()
            .errors
            .push(PostedError { object, code, message });
    }

    fn global_added(&mut self, client: ClientId, global: &GlobalInfo) {
        self.queues
            .borrow_mut()
            .entry(client)
            .or_default()
            .globals
            .push(global.clone());
    }

    fn object_destroyed(&mut self, object: ObjectId) {
        self.queues
            .borrow_mut()
            .entry(object.client_id())
            .or_default()
            .destroyed
            .push(object);
    }

    fn flush(&mut self, client: Option<ClientId>) -> io::Result<()> {
        let mut queues = self.queues.borrow_mut();
        match client {
            Some(client) => queues.entry(client).or_default().flushes += 1,
            None => queues.values_mut().for_each(|queue| queue.flushes += 1),
        }
        Ok(())
    }
}
