//! Typed descriptions of protocol interfaces
//!
//! Every interface is a marker type implementing [`Interface`], carrying its wire name,
//! the highest version this crate implements, and the typed request and event enums.
//! The [`protocols`](crate::protocols) module holds the definitions used by this crate.

use std::fmt;

use super::message::{ArgumentList, DispatchError, Message};

/// A protocol interface
pub trait Interface: 'static {
    /// The name of the interface on the wire, for example `wl_output`
    const NAME: &'static str;
    /// The highest version of the interface implemented
    const VERSION: u32;
    /// Requests clients can send to objects of this interface
    type Request: RequestMessage;
    /// Events the server can send from objects of this interface
    type Event: EventMessage;
}

/// A request that can be decoded from a raw [`Message`]
pub trait RequestMessage: Sized + fmt::Debug {
    /// Decode a request addressed to an object bound at `version`
    fn parse(message: Message, version: u32) -> Result<Self, DispatchError>;

    /// Whether this request destroys the object it is sent to
    fn is_destructor(&self) -> bool {
        false
    }
}

/// An event that can be encoded into a raw [`Message`]
pub trait EventMessage: fmt::Debug {
    /// Opcode of the event within its interface
    fn opcode(&self) -> u16;

    /// First interface version that knows this event
    fn since(&self) -> u32 {
        1
    }

    /// Consume the event into its wire arguments
    fn into_args(self) -> ArgumentList;
}
