//! Decoded protocol messages
//!
//! The transport hands requests to the [`Display`](super::Display) already framed
//! and decoded into a [`Message`]: the id of the object the request is addressed to,
//! its opcode and its argument list. Events travel the other way in the same shape.

use std::fmt;
use std::os::unix::io::{AsFd, AsRawFd, BorrowedFd, OwnedFd};

use smallvec::SmallVec;

use super::client::ClientId;
use super::interface::Interface;
use super::resource::{New, ObjectId};

/// The argument list of a message
pub type ArgumentList = SmallVec<[Argument; 4]>;

/// A signed 24.8 fixed point number, as used on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fixed(i32);

impl Fixed {
    /// Build a fixed point number from its raw wire representation
    pub const fn from_raw(raw: i32) -> Fixed {
        Fixed(raw)
    }

    /// The raw wire representation
    pub const fn into_raw(self) -> i32 {
        self.0
    }

    /// Convert from a floating point value, rounding to the nearest representable value
    pub fn from_f64(value: f64) -> Fixed {
        Fixed((value * 256.0).round() as i32)
    }

    /// Convert to a floating point value
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 256.0
    }
}

impl From<f64> for Fixed {
    fn from(value: f64) -> Fixed {
        Fixed::from_f64(value)
    }
}

/// One argument of a request or an event
#[derive(Debug)]
pub enum Argument {
    /// A signed integer
    Int(i32),
    /// An unsigned integer
    Uint(u32),
    /// A fixed point number
    Fixed(Fixed),
    /// A string, `None` for a null string
    Str(Option<String>),
    /// A reference to an existing object, `None` for a null object
    Object(Option<ObjectId>),
    /// The id of a newly created object
    NewId(ObjectId),
    /// An array of bytes
    Array(Vec<u8>),
    /// A file descriptor
    Fd(OwnedFd),
}

impl Argument {
    /// The value of an `Int` argument
    pub fn as_int(&self) -> Option<i32> {
        match *self {
            Argument::Int(value) => Some(value),
            _ => None,
        }
    }

    /// The value of a `Uint` argument
    pub fn as_uint(&self) -> Option<u32> {
        match *self {
            Argument::Uint(value) => Some(value),
            _ => None,
        }
    }

    /// The value of a `Fixed` argument
    pub fn as_fixed(&self) -> Option<f64> {
        match *self {
            Argument::Fixed(value) => Some(value.to_f64()),
            _ => None,
        }
    }

    /// The value of a non-null `Str` argument
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Argument::Str(Some(value)) => Some(value),
            _ => None,
        }
    }

    /// The object of an `Object` argument, `None` for other kinds and for null objects
    pub fn as_object(&self) -> Option<ObjectId> {
        match *self {
            Argument::Object(value) => value,
            _ => None,
        }
    }

    /// The id of a `NewId` argument
    pub fn as_new_id(&self) -> Option<ObjectId> {
        match *self {
            Argument::NewId(value) => Some(value),
            _ => None,
        }
    }

    /// The content of an `Array` argument
    pub fn as_array(&self) -> Option<&[u8]> {
        match self {
            Argument::Array(value) => Some(value),
            _ => None,
        }
    }

    /// The file descriptor of a `Fd` argument
    pub fn as_fd(&self) -> Option<BorrowedFd<'_>> {
        match self {
            Argument::Fd(fd) => Some(fd.as_fd()),
            _ => None,
        }
    }
}

impl PartialEq for Argument {
    fn eq(&self, other: &Argument) -> bool {
        match (self, other) {
            (Argument::Int(a), Argument::Int(b)) => a == b,
            (Argument::Uint(a), Argument::Uint(b)) => a == b,
            (Argument::Fixed(a), Argument::Fixed(b)) => a == b,
            (Argument::Str(a), Argument::Str(b)) => a == b,
            (Argument::Object(a), Argument::Object(b)) => a == b,
            (Argument::NewId(a), Argument::NewId(b)) => a == b,
            (Argument::Array(a), Argument::Array(b)) => a == b,
            (Argument::Fd(a), Argument::Fd(b)) => a.as_raw_fd() == b.as_raw_fd(),
            _ => false,
        }
    }
}

/// A message addressed to or emitted by a protocol object
#[derive(Debug)]
pub struct Message {
    /// The object this message is addressed to (requests) or comes from (events)
    pub sender_id: ObjectId,
    /// The opcode of the message within the object's interface
    pub opcode: u16,
    /// The arguments, in protocol order
    pub args: ArgumentList,
}

/// A protocol enum value that may not be known to this implementation
///
/// Clients are allowed to send values introduced by newer revisions of a protocol,
/// so enum arguments keep the raw value around instead of failing to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WEnum<T> {
    /// A known value
    Value(T),
    /// A value this implementation does not know about
    Unknown(u32),
}

impl<T: TryFrom<u32>> From<u32> for WEnum<T> {
    fn from(value: u32) -> WEnum<T> {
        match T::try_from(value) {
            Ok(known) => WEnum::Value(known),
            Err(_) => WEnum::Unknown(value),
        }
    }
}

impl<T> WEnum<T> {
    /// Get the known value, or the raw unknown value as an error
    pub fn into_result(self) -> Result<T, u32> {
        match self {
            WEnum::Value(value) => Ok(value),
            WEnum::Unknown(raw) => Err(raw),
        }
    }
}

/// The `wl_display` error codes every connection understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CoreError {
    /// server couldn't find object
    InvalidObject = 0,
    /// method doesn't exist on the specified interface or malformed request
    InvalidMethod = 1,
    /// server is out of memory
    NoMemory = 2,
    /// implementation error in compositor
    Implementation = 3,
}

impl From<CoreError> for u32 {
    fn from(code: CoreError) -> u32 {
        code as u32
    }
}

/// Failure to dispatch a request
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The opcode does not exist in the interface, at the version of the object
    #[error("unknown opcode {opcode} for interface {interface}")]
    BadOpcode {
        /// interface of the receiving object
        interface: &'static str,
        /// offending opcode
        opcode: u16,
    },
    /// An argument is missing or has the wrong type
    #[error("malformed request {opcode} for interface {interface}: expected {expected}")]
    BadArgument {
        /// interface of the receiving object
        interface: &'static str,
        /// opcode of the request
        opcode: u16,
        /// what the decoder expected to find
        expected: &'static str,
    },
    /// The request is addressed to an object that does not exist
    #[error("object {0} does not exist")]
    InvalidObject(ObjectId),
    /// The client is gone or already got a protocol error
    #[error("client {0:?} is not accepting requests")]
    ClientGone(ClientId),
}

impl DispatchError {
    /// The `wl_display` error code this failure is reported with
    pub fn code(&self) -> CoreError {
        match self {
            DispatchError::BadOpcode { .. } | DispatchError::BadArgument { .. } => CoreError::InvalidMethod,
            DispatchError::InvalidObject(_) | DispatchError::ClientGone(_) => CoreError::InvalidObject,
        }
    }
}

/// Sequential decoder over the arguments of a request
pub(crate) struct Arguments {
    interface: &'static str,
    opcode: u16,
    version: u32,
    args: smallvec::IntoIter<[Argument; 4]>,
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("interface", &self.interface)
            .field("opcode", &self.opcode)
            .finish_non_exhaustive()
    }
}

impl Arguments {
    pub(crate) fn new(interface: &'static str, message: Message, version: u32) -> Arguments {
        Arguments {
            interface,
            opcode: message.opcode,
            version,
            args: message.args.into_iter(),
        }
    }

    pub(crate) fn opcode(&self) -> u16 {
        self.opcode
    }

    pub(crate) fn bad_opcode(&self) -> DispatchError {
        DispatchError::BadOpcode {
            interface: self.interface,
            opcode: self.opcode,
        }
    }

    /// Reject requests introduced after the version of the receiving object
    pub(crate) fn since(&self, version: u32) -> Result<(), DispatchError> {
        if self.version < version {
            Err(self.bad_opcode())
        } else {
            Ok(())
        }
    }

    fn malformed(&self, expected: &'static str) -> DispatchError {
        DispatchError::BadArgument {
            interface: self.interface,
            opcode: self.opcode,
            expected,
        }
    }

    fn next(&mut self, expected: &'static str) -> Result<Argument, DispatchError> {
        match self.args.next() {
            Some(arg) => Ok(arg),
            None => Err(self.malformed(expected)),
        }
    }

    pub(crate) fn int(&mut self) -> Result<i32, DispatchError> {
        match self.next("int")? {
            Argument::Int(value) => Ok(value),
            _ => Err(self.malformed("int")),
        }
    }

    pub(crate) fn uint(&mut self) -> Result<u32, DispatchError> {
        match self.next("uint")? {
            Argument::Uint(value) => Ok(value),
            _ => Err(self.malformed("uint")),
        }
    }

    pub(crate) fn fixed(&mut self) -> Result<f64, DispatchError> {
        match self.next("fixed")? {
            Argument::Fixed(value) => Ok(value.to_f64()),
            _ => Err(self.malformed("fixed")),
        }
    }

    pub(crate) fn string(&mut self) -> Result<String, DispatchError> {
        match self.next("string")? {
            Argument::Str(Some(value)) => Ok(value),
            _ => Err(self.malformed("non-null string")),
        }
    }

    pub(crate) fn opt_string(&mut self) -> Result<Option<String>, DispatchError> {
        match self.next("string")? {
            Argument::Str(value) => Ok(value),
            _ => Err(self.malformed("string")),
        }
    }

    pub(crate) fn object(&mut self) -> Result<ObjectId, DispatchError> {
        match self.next("object")? {
            Argument::Object(Some(id)) => Ok(id),
            _ => Err(self.malformed("non-null object")),
        }
    }

    pub(crate) fn opt_object(&mut self) -> Result<Option<ObjectId>, DispatchError> {
        match self.next("object")? {
            Argument::Object(id) => Ok(id),
            _ => Err(self.malformed("object")),
        }
    }

    /// Decode a new object id, the child inherits the version of the receiving object
    pub(crate) fn new_id<I: Interface>(&mut self) -> Result<New<I>, DispatchError> {
        match self.next("new_id")? {
            Argument::NewId(id) => Ok(New::new(id, self.version)),
            _ => Err(self.malformed("new_id")),
        }
    }

    pub(crate) fn array(&mut self) -> Result<Vec<u8>, DispatchError> {
        match self.next("array")? {
            Argument::Array(value) => Ok(value),
            _ => Err(self.malformed("array")),
        }
    }

    pub(crate) fn fd(&mut self) -> Result<OwnedFd, DispatchError> {
        match self.next("fd")? {
            Argument::Fd(fd) => Ok(fd),
            _ => Err(self.malformed("fd")),
        }
    }

    pub(crate) fn wenum<T: TryFrom<u32>>(&mut self) -> Result<WEnum<T>, DispatchError> {
        self.uint().map(WEnum::from)
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::*;
    use crate::wayland::client::ClientId;

    fn message(args: ArgumentList) -> Message {
        Message {
            sender_id: ObjectId::new(ClientId::from_raw(1), 3),
            opcode: 0,
            args,
        }
    }

    #[test]
    fn fixed_conversion() {
        assert_eq!(Fixed::from_f64(1.5).into_raw(), 384);
        assert_eq!(Fixed::from_raw(-128).to_f64(), -0.5);
    }

    #[test]
    fn decode_in_order() {
        let mut args = Arguments::new(
            "test",
            message(smallvec![
                Argument::Uint(7),
                Argument::Str(Some("seat0".into())),
                Argument::Str(None)
            ]),
            1,
        );
        assert_eq!(args.uint().unwrap(), 7);
        assert_eq!(args.string().unwrap(), "seat0");
        assert_eq!(args.opt_string().unwrap(), None);
        assert!(matches!(args.int(), Err(DispatchError::BadArgument { expected: "int", .. })));
    }

    #[test]
    fn wrong_kind_is_malformed() {
        let mut args = Arguments::new("test", message(smallvec![Argument::Int(-1)]), 1);
        let err = args.uint().unwrap_err();
        assert_eq!(err.code(), CoreError::InvalidMethod);
    }

    #[test]
    fn unknown_enum_values_survive() {
        #[derive(Debug, PartialEq)]
        enum Mode {
            On,
        }
        impl TryFrom<u32> for Mode {
            type Error = ();
            fn try_from(value: u32) -> Result<Mode, ()> {
                match value {
                    1 => Ok(Mode::On),
                    _ => Err(()),
                }
            }
        }
        assert_eq!(WEnum::<Mode>::from(1), WEnum::Value(Mode::On));
        assert_eq!(WEnum::<Mode>::from(9).into_result(), Err(9));
    }
}
