//! Typed definitions of the implemented interfaces
//!
//! One module per protocol, one submodule per interface. Each interface module carries a
//! marker type implementing [`Interface`](crate::wayland::Interface), the `Request` and
//! `Event` enums, the protocol enums of the interface and its opcode constants:
//! `REQ_*_OPCODE` for requests, `EVT_*_OPCODE` and `EVT_*_SINCE` for events.
//!
//! Object arguments are carried as [`ObjectId`](crate::wayland::ObjectId)s and resolved by
//! the dispatching code with
//! [`DisplayHandle::get_object`](crate::wayland::DisplayHandle::get_object).

macro_rules! protocol_enum {
    (
        $(#[$attr:meta])*
        pub enum $name:ident {
            $($(#[$vattr:meta])* $variant:ident = $value:expr),+ $(,)?
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum $name {
            $($(#[$vattr])* $variant = $value),+
        }

        impl TryFrom<u32> for $name {
            type Error = ();

            fn try_from(value: u32) -> Result<Self, ()> {
                match value {
                    $(v if v == $value => Ok($name::$variant),)+
                    _ => Err(()),
                }
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> u32 {
                value as u32
            }
        }
    };
}

pub(crate) use protocol_enum;

pub mod wayland_core;
pub mod outputdevice;
pub mod plasma_virtual_desktop;
pub mod plasma_window_management;
pub mod remote_access;
pub mod server_decoration;
pub mod server_decoration_palette;
pub mod tablet_v2;
pub mod text_input_v2;
pub mod text_input_v3;
