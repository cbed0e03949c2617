//! Protocol core and extensions
//!
//! The core of this module is a small object framework: a [`Display`] tracking clients,
//! [`Global`]s advertised to them and the [`Resource`]s they bind, plus the [`Dispatch`]
//! and [`GlobalDispatch`] traits routing requests to the code implementing an interface.
//!
//! Each extension works the same way:
//!
//! - a `*State` type created with `*State::new::<D>(&display_handle, ...)` creates the
//!   globals and holds the server-side model,
//! - a `*Handler` trait implemented by the compositor state `D` receives the notifications
//!   of the extension and gives access to its state,
//! - a `delegate_*!` macro implements the dispatch traits for `D` by forwarding them to
//!   the state type.
//!
//! ```
//! use plasma_wayland_server::delegate_kde_decoration;
//! use plasma_wayland_server::protocols::server_decoration::DecorationMode;
//! use plasma_wayland_server::wayland::shell::kde::decoration::{KdeDecorationHandler, KdeDecorationState};
//! use plasma_wayland_server::wayland::{Display, MemoryTransport};
//!
//! struct State {
//!     decorations: KdeDecorationState,
//! }
//!
//! impl KdeDecorationHandler for State {
//!     fn kde_decoration_state(&mut self) -> &mut KdeDecorationState {
//!         &mut self.decorations
//!     }
//! }
//!
//! delegate_kde_decoration!(State);
//!
//! let display = Display::<State>::new(MemoryTransport::new());
//! let state = State {
//!     decorations: KdeDecorationState::new::<State>(&display.handle(), DecorationMode::Server),
//! };
//! ```

mod client;
mod display;
mod global;
mod interface;
mod message;
mod resource;
mod transport;

pub mod compositor;
pub mod output;
pub mod plasma_virtual_desktop;
pub mod plasma_window_management;
pub mod remote_access;
pub mod seat;
pub mod shell;
pub mod tablet_manager;
pub mod text_input;

pub use client::{ClientCredentials, ClientId};
pub use display::{BindError, Display, DisplayHandle, InvalidId};
pub use global::{Global, GlobalDispatch, GlobalFilter, GlobalId, GlobalInfo, RestrictedInterfaces};
pub use interface::{EventMessage, Interface, RequestMessage};
pub use message::{Argument, ArgumentList, CoreError, DispatchError, Fixed, Message, WEnum};
pub use resource::{DataInit, Dispatch, New, ObjectId, Resource, ResourceSet, Weak};
pub use transport::{MemoryTransport, PostedError, Transport};

pub(crate) use message::Arguments;

/// Implement [`Dispatch`] for a state type by forwarding to another type
///
/// ```ignore
/// delegate_dispatch!(State: [WlOutput: OutputUserData] => OutputManagerState);
/// ```
#[macro_export]
macro_rules! delegate_dispatch {
    ($ty: ty: [$($interface: ty: $udata: ty),+ $(,)?] => $dispatch_to: ty) => {
        $(
            impl $crate::wayland::Dispatch<$interface, $udata> for $ty {
                fn request(
                    state: &mut Self,
                    client: $crate::wayland::ClientId,
                    resource: &$crate::wayland::Resource<$interface>,
                    request: <$interface as $crate::wayland::Interface>::Request,
                    data: &$udata,
                    dhandle: &$crate::wayland::DisplayHandle,
                    data_init: &mut $crate::wayland::DataInit<'_, Self>,
                ) {
                    <$dispatch_to as $crate::wayland::Dispatch<$interface, $udata, Self>>::request(
                        state, client, resource, request, data, dhandle, data_init,
                    )
                }

                fn destroyed(
                    state: &mut Self,
                    client: $crate::wayland::ClientId,
                    resource: &$crate::wayland::Resource<$interface>,
                    data: &$udata,
                ) {
                    <$dispatch_to as $crate::wayland::Dispatch<$interface, $udata, Self>>::destroyed(
                        state, client, resource, data,
                    )
                }
            }
        )+
    };
}

/// Implement [`GlobalDispatch`] for a state type by forwarding to another type
#[macro_export]
macro_rules! delegate_global_dispatch {
    ($ty: ty: [$($interface: ty: $gdata: ty),+ $(,)?] => $dispatch_to: ty) => {
        $(
            impl $crate::wayland::GlobalDispatch<$interface, $gdata> for $ty {
                fn bind(
                    state: &mut Self,
                    handle: &$crate::wayland::DisplayHandle,
                    client: $crate::wayland::ClientId,
                    resource: $crate::wayland::New<$interface>,
                    global_data: &$gdata,
                    data_init: &mut $crate::wayland::DataInit<'_, Self>,
                ) {
                    <$dispatch_to as $crate::wayland::GlobalDispatch<$interface, $gdata, Self>>::bind(
                        state, handle, client, resource, global_data, data_init,
                    )
                }

                fn can_view(
                    client: $crate::wayland::ClientId,
                    credentials: &$crate::wayland::ClientCredentials,
                    global_data: &$gdata,
                ) -> bool {
                    <$dispatch_to as $crate::wayland::GlobalDispatch<$interface, $gdata, Self>>::can_view(
                        client, credentials, global_data,
                    )
                }
            }
        )+
    };
}
