//! KDE Window decoration manager
//!
//! This interface allows a compositor to announce support for KDE's server-side decorations.
//!
//! A client can use this protocol to request being decorated by a supporting compositor. A
//! surface has at most one decoration object, creating a second one is a protocol error.
//!
//! ```
//! use plasma_wayland_server::delegate_kde_decoration;
//! use plasma_wayland_server::protocols::server_decoration::DecorationMode;
//! use plasma_wayland_server::wayland::shell::kde::decoration::{KdeDecorationHandler, KdeDecorationState};
//! use plasma_wayland_server::wayland::{Display, MemoryTransport};
//!
//! # struct State { kde_decoration_state: KdeDecorationState }
//! let display = Display::<State>::new(MemoryTransport::new());
//!
//! // Create the new KdeDecorationState.
//! let state = KdeDecorationState::new::<State>(&display.handle(), DecorationMode::Server);
//!
//! // Insert KdeDecorationState into your compositor state.
//! // …
//!
//! // Implement KDE server decoration handlers.
//! impl KdeDecorationHandler for State {
//!     fn kde_decoration_state(&mut self) -> &mut KdeDecorationState {
//!         &mut self.kde_decoration_state
//!     }
//! }
//!
//! delegate_kde_decoration!(State);
//! ```

use std::cell::RefCell;

use crate::protocols::server_decoration::org_kde_kwin_server_decoration::{self, OrgKdeKwinServerDecoration};
use crate::protocols::server_decoration::org_kde_kwin_server_decoration_manager::{
    self, OrgKdeKwinServerDecorationManager,
};
use crate::protocols::server_decoration::DecorationMode;
use crate::protocols::wayland_core::wl_surface::WlSurface;
use crate::wayland::compositor::surface_user_data;
use crate::wayland::{Dispatch, DisplayHandle, Global, GlobalDispatch, GlobalId, Resource, WEnum, Weak};

/// KDE server decoration handler.
pub trait KdeDecorationHandler {
    /// Return the KDE server decoration state.
    fn kde_decoration_state(&mut self) -> &mut KdeDecorationState;

    /// Handle new decoration object creation.
    ///
    /// Called whenever a new decoration object is created, usually this happens when a new window
    /// is opened.
    fn new_decoration(&mut self, _surface: &Resource<WlSurface>, _decoration: &Resource<OrgKdeKwinServerDecoration>) {}

    /// Handle surface decoration mode requests.
    ///
    /// Called when a surface requests a specific decoration mode or acknowledged the compositor's
    /// decoration request.
    ///
    /// **It is up to the compositor to prevent feedback loops**, a client is free to ignore modes
    /// suggested by the `mode` event and request their preferred mode instead.
    fn request_mode(
        &mut self,
        _surface: &Resource<WlSurface>,
        decoration: &Resource<OrgKdeKwinServerDecoration>,
        mode: WEnum<DecorationMode>,
    ) {
        if let WEnum::Value(mode) = mode {
            decoration.send_event(org_kde_kwin_server_decoration::Event::Mode { mode });
        }
    }

    /// Handle decoration object removal for a surface.
    fn release(&mut self, _decoration: &Resource<OrgKdeKwinServerDecoration>, _surface: &Resource<WlSurface>) {}
}

/// User data of a decoration object
///
/// `surface` is `None` for objects created for a surface that was already gone.
#[derive(Debug)]
pub struct KdeDecorationData {
    pub(super) surface: Option<Resource<WlSurface>>,
}

impl KdeDecorationData {
    /// The decorated surface
    pub fn surface(&self) -> Option<&Resource<WlSurface>> {
        self.surface.as_ref()
    }
}

/// Decoration of a surface, stored in the surface user data
#[derive(Debug, Default)]
pub(super) struct DecorationSlot(pub(super) RefCell<Option<Weak<OrgKdeKwinServerDecoration>>>);

/// KDE server decoration state.
#[derive(Debug)]
pub struct KdeDecorationState {
    pub(super) default_mode: DecorationMode,
    global: Global<OrgKdeKwinServerDecorationManager>,
}

impl KdeDecorationState {
    /// Create a new KDE server decoration global.
    pub fn new<D>(display: &DisplayHandle, default_mode: DecorationMode) -> Self
    where
        D: GlobalDispatch<OrgKdeKwinServerDecorationManager, ()>
            + Dispatch<OrgKdeKwinServerDecorationManager, ()>
            + Dispatch<OrgKdeKwinServerDecoration, KdeDecorationData>
            + KdeDecorationHandler
            + 'static,
    {
        let global = display.create_global::<D, OrgKdeKwinServerDecorationManager, _>(1, ());

        Self { default_mode, global }
    }

    /// Returns the id of the [`OrgKdeKwinServerDecorationManager`] global.
    pub fn global(&self) -> GlobalId {
        self.global.id()
    }

    /// The mode advertised to clients
    pub fn default_mode(&self) -> DecorationMode {
        self.default_mode
    }

    /// Change the advertised default mode
    pub fn set_default_mode(&mut self, mode: DecorationMode) {
        if self.default_mode == mode {
            return;
        }
        self.default_mode = mode;
        self.global.resources().broadcast(|manager| {
            manager.send_event(org_kde_kwin_server_decoration_manager::Event::DefaultMode { mode });
        });
    }

    /// The decoration object of a surface
    pub fn decoration_for(&self, surface: &Resource<WlSurface>) -> Option<Resource<OrgKdeKwinServerDecoration>> {
        surface_user_data(surface)?
            .get::<DecorationSlot>()?
            .0
            .borrow()
            .as_ref()
            .and_then(|decoration| decoration.upgrade().ok())
    }

    /// Tell the client which decoration mode the surface gets
    pub fn send_mode(&self, surface: &Resource<WlSurface>, mode: DecorationMode) {
        if let Some(decoration) = self.decoration_for(surface) {
            decoration.send_event(org_kde_kwin_server_decoration::Event::Mode { mode });
        }
    }
}

#[allow(missing_docs)]
#[macro_export]
macro_rules! delegate_kde_decoration {
    ($ty: ty) => {
        $crate::delegate_global_dispatch!($ty: [
            $crate::protocols::server_decoration::org_kde_kwin_server_decoration_manager::OrgKdeKwinServerDecorationManager: ()
        ] => $crate::wayland::shell::kde::decoration::KdeDecorationState);

        $crate::delegate_dispatch!($ty: [
            $crate::protocols::server_decoration::org_kde_kwin_server_decoration_manager::OrgKdeKwinServerDecorationManager: ()
        ] => $crate::wayland::shell::kde::decoration::KdeDecorationState);

        $crate::delegate_dispatch!($ty: [
            $crate::protocols::server_decoration::org_kde_kwin_server_decoration::OrgKdeKwinServerDecoration: $crate::wayland::shell::kde::decoration::KdeDecorationData
        ] => $crate::wayland::shell::kde::decoration::KdeDecorationState);
    };
}
