//! KDE server decoration palettes
//!
//! Lets clients pick the color scheme their server-side decoration is drawn with. The
//! palette is a color scheme name or an absolute path to a color scheme file, the crate
//! only stores it and forwards changes to [`KdePaletteHandler::palette_changed`].
//!
//! ```
//! use plasma_wayland_server::delegate_kde_palette;
//! use plasma_wayland_server::protocols::wayland_core::wl_surface::WlSurface;
//! use plasma_wayland_server::wayland::shell::kde::palette::{KdePaletteHandler, KdePaletteState};
//! use plasma_wayland_server::wayland::{Display, MemoryTransport, Resource};
//!
//! struct State {
//!     palettes: KdePaletteState,
//! }
//!
//! impl KdePaletteHandler for State {
//!     fn kde_palette_state(&mut self) -> &mut KdePaletteState {
//!         &mut self.palettes
//!     }
//!
//!     fn palette_changed(&mut self, surface: &Resource<WlSurface>, palette: &str) {
//!         // repaint the decoration of `surface`
//!     }
//! }
//!
//! delegate_kde_palette!(State);
//!
//! let display = Display::<State>::new(MemoryTransport::new());
//! let state = State {
//!     palettes: KdePaletteState::new::<State>(&display.handle()),
//! };
//! ```

use std::cell::RefCell;

use tracing::{trace, warn};

use crate::protocols::server_decoration_palette::org_kde_kwin_server_decoration_palette::{
    self, OrgKdeKwinServerDecorationPalette,
};
use crate::protocols::server_decoration_palette::org_kde_kwin_server_decoration_palette_manager::{
    self, OrgKdeKwinServerDecorationPaletteManager,
};
use crate::protocols::wayland_core::wl_surface::WlSurface;
use crate::utils::IsAlive;
use crate::wayland::compositor::surface_user_data;
use crate::wayland::{
    ClientId, DataInit, Dispatch, DisplayHandle, GlobalDispatch, GlobalId, New, Resource, Weak,
};

/// Handler of the palette protocol
pub trait KdePaletteHandler {
    /// [`KdePaletteState`] getter
    fn kde_palette_state(&mut self) -> &mut KdePaletteState;

    /// A client set the palette of a surface
    fn palette_changed(&mut self, _surface: &Resource<WlSurface>, _palette: &str) {}

    /// A client released the palette of a surface, the default palette applies again
    fn palette_released(&mut self, _surface: &Resource<WlSurface>) {}
}

/// User data of a palette object
#[derive(Debug)]
pub struct KdePaletteData {
    surface: Option<Resource<WlSurface>>,
    palette: RefCell<Option<String>>,
}

impl KdePaletteData {
    /// The surface of this palette object
    pub fn surface(&self) -> Option<&Resource<WlSurface>> {
        self.surface.as_ref()
    }

    /// The palette last set by the client
    pub fn palette(&self) -> Option<String> {
        self.palette.borrow().clone()
    }
}

#[derive(Debug, Default)]
struct PaletteSlot(RefCell<Option<Weak<OrgKdeKwinServerDecorationPalette>>>);

/// State of the palette manager global
#[derive(Debug)]
pub struct KdePaletteState {
    global: GlobalId,
}

impl KdePaletteState {
    /// Create the `org_kde_kwin_server_decoration_palette_manager` global
    pub fn new<D>(display: &DisplayHandle) -> KdePaletteState
    where
        D: GlobalDispatch<OrgKdeKwinServerDecorationPaletteManager, ()>
            + Dispatch<OrgKdeKwinServerDecorationPaletteManager, ()>
            + Dispatch<OrgKdeKwinServerDecorationPalette, KdePaletteData>
            + KdePaletteHandler
            + 'static,
    {
        let global = display.create_global::<D, OrgKdeKwinServerDecorationPaletteManager, _>(1, ());
        KdePaletteState { global: global.id() }
    }

    /// Id of the global
    pub fn global(&self) -> GlobalId {
        self.global
    }

    /// The palette object of a surface
    pub fn palette_object(&self, surface: &Resource<WlSurface>) -> Option<Resource<OrgKdeKwinServerDecorationPalette>> {
        surface_user_data(surface)?
            .get::<PaletteSlot>()?
            .0
            .borrow()
            .as_ref()
            .and_then(|palette| palette.upgrade().ok())
    }

    /// The palette a surface asked for
    pub fn palette_for(&self, surface: &Resource<WlSurface>) -> Option<String> {
        self.palette_object(surface)?
            .data::<KdePaletteData>()
            .and_then(KdePaletteData::palette)
    }
}

impl<D> GlobalDispatch<OrgKdeKwinServerDecorationPaletteManager, (), D> for KdePaletteState
where
    D: GlobalDispatch<OrgKdeKwinServerDecorationPaletteManager, ()>
        + Dispatch<OrgKdeKwinServerDecorationPaletteManager, ()>
        + Dispatch<OrgKdeKwinServerDecorationPalette, KdePaletteData>
        + KdePaletteHandler
        + 'static,
{
    fn bind(
        _state: &mut D,
        _dh: &DisplayHandle,
        _client: ClientId,
        resource: New<OrgKdeKwinServerDecorationPaletteManager>,
        _global_data: &(),
        data_init: &mut DataInit<'_, D>,
    ) {
        data_init.init(resource, ());
    }
}

impl<D> Dispatch<OrgKdeKwinServerDecorationPaletteManager, (), D> for KdePaletteState
where
    D: Dispatch<OrgKdeKwinServerDecorationPaletteManager, ()>
        + Dispatch<OrgKdeKwinServerDecorationPalette, KdePaletteData>
        + KdePaletteHandler
        + 'static,
{
    fn request(
        _state: &mut D,
        _client: ClientId,
        manager: &Resource<OrgKdeKwinServerDecorationPaletteManager>,
        request: org_kde_kwin_server_decoration_palette_manager::Request,
        _data: &(),
        dh: &DisplayHandle,
        data_init: &mut DataInit<'_, D>,
    ) {
        match request {
            org_kde_kwin_server_decoration_palette_manager::Request::Create { id, surface } => {
                let inert = KdePaletteData {
                    surface: None,
                    palette: RefCell::new(None),
                };
                let Ok(surface) = dh.get_object::<WlSurface>(surface) else {
                    data_init.init(id, inert);
                    return;
                };
                let Some(user_data) = surface_user_data(&surface) else {
                    data_init.init(id, inert);
                    return;
                };

                let slot = user_data.get_or_insert(PaletteSlot::default);
                if slot.0.borrow().as_ref().is_some_and(|palette| palette.alive()) {
                    warn!(surface = ?surface, "Client created a second palette object for a surface");
                    manager.post_error(0u32, "the surface already has a palette object");
                    return;
                }

                let palette = data_init.init(
                    id,
                    KdePaletteData {
                        surface: Some(surface.clone()),
                        palette: RefCell::new(None),
                    },
                );
                if !palette.alive() {
                    trace!(surface = ?surface, "Palette object refused");
                    return;
                }
                *slot.0.borrow_mut() = Some(palette.downgrade());
                trace!(surface = ?surface, "Created palette object for surface");
            }
        }
    }
}

impl<D> Dispatch<OrgKdeKwinServerDecorationPalette, KdePaletteData, D> for KdePaletteState
where
    D: Dispatch<OrgKdeKwinServerDecorationPalette, KdePaletteData> + KdePaletteHandler + 'static,
{
    fn request(
        state: &mut D,
        _client: ClientId,
        _resource: &Resource<OrgKdeKwinServerDecorationPalette>,
        request: org_kde_kwin_server_decoration_palette::Request,
        data: &KdePaletteData,
        _dh: &DisplayHandle,
        _data_init: &mut DataInit<'_, D>,
    ) {
        let Some(surface) = &data.surface else {
            return;
        };
        match request {
            org_kde_kwin_server_decoration_palette::Request::SetPalette { palette } => {
                *data.palette.borrow_mut() = Some(palette.clone());
                state.palette_changed(surface, &palette);
            }
            org_kde_kwin_server_decoration_palette::Request::Release => {
                data.palette.borrow_mut().take();
                state.palette_released(surface);
            }
        }
    }
}

#[allow(missing_docs)]
#[macro_export]
macro_rules! delegate_kde_palette {
    ($ty: ty) => {
        $crate::delegate_global_dispatch!($ty: [
            $crate::protocols::server_decoration_palette::org_kde_kwin_server_decoration_palette_manager::OrgKdeKwinServerDecorationPaletteManager: ()
        ] => $crate::wayland::shell::kde::palette::KdePaletteState);

        $crate::delegate_dispatch!($ty: [
            $crate::protocols::server_decoration_palette::org_kde_kwin_server_decoration_palette_manager::OrgKdeKwinServerDecorationPaletteManager: (),
            $crate::protocols::server_decoration_palette::org_kde_kwin_server_decoration_palette::OrgKdeKwinServerDecorationPalette: $crate::wayland::shell::kde::palette::KdePaletteData
        ] => $crate::wayland::shell::kde::palette::KdePaletteState);
    };
}
