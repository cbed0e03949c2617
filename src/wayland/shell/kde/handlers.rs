//! Handlers for KDE decoration events.
use tracing::{trace, warn};

use crate::protocols::server_decoration::org_kde_kwin_server_decoration::{OrgKdeKwinServerDecoration, Request};
use crate::protocols::server_decoration::org_kde_kwin_server_decoration_manager::{
    self, OrgKdeKwinServerDecorationManager, Request as ManagerRequest,
};
use crate::protocols::wayland_core::wl_surface::WlSurface;
use crate::utils::IsAlive;
use crate::wayland::compositor::surface_user_data;
use crate::wayland::shell::kde::decoration::{KdeDecorationHandler, KdeDecorationState};
use crate::wayland::{ClientId, DataInit, Dispatch, DisplayHandle, GlobalDispatch, New, Resource};

use super::decoration::{DecorationSlot, KdeDecorationData};

impl<D> GlobalDispatch<OrgKdeKwinServerDecorationManager, (), D> for KdeDecorationState
where
    D: GlobalDispatch<OrgKdeKwinServerDecorationManager, ()>
        + Dispatch<OrgKdeKwinServerDecorationManager, ()>
        + Dispatch<OrgKdeKwinServerDecoration, KdeDecorationData>
        + KdeDecorationHandler
        + 'static,
{
    fn bind(
        state: &mut D,
        _dh: &DisplayHandle,
        _client: ClientId,
        resource: New<OrgKdeKwinServerDecorationManager>,
        _global_data: &(),
        data_init: &mut DataInit<'_, D>,
    ) {
        let kde_decoration_manager = data_init.init(resource, ());

        // Set default decoration mode.
        let default_mode = state.kde_decoration_state().default_mode;
        kde_decoration_manager.send_event(org_kde_kwin_server_decoration_manager::Event::DefaultMode {
            mode: default_mode,
        });

        trace!("Bound decoration manager global");
    }
}

impl<D> Dispatch<OrgKdeKwinServerDecorationManager, (), D> for KdeDecorationState
where
    D: Dispatch<OrgKdeKwinServerDecorationManager, ()>
        + Dispatch<OrgKdeKwinServerDecoration, KdeDecorationData>
        + KdeDecorationHandler
        + 'static,
{
    fn request(
        state: &mut D,
        _client: ClientId,
        kde_decoration_manager: &Resource<OrgKdeKwinServerDecorationManager>,
        request: ManagerRequest,
        _data: &(),
        dh: &DisplayHandle,
        data_init: &mut DataInit<'_, D>,
    ) {
        let (id, surface_id) = match request {
            ManagerRequest::Create { id, surface } => (id, surface),
        };

        let Ok(surface) = dh.get_object::<WlSurface>(surface_id) else {
            trace!(surface = %surface_id, "Decoration object for a dead surface");
            data_init.init(id, KdeDecorationData { surface: None });
            return;
        };
        let Some(user_data) = surface_user_data(&surface) else {
            warn!(surface = ?surface, "Decoration object for a surface without surface data");
            data_init.init(id, KdeDecorationData { surface: None });
            return;
        };

        let slot = user_data.get_or_insert(DecorationSlot::default);
        if slot.0.borrow().as_ref().is_some_and(|decoration| decoration.alive()) {
            warn!(surface = ?surface, "Client created a second decoration object for a surface");
            kde_decoration_manager.post_error(0u32, "the surface already has a decoration object");
            return;
        }

        let kde_decoration = data_init.init(
            id,
            KdeDecorationData {
                surface: Some(surface.clone()),
            },
        );
        if !kde_decoration.alive() {
            trace!(surface = ?surface, "Decoration object refused");
            return;
        }
        *slot.0.borrow_mut() = Some(kde_decoration.downgrade());
        state.new_decoration(&surface, &kde_decoration);

        trace!(surface = ?surface, "Created decoration object for surface");
    }
}

impl<D> Dispatch<OrgKdeKwinServerDecoration, KdeDecorationData, D> for KdeDecorationState
where
    D: Dispatch<OrgKdeKwinServerDecoration, KdeDecorationData> + KdeDecorationHandler + 'static,
{
    fn request(
        state: &mut D,
        _client: ClientId,
        kde_decoration: &Resource<OrgKdeKwinServerDecoration>,
        request: Request,
        data: &KdeDecorationData,
        _dh: &DisplayHandle,
        _data_init: &mut DataInit<'_, D>,
    ) {
        trace!(
            surface = ?data.surface,
            request = ?request,
            "Decoration request for surface"
        );

        let Some(surface) = &data.surface else {
            return;
        };
        match request {
            Request::RequestMode { mode } => state.request_mode(surface, kde_decoration, mode),
            Request::Release => state.release(kde_decoration, surface),
        }
    }

    fn destroyed(
        _state: &mut D,
        _client: ClientId,
        kde_decoration: &Resource<OrgKdeKwinServerDecoration>,
        data: &KdeDecorationData,
    ) {
        let slot = data
            .surface
            .as_ref()
            .and_then(surface_user_data)
            .and_then(|user_data| user_data.get::<DecorationSlot>());
        if let Some(slot) = slot {
            let mut slot = slot.0.borrow_mut();
            if slot.as_ref().is_some_and(|decoration| decoration.is(kde_decoration)) {
                *slot = None;
            }
        }
    }
}
