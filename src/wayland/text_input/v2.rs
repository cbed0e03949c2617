use std::cell::RefCell;
use std::rc::Rc;

use tracing::{trace, warn};

use crate::protocols::text_input_v2::zwp_text_input_manager_v2::{self, ZwpTextInputManagerV2};
use crate::protocols::text_input_v2::zwp_text_input_v2::{self, InputPanelVisibility, ZwpTextInputV2};
use crate::protocols::wayland_core::wl_seat::WlSeat;
use crate::protocols::wayland_core::wl_surface::WlSurface;
use crate::utils::{IsAlive, Rectangle};
use crate::wayland::seat::Seat;
use crate::wayland::{ClientId, DataInit, Dispatch, DisplayHandle, GlobalDispatch, New, Resource, ResourceSet, Weak};

use super::{
    rectangle, ContentHint, ContentPurpose, TextDirection, TextInput, TextInputHandler, TextInputManagerState,
    TextInputRevision, TextInputSeatTrait, TextInputState,
};

#[derive(Debug, Default)]
struct Inner {
    focus: Option<Weak<WlSurface>>,
    enabled_surfaces: Vec<Weak<WlSurface>>,
    state: TextInputState,
    panel: (bool, Rectangle<i32>),
    language: String,
    modifiers_map: Vec<u8>,
}

impl Inner {
    fn focus(&self) -> Option<Resource<WlSurface>> {
        self.focus.as_ref().and_then(|focus| focus.upgrade().ok())
    }

    fn is_enabled(&self) -> bool {
        self.focus().is_some_and(|focus| {
            self.enabled_surfaces
                .iter()
                .any(|surface| surface.is(&focus) && surface.alive())
        })
    }
}

/// The `zwp_text_input_v2` side of a seat
#[derive(Debug, Clone, Default)]
pub struct TextInputV2Handle {
    instances: ResourceSet<ZwpTextInputV2>,
    inner: Rc<RefCell<Inner>>,
}

/// User data of a `zwp_text_input_v2` resource
#[derive(Debug)]
pub struct TextInputV2Data {
    seat: Seat,
    handle: TextInputV2Handle,
}

impl TextInputV2Data {
    /// The seat of the text input
    pub fn seat(&self) -> &Seat {
        &self.seat
    }
}

impl TextInputV2Handle {
    fn focused_instances(&self) -> Vec<Resource<ZwpTextInputV2>> {
        match self.inner.borrow().focus() {
            Some(focus) => self.instances.for_client(focus.client_id()),
            None => Vec::new(),
        }
    }

    fn send_focused(&self, event: impl Fn() -> zwp_text_input_v2::Event) {
        for instance in self.focused_instances() {
            instance.send_event(event());
        }
    }

    /// Send a keysym to the focused client
    pub fn keysym(&self, time: u32, sym: u32, pressed: bool, modifiers: u32) {
        self.send_focused(|| zwp_text_input_v2::Event::Keysym {
            time,
            sym,
            state: u32::from(pressed),
            modifiers,
        });
    }

    /// Change the modifiers map
    pub fn set_modifiers_map(&self, map: Vec<u8>) {
        if self.inner.borrow().modifiers_map == map {
            return;
        }
        self.inner.borrow_mut().modifiers_map = map.clone();
        self.send_focused(|| zwp_text_input_v2::Event::ModifiersMap { map: map.clone() });
    }

    /// Whether the client has a text input on this seat
    pub fn client_supports_text_input(&self, client: ClientId) -> bool {
        self.instances.first_for_client(client).is_some()
    }
}

impl TextInput for TextInputV2Handle {
    fn version(&self) -> TextInputRevision {
        TextInputRevision::V2
    }

    fn focused_surface(&self) -> Option<Resource<WlSurface>> {
        self.inner
            .borrow()
            .focus()
            .filter(|focus| self.client_supports_text_input(focus.client_id()))
    }

    fn is_enabled(&self) -> bool {
        self.inner.borrow().is_enabled()
    }

    fn state(&self) -> TextInputState {
        let inner = self.inner.borrow();
        TextInputState {
            enabled: inner.is_enabled(),
            ..inner.state.clone()
        }
    }

    fn set_focus(&self, dh: &DisplayHandle, surface: Option<&Resource<WlSurface>>) -> bool {
        let (old, was_enabled) = {
            let inner = self.inner.borrow();
            let old = inner.focus();
            if old.as_ref() == surface {
                return false;
            }
            (old, inner.is_enabled())
        };

        let serial = u32::from(dh.next_serial());
        if let Some(old) = old {
            for instance in self.instances.for_client(old.client_id()) {
                instance.send_event(zwp_text_input_v2::Event::Leave {
                    serial,
                    surface: old.id(),
                });
            }
        }

        self.inner.borrow_mut().focus = surface.map(Resource::downgrade);
        if let Some(surface) = surface {
            for instance in self.instances.for_client(surface.client_id()) {
                instance.send_event(zwp_text_input_v2::Event::Enter {
                    serial,
                    surface: surface.id(),
                });
            }
        }

        was_enabled != self.is_enabled()
    }

    fn preedit(&self, text: &str, cursor_begin: i32, _cursor_end: i32) {
        for instance in self.focused_instances() {
            instance.send_event(zwp_text_input_v2::Event::PreeditCursor { index: cursor_begin });
            instance.send_event(zwp_text_input_v2::Event::PreeditString {
                text: text.to_owned(),
                commit: String::new(),
            });
        }
    }

    fn commit_string(&self, text: &str) {
        self.send_focused(|| zwp_text_input_v2::Event::CommitString { text: text.to_owned() });
    }

    fn delete_surrounding_text(&self, before_length: u32, after_length: u32) {
        self.send_focused(|| zwp_text_input_v2::Event::DeleteSurroundingText {
            before_length,
            after_length,
        });
    }

    fn set_cursor_position(&self, index: i32, anchor: i32) {
        self.send_focused(|| zwp_text_input_v2::Event::CursorPosition { index, anchor });
    }

    fn set_input_panel_state(&self, visible: bool, overlapped: Rectangle<i32>) {
        if self.inner.borrow().panel == (visible, overlapped) {
            return;
        }
        self.inner.borrow_mut().panel = (visible, overlapped);
        let state = if visible {
            InputPanelVisibility::Visible
        } else {
            InputPanelVisibility::Hidden
        };
        self.send_focused(|| zwp_text_input_v2::Event::InputPanelState {
            state,
            x: overlapped.loc.x,
            y: overlapped.loc.y,
            width: overlapped.size.w,
            height: overlapped.size.h,
        });
    }

    fn set_language(&self, language_tag: &str) {
        if self.inner.borrow().language == language_tag {
            return;
        }
        self.inner.borrow_mut().language = language_tag.to_owned();
        self.send_focused(|| zwp_text_input_v2::Event::Language {
            language: language_tag.to_owned(),
        });
    }

    fn set_text_direction(&self, direction: TextDirection) {
        let direction = match direction {
            TextDirection::Auto => zwp_text_input_v2::TextDirection::Auto,
            TextDirection::LeftToRight => zwp_text_input_v2::TextDirection::Ltr,
            TextDirection::RightToLeft => zwp_text_input_v2::TextDirection::Rtl,
        };
        self.send_focused(|| zwp_text_input_v2::Event::TextDirection { direction });
    }

    fn done(&self) {}
}

impl<D> GlobalDispatch<ZwpTextInputManagerV2, (), D> for TextInputManagerState
where
    D: GlobalDispatch<ZwpTextInputManagerV2, ()>
        + Dispatch<ZwpTextInputManagerV2, ()>
        + Dispatch<ZwpTextInputV2, TextInputV2Data>
        + TextInputHandler
        + 'static,
{
    fn bind(
        _state: &mut D,
        _handle: &DisplayHandle,
        _client: ClientId,
        resource: New<ZwpTextInputManagerV2>,
        _global_data: &(),
        data_init: &mut DataInit<'_, D>,
    ) {
        data_init.init(resource, ());
    }
}

impl<D> Dispatch<ZwpTextInputManagerV2, (), D> for TextInputManagerState
where
    D: Dispatch<ZwpTextInputManagerV2, ()> + Dispatch<ZwpTextInputV2, TextInputV2Data> + TextInputHandler + 'static,
{
    fn request(
        _state: &mut D,
        client: ClientId,
        manager: &Resource<ZwpTextInputManagerV2>,
        request: zwp_text_input_manager_v2::Request,
        _data: &(),
        dh: &DisplayHandle,
        data_init: &mut DataInit<'_, D>,
    ) {
        match request {
            zwp_text_input_manager_v2::Request::GetTextInput { id, seat } => {
                let Some(seat) = dh.get_object::<WlSeat>(seat).ok().and_then(|seat| Seat::from_resource(&seat)) else {
                    warn!(?client, "Text input requested for an invalid seat");
                    manager.post_error(0u32, "invalid seat");
                    return;
                };

                let handle = seat.text_input_v2();
                let instance = data_init.init(
                    id,
                    TextInputV2Data {
                        seat,
                        handle: handle.clone(),
                    },
                );
                handle.instances.insert(&instance);

                let focus = handle.inner.borrow().focus();
                if let Some(focus) = focus.filter(|focus| focus.client_id() == client) {
                    instance.send_event(zwp_text_input_v2::Event::Enter {
                        serial: dh.next_serial().into(),
                        surface: focus.id(),
                    });
                }
            }
            zwp_text_input_manager_v2::Request::Destroy => {}
        }
    }
}

impl<D> Dispatch<ZwpTextInputV2, TextInputV2Data, D> for TextInputManagerState
where
    D: Dispatch<ZwpTextInputV2, TextInputV2Data> + TextInputHandler + 'static,
{
    fn request(
        state: &mut D,
        _client: ClientId,
        _resource: &Resource<ZwpTextInputV2>,
        request: zwp_text_input_v2::Request,
        data: &TextInputV2Data,
        dh: &DisplayHandle,
        _data_init: &mut DataInit<'_, D>,
    ) {
        let handle = &data.handle;
        let seat = &data.seat;
        let revision = TextInputRevision::V2;

        match request {
            zwp_text_input_v2::Request::Enable { surface } => {
                let Ok(surface) = dh.get_object::<WlSurface>(surface) else {
                    return;
                };
                let changed = {
                    let mut inner = handle.inner.borrow_mut();
                    let was_enabled = inner.is_enabled();
                    inner.enabled_surfaces.retain(IsAlive::alive);
                    if !inner.enabled_surfaces.iter().any(|enabled| enabled.is(&surface)) {
                        inner.enabled_surfaces.push(surface.downgrade());
                    }
                    was_enabled != inner.is_enabled()
                };
                if changed {
                    state.text_input_enabled_changed(seat, revision);
                }
            }
            zwp_text_input_v2::Request::Disable { surface } => {
                let Ok(surface) = dh.get_object::<WlSurface>(surface) else {
                    return;
                };
                let (changed, focused) = {
                    let mut inner = handle.inner.borrow_mut();
                    let was_enabled = inner.is_enabled();
                    inner
                        .enabled_surfaces
                        .retain(|enabled| enabled.alive() && !enabled.is(&surface));
                    (was_enabled != inner.is_enabled(), inner.focus().as_ref() == Some(&surface))
                };
                if focused {
                    handle.set_input_panel_state(false, Rectangle::default());
                }
                if changed {
                    state.text_input_enabled_changed(seat, revision);
                }
            }
            zwp_text_input_v2::Request::ShowInputPanel => state.text_input_panel_requested(seat, revision, true),
            zwp_text_input_v2::Request::HideInputPanel => state.text_input_panel_requested(seat, revision, false),
            zwp_text_input_v2::Request::SetSurroundingText { text, cursor, anchor } => {
                {
                    let mut inner = handle.inner.borrow_mut();
                    inner.state.surrounding_text = text;
                    inner.state.surrounding_cursor = cursor;
                    inner.state.surrounding_anchor = anchor;
                }
                state.text_input_surrounding_text_changed(seat, revision);
            }
            zwp_text_input_v2::Request::SetContentType { hint, purpose } => {
                let hints = ContentHint::from_bits_truncate(hint);
                let purpose = ContentPurpose::from(purpose);
                let changed = {
                    let mut inner = handle.inner.borrow_mut();
                    let changed = inner.state.content_hints != hints || inner.state.content_purpose != purpose;
                    inner.state.content_hints = hints;
                    inner.state.content_purpose = purpose;
                    changed
                };
                if changed {
                    state.text_input_content_type_changed(seat, revision);
                }
            }
            zwp_text_input_v2::Request::SetCursorRectangle { x, y, width, height } => {
                let rect = rectangle(x, y, width, height);
                let changed = {
                    let mut inner = handle.inner.borrow_mut();
                    let changed = inner.state.cursor_rectangle != rect;
                    inner.state.cursor_rectangle = rect;
                    changed
                };
                if changed {
                    state.text_input_cursor_rectangle_changed(seat, revision);
                }
            }
            zwp_text_input_v2::Request::SetPreferredLanguage { language } => {
                let changed = {
                    let mut inner = handle.inner.borrow_mut();
                    let changed = inner.state.preferred_language != language;
                    inner.state.preferred_language = language;
                    changed
                };
                if changed {
                    state.text_input_preferred_language_changed(seat, revision);
                }
            }
            zwp_text_input_v2::Request::UpdateState { serial, reason } => {
                trace!(serial, ?reason, "Text input state update");
                state.text_input_state_committed(seat, revision, serial);
            }
            zwp_text_input_v2::Request::Destroy => {}
        }
    }
}
