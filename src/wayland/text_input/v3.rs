use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{trace, warn};

use crate::protocols::text_input_v3::zwp_text_input_manager_v3::{self, ZwpTextInputManagerV3};
use crate::protocols::text_input_v3::zwp_text_input_v3::{self, ChangeCause, ZwpTextInputV3};
use crate::protocols::wayland_core::wl_seat::WlSeat;
use crate::protocols::wayland_core::wl_surface::WlSurface;
use crate::utils::Rectangle;
use crate::wayland::seat::Seat;
use crate::wayland::{
    ClientId, DataInit, Dispatch, DisplayHandle, GlobalDispatch, New, Resource, ResourceSet, WEnum, Weak,
};

use super::{
    rectangle, ContentHint, ContentPurpose, TextDirection, TextInput, TextInputHandler, TextInputManagerState,
    TextInputRevision, TextInputSeatTrait, TextInputState,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Preedit {
    text: String,
    cursor_begin: i32,
    cursor_end: i32,
}

impl Preedit {
    fn is_empty(&self) -> bool {
        self.text.is_empty() && self.cursor_begin == 0 && self.cursor_end == 0
    }
}

#[derive(Debug)]
struct Inner {
    focus: Option<Weak<WlSurface>>,
    state: TextInputState,
    change_cause: ChangeCause,
    preedit: Preedit,
    pending_preedit: Preedit,
}

impl Default for Inner {
    fn default() -> Self {
        Inner {
            focus: None,
            state: TextInputState::default(),
            change_cause: ChangeCause::InputMethod,
            preedit: Preedit::default(),
            pending_preedit: Preedit::default(),
        }
    }
}

impl Inner {
    fn focus(&self) -> Option<Resource<WlSurface>> {
        self.focus.as_ref().and_then(|focus| focus.upgrade().ok())
    }
}

/// Double-buffered state of a `zwp_text_input_v3` resource
#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending {
    enabled: bool,
    enable_sent: bool,
    surrounding_text: String,
    surrounding_cursor: i32,
    surrounding_anchor: i32,
    change_cause: ChangeCause,
    content_hints: ContentHint,
    content_purpose: ContentPurpose,
    cursor_rectangle: Rectangle<i32>,
}

impl Pending {
    fn new(enabled: bool) -> Pending {
        Pending {
            enabled,
            enable_sent: enabled,
            surrounding_text: String::new(),
            surrounding_cursor: 0,
            surrounding_anchor: 0,
            change_cause: ChangeCause::InputMethod,
            content_hints: ContentHint::empty(),
            content_purpose: ContentPurpose::Normal,
            cursor_rectangle: Rectangle::default(),
        }
    }
}

/// The `zwp_text_input_v3` side of a seat
#[derive(Debug, Clone, Default)]
pub struct TextInputV3Handle {
    instances: ResourceSet<ZwpTextInputV3>,
    inner: Rc<RefCell<Inner>>,
}

/// User data of a `zwp_text_input_v3` resource
#[derive(Debug)]
pub struct TextInputV3Data {
    seat: Seat,
    handle: TextInputV3Handle,
    pending: RefCell<Pending>,
    enabled: Cell<bool>,
    serial: Cell<u32>,
}

impl TextInputV3Data {
    /// The seat of the text input
    pub fn seat(&self) -> &Seat {
        &self.seat
    }

    /// Number of commits of this text input
    pub fn serial(&self) -> u32 {
        self.serial.get()
    }

    /// Whether the last commit enabled the text input
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }
}

impl TextInputV3Handle {
    fn enabled_instances(&self) -> Vec<Resource<ZwpTextInputV3>> {
        let Some(focus) = self.inner.borrow().focus() else {
            return Vec::new();
        };
        self.instances
            .for_client(focus.client_id())
            .into_iter()
            .filter(|instance| instance.data::<TextInputV3Data>().is_some_and(TextInputV3Data::is_enabled))
            .collect()
    }

    /// Whether the client has a text input on this seat
    pub fn client_supports_text_input(&self, client: ClientId) -> bool {
        self.instances.first_for_client(client).is_some()
    }

    /// Cause of the last surrounding text change
    pub fn change_cause(&self) -> ChangeCause {
        self.inner.borrow().change_cause
    }
}

impl TextInput for TextInputV3Handle {
    fn version(&self) -> TextInputRevision {
        TextInputRevision::V3
    }

    fn focused_surface(&self) -> Option<Resource<WlSurface>> {
        self.inner
            .borrow()
            .focus()
            .filter(|focus| self.client_supports_text_input(focus.client_id()))
    }

    fn is_enabled(&self) -> bool {
        !self.enabled_instances().is_empty()
    }

    fn state(&self) -> TextInputState {
        let enabled = self.is_enabled();
        TextInputState {
            enabled,
            ..self.inner.borrow().state.clone()
        }
    }

    fn set_focus(&self, _dh: &DisplayHandle, surface: Option<&Resource<WlSurface>>) -> bool {
        let old = self.inner.borrow().focus();
        if old.as_ref() == surface {
            return false;
        }
        let was_enabled = self.is_enabled();

        if let Some(old) = old {
            for instance in self.instances.for_client(old.client_id()) {
                if let Some(data) = instance.data::<TextInputV3Data>() {
                    data.enabled.set(false);
                    *data.pending.borrow_mut() = Pending::new(false);
                }
                instance.send_event(zwp_text_input_v3::Event::Leave { surface: old.id() });
            }
        }

        self.inner.borrow_mut().focus = surface.map(Resource::downgrade);
        if let Some(surface) = surface {
            for instance in self.instances.for_client(surface.client_id()) {
                instance.send_event(zwp_text_input_v3::Event::Enter { surface: surface.id() });
            }
        }

        was_enabled != self.is_enabled()
    }

    fn preedit(&self, text: &str, cursor_begin: i32, cursor_end: i32) {
        let instances = self.enabled_instances();
        if self.inner.borrow().focus().is_none() {
            return;
        }
        self.inner.borrow_mut().pending_preedit = Preedit {
            text: text.to_owned(),
            cursor_begin,
            cursor_end,
        };
        for instance in instances {
            instance.send_event(zwp_text_input_v3::Event::PreeditString {
                text: Some(text.to_owned()),
                cursor_begin,
                cursor_end,
            });
        }
    }

    fn commit_string(&self, text: &str) {
        for instance in self.enabled_instances() {
            instance.send_event(zwp_text_input_v3::Event::CommitString {
                text: Some(text.to_owned()),
            });
        }
    }

    fn delete_surrounding_text(&self, before_length: u32, after_length: u32) {
        for instance in self.enabled_instances() {
            instance.send_event(zwp_text_input_v3::Event::DeleteSurroundingText {
                before_length,
                after_length,
            });
        }
    }

    fn set_cursor_position(&self, _index: i32, _anchor: i32) {
        trace!("zwp_text_input_v3 has no cursor position event");
    }

    fn set_input_panel_state(&self, _visible: bool, _overlapped: Rectangle<i32>) {
        trace!("zwp_text_input_v3 has no input panel event");
    }

    fn set_language(&self, _language_tag: &str) {
        trace!("zwp_text_input_v3 has no language event");
    }

    fn set_text_direction(&self, _direction: TextDirection) {
        trace!("zwp_text_input_v3 has no text direction event");
    }

    fn done(&self) {
        if self.inner.borrow().focus().is_none() {
            return;
        }
        {
            let mut inner = self.inner.borrow_mut();
            inner.preedit = std::mem::take(&mut inner.pending_preedit);
        }
        for instance in self.enabled_instances() {
            let serial = instance.data::<TextInputV3Data>().map_or(0, TextInputV3Data::serial);
            instance.send_event(zwp_text_input_v3::Event::Done { serial });
        }
    }
}

impl<D> GlobalDispatch<ZwpTextInputManagerV3, (), D> for TextInputManagerState
where
    D: GlobalDispatch<ZwpTextInputManagerV3, ()>
        + Dispatch<ZwpTextInputManagerV3, ()>
        + Dispatch<ZwpTextInputV3, TextInputV3Data>
        + TextInputHandler
        + 'static,
{
    fn bind(
        _state: &mut D,
        _handle: &DisplayHandle,
        _client: ClientId,
        resource: New<ZwpTextInputManagerV3>,
        _global_data: &(),
        data_init: &mut DataInit<'_, D>,
    ) {
        data_init.init(resource, ());
    }
}

impl<D> Dispatch<ZwpTextInputManagerV3, (), D> for TextInputManagerState
where
    D: Dispatch<ZwpTextInputManagerV3, ()> + Dispatch<ZwpTextInputV3, TextInputV3Data> + TextInputHandler + 'static,
{
    fn request(
        _state: &mut D,
        client: ClientId,
        manager: &Resource<ZwpTextInputManagerV3>,
        request: zwp_text_input_manager_v3::Request,
        _data: &(),
        dh: &DisplayHandle,
        data_init: &mut DataInit<'_, D>,
    ) {
        match request {
            zwp_text_input_manager_v3::Request::GetTextInput { id, seat } => {
                let Some(seat) = dh.get_object::<WlSeat>(seat).ok().and_then(|seat| Seat::from_resource(&seat)) else {
                    warn!(?client, "Text input requested for an invalid seat");
                    manager.post_error(0u32, "invalid seat");
                    return;
                };

                let handle = seat.text_input_v3();
                let instance = data_init.init(
                    id,
                    TextInputV3Data {
                        seat,
                        handle: handle.clone(),
                        pending: RefCell::new(Pending::new(false)),
                        enabled: Cell::new(false),
                        serial: Cell::new(0),
                    },
                );
                handle.instances.insert(&instance);

                let focus = handle.inner.borrow().focus();
                if let Some(focus) = focus.filter(|focus| focus.client_id() == client) {
                    instance.send_event(zwp_text_input_v3::Event::Enter { surface: focus.id() });
                }
            }
            zwp_text_input_manager_v3::Request::Destroy => {}
        }
    }
}

impl<D> Dispatch<ZwpTextInputV3, TextInputV3Data, D> for TextInputManagerState
where
    D: Dispatch<ZwpTextInputV3, TextInputV3Data> + TextInputHandler + 'static,
{
    fn request(
        state: &mut D,
        _client: ClientId,
        resource: &Resource<ZwpTextInputV3>,
        request: zwp_text_input_v3::Request,
        data: &TextInputV3Data,
        _dh: &DisplayHandle,
        _data_init: &mut DataInit<'_, D>,
    ) {
        match request {
            zwp_text_input_v3::Request::Enable => *data.pending.borrow_mut() = Pending::new(true),
            zwp_text_input_v3::Request::Disable => {
                *data.pending.borrow_mut() = Pending::new(false);
                let mut inner = data.handle.inner.borrow_mut();
                inner.preedit = Preedit::default();
            }
            zwp_text_input_v3::Request::SetSurroundingText { text, cursor, anchor } => {
                let mut pending = data.pending.borrow_mut();
                if pending.enabled {
                    pending.surrounding_text = text;
                    pending.surrounding_cursor = cursor;
                    pending.surrounding_anchor = anchor;
                }
            }
            zwp_text_input_v3::Request::SetTextChangeCause { cause } => {
                let mut pending = data.pending.borrow_mut();
                if pending.enabled {
                    pending.change_cause = match cause {
                        WEnum::Value(cause) => cause,
                        WEnum::Unknown(_) => ChangeCause::Other,
                    };
                }
            }
            zwp_text_input_v3::Request::SetContentType { hint, purpose } => {
                let mut pending = data.pending.borrow_mut();
                if pending.enabled {
                    pending.content_hints = ContentHint::from_bits_truncate(hint);
                    pending.content_purpose = ContentPurpose::from(purpose);
                }
            }
            zwp_text_input_v3::Request::SetCursorRectangle { x, y, width, height } => {
                let mut pending = data.pending.borrow_mut();
                if pending.enabled {
                    pending.cursor_rectangle = rectangle(x, y, width, height);
                }
            }
            zwp_text_input_v3::Request::Commit => commit(state, resource, data),
            zwp_text_input_v3::Request::Destroy => {}
        }
    }

    fn destroyed(state: &mut D, _client: ClientId, _resource: &Resource<ZwpTextInputV3>, data: &TextInputV3Data) {
        if data.enabled.get() && data.handle.enabled_instances().is_empty() {
            let focused = data.handle.inner.borrow().focus().is_some();
            if focused {
                state.text_input_enabled_changed(&data.seat, TextInputRevision::V3);
            }
        }
    }
}

fn commit<D: TextInputHandler>(state: &mut D, resource: &Resource<ZwpTextInputV3>, data: &TextInputV3Data) {
    let handle = &data.handle;
    let seat = &data.seat;
    let revision = TextInputRevision::V3;

    let was_enabled = handle.is_enabled();
    let serial = data.serial.get().wrapping_add(1);
    data.serial.set(serial);

    let pending = {
        let mut pending = data.pending.borrow_mut();
        let committed = pending.clone();
        pending.change_cause = ChangeCause::InputMethod;
        pending.enable_sent = false;
        committed
    };
    let resource_was_enabled = data.enabled.replace(pending.enabled);

    // a disabling commit resets the state without telling the handler
    let (content_changed, cursor_changed, surrounding_changed) = {
        let mut inner = handle.inner.borrow_mut();
        inner.change_cause = pending.change_cause;
        let target = &mut inner.state;

        let content_changed =
            target.content_hints != pending.content_hints || target.content_purpose != pending.content_purpose;
        target.content_hints = pending.content_hints;
        target.content_purpose = pending.content_purpose;

        let cursor_changed = target.cursor_rectangle != pending.cursor_rectangle;
        target.cursor_rectangle = pending.cursor_rectangle;

        let surrounding_changed = target.surrounding_text != pending.surrounding_text
            || target.surrounding_cursor != pending.surrounding_cursor
            || target.surrounding_anchor != pending.surrounding_anchor;
        target.surrounding_text = pending.surrounding_text;
        target.surrounding_cursor = pending.surrounding_cursor;
        target.surrounding_anchor = pending.surrounding_anchor;

        (content_changed, cursor_changed, surrounding_changed)
    };

    if pending.enabled {
        if content_changed {
            state.text_input_content_type_changed(seat, revision);
        }
        if cursor_changed {
            state.text_input_cursor_rectangle_changed(seat, revision);
        }
        if surrounding_changed {
            state.text_input_surrounding_text_changed(seat, revision);
        }
    }

    state.text_input_state_committed(seat, revision, serial);

    let preedit = handle.inner.borrow().preedit.clone();
    if !preedit.is_empty() {
        resource.send_event(zwp_text_input_v3::Event::PreeditString {
            text: Some(preedit.text),
            cursor_begin: preedit.cursor_begin,
            cursor_end: preedit.cursor_end,
        });
    }
    resource.send_event(zwp_text_input_v3::Event::Done { serial });

    if resource_was_enabled && pending.enable_sent {
        state.text_input_enable_requested(seat, revision);
    }
    if was_enabled != handle.is_enabled() {
        state.text_input_enabled_changed(seat, revision);
    }
}
