mod common;

use plasma_wayland_server::protocols::text_input_v2::{zwp_text_input_manager_v2, zwp_text_input_v2};
use plasma_wayland_server::protocols::text_input_v3::zwp_text_input_v3::{self, ChangeCause};
use plasma_wayland_server::protocols::text_input_v3::zwp_text_input_manager_v3;
use plasma_wayland_server::protocols::wayland_core::wl_surface;
use plasma_wayland_server::utils::Rectangle;
use plasma_wayland_server::wayland::text_input::{
    set_text_input_focus, TextInput, TextInputRevision, TextInputSeatTrait,
};
use plasma_wayland_server::wayland::{Argument, ClientId, ObjectId};

use common::{events_of, opcodes, Fixture, TextInputNotification};

use TextInputNotification::*;
use TextInputRevision::{V2, V3};

struct Client {
    id: ClientId,
    text_input: ObjectId,
    surface: ObjectId,
}

fn v2_client(f: &mut Fixture) -> Client {
    let id = f.add_client();
    let seat = f.bind(id, "wl_seat");
    let manager = f.bind(id, "zwp_text_input_manager_v2");
    let text_input = f.create(
        manager,
        zwp_text_input_manager_v2::REQ_GET_TEXT_INPUT_OPCODE,
        vec![Argument::Object(Some(seat))],
    );
    let surface = f.create_surface(id);
    f.events(id);
    Client { id, text_input, surface }
}

fn v3_client(f: &mut Fixture) -> Client {
    let id = f.add_client();
    let seat = f.bind(id, "wl_seat");
    let manager = f.bind(id, "zwp_text_input_manager_v3");
    let text_input = f.create(
        manager,
        zwp_text_input_manager_v3::REQ_GET_TEXT_INPUT_OPCODE,
        vec![Argument::Object(Some(seat))],
    );
    let surface = f.create_surface(id);
    f.events(id);
    Client { id, text_input, surface }
}

fn focus(f: &mut Fixture, surface: Option<ObjectId>) -> bool {
    let dh = f.dh();
    let surface = surface.map(|id| f.surface(id));
    set_text_input_focus(&dh, &f.state.seat, surface.as_ref())
}

fn v3_commit(f: &mut Fixture, client: &Client) {
    f.request(client.text_input, zwp_text_input_v3::REQ_COMMIT_OPCODE, Vec::new())
        .unwrap();
}

fn v3_enable(f: &mut Fixture, client: &Client) {
    f.request(client.text_input, zwp_text_input_v3::REQ_ENABLE_OPCODE, Vec::new())
        .unwrap();
}

#[test]
fn v2_enable_follows_the_focus() {
    let mut f = Fixture::new();
    let client = v2_client(&mut f);
    let handle = f.state.seat.text_input_v2();

    assert!(!focus(&mut f, Some(client.surface)));
    assert_eq!(
        opcodes(&f.events(client.id), client.text_input),
        vec![zwp_text_input_v2::EVT_ENTER_OPCODE]
    );
    assert_eq!(handle.focused_surface().map(|s| s.id()), Some(client.surface));

    f.request(
        client.text_input,
        zwp_text_input_v2::REQ_ENABLE_OPCODE,
        vec![Argument::Object(Some(client.surface))],
    )
    .unwrap();
    assert!(handle.is_enabled());
    assert_eq!(f.state.text_input_notifications, vec![EnabledChanged(V2)]);

    handle.commit_string("hello");
    let events = f.events(client.id);
    let commits = events_of(&events, client.text_input);
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].opcode, zwp_text_input_v2::EVT_COMMIT_STRING_OPCODE);
    assert_eq!(commits[0].args[0].as_str(), Some("hello"));

    assert!(focus(&mut f, None));
    assert!(!handle.is_enabled());
    assert_eq!(
        opcodes(&f.events(client.id), client.text_input),
        vec![zwp_text_input_v2::EVT_LEAVE_OPCODE]
    );

    // still enabled on the surface, so coming back enables again
    assert!(focus(&mut f, Some(client.surface)));
    assert!(handle.is_enabled());
}

#[test]
fn v2_state_is_applied_immediately() {
    let mut f = Fixture::new();
    let client = v2_client(&mut f);
    let handle = f.state.seat.text_input_v2();
    focus(&mut f, Some(client.surface));

    f.request(
        client.text_input,
        zwp_text_input_v2::REQ_SET_SURROUNDING_TEXT_OPCODE,
        vec![Argument::Str(Some("some text".into())), Argument::Int(4), Argument::Int(0)],
    )
    .unwrap();
    f.request(
        client.text_input,
        zwp_text_input_v2::REQ_SET_CURSOR_RECTANGLE_OPCODE,
        vec![Argument::Int(1), Argument::Int(2), Argument::Int(3), Argument::Int(4)],
    )
    .unwrap();
    f.request(
        client.text_input,
        zwp_text_input_v2::REQ_SET_CURSOR_RECTANGLE_OPCODE,
        vec![Argument::Int(1), Argument::Int(2), Argument::Int(3), Argument::Int(4)],
    )
    .unwrap();
    f.request(
        client.text_input,
        zwp_text_input_v2::REQ_SET_PREFERRED_LANGUAGE_OPCODE,
        vec![Argument::Str(Some("fr-FR".into()))],
    )
    .unwrap();
    f.request(client.text_input, zwp_text_input_v2::REQ_SHOW_INPUT_PANEL_OPCODE, Vec::new())
        .unwrap();
    f.request(
        client.text_input,
        zwp_text_input_v2::REQ_UPDATE_STATE_OPCODE,
        vec![Argument::Uint(7), Argument::Uint(0)],
    )
    .unwrap();

    assert_eq!(
        f.state.text_input_notifications,
        vec![
            SurroundingText(V2),
            CursorRectangle(V2),
            PreferredLanguage(V2),
            Panel(V2, true),
            Committed(V2, 7),
        ]
    );
    let state = handle.state();
    assert_eq!(state.surrounding_text, "some text");
    assert_eq!(state.surrounding_cursor, 4);
    assert_eq!(state.cursor_rectangle, Rectangle::from_loc_and_size((1, 2), (3, 4)));
    assert_eq!(state.preferred_language, "fr-FR");
}

#[test]
fn v2_destroyed_surface_is_no_longer_enabled() {
    let mut f = Fixture::new();
    let client = v2_client(&mut f);
    let handle = f.state.seat.text_input_v2();
    focus(&mut f, Some(client.surface));
    f.request(
        client.text_input,
        zwp_text_input_v2::REQ_ENABLE_OPCODE,
        vec![Argument::Object(Some(client.surface))],
    )
    .unwrap();
    assert!(handle.is_enabled());

    f.request(client.surface, wl_surface::REQ_DESTROY_OPCODE, Vec::new())
        .unwrap();

    assert!(!handle.is_enabled());
    assert!(handle.focused_surface().is_none());
}

#[test]
fn v3_state_is_double_buffered() {
    let mut f = Fixture::new();
    let client = v3_client(&mut f);
    let handle = f.state.seat.text_input_v3();
    focus(&mut f, Some(client.surface));
    assert_eq!(
        opcodes(&f.events(client.id), client.text_input),
        vec![zwp_text_input_v3::EVT_ENTER_OPCODE]
    );

    f.request(client.text_input, zwp_text_input_v3::REQ_ENABLE_OPCODE, Vec::new())
        .unwrap();
    f.request(
        client.text_input,
        zwp_text_input_v3::REQ_SET_SURROUNDING_TEXT_OPCODE,
        vec![Argument::Str(Some("abc".into())), Argument::Int(1), Argument::Int(1)],
    )
    .unwrap();
    assert!(!handle.is_enabled());
    assert!(f.state.text_input_notifications.is_empty());

    f.request(client.text_input, zwp_text_input_v3::REQ_COMMIT_OPCODE, Vec::new())
        .unwrap();

    assert!(handle.is_enabled());
    assert_eq!(handle.state().surrounding_text, "abc");
    assert_eq!(
        f.state.text_input_notifications,
        vec![SurroundingText(V3), Committed(V3, 1), EnabledChanged(V3)]
    );
    let events = f.events(client.id);
    let done = events_of(&events, client.text_input);
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].opcode, zwp_text_input_v3::EVT_DONE_OPCODE);
    assert_eq!(done[0].args[0].as_uint(), Some(1));
}

#[test]
fn v3_requests_before_enable_are_ignored() {
    let mut f = Fixture::new();
    let client = v3_client(&mut f);
    let handle = f.state.seat.text_input_v3();
    focus(&mut f, Some(client.surface));

    f.request(
        client.text_input,
        zwp_text_input_v3::REQ_SET_SURROUNDING_TEXT_OPCODE,
        vec![Argument::Str(Some("ignored".into())), Argument::Int(0), Argument::Int(0)],
    )
    .unwrap();
    f.request(client.text_input, zwp_text_input_v3::REQ_COMMIT_OPCODE, Vec::new())
        .unwrap();

    assert!(!handle.is_enabled());
    assert!(handle.state().surrounding_text.is_empty());
    assert_eq!(f.state.text_input_notifications, vec![Committed(V3, 1)]);
}

#[test]
fn v3_input_method_events_end_with_done() {
    let mut f = Fixture::new();
    let client = v3_client(&mut f);
    let handle = f.state.seat.text_input_v3();
    focus(&mut f, Some(client.surface));
    f.request(client.text_input, zwp_text_input_v3::REQ_ENABLE_OPCODE, Vec::new())
        .unwrap();
    f.request(client.text_input, zwp_text_input_v3::REQ_COMMIT_OPCODE, Vec::new())
        .unwrap();
    f.events(client.id);

    handle.preedit("wor", 3, 3);
    handle.commit_string("hello");
    handle.delete_surrounding_text(1, 0);
    handle.done();

    assert_eq!(
        opcodes(&f.events(client.id), client.text_input),
        vec![
            zwp_text_input_v3::EVT_PREEDIT_STRING_OPCODE,
            zwp_text_input_v3::EVT_COMMIT_STRING_OPCODE,
            zwp_text_input_v3::EVT_DELETE_SURROUNDING_TEXT_OPCODE,
            zwp_text_input_v3::EVT_DONE_OPCODE,
        ]
    );
}

#[test]
fn v3_leave_disables() {
    let mut f = Fixture::new();
    let client = v3_client(&mut f);
    let other = v3_client(&mut f);
    let handle = f.state.seat.text_input_v3();
    focus(&mut f, Some(client.surface));
    f.request(client.text_input, zwp_text_input_v3::REQ_ENABLE_OPCODE, Vec::new())
        .unwrap();
    f.request(client.text_input, zwp_text_input_v3::REQ_COMMIT_OPCODE, Vec::new())
        .unwrap();
    f.events(client.id);

    assert!(focus(&mut f, Some(other.surface)));

    assert!(!handle.is_enabled());
    assert_eq!(
        opcodes(&f.events(client.id), client.text_input),
        vec![zwp_text_input_v3::EVT_LEAVE_OPCODE]
    );
    assert_eq!(
        opcodes(&f.events(other.id), other.text_input),
        vec![zwp_text_input_v3::EVT_ENTER_OPCODE]
    );

    // coming back needs a new enable
    focus(&mut f, Some(client.surface));
    assert!(!handle.is_enabled());
}

#[test]
fn text_input_created_after_focus_gets_enter() {
    let mut f = Fixture::new();
    let id = f.add_client();
    let surface = f.create_surface(id);
    focus(&mut f, Some(surface));
    let seat = f.bind(id, "wl_seat");
    let manager = f.bind(id, "zwp_text_input_manager_v3");
    f.events(id);

    let text_input = f.create(
        manager,
        zwp_text_input_manager_v3::REQ_GET_TEXT_INPUT_OPCODE,
        vec![Argument::Object(Some(seat))],
    );

    assert_eq!(
        opcodes(&f.events(id), text_input),
        vec![zwp_text_input_v3::EVT_ENTER_OPCODE]
    );
    assert_eq!(
        f.state.seat.text_input_v3().focused_surface().map(|s| s.id()),
        Some(surface)
    );
}

#[test]
fn revisions_are_independent() {
    let mut f = Fixture::new();
    let old = v2_client(&mut f);

    focus(&mut f, Some(old.surface));
    f.request(
        old.text_input,
        zwp_text_input_v2::REQ_ENABLE_OPCODE,
        vec![Argument::Object(Some(old.surface))],
    )
    .unwrap();

    assert!(f.state.seat.text_input_v2().is_enabled());
    assert!(!f.state.seat.text_input_v3().is_enabled());
    // v3 sees the focus but the client has no v3 text input
    assert!(f.state.seat.text_input_v3().focused_surface().is_none());
}

#[test]
fn v3_enabling_again_is_reported() {
    let mut f = Fixture::new();
    let client = v3_client(&mut f);
    focus(&mut f, Some(client.surface));
    v3_enable(&mut f, &client);
    v3_commit(&mut f, &client);
    assert!(!f.state.text_input_notifications.contains(&EnableRequested(V3)));

    // a plain commit is not an enable
    f.state.text_input_notifications.clear();
    v3_commit(&mut f, &client);
    assert_eq!(f.state.text_input_notifications, vec![Committed(V3, 2)]);

    v3_enable(&mut f, &client);
    v3_commit(&mut f, &client);
    assert_eq!(
        f.state.text_input_notifications,
        vec![Committed(V3, 2), Committed(V3, 3), EnableRequested(V3)]
    );
}

#[test]
fn v3_change_cause_lasts_one_commit() {
    let mut f = Fixture::new();
    let client = v3_client(&mut f);
    let handle = f.state.seat.text_input_v3();
    focus(&mut f, Some(client.surface));
    v3_enable(&mut f, &client);
    f.request(
        client.text_input,
        zwp_text_input_v3::REQ_SET_TEXT_CHANGE_CAUSE_OPCODE,
        vec![Argument::Uint(ChangeCause::Other as u32)],
    )
    .unwrap();
    v3_commit(&mut f, &client);
    assert_eq!(handle.change_cause(), ChangeCause::Other);

    v3_commit(&mut f, &client);
    assert_eq!(handle.change_cause(), ChangeCause::InputMethod);
}

#[test]
fn v3_disable_resets_the_state_quietly() {
    let mut f = Fixture::new();
    let client = v3_client(&mut f);
    let handle = f.state.seat.text_input_v3();
    focus(&mut f, Some(client.surface));
    v3_enable(&mut f, &client);
    f.request(
        client.text_input,
        zwp_text_input_v3::REQ_SET_SURROUNDING_TEXT_OPCODE,
        vec![Argument::Str(Some("abc".into())), Argument::Int(3), Argument::Int(3)],
    )
    .unwrap();
    f.request(
        client.text_input,
        zwp_text_input_v3::REQ_SET_CURSOR_RECTANGLE_OPCODE,
        vec![Argument::Int(1), Argument::Int(2), Argument::Int(3), Argument::Int(4)],
    )
    .unwrap();
    v3_commit(&mut f, &client);
    assert_eq!(handle.state().surrounding_text, "abc");
    f.state.text_input_notifications.clear();

    f.request(client.text_input, zwp_text_input_v3::REQ_DISABLE_OPCODE, Vec::new())
        .unwrap();
    v3_commit(&mut f, &client);

    assert!(!handle.is_enabled());
    let current = handle.state();
    assert!(current.surrounding_text.is_empty());
    assert_eq!(current.surrounding_cursor, 0);
    assert_eq!(current.cursor_rectangle, Rectangle::default());
    assert_eq!(
        f.state.text_input_notifications,
        vec![Committed(V3, 2), EnabledChanged(V3)]
    );
}
