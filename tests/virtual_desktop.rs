mod common;

use plasma_wayland_server::protocols::plasma_virtual_desktop::{
    org_kde_plasma_virtual_desktop, org_kde_plasma_virtual_desktop_management,
};
use plasma_wayland_server::protocols::plasma_window_management::org_kde_plasma_window::{self, State};
use plasma_wayland_server::protocols::plasma_window_management::org_kde_plasma_window_management;
use plasma_wayland_server::wayland::{Argument, ClientId, ObjectId};

use common::{events_of, opcodes, Fixture};

const MANAGEMENT: &str = "org_kde_plasma_virtual_desktop_management";

fn desktop_client(f: &mut Fixture) -> (ClientId, ObjectId) {
    let client = f.add_client();
    let manager = f.bind(client, MANAGEMENT);
    f.events(client);
    (client, manager)
}

fn get_desktop(f: &mut Fixture, manager: ObjectId, id: &str) -> ObjectId {
    f.create(
        manager,
        org_kde_plasma_virtual_desktop_management::REQ_GET_VIRTUAL_DESKTOP_OPCODE,
        vec![Argument::Str(Some(id.into()))],
    )
}

fn created(events: &[&plasma_wayland_server::wayland::Message]) -> Vec<(String, u32)> {
    events
        .iter()
        .filter(|event| event.opcode == org_kde_plasma_virtual_desktop_management::EVT_DESKTOP_CREATED_OPCODE)
        .map(|event| {
            (
                event.args[0].as_str().unwrap_or_default().to_owned(),
                event.args[1].as_uint().unwrap_or_default(),
            )
        })
        .collect()
}

#[test]
fn bind_lists_desktops_in_order() {
    let mut f = Fixture::new();
    f.state.desktops.create_desktop("one", None);
    f.state.desktops.create_desktop("three", None);
    f.state.desktops.create_desktop("two", Some(1));
    f.state.desktops.set_rows(2);

    let client = f.add_client();
    let manager = f.bind(client, MANAGEMENT);
    let events = f.events(client);
    let events = events_of(&events, manager);

    assert_eq!(
        created(&events),
        vec![("one".into(), 0), ("two".into(), 1), ("three".into(), 2)]
    );
    let tail: Vec<u16> = events.iter().rev().take(2).map(|event| event.opcode).collect();
    assert_eq!(
        tail,
        vec![
            org_kde_plasma_virtual_desktop_management::EVT_DONE_OPCODE,
            org_kde_plasma_virtual_desktop_management::EVT_ROWS_OPCODE,
        ]
    );
}

#[test]
fn creation_positions_are_clamped() {
    let mut f = Fixture::new();
    let (client, manager) = desktop_client(&mut f);

    f.state.desktops.create_desktop("one", None);
    f.state.desktops.create_desktop("two", Some(42));
    let again = f.state.desktops.create_desktop("one", Some(0));

    let events = f.events(client);
    assert_eq!(
        created(&events_of(&events, manager)),
        vec![("one".into(), 0), ("two".into(), 1)]
    );
    assert_eq!(again.id(), "one");
    assert_eq!(f.state.desktops.desktops().len(), 2);
}

#[test]
fn desktop_object_gets_its_state() {
    let mut f = Fixture::new();
    let desktop = f.state.desktops.create_desktop("0001", None);
    desktop.set_name("Work");
    desktop.set_active(true);
    let (client, manager) = desktop_client(&mut f);

    let object = get_desktop(&mut f, manager, "0001");
    let events = f.events(client);

    assert_eq!(
        opcodes(&events, object),
        vec![
            org_kde_plasma_virtual_desktop::EVT_DESKTOP_ID_OPCODE,
            org_kde_plasma_virtual_desktop::EVT_NAME_OPCODE,
            org_kde_plasma_virtual_desktop::EVT_ACTIVATED_OPCODE,
            org_kde_plasma_virtual_desktop::EVT_DONE_OPCODE,
        ]
    );
    assert_eq!(events_of(&events, object)[1].args[0].as_str(), Some("Work"));
}

#[test]
fn unknown_desktop_is_removed_right_away() {
    let mut f = Fixture::new();
    let (client, manager) = desktop_client(&mut f);

    let object = get_desktop(&mut f, manager, "nope");

    assert_eq!(
        opcodes(&f.events(client), object),
        vec![org_kde_plasma_virtual_desktop::EVT_REMOVED_OPCODE]
    );
    assert!(f.transport.errors(client).is_empty());
}

#[test]
fn activation_goes_through_the_compositor() {
    let mut f = Fixture::new();
    let first = f.state.desktops.create_desktop("first", None);
    let second = f.state.desktops.create_desktop("second", None);
    first.set_active(true);
    let (client, manager) = desktop_client(&mut f);
    let first_object = get_desktop(&mut f, manager, "first");
    let second_object = get_desktop(&mut f, manager, "second");
    f.events(client);

    f.request(
        second_object,
        org_kde_plasma_virtual_desktop::REQ_REQUEST_ACTIVATE_OPCODE,
        Vec::new(),
    )
    .unwrap();

    assert!(!first.is_active());
    assert!(second.is_active());
    let events = f.events(client);
    assert_eq!(
        opcodes(&events, first_object),
        vec![org_kde_plasma_virtual_desktop::EVT_DEACTIVATED_OPCODE]
    );
    assert_eq!(
        opcodes(&events, second_object),
        vec![org_kde_plasma_virtual_desktop::EVT_ACTIVATED_OPCODE]
    );
    assert_eq!(
        opcodes(&events, manager),
        vec![org_kde_plasma_virtual_desktop_management::EVT_DONE_OPCODE]
    );
}

#[test]
fn removing_a_desktop_destroys_its_objects() {
    let mut f = Fixture::new();
    f.state.desktops.create_desktop("gone", None);
    let (client, manager) = desktop_client(&mut f);
    let object = get_desktop(&mut f, manager, "gone");
    f.events(client);

    f.state.desktops.remove_desktop("gone");
    f.display.dispatch_pending(&mut f.state);

    let events = f.events(client);
    assert_eq!(
        opcodes(&events, object),
        vec![org_kde_plasma_virtual_desktop::EVT_REMOVED_OPCODE]
    );
    let removed = events_of(&events, manager);
    assert_eq!(
        removed[0].opcode,
        org_kde_plasma_virtual_desktop_management::EVT_DESKTOP_REMOVED_OPCODE
    );
    assert_eq!(removed[0].args[0].as_str(), Some("gone"));
    assert!(f.transport.destroyed_objects(client).contains(&object));
    assert!(f.state.desktops.desktop("gone").is_none());
}

#[test]
fn windows_follow_desktop_membership() {
    let mut f = Fixture::new();
    f.state.windows.set_virtual_desktop_management(&f.state.desktops);
    let active = f.state.desktops.create_desktop("active", None);
    f.state.desktops.create_desktop("other", None);
    active.set_active(true);

    let window = f.state.windows.create_window();
    let client = f.add_client();
    let manager = f.bind(client, "org_kde_plasma_window_management");
    let object = f.create(
        manager,
        org_kde_plasma_window_management::REQ_GET_WINDOW_OPCODE,
        vec![Argument::Uint(window.internal_id())],
    );
    f.events(client);

    // unknown desktops are ignored
    window.add_plasma_virtual_desktop("missing");
    assert!(window.plasma_virtual_desktops().is_empty());

    window.set_on_all_desktops(true);
    window.add_plasma_virtual_desktop("other");
    assert!(!window.is_on_all_desktops());
    assert_eq!(window.plasma_virtual_desktops(), vec!["other".to_owned()]);
    assert!(!window.state().contains(State::ON_ALL_DESKTOPS));

    let events = f.events(client);
    let entered: Vec<&str> = events_of(&events, object)
        .iter()
        .filter(|event| event.opcode == org_kde_plasma_window::EVT_VIRTUAL_DESKTOP_ENTERED_OPCODE)
        .filter_map(|event| event.args[0].as_str())
        .collect();
    assert_eq!(entered, vec!["other"]);

    // removing the desktop makes the window leave it, and puts it on all desktops
    f.state.desktops.remove_desktop("other");
    assert!(window.plasma_virtual_desktops().is_empty());
    assert!(window.is_on_all_desktops());
    let events = f.events(client);
    assert!(opcodes(&events, object).contains(&org_kde_plasma_window::EVT_VIRTUAL_DESKTOP_LEFT_OPCODE));
}

#[test]
fn leaving_all_desktops_mode_enters_the_active_ones() {
    let mut f = Fixture::new();
    f.state.windows.set_virtual_desktop_management(&f.state.desktops);
    let active = f.state.desktops.create_desktop("active", None);
    f.state.desktops.create_desktop("other", None);
    active.set_active(true);

    let window = f.state.windows.create_window();
    window.set_on_all_desktops(true);
    window.set_on_all_desktops(false);

    assert_eq!(window.plasma_virtual_desktops(), vec!["active".to_owned()]);
}
