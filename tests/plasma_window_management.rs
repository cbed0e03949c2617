mod common;

use plasma_wayland_server::protocols::plasma_window_management::org_kde_plasma_window::{self, State};
use plasma_wayland_server::protocols::plasma_window_management::org_kde_plasma_window_management::{
    self, ShowDesktop,
};
use plasma_wayland_server::protocols::wayland_core::wl_surface;
use plasma_wayland_server::utils::Rectangle;
use plasma_wayland_server::wayland::plasma_window_management::WindowLifecycle;
use plasma_wayland_server::wayland::{Argument, ClientId, ObjectId};

use common::{events_of, opcodes, Fixture};

const WM: &str = "org_kde_plasma_window_management";

fn get_window(f: &mut Fixture, manager: ObjectId, internal_id: u32) -> ObjectId {
    f.create(
        manager,
        org_kde_plasma_window_management::REQ_GET_WINDOW_OPCODE,
        vec![Argument::Uint(internal_id)],
    )
}

fn task_manager(f: &mut Fixture) -> (ClientId, ObjectId) {
    let client = f.add_client();
    let manager = f.bind(client, WM);
    f.events(client);
    (client, manager)
}

#[test]
fn bind_lists_existing_windows() {
    let mut f = Fixture::new();
    let first = f.state.windows.create_window();
    let second = f.state.windows.create_window();
    f.state.windows.set_stacking_order(vec![second.internal_id(), first.internal_id()]);

    let client = f.add_client();
    let manager = f.bind(client, WM);
    let events = f.events(client);
    let events = events_of(&events, manager);

    let windows: Vec<u32> = events
        .iter()
        .filter(|event| event.opcode == org_kde_plasma_window_management::EVT_WINDOW_OPCODE)
        .filter_map(|event| event.args[0].as_uint())
        .collect();
    assert_eq!(windows, vec![first.internal_id(), second.internal_id()]);
    assert_eq!(
        events.last().map(|event| event.opcode),
        Some(org_kde_plasma_window_management::EVT_SHOW_DESKTOP_CHANGED_OPCODE)
    );
    assert!(events
        .iter()
        .any(|event| event.opcode == org_kde_plasma_window_management::EVT_STACKING_ORDER_CHANGED_OPCODE));
}

#[test]
fn new_windows_are_announced() {
    let mut f = Fixture::new();
    let (client, manager) = task_manager(&mut f);

    let window = f.state.windows.create_window();

    let events = f.events(client);
    let announced = events_of(&events, manager);
    assert_eq!(announced.len(), 1);
    assert_eq!(announced[0].args[0].as_uint(), Some(window.internal_id()));
}

#[test]
fn window_object_gets_the_whole_state() {
    let mut f = Fixture::new();
    let window = f.state.windows.create_window();
    window.set_title("Konsole");
    window.set_app_id("org.kde.konsole");
    window.set_geometry(Rectangle::from_loc_and_size((10, 20), (800, 600)));
    let (client, manager) = task_manager(&mut f);

    let object = get_window(&mut f, manager, window.internal_id());

    let events = f.events(client);
    let opcodes = opcodes(&events, object);
    assert!(opcodes.contains(&org_kde_plasma_window::EVT_TITLE_CHANGED_OPCODE));
    assert!(opcodes.contains(&org_kde_plasma_window::EVT_APP_ID_CHANGED_OPCODE));
    assert!(opcodes.contains(&org_kde_plasma_window::EVT_GEOMETRY_OPCODE));
    assert!(!opcodes.contains(&org_kde_plasma_window::EVT_UNMAPPED_OPCODE));
    assert_eq!(opcodes.last(), Some(&org_kde_plasma_window::EVT_INITIAL_STATE_OPCODE));
    assert_eq!(window.resources().len(), 1);
}

#[test]
fn property_changes_reach_every_window_object() {
    let mut f = Fixture::new();
    let window = f.state.windows.create_window();
    let (a, manager_a) = task_manager(&mut f);
    let (b, manager_b) = task_manager(&mut f);
    let object_a = get_window(&mut f, manager_a, window.internal_id());
    let object_b = get_window(&mut f, manager_b, window.internal_id());
    f.events(a);
    f.events(b);

    window.set_title("Dolphin");
    window.set_title("Dolphin");

    for (client, object) in [(a, object_a), (b, object_b)] {
        let events = f.events(client);
        let titles = events_of(&events, object);
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].opcode, org_kde_plasma_window::EVT_TITLE_CHANGED_OPCODE);
        assert_eq!(titles[0].args[0].as_str(), Some("Dolphin"));
    }
}

#[test]
fn unmapped_window_lives_until_released() {
    let mut f = Fixture::new();
    let window = f.state.windows.create_window();
    let (client, manager) = task_manager(&mut f);
    let object = get_window(&mut f, manager, window.internal_id());
    f.events(client);

    window.unmap();

    assert_eq!(window.lifecycle(), WindowLifecycle::Unmapped);
    assert!(f.state.windows.windows().is_empty());
    assert!(f.state.windows.window(window.internal_id()).is_none());
    assert_eq!(
        opcodes(&f.events(client), object),
        vec![org_kde_plasma_window::EVT_UNMAPPED_OPCODE]
    );

    // setters keep working on the unmapped window
    window.set_title("closing");
    assert_eq!(window.title(), "closing");

    f.request(object, org_kde_plasma_window::REQ_DESTROY_OPCODE, Vec::new())
        .unwrap();
    assert_eq!(window.lifecycle(), WindowLifecycle::Destroyed);
    assert!(window.resources().is_empty());
}

#[test]
fn unmap_without_objects_destroys_right_away() {
    let mut f = Fixture::new();
    let window = f.state.windows.create_window();

    window.unmap();

    assert_eq!(window.lifecycle(), WindowLifecycle::Destroyed);
    assert!(f.state.windows.windows().is_empty());
}

#[test]
fn unknown_window_is_reported_unmapped() {
    let mut f = Fixture::new();
    let (client, manager) = task_manager(&mut f);

    let object = get_window(&mut f, manager, 9999);

    let opcodes = opcodes(&f.events(client), object);
    let unmapped = opcodes
        .iter()
        .position(|opcode| *opcode == org_kde_plasma_window::EVT_UNMAPPED_OPCODE)
        .expect("no unmapped event");
    assert_eq!(opcodes.last(), Some(&org_kde_plasma_window::EVT_INITIAL_STATE_OPCODE));
    assert!(unmapped < opcodes.len() - 1);
    assert!(f.state.windows.windows().is_empty());

    // the placeholder does not swallow the next real window
    let real = f.state.windows.create_window();
    assert_ne!(real.internal_id(), 9999);
}

#[test]
fn disconnect_releases_unmapped_window() {
    let mut f = Fixture::new();
    let window = f.state.windows.create_window();
    let (client, manager) = task_manager(&mut f);
    get_window(&mut f, manager, window.internal_id());

    window.unmap();
    assert_eq!(window.lifecycle(), WindowLifecycle::Unmapped);

    f.disconnect(client);
    assert_eq!(window.lifecycle(), WindowLifecycle::Destroyed);
}

#[test]
fn state_requests_are_forwarded_per_flag() {
    let mut f = Fixture::new();
    let window = f.state.windows.create_window();
    let (_, manager) = task_manager(&mut f);
    let object = get_window(&mut f, manager, window.internal_id());

    let flags = State::MINIMIZED | State::KEEP_ABOVE;
    f.request(
        object,
        org_kde_plasma_window::REQ_SET_STATE_OPCODE,
        vec![Argument::Uint(flags.bits()), Argument::Uint(State::MINIMIZED.bits())],
    )
    .unwrap();
    f.request(object, org_kde_plasma_window::REQ_CLOSE_OPCODE, Vec::new())
        .unwrap();

    let id = window.internal_id();
    assert_eq!(
        f.state.state_requests,
        vec![(id, State::MINIMIZED, true), (id, State::KEEP_ABOVE, false)]
    );
    assert_eq!(f.state.closed_windows, vec![id]);
    // nothing changes until the compositor decides so
    assert!(window.state().is_empty());
}

#[test]
fn minimized_geometry_follows_the_panel_surface() {
    let mut f = Fixture::new();
    let window = f.state.windows.create_window();
    let (client, manager) = task_manager(&mut f);
    let object = get_window(&mut f, manager, window.internal_id());
    let panel = f.create_surface(client);

    let set_geometry = |x: u32| {
        vec![
            Argument::Object(Some(panel)),
            Argument::Uint(x),
            Argument::Uint(0),
            Argument::Uint(48),
            Argument::Uint(48),
        ]
    };
    f.request(object, org_kde_plasma_window::REQ_SET_MINIMIZED_GEOMETRY_OPCODE, set_geometry(100))
        .unwrap();
    // same rectangle again
    f.request(object, org_kde_plasma_window::REQ_SET_MINIMIZED_GEOMETRY_OPCODE, set_geometry(100))
        .unwrap();

    let id = window.internal_id();
    assert_eq!(f.state.minimized_changes, vec![id]);
    let geometries = window.minimized_geometries();
    assert_eq!(geometries.len(), 1);
    assert_eq!(geometries[0].0.id(), panel);
    assert_eq!(geometries[0].1, Rectangle::from_loc_and_size((100, 0), (48, 48)));

    f.request(panel, wl_surface::REQ_DESTROY_OPCODE, Vec::new()).unwrap();

    assert_eq!(f.state.minimized_changes, vec![id, id]);
    assert!(window.minimized_geometries().is_empty());
    assert_eq!(f.state.destroyed_surfaces, vec![panel]);
}

#[test]
fn unset_minimized_geometry() {
    let mut f = Fixture::new();
    let window = f.state.windows.create_window();
    let (client, manager) = task_manager(&mut f);
    let object = get_window(&mut f, manager, window.internal_id());
    let panel = f.create_surface(client);

    f.request(
        object,
        org_kde_plasma_window::REQ_SET_MINIMIZED_GEOMETRY_OPCODE,
        vec![
            Argument::Object(Some(panel)),
            Argument::Uint(0),
            Argument::Uint(0),
            Argument::Uint(10),
            Argument::Uint(10),
        ],
    )
    .unwrap();
    f.request(
        object,
        org_kde_plasma_window::REQ_UNSET_MINIMIZED_GEOMETRY_OPCODE,
        vec![Argument::Object(Some(panel))],
    )
    .unwrap();
    assert!(window.minimized_geometries().is_empty());

    // the hook is gone with the entry
    f.request(panel, wl_surface::REQ_DESTROY_OPCODE, Vec::new()).unwrap();
    let id = window.internal_id();
    assert_eq!(f.state.minimized_changes, vec![id, id]);
}

#[test]
fn old_clients_do_not_get_newer_events() {
    let mut f = Fixture::new();
    let window = f.state.windows.create_window();
    window.set_geometry(Rectangle::from_loc_and_size((0, 0), (640, 480)));
    window.set_pid(1234);

    let client = f.add_client();
    let manager = f.bind_version(client, WM, 3);
    let events = f.events(client);
    assert!(!opcodes(&events, manager).contains(&org_kde_plasma_window_management::EVT_STACKING_ORDER_CHANGED_OPCODE));

    let object = get_window(&mut f, manager, window.internal_id());
    let opcodes = opcodes(&f.events(client), object);
    assert!(!opcodes.contains(&org_kde_plasma_window::EVT_INITIAL_STATE_OPCODE));
    assert!(!opcodes.contains(&org_kde_plasma_window::EVT_GEOMETRY_OPCODE));
    assert!(!opcodes.contains(&org_kde_plasma_window::EVT_PID_CHANGED_OPCODE));
    assert!(opcodes.contains(&org_kde_plasma_window::EVT_STATE_CHANGED_OPCODE));
}

#[test]
fn show_desktop_changes_are_broadcast_once() {
    let mut f = Fixture::new();
    let (client, manager) = task_manager(&mut f);

    f.state.windows.set_show_desktop(ShowDesktop::Enabled);
    f.state.windows.set_show_desktop(ShowDesktop::Enabled);

    assert_eq!(
        opcodes(&f.events(client), manager),
        vec![org_kde_plasma_window_management::EVT_SHOW_DESKTOP_CHANGED_OPCODE]
    );

    f.request(
        manager,
        org_kde_plasma_window_management::REQ_SHOW_DESKTOP_OPCODE,
        vec![Argument::Uint(ShowDesktop::Disabled as u32)],
    )
    .unwrap();
    assert_eq!(f.state.windows.show_desktop(), ShowDesktop::Enabled);
}

#[test]
fn children_are_orphaned_when_the_parent_goes() {
    let mut f = Fixture::new();
    let parent = f.state.windows.create_window();
    let child = f.state.windows.create_window();
    child.set_parent_window(Some(&parent));
    let (client, manager) = task_manager(&mut f);
    let object = get_window(&mut f, manager, child.internal_id());
    f.events(client);

    parent.unmap();

    assert!(child.parent_window().is_none());
    let events = f.events(client);
    let parents = events_of(&events, object);
    assert_eq!(parents.len(), 1);
    assert_eq!(parents[0].opcode, org_kde_plasma_window::EVT_PARENT_WINDOW_OPCODE);
}

#[test]
fn placeholder_window_is_kept_while_held() {
    let mut f = Fixture::new();
    let (client, manager) = task_manager(&mut f);

    let object = get_window(&mut f, manager, 9999);
    assert_eq!(f.state.windows.unmapped_windows().len(), 1);

    f.request(object, org_kde_plasma_window::REQ_DESTROY_OPCODE, Vec::new())
        .unwrap();
    f.display.dispatch_pending(&mut f.state);
    assert!(f.state.windows.unmapped_windows().is_empty());
    assert!(f.transport.errors(client).is_empty());
}

#[test]
fn refused_placeholder_window_is_not_kept() {
    let mut f = Fixture::new();
    let (client, manager) = task_manager(&mut f);

    // the new id is already taken by the manager
    f.request(
        manager,
        org_kde_plasma_window_management::REQ_GET_WINDOW_OPCODE,
        vec![Argument::NewId(manager), Argument::Uint(9999)],
    )
    .unwrap();

    assert_eq!(f.transport.errors(client).len(), 1);
    assert!(f.state.windows.unmapped_windows().is_empty());
}

#[test]
fn reparenting_moves_the_child_between_parents() {
    let mut f = Fixture::new();
    let first = f.state.windows.create_window();
    let second = f.state.windows.create_window();
    let child = f.state.windows.create_window();

    child.set_parent_window(Some(&first));
    child.set_parent_window(Some(&second));
    child.set_parent_window(Some(&first));
    child.set_parent_window(None);
    child.set_parent_window(Some(&first));

    assert_eq!(first.child_windows(), vec![child.clone()]);
    assert!(second.child_windows().is_empty());

    // a former parent going away leaves the child alone
    second.unmap();
    assert_eq!(child.parent_window(), Some(first.clone()));
}
