mod common;

use plasma_wayland_server::protocols::server_decoration::{
    org_kde_kwin_server_decoration, org_kde_kwin_server_decoration_manager, DecorationMode,
};
use plasma_wayland_server::protocols::server_decoration_palette::{
    org_kde_kwin_server_decoration_palette, org_kde_kwin_server_decoration_palette_manager,
};
use plasma_wayland_server::protocols::wayland_core::wl_surface;
use plasma_wayland_server::wayland::{Argument, ClientId, ObjectId};

use common::{events_of, opcodes, Fixture};

const DECORATION_MANAGER: &str = "org_kde_kwin_server_decoration_manager";
const PALETTE_MANAGER: &str = "org_kde_kwin_server_decoration_palette_manager";

fn decorate(f: &mut Fixture, manager: ObjectId, surface: ObjectId) -> ObjectId {
    f.create(
        manager,
        org_kde_kwin_server_decoration_manager::REQ_CREATE_OPCODE,
        vec![Argument::Object(Some(surface))],
    )
}

fn palette(f: &mut Fixture, manager: ObjectId, surface: ObjectId) -> ObjectId {
    f.create(
        manager,
        org_kde_kwin_server_decoration_palette_manager::REQ_CREATE_OPCODE,
        vec![Argument::Object(Some(surface))],
    )
}

fn decoration_client(f: &mut Fixture) -> (ClientId, ObjectId, ObjectId) {
    let client = f.add_client();
    let manager = f.bind(client, DECORATION_MANAGER);
    let surface = f.create_surface(client);
    (client, manager, surface)
}

#[test]
fn bind_announces_the_default_mode() {
    let mut f = Fixture::new();
    let (client, manager, _) = decoration_client(&mut f);

    let events = f.events(client);
    let announced = events_of(&events, manager);
    assert_eq!(announced.len(), 1);
    assert_eq!(
        announced[0].opcode,
        org_kde_kwin_server_decoration_manager::EVT_DEFAULT_MODE_OPCODE
    );
    assert_eq!(announced[0].args[0].as_uint(), Some(DecorationMode::Server as u32));
}

#[test]
fn default_mode_changes_are_broadcast() {
    let mut f = Fixture::new();
    let (a, manager_a, _) = decoration_client(&mut f);
    let (b, manager_b, _) = decoration_client(&mut f);
    f.events(a);
    f.events(b);

    f.state.decorations.set_default_mode(DecorationMode::Client);
    f.state.decorations.set_default_mode(DecorationMode::Client);

    for (client, manager) in [(a, manager_a), (b, manager_b)] {
        let events = f.events(client);
        let changes = events_of(&events, manager);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].args[0].as_uint(), Some(DecorationMode::Client as u32));
    }
}

#[test]
fn requested_mode_is_acknowledged() {
    let mut f = Fixture::new();
    let (client, manager, surface) = decoration_client(&mut f);
    let decoration = decorate(&mut f, manager, surface);
    f.events(client);

    f.request(
        decoration,
        org_kde_kwin_server_decoration::REQ_REQUEST_MODE_OPCODE,
        vec![Argument::Uint(DecorationMode::Client as u32)],
    )
    .unwrap();

    let events = f.events(client);
    let mode = events_of(&events, decoration);
    assert_eq!(mode.len(), 1);
    assert_eq!(mode[0].opcode, org_kde_kwin_server_decoration::EVT_MODE_OPCODE);
    assert_eq!(mode[0].args[0].as_uint(), Some(DecorationMode::Client as u32));

    // an unknown mode is not acknowledged
    f.request(
        decoration,
        org_kde_kwin_server_decoration::REQ_REQUEST_MODE_OPCODE,
        vec![Argument::Uint(9)],
    )
    .unwrap();
    assert!(opcodes(&f.events(client), decoration).is_empty());
}

#[test]
fn compositor_can_send_a_mode_to_a_surface() {
    let mut f = Fixture::new();
    let (client, manager, surface) = decoration_client(&mut f);
    let decoration = decorate(&mut f, manager, surface);
    f.events(client);

    let resource = f.surface(surface);
    assert_eq!(
        f.state.decorations.decoration_for(&resource).map(|d| d.id()),
        Some(decoration)
    );
    f.state.decorations.send_mode(&resource, DecorationMode::None);

    assert_eq!(
        opcodes(&f.events(client), decoration),
        vec![org_kde_kwin_server_decoration::EVT_MODE_OPCODE]
    );
}

#[test]
fn one_decoration_per_surface() {
    let mut f = Fixture::new();
    let (client, manager, surface) = decoration_client(&mut f);
    decorate(&mut f, manager, surface);

    let id = f.new_id(client);
    let result = f.request(
        manager,
        org_kde_kwin_server_decoration_manager::REQ_CREATE_OPCODE,
        vec![Argument::NewId(id), Argument::Object(Some(surface))],
    );

    assert!(result.is_ok());
    let errors = f.transport.errors(client);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].object, manager);
}

#[test]
fn released_decoration_can_be_recreated() {
    let mut f = Fixture::new();
    let (client, manager, surface) = decoration_client(&mut f);
    let first = decorate(&mut f, manager, surface);

    f.request(first, org_kde_kwin_server_decoration::REQ_RELEASE_OPCODE, Vec::new())
        .unwrap();
    let resource = f.surface(surface);
    assert!(f.state.decorations.decoration_for(&resource).is_none());

    let second = decorate(&mut f, manager, surface);
    assert!(f.transport.errors(client).is_empty());
    assert_eq!(
        f.state.decorations.decoration_for(&resource).map(|d| d.id()),
        Some(second)
    );
}

#[test]
fn palette_is_stored_per_surface() {
    let mut f = Fixture::new();
    let client = f.add_client();
    let manager = f.bind(client, PALETTE_MANAGER);
    let surface = f.create_surface(client);
    let other = f.create_surface(client);
    let object = palette(&mut f, manager, surface);

    f.request(
        object,
        org_kde_kwin_server_decoration_palette::REQ_SET_PALETTE_OPCODE,
        vec![Argument::Str(Some("Breeze Dark".into()))],
    )
    .unwrap();

    assert_eq!(f.state.palettes_changed, vec!["Breeze Dark".to_owned()]);
    assert_eq!(
        f.state.palettes.palette_for(&f.surface(surface)).as_deref(),
        Some("Breeze Dark")
    );
    assert!(f.state.palettes.palette_for(&f.surface(other)).is_none());

    f.request(object, org_kde_kwin_server_decoration_palette::REQ_RELEASE_OPCODE, Vec::new())
        .unwrap();
    assert!(f.state.palettes.palette_for(&f.surface(surface)).is_none());
    assert!(f.state.palettes.palette_object(&f.surface(surface)).is_none());
}

#[test]
fn palette_for_a_dead_surface_is_inert() {
    let mut f = Fixture::new();
    let client = f.add_client();
    let manager = f.bind(client, PALETTE_MANAGER);
    let surface = f.create_surface(client);
    f.request(surface, wl_surface::REQ_DESTROY_OPCODE, Vec::new()).unwrap();

    let object = palette(&mut f, manager, surface);
    f.request(
        object,
        org_kde_kwin_server_decoration_palette::REQ_SET_PALETTE_OPCODE,
        vec![Argument::Str(Some("Breeze".into()))],
    )
    .unwrap();

    assert!(f.transport.errors(client).is_empty());
    assert!(f.state.palettes_changed.is_empty());
}

#[test]
fn refused_decoration_does_not_take_the_slot() {
    let mut f = Fixture::new();
    let (client, manager, surface) = decoration_client(&mut f);

    // the new id is already taken by the manager
    f.request(
        manager,
        org_kde_kwin_server_decoration_manager::REQ_CREATE_OPCODE,
        vec![Argument::NewId(manager), Argument::Object(Some(surface))],
    )
    .unwrap();

    assert_eq!(f.transport.errors(client).len(), 1);
    assert!(f.state.decorations.decoration_for(&f.surface(surface)).is_none());
    assert!(f.state.new_decorations.is_empty());
}

#[test]
fn one_palette_per_surface() {
    let mut f = Fixture::new();
    let client = f.add_client();
    let manager = f.bind(client, PALETTE_MANAGER);
    let surface = f.create_surface(client);
    let first = palette(&mut f, manager, surface);

    let id = f.new_id(client);
    f.request(
        manager,
        org_kde_kwin_server_decoration_palette_manager::REQ_CREATE_OPCODE,
        vec![Argument::NewId(id), Argument::Object(Some(surface))],
    )
    .unwrap();

    let errors = f.transport.errors(client);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].object, manager);
    assert_eq!(
        f.state.palettes.palette_object(&f.surface(surface)).map(|palette| palette.id()),
        Some(first)
    );
}

#[test]
fn refused_palette_does_not_take_the_slot() {
    let mut f = Fixture::new();
    let client = f.add_client();
    let manager = f.bind(client, PALETTE_MANAGER);
    let surface = f.create_surface(client);

    f.request(
        manager,
        org_kde_kwin_server_decoration_palette_manager::REQ_CREATE_OPCODE,
        vec![Argument::NewId(surface), Argument::Object(Some(surface))],
    )
    .unwrap();

    assert_eq!(f.transport.errors(client).len(), 1);
    assert!(f.state.palettes.palette_object(&f.surface(surface)).is_none());
}
