mod common;

use std::cell::Cell;

use plasma_wayland_server::protocols::wayland_core::{wl_compositor, wl_output::WlOutput, wl_surface};
use plasma_wayland_server::utils::IsAlive;
use plasma_wayland_server::wayland::{
    Argument, BindError, ClientCredentials, CoreError, DispatchError, ObjectId, ResourceSet, RestrictedInterfaces,
};

use common::Fixture;

const WM: &str = "org_kde_plasma_window_management";

fn global_name(f: &Fixture, interface: &str) -> u32 {
    f.dh()
        .globals()
        .into_iter()
        .find(|global| global.interface == interface)
        .map(|global| global.id.name())
        .expect("no such global")
}

#[test]
fn every_global_is_advertised() {
    let mut f = Fixture::new();
    let client = f.add_client();

    let advertised: Vec<&str> = f
        .transport
        .globals(client)
        .iter()
        .map(|global| global.interface)
        .collect();
    for interface in [
        "wl_compositor",
        "wl_seat",
        "wl_output",
        WM,
        "org_kde_plasma_virtual_desktop_management",
        "org_kde_kwin_server_decoration_manager",
        "org_kde_kwin_server_decoration_palette_manager",
        "zwp_text_input_manager_v2",
        "zwp_text_input_manager_v3",
        "zwp_tablet_manager_v2",
        "org_kde_kwin_remote_access_manager",
    ] {
        assert!(advertised.contains(&interface), "{interface} missing");
    }
}

#[test]
fn restricted_globals_need_a_grant() {
    let mut f = Fixture::new();
    f.display.set_global_filter(RestrictedInterfaces::default());

    let stranger = f.add_client_with(ClientCredentials {
        pid: Some(1),
        ..Default::default()
    });
    let granted = f.add_client_with(ClientCredentials {
        pid: Some(2),
        granted_interfaces: vec![WM.into()],
        ..Default::default()
    });

    assert!(f.transport.global_named(stranger, WM).is_none());
    assert!(f.transport.global_named(stranger, "wl_output").is_some());
    assert!(f.transport.global_named(granted, WM).is_some());
    assert!(f
        .transport
        .global_named(granted, "org_kde_kwin_remote_access_manager")
        .is_none());

    let name = global_name(&f, WM);
    let result = f.display.bind(&mut f.state, stranger, name, WM, 1, 2);
    assert!(matches!(result, Err(BindError::Hidden(n)) if n == name));
    let errors = f.transport.errors(stranger);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].object.protocol_id(), 1);
    assert_eq!(errors[0].code, CoreError::InvalidObject as u32);

    f.bind(granted, WM);
    assert!(f.transport.errors(granted).is_empty());
}

#[test]
fn binding_the_wrong_interface_fails() {
    let mut f = Fixture::new();
    let client = f.add_client();
    let name = global_name(&f, "wl_output");

    let result = f.display.bind(&mut f.state, client, name, "wl_seat", 1, 2);

    assert!(matches!(result, Err(BindError::InterfaceMismatch { .. })));
    assert_eq!(f.transport.errors(client)[0].code, CoreError::InvalidMethod as u32);
    assert!(!f.dh().is_client_active(client));
}

#[test]
fn bound_version_is_clamped_to_the_global() {
    let mut f = Fixture::new();
    let client = f.add_client();

    let output = f.bind_version(client, "wl_output", 99);
    let old = f.bind_version(client, "wl_output", 1);

    assert_eq!(f.dh().get_object::<WlOutput>(output).unwrap().version(), 3);
    assert_eq!(f.dh().get_object::<WlOutput>(old).unwrap().version(), 1);
}

#[test]
fn unknown_object_is_a_protocol_error() {
    let mut f = Fixture::new();
    let client = f.add_client();
    let compositor = f.bind(client, "wl_compositor");

    let ghost = ObjectId::new(client, 777);
    let result = f.request(ghost, 0, Vec::new());
    assert!(matches!(result, Err(DispatchError::InvalidObject(id)) if id == ghost));
    assert_eq!(f.transport.errors(client).len(), 1);

    // the client is dead for the display from now on
    let result = f.request(
        compositor,
        wl_compositor::REQ_CREATE_SURFACE_OPCODE,
        vec![Argument::NewId(ObjectId::new(client, 50))],
    );
    assert!(matches!(result, Err(DispatchError::ClientGone(_))));
    assert!(f.state.compositor.surfaces().is_empty());
}

#[test]
fn malformed_request_is_posted_on_the_object() {
    let mut f = Fixture::new();
    let client = f.add_client();
    let compositor = f.bind(client, "wl_compositor");

    let result = f.request(
        compositor,
        wl_compositor::REQ_CREATE_SURFACE_OPCODE,
        vec![Argument::Uint(3)],
    );

    assert!(matches!(result, Err(DispatchError::BadArgument { .. })));
    let errors = f.transport.errors(client);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].object, compositor);
}

#[test]
fn disconnect_destroys_every_object() {
    let mut f = Fixture::new();
    let client = f.add_client();
    let surface = f.create_surface(client);
    let other = f.add_client();
    let kept = f.create_surface(other);

    f.disconnect(client);

    assert_eq!(f.state.destroyed_surfaces, vec![surface]);
    assert!(f.dh().get_object::<wl_surface::WlSurface>(surface).is_err());
    assert!(f.dh().get_object::<wl_surface::WlSurface>(kept).is_ok());
    assert_eq!(f.dh().clients(), vec![other]);

    let result = f.request(surface, wl_surface::REQ_DESTROY_OPCODE, Vec::new());
    assert!(matches!(result, Err(DispatchError::ClientGone(_))));
}

#[test]
fn server_side_destruction_runs_handlers_when_dispatching() {
    let mut f = Fixture::new();
    let client = f.add_client();
    let id = f.create_surface(client);
    let surface = f.surface(id);

    f.dh().destroy_object(&surface);
    assert!(!surface.alive());
    assert!(f.dh().get_object::<wl_surface::WlSurface>(id).is_err());
    assert!(f.state.destroyed_surfaces.is_empty());

    f.display.dispatch_pending(&mut f.state);
    assert_eq!(f.state.destroyed_surfaces, vec![id]);
    assert_eq!(f.transport.destroyed_objects(client), vec![id]);
}

#[test]
fn broadcast_skips_resources_destroyed_meanwhile() {
    let mut f = Fixture::new();
    let a = f.add_client();
    let b = f.add_client();
    let output_a = f.bind(a, "wl_output");
    let output_b = f.bind(b, "wl_output");
    let dh = f.dh();

    let set = ResourceSet::<WlOutput>::new();
    set.insert(&dh.get_object::<WlOutput>(output_a).unwrap());
    let victim = dh.get_object::<WlOutput>(output_b).unwrap();
    set.insert(&victim);

    let visited = Cell::new(0);
    set.broadcast(|output| {
        visited.set(visited.get() + 1);
        if output.id() == output_a {
            dh.destroy_object(&victim);
        }
    });

    assert_eq!(visited.get(), 1);
    assert_eq!(set.len(), 1);
    assert!(set.first_for_client(b).is_none());
    f.display.dispatch_pending(&mut f.state);
}

#[test]
fn serials_increase() {
    let f = Fixture::new();
    let dh = f.dh();

    let first = dh.next_serial();
    let second = dh.next_serial();

    assert!(second > first);
    assert!(second.is_no_older_than(&first));
}

#[test]
fn shutdown_disconnects_everyone() {
    let mut f = Fixture::new();
    let a = f.add_client();
    let b = f.add_client();
    let surface_a = f.create_surface(a);
    let surface_b = f.create_surface(b);

    f.display.shutdown(&mut f.state);

    assert!(f.dh().clients().is_empty());
    assert_eq!(f.state.destroyed_surfaces.len(), 2);
    assert!(f.state.destroyed_surfaces.contains(&surface_a));
    assert!(f.state.destroyed_surfaces.contains(&surface_b));
}
