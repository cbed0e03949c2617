mod common;

use std::os::unix::io::AsRawFd;

use drm_fourcc::DrmFourcc;
use plasma_wayland_server::protocols::remote_access::{org_kde_kwin_remote_access_manager, org_kde_kwin_remote_buffer};
use plasma_wayland_server::wayland::remote_access::{BufferHandle, ReadyBuffer, RemoteAccessState};
use plasma_wayland_server::wayland::{Argument, ClientId, ObjectId};

use common::{events_of, opcodes, tmp_fd, Fixture};

fn buffer() -> BufferHandle {
    BufferHandle::new(tmp_fd(), 1920, 1080, 7680, DrmFourcc::Xrgb8888)
}

/// A client bound to the remote access manager and to the output
fn remote_client(f: &mut Fixture) -> (ClientId, ObjectId, ObjectId) {
    let client = f.add_client();
    let output = f.bind(client, "wl_output");
    let manager = f.bind(client, "org_kde_kwin_remote_access_manager");
    f.events(client);
    (client, manager, output)
}

fn get_buffer(f: &mut Fixture, manager: ObjectId, id: i32) -> ObjectId {
    f.create(
        manager,
        org_kde_kwin_remote_access_manager::REQ_GET_BUFFER_OPCODE,
        vec![Argument::Int(id)],
    )
}

#[test]
fn buffer_ready_reaches_clients_with_the_output() {
    let mut f = Fixture::new();
    let (a, manager_a, output_a) = remote_client(&mut f);

    // bound the manager, not the output
    let b = f.add_client();
    let manager_b = f.bind(b, "org_kde_kwin_remote_access_manager");
    f.events(b);

    let output = f.output();
    let buffer = buffer();
    let id = buffer.internal_id();
    RemoteAccessState::send_buffer_ready(&mut f.state, &output, buffer);

    let events = f.events(a);
    let ready = events_of(&events, manager_a);
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].opcode, org_kde_kwin_remote_access_manager::EVT_BUFFER_READY_OPCODE);
    assert_eq!(ready[0].args[0].as_int(), Some(id));
    assert_eq!(ready[0].args[1].as_object(), Some(output_a));

    assert!(opcodes(&f.events(b), manager_b).is_empty());
    assert_eq!(f.state.remote_access.live_buffers(), 1);
    assert!(f.state.released_buffers.is_empty());
}

#[test]
fn buffer_without_receiver_is_released_immediately() {
    let mut f = Fixture::new();
    let output = f.output();
    let buffer = buffer();
    let id = buffer.internal_id();

    RemoteAccessState::send_buffer_ready(&mut f.state, &output, buffer);

    assert_eq!(f.state.released_buffers, vec![id]);
    assert_eq!(f.state.remote_access.live_buffers(), 0);
}

#[test]
fn fetched_buffer_carries_a_duplicated_fd() {
    let mut f = Fixture::new();
    let (a, manager, _) = remote_client(&mut f);

    let output = f.output();
    let buffer = buffer();
    let id = buffer.internal_id();
    RemoteAccessState::send_buffer_ready(&mut f.state, &output, buffer);
    f.events(a);

    let remote = get_buffer(&mut f, manager, id);
    let events = f.events(a);
    let handle = events_of(&events, remote);
    assert_eq!(handle.len(), 1);
    assert_eq!(handle[0].opcode, org_kde_kwin_remote_buffer::EVT_GBM_HANDLE_OPCODE);
    let fd = handle[0].args[0].as_fd().expect("no fd");
    assert_ne!(fd.as_raw_fd(), id);
    assert_eq!(handle[0].args[1].as_uint(), Some(1920));
    assert_eq!(handle[0].args[2].as_uint(), Some(1080));
    assert_eq!(handle[0].args[3].as_uint(), Some(7680));
    assert_eq!(handle[0].args[4].as_uint(), Some(DrmFourcc::Xrgb8888 as u32));
    assert!(f.state.released_buffers.is_empty());
}

#[test]
fn buffer_is_released_once_every_client_is_done() {
    let mut f = Fixture::new();
    let (a, manager_a, _) = remote_client(&mut f);
    let (b, _, _) = remote_client(&mut f);

    let output = f.output();
    let buffer = buffer();
    let id = buffer.internal_id();
    RemoteAccessState::send_buffer_ready(&mut f.state, &output, buffer);
    f.events(a);
    f.events(b);

    let remote = get_buffer(&mut f, manager_a, id);
    f.request(remote, org_kde_kwin_remote_buffer::REQ_RELEASE_OPCODE, Vec::new())
        .unwrap();
    assert!(f.state.released_buffers.is_empty());
    assert_eq!(f.state.remote_access.live_buffers(), 1);

    // b never fetched it
    f.disconnect(b);
    assert_eq!(f.state.released_buffers, vec![id]);
    assert_eq!(f.state.remote_access.live_buffers(), 0);

    f.disconnect(a);
    assert_eq!(f.state.released_buffers, vec![id]);
}

#[test]
fn disconnect_releases_fetched_buffers() {
    let mut f = Fixture::new();
    let (a, manager, _) = remote_client(&mut f);

    let output = f.output();
    let buffer = buffer();
    let id = buffer.internal_id();
    RemoteAccessState::send_buffer_ready(&mut f.state, &output, buffer);
    get_buffer(&mut f, manager, id);

    f.disconnect(a);
    assert_eq!(f.state.released_buffers, vec![id]);
}

#[test]
fn unknown_buffer_is_a_protocol_error() {
    let mut f = Fixture::new();
    let (a, manager, _) = remote_client(&mut f);

    get_buffer(&mut f, manager, 4242);

    let errors = f.transport.errors(a);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].object, manager);
    assert!(errors[0].message.contains("4242"));
}

#[test]
fn channel_buffers_for_unknown_outputs_are_released() {
    let mut f = Fixture::new();
    let (a, manager, _) = remote_client(&mut f);

    let known = buffer();
    let known_id = known.internal_id();
    RemoteAccessState::handle_ready_buffer(
        &mut f.state,
        calloop::channel::Event::Msg(ReadyBuffer {
            output_name: "DP-1".into(),
            buffer: known,
        }),
    );
    let unknown = buffer();
    let unknown_id = unknown.internal_id();
    RemoteAccessState::handle_ready_buffer(
        &mut f.state,
        calloop::channel::Event::Msg(ReadyBuffer {
            output_name: "HDMI-A-1".into(),
            buffer: unknown,
        }),
    );

    let events = f.events(a);
    let ready = events_of(&events, manager);
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].args[0].as_int(), Some(known_id));
    assert_eq!(f.state.released_buffers, vec![unknown_id]);
}

#[test]
fn refused_buffer_wrapper_drops_its_reference() {
    let mut f = Fixture::new();
    let (a, manager, _) = remote_client(&mut f);

    let output = f.output();
    let buffer = buffer();
    let id = buffer.internal_id();
    RemoteAccessState::send_buffer_ready(&mut f.state, &output, buffer);
    f.events(a);

    // the new id is already taken by the manager
    f.request(
        manager,
        org_kde_kwin_remote_access_manager::REQ_GET_BUFFER_OPCODE,
        vec![Argument::NewId(manager), Argument::Int(id)],
    )
    .unwrap();

    assert_eq!(f.transport.errors(a).len(), 1);
    assert_eq!(f.state.released_buffers, vec![id]);
    assert_eq!(f.state.remote_access.live_buffers(), 0);

    f.disconnect(a);
    assert_eq!(f.state.released_buffers, vec![id]);
}
