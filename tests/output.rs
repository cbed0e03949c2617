mod common;

use plasma_wayland_server::protocols::outputdevice::org_kde_kwin_outputdevice;
use plasma_wayland_server::protocols::wayland_core::wl_output::{self, Transform};
use plasma_wayland_server::protocols::wayland_core::wl_surface;
use plasma_wayland_server::utils::Point;
use plasma_wayland_server::wayland::output::{Mode, ModeFlags, OutputDevice, OutputError};

use common::{events_of, opcodes, Fixture, TestState};

#[test]
fn binding_replays_modes_with_the_current_one_last() {
    let mut f = Fixture::new();
    let output = f.output();
    output.add_mode(Mode::new((1920, 1080), 60000).with_flags(ModeFlags::PREFERRED));
    output.add_mode(Mode::new((1280, 720), 60000));
    output.set_current_mode((1280, 720).into(), 60000).unwrap();

    let client = f.add_client();
    let id = f.bind(client, "wl_output");
    let events = f.events(client);

    assert_eq!(
        opcodes(&events, id),
        vec![
            wl_output::EVT_GEOMETRY_OPCODE,
            wl_output::EVT_MODE_OPCODE,
            wl_output::EVT_MODE_OPCODE,
            wl_output::EVT_SCALE_OPCODE,
            wl_output::EVT_DONE_OPCODE,
        ]
    );
    let modes = events_of(&events, id);
    assert_eq!(modes[1].args[0].as_uint(), Some(wl_output::Mode::PREFERRED.bits()));
    assert_eq!(modes[1].args[1].as_int(), Some(1920));
    assert_eq!(modes[2].args[0].as_uint(), Some(wl_output::Mode::CURRENT.bits()));
    assert_eq!(modes[2].args[1].as_int(), Some(1280));
}

#[test]
fn changes_reach_every_client_once() {
    let mut f = Fixture::new();
    let output = f.output();
    let a = f.add_client();
    let b = f.add_client();
    let output_a = f.bind(a, "wl_output");
    let output_b = f.bind(b, "wl_output");
    f.events(a);
    f.events(b);

    output.set_scale(2);
    output.set_scale(2);
    output.change_geometry(Point::from((1920, 0)), Transform::_90);

    for (client, id) in [(a, output_a), (b, output_b)] {
        let events = f.events(client);
        assert_eq!(
            opcodes(&events, id),
            vec![
                wl_output::EVT_SCALE_OPCODE,
                wl_output::EVT_DONE_OPCODE,
                wl_output::EVT_GEOMETRY_OPCODE,
                wl_output::EVT_DONE_OPCODE,
            ]
        );
        let geometry = events_of(&events, id)[2];
        assert_eq!(geometry.args[0].as_int(), Some(1920));
        assert_eq!(geometry.args[1].as_int(), Some(0));
    }
    assert_eq!(output.scale(), 2);
    assert_eq!(output.location(), Point::from((1920, 0)));
}

#[test]
fn version_one_clients_get_no_scale_or_done() {
    let mut f = Fixture::new();
    let output = f.output();
    let client = f.add_client();
    let id = f.bind_version(client, "wl_output", 1);
    f.events(client);

    output.set_scale(3);
    assert!(opcodes(&f.events(client), id).is_empty());

    output.change_geometry(Point::from((0, 1080)), Transform::Normal);
    assert_eq!(opcodes(&f.events(client), id), vec![wl_output::EVT_GEOMETRY_OPCODE]);
}

#[test]
fn unknown_mode_is_refused() {
    let f = Fixture::new();
    let output = f.output();
    output.add_mode(Mode::new((1920, 1080), 60000));

    let result = output.set_current_mode((800, 600).into(), 60000);

    assert!(matches!(result, Err(OutputError::UnknownMode { .. })));
    assert_eq!(output.current_mode().map(|mode| mode.size), Some((1920, 1080).into()));
}

#[test]
fn readding_a_mode_only_updates_its_flags() {
    let mut f = Fixture::new();
    let output = f.output();
    output.add_mode(Mode::new((1920, 1080), 60000));
    output.add_mode(Mode::new((2560, 1440), 60000));

    let client = f.add_client();
    let id = f.bind(client, "wl_output");
    f.events(client);

    output.add_mode(Mode::new((1920, 1080), 60000));
    assert!(f.events(client).is_empty());

    output.add_mode(Mode::new((2560, 1440), 60000).with_flags(ModeFlags::PREFERRED));
    assert_eq!(output.modes().len(), 2);
    assert_eq!(
        output.preferred_mode().map(|mode| mode.size),
        Some((2560, 1440).into())
    );
    assert_eq!(
        opcodes(&f.events(client), id),
        vec![
            wl_output::EVT_MODE_OPCODE,
            wl_output::EVT_MODE_OPCODE,
            wl_output::EVT_DONE_OPCODE,
        ]
    );
}

#[test]
fn surfaces_enter_through_their_own_client_bindings() {
    let mut f = Fixture::new();
    let output = f.output();
    let a = f.add_client();
    let b = f.add_client();
    let output_a = f.bind(a, "wl_output");
    f.bind(b, "wl_output");
    let surface = f.create_surface(a);
    f.events(a);
    f.events(b);

    output.enter(&f.surface(surface));

    let events = f.events(a);
    let enter = events_of(&events, surface);
    assert_eq!(enter.len(), 1);
    assert_eq!(enter[0].opcode, wl_surface::EVT_ENTER_OPCODE);
    assert_eq!(enter[0].args[0].as_object(), Some(output_a));
    assert!(f.events(b).is_empty());
}

#[test]
fn output_device_replays_its_state() {
    let mut f = Fixture::new();
    let device = OutputDevice::new("1234-abcd");
    device.add_mode(Mode::new((1920, 1080), 60000).with_id(0));
    device.add_mode(Mode::new((1280, 1024), 75000).with_id(1));
    device.set_edid(b"EDID".to_vec());
    device.create_global::<TestState>(&f.dh());

    let client = f.add_client();
    let id = f.bind(client, "org_kde_kwin_outputdevice");
    let events = f.events(client);

    assert_eq!(
        opcodes(&events, id),
        vec![
            org_kde_kwin_outputdevice::EVT_GEOMETRY_OPCODE,
            org_kde_kwin_outputdevice::EVT_MODE_OPCODE,
            org_kde_kwin_outputdevice::EVT_MODE_OPCODE,
            org_kde_kwin_outputdevice::EVT_SCALEF_OPCODE,
            org_kde_kwin_outputdevice::EVT_EDID_OPCODE,
            org_kde_kwin_outputdevice::EVT_ENABLED_OPCODE,
            org_kde_kwin_outputdevice::EVT_UUID_OPCODE,
            org_kde_kwin_outputdevice::EVT_SERIAL_NUMBER_OPCODE,
            org_kde_kwin_outputdevice::EVT_EISA_ID_OPCODE,
            org_kde_kwin_outputdevice::EVT_DONE_OPCODE,
        ]
    );
    let all = events_of(&events, id);
    // the current mode comes last, with its id
    assert_eq!(all[2].args[4].as_int(), Some(0));
    assert_eq!(all[4].args[0].as_str(), Some("RURJRA=="));
    assert_eq!(all[6].args[0].as_str(), Some("1234-abcd"));
}

#[test]
fn output_device_changes_end_with_done() {
    let mut f = Fixture::new();
    let device = OutputDevice::new("1234-abcd");
    device.add_mode(Mode::new((1920, 1080), 60000).with_id(0));
    device.add_mode(Mode::new((1280, 1024), 75000).with_id(1));
    device.create_global::<TestState>(&f.dh());

    let client = f.add_client();
    let current = f.bind(client, "org_kde_kwin_outputdevice");
    let old = f.bind_version(client, "org_kde_kwin_outputdevice", 1);
    f.events(client);

    device.set_scale(1.5);
    device.set_enabled(true);
    device.set_current_mode(1).unwrap();
    assert!(matches!(device.set_current_mode(7), Err(OutputError::UnknownModeId(7))));

    let events = f.events(client);
    assert_eq!(
        opcodes(&events, current),
        vec![
            org_kde_kwin_outputdevice::EVT_SCALEF_OPCODE,
            org_kde_kwin_outputdevice::EVT_DONE_OPCODE,
            org_kde_kwin_outputdevice::EVT_MODE_OPCODE,
            org_kde_kwin_outputdevice::EVT_MODE_OPCODE,
            org_kde_kwin_outputdevice::EVT_DONE_OPCODE,
        ]
    );
    let scale = events_of(&events, old);
    assert_eq!(scale[0].opcode, org_kde_kwin_outputdevice::EVT_SCALE_OPCODE);
    assert_eq!(scale[0].args[0].as_int(), Some(2));
    assert_eq!(device.current_mode().map(|mode| mode.id), Some(1));
}

#[test]
fn mode_ids_cannot_be_reused_for_another_mode() {
    let f = Fixture::new();
    let device = OutputDevice::new("1234-abcd");
    device.create_global::<TestState>(&f.dh());
    device.add_mode(Mode::new((1920, 1080), 60000).with_id(0));

    device.add_mode(Mode::new((640, 480), 60000).with_id(0));

    assert_eq!(device.modes().len(), 1);
    assert_eq!(device.modes()[0].size, (1920, 1080).into());
}
