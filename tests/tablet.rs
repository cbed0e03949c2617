mod common;

use plasma_wayland_server::protocols::tablet_v2::zwp_tablet_seat_v2;
use plasma_wayland_server::protocols::tablet_v2::zwp_tablet_tool_v2::{self, ButtonState, ToolType};
use plasma_wayland_server::protocols::tablet_v2::{zwp_tablet_manager_v2, zwp_tablet_v2};
use plasma_wayland_server::utils::Point;
use plasma_wayland_server::wayland::tablet_manager::{
    TabletDescriptor, TabletHandle, TabletSeatTrait, TabletToolCapabilities, TabletToolDescriptor, TabletToolHandle,
};
use plasma_wayland_server::wayland::{Argument, ClientId, ObjectId};

use common::{events_of, opcodes, Fixture, TestState};

struct TabletClient {
    client: ClientId,
    seat: ObjectId,
    tablet: ObjectId,
    tool: ObjectId,
    surface: ObjectId,
}

fn tablet_desc() -> TabletDescriptor {
    TabletDescriptor {
        name: "Wacom Intuos Pro M".into(),
        usb_id: Some((0x056a, 0x0357)),
        paths: vec!["/dev/input/event12".into()],
    }
}

fn pen_desc() -> TabletToolDescriptor {
    TabletToolDescriptor {
        tool_type: ToolType::Pen,
        hardware_serial: 0x1_0000_0002,
        hardware_id_wacom: 0x802,
        capabilities: TabletToolCapabilities::PRESSURE | TabletToolCapabilities::TILT,
    }
}

fn add_devices(f: &mut Fixture) -> (TabletHandle, TabletToolHandle) {
    let dh = f.dh();
    let tablet_seat = f.state.seat.tablet_seat();
    let tablet = tablet_seat.add_tablet::<TestState>(&dh, &tablet_desc());
    let tool = tablet_seat.add_tool::<TestState>(&dh, &pen_desc());
    (tablet, tool)
}

fn get_tablet_seat(f: &mut Fixture, client: ClientId) -> ObjectId {
    let seat = f.bind(client, "wl_seat");
    let manager = f.bind(client, "zwp_tablet_manager_v2");
    f.create(
        manager,
        zwp_tablet_manager_v2::REQ_GET_TABLET_SEAT_OPCODE,
        vec![Argument::Object(Some(seat))],
    )
}

fn announced(f: &Fixture, client: ClientId, seat: ObjectId, opcode: u16) -> Vec<ObjectId> {
    f.events(client)
        .iter()
        .filter(|event| event.sender_id == seat && event.opcode == opcode)
        .filter_map(|event| event.args[0].as_new_id())
        .collect()
}

/// A client with a tablet seat, which is then told about the tablet and the pen
fn tablet_client(f: &mut Fixture) -> TabletClient {
    let client = f.add_client();
    let seat = get_tablet_seat(f, client);
    let surface = f.create_surface(client);
    f.events(client);
    TabletClient {
        client,
        seat,
        tablet: ObjectId::new(client, 0),
        tool: ObjectId::new(client, 0),
        surface,
    }
}

fn learn_devices(f: &Fixture, clients: &mut [&mut TabletClient]) {
    for c in clients.iter_mut() {
        let events = f.events(c.client);
        let seat = c.seat;
        let of_seat = |opcode| {
            events
                .iter()
                .find(|event| event.sender_id == seat && event.opcode == opcode)
                .and_then(|event| event.args[0].as_new_id())
                .expect("device not announced")
        };
        c.tablet = of_seat(zwp_tablet_seat_v2::EVT_TABLET_ADDED_OPCODE);
        c.tool = of_seat(zwp_tablet_seat_v2::EVT_TOOL_ADDED_OPCODE);
    }
}

#[test]
fn devices_are_described_to_new_tablet_seats() {
    let mut f = Fixture::new();
    add_devices(&mut f);

    let client = f.add_client();
    let seat = get_tablet_seat(&mut f, client);
    let events = f.events(client);

    let tablet = events_of(&events, seat)
        .iter()
        .find(|event| event.opcode == zwp_tablet_seat_v2::EVT_TABLET_ADDED_OPCODE)
        .and_then(|event| event.args[0].as_new_id())
        .expect("tablet not announced");
    let tool = events_of(&events, seat)
        .iter()
        .find(|event| event.opcode == zwp_tablet_seat_v2::EVT_TOOL_ADDED_OPCODE)
        .and_then(|event| event.args[0].as_new_id())
        .expect("tool not announced");

    assert_eq!(
        opcodes(&events, tablet),
        vec![
            zwp_tablet_v2::EVT_NAME_OPCODE,
            zwp_tablet_v2::EVT_ID_OPCODE,
            zwp_tablet_v2::EVT_PATH_OPCODE,
            zwp_tablet_v2::EVT_DONE_OPCODE,
        ]
    );
    let tool_events = events_of(&events, tool);
    assert_eq!(tool_events[0].opcode, zwp_tablet_tool_v2::EVT_TYPE_OPCODE);
    assert_eq!(tool_events[0].args[0].as_uint(), Some(ToolType::Pen as u32));
    assert_eq!(tool_events[1].opcode, zwp_tablet_tool_v2::EVT_HARDWARE_SERIAL_OPCODE);
    assert_eq!(tool_events[1].args[0].as_uint(), Some(1));
    assert_eq!(tool_events[1].args[1].as_uint(), Some(2));
    let capabilities = tool_events
        .iter()
        .filter(|event| event.opcode == zwp_tablet_tool_v2::EVT_CAPABILITY_OPCODE)
        .count();
    assert_eq!(capabilities, 2);
    assert_eq!(
        tool_events.last().map(|event| event.opcode),
        Some(zwp_tablet_tool_v2::EVT_DONE_OPCODE)
    );
}

#[test]
fn adding_the_same_device_twice_returns_the_known_handle() {
    let mut f = Fixture::new();
    let client = f.add_client();
    let seat = get_tablet_seat(&mut f, client);
    f.events(client);

    let (tablet, tool) = add_devices(&mut f);
    let (again_tablet, again_tool) = add_devices(&mut f);

    assert!(tablet == again_tablet);
    assert!(tool == again_tool);
    assert_eq!(f.state.seat.tablet_seat().count_tablets(), 1);
    assert_eq!(f.state.seat.tablet_seat().count_tools(), 1);
    assert_eq!(
        announced(&f, client, seat, zwp_tablet_seat_v2::EVT_TOOL_ADDED_OPCODE).len(),
        1
    );
}

#[test]
fn proximity_goes_to_the_client_of_the_surface() {
    let mut f = Fixture::new();
    let mut a = tablet_client(&mut f);
    let mut b = tablet_client(&mut f);
    let (tablet, tool) = add_devices(&mut f);
    learn_devices(&f, &mut [&mut a, &mut b]);

    let target = f.surface(a.surface);
    tool.proximity_in(&mut f.state, &target, &tablet, 10, 100);

    let events = f.events(a.client);
    let proximity = events_of(&events, a.tool);
    assert_eq!(proximity.len(), 2);
    assert_eq!(proximity[0].opcode, zwp_tablet_tool_v2::EVT_PROXIMITY_IN_OPCODE);
    assert_eq!(proximity[0].args[0].as_uint(), Some(10));
    assert_eq!(proximity[0].args[1].as_object(), Some(a.tablet));
    assert_eq!(proximity[0].args[2].as_object(), Some(a.surface));
    assert_eq!(proximity[1].opcode, zwp_tablet_tool_v2::EVT_FRAME_OPCODE);
    assert!(f.events(b.client).is_empty());

    let target = f.surface(b.surface);
    tool.proximity_in(&mut f.state, &target, &tablet, 11, 110);

    assert_eq!(
        opcodes(&f.events(a.client), a.tool),
        vec![
            zwp_tablet_tool_v2::EVT_PROXIMITY_OUT_OPCODE,
            zwp_tablet_tool_v2::EVT_FRAME_OPCODE,
        ]
    );
    assert_eq!(
        opcodes(&f.events(b.client), b.tool),
        vec![
            zwp_tablet_tool_v2::EVT_PROXIMITY_IN_OPCODE,
            zwp_tablet_tool_v2::EVT_FRAME_OPCODE,
        ]
    );
    assert_eq!(tool.focus().map(|surface| surface.id()), Some(b.surface));
}

#[test]
fn clients_without_the_tool_get_nothing() {
    let mut f = Fixture::new();
    let mut a = tablet_client(&mut f);
    let (tablet, tool) = add_devices(&mut f);
    learn_devices(&f, &mut [&mut a]);

    let plain = f.add_client();
    let surface = f.create_surface(plain);
    f.events(plain);

    let target = f.surface(surface);
    tool.proximity_in(&mut f.state, &target, &tablet, 1, 1);
    tool.motion(Point::from((4.0, 2.0)), 2);

    assert!(!tool.is_client_supported());
    assert!(f.events(plain).is_empty());
    assert!(f.events(a.client).is_empty());
}

#[test]
fn axis_updates_are_framed_with_the_motion() {
    let mut f = Fixture::new();
    let mut a = tablet_client(&mut f);
    let (tablet, tool) = add_devices(&mut f);
    learn_devices(&f, &mut [&mut a]);
    let target = f.surface(a.surface);
    tool.proximity_in(&mut f.state, &target, &tablet, 1, 1);
    f.events(a.client);

    tool.pressure(30000);
    tool.tilt(12.0, -3.5);
    assert!(f.events(a.client).is_empty());

    tool.motion(Point::from((20.0, 40.0)), 5);
    assert_eq!(
        opcodes(&f.events(a.client), a.tool),
        vec![
            zwp_tablet_tool_v2::EVT_MOTION_OPCODE,
            zwp_tablet_tool_v2::EVT_PRESSURE_OPCODE,
            zwp_tablet_tool_v2::EVT_TILT_OPCODE,
            zwp_tablet_tool_v2::EVT_FRAME_OPCODE,
        ]
    );

    tool.tip_down(2, 6);
    assert!(tool.is_down());
    tool.button(0x14b, ButtonState::Pressed, 3, 7);
    assert_eq!(
        opcodes(&f.events(a.client), a.tool),
        vec![
            zwp_tablet_tool_v2::EVT_DOWN_OPCODE,
            zwp_tablet_tool_v2::EVT_FRAME_OPCODE,
            zwp_tablet_tool_v2::EVT_BUTTON_OPCODE,
            zwp_tablet_tool_v2::EVT_FRAME_OPCODE,
        ]
    );

    // leaving while down lifts the tip first
    tool.proximity_out(8);
    assert_eq!(
        opcodes(&f.events(a.client), a.tool),
        vec![
            zwp_tablet_tool_v2::EVT_UP_OPCODE,
            zwp_tablet_tool_v2::EVT_PROXIMITY_OUT_OPCODE,
            zwp_tablet_tool_v2::EVT_FRAME_OPCODE,
        ]
    );
    assert!(!tool.is_down());
    assert!(tool.focus().is_none());
}

#[test]
fn only_the_focused_client_changes_the_cursor() {
    let mut f = Fixture::new();
    let mut a = tablet_client(&mut f);
    let mut b = tablet_client(&mut f);
    let (tablet, tool) = add_devices(&mut f);
    learn_devices(&f, &mut [&mut a, &mut b]);
    let cursor_surface = f.create_surface(a.client);

    let target = f.surface(b.surface);
    tool.proximity_in(&mut f.state, &target, &tablet, 20, 1);

    f.request(
        a.tool,
        zwp_tablet_tool_v2::REQ_SET_CURSOR_OPCODE,
        vec![
            Argument::Uint(19),
            Argument::Object(Some(cursor_surface)),
            Argument::Int(3),
            Argument::Int(4),
        ],
    )
    .unwrap();
    assert!(f.state.cursor_changes.is_empty());
    let stored = tool.cursor_for_client(a.client).expect("no cursor for a");
    assert_eq!(stored.serial, 19);
    assert_eq!(stored.hotspot, Point::from((3, 4)));

    f.request(
        b.tool,
        zwp_tablet_tool_v2::REQ_SET_CURSOR_OPCODE,
        vec![
            Argument::Uint(20),
            Argument::Object(None),
            Argument::Int(0),
            Argument::Int(0),
        ],
    )
    .unwrap();
    assert_eq!(f.state.cursor_changes.len(), 1);
    let (changed_tool, cursor) = &f.state.cursor_changes[0];
    assert!(*changed_tool == tool);
    assert_eq!(cursor.serial, 20);
    assert!(cursor.surface().is_none());
    assert_eq!(tool.current_cursor().map(|cursor| cursor.serial), Some(20));

    // repeating the same cursor is not a change
    f.request(
        b.tool,
        zwp_tablet_tool_v2::REQ_SET_CURSOR_OPCODE,
        vec![
            Argument::Uint(20),
            Argument::Object(None),
            Argument::Int(0),
            Argument::Int(0),
        ],
    )
    .unwrap();
    assert_eq!(f.state.cursor_changes.len(), 1);
}

#[test]
fn removed_devices_stay_until_destroyed() {
    let mut f = Fixture::new();
    let mut a = tablet_client(&mut f);
    add_devices(&mut f);
    learn_devices(&f, &mut [&mut a]);

    let tablet_seat = f.state.seat.tablet_seat();
    tablet_seat.remove_tool(&pen_desc());
    tablet_seat.remove_tablet(&tablet_desc());

    let events = f.events(a.client);
    assert_eq!(opcodes(&events, a.tool), vec![zwp_tablet_tool_v2::EVT_REMOVED_OPCODE]);
    assert_eq!(opcodes(&events, a.tablet), vec![zwp_tablet_v2::EVT_REMOVED_OPCODE]);
    assert_eq!(tablet_seat.count_tools(), 0);
    assert!(tablet_seat.get_tablet(&tablet_desc()).is_none());

    // objects are still valid until the client destroys them
    f.request(a.tool, zwp_tablet_tool_v2::REQ_DESTROY_OPCODE, Vec::new())
        .unwrap();
    f.request(a.tablet, zwp_tablet_v2::REQ_DESTROY_OPCODE, Vec::new())
        .unwrap();
    assert!(f.transport.errors(a.client).is_empty());

    // a later tablet seat does not hear about removed devices
    let late = f.add_client();
    let seat = get_tablet_seat(&mut f, late);
    assert!(announced(&f, late, seat, zwp_tablet_seat_v2::EVT_TOOL_ADDED_OPCODE).is_empty());
}

#[test]
fn entering_a_client_brings_back_its_cursor() {
    let mut f = Fixture::new();
    let mut a = tablet_client(&mut f);
    let mut b = tablet_client(&mut f);
    let (tablet, tool) = add_devices(&mut f);
    learn_devices(&f, &mut [&mut a, &mut b]);
    let cursor_surface = f.create_surface(a.client);

    let target = f.surface(a.surface);
    tool.proximity_in(&mut f.state, &target, &tablet, 30, 1);
    assert!(f.state.cursor_changes.is_empty());

    f.request(
        a.tool,
        zwp_tablet_tool_v2::REQ_SET_CURSOR_OPCODE,
        vec![
            Argument::Uint(30),
            Argument::Object(Some(cursor_surface)),
            Argument::Int(1),
            Argument::Int(2),
        ],
    )
    .unwrap();
    assert_eq!(f.state.cursor_changes.len(), 1);

    // b never set a cursor
    let target = f.surface(b.surface);
    tool.proximity_in(&mut f.state, &target, &tablet, 31, 2);
    assert_eq!(f.state.cursor_changes.len(), 1);

    let target = f.surface(a.surface);
    tool.proximity_in(&mut f.state, &target, &tablet, 32, 3);
    assert_eq!(f.state.cursor_changes.len(), 2);
    let (changed_tool, cursor) = &f.state.cursor_changes[1];
    assert!(*changed_tool == tool);
    assert_eq!(cursor.serial, 30);
    assert_eq!(cursor.surface().map(|surface| surface.id()), Some(cursor_surface));
    assert_eq!(cursor.hotspot, Point::from((1, 2)));
}
