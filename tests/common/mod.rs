#![allow(dead_code)]

use std::os::unix::io::OwnedFd;

use plasma_wayland_server::protocols::plasma_window_management::org_kde_plasma_window::State as WindowState;
use plasma_wayland_server::protocols::plasma_window_management::org_kde_plasma_window_management::ShowDesktop;
use plasma_wayland_server::protocols::server_decoration::{
    org_kde_kwin_server_decoration::OrgKdeKwinServerDecoration, DecorationMode,
};
use plasma_wayland_server::protocols::wayland_core::{wl_compositor, wl_surface::WlSurface};
use plasma_wayland_server::wayland::compositor::{CompositorHandler, CompositorState};
use plasma_wayland_server::wayland::output::{Output, PhysicalProperties};
use plasma_wayland_server::wayland::plasma_virtual_desktop::{
    PlasmaVirtualDesktop, PlasmaVirtualDesktopHandler, PlasmaVirtualDesktopState,
};
use plasma_wayland_server::wayland::plasma_window_management::{
    PlasmaWindow, PlasmaWindowManagementHandler, PlasmaWindowManagementState,
};
use plasma_wayland_server::wayland::remote_access::{BufferHandle, RemoteAccessHandler, RemoteAccessState};
use plasma_wayland_server::wayland::seat::{Seat, SeatHandler, SeatState};
use plasma_wayland_server::wayland::shell::kde::decoration::{KdeDecorationHandler, KdeDecorationState};
use plasma_wayland_server::wayland::shell::kde::palette::{KdePaletteHandler, KdePaletteState};
use plasma_wayland_server::wayland::tablet_manager::{
    TabletCursor, TabletManagerState, TabletToolHandle, TabletToolHandler,
};
use plasma_wayland_server::wayland::text_input::{TextInputHandler, TextInputManagerState, TextInputRevision};
use plasma_wayland_server::wayland::{
    Argument, ClientCredentials, ClientId, DispatchError, Display, DisplayHandle, MemoryTransport, Message,
    ObjectId, Resource,
};
use plasma_wayland_server::{
    delegate_compositor, delegate_kde_decoration, delegate_kde_palette, delegate_output,
    delegate_plasma_virtual_desktop, delegate_plasma_window_management, delegate_remote_access, delegate_seat,
    delegate_tablet_manager, delegate_text_input,
};

/// What the compositor was told by the text input handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInputNotification {
    EnabledChanged(TextInputRevision),
    EnableRequested(TextInputRevision),
    ContentType(TextInputRevision),
    CursorRectangle(TextInputRevision),
    SurroundingText(TextInputRevision),
    PreferredLanguage(TextInputRevision),
    Panel(TextInputRevision, bool),
    Committed(TextInputRevision, u32),
}

pub struct TestState {
    pub compositor: CompositorState,
    pub seats: SeatState,
    pub seat: Seat,
    pub windows: PlasmaWindowManagementState,
    pub desktops: PlasmaVirtualDesktopState,
    pub decorations: KdeDecorationState,
    pub palettes: KdePaletteState,
    pub text_input: TextInputManagerState,
    pub tablets: TabletManagerState,
    pub remote_access: RemoteAccessState,
    pub outputs: Vec<Output>,

    pub released_buffers: Vec<i32>,
    pub cursor_changes: Vec<(TabletToolHandle, TabletCursor)>,
    pub minimized_changes: Vec<u32>,
    pub state_requests: Vec<(u32, WindowState, bool)>,
    pub closed_windows: Vec<u32>,
    pub text_input_notifications: Vec<TextInputNotification>,
    pub palettes_changed: Vec<String>,
    pub new_decorations: Vec<ObjectId>,
    pub destroyed_surfaces: Vec<ObjectId>,
}

impl CompositorHandler for TestState {
    fn compositor_state(&mut self) -> &mut CompositorState {
        &mut self.compositor
    }

    fn surface_destroyed(&mut self, surface: &Resource<WlSurface>) {
        self.destroyed_surfaces.push(surface.id());
    }
}

impl SeatHandler for TestState {
    fn seat_state(&mut self) -> &mut SeatState {
        &mut self.seats
    }
}

impl PlasmaWindowManagementHandler for TestState {
    fn plasma_window_management_state(&mut self) -> &mut PlasmaWindowManagementState {
        &mut self.windows
    }

    fn request_state_change(&mut self, window: &PlasmaWindow, flag: WindowState, enabled: bool) {
        self.state_requests.push((window.internal_id(), flag, enabled));
    }

    fn minimized_geometries_changed(&mut self, window: &PlasmaWindow) {
        self.minimized_changes.push(window.internal_id());
    }

    fn close_requested(&mut self, window: &PlasmaWindow) {
        self.closed_windows.push(window.internal_id());
    }
}

impl PlasmaVirtualDesktopHandler for TestState {
    fn plasma_virtual_desktop_state(&mut self) -> &mut PlasmaVirtualDesktopState {
        &mut self.desktops
    }

    fn activate_requested(&mut self, desktop: &PlasmaVirtualDesktop) {
        for other in self.desktops.desktops() {
            other.set_active(other == *desktop);
        }
        self.desktops.send_done();
    }
}

impl KdeDecorationHandler for TestState {
    fn kde_decoration_state(&mut self) -> &mut KdeDecorationState {
        &mut self.decorations
    }

    fn new_decoration(&mut self, _surface: &Resource<WlSurface>, decoration: &Resource<OrgKdeKwinServerDecoration>) {
        self.new_decorations.push(decoration.id());
    }
}

impl KdePaletteHandler for TestState {
    fn kde_palette_state(&mut self) -> &mut KdePaletteState {
        &mut self.palettes
    }

    fn palette_changed(&mut self, _surface: &Resource<WlSurface>, palette: &str) {
        self.palettes_changed.push(palette.to_owned());
    }
}

impl TextInputHandler for TestState {
    fn text_input_enabled_changed(&mut self, _seat: &Seat, revision: TextInputRevision) {
        self.text_input_notifications
            .push(TextInputNotification::EnabledChanged(revision));
    }

    fn text_input_enable_requested(&mut self, _seat: &Seat, revision: TextInputRevision) {
        self.text_input_notifications
            .push(TextInputNotification::EnableRequested(revision));
    }

    fn text_input_content_type_changed(&mut self, _seat: &Seat, revision: TextInputRevision) {
        self.text_input_notifications
            .push(TextInputNotification::ContentType(revision));
    }

    fn text_input_cursor_rectangle_changed(&mut self, _seat: &Seat, revision: TextInputRevision) {
        self.text_input_notifications
            .push(TextInputNotification::CursorRectangle(revision));
    }

    fn text_input_surrounding_text_changed(&mut self, _seat: &Seat, revision: TextInputRevision) {
        self.text_input_notifications
            .push(TextInputNotification::SurroundingText(revision));
    }

    fn text_input_preferred_language_changed(&mut self, _seat: &Seat, revision: TextInputRevision) {
        self.text_input_notifications
            .push(TextInputNotification::PreferredLanguage(revision));
    }

    fn text_input_panel_requested(&mut self, _seat: &Seat, revision: TextInputRevision, visible: bool) {
        self.text_input_notifications
            .push(TextInputNotification::Panel(revision, visible));
    }

    fn text_input_state_committed(&mut self, _seat: &Seat, revision: TextInputRevision, serial: u32) {
        self.text_input_notifications
            .push(TextInputNotification::Committed(revision, serial));
    }
}

impl TabletToolHandler for TestState {
    fn tablet_tool_cursor_changed(&mut self, tool: &TabletToolHandle, cursor: &TabletCursor) {
        self.cursor_changes.push((tool.clone(), cursor.clone()));
    }
}

impl RemoteAccessHandler for TestState {
    fn remote_access_state(&mut self) -> &mut RemoteAccessState {
        &mut self.remote_access
    }

    fn remote_access_output(&self, name: &str) -> Option<Output> {
        self.outputs.iter().find(|output| output.name() == name).cloned()
    }

    fn buffer_released(&mut self, buffer: BufferHandle) {
        self.released_buffers.push(buffer.internal_id());
    }
}

delegate_compositor!(TestState);
delegate_seat!(TestState);
delegate_output!(TestState);
delegate_plasma_window_management!(TestState);
delegate_plasma_virtual_desktop!(TestState);
delegate_kde_decoration!(TestState);
delegate_kde_palette!(TestState);
delegate_text_input!(TestState);
delegate_tablet_manager!(TestState);
delegate_remote_access!(TestState);

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A display with every global of the crate, and a way to play clients against it
pub struct Fixture {
    pub display: Display<TestState>,
    pub state: TestState,
    pub transport: MemoryTransport,
    next_id: u32,
}

impl Fixture {
    pub fn new() -> Fixture {
        init_logging();

        let transport = MemoryTransport::new();
        let display = Display::<TestState>::new(transport.clone());
        let dh = display.handle();

        let mut seats = SeatState::new();
        let seat = seats.new_wl_seat::<TestState>(&dh, "seat0");
        let output = Output::new("DP-1", PhysicalProperties::default());
        output.create_global::<TestState>(&dh);

        let state = TestState {
            compositor: CompositorState::new::<TestState>(&dh),
            seats,
            seat,
            windows: PlasmaWindowManagementState::new::<TestState>(&dh, ShowDesktop::Disabled),
            desktops: PlasmaVirtualDesktopState::new::<TestState>(&dh),
            decorations: KdeDecorationState::new::<TestState>(&dh, DecorationMode::Server),
            palettes: KdePaletteState::new::<TestState>(&dh),
            text_input: TextInputManagerState::new::<TestState>(&dh),
            tablets: TabletManagerState::new::<TestState>(&dh),
            remote_access: RemoteAccessState::new::<TestState>(&dh),
            outputs: vec![output],

            released_buffers: Vec::new(),
            cursor_changes: Vec::new(),
            minimized_changes: Vec::new(),
            state_requests: Vec::new(),
            closed_windows: Vec::new(),
            text_input_notifications: Vec::new(),
            palettes_changed: Vec::new(),
            new_decorations: Vec::new(),
            destroyed_surfaces: Vec::new(),
        };

        Fixture {
            display,
            state,
            transport,
            next_id: 1,
        }
    }

    pub fn dh(&self) -> DisplayHandle {
        self.display.handle()
    }

    pub fn output(&self) -> Output {
        self.state.outputs[0].clone()
    }

    pub fn add_client(&mut self) -> ClientId {
        self.add_client_with(ClientCredentials::default())
    }

    pub fn add_client_with(&mut self, credentials: ClientCredentials) -> ClientId {
        self.display.create_client(credentials)
    }

    /// A fresh client-side object id
    pub fn new_id(&mut self, client: ClientId) -> ObjectId {
        self.next_id += 1;
        ObjectId::new(client, self.next_id)
    }

    /// Bind the global implementing `interface` at its highest version
    pub fn bind(&mut self, client: ClientId, interface: &str) -> ObjectId {
        let version = self
            .transport
            .global_named(client, interface)
            .unwrap_or_else(|| panic!("{interface} is not advertised"))
            .version;
        self.bind_version(client, interface, version)
    }

    pub fn bind_version(&mut self, client: ClientId, interface: &str, version: u32) -> ObjectId {
        let name = self
            .transport
            .global_named(client, interface)
            .unwrap_or_else(|| panic!("{interface} is not advertised"))
            .id
            .name();
        let id = self.new_id(client);
        self.display
            .bind(&mut self.state, client, name, interface, version, id.protocol_id())
            .expect("bind failed")
    }

    pub fn request(&mut self, object: ObjectId, opcode: u16, args: Vec<Argument>) -> Result<(), DispatchError> {
        self.display.dispatch_request(
            &mut self.state,
            Message {
                sender_id: object,
                opcode,
                args: args.into_iter().collect(),
            },
        )
    }

    /// Send a request creating a new object as its first argument
    pub fn create(&mut self, object: ObjectId, opcode: u16, mut args: Vec<Argument>) -> ObjectId {
        let id = self.new_id(object.client_id());
        args.insert(0, Argument::NewId(id));
        self.request(object, opcode, args).expect("request failed");
        id
    }

    pub fn create_surface(&mut self, client: ClientId) -> ObjectId {
        let compositor = self.bind(client, "wl_compositor");
        self.create(compositor, wl_compositor::REQ_CREATE_SURFACE_OPCODE, Vec::new())
    }

    pub fn surface(&self, id: ObjectId) -> Resource<WlSurface> {
        self.dh().get_object::<WlSurface>(id).expect("dead surface")
    }

    pub fn events(&self, client: ClientId) -> Vec<Message> {
        self.transport.take_events(client)
    }

    pub fn disconnect(&mut self, client: ClientId) {
        self.display.disconnect(&mut self.state, client);
    }
}

/// Opcodes of the events sent by `object`, in order
pub fn opcodes(events: &[Message], object: ObjectId) -> Vec<u16> {
    events
        .iter()
        .filter(|event| event.sender_id == object)
        .map(|event| event.opcode)
        .collect()
}

/// The events sent by `object`
pub fn events_of(events: &[Message], object: ObjectId) -> Vec<&Message> {
    events.iter().filter(|event| event.sender_id == object).collect()
}

/// A real file descriptor
pub fn tmp_fd() -> OwnedFd {
    OwnedFd::from(tempfile::tempfile().expect("tempfile"))
}
