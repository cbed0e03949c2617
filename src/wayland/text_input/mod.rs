//! Text input
//!
//! Two revisions of the text input protocol are supported, `zwp_text_input_v2` and
//! `zwp_text_input_v3`. Both are handled per [`Seat`]: the handle of a revision is
//! stored in the user data of the seat and reached through [`TextInputSeatTrait`].
//!
//! The input method side of the compositor drives both revisions through the
//! [`TextInput`] trait, requests of the clients end up in the [`TextInputHandler`].
//!
//! ```
//! use plasma_wayland_server::{delegate_seat, delegate_text_input};
//! use plasma_wayland_server::wayland::seat::{SeatHandler, SeatState};
//! use plasma_wayland_server::wayland::text_input::{TextInput, TextInputHandler, TextInputManagerState, TextInputSeatTrait};
//! use plasma_wayland_server::wayland::{Display, MemoryTransport};
//!
//! struct State {
//!     seats: SeatState,
//! }
//!
//! impl SeatHandler for State {
//!     fn seat_state(&mut self) -> &mut SeatState {
//!         &mut self.seats
//!     }
//! }
//!
//! impl TextInputHandler for State {}
//!
//! delegate_seat!(State);
//! delegate_text_input!(State);
//!
//! let display = Display::<State>::new(MemoryTransport::new());
//! let dh = display.handle();
//! let mut seats = SeatState::new();
//! let seat = seats.new_wl_seat::<State>(&dh, "seat0");
//! let text_input = TextInputManagerState::new::<State>(&dh);
//!
//! // Commit text to whichever revision the focused client uses
//! seat.text_input_v3().commit_string("hello");
//! seat.text_input_v3().done();
//! ```

use crate::protocols::text_input_v2::{zwp_text_input_manager_v2::ZwpTextInputManagerV2, zwp_text_input_v2};
use crate::protocols::text_input_v3::{zwp_text_input_manager_v3::ZwpTextInputManagerV3, zwp_text_input_v3};
use crate::protocols::wayland_core::wl_surface::WlSurface;
use crate::utils::Rectangle;
use crate::wayland::seat::Seat;
use crate::wayland::{Dispatch, DisplayHandle, GlobalDispatch, GlobalId, Resource, WEnum};

mod v2;
mod v3;

pub use crate::protocols::text_input_v2::zwp_text_input_v2::ContentHint;
pub use v2::{TextInputV2Data, TextInputV2Handle};
pub use v3::{TextInputV3Data, TextInputV3Handle};

/// Protocol revision of a text input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextInputRevision {
    /// `zwp_text_input_v2`
    V2,
    /// `zwp_text_input_v3`
    V3,
}

/// Purpose of a text field, the same for every revision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ContentPurpose {
    /// Any text
    #[default]
    Normal,
    /// Alphabetic characters
    Alpha,
    /// Digits
    Digits,
    /// A number
    Number,
    /// A phone number
    Phone,
    /// An URL
    Url,
    /// An email address
    Email,
    /// The name of a person
    Name,
    /// A password
    Password,
    /// A numeric password
    Pin,
    /// A date
    Date,
    /// A time
    Time,
    /// A date and a time
    DateTime,
    /// A terminal
    Terminal,
}

impl From<WEnum<zwp_text_input_v2::ContentPurpose>> for ContentPurpose {
    fn from(purpose: WEnum<zwp_text_input_v2::ContentPurpose>) -> ContentPurpose {
        use zwp_text_input_v2::ContentPurpose as V2;
        match purpose {
            WEnum::Value(V2::Normal) | WEnum::Unknown(_) => ContentPurpose::Normal,
            WEnum::Value(V2::Alpha) => ContentPurpose::Alpha,
            WEnum::Value(V2::Digits) => ContentPurpose::Digits,
            WEnum::Value(V2::Number) => ContentPurpose::Number,
            WEnum::Value(V2::Phone) => ContentPurpose::Phone,
            WEnum::Value(V2::Url) => ContentPurpose::Url,
            WEnum::Value(V2::Email) => ContentPurpose::Email,
            WEnum::Value(V2::Name) => ContentPurpose::Name,
            WEnum::Value(V2::Password) => ContentPurpose::Password,
            WEnum::Value(V2::Date) => ContentPurpose::Date,
            WEnum::Value(V2::Time) => ContentPurpose::Time,
            WEnum::Value(V2::Datetime) => ContentPurpose::DateTime,
            WEnum::Value(V2::Terminal) => ContentPurpose::Terminal,
        }
    }
}

impl From<WEnum<zwp_text_input_v3::ContentPurpose>> for ContentPurpose {
    fn from(purpose: WEnum<zwp_text_input_v3::ContentPurpose>) -> ContentPurpose {
        use zwp_text_input_v3::ContentPurpose as V3;
        match purpose {
            WEnum::Value(V3::Normal) | WEnum::Unknown(_) => ContentPurpose::Normal,
            WEnum::Value(V3::Alpha) => ContentPurpose::Alpha,
            WEnum::Value(V3::Digits) => ContentPurpose::Digits,
            WEnum::Value(V3::Number) => ContentPurpose::Number,
            WEnum::Value(V3::Phone) => ContentPurpose::Phone,
            WEnum::Value(V3::Url) => ContentPurpose::Url,
            WEnum::Value(V3::Email) => ContentPurpose::Email,
            WEnum::Value(V3::Name) => ContentPurpose::Name,
            WEnum::Value(V3::Password) => ContentPurpose::Password,
            WEnum::Value(V3::Pin) => ContentPurpose::Pin,
            WEnum::Value(V3::Date) => ContentPurpose::Date,
            WEnum::Value(V3::Time) => ContentPurpose::Time,
            WEnum::Value(V3::Datetime) => ContentPurpose::DateTime,
            WEnum::Value(V3::Terminal) => ContentPurpose::Terminal,
        }
    }
}

/// Direction of the text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextDirection {
    /// Derived from the text and the language
    #[default]
    Auto,
    /// Left to right
    LeftToRight,
    /// Right to left
    RightToLeft,
}

/// State a client set on its text input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInputState {
    /// Whether text input is enabled on the focused surface
    pub enabled: bool,
    /// Text around the cursor
    pub surrounding_text: String,
    /// Byte offset of the cursor in `surrounding_text`
    pub surrounding_cursor: i32,
    /// Byte offset of the selection anchor in `surrounding_text`
    pub surrounding_anchor: i32,
    /// Hints about the expected content
    pub content_hints: ContentHint,
    /// Purpose of the text field
    pub content_purpose: ContentPurpose,
    /// Cursor rectangle, surface local
    pub cursor_rectangle: Rectangle<i32>,
    /// Language the client would like, as a BCP-47 tag
    pub preferred_language: String,
}

/// Operations of the input method side, shared by every revision
pub trait TextInput {
    /// Protocol revision of this text input
    fn version(&self) -> TextInputRevision;

    /// Surface with the text input focus
    fn focused_surface(&self) -> Option<Resource<WlSurface>>;

    /// Whether the focused surface enabled text input
    fn is_enabled(&self) -> bool;

    /// State of the text input
    fn state(&self) -> TextInputState;

    /// Move the text input focus, sending `leave` and `enter`
    ///
    /// Returns whether [`TextInput::is_enabled`] changed.
    fn set_focus(&self, dh: &DisplayHandle, surface: Option<&Resource<WlSurface>>) -> bool;

    /// Send pre-edit text, the cursor range is in bytes
    fn preedit(&self, text: &str, cursor_begin: i32, cursor_end: i32);

    /// Commit text
    fn commit_string(&self, text: &str);

    /// Delete text around the cursor, lengths in bytes
    fn delete_surrounding_text(&self, before_length: u32, after_length: u32);

    /// Move the cursor
    fn set_cursor_position(&self, index: i32, anchor: i32);

    /// Tell whether the input panel is shown and which area it covers
    fn set_input_panel_state(&self, visible: bool, overlapped: Rectangle<i32>);

    /// Tell the language of the input method
    fn set_language(&self, language_tag: &str);

    /// Tell the direction of the text
    fn set_text_direction(&self, direction: TextDirection);

    /// Apply the events sent since the last `done`
    fn done(&self);
}

/// Handler of the text input requests
///
/// Every notification carries the seat of the text input and its revision.
#[allow(unused_variables)]
pub trait TextInputHandler {
    /// The focused surface enabled or disabled text input
    fn text_input_enabled_changed(&mut self, seat: &Seat, revision: TextInputRevision) {}

    /// An enabled text input committed `enable` again
    fn text_input_enable_requested(&mut self, seat: &Seat, revision: TextInputRevision) {}

    /// The content purpose or hints changed
    fn text_input_content_type_changed(&mut self, seat: &Seat, revision: TextInputRevision) {}

    /// The cursor rectangle changed
    fn text_input_cursor_rectangle_changed(&mut self, seat: &Seat, revision: TextInputRevision) {}

    /// The surrounding text changed
    fn text_input_surrounding_text_changed(&mut self, seat: &Seat, revision: TextInputRevision) {}

    /// The preferred language changed
    fn text_input_preferred_language_changed(&mut self, seat: &Seat, revision: TextInputRevision) {}

    /// The client asked to show or hide the input panel
    fn text_input_panel_requested(&mut self, seat: &Seat, revision: TextInputRevision, visible: bool) {}

    /// The client committed its state, `update_state` for v2 and `commit` for v3
    fn text_input_state_committed(&mut self, seat: &Seat, revision: TextInputRevision, serial: u32) {}
}

/// Extends [`Seat`] with text input
pub trait TextInputSeatTrait {
    /// The `zwp_text_input_v2` handle of this seat
    fn text_input_v2(&self) -> TextInputV2Handle;

    /// The `zwp_text_input_v3` handle of this seat
    fn text_input_v3(&self) -> TextInputV3Handle;
}

impl TextInputSeatTrait for Seat {
    fn text_input_v2(&self) -> TextInputV2Handle {
        self.user_data().get_or_insert(TextInputV2Handle::default).clone()
    }

    fn text_input_v3(&self) -> TextInputV3Handle {
        self.user_data().get_or_insert(TextInputV3Handle::default).clone()
    }
}

/// Move the text input focus of a seat, for every revision
///
/// Returns whether the enabled state of any revision changed.
pub fn set_text_input_focus(dh: &DisplayHandle, seat: &Seat, surface: Option<&Resource<WlSurface>>) -> bool {
    let v2 = seat.text_input_v2().set_focus(dh, surface);
    let v3 = seat.text_input_v3().set_focus(dh, surface);
    v2 || v3
}

/// State of the text input manager globals
#[derive(Debug)]
pub struct TextInputManagerState {
    v2: GlobalId,
    v3: GlobalId,
}

impl TextInputManagerState {
    /// Create the `zwp_text_input_manager_v2` and `zwp_text_input_manager_v3` globals
    pub fn new<D>(display: &DisplayHandle) -> TextInputManagerState
    where
        D: GlobalDispatch<ZwpTextInputManagerV2, ()>
            + Dispatch<ZwpTextInputManagerV2, ()>
            + Dispatch<zwp_text_input_v2::ZwpTextInputV2, TextInputV2Data>
            + GlobalDispatch<ZwpTextInputManagerV3, ()>
            + Dispatch<ZwpTextInputManagerV3, ()>
            + Dispatch<zwp_text_input_v3::ZwpTextInputV3, TextInputV3Data>
            + TextInputHandler
            + 'static,
    {
        let v2 = display.create_global::<D, ZwpTextInputManagerV2, _>(1, ());
        let v3 = display.create_global::<D, ZwpTextInputManagerV3, _>(1, ());
        TextInputManagerState {
            v2: v2.id(),
            v3: v3.id(),
        }
    }

    /// Id of the `zwp_text_input_manager_v2` global
    pub fn global_v2(&self) -> GlobalId {
        self.v2
    }

    /// Id of the `zwp_text_input_manager_v3` global
    pub fn global_v3(&self) -> GlobalId {
        self.v3
    }
}

fn rectangle(x: i32, y: i32, width: i32, height: i32) -> Rectangle<i32> {
    Rectangle::from_loc_and_size((x, y), (width, height))
}

#[allow(missing_docs)]
#[macro_export]
macro_rules! delegate_text_input {
    ($ty: ty) => {
        $crate::delegate_global_dispatch!($ty: [
            $crate::protocols::text_input_v2::zwp_text_input_manager_v2::ZwpTextInputManagerV2: (),
            $crate::protocols::text_input_v3::zwp_text_input_manager_v3::ZwpTextInputManagerV3: ()
        ] => $crate::wayland::text_input::TextInputManagerState);

        $crate::delegate_dispatch!($ty: [
            $crate::protocols::text_input_v2::zwp_text_input_manager_v2::ZwpTextInputManagerV2: (),
            $crate::protocols::text_input_v2::zwp_text_input_v2::ZwpTextInputV2: $crate::wayland::text_input::TextInputV2Data,
            $crate::protocols::text_input_v3::zwp_text_input_manager_v3::ZwpTextInputManagerV3: (),
            $crate::protocols::text_input_v3::zwp_text_input_v3::ZwpTextInputV3: $crate::wayland::text_input::TextInputV3Data
        ] => $crate::wayland::text_input::TextInputManagerState);
    };
}
