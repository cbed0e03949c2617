//! Text input protocol, unstable revision 2

/// `zwp_text_input_manager_v2`: text input manager
pub mod zwp_text_input_manager_v2 {
    use crate::wayland::{
        ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, New, ObjectId,
        RequestMessage,
    };

    use super::zwp_text_input_v2::ZwpTextInputV2;

    /// Marker type of `zwp_text_input_manager_v2`
    #[derive(Debug)]
    pub struct ZwpTextInputManagerV2;

    impl Interface for ZwpTextInputManagerV2 {
        const NAME: &'static str = "zwp_text_input_manager_v2";
        const VERSION: u32 = 1;
        type Request = Request;
        type Event = Event;
    }

    /// destroy the manager
    pub const REQ_DESTROY_OPCODE: u16 = 0;
    /// create a new text input object for a seat
    pub const REQ_GET_TEXT_INPUT_OPCODE: u16 = 1;

    /// Requests of `zwp_text_input_manager_v2`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// destroy the manager
        Destroy,
        /// create a new text input object for a seat
        GetTextInput {
            /// the new text input
            id: New<ZwpTextInputV2>,
            /// `wl_seat` the text input belongs to
            seat: ObjectId,
        },
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let mut args = Arguments::new(ZwpTextInputManagerV2::NAME, message, version);
            match args.opcode() {
                REQ_DESTROY_OPCODE => Ok(Request::Destroy),
                REQ_GET_TEXT_INPUT_OPCODE => Ok(Request::GetTextInput {
                    id: args.new_id()?,
                    seat: args.object()?,
                }),
                _ => Err(args.bad_opcode()),
            }
        }

        fn is_destructor(&self) -> bool {
            matches!(self, Request::Destroy)
        }
    }

    /// `zwp_text_input_manager_v2` has no events
    #[derive(Debug)]
    pub enum Event {}

    impl EventMessage for Event {
        fn opcode(&self) -> u16 {
            match *self {}
        }

        fn into_args(self) -> ArgumentList {
            match self {}
        }
    }
}

/// `zwp_text_input_v2`: text input object
pub mod zwp_text_input_v2 {
    use smallvec::smallvec;

    use crate::protocols::protocol_enum;
    use crate::wayland::{
        Argument, ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, ObjectId,
        RequestMessage, WEnum,
    };

    /// Marker type of `zwp_text_input_v2`
    #[derive(Debug)]
    pub struct ZwpTextInputV2;

    impl Interface for ZwpTextInputV2 {
        const NAME: &'static str = "zwp_text_input_v2";
        const VERSION: u32 = 1;
        type Request = Request;
        type Event = Event;
    }

    /// destroy the text input
    pub const REQ_DESTROY_OPCODE: u16 = 0;
    /// enable text input for a surface
    pub const REQ_ENABLE_OPCODE: u16 = 1;
    /// disable text input for a surface
    pub const REQ_DISABLE_OPCODE: u16 = 2;
    /// show the input panel
    pub const REQ_SHOW_INPUT_PANEL_OPCODE: u16 = 3;
    /// hide the input panel
    pub const REQ_HIDE_INPUT_PANEL_OPCODE: u16 = 4;
    /// set the surrounding text
    pub const REQ_SET_SURROUNDING_TEXT_OPCODE: u16 = 5;
    /// set the content purpose and hint
    pub const REQ_SET_CONTENT_TYPE_OPCODE: u16 = 6;
    /// set the cursor position
    pub const REQ_SET_CURSOR_RECTANGLE_OPCODE: u16 = 7;
    /// set the preferred language
    pub const REQ_SET_PREFERRED_LANGUAGE_OPCODE: u16 = 8;
    /// update the state of the text input
    pub const REQ_UPDATE_STATE_OPCODE: u16 = 9;

    /// enter event
    pub const EVT_ENTER_OPCODE: u16 = 0;
    /// leave event
    pub const EVT_LEAVE_OPCODE: u16 = 1;
    /// state of the input panel
    pub const EVT_INPUT_PANEL_STATE_OPCODE: u16 = 2;
    /// pre-edit
    pub const EVT_PREEDIT_STRING_OPCODE: u16 = 3;
    /// pre-edit styling
    pub const EVT_PREEDIT_STYLING_OPCODE: u16 = 4;
    /// pre-edit cursor
    pub const EVT_PREEDIT_CURSOR_OPCODE: u16 = 5;
    /// text commit
    pub const EVT_COMMIT_STRING_OPCODE: u16 = 6;
    /// set cursor to new position
    pub const EVT_CURSOR_POSITION_OPCODE: u16 = 7;
    /// delete surrounding text
    pub const EVT_DELETE_SURROUNDING_TEXT_OPCODE: u16 = 8;
    /// modifiers map
    pub const EVT_MODIFIERS_MAP_OPCODE: u16 = 9;
    /// keysym
    pub const EVT_KEYSYM_OPCODE: u16 = 10;
    /// language
    pub const EVT_LANGUAGE_OPCODE: u16 = 11;
    /// text direction
    pub const EVT_TEXT_DIRECTION_OPCODE: u16 = 12;
    /// configure amount of surrounding text to be sent
    pub const EVT_CONFIGURE_SURROUNDING_TEXT_OPCODE: u16 = 13;
    /// notifies about a changed input method
    pub const EVT_INPUT_METHOD_CHANGED_OPCODE: u16 = 14;

    bitflags::bitflags! {
        /// content hint
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct ContentHint: u32 {
            /// suggest word completions
            const COMPLETION = 0x1;
            /// suggest word corrections
            const SPELLCHECK = 0x2;
            /// switch to uppercase letters at the start of a sentence
            const AUTO_CAPITALIZATION = 0x4;
            /// prefer lowercase letters
            const LOWERCASE = 0x8;
            /// prefer uppercase letters
            const UPPERCASE = 0x10;
            /// prefer casing for titles and headings
            const TITLECASE = 0x20;
            /// characters should be hidden
            const HIDDEN_TEXT = 0x40;
            /// typed text should not be stored
            const SENSITIVE_DATA = 0x80;
            /// just latin characters should be entered
            const LATIN = 0x100;
            /// the text input is multiline
            const MULTILINE = 0x200;
        }
    }

    protocol_enum! {
        /// content purpose
        pub enum ContentPurpose {
            /// default input, allowing all characters
            Normal = 0,
            /// allow only alphabetic characters
            Alpha = 1,
            /// allow only digits
            Digits = 2,
            /// input a number
            Number = 3,
            /// input a phone number
            Phone = 4,
            /// input an URL
            Url = 5,
            /// input an email address
            Email = 6,
            /// input a name of a person
            Name = 7,
            /// input a password
            Password = 8,
            /// input a date
            Date = 9,
            /// input a time
            Time = 10,
            /// input a date and time
            Datetime = 11,
            /// input for a terminal
            Terminal = 12,
        }
    }

    protocol_enum! {
        /// why the state is updated
        pub enum UpdateReason {
            /// not because of an input method change
            Change = 0,
            /// full state after enter or input method change
            Full = 1,
            /// the input was reset
            Reset = 2,
            /// the input method changed
            Enter = 3,
        }
    }

    protocol_enum! {
        /// input panel visibility
        pub enum InputPanelVisibility {
            /// the input panel is hidden
            Hidden = 0,
            /// the input panel is visible
            Visible = 1,
        }
    }

    protocol_enum! {
        /// text direction
        pub enum TextDirection {
            /// automatic text direction based on text and language
            Auto = 0,
            /// left-to-right
            Ltr = 1,
            /// right-to-left
            Rtl = 2,
        }
    }

    /// Requests of `zwp_text_input_v2`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// destroy the text input
        Destroy,
        /// enable text input for a surface
        Enable {
            /// the `wl_surface`
            surface: ObjectId,
        },
        /// disable text input for a surface
        Disable {
            /// the `wl_surface`
            surface: ObjectId,
        },
        /// show the input panel
        ShowInputPanel,
        /// hide the input panel
        HideInputPanel,
        /// set the surrounding text
        SetSurroundingText {
            /// the text
            text: String,
            /// byte offset of the cursor
            cursor: i32,
            /// byte offset of the selection anchor
            anchor: i32,
        },
        /// set the content purpose and hint
        SetContentType {
            /// the hint
            hint: u32,
            /// the purpose
            purpose: WEnum<ContentPurpose>,
        },
        /// set the cursor position
        SetCursorRectangle {
            /// x
            x: i32,
            /// y
            y: i32,
            /// width
            width: i32,
            /// height
            height: i32,
        },
        /// set the preferred language
        SetPreferredLanguage {
            /// RFC-3066 language tag
            language: String,
        },
        /// update the state of the text input
        UpdateState {
            /// serial of the state
            serial: u32,
            /// why the state changed
            reason: WEnum<UpdateReason>,
        },
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let mut args = Arguments::new(ZwpTextInputV2::NAME, message, version);
            match args.opcode() {
                REQ_DESTROY_OPCODE => Ok(Request::Destroy),
                REQ_ENABLE_OPCODE => Ok(Request::Enable { surface: args.object()? }),
                REQ_DISABLE_OPCODE => Ok(Request::Disable { surface: args.object()? }),
                REQ_SHOW_INPUT_PANEL_OPCODE => Ok(Request::ShowInputPanel),
                REQ_HIDE_INPUT_PANEL_OPCODE => Ok(Request::HideInputPanel),
                REQ_SET_SURROUNDING_TEXT_OPCODE => Ok(Request::SetSurroundingText {
                    text: args.string()?,
                    cursor: args.int()?,
                    anchor: args.int()?,
                }),
                REQ_SET_CONTENT_TYPE_OPCODE => Ok(Request::SetContentType {
                    hint: args.uint()?,
                    purpose: args.wenum()?,
                }),
                REQ_SET_CURSOR_RECTANGLE_OPCODE => Ok(Request::SetCursorRectangle {
                    x: args.int()?,
                    y: args.int()?,
                    width: args.int()?,
                    height: args.int()?,
                }),
                REQ_SET_PREFERRED_LANGUAGE_OPCODE => Ok(Request::SetPreferredLanguage {
                    language: args.string()?,
                }),
                REQ_UPDATE_STATE_OPCODE => Ok(Request::UpdateState {
                    serial: args.uint()?,
                    reason: args.wenum()?,
                }),
                _ => Err(args.bad_opcode()),
            }
        }

        fn is_destructor(&self) -> bool {
            matches!(self, Request::Destroy)
        }
    }

    /// Events of `zwp_text_input_v2`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Event {
        /// enter event
        Enter {
            /// serial
            serial: u32,
            /// the focused `wl_surface`
            surface: ObjectId,
        },
        /// leave event
        Leave {
            /// serial
            serial: u32,
            /// the `wl_surface` losing focus
            surface: ObjectId,
        },
        /// state of the input panel
        InputPanelState {
            /// visibility of the panel
            state: InputPanelVisibility,
            /// x of the panel
            x: i32,
            /// y of the panel
            y: i32,
            /// width of the panel
            width: i32,
            /// height of the panel
            height: i32,
        },
        /// pre-edit
        PreeditString {
            /// the pre-edit text
            text: String,
            /// text to commit when the pre-edit is reset
            commit: String,
        },
        /// pre-edit styling
        PreeditStyling {
            /// start of the styled range
            index: u32,
            /// length of the styled range
            length: u32,
            /// style
            style: u32,
        },
        /// pre-edit cursor
        PreeditCursor {
            /// byte offset of the cursor
            index: i32,
        },
        /// text commit
        CommitString {
            /// the text
            text: String,
        },
        /// set cursor to new position
        CursorPosition {
            /// byte offset of the cursor
            index: i32,
            /// byte offset of the selection anchor
            anchor: i32,
        },
        /// delete surrounding text
        DeleteSurroundingText {
            /// bytes to delete before the cursor
            before_length: u32,
            /// bytes to delete after the cursor
            after_length: u32,
        },
        /// modifiers map
        ModifiersMap {
            /// null-terminated modifier names
            map: Vec<u8>,
        },
        /// keysym
        Keysym {
            /// timestamp
            time: u32,
            /// the keysym
            sym: u32,
            /// key state
            state: u32,
            /// modifier mask
            modifiers: u32,
        },
        /// language
        Language {
            /// RFC-3066 language tag
            language: String,
        },
        /// text direction
        TextDirection {
            /// the direction
            direction: TextDirection,
        },
        /// configure amount of surrounding text to be sent
        ConfigureSurroundingText {
            /// bytes before the cursor
            before_cursor: i32,
            /// bytes after the cursor
            after_cursor: i32,
        },
        /// notifies about a changed input method
        InputMethodChanged {
            /// serial
            serial: u32,
            /// reserved
            flags: u32,
        },
    }

    impl EventMessage for Event {
        fn opcode(&self) -> u16 {
            match self {
                Event::Enter { .. } => EVT_ENTER_OPCODE,
                Event::Leave { .. } => EVT_LEAVE_OPCODE,
                Event::InputPanelState { .. } => EVT_INPUT_PANEL_STATE_OPCODE,
                Event::PreeditString { .. } => EVT_PREEDIT_STRING_OPCODE,
                Event::PreeditStyling { .. } => EVT_PREEDIT_STYLING_OPCODE,
                Event::PreeditCursor { .. } => EVT_PREEDIT_CURSOR_OPCODE,
                Event::CommitString { .. } => EVT_COMMIT_STRING_OPCODE,
                Event::CursorPosition { .. } => EVT_CURSOR_POSITION_OPCODE,
                Event::DeleteSurroundingText { .. } => EVT_DELETE_SURROUNDING_TEXT_OPCODE,
                Event::ModifiersMap { .. } => EVT_MODIFIERS_MAP_OPCODE,
                Event::Keysym { .. } => EVT_KEYSYM_OPCODE,
                Event::Language { .. } => EVT_LANGUAGE_OPCODE,
                Event::TextDirection { .. } => EVT_TEXT_DIRECTION_OPCODE,
                Event::ConfigureSurroundingText { .. } => EVT_CONFIGURE_SURROUNDING_TEXT_OPCODE,
                Event::InputMethodChanged { .. } => EVT_INPUT_METHOD_CHANGED_OPCODE,
            }
        }

        fn into_args(self) -> ArgumentList {
            match self {
                Event::Enter { serial, surface } | Event::Leave { serial, surface } => {
                    smallvec![Argument::Uint(serial), Argument::Object(Some(surface))]
                }
                Event::InputPanelState {
                    state,
                    x,
                    y,
                    width,
                    height,
                } => smallvec![
                    Argument::Uint(state.into()),
                    Argument::Int(x),
                    Argument::Int(y),
                    Argument::Int(width),
                    Argument::Int(height),
                ],
                Event::PreeditString { text, commit } => {
                    smallvec![Argument::Str(Some(text)), Argument::Str(Some(commit))]
                }
                Event::PreeditStyling { index, length, style } => smallvec![
                    Argument::Uint(index),
                    Argument::Uint(length),
                    Argument::Uint(style),
                ],
                Event::PreeditCursor { index } => smallvec![Argument::Int(index)],
                Event::CommitString { text } => smallvec![Argument::Str(Some(text))],
                Event::CursorPosition { index, anchor } => smallvec![Argument::Int(index), Argument::Int(anchor)],
                Event::DeleteSurroundingText {
                    before_length,
                    after_length,
                } => smallvec![Argument::Uint(before_length), Argument::Uint(after_length)],
                Event::ModifiersMap { map } => smallvec![Argument::Array(map)],
                Event::Keysym {
                    time,
                    sym,
                    state,
                    modifiers,
                } => smallvec![
                    Argument::Uint(time),
                    Argument::Uint(sym),
                    Argument::Uint(state),
                    Argument::Uint(modifiers),
                ],
                Event::Language { language } => smallvec![Argument::Str(Some(language))],
                Event::TextDirection { direction } => smallvec![Argument::Uint(direction.into())],
                Event::ConfigureSurroundingText {
                    before_cursor,
                    after_cursor,
                } => smallvec![Argument::Int(before_cursor), Argument::Int(after_cursor)],
                Event::InputMethodChanged { serial, flags } => {
                    smallvec![Argument::Uint(serial), Argument::Uint(flags)]
                }
            }
        }
    }
}
