//! Text input protocol, unstable revision 3

/// `zwp_text_input_manager_v3`: text input manager
pub mod zwp_text_input_manager_v3 {
    use crate::wayland::{
        ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, New, ObjectId,
        RequestMessage,
    };

    use super::zwp_text_input_v3::ZwpTextInputV3;

    /// Marker type of `zwp_text_input_manager_v3`
    #[derive(Debug)]
    pub struct ZwpTextInputManagerV3;

    impl Interface for ZwpTextInputManagerV3 {
        const NAME: &'static str = "zwp_text_input_manager_v3";
        const VERSION: u32 = 1;
        type Request = Request;
        type Event = Event;
    }

    /// destroy the manager
    pub const REQ_DESTROY_OPCODE: u16 = 0;
    /// create a new text input object for a seat
    pub const REQ_GET_TEXT_INPUT_OPCODE: u16 = 1;

    /// Requests of `zwp_text_input_manager_v3`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// destroy the manager
        Destroy,
        /// create a new text input object for a seat
        GetTextInput {
            /// the new text input
            id: New<ZwpTextInputV3>,
            /// `wl_seat` the text input belongs to
            seat: ObjectId,
        },
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let mut args = Arguments::new(ZwpTextInputManagerV3::NAME, message, version);
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

    /// `zwp_text_input_manager_v3` has no events
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

/// `zwp_text_input_v3`: text input object
pub mod zwp_text_input_v3 {
    use smallvec::smallvec;

    use crate::protocols::protocol_enum;
    use crate::wayland::{
        Argument, ArgumentList, Arguments, DispatchError, EventMessage, Interface, Message, ObjectId,
        RequestMessage, WEnum,
    };

    pub use crate::protocols::text_input_v2::zwp_text_input_v2::ContentHint;

    /// Marker type of `zwp_text_input_v3`
    #[derive(Debug)]
    pub struct ZwpTextInputV3;

    impl Interface for ZwpTextInputV3 {
        const NAME: &'static str = "zwp_text_input_v3";
        const VERSION: u32 = 1;
        type Request = Request;
        type Event = Event;
    }

    /// destroy the text input
    pub const REQ_DESTROY_OPCODE: u16 = 0;
    /// request text input to be enabled
    pub const REQ_ENABLE_OPCODE: u16 = 1;
    /// disable text input on a surface
    pub const REQ_DISABLE_OPCODE: u16 = 2;
    /// sets the surrounding text
    pub const REQ_SET_SURROUNDING_TEXT_OPCODE: u16 = 3;
    /// indicates the cause of surrounding text change
    pub const REQ_SET_TEXT_CHANGE_CAUSE_OPCODE: u16 = 4;
    /// set content purpose and hint
    pub const REQ_SET_CONTENT_TYPE_OPCODE: u16 = 5;
    /// set cursor position
    pub const REQ_SET_CURSOR_RECTANGLE_OPCODE: u16 = 6;
    /// commit state
    pub const REQ_COMMIT_OPCODE: u16 = 7;

    /// enter event
    pub const EVT_ENTER_OPCODE: u16 = 0;
    /// leave event
    pub const EVT_LEAVE_OPCODE: u16 = 1;
    /// pre-edit
    pub const EVT_PREEDIT_STRING_OPCODE: u16 = 2;
    /// text commit
    pub const EVT_COMMIT_STRING_OPCODE: u16 = 3;
    /// delete surrounding text
    pub const EVT_DELETE_SURROUNDING_TEXT_OPCODE: u16 = 4;
    /// apply changes
    pub const EVT_DONE_OPCODE: u16 = 5;

    protocol_enum! {
        /// text change reason
        pub enum ChangeCause {
            /// input method caused the change
            InputMethod = 0,
            /// something else than the input method caused the change
            Other = 1,
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
            /// input a numeric password
            Pin = 9,
            /// input a date
            Date = 10,
            /// input a time
            Time = 11,
            /// input a date and time
            Datetime = 12,
            /// input for a terminal
            Terminal = 13,
        }
    }

    /// Requests of `zwp_text_input_v3`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Request {
        /// destroy the text input
        Destroy,
        /// request text input to be enabled
        Enable,
        /// disable text input on a surface
        Disable,
        /// sets the surrounding text
        SetSurroundingText {
            /// the text
            text: String,
            /// byte offset of the cursor
            cursor: i32,
            /// byte offset of the selection anchor
            anchor: i32,
        },
        /// indicates the cause of surrounding text change
        SetTextChangeCause {
            /// the cause
            cause: WEnum<ChangeCause>,
        },
        /// set content purpose and hint
        SetContentType {
            /// the hint
            hint: u32,
            /// the purpose
            purpose: WEnum<ContentPurpose>,
        },
        /// set cursor position
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
        /// commit state
        Commit,
    }

    impl RequestMessage for Request {
        fn parse(message: Message, version: u32) -> Result<Self, DispatchError> {
            let mut args = Arguments::new(ZwpTextInputV3::NAME, message, version);
            match args.opcode() {
                REQ_DESTROY_OPCODE => Ok(Request::Destroy),
                REQ_ENABLE_OPCODE => Ok(Request::Enable),
                REQ_DISABLE_OPCODE => Ok(Request::Disable),
                REQ_SET_SURROUNDING_TEXT_OPCODE => Ok(Request::SetSurroundingText {
                    text: args.string()?,
                    cursor: args.int()?,
                    anchor: args.int()?,
                }),
                REQ_SET_TEXT_CHANGE_CAUSE_OPCODE => Ok(Request::SetTextChangeCause { cause: args.wenum()? }),
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
                REQ_COMMIT_OPCODE => Ok(Request::Commit),
                _ => Err(args.bad_opcode()),
            }
        }

        fn is_destructor(&self) -> bool {
            matches!(self, Request::Destroy)
        }
    }

    /// Events of `zwp_text_input_v3`
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Event {
        /// enter event
        Enter {
            /// the focused `wl_surface`
            surface: ObjectId,
        },
        /// leave event
        Leave {
            /// the `wl_surface` losing focus
            surface: ObjectId,
        },
        /// pre-edit
        PreeditString {
            /// the pre-edit text, none to clear it
            text: Option<String>,
            /// byte offset of the cursor start
            cursor_begin: i32,
            /// byte offset of the cursor end
            cursor_end: i32,
        },
        /// text commit
        CommitString {
            /// the text, none to commit nothing
            text: Option<String>,
        },
        /// delete surrounding text
        DeleteSurroundingText {
            /// bytes to delete before the cursor
            before_length: u32,
            /// bytes to delete after the cursor
            after_length: u32,
        },
        /// apply changes
        Done {
            /// number of commits received so far
            serial: u32,
        },
    }

    impl EventMessage for Event {
        fn opcode(&self) -> u16 {
            match self {
                Event::Enter { .. } => EVT_ENTER_OPCODE,
                Event::Leave { .. } => EVT_LEAVE_OPCODE,
                Event::PreeditString { .. } => EVT_PREEDIT_STRING_OPCODE,
                Event::CommitString { .. } => EVT_COMMIT_STRING_OPCODE,
                Event::DeleteSurroundingText { .. } => EVT_DELETE_SURROUNDING_TEXT_OPCODE,
                Event::Done { .. } => EVT_DONE_OPCODE,
            }
        }

        fn into_args(self) -> ArgumentList {
            match self {
                Event::Enter { surface } | Event::Leave { surface } => smallvec![Argument::Object(Some(surface))],
                Event::PreeditString {
                    text,
                    cursor_begin,
                    cursor_end,
                } => smallvec![
                    Argument::Str(text),
                    Argument::Int(cursor_begin),
                    Argument::Int(cursor_end),
                ],
                Event::CommitString { text } => smallvec![Argument::Str(text)],
                Event::DeleteSurroundingText {
                    before_length,
                    after_length,
                } => smallvec![Argument::Uint(before_length), Argument::Uint(after_length)],
                Event::Done { serial } => smallvec![Argument::Uint(serial)],
            }
        }
    }
}
