#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]
// Allow acronyms like ARGB
#![allow(clippy::upper_case_acronyms)]

//! # plasma-wayland-server: the server side of the Plasma protocols
//!
//! This crate implements the display-server half of Wayland and the KDE/Plasma protocol
//! extensions a window manager uses to expose its features to clients: outputs and
//! output devices, window management metadata, virtual desktops, server-side decoration
//! negotiation and palettes, text input (two protocol revisions), graphics tablets and
//! remote buffer sharing.
//!
//! ## Structure of the crate
//!
//! - [`wayland`] contains the protocol core ([`Display`](wayland::Display),
//!   [`Global`](wayland::Global), [`Resource`](wayland::Resource) and the dispatch traits)
//!   and one module per extension.
//! - [`protocols`] contains the typed definitions of every interface: opcodes, request and
//!   event enums and protocol enums.
//! - [`utils`] contains serials, geometry and user data helpers.
//!
//! The transport, accepting connections and (de)serializing messages on the socket, is not
//! part of this crate. It plugs in through the [`Transport`](wayland::Transport) trait and
//! hands decoded requests to the display.
//!
//! ## The event loop and state handling
//!
//! Everything protocol-facing is single-threaded and driven from one event loop, usually
//! [`calloop`]. Requests are dispatched with a mutable reference to the compositor state,
//! which gets passed down to the handler traits of the extensions. Work produced on other
//! threads, such as buffers for remote access, is handed to the loop through a
//! [`calloop::channel`].
//!
//! ### Logging
//!
//! This crate makes extensive use of [`tracing`] for its internal logging and installs no
//! subscriber itself. For example with `tracing-subscriber`:
//!
//! ```no_run
//! tracing_subscriber::fmt()
//!     .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
//!     .init();
//! ```
//!
//! For release builds it is recommended to limit the log level during compile time, by
//! enabling the corresponding features of [`tracing`] in your binary crate:
//!
//! ```toml
//! [dependencies]
//! tracing = { version = "0.1", features = ["max_level_trace", "release_max_level_debug"] }
//! ```

pub mod protocols;
pub mod utils;
pub mod wayland;

pub mod reexports;
